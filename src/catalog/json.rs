// JSON catalog documents.
//
// {"functions": [{"name": "str_replace",
//                 "parameters": [{"name": "search", "required": true,
//                                 "default": null, "type": "array|string",
//                                 "by_reference": false, "variadic": false}]}]}
//
// Only `name` is mandatory per parameter. `required` defaults to true unless
// a `default` is given; an explicit `required: true` drops the default.
// A function entry carrying an `"error"` string could not be reflected by
// whatever produced the document.

use super::{CatalogSource, ParameterDescriptor};
use crate::error::{GenerateError, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct JsonCatalog {
    // (name, raw entry)
    functions: Vec<(String, Value)>,
    // name -> index into `functions`
    index: HashMap<String, usize>,
}

impl JsonCatalog {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            GenerateError::Enumeration(format!("failed to read catalog {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let doc: Value = serde_json::from_str(content)
            .map_err(|e| GenerateError::Enumeration(format!("catalog is not valid JSON: {}", e)))?;

        let entries = doc
            .get("functions")
            .and_then(|v| v.as_array())
            .ok_or_else(|| GenerateError::Enumeration("catalog missing 'functions' array".into()))?;

        let mut functions = Vec::with_capacity(entries.len());
        let mut index = HashMap::with_capacity(entries.len());
        for (position, entry) in entries.iter().enumerate() {
            let name = entry
                .get("name")
                .and_then(|v| v.as_str())
                .ok_or_else(|| {
                    GenerateError::Enumeration(format!("catalog function #{} missing 'name'", position))
                })?;
            // First entry wins for repeated names
            index.entry(name.to_string()).or_insert(functions.len());
            functions.push((name.to_string(), entry.clone()));
        }

        Ok(Self { functions, index })
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl CatalogSource for JsonCatalog {
    fn names(&self) -> Result<Vec<String>> {
        Ok(self.functions.iter().map(|(name, _)| name.clone()).collect())
    }

    fn reflect(&self, name: &str) -> Result<Vec<ParameterDescriptor>> {
        let entry = self
            .index
            .get(name)
            .map(|&i| &self.functions[i].1)
            .ok_or_else(|| GenerateError::reflection(name, "function is not in the catalog"))?;

        if let Some(message) = entry.get("error").and_then(|v| v.as_str()) {
            return Err(GenerateError::reflection(name, message));
        }

        let params = match entry.get("parameters") {
            None | Some(Value::Null) => return Ok(Vec::new()),
            Some(v) => v
                .as_array()
                .ok_or_else(|| GenerateError::reflection(name, "'parameters' must be an array"))?,
        };

        params
            .iter()
            .enumerate()
            .map(|(position, p)| parse_parameter(position, p).map_err(|msg| GenerateError::reflection(name, msg)))
            .collect()
    }
}

fn parse_parameter(position: usize, value: &Value) -> std::result::Result<ParameterDescriptor, String> {
    let obj = value
        .as_object()
        .ok_or_else(|| format!("parameter #{} must be an object", position))?;

    let name = obj
        .get("name")
        .and_then(|v| v.as_str())
        .filter(|s| !s.trim_start_matches('$').is_empty())
        .ok_or_else(|| format!("parameter #{} missing 'name'", position))?;

    let default = optional_str(obj.get("default"), "default", position)?;
    let type_hint = optional_str(obj.get("type"), "type", position)?;
    let by_reference = optional_bool(obj.get("by_reference"), "by_reference", position)?.unwrap_or(false);
    let variadic = optional_bool(obj.get("variadic"), "variadic", position)?.unwrap_or(false);
    // A parameter with a default is optional unless stated otherwise
    let required = optional_bool(obj.get("required"), "required", position)?.unwrap_or(default.is_none());

    let mut param = if required {
        ParameterDescriptor::required(position, name)
    } else {
        ParameterDescriptor::optional(position, name, default)
    };
    if let Some(ty) = type_hint {
        param = param.with_type(ty);
    }
    if by_reference {
        param = param.by_reference();
    }
    if variadic {
        param = param.variadic();
    }
    Ok(param)
}

fn optional_bool(value: Option<&Value>, field: &str, position: usize) -> std::result::Result<Option<bool>, String> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_bool()
            .map(Some)
            .ok_or_else(|| format!("parameter #{} field '{}' must be a boolean", position, field)),
    }
}

fn optional_str<'v>(value: Option<&'v Value>, field: &str, position: usize) -> std::result::Result<Option<&'v str>, String> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_str()
            .map(Some)
            .ok_or_else(|| format!("parameter #{} field '{}' must be a string", position, field)),
    }
}
