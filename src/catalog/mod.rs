// Callable catalog: the set of global functions the stub advertises.
//
// A source answers two questions, the same two the PHP runtime answers for
// `get_defined_functions()` and `ReflectionFunction`: which function names
// exist, and what one function's parameters look like. `enumerate` turns a
// source into the filtered, lazily-reflected descriptor stream the builder
// consumes.

use crate::error::Result;
use std::collections::{HashMap, HashSet};

pub mod json;
pub mod php;
pub mod stub;

pub use json::JsonCatalog;
pub use php::PhpRuntimeCatalog;
pub use stub::StubCatalog;

/// PHP namespace separator.
pub const NAMESPACE_SEPARATOR: char = '\\';

// ─── Descriptors ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterDescriptor {
    /// Name without the leading `$`.
    pub name: String,
    pub position: usize,
    pub required: bool,
    /// Source text of the default value, e.g. `null`, `0`, `PHP_EOL`.
    pub default_representation: Option<String>,
    pub type_hint: Option<String>,
    pub by_reference: bool,
    pub variadic: bool,
}

impl ParameterDescriptor {
    pub fn required(position: usize, name: &str) -> Self {
        Self {
            name: name.trim_start_matches('$').to_string(),
            position,
            required: true,
            default_representation: None,
            type_hint: None,
            by_reference: false,
            variadic: false,
        }
    }

    pub fn optional(position: usize, name: &str, default: Option<&str>) -> Self {
        Self {
            required: false,
            default_representation: default.map(str::to_string),
            ..Self::required(position, name)
        }
    }

    pub fn with_type(mut self, type_hint: &str) -> Self {
        self.type_hint = Some(type_hint.to_string());
        self
    }

    pub fn by_reference(mut self) -> Self {
        self.by_reference = true;
        self
    }

    /// Variadic parameters are never required.
    pub fn variadic(mut self) -> Self {
        self.variadic = true;
        self.required = false;
        self
    }

    /// Declared textual form: `[type ][&][...]$name[ = default]`.
    pub fn render(&self) -> String {
        let mut out = String::new();
        if let Some(ty) = &self.type_hint {
            out.push_str(ty);
            out.push(' ');
        }
        if self.by_reference {
            out.push('&');
        }
        if self.variadic {
            out.push_str("...");
        }
        out.push('$');
        out.push_str(&self.name);

        match &self.default_representation {
            Some(default) => {
                out.push_str(" = ");
                out.push_str(default);
            }
            // Optional without a reflectable default
            None if !self.required && !self.variadic => out.push_str(" = null"),
            None => {}
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallableDescriptor {
    pub raw_name: String,
    pub parameters: Vec<ParameterDescriptor>,
}

impl CallableDescriptor {
    pub fn new(raw_name: impl Into<String>, mut parameters: Vec<ParameterDescriptor>) -> Self {
        parameters.sort_by_key(|p| p.position);
        Self { raw_name: raw_name.into(), parameters }
    }

    pub fn required_count(&self) -> usize {
        self.parameters.iter().filter(|p| p.required).count()
    }

    /// Comma-joined rendered parameters, in position order.
    pub fn signature(&self) -> String {
        self.parameters
            .iter()
            .map(ParameterDescriptor::render)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

// ─── Sources ──────────────────────────────────────────────────────────────────

pub trait CatalogSource {
    /// Every function name known to the host, qualified or not, in host order.
    /// Failing here is an enumeration failure.
    fn names(&self) -> Result<Vec<String>>;

    /// Parameter list of one function previously returned by `names`.
    /// Failing here is a reflection failure.
    fn reflect(&self, name: &str) -> Result<Vec<ParameterDescriptor>>;
}

/// Fixed, in-memory catalog.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    functions: Vec<CallableDescriptor>,
    index: HashMap<String, usize>,
}

impl StaticCatalog {
    pub fn new(functions: Vec<CallableDescriptor>) -> Self {
        let mut index = HashMap::with_capacity(functions.len());
        for (i, f) in functions.iter().enumerate() {
            index.entry(f.raw_name.clone()).or_insert(i);
        }
        Self { functions, index }
    }
}

impl CatalogSource for StaticCatalog {
    fn names(&self) -> Result<Vec<String>> {
        Ok(self.functions.iter().map(|f| f.raw_name.clone()).collect())
    }

    fn reflect(&self, name: &str) -> Result<Vec<ParameterDescriptor>> {
        self.index
            .get(name)
            .map(|&i| self.functions[i].parameters.clone())
            .ok_or_else(|| crate::GenerateError::reflection(name, "function is not in the catalog"))
    }
}

// ─── Enumeration ──────────────────────────────────────────────────────────────

/// Strip surrounding namespace separators; `None` if the name is still qualified.
pub fn unqualified(raw: &str) -> Option<&str> {
    let name = raw.trim_matches(NAMESPACE_SEPARATOR);
    if name.contains(NAMESPACE_SEPARATOR) {
        None
    } else {
        Some(name)
    }
}

/// Lazily reflect every unqualified function of `source`, in source order.
///
/// Listing happens up front (and may fail with an enumeration error); each
/// item is reflected only when pulled. Names repeated by the source are
/// yielded once. Calling this again starts a fresh enumeration.
pub fn enumerate<'a>(
    source: &'a dyn CatalogSource,
) -> Result<impl Iterator<Item = Result<CallableDescriptor>> + 'a> {
    let mut seen = HashSet::new();
    let names: Vec<(String, String)> = source
        .names()?
        .into_iter()
        .filter_map(|raw| {
            let name = unqualified(&raw)?.to_string();
            if name.is_empty() || !seen.insert(name.clone()) {
                return None;
            }
            Some((raw, name))
        })
        .collect();

    Ok(names.into_iter().map(move |(raw, name)| {
        let parameters = source.reflect(&raw)?;
        Ok(CallableDescriptor::new(name, parameters))
    }))
}
