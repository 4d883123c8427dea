// Declaration builder: catalog -> ordered method / property-read tags.

use crate::catalog::{self, CatalogSource};
use crate::error::Result;
use crate::resolver::Resolver;
use crate::trace::trace;
use crate::variants;
use std::collections::HashSet;

/// Functions with at least this many required parameters get no
/// property-read tag: a bare member access cannot pass two arguments.
pub const PROPERTY_ARITY_LIMIT: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    Method,
    PropertyRead,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarationTag {
    pub kind: TagKind,
    pub name: String,
    /// Rendered parameter list; `Some` only for methods.
    pub signature: Option<String>,
}

impl DeclarationTag {
    pub fn method(name: impl Into<String>, signature: impl Into<String>) -> Self {
        Self { kind: TagKind::Method, name: name.into(), signature: Some(signature.into()) }
    }

    pub fn property_read(name: impl Into<String>) -> Self {
        Self { kind: TagKind::PropertyRead, name: name.into(), signature: None }
    }
}

pub struct DeclarationBuilder<'a> {
    catalog: &'a dyn CatalogSource,
    resolver: &'a dyn Resolver,
}

impl<'a> DeclarationBuilder<'a> {
    pub fn new(catalog: &'a dyn CatalogSource, resolver: &'a dyn Resolver) -> Self {
        Self { catalog, resolver }
    }

    /// Build the full tag list, in catalog order.
    ///
    /// Per function: one method tag per new variant, then (arity permitting)
    /// one property-read tag per new variant. Method and property names are
    /// deduplicated independently. Any reflection failure aborts the build.
    pub fn build(&self) -> Result<Vec<DeclarationTag>> {
        let mut methods: HashSet<String> = HashSet::new();
        let mut properties: HashSet<String> = HashSet::new();
        let mut tags = Vec::new();
        let mut functions = 0usize;

        for descriptor in catalog::enumerate(self.catalog)? {
            let descriptor = descriptor?;
            functions += 1;

            let signature = descriptor.signature();
            let alias = self.resolver.resolve(&descriptor.raw_name);
            let names = variants::with_alias(&descriptor.raw_name, &alias);

            for name in &names {
                if methods.insert(name.clone()) {
                    tags.push(DeclarationTag::method(name.as_str(), signature.as_str()));
                }
            }

            if descriptor.required_count() < PROPERTY_ARITY_LIMIT {
                for name in &names {
                    if properties.insert(name.clone()) {
                        tags.push(DeclarationTag::property_read(name.as_str()));
                    }
                }
            }
        }

        trace(&format!(
            "builder: {} functions -> {} methods, {} properties",
            functions,
            methods.len(),
            properties.len()
        ));
        Ok(tags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CallableDescriptor, ParameterDescriptor, StaticCatalog};
    use crate::resolver::AsIs;
    use crate::GenerateError;

    fn required(names: &[&str]) -> Vec<ParameterDescriptor> {
        names
            .iter()
            .enumerate()
            .map(|(i, n)| ParameterDescriptor::required(i, n))
            .collect()
    }

    fn build(functions: Vec<CallableDescriptor>) -> Vec<DeclarationTag> {
        let catalog = StaticCatalog::new(functions);
        DeclarationBuilder::new(&catalog, &AsIs).build().expect("build")
    }

    #[test]
    fn test_single_word_low_arity() {
        let tags = build(vec![CallableDescriptor::new("strtoupper", required(&["string"]))]);
        assert_eq!(
            tags,
            vec![
                DeclarationTag::method("strtoupper", "$string"),
                DeclarationTag::property_read("strtoupper"),
            ]
        );
    }

    #[test]
    fn test_high_arity_gets_no_properties() {
        let tags = build(vec![CallableDescriptor::new(
            "str_replace",
            required(&["search", "replace", "subject"]),
        )]);
        let sig = "$search, $replace, $subject";
        assert_eq!(
            tags,
            vec![DeclarationTag::method("str_replace", sig), DeclarationTag::method("strReplace", sig)]
        );
    }

    #[test]
    fn test_both_variants_get_both_kinds() {
        let tags = build(vec![CallableDescriptor::new("is_array", required(&["value"]))]);
        assert_eq!(
            tags,
            vec![
                DeclarationTag::method("is_array", "$value"),
                DeclarationTag::method("isArray", "$value"),
                DeclarationTag::property_read("is_array"),
                DeclarationTag::property_read("isArray"),
            ]
        );
    }

    #[test]
    fn test_optional_parameters_do_not_count_towards_arity() {
        let tags = build(vec![CallableDescriptor::new(
            "explode",
            vec![
                ParameterDescriptor::required(0, "separator"),
                ParameterDescriptor::optional(1, "string", None),
                ParameterDescriptor::optional(2, "limit", Some("PHP_INT_MAX")),
            ],
        )]);
        assert_eq!(tags.iter().filter(|t| t.kind == TagKind::PropertyRead).count(), 1);
        assert_eq!(tags[0].signature.as_deref(), Some("$separator, $string = null, $limit = PHP_INT_MAX"));
    }

    #[test]
    fn test_dedup_sets_are_independent() {
        // `str_replace` (3 required) claims `strReplace` as a method only;
        // `strReplace` (1 required) then adds just the property.
        let tags = build(vec![
            CallableDescriptor::new("str_replace", required(&["a", "b", "c"])),
            CallableDescriptor::new("strReplace", required(&["a"])),
        ]);
        assert_eq!(
            tags,
            vec![
                DeclarationTag::method("str_replace", "$a, $b, $c"),
                DeclarationTag::method("strReplace", "$a, $b, $c"),
                DeclarationTag::property_read("strReplace"),
            ]
        );
    }

    #[test]
    fn test_no_duplicate_names_per_kind() {
        let tags = build(vec![
            CallableDescriptor::new("is_int", required(&["value"])),
            CallableDescriptor::new("isInt", vec![]),
            CallableDescriptor::new("is-int", required(&["value"])),
        ]);
        for kind in [TagKind::Method, TagKind::PropertyRead] {
            let names: Vec<&str> = tags.iter().filter(|t| t.kind == kind).map(|t| t.name.as_str()).collect();
            let unique: HashSet<&str> = names.iter().copied().collect();
            assert_eq!(names.len(), unique.len(), "duplicate {:?} tag in {:?}", kind, names);
        }
    }

    #[test]
    fn test_build_is_deterministic() {
        let catalog = StaticCatalog::new(vec![
            CallableDescriptor::new("array_map", required(&["callback", "array"])),
            CallableDescriptor::new("count", required(&["value"])),
            CallableDescriptor::new("pi", vec![]),
        ]);
        let builder = DeclarationBuilder::new(&catalog, &AsIs);
        assert_eq!(builder.build().expect("first"), builder.build().expect("second"));
    }

    #[test]
    fn test_qualified_functions_never_appear() {
        let tags = build(vec![
            CallableDescriptor::new("Brotli\\compress", required(&["data"])),
            CallableDescriptor::new("strlen", required(&["string"])),
        ]);
        assert!(tags.iter().all(|t| !t.name.contains("compress")));
        assert_eq!(tags.len(), 2);
    }

    #[test]
    fn test_camel_variant_follows_resolver() {
        struct Prefixed;
        impl Resolver for Prefixed {
            fn resolve(&self, function: &str) -> String {
                function.trim_start_matches("mb_").to_string()
            }
        }

        let catalog = StaticCatalog::new(vec![CallableDescriptor::new("mb_strlen", required(&["s", "e"]))]);
        let tags = DeclarationBuilder::new(&catalog, &Prefixed).build().expect("build");
        let names: Vec<&str> = tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["mb_strlen", "strlen"]);
    }

    struct FailsOn(&'static str);

    impl CatalogSource for FailsOn {
        fn names(&self) -> Result<Vec<String>> {
            Ok(vec!["strlen".into(), self.0.into(), "count".into()])
        }

        fn reflect(&self, name: &str) -> Result<Vec<ParameterDescriptor>> {
            if name == self.0 {
                return Err(GenerateError::reflection(name, "parameters unavailable"));
            }
            Ok(required(&["value"]))
        }
    }

    #[test]
    fn test_reflection_failure_aborts_build() {
        let err = DeclarationBuilder::new(&FailsOn("broken"), &AsIs).build().unwrap_err();
        assert!(matches!(err, GenerateError::Reflection { ref function, .. } if function == "broken"));
    }
}
