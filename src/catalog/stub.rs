// Catalog read from PHP stub sources (phpstorm-stubs style).
//
// Only free functions are collected: declarations inside class, interface,
// trait or enum bodies are methods and are skipped. Functions declared under
// a `namespace` come out qualified, so the usual enumeration filter drops
// them. Parameter lists are kept as source text and parsed on `reflect`.

use super::{CatalogSource, ParameterDescriptor, NAMESPACE_SEPARATOR};
use crate::error::{GenerateError, Result};
use crate::trace::trace;
use ignore::WalkBuilder;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

const FUNCTION_PATTERN: &str = r"(?m)^[ \t]*function\s+&?\s*([A-Za-z_][A-Za-z0-9_]*)\s*\(";
const NAMESPACE_PATTERN: &str = r"(?m)^[ \t]*namespace(?:\s+([A-Za-z_][A-Za-z0-9_\\]*))?\s*[;{]";
const CLASS_LIKE_PATTERN: &str =
    r"(?m)^[ \t]*(?:(?:abstract|final|readonly)\s+)*(?:class|interface|trait|enum)\s+[A-Za-z_][A-Za-z0-9_]*[^{;]*\{";

#[derive(Debug, Clone)]
struct StubFunction {
    name: String,
    // Raw parameter text, or why it could not be extracted.
    params: std::result::Result<String, String>,
}

#[derive(Debug, Clone, Default)]
pub struct StubCatalog {
    functions: Vec<StubFunction>,
    // name -> index into `functions`
    index: HashMap<String, usize>,
}

struct Patterns {
    function: Regex,
    namespace: Regex,
    class_like: Regex,
}

impl Patterns {
    fn compile() -> Result<Self> {
        let build = |p: &str| {
            Regex::new(p).map_err(|e| GenerateError::Enumeration(format!("invalid stub pattern: {}", e)))
        };
        Ok(Self {
            function: build(FUNCTION_PATTERN)?,
            namespace: build(NAMESPACE_PATTERN)?,
            class_like: build(CLASS_LIKE_PATTERN)?,
        })
    }
}

impl StubCatalog {
    /// Scan one `.php` file, or every `.php` file under a directory in sorted
    /// path order. The first declaration of a name wins.
    pub fn from_path(path: &Path) -> Result<Self> {
        let patterns = Patterns::compile()?;
        let files = collect_php_files(path)?;
        trace(&format!("stub catalog: scanning {} files under {}", files.len(), path.display()));

        let mut catalog = Self::default();
        let mut seen = HashSet::new();
        for file in &files {
            let source = fs::read_to_string(file).map_err(|e| {
                GenerateError::Enumeration(format!("failed to read stub {}: {}", file.display(), e))
            })?;
            catalog.scan(&patterns, &source, &mut seen);
        }
        trace(&format!("stub catalog: {} functions declared", catalog.len()));
        Ok(catalog)
    }

    /// Scan a single in-memory stub source.
    pub fn parse(source: &str) -> Result<Self> {
        let patterns = Patterns::compile()?;
        let mut catalog = Self::default();
        catalog.scan(&patterns, source, &mut HashSet::new());
        Ok(catalog)
    }

    fn scan(&mut self, patterns: &Patterns, source: &str, seen: &mut HashSet<String>) {
        let text = strip_noise(source);

        let namespaces: Vec<(usize, String)> = patterns
            .namespace
            .captures_iter(&text)
            .map(|caps| {
                let start = caps.get(0).map_or(0, |m| m.start());
                let name = caps.get(1).map_or("", |m| m.as_str());
                (start, name.trim_matches(NAMESPACE_SEPARATOR).to_string())
            })
            .collect();

        let class_bodies: Vec<(usize, usize)> = patterns
            .class_like
            .find_iter(&text)
            .map(|m| {
                let open = m.end() - 1;
                (open, matching_close(&text, open).unwrap_or(text.len()))
            })
            .collect();

        for caps in patterns.function.captures_iter(&text) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if class_bodies.iter().any(|&(open, close)| whole.start() > open && whole.start() < close) {
                continue;
            }

            let namespace = namespaces
                .iter()
                .rev()
                .find(|(start, _)| *start < whole.start())
                .map_or("", |(_, ns)| ns.as_str());
            let qualified = if namespace.is_empty() {
                name.as_str().to_string()
            } else {
                format!("{}{}{}", namespace, NAMESPACE_SEPARATOR, name.as_str())
            };
            if !seen.insert(qualified.to_ascii_lowercase()) {
                continue;
            }

            let open = whole.end() - 1;
            let params = match matching_close(&text, open) {
                Some(close) => Ok(text[open + 1..close].to_string()),
                None => Err("unbalanced parameter list".to_string()),
            };
            self.index.insert(qualified.clone(), self.functions.len());
            self.functions.push(StubFunction { name: qualified, params });
        }
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl CatalogSource for StubCatalog {
    fn names(&self) -> Result<Vec<String>> {
        Ok(self.functions.iter().map(|f| f.name.clone()).collect())
    }

    fn reflect(&self, name: &str) -> Result<Vec<ParameterDescriptor>> {
        let function = self
            .index
            .get(name)
            .map(|&i| &self.functions[i])
            .ok_or_else(|| GenerateError::reflection(name, "function is not in the catalog"))?;
        let text = function
            .params
            .as_ref()
            .map_err(|msg| GenerateError::reflection(name, msg.clone()))?;

        split_top_level(text, ',')
            .into_iter()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .enumerate()
            .map(|(position, part)| parse_parameter(position, part).map_err(|msg| GenerateError::reflection(name, msg)))
            .collect()
    }
}

/// `.php` files under `path` in sorted order. Symlinks are not followed.
fn collect_php_files(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let walker = WalkBuilder::new(path)
        .standard_filters(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| {
            GenerateError::Enumeration(format!("failed to read {}: {}", path.display(), e))
        })?;
        let is_file = entry.file_type().is_some_and(|t| t.is_file());
        if is_file && entry.path().extension().is_some_and(|ext| ext == "php") {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

// ─── Parameter parsing ────────────────────────────────────────────────────────

fn parse_parameter(position: usize, text: &str) -> std::result::Result<ParameterDescriptor, String> {
    let parts = split_top_level(text, '=');
    let decl = parts[0].trim();
    let default = if parts.len() > 1 {
        // Everything after the first top-level `=`
        Some(text[parts[0].len() + 1..].trim())
    } else {
        None
    };

    let dollar = decl
        .rfind('$')
        .ok_or_else(|| format!("parameter #{} has no `$name`: {}", position, text))?;
    let name = decl[dollar + 1..].trim();
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(format!("parameter #{} has an invalid name: {}", position, text));
    }

    let mut head = decl[..dollar].trim_end();
    let variadic = head.ends_with("...");
    if variadic {
        head = head[..head.len() - 3].trim_end();
    }
    let by_reference = head.ends_with('&');
    if by_reference {
        head = head[..head.len() - 1].trim_end();
    }
    let type_hint = head.trim();

    let mut param = match default {
        Some(d) if d.is_empty() => return Err(format!("parameter #{} has an empty default", position)),
        Some(d) => ParameterDescriptor::optional(position, name, Some(d)),
        None => ParameterDescriptor::required(position, name),
    };
    if !type_hint.is_empty() {
        param = param.with_type(type_hint);
    }
    if by_reference {
        param = param.by_reference();
    }
    if variadic {
        param = param.variadic();
    }
    Ok(param)
}

// ─── Lexical helpers ──────────────────────────────────────────────────────────

/// Remove comments and `#[...]` attributes, keeping string literals and
/// newlines intact.
fn strip_noise(source: &str) -> String {
    let chars: Vec<char> = source.chars().collect();
    let mut out = String::with_capacity(source.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        match c {
            '\'' | '"' => {
                let end = skip_string(&chars, i);
                out.extend(&chars[i..end]);
                i = end;
            }
            '/' if next == Some('*') => {
                i += 2;
                while i < chars.len() && !(chars[i] == '*' && chars.get(i + 1) == Some(&'/')) {
                    if chars[i] == '\n' {
                        out.push('\n');
                    }
                    i += 1;
                }
                i = (i + 2).min(chars.len());
                out.push(' ');
            }
            '#' if next == Some('[') => {
                let mut depth = 0usize;
                while i < chars.len() {
                    match chars[i] {
                        '\'' | '"' => {
                            i = skip_string(&chars, i);
                            continue;
                        }
                        '[' => depth += 1,
                        ']' => {
                            depth -= 1;
                            if depth == 0 {
                                i += 1;
                                break;
                            }
                        }
                        '\n' => out.push('\n'),
                        _ => {}
                    }
                    i += 1;
                }
                out.push(' ');
            }
            '/' if next == Some('/') => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            '#' => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }
    out
}

/// Index just past the string literal opening at `start`.
fn skip_string(chars: &[char], start: usize) -> usize {
    let quote = chars[start];
    let mut i = start + 1;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 2,
            c if c == quote => return i + 1,
            _ => i += 1,
        }
    }
    chars.len()
}

/// Byte index of the bracket closing the one at byte index `open`.
fn matching_close(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (i, c) in text[open..].char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => quote = Some(c),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(open + i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split on `sep` where it is outside brackets and string literals.
fn split_top_level(text: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;

    for (i, c) in text.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => quote = Some(c),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            c if c == sep && depth == 0 => {
                parts.push(&text[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    const STUB: &str = r#"<?php

// Start of standard v.8.2

use JetBrains\PhpStorm\Pure;

/**
 * Make a string uppercase
 * @link https://php.net/manual/en/function.strtoupper.php
 */
#[Pure]
function strtoupper(string $string): string {}

function str_replace(
    array|string $search,
    array|string $replace,
    string|array $subject,
    &$count = null
): string|array {}

function explode(string $separator, string $string, int $limit = PHP_INT_MAX): array {}

function array_push(array &$array, mixed ...$values): int {}

function implode(array|string $separator = "", ?array $array = null, ): string {}

function str_pad(string $string, int $length, string $pad_string = " ", int $pad_type = STR_PAD_RIGHT): string {}

function array_fill_keys(array $keys, #[LanguageLevelTypeAware(['8.0' => 'mixed'], default: '')] $value): array {}

function strtoupper(string $other) {}

interface Countable
{
    function count(): int;
}

class ArrayObject
{
    public function getIterator(): Iterator {}
}
"#;

    fn names(catalog: &StubCatalog) -> Vec<String> {
        catalog.names().expect("names")
    }

    #[test]
    fn test_collects_free_functions_only() {
        let catalog = StubCatalog::parse(STUB).expect("parse");
        assert_eq!(
            names(&catalog),
            vec![
                "strtoupper",
                "str_replace",
                "explode",
                "array_push",
                "implode",
                "str_pad",
                "array_fill_keys"
            ]
        );
    }

    #[test]
    fn test_first_declaration_wins() {
        let catalog = StubCatalog::parse(STUB).expect("parse");
        let params = catalog.reflect("strtoupper").expect("reflect");
        assert_eq!(params.len(), 1);
        assert_eq!(params[0].name, "string");
    }

    #[test]
    fn test_parameter_forms() {
        let catalog = StubCatalog::parse(STUB).expect("parse");

        let replace = catalog.reflect("str_replace").expect("reflect");
        assert_eq!(replace.len(), 4);
        assert_eq!(replace[0].render(), "array|string $search");
        assert_eq!(replace[3].render(), "&$count = null");
        assert_eq!(replace.iter().filter(|p| p.required).count(), 3);

        let push = catalog.reflect("array_push").expect("reflect");
        assert_eq!(push[0].render(), "array &$array");
        assert_eq!(push[1].render(), "mixed ...$values");

        let implode = catalog.reflect("implode").expect("reflect");
        assert_eq!(implode.len(), 2, "trailing comma is ignored");
        assert_eq!(implode[0].render(), "array|string $separator = \"\"");
        assert_eq!(implode[1].render(), "?array $array = null");

        let pad = catalog.reflect("str_pad").expect("reflect");
        assert_eq!(pad[2].render(), "string $pad_string = \" \"");

        let fill = catalog.reflect("array_fill_keys").expect("reflect");
        assert_eq!(fill[1].render(), "$value", "attributes are stripped");
    }

    #[test]
    fn test_namespaced_functions_are_qualified() {
        let catalog = StubCatalog::parse(
            "<?php\nnamespace Brotli;\n\nfunction compress(string $data): string|false {}\n",
        )
        .expect("parse");
        assert_eq!(names(&catalog), vec!["Brotli\\compress"]);
    }

    #[test]
    fn test_global_namespace_block() {
        let catalog = StubCatalog::parse(
            "<?php\nnamespace {\n    function wp_die($message = '') {}\n}\n",
        )
        .expect("parse");
        assert_eq!(names(&catalog), vec!["wp_die"]);
    }

    #[test]
    fn test_unbalanced_parameters_fail_on_reflect() {
        let catalog = StubCatalog::parse("<?php\nfunction broken($a, $b\n").expect("parse");
        assert_eq!(names(&catalog), vec!["broken"]);
        let err = catalog.reflect("broken").unwrap_err();
        assert!(matches!(err, GenerateError::Reflection { .. }));
    }

    #[test]
    fn test_split_top_level_respects_nesting_and_strings() {
        assert_eq!(split_top_level("$a = [1, 2], $b = ',', $c", ','), vec!["$a = [1, 2]", " $b = ','", " $c"]);
    }

    #[test]
    fn test_from_path_reads_directory_in_sorted_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::create_dir(dir.path().join("standard")).expect("mkdir");
        fs::write(dir.path().join("standard/b.php"), "<?php\nfunction b_fn($x) {}\n").expect("write");
        fs::write(dir.path().join("a.php"), "<?php\nfunction a_fn() {}\n").expect("write");
        fs::write(dir.path().join("notes.txt"), "function ignored() {}\n").expect("write");

        let catalog = StubCatalog::from_path(dir.path()).expect("scan");
        assert_eq!(names(&catalog), vec!["a_fn", "b_fn"]);
    }

    #[test]
    fn test_lookup_by_name() {
        let catalog = StubCatalog::parse(STUB).expect("parse");
        let listed = names(&catalog);
        let last = listed.last().expect("non-empty");
        assert!(catalog.reflect(last).is_ok());

        let err = catalog.reflect("not_declared").unwrap_err();
        assert!(matches!(err, GenerateError::Reflection { ref function, .. } if function == "not_declared"));
    }

    #[cfg(unix)]
    #[test]
    fn test_from_path_does_not_follow_symlink_cycles() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("a.php"), "<?php\nfunction a_fn() {}\n").expect("write");
        std::os::unix::fs::symlink(dir.path(), dir.path().join("loop")).expect("symlink");

        let files = collect_php_files(dir.path()).expect("walk");
        assert_eq!(files, vec![dir.path().join("a.php")]);
    }

    #[test]
    fn test_from_path_missing_is_enumeration_failure() {
        let err = StubCatalog::from_path(Path::new("/nonexistent/stubs-for-pipe-tests")).unwrap_err();
        assert!(matches!(err, GenerateError::Enumeration(_)));
    }
}
