// PHP source emission for the autocomplete stub.
// Pure rendering: every tag is written, in the order given.

use crate::builder::{DeclarationTag, TagKind};

pub const NAMESPACE: &str = "Serafim\\Pipe";
pub const CLASS_NAME: &str = "Pipe";

/// Return-type annotation of every advertised method.
pub const METHOD_RETURN_TYPE: &str = "Pipe|$this";
/// Value type of every advertised property.
pub const PROPERTY_TYPE: &str = "mixed";

const FILE_DOCBLOCK: &[&str] = &[
    "This file was automatically generated",
    "",
    "@license MIT",
    "@noinspection ALL",
];

const CLASS_SUPPRESSIONS: &[&str] = &[
    "@noinspection AutoloadingIssuesInspection",
    "@noinspection PhpUndefinedClassInspection",
];

/// Doc-block line (without the ` * ` prefix) for one tag.
pub fn tag_line(tag: &DeclarationTag) -> String {
    match tag.kind {
        TagKind::Method => format!(
            "@method {} {}({})",
            METHOD_RETURN_TYPE,
            tag.name,
            tag.signature.as_deref().unwrap_or("")
        ),
        TagKind::PropertyRead => format!("@property-read {} ${}", PROPERTY_TYPE, tag.name),
    }
}

pub fn emit(tags: &[DeclarationTag]) -> String {
    let mut output = String::new();

    output.push_str("<?php\n");
    push_docblock(&mut output, FILE_DOCBLOCK.iter().map(|l| l.to_string()));
    output.push('\n');

    output.push_str(&format!("namespace {};\n\n", NAMESPACE));

    let class_lines = CLASS_SUPPRESSIONS
        .iter()
        .map(|l| l.to_string())
        .chain(tags.iter().map(tag_line));
    push_docblock(&mut output, class_lines);
    output.push_str(&format!("class {}\n{{\n}}\n", CLASS_NAME));

    output
}

fn push_docblock(output: &mut String, lines: impl Iterator<Item = String>) {
    output.push_str("/**\n");
    for line in lines {
        if line.is_empty() {
            output.push_str(" *\n");
        } else {
            output.push_str(" * ");
            output.push_str(&line);
            output.push('\n');
        }
    }
    output.push_str(" */\n");
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMPTY_STUB: &str = "<?php
/**
 * This file was automatically generated
 *
 * @license MIT
 * @noinspection ALL
 */

namespace Serafim\\Pipe;

/**
 * @noinspection AutoloadingIssuesInspection
 * @noinspection PhpUndefinedClassInspection
 */
class Pipe
{
}
";

    #[test]
    fn test_empty_tag_list_emits_bare_class() {
        assert_eq!(emit(&[]), EMPTY_STUB);
    }

    #[test]
    fn test_tag_lines() {
        assert_eq!(
            tag_line(&DeclarationTag::method("strtoupper", "$string")),
            "@method Pipe|$this strtoupper($string)"
        );
        assert_eq!(tag_line(&DeclarationTag::method("pi", "")), "@method Pipe|$this pi()");
        assert_eq!(tag_line(&DeclarationTag::property_read("isArray")), "@property-read mixed $isArray");
    }

    #[test]
    fn test_tags_rendered_in_order_inside_class_docblock() {
        let tags = vec![
            DeclarationTag::method("is_array", "$value"),
            DeclarationTag::method("isArray", "$value"),
            DeclarationTag::property_read("is_array"),
            DeclarationTag::property_read("isArray"),
        ];
        let out = emit(&tags);
        let expected = " * @noinspection PhpUndefinedClassInspection
 * @method Pipe|$this is_array($value)
 * @method Pipe|$this isArray($value)
 * @property-read mixed $is_array
 * @property-read mixed $isArray
 */
class Pipe
";
        assert!(out.contains(expected), "unexpected output:\n{}", out);
    }
}
