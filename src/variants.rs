// Member-name variants for one callable: the raw name, then its
// lower-camel-case spelling when that differs.
// Purely lexical; resolver strategies are applied by the caller.

/// Collapse `-` / `_` word boundaries into lower camel case.
///
/// Each delimiter becomes a word break, the first character of every word is
/// upper-cased (the rest are left alone), breaks are removed, and finally the
/// first character of the result is lower-cased. Case mapping is ASCII only.
pub fn camel(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut word_start = true;

    for ch in name.chars() {
        if ch == '-' || ch == '_' {
            word_start = true;
            continue;
        }
        if word_start {
            out.push(ch.to_ascii_uppercase());
            word_start = false;
        } else {
            out.push(ch);
        }
    }

    lower_first(&out)
}

fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

/// Raw name first, camel derivation second iff it differs from the raw name.
pub fn variants(name: &str) -> Vec<String> {
    with_alias(name, name)
}

/// Like [`variants`], but the camel form is derived from `alias`
/// (a resolved spelling of `name`) instead of `name` itself.
pub fn with_alias(name: &str, alias: &str) -> Vec<String> {
    let mut out = vec![name.to_string()];
    let camel = camel(alias);
    if camel != name {
        out.push(camel);
    }
    out
}
