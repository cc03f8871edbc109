//! Inline `style="..."` declarations.

use indexmap::IndexMap;

/// Split a declaration list into ordered `property -> value` pairs. Later duplicates win.
pub fn parse_style(style: &str) -> IndexMap<String, String> {
    let mut out = IndexMap::new();
    for decl in style.split(';') {
        let Some((key, value)) = decl.split_once(':') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim().trim_end_matches("!important").trim();
        if key.is_empty() {
            continue;
        }
        out.insert(key.to_ascii_lowercase(), value.to_string());
    }
    out
}

pub fn format_style(decls: &IndexMap<String, String>) -> String {
    let mut out = String::new();
    for (key, value) in decls {
        out.push_str(key);
        out.push(':');
        out.push_str(value);
        out.push(';');
    }
    out
}
