// Rust keywords (strict and reserved), any of which a parameter may dodge with a trailing underscore.
const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "crate", "do",
    "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "if", "impl", "in", "let", "loop",
    "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref", "return", "self",
    "static", "struct", "super", "trait", "true", "try", "type", "typeof", "unsafe", "unsized", "use",
    "virtual", "where", "while", "yield",
];

/// The command line name of a parameter: `type_` becomes `type`, `max_depth` becomes `max-depth`.
pub(crate) fn to_cli(name: &str) -> String {
    let name = match name.strip_suffix('_') {
        Some(stem) if KEYWORDS.contains(&stem) => stem,
        _ => name,
    };

    name.replace('_', "-")
}

/// Split a `name=value` token, where `name` is an identifier (`[A-Za-z_][A-Za-z0-9_]*`).
pub(crate) fn split_keyword(token: &str) -> Option<(&str, &str)> {
    let (name, value) = token.split_once('=')?;
    let mut characters = name.chars();

    match characters.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return None,
    }

    if characters.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Some((name, value))
    } else {
        None
    }
}
