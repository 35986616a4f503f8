//! Escaping for Graphviz DOT output.

/// Escape `s` for use inside a quoted DOT label.
///
/// Record-shape metacharacters (`<`, `>`, `{`, `}`, `|`) are escaped too, so pseudocode such as
/// `switch (i) { case 0: ... }` survives any node shape. Carriage returns are dropped.
#[must_use]
pub(crate) fn escape_dot(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\r' => {}
            '\n' => out.push_str("\\n"),
            '\\' | '"' | '<' | '>' | '{' | '}' | '|' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}
