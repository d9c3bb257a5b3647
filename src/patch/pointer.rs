//! RFC 6901 pointer parsing.

/// Unescapes a single reference token (`~1` → `/`, then `~0` → `~`).
fn unescape_component(component: &str) -> String {
    if !component.contains('~') {
        return component.to_string();
    }
    component.replace("~1", "/").replace("~0", "~")
}

/// Splits a pointer into its reference tokens.
///
/// The empty pointer addresses the whole document and yields no tokens. A
/// pointer without the leading `/` is read as if it had one, since patch
/// clients commonly send `Email` for `/Email`.
pub(crate) fn parse_pointer(pointer: &str) -> Vec<String> {
    if pointer.is_empty() {
        return Vec::new();
    }
    let body = pointer.strip_prefix('/').unwrap_or(pointer);
    body.split('/').map(unescape_component).collect()
}
