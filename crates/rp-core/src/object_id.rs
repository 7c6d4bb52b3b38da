//! Bus-safe identifiers

/// Replace every character outside `[A-Za-z0-9_]` with `_`
///
/// Used to derive topic segments and unique IDs from a free-form label such
/// as `1.2.3.4:28082`. The mapping is character-for-character, so the result
/// is stable for a given label.
pub fn sanitize_object_id(label: &str) -> String {
    label
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
