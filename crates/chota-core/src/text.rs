//! String helpers for log previews.

/// Truncate `s` to at most `max_bytes` bytes on a char boundary.
#[must_use]
pub fn truncate_str(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Truncate `s` to at most `max_bytes` bytes, ending with `suffix` when cut.
#[must_use]
pub fn truncate_with_suffix(s: &str, max_bytes: usize, suffix: &str) -> String {
    if s.len() <= max_bytes {
        return s.to_string();
    }
    let keep = max_bytes.saturating_sub(suffix.len());
    format!("{}{suffix}", truncate_str(s, keep))
}
