//! Approximate alphanumeric ordering for display.
//!
//! Stops and routes are ordered by a *weak key*: the sum of the UTF-16 code
//! units of a short prefix of their display text. This is not a
//! lexicographic order. `"AC"` and `"BB"` have the same key, and a longer
//! tag can sort before a shorter one (`"N"` = 78 comes before `"33"` = 102).
//! Existing displays depend on this exact ordering, so it is kept as-is.
//!
//! All sorting here is stable: items with equal keys keep their relative
//! insertion order.

/// Number of leading characters of a route tag that contribute to its key.
pub const ROUTE_KEY_CHARS: usize = 3;

/// Number of leading characters of a stop title that contribute to its key.
pub const STOP_KEY_CHARS: usize = 4;

/// Sum of the UTF-16 code units of the first `prefix` units of `text`.
pub fn weak_key(text: &str, prefix: usize) -> u32 {
    text.encode_utf16().take(prefix).map(u32::from).sum()
}

/// Stable-sort `items` ascending by the weak key of the text `key_text`
/// selects from each item.
pub fn sort_by_weak_key<T>(items: &mut [T], prefix: usize, key_text: impl Fn(&T) -> &str) {
    items.sort_by_key(|item| weak_key(key_text(item), prefix));
}
