//! Proptest generators for property-based testing.

use proptest::prelude::*;

/// Arbitrary document bytes up to `max_len`.
pub fn document_bytes(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=max_len)
}

/// A reasonable timestamp in milliseconds.
pub fn timestamp_millis() -> impl Strategy<Value = u64> {
    0u64..=4_102_444_800_000
}

/// An organization name, including non-ASCII text.
pub fn organization() -> impl Strategy<Value = String> {
    "[A-Za-z0-9äöüéß&.,' -]{1,40}".prop_map(String::from)
}

/// A 32-byte secret that is a valid secp256k1 key with overwhelming
/// probability (zero is excluded).
pub fn secret_key() -> impl Strategy<Value = [u8; 32]> {
    any::<[u8; 32]>().prop_filter("zero is not a valid key", |k| k.iter().any(|&b| b != 0))
}

/// Rounded rectangle parameters `(x, y, width, height, radius)` that satisfy
/// the path preconditions.
pub fn rounded_rect() -> impl Strategy<Value = (f64, f64, f64, f64, f64)> {
    (
        -500.0f64..500.0,
        -500.0f64..500.0,
        1.0f64..400.0,
        1.0f64..400.0,
        0.0f64..0.49,
    )
        .prop_map(|(x, y, w, h, ratio)| (x, y, w, h, w.min(h) * ratio))
}
