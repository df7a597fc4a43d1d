//! Token estimation

/// Rough token count for logging prompt sizes: characters / 4.
///
/// Counts Unicode scalar values rather than bytes so multi-byte text (CJK,
/// emoji) is not over-counted.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count() / 4
}
