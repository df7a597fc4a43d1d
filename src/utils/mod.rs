//! Small shared helpers

pub mod paths;
pub mod tokens;

pub use paths::normalize_path;
pub use tokens::estimate_tokens;

/// Format an integer with thousands separators (`1234567` → `1,234,567`).
pub fn format_with_commas(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
