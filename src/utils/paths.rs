//! Path normalization

/// Use forward slashes so paths read the same on every platform.
pub fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
}
