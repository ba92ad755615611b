// utils.rs

/// Parses a request value as a signed decimal integer. Surrounding
/// whitespace is not accepted.
pub fn parse_value(raw: Option<&str>) -> Option<i64> {
    raw?.parse().ok()
}
