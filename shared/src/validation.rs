//! Request validation utilities
//!
//! Form fields arrive as strings; these helpers turn them into typed request
//! parameters and build safe download filenames.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Validate the supplier name is present
pub fn validate_supplier_name(name: &str) -> Result<(), &'static str> {
    if name.trim().is_empty() {
        return Err("supplier_name is required");
    }
    Ok(())
}

/// Parse months of cover as a non-negative integer
pub fn parse_months_of_cover(value: &str) -> Result<u32, &'static str> {
    let value = value.trim();
    if value.is_empty() {
        return Err("months_of_cover is required");
    }
    match value.parse::<i64>() {
        Ok(n) if n < 0 => Err("months_of_cover cannot be negative"),
        Ok(n) => u32::try_from(n).map_err(|_| "months_of_cover is too large"),
        Err(_) => Err("months_of_cover must be an integer"),
    }
}

/// Split a comma-separated month list
///
/// Blank entries are dropped; an empty list means "use every month column".
pub fn parse_months_to_average(value: Option<&str>) -> Option<Vec<String>> {
    let months: Vec<String> = value?
        .split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect();

    if months.is_empty() {
        None
    } else {
        Some(months)
    }
}

/// Reduce a name to characters safe for a download filename
///
/// Accents are folded to ASCII, other non-ASCII characters are dropped, path
/// separators and whitespace become `_`, and anything outside `[A-Za-z0-9_.-]`
/// is removed.
pub fn sanitize_filename(name: &str) -> String {
    let ascii: String = name
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .filter(char::is_ascii)
        .map(|c| if matches!(c, '/' | '\\') { ' ' } else { c })
        .collect();

    ascii
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect::<String>()
        .trim_matches(|c| c == '.' || c == '_')
        .to_string()
}

/// Download filename for a generated purchase request
pub fn output_filename(supplier_name: &str, months_of_cover: u32, extension: &str) -> String {
    format!(
        "purchase_request_{}_{}months.{}",
        sanitize_filename(supplier_name),
        months_of_cover,
        extension
    )
}
