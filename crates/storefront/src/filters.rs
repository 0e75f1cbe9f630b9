//! Custom Askama template filters.

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Splits text into paragraphs on blank lines.
///
/// Usage in templates: `{% for p in product.description|paragraphs %}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn paragraphs(value: impl Display, _env: &dyn askama::Values) -> askama::Result<Vec<String>> {
    Ok(value
        .to_string()
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect())
}
