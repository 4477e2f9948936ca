//! Output file naming.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// `<slug>_summary_<timestamp>.pdf`.
///
/// The slug keeps ASCII letters, digits and whitespace, turns whitespace runs
/// into `_` and lowercases. The timestamp is ISO-8601 UTC with millisecond
/// precision, `:` and `.` replaced by `-` so it is safe on every filesystem.
pub fn pdf_filename(title: &str, at: DateTime<Utc>) -> String {
    let kept: String = title
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .collect();
    let slug = RE_WHITESPACE.replace_all(&kept, "_").to_lowercase();
    let timestamp = at.format("%Y-%m-%dT%H-%M-%S-%3fZ");
    format!("{slug}_summary_{timestamp}.pdf")
}
