//! Human-readable document numbers.

use super::kind::DocumentKind;

/// Number that follows the highest one issued so far.
#[must_use]
pub fn next_number(last_issued: Option<i64>) -> i64 {
    last_issued.map_or(1, |last| last.saturating_add(1))
}

/// Formats `prefix` + `number`, zero padded to the kind's width.
///
/// ```
/// use khata_core::document::{DocumentKind, format_document_number};
///
/// assert_eq!(format_document_number(DocumentKind::PosSale, "POS-", 42), "POS-000042");
/// assert_eq!(format_document_number(DocumentKind::SalesInvoice, "INV-", 42), "INV-42");
/// ```
#[must_use]
pub fn format_document_number(kind: DocumentKind, prefix: &str, number: i64) -> String {
    let width = kind.number_width();
    format!("{prefix}{number:0width$}")
}

/// Resolves the prefix for a new document, falling back to the kind's default.
#[must_use]
pub fn resolve_prefix(kind: DocumentKind, requested: Option<&str>) -> String {
    match requested.map(str::trim) {
        Some(prefix) if !prefix.is_empty() => prefix.to_string(),
        _ => kind.default_prefix().to_string(),
    }
}
