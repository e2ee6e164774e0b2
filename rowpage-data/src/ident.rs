//! SQL identifier validation and quoting.

use crate::error::DataError;

/// Check a (possibly dotted) identifier such as `name` or `u.created_at`.
pub fn is_valid_identifier(ident: &str) -> bool {
    !ident.is_empty() && ident.split('.').all(is_valid_segment)
}

fn is_valid_segment(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub fn check_identifier(ident: &str, kind: &'static str) -> Result<(), DataError> {
    if is_valid_identifier(ident) {
        Ok(())
    } else {
        Err(DataError::contract(format!("invalid {kind} identifier: {ident}")))
    }
}

/// Double-quote each segment of a dotted identifier, doubling any embedded
/// quote characters.
pub fn quote_identifier(ident: &str) -> String {
    ident
        .split('.')
        .map(|part| format!("\"{}\"", part.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(".")
}
