//! Allow-list sanitizer for author-supplied table and column names.
//!
//! Names from assignment documents reach the engine catalog only after passing
//! through [`sanitize_identifier`]. The output alphabet is `[a-z0-9_]`; the
//! engine folds unquoted identifiers to lowercase, so lowercasing here keeps
//! `SELECT createdAt ...` resolving against a column declared as `createdAt`.

use crate::errors::IdentifierError;

/// Upper bound shared with PostgreSQL's NAMEDATALEN - 1.
pub const MAX_IDENTIFIER_LEN: usize = 63;

/// Reduce `raw` to a safe identifier.
///
/// Characters outside `[A-Za-z0-9_]` are stripped, letters are lowercased.
///
/// # Errors
/// - the result is empty
/// - the result starts with a digit
/// - the result is longer than [`MAX_IDENTIFIER_LEN`]
pub fn sanitize_identifier(raw: &str) -> Result<String, IdentifierError> {
    let sanitized: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .map(|c| c.to_ascii_lowercase())
        .collect();

    if sanitized.is_empty() {
        return Err(IdentifierError::Empty(raw.to_string()));
    }

    if sanitized.starts_with(|c: char| c.is_ascii_digit()) {
        return Err(IdentifierError::LeadingDigit {
            raw: raw.to_string(),
            sanitized,
        });
    }

    if sanitized.len() > MAX_IDENTIFIER_LEN {
        return Err(IdentifierError::TooLong {
            raw: raw.to_string(),
            max: MAX_IDENTIFIER_LEN,
        });
    }

    Ok(sanitized)
}
