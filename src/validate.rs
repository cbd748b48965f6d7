//! Entry validation for number fields.
//!
//! Every editable KDF parameter is a non-negative whole number. Anything a
//! user can type that is not a plain digit string is rejected before it
//! reaches the settings, so a half-finished edit never leaks into a commit.

use crate::error::OptionsError;

/// Parses a text entry as a non-negative whole number.
///
/// Accepts only plain digit strings. Empty input, sign prefixes, fractions,
/// whitespace and anything non-numeric fail with [`OptionsError::InvalidNumber`].
///
/// Note that `str::parse::<u64>` alone would accept a leading `+`, so the
/// digit check runs first.
pub fn parse_whole_number(text: &str) -> Result<u64, OptionsError> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(OptionsError::InvalidNumber(text.to_string()));
    }

    text.parse::<u64>()
        .map_err(|_| OptionsError::InvalidNumber(text.to_string()))
}
