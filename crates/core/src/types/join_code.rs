//! Household join code type.

use core::fmt;

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`JoinCode`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum JoinCodeError {
    /// The input string is empty (after trimming).
    #[error("join code cannot be empty")]
    Empty,
    /// The input does not have the expected number of characters.
    #[error("join code must be exactly {expected} characters")]
    InvalidLength {
        /// Required length.
        expected: usize,
    },
    /// The input contains something other than ASCII letters and digits.
    #[error("join code may only contain letters and digits")]
    InvalidCharacter,
}

/// A short, human-enterable household join code.
///
/// Freshly generated codes use a 32-symbol alphabet without the easily
/// confused characters `I`, `O`, `0` and `1`. Parsing is more lenient: user
/// input is trimmed and uppercased, and any 6-character ASCII alphanumeric
/// string is accepted so that lookups of mistyped codes simply miss.
///
/// ## Examples
///
/// ```
/// use petcare_core::JoinCode;
///
/// let code = JoinCode::parse("  abc234 ").unwrap();
/// assert_eq!(code.as_str(), "ABC234");
///
/// assert!(JoinCode::parse("").is_err());
/// assert!(JoinCode::parse("ABC").is_err());
/// assert!(JoinCode::parse("AB-234").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct JoinCode(String);

impl JoinCode {
    /// Number of characters in a join code.
    pub const LENGTH: usize = 6;

    /// Symbols used for generated codes.
    pub const ALPHABET: &'static [u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

    /// Generate a random join code from [`Self::ALPHABET`].
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let code = (0..Self::LENGTH)
            .filter_map(|_| Self::ALPHABET.choose(rng))
            .map(|&b| char::from(b))
            .collect();
        Self(code)
    }

    /// Parse a join code from user input.
    ///
    /// Surrounding whitespace is removed and letters are uppercased.
    ///
    /// # Errors
    ///
    /// Returns an error if the normalized input:
    /// - Is empty
    /// - Is not exactly 6 characters long
    /// - Contains characters other than ASCII letters and digits
    pub fn parse(s: &str) -> Result<Self, JoinCodeError> {
        let normalized = s.trim().to_ascii_uppercase();

        if normalized.is_empty() {
            return Err(JoinCodeError::Empty);
        }

        if !normalized.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(JoinCodeError::InvalidCharacter);
        }

        if normalized.len() != Self::LENGTH {
            return Err(JoinCodeError::InvalidLength {
                expected: Self::LENGTH,
            });
        }

        Ok(Self(normalized))
    }

    /// Returns the join code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `JoinCode` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for JoinCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for JoinCode {
    type Err = JoinCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for JoinCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with sqlite feature)
#[cfg(feature = "sqlite")]
impl sqlx::Type<sqlx::Sqlite> for JoinCode {
    fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
        <String as sqlx::Type<sqlx::Sqlite>>::type_info()
    }

    fn compatible(ty: &sqlx::sqlite::SqliteTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Sqlite>>::compatible(ty)
    }
}

#[cfg(feature = "sqlite")]
impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for JoinCode {
    fn decode(value: sqlx::sqlite::SqliteValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Sqlite>>::decode(value)?;
        // Database values are assumed valid
        Ok(Self(s))
    }
}

#[cfg(feature = "sqlite")]
impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for JoinCode {
    fn encode_by_ref(
        &self,
        buf: &mut <sqlx::Sqlite as sqlx::Database>::ArgumentBuffer<'q>,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Sqlite>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_uses_alphabet_and_length() {
        let mut rng = rand::rng();
        for _ in 0..200 {
            let code = JoinCode::generate(&mut rng);
            assert_eq!(code.as_str().len(), JoinCode::LENGTH);
            assert!(
                code.as_str()
                    .bytes()
                    .all(|b| JoinCode::ALPHABET.contains(&b))
            );
        }
    }

    #[test]
    fn test_alphabet_excludes_ambiguous_characters() {
        assert_eq!(JoinCode::ALPHABET.len(), 32);
        for ambiguous in [b'I', b'O', b'0', b'1'] {
            assert!(!JoinCode::ALPHABET.contains(&ambiguous));
        }
    }

    #[test]
    fn test_generated_code_parses() {
        let code = JoinCode::generate(&mut rand::rng());
        assert_eq!(JoinCode::parse(code.as_str()).unwrap(), code);
    }

    #[test]
    fn test_parse_normalizes_case_and_whitespace() {
        let code = JoinCode::parse("\tzoo123 \n").unwrap();
        assert_eq!(code.as_str(), "ZOO123");
    }

    #[test]
    fn test_parse_accepts_codes_outside_generation_alphabet() {
        // Lookups of codes containing 0/O/1/I must still reach the database.
        assert!(JoinCode::parse("HHC0DE").is_ok());
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(JoinCode::parse("   "), Err(JoinCodeError::Empty));
    }

    #[test]
    fn test_parse_wrong_length() {
        assert_eq!(
            JoinCode::parse("ABCDEFG"),
            Err(JoinCodeError::InvalidLength { expected: 6 })
        );
    }

    #[test]
    fn test_parse_rejects_symbols() {
        assert_eq!(
            JoinCode::parse("ABC-12"),
            Err(JoinCodeError::InvalidCharacter)
        );
        assert_eq!(
            JoinCode::parse("ÄBC123"),
            Err(JoinCodeError::InvalidCharacter)
        );
    }
}
