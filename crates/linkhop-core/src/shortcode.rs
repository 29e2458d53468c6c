use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// The 62 symbols a generated short code is drawn from.
///
/// The order matters for compatibility with codes issued by existing
/// deployments and must not change.
pub const ALPHABET: &[u8; 62] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Shortest code the allocator generates.
pub const GENERATED_MIN_LENGTH: usize = 4;
/// Longest code the allocator generates.
pub const GENERATED_MAX_LENGTH: usize = 6;

const MIN_LENGTH: usize = 1;
const MAX_LENGTH: usize = 32;

/// A short code identifying one stored mapping.
///
/// Codes accepted from the outside world are 1-32 characters from
/// [`ALPHABET`]. Codes produced by the allocator are additionally
/// between [`GENERATED_MIN_LENGTH`] and [`GENERATED_MAX_LENGTH`] long.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShortCode(String);

impl ShortCode {
    /// Creates a new `ShortCode` after validating the input.
    pub fn new(code: impl Into<String>) -> Result<Self, CoreError> {
        let code = code.into();
        Self::validate(&code)?;
        Ok(Self(code))
    }

    /// Creates a `ShortCode` without validation.
    ///
    /// Use this only for codes produced by trusted internal sources
    /// (the allocator's generator, rows read back from the store).
    pub fn new_unchecked(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Generates the full shortened URL based on the provided base URL.
    pub fn to_url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self.0)
    }

    /// Returns the short code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the code has the shape the allocator produces.
    pub fn is_generated_shape(&self) -> bool {
        (GENERATED_MIN_LENGTH..=GENERATED_MAX_LENGTH).contains(&self.0.len())
            && self.0.bytes().all(|b| ALPHABET.contains(&b))
    }

    fn validate(code: &str) -> Result<(), CoreError> {
        if code.len() < MIN_LENGTH || code.len() > MAX_LENGTH {
            return Err(CoreError::InvalidShortCode(format!(
                "length must be between {} and {}, got {}",
                MIN_LENGTH,
                MAX_LENGTH,
                code.len()
            )));
        }

        if !code.bytes().all(|b| ALPHABET.contains(&b)) {
            return Err(CoreError::InvalidShortCode(format!(
                "must contain only ASCII letters and digits: '{}'",
                code
            )));
        }

        Ok(())
    }
}

impl Display for ShortCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ShortCode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alphabet_is_digits_lower_upper() {
        let expected: Vec<u8> = (b'0'..=b'9')
            .chain(b'a'..=b'z')
            .chain(b'A'..=b'Z')
            .collect();
        assert_eq!(ALPHABET.as_slice(), expected.as_slice());
    }

    #[test]
    fn valid_codes() {
        assert!(ShortCode::new("a").is_ok());
        assert!(ShortCode::new("Abc123").is_ok());
        assert!(ShortCode::new("doesNotExist").is_ok());
        assert!(ShortCode::new("a".repeat(32)).is_ok());
    }

    #[test]
    fn too_short() {
        assert!(ShortCode::new("").is_err());
    }

    #[test]
    fn too_long() {
        assert!(ShortCode::new("a".repeat(33)).is_err());
    }

    #[test]
    fn invalid_characters() {
        assert!(ShortCode::new("abc def").is_err());
        assert!(ShortCode::new("abc/def").is_err());
        assert!(ShortCode::new("abc-def").is_err());
        assert!(ShortCode::new("abc_def").is_err());
        assert!(ShortCode::new("caf\u{e9}").is_err());
    }

    #[test]
    fn generated_shape() {
        assert!(ShortCode::new_unchecked("abcd").is_generated_shape());
        assert!(ShortCode::new_unchecked("Z9z0Aa").is_generated_shape());
        assert!(!ShortCode::new_unchecked("abc").is_generated_shape());
        assert!(!ShortCode::new_unchecked("abcdefg").is_generated_shape());
        assert!(!ShortCode::new_unchecked("ab-d").is_generated_shape());
    }

    #[test]
    fn to_url() {
        let code = ShortCode::new("abc123").unwrap();
        assert_eq!(
            code.to_url("http://localhost:5003"),
            "http://localhost:5003/abc123"
        );
        assert_eq!(
            code.to_url("http://localhost:5003/"),
            "http://localhost:5003/abc123"
        );
    }

    #[test]
    fn serializes_as_plain_string() {
        let code = ShortCode::new("xY7q").unwrap();
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"xY7q\"");
    }
}
