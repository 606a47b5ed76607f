//! Syntactic validation of long URLs.
//!
//! A long URL is accepted when it parses as an absolute `http` or `https` URL
//! with a host and fits the storage column. The input is stored exactly as
//! given; nothing is normalized.

use url::Url;

use crate::error::AppError;

/// Maximum accepted long URL length, in characters.
pub const MAX_URL_LENGTH: usize = 2048;

/// Reasons a long URL is rejected.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum UrlValidationError {
    #[error("URL is empty")]
    Empty,

    #[error("URL is {0} characters long (max {MAX_URL_LENGTH})")]
    TooLong(usize),

    #[error("URL has leading or trailing whitespace")]
    SurroundingWhitespace,

    #[error("URL contains a control character")]
    ControlCharacter,

    #[error("URL contains a backslash")]
    Backslash,

    #[error("URL must start with 'http://' or 'https://'")]
    MissingAuthority,

    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS protocols are allowed, got '{0}'")]
    UnsupportedScheme(String),

    #[error("URL has no host")]
    MissingHost,
}

impl From<UrlValidationError> for AppError {
    fn from(e: UrlValidationError) -> Self {
        match e {
            UrlValidationError::Empty => AppError::MissingField { field: "long_url" },
            other => AppError::InvalidUrlFormat {
                reason: other.to_string(),
            },
        }
    }
}

/// Checks that `input` is a well-formed absolute HTTP/HTTPS URL.
///
/// # Errors
///
/// Returns [`UrlValidationError::Empty`] for an empty string and another
/// variant describing the first problem found otherwise.
///
/// # Examples
///
/// ```
/// use tinylink::utils::url_validator::validate_long_url;
///
/// assert!(validate_long_url("https://www.example.com").is_ok());
/// assert!(validate_long_url("htp://invalid-url").is_err());
/// assert!(validate_long_url("not-a-url").is_err());
/// ```
pub fn validate_long_url(input: &str) -> Result<(), UrlValidationError> {
    if input.is_empty() {
        return Err(UrlValidationError::Empty);
    }

    let length = input.chars().count();
    if length > MAX_URL_LENGTH {
        return Err(UrlValidationError::TooLong(length));
    }

    // The parser silently strips surrounding whitespace; the stored value must
    // be the exact input, so refuse it instead.
    if input.trim() != input {
        return Err(UrlValidationError::SurroundingWhitespace);
    }

    // The parser drops tabs and newlines and reads `\` as `/` for http(s),
    // so these would be accepted in a form other than the stored one.
    if input.chars().any(char::is_control) {
        return Err(UrlValidationError::ControlCharacter);
    }
    if input.contains('\\') {
        return Err(UrlValidationError::Backslash);
    }

    let url = Url::parse(input).map_err(|e| UrlValidationError::InvalidFormat(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(UrlValidationError::UnsupportedScheme(other.to_string())),
    }

    // `http:host`, `https:/host` and `https:///host` all parse to an authority.
    if !has_literal_authority(input) {
        return Err(UrlValidationError::MissingAuthority);
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(()),
        _ => Err(UrlValidationError::MissingHost),
    }
}

/// True if the scheme is followed by exactly `//`.
fn has_literal_authority(input: &str) -> bool {
    input
        .split_once(':')
        .is_some_and(|(_, rest)| rest.starts_with("//") && !rest.starts_with("///"))
}
