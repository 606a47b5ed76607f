//! DTOs for the shortening endpoint.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AppError;

/// Request body for `POST /api/shorten`.
///
/// `long_url` is kept as raw JSON so a wrongly typed value can be told apart
/// from a missing one.
#[derive(Debug, Default, Deserialize)]
pub struct ShortenRequest {
    #[serde(default)]
    pub long_url: Option<Value>,
}

impl ShortenRequest {
    /// Extracts `long_url` as a string.
    ///
    /// # Errors
    ///
    /// - [`AppError::MissingField`] if absent or `null`
    /// - [`AppError::InvalidType`] if present but not a string
    pub fn into_long_url(self) -> Result<String, AppError> {
        match self.long_url {
            None | Some(Value::Null) => Err(AppError::MissingField { field: "long_url" }),
            Some(Value::String(url)) => Ok(url),
            Some(_) => Err(AppError::InvalidType {
                field: "long_url",
                expected: "string",
            }),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ShortenResponse {
    pub short_url: String,
    pub short_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> ShortenRequest {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_string_url_is_extracted() {
        let url = parse(r#"{"long_url": "https://example.com"}"#)
            .into_long_url()
            .unwrap();
        assert_eq!(url, "https://example.com");
    }

    #[test]
    fn test_missing_and_null_are_missing_field() {
        for body in ["{}", r#"{"long_url": null}"#, r#"{"url": "https://example.com"}"#] {
            let err = parse(body).into_long_url().unwrap_err();
            assert!(matches!(err, AppError::MissingField { field: "long_url" }));
        }
    }

    #[test]
    fn test_non_string_is_invalid_type() {
        for body in [r#"{"long_url": 42}"#, r#"{"long_url": ["a"]}"#, r#"{"long_url": true}"#] {
            let err = parse(body).into_long_url().unwrap_err();
            assert!(matches!(err, AppError::InvalidType { .. }));
        }
    }
}
