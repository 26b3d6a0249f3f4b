use serde::Serialize;
use thiserror::Error;

pub const MISSING_NAME_MESSAGE: &str =
    "Name parameter is required. Please provide a valid name parameter.";

#[derive(Debug, Error)]
pub enum AvatarError {
    /// The request carried no usable `name`.
    #[error("{}", MISSING_NAME_MESSAGE)]
    MissingName,

    /// An empty name reached letter extraction. Unreachable through the normalizer.
    #[error("cannot extract letters from an empty name")]
    EmptyName,

    #[error("invalid color catalog: {0}")]
    Catalog(String),

    #[error("font error: {0}")]
    Font(String),

    #[error("failed to parse generated SVG: {0}")]
    Svg(#[from] usvg::Error),

    #[error("render failed: {0}")]
    Render(String),

    #[error("failed to encode image: {0}")]
    Encode(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AvatarError>;

/// Response object handed to whoever fronts the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub status_code: u16,
    pub error: &'static str,
    pub message: String,
}

impl AvatarError {
    pub fn is_client_error(&self) -> bool {
        matches!(self, AvatarError::MissingName)
    }

    pub fn status_code(&self) -> u16 {
        if self.is_client_error() { 400 } else { 500 }
    }

    pub fn body(&self) -> ErrorBody {
        let status_code = self.status_code();
        let error = if status_code == 400 {
            "Bad Request"
        } else {
            "Internal Server Error"
        };
        ErrorBody {
            status_code,
            error,
            message: self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_name_is_a_bad_request() {
        let body = AvatarError::MissingName.body();
        assert_eq!(body.status_code, 400);
        assert_eq!(body.error, "Bad Request");
        assert_eq!(body.message, MISSING_NAME_MESSAGE);
    }

    #[test]
    fn render_failure_is_a_server_error() {
        let err = AvatarError::Render("empty buffer".to_string());
        assert!(!err.is_client_error());
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.body().error, "Internal Server Error");
    }

    #[test]
    fn body_serializes_camel_case() {
        let json = serde_json::to_value(AvatarError::MissingName.body()).unwrap();
        assert_eq!(json["statusCode"], 400);
        assert_eq!(json["error"], "Bad Request");
        assert!(json["message"].as_str().unwrap().contains("Name parameter"));
    }
}
