//! Extension kit error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EdkError {
    #[error("host call failed: {0}")]
    Host(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("handler failed: {0}")]
    Handler(String),

    #[error("socket error: {0}")]
    Socket(String),

    #[error("invalid character: {0}")]
    InvalidCharacter(String),

    #[error("invalid base64: {0}")]
    InvalidBase64(String),

    #[error("unsupported digest algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },
}

impl EdkError {
    /// Wrap any displayable failure raised inside an event handler.
    pub fn handler(err: impl std::fmt::Display) -> Self {
        Self::Handler(err.to_string())
    }
}

impl From<url::ParseError> for EdkError {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}

impl From<base64::DecodeError> for EdkError {
    fn from(err: base64::DecodeError) -> Self {
        Self::InvalidBase64(err.to_string())
    }
}

#[cfg(target_arch = "wasm32")]
impl From<extism_pdk::Error> for EdkError {
    fn from(err: extism_pdk::Error) -> Self {
        Self::Host(err.to_string())
    }
}

pub type Result<T, E = EdkError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    // ── Display messages ──────────────────────────────────────────────

    #[test]
    fn test_display_host() {
        let err = EdkError::Host("send_main_command trapped".into());
        assert_eq!(err.to_string(), "host call failed: send_main_command trapped");
    }

    #[test]
    fn test_display_socket() {
        let err = EdkError::Socket("open_clientfd returned -1".into());
        assert_eq!(err.to_string(), "socket error: open_clientfd returned -1");
    }

    #[test]
    fn test_display_http_status() {
        let err = EdkError::HttpStatus {
            status: 404,
            body: "not found".into(),
        };
        assert_eq!(err.to_string(), "HTTP 404: not found");
    }

    #[test]
    fn test_display_unsupported_algorithm() {
        let err = EdkError::UnsupportedAlgorithm("MD5".into());
        assert_eq!(err.to_string(), "unsupported digest algorithm: MD5");
    }

    #[test]
    fn test_handler_helper() {
        let err = EdkError::handler("boom");
        assert!(matches!(err, EdkError::Handler(ref m) if m == "boom"));
    }

    // ── From conversions ──────────────────────────────────────────────

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<String>("bad json{{{").unwrap_err();
        let err: EdkError = json_err.into();
        assert!(matches!(err, EdkError::Serialization(_)));
    }

    #[test]
    fn test_from_url_error() {
        let url_err = url::Url::parse("not a url").unwrap_err();
        let err: EdkError = url_err.into();
        assert!(matches!(err, EdkError::InvalidUrl(_)));
    }

    #[test]
    fn test_from_decode_error() {
        use base64::Engine;
        let decode_err = base64::engine::general_purpose::STANDARD
            .decode("@@@@")
            .unwrap_err();
        let err: EdkError = decode_err.into();
        assert!(matches!(err, EdkError::InvalidBase64(_)));
    }

    // ── Error trait source chain ──────────────────────────────────────

    #[test]
    fn test_error_source_serialization() {
        use std::error::Error;
        let json_err = serde_json::from_str::<u8>("x").unwrap_err();
        let err: EdkError = json_err.into();
        assert!(err.source().is_some());
    }

    #[test]
    fn test_error_source_string_variants() {
        use std::error::Error;
        let err = EdkError::InvalidCharacter("bad".into());
        assert!(err.source().is_none());
    }
}
