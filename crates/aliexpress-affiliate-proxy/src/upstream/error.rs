//! Error type for failed affiliate API calls.

use crate::signing::SignatureError;
use serde_json::Value;
use std::fmt;

/// What went wrong talking to the upstream API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamErrorKind {
    /// Connection refused, DNS failure, TLS failure, reset
    Network,
    /// Client-side timeout elapsed
    Timeout,
    /// Non-2xx HTTP status
    HttpStatus,
    /// Body was not the JSON shape we expect
    Decode,
    /// Upstream answered with an error envelope or a failing `resp_code`
    Envelope,
}

impl UpstreamErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpstreamErrorKind::Network => "network",
            UpstreamErrorKind::Timeout => "timeout",
            UpstreamErrorKind::HttpStatus => "http_status",
            UpstreamErrorKind::Decode => "decode",
            UpstreamErrorKind::Envelope => "envelope",
        }
    }
}

impl fmt::Display for UpstreamErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every upstream failure, normalized to {code, message, raw}.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("upstream {kind} error [{code}]: {message}")]
pub struct UpstreamError {
    pub kind: UpstreamErrorKind,
    pub code: String,
    pub message: String,
    /// Upstream body, when one was received
    pub raw: Option<Value>,
}

impl UpstreamError {
    pub fn new(kind: UpstreamErrorKind, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: code.into(),
            message: message.into(),
            raw: None,
        }
    }

    pub fn with_raw(mut self, raw: Value) -> Self {
        self.raw = Some(raw);
        self
    }

    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::new(UpstreamErrorKind::Timeout, "TIMEOUT", err.to_string())
        } else if err.is_decode() {
            Self::new(UpstreamErrorKind::Decode, "DECODE_ERROR", err.to_string())
        } else {
            Self::new(UpstreamErrorKind::Network, "NETWORK_ERROR", err.to_string())
        }
    }

    pub fn http_status(status: u16, body: &str) -> Self {
        let raw = serde_json::from_str(body)
            .unwrap_or_else(|_| Value::String(body.chars().take(2048).collect()));
        Self::new(
            UpstreamErrorKind::HttpStatus,
            format!("HTTP_{status}"),
            format!("upstream returned HTTP {status}"),
        )
        .with_raw(raw)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(UpstreamErrorKind::Decode, "DECODE_ERROR", message)
    }
}

/// Failure of a single upstream call: either the request could not be signed
/// or the upstream failed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CallError {
    #[error(transparent)]
    Signature(#[from] SignatureError),
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_keeps_json_body() {
        let err = UpstreamError::http_status(503, r#"{"reason": "maintenance"}"#);
        assert_eq!(err.kind, UpstreamErrorKind::HttpStatus);
        assert_eq!(err.code, "HTTP_503");
        assert_eq!(err.raw.unwrap()["reason"], "maintenance");
    }

    #[test]
    fn test_http_status_keeps_text_body() {
        let err = UpstreamError::http_status(502, "<html>bad gateway</html>");
        assert_eq!(err.raw, Some(Value::String("<html>bad gateway</html>".into())));
    }

    #[test]
    fn test_display_includes_kind_and_code() {
        let err = UpstreamError::new(UpstreamErrorKind::Envelope, "isv.InvalidParameter", "bad");
        assert_eq!(
            err.to_string(),
            "upstream envelope error [isv.InvalidParameter]: bad"
        );
    }
}
