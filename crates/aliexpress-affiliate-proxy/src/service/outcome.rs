//! How a single call was answered.

use crate::config::ConfigurationError;
use crate::model::Payload;
use crate::signing::SignatureError;
use crate::upstream::UpstreamError;

/// Errors surfaced to the caller as `success: false`. Never mocked.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ServiceError {
    #[error("request could not be signed: {0}")]
    Signature(#[from] SignatureError),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl ServiceError {
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::Signature(_) => "SIGNATURE_ERROR",
            ServiceError::InvalidArgument(_) => "INVALID_ARGUMENT",
        }
    }
}

/// Why a call was answered with generated data.
#[derive(Debug, Clone, PartialEq)]
pub enum MockReason {
    Forced,
    Misconfigured(ConfigurationError),
    UpstreamFailure(UpstreamError),
}

impl MockReason {
    /// Short label used in metadata and metrics.
    pub fn cause(&self) -> &'static str {
        match self {
            MockReason::Forced => "forced",
            MockReason::Misconfigured(_) => "configuration",
            MockReason::UpstreamFailure(_) => "upstream",
        }
    }

    pub fn describe(&self) -> String {
        match self {
            MockReason::Forced => "mock mode is forced by configuration".to_string(),
            MockReason::Misconfigured(e) => format!("service is not configured: {e}"),
            MockReason::UpstreamFailure(e) => format!("affiliate API unavailable: {e}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Real {
        payload: Payload,
        upstream_request_id: Option<String>,
    },
    Mock {
        payload: Payload,
        reason: MockReason,
    },
}

impl Outcome {
    pub fn payload(&self) -> &Payload {
        match self {
            Outcome::Real { payload, .. } | Outcome::Mock { payload, .. } => payload,
        }
    }

    pub fn is_mock(&self) -> bool {
        matches!(self, Outcome::Mock { .. })
    }
}
