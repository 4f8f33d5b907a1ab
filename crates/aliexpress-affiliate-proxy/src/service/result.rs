//! The response shape every caller depends on.

use super::outcome::{Outcome, ServiceError};
use crate::model::Payload;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResultMetadata {
    pub request_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub processing_time_ms: u64,
    /// Upstream method the call maps to
    pub method: String,
    pub mock_mode: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mock_mode_reason: Option<String>,
    /// `forced`, `configuration` or `upstream`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mock_mode_cause: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upstream_request_id: Option<String>,
}

impl ResultMetadata {
    fn new(method: &str, elapsed: Duration) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            processing_time_ms: elapsed.as_millis() as u64,
            method: method.to_string(),
            mock_mode: false,
            mock_mode_reason: None,
            mock_mode_cause: None,
            upstream_request_id: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NormalizedResult {
    pub success: bool,
    pub data: Option<Payload>,
    pub error: Option<ErrorBody>,
    pub metadata: ResultMetadata,
}

impl NormalizedResult {
    pub fn from_outcome(method: &str, outcome: Outcome, elapsed: Duration) -> Self {
        let mut metadata = ResultMetadata::new(method, elapsed);
        let payload = match outcome {
            Outcome::Real {
                payload,
                upstream_request_id,
            } => {
                metadata.upstream_request_id = upstream_request_id;
                payload
            }
            Outcome::Mock { payload, reason } => {
                metadata.mock_mode = true;
                metadata.mock_mode_reason = Some(reason.describe());
                metadata.mock_mode_cause = Some(reason.cause());
                payload
            }
        };

        Self {
            success: true,
            data: Some(payload),
            error: None,
            metadata,
        }
    }

    pub fn failure(method: &str, error: &ServiceError, elapsed: Duration) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ErrorBody {
                code: error.code().to_string(),
                message: error.to_string(),
            }),
            metadata: ResultMetadata::new(method, elapsed),
        }
    }
}
