//! System handlers: health and metrics.

use crate::api::types::*;
use crate::metrics;
use crate::service::{ServiceFacade, ServiceMode};
use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub mode: &'static str,
    pub version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// GET /health
pub fn handle_health(facade: &ServiceFacade) -> Response<Full<Bytes>> {
    let mode = facade.mode();
    let body = HealthResponse {
        status: if mode == ServiceMode::Misconfigured {
            "degraded"
        } else {
            "ok"
        },
        mode: mode.as_str(),
        version: env!("CARGO_PKG_VERSION"),
        reason: facade.configuration_error().map(|e| e.to_string()),
    };
    json_response(StatusCode::OK, &body)
}

/// GET /metrics - Prometheus metrics
pub fn handle_metrics() -> Response<Full<Bytes>> {
    build_response_with_headers(
        StatusCode::OK,
        [("Content-Type", "text/plain; version=0.0.4")],
        metrics::collect_metrics(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigurationError;
    use http_body_util::BodyExt;

    async fn body_json(resp: Response<Full<Bytes>>) -> serde_json::Value {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_ok_in_mock_mode() {
        let resp = handle_health(&ServiceFacade::forced_mock("gpt"));
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["mode"], "mock");
        assert!(body.get("reason").is_none());
    }

    #[tokio::test]
    async fn test_health_degraded_when_misconfigured() {
        let facade = ServiceFacade::misconfigured(
            ConfigurationError::MissingCredentials(vec!["ALIEXPRESS_APP_KEY"]),
            "",
        );
        let body = body_json(handle_health(&facade)).await;
        assert_eq!(body["status"], "degraded");
        assert_eq!(body["mode"], "misconfigured");
        assert!(body["reason"].as_str().unwrap().contains("ALIEXPRESS_APP_KEY"));
    }

    #[test]
    fn test_metrics_content_type() {
        let resp = handle_metrics();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get("Content-Type").unwrap(),
            "text/plain; version=0.0.4"
        );
    }
}
