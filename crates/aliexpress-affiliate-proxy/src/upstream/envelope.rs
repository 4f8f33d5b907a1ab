//! Unwrapping of the upstream response envelopes.
//!
//! Success bodies nest the result under a key derived from the method name:
//!
//! ```json
//! {"aliexpress_affiliate_product_query_response": {
//!     "resp_result": {"resp_code": 200, "resp_msg": "success", "result": {...}},
//!     "request_id": "..."}}
//! ```
//!
//! Failures arrive as `{"error_response": {"code": ..., "msg": ..., "sub_code": ..., "sub_msg": ...}}`.

use super::error::{UpstreamError, UpstreamErrorKind};
use serde_json::Value;

/// A successful upstream call with its envelope removed.
#[derive(Debug, Clone, PartialEq)]
pub struct RawUpstreamResponse {
    pub payload: Value,
    pub request_id: Option<String>,
}

/// `aliexpress.affiliate.category.get` -> `aliexpress_affiliate_category_get_response`
pub fn response_key(method: &str) -> String {
    format!("{}_response", method.replace('.', "_"))
}

/// Read a scalar field that upstream sends as either a string or a number.
pub(crate) fn scalar_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub fn unwrap_envelope(method: &str, body: Value) -> Result<RawUpstreamResponse, UpstreamError> {
    if let Some(error) = body.get("error_response") {
        let code = scalar_string(error.get("sub_code"))
            .or_else(|| scalar_string(error.get("code")))
            .unwrap_or_else(|| "UNKNOWN".to_string());
        let message = match (
            scalar_string(error.get("msg")),
            scalar_string(error.get("sub_msg")),
        ) {
            (Some(msg), Some(sub)) => format!("{msg}: {sub}"),
            (Some(msg), None) => msg,
            (None, Some(sub)) => sub,
            (None, None) => "upstream reported an error".to_string(),
        };
        return Err(UpstreamError::new(UpstreamErrorKind::Envelope, code, message).with_raw(body));
    }

    let key = response_key(method);
    let Some(envelope) = body.get(&key) else {
        return Err(
            UpstreamError::decode(format!("response is missing the '{key}' envelope"))
                .with_raw(body),
        );
    };

    let request_id = scalar_string(envelope.get("request_id"));

    let Some(resp_result) = envelope.get("resp_result") else {
        return Ok(RawUpstreamResponse {
            payload: envelope.clone(),
            request_id,
        });
    };

    let resp_code = scalar_string(resp_result.get("resp_code"));
    if resp_code.as_deref() != Some("200") {
        let code = resp_code.unwrap_or_else(|| "MISSING_RESP_CODE".to_string());
        let message = scalar_string(resp_result.get("resp_msg"))
            .unwrap_or_else(|| "upstream returned a failing resp_code".to_string());
        return Err(UpstreamError::new(UpstreamErrorKind::Envelope, code, message).with_raw(body));
    }

    Ok(RawUpstreamResponse {
        payload: resp_result.get("result").cloned().unwrap_or(Value::Null),
        request_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const PRODUCT_QUERY: &str = "aliexpress.affiliate.product.query";

    #[test]
    fn test_response_key() {
        assert_eq!(
            response_key("aliexpress.affiliate.category.get"),
            "aliexpress_affiliate_category_get_response"
        );
    }

    #[test]
    fn test_unwraps_result() {
        let body = json!({
            "aliexpress_affiliate_product_query_response": {
                "resp_result": {
                    "resp_code": 200,
                    "resp_msg": "Call succeeds",
                    "result": {"current_record_count": 1, "products": {"product": [{"product_id": 1}]}}
                },
                "request_id": "abc123"
            }
        });

        let raw = unwrap_envelope(PRODUCT_QUERY, body).unwrap();
        assert_eq!(raw.request_id.as_deref(), Some("abc123"));
        assert_eq!(raw.payload["products"]["product"][0]["product_id"], 1);
    }

    #[test]
    fn test_string_resp_code_is_accepted() {
        let body = json!({
            "aliexpress_affiliate_product_query_response": {
                "resp_result": {"resp_code": "200", "result": {"x": 1}}
            }
        });
        let raw = unwrap_envelope(PRODUCT_QUERY, body).unwrap();
        assert_eq!(raw.payload["x"], 1);
        assert!(raw.request_id.is_none());
    }

    #[test]
    fn test_error_response_envelope() {
        let body = json!({
            "error_response": {
                "code": "IncompleteSignature",
                "msg": "The request signature does not conform to platform standards",
                "request_id": "r1"
            }
        });
        let err = unwrap_envelope(PRODUCT_QUERY, body).unwrap_err();
        assert_eq!(err.kind, UpstreamErrorKind::Envelope);
        assert_eq!(err.code, "IncompleteSignature");
        assert!(err.message.contains("signature"));
        assert!(err.raw.is_some());
    }

    #[test]
    fn test_error_response_prefers_sub_code() {
        let body = json!({
            "error_response": {"code": 15, "msg": "Remote service error", "sub_code": "isv.invalid-parameter", "sub_msg": "page_size too large"}
        });
        let err = unwrap_envelope(PRODUCT_QUERY, body).unwrap_err();
        assert_eq!(err.code, "isv.invalid-parameter");
        assert_eq!(err.message, "Remote service error: page_size too large");
    }

    #[test]
    fn test_failing_resp_code() {
        let body = json!({
            "aliexpress_affiliate_product_query_response": {
                "resp_result": {"resp_code": 405, "resp_msg": "No results"}
            }
        });
        let err = unwrap_envelope(PRODUCT_QUERY, body).unwrap_err();
        assert_eq!(err.kind, UpstreamErrorKind::Envelope);
        assert_eq!(err.code, "405");
        assert_eq!(err.message, "No results");
    }

    #[test]
    fn test_missing_envelope_is_decode_error() {
        let err = unwrap_envelope(PRODUCT_QUERY, json!({"unexpected": true})).unwrap_err();
        assert_eq!(err.kind, UpstreamErrorKind::Decode);
        assert!(err.message.contains("aliexpress_affiliate_product_query_response"));
    }

    #[test]
    fn test_envelope_without_resp_result() {
        let body = json!({
            "aliexpress_affiliate_product_query_response": {"result": {"y": 2}, "request_id": 77}
        });
        let raw = unwrap_envelope(PRODUCT_QUERY, body).unwrap();
        assert_eq!(raw.payload["result"]["y"], 2);
        assert_eq!(raw.request_id.as_deref(), Some("77"));
    }
}
