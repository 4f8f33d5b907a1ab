//! Response helpers and query parsing for the HTTP API.

use crate::model::SearchQuery;
use bytes::Bytes;
use http_body_util::{BodyExt, Full, Limited};
use hyper::body::Body;
use hyper::{Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Error body for requests rejected before reaching the service
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

/// `POST /api/affiliate/links` body
#[derive(Debug, Deserialize)]
pub struct LinksRequest {
    pub urls: Vec<String>,
}

/// Decoded query string. Repeated keys keep every value in order.
#[derive(Debug, Default)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|s| s.into_owned())
        .unwrap_or(spaced)
}

impl QueryParams {
    pub fn parse(query: Option<&str>) -> Self {
        let pairs = query
            .unwrap_or_default()
            .split('&')
            .filter(|p| !p.is_empty())
            .map(|param| match param.split_once('=') {
                Some((key, value)) => (decode_component(key), decode_component(value)),
                None => (decode_component(param), String::new()),
            })
            .collect();
        Self { pairs }
    }

    /// First non-empty value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.trim())
            .find(|v| !v.is_empty())
    }

    /// Values for `key`, split on commas, across repeated keys.
    pub fn get_list(&self, key: &str) -> Vec<String> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == key)
            .flat_map(|(_, v)| v.split(','))
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn get_parsed<T>(&self, key: &str) -> Result<Option<T>, String>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.get(key)
            .map(|v| {
                v.parse()
                    .map_err(|e| format!("invalid value for '{key}': {e}"))
            })
            .transpose()
    }

    /// First key present among aliases, parsed.
    fn get_parsed_any<T>(&self, keys: &[&str]) -> Result<Option<T>, String>
    where
        T: FromStr,
        T::Err: Display,
    {
        for key in keys {
            if let Some(value) = self.get_parsed(key)? {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }

    /// Search filters shared by `/api/products/search` and `/api/products/hot`.
    pub fn search_query(&self) -> Result<SearchQuery, String> {
        let defaults = SearchQuery::default();
        Ok(SearchQuery {
            keywords: self.get("keywords").map(str::to_string),
            category_ids: self.get_list("category_ids"),
            page_no: self.get_parsed("page_no")?.unwrap_or(defaults.page_no),
            page_size: self.get_parsed("page_size")?.unwrap_or(defaults.page_size),
            sort: self.get("sort").map(str::to_string),
            min_sale_price: self.get_parsed_any(&["min_price", "min_sale_price"])?,
            max_sale_price: self.get_parsed_any(&["max_price", "max_sale_price"])?,
            target_currency: self.get("target_currency").map(str::to_string),
            target_language: self.get("target_language").map(str::to_string),
            ship_to_country: self.get("ship_to_country").map(str::to_string),
        })
    }
}

/// Create a JSON response
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    let json = serde_json::to_string(body).unwrap_or_else(|_| "{}".to_string());
    build_response_with_headers(status, [("Content-Type", "application/json")], json)
}

/// Build an HTTP response with headers.
///
/// Falls back to a bare response if the builder rejects a header.
pub fn build_response_with_headers(
    status: StatusCode,
    headers: impl IntoIterator<Item = (impl AsRef<str>, impl AsRef<str>)>,
    body: impl Into<Bytes>,
) -> Response<Full<Bytes>> {
    let mut builder = Response::builder().status(status);
    for (key, value) in headers {
        builder = builder.header(key.as_ref(), value.as_ref());
    }
    builder
        .body(Full::new(body.into()))
        .unwrap_or_else(|_| Response::new(Full::new(Bytes::from("Internal Server Error"))))
}

pub fn error_response(status: StatusCode, code: &str, message: &str) -> Response<Full<Bytes>> {
    let error = ErrorResponse {
        success: false,
        error: ErrorDetail {
            code: code.to_string(),
            message: message.to_string(),
        },
    };
    json_response(status, &error)
}

pub fn bad_request(message: &str) -> Response<Full<Bytes>> {
    error_response(StatusCode::BAD_REQUEST, "INVALID_ARGUMENT", message)
}

pub fn not_found() -> Response<Full<Bytes>> {
    error_response(StatusCode::NOT_FOUND, "NOT_FOUND", "Not Found")
}

/// Largest request body accepted; a full batch of URLs fits well inside.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Collect request body into bytes, up to [`MAX_BODY_BYTES`]
pub async fn collect_body<B>(body: B) -> Result<Bytes, String>
where
    B: Body,
    B::Error: Into<BoxError>,
{
    Limited::new(body, MAX_BODY_BYTES)
        .collect()
        .await
        .map(|c| c.to_bytes())
        .map_err(|e| format!("Failed to read request body: {e}"))
}
