//! Client for the upstream AliExpress Affiliate API.
//!
//! One call is one signed GET against the configured gateway. The client does
//! not retry; the service facade decides what to do with a failure. Every call
//! is bounded by the configured timeout, and dropping the returned future
//! aborts the in-flight request.

mod envelope;
mod error;

pub use envelope::{response_key, unwrap_envelope, RawUpstreamResponse};
pub(crate) use envelope::scalar_string;
pub use error::{CallError, UpstreamError, UpstreamErrorKind};

use crate::config::{Credentials, UpstreamConfig};
use crate::metrics;
use crate::signing::{Params, SignatureBuilder};
use async_trait::async_trait;
use std::time::Instant;
use tracing::debug;

/// The seam between the facade and the network.
#[async_trait]
pub trait AffiliateApi: Send + Sync {
    async fn call(&self, method: &str, params: &Params) -> Result<RawUpstreamResponse, CallError>;
}

/// reqwest-backed implementation of [`AffiliateApi`].
pub struct UpstreamClient {
    http: reqwest::Client,
    base_url: String,
    signer: SignatureBuilder,
}

impl UpstreamClient {
    pub fn new(config: &UpstreamConfig, credentials: &Credentials) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .user_agent(concat!("aliexpress-affiliate-proxy/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            signer: SignatureBuilder::from_credentials(credentials),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send(
        &self,
        method: &str,
        params: &Params,
    ) -> Result<RawUpstreamResponse, CallError> {
        let signed = self.signer.sign(method, params)?;

        debug!("Calling upstream {} at {}", method, self.base_url);

        let response = self
            .http
            .get(&self.base_url)
            .query(&signed.query_pairs())
            .send()
            .await
            .map_err(|e| UpstreamError::from_reqwest(&e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| UpstreamError::from_reqwest(&e))?;

        if !status.is_success() {
            return Err(UpstreamError::http_status(status.as_u16(), &body).into());
        }

        let json: serde_json::Value = serde_json::from_str(&body)
            .map_err(|e| UpstreamError::decode(format!("invalid JSON body: {e}")))?;

        Ok(unwrap_envelope(method, json)?)
    }
}

#[async_trait]
impl AffiliateApi for UpstreamClient {
    async fn call(&self, method: &str, params: &Params) -> Result<RawUpstreamResponse, CallError> {
        let start = Instant::now();
        let result = self.send(method, params).await;
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

        let label = match &result {
            Ok(_) => "success",
            Err(CallError::Upstream(e)) => e.kind.as_str(),
            Err(CallError::Signature(_)) => "signature",
        };
        metrics::record_upstream_call(method, label, elapsed_ms);
        debug!("Upstream {} finished in {:.1}ms ({})", method, elapsed_ms, label);

        result
    }
}
