//! Single entry point for request handlers.
//!
//! Every call first tries the upstream API and, on any upstream failure, is
//! answered from the mock generator instead. Upstream failures never reach the
//! caller; only unsignable requests and invalid arguments do.

mod outcome;
mod result;

pub use outcome::{MockReason, Outcome, ServiceError};
pub use result::{ErrorBody, NormalizedResult, ResultMetadata};

use crate::config::{Config, ConfigurationError};
use crate::metrics;
use crate::mock::MockDataGenerator;
use crate::model::{normalize_upstream, AffiliateRequest, SearchQuery};
use crate::upstream::{AffiliateApi, CallError, UpstreamClient};
use anyhow::Context;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// How calls are answered, decided once at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceMode {
    Live,
    Mock,
    Misconfigured,
}

impl ServiceMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceMode::Live => "live",
            ServiceMode::Mock => "mock",
            ServiceMode::Misconfigured => "misconfigured",
        }
    }
}

enum Backend {
    Live(Arc<dyn AffiliateApi>),
    ForcedMock,
    Misconfigured(ConfigurationError),
}

pub struct ServiceFacade {
    backend: Backend,
    tracking_id: String,
    mock: MockDataGenerator,
}

impl ServiceFacade {
    /// Build the facade from loaded configuration.
    ///
    /// Missing credentials do not fail construction: the facade starts
    /// misconfigured and answers every call with mock data.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        if config.mock.force {
            let tracking_id = config.credentials.tracking_id.clone().unwrap_or_default();
            info!("Mock mode forced; upstream calls are disabled");
            return Ok(Self::forced_mock(tracking_id));
        }

        match config.credentials() {
            Ok(credentials) => {
                let client = UpstreamClient::new(&config.upstream, &credentials)
                    .context("Failed to build upstream HTTP client")?;
                info!(
                    "Affiliate API client ready (upstream: {}, timeout: {}s)",
                    client.base_url(),
                    config.upstream.timeout_secs
                );
                Ok(Self::with_api(Arc::new(client), credentials.tracking_id))
            }
            Err(e) => {
                error!("{}; every call will be answered with mock data", e);
                let tracking_id = config.credentials.tracking_id.clone().unwrap_or_default();
                Ok(Self::misconfigured(e, tracking_id))
            }
        }
    }

    pub fn with_api(api: Arc<dyn AffiliateApi>, tracking_id: impl Into<String>) -> Self {
        Self::new(Backend::Live(api), tracking_id.into())
    }

    pub fn forced_mock(tracking_id: impl Into<String>) -> Self {
        Self::new(Backend::ForcedMock, tracking_id.into())
    }

    pub fn misconfigured(error: ConfigurationError, tracking_id: impl Into<String>) -> Self {
        Self::new(Backend::Misconfigured(error), tracking_id.into())
    }

    fn new(backend: Backend, tracking_id: String) -> Self {
        Self {
            mock: MockDataGenerator::new(tracking_id.clone()),
            backend,
            tracking_id,
        }
    }

    pub fn mode(&self) -> ServiceMode {
        match self.backend {
            Backend::Live(_) => ServiceMode::Live,
            Backend::ForcedMock => ServiceMode::Mock,
            Backend::Misconfigured(_) => ServiceMode::Misconfigured,
        }
    }

    /// The configuration problem that put the facade in mock mode, if any.
    pub fn configuration_error(&self) -> Option<&ConfigurationError> {
        match &self.backend {
            Backend::Misconfigured(e) => Some(e),
            _ => None,
        }
    }

    /// Answer one request, real or mock.
    pub async fn resolve(&self, request: &AffiliateRequest) -> Result<Outcome, ServiceError> {
        let request = request.clone().normalized();
        request.validate().map_err(ServiceError::InvalidArgument)?;

        let reason = match &self.backend {
            Backend::ForcedMock => MockReason::Forced,
            Backend::Misconfigured(e) => MockReason::Misconfigured(e.clone()),
            Backend::Live(api) => {
                let params = request.to_params(&self.tracking_id);
                let attempt = match api.call(request.method(), &params).await {
                    Ok(raw) => normalize_upstream(&request, &raw.payload).map(|payload| {
                        (payload, raw.request_id)
                    }),
                    Err(CallError::Upstream(e)) => Err(e),
                    Err(CallError::Signature(e)) => return Err(e.into()),
                };

                match attempt {
                    Ok((payload, upstream_request_id)) => {
                        debug!(
                            "{} answered by upstream (request_id: {:?})",
                            request.method(),
                            upstream_request_id
                        );
                        return Ok(Outcome::Real {
                            payload,
                            upstream_request_id,
                        });
                    }
                    Err(e) => {
                        warn!("{} failed, falling back to mock data: {}", request.method(), e);
                        MockReason::UpstreamFailure(e)
                    }
                }
            }
        };

        let capability = request.capability();
        metrics::record_mock_response(capability.as_str(), reason.cause());
        debug!("{} answered with mock data ({})", capability.as_str(), reason.cause());

        Ok(Outcome::Mock {
            payload: self.mock.generate(&request),
            reason,
        })
    }

    /// Answer one request as a [`NormalizedResult`].
    pub async fn execute(&self, request: AffiliateRequest) -> NormalizedResult {
        let start = Instant::now();
        let method = request.method();
        match self.resolve(&request).await {
            Ok(outcome) => NormalizedResult::from_outcome(method, outcome, start.elapsed()),
            Err(e) => {
                debug!("{} rejected: {}", method, e);
                NormalizedResult::failure(method, &e, start.elapsed())
            }
        }
    }

    pub async fn get_categories(&self) -> NormalizedResult {
        self.execute(AffiliateRequest::Categories).await
    }

    pub async fn get_child_categories(&self, parent_id: impl Into<String>) -> NormalizedResult {
        self.execute(AffiliateRequest::ChildCategories {
            parent_id: parent_id.into(),
        })
        .await
    }

    pub async fn search_products(&self, query: SearchQuery) -> NormalizedResult {
        self.execute(AffiliateRequest::ProductSearch(query)).await
    }

    pub async fn get_product_details(
        &self,
        product_ids: Vec<String>,
        target_currency: Option<String>,
        target_language: Option<String>,
    ) -> NormalizedResult {
        self.execute(AffiliateRequest::ProductDetails {
            product_ids,
            target_currency,
            target_language,
        })
        .await
    }

    pub async fn get_affiliate_links(&self, urls: Vec<String>) -> NormalizedResult {
        self.execute(AffiliateRequest::AffiliateLinks { urls }).await
    }

    pub async fn get_hot_products(&self, query: SearchQuery) -> NormalizedResult {
        self.execute(AffiliateRequest::HotProducts(query)).await
    }
}
