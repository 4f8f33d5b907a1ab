//! JSON HTTP API in front of the service facade.
//!
//! Endpoints:
//! - `GET /health`, `GET /metrics`
//! - `GET /api/categories`, `GET /api/categories/:id/children`
//! - `GET /api/products/search`, `GET /api/products/hot`, `GET /api/products/details`
//! - `GET|POST /api/affiliate/links`
//!
//! `/api/*` routes require an API key when `auth.api_keys` is configured.

mod handlers;
mod router;
mod server;
mod types;

pub use server::ApiServer;

use crate::config::AuthConfig;
use crate::service::ServiceFacade;

/// State shared by every connection.
pub struct ApiState {
    pub facade: ServiceFacade,
    pub auth: AuthConfig,
}
