//! Signed-request proxy for the AliExpress Affiliate API.
//!
//! Requests are signed and sent upstream; any upstream failure is answered
//! with generated data flagged as `mock_mode`.

pub mod api;
pub mod config;
pub mod metrics;
pub mod mock;
pub mod model;
pub mod service;
pub mod signing;
pub mod upstream;
