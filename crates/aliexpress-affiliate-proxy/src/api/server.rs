//! API server.

use crate::api::router::route_request;
use crate::api::ApiState;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, info};

pub struct ApiServer {
    listener: TcpListener,
    state: Arc<ApiState>,
}

impl ApiServer {
    /// Bind the listening socket. Port 0 picks a free port.
    pub async fn bind(addr: SocketAddr, state: ApiState) -> Result<Self, anyhow::Error> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            listener,
            state: Arc::new(state),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, anyhow::Error> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve connections until the task is dropped.
    pub async fn run(self) -> Result<(), anyhow::Error> {
        info!(
            "Affiliate proxy API listening on http://{} (mode: {})",
            self.listener.local_addr()?,
            self.state.facade.mode().as_str()
        );

        loop {
            let (stream, peer) = self.listener.accept().await?;
            let io = TokioIo::new(stream);
            let state = Arc::clone(&self.state);

            tokio::spawn(async move {
                let service = service_fn(move |req| {
                    let state = Arc::clone(&state);
                    async move { route_request(req, state).await }
                });

                if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                    debug!("API connection error from {}: {}", peer, e);
                }
            });
        }
    }
}
