use aliexpress_affiliate_proxy::api::{ApiServer, ApiState};
use aliexpress_affiliate_proxy::config::Config;
use aliexpress_affiliate_proxy::service::ServiceFacade;
use anyhow::Context;
use clap::{Parser, ValueEnum};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "affiliate-proxy")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// YAML config file
    #[arg(short, long, env = "AFFILIATE_PROXY_CONFIG")]
    config: Option<PathBuf>,

    /// Listen port (overrides the config file)
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Listen address (overrides the config file)
    #[arg(long, env = "AFFILIATE_PROXY_HOST")]
    host: Option<IpAddr>,

    /// Always answer with mock data
    #[arg(long)]
    force_mock: bool,

    /// Log output format
    #[arg(long, value_enum, default_value = "text", env = "AFFILIATE_PROXY_LOG_FORMAT")]
    log_format: LogFormat,
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match format {
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
    }
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let args = Args::parse();
    init_tracing(args.log_format);

    let mut config = Config::load(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(port) = args.port {
        config.listen.port = port;
    }
    if let Some(host) = args.host {
        config.listen.host = host;
    }
    if args.force_mock {
        config.mock.force = true;
    }

    info!(
        "Starting affiliate proxy v{} (auth: {})",
        env!("CARGO_PKG_VERSION"),
        if config.auth.is_enabled() { "api key" } else { "disabled" }
    );

    let facade = ServiceFacade::from_config(&config)?;
    let addr: SocketAddr = config.listen.socket_addr();
    let server = ApiServer::bind(
        addr,
        ApiState {
            facade,
            auth: config.auth.clone(),
        },
    )
    .await
    .with_context(|| format!("Failed to bind {addr}"))?;

    tokio::select! {
        result = server.run() => result?,
        _ = tokio::signal::ctrl_c() => info!("Shutdown signal received"),
    }

    Ok(())
}
