use anyhow::Context;
use clap::Parser;
use coscientist::{api, utils::config::Config, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(
    name = "coscientist-server",
    about = "AI co-scientist research server",
    version
)]
struct Cli {
    /// Address to bind the HTTP server on
    #[arg(long, env = "HOST")]
    host: Option<String>,

    /// Port to bind the HTTP server on
    #[arg(long, env = "PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "coscientist_server=info,coscientist=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env().map_err(|e| anyhow::anyhow!("invalid configuration: {e}"))?;
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(config);
    let app = api::routes::app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "co-scientist server listening");

    axum::serve(listener, app)
        .await
        .context("server error")?;

    Ok(())
}
