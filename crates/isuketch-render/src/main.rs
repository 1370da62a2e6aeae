//! ISUketch render server - HTTP server for server-rendered ISUketch pages.

use axum::http::Request;
use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use isuketch_render::{AppState, Config, router};

/// ISUketch render server - server-side rendering for the ISUketch app.
#[derive(Parser, Debug)]
#[command(name = "isuketch-render")]
#[command(about = "Server-side rendering server for ISUketch", long_about = None)]
struct Args {
    /// Path to .env file (optional).
    #[arg(long, env = "DOTENV_PATH", default_value = ".env")]
    dotenv: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if std::path::Path::new(&args.dotenv).exists() {
        dotenvy::from_path(&args.dotenv)?;
        eprintln!("Loaded environment from {}", args.dotenv);
    }

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Fails without API; nothing is bound in that case.
    let config = Config::from_env()?;
    let bind_addr = config.bind_addr.clone();

    let state = AppState::new(config)?;

    let app = router(state).layer(TraceLayer::new_for_http().make_span_with(
        |request: &Request<_>| {
            tracing::span!(
                Level::INFO,
                "http_request",
                method = %request.method(),
                path = %request.uri().path(),
                query = request.uri().query().unwrap_or(""),
            )
        },
    ));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "starting render server");

    axum::serve(listener, app).await?;

    Ok(())
}
