//! PDF Toolkit Server
//!
//! Serves a menu of five document operations and their REST endpoints:
//!
//! - Merge, compress and split PDFs
//! - Convert PDFs to Word, Excel, PowerPoint or an image
//! - Convert those formats back to PDF
//!
//! Every operation takes a multipart upload and returns the result file as
//! an attachment. Handlers run on tokio's blocking pool; split output is
//! staged in a private directory under `--work-dir`.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use clap::Parser;
use pdftoolkit_core::Dispatcher;
use tower::ServiceBuilder;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod api;
mod error;
#[cfg(test)]
mod tests;
mod ui;

use api::{
    handle_compress, handle_convert_from_pdf, handle_convert_to_pdf, handle_health, handle_index,
    handle_list_operations, handle_merge, handle_split,
};

/// Command-line arguments for the PDF toolkit server
#[derive(Parser, Debug)]
#[command(name = "pdftoolkit-server")]
#[command(about = "Merge, compress, split and convert documents over HTTP")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "3000")]
    port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Largest accepted request body, in megabytes
    #[arg(long, default_value = "50")]
    max_upload_mb: usize,

    /// Directory for per-request scratch space (defaults to the system temp dir)
    #[arg(long)]
    work_dir: Option<PathBuf>,

    /// Rate limit: requests per second per IP
    #[arg(long, default_value = "10")]
    rate_limit: u32,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
}

impl AppState {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
        }
    }
}

/// Build the router with every route and the body limit, CORS and tracing layers
pub fn app(state: AppState, max_upload_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Menu
        .route("/", get(handle_index))
        // Health check
        .route("/health", get(handle_health))
        // API endpoints
        .route("/api/operations", get(handle_list_operations))
        .route("/api/merge", post(handle_merge))
        .route("/api/compress", post(handle_compress))
        .route("/api/split", post(handle_split))
        .route("/api/convert-from-pdf", post(handle_convert_from_pdf))
        .route("/api/convert-to-pdf", post(handle_convert_to_pdf))
        // Apply middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting PDF toolkit server on {}:{}", args.host, args.port);

    // Create rate limiter configuration
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(args.rate_limit.into())
            .burst_size(args.rate_limit * 2)
            .finish()
            .ok_or_else(|| anyhow::anyhow!("Invalid rate limit: {}", args.rate_limit))?,
    );

    let work_dir = args.work_dir.unwrap_or_else(std::env::temp_dir);
    std::fs::create_dir_all(&work_dir)?;
    let state = AppState::new(Dispatcher::new(work_dir));
    info!("Work directory: {}", state.dispatcher.work_dir().display());

    let max_upload_bytes = args.max_upload_mb * 1024 * 1024;
    let app = app(state, max_upload_bytes).layer(GovernorLayer {
        config: governor_conf,
    });

    // Start server
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);
    info!("Rate limit: {} requests/second per IP", args.rate_limit);
    info!("Upload limit: {} MB", args.max_upload_mb);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
