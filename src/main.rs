//! rustscopus - Scopus keyword search with CSV export
//!
//! ## Usage
//!
//! ### CLI Mode
//! ```bash
//! rustscopus search '"knowledge graphs" AND "large language models"' --from 2020 --to 2024
//! ```
//!
//! ### HTTP Server Mode
//! ```bash
//! rustscopus serve --port 3000
//! ```

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use clap::{Parser, Subcommand};
use rustscopus::{
    scopus::{FetchConfig, DEFAULT_MAX_RESULTS, MAX_PAGE_SIZE, SCOPUS_API_URL},
    NormalizedRecord, ScopusClient, ScopusError, SearchRequest,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, Level};
use tracing_subscriber::{fmt, EnvFilter};

// ============================================================================
// CLI Definition
// ============================================================================

/// Scopus Article Search - Rust Microservice
#[derive(Parser)]
#[command(name = "rustscopus")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(flatten)]
    fetch: FetchArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Scopus client tuning, shared by all subcommands
#[derive(clap::Args)]
struct FetchArgs {
    /// Scopus Search API endpoint
    #[arg(long, global = true, default_value = SCOPUS_API_URL)]
    endpoint: String,

    /// Entries per request (Scopus allows at most 25)
    #[arg(long, global = true, default_value_t = MAX_PAGE_SIZE)]
    page_size: usize,

    /// Pause between page requests, in milliseconds
    #[arg(long, global = true, default_value = "500")]
    delay_ms: u64,

    /// Per-request timeout, in seconds
    #[arg(long, global = true, default_value = "30")]
    timeout_secs: u64,
}

impl FetchArgs {
    fn to_config(&self) -> FetchConfig {
        FetchConfig {
            endpoint: self.endpoint.clone(),
            page_size: self.page_size,
            courtesy_delay: Duration::from_millis(self.delay_ms),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Search Scopus and export the results as CSV
    Search {
        /// Search keywords (Scopus query syntax, inserted as-is)
        query: String,

        /// Scopus API key
        #[arg(long, env = "SCOPUS_API_KEY", hide_env_values = true)]
        api_key: String,

        /// First publication year (default: current year - 5)
        #[arg(long = "from")]
        year_start: Option<i32>,

        /// Last publication year (default: current year)
        #[arg(long = "to")]
        year_end: Option<i32>,

        /// Maximum number of results to fetch
        #[arg(short, long, default_value_t = DEFAULT_MAX_RESULTS)]
        max_results: usize,

        /// Output CSV path (default: scopus_articles_<from>_<to>.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run as HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .init();

    let client = ScopusClient::new(cli.fetch.to_config()).context("Failed to create Scopus client")?;

    match cli.command {
        Commands::Search {
            query,
            api_key,
            year_start,
            year_end,
            max_results,
            output,
        } => {
            let request = build_request(api_key, query, year_start, year_end, max_results);
            run_search(&client, request, output).await
        }
        Commands::Serve { port, host } => run_server(client, host, port).await,
    }
}

// ============================================================================
// Search
// ============================================================================

/// Search request with the CLI's explicit years applied over the defaults
fn build_request(
    api_key: String,
    query: String,
    year_start: Option<i32>,
    year_end: Option<i32>,
    max_results: usize,
) -> SearchRequest {
    let mut request = SearchRequest::new(api_key, query).with_max_results(max_results);
    if let Some(year) = year_start {
        request.year_start = year;
    }
    if let Some(year) = year_end {
        request.year_end = year;
    }
    request
}

async fn run_search(client: &ScopusClient, request: SearchRequest, output: Option<PathBuf>) -> Result<()> {
    println!(
        "Searching Scopus for {} ({}–{})... Please wait.",
        request.query, request.year_start, request.year_end
    );

    let table = request.execute(client).await.context("Search failed")?;

    println!(
        "Showing up to {} results for {}–{}: {} found",
        request.max_results,
        request.year_start,
        request.year_end,
        table.len()
    );

    let path = output.unwrap_or_else(|| PathBuf::from(request.file_name()));
    table.save_csv(&path).context("Failed to write CSV")?;
    println!("Saved: {}", path.display());
    Ok(())
}

// ============================================================================
// HTTP Server
// ============================================================================

async fn run_server(client: ScopusClient, host: String, port: u16) -> Result<()> {
    info!(host = %host, port = port, "Starting HTTP server");

    let app_state = Arc::new(AppState { client });
    let app = router(app_state);

    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .context("Invalid host:port")?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    println!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/search", post(search_handler))
        .route("/search/csv", post(search_csv_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

struct AppState {
    client: ScopusClient,
}

/// Health check endpoint
async fn health_handler() -> &'static str {
    "OK"
}

/// Search response
#[derive(Debug, Serialize)]
struct SearchResponse {
    status: String,
    count: usize,
    results: Vec<NormalizedRecord>,
}

fn error_response(e: &ScopusError) -> (StatusCode, String) {
    let status = StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, e.to_string())
}

/// Search endpoint handler, JSON results
async fn search_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SearchRequest>,
) -> Response {
    info!(query = %req.query, year_start = req.year_start, year_end = req.year_end, "Search request");

    match req.execute(&state.client).await {
        Ok(table) => Json(SearchResponse {
            status: "success".to_string(),
            count: table.len(),
            results: table.into_records(),
        })
        .into_response(),
        Err(e) => {
            error!(error = %e, "Search failed");
            let (status, message) = error_response(&e);
            (
                status,
                Json(SearchResponse {
                    status: message,
                    count: 0,
                    results: vec![],
                }),
            )
                .into_response()
        }
    }
}

/// Search endpoint handler, CSV download
async fn search_csv_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SearchRequest>,
) -> Response {
    info!(query = %req.query, year_start = req.year_start, year_end = req.year_end, "CSV search request");

    let csv = req
        .execute(&state.client)
        .await
        .and_then(|table| table.to_csv_string());

    match csv {
        Ok(body) => (
            [
                (header::CONTENT_TYPE, "text/csv".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", req.file_name()),
                ),
            ],
            body,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "CSV search failed");
            error_response(&e).into_response()
        }
    }
}
