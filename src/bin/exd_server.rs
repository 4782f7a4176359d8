//! exd API Server binary
//!
//! HTTP JSON API for reading spreadsheet files as groups and channels.

use clap::Parser;
use exd_sheets::api::{run_api_server, server::ApiConfig};

#[derive(Parser, Debug)]
#[command(name = "exd-server")]
#[command(version)]
#[command(about = "exd API Server - HTTP JSON API for spreadsheet files")]
#[command(long_about = r#"
exd API Server - HTTP JSON API

Provides endpoints for the reader operations:
  - POST /api/v1/open       - Open a file, returns a handle
  - POST /api/v1/close      - Release a handle
  - POST /api/v1/structure  - Group/channel hierarchy
  - POST /api/v1/values     - Typed channel values
  - POST /api/v1/values_ex  - Virtual channel values (not supported)

Additional endpoints:
  - GET  /health            - Health check
  - GET  /version           - Server version info
  - GET  /                  - API documentation

Features:
  - CORS enabled for cross-origin requests
  - Graceful shutdown on SIGINT/SIGTERM
  - JSON response format with request IDs and status codes
  - Tracing and structured logging (RUST_LOG)

Example usage:
  exd-server                           # Start on localhost:8080
  exd-server --host 0.0.0.0 --port 3000

  curl -X POST http://localhost:8080/api/v1/open \
    -H "Content-Type: application/json" \
    -d '{"url": "file:///data/measurement.xlsx"}'
"#)]
struct Args {
    /// Host address to bind to (use 0.0.0.0 for all interfaces)
    #[arg(short = 'H', long, default_value = "127.0.0.1", env = "EXD_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "8080", env = "EXD_PORT")]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = ApiConfig {
        host: args.host,
        port: args.port,
    };

    run_api_server(config).await
}
