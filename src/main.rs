//! Physics Tutor · Socratic tutoring backend
//!
//! - Axum HTTP + WebSocket API over a problem catalog and tutoring sessions
//! - OpenAI-compatible generation backend (via environment variables)
//! - Static SPA fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT                 : u16 (default 3000)
//!   OPENAI_API_KEY       : enables the AI tutor if present
//!   OPENAI_BASE_URL      : default "https://api.openai.com/v1"
//!   OPENAI_MODEL         : default "gpt-4o-mini"
//!   OPENAI_TIMEOUT_SECS  : per-call timeout, default 20
//!   SESSION_TTL_SECS     : idle HTTP session lifetime, default 7200
//!   PROBLEMS_DIR         : directory of problem JSON files (default ./problems)
//!   AGENT_CONFIG_PATH    : path to TOML config (policy texts + catalog dir)
//!   LOG_LEVEL            : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT           : "pretty" (default) or "json"

mod catalog;
mod config;
mod conversation;
mod domain;
mod error;
mod generation;
mod logic;
mod openai;
mod prompts;
mod protocol;
mod routes;
mod seeds;
mod state;
mod telemetry;
mod tutor;
mod util;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::info;

use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Shared state: catalog, optional tutor engine, session store.
  let state = Arc::new(AppState::from_env());

  let app = build_router(state);

  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "tutor_backend", %addr, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(target: "tutor_backend", error = %e, "Failed to listen for shutdown signal");
    std::future::pending::<()>().await;
  }
  info!(target: "tutor_backend", "Shutdown signal received");
}
