//! Street perception survey backend
//!
//! - Axum HTTP API serving bilingual (zh/en) survey definitions per session
//! - Per-session street image assignment, fixed for the session's lifetime
//! - Completed sessions persisted to a hosted Supabase table
//! - Static survey front end fallback (./static/index.html)
//!
//! Important env variables:
//!   SUPABASE_URL         : required; startup fails without it
//!   SUPABASE_ANON_KEY    : required; startup fails without it
//!   SUPABASE_TABLE       : default "survey_responses"
//!   PORT                 : u16 (default 3000)
//!   SURVEY_CONFIG_PATH   : path to TOML config (settings, images, theme, contact)
//!   LANGUAGE_STORE_PATH  : JSON file for language preferences (in-memory if unset)
//!   SESSION_TTL_HOURS    : hours a session is kept in memory (default 24)
//!   LOG_LEVEL            : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT           : "pretty" (default) or "json"

mod telemetry;
mod util;
mod error;
mod config;
mod i18n;
mod images;
mod survey;
mod session;
mod switcher;
mod supabase;
mod state;
mod protocol;
mod completion;
mod routes;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::info;

use crate::routes::build_router;
use crate::state::{AppState, SWEEP_INTERVAL};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Missing persistence settings or a broken config file stop us here.
  let state = Arc::new(AppState::from_env().await?);
  tokio::spawn(Arc::clone(&state).run_session_sweeper(SWEEP_INTERVAL));

  let app = build_router(state);

  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "survey_backend", %addr, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  Ok(())
}

async fn shutdown_signal() {
  if tokio::signal::ctrl_c().await.is_ok() {
    info!(target: "survey_backend", "Shutdown signal received");
  }
}
