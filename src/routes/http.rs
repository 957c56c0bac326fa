//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs the session id and basic result info.

use std::sync::Arc;
use axum::{
  extract::{Path, State},
  http::{header::USER_AGENT, HeaderMap},
  response::IntoResponse,
  Json,
};
use tracing::{info, instrument};

use crate::completion::complete_session;
use crate::error::ApiError;
use crate::protocol::*;
use crate::state::AppState;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state, body))]
pub async fn http_create_session(
  State(state): State<Arc<AppState>>,
  body: Option<Json<SessionIn>>,
) -> Json<SurveyEnvelope> {
  let SessionIn { client_id, language } = body.map(|Json(b)| b).unwrap_or_default();
  let session = state.start_session(client_id, language).await;
  info!(target: "session", id = %session.id, language = %session.language, "HTTP survey served");
  Json(SurveyEnvelope::for_session(&state, &session, None))
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_get_survey(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Json<SurveyEnvelope>, ApiError> {
  let session = state.get_session(&id).await?;
  Ok(Json(SurveyEnvelope::for_session(&state, &session, None)))
}

#[instrument(level = "info", skip(state, body), fields(%id))]
pub async fn http_post_language(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  body: Option<Json<LanguageIn>>,
) -> Result<Json<SurveyEnvelope>, ApiError> {
  let answers = body.and_then(|Json(b)| b.answers);
  let session = state.switch_language(&id).await?;
  info!(target: "session", %id, language = %session.language, carried_answers = answers.as_ref().map(|a| a.len()).unwrap_or(0), "HTTP language switched");
  Ok(Json(SurveyEnvelope::for_session(&state, &session, answers)))
}

#[instrument(level = "info", skip(state, headers, body), fields(%id))]
pub async fn http_post_complete(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  headers: HeaderMap,
  Json(body): Json<CompleteIn>,
) -> Result<Json<CompletionOut>, ApiError> {
  let header_ua = headers.get(USER_AGENT).and_then(|v| v.to_str().ok()).map(str::to_string);
  let out = complete_session(&state, &id, body, header_ua).await?;
  info!(target: "session", %id, ok = out.ok, "HTTP completion handled");
  Ok(Json(out))
}
