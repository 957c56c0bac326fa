//! Minimal client for the hosted database (Supabase / PostgREST).
//!
//! We only insert one row per completed session and, optionally, read the active street
//! image catalog at startup. Inserts ask for `return=minimal`, so an insert-only row
//! policy for the anon role is enough. Every failure comes back as a `PersistError`; nothing here
//! panics past its boundary.
//!
//! NOTE: the anon key is never logged; response bodies are truncated before logging.

use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use rand::Rng;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info, instrument, warn};

use crate::config::SupabaseConfig;
use crate::error::PersistError;
use crate::images::StreetImage;
use crate::session::CompletionPayload;
use crate::util::trunc_for_log;

const IMAGES_TABLE: &str = "street_images";

/// Row stored for a completed session.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedRecord {
  pub participant_id: String,
  /// Rows echoed back by the backend; empty with `return=minimal`.
  pub data: Value,
}

/// Where completed sessions go.
#[async_trait]
pub trait ResponseSink: Send + Sync {
  async fn save(&self, payload: &CompletionPayload) -> Result<SavedRecord, PersistError>;
}

#[derive(Serialize)]
struct InsertRow<'a> {
  participant_id: &'a str,
  responses: &'a serde_json::Map<String, Value>,
  displayed_images: &'a Value,
  survey_metadata: &'a crate::session::SessionMetadata,
}

#[derive(Deserialize)]
struct ImageRow {
  id: Value,
  image_url: String,
}

#[derive(Clone)]
pub struct SupabaseClient {
  pub client: reqwest::Client,
  pub base_url: String,
  anon_key: String,
  pub table: String,
}

impl SupabaseClient {
  pub fn new(cfg: &SupabaseConfig) -> Result<Self, PersistError> {
    // No application-level timeout: the transport default applies.
    let client = reqwest::Client::builder()
      .build()
      .map_err(|e| PersistError::Transport(e.to_string()))?;
    Ok(Self {
      client,
      base_url: cfg.url.trim_end_matches('/').to_string(),
      anon_key: cfg.anon_key.clone(),
      table: cfg.table.clone(),
    })
  }

  fn rest_url(&self, table: &str) -> String {
    format!("{}/rest/v1/{}", self.base_url, table)
  }

  fn authorized(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    req
      .header(USER_AGENT, "street-survey-backend/0.1")
      .header("apikey", &self.anon_key)
      .header(AUTHORIZATION, format!("Bearer {}", self.anon_key))
  }

  /// Active rows of the `street_images` table.
  #[instrument(level = "info", skip(self), fields(base_url = %self.base_url))]
  pub async fn fetch_active_images(&self) -> Result<Vec<StreetImage>, PersistError> {
    let res = self
      .authorized(self.client.get(self.rest_url(IMAGES_TABLE)))
      .header(ACCEPT, "application/json")
      .query(&[("select", "*"), ("active", "eq.true")])
      .send()
      .await?;

    if !res.status().is_success() {
      return Err(rejected(res).await);
    }

    let rows: Vec<ImageRow> = res.json().await.map_err(|e| PersistError::Decode(e.to_string()))?;
    let images: Vec<StreetImage> = rows
      .into_iter()
      .map(|r| StreetImage {
        id: match r.id {
          Value::String(s) => s,
          other => other.to_string(),
        },
        image_url: r.image_url,
      })
      .collect();
    info!(target: "persistence", count = images.len(), "Fetched active street images");
    Ok(images)
  }
}

#[async_trait]
impl ResponseSink for SupabaseClient {
  #[instrument(level = "info", skip(self, payload), fields(table = %self.table, language = %payload.survey_metadata.language))]
  async fn save(&self, payload: &CompletionPayload) -> Result<SavedRecord, PersistError> {
    let participant_id = generate_participant_id();
    info!(target: "persistence", %participant_id, answers = payload.responses.len(), "Saving survey response");

    let row = InsertRow {
      participant_id: &participant_id,
      responses: &payload.responses,
      displayed_images: &payload.displayed_images,
      survey_metadata: &payload.survey_metadata,
    };

    let start = std::time::Instant::now();
    let res = self
      .authorized(self.client.post(self.rest_url(&self.table)))
      .header(CONTENT_TYPE, "application/json")
      .header("Prefer", "return=minimal")
      .json(&[row])
      .send()
      .await
      .map_err(|e| {
        error!(target: "persistence", %participant_id, error = %e, "Insert request failed");
        PersistError::from(e)
      })?;

    if !res.status().is_success() {
      let err = rejected(res).await;
      error!(target: "persistence", %participant_id, error = %err, "Insert rejected");
      return Err(err);
    }

    // `return=minimal` answers 201 with an empty body; a body, if any, is kept.
    let text = res.text().await.map_err(PersistError::from)?;
    let data = if text.trim().is_empty() {
      Value::Array(vec![])
    } else {
      serde_json::from_str(&text).map_err(|e| PersistError::Decode(e.to_string()))?
    };
    info!(target: "persistence", %participant_id, elapsed = ?start.elapsed(), "Survey response saved");
    Ok(SavedRecord { participant_id, data })
  }
}

async fn rejected(res: reqwest::Response) -> PersistError {
  let status = res.status();
  let body = res.text().await.unwrap_or_default();
  let message = extract_postgrest_error(&body).unwrap_or_else(|| trunc_for_log(&body, 300));
  let message = if message.trim().is_empty() {
    status.canonical_reason().unwrap_or("unknown error").to_string()
  } else {
    message
  };
  warn!(target: "persistence", status = status.as_u16(), body = %trunc_for_log(&body, 300), "Backend returned an error");
  PersistError::Rejected { status: status.as_u16(), message }
}

/// PostgREST errors look like `{"message": ..., "details": ..., "hint": ..., "code": ...}`.
fn extract_postgrest_error(body: &str) -> Option<String> {
  let v: Value = serde_json::from_str(body).ok()?;
  let message = v.get("message")?.as_str()?.to_string();
  match v.get("details").and_then(Value::as_str) {
    Some(details) if !details.is_empty() => Some(format!("{message} ({details})")),
    _ => Some(message),
  }
}

/// `participant_<unix millis>_<9 base36 chars>`. Unique enough for survey volumes,
/// not a security token.
pub fn generate_participant_id() -> String {
  let millis = SystemTime::now()
    .duration_since(UNIX_EPOCH)
    .map(|d| d.as_millis())
    .unwrap_or_default();
  const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
  let mut rng = rand::thread_rng();
  let suffix: String = (0..9)
    .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
    .collect();
  format!("participant_{millis}_{suffix}")
}
