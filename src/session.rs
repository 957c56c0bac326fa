//! Session model: one participant's attempt, from survey load to completion.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::i18n::Language;
use crate::images::ImageAssignment;

/// Fixed tag recorded with every response.
pub const SURVEY_VERSION: &str = "1.0";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
  Active,
  Completed,
}

#[derive(Clone, Debug)]
pub struct Session {
  pub id: Uuid,
  /// Browser-side identity the language preference is stored under.
  pub client_id: Option<String>,
  pub language: Language,
  /// Drawn once in `Session::new`; never replaced.
  pub assignment: ImageAssignment,
  pub created_at: DateTime<Utc>,
  pub status: SessionStatus,
}

impl Session {
  pub fn new(client_id: Option<String>, language: Language, assignment: ImageAssignment) -> Self {
    Self {
      id: Uuid::new_v4(),
      client_id,
      language,
      assignment,
      created_at: Utc::now(),
      status: SessionStatus::Active,
    }
  }

  pub fn is_active(&self) -> bool {
    self.status == SessionStatus::Active
  }

  pub fn complete(&mut self) {
    self.status = SessionStatus::Completed;
  }

  /// Key the language preference is stored under: the client id when the browser
  /// sent one, the session id otherwise.
  pub fn preference_key(&self) -> String {
    self.client_id.clone().unwrap_or_else(|| self.id.to_string())
  }
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Viewport {
  pub width: u32,
  pub height: u32,
}

impl Viewport {
  pub fn resolution(&self) -> String {
    format!("{}x{}", self.width, self.height)
  }
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct SessionMetadata {
  pub completion_time: String,
  pub user_agent: String,
  pub screen_resolution: String,
  pub survey_version: &'static str,
  pub language: Language,
  pub session_id: Uuid,
  pub image_seed: u64,
}

impl SessionMetadata {
  pub fn capture(session: &Session, user_agent: Option<String>, viewport: Option<Viewport>, at: DateTime<Utc>) -> Self {
    Self {
      completion_time: at.to_rfc3339_opts(SecondsFormat::Millis, true),
      user_agent: user_agent.unwrap_or_else(|| "unknown".into()),
      screen_resolution: viewport.map(|v| v.resolution()).unwrap_or_else(|| "unknown".into()),
      survey_version: SURVEY_VERSION,
      language: session.language,
      session_id: session.id,
      image_seed: session.assignment.seed(),
    }
  }
}

/// Everything persisted for one completed session.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct CompletionPayload {
  pub responses: Map<String, Value>,
  pub displayed_images: Value,
  pub survey_metadata: SessionMetadata,
}

impl CompletionPayload {
  pub fn assemble(session: &Session, responses: Map<String, Value>, metadata: SessionMetadata) -> Self {
    Self {
      responses,
      displayed_images: session.assignment.to_json(),
      survey_metadata: metadata,
    }
  }
}

/// True when `value` counts as an answer (not null, not blank, not an empty list/object).
pub fn is_answered(value: Option<&Value>) -> bool {
  match value {
    None | Some(Value::Null) => false,
    Some(Value::String(s)) => !s.trim().is_empty(),
    Some(Value::Array(a)) => !a.is_empty(),
    Some(Value::Object(o)) => !o.is_empty(),
    Some(_) => true,
  }
}
