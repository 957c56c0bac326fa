//! Completion handling: verify the session, assemble the payload, hand it to the sink
//! once, and answer with a localized acknowledgement.
//!
//! There is no retry. A failed save is logged and reported to the participant; the
//! session stays completed so the same answers are never submitted twice.

use chrono::Utc;
use tracing::{error, info, instrument, warn};

use crate::error::ApiError;
use crate::protocol::{CompleteIn, CompletionOut};
use crate::session::{is_answered, CompletionPayload, SessionMetadata};
use crate::state::AppState;
use crate::survey::build;

#[instrument(level = "info", skip(state, input, header_user_agent), fields(%session_id, answers = input.answers.len()))]
pub async fn complete_session(
  state: &AppState,
  session_id: &str,
  input: CompleteIn,
  header_user_agent: Option<String>,
) -> Result<CompletionOut, ApiError> {
  let session = state.get_session(session_id).await?;
  if !session.is_active() {
    return Err(ApiError::AlreadyCompleted(session_id.to_string()));
  }

  let definition = build(session.language, &session.assignment, &state.settings);
  let missing: Vec<String> = definition
    .required_questions()
    .into_iter()
    .filter(|name| !is_answered(input.answers.get(*name)))
    .map(str::to_string)
    .collect();
  if !missing.is_empty() {
    warn!(target: "session", %session_id, missing = ?missing, "Completion rejected: required answers missing");
    return Err(ApiError::MissingAnswers(missing));
  }

  let known = definition.question_names();
  let unknown: Vec<&str> = input.answers.keys().map(String::as_str).filter(|k| !known.iter().any(|q| q == k)).collect();
  if !unknown.is_empty() {
    warn!(target: "session", %session_id, unknown = ?unknown, "Answers for unknown questions will be stored as-is");
  }

  // From here on the session is spent, whatever the sink says.
  let session = state.begin_completion(session_id).await?;
  let t = session.language.strings();

  let user_agent = input.user_agent.or(header_user_agent);
  let metadata = SessionMetadata::capture(&session, user_agent, input.viewport, Utc::now());
  let payload = CompletionPayload::assemble(&session, input.answers, metadata);

  match state.sink.save(&payload).await {
    Ok(record) => {
      let duration = Utc::now().signed_duration_since(session.created_at);
      info!(
        target: "session",
        %session_id,
        participant_id = %record.participant_id,
        rows = record.data.as_array().map(Vec::len).unwrap_or(0),
        duration_secs = duration.num_seconds(),
        "Survey response saved"
      );
      Ok(CompletionOut { ok: true, message: t.thank_you.into(), participant_id: Some(record.participant_id) })
    }
    Err(e) => {
      error!(target: "session", %session_id, error = %e, "Failed to save survey response");
      Ok(CompletionOut { ok: false, message: t.save_error.into(), participant_id: None })
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::i18n::{EN, ZH};
  use crate::images::ImageCatalog;
  use crate::state::testing::{state_from, state_with, RecordingSink};
  use crate::switcher::MemoryLanguageStore;
  use serde_json::{json, Map, Value};
  use std::sync::Arc;

  fn full_answers(state: &AppState, session: &crate::session::Session) -> Map<String, Value> {
    let def = build(session.language, &session.assignment, &state.settings);
    def.required_questions()
      .into_iter()
      .map(|name| (name.to_string(), json!("street_001")))
      .collect()
  }

  #[tokio::test]
  async fn successful_save_thanks_the_participant() {
    let sink = Arc::new(RecordingSink::default());
    let state = state_with(sink.clone());
    let session = state.start_session(None, Some("en".into())).await;
    let mut answers = full_answers(&state, &session);
    answers.insert("age".into(), json!("25_30"));

    let input = CompleteIn { answers, viewport: None, user_agent: Some("test-agent".into()) };
    let out = complete_session(&state, &session.id.to_string(), input, Some("header-agent".into())).await.unwrap();
    assert!(out.ok);
    assert_eq!(out.message, EN.thank_you);
    assert!(out.participant_id.unwrap().starts_with("participant_"));

    let saved = sink.saved.lock().unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].survey_metadata.user_agent, "test-agent");
    assert_eq!(saved[0].responses["age"], "25_30");
    assert_eq!(saved[0].displayed_images, session.assignment.to_json());
  }

  #[tokio::test]
  async fn failed_save_reports_localized_error_without_retry() {
    let sink = Arc::new(RecordingSink { fail: true, ..Default::default() });
    let state = state_with(sink.clone());
    let session = state.start_session(None, None).await;
    let id = session.id.to_string();

    let input = CompleteIn { answers: full_answers(&state, &session), viewport: None, user_agent: None };
    let out = complete_session(&state, &id, input, None).await.unwrap();
    assert!(!out.ok);
    assert_eq!(out.message, ZH.save_error);
    assert!(out.participant_id.is_none());

    // session is spent; a resubmission is refused before reaching the sink
    let again = CompleteIn { answers: full_answers(&state, &session), viewport: None, user_agent: None };
    assert!(matches!(complete_session(&state, &id, again, None).await, Err(ApiError::AlreadyCompleted(_))));
    // only the completion marker is left behind
    assert!(matches!(state.get_session(&id).await, Err(ApiError::AlreadyCompleted(_))));
  }

  #[tokio::test]
  async fn empty_catalog_does_not_block_completion() {
    let sink = Arc::new(RecordingSink::default());
    let state = state_from(ImageCatalog::default(), Box::new(MemoryLanguageStore::default()), sink.clone());
    let session = state.start_session(None, None).await;

    let answers = full_answers(&state, &session);
    assert!(!answers.contains_key("thermal_comfort"));
    assert!(answers.contains_key("comfort_level"));

    let input = CompleteIn { answers, viewport: None, user_agent: None };
    let out = complete_session(&state, &session.id.to_string(), input, None).await.unwrap();
    assert!(out.ok);
    assert_eq!(sink.saved.lock().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn missing_required_answers_keep_the_session_open() {
    let sink = Arc::new(RecordingSink::default());
    let state = state_with(sink.clone());
    let session = state.start_session(None, None).await;
    let id = session.id.to_string();

    let mut answers = full_answers(&state, &session);
    answers.remove("thermal_comfort");
    answers.insert("comfort_level".into(), Value::Null);
    let err = complete_session(&state, &id, CompleteIn { answers, viewport: None, user_agent: None }, None)
      .await
      .unwrap_err();
    match err {
      ApiError::MissingAnswers(names) => {
        assert!(names.contains(&"thermal_comfort".to_string()));
        assert!(names.contains(&"comfort_level".to_string()));
      }
      other => panic!("unexpected {other:?}"),
    }
    assert!(sink.saved.lock().unwrap().is_empty());
    assert!(state.get_session(&id).await.unwrap().is_active());
  }

  #[tokio::test]
  async fn language_switch_before_completion_changes_the_message() {
    let state = state_with(Arc::new(RecordingSink { fail: true, ..Default::default() }));
    let session = state.start_session(Some("c".into()), Some("zh".into())).await;
    let id = session.id.to_string();
    state.switch_language(&id).await.unwrap();

    let input = CompleteIn { answers: full_answers(&state, &session), viewport: None, user_agent: None };
    let out = complete_session(&state, &id, input, None).await.unwrap();
    assert_eq!(out.message, EN.save_error);
  }
}
