//! Public protocol structs for the HTTP endpoints (serde ready).
//! Keep this small and stable so the survey front end and backend can evolve independently.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::config::{Contact, LogoPosition};
use crate::i18n::Language;
use crate::session::{Session, Viewport};
use crate::state::AppState;
use crate::survey::{build, SurveyDefinition};
use crate::switcher::{LanguageSwitcher, SwitcherLabel};

#[derive(Debug, Deserialize, Default)]
pub struct SessionIn {
    #[serde(default, rename = "clientId")]
    pub client_id: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

/// Body of a language switch: in-progress answers to carry into the rebuilt survey.
#[derive(Debug, Deserialize, Default)]
pub struct LanguageIn {
    #[serde(default)]
    pub answers: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
pub struct CompleteIn {
    pub answers: Map<String, Value>,
    #[serde(default)]
    pub viewport: Option<Viewport>,
    #[serde(default, rename = "userAgent")]
    pub user_agent: Option<String>,
}

/// Everything the front end needs to (re)create its survey model.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyEnvelope {
    pub session_id: Uuid,
    pub language: Language,
    pub survey: SurveyDefinition,
    pub theme: Value,
    pub switcher: SwitcherLabel,
    pub privacy_notice: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_position: Option<LogoPosition>,
    /// Answers to restore into the new model after a language switch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,
}

impl SurveyEnvelope {
    /// Rebuild the whole survey for the session's current language.
    pub fn for_session(state: &AppState, session: &Session, data: Option<Map<String, Value>>) -> Self {
        Self {
            session_id: session.id,
            language: session.language,
            survey: build(session.language, &session.assignment, &state.settings),
            theme: state.theme.clone(),
            switcher: LanguageSwitcher::label(session.language),
            privacy_notice: session.language.strings().privacy_notice,
            contact: state.contact.clone(),
            logo: state.logo.clone(),
            logo_position: state.logo_position,
            data,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CompletionOut {
    pub ok: bool,
    /// Localized acknowledgement to show the participant.
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participant_id: Option<String>,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}
