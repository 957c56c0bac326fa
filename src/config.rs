//! Loading survey configuration (runtime settings, image catalog, theme) from TOML,
//! and the persistence backend settings from the environment.
//!
//! Every TOML table rejects unknown keys, so a typo in a setting fails at startup
//! instead of being silently ignored.

use serde::{Deserialize, Serialize};
use tracing::{info, error};

use crate::error::ConfigError;
use crate::images::StreetImage;

pub const DEFAULT_TABLE: &str = "survey_responses";

#[derive(Clone, Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct SurveyConfig {
  #[serde(default)]
  pub settings: RuntimeSettings,
  #[serde(default)]
  pub contact: Option<Contact>,
  #[serde(default)]
  pub logo: Option<String>,
  #[serde(default)]
  pub logo_position: Option<LogoPosition>,
  #[serde(default)]
  pub image_source: ImageSource,
  /// Prefix joined with each entry of `image_files`.
  #[serde(default)]
  pub image_base_url: Option<String>,
  #[serde(default)]
  pub image_files: Vec<String>,
  #[serde(default)]
  pub images: Vec<StreetImage>,
  /// Opaque style object handed to the survey runtime as-is.
  #[serde(default)]
  pub theme: Option<toml::Table>,
}

/// Runtime display options. Every option the survey runtime is given is listed here;
/// anything else in the `[settings]` table is a parse error.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields, default, rename_all(serialize = "camelCase"))]
pub struct RuntimeSettings {
  pub show_question_numbers: ShowQuestionNumbers,
  pub show_progress_bar: ShowProgressBar,
  pub progress_bar_type: ProgressBarType,
  pub auto_grow_comment: bool,
  pub show_preview_before_complete: PreviewMode,
}

impl Default for RuntimeSettings {
  fn default() -> Self {
    Self {
      show_question_numbers: ShowQuestionNumbers::Off,
      show_progress_bar: ShowProgressBar::AboveHeader,
      progress_bar_type: ProgressBarType::Questions,
      auto_grow_comment: true,
      show_preview_before_complete: PreviewMode::ShowAllQuestions,
    }
  }
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub enum ShowQuestionNumbers {
  #[serde(rename = "on")]
  On,
  #[serde(rename = "off")]
  Off,
  #[serde(rename(serialize = "onPage", deserialize = "on_page"))]
  OnPage,
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub enum ShowProgressBar {
  #[serde(rename = "top")]
  Top,
  #[serde(rename = "bottom")]
  Bottom,
  #[serde(rename(serialize = "aboveheader", deserialize = "above_header"))]
  AboveHeader,
  #[serde(rename(serialize = "belowheader", deserialize = "below_header"))]
  BelowHeader,
  #[serde(rename = "off")]
  Off,
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProgressBarType {
  Pages,
  Questions,
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub enum PreviewMode {
  #[serde(rename(serialize = "showAllQuestions", deserialize = "show_all_questions"))]
  ShowAllQuestions,
  #[serde(rename(serialize = "showAnsweredQuestions", deserialize = "show_answered_questions"))]
  ShowAnsweredQuestions,
  #[serde(rename(serialize = "noPreview", deserialize = "no_preview"))]
  NoPreview,
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogoPosition {
  Left,
  Right,
  Top,
  Bottom,
}

/// Where the image catalog comes from.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ImageSource {
  /// `images` / `image_files` from this file.
  #[default]
  Config,
  /// Active rows of the `street_images` table, falling back to this file on failure.
  Database,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Contact {
  #[serde(default)] pub email: Option<String>,
  #[serde(default)] pub website: Option<String>,
}

impl SurveyConfig {
  /// Images declared in the file: explicit `[[images]]` first, then `image_files`
  /// joined onto `image_base_url`.
  pub fn configured_images(&self) -> Vec<StreetImage> {
    let mut out = self.images.clone();
    let base = self.image_base_url.as_deref().unwrap_or("").trim_end_matches('/');
    for file in &self.image_files {
      let url = if base.is_empty() { file.clone() } else { format!("{}/{}", base, file.trim_start_matches('/')) };
      let id = file
        .rsplit('/')
        .next()
        .and_then(|name| name.split('.').next())
        .unwrap_or(file)
        .to_string();
      out.push(StreetImage { id, image_url: url });
    }
    out
  }

  pub fn theme_json(&self) -> Result<serde_json::Value, ConfigError> {
    match &self.theme {
      Some(t) => serde_json::to_value(t).map_err(|e| ConfigError::Theme(e.to_string())),
      None => Ok(serde_json::Value::Object(Default::default())),
    }
  }
}

/// Parse a survey config from TOML text.
pub fn parse_survey_config(path: &str, text: &str) -> Result<SurveyConfig, ConfigError> {
  toml::from_str::<SurveyConfig>(text).map_err(|source| ConfigError::Parse { path: path.to_string(), source })
}

/// Load `SurveyConfig` from SURVEY_CONFIG_PATH. Unset means defaults; a file that
/// cannot be read or parsed is an error.
pub fn load_survey_config_from_env() -> Result<SurveyConfig, ConfigError> {
  let Ok(path) = std::env::var("SURVEY_CONFIG_PATH") else {
    info!(target: "survey_backend", "SURVEY_CONFIG_PATH not set; using built-in survey settings");
    return Ok(SurveyConfig::default());
  };
  let text = std::fs::read_to_string(&path).map_err(|source| {
    error!(target: "survey_backend", %path, error = %source, "Failed to read TOML config file");
    ConfigError::Read { path: path.clone(), source }
  })?;
  let cfg = parse_survey_config(&path, &text).inspect_err(|e| {
    error!(target: "survey_backend", %path, error = %e, "Failed to parse TOML config");
  })?;
  info!(target: "survey_backend", %path, images = cfg.configured_images().len(), "Loaded survey config (TOML)");
  Ok(cfg)
}

/// Connection settings for the hosted database.
#[derive(Clone, Debug)]
pub struct SupabaseConfig {
  pub url: String,
  pub anon_key: String,
  pub table: String,
}

impl SupabaseConfig {
  /// SUPABASE_URL and SUPABASE_ANON_KEY are mandatory; the service refuses to start
  /// without them.
  pub fn from_env() -> Result<Self, ConfigError> {
    let url = non_empty_env("SUPABASE_URL").ok_or(ConfigError::MissingEnv("SUPABASE_URL"))?;
    let anon_key = non_empty_env("SUPABASE_ANON_KEY").ok_or(ConfigError::MissingEnv("SUPABASE_ANON_KEY"))?;
    let table = non_empty_env("SUPABASE_TABLE").unwrap_or_else(|| DEFAULT_TABLE.into());
    Ok(Self { url, anon_key, table })
  }
}

/// Sessions (open or completed) older than this are dropped from memory.
pub const DEFAULT_SESSION_TTL_HOURS: u32 = 24;

/// SESSION_TTL_HOURS, a positive whole number of hours; anything else means the default.
pub fn session_ttl_from_env() -> chrono::Duration {
  let raw = std::env::var("SESSION_TTL_HOURS").ok();
  let ttl = session_ttl(raw.as_deref());
  info!(target: "survey_backend", hours = ttl.num_hours(), "Session lifetime");
  ttl
}

fn session_ttl(raw: Option<&str>) -> chrono::Duration {
  let hours = raw
    .and_then(|v| v.trim().parse::<u32>().ok())
    .filter(|h| *h > 0)
    .unwrap_or(DEFAULT_SESSION_TTL_HOURS);
  chrono::Duration::hours(i64::from(hours))
}

fn non_empty_env(key: &str) -> Option<String> {
  std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
