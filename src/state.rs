//! Application state: session store, image catalog, runtime settings, language
//! switcher and the persistence sink.
//!
//! This module owns:
//!   - the in-memory session map (one entry per participant attempt)
//!   - the image catalog + plan every session draws its assignment from
//!   - the survey settings, theme and contact block from TOML
//!   - the language switcher (with its preference store)
//!   - the response sink completed sessions are handed to

use std::{collections::HashMap, sync::Arc, time::Duration as StdDuration};

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::config::{
    load_survey_config_from_env, session_ttl_from_env, Contact, ImageSource, LogoPosition, RuntimeSettings,
    SupabaseConfig, SurveyConfig, DEFAULT_SESSION_TTL_HOURS,
};
use crate::error::{ApiError, StoreError};
use crate::images::{ImageAssignment, ImageCatalog, ImagePlan};
use crate::session::Session;
use crate::supabase::{ResponseSink, SupabaseClient};
use crate::switcher::{FileLanguageStore, LanguageStore, LanguageSwitcher, MemoryLanguageStore};

/// How often the sweeper looks for expired sessions.
pub const SWEEP_INTERVAL: StdDuration = StdDuration::from_secs(10 * 60);

/// One entry of the session map. A completed session keeps only the time it was
/// handed off, enough to answer a resubmission with 409.
#[derive(Clone, Debug)]
pub enum SessionSlot {
    Open(Session),
    Completed { at: DateTime<Utc> },
}

impl SessionSlot {
    fn since(&self) -> DateTime<Utc> {
        match self {
            SessionSlot::Open(s) => s.created_at,
            SessionSlot::Completed { at } => *at,
        }
    }
}

pub struct AppState {
    pub sessions: Arc<RwLock<HashMap<Uuid, SessionSlot>>>,
    pub session_ttl: Duration,
    pub catalog: ImageCatalog,
    pub plan: ImagePlan,
    pub settings: RuntimeSettings,
    pub theme: Value,
    pub contact: Option<Contact>,
    pub logo: Option<String>,
    pub logo_position: Option<LogoPosition>,
    pub switcher: Arc<LanguageSwitcher>,
    pub sink: Arc<dyn ResponseSink>,
}

impl AppState {
    /// Assemble state from already-loaded parts.
    pub fn new(
        cfg: SurveyConfig,
        catalog: ImageCatalog,
        switcher: LanguageSwitcher,
        sink: Arc<dyn ResponseSink>,
    ) -> Result<Self, crate::error::ConfigError> {
        let theme = cfg.theme_json()?;
        Ok(Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            session_ttl: Duration::hours(i64::from(DEFAULT_SESSION_TTL_HOURS)),
            catalog,
            plan: ImagePlan::default(),
            settings: cfg.settings,
            theme,
            contact: cfg.contact,
            logo: cfg.logo,
            logo_position: cfg.logo_position,
            switcher: Arc::new(switcher),
            sink,
        })
    }

    /// Build state from env: Supabase settings (mandatory), TOML config, image catalog,
    /// language store, session lifetime.
    #[instrument(level = "info", skip_all)]
    pub async fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let supabase_cfg = SupabaseConfig::from_env().inspect_err(|e| {
            error!(target: "survey_backend", error = %e, "Refusing to start without persistence settings");
        })?;
        let cfg = load_survey_config_from_env()?;
        let client = SupabaseClient::new(&supabase_cfg)?;
        info!(target: "survey_backend", base_url = %client.base_url, table = %client.table, "Persistence enabled.");

        let mut images = cfg.configured_images();
        if cfg.image_source == ImageSource::Database {
            match client.fetch_active_images().await {
                Ok(rows) if !rows.is_empty() => images = rows,
                Ok(_) => warn!(target: "survey_backend", "street_images has no active rows; using configured images"),
                Err(e) => error!(target: "survey_backend", error = %e, "Fetching street images failed; using configured images"),
            }
        }
        let catalog = ImageCatalog::new(images);
        if catalog.is_empty() {
            warn!(target: "survey_backend", "Image catalog is empty; image questions will have no choices");
        } else {
            info!(target: "survey_backend", images = catalog.len(), "Image catalog ready");
        }

        let store: Box<dyn LanguageStore> = match std::env::var("LANGUAGE_STORE_PATH") {
            Ok(path) => Box::new(FileLanguageStore::open(path)?),
            Err(_) => {
                info!(target: "survey_backend", "LANGUAGE_STORE_PATH not set; language preferences kept in memory");
                Box::new(MemoryLanguageStore::default())
            }
        };

        let mut state = Self::new(cfg, catalog, LanguageSwitcher::new(store), Arc::new(client))?;
        state.session_ttl = session_ttl_from_env();
        Ok(state)
    }

    /// Start a session: resolve the language and draw the image assignment once.
    #[instrument(level = "info", skip(self))]
    pub async fn start_session(&self, client_id: Option<String>, requested: Option<String>) -> Session {
        let language = self.switcher.initial_language(client_id.as_deref(), requested.as_deref());
        let seed: u64 = rand::random();
        let assignment = ImageAssignment::generate(&self.catalog, &self.plan, seed);
        let session = Session::new(client_id, language, assignment);
        self.sessions.write().await.insert(session.id, SessionSlot::Open(session.clone()));
        info!(target: "session", id = %session.id, %language, seed, "Session started");
        session
    }

    /// Snapshot of an open session by id (string form from the URL).
    pub async fn get_session(&self, id: &str) -> Result<Session, ApiError> {
        let uuid = parse_id(id)?;
        match self.sessions.read().await.get(&uuid) {
            Some(SessionSlot::Open(session)) => Ok(session.clone()),
            Some(SessionSlot::Completed { .. }) => Err(ApiError::AlreadyCompleted(id.to_string())),
            None => Err(ApiError::UnknownSession(id.to_string())),
        }
    }

    /// Toggle a session's language, persist the preference, and return the updated session.
    /// The image assignment is left untouched. The preference write runs on the blocking
    /// pool with no lock on the session map held.
    #[instrument(level = "info", skip(self), fields(%id))]
    pub async fn switch_language(&self, id: &str) -> Result<Session, ApiError> {
        let uuid = parse_id(id)?;
        let (key, current) = {
            let session = self.get_session(id).await?;
            (session.preference_key(), session.language)
        };

        let switcher = Arc::clone(&self.switcher);
        let next = tokio::task::spawn_blocking(move || switcher.toggle(&key, current))
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))??;

        match self.sessions.write().await.get_mut(&uuid) {
            Some(SessionSlot::Open(session)) => {
                session.language = next;
                Ok(session.clone())
            }
            Some(SessionSlot::Completed { .. }) => Err(ApiError::AlreadyCompleted(id.to_string())),
            None => Err(ApiError::UnknownSession(id.to_string())),
        }
    }

    /// Hand an open session off for completion. Exactly one caller wins; the map keeps
    /// only a completion marker afterwards.
    pub async fn begin_completion(&self, id: &str) -> Result<Session, ApiError> {
        let uuid = parse_id(id)?;
        let mut sessions = self.sessions.write().await;
        let slot = sessions.get_mut(&uuid).ok_or_else(|| ApiError::UnknownSession(id.to_string()))?;
        match std::mem::replace(slot, SessionSlot::Completed { at: Utc::now() }) {
            SessionSlot::Open(mut session) => {
                session.complete();
                Ok(session)
            }
            done @ SessionSlot::Completed { .. } => {
                *slot = done;
                Err(ApiError::AlreadyCompleted(id.to_string()))
            }
        }
    }

    /// Drop every entry older than the session lifetime as of `now`. Returns how many
    /// were removed.
    pub async fn sweep_expired(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, slot| now.signed_duration_since(slot.since()) < self.session_ttl);
        before - sessions.len()
    }

    /// Periodic sweep; runs for the lifetime of the process.
    pub async fn run_session_sweeper(self: Arc<Self>, every: StdDuration) {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            let dropped = self.sweep_expired(Utc::now()).await;
            if dropped > 0 {
                info!(target: "session", dropped, "Expired sessions removed");
            }
        }
    }
}

fn parse_id(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|_| ApiError::UnknownSession(id.to_string()))
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::error::PersistError;
    use crate::images::test_catalog;
    use crate::session::CompletionPayload;
    use crate::supabase::{generate_participant_id, SavedRecord};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records payloads; fails every call when `fail` is set.
    #[derive(Default)]
    pub struct RecordingSink {
        pub fail: bool,
        pub saved: Mutex<Vec<CompletionPayload>>,
    }

    #[async_trait]
    impl ResponseSink for RecordingSink {
        async fn save(&self, payload: &CompletionPayload) -> Result<SavedRecord, PersistError> {
            if self.fail {
                return Err(PersistError::Transport("connection reset by peer".into()));
            }
            self.saved.lock().unwrap().push(payload.clone());
            Ok(SavedRecord { participant_id: generate_participant_id(), data: Value::Array(vec![]) })
        }
    }

    pub fn state_with(sink: Arc<RecordingSink>) -> AppState {
        state_from(test_catalog(40), Box::new(MemoryLanguageStore::default()), sink)
    }

    pub fn state_from(catalog: ImageCatalog, store: Box<dyn LanguageStore>, sink: Arc<RecordingSink>) -> AppState {
        AppState::new(SurveyConfig::default(), catalog, LanguageSwitcher::new(store), sink).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use crate::i18n::Language;
    use crate::images::test_catalog;
    use std::sync::{mpsc, Mutex as StdMutex};
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn language_switch_keeps_the_image_assignment() {
        let state = state_with(Arc::new(RecordingSink::default()));
        let s = state.start_session(Some("client-x".into()), None).await;
        assert_eq!(s.language, Language::Zh);

        let id = s.id.to_string();
        let switched = state.switch_language(&id).await.unwrap();
        assert_eq!(switched.language, Language::En);
        assert_eq!(switched.assignment, s.assignment);
        assert_eq!(state.switcher.stored("client-x"), Some(Language::En));

        // a new session for the same browser starts in the stored language
        let next = state.start_session(Some("client-x".into()), None).await;
        assert_eq!(next.language, Language::En);
    }

    #[tokio::test]
    async fn completion_is_claimed_once() {
        let state = state_with(Arc::new(RecordingSink::default()));
        let id = state.start_session(None, Some("en".into())).await.id.to_string();
        let handed_off = state.begin_completion(&id).await.unwrap();
        assert!(!handed_off.is_active());
        assert!(matches!(state.begin_completion(&id).await, Err(ApiError::AlreadyCompleted(_))));
        assert!(matches!(state.switch_language(&id).await, Err(ApiError::AlreadyCompleted(_))));
        assert!(matches!(state.get_session(&id).await, Err(ApiError::AlreadyCompleted(_))));
    }

    #[tokio::test]
    async fn completed_sessions_keep_only_a_marker() {
        let state = state_with(Arc::new(RecordingSink::default()));
        for _ in 0..100 {
            let id = state.start_session(None, None).await.id.to_string();
            state.begin_completion(&id).await.unwrap();
        }
        let sessions = state.sessions.read().await;
        assert_eq!(sessions.len(), 100);
        assert!(sessions.values().all(|slot| matches!(slot, SessionSlot::Completed { .. })));
    }

    #[tokio::test]
    async fn sweep_drops_expired_sessions_and_markers() {
        let state = state_with(Arc::new(RecordingSink::default()));
        let open = state.start_session(None, None).await.id.to_string();
        let done = state.start_session(None, None).await.id.to_string();
        state.begin_completion(&done).await.unwrap();

        assert_eq!(state.sweep_expired(Utc::now()).await, 0);
        assert!(state.get_session(&open).await.is_ok());

        let later = Utc::now() + state.session_ttl + Duration::minutes(1);
        assert_eq!(state.sweep_expired(later).await, 2);
        assert!(state.sessions.read().await.is_empty());
        assert!(matches!(state.get_session(&open).await, Err(ApiError::UnknownSession(_))));
    }

    struct FailingStore;

    impl LanguageStore for FailingStore {
        fn load(&self, _client: &str) -> Option<String> {
            None
        }
        fn store(&self, _client: &str, _code: &str) -> Result<(), StoreError> {
            Err(StoreError::Io(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only")))
        }
    }

    #[tokio::test]
    async fn failed_preference_write_leaves_the_session_language() {
        let state = state_from(test_catalog(10), Box::new(FailingStore), Arc::new(RecordingSink::default()));
        let id = state.start_session(None, None).await.id.to_string();
        assert!(matches!(state.switch_language(&id).await, Err(ApiError::Store(_))));
        assert_eq!(state.get_session(&id).await.unwrap().language, Language::Zh);
    }

    /// Blocks inside `store` until released, announcing when it got there.
    struct GatedStore {
        entered: StdMutex<Option<oneshot::Sender<()>>>,
        release: StdMutex<mpsc::Receiver<()>>,
    }

    impl LanguageStore for GatedStore {
        fn load(&self, _client: &str) -> Option<String> {
            None
        }
        fn store(&self, _client: &str, _code: &str) -> Result<(), StoreError> {
            if let Some(tx) = self.entered.lock().unwrap().take() {
                let _ = tx.send(());
            }
            let _ = self.release.lock().unwrap().recv();
            Ok(())
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn slow_preference_write_does_not_block_other_sessions() {
        let (entered_tx, entered_rx) = oneshot::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let store = GatedStore { entered: StdMutex::new(Some(entered_tx)), release: StdMutex::new(release_rx) };
        let state = Arc::new(state_from(test_catalog(10), Box::new(store), Arc::new(RecordingSink::default())));
        let a = state.start_session(None, None).await.id.to_string();
        let b = state.start_session(None, None).await.id.to_string();

        let switching = tokio::spawn({
            let state = Arc::clone(&state);
            async move { state.switch_language(&a).await }
        });
        entered_rx.await.unwrap();

        let limit = StdDuration::from_secs(1);
        assert!(matches!(tokio::time::timeout(limit, state.get_session(&b)).await, Ok(Ok(_))));
        assert!(tokio::time::timeout(limit, state.start_session(None, None)).await.is_ok());
        assert!(matches!(tokio::time::timeout(limit, state.begin_completion(&b)).await, Ok(Ok(_))));

        release_tx.send(()).unwrap();
        assert_eq!(switching.await.unwrap().unwrap().language, Language::En);
    }

    #[tokio::test]
    async fn unknown_ids_are_rejected() {
        let state = state_with(Arc::new(RecordingSink::default()));
        assert!(matches!(state.get_session("nope").await, Err(ApiError::UnknownSession(_))));
        let random = Uuid::new_v4().to_string();
        assert!(matches!(state.switch_language(&random).await, Err(ApiError::UnknownSession(_))));
    }
}
