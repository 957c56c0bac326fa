//! Language switcher and the storage seam behind it.
//!
//! The preference is stored per browser (client id) under the `survey-language` key,
//! the same key the survey front end uses in its own local storage.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{Mutex, RwLock},
};

use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

use crate::error::StoreError;
use crate::i18n::Language;

pub const LANGUAGE_KEY: &str = "survey-language";

/// `get/set language` for one client.
pub trait LanguageStore: Send + Sync {
    fn load(&self, client: &str) -> Option<String>;
    fn store(&self, client: &str, code: &str) -> Result<(), StoreError>;
}

/// Process-local store; preferences are lost on restart.
#[derive(Default)]
pub struct MemoryLanguageStore {
    entries: RwLock<HashMap<String, String>>,
}

impl LanguageStore for MemoryLanguageStore {
    fn load(&self, client: &str) -> Option<String> {
        self.entries.read().ok()?.get(client).cloned()
    }

    fn store(&self, client: &str, code: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.write().map_err(|_| StoreError::Unavailable("lock poisoned".into()))?;
        entries.insert(client.to_string(), code.to_string());
        Ok(())
    }
}

type ClientEntries = HashMap<String, HashMap<String, String>>;

/// JSON file store: `{ "<client>": { "survey-language": "en" } }`.
/// Every write rewrites the file through a temp file + rename.
pub struct FileLanguageStore {
    path: PathBuf,
    entries: Mutex<ClientEntries>,
}

impl FileLanguageStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let entries = match std::fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => ClientEntries::new(),
            Ok(text) => serde_json::from_str(&text)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => ClientEntries::new(),
            Err(e) => return Err(e.into()),
        };
        info!(target: "survey_backend", path = %path.display(), clients = entries.len(), "Language store opened");
        Ok(Self { path, entries: Mutex::new(entries) })
    }

    fn flush(&self, entries: &ClientEntries) -> Result<(), StoreError> {
        let text = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, text)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl LanguageStore for FileLanguageStore {
    fn load(&self, client: &str) -> Option<String> {
        let entries = self.entries.lock().ok()?;
        entries.get(client)?.get(LANGUAGE_KEY).cloned()
    }

    /// The in-memory map only changes once the file on disk holds the new value.
    fn store(&self, client: &str, code: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_| {
            warn!(target: "survey_backend", "Language store lock poisoned; preference not saved");
            StoreError::Unavailable("lock poisoned".into())
        })?;
        let mut next = entries.clone();
        next.entry(client.to_string())
            .or_default()
            .insert(LANGUAGE_KEY.to_string(), code.to_string());
        self.flush(&next)?;
        *entries = next;
        Ok(())
    }
}

/// Text for the switch button, in the language currently shown.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SwitcherLabel {
    pub text: &'static str,
    pub tooltip: &'static str,
    pub flag: &'static str,
    /// Language the button switches to.
    pub target: Language,
}

pub struct LanguageSwitcher {
    store: Box<dyn LanguageStore>,
}

impl LanguageSwitcher {
    pub fn new(store: Box<dyn LanguageStore>) -> Self {
        Self { store }
    }

    /// Explicit request first, then the stored preference, then the default.
    #[instrument(level = "debug", skip(self))]
    pub fn initial_language(&self, client: Option<&str>, requested: Option<&str>) -> Language {
        if let Some(code) = requested {
            return Language::resolve(code);
        }
        client
            .and_then(|c| self.store.load(c))
            .map(|code| Language::resolve(&code))
            .unwrap_or_default()
    }

    /// Flip the language and persist the new value for `client`.
    #[instrument(level = "info", skip(self), fields(from = %current))]
    pub fn toggle(&self, client: &str, current: Language) -> Result<Language, StoreError> {
        let next = current.toggle();
        self.store.store(client, next.code()).inspect_err(|e| {
            error!(target: "session", %client, error = %e, "Failed to persist language preference");
        })?;
        debug!(target: "session", %client, to = %next, "Language preference stored");
        Ok(next)
    }

    #[cfg(test)]
    pub fn stored(&self, client: &str) -> Option<Language> {
        self.store.load(client).and_then(|c| Language::parse(&c))
    }

    pub fn label(current: Language) -> SwitcherLabel {
        let t = current.strings();
        SwitcherLabel {
            text: t.language_switch,
            tooltip: t.language_switch_tooltip,
            flag: match current {
                Language::Zh => "🇺🇸",
                Language::En => "🇨🇳",
            },
            target: current.toggle(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn switcher() -> LanguageSwitcher {
        LanguageSwitcher::new(Box::new(MemoryLanguageStore::default()))
    }

    #[test]
    fn defaults_to_chinese() {
        let s = switcher();
        assert_eq!(s.initial_language(None, None), Language::Zh);
        assert_eq!(s.initial_language(Some("nobody"), None), Language::Zh);
        assert_eq!(s.initial_language(None, Some("klingon")), Language::Zh);
    }

    #[test]
    fn toggle_persists_and_is_read_back() {
        let s = switcher();
        let next = s.toggle("client-a", Language::Zh).unwrap();
        assert_eq!(next, Language::En);
        assert_eq!(s.stored("client-a"), Some(Language::En));
        assert_eq!(s.initial_language(Some("client-a"), None), Language::En);
        // explicit request wins over the stored value
        assert_eq!(s.initial_language(Some("client-a"), Some("zh")), Language::Zh);

        let back = s.toggle("client-a", next).unwrap();
        assert_eq!(back, Language::Zh);
        assert_eq!(s.stored("client-a"), Some(Language::Zh));
    }

    #[test]
    fn label_points_at_the_other_language() {
        let zh = LanguageSwitcher::label(Language::Zh);
        assert_eq!(zh.text, "English");
        assert_eq!(zh.target, Language::En);
        let en = LanguageSwitcher::label(Language::En);
        assert_eq!(en.tooltip, "切换到中文");
        assert_eq!(en.target, Language::Zh);
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("languages.json");
        {
            let store = FileLanguageStore::open(&path).unwrap();
            assert_eq!(store.load("c1"), None);
            store.store("c1", "en").unwrap();
            store.store("c2", "zh").unwrap();
        }
        let reopened = FileLanguageStore::open(&path).unwrap();
        assert_eq!(reopened.load("c1").as_deref(), Some("en"));
        assert_eq!(reopened.load("c2").as_deref(), Some("zh"));

        let raw: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["c1"][LANGUAGE_KEY], "en");
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("languages.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(FileLanguageStore::open(&path), Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn unwritable_store_surfaces_the_error() {
        let dir = tempfile::tempdir().unwrap();
        // a directory where the file should be makes the rename fail
        let path = dir.path().join("as_dir");
        std::fs::create_dir(&path).unwrap();
        std::fs::create_dir(path.with_extension("tmp")).unwrap();
        let store = FileLanguageStore { path, entries: Mutex::new(ClientEntries::new()) };
        let s = LanguageSwitcher::new(Box::new(store));
        assert!(s.toggle("c", Language::Zh).is_err());
        // nothing half-saved: the next session still starts in the default language
        assert_eq!(s.stored("c"), None);
        assert_eq!(s.initial_language(Some("c"), None), Language::Zh);
    }

    #[test]
    fn poisoned_lock_is_an_error_not_a_silent_success() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileLanguageStore::open(dir.path().join("languages.json")).unwrap();
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = store.entries.lock().unwrap();
            panic!("poison the lock");
        }));
        assert!(matches!(store.store("c", "en"), Err(StoreError::Unavailable(_))));

        let memory = MemoryLanguageStore::default();
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = memory.entries.write().unwrap();
            panic!("poison the lock");
        }));
        assert!(matches!(memory.store("c", "en"), Err(StoreError::Unavailable(_))));
    }
}
