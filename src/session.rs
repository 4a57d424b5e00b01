use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use uuid::Uuid;

use crate::i18n::Language;

const SESSION_FILE: &str = "session_id";
const LANGUAGE_FILE: &str = "language";

/// Per-machine persistent state: the anonymous session identifier that scopes
/// every server request, and the selected display language.
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    /// Opens the default state directory, creating it if needed.
    pub fn open() -> Result<Self> {
        let dir = Self::default_dir();
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create state directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    /// Opens an explicit directory. Used by tests and anywhere the state
    /// location must be injected.
    pub fn at(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn default_dir() -> PathBuf {
        if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "careerflow") {
            proj_dirs.data_dir().to_path_buf()
        } else {
            PathBuf::from(".careerflow")
        }
    }

    /// Returns the session identifier, generating and persisting a fresh one
    /// on first call. Once written the value never changes.
    pub fn session_id(&self) -> Result<String> {
        let path = self.dir.join(SESSION_FILE);
        if let Ok(existing) = fs::read_to_string(&path) {
            let trimmed = existing.trim();
            if !trimmed.is_empty() {
                return Ok(trimmed.to_string());
            }
        }
        let id = Uuid::new_v4().to_string();
        fs::write(&path, &id)
            .with_context(|| format!("failed to write session id to {}", path.display()))?;
        Ok(id)
    }

    /// Returns the persisted display language, defaulting to English.
    pub fn language(&self) -> Language {
        fs::read_to_string(self.dir.join(LANGUAGE_FILE))
            .ok()
            .and_then(|s| Language::parse(s.trim()))
            .unwrap_or_default()
    }

    pub fn set_language(&self, lang: Language) -> Result<()> {
        let path = self.dir.join(LANGUAGE_FILE);
        fs::write(&path, lang.as_str())
            .with_context(|| format!("failed to write language to {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_is_stable_across_calls() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SessionStore::at(tmp.path().to_path_buf());

        let first = store.session_id().unwrap();
        assert!(!first.is_empty());

        let second = store.session_id().unwrap();
        assert_eq!(first, second);

        // A second store over the same directory sees the same identifier.
        let reopened = SessionStore::at(tmp.path().to_path_buf());
        assert_eq!(reopened.session_id().unwrap(), first);
    }

    #[test]
    fn test_session_ids_differ_between_directories() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        let id_a = SessionStore::at(a.path().to_path_buf()).session_id().unwrap();
        let id_b = SessionStore::at(b.path().to_path_buf()).session_id().unwrap();
        assert_ne!(id_a, id_b);
    }

    #[test]
    fn test_language_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SessionStore::at(tmp.path().to_path_buf());

        assert_eq!(store.language(), Language::En);
        store.set_language(Language::Vi).unwrap();
        assert_eq!(store.language(), Language::Vi);
    }
}
