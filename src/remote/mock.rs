//! In-memory metadata store used for testing

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use super::SessionStore;
use super::types::{SessionRecord, StoreError};
use crate::surface::Theme;

#[derive(Debug, Default)]
struct StoreState {
    sessions: Vec<SessionRecord>,
    counter: u64,
    theme: Option<Theme>,
    fail_requests: bool,
    theme_writes: Vec<Theme>,
}

/// Metadata store kept in process memory. Mirrors the backend's naming:
/// an empty name becomes `Session N`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sessions(sessions: Vec<SessionRecord>) -> Self {
        let store = Self::default();
        {
            let mut state = store.lock();
            state.counter = sessions.len() as u64;
            state.sessions = sessions;
        }
        store
    }

    pub fn with_theme(self, theme: Theme) -> Self {
        self.lock().theme = Some(theme);
        self
    }

    /// Make every subsequent request fail
    pub fn set_failing(&self, failing: bool) {
        self.lock().fail_requests = failing;
    }

    pub fn sessions(&self) -> Vec<SessionRecord> {
        self.lock().sessions.clone()
    }

    pub fn theme_writes(&self) -> Vec<Theme> {
        self.lock().theme_writes.clone()
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check(&self) -> Result<MutexGuard<'_, StoreState>, StoreError> {
        let state = self.lock();
        if state.fail_requests {
            return Err(StoreError::Status(503, "store unavailable".to_string()));
        }
        Ok(state)
    }
}

#[async_trait]
impl SessionStore for InMemoryStore {
    async fn list_sessions(&self) -> Result<Vec<SessionRecord>, StoreError> {
        Ok(self.check()?.sessions.clone())
    }

    async fn create_session(&self, name: &str) -> Result<SessionRecord, StoreError> {
        let mut state = self.check()?;
        state.counter += 1;
        let name = if name.trim().is_empty() {
            format!("Session {}", state.counter)
        } else {
            name.to_string()
        };
        let record = SessionRecord::new(format!("mem-{}", state.counter), name);
        state.sessions.push(record.clone());
        Ok(record)
    }

    async fn rename_session(&self, id: &str, name: &str) -> Result<SessionRecord, StoreError> {
        let mut state = self.check()?;
        match state.sessions.iter_mut().find(|s| s.id == id) {
            Some(record) => {
                record.name = name.to_string();
                Ok(record.clone())
            }
            None => Err(StoreError::NotFound(id.to_string())),
        }
    }

    async fn delete_session(&self, id: &str) -> Result<(), StoreError> {
        let mut state = self.check()?;
        state.sessions.retain(|s| s.id != id);
        Ok(())
    }

    async fn get_theme(&self) -> Result<Option<Theme>, StoreError> {
        Ok(self.check()?.theme)
    }

    async fn set_theme(&self, theme: Theme) -> Result<(), StoreError> {
        let mut state = self.check()?;
        state.theme = Some(theme);
        state.theme_writes.push(theme);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_assigns_sequential_names() {
        let store = InMemoryStore::new();
        let first = store.create_session("").await.unwrap();
        let second = store.create_session("  ").await.unwrap();
        let named = store.create_session("build").await.unwrap();

        assert_eq!(first.name, "Session 1");
        assert_eq!(second.name, "Session 2");
        assert_eq!(named.name, "build");
        assert_ne!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_failing_store() {
        let store = InMemoryStore::new();
        store.set_failing(true);
        assert!(matches!(
            store.list_sessions().await,
            Err(StoreError::Status(503, _))
        ));
    }

    #[tokio::test]
    async fn test_rename_unknown_session() {
        let store = InMemoryStore::new();
        let result = store.rename_session("nope", "x").await;
        assert!(matches!(result, Err(StoreError::NotFound(id)) if id == "nope"));
    }
}
