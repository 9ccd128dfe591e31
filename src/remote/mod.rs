//! Remote metadata store module
//!
//! Session metadata (id, name) and the theme preference live on the backend
//! behind a small REST collection API.

pub mod mock;
pub mod rest;
pub mod types;

use async_trait::async_trait;

use crate::surface::Theme;

pub use mock::InMemoryStore;
pub use rest::RestClient;
pub use types::{AgentSummary, SessionRecord, StoreError};

/// Operations the session controller needs from the metadata store
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn list_sessions(&self) -> Result<Vec<SessionRecord>, StoreError>;

    /// An empty `name` lets the server assign one
    async fn create_session(&self, name: &str) -> Result<SessionRecord, StoreError>;

    async fn rename_session(&self, id: &str, name: &str) -> Result<SessionRecord, StoreError>;

    async fn delete_session(&self, id: &str) -> Result<(), StoreError>;

    /// `Ok(None)` when the store keeps no theme
    async fn get_theme(&self) -> Result<Option<Theme>, StoreError>;

    async fn set_theme(&self, theme: Theme) -> Result<(), StoreError>;
}
