//! Metadata store data types

use serde::{Deserialize, Serialize};

use crate::surface::Theme;

/// One session as reported by the metadata store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: String,
    pub name: String,
}

impl SessionRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Request body for create/rename
#[derive(Debug, Serialize)]
pub struct SessionNameRequest<'a> {
    pub name: &'a str,
}

/// Create/rename answer: the backend reports failures in the body
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SessionResponse {
    Record(SessionRecord),
    Failure { error: String },
}

/// Agent configuration summary (list only)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub resources: Vec<serde_json::Value>,
    #[serde(default)]
    pub tools: Vec<String>,
    #[serde(default)]
    pub mcp_servers: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ThemeRequest {
    pub theme: Theme,
}

/// Theme endpoint answer
#[derive(Debug, Deserialize)]
pub struct ThemeResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub theme: Option<Theme>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Error types for metadata store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP status error: {0} - {1}")]
    Status(u16, String),
    #[error("Request rejected: {0}")]
    Rejected(String),
    #[error("Session not found: {0}")]
    NotFound(String),
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}
