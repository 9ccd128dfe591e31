//! Metadata store REST client implementation

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use super::SessionStore;
use super::types::{
    AgentSummary, SessionNameRequest, SessionRecord, SessionResponse, StoreError, ThemeRequest,
    ThemeResponse,
};
use crate::surface::Theme;

/// REST client for the session backend
#[derive(Debug, Clone)]
pub struct RestClient {
    base_url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl RestClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `/sessions/{id}` with the id encoded as one path segment
    fn session_url(&self, id: &str) -> Result<Url, StoreError> {
        let sessions = self.url("/sessions");
        let mut url = Url::parse(&sessions)
            .map_err(|e| StoreError::InvalidUrl(format!("{}: {}", sessions, e)))?;
        url.path_segments_mut()
            .map_err(|_| StoreError::InvalidUrl(sessions.clone()))?
            .push(id);
        Ok(url)
    }

    /// List configured agents
    pub async fn list_agents(&self) -> Result<Vec<AgentSummary>, StoreError> {
        let url = self.url("/agents");
        debug!("Fetching agents from: {}", url);
        let response = self.client.get(&url).timeout(self.timeout).send().await?;
        read_json(response).await
    }

    /// List tool names agents may be granted
    pub async fn list_available_tools(&self) -> Result<Vec<String>, StoreError> {
        let url = self.url("/available-tools");
        debug!("Fetching available tools from: {}", url);
        let response = self.client.get(&url).timeout(self.timeout).send().await?;
        read_json(response).await
    }

    fn record_from(response: SessionResponse, id: Option<&str>) -> Result<SessionRecord, StoreError> {
        match response {
            SessionResponse::Record(record) => Ok(record),
            SessionResponse::Failure { error } => match id {
                Some(id) if error.to_ascii_lowercase().contains("not found") => {
                    Err(StoreError::NotFound(id.to_string()))
                }
                _ => Err(StoreError::Rejected(error)),
            },
        }
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, StoreError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(StoreError::Status(status.as_u16(), body));
    }
    Ok(response.json().await?)
}

#[async_trait]
impl SessionStore for RestClient {
    async fn list_sessions(&self) -> Result<Vec<SessionRecord>, StoreError> {
        let url = self.url("/sessions");
        debug!("Fetching sessions from: {}", url);

        let response = self.client.get(&url).timeout(self.timeout).send().await?;
        let sessions: Vec<SessionRecord> = read_json(response).await?;

        debug!("Fetched {} sessions", sessions.len());
        Ok(sessions)
    }

    async fn create_session(&self, name: &str) -> Result<SessionRecord, StoreError> {
        let response = self
            .client
            .post(self.url("/sessions"))
            .json(&SessionNameRequest { name })
            .timeout(self.timeout)
            .send()
            .await?;

        let record = Self::record_from(read_json(response).await?, None)?;
        info!("Created session {} ({})", record.name, record.id);
        Ok(record)
    }

    async fn rename_session(&self, id: &str, name: &str) -> Result<SessionRecord, StoreError> {
        let response = self
            .client
            .put(self.session_url(id)?)
            .json(&SessionNameRequest { name })
            .timeout(self.timeout)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound(id.to_string()));
        }

        let record = Self::record_from(read_json(response).await?, Some(id))?;
        info!("Renamed session {} to {}", record.id, record.name);
        Ok(record)
    }

    async fn delete_session(&self, id: &str) -> Result<(), StoreError> {
        let response = self
            .client
            .delete(self.session_url(id)?)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Status(status.as_u16(), body));
        }

        info!("Deleted session {}", id);
        Ok(())
    }

    async fn get_theme(&self) -> Result<Option<Theme>, StoreError> {
        let response = self
            .client
            .get(self.url("/theme"))
            .timeout(self.timeout)
            .send()
            .await?;

        // Older backends only accept writes to /theme
        if matches!(
            response.status(),
            StatusCode::NOT_FOUND | StatusCode::METHOD_NOT_ALLOWED
        ) {
            debug!("Theme endpoint not readable, status {}", response.status());
            return Ok(None);
        }

        let body: ThemeResponse = read_json(response).await?;
        Ok(body.theme)
    }

    async fn set_theme(&self, theme: Theme) -> Result<(), StoreError> {
        let response = self
            .client
            .post(self.url("/theme"))
            .json(&ThemeRequest { theme })
            .timeout(self.timeout)
            .send()
            .await?;

        let body: ThemeResponse = read_json(response).await?;
        if body.status.as_deref() == Some("error") {
            return Err(StoreError::Rejected(
                body.message.unwrap_or_else(|| "theme rejected".to_string()),
            ));
        }

        info!("Persisted theme {}", theme);
        Ok(())
    }
}
