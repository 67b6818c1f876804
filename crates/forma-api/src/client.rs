//! Formation REST client.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use forma_common::{FormaError, Formation, FormationSource};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::ids::to_numeric_id;
use crate::types::{FormationSummary, LessonUpdate, ModuleUpdate};
use crate::ApiError;

/// Authenticated client for the formation CRUD endpoints.
pub struct FormationClient {
    base_url: String,
    token: String,
    http: reqwest::Client,
}

impl fmt::Debug for FormationClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormationClient")
            .field("base_url", &self.base_url)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl FormationClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            http: reqwest::Client::builder()
                .connect_timeout(Duration::from_secs(10))
                .timeout(Duration::from_secs(30))
                .build()
                .expect("failed to build HTTP client"),
        }
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// `GET /formations/{id}`.
    pub async fn get_formation(&self, formation_id: &str) -> Result<Formation, ApiError> {
        let url = self.url(&format!("/formations/{formation_id}"));
        debug!(%url, "fetching formation");
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        parse_json(response).await
    }

    /// `GET /formations/`.
    pub async fn list_formations(&self) -> Result<Vec<FormationSummary>, ApiError> {
        let response = self
            .http
            .get(self.url("/formations/"))
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        parse_json(response).await
    }

    /// `PUT /modules/{n}` where `n` is the numeric form of `module_id`.
    pub async fn update_module(&self, module_id: &str, update: &ModuleUpdate) -> Result<(), ApiError> {
        let numeric = to_numeric_id(module_id)?;
        self.put(&format!("/modules/{numeric}"), update).await
    }

    /// `PUT /submodules/{n}` where `n` is the numeric form of `lesson_id`.
    pub async fn update_lesson(&self, lesson_id: &str, update: &LessonUpdate) -> Result<(), ApiError> {
        let numeric = to_numeric_id(lesson_id)?;
        self.put(&format!("/submodules/{numeric}"), update).await
    }

    async fn put(&self, path: &str, body: &impl Serialize) -> Result<(), ApiError> {
        let url = self.url(path);
        debug!(%url, "updating resource");
        let response = self
            .http
            .put(&url)
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        ensure_success(response).await.map(drop)
    }
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Status {
        status: status.as_u16(),
        body: body.chars().take(200).collect(),
    })
}

async fn parse_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    ensure_success(response)
        .await?
        .json()
        .await
        .map_err(|e| ApiError::Parse(e.to_string()))
}

#[async_trait]
impl FormationSource for FormationClient {
    async fn fetch_formation(&self, formation_id: &str) -> Result<Formation, FormaError> {
        Ok(self.get_formation(formation_id).await?)
    }
}
