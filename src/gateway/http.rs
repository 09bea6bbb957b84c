use super::entities::{CharacterState, Item, ItemFilter, MapTile, Monster, TaskInfo};
use super::types::{ActionOutcome, ActionPayload, ActionRequest, GameError};
use super::ActionGateway;
use crate::error::GatewayError;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

/// Shared HTTP client with pool tuning for long-running sessions.
pub fn build_api_client() -> Client {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60))
        .build()
        .unwrap_or_else(|_| Client::new())
}

#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: GameError,
}

/// Gateway to the remote game API. Performs exactly one HTTP round-trip per
/// call; retry policy lives with the callers.
pub struct HttpGateway {
    base_url: String,
    /// Pre-computed `"Bearer <token>"` header value.
    cached_auth_header: Option<String>,
    client: Client,
}

impl HttpGateway {
    pub fn new(base_url: &str, token: Option<&str>) -> Self {
        Self::with_client(base_url, token, build_api_client())
    }

    pub fn with_client(base_url: &str, token: Option<&str>, client: Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            cached_auth_header: token.map(|t| format!("Bearer {t}")),
            client,
        }
    }

    fn auth_header(&self) -> Result<&str, GatewayError> {
        self.cached_auth_header
            .as_deref()
            .ok_or(GatewayError::MissingToken)
    }

    async fn get_data<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, GatewayError> {
        let url = format!("{}{path}", self.base_url);
        let mut request = self.client.get(&url).query(query);
        if let Some(auth) = self.cached_auth_header.as_deref() {
            request = request.header("Authorization", auth);
        }
        let response = request.send().await.map_err(|e| GatewayError::Request {
            endpoint: path.to_string(),
            message: e.to_string(),
        })?;
        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Request {
                endpoint: path.to_string(),
                message: format!("status {status}"),
            });
        }
        let envelope: DataEnvelope<T> =
            response.json().await.map_err(|e| GatewayError::Decode {
                endpoint: path.to_string(),
                message: e.to_string(),
            })?;
        Ok(envelope.data)
    }
}

#[async_trait]
impl ActionGateway for HttpGateway {
    async fn perform(
        &self,
        character: &str,
        request: &ActionRequest,
    ) -> Result<ActionOutcome, GatewayError> {
        let route = request.route();
        let endpoint = format!("/my/{character}/action/{route}");
        let url = format!("{}{endpoint}", self.base_url);

        let mut http_request = self
            .client
            .post(&url)
            .header("Authorization", self.auth_header()?);
        if let Some(body) = request.body() {
            http_request = http_request.json(&body);
        }

        let response = http_request
            .send()
            .await
            .map_err(|e| GatewayError::Request {
                endpoint: endpoint.clone(),
                message: e.to_string(),
            })?;
        let status = response.status();
        let body = response.text().await.map_err(|e| GatewayError::Decode {
            endpoint: endpoint.clone(),
            message: e.to_string(),
        })?;

        // The server reports domain failures with non-2xx status but a
        // well-formed error envelope; both shapes are decoded from the body.
        if let Ok(envelope) = serde_json::from_str::<DataEnvelope<ActionPayload>>(&body) {
            tracing::debug!(action = %request, "action succeeded");
            return Ok(ActionOutcome::Success(envelope.data));
        }
        if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(&body) {
            tracing::debug!(action = %request, code = envelope.error.code, "action failed");
            return Ok(ActionOutcome::Failure(envelope.error));
        }
        Err(GatewayError::Decode {
            endpoint,
            message: format!("status {status}, unrecognized body"),
        })
    }

    async fn fetch_maps(
        &self,
        content_type: Option<&str>,
    ) -> Result<Vec<MapTile>, GatewayError> {
        let mut query = Vec::new();
        if let Some(content_type) = content_type {
            query.push(("content_type", content_type.to_string()));
        }
        self.get_data("/maps", &query).await
    }

    async fn fetch_monsters(&self) -> Result<Vec<Monster>, GatewayError> {
        self.get_data("/monsters", &[]).await
    }

    async fn fetch_items(&self, filter: &ItemFilter) -> Result<Vec<Item>, GatewayError> {
        let mut query = Vec::new();
        if let Some(item_type) = &filter.item_type {
            query.push(("type", item_type.clone()));
        }
        if let Some(craft_skill) = &filter.craft_skill {
            query.push(("craft_skill", craft_skill.clone()));
        }
        if let Some(max_level) = filter.max_level {
            query.push(("max_level", max_level.to_string()));
        }
        if let Some(name) = &filter.name {
            query.push(("name", name.clone()));
        }
        self.get_data("/items", &query).await
    }

    async fn fetch_character(&self, name: &str) -> Result<CharacterState, GatewayError> {
        self.get_data(&format!("/characters/{name}"), &[]).await
    }

    async fn fetch_task(&self, code: &str) -> Result<TaskInfo, GatewayError> {
        self.get_data(&format!("/tasks/list/{code}"), &[]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_trailing_slash() {
        let gateway = HttpGateway::new("https://api.example.com/", Some("tok"));
        assert_eq!(gateway.base_url, "https://api.example.com");
    }

    #[test]
    fn caches_bearer_header() {
        let gateway = HttpGateway::new("https://api.example.com", Some("tok"));
        assert_eq!(gateway.cached_auth_header.as_deref(), Some("Bearer tok"));
    }

    #[tokio::test]
    async fn perform_fails_without_token() {
        let gateway = HttpGateway::new("https://api.example.com", None);
        let result = gateway.perform("Lukas", &ActionRequest::Rest).await;
        assert!(matches!(result, Err(GatewayError::MissingToken)));
    }
}
