//! `reqwest` implementation of the gateway.

use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::{
    Capabilities, Gateway, GatewayError, NewRepository, Repository, RepositoryChanges, Result,
    Task,
};
use crate::state::UpdateCandidate;
use crate::util::percent_encode;

/// Path prefix of the plugin API below the server URL.
const PLUGIN_PREFIX: &str = "plugins/gingerbase";

/// HTTP gateway bound to one panel server.
#[derive(Clone, Debug)]
pub struct HttpGateway {
    client: reqwest::Client,
    base: String,
}

impl HttpGateway {
    /// What: Build a gateway for `server_url`.
    ///
    /// Inputs:
    /// - `server_url`: Panel root, e.g. `https://host:8001`.
    /// - `timeout`: Per-request timeout.
    ///
    /// Output:
    /// - Gateway or a transport error when the client cannot be built.
    ///
    /// # Errors
    /// - Returns `RemoteUnavailable` when the TLS backend fails to initialise.
    pub fn new(server_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(timeout)
            .user_agent(format!("hostupd/{}", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base: format!("{}/{PLUGIN_PREFIX}", server_url.trim_end_matches('/')),
        })
    }

    /// Absolute URL of an API path.
    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base, path.trim_start_matches('/'))
    }

    /// What: Send a request and return the raw success response.
    ///
    /// Details:
    /// - Non-2xx responses become `RemoteRejected`, using the `reason` field of a
    ///   JSON error body when the server sent one.
    async fn send<B: Serialize + Sync>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<reqwest::Response> {
        let url = self.url(path);
        tracing::debug!(method = %method, url = %url, "request");
        let mut req = self
            .client
            .request(method, &url)
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(b) = body {
            req = req.json(b);
        }
        let resp = req.send().await.map_err(|e| {
            tracing::warn!(url = %url, error = %e, "request failed");
            GatewayError::from(e)
        })?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let text = resp.text().await.unwrap_or_default();
        let reason = rejection_reason(status, &text);
        tracing::warn!(url = %url, status = status.as_u16(), reason = %reason, "request rejected");
        Err(GatewayError::RemoteRejected {
            status: status.as_u16(),
            reason,
        })
    }

    /// Send and decode a JSON response.
    async fn json<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T> {
        let resp = self.send(method, path, body).await?;
        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Send a body-less request and decode the JSON response.
    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.json::<T, ()>(Method::GET, path, None).await
    }

    /// `POST` with an empty JSON object and decode the reply.
    async fn post_action<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let empty = serde_json::Map::new();
        self.json(Method::POST, path, Some(&empty)).await
    }
}

/// What: Extract the user-facing reason from an error response.
///
/// Inputs:
/// - `status`: HTTP status of the response.
/// - `body`: Raw response body.
///
/// Output:
/// - `reason` from a JSON body when present, otherwise the trimmed body, otherwise the status text.
pub(crate) fn rejection_reason(status: StatusCode, body: &str) -> String {
    if let Ok(v) = serde_json::from_str::<serde_json::Value>(body)
        && let Some(reason) = v.get("reason").and_then(serde_json::Value::as_str)
    {
        return reason.to_string();
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        status
            .canonical_reason()
            .map_or_else(|| status.as_u16().to_string(), str::to_string)
    } else {
        trimmed.to_string()
    }
}

impl Gateway for HttpGateway {
    async fn capabilities(&self) -> Result<Capabilities> {
        self.get("host/capabilities").await
    }

    async fn list_repositories(&self) -> Result<Vec<Repository>> {
        self.get("host/repositories").await
    }

    async fn add_repository(&self, repo: &NewRepository) -> Result<Repository> {
        self.json(Method::POST, "host/repositories", Some(repo)).await
    }

    async fn update_repository(
        &self,
        repo_id: &str,
        changes: &RepositoryChanges,
    ) -> Result<Repository> {
        let path = format!("host/repositories/{}", percent_encode(repo_id));
        self.json(Method::PUT, &path, Some(changes)).await
    }

    async fn enable_repository(&self, repo_id: &str, enable: bool) -> Result<()> {
        let action = if enable { "enable" } else { "disable" };
        let path = format!("host/repositories/{}/{action}", percent_encode(repo_id));
        let empty = serde_json::Map::new();
        self.send(Method::POST, &path, Some(&empty)).await?;
        Ok(())
    }

    async fn delete_repository(&self, repo_id: &str) -> Result<()> {
        let path = format!("host/repositories/{}", percent_encode(repo_id));
        self.send::<()>(Method::DELETE, &path, None).await?;
        Ok(())
    }

    async fn list_software_updates(&self) -> Result<Vec<UpdateCandidate>> {
        self.get("host/packagesupdate").await
    }

    async fn package_deps(&self, name: &str) -> Result<Vec<String>> {
        self.get(&format!("host/packagesupdate/{}/deps", percent_encode(name)))
            .await
    }

    async fn update_software(&self, name: &str) -> Result<Task> {
        self.post_action(&format!(
            "host/packagesupdate/{}/upgrade",
            percent_encode(name)
        ))
        .await
    }

    async fn update_all_software(&self) -> Result<Task> {
        self.post_action("host/swupdate").await
    }

    async fn tasks_by_filter(&self, filter: &str) -> Result<Vec<Task>> {
        self.get(&format!("tasks?{filter}")).await
    }

    async fn task(&self, id: &str) -> Result<Task> {
        self.get(&format!("tasks/{}", percent_encode(id))).await
    }
}
