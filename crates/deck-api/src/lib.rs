//! Typed Rust client for the clouddeck backend REST API.
//!
//! Covers the machine surface of the dashboard backend:
//! listing machines, machine lifecycle actions, and image listing.

mod types;

pub use types::*;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("backend api request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("backend api {endpoint} returned {status}: {body}")]
    Api {
        endpoint: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Client for the dashboard backend REST API.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            http: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn check(resp: reqwest::Response, endpoint: &'static str) -> Result<reqwest::Response> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Api { endpoint, status, body });
        }
        Ok(resp)
    }

    // ── Machines ─────────────────────────────────────────────────────

    pub async fn list_machines(&self, backend_id: &str) -> Result<Vec<MachineListing>> {
        let resp = self
            .http
            .get(self.url(&format!("/backends/{backend_id}/machines")))
            .send()
            .await?;

        Self::check(resp, "list machines")
            .await?
            .json()
            .await
            .map_err(Error::from)
    }

    /// Submit a lifecycle action for one machine.
    ///
    /// The server acknowledges with any 2xx; the new state shows up later
    /// through the regular listing refresh, so the response body is ignored.
    pub async fn machine_action(
        &self,
        backend_id: &str,
        machine_id: &str,
        action: MachineAction,
    ) -> Result<()> {
        let resp = self
            .http
            .post(self.url(&format!("/backends/{backend_id}/machines/{machine_id}")))
            .form(&ActionRequest { action })
            .send()
            .await?;

        Self::check(resp, "machine action").await?;
        Ok(())
    }

    // ── Images ───────────────────────────────────────────────────────

    pub async fn list_images(&self, backend_id: &str) -> Result<Vec<Image>> {
        let resp = self
            .http
            .get(self.url(&format!("/backends/{backend_id}/images")))
            .send()
            .await?;

        Self::check(resp, "list images")
            .await?
            .json()
            .await
            .map_err(Error::from)
    }
}
