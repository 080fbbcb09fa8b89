use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use skiff_common::{NodeClient, NodeClientError, NodeSnapshot, WorkloadRecord};

pub const DEFAULT_PLACE_TIMEOUT: Duration = Duration::from_secs(10);

/// Build the shared HTTP client used to reach node agents.
///
/// Only the connect phase is bounded here. Status queries run under the
/// poll deadline and placements under [`HttpNodeClient`]'s own timeout.
pub fn build_http_client() -> reqwest::Result<Client> {
    Client::builder()
        .connect_timeout(Duration::from_secs(3))
        .build()
}

/// [`NodeClient`] for an agent reachable over HTTP.
#[derive(Debug, Clone)]
pub struct HttpNodeClient {
    node_name: String,
    base_url: String,
    http: Client,
    place_timeout: Duration,
}

impl HttpNodeClient {
    pub fn new(node_name: impl Into<String>, base_url: &str, http: Client) -> Self {
        Self {
            node_name: node_name.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            place_timeout: DEFAULT_PLACE_TIMEOUT,
        }
    }

    pub fn with_place_timeout(mut self, timeout: Duration) -> Self {
        self.place_timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// A failed connect means the request never reached the agent. Anything
    /// later leaves the outcome open.
    fn request_error(&self, err: reqwest::Error) -> NodeClientError {
        let node = self.node_name.clone();
        if err.is_connect() {
            NodeClientError::Unavailable { node }
        } else if err.is_timeout() {
            NodeClientError::Timeout {
                node,
                timeout_ms: self.place_timeout.as_millis() as u64,
            }
        } else {
            NodeClientError::Transport {
                node,
                message: err.to_string(),
            }
        }
    }

    fn check_status(&self, resp: &reqwest::Response) -> Result<(), NodeClientError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        Err(NodeClientError::Status {
            node: self.node_name.clone(),
            status: status.as_u16(),
        })
    }
}

#[async_trait]
impl NodeClient for HttpNodeClient {
    fn node_name(&self) -> &str {
        &self.node_name
    }

    async fn status(&self) -> Result<NodeSnapshot, NodeClientError> {
        let url = format!("{}/status", self.base_url);
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;
        self.check_status(&resp)?;

        resp.json::<NodeSnapshot>()
            .await
            .map_err(|e| NodeClientError::Decode {
                node: self.node_name.clone(),
                message: e.to_string(),
            })
    }

    async fn place(&self, workload: &WorkloadRecord) -> Result<(), NodeClientError> {
        let url = format!("{}/pods", self.base_url);
        let resp = self
            .http
            .post(&url)
            .timeout(self.place_timeout)
            .json(workload)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;
        self.check_status(&resp)
    }
}
