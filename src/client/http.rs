use serde_json::Value;
use std::time::Duration;
use ureq::Agent;

use super::{ReportQuery, ReportSource};
use crate::error::{DashboardError, Result};

/// Blocking HTTP transport over `ureq`.
pub struct HttpSource {
    agent: Agent,
    base_url: String,
}

impl HttpSource {
    /// `timeout` bounds the whole request; `None` waits indefinitely.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Self {
        // Non-2xx statuses are turned into `Http` below.
        let agent: Agent = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(timeout)
            .build()
            .into();

        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl ReportSource for HttpSource {
    fn get_json(&self, path: &str, query: &ReportQuery) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.agent.get(&url);
        for (key, value) in query.pairs() {
            request = request.query(key, value);
        }

        let mut response = request
            .call()
            .map_err(|e| DashboardError::Network(e.to_string()))?;
        let status = response.status();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| DashboardError::Network(e.to_string()))?;

        tracing::debug!(%url, %query, status = status.as_u16(), "report request");

        if !status.is_success() {
            return Err(DashboardError::Http {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| DashboardError::Decode(e.to_string()))
    }
}
