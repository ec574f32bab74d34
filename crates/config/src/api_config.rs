//! Backend connection configuration section

use crate::validation::{ConfigSection, ValidationError, Validator};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const MIN_REQUEST_TIMEOUT_SECS: u64 = 1;
const MAX_REQUEST_TIMEOUT_SECS: u64 = 300;

/// How to reach the Museu Literário REST backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL, e.g. `http://localhost:8080`
    pub base_url: String,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,

    /// Attempts for idempotent reads (1 = no retry)
    pub max_read_attempts: usize,

    /// User agent sent with every request
    pub user_agent: String,
}

impl ApiConfig {
    /// The configured timeout, held to the range `validate` accepts
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_secs
                .clamp(MIN_REQUEST_TIMEOUT_SECS, MAX_REQUEST_TIMEOUT_SECS),
        )
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            request_timeout_secs: 15,
            max_read_attempts: 3,
            user_agent: "museu-client".to_string(),
        }
    }
}

impl ConfigSection for ApiConfig {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let results = vec![
            Validator::http_url(&self.base_url, "api.base_url"),
            Validator::in_range(
                self.request_timeout_secs,
                MIN_REQUEST_TIMEOUT_SECS,
                MAX_REQUEST_TIMEOUT_SECS,
                "api.request_timeout_secs",
            ),
            Validator::in_range(self.max_read_attempts, 1, 10, "api.max_read_attempts"),
            Validator::not_empty(&self.user_agent, "api.user_agent"),
        ];

        Validator::collect_errors(results)
    }

    fn merge(&mut self, other: Self) {
        self.base_url = other.base_url;
        self.request_timeout_secs = other.request_timeout_secs;
        self.max_read_attempts = other.max_read_attempts;
        self.user_agent = other.user_agent;
    }

    fn section_name(&self) -> &'static str {
        "api"
    }
}
