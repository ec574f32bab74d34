//! Favorite/status synchronization section

use crate::validation::{ConfigSection, ValidationError, Validator};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const MIN_MUTATION_TIMEOUT_SECS: u64 = 1;
const MAX_MUTATION_TIMEOUT_SECS: u64 = 120;

/// Settings for optimistic favorite and reading-status updates
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SyncSettings {
    /// After this many seconds an unanswered mutation is rolled back
    pub mutation_timeout_secs: u64,

    /// Load the favorites list into the store when the CLI starts a mutating command
    pub hydrate_on_start: bool,
}

impl SyncSettings {
    /// The configured timeout, held to the range `validate` accepts
    pub fn mutation_timeout(&self) -> Duration {
        Duration::from_secs(
            self.mutation_timeout_secs
                .clamp(MIN_MUTATION_TIMEOUT_SECS, MAX_MUTATION_TIMEOUT_SECS),
        )
    }
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            mutation_timeout_secs: 10,
            hydrate_on_start: true,
        }
    }
}

impl ConfigSection for SyncSettings {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        Validator::collect_errors(vec![Validator::in_range(
            self.mutation_timeout_secs,
            MIN_MUTATION_TIMEOUT_SECS,
            MAX_MUTATION_TIMEOUT_SECS,
            "sync.mutation_timeout_secs",
        )])
    }

    fn merge(&mut self, other: Self) {
        self.mutation_timeout_secs = other.mutation_timeout_secs;
        self.hydrate_on_start = other.hydrate_on_start;
    }

    fn section_name(&self) -> &'static str {
        "sync"
    }
}
