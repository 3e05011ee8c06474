//! Compliance engine tuning.

use serde::{Deserialize, Serialize};
use warden_core::codes::SEVERITY_MEDIUM;

const fn default_bulk_concurrency() -> usize {
    8
}

const fn default_recent_window_days() -> u32 {
    7
}

const fn default_seed_on_startup() -> bool {
    true
}

fn default_system_actor() -> String {
    "SYSTEM".to_string()
}

fn default_severity() -> String {
    SEVERITY_MEDIUM.to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Entities validated concurrently by bulk validation.
    #[serde(default = "default_bulk_concurrency")]
    pub bulk_concurrency: usize,

    /// Look-back window for "recent violations" in summaries.
    #[serde(default = "default_recent_window_days")]
    pub recent_window_days: u32,

    /// Seed catalog vocabularies and default rules when the database opens.
    #[serde(default = "default_seed_on_startup")]
    pub seed_on_startup: bool,

    /// Actor recorded on rules created by seeding and templates.
    #[serde(default = "default_system_actor")]
    pub system_actor: String,

    /// Severity code used when a rule names a severity the catalog lacks.
    #[serde(default = "default_severity")]
    pub default_severity: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            bulk_concurrency: default_bulk_concurrency(),
            recent_window_days: default_recent_window_days(),
            seed_on_startup: default_seed_on_startup(),
            system_actor: default_system_actor(),
            default_severity: default_severity(),
        }
    }
}
