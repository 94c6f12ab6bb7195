//! Configuration for the club service module

use serde::Deserialize;

/// Club service configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// How often the publish sweep looks for due scheduled activities (seconds)
    #[serde(default = "default_publish_sweep_interval_secs")]
    pub publish_sweep_interval_secs: u64,

    /// How often the completion sweep looks for expired activities (seconds)
    #[serde(default = "default_completion_sweep_interval_secs")]
    pub completion_sweep_interval_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            publish_sweep_interval_secs: default_publish_sweep_interval_secs(),
            completion_sweep_interval_secs: default_completion_sweep_interval_secs(),
        }
    }
}

fn default_publish_sweep_interval_secs() -> u64 {
    60
}

fn default_completion_sweep_interval_secs() -> u64 {
    3600
}
