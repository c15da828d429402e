use serde::{Deserialize, Serialize};

/// Configuration from reqmark.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub watch: WatchConfig,
    #[serde(default)]
    pub parse: ParseConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Re-diff tick interval in milliseconds.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        WatchConfig {
            interval_ms: default_interval_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseConfig {
    /// Rewrite legacy status markers (`[Finished]`, `[Processing]`) to the
    /// canonical spellings before parsing.
    #[serde(default = "default_true")]
    pub normalize_legacy: bool,
}

impl Default for ParseConfig {
    fn default() -> Self {
        ParseConfig {
            normalize_legacy: true,
        }
    }
}

fn default_interval_ms() -> u64 {
    1000
}

fn default_true() -> bool {
    true
}
