use std::time::Duration;

use serde::Deserialize;

/// Timeout for the quick low-resolution acquisition tier.
pub const TIER_QUICK_TIMEOUT: Duration = Duration::from_secs(3);

/// Timeout for the environment-facing moderate-resolution tier.
pub const TIER_ENVIRONMENT_TIMEOUT: Duration = Duration::from_secs(8);

/// Delay before the single autoplay retry after a rejected playback start.
pub const AUTOPLAY_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Fixed logical key under which the model artifact is cached. No versioning in v1.
pub const ARTIFACT_KEY: &str = "orange_grader_model";

/// Maximum number of retained scan results (oldest evicted first).
pub const SCAN_HISTORY_LIMIT: usize = 4;

/// Load progress after the topology blob has been fetched.
pub const PROGRESS_TOPOLOGY: u8 = 30;

/// Load progress after the metadata fetch attempt (success or degraded).
pub const PROGRESS_METADATA: u8 = 40;

/// Upper bound of the shard-download progress range.
pub const PROGRESS_SHARDS_DONE: u8 = 90;

/// Load progress after the fetched artifact has been offered to the cache.
pub const PROGRESS_CACHED: u8 = 95;

/// Top-level configuration for the scan engine.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Base URL under which the model files are hosted. Must be absolute;
    /// the HTTP source resolves every file name against it as-is.
    pub model_base_url: String,
    /// Topology file name, resolved relative to `model_base_url`.
    pub topology_file: String,
    /// Metadata file name, resolved relative to `model_base_url`.
    pub metadata_file: String,
    /// Directory used for the persistent artifact cache.
    pub cache_dir: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            model_base_url: "http://localhost:8080/my_model/".to_string(),
            topology_file: "model.json".to_string(),
            metadata_file: "metadata.json".to_string(),
            cache_dir: String::new(),
        }
    }
}
