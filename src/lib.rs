// Capture session and model acquisition engine for the orange grading scanner.

use std::sync::Once;

use tracing::info;
use tracing_subscriber::EnvFilter;

pub mod capture;
pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod scan;
pub mod source;
pub mod store;

static INIT_TRACING: Once = Once::new();

/// Initialize tracing once per process. Safe to call repeatedly.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info,hyper=warn,reqwest=warn"));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init();

        info!("scan engine tracing initialized");
    });
}
