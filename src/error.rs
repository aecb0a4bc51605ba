// Engine error taxonomy. Cache-store and individual shard failures are
// absorbed where they occur and never appear here.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    /// No capture device, permission denied, or every acquisition tier exhausted.
    #[error("camera unavailable or permission denied: {0}")]
    DeviceUnavailable(String),

    /// Topology fetch failed, or every named weight shard failed to download.
    #[error("model download failed: {0}")]
    NetworkFailure(String),

    /// The inference runtime rejected the model description.
    #[error("model initialization failed: {0}")]
    RuntimeInitFailure(String),

    /// A scan was requested without an active capture session.
    #[error("no active capture session")]
    NoFrame,

    /// The loader could not produce a usable predictor.
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    /// The runtime returned zero class scores.
    #[error("no prediction returned from model")]
    EmptyPrediction,
}

impl ScanError {
    /// Single human-readable message suitable for direct display.
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}
