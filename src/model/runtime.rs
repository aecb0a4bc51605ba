use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::capture::device::Frame;

/// One class score produced by the predictor.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub label: String,
    pub score: f32,
}

/// External inference runtime boundary: turns the fixed model references
/// into a callable predictor. The bytes fetched by the loader exist only to
/// warm the cache; the runtime resolves the references itself.
#[async_trait]
pub trait InferenceRuntime: Send + Sync {
    async fn load(&self, topology_ref: &str, metadata_ref: &str) -> Result<Arc<dyn Predictor>>;
}

/// The instantiated, callable inference object.
#[async_trait]
pub trait Predictor: Send + Sync {
    async fn predict(&self, frame: &Frame) -> Result<Vec<Prediction>>;

    /// Free underlying native resources. Called once at teardown.
    fn dispose(&self);
}
