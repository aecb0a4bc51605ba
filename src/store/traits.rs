use async_trait::async_trait;

use crate::model::artifact::ModelArtifact;

/// Persistent, restart-durable store for model artifacts.
///
/// The store is an optional acceleration layer: neither method may propagate
/// an error to the caller. A broken or unavailable backend degrades `get` to
/// a miss and `put` to a no-op, never blocking model acquisition.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Fetch the artifact stored under `key`, or `None` on miss or backend failure.
    async fn get(&self, key: &str) -> Option<ModelArtifact>;

    /// Store `artifact` under `key`. Returns `false` on backend failure.
    /// Writes are all-or-nothing: a reader never observes a partial artifact.
    async fn put(&self, key: &str, artifact: &ModelArtifact) -> bool;
}
