use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;

/// Remote host of the model files: one fixed topology URL, one fixed
/// metadata URL, and shard URLs resolved relative to a fixed base path.
#[async_trait]
pub trait ModelSource: Send + Sync {
    async fn fetch_topology(&self) -> Result<Bytes>;
    async fn fetch_metadata(&self) -> Result<Bytes>;
    async fn fetch_shard(&self, name: &str) -> Result<Bytes>;

    /// Stable reference to the topology, handed to the inference runtime.
    fn topology_ref(&self) -> String;

    /// Stable reference to the metadata, handed to the inference runtime.
    fn metadata_ref(&self) -> String;
}
