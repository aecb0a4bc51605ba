// Model artifact data model: topology blob, metadata descriptor, weight shards.

use bytes::Bytes;
use serde::Deserialize;
use tracing::warn;

/// One named binary chunk of model weights.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedShard {
    pub name: String,
    pub data: Bytes,
}

/// The combined model topology, its metadata, and its binary weight shards.
///
/// `metadata` holds the raw descriptor bytes as served; the parsed shard list
/// is derived on demand via [`ModelArtifact::shard_names`].
#[derive(Debug, Clone, PartialEq)]
pub struct ModelArtifact {
    pub topology: Bytes,
    pub metadata: Bytes,
    pub shards: Vec<NamedShard>,
}

impl ModelArtifact {
    /// Shard names referenced by the metadata descriptor, in order.
    pub fn shard_names(&self) -> Vec<String> {
        parse_metadata(&self.metadata)
            .weights
            .iter()
            .map(|w| w.name().to_string())
            .collect()
    }

    /// Whether the artifact carries a topology and every shard its metadata names.
    pub fn is_complete(&self) -> bool {
        if self.topology.is_empty() {
            return false;
        }
        self.shard_names()
            .iter()
            .all(|name| self.shards.iter().any(|s| &s.name == name))
    }
}

/// Metadata descriptor: an optional list of weight shard references.
#[derive(Debug, Default, Deserialize)]
pub struct ModelMetadata {
    #[serde(default)]
    pub weights: Vec<ShardRef>,
}

/// A shard reference as it appears in metadata: either a bare file name or
/// an object carrying a `name` field.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ShardRef {
    Name(String),
    Entry { name: String },
}

impl ShardRef {
    pub fn name(&self) -> &str {
        match self {
            ShardRef::Name(n) => n,
            ShardRef::Entry { name } => name,
        }
    }
}

/// Parse a metadata descriptor. Unparseable metadata degrades to an empty
/// shard list rather than failing the load.
pub fn parse_metadata(raw: &[u8]) -> ModelMetadata {
    if raw.is_empty() {
        return ModelMetadata::default();
    }
    match serde_json::from_slice(raw) {
        Ok(meta) => meta,
        Err(e) => {
            warn!("metadata descriptor unparseable, assuming no shards: {}", e);
            ModelMetadata::default()
        }
    }
}
