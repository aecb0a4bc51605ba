// Filesystem-backed artifact store: one container file per key, committed atomically.

use std::path::PathBuf;

use async_trait::async_trait;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use tracing::{debug, warn};

use super::traits::ArtifactStore;
use crate::model::artifact::{ModelArtifact, NamedShard};

const MAGIC: &[u8; 4] = b"OART";

pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// Create a store rooted at `root`. The directory is created lazily on
    /// first write; an unusable root degrades every operation instead of failing.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.artifact", key))
    }
}

#[async_trait]
impl ArtifactStore for FsStore {
    async fn get(&self, key: &str) -> Option<ModelArtifact> {
        let path = self.path_for(key);
        let raw = match tokio::fs::read(&path).await {
            Ok(raw) => raw,
            Err(e) => {
                debug!("artifact cache miss for {}: {}", key, e);
                return None;
            }
        };
        match decode_artifact(&raw) {
            Some(artifact) => {
                debug!(
                    "artifact cache hit for {} ({} bytes, {} shards)",
                    key,
                    raw.len(),
                    artifact.shards.len()
                );
                Some(artifact)
            }
            None => {
                warn!("artifact cache entry for {} is corrupt, treating as miss", key);
                None
            }
        }
    }

    async fn put(&self, key: &str, artifact: &ModelArtifact) -> bool {
        // Stage the full container in memory, write it to a temp file, then
        // rename into place so a reader never observes a partial artifact.
        let encoded = encode_artifact(artifact);

        if let Err(e) = tokio::fs::create_dir_all(&self.root).await {
            warn!("artifact cache unavailable, skipping write: {}", e);
            return false;
        }

        let path = self.path_for(key);
        let tmp = self.root.join(format!("{}.artifact.tmp", key));

        if let Err(e) = tokio::fs::write(&tmp, &encoded).await {
            warn!("artifact cache write failed: {}", e);
            let _ = tokio::fs::remove_file(&tmp).await;
            return false;
        }
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            warn!("artifact cache commit failed: {}", e);
            let _ = tokio::fs::remove_file(&tmp).await;
            return false;
        }

        debug!("artifact cached under {} ({} bytes)", key, encoded.len());
        true
    }
}

/// Serialize an artifact into the length-prefixed container format:
/// magic, topology, metadata, then shard count followed by (name, data) pairs.
fn encode_artifact(artifact: &ModelArtifact) -> Bytes {
    let mut buf = BytesMut::new();
    buf.put_slice(MAGIC);
    buf.put_u64(artifact.topology.len() as u64);
    buf.put_slice(&artifact.topology);
    buf.put_u64(artifact.metadata.len() as u64);
    buf.put_slice(&artifact.metadata);
    buf.put_u32(artifact.shards.len() as u32);
    for shard in &artifact.shards {
        buf.put_u32(shard.name.len() as u32);
        buf.put_slice(shard.name.as_bytes());
        buf.put_u64(shard.data.len() as u64);
        buf.put_slice(&shard.data);
    }
    buf.freeze()
}

/// Decode a container. Returns `None` on any structural inconsistency.
fn decode_artifact(raw: &[u8]) -> Option<ModelArtifact> {
    let mut buf = raw;
    if buf.remaining() < MAGIC.len() || &buf[..MAGIC.len()] != MAGIC {
        return None;
    }
    buf.advance(MAGIC.len());

    let topology = take_block_u64(&mut buf)?;
    let metadata = take_block_u64(&mut buf)?;

    if buf.remaining() < 4 {
        return None;
    }
    let shard_count = buf.get_u32() as usize;

    let mut shards = Vec::with_capacity(shard_count);
    for _ in 0..shard_count {
        if buf.remaining() < 4 {
            return None;
        }
        let name_len = buf.get_u32() as usize;
        if buf.remaining() < name_len {
            return None;
        }
        let name = String::from_utf8(buf[..name_len].to_vec()).ok()?;
        buf.advance(name_len);
        let data = take_block_u64(&mut buf)?;
        shards.push(NamedShard { name, data });
    }

    if buf.has_remaining() {
        return None;
    }
    Some(ModelArtifact {
        topology,
        metadata,
        shards,
    })
}

fn take_block_u64(buf: &mut &[u8]) -> Option<Bytes> {
    if buf.remaining() < 8 {
        return None;
    }
    let len = buf.get_u64() as usize;
    if buf.remaining() < len {
        return None;
    }
    let block = Bytes::copy_from_slice(&buf[..len]);
    buf.advance(len);
    Some(block)
}
