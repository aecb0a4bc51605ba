use anyhow::{anyhow, Result};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use tracing::{debug, warn};

use super::traits::ModelSource;

/// HTTP model source fetching the topology, metadata, and weight shards
/// from fixed URLs under a common base path.
pub struct HttpModelSource {
    client: Client,
    base_url: String,
    topology_file: String,
    metadata_file: String,
}

impl HttpModelSource {
    pub fn new(base_url: String, topology_file: String, metadata_file: String) -> Self {
        let base_url = if base_url.ends_with('/') {
            base_url
        } else {
            format!("{}/", base_url)
        };
        Self {
            client: Client::new(),
            base_url,
            topology_file,
            metadata_file,
        }
    }

    fn url_for(&self, file: &str) -> String {
        format!("{}{}", self.base_url, file)
    }

    async fn fetch(&self, url: &str) -> Result<Bytes> {
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            warn!("model fetch failed url={} status={}", url, status.as_u16());
            return Err(anyhow!("fetch failed: HTTP {} for {}", status.as_u16(), url));
        }
        let bytes = resp.bytes().await?;
        debug!("model fetch url={} bytes={}", url, bytes.len());
        Ok(bytes)
    }
}

#[async_trait]
impl ModelSource for HttpModelSource {
    async fn fetch_topology(&self) -> Result<Bytes> {
        self.fetch(&self.topology_ref()).await
    }

    async fn fetch_metadata(&self) -> Result<Bytes> {
        self.fetch(&self.metadata_ref()).await
    }

    async fn fetch_shard(&self, name: &str) -> Result<Bytes> {
        self.fetch(&self.url_for(name)).await
    }

    fn topology_ref(&self) -> String {
        self.url_for(&self.topology_file)
    }

    fn metadata_ref(&self) -> String {
        self.url_for(&self.metadata_file)
    }
}
