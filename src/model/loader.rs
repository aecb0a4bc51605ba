// Single-flight model loader: cache check, network fetch with progress, runtime instantiation.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::Mutex;
use tokio::sync::Notify;
use tracing::{debug, info, warn};

use super::artifact::{parse_metadata, ModelArtifact, NamedShard};
use super::runtime::{InferenceRuntime, Predictor};
use crate::config::{
    ARTIFACT_KEY, PROGRESS_CACHED, PROGRESS_METADATA, PROGRESS_SHARDS_DONE, PROGRESS_TOPOLOGY,
};
use crate::error::ScanError;
use crate::source::traits::ModelSource;
use crate::store::traits::ArtifactStore;

/// Externally visible load status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    NotStarted,
    InFlight,
    Ready,
    Failed,
}

enum LoadPhase {
    NotStarted,
    InFlight,
    Ready(Arc<dyn Predictor>),
    Failed(String),
}

struct LoadState {
    phase: LoadPhase,
    // Bumped by shutdown(); a flight publishes only if its generation still matches.
    generation: u64,
}

/// Owns the predictor handle and the load state. All callers funnel through
/// [`ModelLoader::ensure_ready`]; regardless of how many invoke it
/// concurrently, exactly one load sequence executes and exactly one predictor
/// instance is created.
pub struct ModelLoader {
    source: Arc<dyn ModelSource>,
    store: Arc<dyn ArtifactStore>,
    runtime: Arc<dyn InferenceRuntime>,
    state: Mutex<LoadState>,
    notify: Notify,
    progress: AtomicU8,
}

impl ModelLoader {
    pub fn new(
        source: Arc<dyn ModelSource>,
        store: Arc<dyn ArtifactStore>,
        runtime: Arc<dyn InferenceRuntime>,
    ) -> Self {
        Self {
            source,
            store,
            runtime,
            state: Mutex::new(LoadState {
                phase: LoadPhase::NotStarted,
                generation: 0,
            }),
            notify: Notify::new(),
            progress: AtomicU8::new(0),
        }
    }

    /// Current load progress, 0–100.
    pub fn progress(&self) -> u8 {
        self.progress.load(Ordering::Relaxed)
    }

    pub fn status(&self) -> LoadStatus {
        match &self.state.lock().phase {
            LoadPhase::NotStarted => LoadStatus::NotStarted,
            LoadPhase::InFlight => LoadStatus::InFlight,
            LoadPhase::Ready(_) => LoadStatus::Ready,
            LoadPhase::Failed(_) => LoadStatus::Failed,
        }
    }

    /// Kick off a background load without blocking the caller. Funnels into
    /// the same single-flight state as every other trigger.
    pub fn prefetch(self: Arc<Self>) {
        let loader = self;
        tokio::spawn(async move {
            if let Err(e) = loader.ensure_ready().await {
                warn!("background model prefetch failed: {}", e);
            }
        });
    }

    /// Resolve a ready predictor, loading it if necessary.
    ///
    /// A `Ready` loader returns the existing predictor at once. Callers that
    /// find a load in flight attach to it and resolve with that flight's
    /// outcome. A fresh call after `Failed` retries the whole sequence.
    pub async fn ensure_ready(&self) -> Result<Arc<dyn Predictor>, ScanError> {
        let mut attached = false;
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);

            let run = {
                let mut state = self.state.lock();
                match &state.phase {
                    LoadPhase::Ready(predictor) => return Ok(Arc::clone(predictor)),
                    LoadPhase::Failed(reason) if attached => {
                        return Err(ScanError::ModelUnavailable(reason.clone()));
                    }
                    LoadPhase::InFlight => {
                        // Register for the wakeup before dropping the lock so
                        // a completion between unlock and await is not missed.
                        notified.as_mut().enable();
                        None
                    }
                    LoadPhase::NotStarted | LoadPhase::Failed(_) => {
                        state.phase = LoadPhase::InFlight;
                        Some(state.generation)
                    }
                }
            };

            if let Some(generation) = run {
                self.progress.store(0, Ordering::Relaxed);
                let result = self.run_load().await;
                let outcome = {
                    let mut state = self.state.lock();
                    if state.generation != generation {
                        // shutdown() raced the flight; dispose instead of publishing.
                        if let Ok(predictor) = &result {
                            debug!("load outlived shutdown, disposing fresh predictor");
                            predictor.dispose();
                        }
                        self.progress.store(0, Ordering::Relaxed);
                        Err(ScanError::ModelUnavailable(
                            "model loader shut down during load".to_string(),
                        ))
                    } else {
                        match result {
                            Ok(predictor) => {
                                state.phase = LoadPhase::Ready(Arc::clone(&predictor));
                                self.progress.store(100, Ordering::Relaxed);
                                info!("model ready");
                                Ok(predictor)
                            }
                            Err(e) => {
                                warn!("model load failed: {}", e);
                                state.phase = LoadPhase::Failed(e.user_message());
                                Err(e)
                            }
                        }
                    }
                };
                self.notify.notify_waiters();
                return outcome;
            }

            attached = true;
            notified.await;
        }
    }

    /// Dispose the predictor (if any) and reset the load state. A load still
    /// in flight is torn down when it completes: its predictor is disposed
    /// rather than published.
    pub fn shutdown(&self) {
        let previous = {
            let mut state = self.state.lock();
            state.generation += 1;
            std::mem::replace(&mut state.phase, LoadPhase::NotStarted)
        };
        if let LoadPhase::Ready(predictor) = previous {
            debug!("disposing predictor");
            predictor.dispose();
        }
        self.progress.store(0, Ordering::Relaxed);
        self.notify.notify_waiters();
    }

    async fn run_load(&self) -> Result<Arc<dyn Predictor>, ScanError> {
        // A complete cached artifact skips the network entirely.
        if let Some(artifact) = self.store.get(ARTIFACT_KEY).await {
            if artifact.is_complete() {
                info!("model artifact served from cache");
                self.progress.store(100, Ordering::Relaxed);
                return self.instantiate().await;
            }
            warn!("cached model artifact incomplete, refetching");
        }

        let topology = self
            .source
            .fetch_topology()
            .await
            .map_err(|e| ScanError::NetworkFailure(e.to_string()))?;
        self.progress.store(PROGRESS_TOPOLOGY, Ordering::Relaxed);

        // Metadata is best-effort: without it the model simply has no shards.
        let metadata = match self.source.fetch_metadata().await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("metadata fetch failed, proceeding without shard list: {}", e);
                Bytes::new()
            }
        };
        self.progress.store(PROGRESS_METADATA, Ordering::Relaxed);

        let names: Vec<String> = parse_metadata(&metadata)
            .weights
            .iter()
            .map(|w| w.name().to_string())
            .collect();

        let mut shards = Vec::with_capacity(names.len());
        let span = (PROGRESS_SHARDS_DONE - PROGRESS_METADATA) as u32;
        for (i, name) in names.iter().enumerate() {
            match self.source.fetch_shard(name).await {
                Ok(data) => {
                    debug!("weight shard {} downloaded ({} bytes)", name, data.len());
                    shards.push(NamedShard {
                        name: name.clone(),
                        data,
                    });
                }
                Err(e) => warn!("weight shard {} fetch failed, skipping: {}", name, e),
            }
            let done = PROGRESS_METADATA as u32 + ((i as u32 + 1) * span) / names.len() as u32;
            self.progress
                .store(done.min(PROGRESS_SHARDS_DONE as u32) as u8, Ordering::Relaxed);
        }
        if !names.is_empty() && shards.is_empty() {
            return Err(ScanError::NetworkFailure(
                "every weight shard fetch failed".to_string(),
            ));
        }

        // Warm the cache for the next visit; a store failure only costs speed.
        let artifact = ModelArtifact {
            topology,
            metadata,
            shards,
        };
        if !self.store.put(ARTIFACT_KEY, &artifact).await {
            debug!("artifact cache write skipped");
        }
        self.progress.store(PROGRESS_CACHED, Ordering::Relaxed);

        self.instantiate().await
    }

    async fn instantiate(&self) -> Result<Arc<dyn Predictor>, ScanError> {
        self.runtime
            .load(&self.source.topology_ref(), &self.source.metadata_ref())
            .await
            .map_err(|e| ScanError::RuntimeInitFailure(e.to_string()))
    }
}
