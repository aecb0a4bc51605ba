// Engine wiring: startup triggers, scan entry point, guaranteed teardown.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::capture::device::{CaptureDevice, FrameSink};
use crate::capture::manager::{CaptureManager, SessionStatus};
use crate::config::EngineConfig;
use crate::error::ScanError;
use crate::model::loader::ModelLoader;
use crate::model::runtime::InferenceRuntime;
use crate::scan::orchestrator::{ScanOrchestrator, ScanResult};
use crate::source::http_source::HttpModelSource;
use crate::source::traits::ModelSource;
use crate::store::fs_store::FsStore;
use crate::store::traits::ArtifactStore;

/// Top-level handle tying the capture manager, model loader, and scan
/// orchestrator together for one page lifetime.
pub struct ScanEngine {
    capture: Arc<CaptureManager>,
    loader: Arc<ModelLoader>,
    orchestrator: ScanOrchestrator,
}

impl ScanEngine {
    /// Wire up the engine from a config, using the filesystem store and the
    /// HTTP model source.
    pub fn new(
        config: &EngineConfig,
        device: Arc<dyn CaptureDevice>,
        sink: Arc<dyn FrameSink>,
        runtime: Arc<dyn InferenceRuntime>,
    ) -> Self {
        let source: Arc<dyn ModelSource> = Arc::new(HttpModelSource::new(
            config.model_base_url.clone(),
            config.topology_file.clone(),
            config.metadata_file.clone(),
        ));
        let store: Arc<dyn ArtifactStore> = Arc::new(FsStore::new(config.cache_dir.clone()));
        Self::with_parts(device, sink, source, store, runtime)
    }

    /// Wire up the engine from explicit collaborators (used by tests and
    /// embedders with their own store or source).
    pub fn with_parts(
        device: Arc<dyn CaptureDevice>,
        sink: Arc<dyn FrameSink>,
        source: Arc<dyn ModelSource>,
        store: Arc<dyn ArtifactStore>,
        runtime: Arc<dyn InferenceRuntime>,
    ) -> Self {
        let capture = Arc::new(CaptureManager::new(device, sink));
        let loader = Arc::new(ModelLoader::new(source, store, runtime));
        let orchestrator = ScanOrchestrator::new(Arc::clone(&capture), Arc::clone(&loader));
        Self {
            capture,
            loader,
            orchestrator,
        }
    }

    /// Kick off capture acquisition and the eager background model load.
    /// Neither waits on the other; the preview can render while the model
    /// is still downloading.
    pub fn start(&self) {
        Arc::clone(&self.loader).prefetch();
        let capture = Arc::clone(&self.capture);
        tokio::spawn(async move {
            if let Err(e) = capture.start().await {
                warn!("capture start failed: {}", e);
            }
        });
    }

    /// Opportunistic prefetch on the user's first pointer interaction.
    /// Funnels into the same single-flight load as the eager trigger.
    pub fn on_user_gesture(&self) {
        Arc::clone(&self.loader).prefetch();
    }

    pub async fn run_scan(&self) -> Result<ScanResult, ScanError> {
        self.orchestrator.run_scan().await
    }

    pub fn capture(&self) -> &Arc<CaptureManager> {
        &self.capture
    }

    pub fn loader(&self) -> &Arc<ModelLoader> {
        &self.loader
    }

    pub fn history(&self) -> Vec<ScanResult> {
        self.orchestrator.history()
    }

    pub fn capture_status(&self) -> SessionStatus {
        self.capture.status()
    }

    /// Release every device track and dispose the predictor.
    pub fn shutdown(&self) {
        debug!("engine shutdown");
        self.capture.stop();
        self.loader.shutdown();
    }
}

impl Drop for ScanEngine {
    fn drop(&mut self) {
        // Teardown runs on every exit path, including unwind.
        self.shutdown();
    }
}
