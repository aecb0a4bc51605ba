// Capture session state machine: acquires, holds, and releases the live frame source.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use super::acquire::{acquire_first, default_tiers, AcquisitionTier};
use super::device::{CaptureDevice, Frame, FrameSink, FrameSource};
use crate::config::AUTOPLAY_RETRY_DELAY;
use crate::error::ScanError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Idle,
    Acquiring,
    Active,
    Failed,
}

struct SessionState {
    status: SessionStatus,
    source: Option<Arc<dyn FrameSource>>,
    error_reason: Option<String>,
}

impl SessionState {
    fn new() -> Self {
        Self {
            status: SessionStatus::Idle,
            source: None,
            error_reason: None,
        }
    }
}

/// Exclusive owner of the capture device resources. Only this manager may
/// release the underlying hardware lock; at most one session is active.
pub struct CaptureManager {
    device: Arc<dyn CaptureDevice>,
    sink: Arc<dyn FrameSink>,
    tiers: Vec<AcquisitionTier>,
    session: Mutex<SessionState>,
}

impl CaptureManager {
    pub fn new(device: Arc<dyn CaptureDevice>, sink: Arc<dyn FrameSink>) -> Self {
        Self::with_tiers(device, sink, default_tiers())
    }

    pub fn with_tiers(
        device: Arc<dyn CaptureDevice>,
        sink: Arc<dyn FrameSink>,
        tiers: Vec<AcquisitionTier>,
    ) -> Self {
        Self {
            device,
            sink,
            tiers,
            session: Mutex::new(SessionState::new()),
        }
    }

    /// Acquire a frame source through the tier ladder and mark the session
    /// `Active`. A session that is already active or mid-acquisition is left
    /// alone. Exhausting every tier marks the session `Failed`.
    pub async fn start(&self) -> Result<(), ScanError> {
        {
            let mut session = self.session.lock();
            match session.status {
                SessionStatus::Active | SessionStatus::Acquiring => {
                    debug!("capture start ignored, session already {:?}", session.status);
                    return Ok(());
                }
                SessionStatus::Idle | SessionStatus::Failed => {
                    session.status = SessionStatus::Acquiring;
                    session.error_reason = None;
                    session.source = None;
                }
            }
        }

        match acquire_first(Arc::clone(&self.device), &self.tiers).await {
            Ok(source) => {
                self.bind_sink(Arc::clone(&source)).await;
                let mut session = self.session.lock();
                // stop() may have raced the acquisition; release rather than leak.
                if session.status != SessionStatus::Acquiring {
                    drop(session);
                    warn!("capture session stopped during acquisition, releasing source");
                    source.release();
                    return Ok(());
                }
                session.status = SessionStatus::Active;
                session.source = Some(source);
                info!("capture session active");
                Ok(())
            }
            Err(e) => {
                let reason = e.user_message();
                let mut session = self.session.lock();
                session.status = SessionStatus::Failed;
                session.source = None;
                session.error_reason = Some(reason);
                Err(e)
            }
        }
    }

    /// Bind the source to the sink for silent inline autoplay. A rejected
    /// first attempt schedules exactly one retry after a short delay; a failed
    /// retry is non-fatal since the frame source itself exists.
    async fn bind_sink(&self, source: Arc<dyn FrameSource>) {
        if let Err(e) = self.sink.begin_playback(Arc::clone(&source)).await {
            warn!("playback start rejected, scheduling one retry: {}", e);
            let sink = Arc::clone(&self.sink);
            tokio::spawn(async move {
                tokio::time::sleep(AUTOPLAY_RETRY_DELAY).await;
                if let Err(e) = sink.begin_playback(source).await {
                    warn!("playback retry failed (non-fatal): {}", e);
                }
            });
        }
    }

    /// Release every acquired device track. Safe to call on an already
    /// stopped or never-started session.
    pub fn stop(&self) {
        let source = {
            let mut session = self.session.lock();
            session.status = SessionStatus::Idle;
            session.error_reason = None;
            session.source.take()
        };
        if let Some(source) = source {
            debug!("capture session stopped, releasing device track");
            source.release();
        }
    }

    /// Pull the current frame from the active session, if any.
    pub fn current_frame(&self) -> Option<Frame> {
        let session = self.session.lock();
        match session.status {
            SessionStatus::Active => session.source.as_ref()?.current_frame(),
            _ => None,
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.session.lock().status
    }

    pub fn error_reason(&self) -> Option<String> {
        self.session.lock().error_reason.clone()
    }
}

impl Drop for CaptureManager {
    fn drop(&mut self) {
        debug!("CaptureManager dropped, releasing device resources");
        self.stop();
    }
}
