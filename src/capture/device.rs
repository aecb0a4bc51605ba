use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;

/// Which way the requested camera should face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacingMode {
    Any,
    Environment,
}

/// Constraints for one device acquisition request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceConstraints {
    /// Requested resolution, or `None` for an unconstrained request.
    pub resolution: Option<(u32, u32)>,
    pub facing: FacingMode,
}

impl DeviceConstraints {
    pub fn unconstrained() -> Self {
        Self {
            resolution: None,
            facing: FacingMode::Any,
        }
    }
}

/// One decoded video frame pulled from an active source.
#[derive(Debug, Clone)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub data: Bytes,
}

/// A local capture device that can be asked for a live frame source.
///
/// `open` may take arbitrarily long (permission prompts, slow hardware);
/// timeout handling is the caller's responsibility.
#[async_trait]
pub trait CaptureDevice: Send + Sync {
    async fn open(&self, constraints: &DeviceConstraints) -> Result<Arc<dyn FrameSource>>;
}

/// A continuously-updating live frame source backed by a device track.
///
/// The handle owns the underlying hardware lock: whoever holds it must call
/// `release` exactly when the track is no longer needed. `release` is
/// idempotent.
pub trait FrameSource: Send + Sync {
    /// The most recent frame, if the source has produced one yet.
    fn current_frame(&self) -> Option<Frame>;

    /// Release the underlying device track.
    fn release(&self);
}

/// Rendering sink for a frame source: silent, inline, autoplaying playback.
///
/// `begin_playback` may be rejected (commonly without a prior user gesture);
/// the session manager retries once and treats a second failure as non-fatal.
#[async_trait]
pub trait FrameSink: Send + Sync {
    async fn begin_playback(&self, source: Arc<dyn FrameSource>) -> Result<()>;
}
