// Tiered device acquisition: an ordered attempt list with per-attempt timeouts.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use tracing::{debug, info, warn};

use super::device::{CaptureDevice, DeviceConstraints, FacingMode, FrameSource};
use crate::config::{TIER_ENVIRONMENT_TIMEOUT, TIER_QUICK_TIMEOUT};
use crate::error::ScanError;

/// One ordered acquisition attempt with its own constraints and timeout.
#[derive(Debug, Clone)]
pub struct AcquisitionTier {
    pub label: &'static str,
    pub constraints: DeviceConstraints,
    pub timeout: Option<Duration>,
}

/// The fixed tier ladder: quick low-resolution preview first, then an
/// environment-facing moderate-resolution request, then anything at all.
pub fn default_tiers() -> Vec<AcquisitionTier> {
    vec![
        AcquisitionTier {
            label: "quick",
            constraints: DeviceConstraints {
                resolution: Some((320, 240)),
                facing: FacingMode::Any,
            },
            timeout: Some(TIER_QUICK_TIMEOUT),
        },
        AcquisitionTier {
            label: "environment",
            constraints: DeviceConstraints {
                resolution: Some((640, 480)),
                facing: FacingMode::Environment,
            },
            timeout: Some(TIER_ENVIRONMENT_TIMEOUT),
        },
        AcquisitionTier {
            label: "any",
            constraints: DeviceConstraints::unconstrained(),
            timeout: None,
        },
    ]
}

/// Walk the tier list in order, returning the first source acquired.
/// Per-tier timeouts and rejections fall through to the next tier; only
/// exhausting the whole list surfaces as `DeviceUnavailable`.
pub async fn acquire_first(
    device: Arc<dyn CaptureDevice>,
    tiers: &[AcquisitionTier],
) -> Result<Arc<dyn FrameSource>, ScanError> {
    for tier in tiers {
        match acquire_tier(Arc::clone(&device), tier).await {
            Ok(source) => {
                info!("capture acquired on tier \"{}\"", tier.label);
                return Ok(source);
            }
            Err(e) => {
                warn!("capture tier \"{}\" failed: {}", tier.label, e);
            }
        }
    }
    Err(ScanError::DeviceUnavailable(
        "all acquisition attempts exhausted".to_string(),
    ))
}

/// Run one acquisition attempt under its tier timeout.
///
/// The open call runs on its own task so that a handle resolving *after* the
/// timeout fired can still be reaped: the late handle is released immediately
/// and the attempt counts as a timeout, never a success.
async fn acquire_tier(
    device: Arc<dyn CaptureDevice>,
    tier: &AcquisitionTier,
) -> Result<Arc<dyn FrameSource>> {
    let constraints = tier.constraints.clone();
    let mut handle = tokio::spawn(async move { device.open(&constraints).await });

    match tier.timeout {
        None => handle
            .await
            .map_err(|e| anyhow!("acquisition task failed: {}", e))?,
        Some(limit) => match tokio::time::timeout(limit, &mut handle).await {
            Ok(join) => join.map_err(|e| anyhow!("acquisition task failed: {}", e))?,
            Err(_) => {
                let label = tier.label;
                tokio::spawn(async move {
                    if let Ok(Ok(source)) = handle.await {
                        debug!("tier \"{}\" handle arrived after timeout, releasing", label);
                        source.release();
                    }
                });
                Err(anyhow!("acquisition timed out after {:?}", limit))
            }
        },
    }
}
