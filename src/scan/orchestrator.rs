// Scan orchestration: one frame plus one predictor in, one graded result out.

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info};

use super::classify::{classify, confidence_pct, recommendation, Grade, Recommendation};
use crate::capture::manager::CaptureManager;
use crate::config::SCAN_HISTORY_LIMIT;
use crate::error::ScanError;
use crate::model::loader::ModelLoader;
use crate::model::runtime::Prediction;

/// One completed classification. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanResult {
    pub grade: Grade,
    pub confidence: u8,
    pub recommendation: Recommendation,
    pub timestamp: DateTime<Utc>,
}

pub struct ScanOrchestrator {
    capture: Arc<CaptureManager>,
    loader: Arc<ModelLoader>,
    history: Mutex<VecDeque<ScanResult>>,
}

impl ScanOrchestrator {
    pub fn new(capture: Arc<CaptureManager>, loader: Arc<ModelLoader>) -> Self {
        Self {
            capture,
            loader,
            history: Mutex::new(VecDeque::with_capacity(SCAN_HISTORY_LIMIT)),
        }
    }

    /// Classify the current capture frame.
    ///
    /// Fails with `NoFrame` without an active session, `ModelUnavailable`
    /// when the loader cannot produce a predictor, and `EmptyPrediction` when
    /// the runtime returns zero class scores. A failed scan leaves the
    /// history untouched; re-invoking the scan is the retry mechanism.
    pub async fn run_scan(&self) -> Result<ScanResult, ScanError> {
        let frame = self.capture.current_frame().ok_or(ScanError::NoFrame)?;

        // Cheap when already ready; otherwise this transparently waits on the
        // in-flight load. Any load failure means the scan had no model.
        let predictor = self.loader.ensure_ready().await.map_err(|e| match e {
            ScanError::ModelUnavailable(_) => e,
            other => ScanError::ModelUnavailable(other.user_message()),
        })?;

        let predictions = predictor
            .predict(&frame)
            .await
            .map_err(|e| ScanError::ModelUnavailable(e.to_string()))?;

        let best = top_prediction(&predictions).ok_or(ScanError::EmptyPrediction)?;
        debug!("top prediction label={} score={}", best.label, best.score);

        let grade = classify(&best.label);
        let result = ScanResult {
            grade,
            confidence: confidence_pct(best.score),
            recommendation: recommendation(grade),
            timestamp: Utc::now(),
        };

        {
            let mut history = self.history.lock();
            history.push_front(result.clone());
            history.truncate(SCAN_HISTORY_LIMIT);
        }

        info!(
            "scan complete grade={:?} confidence={}%",
            result.grade, result.confidence
        );
        Ok(result)
    }

    /// Retained results, newest first.
    pub fn history(&self) -> Vec<ScanResult> {
        self.history.lock().iter().cloned().collect()
    }

    /// The most recent result, if any scan has completed.
    pub fn last_result(&self) -> Option<ScanResult> {
        self.history.lock().front().cloned()
    }
}

/// Highest-scoring prediction; exact ties keep the first seen.
fn top_prediction(predictions: &[Prediction]) -> Option<&Prediction> {
    let mut best: Option<&Prediction> = None;
    for p in predictions {
        match best {
            Some(b) if p.score > b.score => best = Some(p),
            None => best = Some(p),
            _ => {}
        }
    }
    best
}
