// Scan orchestration: classification, confidence mapping, bounded result history.

pub mod classify;
pub mod orchestrator;
