// Capture session management: tiered device acquisition and session lifecycle.

pub mod acquire;
pub mod device;
pub mod manager;
