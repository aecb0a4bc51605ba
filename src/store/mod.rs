// Artifact cache store: best-effort persistence behind a strict miss/no-op interface.

pub mod fs_store;
pub mod traits;
