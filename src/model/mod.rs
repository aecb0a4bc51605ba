// Model acquisition: artifact model, single-flight loader, inference runtime boundary.

pub mod artifact;
pub mod loader;
pub mod runtime;
