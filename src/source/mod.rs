// Model source abstraction: pluggable backends for HTTP and test fakes.

pub mod http_source;
pub mod traits;
