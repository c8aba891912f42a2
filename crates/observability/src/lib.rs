//! Process-wide logging setup.

/// Tracing configuration (filters, layers).
pub mod tracing;

/// Initialize process-wide observability, honoring `LOG_FORMAT`.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init() {
    let format = std::env::var("LOG_FORMAT").ok();
    tracing::init(tracing::LogFormat::from_env_value(format.as_deref()));
}
