//! Tracing/logging setup shared by every binary that embeds the order item pipeline.

/// Initialize process-wide tracing with the format taken from the environment.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(tracing::LogFormat::from_env());
}

/// Tracing configuration (filters, formats).
pub mod tracing;
