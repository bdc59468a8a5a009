//! Tracing and logging setup shared by binaries.

/// Tracing subscriber configuration (filters, output format).
pub mod tracing;

pub use self::tracing::LogFormat;

/// Initialize process-wide tracing with the given output format.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init(format: LogFormat) {
    tracing::init(format);
}

/// Initialize tracing with the format named by `LOG_FORMAT` (JSON by default).
pub fn init_from_env() {
    tracing::init(LogFormat::from_env());
}
