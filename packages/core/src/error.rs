use thiserror::Error;

/// Unified application error.
///
/// Covers the process-level failures (startup configuration, binding the
/// listener, serving) so `main` fails in a predictable and debuggable way.
/// Estimation failures never reach this type; the polling loop absorbs them.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Server error: {0}")]
    Server(String),
}
