use thiserror::Error;

/// Errors raised while constructing a retry policy or executor.
///
/// Action failures never show up here: [`RetryExecutor::execute`](crate::RetryExecutor::execute)
/// hands back the action's own error type unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// `max_attempts` was zero; at least one attempt is required.
    #[error("max_attempts must be at least 1, got 0")]
    ZeroMaxAttempts,
}
