use thiserror::Error;

/// Cryptographic operation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// The operating system's secure random source failed.
    #[error("secure random source unavailable: {0}")]
    RandomUnavailable(String),
}
