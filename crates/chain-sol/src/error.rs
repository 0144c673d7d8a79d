use thiserror::Error;

/// Ledger codec and instruction errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolError {
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Fewer bytes remained than a decode step required, or an index
    /// pointed outside the account list.
    #[error("malformed wire data: {0}")]
    MalformedWireData(String),

    #[error("instruction does not target the expected program")]
    InstructionMismatch,

    #[error("instruction data is shorter than the command discriminant")]
    CommandNotFound,

    #[error("instruction command does not match the expected discriminant")]
    PayloadNotFound,

    #[error("expected {expected} accounts, found {found}")]
    AccountMismatch { expected: usize, found: usize },

    #[error("invalid memo: {0}")]
    InvalidMemo(String),

    #[error("transaction build error: {0}")]
    TransactionBuildError(String),

    #[error("signing error: {0}")]
    SigningError(String),
}

impl SolError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        SolError::MalformedWireData(reason.into())
    }
}
