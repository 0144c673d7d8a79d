use chain_sol::SolError;
use crypto_utils::CryptoError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletError {
    /// Input to derivation was rejected before any key was derived, e.g. an
    /// unsupported mnemonic word count or a non-hardened ed25519 path.
    #[error("Invalid derivation input: {0}")]
    DerivationInputInvalid(String),

    #[error("Key derivation failed: {0}")]
    DerivationFailed(String),

    #[error("Vault balance {balance} exceeds the dust limit of {max} quarks")]
    DustLimitExceeded { balance: u64, max: u64 },

    #[error("Amount overflows the quark range")]
    AmountOverflow,

    #[error("Secure random source unavailable: {0}")]
    RandomUnavailable(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Sol(#[from] SolError),
}

impl From<CryptoError> for WalletError {
    fn from(e: CryptoError) -> Self {
        match e {
            CryptoError::RandomUnavailable(reason) => WalletError::RandomUnavailable(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_dust_limit() {
        let err = WalletError::DustLimitExceeded {
            balance: 200_000,
            max: 100_000,
        };
        assert_eq!(
            err.to_string(),
            "Vault balance 200000 exceeds the dust limit of 100000 quarks"
        );
    }

    #[test]
    fn sol_errors_pass_through() {
        let err: WalletError = SolError::InstructionMismatch.into();
        assert_eq!(err, WalletError::Sol(SolError::InstructionMismatch));
        assert_eq!(
            err.to_string(),
            "instruction does not target the expected program"
        );
    }

    #[test]
    fn random_failure_maps_to_random_unavailable() {
        let err: WalletError = CryptoError::RandomUnavailable("no entropy".into()).into();
        assert_eq!(err, WalletError::RandomUnavailable("no entropy".into()));
    }
}
