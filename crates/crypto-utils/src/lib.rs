//! # crypto-utils
//!
//! Secure random generation for the wallet. Every draw reports failure of
//! the operating system's entropy source instead of degrading silently.

pub mod error;
pub mod random;

pub use error::CryptoError;
pub use random::{random_bytes, random_bytes_fixed};
