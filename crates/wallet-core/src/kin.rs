//! Kin amounts held as quarks.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::WalletError;

pub const QUARKS_PER_KIN: u64 = 100_000;

/// A token amount held as quarks, the smallest on-ledger unit.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Kin {
    quarks: u64,
}

impl Kin {
    pub const ZERO: Kin = Kin { quarks: 0 };

    pub const fn from_quarks(quarks: u64) -> Self {
        Self { quarks }
    }

    /// Whole Kin. Fails if the amount does not fit in quarks.
    pub fn from_kin(kin: u64) -> Result<Self, WalletError> {
        kin.checked_mul(QUARKS_PER_KIN)
            .map(Self::from_quarks)
            .ok_or(WalletError::AmountOverflow)
    }

    pub const fn quarks(self) -> u64 {
        self.quarks
    }

    /// Whole Kin, rounded down.
    pub const fn truncated_kin(self) -> u64 {
        self.quarks / QUARKS_PER_KIN
    }

    pub const fn fractional_quarks(self) -> u64 {
        self.quarks % QUARKS_PER_KIN
    }

    pub const fn is_zero(self) -> bool {
        self.quarks == 0
    }

    pub fn checked_add(self, other: Kin) -> Option<Kin> {
        self.quarks.checked_add(other.quarks).map(Self::from_quarks)
    }

    pub fn checked_sub(self, other: Kin) -> Option<Kin> {
        self.quarks.checked_sub(other.quarks).map(Self::from_quarks)
    }
}

impl fmt::Display for Kin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.fractional_quarks() {
            0 => write!(f, "{} Kin", self.truncated_kin()),
            fraction => {
                let digits = format!("{fraction:05}");
                write!(
                    f,
                    "{}.{} Kin",
                    self.truncated_kin(),
                    digits.trim_end_matches('0')
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_kin_to_quarks() {
        assert_eq!(Kin::from_kin(2).unwrap().quarks(), 200_000);
        assert_eq!(Kin::from_kin(0).unwrap(), Kin::ZERO);
    }

    #[test]
    fn from_kin_overflow() {
        assert_eq!(Kin::from_kin(u64::MAX), Err(WalletError::AmountOverflow));
        assert!(Kin::from_kin(u64::MAX / QUARKS_PER_KIN).is_ok());
    }

    #[test]
    fn split_into_whole_and_fraction() {
        let amount = Kin::from_quarks(1_234_567);
        assert_eq!(amount.truncated_kin(), 12);
        assert_eq!(amount.fractional_quarks(), 34_567);
    }

    #[test]
    fn checked_arithmetic() {
        let one = Kin::from_kin(1).unwrap();
        assert_eq!(one.checked_add(one), Some(Kin::from_quarks(200_000)));
        assert_eq!(Kin::ZERO.checked_sub(one), None);
        assert_eq!(Kin::from_quarks(u64::MAX).checked_add(one), None);
    }

    #[test]
    fn display() {
        assert_eq!(Kin::from_kin(5).unwrap().to_string(), "5 Kin");
        assert_eq!(Kin::from_quarks(150_000).to_string(), "1.5 Kin");
        assert_eq!(Kin::from_quarks(1).to_string(), "0.00001 Kin");
    }

    #[test]
    fn serde_as_bare_quarks() {
        let amount = Kin::from_quarks(42);
        assert_eq!(serde_json::to_string(&amount).unwrap(), "42");
        assert_eq!(serde_json::from_str::<Kin>("42").unwrap(), amount);
    }

    #[test]
    fn ordering_follows_quarks() {
        assert!(Kin::from_quarks(99_999) < Kin::from_kin(1).unwrap());
    }
}
