//! Program Derived Address (PDA) derivation.
//!
//! A PDA is `SHA-256(seed_0 || ... || seed_n || program_id || "ProgramDerivedAddress")`
//! that is NOT a valid Ed25519 point, so no private key can ever sign for
//! it. [`find_program_address`] appends a bump seed, searching from 255
//! down to 0 for the first off-curve result.

use sha2::{Digest, Sha256};

use crate::error::SolError;
use crate::keys::PublicKey;

/// The string appended to PDA derivation: "ProgramDerivedAddress".
const PDA_MARKER: &[u8] = b"ProgramDerivedAddress";

pub const MAX_SEEDS: usize = 16;
pub const MAX_SEED_LEN: usize = 32;

/// A program-derived address and the bump seed that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramDerivedAccount {
    pub public_key: PublicKey,
    pub bump: u8,
}

/// Find the canonical PDA for `seeds` under `program`.
pub fn find_program_address(
    program: &PublicKey,
    seeds: &[&[u8]],
) -> Result<ProgramDerivedAccount, SolError> {
    if seeds.len() >= MAX_SEEDS {
        return Err(SolError::InvalidAddress(format!(
            "at most {} seeds leave room for a bump, got {}",
            MAX_SEEDS - 1,
            seeds.len()
        )));
    }

    for bump in (0u8..=255).rev() {
        let bump_seed = [bump];
        let mut with_bump: Vec<&[u8]> = seeds.to_vec();
        with_bump.push(&bump_seed);

        if let Ok(public_key) = create_program_address(program, &with_bump) {
            return Ok(ProgramDerivedAccount { public_key, bump });
        }
    }

    Err(SolError::InvalidAddress(
        "could not find valid PDA bump seed".into(),
    ))
}

/// Hash `seeds` into an address under `program`.
///
/// Fails if the seeds are out of bounds or the result falls on the curve.
pub fn create_program_address(program: &PublicKey, seeds: &[&[u8]]) -> Result<PublicKey, SolError> {
    if seeds.len() > MAX_SEEDS {
        return Err(SolError::InvalidAddress(format!(
            "at most {MAX_SEEDS} seeds allowed, got {}",
            seeds.len()
        )));
    }
    if let Some(seed) = seeds.iter().find(|s| s.len() > MAX_SEED_LEN) {
        return Err(SolError::InvalidAddress(format!(
            "seed of {} bytes exceeds {MAX_SEED_LEN}",
            seed.len()
        )));
    }

    let mut hasher = Sha256::new();
    for seed in seeds {
        hasher.update(seed);
    }
    hasher.update(program.as_ref());
    hasher.update(PDA_MARKER);

    let address = PublicKey::new(hasher.finalize().into());

    if address.is_on_curve() {
        return Err(SolError::InvalidPublicKey(
            "derived address is on the ed25519 curve".into(),
        ));
    }

    Ok(address)
}
