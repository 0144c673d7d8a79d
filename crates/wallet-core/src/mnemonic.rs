//! BIP-39 mnemonic phrases and seeds.

use std::fmt;

use bip39::{Language, Mnemonic};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::WalletError;

/// Word counts BIP-39 defines: 128 to 256 bits of entropy in 32-bit steps.
pub const VALID_WORD_COUNTS: [usize; 5] = [12, 15, 18, 21, 24];

/// Length of a generated phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordCount {
    /// 128 bits of entropy.
    Twelve,
    /// 256 bits of entropy.
    TwentyFour,
}

impl WordCount {
    fn entropy_len(self) -> usize {
        match self {
            WordCount::Twelve => 16,
            WordCount::TwentyFour => 32,
        }
    }
}

/// A 64-byte BIP-39 seed. Zeroed on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Seed([u8; 64]);

impl Seed {
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Seed(..)")
    }
}

/// A validated English BIP-39 phrase. The text is zeroed on drop and never
/// printed.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MnemonicPhrase {
    phrase: String,
}

impl MnemonicPhrase {
    /// Generate a new phrase from the secure random source.
    pub fn generate(words: WordCount) -> Result<Self, WalletError> {
        let mut entropy = crypto_utils::random_bytes(words.entropy_len())?;
        let mnemonic = Mnemonic::from_entropy_in(Language::English, &entropy)
            .map_err(|e| WalletError::DerivationInputInvalid(e.to_string()));
        entropy.zeroize();

        Ok(Self {
            phrase: mnemonic?.to_string(),
        })
    }

    /// Validate `phrase`: the word count first, then every word and the
    /// checksum.
    pub fn parse(phrase: &str) -> Result<Self, WalletError> {
        let count = phrase.split_whitespace().count();
        if !VALID_WORD_COUNTS.contains(&count) {
            return Err(WalletError::DerivationInputInvalid(format!(
                "mnemonic has {count} words, expected one of {VALID_WORD_COUNTS:?}"
            )));
        }

        let mnemonic = Mnemonic::parse_in_normalized(Language::English, phrase)
            .map_err(|e| WalletError::DerivationInputInvalid(e.to_string()))?;

        Ok(Self {
            phrase: mnemonic.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.phrase
    }

    pub fn words(&self) -> Vec<&str> {
        self.phrase.split_whitespace().collect()
    }

    pub fn word_count(&self) -> usize {
        self.phrase.split_whitespace().count()
    }

    /// PBKDF2-HMAC-SHA512 seed from the phrase and `passphrase`.
    pub fn to_seed(&self, passphrase: &str) -> Result<Seed, WalletError> {
        let mnemonic = Mnemonic::parse_in_normalized(Language::English, &self.phrase)
            .map_err(|e| WalletError::DerivationInputInvalid(e.to_string()))?;
        Ok(Seed(mnemonic.to_seed(passphrase)))
    }
}

impl fmt::Debug for MnemonicPhrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MnemonicPhrase({} words)", self.word_count())
    }
}

impl PartialEq for MnemonicPhrase {
    fn eq(&self, other: &Self) -> bool {
        self.phrase == other.phrase
    }
}

impl Eq for MnemonicPhrase {}

/// Get the word list for autocomplete
pub fn word_list() -> &'static [&'static str] {
    Language::English.word_list()
}

/// Validate a single word against the BIP-39 word list
pub fn is_valid_word(word: &str) -> bool {
    Language::English.find_word(word).is_some()
}
