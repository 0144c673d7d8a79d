//! Compact-length encoding and the bounded reader used by every decoder.
//!
//! Lengths are base-128 little-endian varints: each byte carries 7 value
//! bits and every byte but the last has its high bit set.
//!
//! - 0..=0x7f        -> 1 byte
//! - 0x80..=0x3fff   -> 2 bytes
//! - 0x4000..=0xffff -> 3 bytes

use crate::error::SolError;
use crate::keys::FixedBytes;

/// Encode `len` as a compact length.
pub fn encode_length(len: usize) -> Vec<u8> {
    let mut value = len;
    let mut out = Vec::with_capacity(3);

    loop {
        let mut byte = (value & 0x7f) as u8;
        value >>= 7;
        if value > 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if value == 0 {
            break;
        }
    }

    out
}

/// Decode a compact length from the front of `bytes`.
///
/// Returns the value and the unconsumed remainder. Empty input yields
/// `(0, &[])`. A run that ends while the continuation bit is still set
/// yields the groups read so far.
pub fn decode_length(bytes: &[u8]) -> (usize, &[u8]) {
    let mut value = 0usize;
    let mut shift = 0u32;
    let mut consumed = 0usize;

    for &byte in bytes {
        consumed += 1;
        if shift < usize::BITS {
            value |= ((byte & 0x7f) as usize) << shift;
        }
        shift += 7;
        if byte & 0x80 == 0 {
            break;
        }
    }

    (value, &bytes[consumed..])
}

/// Length prefix followed by the concatenated raw items.
pub fn encode_fixed<T: FixedBytes>(items: &[T]) -> Vec<u8> {
    let mut out = encode_length(items.len());
    out.reserve(items.len() * T::LENGTH);
    for item in items {
        out.extend_from_slice(item.as_bytes());
    }
    out
}

/// Length prefix followed by an opaque payload.
pub fn encode_buffer(buffer: &[u8]) -> Vec<u8> {
    let mut out = encode_length(buffer.len());
    out.extend_from_slice(buffer);
    out
}

/// Cursor over untrusted wire bytes.
///
/// Every read either returns exactly what was asked for or fails with
/// [`SolError::MalformedWireData`]; nothing is consumed on failure.
#[derive(Debug, Clone)]
pub struct WireReader<'a> {
    bytes: &'a [u8],
}

impl<'a> WireReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    pub fn remaining(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn take(&mut self, len: usize, what: &str) -> Result<&'a [u8], SolError> {
        if self.bytes.len() < len {
            return Err(SolError::malformed(format!(
                "{what}: need {len} bytes, {} remain",
                self.bytes.len()
            )));
        }
        let (head, tail) = self.bytes.split_at(len);
        self.bytes = tail;
        Ok(head)
    }

    pub fn read_u8(&mut self, what: &str) -> Result<u8, SolError> {
        Ok(self.take(1, what)?[0])
    }

    /// A compact length. Unlike [`decode_length`], an empty or truncated
    /// prefix is an error here because a field was expected. Only the
    /// shortest encoding of a value up to `u16::MAX` is accepted, so every
    /// accepted prefix re-encodes to the same bytes.
    pub fn read_length(&mut self, what: &str) -> Result<usize, SolError> {
        let mut value = 0usize;
        for (i, &byte) in self.bytes.iter().enumerate().take(3) {
            value |= ((byte & 0x7f) as usize) << (7 * i);
            if byte & 0x80 != 0 {
                continue;
            }
            if byte == 0 && i > 0 {
                return Err(SolError::malformed(format!(
                    "{what}: non-canonical length prefix"
                )));
            }
            if value > u16::MAX as usize {
                return Err(SolError::malformed(format!(
                    "{what}: length {value} exceeds {}",
                    u16::MAX
                )));
            }
            self.bytes = &self.bytes[i + 1..];
            return Ok(value);
        }

        if self.bytes.len() >= 3 {
            Err(SolError::malformed(format!("{what}: length prefix too long")))
        } else {
            Err(SolError::malformed(format!("{what}: missing length prefix")))
        }
    }

    pub fn read_u64_le(&mut self, what: &str) -> Result<u64, SolError> {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(self.take(8, what)?);
        Ok(u64::from_le_bytes(buf))
    }

    /// Fails if any bytes are left over.
    pub fn finish(self, what: &str) -> Result<(), SolError> {
        if self.bytes.is_empty() {
            Ok(())
        } else {
            Err(SolError::malformed(format!(
                "{what}: {} trailing bytes",
                self.bytes.len()
            )))
        }
    }

    pub fn read_fixed<T: FixedBytes>(&mut self, what: &str) -> Result<T, SolError> {
        let bytes = self.take(T::LENGTH, what)?;
        T::from_slice(bytes).ok_or_else(|| SolError::malformed(what.to_string()))
    }

    /// A length-prefixed list of fixed-width items.
    pub fn read_fixed_list<T: FixedBytes>(&mut self, what: &str) -> Result<Vec<T>, SolError> {
        let count = self.read_length(what)?;
        let needed = count
            .checked_mul(T::LENGTH)
            .ok_or_else(|| SolError::malformed(format!("{what}: count overflow")))?;
        let bytes = self.take(needed, what)?;
        bytes
            .chunks_exact(T::LENGTH)
            .map(|chunk| T::from_slice(chunk).ok_or_else(|| SolError::malformed(what.to_string())))
            .collect()
    }

    /// A length-prefixed opaque payload.
    pub fn read_buffer(&mut self, what: &str) -> Result<&'a [u8], SolError> {
        let len = self.read_length(what)?;
        self.take(len, what)
    }
}
