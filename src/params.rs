//! Validated CCM parameters.
//!
//! The legal values follow from the two relations in SP 800-38C section
//! A.1: the tag length `t` is an even number in `[4, 16]`, and the nonce
//! length `n` and the length-field width `q` satisfy `n + q = 15` with
//! `q` in `[2, 8]`.

use crate::error::CcmError;

/// Shortest nonce CCM accepts (q = 8).
pub const MIN_NONCE_LEN: usize = 7;
/// Longest nonce CCM accepts (q = 2).
pub const MAX_NONCE_LEN: usize = 13;

const MIN_TAG_LEN: usize = 4;
const MAX_TAG_LEN: usize = 16;

/// An authentication tag length that CCM can encode in B0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagLength(u8);

impl TagLength {
    /// Valid lengths are: 4, 6, 8, 10, 12, 14, 16.
    pub fn new(len: usize) -> Result<Self, CcmError> {
        if !(MIN_TAG_LEN..=MAX_TAG_LEN).contains(&len) || len & 1 != 0 {
            return Err(CcmError::InvalidArgument);
        }
        Ok(TagLength(len as u8))
    }

    pub fn get(self) -> usize {
        usize::from(self.0)
    }

    /// The 3-bit `(t - 2) / 2` field of the B0 flags byte.
    pub(crate) fn flags_field(self) -> u8 {
        (self.0 - 2) / 2
    }
}

/// A 7 to 13 byte nonce, stored inline.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Nonce {
    bytes: [u8; MAX_NONCE_LEN],
    len: u8,
}

impl Nonce {
    pub fn new(nonce: &[u8]) -> Result<Self, CcmError> {
        if !(MIN_NONCE_LEN..=MAX_NONCE_LEN).contains(&nonce.len()) {
            return Err(CcmError::InvalidArgument);
        }
        let mut bytes = [0u8; MAX_NONCE_LEN];
        bytes[..nonce.len()].copy_from_slice(nonce);
        Ok(Nonce {
            bytes,
            len: nonce.len() as u8,
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len()]
    }

    pub fn len(&self) -> usize {
        usize::from(self.len)
    }

    /// Width in bytes of the length field (and of the CTR counter field).
    pub fn q(&self) -> usize {
        15 - self.len()
    }

    /// Largest payload length representable in `q` bytes.
    pub fn max_payload_len(&self) -> u64 {
        max_payload_len(self.q())
    }
}

// Nonces are not secret, but printing them invites log scraping.
impl core::fmt::Debug for Nonce {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.debug_struct("Nonce").field("len", &self.len).finish()
    }
}

/// `2^(8q) - 1`, saturating at `u64::MAX` for `q = 8`.
pub(crate) fn max_payload_len(q: usize) -> u64 {
    if q >= 8 {
        u64::MAX
    } else {
        (1u64 << (8 * q)) - 1
    }
}

/// The caller-supplied inputs of one CCM operation, checked.
#[derive(Debug, Clone, Copy)]
pub struct CcmParams<'a> {
    pub nonce: Nonce,
    pub tag_len: TagLength,
    pub aad: &'a [u8],
}

impl<'a> CcmParams<'a> {
    pub fn new(
        nonce: &[u8],
        tag_len: usize,
        aad: &'a [u8],
    ) -> Result<Self, CcmError> {
        Ok(CcmParams {
            nonce: Nonce::new(nonce)?,
            tag_len: TagLength::new(tag_len)?,
            aad,
        })
    }

    /// Fails with `BadLength` when `payload_len` overflows the q-byte
    /// length field.
    pub fn check_payload_len(
        &self,
        payload_len: usize,
    ) -> Result<(), CcmError> {
        let len = u64::try_from(payload_len).map_err(|_| CcmError::BadLength)?;
        if len > self.nonce.max_payload_len() {
            return Err(CcmError::BadLength);
        }
        Ok(())
    }
}
