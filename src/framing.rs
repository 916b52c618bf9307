//! CCM formatting function (SP 800-38C, Appendix A).
//!
//! B0 is laid out as follows:
//! ```text
//! B0 = [FLAGS | nonce | Q], where:
//!   FLAGS is 1 byte long
//!   nonce is n bytes long (7 to 13)
//!   Q is the payload length, big endian, in q = 15 - n bytes
//! The byte FLAGS is composed by the following 8 bits:
//!   0-2 bits: q - 1
//!   3-5 bits: tag length (encoded as: (t-2)/2)
//!   6: Adata (0 if the associated data is empty, and 1 otherwise)
//!   7: always 0
//! ```
//! The counter blocks share the nonce but keep only the `q - 1` field in
//! their flags byte; the trailing q bytes hold the block counter.

use crate::error::CcmError;
use crate::params::{max_payload_len, Nonce, TagLength};
use crate::BLOCK_SIZE;

const FLAG_ADATA: u8 = 0x40;

// Associated data shorter than 2^16 - 2^8 gets a bare 2-byte length.
const AAD_SHORT_LIMIT: u64 = 0xFF00;
const AAD_MEDIUM_LIMIT: u64 = 1 << 32;

/// Flags byte of B0.
pub fn encode_b0_flags(
    nonce_len: usize,
    tag_len: usize,
    aad_present: bool,
    payload_len: u64,
) -> Result<u8, CcmError> {
    let tag_len = TagLength::new(tag_len)?;
    let q = length_field_width(nonce_len)?;
    if payload_len > max_payload_len(q) {
        return Err(CcmError::BadLength);
    }

    let adata = if aad_present { FLAG_ADATA } else { 0 };
    Ok(adata | tag_len.flags_field() << 3 | (q as u8 - 1))
}

/// The first block fed to CBC-MAC.
pub fn encode_b0(
    nonce: &[u8],
    tag_len: usize,
    aad_len: u64,
    payload_len: u64,
) -> Result<[u8; BLOCK_SIZE], CcmError> {
    let nonce = Nonce::new(nonce)?;
    let mut b0 = [0u8; BLOCK_SIZE];
    b0[0] = encode_b0_flags(nonce.len(), tag_len, aad_len > 0, payload_len)?;
    b0[1..=nonce.len()].copy_from_slice(nonce.as_bytes());

    let q = nonce.q();
    let len_bytes = payload_len.to_be_bytes();
    b0[BLOCK_SIZE - q..].copy_from_slice(&len_bytes[len_bytes.len() - q..]);
    Ok(b0)
}

/// Flags byte of every counter block.
pub fn encode_ctr0_flags(nonce_len: usize) -> Result<u8, CcmError> {
    Ok(length_field_width(nonce_len)? as u8 - 1)
}

/// The counter block with counter value 0. Its encryption masks the tag.
pub fn encode_ctr0(nonce: &[u8]) -> Result<[u8; BLOCK_SIZE], CcmError> {
    let mut ctr0 = [0u8; BLOCK_SIZE];
    ctr0[0] = encode_ctr0_flags(nonce.len())?;
    ctr0[1..=nonce.len()].copy_from_slice(nonce);
    Ok(ctr0)
}

/// The encoded associated data length that precedes the associated data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AadLengthPrefix {
    bytes: [u8; 10],
    len: u8,
}

impl AadLengthPrefix {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len()]
    }

    /// Number of prefix bytes: 0, 2, 6 or 10.
    pub fn len(&self) -> usize {
        usize::from(self.len)
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Encodes `aad_len` as described in SP 800-38C A.2.2.
///
/// Empty associated data gets no prefix at all; B0 must then also clear
/// its Adata bit.
pub fn encode_aad_length(aad_len: u64) -> AadLengthPrefix {
    let mut bytes = [0u8; 10];
    let len = if aad_len == 0 {
        0
    } else if aad_len < AAD_SHORT_LIMIT {
        bytes[..2].copy_from_slice(&(aad_len as u16).to_be_bytes());
        2
    } else if aad_len < AAD_MEDIUM_LIMIT {
        bytes[..2].copy_from_slice(&[0xFF, 0xFE]);
        bytes[2..6].copy_from_slice(&(aad_len as u32).to_be_bytes());
        6
    } else {
        bytes[..2].copy_from_slice(&[0xFF, 0xFF]);
        bytes[2..10].copy_from_slice(&aad_len.to_be_bytes());
        10
    };
    AadLengthPrefix { bytes, len }
}

fn length_field_width(nonce_len: usize) -> Result<usize, CcmError> {
    if !(crate::params::MIN_NONCE_LEN..=crate::params::MAX_NONCE_LEN)
        .contains(&nonce_len)
    {
        return Err(CcmError::InvalidArgument);
    }
    Ok(15 - nonce_len)
}
