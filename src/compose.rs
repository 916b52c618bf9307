//! Lays out the CCM frame in one fixed-capacity scratch buffer:
//!
//! ```text
//! 0        16                     16 + aad_padded_len
//! | B0     | alen | aad | 0 pad   | payload [| tag] | 0 pad |
//! ```
//!
//! On decrypt the payload region holds the ciphertext immediately
//! followed by the masked tag; the orchestrator pulls the tag out before
//! the region is padded.

use core::ops::Range;

use zeroize::{Zeroize, Zeroizing};

use crate::backend::{Block, BlockEngine, Counter};
use crate::error::CcmError;
use crate::framing::{encode_aad_length, encode_b0, encode_ctr0};
use crate::params::CcmParams;
use crate::BLOCK_SIZE;

/// Fixed-capacity byte arena with a write cursor.
pub struct WorkBuffer<const CAP: usize> {
    buf: [u8; CAP],
    len: usize,
}

impl<const CAP: usize> WorkBuffer<CAP> {
    pub const fn new() -> Self {
        WorkBuffer {
            buf: [0u8; CAP],
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Appends `data`, returning where it landed.
    pub fn push(&mut self, data: &[u8]) -> Result<Range<usize>, CcmError> {
        let start = self.len;
        let end = start.checked_add(data.len()).ok_or(CcmError::TooBig)?;
        if end > CAP {
            return Err(CcmError::TooBig);
        }
        self.buf[start..end].copy_from_slice(data);
        self.len = end;
        Ok(start..end)
    }

    /// Zero-fills up to the next multiple of the block size.
    pub fn pad_to_block(&mut self) -> Result<(), CcmError> {
        let end = align_up(self.len)?;
        if end > CAP {
            return Err(CcmError::TooBig);
        }
        self.buf[self.len..end].fill(0);
        self.len = end;
        Ok(())
    }

    /// Drops everything past `len`, wiping it.
    pub fn truncate(&mut self, len: usize) {
        if len < self.len {
            self.buf[len..self.len].zeroize();
            self.len = len;
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// A written region. Ranges past the cursor are an internal error.
    pub fn region(&self, range: Range<usize>) -> Result<&[u8], CcmError> {
        if range.start > range.end || range.end > self.len {
            return Err(CcmError::BadState);
        }
        Ok(&self.buf[range])
    }

    pub fn region_mut(
        &mut self,
        range: Range<usize>,
    ) -> Result<&mut [u8], CcmError> {
        if range.start > range.end || range.end > self.len {
            return Err(CcmError::BadState);
        }
        Ok(&mut self.buf[range])
    }

    #[cfg(test)]
    pub(crate) fn raw(&self) -> &[u8] {
        &self.buf
    }
}

impl<const CAP: usize> Default for WorkBuffer<CAP> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const CAP: usize> Zeroize for WorkBuffer<CAP> {
    fn zeroize(&mut self) {
        self.buf.zeroize();
        self.len = 0;
    }
}

impl<const CAP: usize> Drop for WorkBuffer<CAP> {
    fn drop(&mut self) {
        self.zeroize();
    }
}

pub(crate) fn align_up(len: usize) -> Result<usize, CcmError> {
    let rem = len % BLOCK_SIZE;
    if rem == 0 {
        Ok(len)
    } else {
        len.checked_add(BLOCK_SIZE - rem).ok_or(CcmError::TooBig)
    }
}

/// Where [`compose`] put things.
pub struct Frame {
    /// Total bytes written, B0 included.
    pub wbuf_len: usize,
    /// Length field, associated data and padding, starting at offset 16.
    pub aad_padded_len: usize,
    pub payload_offset: usize,
    /// Bytes of plaintext (or ciphertext) in the payload region, tag
    /// excluded.
    pub payload_len: usize,
    /// `payload_len` rounded up to whole blocks; the span CTR runs over.
    pub padded_payload_len: usize,
    /// E(CTR0), the tag mask.
    pub s0: Zeroizing<Block>,
}

impl Frame {
    pub fn payload_range(&self) -> Range<usize> {
        self.payload_offset..self.payload_offset + self.payload_len
    }

    /// The payload region including its zero padding.
    pub fn padded_range(&self) -> Range<usize> {
        self.payload_offset..self.payload_offset + self.padded_payload_len
    }
}

/// Bytes of work buffer a message needs, whichever way it is going.
///
/// Encrypt holds the padded payload; decrypt first holds the payload with
/// its tag, then the padded payload. Both directions are sized by the
/// larger of the two, so whatever seals within `CAP` also opens.
pub fn frame_len(
    aad_len: usize,
    payload_len: usize,
    tag_len: usize,
) -> Result<usize, CcmError> {
    let aad_padded_len = if aad_len == 0 {
        0
    } else {
        let prefix = encode_aad_length(aad_len as u64);
        let encoded = prefix.len().checked_add(aad_len);
        align_up(encoded.ok_or(CcmError::TooBig)?)?
    };
    let with_tag = payload_len.checked_add(tag_len).ok_or(CcmError::TooBig)?;
    let payload_region = align_up(payload_len)?.max(with_tag);
    BLOCK_SIZE
        .checked_add(aad_padded_len)
        .and_then(|len| len.checked_add(payload_region))
        .ok_or(CcmError::TooBig)
}

/// Builds the frame for `payload` and derives S0.
///
/// `tag` is the masked tag trailing the ciphertext on decrypt and `None`
/// on encrypt. On encrypt the payload is zero-padded to a block boundary.
/// `counter` is left at CTR1.
///
/// Capacity is checked against [`frame_len`] before anything is copied,
/// so encrypt and decrypt accept exactly the same messages.
pub fn compose<E, const CAP: usize>(
    engine: &mut E,
    work: &mut WorkBuffer<CAP>,
    counter: &mut Counter,
    params: &CcmParams<'_>,
    payload: &[u8],
    tag: Option<&[u8]>,
) -> Result<Frame, CcmError>
where
    E: BlockEngine + ?Sized,
{
    params.check_payload_len(payload.len())?;
    let aad_len = params.aad.len();
    let tag_len = params.tag_len.get();
    if tag.map_or(false, |tag| tag.len() != tag_len) {
        return Err(CcmError::InvalidArgument);
    }
    if frame_len(aad_len, payload.len(), tag_len)? > CAP {
        return Err(CcmError::TooBig);
    }

    work.truncate(0);

    // 1. B0
    let b0 = encode_b0(
        params.nonce.as_bytes(),
        tag_len,
        aad_len as u64,
        payload.len() as u64,
    )?;
    work.push(&b0)?;

    // 2. Associated data, length first
    if aad_len > 0 {
        let prefix = encode_aad_length(aad_len as u64);
        work.push(prefix.as_bytes())?;
        work.push(params.aad)?;
        work.pad_to_block()?;
    }
    let aad_padded_len = work.len() - BLOCK_SIZE;

    // 3. Payload
    let payload_offset = BLOCK_SIZE + aad_padded_len;
    let range = work.push(payload)?;
    if range.start != payload_offset {
        return Err(CcmError::BadState);
    }
    match tag {
        Some(tag) => {
            work.push(tag)?;
        }
        None => work.pad_to_block()?,
    }

    // 4. S0 = E(CTR0), then move on to CTR1
    let ctr0 = encode_ctr0(params.nonce.as_bytes())?;
    *counter = Counter::new(ctr0, params.nonce.q());
    let mut s0 = Zeroizing::new(ctr0);
    engine.encrypt_block(&mut s0)?;
    counter.increment();

    log::trace!(
        "ccm frame: aad_padded_len={} payload_offset={} wbuf_len={}",
        aad_padded_len,
        payload_offset,
        work.len()
    );

    Ok(Frame {
        wbuf_len: work.len(),
        aad_padded_len,
        payload_offset,
        payload_len: payload.len(),
        padded_payload_len: align_up(payload.len())?,
        s0,
    })
}
