//! CTR encryption of the payload region.
//!
//! The CTR mode used by CCM starts at counter value 1; value 0 is kept
//! for masking the tag. Encryption and decryption are the same operation.

use crate::backend::{BlockEngine, Counter};
use crate::compose::WorkBuffer;
use crate::error::CcmError;
use crate::BLOCK_SIZE;

/// Runs CTR in place over `payload_len` bytes at `payload_offset`,
/// continuing from `counter`. `payload_len` must be whole blocks.
pub fn cipher_payload<E, const CAP: usize>(
    engine: &mut E,
    counter: &mut Counter,
    work: &mut WorkBuffer<CAP>,
    payload_offset: usize,
    payload_len: usize,
) -> Result<(), CcmError>
where
    E: BlockEngine + ?Sized,
{
    if payload_len % BLOCK_SIZE != 0 {
        log::error!("ccm: unaligned CTR input of {} bytes", payload_len);
        return Err(CcmError::BadState);
    }
    if payload_len == 0 {
        return Ok(());
    }

    let end = payload_offset
        .checked_add(payload_len)
        .ok_or(CcmError::BadState)?;
    let region = work.region_mut(payload_offset..end)?;
    engine.ctr_apply(counter, region)?;
    Ok(())
}
