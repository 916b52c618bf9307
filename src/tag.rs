//! Authentication tag: CBC-MAC over the cleartext frame, masked with S0.

use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::backend::{Block, BlockMac};
use crate::error::CcmError;
use crate::BLOCK_SIZE;

/// Raw CBC-MAC of `frame`, which must be B0 || AAD || plaintext with all
/// padding in place.
pub fn compute_tag<M>(
    mac: &mut M,
    frame: &[u8],
) -> Result<Zeroizing<Block>, CcmError>
where
    M: BlockMac + ?Sized,
{
    if frame.is_empty() || frame.len() % BLOCK_SIZE != 0 {
        log::error!("ccm: unaligned MAC input of {} bytes", frame.len());
        return Err(CcmError::BadState);
    }
    Ok(Zeroizing::new(mac.cbc_mac(frame)?))
}

/// `tag[..tag_len] ^ s0[..tag_len]`; the rest of the block stays zero.
pub fn xor_mask(tag: &Block, s0: &Block, tag_len: usize) -> Zeroizing<Block> {
    let mut out = Zeroizing::new([0u8; BLOCK_SIZE]);
    for ((o, t), s) in out.iter_mut().zip(tag).zip(s0).take(tag_len) {
        *o = t ^ s;
    }
    out
}

/// Compares the first `tag_len` bytes without an early exit.
pub fn verify(candidate: &Block, expected: &Block, tag_len: usize) -> bool {
    let tag_len = tag_len.min(BLOCK_SIZE);
    candidate[..tag_len].ct_eq(&expected[..tag_len]).into()
}
