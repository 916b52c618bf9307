//! Block cipher capabilities the CCM core is built on.
//!
//! A backend can be the portable [`SoftEngine`](crate::SoftEngine) or a
//! driver for a hardware AES unit that exposes ECB, CTR and a CMAC engine
//! able to run plain CBC-MAC. The core only ever talks to these traits.

use spin::Mutex;
use zeroize::Zeroize;

use crate::error::EngineError;
use crate::BLOCK_SIZE;

/// One 16-byte AES block.
pub type Block = [u8; BLOCK_SIZE];

/// A CCM counter block: flags, nonce and a big-endian block counter in
/// the trailing `width` bytes.
#[derive(Clone, Zeroize)]
pub struct Counter {
    block: Block,
    width: usize,
}

impl Counter {
    /// `width` is the length-field size q, between 2 and 8.
    pub fn new(block: Block, width: usize) -> Self {
        debug_assert!((2..=8).contains(&width));
        Counter { block, width }
    }

    pub fn block(&self) -> &Block {
        &self.block
    }

    /// Adds one to the counter field. The carry never leaves the field.
    pub fn increment(&mut self) {
        for byte in self.block[BLOCK_SIZE - self.width..].iter_mut().rev() {
            *byte = byte.wrapping_add(1);
            if *byte != 0 {
                break;
            }
        }
    }
}

impl Default for Counter {
    fn default() -> Self {
        Counter {
            block: [0u8; BLOCK_SIZE],
            width: 2,
        }
    }
}

/// Raw block encryption and CTR keystream generation under the session key.
pub trait BlockEngine {
    /// Encrypts a single block in place (ECB).
    fn encrypt_block(&mut self, block: &mut Block) -> Result<(), EngineError>;

    /// XORs `data` with the keystream `E(counter), E(counter + 1), ...`
    /// and leaves `counter` at the first unused value. `data` is a whole
    /// number of blocks.
    fn ctr_apply(
        &mut self,
        counter: &mut Counter,
        data: &mut [u8],
    ) -> Result<(), EngineError> {
        if data.len() % BLOCK_SIZE != 0 {
            return Err(EngineError::BAD_INPUT);
        }
        let mut keystream = [0u8; BLOCK_SIZE];
        for chunk in data.chunks_exact_mut(BLOCK_SIZE) {
            keystream.copy_from_slice(counter.block());
            self.encrypt_block(&mut keystream)?;
            for (d, k) in chunk.iter_mut().zip(keystream.iter()) {
                *d ^= k;
            }
            counter.increment();
        }
        keystream.zeroize();
        Ok(())
    }
}

/// CBC-MAC with a zero IV over whole blocks, returning the last cipher
/// block. Hardware CMAC units provide this by skipping the subkey step on
/// the final block.
pub trait BlockMac {
    fn cbc_mac(&mut self, data: &[u8]) -> Result<Block, EngineError>;
}

/// Key slot holding the session key.
pub trait KeySlot {
    /// Wipes the key from the slot. Further primitive calls fail until a
    /// key is loaded again.
    fn erase_key(&mut self) -> Result<(), EngineError>;
}

/// Everything CCM needs from a backend.
pub trait CcmBackend: BlockEngine + BlockMac + KeySlot {}

impl<T: BlockEngine + BlockMac + KeySlot> CcmBackend for T {}

/// A handle to a backend shared behind a lock, e.g. the single AES unit
/// of an SoC. The lock is taken for each primitive call and released
/// before the next one.
pub struct SharedBackend<'a, B> {
    inner: &'a Mutex<B>,
}

impl<'a, B> SharedBackend<'a, B> {
    pub fn new(inner: &'a Mutex<B>) -> Self {
        SharedBackend { inner }
    }
}

impl<B: BlockEngine> BlockEngine for SharedBackend<'_, B> {
    fn encrypt_block(&mut self, block: &mut Block) -> Result<(), EngineError> {
        self.inner.lock().encrypt_block(block)
    }

    fn ctr_apply(
        &mut self,
        counter: &mut Counter,
        data: &mut [u8],
    ) -> Result<(), EngineError> {
        self.inner.lock().ctr_apply(counter, data)
    }
}

impl<B: BlockMac> BlockMac for SharedBackend<'_, B> {
    fn cbc_mac(&mut self, data: &[u8]) -> Result<Block, EngineError> {
        self.inner.lock().cbc_mac(data)
    }
}

impl<B: KeySlot> KeySlot for SharedBackend<'_, B> {
    fn erase_key(&mut self) -> Result<(), EngineError> {
        self.inner.lock().erase_key()
    }
}
