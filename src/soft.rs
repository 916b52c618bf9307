//! Portable backend built on RustCrypto block ciphers.

use aes::cipher::consts::U16;
use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockEncrypt, BlockSizeUser};
use zeroize::Zeroize;

use crate::backend::{Block, BlockEngine, BlockMac, KeySlot};
use crate::error::EngineError;
use crate::BLOCK_SIZE;

/// Software AES engine. The key schedule is the "key slot": erasing it
/// drops the cipher, which wipes its round keys.
pub struct SoftEngine<C> {
    cipher: Option<C>,
}

impl<C> SoftEngine<C>
where
    C: BlockEncrypt + BlockSizeUser<BlockSize = U16>,
{
    pub fn new(cipher: C) -> Self {
        SoftEngine {
            cipher: Some(cipher),
        }
    }

    /// Engine with an empty key slot.
    pub fn empty() -> Self {
        SoftEngine { cipher: None }
    }

    pub fn load_key(&mut self, cipher: C) {
        self.cipher = Some(cipher);
    }

    pub fn has_key(&self) -> bool {
        self.cipher.is_some()
    }

    fn cipher(&self) -> Result<&C, EngineError> {
        self.cipher.as_ref().ok_or(EngineError::KEY_NOT_LOADED)
    }
}

impl<C> BlockEngine for SoftEngine<C>
where
    C: BlockEncrypt + BlockSizeUser<BlockSize = U16>,
{
    fn encrypt_block(&mut self, block: &mut Block) -> Result<(), EngineError> {
        self.cipher()?
            .encrypt_block(GenericArray::from_mut_slice(&mut block[..]));
        Ok(())
    }
}

impl<C> BlockMac for SoftEngine<C>
where
    C: BlockEncrypt + BlockSizeUser<BlockSize = U16>,
{
    fn cbc_mac(&mut self, data: &[u8]) -> Result<Block, EngineError> {
        if data.len() % BLOCK_SIZE != 0 {
            return Err(EngineError::BAD_INPUT);
        }
        let cipher = self.cipher()?;

        let mut state = GenericArray::<u8, U16>::default();
        for chunk in data.chunks_exact(BLOCK_SIZE) {
            for (s, d) in state.iter_mut().zip(chunk) {
                *s ^= d;
            }
            cipher.encrypt_block(&mut state);
        }

        let mut mac = [0u8; BLOCK_SIZE];
        mac.copy_from_slice(&state);
        state.as_mut_slice().zeroize();
        Ok(mac)
    }
}

impl<C> KeySlot for SoftEngine<C> {
    fn erase_key(&mut self) -> Result<(), EngineError> {
        self.cipher = None;
        Ok(())
    }
}
