//! AES-CCM single-shot processing.
//!
//! One call runs a small state machine over a [`CcmContext`]:
//! ```text
//! encrypt: ValidateArgs -> ComposeFrame -> TagFinalize -> CipherPayload
//!          -> EmitResult -> Cleanup
//! decrypt: ValidateArgs -> ComposeFrame -> CipherPayload -> TagVerify
//!          -> EmitResult -> Cleanup
//! ```
//! Unless the configuration retains it, the key slot is erased on entry to
//! `EmitResult`, so nothing reaches the caller if the erase fails. Any
//! failure jumps straight to `Cleanup`, which wipes the work buffer and
//! counter and erases the key slot if that has not happened yet.
//!
//! The tag is always computed over the cleartext frame. On encrypt that is
//! before the payload goes through CTR, on decrypt after it came back out.

use core::ops::Range;

use zeroize::{Zeroize, Zeroizing};

use crate::backend::{Block, CcmBackend, Counter};
use crate::compose::{compose, WorkBuffer};
use crate::error::CcmError;
use crate::params::CcmParams;
use crate::payload::cipher_payload;
use crate::tag::{compute_tag, verify, xor_mask};
use crate::BLOCK_SIZE;

/// Work buffer size used when none is given. Bounds B0, the encoded
/// associated data and the padded payload together.
pub const DEFAULT_CAPACITY: usize = 4096;

/// Run-time options of a [`CcmContext`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CcmConfig {
    /// Keep the key slot populated after an operation. When `false` the
    /// key is erased on every exit path.
    pub retain_key: bool,
}

/// Steps of one CCM operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    ValidateArgs,
    ComposeFrame,
    CipherPayload,
    TagFinalize,
    TagVerify,
    EmitResult,
    Cleanup,
}

/// Result of the encrypt path, still inside the work buffer.
struct Sealed {
    ciphertext: Range<usize>,
    tag: Zeroizing<Block>,
}

/// A CCM engine bound to one backend.
///
/// Operations take `&mut self`: the work buffer and counter are shared by
/// every call on the context, so a context serves one operation at a time.
/// Use one context per thread, or put the backend behind a
/// [`SharedBackend`](crate::SharedBackend).
pub struct CcmContext<B, const CAP: usize = DEFAULT_CAPACITY> {
    backend: B,
    config: CcmConfig,
    work: WorkBuffer<CAP>,
    counter: Counter,
    stage: Stage,
    key_pending_erase: bool,
}

impl<B: CcmBackend, const CAP: usize> CcmContext<B, CAP> {
    pub fn new(backend: B) -> Self {
        CcmContext {
            backend,
            config: CcmConfig::default(),
            work: WorkBuffer::new(),
            counter: Counter::default(),
            stage: Stage::Idle,
            key_pending_erase: false,
        }
    }

    pub fn with_config(mut self, config: CcmConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> CcmConfig {
        self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// The last stage entered; `Cleanup` once an operation has returned.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Encrypts or decrypts `input` into `output`, returning the number of
    /// bytes written.
    ///
    /// Encrypting writes `ciphertext || tag`, so `output` must hold
    /// `input.len() + tag_len` bytes. Decrypting expects `input` to be
    /// `ciphertext || tag` and writes the plaintext only once the tag has
    /// been verified. On any error `output` is zeroed.
    pub fn process(
        &mut self,
        is_encrypt: bool,
        nonce: &[u8],
        tag_len: usize,
        aad: &[u8],
        input: &[u8],
        output: &mut [u8],
    ) -> Result<usize, CcmError> {
        if is_encrypt {
            self.encrypt(nonce, tag_len, aad, input, output)
        } else {
            self.decrypt(nonce, tag_len, aad, input, output)
        }
    }

    /// CCM tag generation and encryption procedure.
    pub fn encrypt(
        &mut self,
        nonce: &[u8],
        tag_len: usize,
        aad: &[u8],
        plaintext: &[u8],
        output: &mut [u8],
    ) -> Result<usize, CcmError> {
        let result = self.run(|ctx| {
            ctx.enter(Stage::ValidateArgs);
            let params = CcmParams::new(nonce, tag_len, aad)?;
            params.check_payload_len(plaintext.len())?;
            let total = plaintext
                .len()
                .checked_add(tag_len)
                .ok_or(CcmError::TooBig)?;
            if output.len() < total {
                return Err(CcmError::InvalidArgument);
            }

            let sealed = ctx.seal(&params, plaintext)?;

            ctx.emit()?;
            let (ciphertext, tag) =
                output[..total].split_at_mut(plaintext.len());
            ciphertext.copy_from_slice(ctx.work.region(sealed.ciphertext)?);
            tag.copy_from_slice(&sealed.tag[..tag_len]);
            Ok(total)
        });
        if result.is_err() {
            output.zeroize();
        }
        result
    }

    /// CCM decryption and tag verification procedure.
    pub fn decrypt(
        &mut self,
        nonce: &[u8],
        tag_len: usize,
        aad: &[u8],
        input: &[u8],
        output: &mut [u8],
    ) -> Result<usize, CcmError> {
        let result = self.run(|ctx| {
            ctx.enter(Stage::ValidateArgs);
            let params = CcmParams::new(nonce, tag_len, aad)?;
            if input.len() < tag_len {
                return Err(CcmError::InvalidArgument);
            }
            let (ciphertext, tag) = input.split_at(input.len() - tag_len);
            params.check_payload_len(ciphertext.len())?;
            if output.len() < ciphertext.len() {
                return Err(CcmError::InvalidArgument);
            }

            let plaintext = ctx.open(&params, ciphertext, tag)?;

            ctx.emit()?;
            output[..ciphertext.len()]
                .copy_from_slice(ctx.work.region(plaintext)?);
            Ok(ciphertext.len())
        });
        if result.is_err() {
            output.zeroize();
        }
        result
    }

    /// Encrypts `buffer` in place and writes the masked tag to `tag`,
    /// whose length selects the tag length. On failure `buffer` is left
    /// as it was and `tag` is zeroed.
    pub fn encrypt_in_place_detached(
        &mut self,
        nonce: &[u8],
        aad: &[u8],
        buffer: &mut [u8],
        tag: &mut [u8],
    ) -> Result<(), CcmError> {
        let tag_len = tag.len();
        let result = self.run(|ctx| {
            ctx.enter(Stage::ValidateArgs);
            let params = CcmParams::new(nonce, tag_len, aad)?;
            params.check_payload_len(buffer.len())?;

            let sealed = ctx.seal(&params, buffer)?;

            ctx.emit()?;
            let ciphertext = ctx.work.region(sealed.ciphertext)?;
            buffer.copy_from_slice(ciphertext);
            tag.copy_from_slice(&sealed.tag[..tag_len]);
            Ok(())
        });
        if result.is_err() {
            tag.zeroize();
        }
        result
    }

    /// Decrypts `buffer` in place after checking `tag`. On failure
    /// `buffer` still holds the ciphertext.
    pub fn decrypt_in_place_detached(
        &mut self,
        nonce: &[u8],
        aad: &[u8],
        buffer: &mut [u8],
        tag: &[u8],
    ) -> Result<(), CcmError> {
        self.run(|ctx| {
            ctx.enter(Stage::ValidateArgs);
            let params = CcmParams::new(nonce, tag.len(), aad)?;
            params.check_payload_len(buffer.len())?;

            let plaintext = ctx.open(&params, buffer, tag)?;

            ctx.emit()?;
            buffer.copy_from_slice(ctx.work.region(plaintext)?);
            Ok(())
        })
    }

    /// Frames `plaintext`, tags it, encrypts it. Ciphertext is left in the
    /// work buffer, followed by zeroed padding.
    fn seal(
        &mut self,
        params: &CcmParams<'_>,
        plaintext: &[u8],
    ) -> Result<Sealed, CcmError> {
        self.enter(Stage::ComposeFrame);
        let frame = compose(
            &mut self.backend,
            &mut self.work,
            &mut self.counter,
            params,
            plaintext,
            None,
        )?;
        check_aligned(Stage::ComposeFrame, frame.wbuf_len)?;

        self.enter(Stage::TagFinalize);
        let raw_tag = compute_tag(&mut self.backend, self.work.as_slice())?;

        self.enter(Stage::CipherPayload);
        check_aligned(Stage::CipherPayload, frame.padded_payload_len)?;
        cipher_payload(
            &mut self.backend,
            &mut self.counter,
            &mut self.work,
            frame.payload_offset,
            frame.padded_payload_len,
        )?;

        Ok(Sealed {
            ciphertext: frame.payload_range(),
            tag: xor_mask(&raw_tag, &frame.s0, params.tag_len.get()),
        })
    }

    /// Frames `ciphertext`, decrypts it and checks `masked_tag`. Returns the
    /// plaintext's place in the work buffer only when the tag matched.
    fn open(
        &mut self,
        params: &CcmParams<'_>,
        ciphertext: &[u8],
        masked_tag: &[u8],
    ) -> Result<Range<usize>, CcmError> {
        let tag_len = params.tag_len.get();
        if masked_tag.len() != tag_len {
            return Err(CcmError::InvalidArgument);
        }

        self.enter(Stage::ComposeFrame);
        let frame = compose(
            &mut self.backend,
            &mut self.work,
            &mut self.counter,
            params,
            ciphertext,
            Some(masked_tag),
        )?;
        let payload = frame.payload_range();

        // Lift the tag out of the frame before it is padded for CBC-MAC
        let mut received = Zeroizing::new([0u8; BLOCK_SIZE]);
        received[..tag_len].copy_from_slice(
            self.work.region(payload.end..payload.end + tag_len)?,
        );
        let candidate = xor_mask(&received, &frame.s0, tag_len);
        self.work.truncate(payload.end);
        self.work.pad_to_block()?;
        check_aligned(Stage::ComposeFrame, self.work.len())?;

        self.enter(Stage::CipherPayload);
        check_aligned(Stage::CipherPayload, frame.padded_payload_len)?;
        cipher_payload(
            &mut self.backend,
            &mut self.counter,
            &mut self.work,
            frame.payload_offset,
            frame.padded_payload_len,
        )?;
        // The padding went through CTR too; zero it again
        let padded_end = frame.padded_range().end;
        self.work.region_mut(payload.end..padded_end)?.fill(0);

        self.enter(Stage::TagVerify);
        let expected = compute_tag(&mut self.backend, self.work.as_slice())?;
        if !verify(&candidate, &expected, tag_len) {
            log::warn!(
                "ccm: tag mismatch, {} bytes withheld",
                frame.payload_len
            );
            return Err(CcmError::AuthenticationFailed);
        }
        Ok(payload)
    }

    fn run<T, F>(&mut self, op: F) -> Result<T, CcmError>
    where
        F: FnOnce(&mut Self) -> Result<T, CcmError>,
    {
        self.key_pending_erase = !self.config.retain_key;
        let result = op(self);
        self.cleanup();
        match &result {
            Ok(_) => log::debug!("ccm: operation complete"),
            Err(err) => log::debug!("ccm: operation failed: {}", err),
        }
        result
    }

    /// Enters `EmitResult`. The key slot is released first; the caller's
    /// buffers are only written once this returns `Ok`.
    fn emit(&mut self) -> Result<(), CcmError> {
        self.enter(Stage::EmitResult);
        self.release_key()
    }

    fn release_key(&mut self) -> Result<(), CcmError> {
        if self.key_pending_erase {
            self.key_pending_erase = false;
            self.backend.erase_key()?;
        }
        Ok(())
    }

    fn cleanup(&mut self) {
        self.enter(Stage::Cleanup);
        self.work.zeroize();
        self.counter.zeroize();
        // The operation already failed; its error is the one reported
        if let Err(err) = self.release_key() {
            log::error!("ccm: key erase failed during cleanup: {}", err);
        }
    }

    fn enter(&mut self, stage: Stage) {
        log::trace!("ccm: {:?} -> {:?}", self.stage, stage);
        self.stage = stage;
    }

    #[cfg(test)]
    pub(crate) fn scratch_is_clear(&self) -> bool {
        self.work.is_empty()
            && self.work.raw().iter().all(|&b| b == 0)
            && self.counter.block().iter().all(|&b| b == 0)
    }
}

fn check_aligned(stage: Stage, len: usize) -> Result<(), CcmError> {
    if len % BLOCK_SIZE != 0 {
        log::error!("ccm: {:?} produced {} unaligned bytes", stage, len);
        return Err(CcmError::BadState);
    }
    Ok(())
}
