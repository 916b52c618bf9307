//! A `#![no_std]`, zero-allocation, single-shot AES-CCM engine that runs on
//! top of a pluggable block-cipher backend.
//! It ships a software backend using [RustCrypto's AES] and implements the
//! [`Aead`] trait, so it can be used together with other implementations.
//!
//! ## Overview
//! CCM (for "Counter with CBC-MAC") mode is a NIST approved mode of operation
//! defined in [SP 800-38C].
//!
//! This implementation accepts:
//! 1. Both non-empty payload and associated data (it encrypts and
//!    authenticates the payload and also authenticates the associated data).
//! 2. Non-empty payload and empty associated data (it encrypts and
//!    authenticates the payload).
//! 3. Non-empty associated data and empty payload (it degenerates to an
//!    authentication mode on the associated data).
//!
//! Nonces may be 7 to 13 bytes long. The payload length is bounded by the
//! length field that is left over (`15 - nonce length` bytes), and the
//! whole frame (B0, associated data and payload) by the capacity of the
//! context's work buffer, [`DEFAULT_CAPACITY`] bytes unless chosen
//! otherwise.
//!
//! ## Backends
//! The core talks to the block cipher through three capabilities:
//! [`BlockEngine`] (single block ECB and CTR), [`BlockMac`] (CBC-MAC) and
//! [`KeySlot`] (key erasure). [`SoftEngine`] provides all three in
//! software; a hardware AES unit with a CMAC engine can provide them
//! instead, optionally behind a [`SharedBackend`] lock.
//!
//! ## Usage
//! ```rust
//! use aes_ccm_engine::{
//!     aead::{consts::{U13, U8}, Aead, KeyInit, Payload},
//!     Aes128Ccm,
//! };
//!
//! let key = [
//!     0xC0, 0xC1, 0xC2, 0xC3, 0xC4, 0xC5, 0xC6, 0xC7, 0xC8, 0xC9, 0xCA,
//!     0xCB, 0xCC, 0xCD, 0xCE, 0xCF,
//! ];
//!
//! // `U8` is the tag size and `U13` the nonce size, in bytes
//! let ccm = Aes128Ccm::<U8, U13>::new(&key.into());
//!
//! let nonce = [
//!     0x00, 0x00, 0x00, 0x03, 0x02, 0x01, 0x00, 0xA0, 0xA1, 0xA2, 0xA3,
//!     0xA4, 0xA5,
//! ];
//! let msg = [
//!     0x08, 0x09, 0x0A, 0x0B, 0x0C, 0x0D, 0x0E, 0x0F, 0x10, 0x11, 0x12,
//!     0x13, 0x14, 0x15, 0x16, 0x17, 0x18, 0x19, 0x1A, 0x1B, 0x1C, 0x1D,
//!     0x1E,
//! ];
//! let associated_data = [0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07];
//!
//! let ciphertext = ccm
//!     .encrypt(
//!         &nonce.into(),
//!         Payload {
//!             aad: &associated_data,
//!             msg: &msg,
//!         },
//!     )
//!     .unwrap();
//!
//! let plaintext = ccm
//!     .decrypt(
//!         &nonce.into(),
//!         Payload {
//!             aad: &associated_data,
//!             msg: &ciphertext,
//!         },
//!     )
//!     .unwrap();
//!
//! assert_eq!(&msg[..], plaintext.as_slice());
//! ```
//!
//! ## Buffer Usage (no `alloc` required)
//! A [`CcmContext`] writes into caller buffers and never allocates. The tag
//! length is chosen per call:
//!
//! ```rust
//! use aes_ccm_engine::{
//!     aes::{cipher::KeyInit, Aes128},
//!     CcmConfig, CcmContext, SoftEngine,
//! };
//!
//! let key = [0x40u8; 16];
//! let engine = SoftEngine::new(Aes128::new(&key.into()));
//! let mut ccm: CcmContext<_> = CcmContext::new(engine)
//!     .with_config(CcmConfig { retain_key: true });
//!
//! let nonce = [0x10u8; 12];
//! let mut sealed = [0u8; 5 + 16];
//! let n = ccm
//!     .encrypt(&nonce, 16, b"header", b"hello", &mut sealed)
//!     .unwrap();
//!
//! let mut opened = [0u8; 5];
//! let m = ccm
//!     .decrypt(&nonce, 16, b"header", &sealed[..n], &mut opened)
//!     .unwrap();
//! assert_eq!(b"hello", &opened[..m]);
//! ```
//!
//! ## Security
//! Tags are compared in constant time, plaintext is only released after
//! the tag has been verified, and the work buffer, counter and every
//! intermediate tag are wiped before a call returns.
//!
//! The MAC length parameter is an important parameter to estimate the security
//! against collision attacks (that aim at finding different messages that
//! produce the same authentication tag).
//! The implementation accepts any even integer between 4 and 16, as suggested
//! in [SP 800-38C].
//!
//! [RFC 3610], which also specifies CCM, presents a few relevant security
//! suggestions, such as:
//! * It is recommended that most applications use a MAC length greater than 8.
//! * The usage of the same nonce for two different messages which are
//!   encrypted with the same key destroys the security of CCM mode.
//!
//! [RustCrypto's AES]: https://github.com/RustCrypto/block-ciphers
//! [`Aead`]: https://docs.rs/aead/latest/aead/trait.Aead.html
//! [SP 800-38C]: https://csrc.nist.gov/publications/detail/sp/800-38c/final
//! [RFC 3610]: https://tools.ietf.org/html/rfc3610

#![cfg_attr(not(any(feature = "std", test)), no_std)]

#[cfg(test)]
#[macro_use]
extern crate hex_literal;

mod backend;
mod ccm;
mod compose;
mod error;
mod framing;
mod mode;
mod params;
mod payload;
mod soft;
mod tag;

/// AES block size in bytes.
pub const BLOCK_SIZE: usize = 16;

pub use aead::{self, AeadCore, AeadInPlace, KeyInit};
pub use aes;

pub use backend::{
    Block, BlockEngine, BlockMac, CcmBackend, Counter, KeySlot, SharedBackend,
};
pub use ccm::{CcmConfig, CcmContext, Stage, DEFAULT_CAPACITY};
pub use compose::{compose, frame_len, Frame, WorkBuffer};
pub use error::{CcmError, EngineError};
pub use framing::{
    encode_aad_length, encode_b0, encode_b0_flags, encode_ctr0,
    encode_ctr0_flags, AadLengthPrefix,
};
pub use mode::{
    Aes128Ccm, Aes192Ccm, Aes256Ccm, CcmMode, CcmNonceSize, CcmTagSize,
};
pub use params::{CcmParams, Nonce, TagLength, MAX_NONCE_LEN, MIN_NONCE_LEN};
pub use payload::cipher_payload;
pub use soft::SoftEngine;
pub use tag::{compute_tag, verify, xor_mask};
