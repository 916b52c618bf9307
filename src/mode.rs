//! [`aead`] trait implementations on top of [`CcmContext`].

use core::marker::PhantomData;

use aead::consts::{U0, U10, U11, U12, U13, U14, U16, U4, U6, U7, U8, U9};
use aead::generic_array::ArrayLength;
use aead::{AeadCore, AeadInPlace, Key, KeyInit, KeySizeUser};
use aes::cipher::{BlockEncrypt, BlockSizeUser};
use aes::{Aes128, Aes192, Aes256};

use crate::ccm::{CcmContext, DEFAULT_CAPACITY};
use crate::soft::SoftEngine;

mod private {
    pub trait SealedTag {}
    pub trait SealedNonce {}
}

/// Tag sizes CCM can encode: 4, 6, 8, 10, 12, 14 and 16 bytes.
pub trait CcmTagSize: ArrayLength<u8> + private::SealedTag {}

/// Nonce sizes CCM accepts: 7 to 13 bytes.
pub trait CcmNonceSize: ArrayLength<u8> + private::SealedNonce {}

macro_rules! impl_tag_size {
    ($($size:ty),*) => {$(
        impl private::SealedTag for $size {}
        impl CcmTagSize for $size {}
    )*};
}

macro_rules! impl_nonce_size {
    ($($size:ty),*) => {$(
        impl private::SealedNonce for $size {}
        impl CcmNonceSize for $size {}
    )*};
}

impl_tag_size!(U4, U6, U8, U10, U12, U14, U16);
impl_nonce_size!(U7, U8, U9, U10, U11, U12, U13);

/// AES-CCM with the tag size `M` and nonce size `N` fixed at the type
/// level, over the software engine.
///
/// Each call builds its own [`CcmContext`] with a `CAP`-byte work buffer,
/// so a `CcmMode` can be shared freely.
pub struct CcmMode<C, M, N, const CAP: usize = DEFAULT_CAPACITY> {
    cipher: C,
    _sizes: PhantomData<(M, N)>,
}

pub type Aes128Ccm<M, N> = CcmMode<Aes128, M, N>;
pub type Aes192Ccm<M, N> = CcmMode<Aes192, M, N>;
pub type Aes256Ccm<M, N> = CcmMode<Aes256, M, N>;

impl<C, M, N, const CAP: usize> CcmMode<C, M, N, CAP>
where
    C: BlockEncrypt + BlockSizeUser<BlockSize = U16> + Clone,
    M: CcmTagSize,
    N: CcmNonceSize,
{
    fn context(&self) -> CcmContext<SoftEngine<C>, CAP> {
        CcmContext::new(SoftEngine::new(self.cipher.clone()))
    }
}

impl<C, M, N, const CAP: usize> From<C> for CcmMode<C, M, N, CAP> {
    fn from(cipher: C) -> Self {
        CcmMode {
            cipher,
            _sizes: PhantomData,
        }
    }
}

impl<C: Clone, M, N, const CAP: usize> Clone for CcmMode<C, M, N, CAP> {
    fn clone(&self) -> Self {
        CcmMode {
            cipher: self.cipher.clone(),
            _sizes: PhantomData,
        }
    }
}

impl<C: KeySizeUser, M, N, const CAP: usize> KeySizeUser
    for CcmMode<C, M, N, CAP>
{
    type KeySize = C::KeySize;
}

impl<C: KeyInit, M, N, const CAP: usize> KeyInit for CcmMode<C, M, N, CAP> {
    fn new(key: &Key<Self>) -> Self {
        C::new(key).into()
    }
}

impl<C, M, N, const CAP: usize> AeadCore for CcmMode<C, M, N, CAP>
where
    M: CcmTagSize,
    N: CcmNonceSize,
{
    type NonceSize = N;
    type TagSize = M;
    type CiphertextOverhead = U0;
}

impl<C, M, N, const CAP: usize> AeadInPlace for CcmMode<C, M, N, CAP>
where
    C: BlockEncrypt + BlockSizeUser<BlockSize = U16> + Clone,
    M: CcmTagSize,
    N: CcmNonceSize,
{
    fn encrypt_in_place_detached(
        &self,
        nonce: &aead::Nonce<Self>,
        associated_data: &[u8],
        buffer: &mut [u8],
    ) -> aead::Result<aead::Tag<Self>> {
        let mut tag = aead::Tag::<Self>::default();
        self.context().encrypt_in_place_detached(
            nonce,
            associated_data,
            buffer,
            &mut tag,
        )?;
        Ok(tag)
    }

    fn decrypt_in_place_detached(
        &self,
        nonce: &aead::Nonce<Self>,
        associated_data: &[u8],
        buffer: &mut [u8],
        tag: &aead::Tag<Self>,
    ) -> aead::Result<()> {
        self.context()
            .decrypt_in_place_detached(nonce, associated_data, buffer, tag)?;
        Ok(())
    }
}
