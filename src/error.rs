//! AES-CCM errors.

use core::fmt;

/// Opaque failure reported by a block-cipher backend.
///
/// The CCM core never interprets the code; it is handed back to the caller
/// inside [`CcmError::Engine`] exactly as the backend produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineError(pub u32);

impl EngineError {
    /// The key slot was erased (or never loaded) before a primitive call.
    pub const KEY_NOT_LOADED: EngineError = EngineError(1);
    /// The backend was handed a buffer it cannot process.
    pub const BAD_INPUT: EngineError = EngineError(2);
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "block cipher engine failure (code {:#x})", self.0)
    }
}

/// The error type for AES-CCM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CcmError {
    /// Malformed parameters: illegal tag or nonce length, short buffers.
    InvalidArgument,
    /// Payload length does not fit in the length field, or misaligned
    /// block sizes were requested.
    BadLength,
    /// The work buffer capacity would be exceeded.
    TooBig,
    /// Internal framing invariant violated. Indicates a bug, not bad input.
    BadState,
    /// Tag mismatch on decryption.
    AuthenticationFailed,
    /// The block cipher backend failed.
    Engine(EngineError),
}

impl From<EngineError> for CcmError {
    fn from(err: EngineError) -> Self {
        CcmError::Engine(err)
    }
}

impl fmt::Display for CcmError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CcmError::InvalidArgument => write!(
                f,
                "Bad CCM parameters. Allowed tag sizes are: 4, 6, 8, 10, 12, \
                 14, 16 and nonce sizes 7 to 13"
            ),
            CcmError::BadLength => {
                write!(f, "Payload length does not fit the CCM length field")
            }
            CcmError::TooBig => {
                write!(f, "Message exceeds the CCM work buffer capacity")
            }
            CcmError::BadState => write!(f, "CCM internal framing error"),
            CcmError::AuthenticationFailed => {
                write!(f, "CCM tag verification failed")
            }
            CcmError::Engine(err) => err.fmt(f),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for CcmError {}

#[cfg(feature = "std")]
impl std::error::Error for EngineError {}

impl From<CcmError> for aead::Error {
    fn from(_: CcmError) -> Self {
        aead::Error
    }
}
