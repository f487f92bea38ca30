// Error types
// One enum per pipeline layer, wrapped by the crate-level Error

use std::io;

use thiserror::Error;

/// Errors raised while decoding a key container
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// The PEM envelope is absent or malformed
    #[error("key is not in PEM format")]
    NotPem,

    /// The decoded structure is not an RSA public key of the expected format
    #[error("unsupported key type")]
    UnsupportedKeyType,
}

/// Errors raised while splitting plaintext into blocks
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SegmentationError {
    /// Not even one byte of payload fits next to the mode's padding overhead
    #[error("modulus too small: {modulus_len} bytes, mode overhead is {overhead} bytes")]
    ModulusTooSmall { modulus_len: usize, overhead: usize },

    /// A fixed chunk size is larger than what the key and mode can carry
    #[error("chunk size {chunk} exceeds the maximum block payload of {max} bytes")]
    ChunkTooLarge { chunk: usize, max: usize },
}

/// Per-block cryptographic failures
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CipherError {
    /// Padding, mask or hash check failed on decrypt.
    /// Deliberately carries no detail about which check failed.
    #[error("decryption failed")]
    InvalidPadding,

    /// The secure randomness source could not be read
    #[error("secure random source failure")]
    RandomSourceFailure,

    /// A block handed to a mode is larger than the mode can encrypt
    #[error("block too large: {len} bytes, max {max}")]
    BlockTooLarge { len: usize, max: usize },

    /// Ciphertext length is not a whole number of blocks
    #[error("invalid ciphertext length {len}: not a multiple of {block_len}")]
    InvalidCiphertextLength { len: usize, block_len: usize },

    /// Any other failure of the public-key transform
    #[error("encryption failed")]
    Encryption,
}

/// Crate-level error
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("key path is empty")]
    EmptyPath,

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Segmentation(#[from] SegmentationError),

    #[error(transparent)]
    Cipher(#[from] CipherError),
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;
