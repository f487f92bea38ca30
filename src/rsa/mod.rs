// RSA Module - Main module file
// Exports the block encryption pipeline

pub mod cipher;
pub mod key;
pub mod mode;
pub mod padding;

pub use cipher::Cipher;
pub use key::{Key, KeyFormat, KeyParser};
pub use mode::{CipherMode, HashAlgorithm, PKCS1V15_OVERHEAD};
pub use padding::{ChunkSize, Padding};
