//! RSA public-key block encryption.
//!
//! Plaintext of any length is split into blocks that fit the key and the
//! chosen padding, each block is encrypted on its own, and the ciphertext
//! blocks are concatenated:
//!
//! ```no_run
//! use rsa_block::{Cipher, CipherMode, HashAlgorithm, Key, Padding};
//!
//! let key = Key::load_from_file("public.pem", Key::from_pkix_der)?;
//! let mode = CipherMode::oaep(HashAlgorithm::Sha1);
//! let cipher = Cipher::new(key, Padding::for_mode(&mode), mode);
//!
//! let cipher_text = cipher.encrypt(b"hello world")?;
//! assert_eq!(cipher_text.len() % cipher.key().modulus_len(), 0);
//! # Ok::<(), rsa_block::Error>(())
//! ```
//!
//! Ciphertext carries no framing; a reader splits it into modulus-sized
//! blocks to decrypt.

pub mod error;
pub mod rsa;
pub mod util;

pub use error::{CipherError, DecodeError, Error, Result, SegmentationError};
pub use self::rsa::{ChunkSize, Cipher, CipherMode, HashAlgorithm, Key, KeyFormat, Padding};
