// RSA Cipher Modes
// Per-block public-key transforms with PKCS#1 v1.5 or OAEP padding

use rand::{CryptoRng, RngCore};
use rsa::traits::PublicKeyParts;
use rsa::{Oaep, Pkcs1v15Encrypt, RsaPrivateKey, RsaPublicKey};

use crate::error::CipherError;

/// PKCS#1 v1.5 overhead: 0x00 || 0x02 || PS (at least 8 bytes) || 0x00
pub const PKCS1V15_OVERHEAD: usize = 11;

/// Hash function used by OAEP for both the label hash and MGF1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    Sha1,
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgorithm {
    /// Digest length in bytes
    pub fn output_len(self) -> usize {
        match self {
            HashAlgorithm::Sha1 => 20,
            HashAlgorithm::Sha256 => 32,
            HashAlgorithm::Sha384 => 48,
            HashAlgorithm::Sha512 => 64,
        }
    }

    // Oaep owns boxed digests and is not Clone, so one is built per call
    fn padding(self) -> Oaep {
        match self {
            HashAlgorithm::Sha1 => Oaep::new::<sha1::Sha1>(),
            HashAlgorithm::Sha256 => Oaep::new::<sha2::Sha256>(),
            HashAlgorithm::Sha384 => Oaep::new::<sha2::Sha384>(),
            HashAlgorithm::Sha512 => Oaep::new::<sha2::Sha512>(),
        }
    }
}

/// Per-block encryption scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CipherMode {
    /// PKCS#1 v1.5 encryption padding
    Pkcs1v15,
    /// OAEP with the same hash for label and mask generation, empty label
    Oaep { hash: HashAlgorithm },
}

impl CipherMode {
    /// PKCS#1 v1.5 mode
    pub fn pkcs1v15() -> Self {
        CipherMode::Pkcs1v15
    }

    /// OAEP mode with the given hash
    pub fn oaep(hash: HashAlgorithm) -> Self {
        CipherMode::Oaep { hash }
    }

    /// Bytes of each block consumed by padding
    pub fn overhead(&self) -> usize {
        match self {
            CipherMode::Pkcs1v15 => PKCS1V15_OVERHEAD,
            CipherMode::Oaep { hash } => 2 * hash.output_len() + 2,
        }
    }

    /// Largest plaintext block this mode can encrypt under the given modulus,
    /// or `None` when not even one byte fits
    pub fn max_payload(&self, modulus_len: usize) -> Option<usize> {
        modulus_len
            .checked_sub(self.overhead())
            .filter(|&max| max > 0)
    }

    /// Size of every ciphertext block; always the modulus length
    pub fn output_len(&self, modulus_len: usize) -> usize {
        modulus_len
    }

    /// Encrypt one block with the public key
    ///
    /// Each call draws fresh padding randomness from `rng`.
    pub fn encrypt<R>(
        &self,
        rng: &mut R,
        block: &[u8],
        public_key: &RsaPublicKey,
    ) -> Result<Vec<u8>, CipherError>
    where
        R: CryptoRng + RngCore,
    {
        let max = public_key.size().saturating_sub(self.overhead());
        if block.len() > max {
            return Err(CipherError::BlockTooLarge {
                len: block.len(),
                max,
            });
        }

        let result = match self {
            CipherMode::Pkcs1v15 => public_key.encrypt(rng, Pkcs1v15Encrypt, block),
            CipherMode::Oaep { hash } => public_key.encrypt(rng, hash.padding(), block),
        };

        result.map_err(|err| match err {
            rsa::Error::MessageTooLong => CipherError::BlockTooLarge {
                len: block.len(),
                max,
            },
            _ => CipherError::Encryption,
        })
    }

    /// Decrypt one ciphertext block with the private key
    ///
    /// Every failure, whether padding, mask, hash, block length or wrong key,
    /// is reported as `InvalidPadding`.
    pub fn decrypt<R>(
        &self,
        rng: &mut R,
        cipher_block: &[u8],
        private_key: &RsaPrivateKey,
    ) -> Result<Vec<u8>, CipherError>
    where
        R: CryptoRng + RngCore,
    {
        let result = match self {
            CipherMode::Pkcs1v15 => private_key.decrypt_blinded(rng, Pkcs1v15Encrypt, cipher_block),
            CipherMode::Oaep { hash } => private_key.decrypt_blinded(rng, hash.padding(), cipher_block),
        };

        result.map_err(|_| CipherError::InvalidPadding)
    }
}
