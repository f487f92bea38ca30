// RSA Block Cipher
// Composes a key, a padding policy and a cipher mode into whole-message encryption

use rand::rngs::{OsRng, StdRng};
use rand::{CryptoRng, RngCore, SeedableRng};
use rsa::RsaPrivateKey;
use tracing::debug;

use super::key::Key;
use super::mode::CipherMode;
use super::padding::Padding;
use crate::error::{CipherError, Result};

/// Block cipher over an RSA public key
///
/// The ciphertext is the concatenation of one modulus-sized block per
/// plaintext block, with no framing. Immutable once built, so a single
/// instance can serve concurrent callers.
#[derive(Debug, Clone)]
pub struct Cipher {
    key: Key,
    padding: Padding,
    mode: CipherMode,
}

impl Cipher {
    pub fn new(key: Key, padding: Padding, mode: CipherMode) -> Self {
        Self { key, padding, mode }
    }

    pub fn key(&self) -> &Key {
        &self.key
    }

    pub fn padding(&self) -> &Padding {
        &self.padding
    }

    pub fn mode(&self) -> CipherMode {
        self.mode
    }

    /// Encrypt `plain_text` using a freshly seeded CSPRNG
    pub fn encrypt(&self, plain_text: &[u8]) -> Result<Vec<u8>> {
        let mut rng = os_seeded_rng()?;
        self.encrypt_with_rng(&mut rng, plain_text)
    }

    /// Encrypt `plain_text` drawing all padding randomness from `rng`
    ///
    /// Stops at the first failing block; no partial ciphertext is returned.
    pub fn encrypt_with_rng<R>(&self, rng: &mut R, plain_text: &[u8]) -> Result<Vec<u8>>
    where
        R: CryptoRng + RngCore,
    {
        let modulus_len = self.key.modulus_len();
        let blocks = self.padding.pad(plain_text, modulus_len)?;
        debug!(
            modulus_len,
            blocks = blocks.len(),
            mode = ?self.mode,
            "encrypting {} bytes",
            plain_text.len()
        );

        let mut cipher_text = Vec::with_capacity(blocks.len() * self.mode.output_len(modulus_len));
        for block in blocks {
            let cipher_block = self.mode.encrypt(rng, block, self.key.public_key())?;
            cipher_text.extend_from_slice(&cipher_block);
        }

        Ok(cipher_text)
    }

    /// Decrypt ciphertext produced by `encrypt` with the matching private key
    pub fn decrypt(&self, cipher_text: &[u8], private_key: &RsaPrivateKey) -> Result<Vec<u8>> {
        let mut rng = os_seeded_rng()?;
        self.decrypt_with_rng(&mut rng, cipher_text, private_key)
    }

    /// Decrypt using `rng` for blinding
    pub fn decrypt_with_rng<R>(
        &self,
        rng: &mut R,
        cipher_text: &[u8],
        private_key: &RsaPrivateKey,
    ) -> Result<Vec<u8>>
    where
        R: CryptoRng + RngCore,
    {
        let block_len = self.mode.output_len(self.key.modulus_len());
        if cipher_text.len() % block_len != 0 {
            return Err(CipherError::InvalidCiphertextLength {
                len: cipher_text.len(),
                block_len,
            }
            .into());
        }
        debug!(blocks = cipher_text.len() / block_len, mode = ?self.mode, "decrypting");

        let blocks = cipher_text
            .chunks(block_len)
            .map(|block| self.mode.decrypt(rng, block, private_key))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(self.padding.unpad(&blocks))
    }

    /// Encrypt blocks in parallel, each with its own OS-seeded CSPRNG
    ///
    /// Output is identical in layout to `encrypt`.
    #[cfg(feature = "parallel")]
    pub fn par_encrypt(&self, plain_text: &[u8]) -> Result<Vec<u8>> {
        use rayon::prelude::*;

        let modulus_len = self.key.modulus_len();
        let blocks = self.padding.pad(plain_text, modulus_len)?;
        debug!(modulus_len, blocks = blocks.len(), mode = ?self.mode, "encrypting in parallel");

        // Indexed collect keeps block order
        let cipher_blocks = blocks
            .par_iter()
            .map(|block| {
                let mut rng = os_seeded_rng()?;
                self.mode.encrypt(&mut rng, block, self.key.public_key())
            })
            .collect::<std::result::Result<Vec<_>, CipherError>>()?;

        Ok(cipher_blocks.concat())
    }
}

fn os_seeded_rng() -> std::result::Result<StdRng, CipherError> {
    StdRng::from_rng(OsRng).map_err(|_| CipherError::RandomSourceFailure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, SegmentationError};
    use crate::rsa::key::KeyFormat;
    use crate::rsa::mode::HashAlgorithm;
    use rsa::pkcs8::DecodePrivateKey;
    use std::num::NonZeroUsize;

    fn get_test_keys() -> (Key, RsaPrivateKey) {
        let key = Key::parse_pem(
            include_bytes!("../../tests/fixtures/rsa512_public_pkix.pem"),
            KeyFormat::Pkix,
        )
        .unwrap();
        let private_key =
            RsaPrivateKey::from_pkcs8_pem(include_str!("../../tests/fixtures/rsa512_private.pem")).unwrap();
        (key, private_key)
    }

    fn cipher_for(mode: CipherMode) -> (Cipher, RsaPrivateKey) {
        let (key, private_key) = get_test_keys();
        (Cipher::new(key, Padding::for_mode(&mode), mode), private_key)
    }

    #[test]
    fn test_encrypt_length() {
        let (cipher, _) = cipher_for(CipherMode::pkcs1v15());
        let message = vec![0xABu8; 120];

        // 120 bytes at 53 per block -> 3 blocks of 64 bytes
        let ciphertext = cipher.encrypt(&message).unwrap();
        assert_eq!(ciphertext.len(), 3 * 64);
        assert_eq!(
            ciphertext.len(),
            cipher.padding().block_count(message.len(), 64).unwrap() * 64
        );
    }

    #[test]
    fn test_roundtrip_various_sizes() {
        for mode in [CipherMode::pkcs1v15(), CipherMode::oaep(HashAlgorithm::Sha1)] {
            let (cipher, private_key) = cipher_for(mode);
            let test_cases: Vec<Vec<u8>> = vec![
                b"A".to_vec(),
                b"Hello, World!".to_vec(),
                vec![0u8; 100],
                vec![255u8; 53],
                (0..=255u8).collect(),
            ];

            for message in test_cases {
                let ciphertext = cipher.encrypt(&message).unwrap();
                let decrypted = cipher.decrypt(&ciphertext, &private_key).unwrap();
                assert_eq!(message, decrypted);
            }
        }
    }

    #[test]
    fn test_empty_input() {
        let (cipher, private_key) = cipher_for(CipherMode::pkcs1v15());
        let ciphertext = cipher.encrypt(b"").unwrap();
        assert!(ciphertext.is_empty());
        assert!(cipher.decrypt(&ciphertext, &private_key).unwrap().is_empty());
    }

    #[test]
    fn test_injected_rng_is_reproducible() {
        let (cipher, _) = cipher_for(CipherMode::pkcs1v15());
        let message = b"deterministic test source";

        let first = cipher
            .encrypt_with_rng(&mut StdRng::seed_from_u64(42), message)
            .unwrap();
        let second = cipher
            .encrypt_with_rng(&mut StdRng::seed_from_u64(42), message)
            .unwrap();
        assert_eq!(first, second);

        // The default path seeds from the OS every call
        assert_ne!(cipher.encrypt(message).unwrap(), cipher.encrypt(message).unwrap());
    }

    #[test]
    fn test_blocks_use_fresh_randomness() {
        let (cipher, _) = cipher_for(CipherMode::pkcs1v15());
        let padding = Padding::for_mode(&CipherMode::pkcs1v15()).with_chunk_size(NonZeroUsize::new(4).unwrap());
        let cipher = Cipher::new(cipher.key().clone(), padding, cipher.mode());

        // Two identical plaintext blocks must not produce identical ciphertext blocks
        let ciphertext = cipher.encrypt(b"abcdabcd").unwrap();
        assert_eq!(ciphertext.len(), 128);
        assert_ne!(ciphertext[..64], ciphertext[64..]);
    }

    #[test]
    fn test_modulus_too_small_fails_fast() {
        let (cipher, _) = cipher_for(CipherMode::oaep(HashAlgorithm::Sha256));
        let result = cipher.encrypt(b"hello");
        assert!(matches!(
            result,
            Err(Error::Segmentation(SegmentationError::ModulusTooSmall {
                modulus_len: 64,
                overhead: 66
            }))
        ));
    }

    #[test]
    fn test_mismatched_padding_fails_fast() {
        // Policy sized for PKCS#1 v1.5 hands OAEP blocks it cannot carry
        let (key, _) = get_test_keys();
        let cipher = Cipher::new(
            key,
            Padding::for_mode(&CipherMode::pkcs1v15()),
            CipherMode::oaep(HashAlgorithm::Sha1),
        );
        let result = cipher.encrypt(&[1u8; 200]);
        assert!(matches!(
            result,
            Err(Error::Cipher(CipherError::BlockTooLarge { len: 53, max: 22 }))
        ));
    }

    #[test]
    fn test_decrypt_truncated() {
        let (cipher, private_key) = cipher_for(CipherMode::oaep(HashAlgorithm::Sha1));
        let ciphertext = cipher.encrypt(b"Test message").unwrap();

        let result = cipher.decrypt(&ciphertext[..63], &private_key);
        assert!(matches!(
            result,
            Err(Error::Cipher(CipherError::InvalidCiphertextLength { len: 63, block_len: 64 }))
        ));
    }

    #[test]
    fn test_decrypt_tampered_block() {
        let (cipher, private_key) = cipher_for(CipherMode::oaep(HashAlgorithm::Sha1));
        let mut ciphertext = cipher.encrypt(&[9u8; 40]).unwrap();
        assert_eq!(ciphertext.len(), 128);

        ciphertext[70] ^= 0x01;
        let result = cipher.decrypt(&ciphertext, &private_key);
        assert!(matches!(result, Err(Error::Cipher(CipherError::InvalidPadding))));
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_par_encrypt_roundtrip() {
        let (cipher, private_key) = cipher_for(CipherMode::oaep(HashAlgorithm::Sha1));
        let message: Vec<u8> = (0..500u32).map(|i| (i % 251) as u8).collect();

        let ciphertext = cipher.par_encrypt(&message).unwrap();
        assert_eq!(ciphertext.len(), message.len().div_ceil(22) * 64);
        assert_eq!(cipher.decrypt(&ciphertext, &private_key).unwrap(), message);
    }
}
