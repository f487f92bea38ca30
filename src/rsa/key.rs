// RSA Public Key
// Decodes PEM key containers into the public key used to size and encrypt blocks

use std::fmt;
use std::path::Path;

use rsa::pkcs1::DecodeRsaPublicKey;
use rsa::pkcs8::DecodePublicKey;
use rsa::traits::PublicKeyParts;
use rsa::RsaPublicKey;
use tracing::debug;

use crate::error::{DecodeError, Error, Result};
use crate::util::file_ops::read_file;

/// Parser for the DER structure inside a PEM envelope
pub type KeyParser = fn(&[u8]) -> std::result::Result<Key, DecodeError>;

/// Binary structure carried by the PEM envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyFormat {
    /// SubjectPublicKeyInfo (`-----BEGIN PUBLIC KEY-----`)
    Pkix,
    /// PKCS#1 RSAPublicKey (`-----BEGIN RSA PUBLIC KEY-----`)
    Pkcs1,
}

impl KeyFormat {
    /// The DER parser for this format
    pub fn parser(self) -> KeyParser {
        match self {
            KeyFormat::Pkix => Key::from_pkix_der,
            KeyFormat::Pkcs1 => Key::from_pkcs1_der,
        }
    }
}

/// RSA public key together with its modulus length in bytes
#[derive(Clone, PartialEq, Eq)]
pub struct Key {
    public_key: RsaPublicKey,
    modulus_len: usize,
}

impl Key {
    /// Wrap an already parsed public key
    pub fn new(public_key: RsaPublicKey) -> Self {
        let modulus_len = public_key.size();
        Self {
            public_key,
            modulus_len,
        }
    }

    /// Parse a DER-encoded SubjectPublicKeyInfo holding an RSA key
    pub fn from_pkix_der(der: &[u8]) -> std::result::Result<Self, DecodeError> {
        RsaPublicKey::from_public_key_der(der)
            .map(Self::new)
            .map_err(|_| DecodeError::UnsupportedKeyType)
    }

    /// Parse a DER-encoded PKCS#1 RSAPublicKey
    pub fn from_pkcs1_der(der: &[u8]) -> std::result::Result<Self, DecodeError> {
        RsaPublicKey::from_pkcs1_der(der)
            .map(Self::new)
            .map_err(|_| DecodeError::UnsupportedKeyType)
    }

    /// Parse a PEM container, decoding the inner structure as `format`
    ///
    /// Fails with `NotPem` when no envelope is found and with
    /// `UnsupportedKeyType` when the body is not an RSA public key in that format.
    pub fn parse_pem(encoded: &[u8], format: KeyFormat) -> std::result::Result<Self, DecodeError> {
        let der = decode_envelope(encoded)?;
        format.parser()(&der)
    }

    /// Load a key from a PEM file
    ///
    /// The path is trimmed before use. One PEM layer is removed and the
    /// DER body is handed to `parser`, e.g. `Key::from_pkix_der`.
    pub fn load_from_file<F>(path: &str, parser: F) -> Result<Self>
    where
        F: FnOnce(&[u8]) -> std::result::Result<Key, DecodeError>,
    {
        let path = path.trim();
        if path.is_empty() {
            return Err(Error::EmptyPath);
        }

        let encoded = read_file(Path::new(path))?;
        let der = decode_envelope(&encoded)?;
        let key = parser(&der)?;

        debug!(path, modulus_len = key.modulus_len, "loaded public key");
        Ok(key)
    }

    /// Byte length of the modulus
    pub fn modulus_len(&self) -> usize {
        self.modulus_len
    }

    /// Bit length of the modulus
    pub fn bit_len(&self) -> usize {
        self.public_key.n().bits()
    }

    /// The underlying RSA public key
    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public_key
    }
}

impl From<RsaPublicKey> for Key {
    fn from(public_key: RsaPublicKey) -> Self {
        Self::new(public_key)
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Key")
            .field("modulus_len", &self.modulus_len)
            .field("e", self.public_key.e())
            .finish()
    }
}

/// Strip the PEM envelope and return the DER body
fn decode_envelope(encoded: &[u8]) -> std::result::Result<Vec<u8>, DecodeError> {
    pem::parse(encoded)
        .map(|block| block.contents().to_vec())
        .map_err(|_| DecodeError::NotPem)
}
