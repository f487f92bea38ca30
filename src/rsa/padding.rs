// Padding / Segmentation Policy
// Splits plaintext into blocks small enough for the cipher mode's padding

use std::num::NonZeroUsize;

use super::mode::CipherMode;
use crate::error::SegmentationError;

/// How large each plaintext block is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChunkSize {
    /// Fill every block up to the largest payload the key and mode allow
    #[default]
    Max,
    /// Blocks of at most this many bytes
    Fixed(NonZeroUsize),
}

/// Segmentation policy sized for one cipher mode
///
/// Blocks are contiguous slices of the input in input order. Only the last
/// block may be shorter than the chunk size. Empty input yields no blocks,
/// so it encrypts to empty ciphertext.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Padding {
    overhead: usize,
    chunk_size: ChunkSize,
}

impl Padding {
    /// Policy that fills blocks to the maximum payload for `mode`
    pub fn for_mode(mode: &CipherMode) -> Self {
        Self {
            overhead: mode.overhead(),
            chunk_size: ChunkSize::Max,
        }
    }

    /// Use blocks of at most `size` bytes instead of the maximum payload
    pub fn with_chunk_size(mut self, size: NonZeroUsize) -> Self {
        self.chunk_size = ChunkSize::Fixed(size);
        self
    }

    /// Bytes per block reserved for padding
    pub fn overhead(&self) -> usize {
        self.overhead
    }

    pub fn chunk_size(&self) -> ChunkSize {
        self.chunk_size
    }

    /// Largest payload a single block can carry under this modulus
    pub fn max_payload(&self, modulus_len: usize) -> Result<usize, SegmentationError> {
        match modulus_len.checked_sub(self.overhead) {
            Some(max) if max > 0 => Ok(max),
            _ => Err(SegmentationError::ModulusTooSmall {
                modulus_len,
                overhead: self.overhead,
            }),
        }
    }

    /// Length of every block except possibly the last
    pub fn block_len(&self, modulus_len: usize) -> Result<usize, SegmentationError> {
        let max = self.max_payload(modulus_len)?;
        match self.chunk_size {
            ChunkSize::Max => Ok(max),
            ChunkSize::Fixed(chunk) if chunk.get() <= max => Ok(chunk.get()),
            ChunkSize::Fixed(chunk) => Err(SegmentationError::ChunkTooLarge {
                chunk: chunk.get(),
                max,
            }),
        }
    }

    /// Split `plain_text` into ordered blocks for a key of `modulus_len` bytes
    pub fn pad<'a>(
        &self,
        plain_text: &'a [u8],
        modulus_len: usize,
    ) -> Result<Vec<&'a [u8]>, SegmentationError> {
        let block_len = self.block_len(modulus_len)?;
        Ok(plain_text.chunks(block_len).collect())
    }

    /// Number of blocks `pad` produces for an input of `plain_len` bytes
    pub fn block_count(&self, plain_len: usize, modulus_len: usize) -> Result<usize, SegmentationError> {
        let block_len = self.block_len(modulus_len)?;
        Ok(plain_len.div_ceil(block_len))
    }

    /// Reassemble decrypted blocks into the original plaintext
    pub fn unpad<B: AsRef<[u8]>>(&self, blocks: &[B]) -> Vec<u8> {
        let total = blocks.iter().map(|block| block.as_ref().len()).sum();
        let mut plain_text = Vec::with_capacity(total);
        for block in blocks {
            plain_text.extend_from_slice(block.as_ref());
        }
        plain_text
    }
}
