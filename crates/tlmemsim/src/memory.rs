//! Flat memory image behind the responder.
//!
//! The image covers bus addresses `[base, base + size)` and is stored as
//! little-endian 64-bit words. Every bus access is word granular: the low
//! three address bits are dropped, so an unaligned address reads or writes
//! the word containing it.
//!
//! Image loading (`load`, `load_bytes`) addresses the image by byte offset,
//! independent of the bus base address.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{MemsimError, OutOfRange};
use crate::mask::merge;

/// Fixed-size, word-organised backing store.
pub struct MemoryImage {
    base: u64,
    words: Box<[u64]>,
}

impl MemoryImage {
    /// Allocate a zeroed image of `size` bytes at bus address `base`.
    ///
    /// # Errors
    ///
    /// Returns an error if `size` is zero or not a multiple of 8, or if the
    /// image would extend past the end of the 64-bit address space.
    pub fn new(base: u64, size: usize) -> Result<Self, MemsimError> {
        if size == 0 || size % 8 != 0 {
            return Err(MemsimError::InvalidSize(size));
        }
        let in_range = u64::try_from(size)
            .ok()
            .and_then(|len| base.checked_add(len - 1))
            .is_some();
        if !in_range {
            return Err(MemsimError::InvalidRange { base, size });
        }

        Ok(Self {
            base,
            words: vec![0u64; size / 8].into_boxed_slice(),
        })
    }

    /// Image size in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.words.len() * 8
    }

    fn index(&self, addr: u64) -> Result<usize, OutOfRange> {
        addr.checked_sub(self.base)
            .and_then(|offset| usize::try_from(offset >> 3).ok())
            .filter(|&idx| idx < self.words.len())
            .ok_or(OutOfRange { addr })
    }

    /// Read the word containing `addr`.
    pub fn read(&self, addr: u64) -> Result<u64, OutOfRange> {
        self.index(addr).map(|idx| self.words[idx])
    }

    /// Write `data` into the word containing `addr` on the lanes enabled by
    /// `mask`.
    pub fn write(&mut self, addr: u64, data: u64, mask: u8) -> Result<(), OutOfRange> {
        let word = self.word_mut(addr)?;
        *word = merge(*word, data, mask);
        Ok(())
    }

    /// Mutable access to the word containing `addr`, for read-modify-write.
    pub fn word_mut(&mut self, addr: u64) -> Result<&mut u64, OutOfRange> {
        let idx = self.index(addr)?;
        Ok(&mut self.words[idx])
    }

    /// Copy raw bytes into the image starting at byte `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`MemsimError::ImageTooLarge`] if the bytes do not fit; the
    /// image is left untouched in that case.
    pub fn load_bytes(&mut self, offset: usize, bytes: &[u8]) -> Result<(), MemsimError> {
        let size = self.size();
        if offset.checked_add(bytes.len()).is_none_or(|end| end > size) {
            return Err(MemsimError::ImageTooLarge {
                offset,
                len: bytes.len(),
                size,
            });
        }

        for (pos, &byte) in (offset..).zip(bytes) {
            let shift = (pos % 8) * 8;
            let word = &mut self.words[pos / 8];
            *word = (*word & !(0xFF_u64 << shift)) | (u64::from(byte) << shift);
        }
        Ok(())
    }

    /// Bulk-load a raw image file at byte `offset`. Returns the number of
    /// bytes loaded.
    ///
    /// # Errors
    ///
    /// Returns [`MemsimError::Load`] if the file cannot be read and
    /// [`MemsimError::ImageTooLarge`] if its contents do not fit.
    pub fn load(&mut self, path: impl AsRef<Path>, offset: usize) -> Result<usize, MemsimError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| MemsimError::Load {
            path: path.to_path_buf(),
            source,
        })?;
        self.load_bytes(offset, &bytes)?;
        debug!(
            "loaded {} bytes from {} at offset {offset:#x}",
            bytes.len(),
            path.display()
        );
        Ok(bytes.len())
    }
}
