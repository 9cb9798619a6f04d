//! Chunk-level framing of the PNG container.

use bytemuck::{Pod, Zeroable};
use core::fmt::Write;

use crate::raw::U32BE;

/// Magic bytes that start every PNG data stream.
pub const SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Byte length of a chunk header (length field plus type tag).
pub const CHUNK_HEADER_LEN: usize = core::mem::size_of::<ChunkHeader>();

/// A chunk's four-byte type tag.
///
/// The tag bytes are ASCII letters. A chunk is *critical* when the first
/// letter is uppercase: a decoder that does not understand a critical chunk
/// must fail, while ancillary (lowercase) chunks may be skipped.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct ChunkType(pub [u8; 4]);
#[allow(nonstandard_style)]
#[allow(missing_docs)]
impl ChunkType {
  pub const IHDR: Self = Self(*b"IHDR");
  pub const PLTE: Self = Self(*b"PLTE");
  pub const IDAT: Self = Self(*b"IDAT");
  pub const IEND: Self = Self(*b"IEND");
  pub const tRNS: Self = Self(*b"tRNS");

  /// Is this a critical chunk (uppercase first letter)?
  #[inline]
  #[must_use]
  pub const fn is_critical(self) -> bool {
    self.0[0].is_ascii_uppercase()
  }
}
impl core::fmt::Debug for ChunkType {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.write_char('\"')?;
    for ch in self.0.iter().copied().map(|u| u as char) {
      f.write_char(ch)?;
    }
    f.write_char('\"')?;
    Ok(())
  }
}

/// The header in front of every chunk: payload length, then type tag.
///
/// The payload follows the header, and a [`U32BE`] CRC over the tag and
/// payload follows that.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
#[repr(C)]
pub struct ChunkHeader {
  pub length: U32BE,
  pub chunk_ty: ChunkType,
}

unsafe impl Zeroable for ChunkType {}
unsafe impl Zeroable for ChunkHeader {}
unsafe impl Pod for ChunkType {}
unsafe impl Pod for ChunkHeader {}
