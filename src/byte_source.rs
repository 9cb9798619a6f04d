//! The byte sources a decode can read from.
//!
//! Both sources present the same small reading API: borrow a run of
//! contiguous bytes without copying where possible, bulk-read into a caller
//! buffer, and seek by a signed delta. The slice source is the zero-copy
//! fast path; the file source keeps a fixed refill window so the decoder
//! never issues tiny reads against the handle.

use std::io::{Read, Seek, SeekFrom};

use bytemuck::AnyBitPattern;

use crate::error::{PngError, PngResult};

/// Capacity of the file source's refill window.
const FILE_WINDOW_LEN: usize = 16 * 1024;

/// Reading API the decoder needs from a source of PNG bytes.
pub trait ByteSource {
  /// Borrow the next `n` contiguous bytes, consuming them.
  ///
  /// Fails with [`PngError::EndOfStream`] when fewer than `n` bytes remain.
  /// The file source additionally fails when `n` exceeds its window
  /// capacity; the decoder only borrows small records so this never fires in
  /// normal operation.
  fn borrow(&mut self, n: usize) -> PngResult<&[u8]>;

  /// Read up to `dst.len()` bytes, returning how many were read.
  ///
  /// A short count means the source is exhausted.
  fn read(&mut self, dst: &mut [u8]) -> PngResult<usize>;

  /// Move the read position by `delta` bytes (negative moves backward).
  fn seek_by(&mut self, delta: i64) -> PngResult<()>;

  /// Read a big-endian `u16`.
  #[inline]
  fn read_u16_be(&mut self) -> PngResult<u16> {
    Ok(u16::from_be_bytes(self.borrow(2)?.try_into().unwrap()))
  }

  /// Read a big-endian `u32`.
  #[inline]
  fn read_u32_be(&mut self) -> PngResult<u32> {
    Ok(u32::from_be_bytes(self.borrow(4)?.try_into().unwrap()))
  }

  /// Read a fixed-layout record.
  ///
  /// `T` must be a packed, alignment-1-friendly record type; the bytes are
  /// copied out of the source, so no alignment requirement falls on the
  /// stream itself.
  #[inline]
  fn read_record<T: AnyBitPattern>(&mut self) -> PngResult<T>
  where
    Self: Sized,
  {
    Ok(bytemuck::pod_read_unaligned(self.borrow(core::mem::size_of::<T>())?))
  }
}

/// A byte source over an in-memory slice.
///
/// Never allocates; `borrow` hands back views straight into the slice.
#[derive(Debug, Clone)]
pub struct SliceSource<'b> {
  bytes: &'b [u8],
  pos: usize,
}
impl<'b> SliceSource<'b> {
  /// Read from the start of `bytes`.
  #[inline]
  #[must_use]
  pub const fn new(bytes: &'b [u8]) -> Self {
    Self { bytes, pos: 0 }
  }
}
impl<'b> ByteSource for SliceSource<'b> {
  #[inline]
  fn borrow(&mut self, n: usize) -> PngResult<&[u8]> {
    if self.bytes.len() - self.pos < n {
      return Err(PngError::EndOfStream);
    }
    let start = self.pos;
    self.pos += n;
    Ok(&self.bytes[start..start + n])
  }

  #[inline]
  fn read(&mut self, dst: &mut [u8]) -> PngResult<usize> {
    let n = dst.len().min(self.bytes.len() - self.pos);
    dst[..n].copy_from_slice(&self.bytes[self.pos..self.pos + n]);
    self.pos += n;
    Ok(n)
  }

  #[inline]
  fn seek_by(&mut self, delta: i64) -> PngResult<()> {
    let target = self.pos as i64 + delta;
    if target < 0 || target > self.bytes.len() as i64 {
      return Err(PngError::EndOfStream);
    }
    self.pos = target as usize;
    Ok(())
  }
}

/// A byte source over a seekable reader, usually a [`File`](std::fs::File).
///
/// Keeps a 16 KiB window of the stream in memory. Invariant:
/// `pos <= end <= capacity`. Seeks that stay inside the window just move
/// `pos`; seeks that leave it drop the window and fall through to the native
/// seek.
#[derive(Debug)]
pub struct FileSource<R> {
  inner: R,
  window: Box<[u8]>,
  pos: usize,
  end: usize,
}
impl<R: Read + Seek> FileSource<R> {
  /// Read from the reader's current position, through a fresh window.
  #[must_use]
  pub fn new(inner: R) -> Self {
    Self { inner, window: vec![0; FILE_WINDOW_LEN].into_boxed_slice(), pos: 0, end: 0 }
  }

  /// Slide the unread tail to the front and pull from the reader until at
  /// least `need` bytes are windowed.
  fn refill(&mut self, need: usize) -> PngResult<()> {
    self.window.copy_within(self.pos..self.end, 0);
    self.end -= self.pos;
    self.pos = 0;
    while self.end < need {
      let got = self.inner.read(&mut self.window[self.end..])?;
      if got == 0 {
        return Err(PngError::EndOfStream);
      }
      self.end += got;
    }
    Ok(())
  }
}
impl<R: Read + Seek> ByteSource for FileSource<R> {
  fn borrow(&mut self, n: usize) -> PngResult<&[u8]> {
    if n > self.window.len() {
      return Err(PngError::InvalidData);
    }
    if self.end - self.pos < n {
      self.refill(n)?;
    }
    let start = self.pos;
    self.pos += n;
    Ok(&self.window[start..start + n])
  }

  fn read(&mut self, dst: &mut [u8]) -> PngResult<usize> {
    let mut filled = (self.end - self.pos).min(dst.len());
    dst[..filled].copy_from_slice(&self.window[self.pos..self.pos + filled]);
    self.pos += filled;
    if filled < dst.len() {
      // The window is drained, so the rest can go straight to the reader
      // without a copy. The window offsets are reset so they keep describing
      // the reader's position, which `seek_by` relies on.
      self.pos = 0;
      self.end = 0;
      while filled < dst.len() {
        let got = self.inner.read(&mut dst[filled..])?;
        if got == 0 {
          break;
        }
        filled += got;
      }
    }
    Ok(filled)
  }

  fn seek_by(&mut self, delta: i64) -> PngResult<()> {
    let target = self.pos as i64 + delta;
    if target >= 0 && target <= self.end as i64 {
      self.pos = target as usize;
    } else {
      // The reader's own position corresponds to `end`.
      self.inner.seek(SeekFrom::Current(target - self.end as i64))?;
      self.pos = 0;
      self.end = 0;
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Cursor;

  #[test]
  fn slice_source_borrows_and_seeks() {
    let bytes = [1_u8, 2, 3, 4, 5, 6, 7, 8];
    let mut src = SliceSource::new(&bytes);
    assert_eq!(src.borrow(3).unwrap(), &[1, 2, 3]);
    src.seek_by(-2).unwrap();
    assert_eq!(src.borrow(2).unwrap(), &[2, 3]);
    assert_eq!(src.read_u32_be().unwrap(), 0x0405_0607);
    assert_eq!(src.borrow(2), Err(PngError::EndOfStream));
    assert_eq!(src.seek_by(-100), Err(PngError::EndOfStream));
  }

  #[test]
  fn slice_source_read_is_short_at_the_end() {
    let bytes = [9_u8, 8, 7];
    let mut src = SliceSource::new(&bytes);
    let mut dst = [0_u8; 8];
    assert_eq!(src.read(&mut dst).unwrap(), 3);
    assert_eq!(&dst[..3], &[9, 8, 7]);
    assert_eq!(src.read(&mut dst).unwrap(), 0);
  }

  #[test]
  fn file_source_windows_and_seeks() {
    let bytes: Vec<u8> = (0..40_000_u32).map(|b| b as u8).collect();
    let mut src = FileSource::new(Cursor::new(bytes.clone()));
    assert_eq!(src.borrow(4).unwrap(), &bytes[..4]);
    // backward inside the window
    src.seek_by(-4).unwrap();
    assert_eq!(src.borrow(8).unwrap(), &bytes[..8]);
    // forward past the window forces a native seek
    src.seek_by(20_000).unwrap();
    assert_eq!(src.read_u32_be().unwrap(), u32::from_be_bytes(bytes[20_008..20_012].try_into().unwrap()));
    // bulk read larger than the window
    let mut dst = vec![0_u8; 20_000];
    let got = src.read(&mut dst).unwrap();
    assert_eq!(got, 40_000 - 20_012);
    assert_eq!(&dst[..got], &bytes[20_012..]);
  }

  #[test]
  fn file_source_seeks_from_the_true_position_after_a_direct_read() {
    let bytes: Vec<u8> = (0..40_000_u32).map(|b| b as u8).collect();
    let mut src = FileSource::new(Cursor::new(bytes.clone()));
    assert_eq!(src.borrow(4).unwrap(), &bytes[..4]);
    // drains the window, then reads the rest straight from the reader
    let mut dst = vec![0_u8; 20_000];
    assert_eq!(src.read(&mut dst).unwrap(), 20_000);
    assert_eq!(&dst[..], &bytes[4..20_004]);
    // a window-leaving seek must be measured from where the reader really is
    src.seek_by(-8).unwrap();
    assert_eq!(src.borrow(8).unwrap(), &bytes[19_996..20_004]);
    // and an in-window seek afterward still lands on the right bytes
    src.seek_by(1_000).unwrap();
    assert_eq!(src.borrow(4).unwrap(), &bytes[21_004..21_008]);
  }

  #[test]
  fn file_source_rejects_oversize_borrow() {
    let mut src = FileSource::new(Cursor::new(vec![0_u8; 100_000]));
    assert_eq!(src.borrow(FILE_WINDOW_LEN + 1), Err(PngError::InvalidData));
  }

  #[test]
  fn file_source_eof_is_end_of_stream() {
    let mut src = FileSource::new(Cursor::new(vec![1_u8, 2, 3]));
    assert_eq!(src.borrow(4), Err(PngError::EndOfStream));
  }
}
