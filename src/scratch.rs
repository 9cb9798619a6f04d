//! Caller-funded scratch memory for per-decode temporaries.

use crate::error::{PngError, PngResult};

/// Scratch bytes a decode should be given.
///
/// Covers the inflate input staging buffer plus the transient palette and
/// transparency reads, with generous headroom.
pub const REQUIRED_TEMP_BYTES: usize = 800 * 1024;

/// A bump allocator over a caller-provided byte buffer.
///
/// Decoding needs a handful of bounded temporaries that should not land on
/// the main heap next to the final image. The caller funds them once, up
/// front, and everything handed out lives as long as the original buffer.
/// There is no freeing; the arena is consumed front to back and dropped
/// after the decode call.
#[derive(Debug)]
pub struct Scratch<'a> {
  spare: &'a mut [u8],
}
impl<'a> Scratch<'a> {
  /// Wrap a caller-provided buffer.
  ///
  /// [`REQUIRED_TEMP_BYTES`] is always enough for the built-in decode path.
  #[inline]
  #[must_use]
  pub fn new(buf: &'a mut [u8]) -> Self {
    Self { spare: buf }
  }

  /// Carve `n` bytes off the front of the arena.
  ///
  /// Fails with [`PngError::Alloc`] when the arena is exhausted.
  pub fn take(&mut self, n: usize) -> PngResult<&'a mut [u8]> {
    let spare = core::mem::take(&mut self.spare);
    if spare.len() < n {
      return Err(PngError::Alloc);
    }
    let (head, tail) = spare.split_at_mut(n);
    self.spare = tail;
    Ok(head)
  }

  /// Bytes still available.
  #[inline]
  #[must_use]
  pub fn remaining(&self) -> usize {
    self.spare.len()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn takes_are_disjoint_and_bounded() {
    let mut buf = [0_u8; 16];
    let mut scratch = Scratch::new(&mut buf);
    let a = scratch.take(10).unwrap();
    a.fill(1);
    let b = scratch.take(6).unwrap();
    b.fill(2);
    assert_eq!(scratch.remaining(), 0);
    assert_eq!(scratch.take(1), Err(PngError::Alloc));
    assert_eq!(&a[..], [1; 10]);
    assert_eq!(&b[..], [2; 6]);
  }
}
