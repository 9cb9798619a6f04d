use core::fmt;
use std::{collections::TryReserveError, io};

/// An error from decoding PNG data.
///
/// Decoding never recovers from an error: the first problem aborts the decode
/// and any partially built pixel storage is released before the error is
/// returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PngError {
  /// The data stream violates the PNG format.
  ///
  /// This covers a bad signature, chunks out of order, CRC mismatches,
  /// illegal header values, out-of-range filter selectors, and malformed
  /// Zlib data.
  InvalidData,

  /// The source ran out of bytes before a required record completed.
  EndOfStream,

  /// The underlying byte source reported an I/O problem.
  Io(io::ErrorKind),

  /// An allocation could not be satisfied, either from the main allocator or
  /// from the caller-provided scratch buffer.
  Alloc,
}

/// Shorthand result type for this crate.
pub type PngResult<T> = Result<T, PngError>;

impl From<io::Error> for PngError {
  #[inline]
  fn from(e: io::Error) -> Self {
    match e.kind() {
      io::ErrorKind::UnexpectedEof => Self::EndOfStream,
      kind => Self::Io(kind),
    }
  }
}

impl From<TryReserveError> for PngError {
  #[inline]
  fn from(_: TryReserveError) -> Self {
    Self::Alloc
  }
}

impl fmt::Display for PngError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::InvalidData => write!(f, "invalid PNG data"),
      Self::EndOfStream => write!(f, "unexpected end of stream"),
      Self::Io(kind) => write!(f, "io error: {kind:?}"),
      Self::Alloc => write!(f, "allocation failed"),
    }
  }
}

impl std::error::Error for PngError {}
