//! Streaming inflate over the image-data chunk run.

use miniz_oxide::inflate::stream::{inflate, InflateState};
use miniz_oxide::{DataFormat, MZError, MZFlush, MZStatus};

use crate::byte_source::ByteSource;
use crate::error::{PngError, PngResult};
use crate::idat::IdatStream;

/// Size of the compressed-input staging buffer, carved from scratch.
pub(crate) const INFLATE_INPUT_LEN: usize = 32 * 1024;

/// Drives Zlib decompression against an [`IdatStream`].
///
/// Compressed bytes are staged through a scratch-funded input buffer in
/// whatever sizes the sub-stream produces; `read` hands back up to
/// `dst.len()` decompressed bytes per call and 0 only once the Zlib stream
/// has logically ended.
pub(crate) struct Inflater<'t, 'src, S: ByteSource> {
  stream: IdatStream<'src, S>,
  state: Box<InflateState>,
  input: &'t mut [u8],
  in_len: usize,
  in_pos: usize,
  source_done: bool,
  stream_end: bool,
}

impl<'t, 'src, S: ByteSource> Inflater<'t, 'src, S> {
  pub fn new(stream: IdatStream<'src, S>, input: &'t mut [u8]) -> Self {
    Self {
      stream,
      state: InflateState::new_boxed(DataFormat::Zlib),
      input,
      in_len: 0,
      in_pos: 0,
      source_done: false,
      stream_end: false,
    }
  }

  /// Decompress up to `dst.len()` bytes.
  ///
  /// Returns 0 at the end of the Zlib stream, and also when the chunk run
  /// dries up before the stream logically ends (the caller notices the
  /// shortfall against the row count it expects). Malformed compressed data
  /// is [`PngError::InvalidData`].
  pub fn read(&mut self, dst: &mut [u8]) -> PngResult<usize> {
    if self.stream_end || dst.is_empty() {
      return Ok(0);
    }
    loop {
      if self.in_pos == self.in_len && !self.source_done {
        self.in_len = self.stream.read(self.input)?;
        self.in_pos = 0;
        if self.in_len == 0 {
          self.source_done = true;
        }
      }
      let res =
        inflate(&mut self.state, &self.input[self.in_pos..self.in_len], dst, MZFlush::None);
      self.in_pos += res.bytes_consumed;
      match res.status {
        Ok(MZStatus::StreamEnd) => {
          self.stream_end = true;
          return Ok(res.bytes_written);
        }
        Ok(_) => {}
        // `Buf` just means no forward progress without more input or more
        // output room, which is not an error at this layer.
        Err(MZError::Buf) => {}
        Err(_) => return Err(PngError::InvalidData),
      }
      if res.bytes_written > 0 {
        return Ok(res.bytes_written);
      }
      if self.source_done {
        return Ok(0);
      }
    }
  }

  /// Confirm the compressed stream has logically ended, then settle the
  /// chunk run underneath it so the source ends up at the chunk that follows
  /// the run.
  ///
  /// This must run even when every decompressed byte has already been
  /// delivered: the sub-stream may still be holding its final CRC check and
  /// rewind, and no further `read` would reach them.
  pub fn finish(mut self) -> PngResult<()> {
    let mut probe = [0_u8];
    let _extra = self.read(&mut probe)?;
    debug_assert_eq!(_extra, 0, "inflate stream continued past the last row");
    self.stream.finish()
  }

  /// Fill `dst` completely, treating a short stream as malformed data.
  pub fn read_exact(&mut self, dst: &mut [u8]) -> PngResult<()> {
    let mut filled = 0;
    while filled < dst.len() {
      let got = self.read(&mut dst[filled..])?;
      if got == 0 {
        return Err(PngError::InvalidData);
      }
      filled += got;
    }
    Ok(())
  }
}
