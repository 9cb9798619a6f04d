//! A reader over the image-data chunk run.
//!
//! The compressed pixel stream of a PNG is split across one or more
//! consecutive `IDAT` chunks. The inflate engine must never see those seams,
//! so this reader splices the payloads together: it checks each chunk's CRC
//! as it drains, probes the header that follows, keeps going when another
//! `IDAT` turns up, and rewinds the probe otherwise so the main loop can
//! dispatch whatever chunk ended the run.

use log::trace;

use crate::byte_source::ByteSource;
use crate::chunk::{ChunkHeader, ChunkType, CHUNK_HEADER_LEN};
use crate::crc32::Crc32;
use crate::error::{PngError, PngResult};

pub(crate) struct IdatStream<'src, S: ByteSource> {
  source: &'src mut S,
  remaining: u32,
  crc: Crc32,
  done: bool,
}

impl<'src, S: ByteSource> IdatStream<'src, S> {
  /// Start the run. The caller has already consumed the first `IDAT` chunk
  /// header and passes its payload length.
  pub fn new(source: &'src mut S, first_chunk_len: u32) -> Self {
    Self {
      source,
      remaining: first_chunk_len,
      crc: Crc32::new_tagged(ChunkType::IDAT.0),
      done: false,
    }
  }

  /// Read up to `dst.len()` payload bytes.
  ///
  /// Returns 0 only at the true end of the `IDAT` run. A source that dries
  /// up mid-chunk is an [`PngError::EndOfStream`]; a chunk whose CRC does
  /// not match its payload is [`PngError::InvalidData`].
  pub fn read(&mut self, dst: &mut [u8]) -> PngResult<usize> {
    let mut filled = 0;
    while filled < dst.len() && !self.done {
      if self.remaining == 0 {
        let claimed = self.source.read_u32_be()?;
        if claimed != self.crc.finish() {
          return Err(PngError::InvalidData);
        }
        let next: ChunkHeader = self.source.read_record()?;
        if next.chunk_ty == ChunkType::IDAT {
          trace!("continuing into next IDAT chunk, length {}", next.length.to_u32());
          self.remaining = next.length.to_u32();
          self.crc = Crc32::new_tagged(ChunkType::IDAT.0);
        } else {
          // Not ours; put the header back for the main loop.
          self.source.seek_by(-(CHUNK_HEADER_LEN as i64))?;
          self.done = true;
        }
        continue;
      }
      let want = (dst.len() - filled).min(self.remaining as usize);
      let got = self.source.read(&mut dst[filled..filled + want])?;
      if got == 0 {
        return Err(PngError::EndOfStream);
      }
      self.crc.update(&dst[filled..filled + got]);
      self.remaining -= got as u32;
      filled += got;
    }
    Ok(filled)
  }

  /// Settle the end of the run: consume whatever payload the caller never
  /// asked for, verify the outstanding CRCs, and leave the source rewound to
  /// the chunk after the run.
  ///
  /// Reading alone cannot be relied on for this. A read that ends exactly on
  /// the last payload byte fills its buffer and returns without touching the
  /// trailing CRC, and a caller that is already satisfied (the inflate layer
  /// once its stream has ended) never reads again.
  pub fn finish(&mut self) -> PngResult<()> {
    let mut sink = [0_u8; 64];
    while !self.done {
      self.read(&mut sink)?;
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::byte_source::SliceSource;
  use crate::crc32::chunk_crc;

  /// Lays out the run as it would sit after the first chunk's header: first
  /// payload, then full chunks, then an empty `IEND` header to stop on.
  fn idat_run(payloads: &[&[u8]]) -> Vec<u8> {
    let mut out = Vec::new();
    for (i, payload) in payloads.iter().enumerate() {
      if i > 0 {
        out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        out.extend_from_slice(b"IDAT");
      }
      out.extend_from_slice(payload);
      out.extend_from_slice(&chunk_crc(*b"IDAT", payload).to_be_bytes());
    }
    out.extend_from_slice(&[0, 0, 0, 0]);
    out.extend_from_slice(b"IEND");
    out
  }

  #[test]
  fn splices_consecutive_chunks() {
    let bytes = idat_run(&[b"hello ", b"png ", b"world"]);
    let mut src = SliceSource::new(&bytes);
    let mut stream = IdatStream::new(&mut src, 6);
    let mut dst = [0_u8; 32];
    let mut total = 0;
    loop {
      let got = stream.read(&mut dst[total..]).unwrap();
      if got == 0 {
        break;
      }
      total += got;
    }
    assert_eq!(&dst[..total], b"hello png world");
    // the terminating chunk header was rewound for the caller
    assert_eq!(src.read_u32_be().unwrap(), 0);
  }

  #[test]
  fn tolerates_zero_length_chunks() {
    let bytes = idat_run(&[b"ab", b"", b"cd"]);
    let mut src = SliceSource::new(&bytes);
    let mut stream = IdatStream::new(&mut src, 2);
    let mut dst = [0_u8; 8];
    let mut total = 0;
    loop {
      let got = stream.read(&mut dst[total..]).unwrap();
      if got == 0 {
        break;
      }
      total += got;
    }
    assert_eq!(&dst[..total], b"abcd");
  }

  #[test]
  fn exact_fill_defers_boundary_until_finish() {
    let bytes = idat_run(&[b"exact"]);
    let mut src = SliceSource::new(&bytes);
    let mut stream = IdatStream::new(&mut src, 5);
    let mut dst = [0_u8; 5];
    assert_eq!(stream.read(&mut dst).unwrap(), 5);
    assert_eq!(&dst, b"exact");
    // the trailing CRC was not reached yet; finish must check it and rewind
    stream.finish().unwrap();
    drop(stream);
    let hdr: ChunkHeader = src.read_record().unwrap();
    assert_eq!(hdr.chunk_ty, ChunkType::IEND);
  }

  #[test]
  fn finish_skips_unread_chunks() {
    let bytes = idat_run(&[b"used", b"spare data"]);
    let mut src = SliceSource::new(&bytes);
    let mut stream = IdatStream::new(&mut src, 4);
    let mut dst = [0_u8; 4];
    assert_eq!(stream.read(&mut dst).unwrap(), 4);
    stream.finish().unwrap();
    drop(stream);
    let hdr: ChunkHeader = src.read_record().unwrap();
    assert_eq!(hdr.chunk_ty, ChunkType::IEND);
  }

  #[test]
  fn finish_still_validates_the_crc() {
    let mut bytes = idat_run(&[b"exact"]);
    bytes[5] ^= 0x10;
    let mut src = SliceSource::new(&bytes);
    let mut stream = IdatStream::new(&mut src, 5);
    let mut dst = [0_u8; 5];
    assert_eq!(stream.read(&mut dst).unwrap(), 5);
    assert_eq!(stream.finish(), Err(PngError::InvalidData));
  }

  #[test]
  fn bad_crc_is_invalid_data() {
    let mut bytes = idat_run(&[b"data!"]);
    let crc_at = bytes.len() - 12;
    bytes[crc_at] ^= 0x40;
    let mut src = SliceSource::new(&bytes);
    let mut stream = IdatStream::new(&mut src, 5);
    let mut dst = [0_u8; 16];
    assert_eq!(stream.read(&mut dst), Err(PngError::InvalidData));
  }

  #[test]
  fn truncation_is_end_of_stream() {
    let mut src = SliceSource::new(b"abc");
    let mut stream = IdatStream::new(&mut src, 10);
    let mut dst = [0_u8; 16];
    assert_eq!(stream.read(&mut dst), Err(PngError::EndOfStream));
  }
}
