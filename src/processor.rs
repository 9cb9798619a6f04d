//! Pluggable consumers of chunks, palette finalization, and decoded rows.
//!
//! A processor is keyed by a chunk tag and gets three optional hooks. The
//! chunk hook fires when a chunk with the processor's tag is dispatched (for
//! critical chunks, after the decoder's own handling; every matching
//! processor is offered a critical chunk, while the first match consumes an
//! ancillary one). The palette hook fires once, right after the palette has
//! been widened to RGBA entries and before any row is decoded. The row hook
//! fires once per fully spread destination row, in source order.
//!
//! A chunk or row hook may hand back a new pixel format for the decode to
//! target. The only legal direction is wider: a processor can never shrink
//! the pixel stride mid-decode.

use log::warn;

use crate::byte_source::ByteSource;
use crate::chunk::ChunkType;
use crate::crc32::chunk_crc;
use crate::error::{PngError, PngResult};
use crate::header::{ColorType, Header};
use crate::pixel_formats::RGBA8;
use crate::pixel_storage::PixelFormat;

/// What a chunk hook gets to work with.
///
/// The source is positioned at the start of the chunk payload (for
/// ancillary chunks) and the hook is expected to consume the payload plus
/// the four trailing CRC bytes, either by reading them or by skipping with
/// `seek_by(length + 4)`. For critical chunks the decoder has already
/// consumed the payload and the hook must not touch the source.
pub struct ChunkContext<'a> {
  /// The raw reader, positioned as described above.
  pub source: &'a mut dyn ByteSource,
  /// The validated image header.
  pub header: &'a Header,
  /// Payload length of the chunk being dispatched.
  pub chunk_length: u32,
  /// The pixel format the decode currently targets.
  pub format: PixelFormat,
  /// Entries in the palette collected so far (0 when there is none).
  pub palette_len: usize,
}

impl core::fmt::Debug for ChunkContext<'_> {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("ChunkContext")
      .field("chunk_length", &self.chunk_length)
      .field("format", &self.format)
      .field("palette_len", &self.palette_len)
      .finish()
  }
}

/// What a palette hook gets to work with.
#[derive(Debug)]
pub struct PaletteContext<'a> {
  /// The validated image header.
  pub header: &'a Header,
  /// The destination palette, already widened to RGBA with opaque alpha.
  pub palette: &'a mut [RGBA8],
}

/// What a row hook gets to work with.
#[derive(Debug)]
pub struct RowContext<'a> {
  /// The validated image header.
  pub header: &'a Header,
  /// The pixel format the decode currently targets.
  pub format: PixelFormat,
  /// One fully spread destination row, at the destination pixel stride.
  pub row: &'a mut [u8],
  /// The widened palette (empty when the image has none, and also while the
  /// destination storage itself owns the palette).
  pub palette: &'a [RGBA8],
  /// Whether 16-bit samples in `row` are still in wire (big-endian) order.
  ///
  /// True on interlaced pass rows, where the byte swap is deferred to the
  /// scatter into the final image.
  pub samples_big_endian: bool,
}

/// A pluggable chunk / palette / row consumer.
///
/// All three hooks default to doing nothing, so an implementation only
/// spells out the parts it cares about.
pub trait ChunkProcessor {
  /// The chunk tag this processor wants to see.
  fn id(&self) -> ChunkType;

  /// Called when a chunk with this processor's tag is dispatched.
  ///
  /// May return a new (wider) pixel format for the decode to target.
  fn process_chunk(&mut self, ctx: &mut ChunkContext<'_>) -> PngResult<Option<PixelFormat>> {
    let _ = ctx;
    Ok(None)
  }

  /// Called once after the palette has been widened into the destination.
  fn process_palette(&mut self, ctx: &mut PaletteContext<'_>) -> PngResult<()> {
    let _ = ctx;
    Ok(())
  }

  /// Called once per fully spread destination row.
  ///
  /// May rewrite the row bytes in place. A returned format is checked
  /// against the widening rule but storage is already allocated, so it
  /// cannot re-shape the decode.
  fn process_row(&mut self, ctx: &mut RowContext<'_>) -> PngResult<Option<PixelFormat>> {
    let _ = ctx;
    Ok(None)
  }
}

/// The transparency payload of a `tRNS` chunk, shaped by the color type.
#[derive(Debug, Clone, PartialEq, Eq)]
enum TrnsData {
  /// Grayscale key sample. Pixels matching it become fully transparent.
  Gray(u16),
  /// RGB key color, one sample per channel.
  Rgb([u16; 3]),
  /// Per-palette-entry alpha values, possibly fewer than the palette has.
  IndexAlphas(Vec<u8>),
}

/// Built-in handler for the `tRNS` transparency chunk.
///
/// For grayscale and RGB images it records the key color, widens the
/// destination format to include alpha, and keys each decoded pixel's alpha
/// on whether it matches. For indexed images it records the alpha table and
/// writes it into the palette; rows need no work in that case because the
/// palette carries the alpha.
#[derive(Debug, Clone, Default)]
pub struct TrnsProcessor {
  data: Option<TrnsData>,
}
impl TrnsProcessor {
  /// A transparency processor that has not seen a `tRNS` chunk yet.
  #[inline]
  #[must_use]
  pub fn new() -> Self {
    Self { data: None }
  }
}
impl ChunkProcessor for TrnsProcessor {
  #[inline]
  fn id(&self) -> ChunkType {
    ChunkType::tRNS
  }

  fn process_chunk(&mut self, ctx: &mut ChunkContext<'_>) -> PngResult<Option<PixelFormat>> {
    let len = ctx.chunk_length as usize;
    if self.data.is_some() {
      // at most one transparency chunk matters
      warn!("duplicate tRNS chunk skipped");
      ctx.source.seek_by(ctx.chunk_length as i64 + 4)?;
      return Ok(None);
    }
    match ctx.header.color_type {
      ColorType::Y if len == 2 => {
        let (crc, key) = {
          let payload = ctx.source.borrow(2)?;
          (chunk_crc(*b"tRNS", payload), u16::from_be_bytes([payload[0], payload[1]]))
        };
        if ctx.source.read_u32_be()? != crc {
          return Err(PngError::InvalidData);
        }
        self.data = Some(TrnsData::Gray(key));
        Ok(Some(if ctx.header.bit_depth == 16 {
          PixelFormat::GrayscaleAlpha16
        } else {
          PixelFormat::GrayscaleAlpha8
        }))
      }
      ColorType::RGB if len == 6 => {
        let (crc, key) = {
          let payload = ctx.source.borrow(6)?;
          let key = [
            u16::from_be_bytes([payload[0], payload[1]]),
            u16::from_be_bytes([payload[2], payload[3]]),
            u16::from_be_bytes([payload[4], payload[5]]),
          ];
          (chunk_crc(*b"tRNS", payload), key)
        };
        if ctx.source.read_u32_be()? != crc {
          return Err(PngError::InvalidData);
        }
        self.data = Some(TrnsData::Rgb(key));
        Ok(Some(if ctx.header.bit_depth == 16 { PixelFormat::Rgba64 } else { PixelFormat::Rgba32 }))
      }
      ColorType::INDEX if len <= ctx.palette_len => {
        let (crc, alphas) = {
          let payload = ctx.source.borrow(len)?;
          (chunk_crc(*b"tRNS", payload), payload.to_vec())
        };
        if ctx.source.read_u32_be()? != crc {
          return Err(PngError::InvalidData);
        }
        self.data = Some(TrnsData::IndexAlphas(alphas));
        Ok(None)
      }
      _ => {
        // wrong length or incompatible color type: not fatal, not ours
        warn!(
          "tRNS chunk with length {len} does not fit color type {:?}, skipped",
          ctx.header.color_type
        );
        ctx.source.seek_by(ctx.chunk_length as i64 + 4)?;
        Ok(None)
      }
    }
  }

  fn process_palette(&mut self, ctx: &mut PaletteContext<'_>) -> PngResult<()> {
    if let Some(TrnsData::IndexAlphas(alphas)) = &self.data {
      for (entry, &a) in ctx.palette.iter_mut().zip(alphas.iter()) {
        entry.a = a;
      }
    }
    Ok(())
  }

  fn process_row(&mut self, ctx: &mut RowContext<'_>) -> PngResult<Option<PixelFormat>> {
    let stride = ctx.format.pixel_stride();
    let sample = |pair: [u8; 2]| {
      if ctx.samples_big_endian {
        u16::from_be_bytes(pair)
      } else {
        u16::from_ne_bytes(pair)
      }
    };
    match &self.data {
      Some(TrnsData::Gray(key)) => {
        if ctx.header.bit_depth == 16 {
          for px in ctx.row.chunks_exact_mut(stride) {
            // 0x0000 and 0xFFFF read the same in either byte order
            let a: u16 = if sample([px[0], px[1]]) == *key { 0 } else { u16::MAX };
            px[2..4].copy_from_slice(&a.to_ne_bytes());
          }
        } else {
          for px in ctx.row.chunks_exact_mut(stride) {
            px[1] = if px[0] == *key as u8 { 0 } else { u8::MAX };
          }
        }
        Ok(None)
      }
      Some(TrnsData::Rgb(key)) => {
        if ctx.header.bit_depth == 16 {
          for px in ctx.row.chunks_exact_mut(stride) {
            let matches = (0..3)
              .all(|c| sample([px[c * 2], px[c * 2 + 1]]) == key[c]);
            let a: u16 = if matches { 0 } else { u16::MAX };
            px[6..8].copy_from_slice(&a.to_ne_bytes());
          }
        } else {
          let key8 = [key[0] as u8, key[1] as u8, key[2] as u8];
          for px in ctx.row.chunks_exact_mut(stride) {
            px[3] = if px[..3] == key8 { 0 } else { u8::MAX };
          }
        }
        Ok(None)
      }
      // indexed transparency went through the palette
      Some(TrnsData::IndexAlphas(_)) | None => Ok(None),
    }
  }
}

/// Built-in palette expansion for indexed images.
///
/// Widens the destination format of indexed images to RGBA and rewrites
/// each decoded index byte into the palette color it names. Out-of-range
/// indices become transparent black rather than failing the decode.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlteProcessor;
impl PlteProcessor {
  /// A palette expansion processor.
  #[inline]
  #[must_use]
  pub fn new() -> Self {
    Self
  }
}
impl ChunkProcessor for PlteProcessor {
  #[inline]
  fn id(&self) -> ChunkType {
    ChunkType::PLTE
  }

  fn process_chunk(&mut self, ctx: &mut ChunkContext<'_>) -> PngResult<Option<PixelFormat>> {
    // the decoder already consumed the palette payload; this hook only
    // re-targets the output format
    if ctx.format.is_indexed() {
      Ok(Some(PixelFormat::Rgba32))
    } else {
      Ok(None)
    }
  }

  fn process_row(&mut self, ctx: &mut RowContext<'_>) -> PngResult<Option<PixelFormat>> {
    if ctx.header.color_type == ColorType::INDEX && ctx.format == PixelFormat::Rgba32 {
      for px in ctx.row.chunks_exact_mut(4) {
        let entry = ctx.palette.get(px[0] as usize).copied().unwrap_or_default();
        px.copy_from_slice(&[entry.r, entry.g, entry.b, entry.a]);
      }
    }
    Ok(None)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::header::{CompressionMethod, FilterMethod, InterlaceMethod};

  fn gray_header(bit_depth: u8) -> Header {
    Header {
      width: 2,
      height: 1,
      bit_depth,
      color_type: ColorType::Y,
      compression_method: CompressionMethod::DEFLATE,
      filter_method: FilterMethod::ADAPTIVE,
      interlace_method: InterlaceMethod::NONE,
    }
  }

  #[test]
  fn trns_gray_row_keys_alpha() {
    let header = gray_header(8);
    let mut trns = TrnsProcessor::new();
    trns.data = Some(TrnsData::Gray(0x0010));
    let mut row = [0x10, 0xEE, 0x20, 0xEE];
    let mut ctx = RowContext {
      header: &header,
      format: PixelFormat::GrayscaleAlpha8,
      row: &mut row,
      palette: &[],
      samples_big_endian: false,
    };
    trns.process_row(&mut ctx).unwrap();
    assert_eq!(row, [0x10, 0x00, 0x20, 0xFF]);
  }

  #[test]
  fn trns_gray16_honors_sample_order() {
    let header = gray_header(16);
    let mut trns = TrnsProcessor::new();
    trns.data = Some(TrnsData::Gray(0x0102));
    // big-endian pass row: matching sample stays in wire order
    let mut row = [0x01, 0x02, 0, 0, 0x02, 0x01, 0, 0];
    let mut ctx = RowContext {
      header: &header,
      format: PixelFormat::GrayscaleAlpha16,
      row: &mut row,
      palette: &[],
      samples_big_endian: true,
    };
    trns.process_row(&mut ctx).unwrap();
    assert_eq!(&row[2..4], &[0, 0]);
    assert_eq!(&row[6..8], &[0xFF, 0xFF]);
  }

  #[test]
  fn plte_row_expands_indices() {
    let header = Header { color_type: ColorType::INDEX, ..gray_header(8) };
    let palette = [
      RGBA8 { r: 10, g: 11, b: 12, a: 255 },
      RGBA8 { r: 20, g: 21, b: 22, a: 7 },
    ];
    let mut row = [1, 0, 0, 0, 0, 0, 0, 0, 9, 0, 0, 0];
    let mut ctx = RowContext {
      header: &header,
      format: PixelFormat::Rgba32,
      row: &mut row,
      palette: &palette,
      samples_big_endian: false,
    };
    PlteProcessor::new().process_row(&mut ctx).unwrap();
    assert_eq!(row, [20, 21, 22, 7, 10, 11, 12, 255, 0, 0, 0, 0]);
  }
}
