//! The decoder's main loop: signature, header, chunk dispatch, row pipeline.

use std::io::{Read, Seek};

use log::{debug, trace, warn};

use crate::adam7::{scatter_pass_row, ADAM7_PASSES};
use crate::byte_source::{ByteSource, FileSource, SliceSource};
use crate::chunk::{ChunkHeader, ChunkType, SIGNATURE};
use crate::crc32::Crc32;
use crate::error::{PngError, PngResult};
use crate::header::{ColorType, Header, RawIhdr};
use crate::idat::IdatStream;
use crate::inflate::{Inflater, INFLATE_INPUT_LEN};
use crate::pixel_formats::{RGB8, RGBA8};
use crate::pixel_storage::{PixelFormat, PixelStorage};
use crate::processor::{
  ChunkContext, ChunkProcessor, PaletteContext, PlteProcessor, RowContext, TrnsProcessor,
};
use crate::scratch::Scratch;
use crate::spread::spread_row;
use crate::unfilter::unfilter_row;

/// Everything a decode call needs besides the byte source.
pub struct Options<'t> {
  /// Scratch memory for per-decode temporaries. The caller funds it;
  /// [`REQUIRED_TEMP_BYTES`](crate::REQUIRED_TEMP_BYTES) is always enough.
  pub temp: Scratch<'t>,
  /// Processors, offered chunks and rows in this order.
  pub processors: Vec<Box<dyn ChunkProcessor>>,
}
impl core::fmt::Debug for Options<'_> {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("Options")
      .field("temp", &self.temp)
      .field("processors", &self.processors.len())
      .finish()
  }
}
impl<'t> Options<'t> {
  /// Options with no processors: indexed images stay indexed and
  /// transparency chunks are skipped.
  #[must_use]
  pub fn new(temp: Scratch<'t>) -> Self {
    Self { temp, processors: Vec::new() }
  }

  /// Options with the stock processor list: transparency handling followed
  /// by palette expansion.
  #[must_use]
  pub fn with_defaults(temp: Scratch<'t>) -> Self {
    Self {
      temp,
      processors: vec![Box::new(TrnsProcessor::new()), Box::new(PlteProcessor::new())],
    }
  }
}

/// A PNG decoder over a byte source.
///
/// Construct with [`from_file`](PngDecoder::from_file) or
/// [`from_memory`](PngDecoder::from_memory), then either call
/// [`decode`](PngDecoder::decode) directly or look at
/// [`read_header`](PngDecoder::read_header) first and follow up with
/// [`decode_with_header`](PngDecoder::decode_with_header).
#[derive(Debug)]
pub struct PngDecoder<S> {
  source: S,
  suggested_palette: Option<Vec<RGB8>>,
}

impl<R: Read + Seek> PngDecoder<FileSource<R>> {
  /// Decode from a seekable reader, usually a [`File`](std::fs::File).
  #[must_use]
  pub fn from_file(reader: R) -> Self {
    Self { source: FileSource::new(reader), suggested_palette: None }
  }
}

impl<'b> PngDecoder<SliceSource<'b>> {
  /// Decode from bytes already in memory. Never copies the source.
  #[must_use]
  pub fn from_memory(bytes: &'b [u8]) -> Self {
    Self { source: SliceSource::new(bytes), suggested_palette: None }
  }
}

impl<S: ByteSource> PngDecoder<S> {
  /// Read and validate the signature and image header.
  ///
  /// Consumes exactly the signature plus the whole IHDR chunk: on success
  /// the source sits at the first byte of the chunk after IHDR.
  pub fn read_header(&mut self) -> PngResult<Header> {
    if self.source.borrow(SIGNATURE.len())? != &SIGNATURE[..] {
      return Err(PngError::InvalidData);
    }
    let (raw, actual_crc): (RawIhdr, u32) = {
      let bytes = self.source.borrow(core::mem::size_of::<RawIhdr>())?;
      let mut crc = Crc32::new();
      crc.update(&bytes[4..21]);
      (bytemuck::pod_read_unaligned(bytes), crc.finish())
    };
    if raw.chunk_ty != ChunkType::IHDR || raw.length.to_u32() != 13 {
      return Err(PngError::InvalidData);
    }
    let header = Header::from_raw(&raw)?;
    if raw.crc_claim.to_u32() != actual_crc {
      return Err(PngError::InvalidData);
    }
    debug!(
      "IHDR: {}x{}, bit depth {}, color {:?}, {:?}",
      header.width, header.height, header.bit_depth, header.color_type, header.interlace_method
    );
    Ok(header)
  }

  /// Decode the whole image.
  pub fn decode(&mut self, options: &mut Options<'_>) -> PngResult<PixelStorage> {
    let header = self.read_header()?;
    self.decode_with_header(header, options)
  }

  /// Decode the whole image, picking up after
  /// [`read_header`](PngDecoder::read_header) already consumed the header.
  pub fn decode_with_header(
    &mut self, header: Header, options: &mut Options<'_>,
  ) -> PngResult<PixelStorage> {
    if !header.is_valid() {
      return Err(PngError::InvalidData);
    }
    let mut format = header.pixel_format()?;
    // Widened palette entries for indexed images (suggested palettes for
    // direct-color images are kept aside on `self`).
    let mut palette: Vec<RGBA8> = Vec::new();

    // Chunks before the image data.
    let first_idat_len = loop {
      let hdr: ChunkHeader = self.source.read_record()?;
      let length = hdr.length.to_u32();
      let ty = hdr.chunk_ty;
      trace!("chunk {ty:?}, length {length}");
      match ty {
        ChunkType::IHDR => return Err(PngError::InvalidData),
        ChunkType::IEND => return Err(PngError::InvalidData),
        ChunkType::IDAT => break length,
        ChunkType::PLTE => {
          self.read_palette(&header, length, &mut palette)?;
          dispatch_critical(
            &mut self.source,
            &mut options.processors,
            &header,
            &mut format,
            palette.len(),
            ty,
            length,
          )?;
        }
        ty if ty.is_critical() => return Err(PngError::InvalidData),
        ty => dispatch_ancillary(
          &mut self.source,
          &mut options.processors,
          &header,
          &mut format,
          palette.len(),
          ty,
          length,
        )?,
      }
    };
    if header.color_type == ColorType::INDEX && palette.is_empty() {
      return Err(PngError::InvalidData);
    }

    // The destination format is final now; build the storage and palette.
    let width = header.width as usize;
    let height = header.height as usize;
    let pixel_count = width.checked_mul(height).ok_or(PngError::Alloc)?;
    let mut storage = PixelStorage::alloc(format, pixel_count)?;
    if header.color_type == ColorType::INDEX {
      match storage.palette_mut() {
        Some(dest) => {
          dest[..palette.len()].copy_from_slice(&palette);
          run_palette_processors(&mut options.processors, &header, dest)?;
        }
        // format was widened away from indexed, so the palette only feeds
        // the row processors
        None => run_palette_processors(&mut options.processors, &header, &mut palette)?,
      }
    }

    let pixel_stride = format.pixel_stride();
    let dst_line_len = width * pixel_stride;
    let filter_stride = header.filter_stride();
    let row_len = filter_stride + header.line_bytes(header.width);
    let mut prev = try_zeroed_bytes(row_len)?;
    let mut cur = try_zeroed_bytes(row_len)?;
    let sixteen_bit = header.bit_depth == 16;

    {
      let input = options.temp.take(INFLATE_INPUT_LEN)?;
      let idat = IdatStream::new(&mut self.source, first_idat_len);
      let mut inflater = Inflater::new(idat, input);
      let dst = storage.as_bytes_mut();

      if !header.is_interlaced() {
        for y in 0..height {
          inflater.read_exact(&mut cur[filter_stride - 1..])?;
          unfilter_row(&prev, &mut cur, filter_stride)?;
          let row = &mut dst[y * dst_line_len..(y + 1) * dst_line_len];
          spread_row(
            &cur[filter_stride..],
            row,
            header.bit_depth,
            header.channel_count(),
            pixel_stride,
            true,
          );
          run_row_processors(&mut options.processors, &header, format, row, &palette, false)?;
          core::mem::swap(&mut prev, &mut cur);
        }
      } else {
        let mut pass_row = try_zeroed_bytes(dst_line_len)?;
        for pass in ADAM7_PASSES.iter() {
          let (pass_w, pass_h) = pass.dimensions(header.width, header.height);
          if pass_w == 0 || pass_h == 0 {
            continue;
          }
          let pass_row_len = filter_stride + header.line_bytes(pass_w);
          prev[..pass_row_len].fill(0);
          for r in 0..pass_h {
            inflater.read_exact(&mut cur[filter_stride - 1..pass_row_len])?;
            unfilter_row(&prev[..pass_row_len], &mut cur[..pass_row_len], filter_stride)?;
            let prow = &mut pass_row[..pass_w as usize * pixel_stride];
            spread_row(
              &cur[filter_stride..pass_row_len],
              prow,
              header.bit_depth,
              header.channel_count(),
              pixel_stride,
              false,
            );
            run_row_processors(
              &mut options.processors,
              &header,
              format,
              prow,
              &palette,
              sixteen_bit,
            )?;
            scatter_pass_row(pass, r, prow, dst, dst_line_len, pixel_stride, sixteen_bit);
            core::mem::swap(&mut prev, &mut cur);
          }
        }
      }

      // the chunk run may still owe a CRC check and the rewind to the next
      // chunk, so it is settled explicitly rather than via one more read
      inflater.finish()?;
    }

    // Chunks after the image data, ending at IEND.
    loop {
      let hdr: ChunkHeader = self.source.read_record()?;
      let length = hdr.length.to_u32();
      let ty = hdr.chunk_ty;
      trace!("chunk {ty:?}, length {length}");
      match ty {
        ChunkType::IEND => {
          if length != 0 {
            return Err(PngError::InvalidData);
          }
          let _crc = self.source.read_u32_be()?;
          dispatch_critical(
            &mut self.source,
            &mut options.processors,
            &header,
            &mut format,
            palette.len(),
            ty,
            length,
          )?;
          debug!("decode complete: {width}x{height} {format:?}");
          return Ok(storage);
        }
        ChunkType::IHDR | ChunkType::PLTE | ChunkType::IDAT => return Err(PngError::InvalidData),
        ChunkType::tRNS => {
          // transparency after the image data no longer means anything
          warn!("tRNS chunk after IDAT ignored");
          self.source.seek_by(length as i64 + 4)?;
        }
        ty if ty.is_critical() => return Err(PngError::InvalidData),
        ty => dispatch_ancillary(
          &mut self.source,
          &mut options.processors,
          &header,
          &mut format,
          palette.len(),
          ty,
          length,
        )?,
      }
    }
  }

  /// A `PLTE` chunk seen on a direct-color image is only a quantization
  /// suggestion; it's kept here rather than influencing the decode.
  #[inline]
  #[must_use]
  pub fn suggested_palette(&self) -> Option<&[RGB8]> {
    self.suggested_palette.as_deref()
  }

  fn read_palette(
    &mut self, header: &Header, length: u32, palette: &mut Vec<RGBA8>,
  ) -> PngResult<()> {
    if !palette.is_empty() || self.suggested_palette.is_some() {
      return Err(PngError::InvalidData);
    }
    let max_entries = match header.color_type {
      ColorType::Y | ColorType::YA => return Err(PngError::InvalidData),
      ColorType::INDEX => 1_usize << header.bit_depth,
      _ => 256,
    };
    let len = length as usize;
    if len == 0 || len % 3 != 0 || len / 3 > max_entries {
      return Err(PngError::InvalidData);
    }
    let (actual_crc, entries): (u32, Vec<RGB8>) = {
      let payload = self.source.borrow(len)?;
      (crate::crc32::chunk_crc(*b"PLTE", payload), bytemuck::cast_slice(payload).to_vec())
    };
    if self.source.read_u32_be()? != actual_crc {
      return Err(PngError::InvalidData);
    }
    if header.color_type == ColorType::INDEX {
      *palette =
        entries.iter().map(|e| RGBA8 { r: e.r, g: e.g, b: e.b, a: u8::MAX }).collect();
    } else {
      debug!("keeping {} suggested palette entries", entries.len());
      self.suggested_palette = Some(entries);
    }
    Ok(())
  }
}

/// Apply a format returned by a processor, holding the line on the rule
/// that the pixel stride never shrinks.
fn widen_format(current: &mut PixelFormat, new: PixelFormat) -> PngResult<()> {
  if new.pixel_stride() < current.pixel_stride() {
    return Err(PngError::InvalidData);
  }
  *current = new;
  Ok(())
}

/// Critical chunks go to every matching processor, after the decoder's own
/// handling consumed the payload.
fn dispatch_critical<S: ByteSource>(
  source: &mut S, processors: &mut [Box<dyn ChunkProcessor>], header: &Header,
  format: &mut PixelFormat, palette_len: usize, ty: ChunkType, length: u32,
) -> PngResult<()> {
  for p in processors.iter_mut() {
    if p.id() == ty {
      let mut ctx = ChunkContext {
        source: &mut *source,
        header,
        chunk_length: length,
        format: *format,
        palette_len,
      };
      if let Some(new) = p.process_chunk(&mut ctx)? {
        widen_format(format, new)?;
      }
    }
  }
  Ok(())
}

/// Ancillary chunks go to the first matching processor only; with no match
/// the decoder steps over the payload and its CRC.
fn dispatch_ancillary<S: ByteSource>(
  source: &mut S, processors: &mut [Box<dyn ChunkProcessor>], header: &Header,
  format: &mut PixelFormat, palette_len: usize, ty: ChunkType, length: u32,
) -> PngResult<()> {
  for p in processors.iter_mut() {
    if p.id() == ty {
      let mut ctx = ChunkContext {
        source: &mut *source,
        header,
        chunk_length: length,
        format: *format,
        palette_len,
      };
      if let Some(new) = p.process_chunk(&mut ctx)? {
        widen_format(format, new)?;
      }
      return Ok(());
    }
  }
  trace!("no processor for {ty:?}, skipping {length} bytes");
  source.seek_by(i64::from(length) + 4)
}

fn run_palette_processors(
  processors: &mut [Box<dyn ChunkProcessor>], header: &Header, palette: &mut [RGBA8],
) -> PngResult<()> {
  for p in processors.iter_mut() {
    let mut ctx = PaletteContext { header, palette: &mut *palette };
    p.process_palette(&mut ctx)?;
  }
  Ok(())
}

fn run_row_processors(
  processors: &mut [Box<dyn ChunkProcessor>], header: &Header, format: PixelFormat,
  row: &mut [u8], palette: &[RGBA8], samples_big_endian: bool,
) -> PngResult<()> {
  for p in processors.iter_mut() {
    let mut ctx =
      RowContext { header, format, row: &mut *row, palette, samples_big_endian };
    if let Some(new) = p.process_row(&mut ctx)? {
      if new.pixel_stride() < format.pixel_stride() {
        return Err(PngError::InvalidData);
      }
    }
  }
  Ok(())
}

fn try_zeroed_bytes(len: usize) -> PngResult<Vec<u8>> {
  let mut v = Vec::new();
  v.try_reserve_exact(len)?;
  v.resize(len, 0);
  Ok(v)
}
