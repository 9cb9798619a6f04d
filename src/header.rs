//! The image header and the small field tags it carries.

use bytemuck::{Pod, Zeroable};

use crate::chunk::ChunkType;
use crate::error::{PngError, PngResult};
use crate::pixel_storage::PixelFormat;
use crate::raw::U32BE;

/// Color layout of the image samples.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct ColorType(pub u8);
impl ColorType {
  /// Grayscale.
  pub const Y: Self = Self(0);
  /// Red, green, blue.
  pub const RGB: Self = Self(2);
  /// Palette index.
  pub const INDEX: Self = Self(3);
  /// Grayscale with alpha.
  pub const YA: Self = Self(4);
  /// Red, green, blue, alpha.
  pub const RGBA: Self = Self(6);

  /// Samples per pixel for this color layout.
  #[inline]
  #[must_use]
  pub const fn channel_count(self) -> usize {
    match self {
      Self::RGB => 3,
      Self::YA => 2,
      Self::RGBA => 4,
      _ => 1,
    }
  }
}
impl core::fmt::Debug for ColorType {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    match *self {
      ColorType::Y => write!(f, "Y"),
      ColorType::RGB => write!(f, "RGB"),
      ColorType::INDEX => write!(f, "Index"),
      ColorType::YA => write!(f, "YA"),
      ColorType::RGBA => write!(f, "RGBA"),
      other => write!(f, "Illegal({})", other.0),
    }
  }
}

/// The compression method field. Only Deflate is defined.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct CompressionMethod(pub u8);
#[allow(missing_docs)]
impl CompressionMethod {
  pub const DEFLATE: Self = Self(0);
}
impl core::fmt::Debug for CompressionMethod {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    match *self {
      CompressionMethod::DEFLATE => write!(f, "Deflate"),
      other => write!(f, "Illegal({})", other.0),
    }
  }
}

/// The filter method field. Only the adaptive five-filter scheme is defined.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct FilterMethod(pub u8);
#[allow(missing_docs)]
impl FilterMethod {
  pub const ADAPTIVE: Self = Self(0);
}
impl core::fmt::Debug for FilterMethod {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    match *self {
      FilterMethod::ADAPTIVE => write!(f, "Adaptive"),
      other => write!(f, "Illegal({})", other.0),
    }
  }
}

/// How the rows of the image are sequenced in the data stream.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct InterlaceMethod(pub u8);
#[allow(missing_docs)]
impl InterlaceMethod {
  pub const NONE: Self = Self(0);
  pub const ADAM7: Self = Self(1);
}
impl core::fmt::Debug for InterlaceMethod {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    match *self {
      InterlaceMethod::NONE => write!(f, "NoInterlace"),
      InterlaceMethod::ADAM7 => write!(f, "Adam7"),
      other => write!(f, "Illegal({})", other.0),
    }
  }
}

/// The whole IHDR chunk as it sits in the data stream: chunk header, 13-byte
/// payload, trailing CRC. Reading it as one record keeps header loading a
/// fixed-size prefix operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub(crate) struct RawIhdr {
  pub length: U32BE,
  pub chunk_ty: ChunkType,
  pub width: U32BE,
  pub height: U32BE,
  pub bit_depth: u8,
  pub color_type: u8,
  pub compression_method: u8,
  pub filter_method: u8,
  pub interlace_method: u8,
  pub crc_claim: U32BE,
}
unsafe impl Zeroable for RawIhdr {}
unsafe impl Pod for RawIhdr {}

/// The parsed and validated image header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct Header {
  /// Width in pixels, `1..=i32::MAX as u32`.
  pub width: u32,
  /// Height in pixels, `1..=i32::MAX as u32`.
  pub height: u32,
  /// Bits per sample: 1, 2, 4, 8, or 16, constrained by the color type.
  pub bit_depth: u8,
  pub color_type: ColorType,
  pub compression_method: CompressionMethod,
  pub filter_method: FilterMethod,
  pub interlace_method: InterlaceMethod,
}
impl Header {
  pub(crate) fn from_raw(raw: &RawIhdr) -> PngResult<Self> {
    let header = Self {
      width: raw.width.to_u32(),
      height: raw.height.to_u32(),
      bit_depth: raw.bit_depth,
      color_type: ColorType(raw.color_type),
      compression_method: CompressionMethod(raw.compression_method),
      filter_method: FilterMethod(raw.filter_method),
      interlace_method: InterlaceMethod(raw.interlace_method),
    };
    if !header.is_valid() {
      return Err(PngError::InvalidData);
    }
    Ok(header)
  }

  /// Does every field hold a legal value and combination?
  #[must_use]
  pub fn is_valid(&self) -> bool {
    self.width >= 1
      && self.width <= i32::MAX as u32
      && self.height >= 1
      && self.height <= i32::MAX as u32
      && self.compression_method == CompressionMethod::DEFLATE
      && self.filter_method == FilterMethod::ADAPTIVE
      && (self.interlace_method == InterlaceMethod::NONE
        || self.interlace_method == InterlaceMethod::ADAM7)
      && self.pixel_format().is_ok()
  }

  /// Is the pixel data stored in the seven-pass interlaced sequence?
  #[inline]
  #[must_use]
  pub fn is_interlaced(&self) -> bool {
    self.interlace_method == InterlaceMethod::ADAM7
  }

  /// Samples per pixel.
  #[inline]
  #[must_use]
  pub const fn channel_count(&self) -> usize {
    self.color_type.channel_count()
  }

  /// Byte distance between corresponding samples of horizontally adjacent
  /// pixels in a filtered row. Never less than 1.
  #[inline]
  #[must_use]
  pub const fn filter_stride(&self) -> usize {
    ((self.bit_depth as usize + 7) / 8) * self.channel_count()
  }

  /// Sample bytes in one filtered row of a `width`-pixel image, excluding
  /// the leading filter selector byte.
  ///
  /// Interlaced decoding calls this once per pass with the pass width.
  #[inline]
  #[must_use]
  pub const fn line_bytes(&self, width: u32) -> usize {
    (width as usize * self.bit_depth as usize * self.channel_count() + 7) / 8
  }

  /// The pixel layout this header's samples decode to, before any processor
  /// widens it.
  pub fn pixel_format(&self) -> PngResult<PixelFormat> {
    Ok(match (self.color_type, self.bit_depth) {
      (ColorType::Y, 1) => PixelFormat::Grayscale1,
      (ColorType::Y, 2) => PixelFormat::Grayscale2,
      (ColorType::Y, 4) => PixelFormat::Grayscale4,
      (ColorType::Y, 8) => PixelFormat::Grayscale8,
      (ColorType::Y, 16) => PixelFormat::Grayscale16,
      (ColorType::RGB, 8) => PixelFormat::Rgb24,
      (ColorType::RGB, 16) => PixelFormat::Rgb48,
      (ColorType::INDEX, 1) => PixelFormat::Indexed1,
      (ColorType::INDEX, 2) => PixelFormat::Indexed2,
      (ColorType::INDEX, 4) => PixelFormat::Indexed4,
      (ColorType::INDEX, 8) => PixelFormat::Indexed8,
      (ColorType::YA, 8) => PixelFormat::GrayscaleAlpha8,
      (ColorType::YA, 16) => PixelFormat::GrayscaleAlpha16,
      (ColorType::RGBA, 8) => PixelFormat::Rgba32,
      (ColorType::RGBA, 16) => PixelFormat::Rgba64,
      _ => return Err(PngError::InvalidData),
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn base() -> Header {
    Header {
      width: 4,
      height: 4,
      bit_depth: 8,
      color_type: ColorType::RGBA,
      compression_method: CompressionMethod::DEFLATE,
      filter_method: FilterMethod::ADAPTIVE,
      interlace_method: InterlaceMethod::NONE,
    }
  }

  #[test]
  fn validity_table() {
    assert!(base().is_valid());
    for (color, depth, ok) in [
      (ColorType::Y, 1, true),
      (ColorType::Y, 2, true),
      (ColorType::Y, 16, true),
      (ColorType::Y, 3, false),
      (ColorType::RGB, 8, true),
      (ColorType::RGB, 4, false),
      (ColorType::INDEX, 1, true),
      (ColorType::INDEX, 8, true),
      (ColorType::INDEX, 16, false),
      (ColorType::YA, 16, true),
      (ColorType::YA, 4, false),
      (ColorType::RGBA, 16, true),
      (ColorType::RGBA, 2, false),
      (ColorType(5), 8, false),
    ] {
      let h = Header { color_type: color, bit_depth: depth, ..base() };
      assert_eq!(h.is_valid(), ok, "color {color:?} depth {depth}");
    }
    assert!(!Header { width: 0, ..base() }.is_valid());
    assert!(!Header { height: 0, ..base() }.is_valid());
    assert!(!Header { width: i32::MAX as u32 + 1, ..base() }.is_valid());
    assert!(!Header { compression_method: CompressionMethod(1), ..base() }.is_valid());
    assert!(!Header { filter_method: FilterMethod(1), ..base() }.is_valid());
    assert!(!Header { interlace_method: InterlaceMethod(2), ..base() }.is_valid());
  }

  #[test]
  fn geometry() {
    let h = Header { color_type: ColorType::Y, bit_depth: 1, ..base() };
    assert_eq!(h.filter_stride(), 1);
    assert_eq!(h.line_bytes(1), 1);
    assert_eq!(h.line_bytes(8), 1);
    assert_eq!(h.line_bytes(9), 2);

    let h = Header { color_type: ColorType::RGBA, bit_depth: 16, ..base() };
    assert_eq!(h.filter_stride(), 8);
    assert_eq!(h.line_bytes(3), 24);

    let h = Header { color_type: ColorType::YA, bit_depth: 8, ..base() };
    assert_eq!(h.filter_stride(), 2);
    assert_eq!(h.line_bytes(5), 10);
  }
}
