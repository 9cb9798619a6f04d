//! The pixel format tags and the tagged container that holds decoded pixels.

use bytemuck::Zeroable;

use crate::error::PngResult;
use crate::pixel_formats::*;

/// The closed set of pixel layouts a decode can produce.
///
/// The decoder starts from the layout named by the image header and
/// processors may widen it before pixel storage is allocated. The stride of
/// a format is its bytes per pixel in the destination storage; sub-byte
/// index and gray formats store one sample per byte, so they report 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(missing_docs)]
pub enum PixelFormat {
  Indexed1,
  Indexed2,
  Indexed4,
  Indexed8,
  Indexed16,
  Grayscale1,
  Grayscale2,
  Grayscale4,
  Grayscale8,
  Grayscale16,
  GrayscaleAlpha8,
  GrayscaleAlpha16,
  Rgb24,
  Rgba32,
  Rgb48,
  Rgba64,
  Bgr24,
  Bgra32,
  Rgb565,
  Rgb555,
  Float32,
}
impl PixelFormat {
  /// Bytes per pixel in the destination storage.
  #[inline]
  #[must_use]
  pub const fn pixel_stride(self) -> usize {
    use PixelFormat::*;
    match self {
      Indexed1 | Indexed2 | Indexed4 | Indexed8 => 1,
      Grayscale1 | Grayscale2 | Grayscale4 | Grayscale8 => 1,
      Indexed16 | Grayscale16 | GrayscaleAlpha8 | Rgb565 | Rgb555 => 2,
      Rgb24 | Bgr24 => 3,
      GrayscaleAlpha16 | Rgba32 | Bgra32 | Float32 => 4,
      Rgb48 => 6,
      Rgba64 => 8,
    }
  }

  /// Does this format pair its pixels with a palette?
  #[inline]
  #[must_use]
  pub const fn is_indexed(self) -> bool {
    use PixelFormat::*;
    matches!(self, Indexed1 | Indexed2 | Indexed4 | Indexed8 | Indexed16)
  }

  /// Palette entry count for indexed formats, 0 otherwise.
  #[inline]
  #[must_use]
  pub const fn palette_len(self) -> usize {
    use PixelFormat::*;
    match self {
      Indexed1 => 1 << 1,
      Indexed2 => 1 << 2,
      Indexed4 => 1 << 4,
      Indexed8 => 1 << 8,
      Indexed16 => 1 << 16,
      _ => 0,
    }
  }
}

/// Owned, decoded pixel data, tagged by [`PixelFormat`].
///
/// Indexed variants own a palette of RGBA entries next to the row-major
/// index array; every other variant owns a row-major array of the matching
/// element type from [`pixel_formats`](crate::pixel_formats).
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum PixelStorage {
  Indexed1 { palette: Vec<RGBA8>, indices: Vec<u8> },
  Indexed2 { palette: Vec<RGBA8>, indices: Vec<u8> },
  Indexed4 { palette: Vec<RGBA8>, indices: Vec<u8> },
  Indexed8 { palette: Vec<RGBA8>, indices: Vec<u8> },
  Indexed16 { palette: Vec<RGBA8>, indices: Vec<u16> },
  Grayscale1(Vec<Y8>),
  Grayscale2(Vec<Y8>),
  Grayscale4(Vec<Y8>),
  Grayscale8(Vec<Y8>),
  Grayscale16(Vec<Y16>),
  GrayscaleAlpha8(Vec<YA8>),
  GrayscaleAlpha16(Vec<YA16>),
  Rgb24(Vec<RGB8>),
  Rgba32(Vec<RGBA8>),
  Rgb48(Vec<RGB16>),
  Rgba64(Vec<RGBA16>),
  Bgr24(Vec<BGR8>),
  Bgra32(Vec<BGRA8>),
  Rgb565(Vec<Rgb565>),
  Rgb555(Vec<Rgb555>),
  Float32(Vec<YF32>),
}

/// `try_reserve`-backed zeroed vector, so an oversized image reports
/// [`PngError::Alloc`] instead of aborting.
fn try_zeroed_vec<T: Zeroable + Clone>(len: usize) -> PngResult<Vec<T>> {
  let mut v = Vec::new();
  v.try_reserve_exact(len)?;
  v.resize(len, T::zeroed());
  Ok(v)
}

impl PixelStorage {
  /// Allocate zeroed storage for `pixel_count` pixels of `format`.
  ///
  /// Indexed variants also get a zeroed palette of `2^bit_depth` entries.
  pub fn alloc(format: PixelFormat, pixel_count: usize) -> PngResult<Self> {
    Ok(match format {
      PixelFormat::Indexed1 => Self::Indexed1 {
        palette: try_zeroed_vec(format.palette_len())?,
        indices: try_zeroed_vec(pixel_count)?,
      },
      PixelFormat::Indexed2 => Self::Indexed2 {
        palette: try_zeroed_vec(format.palette_len())?,
        indices: try_zeroed_vec(pixel_count)?,
      },
      PixelFormat::Indexed4 => Self::Indexed4 {
        palette: try_zeroed_vec(format.palette_len())?,
        indices: try_zeroed_vec(pixel_count)?,
      },
      PixelFormat::Indexed8 => Self::Indexed8 {
        palette: try_zeroed_vec(format.palette_len())?,
        indices: try_zeroed_vec(pixel_count)?,
      },
      PixelFormat::Indexed16 => Self::Indexed16 {
        palette: try_zeroed_vec(format.palette_len())?,
        indices: try_zeroed_vec(pixel_count)?,
      },
      PixelFormat::Grayscale1 => Self::Grayscale1(try_zeroed_vec(pixel_count)?),
      PixelFormat::Grayscale2 => Self::Grayscale2(try_zeroed_vec(pixel_count)?),
      PixelFormat::Grayscale4 => Self::Grayscale4(try_zeroed_vec(pixel_count)?),
      PixelFormat::Grayscale8 => Self::Grayscale8(try_zeroed_vec(pixel_count)?),
      PixelFormat::Grayscale16 => Self::Grayscale16(try_zeroed_vec(pixel_count)?),
      PixelFormat::GrayscaleAlpha8 => Self::GrayscaleAlpha8(try_zeroed_vec(pixel_count)?),
      PixelFormat::GrayscaleAlpha16 => Self::GrayscaleAlpha16(try_zeroed_vec(pixel_count)?),
      PixelFormat::Rgb24 => Self::Rgb24(try_zeroed_vec(pixel_count)?),
      PixelFormat::Rgba32 => Self::Rgba32(try_zeroed_vec(pixel_count)?),
      PixelFormat::Rgb48 => Self::Rgb48(try_zeroed_vec(pixel_count)?),
      PixelFormat::Rgba64 => Self::Rgba64(try_zeroed_vec(pixel_count)?),
      PixelFormat::Bgr24 => Self::Bgr24(try_zeroed_vec(pixel_count)?),
      PixelFormat::Bgra32 => Self::Bgra32(try_zeroed_vec(pixel_count)?),
      PixelFormat::Rgb565 => Self::Rgb565(try_zeroed_vec(pixel_count)?),
      PixelFormat::Rgb555 => Self::Rgb555(try_zeroed_vec(pixel_count)?),
      PixelFormat::Float32 => Self::Float32(try_zeroed_vec(pixel_count)?),
    })
  }

  /// The format tag of this storage.
  #[inline]
  #[must_use]
  pub const fn format(&self) -> PixelFormat {
    match self {
      Self::Indexed1 { .. } => PixelFormat::Indexed1,
      Self::Indexed2 { .. } => PixelFormat::Indexed2,
      Self::Indexed4 { .. } => PixelFormat::Indexed4,
      Self::Indexed8 { .. } => PixelFormat::Indexed8,
      Self::Indexed16 { .. } => PixelFormat::Indexed16,
      Self::Grayscale1(_) => PixelFormat::Grayscale1,
      Self::Grayscale2(_) => PixelFormat::Grayscale2,
      Self::Grayscale4(_) => PixelFormat::Grayscale4,
      Self::Grayscale8(_) => PixelFormat::Grayscale8,
      Self::Grayscale16(_) => PixelFormat::Grayscale16,
      Self::GrayscaleAlpha8(_) => PixelFormat::GrayscaleAlpha8,
      Self::GrayscaleAlpha16(_) => PixelFormat::GrayscaleAlpha16,
      Self::Rgb24(_) => PixelFormat::Rgb24,
      Self::Rgba32(_) => PixelFormat::Rgba32,
      Self::Rgb48(_) => PixelFormat::Rgb48,
      Self::Rgba64(_) => PixelFormat::Rgba64,
      Self::Bgr24(_) => PixelFormat::Bgr24,
      Self::Bgra32(_) => PixelFormat::Bgra32,
      Self::Rgb565(_) => PixelFormat::Rgb565,
      Self::Rgb555(_) => PixelFormat::Rgb555,
      Self::Float32(_) => PixelFormat::Float32,
    }
  }

  /// Pixel count of the image.
  #[inline]
  #[must_use]
  pub fn len(&self) -> usize {
    match self {
      Self::Indexed1 { indices, .. }
      | Self::Indexed2 { indices, .. }
      | Self::Indexed4 { indices, .. }
      | Self::Indexed8 { indices, .. } => indices.len(),
      Self::Indexed16 { indices, .. } => indices.len(),
      Self::Grayscale1(p) | Self::Grayscale2(p) | Self::Grayscale4(p) | Self::Grayscale8(p) => {
        p.len()
      }
      Self::Grayscale16(p) => p.len(),
      Self::GrayscaleAlpha8(p) => p.len(),
      Self::GrayscaleAlpha16(p) => p.len(),
      Self::Rgb24(p) => p.len(),
      Self::Rgba32(p) => p.len(),
      Self::Rgb48(p) => p.len(),
      Self::Rgba64(p) => p.len(),
      Self::Bgr24(p) => p.len(),
      Self::Bgra32(p) => p.len(),
      Self::Rgb565(p) => p.len(),
      Self::Rgb555(p) => p.len(),
      Self::Float32(p) => p.len(),
    }
  }

  #[inline]
  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// View the pixel payload (the index array for indexed variants) as raw
  /// bytes.
  ///
  /// Valid because every element type is `#[repr(C)]` plain-old-data.
  #[must_use]
  pub fn as_bytes(&self) -> &[u8] {
    match self {
      Self::Indexed1 { indices, .. }
      | Self::Indexed2 { indices, .. }
      | Self::Indexed4 { indices, .. }
      | Self::Indexed8 { indices, .. } => indices.as_slice(),
      Self::Indexed16 { indices, .. } => bytemuck::cast_slice(indices),
      Self::Grayscale1(p) | Self::Grayscale2(p) | Self::Grayscale4(p) | Self::Grayscale8(p) => {
        bytemuck::cast_slice(p)
      }
      Self::Grayscale16(p) => bytemuck::cast_slice(p),
      Self::GrayscaleAlpha8(p) => bytemuck::cast_slice(p),
      Self::GrayscaleAlpha16(p) => bytemuck::cast_slice(p),
      Self::Rgb24(p) => bytemuck::cast_slice(p),
      Self::Rgba32(p) => bytemuck::cast_slice(p),
      Self::Rgb48(p) => bytemuck::cast_slice(p),
      Self::Rgba64(p) => bytemuck::cast_slice(p),
      Self::Bgr24(p) => bytemuck::cast_slice(p),
      Self::Bgra32(p) => bytemuck::cast_slice(p),
      Self::Rgb565(p) => bytemuck::cast_slice(p),
      Self::Rgb555(p) => bytemuck::cast_slice(p),
      Self::Float32(p) => bytemuck::cast_slice(p),
    }
  }

  /// View the pixel payload (the index array for indexed variants) as raw
  /// mutable bytes.
  #[must_use]
  pub fn as_bytes_mut(&mut self) -> &mut [u8] {
    match self {
      Self::Indexed1 { indices, .. }
      | Self::Indexed2 { indices, .. }
      | Self::Indexed4 { indices, .. }
      | Self::Indexed8 { indices, .. } => indices.as_mut_slice(),
      Self::Indexed16 { indices, .. } => bytemuck::cast_slice_mut(indices),
      Self::Grayscale1(p) | Self::Grayscale2(p) | Self::Grayscale4(p) | Self::Grayscale8(p) => {
        bytemuck::cast_slice_mut(p)
      }
      Self::Grayscale16(p) => bytemuck::cast_slice_mut(p),
      Self::GrayscaleAlpha8(p) => bytemuck::cast_slice_mut(p),
      Self::GrayscaleAlpha16(p) => bytemuck::cast_slice_mut(p),
      Self::Rgb24(p) => bytemuck::cast_slice_mut(p),
      Self::Rgba32(p) => bytemuck::cast_slice_mut(p),
      Self::Rgb48(p) => bytemuck::cast_slice_mut(p),
      Self::Rgba64(p) => bytemuck::cast_slice_mut(p),
      Self::Bgr24(p) => bytemuck::cast_slice_mut(p),
      Self::Bgra32(p) => bytemuck::cast_slice_mut(p),
      Self::Rgb565(p) => bytemuck::cast_slice_mut(p),
      Self::Rgb555(p) => bytemuck::cast_slice_mut(p),
      Self::Float32(p) => bytemuck::cast_slice_mut(p),
    }
  }

  /// The palette, for indexed variants only.
  #[inline]
  #[must_use]
  pub fn palette(&self) -> Option<&[RGBA8]> {
    match self {
      Self::Indexed1 { palette, .. }
      | Self::Indexed2 { palette, .. }
      | Self::Indexed4 { palette, .. }
      | Self::Indexed8 { palette, .. }
      | Self::Indexed16 { palette, .. } => Some(palette),
      _ => None,
    }
  }

  /// The palette as mutable entries, for indexed variants only.
  #[inline]
  #[must_use]
  pub fn palette_mut(&mut self) -> Option<&mut [RGBA8]> {
    match self {
      Self::Indexed1 { palette, .. }
      | Self::Indexed2 { palette, .. }
      | Self::Indexed4 { palette, .. }
      | Self::Indexed8 { palette, .. }
      | Self::Indexed16 { palette, .. } => Some(palette),
      _ => None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::PngError;

  #[test]
  fn strides_match_layout() {
    assert_eq!(PixelFormat::Indexed4.pixel_stride(), 1);
    assert_eq!(PixelFormat::Grayscale1.pixel_stride(), 1);
    assert_eq!(PixelFormat::GrayscaleAlpha8.pixel_stride(), 2);
    assert_eq!(PixelFormat::Rgb24.pixel_stride(), 3);
    assert_eq!(PixelFormat::Rgba32.pixel_stride(), 4);
    assert_eq!(PixelFormat::Rgb48.pixel_stride(), 6);
    assert_eq!(PixelFormat::Rgba64.pixel_stride(), 8);
    assert_eq!(PixelFormat::Rgb565.pixel_stride(), 2);
    assert_eq!(PixelFormat::Float32.pixel_stride(), 4);
  }

  #[test]
  fn alloc_sizes_payload_and_palette() {
    let storage = PixelStorage::alloc(PixelFormat::Indexed4, 10).unwrap();
    assert_eq!(storage.len(), 10);
    assert_eq!(storage.palette().unwrap().len(), 16);
    assert_eq!(storage.format(), PixelFormat::Indexed4);

    let mut storage = PixelStorage::alloc(PixelFormat::Rgba64, 3).unwrap();
    assert_eq!(storage.len(), 3);
    assert!(storage.palette().is_none());
    assert_eq!(storage.as_bytes_mut().len(), 3 * 8);
  }

  #[test]
  fn byte_view_aliases_typed_payload() {
    let mut storage = PixelStorage::alloc(PixelFormat::Rgb24, 2).unwrap();
    storage.as_bytes_mut().copy_from_slice(&[1, 2, 3, 4, 5, 6]);
    match storage {
      PixelStorage::Rgb24(ref px) => {
        assert_eq!(px[0], RGB8 { r: 1, g: 2, b: 3 });
        assert_eq!(px[1], RGB8 { r: 4, g: 5, b: 6 });
      }
      _ => unreachable!(),
    }
  }

  #[test]
  fn alloc_too_much_is_an_error_not_an_abort() {
    let e = PixelStorage::alloc(PixelFormat::Rgba64, usize::MAX / 16);
    assert_eq!(e.unwrap_err(), PngError::Alloc);
  }
}
