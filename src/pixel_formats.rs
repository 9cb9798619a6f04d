//! Plain-old-data pixel element types.
//!
//! There's two factors to a pixel layout:
//! * **Channels:** gray (marked `Y` in the type names), gray+alpha, RGB,
//!   RGBA, plus the reversed BGR orderings and the packed 16-bit RGB forms.
//! * **Bit depth:** bits per channel. Sub-byte gray and index samples are
//!   stored one sample per byte once decoded, so their element type is still
//!   a single byte.
//!
//! Every type here is `#[repr(C)]` with no padding, which is what lets
//! [`PixelStorage`](crate::PixelStorage) view its payload as raw bytes.
//! 16-bit channels are native-endian `u16` values; the decoder byte-swaps
//! big-endian samples on the way in.

use bytemuck::{Pod, Zeroable};

/// A grayscale pixel, one byte per sample.
///
/// Also holds decoded 1, 2, and 4 bit samples, which occupy the low bits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(missing_docs)]
#[repr(C)]
pub struct Y8 {
  pub y: u8,
}
/// A 16-bit grayscale pixel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(missing_docs)]
#[repr(C)]
pub struct Y16 {
  pub y: u16,
}

/// An 8-bits per channel grayscale + alpha pixel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(missing_docs)]
#[repr(C)]
pub struct YA8 {
  pub y: u8,
  pub a: u8,
}
/// A 16-bits per channel grayscale + alpha pixel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(missing_docs)]
#[repr(C)]
pub struct YA16 {
  pub y: u16,
  pub a: u16,
}

/// An RGB pixel, 8-bits per channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(missing_docs)]
#[repr(C)]
pub struct RGB8 {
  pub r: u8,
  pub g: u8,
  pub b: u8,
}
/// An RGB pixel, 16-bits per channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(missing_docs)]
#[repr(C)]
pub struct RGB16 {
  pub r: u16,
  pub g: u16,
  pub b: u16,
}

/// An RGBA pixel, 8-bits per channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(missing_docs)]
#[repr(C)]
pub struct RGBA8 {
  pub r: u8,
  pub g: u8,
  pub b: u8,
  pub a: u8,
}
/// An RGBA pixel, 16-bits per channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(missing_docs)]
#[repr(C)]
pub struct RGBA16 {
  pub r: u16,
  pub g: u16,
  pub b: u16,
  pub a: u16,
}

/// A blue-first RGB pixel, 8-bits per channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(missing_docs)]
#[repr(C)]
pub struct BGR8 {
  pub b: u8,
  pub g: u8,
  pub r: u8,
}
/// A blue-first RGBA pixel, 8-bits per channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(missing_docs)]
#[repr(C)]
pub struct BGRA8 {
  pub b: u8,
  pub g: u8,
  pub r: u8,
  pub a: u8,
}

/// An RGB pixel packed into 16 bits as 5-6-5.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(missing_docs)]
#[repr(C)]
pub struct Rgb565 {
  pub bits: u16,
}
/// An RGB pixel packed into the low 15 bits of a `u16` as 5-5-5.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(missing_docs)]
#[repr(C)]
pub struct Rgb555 {
  pub bits: u16,
}

/// A grayscale pixel, one `f32` per sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd)]
#[allow(missing_docs)]
#[repr(C)]
pub struct YF32 {
  pub y: f32,
}

unsafe impl Zeroable for Y8 {}
unsafe impl Zeroable for Y16 {}
unsafe impl Zeroable for YA8 {}
unsafe impl Zeroable for YA16 {}
unsafe impl Zeroable for RGB8 {}
unsafe impl Zeroable for RGB16 {}
unsafe impl Zeroable for RGBA8 {}
unsafe impl Zeroable for RGBA16 {}
unsafe impl Zeroable for BGR8 {}
unsafe impl Zeroable for BGRA8 {}
unsafe impl Zeroable for Rgb565 {}
unsafe impl Zeroable for Rgb555 {}
unsafe impl Zeroable for YF32 {}
//
unsafe impl Pod for Y8 {}
unsafe impl Pod for Y16 {}
unsafe impl Pod for YA8 {}
unsafe impl Pod for YA16 {}
unsafe impl Pod for RGB8 {}
unsafe impl Pod for RGB16 {}
unsafe impl Pod for RGBA8 {}
unsafe impl Pod for RGBA16 {}
unsafe impl Pod for BGR8 {}
unsafe impl Pod for BGRA8 {}
unsafe impl Pod for Rgb565 {}
unsafe impl Pod for Rgb555 {}
unsafe impl Pod for YF32 {}
