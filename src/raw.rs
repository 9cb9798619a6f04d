//! Alignment-1 integer newtypes for fixed-layout records.
//!
//! PNG stores multi-byte integers as big-endian, and its records are packed
//! with no alignment padding. Keeping the big-endian bytes in the struct and
//! converting on access lets a whole record be read straight out of the data
//! stream.

use bytemuck::{Pod, Zeroable};

/// A `u16` stored as big-endian bytes.
///
/// Alignment 1, so it can sit anywhere in a packed record.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct U16BE([u8; 2]);
impl U16BE {
  /// Convert to a native `u16`.
  #[inline]
  #[must_use]
  pub const fn to_u16(self) -> u16 {
    u16::from_be_bytes(self.0)
  }
  /// Make a value from a native `u16`.
  #[inline]
  #[must_use]
  pub const fn from_u16(u: u16) -> Self {
    Self(u.to_be_bytes())
  }
}
impl core::fmt::Debug for U16BE {
  #[inline]
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_tuple("U16BE").field(&self.to_u16()).finish()
  }
}

/// A `u32` stored as big-endian bytes.
///
/// Alignment 1, so it can sit anywhere in a packed record.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct U32BE([u8; 4]);
impl U32BE {
  /// Convert to a native `u32`.
  #[inline]
  #[must_use]
  pub const fn to_u32(self) -> u32 {
    u32::from_be_bytes(self.0)
  }
  /// Make a value from a native `u32`.
  #[inline]
  #[must_use]
  pub const fn from_u32(u: u32) -> Self {
    Self(u.to_be_bytes())
  }
}
impl core::fmt::Debug for U32BE {
  #[inline]
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_tuple("U32BE").field(&self.to_u32()).finish()
  }
}

unsafe impl Zeroable for U16BE {}
unsafe impl Zeroable for U32BE {}
unsafe impl Pod for U16BE {}
unsafe impl Pod for U32BE {}
