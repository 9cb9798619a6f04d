//! Reverses the per-row byte filters.
//!
//! From the PNG spec:
//!
//! > Filters are applied to **bytes**, not to pixels, regardless of the bit
//! > depth or color type of the image.
//!
//! A row buffer here is laid out as `filter_stride - 1` zero bytes, the
//! filter selector byte, then the sample bytes. The zero prefix makes the
//! `x - filter_stride` predictor reference uniform across the row: the first
//! pixel's "left neighbor" reads zeros, no special casing.

use crate::error::{PngError, PngResult};

/// Reconstruct one row in place.
///
/// `previous` is the already-reconstructed row above, in the same layout
/// (all zeros for the first row of an image or pass). The selector byte is
/// zeroed once reconstruction is done, so when the caller swaps the two row
/// buffers the prefix invariant holds for the next row.
pub(crate) fn unfilter_row(
  previous: &[u8], current: &mut [u8], filter_stride: usize,
) -> PngResult<()> {
  debug_assert_eq!(previous.len(), current.len());
  debug_assert!(filter_stride >= 1 && filter_stride <= 8);
  let s = filter_stride;
  let selector = core::mem::replace(&mut current[s - 1], 0);
  match selector {
    0 => (),
    1 => {
      // Sub
      for x in s..current.len() {
        current[x] = current[x].wrapping_add(current[x - s]);
      }
    }
    2 => {
      // Up
      for x in s..current.len() {
        current[x] = current[x].wrapping_add(previous[x]);
      }
    }
    3 => {
      // Average, computed in more than 8 bits before truncating
      for x in s..current.len() {
        let a = current[x - s] as u16;
        let b = previous[x] as u16;
        current[x] = current[x].wrapping_add(((a + b) / 2) as u8);
      }
    }
    4 => {
      // Paeth
      for x in s..current.len() {
        let p = paeth_predict(current[x - s], previous[x], previous[x - s]);
        current[x] = current[x].wrapping_add(p);
      }
    }
    _ => return Err(PngError::InvalidData),
  }
  Ok(())
}

/// The Paeth predictor picks whichever of the left / above / upper-left
/// neighbors is closest to their linear combination `a + b - c`.
///
/// The spec requires the math to be exact and the tie-breaking tests to run
/// in exactly this order, so everything is widened to `i32` first.
const fn paeth_predict(a: u8, b: u8, c: u8) -> u8 {
  let a_ = a as i32;
  let b_ = b as i32;
  let c_ = c as i32;
  let p = a_ + b_ - c_;
  let pa = (p - a_).abs();
  let pb = (p - b_).abs();
  let pc = (p - c_).abs();
  if pa <= pb && pa <= pc {
    a
  } else if pb <= pc {
    b
  } else {
    c
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn paeth_edges() {
    assert_eq!(paeth_predict(0, 0, 0), 0);
    // ties prefer a, then b
    assert_eq!(paeth_predict(5, 5, 5), 5);
    assert_eq!(paeth_predict(0, 1, 0), 1);
    assert_eq!(paeth_predict(255, 0, 128), 255);
  }

  /// Runs the selectors in sequence against a fixed previous row; each
  /// reconstruction feeds the next as the current row.
  #[test]
  fn selector_sequence() {
    let previous = [0_u8, 1, 2, 3];
    let mut row = [0_u8, 5, 6, 7];
    let mut step = |selector: u8, row: &mut [u8; 4], expected: [u8; 4]| {
      row[0] = selector;
      unfilter_row(&previous, row, 1).unwrap();
      assert_eq!(*row, expected, "selector {selector}");
    };
    step(0, &mut row, [0, 5, 6, 7]);
    let mut row = [0_u8, 5, 6, 7];
    step(1, &mut row, [0, 5, 11, 18]);
    step(2, &mut row, [0, 6, 13, 21]);
    step(3, &mut row, [0, 6, 17, 31]);
    step(4, &mut row, [0, 7, 24, 55]);
  }

  #[test]
  fn sub_respects_filter_stride() {
    // two-byte pixels: the left reference skips over the neighboring byte
    let previous = [0_u8; 7];
    let mut row = [0_u8, 1, 10, 20, 1, 2, 3];
    unfilter_row(&previous, &mut row, 2).unwrap();
    assert_eq!(row, [0, 0, 10, 20, 11, 22, 14]);
  }

  #[test]
  fn wrapping_arithmetic() {
    let previous = [0_u8, 200, 0];
    let mut row = [2_u8, 100, 0];
    unfilter_row(&previous, &mut row, 1).unwrap();
    assert_eq!(row[1], 44);
  }

  #[test]
  fn selector_out_of_range() {
    let previous = [0_u8; 3];
    let mut row = [5_u8, 1, 2];
    assert_eq!(unfilter_row(&previous, &mut row, 1), Err(PngError::InvalidData));
  }
}
