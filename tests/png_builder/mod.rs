//! Builds minimal PNG byte streams for the tests, independently of the
//! crate's own CRC and framing code.

/// Bitwise CRC-32, reflected, polynomial `0xEDB88320`.
fn crc32(bytes: &[u8]) -> u32 {
  let mut crc = u32::MAX;
  for &b in bytes {
    crc ^= u32::from(b);
    for _ in 0..8 {
      let mask = (crc & 1).wrapping_neg();
      crc = (crc >> 1) ^ (0xEDB8_8320 & mask);
    }
  }
  crc ^ u32::MAX
}

/// One whole chunk: length, tag, payload, CRC.
pub fn chunk(ty: &[u8; 4], payload: &[u8]) -> Vec<u8> {
  let mut out = Vec::new();
  out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
  out.extend_from_slice(ty);
  out.extend_from_slice(payload);
  let mut tagged = ty.to_vec();
  tagged.extend_from_slice(payload);
  out.extend_from_slice(&crc32(&tagged).to_be_bytes());
  out
}

pub fn ihdr(width: u32, height: u32, bit_depth: u8, color_type: u8, interlace: u8) -> Vec<u8> {
  let mut payload = Vec::new();
  payload.extend_from_slice(&width.to_be_bytes());
  payload.extend_from_slice(&height.to_be_bytes());
  payload.extend_from_slice(&[bit_depth, color_type, 0, 0, interlace]);
  chunk(b"IHDR", &payload)
}

pub fn iend() -> Vec<u8> {
  chunk(b"IEND", &[])
}

pub fn zlib(raw: &[u8]) -> Vec<u8> {
  miniz_oxide::deflate::compress_to_vec_zlib(raw, 6)
}

/// Zlib-compress already-filtered rows (each row starts with its selector).
pub fn filtered(rows: &[&[u8]]) -> Vec<u8> {
  zlib(&rows.concat())
}

pub fn idat(zlib_bytes: &[u8]) -> Vec<u8> {
  chunk(b"IDAT", zlib_bytes)
}

pub fn build_png(chunks: &[Vec<u8>]) -> Vec<u8> {
  let mut out = unpng::SIGNATURE.to_vec();
  for c in chunks {
    out.extend_from_slice(c);
  }
  out
}
