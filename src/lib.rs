#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

//! A streaming, chunk-driven PNG decoder.
//!
//! * [Portable Network Graphics (PNG) Specification (Third Edition)][png-spec]
//!
//! [png-spec]: https://www.w3.org/TR/png/
//!
//! The decoder walks the chunk sequence of a PNG data stream front to back,
//! checking each CRC and the ordering rules as it goes. The compressed pixel
//! payload is inflated *while* it is read: consecutive `IDAT` chunks are
//! spliced into one logical Zlib stream, and each decompressed row is
//! unfiltered, spread to its destination layout, and (for interlaced images)
//! scattered into place before the next row is touched. The whole encoded
//! stream never needs to sit in memory at once, and neither does the
//! filtered image.
//!
//! ## Decoding
//!
//! ```no_run
//! use unpng::{Options, PngDecoder, Scratch, REQUIRED_TEMP_BYTES};
//!
//! let bytes = std::fs::read("some.png").unwrap();
//! let mut temp = vec![0_u8; REQUIRED_TEMP_BYTES];
//! let mut options = Options::with_defaults(Scratch::new(&mut temp));
//! let mut decoder = PngDecoder::from_memory(&bytes);
//! let pixels = decoder.decode(&mut options).unwrap();
//! println!("{} pixels as {:?}", pixels.len(), pixels.format());
//! ```
//!
//! [`PngDecoder::from_file`] does the same against any `Read + Seek` handle
//! through a fixed 16 KiB window, so a file never needs to be slurped first.
//!
//! ## Memory Design
//!
//! Two pools are in play:
//!
//! * The main allocator holds only the final [`PixelStorage`] and the two
//!   row-sized working buffers (plus one pass row for interlaced images).
//! * Everything else a decode needs temporarily comes from a caller-funded
//!   [`Scratch`] arena handed in through [`Options`]. Fund it with
//!   [`REQUIRED_TEMP_BYTES`] and forget about it.
//!
//! ## Processors
//!
//! [`ChunkProcessor`] values ride along with a decode and can consume
//! ancillary chunks, rewrite the finalized palette, and post-process each
//! decoded row, including widening the output pixel layout (this is how
//! transparency and palette expansion work; both ship as the defaults in
//! [`Options::with_defaults`]). Processors may widen the pixel stride but
//! never shrink it.
//!
//! ## Errors
//!
//! Format violations of any kind decode to [`PngError::InvalidData`], a
//! source that ends too early is [`PngError::EndOfStream`], and there is no
//! partial output: the first error wins. Ancillary chunks are the exception,
//! matching PNG's ignore-what-you-don't-understand stance: a transparency
//! chunk with a nonsense length is skipped, not fatal.

mod adam7;
mod byte_source;
mod chunk;
mod crc32;
mod decoder;
mod error;
mod header;
mod idat;
mod inflate;
mod pixel_formats;
mod pixel_storage;
mod processor;
mod raw;
mod scratch;
mod spread;
mod unfilter;

pub use byte_source::{ByteSource, FileSource, SliceSource};
pub use chunk::{ChunkHeader, ChunkType, CHUNK_HEADER_LEN, SIGNATURE};
pub use decoder::{Options, PngDecoder};
pub use error::{PngError, PngResult};
pub use header::{ColorType, CompressionMethod, FilterMethod, Header, InterlaceMethod};
pub use pixel_formats::*;
pub use pixel_storage::{PixelFormat, PixelStorage};
pub use processor::{
  ChunkContext, ChunkProcessor, PaletteContext, PlteProcessor, RowContext, TrnsProcessor,
};
pub use raw::{U16BE, U32BE};
pub use scratch::{Scratch, REQUIRED_TEMP_BYTES};
