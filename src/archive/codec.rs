//! Reversible zlib compression for message bodies.
//!
//! The store never fails a row over codec trouble: [`compress`] yields an
//! empty sentinel on a write failure and [`decompress`] yields an empty
//! string for bytes it cannot read, so a damaged body degrades to blank text
//! while the row itself survives.

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::{Read, Write};

/// Compress message text with zlib at best compression.
///
/// Returns an empty vec if the encoder fails; callers store the sentinel
/// as-is and [`decompress`] maps it back to an empty string.
pub fn compress(text: &str) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    if encoder.write_all(text.as_bytes()).is_err() {
        return Vec::new();
    }
    encoder.finish().unwrap_or_default()
}

/// Decompress a zlib-compressed message body back to text.
///
/// Returns an empty string if the bytes are not valid zlib or not valid
/// UTF-8.
pub fn decompress(bytes: &[u8]) -> String {
    let mut decoder = ZlibDecoder::new(bytes);
    let mut out = String::new();
    match decoder.read_to_string(&mut out) {
        Ok(_) => out,
        Err(_) => String::new(),
    }
}
