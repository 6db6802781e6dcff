//! # carchive Compression Utilities (`common::archive::compression`)
//!
//! File: cli/src/common/archive/compression.rs
//!
//! Gzip helpers on top of `flate2`. Encoders write a fixed header (mtime 0, no
//! embedded file name) so compressing the same input at the same level always
//! produces the same bytes.
//!
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::{Compression, GzBuilder};
use std::io::{Read, Write};

/// First two bytes of every gzip member.
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Level used when no level is configured.
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 6;

/// Highest gzip level accepted by `flate2`.
pub const MAX_COMPRESSION_LEVEL: u32 = 9;

/// True when `head` starts with the gzip magic bytes.
pub fn is_gzip(head: &[u8]) -> bool {
    head.starts_with(&GZIP_MAGIC)
}

/// Gzip encoder with a reproducible header. Levels above 9 are clamped.
pub fn gzip_encoder<W: Write>(inner: W, level: u32) -> GzEncoder<W> {
    GzBuilder::new()
        .mtime(0)
        .write(inner, Compression::new(level.min(MAX_COMPRESSION_LEVEL)))
}

pub fn gzip_decoder<R: Read>(inner: R) -> GzDecoder<R> {
    GzDecoder::new(inner)
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    fn compress(data: &[u8], level: u32) -> Vec<u8> {
        let mut encoder = gzip_encoder(Vec::new(), level);
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_gzip_round_trip_and_magic() {
        let compressed = compress(b"replicas: 3\n", DEFAULT_COMPRESSION_LEVEL);
        assert!(is_gzip(&compressed));
        let mut out = String::new();
        gzip_decoder(compressed.as_slice())
            .read_to_string(&mut out)
            .unwrap();
        assert_eq!(out, "replicas: 3\n");
    }

    #[test]
    fn test_output_is_reproducible() {
        let data = b"the same input compresses to the same bytes".repeat(20);
        assert_eq!(compress(&data, 9), compress(&data, 9));
    }

    #[test]
    fn test_is_gzip_rejects_short_or_plain_input() {
        assert!(!is_gzip(b""));
        assert!(!is_gzip(&[0x1f]));
        assert!(!is_gzip(b"component-descriptor.yaml"));
    }
}
