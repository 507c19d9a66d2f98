//! Whole-file compression for font files

use crate::{Result, TextError};
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::{Read, Write};

/// Lossless byte-buffer codec applied to a serialized font
pub trait CompressionCodec: Send + Sync {
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>>;
    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>>;
}

/// zlib stream codec, optionally scrambling the compressed bytes
#[derive(Debug, Clone, Copy)]
pub struct ZlibCodec {
    level: u32,
    scramble: bool,
}

impl ZlibCodec {
    /// Default zlib level
    pub const DEFAULT_LEVEL: u32 = 6;

    pub fn new() -> Self {
        Self {
            level: Self::DEFAULT_LEVEL,
            scramble: false,
        }
    }

    /// Compression level 0-9
    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level.min(9);
        self
    }

    /// XOR the compressed stream with a rolling key so cache files are not
    /// plain zlib
    pub fn scrambled(mut self, scramble: bool) -> Self {
        self.scramble = scramble;
        self
    }

    fn apply_scramble(data: &mut [u8]) {
        let mut key = ((202 + data.len()) % 256) as u8;
        for byte in data.iter_mut() {
            *byte ^= key;
            key = key.wrapping_add(13);
        }
    }
}

impl Default for ZlibCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl CompressionCodec for ZlibCodec {
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::new(self.level));
        encoder
            .write_all(data)
            .map_err(|e| TextError::Compression(e.to_string()))?;
        let mut compressed = encoder
            .finish()
            .map_err(|e| TextError::Compression(e.to_string()))?;

        if self.scramble {
            Self::apply_scramble(&mut compressed);
        }
        Ok(compressed)
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut owned;
        let mut input = data;
        if self.scramble {
            owned = data.to_vec();
            Self::apply_scramble(&mut owned);
            input = &owned;
        }

        let mut decoder = ZlibDecoder::new(input);
        let mut out = Vec::new();
        decoder
            .read_to_end(&mut out)
            .map_err(|e| TextError::Compression(e.to_string()))?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let data: Vec<u8> = (0..4096u32).map(|i| (i % 61) as u8).collect();
        let codec = ZlibCodec::new();
        let compressed = codec.compress(&data).unwrap();
        assert!(compressed.len() < data.len());
        assert_eq!(codec.decompress(&compressed).unwrap(), data);
    }

    #[test]
    fn test_scrambled_round_trip() {
        let data = b"the quick brown fox jumps over the lazy dog".repeat(8);
        let codec = ZlibCodec::new().scrambled(true);
        let compressed = codec.compress(&data).unwrap();
        assert_ne!(compressed, ZlibCodec::new().compress(&data).unwrap());
        assert_eq!(codec.decompress(&compressed).unwrap(), data);
    }

    #[test]
    fn test_levels_trade_size() {
        let data: Vec<u8> = (0..8192u32).map(|i| (i % 7) as u8).collect();
        let stored = ZlibCodec::new().with_level(0).compress(&data).unwrap();
        let best = ZlibCodec::new().with_level(42).compress(&data).unwrap();
        assert!(stored.len() > data.len());
        assert!(best.len() < stored.len());
        // the level only affects the writer
        assert_eq!(ZlibCodec::new().decompress(&stored).unwrap(), data);
        assert_eq!(ZlibCodec::new().decompress(&best).unwrap(), data);
    }

    #[test]
    fn test_garbage_fails_to_decompress() {
        let codec = ZlibCodec::new();
        let result = codec.decompress(&[0x13, 0x37, 0x00, 0xff, 0x42]);
        assert!(matches!(result, Err(TextError::Compression(_))));
    }
}
