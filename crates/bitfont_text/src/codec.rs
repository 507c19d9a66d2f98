//! Run-length glyph codec
//!
//! A glyph's coverage mask is stored as `(intensity, run)` spans in raster
//! order, wrapping at the glyph width. Runs are at most [`MAX_RUN`] pixels;
//! longer runs are split into several spans with the same intensity.

use crate::{Result, TextError};

/// Longest run a single span can describe
pub const MAX_RUN: u8 = u8::MAX;

/// One run of identical coverage values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    /// Coverage (alpha) of every pixel in the run
    pub intensity: u8,
    /// Number of pixels, 1..=255
    pub run: u8,
}

impl Span {
    pub const fn new(intensity: u8, run: u8) -> Self {
        Self { intensity, run }
    }
}

/// Encode a row-major coverage mask of `width * height` pixels
pub fn encode(mask: &[u8], width: usize, height: usize) -> Vec<Span> {
    let count = (width * height).min(mask.len());
    let mut spans = Vec::new();

    let mut pixels = mask[..count].iter().copied();
    let Some(first) = pixels.next() else {
        return spans;
    };

    let mut pen = first;
    let mut run: u8 = 1;
    for value in pixels {
        if value != pen || run == MAX_RUN {
            spans.push(Span::new(pen, run));
            pen = value;
            run = 0;
        }
        run += 1;
    }
    spans.push(Span::new(pen, run));

    spans
}

/// Iterate coverage values in raster order
pub fn decode(spans: &[Span]) -> impl Iterator<Item = u8> + '_ {
    spans
        .iter()
        .flat_map(|span| std::iter::repeat(span.intensity).take(span.run as usize))
}

/// Rebuild the full `width * height` mask; missing pixels read as zero
pub fn decode_mask(spans: &[Span], width: usize, height: usize) -> Vec<u8> {
    let count = width * height;
    let mut mask: Vec<u8> = decode(spans).take(count).collect();
    mask.resize(count, 0);
    mask
}

/// Total number of pixels described by a span list
pub fn span_total(spans: &[Span]) -> usize {
    spans.iter().map(|s| s.run as usize).sum()
}

/// On-disk form: `[intensity, run]` byte pairs
pub fn spans_to_bytes(spans: &[Span]) -> Vec<u8> {
    spans.iter().flat_map(|s| [s.intensity, s.run]).collect()
}

pub fn spans_from_bytes(bytes: &[u8]) -> Result<Vec<Span>> {
    if bytes.len() % 2 != 0 {
        return Err(TextError::CorruptFont(format!(
            "span data has odd length {}",
            bytes.len()
        )));
    }

    bytes
        .chunks_exact(2)
        .map(|pair| {
            if pair[1] == 0 {
                return Err(TextError::CorruptFont("zero-length span".to_string()));
            }
            Ok(Span::new(pair[0], pair[1]))
        })
        .collect()
}
