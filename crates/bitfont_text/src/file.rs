//! Binary font file format
//!
//! Layout before compression (little endian):
//!
//! ```text
//! magic        12 bytes  "BITFONT v3.0"
//! height       i64
//! weight       i64
//! tracking     i64
//! fixed_width  i64
//! italic       u8
//! symbolic     u8
//! name_len     u16
//! facename     name_len bytes (UTF-8)
//! 256 x glyph:
//!   width      u16
//!   span_bytes u16       twice the span count
//!   spans      span_bytes bytes of [intensity, run]
//!   kerning    256 x i16
//! ```
//!
//! The whole payload, magic included, is passed through a
//! [`CompressionCodec`] before it is written.

use crate::codec::{span_total, spans_from_bytes, spans_to_bytes, Span};
use crate::compression::CompressionCodec;
use crate::font::{GLYPH_COUNT, KERN_UNSET};
use crate::params::MAX_LINE_HEIGHT;
use crate::{Result, TextError};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Cursor, Read};

/// File signature
pub const MAGIC: &[u8; 12] = b"BITFONT v3.0";

/// Font-wide fields stored in a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontHeader {
    pub facename: String,
    pub height: u32,
    pub weight: u16,
    pub tracking: i32,
    pub fixed_width: u32,
    pub italic: bool,
    pub symbolic: bool,
}

/// One glyph slot as stored in a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphRecord {
    pub width: u16,
    pub spans: Vec<Span>,
    /// Adjustment against every following code; [`KERN_UNSET`] if never computed
    pub kerning: Vec<i16>,
}

impl GlyphRecord {
    pub fn empty() -> Self {
        Self {
            width: 0,
            spans: Vec::new(),
            kerning: vec![KERN_UNSET; GLYPH_COUNT],
        }
    }
}

/// Decoded contents of a font file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontImage {
    pub header: FontHeader,
    pub glyphs: Vec<GlyphRecord>,
}

/// Serialize and compress a font image
pub fn encode(image: &FontImage, codec: &dyn CompressionCodec) -> Result<Vec<u8>> {
    codec.compress(&write_payload(image)?)
}

/// Decompress and parse a font file
pub fn decode(bytes: &[u8], codec: &dyn CompressionCodec) -> Result<FontImage> {
    read_payload(&codec.decompress(bytes)?)
}

fn corrupt(what: impl Into<String>) -> TextError {
    TextError::CorruptFont(what.into())
}

/// Serialize without compression
pub fn write_payload(image: &FontImage) -> Result<Vec<u8>> {
    let header = &image.header;
    if image.glyphs.len() != GLYPH_COUNT {
        return Err(corrupt(format!(
            "expected {} glyphs, found {}",
            GLYPH_COUNT,
            image.glyphs.len()
        )));
    }
    let name = header.facename.as_bytes();
    let name_len = u16::try_from(name.len()).map_err(|_| corrupt("facename too long"))?;

    let mut out = Vec::with_capacity(4096);
    out.extend_from_slice(MAGIC);
    out.write_i64::<LittleEndian>(header.height as i64)?;
    out.write_i64::<LittleEndian>(header.weight as i64)?;
    out.write_i64::<LittleEndian>(header.tracking as i64)?;
    out.write_i64::<LittleEndian>(header.fixed_width as i64)?;
    out.write_u8(header.italic as u8)?;
    out.write_u8(header.symbolic as u8)?;
    out.write_u16::<LittleEndian>(name_len)?;
    out.extend_from_slice(name);

    for (code, glyph) in image.glyphs.iter().enumerate() {
        let span_bytes = spans_to_bytes(&glyph.spans);
        let byte_count = u16::try_from(span_bytes.len()).map_err(|_| TextError::GlyphTooLarge {
            code: code as u8,
            bytes: span_bytes.len(),
        })?;

        out.write_u16::<LittleEndian>(glyph.width)?;
        out.write_u16::<LittleEndian>(byte_count)?;
        out.extend_from_slice(&span_bytes);
        for i in 0..GLYPH_COUNT {
            let value = glyph.kerning.get(i).copied().unwrap_or(KERN_UNSET);
            out.write_i16::<LittleEndian>(value)?;
        }
    }

    Ok(out)
}

fn read_field<T: TryFrom<i64>>(reader: &mut Cursor<&[u8]>, name: &str) -> Result<T> {
    let value = reader.read_i64::<LittleEndian>()?;
    T::try_from(value).map_err(|_| corrupt(format!("{name} out of range: {value}")))
}

/// Parse an uncompressed payload, validating every glyph
pub fn read_payload(bytes: &[u8]) -> Result<FontImage> {
    if bytes.len() < MAGIC.len() || &bytes[..MAGIC.len()] != MAGIC {
        return Err(TextError::BadMagic);
    }

    let mut reader = Cursor::new(bytes);
    reader.set_position(MAGIC.len() as u64);

    let height: u32 = read_field(&mut reader, "height")?;
    if height == 0 || height > MAX_LINE_HEIGHT {
        return Err(corrupt(format!("invalid line height {height}")));
    }
    let weight = read_field(&mut reader, "weight")?;
    let tracking = read_field(&mut reader, "tracking")?;
    let fixed_width = read_field(&mut reader, "fixed width")?;
    let italic = reader.read_u8()? != 0;
    let symbolic = reader.read_u8()? != 0;

    let name_len = reader.read_u16::<LittleEndian>()? as usize;
    let mut name = vec![0; name_len];
    reader.read_exact(&mut name)?;
    let facename = String::from_utf8(name).map_err(|_| corrupt("facename is not UTF-8"))?;

    let mut glyphs = Vec::with_capacity(GLYPH_COUNT);
    for code in 0..GLYPH_COUNT {
        let width = reader.read_u16::<LittleEndian>()?;
        let byte_count = reader.read_u16::<LittleEndian>()? as usize;
        let mut raw = vec![0; byte_count];
        reader.read_exact(&mut raw)?;
        let spans = spans_from_bytes(&raw)?;

        let expected = width as usize * height as usize;
        let total = span_total(&spans);
        if total != expected {
            return Err(corrupt(format!(
                "glyph {code} covers {total} pixels, expected {expected}"
            )));
        }

        let mut kerning = vec![0i16; GLYPH_COUNT];
        reader.read_i16_into::<LittleEndian>(&mut kerning)?;

        glyphs.push(GlyphRecord {
            width,
            spans,
            kerning,
        });
    }

    Ok(FontImage {
        header: FontHeader {
            facename,
            height,
            weight,
            tracking,
            fixed_width,
            italic,
            symbolic,
        },
        glyphs,
    })
}
