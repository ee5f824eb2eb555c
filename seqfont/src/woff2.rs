//! WOFF2 encoding with null transforms.
//!
//! Table data is stored as-is, concatenated into a single brotli stream.
//! See <https://www.w3.org/TR/WOFF2/>

use std::io::Write;

use brotlic::CompressorWriter;
use write_fonts::types::Tag;

use crate::{
    sfnt::{pad4, Sfnt, TableEntry},
    Error,
};

pub const SIGNATURE: u32 = 0x774F_4632; // 'wOF2'
pub const HEADER_LEN: usize = 48;

const GLYF: Tag = Tag::new(b"glyf");
const LOCA: Tag = Tag::new(b"loca");

/// Flag value meaning the tag is written out after the flags byte.
const ARBITRARY_TAG: u8 = 0x3F;
/// Transform version of the null transform for `glyf` and `loca`.
const GLYF_NULL_TRANSFORM: u8 = 3;

/// Tags with a one byte encoding, indexed by their flag value.
#[rustfmt::skip]
static KNOWN_TAGS: [&[u8; 4]; 63] = [
    b"cmap", b"head", b"hhea", b"hmtx", b"maxp", b"name", b"OS/2", b"post",
    b"cvt ", b"fpgm", b"glyf", b"loca", b"prep", b"CFF ", b"VORG", b"EBDT",
    b"EBLC", b"gasp", b"hdmx", b"kern", b"LTSH", b"PCLT", b"VDMX", b"vhea",
    b"vmtx", b"BASE", b"GDEF", b"GPOS", b"GSUB", b"EBSC", b"JSTF", b"MATH",
    b"CBDT", b"CBLC", b"COLR", b"CPAL", b"SVG ", b"sbix", b"acnt", b"avar",
    b"bdat", b"bloc", b"bsln", b"cvar", b"fdsc", b"feat", b"fmtx", b"fvar",
    b"gvar", b"hsty", b"just", b"lcar", b"mort", b"morx", b"opbd", b"prop",
    b"trak", b"Zapf", b"Silf", b"Glat", b"Gloc", b"Feat", b"Sill",
];

fn known_tag_index(tag: Tag) -> Option<u8> {
    let bytes = tag.to_be_bytes();
    KNOWN_TAGS
        .iter()
        .position(|known| **known == bytes)
        .map(|idx| idx as u8)
}

/// Append `value` as a UIntBase128: big-endian groups of seven bits, the high
/// bit set on every byte but the last.
pub fn write_base128(out: &mut Vec<u8>, value: u32) {
    let mut bytes = [0u8; 5];
    let mut len = 0;
    let mut rest = value;
    loop {
        bytes[len] = (rest & 0x7F) as u8;
        len += 1;
        rest >>= 7;
        if rest == 0 {
            break;
        }
    }
    for (i, byte) in bytes[..len].iter().rev().enumerate() {
        let more = if i + 1 < len { 0x80 } else { 0 };
        out.push(byte | more);
    }
}

/// Tables in the order they are stored: directory order, except that `loca`
/// immediately follows `glyf`.
fn storage_order<'a>(sfnt: &Sfnt<'a>) -> Vec<TableEntry<'a>> {
    let mut tables = sfnt
        .tables
        .iter()
        .filter(|table| table.tag != LOCA)
        .copied()
        .collect::<Vec<_>>();
    if let Some(loca) = sfnt.tables.iter().find(|table| table.tag == LOCA) {
        let pos = tables
            .iter()
            .position(|table| table.tag == GLYF)
            .map(|glyf| glyf + 1)
            .unwrap_or(tables.len());
        tables.insert(pos, *loca);
    }
    tables
}

fn directory_entry(out: &mut Vec<u8>, table: &TableEntry) {
    let transform = if table.tag == GLYF || table.tag == LOCA {
        GLYF_NULL_TRANSFORM
    } else {
        0
    };
    match known_tag_index(table.tag) {
        Some(idx) => out.push(idx | (transform << 6)),
        None => {
            out.push(ARBITRARY_TAG | (transform << 6));
            out.extend_from_slice(&table.tag.to_be_bytes());
        }
    }
    // null transforms have no transformLength
    write_base128(out, table.data.len() as u32);
}

/// Wrap a compiled font in a WOFF2 container.
pub fn encode(font: &[u8]) -> Result<Vec<u8>, Error> {
    let sfnt = Sfnt::parse(font)?;
    let tables = storage_order(&sfnt);

    let mut directory = Vec::new();
    let mut stream = Vec::with_capacity(font.len());
    for table in &tables {
        directory_entry(&mut directory, table);
        stream.extend_from_slice(table.data);
    }
    let compressed = brotli(&stream)?;

    let total_len = pad4(HEADER_LEN + directory.len() + compressed.len());
    let mut out = Vec::with_capacity(total_len);
    out.extend_from_slice(&SIGNATURE.to_be_bytes());
    out.extend_from_slice(&sfnt.flavor.to_be_bytes());
    out.extend_from_slice(&(total_len as u32).to_be_bytes());
    out.extend_from_slice(&(tables.len() as u16).to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes());
    out.extend_from_slice(&(sfnt.padded_size() as u32).to_be_bytes());
    out.extend_from_slice(&(compressed.len() as u32).to_be_bytes());
    out.extend_from_slice(&1u16.to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes());
    // no metadata or private blocks
    out.extend_from_slice(&[0u8; 20]);
    out.extend_from_slice(&directory);
    out.extend_from_slice(&compressed);
    out.resize(total_len, 0);
    log::debug!("woff2: {} bytes from {}", out.len(), font.len());
    Ok(out)
}

fn brotli(data: &[u8]) -> Result<Vec<u8>, Error> {
    let mut compressor = CompressorWriter::new(Vec::new());
    compressor.write_all(data).map_err(Error::Compress)?;
    compressor
        .into_inner()
        .map_err(|e| Error::Compress(std::io::Error::other(e.to_string())))
}
