//! WOFF 1.0 encoding.
//!
//! See <https://www.w3.org/TR/WOFF/>

use std::io::Write;

use flate2::{write::ZlibEncoder, Compression};

use crate::{
    sfnt::{pad4, Sfnt},
    Error,
};

pub const SIGNATURE: u32 = 0x774F_4646; // 'wOFF'
pub const HEADER_LEN: usize = 44;
pub const DIRECTORY_ENTRY_LEN: usize = 20;

const MAJOR_VERSION: u16 = 1;
const MINOR_VERSION: u16 = 0;

/// Wrap a compiled font in a WOFF container.
///
/// Each table is zlib compressed and stored compressed only if that makes it
/// smaller. No metadata or private data blocks are written.
pub fn encode(font: &[u8]) -> Result<Vec<u8>, Error> {
    let sfnt = Sfnt::parse(font)?;
    let mut tables = Vec::with_capacity(sfnt.tables.len());
    for table in &sfnt.tables {
        let compressed = zlib(table.data)?;
        let data = if compressed.len() < table.data.len() {
            compressed
        } else {
            table.data.to_vec()
        };
        tables.push(data);
    }

    let mut offset = HEADER_LEN + DIRECTORY_ENTRY_LEN * tables.len();
    let mut directory = Vec::with_capacity(DIRECTORY_ENTRY_LEN * tables.len());
    for (entry, data) in sfnt.tables.iter().zip(&tables) {
        directory.extend_from_slice(&entry.tag.to_be_bytes());
        directory.extend_from_slice(&(offset as u32).to_be_bytes());
        directory.extend_from_slice(&(data.len() as u32).to_be_bytes());
        directory.extend_from_slice(&(entry.data.len() as u32).to_be_bytes());
        directory.extend_from_slice(&entry.checksum.to_be_bytes());
        offset += pad4(data.len());
    }
    let total_len = offset;

    let mut out = Vec::with_capacity(total_len);
    out.extend_from_slice(&SIGNATURE.to_be_bytes());
    out.extend_from_slice(&sfnt.flavor.to_be_bytes());
    out.extend_from_slice(&(total_len as u32).to_be_bytes());
    out.extend_from_slice(&(tables.len() as u16).to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes());
    out.extend_from_slice(&(sfnt.padded_size() as u32).to_be_bytes());
    out.extend_from_slice(&MAJOR_VERSION.to_be_bytes());
    out.extend_from_slice(&MINOR_VERSION.to_be_bytes());
    // metadata and private blocks: offset and lengths all zero
    out.extend_from_slice(&[0u8; 20]);
    out.extend_from_slice(&directory);
    for data in &tables {
        out.extend_from_slice(data);
        out.resize(pad4(out.len()), 0);
    }
    debug_assert_eq!(out.len(), total_len);
    log::debug!("woff: {} bytes from {}", out.len(), font.len());
    Ok(out)
}

fn zlib(data: &[u8]) -> Result<Vec<u8>, Error> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(data).map_err(Error::Compress)?;
    encoder.finish().map_err(Error::Compress)
}

#[cfg(test)]
pub(crate) mod tests {
    use std::io::Read;

    use super::*;
    use flate2::read::ZlibDecoder;
    use write_fonts::{types::Tag, FontBuilder};

    pub(crate) fn test_font() -> Vec<u8> {
        FontBuilder::new()
            .add_raw(Tag::new(b"zero"), vec![0u8; 4000])
            .add_raw(Tag::new(b"tiny"), vec![1u8, 2, 3])
            .add_raw(Tag::new(b"text"), b"sequence ".repeat(50))
            .build()
    }

    fn be32(data: &[u8], pos: usize) -> u32 {
        u32::from_be_bytes(data[pos..pos + 4].try_into().unwrap())
    }

    fn be16(data: &[u8], pos: usize) -> u16 {
        u16::from_be_bytes(data[pos..pos + 2].try_into().unwrap())
    }

    #[test]
    fn header_matches_font() {
        let font = test_font();
        let woff = encode(&font).unwrap();
        let sfnt = Sfnt::parse(&font).unwrap();
        assert_eq!(be32(&woff, 0), SIGNATURE);
        assert_eq!(be32(&woff, 4), sfnt.flavor);
        assert_eq!(be32(&woff, 8) as usize, woff.len());
        assert_eq!(be16(&woff, 12), 3);
        assert_eq!(be16(&woff, 14), 0);
        assert_eq!(be32(&woff, 16) as usize, font.len());
        assert_eq!(woff.len() % 4, 0);
    }

    #[test]
    fn tables_decode() {
        let font = test_font();
        let woff = encode(&font).unwrap();
        let sfnt = Sfnt::parse(&font).unwrap();
        for (i, table) in sfnt.tables.iter().enumerate() {
            let entry = HEADER_LEN + i * DIRECTORY_ENTRY_LEN;
            assert_eq!(be32(&woff, entry), u32::from_be_bytes(table.tag.to_be_bytes()));
            let offset = be32(&woff, entry + 4) as usize;
            let comp_len = be32(&woff, entry + 8) as usize;
            let orig_len = be32(&woff, entry + 12) as usize;
            assert_eq!(offset % 4, 0);
            assert_eq!(orig_len, table.data.len());
            assert_eq!(be32(&woff, entry + 16), table.checksum);
            let stored = &woff[offset..offset + comp_len];
            let decoded = if comp_len < orig_len {
                let mut out = Vec::new();
                ZlibDecoder::new(stored).read_to_end(&mut out).unwrap();
                out
            } else {
                stored.to_vec()
            };
            assert_eq!(decoded, table.data, "{}", table.tag);
        }
    }

    #[test]
    fn incompressible_tables_are_stored() {
        let font = test_font();
        let woff = encode(&font).unwrap();
        let sfnt = Sfnt::parse(&font).unwrap();
        let tiny = sfnt
            .tables
            .iter()
            .position(|t| t.tag == Tag::new(b"tiny"))
            .unwrap();
        let entry = HEADER_LEN + tiny * DIRECTORY_ENTRY_LEN;
        assert_eq!(be32(&woff, entry + 8), 3);
        let zero = sfnt
            .tables
            .iter()
            .position(|t| t.tag == Tag::new(b"zero"))
            .unwrap();
        let entry = HEADER_LEN + zero * DIRECTORY_ENTRY_LEN;
        assert!(be32(&woff, entry + 8) < 4000);
    }
}
