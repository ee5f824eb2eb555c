//! Helpers for finished sfnt binaries.

use write_fonts::{
    read::{tables::compute_checksum, FontRef, TableProvider},
    types::Tag,
};

use crate::Error;

/// The sum every table, and the font as a whole, should have after the
/// `head` checksum adjustment is applied.
pub const CHECKSUM_MAGIC: u32 = 0xB1B0AFBA;

/// One table of a compiled font.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TableEntry<'a> {
    pub tag: Tag,
    pub checksum: u32,
    pub data: &'a [u8],
}

/// A compiled font, split into its tables.
#[derive(Clone, Debug)]
pub struct Sfnt<'a> {
    pub flavor: u32,
    /// In table directory order, i.e. sorted by tag.
    pub tables: Vec<TableEntry<'a>>,
}

impl<'a> Sfnt<'a> {
    pub fn parse(font: &'a [u8]) -> Result<Self, Error> {
        let read = FontRef::new(font).map_err(|source| Error::TableRead {
            table: "sfnt",
            source,
        })?;
        let tables = read
            .table_directory
            .table_records()
            .iter()
            .map(|record| {
                let data = read.data_for_tag(record.tag()).ok_or(Error::TableRead {
                    table: "sfnt",
                    source: write_fonts::read::ReadError::OutOfBounds,
                })?;
                Ok(TableEntry {
                    tag: record.tag(),
                    checksum: record.checksum(),
                    data: data.as_bytes(),
                })
            })
            .collect::<Result<_, Error>>()?;
        Ok(Sfnt {
            flavor: read.table_directory.sfnt_version(),
            tables,
        })
    }

    /// The size of the font with every table padded to four bytes.
    pub fn padded_size(&self) -> usize {
        12 + 16 * self.tables.len()
            + self
                .tables
                .iter()
                .map(|table| pad4(table.data.len()))
                .sum::<usize>()
    }
}

/// Round up to a multiple of four.
pub fn pad4(len: usize) -> usize {
    (len + 3) & !3
}

/// Sum of the big-endian u32 words of `data`, zero padded.
pub fn checksum(data: &[u8]) -> u32 {
    compute_checksum(data)
}
