//! The naming table of the output font.

use rand::Rng;
use write_fonts::{
    read::tables::name::{Encoding, MacRomanMapping, Name as ReadName},
    tables::name::{Name, NameRecord},
    types::NameId,
};

const WINDOWS: (u16, u16, u16) = (3, 1, 0x409);
const MAC: (u16, u16, u16) = (1, 0, 0);

pub const STYLE: &str = "Regular";
pub const VERSION: &str = "Version 1.0";

/// The strings written for name ids 1 through 6.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FontNames {
    pub family: String,
    pub style: String,
    pub unique_id: String,
    pub full_name: String,
    pub version: String,
    pub postscript_name: String,
}

impl FontNames {
    /// Names for a `Regular` font of the given family.
    ///
    /// The unique id ends with six hex digits drawn from `rng`.
    pub fn new(family: &str, rng: &mut impl Rng) -> Self {
        let suffix = rng.gen::<u32>() & 0xFF_FFFF;
        FontNames {
            family: family.to_owned(),
            style: STYLE.to_owned(),
            unique_id: format!("{family}-{STYLE}-{suffix:06x}"),
            full_name: format!("{family} {STYLE}"),
            version: VERSION.to_owned(),
            postscript_name: format!("{family}-{STYLE}"),
        }
    }

    fn entries(&self) -> [(NameId, &str); 6] {
        [
            (NameId::FAMILY_NAME, &self.family),
            (NameId::SUBFAMILY_NAME, &self.style),
            (NameId::UNIQUE_ID, &self.unique_id),
            (NameId::FULL_NAME, &self.full_name),
            (NameId::VERSION_STRING, &self.version),
            (NameId::POSTSCRIPT_NAME, &self.postscript_name),
        ]
    }
}

fn record((platform, encoding, language): (u16, u16, u16), id: NameId, string: &str) -> NameRecord {
    NameRecord::new(platform, encoding, language, id, string.to_owned().into())
}

fn is_mac_roman(s: &str) -> bool {
    s.chars().all(|c| MacRomanMapping.encode(c).is_some())
}

/// Returns `true` if the string can be stored under this platform and encoding.
fn is_encodable(platform: u16, encoding: u16, s: &str) -> bool {
    match Encoding::new(platform, encoding) {
        Encoding::Utf16Be => true,
        Encoding::MacRoman => is_mac_roman(s),
        Encoding::Unknown => false,
    }
}

/// The copyright records of the source font, with their strings decoded.
///
/// Records in encodings that cannot be re-encoded are dropped.
pub fn copyright_records(source: &ReadName) -> Vec<NameRecord> {
    let data = source.string_data();
    source
        .name_record()
        .iter()
        .filter(|rec| rec.name_id() == NameId::COPYRIGHT_NOTICE)
        .filter_map(|rec| {
            let string = rec.string(data).ok()?.chars().collect::<String>();
            let (platform, encoding) = (rec.platform_id(), rec.encoding_id());
            if !is_encodable(platform, encoding, &string) {
                log::warn!(
                    "dropping copyright record ({platform}, {encoding}) in unsupported encoding"
                );
                return None;
            }
            Some(record(
                (platform, encoding, rec.language_id()),
                NameId::COPYRIGHT_NOTICE,
                &string,
            ))
        })
        .collect()
}

/// Build the name table: the given names under the Windows and Mac platforms,
/// plus `copyright`.
///
/// A string that has no Mac Roman encoding is written only once, as Unicode.
pub fn build_name(names: &FontNames, copyright: Vec<NameRecord>) -> Name {
    let mut records = copyright;
    for (id, string) in names.entries() {
        records.push(record(WINDOWS, id, string));
        if is_mac_roman(string) {
            records.push(record(MAC, id, string));
        } else {
            log::warn!(
                "name {id} '{string}' is not representable in Mac Roman, writing Unicode only"
            );
        }
    }
    records.sort();
    records.dedup_by(|a, b| {
        (a.platform_id, a.encoding_id, a.language_id, a.name_id)
            == (b.platform_id, b.encoding_id, b.language_id, b.name_id)
    });
    let mut name = Name::default();
    name.name_record = records;
    name
}
