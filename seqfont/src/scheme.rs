//! Loading color schemes and assigning color slots.
//!
//! A scheme file is a JSON object mapping scheme names to objects that map
//! single letters to `#RRGGBBAA` colors:
//!
//! ```json
//! {
//!     "clustal2": { "A": "#80A0F0FF", "R": "#F01505FF" },
//!     "zappo": { "A": "#FFAFAFFF" }
//! }
//! ```
//!
//! Every letter mentioned by any scheme gets a color slot: its index in the
//! sorted, upper-cased set of all letters. Slots are shared by every palette,
//! so slot `i` always means "the color of letter `i`".

use std::{collections::BTreeSet, path::Path};

use indexmap::IndexMap;

use crate::{color::Rgba, Error};

/// A single scheme: letter to color, in file order.
pub type Scheme = IndexMap<char, Rgba>;

/// All schemes of a build, along with the derived letter universe.
#[derive(Clone, Debug)]
pub struct SchemeSet {
    // in file order
    schemes: IndexMap<String, Scheme>,
    // base first, then the rest sorted by name
    order: Vec<String>,
    letters: Vec<char>,
}

impl SchemeSet {
    /// Read and parse the scheme file at `path`.
    pub fn load(path: impl AsRef<Path>, base: &str) -> Result<Self, Error> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_owned(),
            source,
        })?;
        Self::from_json(&text, base)
    }

    /// Parse a scheme file, with `base` as the first scheme in presentation order.
    pub fn from_json(text: &str, base: &str) -> Result<Self, Error> {
        let raw: IndexMap<String, IndexMap<String, String>> = serde_json::from_str(text)?;
        let mut schemes = IndexMap::with_capacity(raw.len());
        for (name, entries) in raw {
            let scheme = parse_scheme(&name, entries)?;
            schemes.insert(name, scheme);
        }
        Self::new(schemes, base)
    }

    /// Create a scheme set from already parsed schemes.
    ///
    /// Letters are upper-cased; if a scheme mentions both cases of a letter
    /// the later entry wins.
    pub fn new(schemes: IndexMap<String, Scheme>, base: &str) -> Result<Self, Error> {
        if !schemes.contains_key(base) {
            return Err(Error::MissingBaseScheme(base.to_owned()));
        }
        let schemes: IndexMap<_, _> = schemes
            .into_iter()
            .map(|(name, scheme)| {
                let scheme = scheme
                    .into_iter()
                    .map(|(letter, color)| (to_upper(letter), color))
                    .collect::<Scheme>();
                (name, scheme)
            })
            .collect();

        let mut rest = schemes
            .keys()
            .filter(|name| *name != base)
            .cloned()
            .collect::<Vec<_>>();
        rest.sort();
        let order = std::iter::once(base.to_owned()).chain(rest).collect();

        let letters = schemes
            .values()
            .flat_map(|scheme| scheme.keys().copied())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        Ok(SchemeSet {
            schemes,
            order,
            letters,
        })
    }

    /// Scheme names in presentation order: the base scheme, then the others
    /// sorted by name.
    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// The name of the base scheme.
    pub fn base(&self) -> &str {
        &self.order[0]
    }

    /// The sorted, upper-case letter universe; a letter's position is its slot.
    pub fn letters(&self) -> &[char] {
        &self.letters
    }

    /// The color slot of a letter, in either case.
    pub fn slot(&self, letter: char) -> Option<u16> {
        self.letters
            .binary_search(&to_upper(letter))
            .ok()
            .map(|idx| idx as u16)
    }

    /// The scheme with this name.
    pub fn get(&self, name: &str) -> Option<&Scheme> {
        self.schemes.get(name)
    }

    /// Schemes in the order they appear in the scheme file.
    pub fn iter_file_order(&self) -> impl Iterator<Item = (&str, &Scheme)> + '_ {
        self.schemes
            .iter()
            .map(|(name, scheme)| (name.as_str(), scheme))
    }

    /// The color of `letter` under `scheme`, or `fallback` if the scheme does
    /// not mention the letter.
    pub fn color(&self, scheme: &str, letter: char, fallback: Rgba) -> Rgba {
        self.schemes
            .get(scheme)
            .and_then(|entries| entries.get(&to_upper(letter)))
            .copied()
            .unwrap_or(fallback)
    }

    /// One row per scheme in presentation order, one color per slot.
    pub fn palettes(&self, fallback: Rgba) -> Vec<Vec<Rgba>> {
        self.order
            .iter()
            .map(|name| {
                self.letters
                    .iter()
                    .map(|letter| self.color(name, *letter, fallback))
                    .collect()
            })
            .collect()
    }
}

fn parse_scheme(name: &str, entries: IndexMap<String, String>) -> Result<Scheme, Error> {
    entries
        .into_iter()
        .map(|(key, color)| {
            let mut chars = key.chars();
            let letter = match (chars.next(), chars.next()) {
                (Some(letter), None) => letter,
                _ => {
                    return Err(Error::InvalidLetter {
                        scheme: name.to_owned(),
                        key,
                    })
                }
            };
            let color = color.parse().map_err(|source| Error::InvalidColor {
                scheme: name.to_owned(),
                letter,
                source,
            })?;
            Ok((letter, color))
        })
        .collect()
}

/// Upper-case a letter, keeping it as is if the upper case form is not a
/// single character (e.g. 'ß').
pub(crate) fn to_upper(letter: char) -> char {
    let mut upper = letter.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(up), None) => up,
        _ => letter,
    }
}

/// Lower-case counterpart of [`to_upper`].
pub(crate) fn to_lower(letter: char) -> char {
    let mut lower = letter.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(low), None) => low,
        _ => letter,
    }
}
