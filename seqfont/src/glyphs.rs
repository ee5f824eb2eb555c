//! Collecting the glyphs of the output font.
//!
//! The [`GlyphSetBuilder`] is the state shared by every stage between loading the
//! schemes and assembling the font: glyph order, outlines, metrics, the
//! layer table and the character mappings.

use std::collections::HashSet;

use indexmap::IndexMap;
use kurbo::BezPath;

use crate::{
    scheme::{to_lower, SchemeSet},
    source::{GlyphSource, HMetric, SourceOutline},
    Error,
};

pub const NOTDEF: &str = ".notdef";
pub const SPACE: &str = "space";
pub const LAYER_SUFFIX: &str = ".layer";

/// Characters that are copied as plain, single-color glyphs.
pub const PLAIN_CHARS: &str = "0123456789-.|+";

/// The character whose advance is used for the placeholder glyphs.
pub const REFERENCE_CHAR: char = 'A';

/// A glyph in the output font.
#[derive(Clone, Debug, PartialEq)]
pub struct GlyphEntry {
    pub outline: SourceOutline,
    pub metric: HMetric,
}

impl GlyphEntry {
    fn empty(metric: HMetric) -> Self {
        GlyphEntry {
            outline: SourceOutline::Path(BezPath::new()),
            metric,
        }
    }
}

/// One layer of a color glyph: the glyph drawn and its color slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayerRef {
    pub glyph: String,
    pub slot: u16,
}

/// The glyphs of the font being built, in glyph order.
#[derive(Clone, Debug)]
pub struct GlyphSetBuilder {
    glyphs: IndexMap<String, GlyphEntry>,
    layers: IndexMap<String, Vec<LayerRef>>,
    mappings: IndexMap<char, String>,
    default_metric: HMetric,
}

impl GlyphSetBuilder {
    /// Start a glyph set with the `.notdef` and `space` placeholders.
    ///
    /// Both take the advance of the source 'A' and map nothing but the space
    /// characters; a source without an 'A' is an error.
    pub fn new(source: &impl GlyphSource) -> Result<Self, Error> {
        let advance = source
            .glyph_for_char(REFERENCE_CHAR)
            .and_then(|glyph| source.metric(glyph))
            .ok_or(Error::MissingReferenceGlyph(REFERENCE_CHAR))?
            .advance;
        let default_metric = HMetric::new(advance, 0);

        let mut glyphs = IndexMap::new();
        glyphs.insert(NOTDEF.to_owned(), GlyphEntry::empty(default_metric));
        glyphs.insert(SPACE.to_owned(), GlyphEntry::empty(default_metric));
        let mut mappings = IndexMap::new();
        mappings.insert(' ', SPACE.to_owned());
        mappings.insert('\u{A0}', SPACE.to_owned());

        Ok(GlyphSetBuilder {
            glyphs,
            layers: IndexMap::new(),
            mappings,
            default_metric,
        })
    }

    /// Add a base glyph and a color layer for both cases of every letter.
    ///
    /// Cases missing from the source character map are skipped.
    pub fn add_letters(
        &mut self,
        source: &impl GlyphSource,
        schemes: &SchemeSet,
    ) -> Result<(), Error> {
        for &letter in schemes.letters() {
            let Some(slot) = schemes.slot(letter) else {
                continue;
            };
            let lower = to_lower(letter);
            let cases = if lower == letter {
                &[letter][..]
            } else {
                &[letter, lower][..]
            };
            for &ch in cases {
                self.add_letter(source, ch, slot)?;
            }
        }
        Ok(())
    }

    fn add_letter(&mut self, source: &impl GlyphSource, ch: char, slot: u16) -> Result<(), Error> {
        let Some(source_glyph) = source.glyph_for_char(ch) else {
            log::debug!("'{ch}' is not in the source character map, skipping");
            return Ok(());
        };
        let base = ch.to_string();
        if self.glyphs.contains_key(&base) {
            log::warn!("glyph '{base}' already exists, not adding a color layer for '{ch}'");
            return Ok(());
        }
        let layer = format!("{base}{LAYER_SUFFIX}");
        let metric = source.metric(source_glyph).unwrap_or(self.default_metric);
        let path = source.flattened(source_glyph)?;
        log::debug!("'{ch}': base '{base}', layer '{layer}' from '{source_glyph}', slot {slot}");

        self.glyphs.insert(base.clone(), GlyphEntry::empty(metric));
        self.glyphs.insert(
            layer.clone(),
            GlyphEntry {
                outline: SourceOutline::Path(path),
                metric,
            },
        );
        self.layers.insert(base.clone(), vec![LayerRef { glyph: layer, slot }]);
        self.mappings.insert(ch, base);
        Ok(())
    }

    /// Copy the glyphs of `chars` under their source names.
    ///
    /// Characters that are missing from the source, or that already have a
    /// glyph in this set, are skipped.
    pub fn add_plain(&mut self, source: &impl GlyphSource, chars: &str) -> Result<(), Error> {
        for ch in chars.chars() {
            if self.mappings.contains_key(&ch) {
                log::debug!("'{ch}' is already mapped, not copying it again");
                continue;
            }
            let Some(source_glyph) = source.glyph_for_char(ch) else {
                log::debug!("'{ch}' is not in the source character map, skipping");
                continue;
            };
            let source_glyph = source_glyph.to_owned();
            self.copy_glyph(source, &source_glyph)?;
            self.mappings.insert(ch, source_glyph);
        }
        Ok(())
    }

    /// Copy a glyph, and every glyph it uses as a component, from the source.
    ///
    /// Glyphs already in the set are left alone, so copying the same glyph
    /// twice is a no-op. Components are visited depth first and appended to
    /// the glyph order after the glyph that uses them.
    pub fn copy_glyph(&mut self, source: &impl GlyphSource, glyph: &str) -> Result<(), Error> {
        let mut visited = HashSet::new();
        let mut stack = vec![glyph.to_owned()];
        while let Some(name) = stack.pop() {
            if !visited.insert(name.clone()) || self.glyphs.contains_key(&name) {
                continue;
            }
            let outline = source.outline(&name)?;
            let metric = source.metric(&name).unwrap_or(self.default_metric);
            // reversed so that the first component is copied first
            let components = outline
                .component_names()
                .map(str::to_owned)
                .collect::<Vec<_>>();
            stack.extend(components.into_iter().rev());
            log::debug!("copied '{name}'");
            self.glyphs.insert(name, GlyphEntry { outline, metric });
        }
        Ok(())
    }

    /// Glyph names in glyph order.
    pub fn glyph_order(&self) -> impl Iterator<Item = &str> + '_ {
        self.glyphs.keys().map(String::as_str)
    }

    /// Glyphs in glyph order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &GlyphEntry)> + '_ {
        self.glyphs.iter().map(|(name, glyph)| (name.as_str(), glyph))
    }

    pub fn get(&self, glyph: &str) -> Option<&GlyphEntry> {
        self.glyphs.get(glyph)
    }

    /// The position of a glyph in glyph order.
    pub fn index_of(&self, glyph: &str) -> Option<usize> {
        self.glyphs.get_index_of(glyph)
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// The layer table: base glyph to the layers drawn over it.
    pub fn layers(&self) -> &IndexMap<String, Vec<LayerRef>> {
        &self.layers
    }

    /// Character to glyph name mappings for the output character map.
    pub fn mappings(&self) -> &IndexMap<char, String> {
        &self.mappings
    }
}
