//! Access to the font whose outlines are copied.

use std::collections::HashMap;

use kurbo::BezPath;
use skrifa::{
    outline::{DrawError, DrawSettings},
    prelude::{LocationRef, Size},
    MetadataProvider, OutlineGlyphCollection,
};
use write_fonts::{
    from_obj::FromTableRef,
    read::{
        tables::{
            glyf::{Glyf, Glyph},
            hmtx::Hmtx,
            loca::Loca,
        },
        FontRef, TableProvider,
    },
    tables::glyf::{Anchor, Bbox, ComponentFlags, CompositeGlyph, Transform},
    types::GlyphId,
};

use crate::{
    pen::{to_quadratic, PathPen, CURVE_TOLERANCE},
    Error,
};

/// Horizontal metrics of a single glyph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HMetric {
    pub advance: u16,
    pub side_bearing: i16,
}

impl HMetric {
    pub fn new(advance: u16, side_bearing: i16) -> Self {
        HMetric {
            advance,
            side_bearing,
        }
    }
}

/// A component of a composite glyph, referring to its glyph by name.
#[derive(Clone, Debug, PartialEq)]
pub struct ComponentRef {
    pub glyph: String,
    pub anchor: Anchor,
    pub flags: ComponentFlags,
    pub transform: Transform,
}

/// The outline of a source glyph, ready to be written to `glyf`.
#[derive(Clone, Debug, PartialEq)]
pub enum SourceOutline {
    /// A contour outline, with cubic segments already converted to quadratics.
    Path(BezPath),
    /// A TrueType composite glyph.
    Composite {
        components: Vec<ComponentRef>,
        bbox: Bbox,
    },
}

impl SourceOutline {
    /// The names of the glyphs this outline depends on.
    pub fn component_names(&self) -> impl Iterator<Item = &str> + '_ {
        let components = match self {
            SourceOutline::Path(_) => &[][..],
            SourceOutline::Composite { components, .. } => components.as_slice(),
        };
        components.iter().map(|c| c.glyph.as_str())
    }
}

/// The operations the glyph transcoder needs from a source font.
///
/// Glyphs are addressed by name, like a glyph set in font editing tools.
pub trait GlyphSource {
    /// The name of the glyph the character map assigns to `ch`, if any.
    fn glyph_for_char(&self, ch: char) -> Option<&str>;

    /// The horizontal metrics of the named glyph, if the source has them.
    fn metric(&self, glyph: &str) -> Option<HMetric>;

    /// The outline of the named glyph, with quadratic curves only.
    ///
    /// Composite glyphs are returned as composites.
    fn outline(&self, glyph: &str) -> Result<SourceOutline, Error>;

    /// The outline of the named glyph as a single quadratic path, with any
    /// components drawn in place.
    fn flattened(&self, glyph: &str) -> Result<BezPath, Error>;
}

/// A parsed source font.
///
/// Outlines, the character map and glyph names are read with skrifa; raw
/// tables (for metrics, composites and the tables that are copied to the
/// output) are read through `write_fonts::read`.
pub struct SourceFont<'a> {
    tables: FontRef<'a>,
    charmap: skrifa::charmap::Charmap<'a>,
    outlines: OutlineGlyphCollection<'a>,
    hmtx: Option<Hmtx<'a>>,
    glyf: Option<(Loca<'a>, Glyf<'a>)>,
    names: Vec<String>,
    ids: HashMap<String, u32>,
}

impl<'a> SourceFont<'a> {
    pub fn new(data: &'a [u8]) -> Result<Self, Error> {
        let font = skrifa::FontRef::new(data).map_err(Error::FontRead)?;
        let tables = FontRef::new(data).map_err(|source| Error::TableRead {
            table: "sfnt",
            source,
        })?;

        let num_glyphs = font
            .maxp()
            .map(|maxp| maxp.num_glyphs() as u32)
            .map_err(Error::FontRead)?;
        let glyph_names = font.glyph_names();
        let names = (0..num_glyphs)
            .map(|gid| match glyph_names.get(skrifa::GlyphId::new(gid)) {
                Some(name) => name.as_str().to_owned(),
                None => format!("glyph{gid:05}"),
            })
            .collect::<Vec<_>>();
        let mut ids = HashMap::with_capacity(names.len());
        for (gid, name) in names.iter().enumerate() {
            if ids.insert(name.clone(), gid as u32).is_some() {
                log::warn!("duplicate glyph name '{name}' in source font, using gid {gid}");
            }
        }

        let glyf = match (tables.loca(None), tables.glyf()) {
            (Ok(loca), Ok(glyf)) => Some((loca, glyf)),
            _ => None,
        };
        log::debug!(
            "source font: {num_glyphs} glyphs, {} outlines",
            if glyf.is_some() { "glyf" } else { "cff" }
        );

        Ok(SourceFont {
            charmap: font.charmap(),
            outlines: font.outline_glyphs(),
            hmtx: tables.hmtx().ok(),
            glyf,
            names,
            ids,
            tables,
        })
    }

    /// Raw access to the source tables.
    pub fn tables(&self) -> &FontRef<'a> {
        &self.tables
    }

    pub fn num_glyphs(&self) -> usize {
        self.names.len()
    }

    fn glyph_id(&self, glyph: &str) -> Result<u32, Error> {
        self.ids
            .get(glyph)
            .copied()
            .ok_or_else(|| Error::UnknownGlyph(glyph.to_owned()))
    }

    fn composite(&self, gid: u32) -> Result<Option<CompositeGlyph>, Error> {
        let Some((loca, glyf)) = &self.glyf else {
            return Ok(None);
        };
        let glyph = loca
            .get_glyf(GlyphId::new(gid), glyf)
            .map_err(|source| Error::TableRead {
                table: "glyf",
                source,
            })?;
        Ok(match glyph {
            Some(Glyph::Composite(composite)) => Some(CompositeGlyph::from_table_ref(&composite)),
            _ => None,
        })
    }

    fn draw(&self, glyph: &str, gid: u32) -> Result<BezPath, Error> {
        let gid = skrifa::GlyphId::new(gid);
        let draw_err = |reason| Error::Draw {
            glyph: glyph.to_owned(),
            reason,
        };
        let outline = self
            .outlines
            .get(gid)
            .ok_or_else(|| draw_err(DrawError::GlyphNotFound(gid)))?;
        let mut pen = PathPen::new();
        outline
            .draw(
                DrawSettings::unhinted(Size::unscaled(), LocationRef::default()),
                &mut pen,
            )
            .map_err(draw_err)?;
        Ok(to_quadratic(&pen.into_inner(), CURVE_TOLERANCE))
    }
}

impl GlyphSource for SourceFont<'_> {
    fn glyph_for_char(&self, ch: char) -> Option<&str> {
        let gid = self.charmap.map(ch)?;
        self.names.get(gid.to_u32() as usize).map(String::as_str)
    }

    fn metric(&self, glyph: &str) -> Option<HMetric> {
        let gid = GlyphId::new(*self.ids.get(glyph)?);
        let hmtx = self.hmtx.as_ref()?;
        Some(HMetric::new(
            hmtx.advance(gid)?,
            hmtx.side_bearing(gid).unwrap_or_default(),
        ))
    }

    fn outline(&self, glyph: &str) -> Result<SourceOutline, Error> {
        let gid = self.glyph_id(glyph)?;
        if let Some(composite) = self.composite(gid)? {
            let components = composite
                .components()
                .iter()
                .map(|component| ComponentRef {
                    glyph: self
                        .names
                        .get(component.glyph.to_u32() as usize)
                        .cloned()
                        .unwrap_or_else(|| format!("glyph{:05}", component.glyph.to_u32())),
                    anchor: component.anchor,
                    flags: component.flags,
                    transform: component.transform,
                })
                .collect();
            return Ok(SourceOutline::Composite {
                components,
                bbox: composite.bbox,
            });
        }
        self.draw(glyph, gid).map(SourceOutline::Path)
    }

    fn flattened(&self, glyph: &str) -> Result<BezPath, Error> {
        let gid = self.glyph_id(glyph)?;
        self.draw(glyph, gid)
    }
}
