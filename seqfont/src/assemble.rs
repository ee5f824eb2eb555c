//! Compiling the glyph set into a TrueType font with color tables.

use write_fonts::{
    from_obj::ToOwnedTable,
    read::TableProvider,
    tables::{
        cmap::Cmap,
        colr::{BaseGlyph, Colr, Layer},
        cpal::Cpal,
        glyf::{Bbox, Component, CompositeGlyph, GlyfLocaBuilder, Glyph, SimpleGlyph},
        head::Head,
        hhea::Hhea,
        hmtx::{Hmtx, LongMetric},
        loca::LocaFormat,
        maxp::Maxp,
        os2::Os2,
        post::Post,
    },
    types::{FWord, GlyphId, GlyphId16, UfWord},
    FontBuilder,
};

use crate::{
    color::Rgba,
    glyphs::GlyphSetBuilder,
    names::{build_name, copyright_records, FontNames},
    scheme::SchemeSet,
    source::{SourceFont, SourceOutline},
    Error,
};

/// Compile the glyph set, palettes and names into a font binary.
///
/// Tables that describe the design as a whole (`head`, `hhea`, `post` and
/// `OS/2`) start as copies of the source tables.
pub fn assemble(
    source: &SourceFont,
    glyphs: &GlyphSetBuilder,
    schemes: &SchemeSet,
    fallback: Rgba,
    names: &FontNames,
) -> Result<Vec<u8>, Error> {
    if glyphs.len() > u16::MAX as usize {
        return Err(Error::TooManyGlyphs(glyphs.len()));
    }
    let tables = source.tables();
    let compiled = compile_glyphs(glyphs)?;

    let mut builder = GlyfLocaBuilder::new();
    for ((name, _), glyph) in glyphs.iter().zip(&compiled) {
        builder
            .add_glyph(glyph)
            .map_err(|source| Error::CompileGlyph {
                glyph: name.to_owned(),
                source,
            })?;
    }
    let (glyf, loca, loca_format) = builder.build();

    let h_metrics = glyphs
        .iter()
        .map(|(_, glyph)| LongMetric::new(glyph.metric.advance, glyph.metric.side_bearing))
        .collect::<Vec<_>>();
    let advance_width_max = h_metrics.iter().map(|m| m.advance).max().unwrap_or_default();
    let num_h_metrics = h_metrics.len() as u16;
    let extents = horizontal_extents(&compiled, &h_metrics);
    let hmtx = Hmtx::new(h_metrics, Vec::new());

    let mut hhea: Hhea = tables
        .hhea()
        .map_err(|source| Error::TableRead {
            table: "hhea",
            source,
        })?
        .to_owned_table();
    hhea.number_of_h_metrics = num_h_metrics;
    hhea.advance_width_max = UfWord::new(advance_width_max);
    if let Some(extents) = extents {
        hhea.min_left_side_bearing = FWord::new(extents.min_left_side_bearing);
        hhea.min_right_side_bearing = FWord::new(extents.min_right_side_bearing);
        hhea.x_max_extent = FWord::new(extents.x_max_extent);
    }

    let maxp = maxp_for(&compiled);
    let cmap = cmap_for(glyphs)?;

    let copyright = tables
        .name()
        .map(|name| copyright_records(&name))
        .unwrap_or_default();
    let name = build_name(names, copyright);

    let mut post: Post = tables
        .post()
        .map(|post| post.to_owned_table())
        .unwrap_or_default();
    let v2 = Post::new_v2(glyphs.glyph_order());
    post.version = v2.version;
    post.num_glyphs = v2.num_glyphs;
    post.glyph_name_index = v2.glyph_name_index;
    post.string_data = v2.string_data;

    let mut head: Head = tables
        .head()
        .map_err(|source| Error::TableRead {
            table: "head",
            source,
        })?
        .to_owned_table();
    head.index_to_loc_format = match loca_format {
        LocaFormat::Short => 0,
        LocaFormat::Long => 1,
    };
    head.checksum_adjustment = 0;
    if let Some(bbox) = font_bbox(&compiled) {
        head.x_min = bbox.x_min;
        head.y_min = bbox.y_min;
        head.x_max = bbox.x_max;
        head.y_max = bbox.y_max;
    }

    let cpal = cpal_for(schemes, fallback);
    let colr = colr_for(glyphs)?;

    let mut font = FontBuilder::new();
    font.add_table(&head)?
        .add_table(&hhea)?
        .add_table(&maxp)?
        .add_table(&hmtx)?
        .add_table(&cmap)?
        .add_table(&name)?
        .add_table(&post)?
        .add_table(&glyf)?
        .add_table(&loca)?
        .add_table(&cpal)?
        .add_table(&colr)?;
    match tables.os2() {
        Ok(os2) => {
            let mut os2: Os2 = os2.to_owned_table();
            let (first, last) = char_range(glyphs);
            os2.us_first_char_index = first;
            os2.us_last_char_index = last;
            font.add_table(&os2)?;
        }
        Err(e) => log::warn!("source font has no usable OS/2 table ({e}), omitting it"),
    }

    // the builder fills in head.checksumAdjustment
    let bytes = font.build();
    log::info!("assembled {} glyphs into {} bytes", glyphs.len(), bytes.len());
    Ok(bytes)
}

fn gid16(glyphs: &GlyphSetBuilder, name: &str) -> Option<GlyphId16> {
    glyphs.index_of(name).map(|idx| GlyphId16::new(idx as u16))
}

/// Compile every glyph, in glyph order.
fn compile_glyphs(glyphs: &GlyphSetBuilder) -> Result<Vec<Glyph>, Error> {
    glyphs
        .iter()
        .map(|(name, glyph)| match &glyph.outline {
            SourceOutline::Path(path) if path.elements().is_empty() => Ok(Glyph::Empty),
            SourceOutline::Path(path) => SimpleGlyph::from_bezpath(path)
                .map(Glyph::Simple)
                .map_err(|e| Error::MalformedPath {
                    glyph: name.to_owned(),
                    reason: format!("{e:?}"),
                }),
            SourceOutline::Composite { components, bbox } => {
                let mut composite: Option<CompositeGlyph> = None;
                for component in components {
                    let gid = gid16(glyphs, &component.glyph).ok_or_else(|| {
                        Error::MissingComponent {
                            glyph: name.to_owned(),
                            component: component.glyph.clone(),
                        }
                    })?;
                    let component = Component::new(
                        gid,
                        component.anchor,
                        component.transform,
                        component.flags,
                    );
                    match composite.as_mut() {
                        Some(composite) => composite.add_component(component, *bbox),
                        None => composite = Some(CompositeGlyph::new(component, *bbox)),
                    }
                }
                Ok(composite.map(Glyph::Composite).unwrap_or(Glyph::Empty))
            }
        })
        .collect()
}

fn glyph_bbox(glyph: &Glyph) -> Option<Bbox> {
    match glyph {
        Glyph::Empty => None,
        Glyph::Simple(simple) => Some(simple.bbox),
        Glyph::Composite(composite) => Some(composite.bbox),
    }
}

fn font_bbox(glyphs: &[Glyph]) -> Option<Bbox> {
    glyphs.iter().filter_map(glyph_bbox).reduce(Bbox::union)
}

/// The `hhea` side bearing and extent fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct HorizontalExtents {
    min_left_side_bearing: i16,
    min_right_side_bearing: i16,
    x_max_extent: i16,
}

/// Side bearing minima and the maximum extent over the glyphs with ink.
fn horizontal_extents(glyphs: &[Glyph], metrics: &[LongMetric]) -> Option<HorizontalExtents> {
    glyphs
        .iter()
        .zip(metrics)
        .filter_map(|(glyph, metric)| {
            let bbox = glyph_bbox(glyph)?;
            let lsb = metric.side_bearing as i32;
            let extent = lsb + (bbox.x_max as i32 - bbox.x_min as i32);
            let rsb = metric.advance as i32 - extent;
            Some((lsb, rsb, extent))
        })
        .fold(None, |acc: Option<(i32, i32, i32)>, (lsb, rsb, extent)| {
            Some(match acc {
                None => (lsb, rsb, extent),
                Some((l, r, e)) => (l.min(lsb), r.min(rsb), e.max(extent)),
            })
        })
        .map(|(lsb, rsb, extent)| HorizontalExtents {
            min_left_side_bearing: clamp_i16(lsb),
            min_right_side_bearing: clamp_i16(rsb),
            x_max_extent: clamp_i16(extent),
        })
}

fn clamp_i16(value: i32) -> i16 {
    value.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}

/// Points, contours and nesting depth of a glyph with its components
/// resolved.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Extent {
    points: u32,
    contours: u32,
    depth: u32,
}

fn extent(glyphs: &[Glyph], gid: usize, visiting: &mut Vec<usize>) -> Extent {
    match glyphs.get(gid) {
        Some(Glyph::Simple(simple)) => Extent {
            points: simple.contours.iter().map(|c| c.len() as u32).sum(),
            contours: simple.contours.len() as u32,
            depth: 0,
        },
        Some(Glyph::Composite(composite)) if !visiting.contains(&gid) => {
            visiting.push(gid);
            let mut total = Extent::default();
            for component in composite.components() {
                let child = extent(glyphs, component.glyph.to_u32() as usize, visiting);
                total.points += child.points;
                total.contours += child.contours;
                total.depth = total.depth.max(child.depth + 1);
            }
            visiting.pop();
            total
        }
        _ => Extent::default(),
    }
}

fn saturate(value: u32) -> u16 {
    value.min(u16::MAX as u32) as u16
}

/// A version 1.0 `maxp` describing the compiled glyphs.
fn maxp_for(glyphs: &[Glyph]) -> Maxp {
    let mut simple = Extent::default();
    let mut composite = Extent::default();
    let mut max_components = 0;
    let mut visiting = Vec::new();
    for (gid, glyph) in glyphs.iter().enumerate() {
        match glyph {
            Glyph::Empty => (),
            Glyph::Simple(_) => {
                let e = extent(glyphs, gid, &mut visiting);
                simple.points = simple.points.max(e.points);
                simple.contours = simple.contours.max(e.contours);
            }
            Glyph::Composite(glyph) => {
                let e = extent(glyphs, gid, &mut visiting);
                composite.points = composite.points.max(e.points);
                composite.contours = composite.contours.max(e.contours);
                composite.depth = composite.depth.max(e.depth);
                max_components = max_components.max(glyph.components().len() as u32);
            }
        }
    }
    Maxp {
        num_glyphs: glyphs.len() as u16,
        max_points: Some(saturate(simple.points)),
        max_contours: Some(saturate(simple.contours)),
        max_composite_points: Some(saturate(composite.points)),
        max_composite_contours: Some(saturate(composite.contours)),
        max_zones: Some(2),
        max_twilight_points: Some(0),
        max_storage: Some(0),
        max_function_defs: Some(0),
        max_instruction_defs: Some(0),
        max_stack_elements: Some(0),
        max_size_of_instructions: Some(0),
        max_component_elements: Some(saturate(max_components)),
        max_component_depth: Some(saturate(composite.depth)),
    }
}

fn cmap_for(glyphs: &GlyphSetBuilder) -> Result<Cmap, Error> {
    let mappings = glyphs
        .mappings()
        .iter()
        .filter_map(|(ch, name)| {
            let gid = glyphs.index_of(name)?;
            Some((*ch, GlyphId::new(gid as u32)))
        })
        .collect::<Vec<_>>();
    Ok(Cmap::from_mappings(mappings)?)
}

/// The lowest and highest mapped BMP code points, for `OS/2`.
fn char_range(glyphs: &GlyphSetBuilder) -> (u16, u16) {
    let clamp = |ch: char| (ch as u32).min(0xFFFF) as u16;
    let chars = glyphs.mappings().keys().copied();
    let first = chars.clone().min().map(clamp).unwrap_or_default();
    let last = chars.max().map(clamp).unwrap_or_default();
    (first, last)
}

/// One palette per scheme in presentation order, one entry per color slot.
fn cpal_for(schemes: &SchemeSet, fallback: Rgba) -> Cpal {
    let palettes = schemes.palettes(fallback);
    let num_entries = schemes.letters().len() as u16;
    let mut cpal = Cpal {
        num_palettes: palettes.len() as u16,
        num_palette_entries: num_entries,
        num_color_records: palettes.iter().map(Vec::len).sum::<usize>() as u16,
        color_record_indices: (0..palettes.len() as u16)
            .map(|i| i * num_entries)
            .collect(),
        ..Default::default()
    };
    cpal.color_records_array.set(
        palettes
            .iter()
            .flatten()
            .map(|color| color.to_color_record())
            .collect::<Vec<_>>(),
    );
    cpal
}

/// A version 0 `COLR` with base glyph records sorted by glyph id.
fn colr_for(glyphs: &GlyphSetBuilder) -> Result<Colr, Error> {
    let mut bases = Vec::with_capacity(glyphs.layers().len());
    for (base, layers) in glyphs.layers() {
        let gid = gid16(glyphs, base).ok_or_else(|| Error::UnknownGlyph(base.clone()))?;
        let layers = layers
            .iter()
            .map(|layer| {
                gid16(glyphs, &layer.glyph)
                    .map(|gid| Layer::new(gid, layer.slot))
                    .ok_or_else(|| Error::UnknownGlyph(layer.glyph.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        bases.push((gid, layers));
    }
    bases.sort_by_key(|(gid, _)| *gid);

    let mut base_records = Vec::with_capacity(bases.len());
    let mut layer_records = Vec::new();
    for (gid, layers) in bases {
        base_records.push(BaseGlyph::new(
            gid,
            layer_records.len() as u16,
            layers.len() as u16,
        ));
        layer_records.extend(layers);
    }
    let num_bases = base_records.len() as u16;
    let num_layers = layer_records.len() as u16;
    Ok(Colr::new(
        num_bases,
        Some(base_records),
        Some(layer_records),
        num_layers,
    ))
}
