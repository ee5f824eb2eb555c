//! End-to-end builds against a small synthesized source font.

use std::path::Path;

use kurbo::{BezPath, Rect, Shape};
use pretty_assertions::assert_eq;
use rand::{rngs::StdRng, SeedableRng};
use seqfont::{pen::PathPen, Config, Error};
use skrifa::{
    outline::DrawSettings,
    prelude::{LocationRef, Size},
    MetadataProvider,
};
use write_fonts::{
    read::{tables::glyf::Glyph as ReadGlyph, FontRef, TableProvider},
    tables::{
        cmap::Cmap,
        glyf::{
            Anchor, Component, ComponentFlags, CompositeGlyph, GlyfLocaBuilder, SimpleGlyph,
            Transform,
        },
        head::Head,
        hhea::Hhea,
        hmtx::{Hmtx, LongMetric},
        loca::LocaFormat,
        maxp::Maxp,
        name::{Name, NameRecord},
        os2::Os2,
        post::Post,
    },
    types::{FWord, GlyphId, GlyphId16, NameId, UfWord},
    FontBuilder,
};

const COPYRIGHT: &str = "Copyright 2006 The Inconsolata Project Authors";
const ADVANCE: u16 = 500;

fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> BezPath {
    Rect::new(x0, y0, x1, y1).to_path(0.1)
}

fn triangle() -> BezPath {
    let mut path = BezPath::new();
    path.move_to((50.0, 0.0));
    path.quad_to((250.0, 600.0), (450.0, 0.0));
    path.close_path();
    path
}

/// A TrueType font with `.notdef`, `A`, `a`, `one`, `period`, `plus` (a
/// composite of two `bar`s) and `bar`.
fn source_font() -> Vec<u8> {
    let order = [".notdef", "A", "a", "one", "period", "plus", "bar"];
    let mut builder = GlyfLocaBuilder::new();
    builder.add_glyph(&SimpleGlyph::default()).unwrap();
    builder
        .add_glyph(&SimpleGlyph::from_bezpath(&rect(50.0, 0.0, 450.0, 700.0)).unwrap())
        .unwrap();
    builder
        .add_glyph(&SimpleGlyph::from_bezpath(&triangle()).unwrap())
        .unwrap();
    builder
        .add_glyph(&SimpleGlyph::from_bezpath(&rect(200.0, 0.0, 300.0, 700.0)).unwrap())
        .unwrap();
    builder
        .add_glyph(&SimpleGlyph::from_bezpath(&rect(200.0, 0.0, 300.0, 100.0)).unwrap())
        .unwrap();
    let bar = GlyphId16::new(6);
    let mut plus = CompositeGlyph::new(
        Component::new(
            bar,
            Anchor::Offset { x: 0, y: 0 },
            Transform::default(),
            ComponentFlags::default(),
        ),
        Rect::new(50.0, 300.0, 450.0, 400.0),
    );
    plus.add_component(
        Component::new(
            bar,
            Anchor::Offset { x: 300, y: -300 },
            Transform {
                xx: write_fonts::types::F2Dot14::from_f32(0.0),
                yx: write_fonts::types::F2Dot14::from_f32(1.0),
                xy: write_fonts::types::F2Dot14::from_f32(-1.0),
                yy: write_fonts::types::F2Dot14::from_f32(0.0),
            },
            ComponentFlags::default(),
        ),
        Rect::new(200.0, 100.0, 300.0, 600.0),
    );
    builder.add_glyph(&plus).unwrap();
    builder
        .add_glyph(&SimpleGlyph::from_bezpath(&rect(50.0, 300.0, 450.0, 400.0)).unwrap())
        .unwrap();
    let (glyf, loca, loca_format) = builder.build();

    let head = Head {
        units_per_em: 1000,
        x_min: 50,
        y_min: 0,
        x_max: 450,
        y_max: 700,
        index_to_loc_format: match loca_format {
            LocaFormat::Short => 0,
            LocaFormat::Long => 1,
        },
        ..Default::default()
    };
    let hhea = Hhea {
        ascender: FWord::new(800),
        descender: FWord::new(-200),
        line_gap: FWord::new(0),
        advance_width_max: UfWord::new(ADVANCE),
        // describes glyphs that are not copied
        min_left_side_bearing: FWord::new(-120),
        min_right_side_bearing: FWord::new(-80),
        x_max_extent: FWord::new(900),
        caret_slope_rise: 1,
        caret_slope_run: 0,
        caret_offset: 0,
        number_of_h_metrics: order.len() as u16,
    };
    let hmtx = Hmtx::new(
        (0..order.len())
            .map(|gid| LongMetric::new(ADVANCE, if gid == 0 { 0 } else { 50 }))
            .collect(),
        Vec::new(),
    );
    let maxp = Maxp {
        num_glyphs: order.len() as u16,
        max_points: Some(4),
        max_contours: Some(1),
        max_composite_points: Some(8),
        max_composite_contours: Some(2),
        max_zones: Some(2),
        max_twilight_points: Some(0),
        max_storage: Some(0),
        max_function_defs: Some(0),
        max_instruction_defs: Some(0),
        max_stack_elements: Some(0),
        max_size_of_instructions: Some(0),
        max_component_elements: Some(2),
        max_component_depth: Some(1),
    };
    let cmap = Cmap::from_mappings([
        ('A', GlyphId::new(1)),
        ('a', GlyphId::new(2)),
        ('1', GlyphId::new(3)),
        ('.', GlyphId::new(4)),
        ('+', GlyphId::new(5)),
    ])
    .unwrap();
    let mut name = Name::default();
    name.name_record = vec![
        NameRecord::new(1, 0, 0, NameId::COPYRIGHT_NOTICE, COPYRIGHT.to_string().into()),
        NameRecord::new(1, 0, 0, NameId::FAMILY_NAME, "Source".to_string().into()),
        NameRecord::new(3, 1, 0x409, NameId::COPYRIGHT_NOTICE, COPYRIGHT.to_string().into()),
        NameRecord::new(3, 1, 0x409, NameId::FAMILY_NAME, "Source".to_string().into()),
    ];
    let post = Post::new_v2(order);
    let os2 = Os2 {
        us_weight_class: 400,
        us_width_class: 5,
        ..Default::default()
    };

    FontBuilder::new()
        .add_table(&head)
        .unwrap()
        .add_table(&hhea)
        .unwrap()
        .add_table(&hmtx)
        .unwrap()
        .add_table(&maxp)
        .unwrap()
        .add_table(&cmap)
        .unwrap()
        .add_table(&name)
        .unwrap()
        .add_table(&post)
        .unwrap()
        .add_table(&os2)
        .unwrap()
        .add_table(&glyf)
        .unwrap()
        .add_table(&loca)
        .unwrap()
        .build()
}

const SCHEMES: &str = r##"{
    "other": { "A": "#00FF00FF" },
    "base": { "A": "#FF0000FF" }
}"##;

fn config_in(dir: &Path) -> Config {
    let source = dir.join("source.ttf");
    let schemes = dir.join("schemes.json");
    std::fs::write(&source, source_font()).unwrap();
    std::fs::write(&schemes, SCHEMES).unwrap();
    Config {
        source_font: source,
        schemes,
        out_dir: dir.join("out"),
        base_scheme: "base".into(),
        ..Default::default()
    }
}

struct Built {
    _dir: tempfile::TempDir,
    config: Config,
    report: String,
}

fn build() -> Built {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let mut report = Vec::new();
    seqfont::run(&config, &mut StdRng::seed_from_u64(42), &mut report).unwrap();
    Built {
        _dir: dir,
        config,
        report: String::from_utf8(report).unwrap(),
    }
}

impl Built {
    fn read(&self, name: &str) -> Vec<u8> {
        std::fs::read(self.config.out_path(name)).unwrap()
    }

    fn ttf(&self) -> Vec<u8> {
        self.read(&self.config.ttf_name())
    }
}

fn glyph_names(font: &[u8]) -> Vec<String> {
    let num_glyphs = FontRef::new(font).unwrap().maxp().unwrap().num_glyphs() as u32;
    let font = skrifa::FontRef::new(font).unwrap();
    let names = font.glyph_names();
    (0..num_glyphs)
        .map(|gid| {
            names
                .get(skrifa::GlyphId::new(gid))
                .map(|name| name.as_str().to_owned())
                .unwrap_or_default()
        })
        .collect()
}

fn draw(font: &[u8], ch: Option<char>, gid: u32) -> BezPath {
    let font = skrifa::FontRef::new(font).unwrap();
    let gid = match ch {
        Some(ch) => font.charmap().map(ch).unwrap(),
        None => skrifa::GlyphId::new(gid),
    };
    let mut pen = PathPen::new();
    font.outline_glyphs()
        .get(gid)
        .unwrap()
        .draw(
            DrawSettings::unhinted(Size::unscaled(), LocationRef::default()),
            &mut pen,
        )
        .unwrap();
    pen.into_inner()
}

#[test]
fn reports_each_file_in_order() {
    let built = build();
    assert_eq!(
        built.report.lines().collect::<Vec<_>>(),
        [
            "✓ Protsolata.ttf",
            "✓ Protsolata.woff",
            "✓ Protsolata.woff2",
            "✓ Protsolata_palettes.css",
            "✓ Protsolata_test.html",
        ]
    );
}

#[test]
fn glyph_order() {
    let ttf = build().ttf();
    assert_eq!(
        glyph_names(&ttf),
        [".notdef", "space", "A", "A.layer", "a", "a.layer", "one", "period", "plus", "bar"]
    );
    let post = FontRef::new(&ttf).unwrap().post().unwrap();
    assert_eq!(post.version(), write_fonts::types::Version16Dot16::VERSION_2_0);
    assert_eq!(post.num_glyphs(), Some(10));
}

#[test]
fn palettes_and_layers() {
    let ttf = build().ttf();
    let font = FontRef::new(&ttf).unwrap();

    let cpal = font.cpal().unwrap();
    assert_eq!((cpal.num_palettes(), cpal.num_palette_entries()), (2, 1));
    let indices = cpal
        .color_record_indices()
        .iter()
        .map(|idx| idx.get())
        .collect::<Vec<_>>();
    let colors = cpal.color_records_array().unwrap().unwrap();
    let rows = indices
        .iter()
        .map(|idx| {
            let c = colors[*idx as usize];
            (c.red, c.green, c.blue, c.alpha)
        })
        .collect::<Vec<_>>();
    // base first, even though it comes second in the file
    assert_eq!(rows, [(255, 0, 0, 255), (0, 255, 0, 255)]);

    let colr = font.colr().unwrap();
    assert_eq!(colr.version(), 0);
    let bases = colr
        .base_glyph_records()
        .unwrap()
        .unwrap()
        .iter()
        .map(|b| (b.glyph_id().to_u32(), b.first_layer_index(), b.num_layers()))
        .collect::<Vec<_>>();
    assert_eq!(bases, [(2, 0, 1), (4, 1, 1)]);
    let layers = colr
        .layer_records()
        .unwrap()
        .unwrap()
        .iter()
        .map(|l| (l.glyph_id().to_u32(), l.palette_index()))
        .collect::<Vec<_>>();
    assert_eq!(layers, [(3, 0), (5, 0)]);
}

#[test]
fn character_map() {
    let ttf = build().ttf();
    let font = FontRef::new(&ttf).unwrap();
    let cmap = font.cmap().unwrap();
    let lookup = |ch: char| cmap.map_codepoint(ch).map(|gid| gid.to_u32());
    assert_eq!(lookup(' '), Some(1));
    assert_eq!(lookup('\u{A0}'), Some(1));
    assert_eq!(lookup('A'), Some(2));
    assert_eq!(lookup('a'), Some(4));
    assert_eq!(lookup('1'), Some(6));
    assert_eq!(lookup('.'), Some(7));
    assert_eq!(lookup('+'), Some(8));
    // not in the source
    assert_eq!(lookup('0'), None);
    assert_eq!(lookup('-'), None);

    let os2 = font.os2().unwrap();
    assert_eq!(os2.us_first_char_index(), 0x20);
    assert_eq!(os2.us_last_char_index(), 0xA0);
}

#[test]
fn base_glyphs_are_empty_and_layers_match_source() {
    let source = source_font();
    let ttf = build().ttf();
    assert!(draw(&ttf, Some('A'), 0).elements().is_empty());
    assert!(draw(&ttf, Some('a'), 0).elements().is_empty());
    let pairs = [
        (draw(&ttf, None, 3), draw(&source, Some('A'), 0)),
        (draw(&ttf, None, 5), draw(&source, Some('a'), 0)),
        (draw(&ttf, Some('+'), 0), draw(&source, Some('+'), 0)),
    ];
    for (output, source) in pairs {
        assert!(!output.elements().is_empty());
        assert_eq!(output.bounding_box(), source.bounding_box());
        assert!((output.area() - source.area()).abs() < 1e-6);
    }
}

#[test]
fn metrics() {
    let ttf = build().ttf();
    let font = FontRef::new(&ttf).unwrap();
    let hmtx = font.hmtx().unwrap();
    let metrics = (0..10)
        .map(|gid| {
            let gid = GlyphId::new(gid);
            (hmtx.advance(gid).unwrap(), hmtx.side_bearing(gid).unwrap())
        })
        .collect::<Vec<_>>();
    assert_eq!(metrics[0], (ADVANCE, 0));
    assert_eq!(metrics[1], (ADVANCE, 0));
    assert!(metrics[2..].iter().all(|m| *m == (ADVANCE, 50)));
    let hhea = font.hhea().unwrap();
    assert_eq!(hhea.number_of_h_metrics(), 10);
    assert_eq!(hhea.ascender().to_i16(), 800);
    assert_eq!(hhea.min_left_side_bearing().to_i16(), 50);
    assert_eq!(hhea.min_right_side_bearing().to_i16(), 50);
    assert_eq!(hhea.x_max_extent().to_i16(), 450);
    assert_eq!(font.head().unwrap().units_per_em(), 1000);
    assert_eq!(font.maxp().unwrap().num_glyphs(), 10);
}

#[test]
fn composites_reference_output_ids() {
    let ttf = build().ttf();
    let font = FontRef::new(&ttf).unwrap();
    let (loca, glyf) = (font.loca(None).unwrap(), font.glyf().unwrap());
    let Some(ReadGlyph::Composite(plus)) = loca.get_glyf(GlyphId::new(8), &glyf).unwrap() else {
        panic!("plus should stay a composite");
    };
    let components = plus.components().map(|c| c.glyph.to_u32()).collect::<Vec<_>>();
    assert_eq!(components, [9, 9]);
    let maxp = font.maxp().unwrap();
    assert_eq!(maxp.max_component_elements(), Some(2));
    assert_eq!(maxp.max_composite_points(), Some(8));
}

#[test]
fn names() {
    let ttf = build().ttf();
    let font = FontRef::new(&ttf).unwrap();
    let name = font.name().unwrap();
    let strings = name
        .name_record()
        .iter()
        .filter(|rec| rec.platform_id() == 3)
        .map(|rec| {
            let string = rec.string(name.string_data()).unwrap();
            (rec.name_id().to_u16(), string.chars().collect::<String>())
        })
        .collect::<Vec<_>>();
    assert_eq!(strings[0], (0, COPYRIGHT.to_string()));
    assert_eq!(strings[1], (1, "Protsolata".to_string()));
    assert_eq!(strings[2], (2, "Regular".to_string()));
    assert!(strings[3].1.starts_with("Protsolata-Regular-"));
    assert_eq!(strings[4], (4, "Protsolata Regular".to_string()));
    assert_eq!(strings[5], (5, "Version 1.0".to_string()));
    assert_eq!(strings[6], (6, "Protsolata-Regular".to_string()));
    let mac = name
        .name_record()
        .iter()
        .filter(|rec| rec.platform_id() == 1)
        .count();
    assert_eq!(mac, 7);
}

#[test]
fn whole_font_checksum() {
    let ttf = build().ttf();
    assert_eq!(seqfont::sfnt::checksum(&ttf), seqfont::sfnt::CHECKSUM_MAGIC);
    let font = FontRef::new(&ttf).unwrap();
    assert_ne!(font.head().unwrap().checksum_adjustment(), 0);
}

#[test]
fn web_fonts_describe_the_ttf() {
    let built = build();
    let ttf = built.ttf();
    let be32 = |data: &[u8], pos: usize| u32::from_be_bytes(data[pos..pos + 4].try_into().unwrap());
    let num_tables = FontRef::new(&ttf).unwrap().table_directory.num_tables();

    let woff = built.read(&built.config.woff_name());
    assert_eq!(be32(&woff, 0), seqfont::woff::SIGNATURE);
    assert_eq!(be32(&woff, 4), 0x0001_0000);
    assert_eq!(be32(&woff, 8) as usize, woff.len());
    assert_eq!(u16::from_be_bytes([woff[12], woff[13]]), num_tables);
    assert_eq!(be32(&woff, 16) as usize, ttf.len());

    let woff2 = built.read(&built.config.woff2_name());
    assert_eq!(be32(&woff2, 0), seqfont::woff2::SIGNATURE);
    assert_eq!(be32(&woff2, 4), 0x0001_0000);
    assert_eq!(be32(&woff2, 8) as usize, woff2.len());
    assert_eq!(u16::from_be_bytes([woff2[12], woff2[13]]), num_tables);
    assert_eq!(be32(&woff2, 16) as usize, ttf.len());
}

#[test]
fn stylesheet_and_demo() {
    let built = build();
    let css = String::from_utf8(built.read(&built.config.css_name())).unwrap();
    assert_eq!(css.matches("@font-face").count(), 1);
    let classes = css
        .lines()
        .filter(|line| line.starts_with('.'))
        .map(|line| line.split_whitespace().next().unwrap())
        .collect::<Vec<_>>();
    assert_eq!(classes, [".base", ".base-override", ".other", ".other-override"]);
    assert!(css.contains("override-colors:\n    0 #00FF00;"));

    let html = String::from_utf8(built.read(&built.config.html_name())).unwrap();
    assert!(html.contains("<link rel=stylesheet href=Protsolata_palettes.css>"));
    assert!(html.contains(&format!("<p class='base'>{}</p>", seqfont::SAMPLE_TEXT)));
    assert!(html.contains(&format!(
        "<p class='other-override'>other-override: {}</p>",
        seqfont::SAMPLE_TEXT
    )));
}

#[test]
fn ttx_fragments() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        ttx_dir: Some(dir.path().join("ttx")),
        ..config_in(dir.path())
    };
    let mut report = Vec::new();
    let written = seqfont::run(&config, &mut StdRng::seed_from_u64(1), &mut report).unwrap();
    assert_eq!(written.len(), 7);
    let other = std::fs::read_to_string(dir.path().join("ttx/other.ttx")).unwrap();
    assert!(other.contains(r##"<color index="0" value="#00FF00FF"/>"##));
    assert!(other.contains(r#"<ColorGlyph name="a"><layer colorID="0" name="a"/></ColorGlyph>"#));
    assert!(dir.path().join("ttx/base.ttx").exists());
}

#[test]
fn missing_base_scheme_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        base_scheme: "clustal2".into(),
        ..config_in(dir.path())
    };
    let mut report = Vec::new();
    let err = seqfont::run(&config, &mut StdRng::seed_from_u64(1), &mut report).unwrap_err();
    assert!(matches!(err, Error::MissingBaseScheme(name) if name == "clustal2"));
    assert!(report.is_empty());
    assert!(!config.out_dir.exists());
}

#[test]
fn missing_source_font() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        source_font: dir.path().join("nope.otf"),
        ..config_in(dir.path())
    };
    let err = seqfont::run(&config, &mut StdRng::seed_from_u64(1), Vec::new()).unwrap_err();
    assert!(matches!(err, Error::Read { .. }));
}
