//! Build monospace color fonts for sequence alignments.
//!
//! Given a source font and a file of color schemes (letter to color maps,
//! such as the Clustal or Zappo amino acid colorings), this crate builds a
//! TrueType font in which every scheme letter is a `COLR` color glyph with a
//! single layer. Each scheme becomes one `CPAL` palette, and all palettes
//! share the same slot layout, so a page can switch schemes with CSS
//! `font-palette` alone.
//!
//! The pipeline runs once, front to back:
//!
//! 1. [`SchemeSet::load`] reads the schemes and assigns color slots.
//! 2. [`GlyphSetBuilder`] collects outlines from a [`SourceFont`].
//! 3. [`assemble`] compiles the font.
//! 4. [`run`] writes the font as TTF, WOFF and WOFF2 along with a stylesheet
//!    and a demo page.

pub mod assemble;
mod color;
mod config;
pub mod demo;
mod error;
pub mod glyphs;
pub mod names;
pub mod pen;
pub mod scheme;
pub mod sfnt;
pub mod source;
pub mod stylesheet;
pub mod ttx;
pub mod woff;
pub mod woff2;

use std::{
    io::Write,
    path::{Path, PathBuf},
};

use rand::Rng;

pub use assemble::assemble;
pub use color::{InvalidColor, Rgba};
pub use config::{Config, SAMPLE_TEXT};
pub use error::Error;
pub use glyphs::GlyphSetBuilder;
pub use names::FontNames;
pub use scheme::SchemeSet;
pub use source::{GlyphSource, SourceFont};

/// Build the font binary for `schemes` from the font in `source_data`.
pub fn build_font(
    config: &Config,
    source_data: &[u8],
    schemes: &SchemeSet,
    rng: &mut impl Rng,
) -> Result<Vec<u8>, Error> {
    let source = SourceFont::new(source_data)?;
    log::info!(
        "{} schemes, {} letters, {} source glyphs",
        schemes.order().len(),
        schemes.letters().len(),
        source.num_glyphs()
    );
    let mut glyphs = GlyphSetBuilder::new(&source)?;
    glyphs.add_letters(&source, schemes)?;
    glyphs.add_plain(&source, &config.plain_chars)?;
    log::info!(
        "collected {} glyphs, {} color glyphs",
        glyphs.len(),
        glyphs.layers().len()
    );
    let names = FontNames::new(&config.font_name, rng);
    assemble(&source, &glyphs, schemes, config.fallback, &names)
}

fn read(path: &Path) -> Result<Vec<u8>, Error> {
    std::fs::read(path).map_err(|source| Error::Read {
        path: path.to_owned(),
        source,
    })
}

fn write(path: &Path, contents: impl AsRef<[u8]>) -> Result<(), Error> {
    std::fs::write(path, contents).map_err(|source| Error::Write {
        path: path.to_owned(),
        source,
    })
}

fn create_dir(path: &Path) -> Result<(), Error> {
    std::fs::create_dir_all(path).map_err(|source| Error::Write {
        path: path.to_owned(),
        source,
    })
}

/// Writes each artifact and reports it with a `✓ <file>` line.
struct Emitter<'a, W> {
    config: &'a Config,
    report: W,
    written: Vec<PathBuf>,
}

impl<W: Write> Emitter<'_, W> {
    fn emit(
        &mut self,
        path: PathBuf,
        shown: &str,
        contents: impl AsRef<[u8]>,
    ) -> Result<(), Error> {
        write(&path, contents)?;
        writeln!(self.report, "✓ {shown}").map_err(|source| Error::Write {
            path: "<report>".into(),
            source,
        })?;
        self.written.push(path);
        Ok(())
    }

    fn emit_output(&mut self, file_name: &str, contents: impl AsRef<[u8]>) -> Result<(), Error> {
        let path = self.config.out_path(file_name);
        self.emit(path, file_name, contents)
    }
}

/// Run the whole build, writing every output file.
///
/// A `✓ <file>` line is written to `report` after each file; the first
/// failure stops the run. Returns the paths written, in order.
pub fn run(config: &Config, rng: &mut impl Rng, report: impl Write) -> Result<Vec<PathBuf>, Error> {
    let schemes = SchemeSet::load(&config.schemes, &config.base_scheme)?;
    let source_data = read(&config.source_font)?;
    let font = build_font(config, &source_data, &schemes, rng)?;

    create_dir(&config.out_dir)?;
    let mut out = Emitter {
        config,
        report,
        written: Vec::new(),
    };
    out.emit_output(&config.ttf_name(), &font)?;
    out.emit_output(&config.woff_name(), woff::encode(&font)?)?;
    out.emit_output(&config.woff2_name(), woff2::encode(&font)?)?;

    let woff = config.woff_name();
    let woff2 = config.woff2_name();
    let files = stylesheet::FontFiles {
        family: &config.font_name,
        woff: &woff,
        woff2: &woff2,
    };
    let css_name = config.css_name();
    out.emit_output(
        &css_name,
        stylesheet::stylesheet(files, &schemes, config.fallback),
    )?;
    let html = demo::demo_page(&config.font_name, &css_name, &schemes, &config.sample);
    out.emit_output(&config.html_name(), html)?;

    if let Some(dir) = &config.ttx_dir {
        create_dir(dir)?;
        for (name, scheme) in schemes.iter_file_order() {
            let Some(path) = config.ttx_path(name) else {
                continue;
            };
            let shown = path.display().to_string();
            out.emit(path, &shown, ttx::fragment(scheme))?;
        }
    }
    Ok(out.written)
}
