//! Errors that abort a build

use std::path::PathBuf;

use skrifa::outline::DrawError;
use write_fonts::{tables::cmap::CmapConflict, BuilderError};

use crate::color::InvalidColor;

/// An error that stops the pipeline.
///
/// Skipped characters and missing scheme colors are not errors; they are
/// handled where they occur and at most logged.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed scheme file: {0}")]
    SchemeJson(#[from] serde_json::Error),

    #[error("scheme '{scheme}' uses key '{key}', keys must be a single character")]
    InvalidLetter { scheme: String, key: String },

    #[error("scheme '{scheme}', letter '{letter}': {source}")]
    InvalidColor {
        scheme: String,
        letter: char,
        #[source]
        source: InvalidColor,
    },

    #[error("base scheme '{0}' is not defined in the scheme file")]
    MissingBaseScheme(String),

    #[error("failed to parse source font: {0}")]
    FontRead(#[source] skrifa::raw::ReadError),

    #[error("failed to read '{table}' from the source font: {source}")]
    TableRead {
        table: &'static str,
        #[source]
        source: write_fonts::read::ReadError,
    },

    #[error("source font has no glyph for '{0}', needed for default metrics")]
    MissingReferenceGlyph(char),

    #[error("glyph '{0}' is not in the source font")]
    UnknownGlyph(String),

    #[error("failed to draw glyph '{glyph}': {reason}")]
    Draw { glyph: String, reason: DrawError },

    #[error("outline of glyph '{glyph}' cannot be stored in glyf: {reason}")]
    MalformedPath { glyph: String, reason: String },

    #[error("failed to compile glyph '{glyph}': {source}")]
    CompileGlyph {
        glyph: String,
        #[source]
        source: write_fonts::error::Error,
    },

    #[error("composite glyph '{glyph}' references '{component}', which was not copied")]
    MissingComponent { glyph: String, component: String },

    #[error("{0} glyphs do not fit in a 16-bit glyph id space")]
    TooManyGlyphs(usize),

    #[error(transparent)]
    Cmap(#[from] CmapConflict),

    #[error(transparent)]
    Builder(#[from] BuilderError),

    #[error("failed to compress font data: {0}")]
    Compress(#[source] std::io::Error),
}
