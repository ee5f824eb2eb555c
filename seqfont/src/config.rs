//! Build parameters.

use std::path::{Path, PathBuf};

use crate::{color::Rgba, glyphs::PLAIN_CHARS};

/// The text shown on the demo page.
pub const SAMPLE_TEXT: &str =
    "ARNDCQEGHILKMFPSTWYVBZX arncdqeghilkmfpstwyvbzx 0123456789 -.|";

/// Everything a build needs to know.
///
/// The default configuration reproduces the stock build: `Protsolata` from
/// `Inconsolata-Regular.otf` and `cleancolors.json`, written to the current
/// directory.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub source_font: PathBuf,
    pub schemes: PathBuf,
    pub out_dir: PathBuf,
    /// Family name of the output font; also the stem of every output file.
    pub font_name: String,
    /// The scheme whose palette is index 0.
    pub base_scheme: String,
    /// Color of letters a scheme does not mention.
    pub fallback: Rgba,
    pub sample: String,
    /// Characters copied without color layers.
    pub plain_chars: String,
    /// If set, a TTX fragment per scheme is written to this directory.
    pub ttx_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            source_font: "Inconsolata-Regular.otf".into(),
            schemes: "cleancolors.json".into(),
            out_dir: ".".into(),
            font_name: "Protsolata".into(),
            base_scheme: "clustal2".into(),
            fallback: Rgba::BLACK,
            sample: SAMPLE_TEXT.into(),
            plain_chars: PLAIN_CHARS.into(),
            ttx_dir: None,
        }
    }
}

impl Config {
    pub fn ttf_name(&self) -> String {
        format!("{}.ttf", self.font_name)
    }

    pub fn woff_name(&self) -> String {
        format!("{}.woff", self.font_name)
    }

    pub fn woff2_name(&self) -> String {
        format!("{}.woff2", self.font_name)
    }

    pub fn css_name(&self) -> String {
        format!("{}_palettes.css", self.font_name)
    }

    pub fn html_name(&self) -> String {
        format!("{}_test.html", self.font_name)
    }

    /// The path of an output file in the output directory.
    pub fn out_path(&self, file_name: &str) -> PathBuf {
        self.out_dir.join(file_name)
    }

    /// The path of the TTX fragment for `scheme`, if fragments are enabled.
    pub fn ttx_path(&self, scheme: &str) -> Option<PathBuf> {
        self.ttx_dir
            .as_deref()
            .map(|dir: &Path| dir.join(format!("{scheme}.ttx")))
    }
}
