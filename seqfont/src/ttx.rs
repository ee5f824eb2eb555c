//! Per-scheme TTX fragments with a single-palette `CPAL`.
//!
//! These are meant to be merged into an existing font with `ttx -m`, which
//! makes every letter glyph its own color layer. Unlike the built font, each
//! fragment has only the colors its scheme actually uses.

use std::fmt::Write;

use indexmap::IndexSet;

use crate::{
    color::Rgba,
    scheme::{to_lower, Scheme},
};

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// The distinct colors of a scheme, in the order they first appear.
pub fn distinct_colors(scheme: &Scheme) -> IndexSet<Rgba> {
    scheme.values().copied().collect()
}

/// Render the fragment for one scheme.
pub fn fragment(scheme: &Scheme) -> String {
    let palette = distinct_colors(scheme);
    let mut xml = String::new();
    // writing to a String cannot fail
    let _ = writeln!(xml, r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    let _ = writeln!(xml, "<ttFont>");
    let _ = writeln!(xml, "<COLR>");
    let _ = writeln!(xml, r#"<version value="0"/>"#);
    for (letter, color) in scheme {
        let Some(idx) = palette.get_index_of(color) else {
            continue;
        };
        let lower = to_lower(*letter);
        let cases = if lower == *letter {
            vec![*letter]
        } else {
            vec![*letter, lower]
        };
        for ch in cases {
            let name = escape(&ch.to_string());
            let _ = writeln!(
                xml,
                r#"<ColorGlyph name="{name}"><layer colorID="{idx}" name="{name}"/></ColorGlyph>"#
            );
        }
    }
    let _ = writeln!(xml, "</COLR>");
    let _ = writeln!(xml, "<CPAL>");
    let _ = writeln!(xml, r#"<version value="0"/>"#);
    let _ = writeln!(xml, r#"<numPaletteEntries value="{}"/>"#, palette.len());
    let _ = writeln!(xml, r#"<palette index="0">"#);
    for (idx, color) in palette.iter().enumerate() {
        let _ = writeln!(xml, r#"<color index="{idx}" value="{color}"/>"#);
    }
    let _ = writeln!(xml, "</palette>");
    let _ = writeln!(xml, "</CPAL>");
    let _ = writeln!(xml, "</ttFont>");
    xml
}
