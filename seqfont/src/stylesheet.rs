//! The palette stylesheet.
//!
//! Every scheme gets two palettes: `--<scheme>`, which selects the scheme's
//! own CPAL palette, and `--<scheme>-override`, which starts from palette 0
//! and overrides every slot with the scheme's colors. A class is declared for
//! each.

use crate::{color::Rgba, scheme::SchemeSet};

/// Names the stylesheet needs to refer to.
#[derive(Clone, Copy, Debug)]
pub struct FontFiles<'a> {
    pub family: &'a str,
    pub woff: &'a str,
    pub woff2: &'a str,
}

/// Render the stylesheet.
pub fn stylesheet(files: FontFiles, schemes: &SchemeSet, fallback: Rgba) -> String {
    let FontFiles {
        family,
        woff,
        woff2,
    } = files;
    let mut css = vec![
        format!("/* {family} palettes */"),
        "@font-face {".to_string(),
        format!("  font-family: '{family}';"),
        format!("  src: url('./{woff}') format('woff'), url('./{woff2}') format('woff2');"),
        "}\n".to_string(),
    ];

    for (idx, name) in schemes.order().iter().enumerate() {
        css.extend([
            format!("@font-palette-values --{name} {{"),
            format!("  font-family: '{family}';"),
            format!("  base-palette: {idx};"),
            "}\n".to_string(),
        ]);
        css.extend([
            format!("@font-palette-values --{name}-override {{"),
            format!("  font-family: '{family}';"),
            "  base-palette: 0;".to_string(),
            "  override-colors:".to_string(),
        ]);
        let overrides = schemes
            .letters()
            .iter()
            .enumerate()
            .map(|(slot, letter)| {
                let color = schemes.color(name, *letter, fallback);
                format!("    {slot} {}", color.to_hex6())
            })
            .collect::<Vec<_>>();
        css.push(overrides.join(",\n") + ";");
        css.push("}\n".to_string());
        css.extend([
            format!(".{name}              {{ font-family:'{family}'; font-palette: --{name}; }}"),
            format!(
                ".{name}-override     {{ font-family:'{family}'; font-palette: --{name}-override; }}\n"
            ),
        ]);
    }
    css.join("\n")
}
