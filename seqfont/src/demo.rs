//! The demo page.

use crate::scheme::SchemeSet;

/// Render a page showing `sample` under the base scheme, then under every
/// scheme's own palette and its override palette.
pub fn demo_page(family: &str, stylesheet: &str, schemes: &SchemeSet, sample: &str) -> String {
    let base = schemes.base();
    let mut html = vec![
        "<!doctype html><meta charset=utf-8>".to_string(),
        format!("<title>{family} demo</title>"),
        format!("<link rel=stylesheet href={stylesheet}>"),
        format!("<style>body{{font:32px/1.4 '{family}',monospace;margin:2rem}}</style>"),
        format!("<h2>Base palette ({base})</h2>"),
        format!("<p class='{base}'>{sample}</p>"),
        "<h2>Each scheme built-in + override</h2>".to_string(),
    ];
    for name in schemes.order() {
        html.push(format!("<p class='{name}'>{name}: {sample}</p>"));
        html.push(format!(
            "<p class='{name}-override'>{name}-override: {sample}</p>"
        ));
    }
    html.join("\n")
}
