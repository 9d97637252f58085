//! Embedded HTML pages

use crate::data::{FeatureVector, FEATURE_BOUNDS, FEATURE_NAMES};
use crate::report::ScoutReport;

const PAGE_HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>PUBG Scout</title>
    <style>
        body{background:#0d0f12;color:#e0e0e0;font-family:'Courier New',monospace;margin:0;padding:2rem}
        main{max-width:720px;margin:0 auto}
        h1{color:#f2a900;letter-spacing:.15em;border-bottom:2px solid #f2a900;padding-bottom:.5rem}
        form{display:grid;grid-template-columns:1fr 1fr;gap:1rem}
        label{display:flex;flex-direction:column;font-size:.85rem;color:#9aa0a6}
        input{background:#1b1f24;border:1px solid #333;color:#fff;padding:.5rem;font-family:inherit}
        button{grid-column:span 2;background:#f2a900;border:0;color:#000;padding:.8rem;font-weight:bold;letter-spacing:.2em;cursor:pointer}
        .banner{padding:1.5rem;margin:1.5rem 0;border:2px solid}
        .pro{border-color:#f2a900;color:#f2a900}
        .amateur{border-color:#c0392b;color:#e74c3c}
        .scores{display:grid;grid-template-columns:1fr 1fr;gap:.5rem}
        .score{background:#1b1f24;padding:.75rem}
        .warn{color:#e67e22}
        footer{margin-top:2rem;color:#555;font-size:.75rem}
        a{color:#f2a900}
    </style>
</head>
<body>
<main>
"#;

const PAGE_TAIL: &str = "</main>\n</body>\n</html>\n";

fn footer() -> String {
    format!("<footer>PUBG Scout v{}</footer>\n", env!("CARGO_PKG_VERSION"))
}

/// Minimal HTML escaping for text nodes and attribute values
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// The scouting form, pre-filled with `values`
pub fn render_index(values: &FeatureVector) -> String {
    let mut page = String::from(PAGE_HEAD);
    page.push_str("<h1>PUBG PRO SCOUT TERMINAL</h1>\n");
    page.push_str("<p>Enter last-match statistics to evaluate pro league potential.</p>\n");
    page.push_str("<form method=\"post\" action=\"/scout\">\n");

    for ((name, (min, max)), value) in FEATURE_NAMES.iter().zip(FEATURE_BOUNDS).zip(values.to_array()) {
        page.push_str(&format!(
            "    <label>{name}<input type=\"number\" name=\"{field}\" value=\"{value}\" min=\"{min}\" max=\"{max}\" step=\"any\"></label>\n",
            name = name,
            field = name.to_lowercase(),
            value = value,
            min = min,
            max = max,
        ));
    }

    page.push_str("    <button type=\"submit\">ANALYZE PLAYER</button>\n</form>\n");
    page.push_str(&footer());
    page.push_str(PAGE_TAIL);
    page
}

/// The verdict page for one report
pub fn render_result(report: &ScoutReport) -> String {
    let class = if report.is_pro() { "pro" } else { "amateur" };

    let mut page = String::from(PAGE_HEAD);
    page.push_str("<h1>PUBG PRO SCOUT TERMINAL</h1>\n");
    page.push_str(&format!(
        "<section class=\"banner {}\">\n    <h2>{}</h2>\n    <p><strong>{}</strong></p>\n    <p>{}</p>\n</section>\n",
        class,
        escape(&report.title),
        escape(&report.verdict),
        escape(&report.confidence_line),
    ));

    page.push_str("<h3>PERFORMANCE RADAR</h3>\n<div class=\"scores\">\n");
    for (name, value) in report.scores.entries() {
        page.push_str(&format!(
            "    <div class=\"score\">{}: <strong>{:.1}</strong></div>\n",
            name, value
        ));
    }
    page.push_str("</div>\n");

    if !report.warnings.is_empty() {
        page.push_str("<ul class=\"warn\">\n");
        for warning in &report.warnings {
            page.push_str(&format!("    <li>{}</li>\n", escape(&warning.to_string())));
        }
        page.push_str("</ul>\n");
    }

    page.push_str("<p><a href=\"/\">Scout another player</a></p>\n");
    page.push_str(&footer());
    page.push_str(PAGE_TAIL);
    page
}

pub fn render_error(message: &str) -> String {
    let mut page = String::from(PAGE_HEAD);
    page.push_str("<h1>PUBG PRO SCOUT TERMINAL</h1>\n");
    page.push_str(&format!(
        "<section class=\"banner amateur\">\n    <h2>INVALID INPUT</h2>\n    <p>{}</p>\n</section>\n",
        escape(message)
    ));
    page.push_str("<p><a href=\"/\">Back to the form</a></p>\n");
    page.push_str(&footer());
    page.push_str(PAGE_TAIL);
    page
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_prefilled_with_defaults() {
        let page = render_index(&FeatureVector::default());
        assert!(page.contains("name=\"kills\" value=\"5\""));
        assert!(page.contains("name=\"distance\" value=\"1200\""));
        assert!(page.contains("max=\"15000\""));
        assert!(page.contains("action=\"/scout\""));
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("<b>&\"x\"</b>"), "&lt;b&gt;&amp;&quot;x&quot;&lt;/b&gt;");
    }

    #[test]
    fn test_error_page_escapes_message() {
        let page = render_error("<script>");
        assert!(page.contains("&lt;script&gt;"));
        assert!(!page.contains("<script>"));
    }
}
