//! Markdown → HTML conversion, Polish-text safe.

use pulldown_cmark::{html, Options, Parser};

use crate::styles::StylePreset;

/// Convert Markdown to an HTML fragment with tables, footnotes,
/// strikethrough, and task lists enabled.
pub fn markdown_to_fragment(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_HEADING_ATTRIBUTES);

    let parser = Parser::new_ext(markdown, options);
    let mut out = String::with_capacity(markdown.len() * 2);
    html::push_html(&mut out, parser);
    out
}

/// Convert Markdown to a complete `lang="pl"` HTML document with the
/// given stylesheet preset inlined.
pub fn markdown_to_document(markdown: &str, title: &str, preset: StylePreset) -> String {
    let fragment = markdown_to_fragment(markdown);
    format!(
        r#"<!DOCTYPE html>
<html lang="pl">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>
{css}
    </style>
</head>
<body>
    <div class="document">
        {fragment}
    </div>
</body>
</html>
"#,
        title = escape_html(title),
        css = preset.css(),
        fragment = fragment,
    )
}

/// Minimal HTML text escaping for attribute/title positions.
pub fn escape_html(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '&' => "&amp;".to_string(),
            '<' => "&lt;".to_string(),
            '>' => "&gt;".to_string(),
            '"' => "&quot;".to_string(),
            c => c.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_and_headings_convert() {
        let md = "# Tytuł\n\n| A | B |\n|---|---|\n| 1 | 2 |\n";
        let html = markdown_to_fragment(md);
        assert!(html.contains("<h1"));
        assert!(html.contains("<table>"));
        assert!(html.contains("<td>1</td>"));
    }

    #[test]
    fn footnotes_convert() {
        let md = "Koszt: **50 000,00 zł**[^1]\n\n[^1]: Źródło: [expenses](http://x/api)\n";
        let html = markdown_to_fragment(md);
        assert!(html.contains("footnote"), "html: {html}");
    }

    #[test]
    fn polish_diacritics_survive() {
        let md = "# Przypisy źródłowe\n\nZażółć gęślą jaźń";
        let doc = markdown_to_document(md, "Dokument", StylePreset::Default);
        assert!(doc.contains("Zażółć gęślą jaźń"));
        assert!(doc.contains(r#"<html lang="pl">"#));
    }

    #[test]
    fn title_is_escaped() {
        let doc = markdown_to_document("x", "<script>", StylePreset::Minimal);
        assert!(doc.contains("&lt;script&gt;"));
    }
}
