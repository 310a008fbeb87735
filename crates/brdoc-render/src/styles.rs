//! Stylesheet presets for rendered documents.
//!
//! Styles are a collaborator concern; three presets are recognised by
//! name and unknown names fall back to `default`.

/// Named stylesheet presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StylePreset {
    Default,
    BrDocument,
    Minimal,
}

impl StylePreset {
    /// Resolve a preset by name; unknown names map to `Default`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "br_document" => StylePreset::BrDocument,
            "minimal" => StylePreset::Minimal,
            _ => StylePreset::Default,
        }
    }

    /// CSS of the preset, inlined into generated HTML documents.
    pub fn css(&self) -> &'static str {
        match self {
            StylePreset::Default => DEFAULT_CSS,
            StylePreset::BrDocument => BR_DOCUMENT_CSS,
            StylePreset::Minimal => MINIMAL_CSS,
        }
    }
}

const DEFAULT_CSS: &str = r#"
body {
    font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif;
    font-size: 14px;
    line-height: 1.6;
    color: #1f2937;
    margin: 0;
    padding: 20px;
}
.document {
    max-width: 800px;
    margin: 0 auto;
    padding: 40px;
    background: white;
}
h1, h2, h3, h4 {
    margin-top: 1.5em;
    margin-bottom: 0.5em;
    font-weight: 600;
    line-height: 1.3;
}
h1 { font-size: 2em; border-bottom: 2px solid #2563eb; padding-bottom: 0.3em; }
h2 { font-size: 1.5em; border-bottom: 1px solid #e5e7eb; padding-bottom: 0.3em; }
h3 { font-size: 1.25em; }
table {
    width: 100%;
    border-collapse: collapse;
    margin: 1em 0;
    font-size: 0.9em;
}
th, td {
    padding: 10px 12px;
    border: 1px solid #e5e7eb;
    text-align: left;
}
th { background: #f3f4f6; font-weight: 600; }
tr:nth-child(even) { background: #f9fafb; }
code {
    font-family: 'Consolas', 'Monaco', monospace;
    font-size: 0.9em;
    background: #f3f4f6;
    padding: 2px 6px;
    border-radius: 3px;
}
pre { background: #f3f4f6; padding: 12px; overflow-x: auto; }
.footnotes { font-size: 0.85em; color: #6b7280; margin-top: 2em; }
"#;

const BR_DOCUMENT_CSS: &str = r#"
body {
    font-family: 'Times New Roman', Georgia, serif;
    font-size: 12pt;
    line-height: 1.5;
    color: #111827;
    margin: 0;
    padding: 25mm 20mm;
}
.document { max-width: 170mm; margin: 0 auto; }
h1 {
    font-size: 16pt;
    text-align: center;
    text-transform: uppercase;
    border-bottom: 2px solid #111827;
    padding-bottom: 6pt;
}
h2 { font-size: 13pt; margin-top: 14pt; }
h3 { font-size: 12pt; font-style: italic; }
table {
    width: 100%;
    border-collapse: collapse;
    margin: 8pt 0;
    font-size: 10pt;
}
th, td { padding: 4pt 6pt; border: 1px solid #111827; }
th { background: #f3f4f6; }
.footnotes { font-size: 9pt; border-top: 1px solid #111827; margin-top: 16pt; }
@page { size: A4; margin: 25mm 20mm; }
"#;

const MINIMAL_CSS: &str = r#"
body {
    font-family: sans-serif;
    font-size: 13px;
    line-height: 1.5;
    color: #000;
    margin: 20px;
}
h1 { font-size: 1.6em; }
h2 { font-size: 1.3em; }
table { border-collapse: collapse; }
th, td { padding: 4px 8px; border: 1px solid #999; }
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_preset_falls_back_to_default() {
        assert_eq!(StylePreset::from_name("default"), StylePreset::Default);
        assert_eq!(StylePreset::from_name("br_document"), StylePreset::BrDocument);
        assert_eq!(StylePreset::from_name("minimal"), StylePreset::Minimal);
        assert_eq!(StylePreset::from_name("fancy"), StylePreset::Default);
    }
}
