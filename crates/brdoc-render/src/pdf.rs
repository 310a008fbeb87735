//! HTML → paginated PDF.
//!
//! The paginator is a collaborator seam: the built-in implementation
//! performs block layout with word wrap and page breaks via printpdf.
//! Built-in PDF fonts are WinAnsi-encoded and cannot carry every Polish
//! diacritic, so the paginator embeds a configured TTF when available
//! and transliterates otherwise.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument};
use tracing::debug;

use brdoc_core::error::{BrError, BrResult};

/// A text block extracted from HTML for pagination.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Heading(u8, String),
    Paragraph(String),
    ListItem(String),
    TableRow(String),
    Code(String),
    Rule,
}

/// PDF rendering options.
#[derive(Debug, Clone)]
pub struct PdfOptions {
    pub title: String,
    /// TTF with Latin Extended coverage; without it Polish diacritics
    /// are transliterated for the built-in Helvetica.
    pub font_path: Option<PathBuf>,
}

impl Default for PdfOptions {
    fn default() -> Self {
        Self {
            title: "Dokument".to_string(),
            font_path: None,
        }
    }
}

/// The HTML → PDF collaborator interface.
pub trait Paginator: Send + Sync {
    /// Paginate the given HTML into PDF bytes.
    fn paginate(&self, html: &str, options: &PdfOptions) -> BrResult<Vec<u8>>;
}

/// Extract a flat block list from generated HTML.
///
/// This only understands the tag set our own Markdown conversion emits;
/// it is not a general HTML parser.
pub fn html_to_blocks(html: &str) -> Vec<Block> {
    // Drop the head (embedded CSS would otherwise leak into text).
    let body = match (html.find("<body"), html.rfind("</body>")) {
        (Some(start), Some(end)) if start < end => &html[start..end],
        _ => html,
    };

    let mut blocks = Vec::new();
    let mut rest = body;

    while let Some(open) = rest.find('<') {
        let Some(close) = rest[open..].find('>') else {
            break;
        };
        let tag_body = &rest[open + 1..open + close];
        let tag_name: String = tag_body
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        rest = &rest[open + close + 1..];

        let grab = |rest: &str, closing: &str| -> (String, usize) {
            match rest.find(closing) {
                Some(end) => (strip_tags(&rest[..end]), end + closing.len()),
                None => (strip_tags(rest), rest.len()),
            }
        };

        match tag_name.as_str() {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level: u8 = tag_name[1..].parse().unwrap_or(1);
                let (text, consumed) = grab(rest, &format!("</{tag_name}>"));
                rest = &rest[consumed..];
                if !text.trim().is_empty() {
                    blocks.push(Block::Heading(level, text.trim().to_string()));
                }
            }
            "p" => {
                let (text, consumed) = grab(rest, "</p>");
                rest = &rest[consumed..];
                if !text.trim().is_empty() {
                    blocks.push(Block::Paragraph(text.trim().to_string()));
                }
            }
            "li" => {
                let (text, consumed) = grab(rest, "</li>");
                rest = &rest[consumed..];
                if !text.trim().is_empty() {
                    blocks.push(Block::ListItem(text.trim().to_string()));
                }
            }
            "tr" => {
                let (row, consumed) = grab_row(rest);
                rest = &rest[consumed..];
                if !row.trim().is_empty() {
                    blocks.push(Block::TableRow(row));
                }
            }
            "pre" => {
                let (text, consumed) = grab(rest, "</pre>");
                rest = &rest[consumed..];
                for line in text.lines() {
                    if !line.trim().is_empty() {
                        blocks.push(Block::Code(line.to_string()));
                    }
                }
            }
            "hr" => blocks.push(Block::Rule),
            _ => {}
        }
    }
    blocks
}

fn grab_row(rest: &str) -> (String, usize) {
    let end = rest.find("</tr>").unwrap_or(rest.len());
    let row_html = &rest[..end];
    let mut cells = Vec::new();
    let mut cursor = row_html;
    loop {
        let Some(open) = cursor.find('<') else { break };
        let Some(close) = cursor[open..].find('>') else {
            break;
        };
        let tag = cursor[open + 1..open + close].to_lowercase();
        cursor = &cursor[open + close + 1..];
        if tag.starts_with("td") || tag.starts_with("th") {
            let cell_end = cursor.find("</").unwrap_or(cursor.len());
            cells.push(strip_tags(&cursor[..cell_end]).trim().to_string());
            cursor = &cursor[cell_end..];
        }
    }
    (cells.join(" | "), (end + 5).min(rest.len()))
}

fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }
    decode_entities(&out)
}

fn decode_entities(text: &str) -> String {
    text.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
}

/// Map Polish diacritics onto their ASCII base letters for the WinAnsi
/// built-in fonts.
fn transliterate_pl(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'ą' => 'a',
            'ć' => 'c',
            'ę' => 'e',
            'ł' => 'l',
            'ń' => 'n',
            'ó' => 'o',
            'ś' => 's',
            'ź' | 'ż' => 'z',
            'Ą' => 'A',
            'Ć' => 'C',
            'Ę' => 'E',
            'Ł' => 'L',
            'Ń' => 'N',
            'Ó' => 'O',
            'Ś' => 'S',
            'Ź' | 'Ż' => 'Z',
            '×' => 'x',
            '✓' => '+',
            '✗' => '-',
            '€' => 'E',
            c => c,
        })
        .collect()
}

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 20.0;
/// Average glyph width as a fraction of font size, for wrap estimation.
const GLYPH_WIDTH_RATIO: f32 = 0.52;

/// Built-in paginator based on printpdf.
pub struct PrintPdfPaginator;

impl PrintPdfPaginator {
    fn font_size(block: &Block) -> f32 {
        match block {
            Block::Heading(1, _) => 18.0,
            Block::Heading(2, _) => 14.0,
            Block::Heading(_, _) => 12.0,
            Block::TableRow(_) => 9.0,
            Block::Code(_) => 9.0,
            _ => 10.5,
        }
    }

    fn leading(block: &Block) -> f32 {
        Self::font_size(block) * 0.55
    }

    fn wrap(text: &str, font_size: f32) -> Vec<String> {
        let usable_mm = PAGE_WIDTH_MM - 2.0 * MARGIN_MM;
        // pt → mm ≈ 0.3528
        let glyph_mm = font_size * GLYPH_WIDTH_RATIO * 0.3528;
        let max_chars = ((usable_mm / glyph_mm) as usize).max(20);

        let mut lines = Vec::new();
        let mut current = String::new();
        for word in text.split_whitespace() {
            if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > max_chars
            {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
        if !current.is_empty() {
            lines.push(current);
        }
        if lines.is_empty() {
            lines.push(String::new());
        }
        lines
    }
}

impl Paginator for PrintPdfPaginator {
    fn paginate(&self, html: &str, options: &PdfOptions) -> BrResult<Vec<u8>> {
        let blocks = html_to_blocks(html);
        debug!(blocks = blocks.len(), "paginating html");

        let (doc, first_page, first_layer) = PdfDocument::new(
            options.title.clone(),
            Mm(PAGE_WIDTH_MM as _),
            Mm(PAGE_HEIGHT_MM as _),
            "Layer 1",
        );

        // Embed a Unicode-capable font when configured.
        let (font, embedded): (IndirectFontRef, bool) = match &options.font_path {
            Some(path) => {
                let file = File::open(path)
                    .map_err(|e| BrError::render(format!("font {path:?}: {e}")))?;
                let font = doc
                    .add_external_font(BufReader::new(file))
                    .map_err(|e| BrError::render(e.to_string()))?;
                (font, true)
            }
            None => {
                let font = doc
                    .add_builtin_font(BuiltinFont::Helvetica)
                    .map_err(|e| BrError::render(e.to_string()))?;
                (font, false)
            }
        };
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| BrError::render(e.to_string()))?;

        let mut layer = doc.get_page(first_page).get_layer(first_layer);
        let mut cursor_y = PAGE_HEIGHT_MM - MARGIN_MM;

        for block in &blocks {
            let size = Self::font_size(block);
            let leading = Self::leading(block);
            let (text, indent) = match block {
                Block::Heading(_, t) => (t.clone(), 0.0),
                Block::Paragraph(t) => (t.clone(), 0.0),
                Block::ListItem(t) => (format!("• {t}"), 4.0),
                Block::TableRow(t) => (t.clone(), 2.0),
                Block::Code(t) => (t.clone(), 4.0),
                Block::Rule => {
                    cursor_y -= 4.0;
                    continue;
                }
            };

            let rendered = if embedded {
                text
            } else {
                transliterate_pl(&text)
            };

            for line in Self::wrap(&rendered, size) {
                let line_height = size * 0.3528 + leading * 0.3528;
                if cursor_y - line_height < MARGIN_MM {
                    let (page, new_layer) =
                        doc.add_page(Mm(PAGE_WIDTH_MM as _), Mm(PAGE_HEIGHT_MM as _), "Layer 1");
                    layer = doc.get_page(page).get_layer(new_layer);
                    cursor_y = PAGE_HEIGHT_MM - MARGIN_MM;
                }
                cursor_y -= line_height;
                let used_font = if matches!(block, Block::Heading(_, _)) && !embedded {
                    &bold
                } else {
                    &font
                };
                layer.use_text(line, size as _, Mm((MARGIN_MM + indent) as _), Mm(cursor_y as _), used_font);
            }
            // Space after the block.
            cursor_y -= leading * 0.3528;
        }

        doc.save_to_bytes().map_err(|e| BrError::render(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::markdown_to_document;
    use crate::styles::StylePreset;

    #[test]
    fn blocks_extract_headings_tables_and_paragraphs() {
        let md = "# Tytuł\n\nAkapit tekstu.\n\n| A | B |\n|---|---|\n| 1 | 2 |\n\n- pozycja\n";
        let html = markdown_to_document(md, "t", StylePreset::Minimal);
        let blocks = html_to_blocks(&html);

        assert!(blocks.contains(&Block::Heading(1, "Tytuł".to_string())));
        assert!(blocks.contains(&Block::Paragraph("Akapit tekstu.".to_string())));
        assert!(blocks.iter().any(|b| matches!(b, Block::TableRow(r) if r == "A | B")));
        assert!(blocks.iter().any(|b| matches!(b, Block::TableRow(r) if r == "1 | 2")));
        assert!(blocks.contains(&Block::ListItem("pozycja".to_string())));
    }

    #[test]
    fn css_does_not_leak_into_blocks() {
        let html = markdown_to_document("# X\n\ntekst", "t", StylePreset::Default);
        let blocks = html_to_blocks(&html);
        assert!(!blocks
            .iter()
            .any(|b| matches!(b, Block::Paragraph(t) if t.contains("font-family"))));
    }

    #[test]
    fn transliteration_covers_polish_alphabet() {
        assert_eq!(transliterate_pl("Zażółć gęślą jaźń"), "Zazolc gesla jazn");
        assert_eq!(transliterate_pl("ŁÓDŹ ŻÓŁW"), "LODZ ZOLW");
    }

    #[test]
    fn pdf_bytes_are_produced_and_paginated() {
        let mut md = String::from("# Dokumentacja B+R\n\n");
        for i in 0..200 {
            md.push_str(&format!("Wiersz treści numer {i} z opisem prac badawczych.\n\n"));
        }
        let html = markdown_to_document(&md, "Dokument", StylePreset::BrDocument);
        let bytes = PrintPdfPaginator
            .paginate(&html, &PdfOptions::default())
            .unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        // 200 paragraphs cannot fit one A4 page.
        let count_pages = bytes.windows(5).filter(|w| w == b"/Page").count();
        assert!(count_pages > 1);
    }

    #[test]
    fn wrap_limits_line_length() {
        let long = "słowo ".repeat(100);
        let lines = PrintPdfPaginator::wrap(&long, 10.5);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| l.chars().count() <= 110));
    }
}
