//! # brdoc-render
//!
//! Rendering pipeline for generated documents: Markdown → HTML (tables,
//! footnotes, heading anchors) → paginated PDF behind a collaborator
//! `Paginator` seam. File output is atomic (write-temp + rename).

pub mod markdown;
pub mod pdf;
pub mod styles;

pub use markdown::{markdown_to_document, markdown_to_fragment};
pub use pdf::{html_to_blocks, Block, Paginator, PdfOptions, PrintPdfPaginator};
pub use styles::StylePreset;

use std::path::Path;

use brdoc_core::error::{BrError, BrResult};

/// Facade combining the Markdown converter and a paginator.
pub struct Renderer {
    paginator: Box<dyn Paginator>,
}

impl Renderer {
    pub fn new(paginator: Box<dyn Paginator>) -> Self {
        Self { paginator }
    }

    /// Markdown → full HTML document with the named style preset
    /// (unknown names fall back to `default`).
    pub fn to_html(&self, markdown: &str, title: &str, style: &str) -> String {
        markdown_to_document(markdown, title, StylePreset::from_name(style))
    }

    /// Markdown → PDF bytes.
    pub fn to_pdf(&self, markdown: &str, style: &str, options: &PdfOptions) -> BrResult<Vec<u8>> {
        let html = self.to_html(markdown, &options.title, style);
        self.paginator.paginate(&html, options)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(Box::new(PrintPdfPaginator))
    }
}

/// Atomically write bytes to a path: write to a temporary sibling, then
/// rename over the target.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> BrResult<()> {
    let parent = path
        .parent()
        .ok_or_else(|| BrError::render(format!("path {path:?} has no parent")))?;
    std::fs::create_dir_all(parent)?;
    let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
    std::io::Write::write_all(&mut tmp, bytes)?;
    tmp.persist(path)
        .map_err(|e| BrError::render(format!("atomic rename failed: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn atomic_write_replaces_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out/doc.pdf");
        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"second");
    }

    #[test]
    fn renderer_produces_pdf_from_markdown() {
        let renderer = Renderer::default();
        let bytes = renderer
            .to_pdf(
                "# Dokumentacja\n\nTreść dokumentu B+R.",
                "br_document",
                &PdfOptions::default(),
            )
            .unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn unknown_style_uses_default() {
        let renderer = Renderer::default();
        let html = renderer.to_html("# X", "Tytuł", "nonexistent");
        assert!(html.contains("Segoe UI"));
    }
}
