//! PDF and Word document readers.

use crate::error::{DocentError, Result};
use tracing::{debug, warn};

/// Extract text from a PDF, one line per text-bearing page.
///
/// `pdf-extract` is tried first. If it fails or panics on a malformed font
/// table, `lopdf`'s page-level text extraction is used instead.
pub fn read_pdf(name: &str, data: &[u8]) -> Result<String> {
    let primary = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(data));

    let pages = match primary {
        Ok(Ok(pages)) => pages,
        Ok(Err(e)) => {
            warn!("pdf-extract failed on {}: {}, trying fallback", name, e);
            read_pdf_fallback(name, data)?
        }
        Err(_) => {
            warn!("pdf-extract panicked on {}, trying fallback", name);
            read_pdf_fallback(name, data)?
        }
    };

    let mut text = String::new();
    for page in pages {
        let page = page.replace('\0', "");
        let page = page.trim();
        if !page.is_empty() {
            text.push_str(page);
            text.push('\n');
        }
    }

    debug!("Read {} chars of PDF text from {}", text.len(), name);
    Ok(text)
}

/// Page-by-page extraction using lopdf directly.
fn read_pdf_fallback(name: &str, data: &[u8]) -> Result<Vec<String>> {
    let doc = lopdf::Document::load_mem(data)
        .map_err(|e| DocentError::extraction(name, format!("Failed to load PDF: {}", e)))?;

    let mut pages = Vec::new();
    for page_number in doc.get_pages().keys() {
        match doc.extract_text(&[*page_number]) {
            Ok(text) => pages.push(text),
            Err(e) => debug!("No text on page {} of {}: {}", page_number, name, e),
        }
    }

    Ok(pages)
}

/// Extract text from a DOCX, one line per body paragraph.
pub fn read_docx(name: &str, data: &[u8]) -> Result<String> {
    let doc = docx_rs::read_docx(data).map_err(|e| DocentError::extraction(name, e))?;

    let mut text = String::new();
    for child in doc.document.children {
        if let docx_rs::DocumentChild::Paragraph(paragraph) = child {
            for child in paragraph.children {
                if let docx_rs::ParagraphChild::Run(run) = child {
                    for child in run.children {
                        if let docx_rs::RunChild::Text(t) = child {
                            text.push_str(&t.text);
                        }
                    }
                }
            }
            text.push('\n');
        }
    }

    Ok(text)
}
