//! PowerPoint (.pptx) reader.
//!
//! A pptx is a zip of XML parts. Slides live at `ppt/slides/slideN.xml`; each
//! `<p:sp>` shape carries a text body made of `<a:p>` paragraphs and `<a:t>` runs.

use crate::error::{DocentError, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::Read;

const SLIDE_PREFIX: &str = "ppt/slides/slide";

/// Extract text from every shape on every slide, in slide order.
///
/// Each shape's text (paragraphs joined by newlines) is followed by a newline.
pub fn read_pptx(name: &str, data: &[u8]) -> Result<String> {
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(data))
        .map_err(|e| DocentError::extraction(name, e))?;

    let mut slides: Vec<(u32, String)> = archive
        .file_names()
        .filter_map(|entry| {
            let number = entry
                .strip_prefix(SLIDE_PREFIX)?
                .strip_suffix(".xml")?
                .parse::<u32>()
                .ok()?;
            Some((number, entry.to_string()))
        })
        .collect();

    if slides.is_empty() {
        return Err(DocentError::extraction(name, "no slides found in presentation"));
    }

    slides.sort_by_key(|(number, _)| *number);

    let mut text = String::new();
    for (_, entry) in slides {
        let mut xml = String::new();
        archive
            .by_name(&entry)
            .map_err(|e| DocentError::extraction(name, e))?
            .read_to_string(&mut xml)
            .map_err(|e| DocentError::extraction(name, e))?;

        for shape in shape_texts(&xml).map_err(|e| DocentError::extraction(name, e))? {
            text.push_str(&shape);
            text.push('\n');
        }
    }

    Ok(text)
}

/// Collect the text of each text-bearing shape in a slide's XML.
fn shape_texts(xml: &str) -> std::result::Result<Vec<String>, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);

    let mut shapes = Vec::new();
    let mut paragraphs: Vec<String> = Vec::new();
    let mut paragraph = String::new();
    let mut in_shape = false;
    let mut has_text_body = false;
    let mut in_run_text = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"sp" => {
                    in_shape = true;
                    has_text_body = false;
                    paragraphs.clear();
                }
                b"txBody" if in_shape => has_text_body = true,
                b"p" if has_text_body => paragraph.clear(),
                b"t" if has_text_body => in_run_text = true,
                _ => {}
            },
            Event::Text(e) if in_run_text => {
                paragraph.push_str(&e.unescape()?);
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"t" => in_run_text = false,
                b"p" if has_text_body => paragraphs.push(std::mem::take(&mut paragraph)),
                b"sp" => {
                    if has_text_body {
                        shapes.push(paragraphs.join("\n"));
                    }
                    in_shape = false;
                    has_text_body = false;
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(shapes)
}
