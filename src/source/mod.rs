//! Source readers: turn uploaded artifacts and web pages into plain text.
//!
//! Every reader is isolated per artifact. A corrupt file becomes an
//! [`ExtractionWarning`] and an empty fragment, and the rest of the batch still
//! runs.

mod document;
mod slides;
mod spreadsheet;
mod web;

pub use document::{read_docx, read_pdf};
pub use slides::read_pptx;
pub use spreadsheet::read_xlsx;
pub use web::{visible_text, WebReader};

use crate::error::{DocentError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, instrument, warn};

/// Closed set of artifact kinds accepted at the upload boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Pdf,
    Docx,
    Pptx,
    Xlsx,
    Audio,
    Video,
}

/// Accepted video container extensions.
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov"];

impl ArtifactKind {
    /// Classify a file name by extension. Unknown extensions are rejected.
    pub fn from_file_name(name: &str) -> Result<Self> {
        let extension = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "pdf" => Ok(ArtifactKind::Pdf),
            "docx" => Ok(ArtifactKind::Docx),
            "pptx" => Ok(ArtifactKind::Pptx),
            "xlsx" => Ok(ArtifactKind::Xlsx),
            "wav" => Ok(ArtifactKind::Audio),
            ext if VIDEO_EXTENSIONS.contains(&ext) => Ok(ArtifactKind::Video),
            "" => Err(DocentError::InvalidInput(format!(
                "{} has no file extension",
                name
            ))),
            ext => Err(DocentError::InvalidInput(format!(
                "Unsupported file type .{} ({}). Supported: .pdf .docx .pptx .xlsx .mp4 .avi .mov .wav",
                ext, name
            ))),
        }
    }

    /// Whether this kind is read as a document (as opposed to transcribed media).
    pub fn is_document(&self) -> bool {
        matches!(
            self,
            ArtifactKind::Pdf | ArtifactKind::Docx | ArtifactKind::Pptx | ArtifactKind::Xlsx
        )
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ArtifactKind::Pdf => "pdf",
            ArtifactKind::Docx => "docx",
            ArtifactKind::Pptx => "pptx",
            ArtifactKind::Xlsx => "xlsx",
            ArtifactKind::Audio => "audio",
            ArtifactKind::Video => "video",
        };
        write!(f, "{}", name)
    }
}

/// One uploaded file: raw bytes plus its validated kind.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub name: String,
    pub kind: ArtifactKind,
    pub bytes: Vec<u8>,
}

impl Artifact {
    /// Build an artifact, validating the kind from the file name.
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Result<Self> {
        let name = name.into();
        let kind = ArtifactKind::from_file_name(&name)?;
        Ok(Self { name, kind, bytes })
    }

    /// Read an artifact from disk.
    pub async fn from_path(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| DocentError::InvalidInput(format!("Invalid path: {}", path.display())))?
            .to_string();
        let kind = ArtifactKind::from_file_name(&name)?;
        let bytes = tokio::fs::read(path).await?;
        Ok(Self { name, kind, bytes })
    }

    /// File extension as uploaded, used for temp file suffixes.
    pub fn extension(&self) -> &str {
        Path::new(&self.name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("bin")
    }
}

/// A per-file, non-fatal extraction problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionWarning {
    pub file_name: String,
    pub reason: String,
}

impl std::fmt::Display for ExtractionWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Error reading {}: {}", self.file_name, self.reason)
    }
}

/// Extracted text together with the reasons any part of it is missing.
///
/// Empty text without warnings means nothing was extractable; empty text with
/// warnings means extraction failed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Extraction {
    pub text: String,
    pub warnings: Vec<ExtractionWarning>,
}

impl Extraction {
    /// A successful extraction.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            warnings: Vec::new(),
        }
    }

    /// A failed extraction with a single warning.
    pub fn failed(file_name: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self {
            text: String::new(),
            warnings: vec![ExtractionWarning {
                file_name: file_name.into(),
                reason: reason.to_string(),
            }],
        }
    }

    /// True if extraction produced no text at all.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Append another extraction, preserving order.
    pub fn merge(&mut self, other: Extraction) {
        self.text.push_str(&other.text);
        self.warnings.extend(other.warnings);
    }
}

/// Extract text from a single document artifact.
///
/// Media artifacts are rejected; they go through transcription instead.
pub fn read_artifact(artifact: &Artifact) -> Result<String> {
    match artifact.kind {
        ArtifactKind::Pdf => read_pdf(&artifact.name, &artifact.bytes),
        ArtifactKind::Docx => read_docx(&artifact.name, &artifact.bytes),
        ArtifactKind::Pptx => read_pptx(&artifact.name, &artifact.bytes),
        ArtifactKind::Xlsx => read_xlsx(&artifact.name, &artifact.bytes),
        ArtifactKind::Audio | ArtifactKind::Video => Err(DocentError::InvalidInput(format!(
            "{} is a media file and must be transcribed",
            artifact.name
        ))),
    }
}

/// Extract and concatenate text from a batch of document artifacts.
///
/// Each artifact's text is followed by a newline. A failing artifact adds a
/// warning naming the file and contributes nothing.
#[instrument(skip_all, fields(count = artifacts.len()))]
pub fn read_batch(artifacts: &[Artifact]) -> Extraction {
    let mut extraction = Extraction::default();

    for artifact in artifacts {
        match read_artifact(artifact) {
            Ok(text) => {
                debug!("Extracted {} chars from {}", text.len(), artifact.name);
                extraction.text.push_str(&text);
                extraction.text.push('\n');
            }
            Err(e) => {
                warn!("Skipping {}: {}", artifact.name, e);
                let reason = match e {
                    DocentError::Extraction { reason, .. } => reason,
                    other => other.to_string(),
                };
                extraction.warnings.push(ExtractionWarning {
                    file_name: artifact.name.clone(),
                    reason,
                });
            }
        }
    }

    extraction
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! In-memory document builders shared by reader tests.

    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};
    use std::io::{Cursor, Write};

    /// Build a one-page PDF per entry in `pages`.
    pub fn pdf(pages: &[&str]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids = Vec::new();
        for text in pages {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![72.into(), 700.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id = doc.add_object(Stream::new(
                dictionary! {},
                content.encode().expect("encode content"),
            ));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut out = Vec::new();
        doc.save_to(&mut out).expect("save pdf");
        out
    }

    /// Build a DOCX with one paragraph per entry.
    pub fn docx(paragraphs: &[&str]) -> Vec<u8> {
        let mut docx = docx_rs::Docx::new();
        for text in paragraphs {
            docx = docx.add_paragraph(
                docx_rs::Paragraph::new().add_run(docx_rs::Run::new().add_text(*text)),
            );
        }
        let mut buf = Cursor::new(Vec::new());
        docx.build().pack(&mut buf).expect("pack docx");
        buf.into_inner()
    }

    /// Build a zip archive from (path, contents) pairs.
    pub fn zip(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default();
        for (name, contents) in entries {
            writer.start_file(*name, options).expect("start zip entry");
            writer.write_all(contents.as_bytes()).expect("write zip entry");
        }
        writer.finish().expect("finish zip").into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_file_name() {
        assert_eq!(ArtifactKind::from_file_name("a.pdf").unwrap(), ArtifactKind::Pdf);
        assert_eq!(ArtifactKind::from_file_name("Report.DOCX").unwrap(), ArtifactKind::Docx);
        assert_eq!(ArtifactKind::from_file_name("deck.pptx").unwrap(), ArtifactKind::Pptx);
        assert_eq!(ArtifactKind::from_file_name("q3.xlsx").unwrap(), ArtifactKind::Xlsx);
        assert_eq!(ArtifactKind::from_file_name("clip.MOV").unwrap(), ArtifactKind::Video);
        assert_eq!(ArtifactKind::from_file_name("clip.avi").unwrap(), ArtifactKind::Video);
        assert_eq!(ArtifactKind::from_file_name("memo.wav").unwrap(), ArtifactKind::Audio);
    }

    #[test]
    fn test_kind_rejects_unknown() {
        assert!(matches!(
            ArtifactKind::from_file_name("notes.txt"),
            Err(DocentError::InvalidInput(_))
        ));
        assert!(matches!(
            ArtifactKind::from_file_name("README"),
            Err(DocentError::InvalidInput(_))
        ));
        assert!(Artifact::new("song.mp3", vec![]).is_err());
    }

    #[test]
    fn test_valid_and_corrupt_pdf_batch() {
        let artifacts = vec![
            Artifact::new("good.pdf", fixtures::pdf(&["Quarterly revenue grew"])).unwrap(),
            Artifact::new("broken.pdf", b"%PDF-1.4 this is not really a pdf".to_vec()).unwrap(),
        ];

        let extraction = read_batch(&artifacts);

        assert!(extraction.text.contains("Quarterly revenue grew"));
        assert_eq!(extraction.warnings.len(), 1);
        assert_eq!(extraction.warnings[0].file_name, "broken.pdf");
        assert!(extraction.warnings[0].to_string().contains("broken.pdf"));
    }

    #[test]
    fn test_batch_preserves_order_across_kinds() {
        let artifacts = vec![
            Artifact::new("first.docx", fixtures::docx(&["alpha"])).unwrap(),
            Artifact::new("corrupt.xlsx", b"nope".to_vec()).unwrap(),
            Artifact::new("second.docx", fixtures::docx(&["omega"])).unwrap(),
        ];

        let extraction = read_batch(&artifacts);

        assert_eq!(extraction.text, "alpha\n\nomega\n\n");
        assert_eq!(extraction.warnings.len(), 1);
        assert_eq!(extraction.warnings[0].file_name, "corrupt.xlsx");
    }

    #[test]
    fn test_batch_rejects_media_with_warning() {
        let artifacts = vec![Artifact::new("memo.wav", vec![0u8; 16]).unwrap()];
        let extraction = read_batch(&artifacts);
        assert!(extraction.is_empty());
        assert_eq!(extraction.warnings.len(), 1);
    }

    #[test]
    fn test_empty_batch() {
        let extraction = read_batch(&[]);
        assert_eq!(extraction, Extraction::default());
    }

    #[test]
    fn test_merge_keeps_order() {
        let mut a = Extraction::text("one\n");
        a.merge(Extraction::failed("x.pdf", "bad"));
        a.merge(Extraction::text("two\n"));
        assert_eq!(a.text, "one\ntwo\n");
        assert_eq!(a.warnings.len(), 1);
    }

    #[tokio::test]
    async fn test_from_path_reads_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.docx");
        std::fs::write(&path, fixtures::docx(&["from disk"])).unwrap();

        let artifact = Artifact::from_path(&path).await.unwrap();
        assert_eq!(artifact.kind, ArtifactKind::Docx);
        assert_eq!(artifact.extension(), "docx");
        assert_eq!(read_artifact(&artifact).unwrap(), "from disk\n");
    }
}
