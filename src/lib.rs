//! Docent - talk to your documents
//!
//! A local-first assistant that turns documents, web pages, audio and video
//! into context for a locally hosted language model.
//!
//! # Overview
//!
//! Docent allows you to:
//! - Extract text from PDF, DOCX, PPTX and XLSX files and from web pages
//! - Transcribe audio, video and microphone input
//! - Ask questions about everything you have loaded
//! - Translate, read aloud, classify sentiment and emotion, or turn a question
//!   into SQL
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration and prompt templates
//! - `source` - Artifact classification and text extraction
//! - `context` - Context assembly for the model
//! - `gateway` - Conversation with the local language model
//! - `media` - Audio extraction and microphone capture
//! - `transcription` - Speech-to-text
//! - `transforms` - Translation, speech, classification and SQL
//! - `session` - Chat transcript and activity log
//! - `voice` - Voice command classification
//! - `orchestrator` - Wires the services together
//!
//! # Example
//!
//! ```rust,no_run
//! use docent::config::Settings;
//! use docent::orchestrator::Orchestrator;
//! use docent::source::Artifact;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings)?;
//!
//!     let report = Artifact::from_path("report.pdf".as_ref()).await?;
//!     let extraction = orchestrator.ingest(&[report]).await;
//!     let answer = orchestrator
//!         .gateway()
//!         .converse("What are the key findings?", &extraction.text)
//!         .await?;
//!     println!("{}", answer);
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod gateway;
pub mod http;
pub mod media;
pub mod orchestrator;
pub mod session;
pub mod source;
pub mod transcription;
pub mod transforms;
pub mod voice;

pub use error::{DocentError, Result};
