//! CLI module for Docent.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Docent - talk to your documents
///
/// Load PDFs, Word documents, slide decks, spreadsheets, web pages, audio and
/// video, then ask questions about them with a local language model.
#[derive(Parser, Debug)]
#[command(name = "docent")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check system requirements and configuration
    Doctor,

    /// Start an interactive chat session over loaded sources
    Chat {
        /// Documents, audio or video to load before the first question
        #[arg(short, long)]
        file: Vec<PathBuf>,

        /// Web page to load before the first question
        #[arg(short, long)]
        url: Option<String>,

        /// Model to use instead of the configured one
        #[arg(short, long)]
        model: Option<String>,

        /// Read replies aloud
        #[arg(long)]
        speak: bool,
    },

    /// Ask a single question, optionally about files or a web page
    Ask {
        /// The question to ask
        question: String,

        /// Documents, audio or video to use as context
        #[arg(short, long)]
        file: Vec<PathBuf>,

        /// Web page to use as context
        #[arg(short, long)]
        url: Option<String>,

        /// Model to use instead of the configured one
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Extract plain text from documents, audio or video
    Extract {
        /// Files to read (.pdf, .docx, .pptx, .xlsx, .wav, .mp4, .avi, .mov)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Write text to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Fetch a web page and print its visible text
    Fetch {
        /// Page URL (http or https)
        url: String,

        /// Write text to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Extract the audio track of a video as AAC
    ExtractAudio {
        /// Video file (.mp4, .avi, .mov)
        video: PathBuf,

        /// Where to save the audio (default: a file in the temp directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Transcribe an audio or video file
    Transcribe {
        /// Audio (.wav) or video (.mp4, .avi, .mov) file
        input: PathBuf,

        /// Also run sentiment and emotion analysis on the transcript
        #[arg(short, long)]
        analyze: bool,

        /// Write the transcript to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Listen on the microphone and transcribe one phrase
    Listen {
        /// Interpret the phrase as a voice command and speak a confirmation
        #[arg(long)]
        command: bool,
    },

    /// Translate text or documents
    Translate {
        /// Text to translate (omit when using --file)
        text: Option<String>,

        /// Target language code or name (en, hi, es, fr, de, bn, ta, te)
        #[arg(short, long)]
        to: String,

        /// Documents to extract and translate
        #[arg(short, long)]
        file: Vec<PathBuf>,
    },

    /// Read text aloud
    Speak {
        /// Text to speak
        text: String,

        /// Save the speech as MP3 instead of playing it
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Turn a PDF into an MP3 narration
    Podcast {
        /// PDF file
        pdf: PathBuf,

        /// Where to save the MP3 (default: a file in the temp directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Analyze the sentiment and emotions of text
    Analyze {
        /// Text to analyze (omit when using --file)
        text: Option<String>,

        /// Documents, audio or video to extract and analyze
        #[arg(short, long)]
        file: Vec<PathBuf>,
    },

    /// Convert a natural language question into SQL
    Sql {
        /// The question, e.g. "names of customers who ordered last week"
        query: String,
    },

    /// Start HTTP API server for integration with other systems
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
