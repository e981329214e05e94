//! CLI output formatting utilities.

use crate::source::ExtractionWarning;
use crate::transforms::{EmotionScores, Sentiment};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a list item.
    pub fn list_item(msg: &str) {
        println!("  {} {}", style("*").cyan(), msg);
    }

    /// Print every extraction warning.
    pub fn extraction_warnings(warnings: &[ExtractionWarning]) {
        for w in warnings {
            Self::warning(&w.to_string());
        }
    }

    /// Print an optional transform warning.
    pub fn transform_warning(warning: Option<&str>) {
        if let Some(w) = warning {
            Self::warning(w);
        }
    }

    /// Print a sentiment label with its score.
    pub fn sentiment(sentiment: &Sentiment) {
        println!(
            "  {} {} ({:.2})",
            style("Sentiment:").dim(),
            style(&sentiment.label).bold(),
            sentiment.score
        );
    }

    /// Print emotion scores as a bar chart, highest first.
    pub fn emotions(scores: &EmotionScores) {
        let mut rows: Vec<_> = scores.iter().collect();
        rows.sort_by(|a, b| b.1.total_cmp(&a.1));

        for (emotion, score) in rows {
            let width = (score.clamp(0.0, 1.0) * 30.0).round() as usize;
            println!(
                "  {:<9} {} {:.2}",
                emotion.label(),
                style("#".repeat(width)).cyan(),
                score
            );
        }
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(spinner_style);
        }
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

/// Shorten text to `max_chars` characters for one-line display.
pub fn preview(content: &str, max_chars: usize) -> String {
    let flat = content.replace('\n', " ");
    if flat.chars().count() <= max_chars {
        flat
    } else {
        let cut: String = flat.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}
