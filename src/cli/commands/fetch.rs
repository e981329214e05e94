//! Fetch command implementation.

use super::emit;
use crate::cli::Output;
use crate::config::Settings;
use crate::source::WebReader;
use anyhow::Result;
use std::path::Path;

/// Run the fetch command.
pub async fn run_fetch(url: &str, output: Option<&Path>, settings: Settings) -> Result<()> {
    let reader = WebReader::new(&settings.web)?;

    let spinner = Output::spinner(&format!("Fetching {}...", url));
    let page = reader.fetch_page(url).await;
    spinner.finish_and_clear();

    if !page.warnings.is_empty() {
        Output::extraction_warnings(&page.warnings);
        anyhow::bail!("Could not fetch {}", url);
    }

    emit(&page.text, output)
}
