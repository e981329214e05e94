//! Ask command implementation.

use super::{load_artifacts, with_model};
use crate::cli::Output;
use crate::config::Settings;
use crate::context::assemble;
use crate::orchestrator::Orchestrator;
use anyhow::Result;
use std::path::PathBuf;

/// Run the ask command.
pub async fn run_ask(
    question: &str,
    files: &[PathBuf],
    url: Option<&str>,
    model: Option<String>,
    settings: Settings,
) -> Result<()> {
    if question.trim().is_empty() {
        anyhow::bail!("Please enter a question.");
    }

    let artifacts = load_artifacts(files).await?;
    let orchestrator = Orchestrator::new(with_model(settings, model))?;

    let mut fragments = Vec::new();
    if !artifacts.is_empty() {
        let spinner = Output::spinner("Reading files...");
        let extraction = orchestrator.ingest(&artifacts).await;
        spinner.finish_and_clear();
        Output::extraction_warnings(&extraction.warnings);
        fragments.push(extraction.text);
    }
    if let Some(url) = url {
        let page = orchestrator.fetch_page(url).await;
        Output::extraction_warnings(&page.warnings);
        fragments.push(page.text);
    }
    let context = assemble(&fragments);

    let spinner = Output::spinner(&format!(
        "Asking {}...",
        orchestrator.gateway().model_name()
    ));
    let result = orchestrator.gateway().converse(question.trim(), &context).await;
    spinner.finish_and_clear();

    match result {
        Ok(reply) => {
            println!("\n{}\n", reply.trim());
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Failed to generate answer: {}", e));
            Output::info("Run 'docent doctor' to check that the model server is running.");
            Err(e.into())
        }
    }
}
