//! SQL command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the sql command.
pub async fn run_sql(query: &str, settings: Settings) -> Result<()> {
    let orchestrator = Orchestrator::new(settings)?;

    let spinner = Output::spinner("Generating SQL...");
    let sql = orchestrator.to_sql(query).await;
    spinner.finish_and_clear();

    Output::transform_warning(sql.warning.as_deref());
    if !sql.value.is_empty() {
        println!("{}", sql.value);
    }
    Ok(())
}
