//! Docent CLI entry point.

use anyhow::Result;
use clap::Parser;
use docent::cli::{commands, Cli, Commands};
use docent::config::Settings;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("docent={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Load configuration
    let config_path = cli.config.as_ref().map(PathBuf::from);
    let settings = Settings::load_from(config_path.as_ref())?;

    // Ensure data directories exist
    std::fs::create_dir_all(settings.data_dir())?;
    std::fs::create_dir_all(settings.temp_dir())?;

    // Execute command
    match &cli.command {
        Commands::Doctor => {
            commands::run_doctor(&settings).await?;
        }

        Commands::Chat {
            file,
            url,
            model,
            speak,
        } => {
            commands::run_chat(file, url.as_deref(), model.clone(), *speak, settings).await?;
        }

        Commands::Ask {
            question,
            file,
            url,
            model,
        } => {
            commands::run_ask(question, file, url.as_deref(), model.clone(), settings).await?;
        }

        Commands::Extract { files, output } => {
            commands::run_extract(files, output.as_deref(), settings).await?;
        }

        Commands::Fetch { url, output } => {
            commands::run_fetch(url, output.as_deref(), settings).await?;
        }

        Commands::ExtractAudio { video, output } => {
            commands::run_extract_audio(video, output.as_deref(), settings).await?;
        }

        Commands::Transcribe {
            input,
            analyze,
            output,
        } => {
            commands::run_transcribe(input, *analyze, output.as_deref(), settings).await?;
        }

        Commands::Listen { command } => {
            commands::run_listen(*command, settings).await?;
        }

        Commands::Translate { text, to, file } => {
            commands::run_translate(text.as_deref(), to, file, settings).await?;
        }

        Commands::Speak { text, output } => {
            commands::run_speak(text, output.as_deref(), settings).await?;
        }

        Commands::Podcast { pdf, output } => {
            commands::run_podcast(pdf, output.as_deref(), settings).await?;
        }

        Commands::Analyze { text, file } => {
            commands::run_analyze(text.as_deref(), file, settings).await?;
        }

        Commands::Sql { query } => {
            commands::run_sql(query, settings).await?;
        }

        Commands::Serve { host, port } => {
            commands::run_serve(host, *port, settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(action, config_path.as_deref(), settings)?;
        }
    }

    Ok(())
}
