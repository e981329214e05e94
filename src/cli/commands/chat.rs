//! Interactive chat command.

use super::{load_artifacts, with_model};
use crate::cli::output::preview;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::session::Session;
use anyhow::Result;
use console::style;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::debug;

const HELP: &str = "Commands:
  /load <file>...   add documents, audio or video to the context
  /fetch <url>      load a web page (replaces the previous page)
  /listen           ask a question by voice
  /speak            toggle reading replies aloud
  /history          show the conversation so far
  /activity         show what has been loaded
  /save [path]      export the conversation as JSON
  clear             start over
  exit              quit";

/// A line typed at the chat prompt.
#[derive(Debug, PartialEq)]
enum ChatInput<'a> {
    Message(&'a str),
    Load(Vec<&'a str>),
    Fetch(&'a str),
    Listen,
    ToggleSpeak,
    History,
    Activity,
    Save(Option<&'a str>),
    Clear,
    Help,
    Exit,
    Empty,
}

fn parse_input(line: &str) -> ChatInput<'_> {
    let line = line.trim();
    if line.is_empty() {
        return ChatInput::Empty;
    }
    if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
        return ChatInput::Exit;
    }
    if line.eq_ignore_ascii_case("clear") {
        return ChatInput::Clear;
    }

    let Some(rest) = line.strip_prefix('/') else {
        return ChatInput::Message(line);
    };
    let mut parts = rest.split_whitespace();
    let command = parts.next().unwrap_or_default().to_lowercase();
    let args: Vec<&str> = parts.collect();

    match command.as_str() {
        "load" if !args.is_empty() => ChatInput::Load(args),
        "fetch" if args.len() == 1 => ChatInput::Fetch(args[0]),
        "listen" => ChatInput::Listen,
        "speak" => ChatInput::ToggleSpeak,
        "history" => ChatInput::History,
        "activity" => ChatInput::Activity,
        "save" => ChatInput::Save(args.first().copied()),
        _ => ChatInput::Help,
    }
}

/// Run the interactive chat command.
pub async fn run_chat(
    files: &[PathBuf],
    url: Option<&str>,
    model: Option<String>,
    speak: bool,
    settings: Settings,
) -> Result<()> {
    if speak {
        if let Err(e) = preflight::check(Operation::Speak { playback: true }, &settings) {
            Output::error(&format!("{}", e));
            Output::info("Run 'docent doctor' for detailed diagnostics.");
            return Err(e.into());
        }
    }

    let orchestrator = Orchestrator::new(with_model(settings, model))?;
    let mut session = Session::new();
    let mut speak = speak;

    if !files.is_empty() {
        load_files(&orchestrator, &mut session, files).await;
    }
    if let Some(url) = url {
        fetch(&orchestrator, &mut session, url).await;
    }

    println!("\n{}", style("Docent Chat").bold().cyan());
    println!(
        "{}\n",
        style("Type your questions, '/help' for commands, or 'exit' to quit.").dim()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        match parse_input(&line) {
            ChatInput::Empty => continue,
            ChatInput::Exit => {
                Output::info("Goodbye!");
                break;
            }
            ChatInput::Clear => {
                session.reset();
                Output::info("Conversation and sources cleared.");
            }
            ChatInput::Help => println!("{}", style(HELP).dim()),
            ChatInput::Load(paths) => {
                let paths: Vec<PathBuf> = paths.into_iter().map(PathBuf::from).collect();
                load_files(&orchestrator, &mut session, &paths).await;
            }
            ChatInput::Fetch(url) => fetch(&orchestrator, &mut session, url).await,
            ChatInput::ToggleSpeak => {
                speak = !speak;
                Output::info(if speak { "Speaking replies." } else { "Speech off." });
            }
            ChatInput::History => {
                for entry in &session.transcript {
                    println!("{}", style(&entry.timestamp).dim());
                    println!("  {} {}", style("You:").green(), entry.user_message);
                    println!("  {} {}", style("Bot:").cyan(), preview(&entry.bot_reply, 200));
                }
            }
            ChatInput::Activity => {
                for entry in &session.activity {
                    Output::list_item(&format!("{} {} {}", entry.timestamp, entry.action, entry.detail));
                }
            }
            ChatInput::Save(path) => {
                let path = path.map(PathBuf::from).unwrap_or_else(|| {
                    orchestrator
                        .settings()
                        .data_dir()
                        .join(format!("transcript-{}.json", session.id))
                });
                match session.export_transcript(&path) {
                    Ok(()) => Output::success(&format!("Saved to {}", path.display())),
                    Err(e) => Output::error(&format!("Failed to save: {}", e)),
                }
            }
            ChatInput::Listen => {
                let spinner = Output::spinner("Listening...");
                let heard = orchestrator.listen().await;
                spinner.finish_and_clear();
                match heard {
                    Ok(Ok(text)) => {
                        println!("{} {}", style("You said:").green(), text);
                        answer(&orchestrator, &mut session, &text, speak).await;
                    }
                    Ok(Err(failure)) => Output::warning(&failure.to_string()),
                    Err(e) => Output::error(&format!("Microphone error: {}", e)),
                }
            }
            ChatInput::Message(message) => {
                answer(&orchestrator, &mut session, message, speak).await;
            }
        }
    }

    Ok(())
}

async fn answer(orchestrator: &Orchestrator, session: &mut Session, message: &str, speak: bool) {
    let spinner = Output::spinner("Thinking...");
    let result = session.ask(orchestrator.gateway(), message).await;
    spinner.finish_and_clear();

    match result {
        Ok(reply) => {
            println!("\n{} {}\n", style("Docent:").cyan().bold(), reply.trim());
            if speak {
                let handle = orchestrator.speak(reply.trim());
                debug!("Speaking {} chars", handle.chars());
            }
        }
        Err(e) => Output::error(&format!("Error: {}", e)),
    }
}

async fn load_files(orchestrator: &Orchestrator, session: &mut Session, paths: &[PathBuf]) {
    let artifacts = match load_artifacts(paths).await {
        Ok(artifacts) => artifacts,
        Err(e) => {
            Output::error(&format!("{:#}", e));
            return;
        }
    };

    let spinner = Output::spinner("Reading files...");
    let extraction = orchestrator.ingest(&artifacts).await;
    spinner.finish_and_clear();

    Output::extraction_warnings(&extraction.warnings);
    let names: Vec<&str> = artifacts.iter().map(|a| a.name.as_str()).collect();
    Output::success(&format!(
        "Loaded {} ({} chars)",
        names.join(", "),
        extraction.text.chars().count()
    ));
    session.add_source(&names.join(", "), extraction.text);
}

async fn fetch(orchestrator: &Orchestrator, session: &mut Session, url: &str) {
    let spinner = Output::spinner("Fetching page...");
    let page = orchestrator.fetch_page(url).await;
    spinner.finish_and_clear();

    if page.warnings.is_empty() {
        Output::success(&format!("Loaded {} ({} chars)", url, page.text.chars().count()));
    } else {
        Output::extraction_warnings(&page.warnings);
    }
    session.set_page(url, page.text);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_messages_and_commands() {
        assert_eq!(parse_input("  what is this?\n"), ChatInput::Message("what is this?"));
        assert_eq!(parse_input("EXIT"), ChatInput::Exit);
        assert_eq!(parse_input("clear"), ChatInput::Clear);
        assert_eq!(parse_input("\n"), ChatInput::Empty);
        assert_eq!(
            parse_input("/load a.pdf b.xlsx"),
            ChatInput::Load(vec!["a.pdf", "b.xlsx"])
        );
        assert_eq!(
            parse_input("/fetch https://example.com"),
            ChatInput::Fetch("https://example.com")
        );
        assert_eq!(parse_input("/save"), ChatInput::Save(None));
        assert_eq!(parse_input("/Listen"), ChatInput::Listen);
    }

    #[test]
    fn test_bad_commands_show_help() {
        assert_eq!(parse_input("/load"), ChatInput::Help);
        assert_eq!(parse_input("/fetch a b"), ChatInput::Help);
        assert_eq!(parse_input("/nope"), ChatInput::Help);
    }
}
