//! Doctor command - verify tools, services and configuration.

use crate::cli::Output;
use crate::config::Settings;
use crate::gateway::OllamaModel;
use crate::transforms::HF_TOKEN_ENV;
use console::style;
use std::path::Path;
use std::process::Command;

/// Outcome of a single check.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn new(name: &str, status: CheckStatus, message: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            status,
            message: message.into(),
            hint: None,
        }
    }

    fn ok(name: &str, message: impl Into<String>) -> Self {
        Self::new(name, CheckStatus::Ok, message)
    }

    fn warning(name: &str, message: impl Into<String>, hint: &str) -> Self {
        Self::new(name, CheckStatus::Warning, message).with_hint(hint)
    }

    fn error(name: &str, message: impl Into<String>, hint: &str) -> Self {
        Self::new(name, CheckStatus::Error, message).with_hint(hint)
    }

    fn with_hint(mut self, hint: &str) -> Self {
        self.hint = Some(hint.to_string());
        self
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);
        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks, grouped into sections.
pub async fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("Docent Doctor");
    println!();

    let sections = [
        (
            "External Tools",
            vec![
                probe_tool("ffmpeg", true),
                probe_tool("ffprobe", true),
                probe_tool(&settings.speech.player, false),
            ],
        ),
        (
            "Services",
            vec![
                check_openai_api_key(),
                check_hf_token(),
                check_ollama(settings).await,
            ],
        ),
        ("Directories", check_directories(settings)),
        ("Configuration", vec![check_config_file()]),
    ];

    for (title, checks) in &sections {
        println!("{}", style(title).bold());
        for check in checks {
            check.print();
        }
        println!();
    }

    let (errors, warnings) = tally(sections.iter().flat_map(|(_, checks)| checks));
    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using Docent.",
            errors
        ));
        anyhow::bail!("{} doctor check(s) failed", errors);
    }
    if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! Docent is ready to use.");
    }

    Ok(())
}

/// Count errors and warnings.
fn tally<'a>(checks: impl IntoIterator<Item = &'a CheckResult>) -> (usize, usize) {
    checks
        .into_iter()
        .fold((0, 0), |(errors, warnings), check| match check.status {
            CheckStatus::Error => (errors + 1, warnings),
            CheckStatus::Warning => (errors, warnings + 1),
            CheckStatus::Ok => (errors, warnings),
        })
}

/// Run `<tool> -version` and report its first output line.
///
/// A missing required tool is an error. Optional tools only warn, since
/// speech can still be saved to files without a player.
fn probe_tool(name: &str, required: bool) -> CheckResult {
    let hint = install_hint_ffmpeg();
    let missing = |message: String| {
        if required {
            CheckResult::error(name, message, hint)
        } else {
            CheckResult::warning(name, message, hint)
        }
    };

    match Command::new(name).arg("-version").output() {
        Ok(output) if output.status.success() => {
            let stdout = String::from_utf8_lossy(&output.stdout);
            let first = stdout.lines().next().unwrap_or("installed").trim();
            let version: String = first.chars().take(50).collect();
            CheckResult::ok(name, version)
        }
        Ok(_) => missing("installed but not working".to_string()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => missing("not found".to_string()),
        Err(e) => missing(format!("error: {}", e)),
    }
}

/// The OpenAI key is needed for transcription and speech.
fn check_openai_api_key() -> CheckResult {
    const NAME: &str = "OPENAI_API_KEY";
    const HINT: &str = "Set with: export OPENAI_API_KEY='sk-...'";

    match std::env::var(NAME) {
        Ok(key) if key.trim().is_empty() => CheckResult::error(NAME, "empty", HINT),
        Ok(key) if key.starts_with("sk-") && key.len() > 20 => {
            let masked = format!("{}...{}", &key[..7], &key[key.len() - 4..]);
            CheckResult::ok(NAME, format!("configured ({})", masked))
        }
        Ok(_) => CheckResult::warning(
            NAME,
            "set but format looks unusual",
            "Expected format: sk-... (OpenAI API key)",
        ),
        Err(_) => CheckResult::error(NAME, "not set", HINT),
    }
}

/// The Hugging Face token is optional; anonymous calls are rate limited.
fn check_hf_token() -> CheckResult {
    match std::env::var(HF_TOKEN_ENV) {
        Ok(token) if !token.trim().is_empty() => CheckResult::ok(HF_TOKEN_ENV, "configured"),
        _ => CheckResult::warning(
            HF_TOKEN_ENV,
            "not set (anonymous requests are rate limited)",
            "Set with: export HF_API_TOKEN='hf_...'",
        ),
    }
}

async fn check_ollama(settings: &Settings) -> CheckResult {
    const HINT: &str = "Start the server with: ollama serve";
    let gateway = &settings.gateway;

    let reachable = match OllamaModel::new(gateway) {
        Ok(model) => model.health_check().await,
        Err(e) => return CheckResult::error("Ollama", format!("error: {}", e), HINT),
    };

    if reachable {
        CheckResult::ok("Ollama", format!("{} ({})", gateway.base_url, gateway.model))
    } else {
        CheckResult::error(
            "Ollama",
            format!("not reachable at {}", gateway.base_url),
            HINT,
        )
    }
}

fn check_directories(settings: &Settings) -> Vec<CheckResult> {
    [
        ("Data directory", settings.data_dir()),
        ("Temp directory", settings.temp_dir()),
    ]
    .into_iter()
    .map(|(name, dir)| {
        if dir.exists() {
            CheckResult::ok(
                name,
                format!("{} ({})", dir.display(), format_size(dir_size(&dir))),
            )
        } else {
            CheckResult::warning(
                name,
                format!("{} (will be created)", dir.display()),
                "Directory will be created on first use",
            )
        }
    })
    .collect()
}

fn check_config_file() -> CheckResult {
    let config_path = Settings::default_config_path();
    if config_path.exists() {
        CheckResult::ok("Config file", config_path.display().to_string())
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: docent config edit",
        )
    }
}

/// Total size of the files directly inside a directory.
fn dir_size(dir: &Path) -> u64 {
    std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .filter_map(|e| e.metadata().ok())
                .filter(|m| m.is_file())
                .map(|m| m.len())
                .sum()
        })
        .unwrap_or(0)
}

fn format_size(bytes: u64) -> String {
    const UNITS: [(&str, u64); 3] = [("GB", 1 << 30), ("MB", 1 << 20), ("KB", 1 << 10)];

    UNITS
        .iter()
        .find(|(_, size)| bytes >= *size)
        .map(|(unit, size)| format!("{:.1} {}", bytes as f64 / *size as f64, unit))
        .unwrap_or_else(|| format!("{} B", bytes))
}

fn install_hint_ffmpeg() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: brew install ffmpeg"
    } else if cfg!(target_os = "linux") {
        "Install with: sudo apt install ffmpeg (or your package manager)"
    } else {
        "Install from: https://ffmpeg.org/download.html"
    }
}
