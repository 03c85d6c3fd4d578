use anyhow::{Context, Result};
use clap::Parser;
use pastefit_cli::{
    declared_mime, paste_bytes, Cli, Commands, Config, ConfigCommands, OutputFormatter,
    PasteStatus, ProgressReporter, TerminalPrompt,
};
use pastefit_core::{BatchResizer, CancelFlag, VaultStore};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        "pastefit=debug"
    } else {
        "pastefit=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_target(false)
        .without_time()
        .init();

    // Load config
    let mut config = Config::load()?;

    // Override config with CLI flags
    if cli.no_color {
        config.colored_output = false;
    }
    if cli.no_progress {
        config.show_progress = false;
    }
    if let Some(jobs) = cli.jobs {
        config.parallel_jobs = jobs;
    }

    // Create formatter and progress reporter
    let formatter = OutputFormatter::new(config.colored_output);
    let progress = ProgressReporter::new(config.show_progress);

    // Execute command
    match cli.command {
        Commands::Paste { input, mime } => {
            let vault = resolve_vault(cli.vault)?;
            return handle_paste(input, mime, vault, &config, &formatter);
        }

        Commands::Batch { yes } => {
            let vault = resolve_vault(cli.vault)?;
            handle_batch(vault, yes, &config, &formatter, &progress).await?;
        }

        Commands::Config { action } => {
            handle_config(action, &formatter)?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn resolve_vault(vault: Option<PathBuf>) -> Result<PathBuf> {
    let vault = match vault {
        Some(vault) => vault,
        None => std::env::current_dir().context("Failed to determine current directory")?,
    };

    if !vault.is_dir() {
        anyhow::bail!("Vault directory not found: {}", vault.display());
    }
    Ok(vault)
}

fn handle_paste(
    input: PathBuf,
    mime: Option<String>,
    vault: PathBuf,
    config: &Config,
    formatter: &OutputFormatter,
) -> Result<ExitCode> {
    let bytes = if input == Path::new("-") {
        let mut buffer = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buffer)
            .context("Failed to read image from stdin")?;
        buffer
    } else {
        std::fs::read(&input).with_context(|| format!("Failed to read {}", input.display()))?
    };

    // The decoder sniffs the real container, so the declared type only picks the output format
    let mime_type = declared_mime(&input, mime);
    let prompt = TerminalPrompt::new(config.colored_output, true);

    match paste_bytes(bytes, mime_type, &vault, config, &prompt)? {
        PasteStatus::Pasted(pasted) => formatter.print_paste(&pasted),
        PasteStatus::NotAnImage => formatter.warn("Input is not an image, nothing was pasted"),
        // Already printed by the prompt
        PasteStatus::Failed => return Ok(ExitCode::FAILURE),
    }

    Ok(ExitCode::SUCCESS)
}

async fn handle_batch(
    vault: PathBuf,
    assume_yes: bool,
    config: &Config,
    formatter: &OutputFormatter,
    progress: &ProgressReporter,
) -> Result<()> {
    let store = Arc::new(VaultStore::new(vault, &config.attachment_folder));
    let resizer = BatchResizer::new(config.policy()?, config.parallel_jobs)
        .with_skip_threshold(config.skip_threshold)?;
    let prompt = TerminalPrompt::new(config.colored_output, assume_yes);

    // Ctrl-C is only caught once the run has been confirmed; at the prompt it still exits
    let cancel = CancelFlag::new();
    let (progress_tx, progress_rx) = mpsc::unbounded_channel();
    let reporter = tokio::spawn({
        let progress = progress.clone();
        let cancel = cancel.clone();
        async move {
            let ctrl_c = async {
                if tokio::signal::ctrl_c().await.is_err() {
                    std::future::pending::<()>().await;
                }
            };
            progress.follow_batch(progress_rx, cancel, ctrl_c).await
        }
    });

    let result = resizer
        .resize_all(Arc::clone(&store), &prompt, progress_tx, cancel)
        .await;

    let pb = reporter.await.context("Progress reporter failed")?;

    match result? {
        Some(summary) => {
            if summary.cancelled {
                ProgressReporter::finish_bar_error(&pb, "Cancelled");
            } else {
                ProgressReporter::finish_bar(&pb, "Done");
            }
            formatter.print_batch_summary(&summary);
        }
        None => tracing::debug!("Batch resize did not run"),
    }

    Ok(())
}

fn handle_config(action: ConfigCommands, formatter: &OutputFormatter) -> Result<()> {
    match action {
        ConfigCommands::Show => {
            let config = Config::load()?;
            let toml = toml::to_string_pretty(&config)?;
            println!("{}", toml);
        }

        ConfigCommands::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            formatter.success(&format!("Set {} = {}", key, value));
        }

        ConfigCommands::Reset => {
            Config::reset()?;
            formatter.success("Configuration reset to defaults");
        }

        ConfigCommands::Path => {
            let path = Config::config_path()?;
            println!("{}", path.display());
        }
    }

    Ok(())
}
