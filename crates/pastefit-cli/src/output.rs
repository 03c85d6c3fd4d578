use console::{style, Term};
use pastefit_core::{BatchSummary, PastedImage, Prompt};
use std::path::Path;

/// Output formatter with colored messages
pub struct OutputFormatter {
    colored: bool,
}

impl OutputFormatter {
    pub fn new(colored: bool) -> Self {
        Self { colored }
    }

    /// Print success message
    pub fn success(&self, message: &str) {
        if self.colored {
            println!("{} {}", style("✓").green().bold(), message);
        } else {
            println!("[SUCCESS] {}", message);
        }
    }

    /// Print error message
    pub fn error(&self, message: &str) {
        if self.colored {
            eprintln!("{} {}", style("✗").red().bold(), message);
        } else {
            eprintln!("[ERROR] {}", message);
        }
    }

    /// Print warning message
    pub fn warn(&self, message: &str) {
        if self.colored {
            println!("{} {}", style("⚠").yellow().bold(), message);
        } else {
            println!("[WARN] {}", message);
        }
    }

    /// Print info message
    pub fn info(&self, message: &str) {
        if self.colored {
            println!("{} {}", style("ℹ").cyan(), message);
        } else {
            println!("[INFO] {}", message);
        }
    }

    /// Format file path
    pub fn format_path(&self, path: &Path) -> String {
        if self.colored {
            style(path.display()).cyan().to_string()
        } else {
            path.display().to_string()
        }
    }

    /// Print where a paste landed and the link to insert
    pub fn print_paste(&self, pasted: &PastedImage) {
        let detail = match pasted.new_dimensions {
            Some(dimensions) => format!("resized to {}", dimensions),
            None => "kept as-is".to_string(),
        };
        self.success(&format!("Saved {} ({})", self.format_path(&pasted.path), detail));
        println!("{}", pasted.link);
    }

    /// Print batch summary
    pub fn print_batch_summary(&self, summary: &BatchSummary) {
        println!();
        let mut lines = summary.to_string().lines().map(str::to_string).collect::<Vec<_>>();
        if lines.is_empty() {
            return;
        }

        let title = lines.remove(0);
        if self.colored {
            println!("{}", style(title).bold());
        } else {
            println!("{}", title);
        }

        for line in lines {
            match (self.colored, line.split_once(": ")) {
                (true, Some(("Errors", count))) if count != "0" => {
                    println!("{}: {}", style("Errors").red(), count)
                }
                (true, Some(("Resized", count))) => {
                    println!("{}: {}", style("Resized").green(), count)
                }
                _ => println!("{}", line),
            }
        }
    }
}

impl Default for OutputFormatter {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Interactive terminal prompt
pub struct TerminalPrompt {
    formatter: OutputFormatter,
    /// Answer yes without asking
    assume_yes: bool,
}

impl TerminalPrompt {
    pub fn new(colored: bool, assume_yes: bool) -> Self {
        Self {
            formatter: OutputFormatter::new(colored),
            assume_yes,
        }
    }
}

impl Prompt for TerminalPrompt {
    fn confirm(&self, message: &str) -> bool {
        for line in message.lines() {
            self.formatter.warn(line);
        }

        if self.assume_yes {
            return true;
        }

        let term = Term::stderr();
        if !term.is_term() {
            tracing::warn!("No terminal to confirm on; pass --yes to proceed");
            return false;
        }

        if term.write_str("Proceed? [y/N] ").is_err() {
            return false;
        }
        match term.read_line() {
            Ok(answer) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
            Err(e) => {
                tracing::warn!("Failed to read confirmation: {}", e);
                false
            }
        }
    }

    fn notify(&self, message: &str) {
        if message.starts_with("Failed") {
            self.formatter.error(message);
        } else if message.starts_with("Batch resize complete!") {
            // Printed separately by the caller with styling
        } else {
            self.formatter.info(message);
        }
    }
}
