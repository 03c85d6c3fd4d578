use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use pastefit_core::{BatchProgress, CancelFlag};
use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;

/// Progress reporter for CLI operations
#[derive(Debug, Clone)]
pub struct ProgressReporter {
    show_progress: bool,
}

impl ProgressReporter {
    pub fn new(show_progress: bool) -> Self {
        Self { show_progress }
    }

    /// Create progress bar for a batch run
    pub fn create_bar(&self, total: u64, message: &str) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }

        let pb = ProgressBar::new(total);
        // The template is a literal, so this only falls back on a typo
        let bar_style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
        pb.set_style(bar_style);
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));

        Some(pb)
    }

    /// Drive a bar from batch updates until the channel closes.
    ///
    /// `interrupt` is only awaited once the first update arrives, so it is
    /// never armed while the run is still waiting for confirmation. When it
    /// resolves the batch is cancelled between files.
    pub async fn follow_batch<F>(
        &self,
        mut updates: mpsc::UnboundedReceiver<BatchProgress>,
        cancel: CancelFlag,
        interrupt: F,
    ) -> Option<ProgressBar>
    where
        F: Future<Output = ()>,
    {
        let first = updates.recv().await?;
        let pb = self.create_bar(first.total as u64, "Resizing...");
        Self::update_bar(&pb, &first);

        tokio::pin!(interrupt);
        let mut interrupted = false;

        loop {
            tokio::select! {
                biased;

                _ = &mut interrupt, if !interrupted => {
                    interrupted = true;
                    tracing::warn!("Cancelling after the files in progress finish");
                    cancel.cancel();
                }
                update = updates.recv() => match update {
                    Some(update) => Self::update_bar(&pb, &update),
                    None => break,
                },
            }
        }

        pb
    }

    /// Mirror a batch progress update onto the bar
    pub fn update_bar(pb: &Option<ProgressBar>, progress: &BatchProgress) {
        if let Some(pb) = pb {
            pb.set_length(progress.total as u64);
            pb.set_position(progress.processed as u64);
            if let Some(name) = progress.current_file.as_ref().and_then(|p| p.file_name()) {
                pb.set_message(name.to_string_lossy().into_owned());
            }
        }
    }

    /// Finish progress bar with success message
    pub fn finish_bar(pb: &Option<ProgressBar>, message: &str) {
        if let Some(pb) = pb {
            pb.finish_with_message(format!("{} {}", style("✓").green(), message));
        }
    }

    /// Finish progress bar with error message
    pub fn finish_bar_error(pb: &Option<ProgressBar>, message: &str) {
        if let Some(pb) = pb {
            pb.finish_with_message(format!("{} {}", style("✗").red(), message));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn update(processed: usize, total: usize) -> BatchProgress {
        BatchProgress {
            processed,
            total,
            current_file: Some(PathBuf::from(format!("img{}.png", processed))),
        }
    }

    #[tokio::test]
    async fn test_interrupt_before_run_starts_is_ignored() {
        let (tx, rx) = mpsc::unbounded_channel::<BatchProgress>();
        let cancel = CancelFlag::new();

        // Declined or empty run: no update is ever sent
        drop(tx);
        let pb = ProgressReporter::new(false)
            .follow_batch(rx, cancel.clone(), std::future::ready(()))
            .await;

        assert!(pb.is_none());
        assert!(!cancel.is_cancelled());
    }

    #[tokio::test]
    async fn test_interrupt_during_run_cancels() {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancelFlag::new();

        tx.send(update(0, 3)).unwrap();
        tx.send(update(1, 3)).unwrap();
        drop(tx);

        ProgressReporter::new(false)
            .follow_batch(rx, cancel.clone(), std::future::ready(()))
            .await;

        assert!(cancel.is_cancelled());
    }

    #[tokio::test]
    async fn test_run_without_interrupt_completes() {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancelFlag::new();

        for processed in 0..=2 {
            tx.send(update(processed, 2)).unwrap();
        }
        drop(tx);

        ProgressReporter::new(false)
            .follow_batch(rx, cancel.clone(), std::future::pending::<()>())
            .await;

        assert!(!cancel.is_cancelled());
    }
}
