use crate::host::{AttachmentStore, Prompt};
use crate::policy::ResizePolicy;
use crate::report::BatchSummary;
use crate::resize::{ImageBuffer, ResizeEngine, ResizeOutcome};
use futures::stream::{self, StreamExt};
use pastefit_common::{mime_for_extension, Error, Result};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

pub const DEFAULT_SKIP_THRESHOLD: f64 = 0.05;

/// Progress tracking for batch operations
#[derive(Debug, Clone)]
pub struct BatchProgress {
    pub processed: usize,
    pub total: usize,
    pub current_file: Option<PathBuf>,
}

impl BatchProgress {
    pub fn percentage(&self) -> f32 {
        if self.total == 0 {
            return 0.0;
        }
        (self.processed as f32 / self.total as f32) * 100.0
    }

    pub fn is_complete(&self) -> bool {
        self.processed == self.total
    }
}

/// Cooperative cancellation, checked between files
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// What happened to one file
#[derive(Debug)]
enum FileOutcome {
    Resized { saved: u64 },
    Skipped,
}

/// Resizes every oversized image of a store in place
pub struct BatchResizer {
    policy: ResizePolicy,
    skip_threshold: f64,
    /// Maximum files in flight
    concurrency: usize,
}

impl BatchResizer {
    /// `concurrency` of 1 processes files strictly one after another; 0 uses every core
    pub fn new(policy: ResizePolicy, concurrency: usize) -> Self {
        let concurrency = if concurrency == 0 {
            num_cpus::get()
        } else {
            concurrency
        };

        tracing::info!("BatchResizer initialized with concurrency={}", concurrency);
        Self {
            policy,
            skip_threshold: DEFAULT_SKIP_THRESHOLD,
            concurrency,
        }
    }

    /// Resized files that shrink by less than `threshold` (fraction of the
    /// original size) are left alone
    pub fn with_skip_threshold(mut self, threshold: f64) -> Result<Self> {
        if !(0.0..1.0).contains(&threshold) {
            return Err(Error::InvalidPolicy(format!(
                "skip threshold must be within [0, 1), got {}",
                threshold
            )));
        }
        self.skip_threshold = threshold;
        Ok(self)
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Warning shown before rewriting `count` files
    pub fn confirmation_message(&self, count: usize) -> String {
        format!(
            "Found {} image(s) in your vault.\n\
             Images larger than {}x{} will be resized and replaced. This cannot be undone.\n\
             Make sure you have a backup of your vault before proceeding!",
            count,
            self.policy.max_width(),
            self.policy.max_height()
        )
    }

    /// List, confirm, then process every image in `store`.
    ///
    /// Returns `None` when there was nothing to do or the user declined.
    pub async fn resize_all<S>(
        &self,
        store: Arc<S>,
        prompt: &dyn Prompt,
        progress_tx: mpsc::UnboundedSender<BatchProgress>,
        cancel: CancelFlag,
    ) -> Result<Option<BatchSummary>>
    where
        S: AttachmentStore + 'static,
    {
        let files = store.list_images()?;
        if files.is_empty() {
            prompt.notify("No images found in vault");
            return Ok(None);
        }

        if !prompt.confirm(&self.confirmation_message(files.len())) {
            tracing::info!("Batch resize declined");
            return Ok(None);
        }

        let summary = self.process(store, files, progress_tx, cancel).await;
        prompt.notify(&summary.to_string());
        Ok(Some(summary))
    }

    /// Process `files`. Per-file failures are counted, never fatal.
    pub async fn process<S>(
        &self,
        store: Arc<S>,
        files: Vec<PathBuf>,
        progress_tx: mpsc::UnboundedSender<BatchProgress>,
        cancel: CancelFlag,
    ) -> BatchSummary
    where
        S: AttachmentStore + 'static,
    {
        let total = files.len();
        tracing::info!("Starting batch resize: {} files", total);

        let mut summary = BatchSummary::default();
        let mut progress = BatchProgress {
            processed: 0,
            total,
            current_file: None,
        };
        let _ = progress_tx.send(progress.clone());

        let policy = self.policy;
        let skip_threshold = self.skip_threshold;

        let mut results = stream::iter(files)
            .map(|path| {
                let store = Arc::clone(&store);
                let cancel = cancel.clone();

                async move {
                    // Checked when the file is about to start, never mid-resize
                    if cancel.is_cancelled() {
                        return (path, None);
                    }

                    let result = tokio::task::spawn_blocking({
                        let path = path.clone();
                        move || Self::process_file(store.as_ref(), &path, &policy, skip_threshold)
                    })
                    .await
                    .map_err(|e| Error::TaskFailed(e.to_string()))
                    .and_then(|result| result);

                    (path, Some(result))
                }
            })
            .buffer_unordered(self.concurrency);

        while let Some((path, result)) = results.next().await {
            match result {
                None => {
                    summary.cancelled = true;
                    continue;
                }
                Some(Ok(FileOutcome::Resized { saved })) => {
                    summary.resized += 1;
                    summary.bytes_saved += saved;
                }
                Some(Ok(FileOutcome::Skipped)) => summary.skipped += 1,
                Some(Err(e)) => {
                    // Image failures stay with one file; host failures may hit every file
                    if e.is_image_error() {
                        tracing::warn!("Could not resize {:?}: {}", path, e);
                    } else {
                        tracing::error!("Error processing {:?}: {}", path, e);
                    }
                    summary.errors += 1;
                }
            }

            progress.processed += 1;
            progress.current_file = Some(path);
            let _ = progress_tx.send(progress.clone());
        }

        tracing::info!(
            "Batch resize complete: {} resized, {} skipped, {} errors",
            summary.resized,
            summary.skipped,
            summary.errors
        );

        summary
    }

    /// Read, resize and rewrite one file (synchronous, called in spawn_blocking)
    fn process_file<S: AttachmentStore + ?Sized>(
        store: &S,
        path: &Path,
        policy: &ResizePolicy,
        skip_threshold: f64,
    ) -> Result<FileOutcome> {
        let bytes = store.read(path)?;
        let original_size = bytes.len() as u64;

        let mime_type = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(mime_for_extension)
            .unwrap_or("image/png");
        let original = ImageBuffer::new(bytes, mime_type);

        let resized = match ResizeEngine::resize_auto(&original, policy)? {
            ResizeOutcome::Unchanged => return Ok(FileOutcome::Skipped),
            ResizeOutcome::Resized { buffer, .. } => buffer,
        };

        let new_size = resized.len() as u64;
        if new_size as f64 >= original_size as f64 * (1.0 - skip_threshold) {
            tracing::debug!(
                "Skipping {:?}: {} → {} bytes is not worth a rewrite",
                path,
                original_size,
                new_size
            );
            return Ok(FileOutcome::Skipped);
        }

        store.write(path, resized.bytes())?;
        Ok(FileOutcome::Resized {
            saved: original_size - new_size,
        })
    }
}

impl Default for BatchResizer {
    fn default() -> Self {
        Self::new(ResizePolicy::default(), 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::VaultStore;
    use image::DynamicImage;
    use std::sync::Mutex;
    use tempfile::TempDir;

    struct ScriptedPrompt {
        answer: bool,
        notices: Mutex<Vec<String>>,
    }

    impl ScriptedPrompt {
        fn answering(answer: bool) -> Self {
            Self {
                answer,
                notices: Mutex::new(Vec::new()),
            }
        }
    }

    impl Prompt for ScriptedPrompt {
        fn confirm(&self, _message: &str) -> bool {
            self.answer
        }

        fn notify(&self, message: &str) {
            self.notices.lock().unwrap().push(message.to_string());
        }
    }

    fn save_noisy(path: &Path, width: u32, height: u32) {
        let mut img = DynamicImage::new_rgb8(width, height);
        for (x, y, pixel) in img.as_mut_rgb8().unwrap().enumerate_pixels_mut() {
            let v = (x.wrapping_mul(29) ^ y.wrapping_mul(13)) as u8;
            *pixel = image::Rgb([v, v.wrapping_mul(3), 255 - v]);
        }
        img.save(path).unwrap();
    }

    fn small_policy() -> ResizePolicy {
        ResizePolicy::new(64, 64, 0.92).unwrap()
    }

    #[tokio::test]
    async fn test_batch_counts() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        save_noisy(&root.join("big1.png"), 256, 256);
        save_noisy(&root.join("big2.png"), 200, 100);
        save_noisy(&root.join("small.png"), 32, 32);
        std::fs::write(root.join("broken.png"), b"not a png").unwrap();

        let store = Arc::new(VaultStore::new(root, ""));
        let files = store.list_images().unwrap();
        let (tx, _rx) = mpsc::unbounded_channel();

        let resizer = BatchResizer::new(small_policy(), 1);
        let summary = resizer.process(store, files, tx, CancelFlag::new()).await;

        assert_eq!(summary.resized, 2);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.errors, 1);
        assert!(summary.bytes_saved > 0);
        assert!(!summary.cancelled);

        let dims = image::image_dimensions(root.join("big2.png")).unwrap();
        assert_eq!(dims, (64, 32));
    }

    #[tokio::test]
    async fn test_decode_cap_counts_as_error_and_keeps_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("wide.png");
        save_noisy(&path, 400, 200);
        let before = std::fs::read(&path).unwrap();

        let store = Arc::new(VaultStore::new(temp_dir.path(), ""));
        let (tx, _rx) = mpsc::unbounded_channel();
        let policy = small_policy().with_max_decode_bytes(1024);

        let summary = BatchResizer::new(policy, 1)
            .process(store, vec![path.clone()], tx, CancelFlag::new())
            .await;

        assert_eq!(summary.errors, 1);
        assert_eq!(std::fs::read(&path).unwrap(), before);
    }

    #[tokio::test]
    async fn test_threshold_skips_marginal_savings() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("flat.png");
        // A flat image compresses to almost nothing either way
        DynamicImage::new_rgb8(100, 100).save(&path).unwrap();
        let before = std::fs::read(&path).unwrap();

        let store = Arc::new(VaultStore::new(temp_dir.path(), ""));
        let (tx, _rx) = mpsc::unbounded_channel();
        let resizer = BatchResizer::new(ResizePolicy::new(99, 99, 0.92).unwrap(), 1)
            .with_skip_threshold(0.99)
            .unwrap();

        let summary = resizer
            .process(store, vec![path.clone()], tx, CancelFlag::new())
            .await;

        assert_eq!(summary.skipped, 1);
        assert_eq!(std::fs::read(&path).unwrap(), before);
    }

    #[test]
    fn test_invalid_threshold() {
        assert!(BatchResizer::default().with_skip_threshold(1.0).is_err());
        assert!(BatchResizer::default().with_skip_threshold(-0.1).is_err());
        assert!(BatchResizer::default().with_skip_threshold(0.0).is_ok());
    }

    #[tokio::test]
    async fn test_cancelled_batch_leaves_files_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("big.png");
        save_noisy(&path, 256, 256);
        let before = std::fs::read(&path).unwrap();

        let store = Arc::new(VaultStore::new(temp_dir.path(), ""));
        let (tx, _rx) = mpsc::unbounded_channel();
        let cancel = CancelFlag::new();
        cancel.cancel();

        let summary = BatchResizer::new(small_policy(), 1)
            .process(store, vec![path.clone()], tx, cancel)
            .await;

        assert!(summary.cancelled);
        assert_eq!(summary.processed(), 0);
        assert_eq!(std::fs::read(&path).unwrap(), before);
    }

    #[tokio::test]
    async fn test_progress_tracking() {
        let temp_dir = TempDir::new().unwrap();
        let mut files = Vec::new();
        for i in 0..3 {
            let path = temp_dir.path().join(format!("test{}.png", i));
            save_noisy(&path, 128, 128);
            files.push(path);
        }

        let store = Arc::new(VaultStore::new(temp_dir.path(), ""));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let resizer = BatchResizer::new(small_policy(), 2);

        tokio::spawn(async move { resizer.process(store, files, tx, CancelFlag::new()).await });

        let mut final_progress = None;
        while let Some(progress) = rx.recv().await {
            final_progress = Some(progress);
        }

        let final_progress = final_progress.unwrap();
        assert_eq!(final_progress.processed, 3);
        assert_eq!(final_progress.total, 3);
        assert!(final_progress.is_complete());
    }

    #[tokio::test]
    async fn test_resize_all_confirmation() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("big.png");
        save_noisy(&path, 256, 256);

        let store = Arc::new(VaultStore::new(temp_dir.path(), ""));
        let resizer = BatchResizer::new(small_policy(), 1);

        let declined = ScriptedPrompt::answering(false);
        let (tx, _rx) = mpsc::unbounded_channel();
        let result = resizer
            .resize_all(Arc::clone(&store), &declined, tx, CancelFlag::new())
            .await
            .unwrap();
        assert!(result.is_none());
        assert_eq!(image::image_dimensions(&path).unwrap(), (256, 256));

        let accepted = ScriptedPrompt::answering(true);
        let (tx, _rx) = mpsc::unbounded_channel();
        let summary = resizer
            .resize_all(store, &accepted, tx, CancelFlag::new())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(summary.resized, 1);
        assert!(accepted.notices.lock().unwrap()[0].starts_with("Batch resize complete!"));
    }

    #[tokio::test]
    async fn test_resize_all_empty_vault() {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(VaultStore::new(temp_dir.path(), ""));
        let prompt = ScriptedPrompt::answering(true);
        let (tx, _rx) = mpsc::unbounded_channel();

        let result = BatchResizer::default()
            .resize_all(store, &prompt, tx, CancelFlag::new())
            .await
            .unwrap();

        assert!(result.is_none());
        assert_eq!(prompt.notices.lock().unwrap()[0], "No images found in vault");
    }
}
