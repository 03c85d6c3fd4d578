use image::{DynamicImage, ImageFormat};
use pastefit_core::{
    AttachmentStore, BatchResizer, CancelFlag, ClipboardItem, PasteHandler, Prompt, ResizePolicy,
    VaultStore,
};
use std::io::Cursor;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio::sync::mpsc;

#[derive(Default)]
struct RecordingPrompt {
    confirmations: Mutex<Vec<String>>,
    notices: Mutex<Vec<String>>,
}

impl Prompt for RecordingPrompt {
    fn confirm(&self, message: &str) -> bool {
        self.confirmations.lock().unwrap().push(message.to_string());
        true
    }

    fn notify(&self, message: &str) {
        self.notices.lock().unwrap().push(message.to_string());
    }
}

fn noisy(width: u32, height: u32) -> DynamicImage {
    let mut img = DynamicImage::new_rgb8(width, height);
    for (x, y, pixel) in img.as_mut_rgb8().unwrap().enumerate_pixels_mut() {
        let v = (x.wrapping_mul(37) ^ y.wrapping_mul(11)) as u8;
        *pixel = image::Rgb([v, v.wrapping_add(60), v.wrapping_mul(5)]);
    }
    img
}

fn encode(img: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), format).unwrap();
    buffer
}

fn dimensions(path: &Path) -> (u32, u32) {
    image::image_dimensions(path).unwrap()
}

#[test]
fn test_paste_into_attachment_folder() {
    let vault = TempDir::new().unwrap();
    let policy = ResizePolicy::new(320, 240, 0.92).unwrap();
    let handler = PasteHandler::new(VaultStore::new(vault.path(), "Attachments"), policy);
    let prompt = RecordingPrompt::default();

    let jpeg = encode(&noisy(1280, 960), ImageFormat::Jpeg);
    let pasted = handler
        .handle_paste(vec![ClipboardItem::file("image/jpeg", jpeg)], &prompt)
        .unwrap()
        .unwrap();

    assert_eq!(pasted.path.parent().unwrap(), vault.path().join("Attachments"));
    assert_eq!(pasted.path.extension().unwrap(), "jpg");
    assert_eq!(dimensions(&pasted.path), (320, 240));
    assert!(pasted.link.starts_with("![](Attachments/pasted-image-"));

    let notices = prompt.notices.lock().unwrap();
    assert_eq!(notices.len(), 1);
    assert!(notices[0].contains("% smaller)"));
}

#[test]
fn test_two_pastes_never_overwrite() {
    let vault = TempDir::new().unwrap();
    let handler = PasteHandler::new(VaultStore::new(vault.path(), ""), ResizePolicy::default());
    let prompt = RecordingPrompt::default();
    let png = encode(&noisy(64, 64), ImageFormat::Png);

    let first = handler
        .handle_paste(vec![ClipboardItem::file("image/png", png.clone())], &prompt)
        .unwrap()
        .unwrap();
    let second = handler
        .handle_paste(vec![ClipboardItem::file("image/png", png)], &prompt)
        .unwrap()
        .unwrap();

    assert_ne!(first.path, second.path);
    assert!(first.path.exists());
    assert!(second.path.exists());
}

#[tokio::test]
async fn test_batch_over_vault() {
    let vault = TempDir::new().unwrap();
    let root = vault.path();
    std::fs::create_dir_all(root.join("daily/2024")).unwrap();
    std::fs::create_dir_all(root.join(".obsidian")).unwrap();

    noisy(800, 400).save(root.join("daily/2024/photo.jpg")).unwrap();
    noisy(600, 600).save(root.join("diagram.png")).unwrap();
    noisy(100, 100).save(root.join("icon.png")).unwrap();
    noisy(800, 800).save(root.join(".obsidian/theme.png")).unwrap();
    std::fs::write(root.join("notes.md"), "# notes").unwrap();

    let store = Arc::new(VaultStore::new(root, ""));
    let prompt = RecordingPrompt::default();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let resizer = BatchResizer::new(ResizePolicy::new(200, 200, 0.92).unwrap(), 2);

    let summary = resizer
        .resize_all(Arc::clone(&store), &prompt, tx, CancelFlag::new())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(summary.resized, 2);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.errors, 0);
    assert!(summary.bytes_saved > 0);

    assert_eq!(dimensions(&root.join("daily/2024/photo.jpg")), (200, 100));
    assert_eq!(dimensions(&root.join("diagram.png")), (200, 200));
    assert_eq!(dimensions(&root.join("icon.png")), (100, 100));
    assert_eq!(dimensions(&root.join(".obsidian/theme.png")), (800, 800));

    let confirmations = prompt.confirmations.lock().unwrap();
    assert!(confirmations[0].starts_with("Found 3 image(s) in your vault."));

    let mut last = None;
    while let Some(progress) = rx.recv().await {
        last = Some(progress);
    }
    assert!(last.unwrap().is_complete());

    // A second pass finds nothing left to shrink
    let (tx, _rx) = mpsc::unbounded_channel();
    let files = store.list_images().unwrap();
    let again = resizer.process(store, files, tx, CancelFlag::new()).await;
    assert_eq!(again.resized, 0);
    assert_eq!(again.skipped, 3);
}
