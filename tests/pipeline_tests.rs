//! End-to-end pipeline tests: real trees in temp dirs, real images, instrumented codecs.

use crossbeam_channel::bounded;
use image::DynamicImage;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;
use thumbnailer::engine::{Codec, ImageCodec};
use thumbnailer::pipeline::{CancelToken, WorkerContext, spawn_thumbnail_workers};
use thumbnailer::{RunSummary, ThumbError, ThumbOpts, Thumbnail, thumbnail_dir, thumbnail_dir_with};

fn write_jpeg(path: &Path, w: u32, h: u32) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    let img = image::RgbImage::from_fn(w, h, |x, y| {
        image::Rgb([(x * 7) as u8, (y * 3) as u8, ((x + y) / 2) as u8])
    });
    img.save(path).unwrap();
}

/// JPEG magic followed by garbage: sniffs as image/jpeg, fails to decode.
fn write_corrupt_jpeg(path: &Path) {
    let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00];
    bytes.extend(std::iter::repeat_n(0x5A, 64));
    std::fs::write(path, bytes).unwrap();
}

fn opts_for(out: &Path) -> ThumbOpts {
    ThumbOpts {
        output_dir: Some(out.to_path_buf()),
        ..Default::default()
    }
}

fn thumb_err(err: &anyhow::Error) -> &ThumbError {
    err.downcast_ref::<ThumbError>()
        .unwrap_or_else(|| panic!("expected ThumbError, got {:#}", err))
}

fn listing(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Wraps [`ImageCodec`]; tracks how many images are between decode start and resize end, and how
/// often resize was called.
#[derive(Default)]
struct CountingCodec {
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    resizes: AtomicUsize,
    decode_delay: Duration,
}

impl Codec for CountingCodec {
    fn decode(&self, path: &Path) -> Result<Thumbnail, ThumbError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        thread::sleep(self.decode_delay);
        let decoded = ImageCodec.decode(path);
        if decoded.is_err() {
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
        }
        decoded
    }

    fn thumbnail(&self, image: &DynamicImage, width: u32, height: u32) -> DynamicImage {
        self.resizes.fetch_add(1, Ordering::SeqCst);
        let out = ImageCodec.thumbnail(image, width, height);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        out
    }

    fn save(&self, thumb: &Thumbnail, dest: &Path) -> Result<(), ThumbError> {
        ImageCodec.save(thumb, dest)
    }
}

#[test]
fn test_single_image_becomes_100x100_thumbnail() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write_jpeg(&src.path().join("a.jpg"), 300, 300);

    let summary = thumbnail_dir(src.path(), &opts_for(out.path())).unwrap();
    assert_eq!(
        summary,
        RunSummary {
            discovered: 1,
            written: 1,
            output_dir: out.path().to_path_buf(),
        }
    );
    let thumb = out.path().join("a.jpg");
    assert_eq!(image::image_dimensions(&thumb).unwrap(), (100, 100));
    assert_eq!(
        image::ImageReader::open(&thumb)
            .unwrap()
            .with_guessed_format()
            .unwrap()
            .format(),
        Some(image::ImageFormat::Jpeg)
    );
}

#[test]
fn test_every_image_in_tree_gets_one_thumbnail() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write_jpeg(&src.path().join("a.jpg"), 120, 80);
    write_jpeg(&src.path().join("nested/deeper/b.jpg"), 64, 200);
    let png = image::RgbaImage::from_pixel(150, 150, image::Rgba([10, 20, 30, 255]));
    png.save(src.path().join("nested/c.png")).unwrap();

    let summary = thumbnail_dir(src.path(), &opts_for(out.path())).unwrap();
    assert_eq!(summary.discovered, 3);
    assert_eq!(summary.written, 3);
    assert_eq!(listing(out.path()), vec!["a.jpg", "b.jpg", "c.png"]);
    for name in ["a.jpg", "b.jpg", "c.png"] {
        assert_eq!(
            image::image_dimensions(out.path().join(name)).unwrap(),
            (100, 100)
        );
    }
}

#[test]
fn test_custom_dimensions() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write_jpeg(&src.path().join("wide.jpg"), 400, 100);

    let opts = ThumbOpts {
        width: Some(48),
        height: Some(32),
        ..opts_for(out.path())
    };
    thumbnail_dir(src.path(), &opts).unwrap();
    assert_eq!(
        image::image_dimensions(out.path().join("wide.jpg")).unwrap(),
        (48, 32)
    );
}

#[test]
fn test_empty_tree_succeeds() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(src.path().join("empty/sub")).unwrap();

    let summary = thumbnail_dir(src.path(), &opts_for(out.path())).unwrap();
    assert_eq!(summary.discovered, 0);
    assert_eq!(summary.written, 0);
}

#[test]
fn test_text_file_fails_with_unsupported_type() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write_jpeg(&src.path().join("a.jpg"), 32, 32);
    write_jpeg(&src.path().join("b.jpg"), 32, 32);
    write_jpeg(&src.path().join("sub/c.jpg"), 32, 32);
    std::fs::write(src.path().join("notes.txt"), "shopping list\n").unwrap();

    let err = thumbnail_dir(src.path(), &opts_for(out.path())).unwrap_err();
    match thumb_err(&err) {
        ThumbError::UnsupportedType { path, .. } => {
            assert_eq!(path.file_name().unwrap(), "notes.txt");
        }
        other => panic!("expected UnsupportedType, got {:?}", other),
    }
    assert!(!out.path().join("notes.txt").exists());
}

#[test]
fn test_corrupt_image_fails_with_decode_error_and_no_thumbnail() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write_jpeg(&src.path().join("good.jpg"), 50, 50);
    write_corrupt_jpeg(&src.path().join("broken.jpg"));

    let err = thumbnail_dir(src.path(), &opts_for(out.path())).unwrap_err();
    match thumb_err(&err) {
        ThumbError::Decode { path, .. } => assert_eq!(path.file_name().unwrap(), "broken.jpg"),
        other => panic!("expected Decode, got {:?}", other),
    }
    assert!(!out.path().join("broken.jpg").exists());
}

#[test]
fn test_decode_failure_is_never_resized() {
    let dir = tempfile::tempdir().unwrap();
    let broken = dir.path().join("broken.jpg");
    write_corrupt_jpeg(&broken);

    let codec = Arc::new(CountingCodec::default());
    let ctx = WorkerContext {
        codec: codec.clone(),
        width: 100,
        height: 100,
        cancel: CancelToken::new(),
    };
    let (path_tx, path_rx) = bounded::<PathBuf>(0);
    let (result_tx, result_rx) = bounded(0);
    let handles = spawn_thumbnail_workers(path_rx, &result_tx, &ctx, 2);
    drop(result_tx);

    let feeder = thread::spawn(move || {
        path_tx.send(broken).unwrap();
    });
    let results: Vec<_> = result_rx.iter().collect();
    feeder.join().unwrap();
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(results.len(), 1);
    assert!(matches!(results[0].outcome, Err(ThumbError::Decode { .. })));
    assert_eq!(codec.resizes.load(Ordering::SeqCst), 0);
}

#[test]
fn test_write_failure_is_persist_error() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write_jpeg(&src.path().join("a.jpg"), 40, 40);
    // A directory squatting on the destination name makes the write fail.
    std::fs::create_dir(out.path().join("a.jpg")).unwrap();

    let err = thumbnail_dir(src.path(), &opts_for(out.path())).unwrap_err();
    assert!(matches!(thumb_err(&err), ThumbError::Persist { .. }));
}

#[test]
fn test_existing_thumbnail_is_overwritten() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write_jpeg(&src.path().join("a.jpg"), 200, 200);
    std::fs::write(out.path().join("a.jpg"), b"stale").unwrap();

    thumbnail_dir(src.path(), &opts_for(out.path())).unwrap();
    assert_eq!(
        image::image_dimensions(out.path().join("a.jpg")).unwrap(),
        (100, 100)
    );
}

#[test]
fn test_second_run_is_byte_identical() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    for i in 0..6 {
        write_jpeg(&src.path().join(format!("img{i}.jpg")), 90 + i * 30, 120);
    }

    thumbnail_dir(src.path(), &opts_for(out.path())).unwrap();
    let first: Vec<Vec<u8>> = listing(out.path())
        .iter()
        .map(|n| std::fs::read(out.path().join(n)).unwrap())
        .collect();
    thumbnail_dir(src.path(), &opts_for(out.path())).unwrap();
    let second: Vec<Vec<u8>> = listing(out.path())
        .iter()
        .map(|n| std::fs::read(out.path().join(n)).unwrap())
        .collect();
    assert_eq!(first.len(), 6);
    assert_eq!(first, second);
}

#[test]
fn test_output_dir_inside_root_is_not_walked() {
    let src = tempfile::tempdir().unwrap();
    write_jpeg(&src.path().join("a.jpg"), 120, 120);
    let out = src.path().join("thumbnail");

    let first = thumbnail_dir(src.path(), &opts_for(&out)).unwrap();
    let second = thumbnail_dir(src.path(), &opts_for(&out)).unwrap();
    assert_eq!(first.discovered, 1);
    assert_eq!(second.discovered, 1);
    assert_eq!(listing(&out), vec!["a.jpg"]);
}

#[test]
fn test_fifty_images_never_exceed_pool_size() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    for i in 0..50 {
        write_jpeg(&src.path().join(format!("{i:02}.jpg")), 40, 40);
    }
    let codec = Arc::new(CountingCodec {
        decode_delay: Duration::from_millis(5),
        ..Default::default()
    });
    let opts = ThumbOpts {
        workers: Some(5),
        ..opts_for(out.path())
    };

    let summary = thumbnail_dir_with(src.path(), &opts, codec.clone(), &CancelToken::new()).unwrap();
    assert_eq!(summary.written, 50);
    assert_eq!(listing(out.path()).len(), 50);
    let max = codec.max_in_flight.load(Ordering::SeqCst);
    assert!(max <= 5, "saw {} images in flight", max);
    assert!(max > 1, "workers never overlapped");
    assert_eq!(codec.in_flight.load(Ordering::SeqCst), 0);
}

#[test]
fn test_external_cancel_stops_run_and_reports_cancelled() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    for i in 0..50 {
        write_jpeg(&src.path().join(format!("{i:02}.jpg")), 16, 16);
    }
    let codec = Arc::new(CountingCodec {
        decode_delay: Duration::from_millis(40),
        ..Default::default()
    });
    let cancel = CancelToken::new();
    let canceller = cancel.clone();
    let timer = thread::spawn(move || {
        thread::sleep(Duration::from_millis(60));
        canceller.cancel();
    });

    let err = thumbnail_dir_with(src.path(), &opts_for(out.path()), codec, &cancel).unwrap_err();
    timer.join().unwrap();
    assert!(thumb_err(&err).is_cancellation());
    assert!(listing(out.path()).len() < 50);
}

#[test]
fn test_cancel_before_start_writes_nothing() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write_jpeg(&src.path().join("a.jpg"), 16, 16);
    let cancel = CancelToken::new();
    cancel.cancel();

    let err =
        thumbnail_dir_with(src.path(), &opts_for(out.path()), Arc::new(ImageCodec), &cancel)
            .unwrap_err();
    assert!(thumb_err(&err).is_cancellation());
    assert!(listing(out.path()).is_empty());
}

#[test]
fn test_missing_root_is_error() {
    let out = tempfile::tempdir().unwrap();
    let missing = out.path().join("nope");
    assert!(thumbnail_dir(&missing, &opts_for(out.path())).is_err());
}

#[cfg(unix)]
#[test]
fn test_symlinks_are_skipped_when_not_followed() {
    let src = tempfile::tempdir().unwrap();
    let elsewhere = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write_jpeg(&src.path().join("a.jpg"), 30, 30);
    let notes = elsewhere.path().join("notes.txt");
    std::fs::write(&notes, "not an image").unwrap();
    std::os::unix::fs::symlink(&notes, src.path().join("link.txt")).unwrap();

    let summary = thumbnail_dir(src.path(), &opts_for(out.path())).unwrap();
    assert_eq!(summary.written, 1);
}
