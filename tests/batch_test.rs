use image::{ColorType, GenericImageView, Rgb, RgbImage, Rgba, RgbaImage};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use removebg_batch::mocks::MockRemovalService;
use removebg_batch::{BatchBackgroundRemover, Config, FileOutcome, SkipReason, Stage};

fn test_config(input_dir: &Path) -> Config {
    let mut config = Config::for_dirs(input_dir, "test-key");
    config.no_progress = true;
    config
}

fn write_rgb(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    RgbImage::from_pixel(32, 32, Rgb([200, 40, 40])).save(&path).unwrap();
    path
}

fn write_transparent_png(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    let mut img = RgbaImage::from_pixel(64, 64, Rgba([0, 0, 0, 0]));
    for x in 24..40 {
        for y in 24..40 {
            img.put_pixel(x, y, Rgba([0, 0, 255, 255]));
        }
    }
    img.save(&path).unwrap();
    path
}

#[test]
fn test_unsupported_extension_leaves_no_artifacts() {
    let temp_dir = TempDir::new().unwrap();
    let input_dir = temp_dir.path();
    fs::write(input_dir.join("notes.txt"), b"hello").unwrap();
    fs::write(input_dir.join("anim.gif"), b"GIF89a").unwrap();

    let config = test_config(input_dir);
    let mock = MockRemovalService::always_ok(b"png".to_vec());
    let summary = BatchBackgroundRemover::new(&mock, config.clone())
        .run()
        .unwrap();

    assert_eq!(summary.skipped(), 2);
    assert_eq!(mock.call_count(), 0);
    assert!(matches!(
        summary.report_for("notes.txt").unwrap().outcome,
        FileOutcome::Skipped(SkipReason::UnsupportedExtension(Some(ref ext))) if ext == "txt"
    ));
    assert_eq!(fs::read_dir(config.temp_dir()).unwrap().count(), 0);
    assert_eq!(fs::read_dir(config.output_dir()).unwrap().count(), 0);
}

#[test]
fn test_normalized_jpeg_has_no_alpha() {
    let temp_dir = TempDir::new().unwrap();
    let input_dir = temp_dir.path();
    write_transparent_png(input_dir, "car.png");

    let config = test_config(input_dir);
    let mock = MockRemovalService::always_ok(b"cutout".to_vec());
    let summary = BatchBackgroundRemover::new(&mock, config.clone())
        .run()
        .unwrap();

    assert_eq!(summary.saved(), 1);
    let jpeg_path = config.temp_dir().join("car.jpg");
    assert_eq!(mock.calls(), vec![jpeg_path.clone()]);

    let jpeg = image::open(&jpeg_path).unwrap();
    assert_eq!(jpeg.color(), ColorType::Rgb8);
    assert!(!jpeg.color().has_alpha());
    assert_eq!(jpeg.dimensions(), (64, 64));

    // corners were fully transparent
    let rgb = jpeg.to_rgb8();
    for (x, y) in [(0, 0), (63, 0), (0, 63), (63, 63)] {
        let Rgb(channels) = *rgb.get_pixel(x, y);
        assert!(channels.iter().all(|&c| c >= 245), "{:?}", channels);
    }
}

#[test]
fn test_success_body_written_verbatim() {
    let temp_dir = TempDir::new().unwrap();
    let input_dir = temp_dir.path();
    write_rgb(input_dir, "photo.JPG");

    let body: Vec<u8> = (0..=255u8).cycle().take(1000).collect();
    let config = test_config(input_dir);
    let mock = MockRemovalService::always_ok(body.clone());
    let summary = BatchBackgroundRemover::new(mock, config.clone())
        .run()
        .unwrap();

    let output = config.output_dir().join("photo.png");
    match &summary.report_for("photo.JPG").unwrap().outcome {
        FileOutcome::Saved { output: saved, .. } => assert_eq!(saved, &output),
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(fs::read(output).unwrap(), body);
}

#[test]
fn test_rejection_does_not_stop_the_batch() {
    let temp_dir = TempDir::new().unwrap();
    let input_dir = temp_dir.path();
    write_rgb(input_dir, "a.png");
    write_rgb(input_dir, "b.png");
    write_rgb(input_dir, "c.webp");

    let config = test_config(input_dir);
    let mock = MockRemovalService::rejecting(&["b"], 402, b"cutout".to_vec());
    let summary = BatchBackgroundRemover::new(&mock, config.clone())
        .run()
        .unwrap();

    assert_eq!(mock.call_count(), 3);
    assert_eq!(summary.saved(), 2);
    assert_eq!(summary.failed(), 1);
    assert!(matches!(
        summary.report_for("b.png").unwrap().outcome,
        FileOutcome::Failed { stage: Stage::Upload, .. }
    ));

    let output_dir = config.output_dir();
    assert!(output_dir.join("a.png").exists());
    assert!(!output_dir.join("b.png").exists());
    assert!(output_dir.join("c.png").exists());
}

#[test]
fn test_transport_failure_is_per_file() {
    let temp_dir = TempDir::new().unwrap();
    let input_dir = temp_dir.path();
    write_rgb(input_dir, "a.png");
    write_rgb(input_dir, "b.png");

    let config = test_config(input_dir);
    let mock = MockRemovalService::unreachable();
    let summary = BatchBackgroundRemover::new(&mock, config.clone())
        .run()
        .unwrap();

    assert_eq!(mock.call_count(), 2);
    assert_eq!(summary.failed(), 2);
    assert_eq!(fs::read_dir(config.output_dir()).unwrap().count(), 0);
}

#[test]
fn test_undecodable_image_is_skipped() {
    let temp_dir = TempDir::new().unwrap();
    let input_dir = temp_dir.path();
    fs::write(input_dir.join("a_broken.png"), b"definitely not a png").unwrap();
    write_rgb(input_dir, "b_good.png");

    let config = test_config(input_dir);
    let mock = MockRemovalService::always_ok(b"cutout".to_vec());
    let summary = BatchBackgroundRemover::new(&mock, config.clone())
        .run()
        .unwrap();

    assert!(matches!(
        summary.report_for("a_broken.png").unwrap().outcome,
        FileOutcome::Failed { stage: Stage::Normalize, .. }
    ));
    assert_eq!(mock.call_count(), 1);
    assert!(config.output_dir().join("b_good.png").exists());
    assert!(!config.output_dir().join("a_broken.png").exists());
}

#[test]
fn test_subdirectories_are_ignored_silently() {
    let temp_dir = TempDir::new().unwrap();
    let input_dir = temp_dir.path();
    fs::create_dir_all(input_dir.join("nested")).unwrap();
    write_rgb(&input_dir.join("nested"), "inner.png");
    write_rgb(input_dir, "outer.png");

    let config = test_config(input_dir);
    let mock = MockRemovalService::echo();
    let summary = BatchBackgroundRemover::new(&mock, config).run().unwrap();

    // temp and output dirs are created inside the input dir and skipped too
    assert_eq!(summary.reports.len(), 1);
    assert!(summary.report_for("outer.png").is_some());
    assert!(summary.report_for("nested").is_none());
}

#[test]
fn test_rerun_is_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let input_dir = temp_dir.path();
    write_transparent_png(input_dir, "car.png");
    write_rgb(input_dir, "van.jpg");

    let config = test_config(input_dir);
    let mock = MockRemovalService::echo();
    let remover = BatchBackgroundRemover::new(&mock, config.clone());

    let first = remover.run().unwrap();
    let car_first = fs::read(config.output_dir().join("car.png")).unwrap();
    let van_first = fs::read(config.output_dir().join("van.png")).unwrap();

    let second = remover.run().unwrap();
    let car_second = fs::read(config.output_dir().join("car.png")).unwrap();
    let van_second = fs::read(config.output_dir().join("van.png")).unwrap();

    assert_eq!(first.saved(), 2);
    assert_eq!(second.saved(), 2);
    assert_eq!(car_first, car_second);
    assert_eq!(van_first, van_second);
}

#[test]
fn test_explicit_directories_are_created_and_reused() {
    let temp_dir = TempDir::new().unwrap();
    let input_dir = temp_dir.path().join("input");
    fs::create_dir_all(&input_dir).unwrap();
    write_rgb(&input_dir, "a.png");

    let mut config = test_config(&input_dir);
    config.output_dir = Some(temp_dir.path().join("deep").join("out"));
    config.temp_dir = Some(temp_dir.path().join("scratch"));

    let mock = MockRemovalService::always_ok(b"cutout".to_vec());
    let remover = BatchBackgroundRemover::new(&mock, config.clone());

    remover.run().unwrap();
    assert!(config.output_dir().is_dir());
    assert!(config.temp_dir().join("a.jpg").exists());

    // second run finds both directories already present
    let summary = remover.run().unwrap();
    assert_eq!(summary.saved(), 1);
    assert_eq!(
        fs::read(config.output_dir().join("a.png")).unwrap(),
        b"cutout"
    );
}

#[cfg(unix)]
#[test]
fn test_non_utf8_names_keep_distinct_outputs() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let temp_dir = TempDir::new().unwrap();
    let input_dir = temp_dir.path();
    let first = input_dir.join(OsStr::from_bytes(b"car\xff.png"));
    let second = input_dir.join(OsStr::from_bytes(b"car\xfe.png"));
    RgbImage::from_pixel(8, 8, Rgb([255, 0, 0])).save(&first).unwrap();
    RgbImage::from_pixel(8, 8, Rgb([0, 0, 255])).save(&second).unwrap();

    let config = test_config(input_dir);
    let mock = MockRemovalService::echo();
    let summary = BatchBackgroundRemover::new(&mock, config.clone())
        .run()
        .unwrap();

    assert_eq!(summary.saved(), 2);
    let calls = mock.calls();
    assert_eq!(calls.len(), 2);
    assert_ne!(calls[0], calls[1]);

    let output_dir = config.output_dir();
    let cutout_a = output_dir.join(OsStr::from_bytes(b"car\xff.png"));
    let cutout_b = output_dir.join(OsStr::from_bytes(b"car\xfe.png"));
    assert_eq!(fs::read_dir(&output_dir).unwrap().count(), 2);
    assert_ne!(fs::read(cutout_a).unwrap(), fs::read(cutout_b).unwrap());
}
