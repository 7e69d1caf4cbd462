#![cfg(feature = "cli")]

use assert_cmd::Command;
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_polygon_mut;
use imageproc::point::Point;
use predicates::prelude::*;

use section_scan::ScanConfig;

fn bin() -> Command {
    Command::cargo_bin("section-scan").expect("binary built")
}

fn write_scene(path: &std::path::Path) {
    let mut img = RgbImage::from_pixel(400, 400, Rgb([15, 15, 15]));
    let poly: Vec<Point<i32>> = (0..14)
        .map(|k| {
            let t = std::f64::consts::TAU * k as f64 / 14.0;
            Point::new(
                (200.0 + 120.0 * t.cos()).round() as i32,
                (200.0 + 120.0 * t.sin()).round() as i32,
            )
        })
        .collect();
    draw_polygon_mut(&mut img, &poly, Rgb([240, 240, 240]));
    img.save(path).expect("save scene");
}

#[test]
fn help_lists_subcommands() {
    bin()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("scan"))
        .stdout(predicate::str::contains("init-config"));
}

#[test]
fn missing_image_fails() {
    bin()
        .args(["scan", "--image", "/no/such/slice.png"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ImageLoad"));
}

#[test]
fn scan_prints_candidate_summary() {
    let dir = tempfile::tempdir().expect("tempdir");
    let image = dir.path().join("slice.png");
    write_scene(&image);
    let preview = dir.path().join("preview.png");

    bin()
        .args(["scan", "--image"])
        .arg(&image)
        .arg("--preview")
        .arg(&preview)
        .assert()
        .success()
        .stdout(predicate::str::contains("candidates:"))
        .stdout(predicate::str::contains("boxes:"));
    assert!(preview.exists());
}

#[test]
fn report_without_scale_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let image = dir.path().join("slice.png");
    write_scene(&image);

    bin()
        .args(["scan", "--image"])
        .arg(&image)
        .arg("--report")
        .arg(dir.path().join("report.txt"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("pixels-per-metric"));
}

#[test]
fn init_config_writes_loadable_json() {
    let dir = tempfile::tempdir().expect("tempdir");
    let out = dir.path().join("scan.json");

    bin()
        .args(["init-config", "--image", "slice.png", "--out"])
        .arg(&out)
        .assert()
        .success();

    let cfg = ScanConfig::load_json(&out).expect("load config");
    assert_eq!(cfg.image_path, "slice.png");
    assert_eq!(cfg.params.shape.min_vertices_exclusive, 10);
}
