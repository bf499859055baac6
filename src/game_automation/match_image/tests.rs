//! Tests for template loading and matching

use crate::game_automation::backends::TemplateMatcher;
use crate::game_automation::match_image::{TemplateLibrary, best_match};
use crate::game_automation::types::{Frame, Point};
use image::{GrayImage, Luma};
use std::io::Cursor;

/// Deterministic, non-repeating texture so the correlation peak is unique.
fn textured_screen(width: u32, height: u32) -> GrayImage {
    GrayImage::from_fn(width, height, |x, y| {
        let v = (x * 37 + y * 91) ^ (x * y + 13);
        Luma([(v % 251) as u8])
    })
}

fn png_frame(gray: &GrayImage) -> Frame {
    let mut png = Vec::new();
    image::DynamicImage::ImageLuma8(gray.clone())
        .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .unwrap();
    Frame::new(png)
}

#[test]
fn test_best_match_finds_exact_patch() {
    let screen = textured_screen(64, 48);
    let patch = image::imageops::crop_imm(&screen, 20, 15, 12, 10).to_image();

    let ((x, y), score) = best_match(&screen, &patch).unwrap();

    assert_eq!((x, y), (20, 15));
    assert!(score > 0.99, "Expected near-perfect match, got {score:.4}");
}

#[test]
fn test_best_match_template_larger_than_screen() {
    let screen = textured_screen(10, 10);
    let patch = textured_screen(20, 5);
    assert!(best_match(&screen, &patch).is_none());
}

#[tokio::test]
async fn test_library_find_returns_center() {
    let dir = tempfile::tempdir().unwrap();
    let screen = textured_screen(64, 48);
    let patch = image::imageops::crop_imm(&screen, 20, 15, 12, 10).to_image();
    patch.save(dir.path().join("home.png")).unwrap();

    let library = TemplateLibrary::new(dir.path());
    let found = library
        .find(&png_frame(&screen), "home", 0.7)
        .await
        .unwrap();

    let (point, score) = found.expect("template should match");
    assert_eq!(point, Point::new(26, 20));
    assert!(score >= 0.7);
    assert_eq!(library.count_cached(), 1);
}

#[tokio::test]
async fn test_library_threshold_above_one_never_matches() {
    let dir = tempfile::tempdir().unwrap();
    let screen = textured_screen(64, 48);
    let patch = image::imageops::crop_imm(&screen, 5, 5, 8, 8).to_image();
    patch.save(dir.path().join("x.png")).unwrap();

    let library = TemplateLibrary::new(dir.path());
    let found = library.find(&png_frame(&screen), "x", 1.01).await.unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn test_library_missing_template_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let library = TemplateLibrary::new(dir.path());
    let screen = textured_screen(16, 16);
    let result = library.find(&png_frame(&screen), "refresh", 0.6).await;
    assert!(result.is_err());
}

#[test]
fn test_library_lists_available_templates() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["home", "break", "x"] {
        textured_screen(4, 4)
            .save(dir.path().join(format!("{name}.png")))
            .unwrap();
    }
    std::fs::write(dir.path().join("notes.txt"), "ignore me").unwrap();

    let library = TemplateLibrary::new(dir.path());
    assert_eq!(library.available().unwrap(), vec!["break", "home", "x"]);
    assert_eq!(library.path_for("home"), dir.path().join("home.png"));
}
