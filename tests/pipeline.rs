use std::io::{Cursor, Write};

use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};

use colorimetric_analyzer::analysis::{analyze_image, analyze_spectrum};
use colorimetric_analyzer::data::loader::load_file;
use colorimetric_analyzer::{AnalysisConfig, AssayError, EncodingFallback, Label, SpectralFormat};

fn scenario_config() -> AnalysisConfig {
    AnalysisConfig {
        positive_wavelength_nm: 644.0,
        negative_wavelength_nm: 536.0,
        ratio_threshold: 1.0,
        ..AnalysisConfig::default()
    }
}

fn png_bytes(image: DynamicImage) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    image.write_to(&mut cursor, ImageFormat::Png).unwrap();
    cursor.into_inner()
}

const EXPORT: &str = "// instrument v1\n\
Exported 2024-05-01,,\n\
Wavelength (nm),Abs,Flags\n\
// comment one\n\
// comment two\n\
644.0,0.812,ok\n\
536.0,0.401,\n\
// trailing footer\n";

#[test]
fn spectral_scenario_is_positive() {
    let report = analyze_spectrum(EXPORT.as_bytes(), SpectralFormat::Csv, &scenario_config()).unwrap();
    assert_eq!(report.series.len(), 2);
    assert_eq!(report.positive.absorbance, 0.812);
    assert_eq!(report.negative.absorbance, 0.401);
    assert!((report.result.metric - 2.025).abs() < 1e-3);
    assert_eq!(report.result.label, Label::Positive);
    assert_eq!(report.result.threshold_used, 1.0);
}

#[test]
fn raising_threshold_flips_the_call() {
    let config = AnalysisConfig {
        ratio_threshold: 2.5,
        ..scenario_config()
    };
    let report = analyze_spectrum(EXPORT.as_bytes(), SpectralFormat::Csv, &config).unwrap();
    assert_eq!(report.result.label, Label::Negative);
}

#[test]
fn zero_negative_absorbance_reports_zero_ratio() {
    let export = "p\np\nnm,abs\n644,0.9\n536,0\n";
    let report = analyze_spectrum(export.as_bytes(), SpectralFormat::Csv, &scenario_config()).unwrap();
    assert_eq!(report.result.metric, 0.0);
    assert_eq!(report.result.label, Label::Negative);
}

#[test]
fn comment_only_export_is_empty_result() {
    let export = "p\np\nnm,abs\n// a\n// b\n";
    let err = analyze_spectrum(export.as_bytes(), SpectralFormat::Csv, &scenario_config()).unwrap_err();
    assert!(matches!(err, AssayError::EmptyResult(_)));
}

#[test]
fn latin1_export_respects_fallback_policy() {
    let mut export = b"Ger\xE4t 7\nLauf 3\nWellenl\xE4nge,Absorption\n".to_vec();
    export.extend_from_slice(b"644,0.8\n536,0.4\n");

    let report = analyze_spectrum(&export, SpectralFormat::Csv, &scenario_config()).unwrap();
    assert_eq!(report.result.label, Label::Positive);

    let mut strict = scenario_config();
    strict.loader.encoding_fallback = EncodingFallback::Disabled;
    let err = analyze_spectrum(&export, SpectralFormat::Csv, &strict).unwrap_err();
    assert!(matches!(err, AssayError::Decode { .. }));
}

#[test]
fn load_file_dispatches_on_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.csv");
    std::fs::File::create(&path)
        .unwrap()
        .write_all(EXPORT.as_bytes())
        .unwrap();

    let series = load_file(&path, &scenario_config().loader).unwrap();
    assert_eq!(series.len(), 2);

    let unsupported = dir.path().join("run.ods");
    std::fs::write(&unsupported, b"PK").unwrap();
    assert!(matches!(
        load_file(&unsupported, &scenario_config().loader),
        Err(AssayError::Format(_))
    ));

    assert!(matches!(
        load_file(&dir.path().join("missing.csv"), &scenario_config().loader),
        Err(AssayError::Io(_))
    ));
}

#[test]
fn red_centre_is_positive_at_default_cutoff() {
    // Red centre, green border that the crop must ignore.
    let mut img = RgbImage::from_pixel(40, 40, Rgb([0, 200, 0]));
    for y in 10..30 {
        for x in 10..30 {
            img.put_pixel(x, y, Rgb([255, 0, 0]));
        }
    }
    let report = analyze_image(&png_bytes(DynamicImage::ImageRgb8(img)), &AnalysisConfig::default()).unwrap();
    assert_eq!(report.color.to_rgb8(), [255, 0, 0]);
    assert!(report.result.metric.abs() < 1e-9);
    assert_eq!(report.result.label, Label::Positive);
    assert_eq!(report.result.threshold_used, 245.0);
}

#[test]
fn violet_photo_is_negative() {
    let img = RgbImage::from_pixel(24, 24, Rgb([128, 0, 255]));
    let report = analyze_image(&png_bytes(DynamicImage::ImageRgb8(img)), &AnalysisConfig::default()).unwrap();
    assert!((report.result.metric - 270.0).abs() < 0.5);
    assert_eq!(report.result.label, Label::Negative);
}

#[test]
fn rgba_photo_matches_rgb_photo() {
    let rgba = RgbaImage::from_fn(32, 32, |x, y| Rgba([(x * 7) as u8, 30, (y * 7) as u8, (x + y) as u8]));
    let rgb = RgbImage::from_fn(32, 32, |x, y| Rgb([(x * 7) as u8, 30, (y * 7) as u8]));

    let config = AnalysisConfig::default();
    let from_rgba = analyze_image(&png_bytes(DynamicImage::ImageRgba8(rgba)), &config).unwrap();
    let from_rgb = analyze_image(&png_bytes(DynamicImage::ImageRgb8(rgb)), &config).unwrap();
    assert_eq!(from_rgba, from_rgb);
}

#[test]
fn tiny_photo_is_dimension_error() {
    let img = RgbImage::from_pixel(2, 2, Rgb([0, 0, 255]));
    let err = analyze_image(&png_bytes(DynamicImage::ImageRgb8(img)), &AnalysisConfig::default()).unwrap_err();
    assert!(matches!(err, AssayError::Dimension { width: 2, height: 2, divisor: 4 }));
}

#[test]
fn crop_divisor_changes_the_sampled_region() {
    // Blue inner square 20..40 in a 60x60 violet frame.
    let mut img = RgbImage::from_pixel(60, 60, Rgb([128, 0, 255]));
    for y in 20..40 {
        for x in 20..40 {
            img.put_pixel(x, y, Rgb([0, 0, 255]));
        }
    }
    let bytes = png_bytes(DynamicImage::ImageRgb8(img));

    // k = 6: 30 ± 10 → exactly the blue square.
    let tight = AnalysisConfig { crop_divisor: 6, ..AnalysisConfig::default() };
    let report = analyze_image(&bytes, &tight).unwrap();
    assert_eq!(report.color.to_rgb8(), [0, 0, 255]);
    assert_eq!(report.result.label, Label::Positive);

    // k = 2: whole frame, mostly violet.
    let wide = AnalysisConfig { crop_divisor: 2, ..AnalysisConfig::default() };
    let report = analyze_image(&bytes, &wide).unwrap();
    assert!(report.result.metric > 245.0);
    assert_eq!(report.result.label, Label::Negative);
}
