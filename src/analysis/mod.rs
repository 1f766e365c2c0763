//! Decision stage shared by both evidence channels.
//!
//! ```text
//!  spectral bytes ─► data::loader ─► peak (×2) ─► ratio ─┐
//!                                                        ├─► ClassificationResult
//!  photo bytes ────► color::sample_center ────────► hue ─┘
//! ```
//!
//! Every entry point takes its settings as an explicit [`AnalysisConfig`]
//! and keeps nothing between calls.
use std::fmt;

use serde::Serialize;

use crate::color::{self, ColorSample, CropRegion};
use crate::config::AnalysisConfig;
use crate::data::loader::{self, SpectralFormat};
use crate::data::model::{SpectralSample, SpectralSeries};
use crate::error::Result;

pub mod hue;
pub mod peak;
pub mod ratio;

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Assay outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Label {
    /// Target present (blue solution).
    Positive,
    /// Target absent (violet solution).
    Negative,
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Positive => write!(f, "POSITIVE"),
            Label::Negative => write!(f, "NEGATIVE"),
        }
    }
}

/// One two-way decision: the metric (ratio or hue), the label, and the
/// threshold it was compared with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassificationResult {
    pub metric: f64,
    pub label: Label,
    pub threshold_used: f64,
}

/// Everything the spectral path produced, so the caller can plot the trace
/// and mark the two sampled points.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpectralReport {
    pub series: SpectralSeries,
    pub positive: SpectralSample,
    pub negative: SpectralSample,
    pub result: ClassificationResult,
}

/// Everything the photo path produced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ImageReport {
    pub color: ColorSample,
    pub crop: CropRegion,
    pub result: ClassificationResult,
}

// ---------------------------------------------------------------------------
// Pipelines
// ---------------------------------------------------------------------------

/// Classify an already-cleaned series.
pub fn analyze_series(series: SpectralSeries, config: &AnalysisConfig) -> Result<SpectralReport> {
    config.validate()?;
    classify_series(series, config)
}

/// Raw export bytes → cleaned series → ratio decision.
pub fn analyze_spectrum(
    bytes: &[u8],
    format: SpectralFormat,
    config: &AnalysisConfig,
) -> Result<SpectralReport> {
    config.validate()?;
    let series = loader::load_bytes(bytes, format, &config.loader)?;
    classify_series(series, config)
}

/// Assumes `config` has been validated.
fn classify_series(series: SpectralSeries, config: &AnalysisConfig) -> Result<SpectralReport> {
    let positive = peak::nearest_sample(&series, config.positive_wavelength_nm)?;
    let negative = peak::nearest_sample(&series, config.negative_wavelength_nm)?;
    log::debug!(
        "peaks: A({} nm) = {}, A({} nm) = {}",
        positive.wavelength,
        positive.absorbance,
        negative.wavelength,
        negative.absorbance
    );

    let result = ratio::classify_ratio(
        positive.absorbance,
        negative.absorbance,
        config.ratio_threshold,
    );
    Ok(SpectralReport {
        series,
        positive,
        negative,
        result,
    })
}

/// Two absorbances typed in by the operator, no file involved.
pub fn analyze_manual(
    positive_absorbance: f64,
    negative_absorbance: f64,
    config: &AnalysisConfig,
) -> Result<ClassificationResult> {
    config.validate()?;
    Ok(ratio::classify_ratio(
        positive_absorbance,
        negative_absorbance,
        config.ratio_threshold,
    ))
}

/// Photo bytes → centre colour → hue decision.
pub fn analyze_image(bytes: &[u8], config: &AnalysisConfig) -> Result<ImageReport> {
    config.validate()?;
    let image = color::decode_image(bytes)?;
    let (sample, crop) = color::sample_center(&image, config.crop_divisor)?;
    let result = hue::classify_hue(&sample, config.hue_cutoff_deg, config.hue_rule);
    Ok(ImageReport {
        color: sample,
        crop,
        result,
    })
}
