use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AssayError, Result};

// ---------------------------------------------------------------------------
// Loader options
// ---------------------------------------------------------------------------

/// What to do when the export is not valid UTF-8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncodingFallback {
    /// Retry as ISO-8859-1 (older instruments / Windows exports).
    Latin1,
    /// Fail with a decode error.
    Disabled,
}

/// Knobs for the delimited-text reader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderOptions {
    /// Instrument preamble lines dropped before the header row.
    pub preamble_lines: usize,
    /// Field separator, a single ASCII byte.
    pub delimiter: u8,
    pub encoding_fallback: EncodingFallback,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            preamble_lines: 2,
            delimiter: b',',
            encoding_fallback: EncodingFallback::Latin1,
        }
    }
}

// ---------------------------------------------------------------------------
// Hue decision direction
// ---------------------------------------------------------------------------

/// Which side of the hue cutoff counts as POSITIVE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HueRule {
    /// `hue < cutoff` is POSITIVE (blue sits below violet on the wheel).
    BelowCutoff,
    /// `hue > cutoff` is POSITIVE.
    AboveCutoff,
}

// ---------------------------------------------------------------------------
// AnalysisConfig
// ---------------------------------------------------------------------------

/// Settings for one analysis. Passed explicitly into every call; the engine
/// keeps no configuration of its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub positive_wavelength_nm: f64,
    pub negative_wavelength_nm: f64,
    /// `A_pos / A_neg` above this is POSITIVE.
    pub ratio_threshold: f64,
    pub hue_cutoff_deg: f64,
    pub hue_rule: HueRule,
    /// Centre crop spans `H/2 ± H/k` and `W/2 ± W/k`; larger k, tighter crop.
    pub crop_divisor: u32,
    pub loader: LoaderOptions,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            positive_wavelength_nm: 650.0,
            negative_wavelength_nm: 565.0,
            ratio_threshold: 1.0,
            hue_cutoff_deg: 245.0,
            hue_rule: HueRule::BelowCutoff,
            crop_divisor: 4,
            loader: LoaderOptions::default(),
        }
    }
}

impl AnalysisConfig {
    /// Parse a (possibly partial) JSON settings document; missing keys keep
    /// their defaults.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: AnalysisConfig = serde_json::from_str(text)
            .map_err(|e| AssayError::Config(format!("parsing settings JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Read a settings file from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| AssayError::Config(format!("serializing settings: {e}")))
    }

    /// Reject values the engine cannot meaningfully work with.
    pub fn validate(&self) -> Result<()> {
        let finite = [
            ("positive_wavelength_nm", self.positive_wavelength_nm),
            ("negative_wavelength_nm", self.negative_wavelength_nm),
            ("ratio_threshold", self.ratio_threshold),
            ("hue_cutoff_deg", self.hue_cutoff_deg),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(AssayError::Config(format!("{name} must be finite, got {value}")));
            }
        }
        if !(0.0..=360.0).contains(&self.hue_cutoff_deg) {
            return Err(AssayError::Config(format!(
                "hue_cutoff_deg must lie in [0, 360], got {}",
                self.hue_cutoff_deg
            )));
        }
        if self.crop_divisor < 2 {
            return Err(AssayError::Config(format!(
                "crop_divisor must be at least 2, got {}",
                self.crop_divisor
            )));
        }
        let delim = self.loader.delimiter;
        if !delim.is_ascii() || delim == b'"' || delim == b'\n' || delim == b'\r' {
            return Err(AssayError::Config(format!(
                "delimiter must be a plain ASCII separator, got byte {delim:#04x}"
            )));
        }
        Ok(())
    }
}
