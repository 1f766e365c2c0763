use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use colorimetric_analyzer::analysis::{self, ClassificationResult, ImageReport, SpectralReport};
use colorimetric_analyzer::{AnalysisConfig, SpectralFormat};

// ---------------------------------------------------------------------------
// Inputs held by the shell
// ---------------------------------------------------------------------------

/// Which central view is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Manual,
    Spectrum,
    Photo,
}

/// A spectral export read from disk, kept so settings changes can re-run it.
pub struct SpectrumInput {
    pub name: String,
    pub format: SpectralFormat,
    pub bytes: Vec<u8>,
}

/// A photo read from disk. `uri` is unique per load so the image cache
/// never serves a previous photo that had the same file name.
pub struct PhotoInput {
    pub name: String,
    pub uri: String,
    pub bytes: Arc<[u8]>,
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering. The engine itself holds
/// nothing; every result here is recomputed from the stored inputs.
pub struct AppState {
    pub config: AnalysisConfig,
    pub tab: Tab,

    pub manual_positive: f64,
    pub manual_negative: f64,
    pub manual_result: Option<ClassificationResult>,

    pub spectrum: Option<SpectrumInput>,
    pub spectral_report: Option<SpectralReport>,

    pub photo: Option<PhotoInput>,
    pub image_report: Option<ImageReport>,
    photo_loads: u64,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            config: AnalysisConfig::default(),
            tab: Tab::Manual,
            manual_positive: 0.0,
            manual_negative: 0.0,
            manual_result: None,
            spectrum: None,
            spectral_report: None,
            photo: None,
            image_report: None,
            photo_loads: 0,
            status_message: None,
        }
    }
}

impl AppState {
    /// Read a spectral export and analyse it.
    pub fn open_spectrum(&mut self, path: &Path) -> Result<()> {
        self.status_message = None;
        self.spectrum = None;
        self.spectral_report = None;
        let format = SpectralFormat::from_path(path)?;
        let bytes = std::fs::read(path)
            .with_context(|| format!("reading {}", path.display()))?;
        self.spectrum = Some(SpectrumInput {
            name: display_name(path),
            format,
            bytes,
        });
        self.tab = Tab::Spectrum;
        self.rerun_spectrum();
        Ok(())
    }

    /// Read a photo and analyse it.
    pub fn open_photo(&mut self, path: &Path) -> Result<()> {
        self.status_message = None;
        self.photo = None;
        self.image_report = None;
        let bytes = std::fs::read(path)
            .with_context(|| format!("reading {}", path.display()))?;
        self.photo_loads += 1;
        let name = display_name(path);
        self.photo = Some(PhotoInput {
            uri: format!("bytes://photo/{}/{name}", self.photo_loads),
            name,
            bytes: bytes.into(),
        });
        self.tab = Tab::Photo;
        self.rerun_photo();
        Ok(())
    }

    pub fn load_settings(&mut self, path: &Path) -> Result<()> {
        self.config = AnalysisConfig::load(path)
            .with_context(|| format!("loading settings from {}", path.display()))?;
        self.rerun_all();
        Ok(())
    }

    pub fn save_settings(&self, path: &Path) -> Result<()> {
        let text = self.config.to_json_string()?;
        std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))
    }

    /// Write the cleaned series of the current spectrum.
    pub fn export_cleaned(&self, path: &Path) -> Result<()> {
        let report = self
            .spectral_report
            .as_ref()
            .context("no analysed spectrum to export")?;
        let bytes = colorimetric_analyzer::data::export::to_csv_bytes(
            &report.series,
            &self.config.loader,
        )?;
        std::fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))
    }

    pub fn run_manual(&mut self) {
        match analysis::analyze_manual(self.manual_positive, self.manual_negative, &self.config) {
            Ok(result) => self.manual_result = Some(result),
            Err(e) => {
                log::error!("manual classification failed: {e}");
                self.status_message = Some(format!("Manual entry: {e}"));
                self.manual_result = None;
            }
        }
    }

    /// Re-run everything after a settings change.
    pub fn rerun_all(&mut self) {
        self.status_message = None;
        if self.manual_result.is_some() {
            self.run_manual();
        }
        self.rerun_spectrum();
        self.rerun_photo();
    }

    fn rerun_spectrum(&mut self) {
        let Some(input) = &self.spectrum else {
            return;
        };
        match analysis::analyze_spectrum(&input.bytes, input.format, &self.config) {
            Ok(report) => {
                log::info!(
                    "{}: ratio {:.3} → {}",
                    input.name,
                    report.result.metric,
                    report.result.label
                );
                self.spectral_report = Some(report);
            }
            Err(e) => {
                log::error!("spectral analysis of {} failed: {e}", input.name);
                self.status_message = Some(format!("{}: {e}", input.name));
                self.spectral_report = None;
            }
        }
    }

    fn rerun_photo(&mut self) {
        let Some(input) = &self.photo else {
            return;
        };
        match analysis::analyze_image(&input.bytes, &self.config) {
            Ok(report) => {
                log::info!(
                    "{}: hue {:.1}° → {}",
                    input.name,
                    report.result.metric,
                    report.result.label
                );
                self.image_report = Some(report);
            }
            Err(e) => {
                log::error!("photo analysis of {} failed: {e}", input.name);
                self.status_message = Some(format!("{}: {e}", input.name));
                self.image_report = None;
            }
        }
    }
}
