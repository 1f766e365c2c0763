//! Colorimetric assay interpretation.
//!
//! Two independent evidence channels reach the same POSITIVE / NEGATIVE call:
//!
//! * a spectrophotometer export, reduced to the ratio of the absorbances
//!   nearest two configured wavelengths ([`analysis::analyze_spectrum`]);
//! * a photograph of the reacted solution, reduced to the hue of its centre
//!   region ([`analysis::analyze_image`]).
//!
//! The engine is synchronous and stateless; settings travel in an explicit
//! [`AnalysisConfig`] on every call.

pub mod analysis;
pub mod color;
pub mod config;
pub mod data;
pub mod error;

pub use analysis::{ClassificationResult, ImageReport, Label, SpectralReport};
pub use config::{AnalysisConfig, EncodingFallback, HueRule, LoaderOptions};
pub use data::loader::SpectralFormat;
pub use data::model::{SpectralSample, SpectralSeries};
pub use error::{AssayError, Result};
