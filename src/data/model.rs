use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Cell – one raw value from an instrument table
// ---------------------------------------------------------------------------

/// A single cell as the strict stage read it, before any coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Text exactly as found in a delimited file or string column.
    Text(String),
    /// Already-typed numeric value (Parquet / JSON number).
    Number(f64),
    /// Null or absent (short row, Parquet null).
    Missing,
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => write!(f, "{s}"),
            Cell::Number(v) => write!(f, "{v}"),
            Cell::Missing => write!(f, "<missing>"),
        }
    }
}

// ---------------------------------------------------------------------------
// RawTable – output of the strict stage
// ---------------------------------------------------------------------------

/// Canonical names given to the first two columns, whatever the file called them.
pub const WAVELENGTH_COLUMN: &str = "Wavelength";
pub const ABSORBANCE_COLUMN: &str = "Absorbance";

/// A structurally valid table: at least two columns, first two renamed.
/// Rows may still contain comments and junk; that is the cleaner's job.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl RawTable {
    /// Rename the first two columns canonically. Fails when there are fewer
    /// than two, which makes every structural check go through one place.
    pub fn new(mut columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Option<Self> {
        if columns.len() < 2 {
            return None;
        }
        columns[0] = WAVELENGTH_COLUMN.to_string();
        columns[1] = ABSORBANCE_COLUMN.to_string();
        Some(RawTable { columns, rows })
    }
}

// ---------------------------------------------------------------------------
// SpectralSample / SpectralSeries
// ---------------------------------------------------------------------------

/// One (wavelength, absorbance) point. Both are finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpectralSample {
    /// Wavelength in nm.
    pub wavelength: f64,
    pub absorbance: f64,
}

impl SpectralSample {
    /// `None` unless both values are finite.
    pub fn new(wavelength: f64, absorbance: f64) -> Option<Self> {
        (wavelength.is_finite() && absorbance.is_finite()).then_some(SpectralSample {
            wavelength,
            absorbance,
        })
    }
}

/// The cleaned trace handed to the analysis stage. Never mutated after
/// creation; order is file order but nothing relies on it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SpectralSeries {
    samples: Vec<SpectralSample>,
}

impl SpectralSeries {
    /// Build a series, silently dropping any non-finite sample.
    pub fn from_samples(samples: impl IntoIterator<Item = SpectralSample>) -> Self {
        let samples = samples
            .into_iter()
            .filter(|s| s.wavelength.is_finite() && s.absorbance.is_finite())
            .collect();
        SpectralSeries { samples }
    }

    pub fn samples(&self) -> &[SpectralSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// `[wavelength, absorbance]` pairs, the shape plotting code wants.
    pub fn points(&self) -> Vec<[f64; 2]> {
        self.samples
            .iter()
            .map(|s| [s.wavelength, s.absorbance])
            .collect()
    }

    /// Smallest and largest wavelength, if any.
    pub fn wavelength_range(&self) -> Option<(f64, f64)> {
        let mut iter = self.samples.iter().map(|s| s.wavelength);
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), w| (lo.min(w), hi.max(w))))
    }
}
