use super::model::{Cell, RawTable, SpectralSample, SpectralSeries};
use crate::error::{AssayError, Result};

/// Prefix instruments use for comment and footer lines inside the data block.
pub const COMMENT_MARKER: &str = "//";

/// Whether a wavelength cell (as text) marks a comment row.
pub fn is_comment(text: &str) -> bool {
    text.starts_with(COMMENT_MARKER)
}

/// Numeric value of a cell, or `None` when it is missing, non-numeric or
/// non-finite. Never fails.
pub fn coerce(cell: &Cell) -> Option<f64> {
    let value = match cell {
        Cell::Number(v) => *v,
        Cell::Text(s) => s.trim().parse::<f64>().ok()?,
        Cell::Missing => return None,
    };
    value.is_finite().then_some(value)
}

/// Why a row did not make it into the series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowVerdict {
    Kept,
    Comment,
    MissingValue,
}

/// Classify a single row and, if usable, return its sample.
pub fn clean_row(row: &[Cell]) -> (RowVerdict, Option<SpectralSample>) {
    let wavelength = row.first().unwrap_or(&Cell::Missing);
    let absorbance = row.get(1).unwrap_or(&Cell::Missing);

    if let Cell::Text(text) = wavelength {
        if is_comment(text) {
            return (RowVerdict::Comment, None);
        }
    }

    match (coerce(wavelength), coerce(absorbance)) {
        (Some(w), Some(a)) => match SpectralSample::new(w, a) {
            Some(sample) => (RowVerdict::Kept, Some(sample)),
            None => (RowVerdict::MissingValue, None),
        },
        _ => (RowVerdict::MissingValue, None),
    }
}

/// Permissive stage: drop comment rows and rows without two usable numbers.
/// Only an entirely empty result is an error.
pub fn clean_table(table: &RawTable) -> Result<SpectralSeries> {
    let mut comments = 0usize;
    let mut dropped = 0usize;
    let mut samples = Vec::with_capacity(table.rows.len());

    for row in &table.rows {
        match clean_row(row) {
            (RowVerdict::Kept, Some(sample)) => samples.push(sample),
            (RowVerdict::Comment, _) => comments += 1,
            _ => dropped += 1,
        }
    }

    log::debug!(
        "cleaned table: kept {}, comment rows {comments}, unusable rows {dropped}",
        samples.len()
    );

    if samples.is_empty() {
        return Err(AssayError::EmptyResult(format!(
            "no numeric wavelength/absorbance rows among {} data rows",
            table.rows.len()
        )));
    }

    let series = SpectralSeries::from_samples(samples);
    log::info!("loaded spectral series with {} samples", series.len());
    Ok(series)
}
