use super::model::{ABSORBANCE_COLUMN, SpectralSeries, WAVELENGTH_COLUMN};
use crate::config::LoaderOptions;
use crate::error::{AssayError, Result};

/// Write a series back out in the layout the delimited loader reads:
/// `preamble_lines` lines of preamble, a header row, one row per sample.
///
/// Values use Rust's shortest round-trip float formatting, so re-loading the
/// output yields an identical series.
pub fn to_csv_bytes(series: &SpectralSeries, options: &LoaderOptions) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    for i in 0..options.preamble_lines {
        match i {
            0 => out.extend_from_slice(b"// colorimetric-analyzer cleaned export\n"),
            _ => out.extend_from_slice(b"//\n"),
        }
    }

    let mut writer = csv::WriterBuilder::new()
        .delimiter(options.delimiter)
        .from_writer(out);

    let to_err = |e: csv::Error| AssayError::Format(format!("writing CSV: {e}"));
    writer
        .write_record([WAVELENGTH_COLUMN, ABSORBANCE_COLUMN])
        .map_err(to_err)?;
    for sample in series.samples() {
        writer
            .write_record([sample.wavelength.to_string(), sample.absorbance.to_string()])
            .map_err(to_err)?;
    }

    writer
        .into_inner()
        .map_err(|e| AssayError::Format(format!("flushing CSV: {e}")))
}
