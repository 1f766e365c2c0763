use crate::data::model::{SpectralSample, SpectralSeries};
use crate::error::{AssayError, Result};

/// The sample whose wavelength is closest to `target_nm`.
///
/// Equidistant samples are resolved in favour of the lowest wavelength, so
/// the answer does not depend on row order.
pub fn nearest_sample(series: &SpectralSeries, target_nm: f64) -> Result<SpectralSample> {
    series
        .samples()
        .iter()
        .min_by(|a, b| {
            let da = (a.wavelength - target_nm).abs();
            let db = (b.wavelength - target_nm).abs();
            da.total_cmp(&db)
                .then_with(|| a.wavelength.total_cmp(&b.wavelength))
        })
        .copied()
        .ok_or_else(|| {
            AssayError::EmptyResult(format!("no samples to look up {target_nm} nm in"))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(points: &[(f64, f64)]) -> SpectralSeries {
        SpectralSeries::from_samples(points.iter().map(|&(w, a)| SpectralSample {
            wavelength: w,
            absorbance: a,
        }))
    }

    #[test]
    fn picks_closest_wavelength() {
        let s = series(&[(500.0, 0.1), (540.0, 0.4), (650.0, 0.8), (700.0, 0.2)]);
        assert_eq!(nearest_sample(&s, 536.0).unwrap().absorbance, 0.4);
        assert_eq!(nearest_sample(&s, 644.0).unwrap().absorbance, 0.8);
        assert_eq!(nearest_sample(&s, 10_000.0).unwrap().wavelength, 700.0);
    }

    #[test]
    fn ties_go_to_lowest_wavelength_in_any_order() {
        let forward = series(&[(600.0, 0.6), (640.0, 0.64), (660.0, 0.66)]);
        let reverse = series(&[(660.0, 0.66), (640.0, 0.64), (600.0, 0.6)]);
        assert_eq!(nearest_sample(&forward, 650.0).unwrap().wavelength, 640.0);
        assert_eq!(nearest_sample(&reverse, 650.0).unwrap().wavelength, 640.0);
    }

    #[test]
    fn returned_sample_minimises_distance() {
        let s = series(&[(412.3, 0.1), (455.0, 0.2), (498.7, 0.3), (533.1, 0.4), (601.9, 0.5)]);
        for target in [400.0, 430.0, 477.0, 515.9, 560.0, 620.0] {
            let best = nearest_sample(&s, target).unwrap();
            let best_dist = (best.wavelength - target).abs();
            for other in s.samples() {
                assert!(best_dist <= (other.wavelength - target).abs());
            }
        }
    }

    #[test]
    fn single_point_answers_every_target() {
        let s = series(&[(600.0, 0.5)]);
        assert_eq!(nearest_sample(&s, 644.0).unwrap(), nearest_sample(&s, 536.0).unwrap());
    }

    #[test]
    fn empty_series_is_empty_result() {
        let err = nearest_sample(&SpectralSeries::default(), 644.0).unwrap_err();
        assert!(matches!(err, AssayError::EmptyResult(_)));
    }
}
