use eframe::egui::{Color32, Ui};
use egui_plot::{Legend, Line, Plot, PlotPoints, Points, VLine};

use colorimetric_analyzer::{AnalysisConfig, SpectralReport};

const POSITIVE_MARKER: Color32 = Color32::from_rgb(60, 120, 230);
const NEGATIVE_MARKER: Color32 = Color32::from_rgb(150, 70, 200);

// ---------------------------------------------------------------------------
// Spectrum plot (Spectrum tab)
// ---------------------------------------------------------------------------

/// Absorbance trace with the configured wavelengths and the samples the
/// classifier actually used.
pub fn spectrum_plot(ui: &mut Ui, report: &SpectralReport, config: &AnalysisConfig) {
    Plot::new("spectrum_plot")
        .legend(Legend::default())
        .x_axis_label("Wavelength (nm)")
        .y_axis_label("Absorbance")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            let points: PlotPoints = report.series.points().into_iter().collect();
            plot_ui.line(
                Line::new(points)
                    .name("Absorbance")
                    .color(Color32::LIGHT_BLUE)
                    .width(1.5),
            );

            plot_ui.vline(
                VLine::new(config.positive_wavelength_nm)
                    .name(format!("λ+ {} nm", config.positive_wavelength_nm))
                    .color(POSITIVE_MARKER),
            );
            plot_ui.vline(
                VLine::new(config.negative_wavelength_nm)
                    .name(format!("λ− {} nm", config.negative_wavelength_nm))
                    .color(NEGATIVE_MARKER),
            );

            for (sample, color, name) in [
                (report.positive, POSITIVE_MARKER, "sampled λ+"),
                (report.negative, NEGATIVE_MARKER, "sampled λ−"),
            ] {
                plot_ui.points(
                    Points::new(vec![[sample.wavelength, sample.absorbance]])
                        .radius(4.0)
                        .color(color)
                        .name(name),
                );
            }
        });
}
