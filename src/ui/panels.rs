use eframe::egui::{self, Color32, DragValue, RichText, ScrollArea, Ui};

use colorimetric_analyzer::{ClassificationResult, EncodingFallback, HueRule, Label};

use crate::state::{AppState, Tab};
use crate::ui::plot;

const POSITIVE_COLOR: Color32 = Color32::from_rgb(40, 160, 70);
const NEGATIVE_COLOR: Color32 = Color32::from_rgb(200, 50, 50);

// ---------------------------------------------------------------------------
// Left side panel – analysis settings
// ---------------------------------------------------------------------------

/// Render the settings panel. Any change re-runs the loaded inputs.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Settings");
    ui.separator();

    let mut changed = false;
    let config = &mut state.config;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.strong("Spectrum");
            egui::Grid::new("spectral_settings")
                .num_columns(2)
                .show(ui, |ui: &mut Ui| {
                    ui.label("Wavelength positive");
                    changed |= ui
                        .add(
                            DragValue::new(&mut config.positive_wavelength_nm)
                                .speed(1.0)
                                .range(190.0..=1100.0)
                                .suffix(" nm"),
                        )
                        .changed();
                    ui.end_row();

                    ui.label("Wavelength negative");
                    changed |= ui
                        .add(
                            DragValue::new(&mut config.negative_wavelength_nm)
                                .speed(1.0)
                                .range(190.0..=1100.0)
                                .suffix(" nm"),
                        )
                        .changed();
                    ui.end_row();

                    ui.label("Threshold ratio");
                    changed |= ui
                        .add(
                            DragValue::new(&mut config.ratio_threshold)
                                .speed(0.01)
                                .range(0.0..=100.0)
                                .fixed_decimals(2),
                        )
                        .changed();
                    ui.end_row();
                });

            ui.separator();
            ui.strong("Photo");
            egui::Grid::new("photo_settings")
                .num_columns(2)
                .show(ui, |ui: &mut Ui| {
                    ui.label("Hue cutoff");
                    changed |= ui
                        .add(
                            DragValue::new(&mut config.hue_cutoff_deg)
                                .speed(1.0)
                                .range(0.0..=360.0)
                                .suffix("°"),
                        )
                        .changed();
                    ui.end_row();

                    ui.label("Positive when");
                    let before = config.hue_rule;
                    egui::ComboBox::from_id_salt("hue_rule")
                        .selected_text(match config.hue_rule {
                            HueRule::BelowCutoff => "hue < cutoff",
                            HueRule::AboveCutoff => "hue > cutoff",
                        })
                        .show_ui(ui, |ui: &mut Ui| {
                            ui.selectable_value(&mut config.hue_rule, HueRule::BelowCutoff, "hue < cutoff");
                            ui.selectable_value(&mut config.hue_rule, HueRule::AboveCutoff, "hue > cutoff");
                        });
                    changed |= before != config.hue_rule;
                    ui.end_row();

                    ui.label("Crop divisor");
                    changed |= ui
                        .add(DragValue::new(&mut config.crop_divisor).range(2..=16))
                        .changed();
                    ui.end_row();
                });

            ui.separator();
            ui.strong("File import");
            egui::Grid::new("loader_settings")
                .num_columns(2)
                .show(ui, |ui: &mut Ui| {
                    ui.label("Preamble lines");
                    changed |= ui
                        .add(DragValue::new(&mut config.loader.preamble_lines).range(0..=50))
                        .changed();
                    ui.end_row();

                    ui.label("Delimiter");
                    let before = config.loader.delimiter;
                    egui::ComboBox::from_id_salt("delimiter")
                        .selected_text(delimiter_name(config.loader.delimiter))
                        .show_ui(ui, |ui: &mut Ui| {
                            for delim in [b',', b';', b'\t'] {
                                ui.selectable_value(&mut config.loader.delimiter, delim, delimiter_name(delim));
                            }
                        });
                    changed |= before != config.loader.delimiter;
                    ui.end_row();
                });

            let mut latin1 = config.loader.encoding_fallback == EncodingFallback::Latin1;
            if ui.checkbox(&mut latin1, "Retry non-UTF-8 files as Latin-1").changed() {
                config.loader.encoding_fallback = if latin1 {
                    EncodingFallback::Latin1
                } else {
                    EncodingFallback::Disabled
                };
                changed = true;
            }
        });

    if changed {
        state.rerun_all();
    }
}

fn delimiter_name(delim: u8) -> &'static str {
    match delim {
        b',' => "comma",
        b';' => "semicolon",
        b'\t' => "tab",
        _ => "other",
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open spectrum…").clicked() {
                open_spectrum_dialog(state);
                ui.close_menu();
            }
            if ui.button("Open photo…").clicked() {
                open_photo_dialog(state);
                ui.close_menu();
            }
            ui.separator();
            if ui.button("Export cleaned CSV…").clicked() {
                export_dialog(state);
                ui.close_menu();
            }
            ui.separator();
            if ui.button("Load settings…").clicked() {
                load_settings_dialog(state);
                ui.close_menu();
            }
            if ui.button("Save settings…").clicked() {
                save_settings_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(input) = &state.spectrum {
            ui.label(format!("spectrum: {}", input.name));
        }
        if let Some(input) = &state.photo {
            ui.label(format!("photo: {}", input.name));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Central panel – tabs
// ---------------------------------------------------------------------------

pub fn central_panel(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        ui.selectable_value(&mut state.tab, Tab::Manual, "Manual");
        ui.selectable_value(&mut state.tab, Tab::Spectrum, "Spectrum file");
        ui.selectable_value(&mut state.tab, Tab::Photo, "Photo");
    });
    ui.separator();

    match state.tab {
        Tab::Manual => manual_tab(ui, state),
        Tab::Spectrum => spectrum_tab(ui, state),
        Tab::Photo => photo_tab(ui, state),
    }
}

fn manual_tab(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Measurement");
    egui::Grid::new("manual_inputs")
        .num_columns(2)
        .show(ui, |ui: &mut Ui| {
            ui.label(format!("Absorbance @ {} nm", state.config.positive_wavelength_nm));
            ui.add(
                DragValue::new(&mut state.manual_positive)
                    .speed(0.001)
                    .range(0.0..=10.0)
                    .fixed_decimals(3),
            );
            ui.end_row();

            ui.label(format!("Absorbance @ {} nm", state.config.negative_wavelength_nm));
            ui.add(
                DragValue::new(&mut state.manual_negative)
                    .speed(0.001)
                    .range(0.0..=10.0)
                    .fixed_decimals(3),
            );
            ui.end_row();
        });

    if ui.button("Analyse").clicked() {
        state.run_manual();
    }

    if let Some(result) = &state.manual_result {
        ui.separator();
        result_banner(ui, result, "Ratio", 2);
    }
}

fn spectrum_tab(ui: &mut Ui, state: &mut AppState) {
    let Some(report) = &state.spectral_report else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a spectrum export  (File → Open spectrum…)");
        });
        return;
    };

    ui.horizontal(|ui: &mut Ui| {
        metric(
            ui,
            &format!("Abs @{} nm", report.positive.wavelength),
            format!("{:.3}", report.positive.absorbance),
        );
        metric(
            ui,
            &format!("Abs @{} nm", report.negative.wavelength),
            format!("{:.3}", report.negative.absorbance),
        );
        metric(ui, "Samples", report.series.len().to_string());
    });
    result_banner(ui, &report.result, "Calculated ratio", 2);
    ui.separator();
    plot::spectrum_plot(ui, report, &state.config);
}

fn photo_tab(ui: &mut Ui, state: &mut AppState) {
    let Some(input) = &state.photo else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a photo of the reacted solution  (File → Open photo…)");
        });
        return;
    };

    ui.horizontal(|ui: &mut Ui| {
        ui.add(
            egui::Image::from_bytes(input.uri.clone(), input.bytes.clone())
                .max_height(260.0)
                .max_width(360.0),
        );

        let Some(report) = &state.image_report else {
            return;
        };
        ui.vertical(|ui: &mut Ui| {
            let [r, g, b] = report.color.to_rgb8();
            let (rect, _) = ui.allocate_exact_size(egui::vec2(72.0, 72.0), egui::Sense::hover());
            ui.painter().rect_filled(rect, 6.0, Color32::from_rgb(r, g, b));
            ui.monospace(report.color.hex());
            ui.label(format!(
                "centre crop {}x{} at ({}, {})",
                report.crop.width, report.crop.height, report.crop.left, report.crop.top
            ));
            result_banner(ui, &report.result, "Hue (°)", 1);
        });
    });
}

fn metric(ui: &mut Ui, caption: &str, value: String) {
    ui.vertical(|ui: &mut Ui| {
        ui.label(RichText::new(caption).small());
        ui.label(RichText::new(value).heading());
    });
    ui.add_space(16.0);
}

fn result_banner(ui: &mut Ui, result: &ClassificationResult, metric_name: &str, decimals: usize) {
    ui.label(format!(
        "{metric_name}: {:.decimals$}   (threshold {:.decimals$})",
        result.metric, result.threshold_used
    ));
    let color = match result.label {
        Label::Positive => POSITIVE_COLOR,
        Label::Negative => NEGATIVE_COLOR,
    };
    ui.label(
        RichText::new(format!("Result: {}", result.label))
            .heading()
            .strong()
            .color(color),
    );
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

fn report_error(state: &mut AppState, what: &str, e: anyhow::Error) {
    log::error!("{what}: {e:#}");
    state.status_message = Some(format!("Error: {e:#}"));
}

pub fn open_spectrum_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open spectrophotometer export")
        .add_filter(
            "Supported files",
            &["csv", "txt", "xlsx", "xls", "parquet", "pq", "json"],
        )
        .add_filter("CSV / text", &["csv", "txt"])
        .add_filter("Excel", &["xlsx", "xls"])
        .add_filter("Parquet", &["parquet", "pq"])
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        if let Err(e) = state.open_spectrum(&path) {
            report_error(state, "failed to open spectrum", e);
        }
    }
}

pub fn open_photo_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open photo")
        .add_filter("Images", &["jpg", "jpeg", "png"])
        .pick_file();

    if let Some(path) = file {
        if let Err(e) = state.open_photo(&path) {
            report_error(state, "failed to open photo", e);
        }
    }
}

fn export_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export cleaned spectrum")
        .add_filter("CSV", &["csv"])
        .set_file_name("cleaned.csv")
        .save_file();

    if let Some(path) = file {
        if let Err(e) = state.export_cleaned(&path) {
            report_error(state, "failed to export", e);
        }
    }
}

fn load_settings_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Load settings")
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        if let Err(e) = state.load_settings(&path) {
            report_error(state, "failed to load settings", e);
        }
    }
}

fn save_settings_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Save settings")
        .add_filter("JSON", &["json"])
        .set_file_name("assay-settings.json")
        .save_file();

    if let Some(path) = file {
        if let Err(e) = state.save_settings(&path) {
            report_error(state, "failed to save settings", e);
        }
    }
}
