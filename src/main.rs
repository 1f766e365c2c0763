mod app;
mod state;
mod ui;

use app::AnalyzerApp;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 760.0])
            .with_min_inner_size([640.0, 420.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Colorimetric Rapid Analyzer",
        options,
        Box::new(|cc| {
            // Image loaders let the Photo tab preview jpg/png bytes.
            egui_extras::install_image_loaders(&cc.egui_ctx);
            Ok(Box::new(AnalyzerApp::default()))
        }),
    )
}
