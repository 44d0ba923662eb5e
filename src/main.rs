mod app;

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let settings = noteboard::settings::load_or_default();
    let native_options = eframe::NativeOptions::default();
    eframe::run_native(
        "Noteboard",
        native_options,
        Box::new(|_cc| Ok(Box::new(app::ViewerApp::new(settings)))),
    )
}
