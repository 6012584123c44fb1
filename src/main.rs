use tutor_draw::draw::overlay::{native_options, OverlayApp, APP_TITLE};
use tutor_draw::draw::settings::DrawSettings;
use tutor_draw::draw::settings_store;
use tutor_draw::logging;

fn main() -> anyhow::Result<()> {
    let (settings, load_error) = match settings_store::load() {
        Ok(settings) => (settings, None),
        Err(err) => (DrawSettings::default(), Some(err)),
    };

    let log_dir = settings_store::resolve_settings_path()
        .ok()
        .and_then(|path| path.parent().map(|dir| dir.to_path_buf()));
    if let Some(dir) = &log_dir {
        let _ = std::fs::create_dir_all(dir);
    }
    let _guard = logging::init(settings.debug_logging, log_dir.as_deref());

    if let Some(err) = load_error {
        tracing::warn!(error = %format!("{err:#}"), "failed to load draw settings; using defaults");
    }
    tracing::info!(theme = %settings.current_theme, "starting TutorDraw");

    eframe::run_native(
        APP_TITLE,
        native_options(),
        Box::new(move |_cc| Box::new(OverlayApp::new(settings))),
    )
    .map_err(|err| anyhow::anyhow!("overlay window failed: {err}"))
}
