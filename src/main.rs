use tapsync::{app, settings};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Install logger immediately, then set runtime max level from settings after loading them.
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Trace)
        .try_init();
    // Startup default when the settings file is missing or malformed.
    log::set_max_level(log::LevelFilter::Warn);

    settings::load();
    log::set_max_level(settings::get().log_level.as_level_filter());
    app::run()
}
