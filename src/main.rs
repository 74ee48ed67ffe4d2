use app::App;
use config::AppConfig;
use std::{fs::OpenOptions, sync::Mutex, time::Duration};
use tracing_subscriber::EnvFilter;

mod action;
mod app;
mod components;
mod config;
mod dashboard;
mod data;
mod theme;
mod tui;
mod utils;
mod widgets;

#[cfg(test)]
mod test_support;

fn init_tracing() -> Result<(), Box<dyn std::error::Error>> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(AppConfig::diagnostics_path())?;

    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Setup panic handler
    std::panic::set_hook(Box::new(|panic_info| {
        // Restore terminal
        let _ = tui::restore_terminal();

        // Print panic info
        eprintln!("{}", panic_info);
    }));

    init_tracing()?;

    let config = AppConfig::load().unwrap_or_default();
    tracing::info!(
        resolver = %config.resolver_url,
        log = %config.log_path.display(),
        "starting power monitor"
    );

    // Create and run the app
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let mut app = App::new(Duration::from_millis(100), config).await?;
        app.run().await
    })
}
