mod backend_bridge;
mod controller;
mod ui;

use std::path::PathBuf;

use clap::Parser;
use client_core::{config::DEFAULT_CONFIG_FILE, load_settings_from};
use crossbeam_channel::bounded;
use eframe::egui;
use tracing_subscriber::EnvFilter;

use crate::backend_bridge::{commands::BackendCommand, runtime};
use crate::controller::events::UiEvent;
use crate::ui::app::{PersistedGuiState, SETTINGS_STORAGE_KEY};
use crate::ui::DesktopGuiApp;

#[derive(Parser, Debug)]
#[command(name = "exoscope-gui", about = "Exoplanet signal triage desktop client")]
struct Args {
    /// Overrides the configured classification service URL.
    #[arg(long)]
    backend_url: Option<String>,
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
    let args = Args::parse();

    let mut settings = load_settings_from(&args.config);
    if let Some(url) = args.backend_url {
        settings.backend_url = url;
    }

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);
    runtime::launch(cmd_rx, ui_tx, settings.clone());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Exoscope")
            .with_inner_size([1180.0, 760.0])
            .with_min_inner_size([860.0, 560.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Exoscope",
        options,
        Box::new(|cc| {
            let persisted = cc.storage.and_then(|storage| {
                storage
                    .get_string(SETTINGS_STORAGE_KEY)
                    .and_then(|text| serde_json::from_str::<PersistedGuiState>(&text).ok())
            });
            Ok(Box::new(DesktopGuiApp::new(
                cmd_tx, ui_rx, settings, persisted,
            )))
        }),
    )
    .map_err(|err| anyhow::anyhow!("desktop client exited with an error: {err}"))
}
