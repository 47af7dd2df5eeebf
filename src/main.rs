#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod compat;
mod config;
mod model_download;
mod overlay;
mod pipeline;
mod pose;
mod types;
mod ui;

use anyhow::Result;
use crossbeam_channel::bounded;
use gpui::Application;
use gpui_component;

use config::Config;
use overlay::SpriteSet;
use pipeline::DetectorBackend;

const CONFIG_PATH: &str = "mukimuki.toml";

fn main() -> Result<()> {
    env_logger::init();

    let config = Config::load_or_default(CONFIG_PATH)?;
    let compat_warning = compat::check_support();

    let sprites = SpriteSet::load(&config.assets_dir);

    let (camera_frame_tx, camera_frame_rx) = bounded(1);

    let detector_backend = DetectorBackend::new(config.model_path.clone(), config.detector.clone());

    Application::new()
        .with_assets(gpui_component_assets::Assets)
        .run(move |app| {
            gpui_component::init(app);

            if let Err(err) = ui::launch_ui(
                app,
                config,
                sprites,
                compat_warning,
                camera_frame_tx,
                camera_frame_rx,
                detector_backend,
            ) {
                eprintln!("failed to launch ui: {err:?}");
            }
        });

    Ok(())
}
