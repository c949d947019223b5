use std::io;

use eframe::egui;
use log::info;
use pixel_selection::{SelectionSettings, SettingsError};

mod demo;

const DEFAULT_SETTINGS_PATH: &str = "selection.json";

fn main() -> Result<(), eframe::Error> {
    env_logger::init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_SETTINGS_PATH.into());
    let settings = match SelectionSettings::from_json_file(&path) {
        Ok(s) => s,
        Err(SettingsError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
            SelectionSettings::default()
        }
        Err(e) => Err(eframe::Error::AppCreation(Box::new(e)))?,
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([800.0, 800.0]),
        ..Default::default()
    };

    info!("Run with settings: {settings:?}");
    eframe::run_native(
        "Pixel selection",
        options,
        Box::new(|_cc| Ok(Box::new(demo::SelectionDemo::new(settings)))),
    )
}
