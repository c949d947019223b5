use std::path::Path;

use crate::{KeyModifier, SelectionModifier, SelectionType, BRUSH_RADIUS_DEFAULT};

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Cannot read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid settings: {0}")]
    Json(#[from] serde_json::Error),
}

/// Initial values of a [`crate::PixelSelectionTool`]
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
#[non_exhaustive]
pub struct SelectionSettings {
    pub enabled: bool,
    pub selection_type: SelectionType,
    pub modifier: SelectionModifier,
    /// Clamped into the valid range when applied
    pub brush_radius: f32,
    pub notify_during_selection: bool,
    pub main_color: [u8; 3],
    pub fixed_brush_radius_modifier: Option<KeyModifier>,
}

impl Default for SelectionSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            selection_type: SelectionType::default(),
            modifier: SelectionModifier::default(),
            brush_radius: BRUSH_RADIUS_DEFAULT,
            notify_during_selection: true,
            main_color: [0, 0, 0],
            fixed_brush_radius_modifier: None,
        }
    }
}

impl SelectionSettings {
    pub fn from_json_str(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let bytes = std::fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub fn to_json_string(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
