use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::SettingsError;
use crate::gesture::GestureConfig;
use crate::graph::PhysicsParams;
use crate::viewport::ZoomRange;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineSettings {
    pub canvas_zoom: ZoomRange,
    pub graph_zoom: ZoomRange,
    /// Factor applied by a single zoom-in/zoom-out step.
    pub zoom_step: f32,
    pub gesture: GestureConfig,
    pub physics: PhysicsParams,
    /// Directory the viewer's file store keeps state payloads in.
    pub state_dir: String,
    pub canvas_id: u64,
    pub graph_id: u64,
    pub graph_name: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            canvas_zoom: ZoomRange::CANVAS,
            graph_zoom: ZoomRange::GRAPH,
            zoom_step: 1.2,
            gesture: GestureConfig::default(),
            physics: PhysicsParams::default(),
            state_dir: "noteboard-state".to_string(),
            canvas_id: 1,
            graph_id: 1,
            graph_name: "graph".to_string(),
        }
    }
}

/// `$HOME/.config/noteboard.toml` if present, else `./noteboard.toml` if present.
pub fn config_path() -> Option<PathBuf> {
    if let Some(home) = std::env::var_os("HOME") {
        let path = PathBuf::from(home).join(".config").join("noteboard.toml");
        if path.exists() {
            return Some(path);
        }
    }
    let local = PathBuf::from("noteboard.toml");
    local.exists().then_some(local)
}

fn is_toml(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "toml")
}

/// Reads settings in the format suggested by the extension, falling back to the other one.
pub fn load_settings(path: &Path) -> Result<EngineSettings, SettingsError> {
    let s = std::fs::read_to_string(path)?;
    if is_toml(path) {
        match toml::from_str::<EngineSettings>(&s) {
            Ok(settings) => Ok(settings),
            Err(err) => serde_json::from_str(&s).map_err(|_| SettingsError::TomlDecode(err)),
        }
    } else {
        match serde_json::from_str::<EngineSettings>(&s) {
            Ok(settings) => Ok(settings),
            Err(err) => toml::from_str(&s).map_err(|_| SettingsError::Json(err)),
        }
    }
}

pub fn save_settings(path: &Path, settings: &EngineSettings) -> Result<(), SettingsError> {
    let text = if is_toml(path) {
        toml::to_string_pretty(settings)?
    } else {
        serde_json::to_string_pretty(settings)?
    };
    std::fs::write(path, text)?;
    Ok(())
}

/// Settings from [`config_path`], or defaults when there is no usable file.
pub fn load_or_default() -> EngineSettings {
    let Some(path) = config_path() else {
        return EngineSettings::default();
    };
    match load_settings(&path) {
        Ok(settings) => {
            log::info!("settings loaded from {}", path.display());
            settings
        }
        Err(err) => {
            log::warn!("ignoring settings at {}: {err}", path.display());
            EngineSettings::default()
        }
    }
}
