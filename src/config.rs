use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fs, path::Path, path::PathBuf};
use tracing::warn;

use gallery_core::{SceneSettings, SHADOW_FAR_PLANE};

pub const DEFAULT_CONFIG_PATH: &str = "config/gallery.toml";

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct GalleryConfig {
    /// Degrees of yaw/pitch per pixel of mouse movement.
    pub mouse_sensitivity: f32,
    pub invert_y: bool,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    /// Walking speed in units per second.
    pub move_speed: f32,
    pub window_width: u32,
    pub window_height: u32,
    pub vsync: bool,
    /// Edge length of each shadow cube face in texels.
    pub shadow_resolution: u32,
    /// Distance at which shadow depth saturates.
    pub shadow_far_plane: f32,
    /// Directory model paths are resolved against.
    pub asset_root: PathBuf,
    /// Action name -> key names, replacing the default keys for that action.
    pub bindings: HashMap<String, Vec<String>>,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        let scene = SceneSettings::default();
        Self {
            mouse_sensitivity: scene.mouse_sensitivity,
            invert_y: scene.invert_y,
            fov_degrees: 50.0,
            move_speed: scene.move_speed,
            window_width: 800,
            window_height: 600,
            vsync: true,
            shadow_resolution: 1024,
            shadow_far_plane: SHADOW_FAR_PLANE,
            asset_root: PathBuf::from("assets"),
            bindings: HashMap::new(),
        }
    }
}

impl GalleryConfig {
    /// Load configuration from an explicit path, falling back to defaults on errors.
    pub fn load_from_path(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<GalleryConfig>(&contents) {
                Ok(cfg) => cfg,
                Err(err) => {
                    warn!("Failed to parse {}: {err}. Using defaults", path.display());
                    GalleryConfig::default()
                }
            },
            Err(err) => {
                if err.kind() == std::io::ErrorKind::NotFound {
                    warn!("Config not found at {}. Using defaults", path.display());
                } else {
                    warn!("Failed to read {}: {err}. Using defaults", path.display());
                }
                GalleryConfig::default()
            }
        }
    }

    /// Save configuration to an explicit path.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let toml = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        Ok(())
    }

    /// Scene tuning derived from this config.
    pub fn scene_settings(&self) -> SceneSettings {
        SceneSettings {
            mouse_sensitivity: self.mouse_sensitivity,
            invert_y: self.invert_y,
            move_speed: self.move_speed,
            ..SceneSettings::default()
        }
    }
}
