//! Engine configuration, read from a TOML file. Every section is optional.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Asset directory of the source tree.
pub const DEFAULT_ASSET_ROOT: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/assets");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Kamogawa Engine".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    /// Point the camera initially looks at.
    pub target: [f32; 3],
    /// Units per second.
    pub speed: f32,
    /// Radians per pixel of mouse movement.
    pub sensitivity: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 2.0, -5.0],
            target: [0.0, 2.0, 0.0],
            speed: 2.0,
            sensitivity: 0.005,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActorConfig {
    pub name: String,
    /// Model file, relative to the asset root.
    pub model: String,
    /// One texture per mesh, relative to the asset root. The default
    /// texture is appended after these.
    pub textures: Vec<String>,
    pub position: [f32; 3],
    /// Radians: pitch, yaw, roll.
    pub rotation: [f32; 3],
    pub scale: [f32; 3],
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            name: "Actor".to_string(),
            model: String::new(),
            textures: Vec::new(),
            position: [0.0; 3],
            rotation: [0.0; 3],
            scale: [1.0; 3],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub window: WindowConfig,
    pub clear_color: [f32; 4],
    pub asset_root: PathBuf,
    /// Shader source, relative to the asset root.
    pub shader: String,
    /// Texture appended to every actor's texture list.
    pub default_texture: String,
    pub camera: CameraConfig,
    pub actors: Vec<ActorConfig>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        use std::f32::consts::FRAC_PI_2;
        Self {
            window: WindowConfig::default(),
            clear_color: [0.0, 0.125, 0.3, 1.0],
            asset_root: PathBuf::from(DEFAULT_ASSET_ROOT),
            shader: "shaders/engine.wgsl".to_string(),
            default_texture: "Textures/default.png".to_string(),
            camera: CameraConfig::default(),
            actors: vec![
                ActorConfig {
                    name: "Crate".to_string(),
                    model: "Models/crate.glb".to_string(),
                    textures: vec!["Textures/crate.png".to_string()],
                    position: [0.7, 1.0, -0.4],
                    rotation: [-FRAC_PI_2, 1.0, FRAC_PI_2],
                    ..Default::default()
                },
                ActorConfig {
                    name: "Banner".to_string(),
                    model: "Models/banner.gltf".to_string(),
                    textures: vec!["Textures/banner.png".to_string()],
                    position: [2.0, 1.0, 1.0],
                    rotation: [-FRAC_PI_2, 0.0, FRAC_PI_2],
                    ..Default::default()
                },
                ActorConfig {
                    name: "Cube".to_string(),
                    model: "Models/cube.obj".to_string(),
                    textures: vec!["Textures/checker.png".to_string()],
                    position: [-3.2, -1.2, 10.0],
                    rotation: [3.1, 6.3, 3.15],
                    ..Default::default()
                },
            ],
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(text: &str) -> anyhow::Result<Self> {
        toml::from_str(text).context("invalid engine configuration")
    }

    /// Reads a configuration file. A relative `asset_root` is taken relative
    /// to the file's directory.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read configuration {}", path.display()))?;
        let mut config = Self::from_toml_str(&text)
            .with_context(|| format!("in {}", path.display()))?;
        if config.asset_root.is_relative() {
            if let Some(dir) = path.parent() {
                config.asset_root = dir.join(&config.asset_root);
            }
        }
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let config = EngineConfig::from_toml_str("[window]\nwidth = 640\n").unwrap();
        assert_eq!(config.window.width, 640);
        assert_eq!(config.window.height, 720);
        assert_eq!(config.clear_color, [0.0, 0.125, 0.3, 1.0]);
        assert_eq!(config.actors.len(), 3);
        assert_eq!(config.camera.target, [0.0, 2.0, 0.0]);
    }

    #[test]
    fn actors_default_to_unit_scale() {
        let config = EngineConfig::from_toml_str(
            "[[actors]]\nname = \"Box\"\nmodel = \"Models/cube.obj\"\n",
        )
        .unwrap();
        assert_eq!(config.actors.len(), 1);
        assert_eq!(config.actors[0].scale, [1.0; 3]);
        assert!(config.actors[0].textures.is_empty());
    }

    #[test]
    fn unknown_types_are_rejected() {
        assert!(EngineConfig::from_toml_str("clear_color = \"blue\"").is_err());
    }
}
