//! Loading of models and raw asset files.
//!
//! Every path handed to the loader is relative to its asset root.

use std::path::{Path, PathBuf};

use crate::{ecs::mesh_component::MeshComponent, error::ModelError};

pub mod obj;
pub mod polygon;
pub mod scene;

/// Geometry and material texture names of one model file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LoadedModel {
    pub meshes: Vec<MeshComponent>,
    /// Diffuse / base color texture of each mesh, index-aligned with
    /// `meshes`. `None` where the mesh's material has no texture.
    pub texture_names: Vec<Option<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFormat {
    Obj,
    Gltf,
}

impl ModelFormat {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "obj" => Ok(Self::Obj),
            "gltf" | "glb" => Ok(Self::Gltf),
            _ => Err(ModelError::UnsupportedFormat(ext)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ModelLoader {
    asset_root: PathBuf,
}

impl ModelLoader {
    pub fn new(asset_root: impl Into<PathBuf>) -> Self {
        Self {
            asset_root: asset_root.into(),
        }
    }

    pub fn resolve(&self, file_name: impl AsRef<Path>) -> PathBuf {
        self.asset_root.join(file_name)
    }

    pub async fn load_binary(&self, file_name: impl AsRef<Path>) -> Result<Vec<u8>, ModelError> {
        let path = self.resolve(file_name);
        std::fs::read(&path).map_err(|source| ModelError::Io { path, source })
    }

    pub async fn load_string(&self, file_name: impl AsRef<Path>) -> Result<String, ModelError> {
        let path = self.resolve(file_name);
        std::fs::read_to_string(&path).map_err(|source| ModelError::Io { path, source })
    }

    /// Loads every mesh of a model file. The format follows the extension.
    pub async fn load_model(&self, file_name: &str) -> Result<LoadedModel, ModelError> {
        let format = ModelFormat::from_path(file_name).inspect_err(|err| {
            log::error!("ModelLoader: {file_name}: {err}");
        })?;
        let dir = Path::new(file_name)
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let model = match format {
            ModelFormat::Obj => {
                let obj_text = self.load_string(file_name).await?;
                obj::load_obj(file_name, obj_text, self.resolve(&dir)).await?
            }
            ModelFormat::Gltf => {
                let bytes = self.load_binary(file_name).await?;
                scene::load_scene(file_name, &bytes, |uri| {
                    let path = dir.join(uri);
                    async move { self.load_binary(path).await }
                })
                .await?
            }
        };
        log::info!(
            "ModelLoader: {file_name}: {} meshes, {} textures",
            model.meshes.len(),
            model.texture_names.iter().flatten().count()
        );
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_follow_the_extension() {
        assert_eq!(ModelFormat::from_path("a/b.OBJ").unwrap(), ModelFormat::Obj);
        assert_eq!(ModelFormat::from_path("b.glb").unwrap(), ModelFormat::Gltf);
        assert!(matches!(
            ModelFormat::from_path("invincible.fbx"),
            Err(ModelError::UnsupportedFormat(ext)) if ext == "fbx"
        ));
        assert!(ModelFormat::from_path("noext").is_err());
    }
}
