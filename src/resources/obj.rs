//! Wavefront OBJ models through `tobj`.

use std::{
    io::{BufReader, Cursor},
    path::PathBuf,
};

use crate::{
    ecs::mesh_component::{MeshComponent, SimpleVertex},
    error::ModelError,
    resources::LoadedModel,
};

/// Parses an OBJ file. Material libraries are read from `mtl_dir`; a
/// missing library only loses the texture names.
pub async fn load_obj(file_name: &str, obj_text: String, mtl_dir: PathBuf) -> Result<LoadedModel, ModelError> {
    let mut obj_reader = BufReader::new(Cursor::new(obj_text));
    let (models, obj_materials) = tobj::load_obj_buf_async(
        &mut obj_reader,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
        |p| {
            let path = mtl_dir.join(&p);
            async move {
                match std::fs::read_to_string(&path) {
                    Ok(mat_text) => tobj::load_mtl_buf(&mut BufReader::new(Cursor::new(mat_text))),
                    Err(err) => {
                        log::warn!("Material library {path:?} not readable: {err}");
                        Err(tobj::LoadError::OpenFileFailed)
                    }
                }
            }
        },
    )
    .await?;

    let materials = obj_materials.unwrap_or_else(|err| {
        log::warn!("{file_name}: no materials loaded ({err})");
        Vec::new()
    });
    for material in materials.iter().filter(|m| m.diffuse_texture.is_none()) {
        log::warn!("Material {} of {file_name} references no texture", material.name);
    }

    let mut meshes = Vec::with_capacity(models.len());
    let mut texture_names = Vec::with_capacity(models.len());
    for model in models {
        texture_names.push(
            model
                .mesh
                .material_id
                .and_then(|id| materials.get(id))
                .and_then(|m| m.diffuse_texture.clone()),
        );
        meshes.push(to_mesh_component(model.name, &model.mesh)?);
    }

    Ok(LoadedModel {
        meshes,
        texture_names,
    })
}

fn to_mesh_component(name: String, mesh: &tobj::Mesh) -> Result<MeshComponent, ModelError> {
    if mesh.positions.len() % 3 != 0 {
        return Err(ModelError::MalformedGeometry {
            mesh: name,
            reason: format!("{} position floats", mesh.positions.len()),
        });
    }
    let vertices: Vec<SimpleVertex> = (0..mesh.positions.len() / 3)
        .map(|i| SimpleVertex {
            pos: [
                mesh.positions[i * 3],
                mesh.positions[i * 3 + 1],
                mesh.positions[i * 3 + 2],
            ],
            tex: [
                mesh.texcoords.get(i * 2).map_or(0.0, |f| *f),
                1.0 - mesh.texcoords.get(i * 2 + 1).map_or(0.0, |f| *f),
            ],
        })
        .collect();
    if let Some(&index) = mesh.indices.iter().find(|&&i| i as usize >= vertices.len()) {
        return Err(ModelError::MalformedGeometry {
            mesh: name,
            reason: format!("index {index} of {} vertices", vertices.len()),
        });
    }
    Ok(MeshComponent::new(name, vertices, mesh.indices.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIANGLE: &str = "o tri\nv 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nvt 1 0\nvt 0 0.25\nf 1/1 2/2 3/3\n";

    #[test]
    fn v_is_flipped() {
        let model = futures::executor::block_on(load_obj(
            "tri.obj",
            TRIANGLE.to_string(),
            PathBuf::from("."),
        ))
        .unwrap();
        assert_eq!(model.meshes.len(), 1);
        let mesh = &model.meshes[0];
        assert_eq!(mesh.name, "tri");
        assert_eq!(mesh.num_index(), 3);
        let tex: Vec<_> = mesh.vertices.iter().map(|v| v.tex).collect();
        assert!(tex.contains(&[0.0, 0.75]), "{tex:?}");
        assert!(tex.contains(&[1.0, 1.0]), "{tex:?}");
        assert_eq!(model.texture_names, vec![None]);
    }
}
