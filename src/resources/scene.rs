//! Scene-graph models (glTF and GLB) through the `gltf` crate.

use std::future::Future;

use crate::{
    error::ModelError,
    resources::{
        LoadedModel,
        polygon::{MappingMode, PolygonMesh, ReferenceMode, UvElement},
    },
};

/// Parses a glTF document. External buffers are fetched through
/// `load_buffer`, relative URIs as written in the file.
pub async fn load_scene<F, Fut>(file_name: &str, bytes: &[u8], load_buffer: F) -> Result<LoadedModel, ModelError>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<Vec<u8>, ModelError>>,
{
    let gltf = gltf::Gltf::from_slice(bytes)?;

    let mut buffer_data = Vec::new();
    for buffer in gltf.buffers() {
        match buffer.source() {
            gltf::buffer::Source::Bin => match gltf.blob.as_deref() {
                Some(blob) => buffer_data.push(blob.to_vec()),
                None => {
                    return Err(ModelError::MalformedGeometry {
                        mesh: file_name.to_string(),
                        reason: "binary buffer without a GLB chunk".into(),
                    });
                }
            },
            gltf::buffer::Source::Uri(uri) if uri.starts_with("data:") => {
                return Err(ModelError::UnsupportedFormat(format!("{file_name}: data URI buffers")));
            }
            gltf::buffer::Source::Uri(uri) => buffer_data.push(load_buffer(uri.to_string()).await?),
        }
    }

    let mut polygons = Vec::new();
    match gltf.default_scene().or_else(|| gltf.scenes().next()) {
        Some(scene) => {
            for node in scene.nodes() {
                visit(node, &buffer_data, &mut polygons);
            }
        }
        None => log::warn!("{file_name} has no scene"),
    }

    let mut meshes = Vec::with_capacity(polygons.len());
    let mut texture_names = Vec::with_capacity(polygons.len());
    for (polygon, texture) in &polygons {
        meshes.push(polygon.to_mesh_component()?);
        texture_names.push(texture.clone());
    }
    log::info!("{file_name}: {} meshes", meshes.len());

    Ok(LoadedModel {
        meshes,
        texture_names,
    })
}

/// Name of the material's base color image: its URI, or for embedded
/// images its name.
fn base_color_texture(material: &gltf::Material) -> Option<String> {
    let Some(info) = material.pbr_metallic_roughness().base_color_texture() else {
        if material.index().is_some() {
            log::warn!("Material {:?} has no base color texture", material.name());
        }
        return None;
    };
    let image = info.texture().source();
    Some(match image.source() {
        gltf::image::Source::Uri { uri, .. } => uri.to_string(),
        gltf::image::Source::View { .. } => image
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("image {}", image.index())),
    })
}

/// Depth first, parents before children. Node transforms are not applied.
/// Every triangle primitive yields a polygon mesh and its texture name.
fn visit(node: gltf::Node, buffer_data: &[Vec<u8>], out: &mut Vec<(PolygonMesh, Option<String>)>) {
    if let Some(mesh) = node.mesh() {
        let base_name = mesh
            .name()
            .or(node.name())
            .map(str::to_string)
            .unwrap_or_else(|| format!("mesh {}", mesh.index()));
        let primitive_count = mesh.primitives().count();
        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                log::warn!("{base_name}: skipping {:?} primitive", primitive.mode());
                continue;
            }
            let reader = primitive.reader(|buffer| buffer_data.get(buffer.index()).map(Vec::as_slice));
            let control_points: Vec<[f32; 3]> = match reader.read_positions() {
                Some(positions) => positions.collect(),
                None => continue,
            };
            let corners: Vec<u32> = match reader.read_indices() {
                Some(indices) => indices.into_u32().collect(),
                None => (0..control_points.len() as u32).collect(),
            };
            let uv = reader.read_tex_coords(0).map(|t| UvElement {
                mapping: MappingMode::ByControlPoint,
                reference: ReferenceMode::Direct,
                direct: t.into_f32().collect(),
                index: Vec::new(),
            });
            let name = if primitive_count > 1 {
                format!("{base_name}#{}", primitive.index())
            } else {
                base_name.clone()
            };
            let mesh = PolygonMesh {
                name,
                control_points,
                polygons: corners.chunks(3).map(<[u32]>::to_vec).collect(),
                uv,
            };
            out.push((mesh, base_color_texture(&primitive.material())));
        }
    }
    for child in node.children() {
        visit(child, buffer_data, out);
    }
}
