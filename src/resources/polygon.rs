//! Polygon meshes as scene-graph formats describe them: shared control
//! points, polygons indexing into them, and a UV layer whose values are
//! attached either to control points or to polygon corners.

use crate::{
    ecs::mesh_component::{MeshComponent, SimpleVertex},
    error::ModelError,
};

/// What a UV layer's entries are attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingMode {
    ByControlPoint,
    ByPolygonVertex,
}

/// How a UV layer's entries are looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceMode {
    Direct,
    IndexToDirect,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UvElement {
    pub mapping: MappingMode,
    pub reference: ReferenceMode,
    pub direct: Vec<[f32; 2]>,
    /// Only read for [`ReferenceMode::IndexToDirect`].
    pub index: Vec<u32>,
}

impl UvElement {
    fn lookup(&self, i: usize) -> Option<[f32; 2]> {
        let direct = match self.reference {
            ReferenceMode::Direct => i,
            ReferenceMode::IndexToDirect => *self.index.get(i)? as usize,
        };
        self.direct.get(direct).copied()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PolygonMesh {
    pub name: String,
    pub control_points: Vec<[f32; 3]>,
    pub polygons: Vec<Vec<u32>>,
    pub uv: Option<UvElement>,
}

impl PolygonMesh {
    fn malformed(&self, reason: String) -> ModelError {
        ModelError::MalformedGeometry {
            mesh: self.name.clone(),
            reason,
        }
    }

    /// Converts to one vertex per control point. UVs attached to polygon
    /// corners are written to the corner's control point, so the last corner
    /// wins when corners disagree. Polygons are fan-triangulated.
    pub fn to_mesh_component(&self) -> Result<MeshComponent, ModelError> {
        let mut vertices: Vec<SimpleVertex> = self
            .control_points
            .iter()
            .map(|&pos| SimpleVertex::new(pos, [0.0, 0.0]))
            .collect();

        if let Some(uv) = &self.uv {
            match uv.mapping {
                MappingMode::ByControlPoint => {
                    for (cp, vertex) in vertices.iter_mut().enumerate() {
                        vertex.tex = uv
                            .lookup(cp)
                            .ok_or_else(|| self.malformed(format!("no UV for control point {cp}")))?;
                    }
                }
                MappingMode::ByPolygonVertex => {
                    let mut counter = 0;
                    for polygon in &self.polygons {
                        for &cp in polygon {
                            let tex = uv.lookup(counter).ok_or_else(|| {
                                self.malformed(format!("no UV for polygon vertex {counter}"))
                            })?;
                            if let Some(vertex) = vertices.get_mut(cp as usize) {
                                vertex.tex = tex;
                            }
                            counter += 1;
                        }
                    }
                }
            }
        }

        let mut indices = Vec::with_capacity(self.polygons.len() * 3);
        for (p, polygon) in self.polygons.iter().enumerate() {
            if polygon.len() < 3 {
                return Err(self.malformed(format!(
                    "polygon {p} has {} vertices",
                    polygon.len()
                )));
            }
            if let Some(&cp) = polygon.iter().find(|&&cp| cp as usize >= vertices.len()) {
                return Err(self.malformed(format!(
                    "polygon {p} references control point {cp} of {}",
                    vertices.len()
                )));
            }
            for k in 1..polygon.len() - 1 {
                indices.extend_from_slice(&[polygon[0], polygon[k], polygon[k + 1]]);
            }
        }

        Ok(MeshComponent::new(self.name.clone(), vertices, indices))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad(uv: Option<UvElement>) -> PolygonMesh {
        PolygonMesh {
            name: "quad".into(),
            control_points: vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 1.0, 0.0],
            ],
            polygons: vec![vec![0, 1, 2, 3]],
            uv,
        }
    }

    #[test]
    fn quads_are_fanned() {
        let mesh = quad(None).to_mesh_component().unwrap();
        assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(mesh.num_vertex(), 4);
    }

    #[test]
    fn index_to_direct_by_control_point() {
        let uv = UvElement {
            mapping: MappingMode::ByControlPoint,
            reference: ReferenceMode::IndexToDirect,
            direct: vec![[0.0, 0.0], [1.0, 1.0]],
            index: vec![1, 0, 1, 0],
        };
        let mesh = quad(Some(uv)).to_mesh_component().unwrap();
        let tex: Vec<_> = mesh.vertices.iter().map(|v| v.tex).collect();
        assert_eq!(tex, vec![[1.0, 1.0], [0.0, 0.0], [1.0, 1.0], [0.0, 0.0]]);
    }

    #[test]
    fn by_polygon_vertex_uses_a_running_counter() {
        let mut mesh = quad(Some(UvElement {
            mapping: MappingMode::ByPolygonVertex,
            reference: ReferenceMode::Direct,
            direct: vec![[0.1, 0.1], [0.2, 0.2], [0.3, 0.3], [0.4, 0.4], [0.5, 0.5], [0.6, 0.6]],
            index: vec![],
        }));
        mesh.polygons = vec![vec![0, 1, 2], vec![0, 2, 3]];
        let mesh = mesh.to_mesh_component().unwrap();
        // Control point 0 and 2 are shared; the second triangle wins.
        assert_eq!(mesh.vertices[0].tex, [0.4, 0.4]);
        assert_eq!(mesh.vertices[1].tex, [0.2, 0.2]);
        assert_eq!(mesh.vertices[2].tex, [0.5, 0.5]);
        assert_eq!(mesh.vertices[3].tex, [0.6, 0.6]);
    }

    #[test]
    fn out_of_range_control_points_are_rejected() {
        let mut mesh = quad(None);
        mesh.polygons = vec![vec![0, 1, 7]];
        assert!(matches!(
            mesh.to_mesh_component(),
            Err(ModelError::MalformedGeometry { .. })
        ));
    }
}
