use futures::executor::block_on;
use kamogawa::{
    config::DEFAULT_ASSET_ROOT,
    error::ModelError,
    resources::{ModelLoader, polygon::{MappingMode, PolygonMesh, ReferenceMode, UvElement}},
};

fn loader() -> ModelLoader {
    ModelLoader::new(DEFAULT_ASSET_ROOT)
}

fn fixtures() -> ModelLoader {
    ModelLoader::new(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures"))
}

fn names(model: &kamogawa::resources::LoadedModel) -> (Vec<&str>, Vec<Option<&str>>) {
    (
        model.meshes.iter().map(|m| m.name.as_str()).collect(),
        model.texture_names.iter().map(Option::as_deref).collect(),
    )
}

#[test]
fn obj_models_flip_v_and_collect_diffuse_maps() {
    let model = block_on(loader().load_model("Models/cube.obj")).unwrap();
    assert_eq!(model.meshes.len(), 1);
    let mesh = &model.meshes[0];
    assert_eq!(mesh.name, "Cube");
    assert_eq!(mesh.num_index(), 36);
    assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.num_vertex()));
    // The file stores bottom-left UVs; after the flip they are top-left.
    assert!(mesh.vertices.iter().all(|v| v.tex[1] == 0.0 || v.tex[1] == 1.0));
    // (-0.5, 0.5, -0.5) is the top left corner of the -z face.
    assert!(
        mesh.vertices
            .iter()
            .any(|v| v.pos == [-0.5, 0.5, -0.5] && v.tex == [0.0, 0.0])
    );
    assert_eq!(model.texture_names, vec![Some("../Textures/checker.png".to_string())]);
}

#[test]
fn glb_models_keep_their_uvs() {
    let model = block_on(loader().load_model("Models/crate.glb")).unwrap();
    assert_eq!(model.meshes.len(), 1);
    let mesh = &model.meshes[0];
    assert_eq!(mesh.name, "Crate");
    assert_eq!(mesh.num_vertex(), 24);
    assert_eq!(mesh.num_index(), 36);
    assert_eq!(mesh.vertices[0].tex, [0.0, 1.0]);
    assert_eq!(mesh.vertices[1].tex, [0.0, 0.0]);
    assert_eq!(model.texture_names, vec![Some("../Textures/crate.png".to_string())]);
}

#[test]
fn gltf_children_and_external_buffers_are_loaded() {
    let model = block_on(loader().load_model("Models/banner.gltf")).unwrap();
    assert_eq!(model.meshes.len(), 1);
    assert_eq!(model.meshes[0].name, "Banner");
    assert_eq!(model.meshes[0].indices, vec![0, 1, 2, 0, 2, 3]);
}

#[test]
fn obj_textures_follow_the_mesh_order() {
    let model = block_on(fixtures().load_model("two_materials.obj")).unwrap();
    let (meshes, textures) = names(&model);
    assert_eq!(meshes, vec!["A", "B", "C"]);
    assert_eq!(textures, vec![Some("second.png"), Some("first.png"), None]);
}

#[test]
fn gltf_textures_follow_the_mesh_order() {
    let model = block_on(fixtures().load_model("two_materials.gltf")).unwrap();
    let (meshes, textures) = names(&model);
    // Node A is also in the second scene; only the default scene is read.
    assert_eq!(meshes, vec!["A", "B", "C"]);
    assert_eq!(textures, vec![Some("second.png"), Some("first.png"), None]);
}

#[test]
fn fbx_and_unknown_formats_are_unsupported() {
    for file in ["Models/invincible.fbx", "Models/scene.blend", "Models/noext"] {
        let err = block_on(loader().load_model(file)).unwrap_err();
        assert!(matches!(err, ModelError::UnsupportedFormat(_)), "{file}: {err:?}");
    }
}

#[test]
fn missing_files_report_the_path() {
    let err = block_on(loader().load_model("Models/missing.obj")).unwrap_err();
    match err {
        ModelError::Io { path, .. } => assert!(path.ends_with("Models/missing.obj")),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn polygon_vertex_uvs_by_index() {
    let mesh = PolygonMesh {
        name: "pentagon".into(),
        control_points: vec![[0.0; 3]; 5],
        polygons: vec![vec![0, 1, 2, 3, 4]],
        uv: Some(UvElement {
            mapping: MappingMode::ByPolygonVertex,
            reference: ReferenceMode::IndexToDirect,
            direct: vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]],
            index: vec![2, 1, 0, 1, 2],
        }),
    }
    .to_mesh_component()
    .unwrap();
    assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3, 0, 3, 4]);
    let tex: Vec<_> = mesh.vertices.iter().map(|v| v.tex).collect();
    assert_eq!(tex, vec![[1.0, 1.0], [1.0, 0.0], [0.0, 0.0], [1.0, 0.0], [1.0, 1.0]]);
}

#[test]
fn uv_layers_that_run_short_are_malformed() {
    let result = PolygonMesh {
        name: "short".into(),
        control_points: vec![[0.0; 3]; 3],
        polygons: vec![vec![0, 1, 2]],
        uv: Some(UvElement {
            mapping: MappingMode::ByControlPoint,
            reference: ReferenceMode::Direct,
            direct: vec![[0.0, 0.0]],
            index: Vec::new(),
        }),
    }
    .to_mesh_component();
    assert!(matches!(result, Err(ModelError::MalformedGeometry { .. })));
}
