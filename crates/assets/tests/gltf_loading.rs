//! Loads small hand-written glTF files from a scratch directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use gallery_assets::{load_model, AssetError};

fn scratch_dir(tag: &str) -> PathBuf {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("gallery_gltf_{tag}_{timestamp}"));
    fs::create_dir_all(&dir).expect("scratch dir create");
    dir
}

/// One triangle in the XY plane: positions, then u16 indices, padded to 4 bytes.
fn triangle_buffer() -> Vec<u8> {
    let mut bytes = Vec::new();
    for v in [[0.0f32, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]] {
        for c in v {
            bytes.extend_from_slice(&c.to_le_bytes());
        }
    }
    for i in [0u16, 1, 2] {
        bytes.extend_from_slice(&i.to_le_bytes());
    }
    bytes.extend_from_slice(&[0, 0]);
    bytes
}

fn write_triangle_model(dir: &Path, image_block: &str) -> PathBuf {
    fs::write(dir.join("tri.bin"), triangle_buffer()).expect("write buffer");
    let json = format!(
        r#"{{
  "asset": {{ "version": "2.0" }},
  "scene": 0,
  "scenes": [{{ "nodes": [0] }}],
  "nodes": [{{ "mesh": 0, "translation": [1.0, 0.0, 0.0] }}],
  "meshes": [{{ "primitives": [{{ "attributes": {{ "POSITION": 0 }}, "indices": 1, "material": 0 }}] }}],
  {image_block}
  "buffers": [{{ "uri": "tri.bin", "byteLength": 44 }}],
  "bufferViews": [
    {{ "buffer": 0, "byteOffset": 0, "byteLength": 36, "target": 34962 }},
    {{ "buffer": 0, "byteOffset": 36, "byteLength": 6, "target": 34963 }}
  ],
  "accessors": [
    {{ "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3", "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] }},
    {{ "bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR" }}
  ]
}}"#
    );
    let path = dir.join("tri.gltf");
    fs::write(&path, json).expect("write gltf");
    path
}

const TEXTURED_MATERIAL: &str = r#""materials": [{ "pbrMetallicRoughness": { "baseColorFactor": [1.0, 0.0, 0.0, 1.0], "baseColorTexture": { "index": 0 } } }],
  "textures": [{ "source": 0 }],
  "images": [{ "uri": "label.png" }],"#;

#[test]
fn triangle_loads_with_baked_transform_and_normals() {
    let dir = scratch_dir("tri");
    let path = write_triangle_model(&dir, TEXTURED_MATERIAL);
    image::RgbaImage::new(4, 4)
        .save(dir.join("label.png"))
        .expect("write png");

    let mesh = load_model(&path).expect("triangle loads");

    assert_eq!(mesh.vertices.len(), 3);
    assert_eq!(mesh.indices, vec![0, 1, 2]);
    assert_eq!(mesh.submeshes.len(), 1);
    assert_eq!(mesh.submeshes[0].index_count, 3);

    // Node translation is baked in.
    assert_eq!(mesh.vertices[1].position, [2.0, 0.0, 0.0]);
    // Missing normals are generated from the winding.
    for vertex in &mesh.vertices {
        assert!((vertex.normal[2] - 1.0).abs() < 1e-5);
    }

    let material = &mesh.materials[mesh.submeshes[0].material];
    assert_eq!(material.base_color, [1.0, 0.0, 0.0, 1.0]);
    let texture = material.texture.as_ref().expect("texture decoded");
    assert_eq!((texture.width, texture.height), (4, 4));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn missing_texture_leaves_material_untextured() {
    let dir = scratch_dir("notex");
    let path = write_triangle_model(&dir, TEXTURED_MATERIAL);

    let mesh = load_model(&path).expect("geometry still loads");

    let material = &mesh.materials[mesh.submeshes[0].material];
    assert!(material.texture.is_none());
    assert_eq!(material.base_color, [1.0, 0.0, 0.0, 1.0]);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn missing_model_is_an_error() {
    let dir = scratch_dir("missing");
    let err = load_model(&dir.join("absent.glb")).unwrap_err();
    assert!(matches!(err, AssetError::Gltf { .. }));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn missing_buffer_is_an_error() {
    let dir = scratch_dir("nobuf");
    let path = write_triangle_model(&dir, TEXTURED_MATERIAL);
    fs::remove_file(dir.join("tri.bin")).expect("remove buffer");

    assert!(load_model(&path).is_err());

    let _ = fs::remove_dir_all(&dir);
}
