use std::path::{Path, PathBuf};

use glam::{Mat3, Mat4, Vec3};
use tracing::{debug, warn};

use crate::texture::{decode_texture, load_texture, TextureImage};
use crate::AssetError;

/// Vertex with baked node transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshVertex {
    /// Model-space position.
    pub position: [f32; 3],
    /// Model-space unit normal.
    pub normal: [f32; 3],
    /// First texture coordinate set.
    pub uv: [f32; 2],
}

/// A contiguous index range drawn with one material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Submesh {
    /// First index in [`MeshData::indices`].
    pub first_index: u32,
    /// Number of indices.
    pub index_count: u32,
    /// Index into [`MeshData::materials`].
    pub material: usize,
}

/// Surface description for a submesh.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialData {
    /// Linear RGBA base color factor.
    pub base_color: [f32; 4],
    /// Decoded base color texture, `None` when absent or unreadable.
    pub texture: Option<TextureImage>,
}

impl Default for MaterialData {
    fn default() -> Self {
        Self {
            base_color: [1.0; 4],
            texture: None,
        }
    }
}

/// CPU-side model ready for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    /// All vertices of all primitives.
    pub vertices: Vec<MeshVertex>,
    /// Triangle list indices into `vertices`.
    pub indices: Vec<u32>,
    /// Draw ranges.
    pub submeshes: Vec<Submesh>,
    /// Materials; the last entry is the default for primitives without one.
    pub materials: Vec<MaterialData>,
}

/// Load a glTF 2.0 model (`.gltf` or `.glb`).
///
/// Node transforms of the default scene are baked into the vertices. A
/// material whose texture cannot be loaded is kept untextured and a warning
/// is logged; any geometry problem is an error.
pub fn load_model(path: &Path) -> Result<MeshData, AssetError> {
    let gltf_error = |source| AssetError::Gltf {
        path: path.to_path_buf(),
        source,
    };

    let gltf::Gltf { document, blob } = gltf::Gltf::open(path).map_err(gltf_error)?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    let buffers = gltf::import_buffers(&document, Some(base), blob).map_err(gltf_error)?;

    let mut materials: Vec<MaterialData> = document
        .materials()
        .map(|material| load_material(&material, base, path, &buffers))
        .collect();
    let default_material = materials.len();
    materials.push(MaterialData::default());

    let mut mesh = MeshData {
        vertices: Vec::new(),
        indices: Vec::new(),
        submeshes: Vec::new(),
        materials,
    };

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next());
    match scene {
        Some(scene) => {
            for node in scene.nodes() {
                append_node(&node, Mat4::IDENTITY, &buffers, default_material, &mut mesh);
            }
        }
        None => {
            for gltf_mesh in document.meshes() {
                append_mesh(&gltf_mesh, Mat4::IDENTITY, &buffers, default_material, &mut mesh);
            }
        }
    }

    if mesh.indices.is_empty() {
        return Err(AssetError::NoGeometry(path.to_path_buf()));
    }

    debug!(
        path = %path.display(),
        vertices = mesh.vertices.len(),
        submeshes = mesh.submeshes.len(),
        "Loaded model"
    );
    Ok(mesh)
}

fn append_node(
    node: &gltf::Node,
    parent: Mat4,
    buffers: &[gltf::buffer::Data],
    default_material: usize,
    out: &mut MeshData,
) {
    let transform = parent * Mat4::from_cols_array_2d(&node.transform().matrix());
    if let Some(gltf_mesh) = node.mesh() {
        append_mesh(&gltf_mesh, transform, buffers, default_material, out);
    }
    for child in node.children() {
        append_node(&child, transform, buffers, default_material, out);
    }
}

fn append_mesh(
    gltf_mesh: &gltf::Mesh,
    transform: Mat4,
    buffers: &[gltf::buffer::Data],
    default_material: usize,
    out: &mut MeshData,
) {
    let normal_matrix = Mat3::from_mat4(transform).inverse().transpose();

    for primitive in gltf_mesh.primitives() {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            continue;
        }
        let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| data.0.as_slice()));

        let positions: Vec<[f32; 3]> = match reader.read_positions() {
            Some(it) => it.collect(),
            None => continue,
        };
        let normals: Option<Vec<[f32; 3]>> = reader.read_normals().map(|it| it.collect());
        let uvs: Vec<[f32; 2]> = reader
            .read_tex_coords(0)
            .map(|tc| tc.into_f32().collect())
            .unwrap_or_else(|| vec![[0.0, 0.0]; positions.len()]);
        let local_indices: Vec<u32> = match reader.read_indices() {
            Some(read) => read.into_u32().collect(),
            None => (0..positions.len() as u32).collect(),
        };

        let base_vertex = out.vertices.len() as u32;
        let first_index = out.indices.len() as u32;

        for (i, position) in positions.iter().enumerate() {
            let world = transform.transform_point3(Vec3::from_array(*position));
            let normal = normals
                .as_ref()
                .and_then(|n| n.get(i))
                .map(|n| (normal_matrix * Vec3::from_array(*n)).normalize_or_zero())
                .unwrap_or(Vec3::ZERO);
            out.vertices.push(MeshVertex {
                position: world.to_array(),
                normal: normal.to_array(),
                uv: uvs.get(i).copied().unwrap_or([0.0, 0.0]),
            });
        }

        let vertex_count = positions.len() as u32;
        out.indices.extend(
            local_indices
                .iter()
                .filter(|&&index| index < vertex_count)
                .map(|index| base_vertex + index),
        );

        if normals.is_none() {
            let start = first_index as usize;
            generate_normals(&mut out.vertices, &out.indices[start..]);
        }

        let index_count = out.indices.len() as u32 - first_index;
        if index_count == 0 {
            continue;
        }
        out.submeshes.push(Submesh {
            first_index,
            index_count,
            material: primitive.material().index().unwrap_or(default_material),
        });
    }
}

/// Area-weighted vertex normals for primitives that ship without them.
fn generate_normals(vertices: &mut [MeshVertex], indices: &[u32]) {
    for triangle in indices.chunks_exact(3) {
        let [a, b, c] = [triangle[0], triangle[1], triangle[2]].map(|i| i as usize);
        let (Some(va), Some(vb), Some(vc)) = (vertices.get(a), vertices.get(b), vertices.get(c))
        else {
            continue;
        };
        let pa = Vec3::from_array(va.position);
        let face = (Vec3::from_array(vb.position) - pa).cross(Vec3::from_array(vc.position) - pa);
        for index in [a, b, c] {
            let vertex = &mut vertices[index];
            vertex.normal = (Vec3::from_array(vertex.normal) + face).to_array();
        }
    }
    for index in indices {
        if let Some(vertex) = vertices.get_mut(*index as usize) {
            vertex.normal = Vec3::from_array(vertex.normal).normalize_or_zero().to_array();
        }
    }
}

fn load_material(
    material: &gltf::Material,
    base: &Path,
    model_path: &Path,
    buffers: &[gltf::buffer::Data],
) -> MaterialData {
    let pbr = material.pbr_metallic_roughness();
    let texture = pbr.base_color_texture().and_then(|info| {
        match load_image_source(info.texture().source().source(), base, model_path, buffers) {
            Ok(image) => Some(image),
            Err(err) => {
                warn!("Texture unavailable, drawing untextured: {err}");
                None
            }
        }
    });

    MaterialData {
        base_color: pbr.base_color_factor(),
        texture,
    }
}

fn load_image_source(
    source: gltf::image::Source,
    base: &Path,
    model_path: &Path,
    buffers: &[gltf::buffer::Data],
) -> Result<TextureImage, AssetError> {
    match source {
        gltf::image::Source::Uri { uri, .. } => {
            if uri.starts_with("data:") {
                return Err(AssetError::UnsupportedImage {
                    path: model_path.to_path_buf(),
                    reason: "inline data URIs are not supported for images".to_string(),
                });
            }
            let image_path: PathBuf = base.join(uri);
            load_texture(&image_path)
        }
        gltf::image::Source::View { view, .. } => {
            let start = view.offset();
            let end = start + view.length();
            let bytes = buffers
                .get(view.buffer().index())
                .and_then(|data| data.0.get(start..end))
                .ok_or_else(|| AssetError::UnsupportedImage {
                    path: model_path.to_path_buf(),
                    reason: format!("buffer view {} out of range", view.index()),
                })?;
            decode_texture(bytes, model_path)
        }
    }
}
