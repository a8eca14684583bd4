//! GPU-side models: vertex/index buffers plus one bind group per material.

use std::borrow::Cow;

use gallery_assets::{MaterialData, MeshData, MeshVertex, Submesh, TextureImage};
use glam::Vec4;
use wgpu::util::DeviceExt;

use crate::program::{ParamHandle, ParamKind, ProgramError, ShaderProgram, UniformBlock};

/// Bind group index of the material block in the lit program.
pub const MATERIAL_GROUP: u32 = 2;

/// Vertex layout shared by the depth and lit pipelines.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuVertex {
    /// Model-space position.
    pub position: [f32; 3],
    /// Model-space normal.
    pub normal: [f32; 3],
    /// Texture coordinate.
    pub uv: [f32; 2],
}

impl From<&MeshVertex> for GpuVertex {
    fn from(vertex: &MeshVertex) -> Self {
        Self {
            position: vertex.position,
            normal: vertex.normal,
            uv: vertex.uv,
        }
    }
}

const GPU_VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 3] = [
    // position
    wgpu::VertexAttribute {
        offset: 0,
        shader_location: 0,
        format: wgpu::VertexFormat::Float32x3,
    },
    // normal
    wgpu::VertexAttribute {
        offset: 12,
        shader_location: 1,
        format: wgpu::VertexFormat::Float32x3,
    },
    // uv
    wgpu::VertexAttribute {
        offset: 24,
        shader_location: 2,
        format: wgpu::VertexFormat::Float32x2,
    },
];

impl GpuVertex {
    /// Buffer layout matching `VertexInput` in `common.wgsl`.
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<GpuVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &GPU_VERTEX_ATTRIBUTES,
        }
    }
}

/// Index range drawn with one material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GpuSubmesh {
    /// Index range into the model's index buffer.
    pub indices: std::ops::Range<u32>,
    /// Index into [`GpuModel::materials`].
    pub material: usize,
}

impl GpuSubmesh {
    /// Draw ranges for `submeshes`, with material indices clamped to the
    /// `material_count` bind groups that exist.
    pub fn from_submeshes(submeshes: &[Submesh], material_count: usize) -> Vec<Self> {
        let last_material = material_count.saturating_sub(1);
        submeshes
            .iter()
            .map(|submesh| GpuSubmesh {
                indices: submesh.first_index..submesh.first_index + submesh.index_count,
                material: submesh.material.min(last_material),
            })
            .collect()
    }
}

/// A model uploaded to the GPU.
pub struct GpuModel {
    /// Vertex buffer on GPU.
    pub vertex_buffer: wgpu::Buffer,
    /// `u32` index buffer on GPU.
    pub index_buffer: wgpu::Buffer,
    /// Draw ranges.
    pub submeshes: Vec<GpuSubmesh>,
    /// One bind group per material, laid out for [`MATERIAL_GROUP`].
    pub materials: Vec<wgpu::BindGroup>,
}

impl GpuModel {
    /// Upload `mesh` and build its material bind groups.
    pub fn upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        name: &str,
        mesh: &MeshData,
        binder: &MaterialBinder,
    ) -> Self {
        let vertices: Vec<GpuVertex> = mesh.vertices.iter().map(GpuVertex::from).collect();
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{name} vertices")),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{name} indices")),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let materials: Vec<wgpu::BindGroup> = mesh
            .materials
            .iter()
            .enumerate()
            .map(|(i, material)| binder.bind(device, queue, &format!("{name} material {i}"), material))
            .collect();

        let submeshes = GpuSubmesh::from_submeshes(&mesh.submeshes, materials.len());

        Self {
            vertex_buffer,
            index_buffer,
            submeshes,
            materials,
        }
    }
}

/// Builds material bind groups against the lit program's material block.
pub struct MaterialBinder {
    layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    white: wgpu::TextureView,
    block: UniformBlock,
    base_color: ParamHandle,
    textured: ParamHandle,
}

impl MaterialBinder {
    /// Resolve the material parameters of `program` and create shared resources.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        program: &ShaderProgram,
    ) -> Result<Self, ProgramError> {
        let base_color = program.param("material.base_color", ParamKind::Vec4)?;
        let textured = program.param("material.textured", ParamKind::Int)?;
        let block = program.uniform_block(MATERIAL_GROUP, 0)?;

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Material Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Material Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let white = upload_rgba_texture(device, queue, &white_texture(), "Fallback White Texture")
            .create_view(&wgpu::TextureViewDescriptor::default());

        Ok(Self {
            layout,
            sampler,
            white,
            block,
            base_color,
            textured,
        })
    }

    /// Layout of the bind groups this binder creates.
    pub fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }

    fn bind(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        material: &MaterialData,
    ) -> wgpu::BindGroup {
        let mut block = self.block.clone();
        block.set_vec4(self.base_color, Vec4::from_array(material.base_color));
        block.set_int(self.textured, i32::from(material.texture.is_some()));

        let uniform = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: block.as_bytes(),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let uploaded = material.texture.as_ref().map(|image| {
            upload_rgba_texture(device, queue, image, label)
                .create_view(&wgpu::TextureViewDescriptor::default())
        });
        let view = uploaded.as_ref().unwrap_or(&self.white);

        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &self.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        })
    }
}

fn white_texture() -> TextureImage {
    TextureImage {
        width: 1,
        height: 1,
        rgba: vec![255; 4],
    }
}

/// Rows padded to `COPY_BYTES_PER_ROW_ALIGNMENT`, with the padded row pitch.
fn padded_rows(image: &TextureImage) -> (Cow<'_, [u8]>, u32) {
    let row_bytes = image.width as usize * 4;
    let alignment = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT as usize;
    let padded_row_bytes = row_bytes.div_ceil(alignment) * alignment;

    if padded_row_bytes == row_bytes {
        return (Cow::Borrowed(&image.rgba), row_bytes as u32);
    }

    let mut padded = vec![0u8; padded_row_bytes * image.height as usize];
    for (src, dst) in image
        .rgba
        .chunks_exact(row_bytes)
        .zip(padded.chunks_exact_mut(padded_row_bytes))
    {
        dst[..row_bytes].copy_from_slice(src);
    }
    (Cow::Owned(padded), padded_row_bytes as u32)
}

fn upload_rgba_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    image: &TextureImage,
    label: &str,
) -> wgpu::Texture {
    let size = wgpu::Extent3d {
        width: image.width.max(1),
        height: image.height.max(1),
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    let (pixels, bytes_per_row) = padded_rows(image);
    queue.write_texture(
        wgpu::ImageCopyTexture {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        &pixels,
        wgpu::ImageDataLayout {
            offset: 0,
            bytes_per_row: Some(bytes_per_row),
            rows_per_image: Some(size.height),
        },
        size,
    );

    texture
}
