//! Cube depth targets and the per-face depth pass.
//!
//! Each light owns one six-layer `Depth32Float` texture. Every frame each
//! face layer is cleared and re-rendered with the linear light distance, and
//! the whole texture is then sampled as a `texture_depth_cube` by the lit
//! pass.

use std::num::NonZeroU64;

use anyhow::Result;
use gallery_core::{CubeFace, DrawItem, LightId, LightTable, LIGHT_COUNT};

use crate::context::DEPTH_FORMAT;
use crate::draw::{draw_items, ObjectBuffer, OBJECT_STRIDE};
use crate::model::{GpuModel, GpuVertex};
use crate::program::{resolve, ParamHandle, ParamKind, ParamTable, ProgramError, ShaderProgram, UniformBlock};
use crate::shaders;

const FACE_COUNT: usize = CubeFace::ALL.len();

/// Handles into the `face` block of the depth program.
#[derive(Debug, Clone, Copy)]
pub struct FaceHandles {
    view_proj: ParamHandle,
    light_position: ParamHandle,
    far_plane: ParamHandle,
}

impl FaceHandles {
    /// Resolve the per-face parameters of the depth program.
    pub fn resolve(program: &str, params: &ParamTable) -> Result<Self, ProgramError> {
        Ok(Self {
            view_proj: resolve(program, params, "face.view_proj", ParamKind::Mat4)?,
            light_position: resolve(program, params, "face.light_position", ParamKind::Vec3)?,
            far_plane: resolve(program, params, "face.far_plane", ParamKind::Float)?,
        })
    }

    /// One slot per (light, face), light-major, at [`OBJECT_STRIDE`] spacing.
    pub fn pack(&self, template: &UniformBlock, lights: &LightTable) -> Vec<u8> {
        let stride = OBJECT_STRIDE as usize;
        let mut bytes = vec![0u8; LIGHT_COUNT * FACE_COUNT * stride];
        let mut block = template.clone();

        for (id, light) in lights.iter() {
            let transforms = light.cube_transforms();
            block.set_vec3(self.light_position, light.position);
            block.set_float(self.far_plane, light.far_plane);
            for face in CubeFace::ALL {
                block.set_mat4(self.view_proj, transforms.view_projection(face));
                let data = block.as_bytes();
                let start = face_slot_offset(id, face) as usize;
                if let Some(slot) = bytes.get_mut(start..start + data.len()) {
                    slot.copy_from_slice(data);
                }
            }
        }
        bytes
    }
}

/// Dynamic offset of a (light, face) slot in the face buffer.
pub fn face_slot_offset(light: LightId, face: CubeFace) -> u32 {
    let slot = light.0 * FACE_COUNT + face.layer() as usize;
    (slot as u64 * OBJECT_STRIDE) as u32
}

/// Cube depth texture of one light.
pub struct ShadowTarget {
    face_views: Vec<wgpu::TextureView>,
    cube_view: wgpu::TextureView,
}

impl ShadowTarget {
    fn new(device: &wgpu::Device, id: LightId, resolution: u32) -> Self {
        let label = format!("Shadow Cube {}", id.0);
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(&label),
            size: wgpu::Extent3d {
                width: resolution,
                height: resolution,
                depth_or_array_layers: FACE_COUNT as u32,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });

        let face_views = CubeFace::ALL
            .iter()
            .map(|face| {
                texture.create_view(&wgpu::TextureViewDescriptor {
                    label: Some(&format!("{label} face {face:?}")),
                    dimension: Some(wgpu::TextureViewDimension::D2),
                    base_array_layer: face.layer(),
                    array_layer_count: Some(1),
                    ..Default::default()
                })
            })
            .collect();

        let cube_view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some(&label),
            dimension: Some(wgpu::TextureViewDimension::Cube),
            array_layer_count: Some(FACE_COUNT as u32),
            ..Default::default()
        });

        Self {
            face_views,
            cube_view,
        }
    }

    /// View for sampling as `texture_depth_cube`.
    pub fn cube_view(&self) -> &wgpu::TextureView {
        &self.cube_view
    }
}

/// Depth program, face uniforms and one cube target per light.
pub struct ShadowPass {
    program: ShaderProgram,
    pipeline: wgpu::RenderPipeline,
    face_buffer: wgpu::Buffer,
    face_bind_group: wgpu::BindGroup,
    template: UniformBlock,
    handles: FaceHandles,
    targets: Vec<ShadowTarget>,
}

impl ShadowPass {
    /// Build the depth program and allocate `resolution`² cube targets.
    pub fn new(
        device: &wgpu::Device,
        objects: &ObjectBuffer,
        lights: &LightTable,
        resolution: u32,
    ) -> Result<Self> {
        let program = ShaderProgram::new(device, "depth.wgsl", shaders::DEPTH)?;
        let handles = FaceHandles::resolve(program.name(), program.params())?;
        let template = program.uniform_block(0, 0)?;
        let block_size = NonZeroU64::new(u64::from(template.info().size));

        let face_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Shadow Face Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: block_size,
                },
                count: None,
            }],
        });

        let face_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Shadow Face Buffer"),
            size: (LIGHT_COUNT * FACE_COUNT) as u64 * OBJECT_STRIDE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let face_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Shadow Face Bind Group"),
            layout: &face_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &face_buffer,
                    offset: 0,
                    size: block_size,
                }),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Shadow Pipeline Layout"),
            bind_group_layouts: &[&face_layout, objects.layout()],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Shadow Depth Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: program.module(),
                entry_point: "vs_main",
                buffers: &[GpuVertex::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: program.module(),
                entry_point: "fs_main",
                targets: &[],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                // Both sides cast.
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        let resolution = resolution.max(1);
        let targets = lights
            .iter()
            .map(|(id, _)| ShadowTarget::new(device, id, resolution))
            .collect();

        tracing::info!(resolution, lights = LIGHT_COUNT, "Shadow cube targets allocated");

        Ok(Self {
            program,
            pipeline,
            face_buffer,
            face_bind_group,
            template,
            handles,
            targets,
        })
    }

    /// Depth program, for diagnostics.
    pub fn program(&self) -> &ShaderProgram {
        &self.program
    }

    /// Upload this frame's face transforms.
    pub fn update(&self, queue: &wgpu::Queue, lights: &LightTable) {
        queue.write_buffer(&self.face_buffer, 0, &self.handles.pack(&self.template, lights));
    }

    /// Cube target of `light`.
    pub fn target(&self, light: LightId) -> Option<&ShadowTarget> {
        self.targets.get(light.0)
    }

    /// Record one depth pass per (light, face).
    pub fn encode(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        models: &[GpuModel],
        objects: &ObjectBuffer,
        items: &[DrawItem],
    ) {
        for (index, target) in self.targets.iter().enumerate() {
            for (face, view) in CubeFace::ALL.iter().zip(&target.face_views) {
                let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Shadow Depth Pass"),
                    color_attachments: &[],
                    depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                        view,
                        depth_ops: Some(wgpu::Operations {
                            load: wgpu::LoadOp::Clear(1.0),
                            store: wgpu::StoreOp::Store,
                        }),
                        stencil_ops: None,
                    }),
                    ..Default::default()
                });
                pass.set_pipeline(&self.pipeline);
                pass.set_bind_group(0, &self.face_bind_group, &[face_slot_offset(LightId(index), *face)]);
                draw_items(&mut pass, models, objects, items, false);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::compile_wgsl;
    use gallery_core::SceneLayout;

    #[test]
    fn face_slots_are_light_major_and_aligned() {
        assert_eq!(face_slot_offset(LightId(0), CubeFace::PositiveX), 0);
        assert_eq!(face_slot_offset(LightId(0), CubeFace::NegativeZ), 5 * 256);
        assert_eq!(face_slot_offset(LightId(1), CubeFace::PositiveX), 6 * 256);
        for light in 0..LIGHT_COUNT {
            for face in CubeFace::ALL {
                assert_eq!(u64::from(face_slot_offset(LightId(light), face)) % OBJECT_STRIDE, 0);
            }
        }
    }

    #[test]
    fn packed_faces_carry_each_lights_position() {
        let module = compile_wgsl("depth.wgsl", shaders::DEPTH).expect("depth shader");
        let params = ParamTable::reflect(&module);
        let handles = FaceHandles::resolve("depth.wgsl", &params).expect("face params");
        let template = UniformBlock::new(params.block(0, 0).expect("face block"));
        let lights = SceneLayout::gallery().lights;

        let bytes = handles.pack(&template, &lights);
        assert_eq!(bytes.len(), LIGHT_COUNT * FACE_COUNT * OBJECT_STRIDE as usize);

        for (id, light) in lights.iter() {
            for face in CubeFace::ALL {
                let at = (face_slot_offset(id, face) + handles.light_position.offset) as usize;
                let position: [f32; 3] = bytemuck::pod_read_unaligned(&bytes[at..at + 12]);
                assert_eq!(position, light.position.to_array());

                let at = (face_slot_offset(id, face) + handles.view_proj.offset) as usize;
                let matrix: [f32; 16] = bytemuck::pod_read_unaligned(&bytes[at..at + 64]);
                let expected = light.cube_transforms().view_projection(face).to_cols_array();
                assert_eq!(matrix, expected);
            }
        }
    }
}
