//! Main color pass: Blinn-Phong shading with cube shadow lookups.

use anyhow::Result;
use gallery_core::{DrawItem, LightId, LightTable, LIGHT_COUNT};
use glam::{Mat4, Vec3};

use crate::context::{create_depth_view, DEPTH_FORMAT};
use crate::draw::{draw_items, ObjectBuffer};
use crate::model::{GpuModel, GpuVertex};
use crate::program::{resolve, ParamHandle, ParamKind, ParamTable, ProgramError, ShaderProgram, UniformBlock};
use crate::shadow::ShadowPass;

/// Uniform ambient term applied to every lit surface.
pub const AMBIENT: Vec3 = Vec3::splat(0.12);

/// Scale applied to every light's color.
pub const LIGHT_INTENSITY: f32 = 1.5;

const FRAME_GROUP: u32 = 0;
const SHADOW_GROUP: u32 = 3;

/// Camera values for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraParams {
    /// Projection × view.
    pub view_proj: Mat4,
    /// Eye position in world space.
    pub position: Vec3,
}

#[derive(Debug, Clone, Copy)]
struct LightHandles {
    position: ParamHandle,
    far_plane: ParamHandle,
    color: ParamHandle,
    intensity: ParamHandle,
}

/// Handles into the `frame` block of the lit program.
#[derive(Debug, Clone)]
pub struct FrameHandles {
    view_proj: ParamHandle,
    camera_position: ParamHandle,
    ambient: ParamHandle,
    lights: Vec<LightHandles>,
}

impl FrameHandles {
    /// Resolve every per-frame parameter, including one entry per light.
    pub fn resolve(program: &str, params: &ParamTable) -> Result<Self, ProgramError> {
        let lights = (0..LIGHT_COUNT)
            .map(|i| {
                let name = |field: &str| format!("frame.lights[{i}].{field}");
                Ok(LightHandles {
                    position: resolve(program, params, &name("position"), ParamKind::Vec3)?,
                    far_plane: resolve(program, params, &name("far_plane"), ParamKind::Float)?,
                    color: resolve(program, params, &name("color"), ParamKind::Vec3)?,
                    intensity: resolve(program, params, &name("intensity"), ParamKind::Float)?,
                })
            })
            .collect::<Result<Vec<_>, ProgramError>>()?;

        Ok(Self {
            view_proj: resolve(program, params, "frame.view_proj", ParamKind::Mat4)?,
            camera_position: resolve(program, params, "frame.camera_position", ParamKind::Vec3)?,
            ambient: resolve(program, params, "frame.ambient", ParamKind::Vec3)?,
            lights,
        })
    }

    /// Fill `block` for this frame.
    pub fn write(&self, block: &mut UniformBlock, camera: &CameraParams, lights: &LightTable) {
        block.set_mat4(self.view_proj, camera.view_proj);
        block.set_vec3(self.camera_position, camera.position);
        block.set_vec3(self.ambient, AMBIENT);
        for (handles, (_, light)) in self.lights.iter().zip(lights.iter()) {
            block.set_vec3(handles.position, light.position);
            block.set_float(handles.far_plane, light.far_plane);
            block.set_vec3(handles.color, light.color);
            block.set_float(handles.intensity, LIGHT_INTENSITY);
        }
    }
}

/// Lit program, frame uniforms, shadow bindings and the screen depth buffer.
pub struct LitPass {
    program: ShaderProgram,
    pipeline: wgpu::RenderPipeline,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    frame_block: UniformBlock,
    handles: FrameHandles,
    shadow_bind_group: wgpu::BindGroup,
    depth_view: wgpu::TextureView,
}

impl LitPass {
    /// Build the lit pipeline against an already compiled lit program.
    pub fn new(
        device: &wgpu::Device,
        program: ShaderProgram,
        surface_format: wgpu::TextureFormat,
        size: (u32, u32),
        objects: &ObjectBuffer,
        material_layout: &wgpu::BindGroupLayout,
        shadows: &ShadowPass,
    ) -> Result<Self> {
        let handles = FrameHandles::resolve(program.name(), program.params())?;
        let frame_block = program.uniform_block(FRAME_GROUP, 0)?;

        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Frame Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Frame Uniform Buffer"),
            size: u64::from(frame_block.info().size),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Bind Group"),
            layout: &frame_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });

        let (shadow_layout, shadow_bind_group) = shadow_bindings(device, shadows)?;

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Lit Pipeline Layout"),
            bind_group_layouts: &[&frame_layout, objects.layout(), material_layout, &shadow_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Lit Render Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: program.module(),
                entry_point: "vs_main",
                buffers: &[GpuVertex::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: program.module(),
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
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

        Ok(Self {
            program,
            pipeline,
            frame_buffer,
            frame_bind_group,
            frame_block,
            handles,
            shadow_bind_group,
            depth_view: create_depth_view(device, "Screen Depth Texture", size),
        })
    }

    /// Lit program, for diagnostics.
    pub fn program(&self) -> &ShaderProgram {
        &self.program
    }

    /// Recreate the screen depth buffer.
    pub fn resize(&mut self, device: &wgpu::Device, size: (u32, u32)) {
        self.depth_view = create_depth_view(device, "Screen Depth Texture", size);
    }

    /// Upload camera and light values for this frame.
    pub fn update(&mut self, queue: &wgpu::Queue, camera: &CameraParams, lights: &LightTable) {
        self.handles.write(&mut self.frame_block, camera, lights);
        queue.write_buffer(&self.frame_buffer, 0, self.frame_block.as_bytes());
    }

    /// Clear `target` to black and draw every item.
    pub fn encode(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        models: &[GpuModel],
        objects: &ObjectBuffer,
        items: &[DrawItem],
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Lit Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            ..Default::default()
        });

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(FRAME_GROUP, &self.frame_bind_group, &[]);
        pass.set_bind_group(SHADOW_GROUP, &self.shadow_bind_group, &[]);
        draw_items(&mut pass, models, objects, items, true);
    }
}

fn shadow_bindings(
    device: &wgpu::Device,
    shadows: &ShadowPass,
) -> Result<(wgpu::BindGroupLayout, wgpu::BindGroup)> {
    let cube_entry = |binding: u32| wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Depth,
            view_dimension: wgpu::TextureViewDimension::Cube,
            multisampled: false,
        },
        count: None,
    };

    let mut entries: Vec<wgpu::BindGroupLayoutEntry> =
        (0..LIGHT_COUNT as u32).map(cube_entry).collect();
    entries.push(wgpu::BindGroupLayoutEntry {
        binding: LIGHT_COUNT as u32,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
        count: None,
    });

    let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Shadow Sampling Bind Group Layout"),
        entries: &entries,
    });

    let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("Shadow Comparison Sampler"),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Nearest,
        compare: Some(wgpu::CompareFunction::LessEqual),
        ..Default::default()
    });

    let mut views = Vec::with_capacity(LIGHT_COUNT);
    for light in 0..LIGHT_COUNT {
        let target = shadows
            .target(LightId(light))
            .ok_or_else(|| anyhow::anyhow!("No shadow target for light {light}"))?;
        views.push(target.cube_view());
    }

    let mut bind_entries: Vec<wgpu::BindGroupEntry> = views
        .iter()
        .enumerate()
        .map(|(binding, view)| wgpu::BindGroupEntry {
            binding: binding as u32,
            resource: wgpu::BindingResource::TextureView(view),
        })
        .collect();
    bind_entries.push(wgpu::BindGroupEntry {
        binding: LIGHT_COUNT as u32,
        resource: wgpu::BindingResource::Sampler(&sampler),
    });

    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Shadow Sampling Bind Group"),
        layout: &layout,
        entries: &bind_entries,
    });

    Ok((layout, bind_group))
}
