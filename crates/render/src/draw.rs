//! Per-object uniforms and the traversal shared by the depth and lit passes.

use std::num::NonZeroU64;

use gallery_core::DrawItem;

use crate::model::{GpuModel, MATERIAL_GROUP};
use crate::program::{resolve, ParamHandle, ParamKind, ParamTable, ProgramError, ShaderProgram, UniformBlock};

/// Bind group index of `object_uniforms` in every mesh program.
pub const OBJECT_GROUP: u32 = 1;

/// Distance between consecutive objects in the uniform buffer. Matches the
/// default `min_uniform_buffer_offset_alignment`.
pub const OBJECT_STRIDE: u64 = 256;

const INITIAL_CAPACITY: usize = 32;

/// Handles into the `object_uniforms` block.
#[derive(Debug, Clone, Copy)]
pub struct ObjectHandles {
    model: ParamHandle,
    normal_matrix: ParamHandle,
    emissive: ParamHandle,
}

impl ObjectHandles {
    /// Resolve the per-object parameters of a program.
    pub fn resolve(program: &str, params: &ParamTable) -> Result<Self, ProgramError> {
        Ok(Self {
            model: resolve(program, params, "object_uniforms.model", ParamKind::Mat4)?,
            normal_matrix: resolve(program, params, "object_uniforms.normal_matrix", ParamKind::Mat3)?,
            emissive: resolve(program, params, "object_uniforms.emissive", ParamKind::Int)?,
        })
    }

    /// Pack one block per item at [`OBJECT_STRIDE`] spacing.
    pub fn pack(&self, template: &UniformBlock, items: &[DrawItem]) -> Vec<u8> {
        let stride = OBJECT_STRIDE as usize;
        let mut bytes = vec![0u8; items.len() * stride];
        let mut block = template.clone();

        for (item, slot) in items.iter().zip(bytes.chunks_exact_mut(stride)) {
            block.set_mat4(self.model, item.transform);
            block.set_mat3(self.normal_matrix, item.normal_matrix());
            block.set_int(self.emissive, i32::from(item.emissive));
            let data = block.as_bytes();
            slot[..data.len()].copy_from_slice(data);
        }
        bytes
    }
}

/// Dynamic-offset uniform buffer holding every draw item's object block.
pub struct ObjectBuffer {
    layout: wgpu::BindGroupLayout,
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    capacity: usize,
    template: UniformBlock,
    handles: ObjectHandles,
}

impl ObjectBuffer {
    /// Create the buffer using the object block layout of `program`.
    pub fn new(device: &wgpu::Device, program: &ShaderProgram) -> Result<Self, ProgramError> {
        let handles = ObjectHandles::resolve(program.name(), program.params())?;
        let template = program.uniform_block(OBJECT_GROUP, 0)?;

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Object Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: NonZeroU64::new(u64::from(template.info().size)),
                },
                count: None,
            }],
        });

        let (buffer, bind_group) = Self::allocate(device, &layout, &template, INITIAL_CAPACITY);

        Ok(Self {
            layout,
            buffer,
            bind_group,
            capacity: INITIAL_CAPACITY,
            template,
            handles,
        })
    }

    fn allocate(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        template: &UniformBlock,
        capacity: usize,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Object Uniform Buffer"),
            size: capacity as u64 * OBJECT_STRIDE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Object Bind Group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: NonZeroU64::new(u64::from(template.info().size)),
                }),
            }],
        });
        (buffer, bind_group)
    }

    /// Layout for pipelines that consume object uniforms.
    pub fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }

    /// Write this frame's items, growing the buffer when needed.
    pub fn write(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, items: &[DrawItem]) {
        if items.len() > self.capacity {
            let capacity = items.len().next_power_of_two();
            tracing::debug!(capacity, "Growing object uniform buffer");
            let (buffer, bind_group) = Self::allocate(device, &self.layout, &self.template, capacity);
            self.buffer = buffer;
            self.bind_group = bind_group;
            self.capacity = capacity;
        }
        if items.is_empty() {
            return;
        }
        queue.write_buffer(&self.buffer, 0, &self.handles.pack(&self.template, items));
    }

    /// Dynamic offset of the `index`-th item.
    pub fn offset(index: usize) -> u32 {
        (index as u64 * OBJECT_STRIDE) as u32
    }
}

/// Draw every item in list order. Both passes go through here so item `i`
/// always reads object slot `i`. Material bind groups are set only when the
/// pipeline has a material group.
pub fn draw_items<'a>(
    pass: &mut wgpu::RenderPass<'a>,
    models: &'a [GpuModel],
    objects: &'a ObjectBuffer,
    items: &[DrawItem],
    with_materials: bool,
) {
    for (index, item) in items.iter().enumerate() {
        let Some(model) = models.get(item.model.index()) else {
            continue;
        };

        pass.set_bind_group(OBJECT_GROUP, &objects.bind_group, &[ObjectBuffer::offset(index)]);
        pass.set_vertex_buffer(0, model.vertex_buffer.slice(..));
        pass.set_index_buffer(model.index_buffer.slice(..), wgpu::IndexFormat::Uint32);

        for submesh in &model.submeshes {
            if with_materials {
                let Some(material) = model.materials.get(submesh.material) else {
                    continue;
                };
                pass.set_bind_group(MATERIAL_GROUP, material, &[]);
            }
            pass.draw_indexed(submesh.indices.clone(), 0, 0..1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::compile_wgsl;
    use crate::shaders;
    use gallery_core::ModelId;
    use glam::{Mat4, Vec3};

    fn handles_and_template() -> (ObjectHandles, UniformBlock) {
        let module = compile_wgsl("lit.wgsl", shaders::LIT).expect("lit shader");
        let params = ParamTable::reflect(&module);
        let handles = ObjectHandles::resolve("lit.wgsl", &params).expect("object params");
        let template = UniformBlock::new(params.block(OBJECT_GROUP, 0).expect("object block"));
        (handles, template)
    }

    #[test]
    fn object_block_fits_stride() {
        let (_, template) = handles_and_template();
        assert!(u64::from(template.info().size) <= OBJECT_STRIDE);
    }

    #[test]
    fn items_land_in_their_own_slots() {
        let (handles, template) = handles_and_template();
        let items = [
            DrawItem {
                model: ModelId(0),
                transform: Mat4::IDENTITY,
                emissive: false,
            },
            DrawItem {
                model: ModelId(1),
                transform: Mat4::from_translation(Vec3::new(3.0, 4.0, 5.0)),
                emissive: true,
            },
        ];

        let bytes = handles.pack(&template, &items);
        assert_eq!(bytes.len(), 2 * OBJECT_STRIDE as usize);

        let second: [f32; 16] =
            bytemuck::pod_read_unaligned(&bytes[OBJECT_STRIDE as usize..OBJECT_STRIDE as usize + 64]);
        assert_eq!(&second[12..15], &[3.0, 4.0, 5.0]);

        let emissive_at = handles.emissive.offset as usize;
        let first_flag = i32::from_ne_bytes(bytes[emissive_at..emissive_at + 4].try_into().expect("4 bytes"));
        let second_at = OBJECT_STRIDE as usize + emissive_at;
        let second_flag = i32::from_ne_bytes(bytes[second_at..second_at + 4].try_into().expect("4 bytes"));
        assert_eq!((first_flag, second_flag), (0, 1));
    }

    #[test]
    fn depth_and_lit_share_object_layout() {
        let lit = ParamTable::reflect(&compile_wgsl("lit.wgsl", shaders::LIT).expect("lit"));
        let depth = ParamTable::reflect(&compile_wgsl("depth.wgsl", shaders::DEPTH).expect("depth"));
        for name in ["object_uniforms.model", "object_uniforms.normal_matrix", "object_uniforms.emissive"] {
            assert_eq!(lit.get(name), depth.get(name), "{name}");
        }
    }

    #[test]
    fn offsets_step_by_stride() {
        assert_eq!(ObjectBuffer::offset(0), 0);
        assert_eq!(ObjectBuffer::offset(3), 768);
    }
}
