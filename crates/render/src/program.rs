//! Shader programs with parameter handles resolved once at build time.
//!
//! Each WGSL source is validated and reflected through naga. Every member of
//! every `var<uniform>` struct becomes a named [`ParamHandle`]
//! (`"frame.lights[1].color"`), so per-frame code writes by handle instead of
//! looking names up.

use std::collections::HashMap;

use glam::{Mat3, Mat4, Vec3, Vec4};
use thiserror::Error;
use tracing::{debug, error};
use wgpu::naga;

/// Errors raised while building a shader program.
#[derive(Debug, Error)]
pub enum ProgramError {
    /// The source failed to parse or validate.
    #[error("shader {name} failed to compile:\n{diagnostic}")]
    Compile {
        /// Source name (file name of the shader).
        name: String,
        /// Human-readable diagnostic from naga.
        diagnostic: String,
    },
    /// A parameter was requested that the program does not declare.
    #[error("shader {program} has no uniform parameter named {param}")]
    UnknownParam {
        /// Program the lookup ran against.
        program: String,
        /// Requested parameter path.
        param: String,
    },
    /// A parameter exists but has a different type than requested.
    #[error("shader {program} parameter {param} is {found:?}, expected {expected:?}")]
    KindMismatch {
        /// Program the lookup ran against.
        program: String,
        /// Requested parameter path.
        param: String,
        /// Declared kind.
        found: ParamKind,
        /// Requested kind.
        expected: ParamKind,
    },
    /// No uniform block is bound at the requested slot.
    #[error("shader {program} has no uniform block at group {group} binding {binding}")]
    UnknownBlock {
        /// Program the lookup ran against.
        program: String,
        /// Bind group index.
        group: u32,
        /// Binding index.
        binding: u32,
    },
}

/// Value type of a uniform parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// `i32`
    Int,
    /// `f32`
    Float,
    /// `vec3<f32>`
    Vec3,
    /// `vec4<f32>`
    Vec4,
    /// `mat3x3<f32>`
    Mat3,
    /// `mat4x4<f32>`
    Mat4,
}

/// Location of one uniform parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamHandle {
    /// Bind group of the owning block.
    pub group: u32,
    /// Binding of the owning block.
    pub binding: u32,
    /// Byte offset inside the block.
    pub offset: u32,
    /// Value type.
    pub kind: ParamKind,
}

/// Uniform block declared by a program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockInfo {
    /// Bind group index.
    pub group: u32,
    /// Binding index.
    pub binding: u32,
    /// Size of the block in bytes.
    pub size: u32,
}

/// Name -> handle table reflected from a validated module.
#[derive(Debug, Clone, Default)]
pub struct ParamTable {
    params: HashMap<String, ParamHandle>,
    blocks: Vec<BlockInfo>,
}

impl ParamTable {
    /// Reflect every uniform block of `module`.
    pub fn reflect(module: &naga::Module) -> Self {
        let mut table = Self::default();
        let ctx = module.to_ctx();

        for (_, var) in module.global_variables.iter() {
            if var.space != naga::AddressSpace::Uniform {
                continue;
            }
            let (Some(binding), Some(name)) = (&var.binding, &var.name) else {
                continue;
            };
            let inner = &module.types[var.ty].inner;
            table.blocks.push(BlockInfo {
                group: binding.group,
                binding: binding.binding,
                size: inner.size(ctx),
            });
            table.collect(module, var.ty, name.clone(), binding, 0);
        }

        table
    }

    fn collect(
        &mut self,
        module: &naga::Module,
        ty: naga::Handle<naga::Type>,
        path: String,
        binding: &naga::ResourceBinding,
        offset: u32,
    ) {
        let mut leaf = |kind: ParamKind| {
            self.params.insert(
                path.clone(),
                ParamHandle {
                    group: binding.group,
                    binding: binding.binding,
                    offset,
                    kind,
                },
            );
        };

        match &module.types[ty].inner {
            naga::TypeInner::Scalar(scalar) => match scalar.kind {
                naga::ScalarKind::Sint | naga::ScalarKind::Uint | naga::ScalarKind::Bool => {
                    leaf(ParamKind::Int)
                }
                naga::ScalarKind::Float => leaf(ParamKind::Float),
                _ => {}
            },
            naga::TypeInner::Vector { size, .. } => match size {
                naga::VectorSize::Tri => leaf(ParamKind::Vec3),
                naga::VectorSize::Quad => leaf(ParamKind::Vec4),
                _ => {}
            },
            naga::TypeInner::Matrix { columns, rows, .. } => match (columns, rows) {
                (naga::VectorSize::Tri, naga::VectorSize::Tri) => leaf(ParamKind::Mat3),
                (naga::VectorSize::Quad, naga::VectorSize::Quad) => leaf(ParamKind::Mat4),
                _ => {}
            },
            naga::TypeInner::Struct { members, .. } => {
                for member in members {
                    let Some(member_name) = &member.name else {
                        continue;
                    };
                    self.collect(
                        module,
                        member.ty,
                        format!("{path}.{member_name}"),
                        binding,
                        offset + member.offset,
                    );
                }
            }
            naga::TypeInner::Array {
                base,
                size: naga::ArraySize::Constant(count),
                stride,
            } => {
                for i in 0..count.get() {
                    self.collect(module, *base, format!("{path}[{i}]"), binding, offset + i * stride);
                }
            }
            _ => {}
        }
    }

    /// Look up a handle by path.
    pub fn get(&self, name: &str) -> Option<ParamHandle> {
        self.params.get(name).copied()
    }

    /// Uniform block at `(group, binding)`.
    pub fn block(&self, group: u32, binding: u32) -> Option<BlockInfo> {
        self.blocks
            .iter()
            .find(|block| block.group == group && block.binding == binding)
            .copied()
    }

    /// Number of resolved leaf parameters.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// True when the program declares no uniform parameters.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

/// Parse and validate WGSL, reporting failures with the shader name.
pub fn compile_wgsl(name: &str, source: &str) -> Result<naga::Module, ProgramError> {
    let fail = |diagnostic: String| {
        error!(shader = name, "Shader compilation failed:\n{diagnostic}");
        ProgramError::Compile {
            name: name.to_string(),
            diagnostic,
        }
    };

    let module = naga::front::wgsl::parse_str(source).map_err(|err| fail(err.emit_to_string(source)))?;

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    );
    validator
        .validate(&module)
        .map_err(|err| fail(err.emit_to_string(source)))?;

    Ok(module)
}

/// A validated shader module plus its reflected parameter table.
#[derive(Debug)]
pub struct ShaderProgram {
    name: String,
    module: wgpu::ShaderModule,
    params: ParamTable,
}

impl ShaderProgram {
    /// Compile `source`, reflect its uniforms and create the GPU module.
    pub fn new(device: &wgpu::Device, name: &str, source: &str) -> Result<Self, ProgramError> {
        let reflected = compile_wgsl(name, source)?;
        let params = ParamTable::reflect(&reflected);
        debug!(shader = name, params = params.len(), "Shader program built");

        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(name),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        Ok(Self {
            name: name.to_string(),
            module,
            params,
        })
    }

    /// Program name used in diagnostics.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// GPU shader module.
    pub fn module(&self) -> &wgpu::ShaderModule {
        &self.module
    }

    /// Reflected parameter table.
    pub fn params(&self) -> &ParamTable {
        &self.params
    }

    /// Resolve a parameter and check its kind.
    pub fn param(&self, name: &str, expected: ParamKind) -> Result<ParamHandle, ProgramError> {
        resolve(&self.name, &self.params, name, expected)
    }

    /// Fresh zeroed staging block for the uniform at `(group, binding)`.
    pub fn uniform_block(&self, group: u32, binding: u32) -> Result<UniformBlock, ProgramError> {
        let info = self
            .params
            .block(group, binding)
            .ok_or_else(|| ProgramError::UnknownBlock {
                program: self.name.clone(),
                group,
                binding,
            })?;
        Ok(UniformBlock::new(info))
    }
}

/// Resolve `name` in `table`, checking its kind.
pub fn resolve(
    program: &str,
    table: &ParamTable,
    name: &str,
    expected: ParamKind,
) -> Result<ParamHandle, ProgramError> {
    let handle = table.get(name).ok_or_else(|| ProgramError::UnknownParam {
        program: program.to_string(),
        param: name.to_string(),
    })?;
    if handle.kind != expected {
        return Err(ProgramError::KindMismatch {
            program: program.to_string(),
            param: name.to_string(),
            found: handle.kind,
            expected,
        });
    }
    Ok(handle)
}

/// CPU staging bytes for one uniform block.
#[derive(Debug, Clone)]
pub struct UniformBlock {
    info: BlockInfo,
    bytes: Vec<u8>,
}

impl UniformBlock {
    /// Zeroed block of the given layout.
    pub fn new(info: BlockInfo) -> Self {
        Self {
            info,
            bytes: vec![0; info.size as usize],
        }
    }

    /// Block layout.
    pub fn info(&self) -> BlockInfo {
        self.info
    }

    /// Raw bytes ready for `queue.write_buffer`.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    fn write(&mut self, handle: ParamHandle, kind: ParamKind, data: &[u8]) {
        debug_assert_eq!(handle.kind, kind);
        debug_assert_eq!(
            (handle.group, handle.binding),
            (self.info.group, self.info.binding),
            "handle belongs to another block"
        );
        let start = handle.offset as usize;
        if let Some(dst) = self.bytes.get_mut(start..start + data.len()) {
            dst.copy_from_slice(data);
        }
    }

    /// Write an `i32`.
    pub fn set_int(&mut self, handle: ParamHandle, value: i32) {
        self.write(handle, ParamKind::Int, bytemuck::bytes_of(&value));
    }

    /// Write an `f32`.
    pub fn set_float(&mut self, handle: ParamHandle, value: f32) {
        self.write(handle, ParamKind::Float, bytemuck::bytes_of(&value));
    }

    /// Write a `vec3<f32>`.
    pub fn set_vec3(&mut self, handle: ParamHandle, value: Vec3) {
        self.write(handle, ParamKind::Vec3, bytemuck::cast_slice(&value.to_array()));
    }

    /// Write a `vec4<f32>`.
    pub fn set_vec4(&mut self, handle: ParamHandle, value: Vec4) {
        self.write(handle, ParamKind::Vec4, bytemuck::cast_slice(&value.to_array()));
    }

    /// Write a `mat3x3<f32>`; columns are padded to 16 bytes.
    pub fn set_mat3(&mut self, handle: ParamHandle, value: Mat3) {
        let mut padded = [0.0f32; 12];
        for (column, chunk) in padded.chunks_exact_mut(4).enumerate() {
            chunk[..3].copy_from_slice(&value.col(column).to_array());
        }
        self.write(handle, ParamKind::Mat3, bytemuck::cast_slice(&padded));
    }

    /// Write a `mat4x4<f32>`.
    pub fn set_mat4(&mut self, handle: ParamHandle, value: Mat4) {
        self.write(handle, ParamKind::Mat4, bytemuck::cast_slice(&value.to_cols_array()));
    }
}
