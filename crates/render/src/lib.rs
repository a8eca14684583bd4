#![warn(missing_docs)]
//! Rendering facade: omnidirectional shadow cubes, a lit pass and a HUD
//! overlay, all built on wgpu.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use gallery_assets::load_model;
use gallery_core::{DrawItem, LightTable, SceneLayout};
use winit::window::Window;

mod context;
mod draw;
mod lit;
mod model;
mod overlay;
pub mod program;
pub mod shaders;
mod shadow;
mod window;

pub use context::RenderContext;
pub use draw::{draw_items, ObjectBuffer, ObjectHandles, OBJECT_GROUP, OBJECT_STRIDE};
pub use lit::{CameraParams, FrameHandles, LitPass, AMBIENT, LIGHT_INTENSITY};
pub use model::{GpuModel, GpuSubmesh, GpuVertex, MaterialBinder, MATERIAL_GROUP};
pub use overlay::{overlay_vertices, HudState, OverlayPass, OverlayVertex};
pub use program::{
    compile_wgsl, BlockInfo, ParamHandle, ParamKind, ParamTable, ProgramError, ShaderProgram,
    UniformBlock,
};
pub use shadow::{face_slot_offset, FaceHandles, ShadowPass, ShadowTarget};
pub use window::{WindowConfig, WindowManager};

/// Renderer configuration.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Present with Fifo (vsync) instead of AutoNoVsync.
    pub vsync: bool,
    /// Edge length of each shadow cube face in texels.
    pub shadow_resolution: u32,
    /// Directory model paths are resolved against.
    pub asset_root: PathBuf,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            vsync: true,
            shadow_resolution: 1024,
            asset_root: PathBuf::from("assets"),
        }
    }
}

/// Everything the renderer reads for one frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    /// Items in draw order; shared by the depth and lit passes.
    pub items: &'a [DrawItem],
    /// Shadow-casting lights.
    pub lights: &'a LightTable,
    /// Camera for the lit pass.
    pub camera: CameraParams,
    /// HUD inputs.
    pub hud: HudState,
}

/// Main renderer owning GPU resources.
pub struct Renderer {
    context: RenderContext,
    models: Vec<GpuModel>,
    objects: ObjectBuffer,
    shadows: ShadowPass,
    lit: LitPass,
    overlay: OverlayPass,
}

impl Renderer {
    /// Create the GPU context, compile every program and upload every model
    /// of `layout`. Any failure here is fatal to the caller.
    pub async fn new(
        window: Arc<Window>,
        config: &RendererConfig,
        layout: &SceneLayout,
    ) -> Result<Self> {
        let context = RenderContext::new(window, config.vsync).await?;
        let device = &context.device;
        let queue = &context.queue;

        let lit_program = ShaderProgram::new(device, "lit.wgsl", shaders::LIT)?;
        let objects = ObjectBuffer::new(device, &lit_program)?;
        let binder = MaterialBinder::new(device, queue, &lit_program)?;
        let shadows = ShadowPass::new(device, &objects, &layout.lights, config.shadow_resolution)?;

        let mut models = Vec::with_capacity(layout.models.len());
        for spec in &layout.models {
            let path = config.asset_root.join(&spec.path);
            let mesh = load_model(&path)
                .with_context(|| format!("Failed to load model '{}'", spec.name))?;
            models.push(GpuModel::upload(device, queue, &spec.name, &mesh, &binder));
        }

        let lit = LitPass::new(
            device,
            lit_program,
            context.config.format,
            context.size,
            &objects,
            binder.layout(),
            &shadows,
        )?;
        let overlay = OverlayPass::new(device, context.config.format)?;

        tracing::info!(
            models = models.len(),
            shadow_program = shadows.program().name(),
            lit_program = lit.program().name(),
            "Renderer ready"
        );

        Ok(Self {
            context,
            models,
            objects,
            shadows,
            lit,
            overlay,
        })
    }

    /// Resize the swapchain and the screen depth buffer.
    pub fn resize(&mut self, new_size: (u32, u32)) {
        if new_size.0 == 0 || new_size.1 == 0 {
            return;
        }
        self.context.resize(new_size);
        self.lit.resize(&self.context.device, new_size);
    }

    /// Current surface size in pixels.
    pub fn size(&self) -> (u32, u32) {
        self.context.size
    }

    /// Render one frame: shadow cubes, lit scene, HUD, present.
    pub fn render(&mut self, frame: &FrameView<'_>) -> Result<()> {
        let output = match self.context.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                tracing::debug!("Surface lost, reconfiguring");
                self.context.reconfigure();
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                tracing::warn!("Surface acquire timed out, skipping frame");
                return Ok(());
            }
            Err(err) => return Err(err).context("Failed to acquire surface texture"),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let device = &self.context.device;
        let queue = &self.context.queue;

        self.objects.write(device, queue, frame.items);
        self.shadows.update(queue, frame.lights);
        self.lit.update(queue, &frame.camera, frame.lights);
        self.overlay.update(queue, self.context.size, frame.hud);

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Frame Encoder"),
        });
        self.shadows
            .encode(&mut encoder, &self.models, &self.objects, frame.items);
        self.lit
            .encode(&mut encoder, &view, &self.models, &self.objects, frame.items);
        self.overlay.encode(&mut encoder, &view);

        queue.submit(Some(encoder.finish()));
        output.present();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_presents_with_vsync() {
        let config = RendererConfig::default();
        assert!(config.vsync);
        assert_eq!(config.shadow_resolution, 1024);
        assert_eq!(config.asset_root, PathBuf::from("assets"));
    }
}
