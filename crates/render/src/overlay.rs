//! HUD drawn over the lit image: crosshair and intoxication blackout.

use anyhow::Result;

use crate::program::ShaderProgram;
use crate::shaders;

/// Crosshair arm length from the center, in pixels.
pub const CROSSHAIR_HALF_LENGTH: f32 = 5.0;
/// Arm length multiplier while something is focused.
pub const FOCUSED_SCALE: f32 = 1.5;
/// Crosshair stroke width, in pixels.
pub const CROSSHAIR_THICKNESS: f32 = 2.0;
/// Crosshair color with nothing in focus.
pub const IDLE_COLOR: [f32; 4] = [0.0, 1.0, 0.0, 1.0];
/// Crosshair color while an interactable is focused.
pub const FOCUSED_COLOR: [f32; 4] = [1.0, 1.0, 0.0, 1.0];
/// Intoxication level at which the screen is darkened.
pub const BLACKOUT_LEVEL: u8 = 4;
/// Opacity of the blackout quad.
pub const BLACKOUT_ALPHA: f32 = 0.7;

const MAX_VERTICES: usize = 18;

/// What the HUD needs to know about the frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HudState {
    /// An interactable is under the crosshair.
    pub focused: bool,
    /// Current intoxication level.
    pub intoxication_level: u8,
}

/// Clip-space vertex with a flat color.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct OverlayVertex {
    /// Clip-space position.
    pub position: [f32; 2],
    /// Straight-alpha RGBA.
    pub color: [f32; 4],
}

const OVERLAY_VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 2] = [
    wgpu::VertexAttribute {
        offset: 0,
        shader_location: 0,
        format: wgpu::VertexFormat::Float32x2,
    },
    wgpu::VertexAttribute {
        offset: 8,
        shader_location: 1,
        format: wgpu::VertexFormat::Float32x4,
    },
];

/// Triangles for the HUD of a `size` pixel framebuffer.
///
/// The crosshair comes first; the blackout quad, when active, is appended so
/// it darkens the crosshair as well.
pub fn overlay_vertices(size: (u32, u32), hud: HudState) -> Vec<OverlayVertex> {
    let width = size.0.max(1) as f32;
    let height = size.1.max(1) as f32;
    // Pixel extents to clip-space extents.
    let sx = 2.0 / width;
    let sy = 2.0 / height;

    let (scale, color) = if hud.focused {
        (FOCUSED_SCALE, FOCUSED_COLOR)
    } else {
        (1.0, IDLE_COLOR)
    };
    let arm = CROSSHAIR_HALF_LENGTH * scale;
    let half_thickness = CROSSHAIR_THICKNESS * 0.5;

    let mut vertices = Vec::with_capacity(MAX_VERTICES);
    push_rect(&mut vertices, arm * sx, half_thickness * sy, color);
    push_rect(&mut vertices, half_thickness * sx, arm * sy, color);

    if hud.intoxication_level >= BLACKOUT_LEVEL {
        push_rect(&mut vertices, 1.0, 1.0, [0.0, 0.0, 0.0, BLACKOUT_ALPHA]);
    }
    vertices
}

/// Centered rectangle with clip-space half extents.
fn push_rect(out: &mut Vec<OverlayVertex>, half_width: f32, half_height: f32, color: [f32; 4]) {
    let corner = |x: f32, y: f32| OverlayVertex {
        position: [x * half_width, y * half_height],
        color,
    };
    out.extend_from_slice(&[
        corner(-1.0, -1.0),
        corner(1.0, -1.0),
        corner(1.0, 1.0),
        corner(-1.0, -1.0),
        corner(1.0, 1.0),
        corner(-1.0, 1.0),
    ]);
}

/// Alpha-blended pipeline plus a small dynamic vertex buffer.
pub struct OverlayPass {
    pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    vertex_count: u32,
}

impl OverlayPass {
    /// Build the overlay program and pipeline.
    pub fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat) -> Result<Self> {
        let program = ShaderProgram::new(device, "overlay.wgsl", shaders::OVERLAY)?;

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Overlay Pipeline Layout"),
            bind_group_layouts: &[],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Overlay Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: program.module(),
                entry_point: "vs_main",
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<OverlayVertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &OVERLAY_VERTEX_ATTRIBUTES,
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: program.module(),
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        let vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Overlay Vertex Buffer"),
            size: (MAX_VERTICES * std::mem::size_of::<OverlayVertex>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Ok(Self {
            pipeline,
            vertex_buffer,
            vertex_count: 0,
        })
    }

    /// Rebuild the HUD geometry for this frame.
    pub fn update(&mut self, queue: &wgpu::Queue, size: (u32, u32), hud: HudState) {
        let vertices = overlay_vertices(size, hud);
        let count = vertices.len().min(MAX_VERTICES);
        queue.write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&vertices[..count]));
        self.vertex_count = count as u32;
    }

    /// Draw over `target`, keeping its contents.
    pub fn encode(&self, encoder: &mut wgpu::CommandEncoder, target: &wgpu::TextureView) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Overlay Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            ..Default::default()
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.draw(0..self.vertex_count, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extent(vertices: &[OverlayVertex]) -> (f32, f32) {
        vertices.iter().fold((0.0f32, 0.0f32), |(x, y), v| {
            (x.max(v.position[0].abs()), y.max(v.position[1].abs()))
        })
    }

    #[test]
    fn idle_crosshair_is_green_and_small() {
        let vertices = overlay_vertices((800, 600), HudState::default());
        assert_eq!(vertices.len(), 12);
        assert!(vertices.iter().all(|v| v.color == IDLE_COLOR));
        let (x, y) = extent(&vertices);
        assert!((x - 5.0 * 2.0 / 800.0).abs() < 1e-6);
        assert!((y - 5.0 * 2.0 / 600.0).abs() < 1e-6);
    }

    #[test]
    fn focused_crosshair_is_yellow_and_larger() {
        let hud = HudState {
            focused: true,
            intoxication_level: 0,
        };
        let vertices = overlay_vertices((800, 600), hud);
        assert!(vertices.iter().all(|v| v.color == FOCUSED_COLOR));
        let (x, _) = extent(&vertices);
        assert!((x - 7.5 * 2.0 / 800.0).abs() < 1e-6);
    }

    #[test]
    fn blackout_only_at_full_intoxication() {
        let at = |level| {
            overlay_vertices(
                (800, 600),
                HudState {
                    focused: false,
                    intoxication_level: level,
                },
            )
        };
        assert_eq!(at(3).len(), 12);

        let vertices = at(4);
        assert_eq!(vertices.len(), MAX_VERTICES);
        let blackout = &vertices[12..];
        assert!(blackout.iter().all(|v| v.color == [0.0, 0.0, 0.0, BLACKOUT_ALPHA]));
        assert_eq!(extent(blackout), (1.0, 1.0));
    }
}
