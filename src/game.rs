//! The running gallery: window, renderer and the per-frame update.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use gallery_camera::Projection;
use gallery_core::{DrawList, InteractionEvent, SceneLayout, SceneSettings, SceneState};
use gallery_input::InputState;
use gallery_render::{
    CameraParams, FrameView, HudState, Renderer, RendererConfig, WindowConfig, WindowManager,
};
use tracing::{debug, info, warn};
use winit::event::{Event, WindowEvent};
use winit::event_loop::EventLoopWindowTarget;
use winit::window::Window;

use crate::config::GalleryConfig;
use crate::input::InputProcessor;

/// Game action to communicate with the event loop.
pub enum GameAction {
    /// Keep running.
    Continue,
    /// Quit application.
    Quit,
}

pub struct GameWorld {
    window: Arc<Window>,
    renderer: Renderer,
    input: InputState,
    processor: InputProcessor,
    layout: SceneLayout,
    state: SceneState,
    settings: SceneSettings,
    projection: Projection,
    last_frame: Instant,
}

impl GameWorld {
    /// Open the window, load every model and place the player at the spawn point.
    pub fn new(event_loop: &EventLoopWindowTarget<()>, config: &GalleryConfig) -> Result<Self> {
        info!("Initializing gallery...");

        let window_config = WindowConfig {
            width: config.window_width,
            height: config.window_height,
            ..WindowConfig::default()
        };
        let window = WindowManager::new_with_event_loop(window_config, event_loop)?.into_window();

        let mut layout = SceneLayout::gallery();
        layout.lights.set_far_plane(config.shadow_far_plane);

        let renderer_config = RendererConfig {
            vsync: config.vsync,
            shadow_resolution: config.shadow_resolution,
            asset_root: config.asset_root.clone(),
        };
        let renderer = pollster::block_on(Renderer::new(window.clone(), &renderer_config, &layout))?;

        let (width, height) = renderer.size();
        let mut projection = Projection {
            fov_degrees: config.fov_degrees,
            ..Projection::default()
        };
        projection.set_aspect(width, height);

        let mut input = InputState::new();
        input.set_cursor_capture(&window, true)?;

        let state = SceneState::new(layout.spawn);
        info!(
            props = layout.props.len(),
            interactables = layout.interactables.len(),
            "Gallery ready"
        );

        Ok(Self {
            window,
            renderer,
            input,
            processor: InputProcessor::new(&config.bindings),
            layout,
            state,
            settings: config.scene_settings(),
            projection,
            last_frame: Instant::now(),
        })
    }

    /// Handle an event
    pub fn handle_event(
        &mut self,
        event: &Event<()>,
        _elwt: &EventLoopWindowTarget<()>,
    ) -> GameAction {
        match event {
            Event::WindowEvent { event, window_id } if *window_id == self.window.id() => {
                self.input.handle_event(event);
                match event {
                    WindowEvent::CloseRequested => return GameAction::Quit,
                    WindowEvent::Resized(new_size) => {
                        self.renderer.resize((new_size.width, new_size.height));
                        self.projection.set_aspect(new_size.width, new_size.height);
                    }
                    WindowEvent::Focused(true) => {
                        if let Err(err) = self.input.handle_focus_regained(&self.window) {
                            warn!("Failed to recapture cursor: {err}");
                        }
                    }
                    WindowEvent::RedrawRequested => return self.update_and_render(),
                    _ => {}
                }
            }
            Event::DeviceEvent { event, .. } => {
                self.input.handle_device_event(event);
            }
            Event::AboutToWait => {
                self.window.request_redraw();
            }
            _ => {}
        }

        GameAction::Continue
    }

    fn update_and_render(&mut self) -> GameAction {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;

        let actions = self.processor.process(&self.input.snapshot());
        if actions.quit {
            return GameAction::Quit;
        }
        if actions.toggle_cursor {
            if let Err(err) = self.input.toggle_cursor_grab(&self.window) {
                warn!("Failed to toggle cursor grab: {err}");
            }
        }

        let report = self
            .state
            .update(&self.layout, &self.settings, &actions.frame, dt);
        if let Some(outcome) = report.movement {
            debug!(?outcome, "Moved");
        }
        for event in &report.events {
            log_interaction(event);
        }

        let draw_list = DrawList::build(&self.layout, &self.state);
        let frame = FrameView {
            items: draw_list.items(),
            lights: &self.layout.lights,
            camera: CameraParams {
                view_proj: self.projection.view_projection(&self.state.pose),
                position: self.state.pose.position,
            },
            hud: HudState {
                focused: self.state.focused.is_some(),
                intoxication_level: self.state.interaction.intoxication_level(),
            },
        };
        if let Err(err) = self.renderer.render(&frame) {
            tracing::error!("Render error: {err:#}");
        }

        GameAction::Continue
    }
}

fn log_interaction(event: &InteractionEvent) {
    match event {
        InteractionEvent::PickedUp(index) => info!(index, "Picked up bottle"),
        InteractionEvent::Dropped(index) => info!(index, "Put bottle back"),
        InteractionEvent::ConsumeStarted(index) => info!(index, "Drinking"),
        InteractionEvent::Consumed { index, level } => {
            info!(index, level, "Finished drinking")
        }
        InteractionEvent::Sobered => info!("Sobered up"),
    }
}
