//! Window creation with winit.

use std::sync::Arc;

use anyhow::{Context, Result};
use winit::{
    event_loop::EventLoopWindowTarget,
    window::{Window, WindowBuilder},
};

/// Window configuration.
#[derive(Debug, Clone)]
pub struct WindowConfig {
    /// Window title
    pub title: String,
    /// Initial width
    pub width: u32,
    /// Initial height
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Spirits Gallery".to_string(),
            width: 800,
            height: 600,
        }
    }
}

/// Window manager wrapping winit.
pub struct WindowManager {
    window: Arc<Window>,
}

impl WindowManager {
    /// Create a window on a running event loop.
    pub fn new_with_event_loop(
        config: WindowConfig,
        event_loop: &EventLoopWindowTarget<()>,
    ) -> Result<Self> {
        let window = WindowBuilder::new()
            .with_title(config.title)
            .with_inner_size(winit::dpi::PhysicalSize::new(config.width, config.height))
            .build(event_loop)
            .context("Failed to create window")?;

        Ok(Self {
            window: Arc::new(window),
        })
    }

    /// Convert into just the window (consuming self).
    pub fn into_window(self) -> Arc<Window> {
        self.window
    }
}
