//! App entrypoint for the rendering layer.
//!
//! This module owns:
//! - the winit application lifecycle + event loop
//! - creating the window
//! - wiring host events into the animation loop
//!
//! Event wiring (the loop's whole inbound surface):
//! - `RedrawRequested` is the frame scheduler: it runs one `frame()` and
//!   re-requests a redraw while the loop keeps running, which is what makes
//!   the animation self-perpetuating.
//! - `Resized` feeds the surface size and camera aspect.
//! - `CursorMoved` feeds the normalized cursor offset.
//!
//! Startup guard:
//! - If the GPU context cannot be created (no adapter, no surface), the
//!   backdrop is simply skipped: no scene is built, no loop starts, and the
//!   window keeps running as an empty shell. A missing decorative background
//!   must never take the host down.

use log::{info, warn};
use std::sync::Arc;

use anyhow::Context as _;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowAttributes, WindowId},
};

use crate::anim::AnimationLoop;
use crate::render::scene_renderer::SceneRenderer;
use crate::theme::ThemeConfig;

/// App-facing configuration for running the winit event loop.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Window title.
    pub title: String,
    /// ControlFlow for the event loop. Default is `Poll`.
    pub control_flow: ControlFlow,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "backdrop".to_string(),
            control_flow: ControlFlow::Poll,
        }
    }
}

/// Run the winit event loop with the default configuration and theme.
pub fn run() -> anyhow::Result<()> {
    run_with_config(AppConfig::default(), ThemeConfig::default())
}

/// Run the winit event loop with an explicit configuration and theme.
pub fn run_with_config(config: AppConfig, theme: ThemeConfig) -> anyhow::Result<()> {
    let event_loop = EventLoop::new().context("winit: failed to create EventLoop")?;
    event_loop.set_control_flow(config.control_flow);

    let mut app = App {
        config,
        theme,
        window: None,
        backdrop: None,
    };
    event_loop
        .run_app(&mut app)
        .context("winit: run_app failed")?;

    Ok(())
}

/// Application state used by winit.
struct App {
    config: AppConfig,
    theme: ThemeConfig,
    window: Option<Arc<Window>>,
    /// `None` either before `resumed` or when the startup guard tripped.
    backdrop: Option<AnimationLoop<SceneRenderer>>,
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window = Arc::new(
            event_loop
                .create_window(WindowAttributes::default().with_title(self.config.title.as_str()))
                .expect("winit: failed to create window"),
        );

        // Startup guard: probe the one precondition that can fail before
        // building anything. On failure nothing else is constructed and no
        // frame is ever scheduled.
        match pollster::block_on(SceneRenderer::new(window.clone())) {
            Ok(renderer) => {
                let size = window.inner_size();
                let mut backdrop = AnimationLoop::new(renderer, self.theme.clone());
                backdrop.resized(size.width, size.height);
                backdrop.start();
                self.backdrop = Some(backdrop);
                window.request_redraw();
            }
            Err(err) => {
                warn!("backdrop disabled, rendering surface unavailable: {err:#}");
            }
        }

        self.window = Some(window);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested; exiting");
                if let Some(backdrop) = self.backdrop.as_mut() {
                    backdrop.stop();
                }
                self.backdrop = None;
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                if let Some(backdrop) = self.backdrop.as_mut() {
                    backdrop.resized(size.width, size.height);
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                if let (Some(backdrop), Some(window)) = (self.backdrop.as_mut(), &self.window) {
                    let size = window.inner_size();
                    backdrop.pointer_moved(
                        position.x as f32,
                        position.y as f32,
                        size.width as f32,
                        size.height as f32,
                    );
                }
            }

            WindowEvent::RedrawRequested => {
                let Some(backdrop) = self.backdrop.as_mut() else {
                    return;
                };

                match backdrop.frame() {
                    // Still running: keep the loop alive by re-requesting.
                    Ok(true) => {
                        if let Some(window) = &self.window {
                            window.request_redraw();
                        }
                    }
                    Ok(false) => {}
                    Err(err) => {
                        // Unrecoverable render failure: park the loop but
                        // leave the window itself alive.
                        warn!("backdrop stopped after render error: {err:#}");
                        backdrop.stop();
                    }
                }
            }

            _ => {}
        }
    }
}
