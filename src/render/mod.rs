//! Rendering module root.
//!
//! The `render` module owns the window/event-loop integration and the wgpu
//! renderer. Everything above it (`scene`, `anim`) is renderer-agnostic; this
//! is the only module that talks to wgpu or winit.
//!
//! Current entrypoint: `render::app::run()`.

pub mod app;

/// Common GPU context shared across render submodules.
pub mod gpu;

/// The wgpu scene renderer behind the animation loop's `RenderBackend`.
pub mod scene_renderer;
