//! `backdrop` library crate root.
//!
//! This crate renders a decorative animated 3D background: a rotating
//! icosahedron "core" with a wireframe overlay, a tilted halo ring, and a
//! pulsing particle field, all drifting gently behind whatever UI the host
//! application puts in front of it.
//!
//! This crate is intended to be used primarily as a **library**. The binary
//! target stays thin and calls into these exported entrypoints.
//!
//! Public API philosophy (for now):
//! - Keep modules public so downstream apps can assemble their own pipelines.
//! - Provide a stable entrypoint (`run_app`) that runs the default backdrop
//!   and is useful for integration tests / bring-up.
//! - The animation core (`anim::AnimationLoop`) is renderer-agnostic and can be
//!   driven tick-by-tick without a window, which is how the tests exercise it.

pub mod anim;
pub mod render;
pub mod scene;
pub mod theme;

/// Run the winit/wgpu backdrop application with the default theme.
///
/// This is the same entrypoint used by `main.rs`, but exposed from the library
/// so downstream binaries can stay minimal.
///
/// Note: This function does **not** initialize logging; callers can decide
/// their own logging/tracing setup.
pub fn run_app() -> anyhow::Result<()> {
    render::app::run()
}
