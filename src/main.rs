//! Thin binary wrapper for local development.
//!
//! Project direction: `backdrop` is primarily a **library**.
//! This binary exists only to preserve the convenience of `cargo run`.
//!
//! Default behavior:
//! - Run the default backdrop scene (blue core, amber particles) fullscreen in
//!   a window, auto-rotating until closed.
//!
//! Run:
//! - `cargo run`

fn main() -> anyhow::Result<()> {
    // Keep logging setup in the binary so the library remains unopinionated.
    env_logger::init();

    backdrop::render::app::run_with_config(
        backdrop::render::app::AppConfig {
            title: "backdrop".to_string(),
            ..Default::default()
        },
        backdrop::theme::ThemeConfig::default(),
    )
}
