//! Theme configuration for the backdrop.
//!
//! Everything tunable about the backdrop lives here as one value object:
//! colors, opacities, rotation speeds, cursor gain, camera damping, orbit
//! behavior. A `ThemeConfig` is supplied once at construction and never
//! mutated afterwards, so two backdrops with different palettes are just two
//! `AnimationLoop` instances built from two configs.
//!
//! Notes:
//! - Rotation speeds are angular velocities in rad/s; every animated angle is
//!   `speed * elapsed_seconds`, a deterministic function of elapsed time.
//! - `cursor_gain` scales the normalized pointer position into the small
//!   offset range the camera drifts toward (roughly [-0.09, 0.09]).

use crate::scene::Rgba;

/// Per-mesh rotation speeds, in radians per second of elapsed time.
#[derive(Debug, Copy, Clone)]
pub struct RotationSpeeds {
    pub core_x: f32,
    pub core_y: f32,
    pub wire_x: f32,
    pub wire_y: f32,
    pub halo_z: f32,
}

impl Default for RotationSpeeds {
    fn default() -> Self {
        Self {
            core_x: 0.15,
            core_y: 0.25,
            wire_x: -0.10,
            wire_y: 0.20,
            halo_z: 0.05,
        }
    }
}

/// Orbit-rig behavior knobs (auto-rotation around the scene, tilt clamp).
#[derive(Debug, Copy, Clone)]
pub struct OrbitConfig {
    /// Auto-rotate the camera around the vertical axis.
    pub auto_rotate: bool,
    /// Auto-rotation speed; 1.0 is one full orbit per 60 seconds.
    pub auto_rotate_speed: f32,
    /// Per-second decay factor applied to residual orbit velocity.
    pub damping: f32,
    /// Minimum polar angle (radians from vertical) the camera may tilt to.
    pub min_polar: f32,
    /// Maximum polar angle (radians from vertical) the camera may tilt to.
    pub max_polar: f32,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            auto_rotate: true,
            auto_rotate_speed: 0.6,
            damping: 0.05,
            min_polar: std::f32::consts::PI / 3.0,
            max_polar: std::f32::consts::PI / 1.8,
        }
    }
}

/// The full backdrop theme: palette + motion parameters.
///
/// The default is the "daylight blue" look: white core with a blue emissive
/// glow, blue wireframe and halo, amber particles, pale blue fog.
#[derive(Debug, Clone)]
pub struct ThemeConfig {
    pub fog_color: Rgba,
    pub fog_density: f32,

    pub halo_color: Rgba,
    pub halo_opacity: f32,

    pub core_color: Rgba,
    pub core_emissive: Rgba,
    pub core_emissive_intensity: f32,
    pub core_opacity: f32,

    pub wire_color: Rgba,
    pub wire_opacity: f32,

    pub particle_color: Rgba,
    pub particle_count: usize,

    pub rotation: RotationSpeeds,
    pub orbit: OrbitConfig,

    /// Scales normalized pointer position into the cursor-offset range.
    pub cursor_gain: f32,
    /// Fraction of the remaining error the camera closes per tick.
    pub camera_damping: f32,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            fog_color: Rgba::from_hex(0xe5eeff),
            fog_density: 0.018,

            halo_color: Rgba::from_hex(0x0c74ff),
            halo_opacity: 0.2,

            core_color: Rgba::from_hex(0xffffff),
            core_emissive: Rgba::from_hex(0x0057d9),
            core_emissive_intensity: 0.45,
            core_opacity: 0.92,

            wire_color: Rgba::from_hex(0x0057d9),
            wire_opacity: 0.35,

            particle_color: Rgba::from_hex(0xffd43b),
            particle_count: 880,

            rotation: RotationSpeeds::default(),
            orbit: OrbitConfig::default(),

            cursor_gain: 0.18,
            camera_damping: 0.08,
        }
    }
}
