//! The animation loop: the one component with a real contract.
//!
//! Once per display refresh the host calls `AnimationLoop::frame()`, which:
//! 1. reads elapsed time `t` from the clock,
//! 2. writes `t` into the particle field's shared time uniform,
//! 3. sets the three mesh rotation angles to fixed angular velocities times
//!    `t` (so they stay pure functions of elapsed time),
//! 4. nudges the camera toward the cursor offset by exponential smoothing and
//!    re-aims it at the origin,
//! 5. lets the orbit rig apply auto-rotation and the polar clamp,
//! 6. asks the render backend to draw the scene,
//! 7. reports `true` so the host re-requests the next frame.
//!
//! Design goals:
//! - No hidden module-level state: the loop owns its scene, clock, cursor and
//!   rig, so multiple independent instances can coexist and tests can build
//!   one around a recording backend.
//! - Deterministic when driven manually: `advance(t, dt)` is the whole update
//!   with time injected, so tests never depend on a real frame timer.
//! - An explicit `running` flag with `start()`/`stop()` instead of a
//!   self-rescheduling callback; the host only re-requests redraws while
//!   `frame()` keeps returning `true`.
//!
//! Concurrency: everything here runs on the host event-loop thread. The cursor
//! offset and viewport size are plain last-write-wins scalars written by event
//! handlers and read by the next tick; nothing blocks or suspends mid-frame.

use std::time::Instant;

use glam::{Vec2, Vec3};

use crate::scene::{PerspectiveCamera, Scene};
use crate::theme::{OrbitConfig, ThemeConfig};

/// Monotonic elapsed-time accumulator for the loop.
///
/// Starts at 0 when the loop starts; never resets or pauses afterwards. Also
/// hands out a per-frame `dt` for the orbit rig, clamped so a background tab
/// or debugger pause cannot inject one huge step.
#[derive(Debug, Clone)]
pub struct Clock {
    start: Instant,
    last: Instant,
    max_dt: f32,
}

impl Clock {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last: now,
            max_dt: 0.1,
        }
    }

    /// Seconds since the clock was (re)started.
    #[inline]
    pub fn elapsed_s(&self) -> f32 {
        self.start.elapsed().as_secs_f32()
    }

    /// Advance and return `dt` in seconds, clamped to `[0, max_dt]`.
    #[inline]
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let dt = (now - self.last).as_secs_f32();
        self.last = now;
        dt.clamp(0.0, self.max_dt)
    }

    /// Restart the clock at zero elapsed time.
    #[inline]
    pub fn restart(&mut self) {
        let now = Instant::now();
        self.start = now;
        self.last = now;
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

/// Tracks the normalized cursor offset the camera drifts toward.
///
/// Raw pointer coordinates are mapped with `(coord / dimension - 0.5) * gain`
/// per axis, putting the offset in roughly `[-gain/2, gain/2]`. The offset is
/// overwritten on every pointer move and consumed (never reset) by the
/// camera-position update.
#[derive(Debug, Copy, Clone)]
pub struct CursorTracker {
    offset: Vec2,
    gain: f32,
}

impl CursorTracker {
    pub fn new(gain: f32) -> Self {
        Self {
            offset: Vec2::ZERO,
            gain,
        }
    }

    /// Record a pointer position in pixels within a `width` x `height` viewport.
    #[inline]
    pub fn pointer_moved(&mut self, px: f32, py: f32, width: f32, height: f32) {
        let w = width.max(1.0);
        let h = height.max(1.0);
        self.offset = Vec2::new((px / w - 0.5) * self.gain, (py / h - 0.5) * self.gain);
    }

    #[inline]
    pub fn offset(&self) -> Vec2 {
        self.offset
    }
}

/// The loop's view of a renderer: something that can track the surface size
/// and turn a scene into pixels, every frame, indefinitely.
pub trait RenderBackend {
    /// Resize the rendering surface to exactly `width` x `height` pixels.
    fn set_size(&mut self, width: u32, height: u32);

    /// Draw the scene with its camera.
    fn draw(&mut self, scene: &Scene) -> anyhow::Result<()>;
}

/// Orbit-style camera control: slow auto-rotation around the vertical axis
/// with damping, and a polar-angle clamp limiting how far the camera may tilt
/// from vertical. Panning and zooming are not modeled at all.
#[derive(Debug, Clone)]
pub struct OrbitRig {
    cfg: OrbitConfig,
    /// Current azimuthal angular rate (rad/s); eased toward the auto-rotation
    /// rate by the damping factor each update.
    azimuth_rate: f32,
}

impl OrbitRig {
    pub fn new(cfg: OrbitConfig) -> Self {
        Self {
            cfg,
            azimuth_rate: 0.0,
        }
    }

    /// Apply one control step after the manual camera reposition.
    pub fn update(&mut self, camera: &mut PerspectiveCamera, dt: f32) {
        // Matches the familiar orbit-controls convention: speed 1.0 is one
        // full orbit in 60 seconds.
        let target_rate = if self.cfg.auto_rotate {
            std::f32::consts::TAU / 60.0 * self.cfg.auto_rotate_speed
        } else {
            0.0
        };
        self.azimuth_rate += (target_rate - self.azimuth_rate) * self.cfg.damping;

        let offset = camera.position - camera.target;
        let radius = offset.length();
        if radius <= f32::EPSILON {
            return;
        }

        let polar = (offset.y / radius).clamp(-1.0, 1.0).acos();
        let clamped_polar = polar.clamp(self.cfg.min_polar, self.cfg.max_polar);

        let delta_azimuth = self.azimuth_rate * dt;

        // Only rebuild the position from spherical coordinates when this step
        // actually changes it; otherwise the round-trip would perturb the
        // damped cursor pursuit by a few ulps every tick.
        if delta_azimuth.abs() <= f32::EPSILON && clamped_polar == polar {
            return;
        }

        let azimuth = offset.x.atan2(offset.z) + delta_azimuth;
        let sin_polar = clamped_polar.sin();

        camera.position = camera.target
            + Vec3::new(
                radius * sin_polar * azimuth.sin(),
                radius * clamped_polar.cos(),
                radius * sin_polar * azimuth.cos(),
            );
    }
}

/// The backdrop animation loop.
///
/// Owns the scene and every piece of ambient state a tick reads, plus the
/// render backend it draws through. Constructed once; runs until the host
/// tears it down or calls `stop()`.
pub struct AnimationLoop<B> {
    scene: Scene,
    theme: ThemeConfig,
    clock: Clock,
    cursor: CursorTracker,
    rig: OrbitRig,
    backend: B,
    running: bool,
}

impl<B: RenderBackend> AnimationLoop<B> {
    /// Build a loop (and its scene) from a theme.
    pub fn new(backend: B, theme: ThemeConfig) -> Self {
        let scene = Scene::build(&theme);
        Self::with_scene(backend, theme, scene)
    }

    /// Build a loop around an existing scene (used by tests with seeded
    /// particle fields).
    pub fn with_scene(backend: B, theme: ThemeConfig, scene: Scene) -> Self {
        let cursor = CursorTracker::new(theme.cursor_gain);
        let rig = OrbitRig::new(theme.orbit);
        Self {
            scene,
            theme,
            clock: Clock::new(),
            cursor,
            rig,
            backend,
            running: false,
        }
    }

    /// Start the loop: elapsed time begins at zero from here.
    pub fn start(&mut self) {
        self.clock.restart();
        self.running = true;
    }

    /// Stop the loop; `frame()` becomes a no-op until `start()` again.
    pub fn stop(&mut self) {
        self.running = false;
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running
    }

    #[inline]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    #[inline]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    #[inline]
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    #[inline]
    pub fn cursor_offset(&self) -> Vec2 {
        self.cursor.offset()
    }

    /// Pointer-move event: update the cursor offset from raw pixel coords.
    #[inline]
    pub fn pointer_moved(&mut self, px: f32, py: f32, width: f32, height: f32) {
        self.cursor.pointer_moved(px, py, width, height);
    }

    /// Viewport-resize event: surface size and camera aspect follow exactly.
    pub fn resized(&mut self, width: u32, height: u32) {
        self.scene.camera.set_viewport_px(width, height);
        self.backend.set_size(width, height);
    }

    /// One host-driven tick: advance by real elapsed time and draw.
    ///
    /// Returns `false` without touching anything when the loop is not
    /// running; the host uses the return value to decide whether to request
    /// another redraw.
    pub fn frame(&mut self) -> anyhow::Result<bool> {
        if !self.running {
            return Ok(false);
        }

        let t = self.clock.elapsed_s();
        let dt = self.clock.tick();
        self.advance(t, dt);
        self.backend.draw(&self.scene)?;

        Ok(true)
    }

    /// The full per-tick update with time injected.
    ///
    /// `t` is total elapsed seconds (drives the pure-function-of-time state);
    /// `dt` is the step since the last tick (drives the stateful integrators:
    /// camera smoothing and the orbit rig).
    pub fn advance(&mut self, t: f32, dt: f32) {
        // 1. Shared particle time uniform.
        self.scene.particles.time = t;

        // 2. Mesh rotations: fixed angular velocity times elapsed time.
        let speeds = self.theme.rotation;
        self.scene.core.rotation.x = speeds.core_x * t;
        self.scene.core.rotation.y = speeds.core_y * t;
        self.scene.wire.rotation.x = speeds.wire_x * t;
        self.scene.wire.rotation.y = speeds.wire_y * t;
        self.scene.halo.rotation.z = speeds.halo_z * t;

        // 3. Damped pursuit of the cursor offset (y inverted), then re-aim at
        //    the origin. Converges asymptotically, never exactly.
        let damping = self.theme.camera_damping;
        let target = Vec2::new(self.cursor.offset().x, -self.cursor.offset().y);
        let camera = &mut self.scene.camera;
        camera.position.x += (target.x - camera.position.x) * damping;
        camera.position.y += (target.y - camera.position.y) * damping;
        camera.look_at(Vec3::ZERO);

        // 4. Orbit rig: auto-rotation + polar clamp.
        self.rig.update(&mut self.scene.camera, dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Scene;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const DT: f32 = 1.0 / 60.0;

    /// A backend that records every call instead of rendering.
    #[derive(Debug, Default)]
    struct RecordingBackend {
        draws: usize,
        sizes: Vec<(u32, u32)>,
    }

    impl RenderBackend for RecordingBackend {
        fn set_size(&mut self, width: u32, height: u32) {
            self.sizes.push((width, height));
        }

        fn draw(&mut self, _scene: &Scene) -> anyhow::Result<()> {
            self.draws += 1;
            Ok(())
        }
    }

    fn test_loop(auto_rotate: bool) -> AnimationLoop<RecordingBackend> {
        let mut theme = ThemeConfig::default();
        theme.orbit.auto_rotate = auto_rotate;
        let scene = Scene::build_with_rng(&theme, &mut StdRng::seed_from_u64(9));
        AnimationLoop::with_scene(RecordingBackend::default(), theme, scene)
    }

    #[test]
    fn rotations_are_pure_functions_of_elapsed_time() {
        let mut a = test_loop(false);
        let mut b = test_loop(false);

        // Different tick histories, same final t.
        for i in 1..=10 {
            a.advance(i as f32 * 0.5, DT);
        }
        b.advance(5.0, DT);

        assert_eq!(a.scene().core.rotation, b.scene().core.rotation);
        assert_eq!(a.scene().wire.rotation, b.scene().wire.rotation);
        assert_eq!(a.scene().halo.rotation.z, b.scene().halo.rotation.z);

        let speeds = ThemeConfig::default().rotation;
        assert!((a.scene().core.rotation.x - speeds.core_x * 5.0).abs() < 1e-6);
        assert!((a.scene().core.rotation.y - speeds.core_y * 5.0).abs() < 1e-6);
        assert!((a.scene().wire.rotation.x - speeds.wire_x * 5.0).abs() < 1e-6);
        assert!((a.scene().wire.rotation.y - speeds.wire_y * 5.0).abs() < 1e-6);
        assert!((a.scene().halo.rotation.z - speeds.halo_z * 5.0).abs() < 1e-6);
    }

    #[test]
    fn particle_time_uniform_follows_elapsed_time() {
        let mut lp = test_loop(false);
        lp.advance(3.25, DT);
        assert_eq!(lp.scene().particles.time, 3.25);
    }

    #[test]
    fn camera_pursuit_is_a_contraction() {
        let mut lp = test_loop(false);

        // Hold the cursor at the right edge, vertical center: offset
        // (0.5 * gain, 0) -> camera target x = 0.09.
        lp.pointer_moved(1000.0, 300.0, 1000.0, 600.0);
        let cx = lp.cursor_offset().x;
        assert!(cx > 0.0);

        let mut err = (lp.scene().camera.position.x - cx).abs();
        let initial_err = err;

        for n in 1..=200u32 {
            lp.advance(n as f32 * DT, DT);
            let next_err = (lp.scene().camera.position.x - cx).abs();

            // Per-tick error shrinks by exactly (1 - damping).
            assert!(next_err <= err * 0.92 + 1e-7, "tick {n}: {next_err} vs {err}");
            assert!(next_err <= initial_err * 0.92f32.powi(n as i32) + 1e-6);
            err = next_err;
        }

        // Asymptotic: close, but never reached exactly from a nonzero start.
        assert!(err < 1e-6);
    }

    #[test]
    fn camera_y_pursues_inverted_cursor() {
        let mut lp = test_loop(false);

        // Cursor at the bottom edge: offset.y = +0.09, camera target y = -0.09.
        lp.pointer_moved(500.0, 600.0, 1000.0, 600.0);
        let cy = -lp.cursor_offset().y;
        assert!(cy < 0.0);

        for n in 1..=400u32 {
            lp.advance(n as f32 * DT, DT);
        }
        assert!((lp.scene().camera.position.y - cy).abs() < 1e-4);
    }

    #[test]
    fn pointer_mapping_matches_normalized_formula() {
        let gain = ThemeConfig::default().cursor_gain;
        let (w, h) = (1280.0, 800.0);
        let mut cursor = CursorTracker::new(gain);

        // Left edge.
        cursor.pointer_moved(0.0, 400.0, w, h);
        assert!((cursor.offset().x - (0.0 / w - 0.5) * gain).abs() < 1e-7);
        assert!((cursor.offset().x + 0.5 * gain).abs() < 1e-7);

        // Exact center maps to zero.
        cursor.pointer_moved(w / 2.0, h / 2.0, w, h);
        assert_eq!(cursor.offset(), Vec2::ZERO);

        // Right edge.
        cursor.pointer_moved(w, 400.0, w, h);
        assert!((cursor.offset().x - 0.5 * gain).abs() < 1e-7);

        // y keeps its raw sign here; the inversion happens in the camera target.
        cursor.pointer_moved(640.0, h, w, h);
        assert!((cursor.offset().y - 0.5 * gain).abs() < 1e-7);
    }

    #[test]
    fn resize_propagates_exact_size_and_aspect() {
        let mut lp = test_loop(true);

        lp.resized(1920, 1080);
        assert_eq!(lp.backend().sizes.last(), Some(&(1920, 1080)));
        assert_eq!(lp.scene().camera.aspect, 1920.0 / 1080.0);

        lp.resized(777, 333);
        assert_eq!(lp.backend().sizes.last(), Some(&(777, 333)));
        assert_eq!(lp.scene().camera.aspect, 777.0 / 333.0);
    }

    #[test]
    fn frame_is_a_no_op_until_started() {
        let mut lp = test_loop(true);

        for _ in 0..5 {
            assert!(!lp.frame().unwrap());
        }
        assert_eq!(lp.backend().draws, 0);
        // Nothing was animated either.
        assert_eq!(lp.scene().core.rotation, Vec3::ZERO);
    }

    #[test]
    fn stop_halts_drawing() {
        let mut lp = test_loop(true);

        lp.start();
        assert!(lp.frame().unwrap());
        assert!(lp.frame().unwrap());
        assert_eq!(lp.backend().draws, 2);

        lp.stop();
        assert!(!lp.frame().unwrap());
        assert_eq!(lp.backend().draws, 2);
    }

    #[test]
    fn orbit_rig_clamps_polar_angle() {
        let cfg = OrbitConfig::default();
        let mut rig = OrbitRig::new(cfg);
        let mut camera = crate::scene::PerspectiveCamera::new(42.0, 1.0, 0.1, 100.0);

        // Nearly straight above the target: well past the minimum polar angle.
        camera.position = Vec3::new(0.0, 6.0, 0.5);
        camera.look_at(Vec3::ZERO);
        rig.update(&mut camera, DT);

        let offset = camera.position - camera.target;
        let polar = (offset.y / offset.length()).clamp(-1.0, 1.0).acos();
        assert!(polar >= cfg.min_polar - 1e-5);
        assert!(polar <= cfg.max_polar + 1e-5);
        // Radius is preserved by the clamp.
        assert!((offset.length() - 36.25f32.sqrt()).abs() < 1e-4);
    }

    #[test]
    fn orbit_auto_rotation_swings_the_camera_around() {
        let mut lp = test_loop(true);

        // Long enough for the damped rate to come up to speed. The cursor
        // pursuit also decays y toward 0 over this window, so the orbit
        // radius settles at the camera's z offset.
        for n in 1..=600u32 {
            lp.advance(n as f32 * DT, DT);
        }

        let pos = lp.scene().camera.position;
        assert!((pos.length() - 6.5).abs() < 0.1);
        // The camera has swung off its initial azimuth.
        assert!(pos.x.abs() > 0.01);
    }

    #[test]
    fn end_to_end_ten_seconds_of_frames() {
        let mut lp = test_loop(false);
        lp.start();

        // Drive 600 simulated frames to t = 10 with the cursor at rest.
        let frames = 600u32;
        for n in 1..=frames {
            let t = n as f32 * (10.0 / frames as f32);
            lp.advance(t, DT);
            lp.backend_mut().draws += 1;
        }

        let speeds = ThemeConfig::default().rotation;
        let scene = lp.scene();
        assert!((scene.core.rotation.x - speeds.core_x * 10.0).abs() < 1e-5);
        assert!((scene.wire.rotation.y - speeds.wire_y * 10.0).abs() < 1e-5);

        // With the cursor at (0,0) the camera position decays to the origin
        // in x/y; z is untouched by the pursuit.
        assert!(scene.camera.position.x.abs() < 1e-6);
        assert!(scene.camera.position.y.abs() < 1e-6);
        assert!((scene.camera.position.z - 6.5).abs() < 1e-4);

        assert_eq!(lp.backend().draws, frames as usize);
    }
}
