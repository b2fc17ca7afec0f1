//! Scene graph abstractions.
//!
//! The backdrop scene is deliberately small and fixed: a perspective camera,
//! three lights, three decorative meshes (halo ring, solid icosahedron core,
//! transparent wireframe overlay) and one particle field. Everything is
//! constructed once from a `ThemeConfig` and lives for the process lifetime;
//! nodes are never resized or reparented after setup.
//!
//! Design goals:
//! - Keep the scene renderer-agnostic: this module does not depend on wgpu.
//!   Renderers consume positions/rotations/material parameters directly.
//! - Transforms stay explicit: a node is a position plus Euler angles, and the
//!   renderer composes matrices from them each frame. No hidden matrix caches.
//! - The only per-frame mutation is a handful of rotation scalars, the camera
//!   position, and the particle field's shared time uniform.

use glam::{Mat4, Vec3};

use crate::theme::ThemeConfig;

pub mod geometry;
pub mod particles;

pub use particles::ParticleField;

/// Simple RGBA color (linear-ish; the renderer treats the surface as sRGB).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const WHITE: Self = Self {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };

    /// Build an opaque color from a packed `0xRRGGBB` value.
    #[inline]
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as f32 / 255.0,
            g: ((hex >> 8) & 0xff) as f32 / 255.0,
            b: (hex & 0xff) as f32 / 255.0,
            a: 1.0,
        }
    }

    #[inline]
    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Exponential-squared distance fog.
///
/// The fog factor at view depth `d` is `exp(-(density * d)^2)`.
#[derive(Debug, Copy, Clone)]
pub struct Fog {
    pub color: Rgba,
    pub density: f32,
}

/// Material parameters, fixed at construction.
///
/// This is the union of what the three decorative meshes need; the renderer
/// picks a pipeline per node (lit for the core, unlit for halo/wireframe), so
/// unused fields are simply ignored there.
#[derive(Debug, Copy, Clone)]
pub struct Material {
    pub color: Rgba,
    pub opacity: f32,
    pub emissive: Rgba,
    pub emissive_intensity: f32,
}

impl Material {
    /// An unlit material: flat color at the given opacity.
    #[inline]
    pub fn unlit(color: Rgba, opacity: f32) -> Self {
        Self {
            color,
            opacity,
            emissive: Rgba {
                r: 0.0,
                g: 0.0,
                b: 0.0,
                a: 1.0,
            },
            emissive_intensity: 0.0,
        }
    }
}

/// A CPU-side triangle mesh with per-vertex normals.
///
/// Kept as owned CPU data; the renderer uploads it once at startup and never
/// touches it again (all animation happens through node transforms and shader
/// uniforms, not geometry rewrites).
#[derive(Debug, Clone, Default)]
pub struct Mesh3D {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u16>,
}

impl Mesh3D {
    /// Derive the unique-edge line list for wireframe rendering.
    ///
    /// Each undirected triangle edge appears exactly once in the output, as a
    /// pair of vertex indices suitable for a line-list topology.
    pub fn edge_lines(&self) -> Vec<u16> {
        let mut seen = std::collections::BTreeSet::new();
        let mut lines = Vec::new();

        for tri in self.indices.chunks_exact(3) {
            for &(a, b) in &[(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                let key = (a.min(b), a.max(b));
                if seen.insert(key) {
                    lines.push(key.0);
                    lines.push(key.1);
                }
            }
        }

        lines
    }
}

/// A positioned, rotatable mesh in the scene.
///
/// Rotation is stored as Euler angles (XYZ order, radians). The animation loop
/// overwrites individual angles each tick; it never accumulates into matrices,
/// so the angles remain pure functions of elapsed time.
#[derive(Debug, Clone)]
pub struct MeshNode {
    pub mesh: Mesh3D,
    pub material: Material,
    pub position: Vec3,
    pub rotation: Vec3,
}

impl MeshNode {
    #[inline]
    pub fn new(mesh: Mesh3D, material: Material) -> Self {
        Self {
            mesh,
            material,
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
        }
    }

    /// Model matrix: translation composed with XYZ Euler rotation.
    #[inline]
    pub fn model(&self) -> Mat4 {
        Mat4::from_translation(self.position)
            * Mat4::from_euler(
                glam::EulerRot::XYZ,
                self.rotation.x,
                self.rotation.y,
                self.rotation.z,
            )
    }
}

/// An ambient light that fills shadowed areas uniformly.
#[derive(Debug, Copy, Clone)]
pub struct AmbientLight {
    pub color: Rgba,
    pub intensity: f32,
}

/// A point light with distance falloff.
///
/// Attenuation follows the usual range/decay model: contribution fades to zero
/// at `range`, with `decay` shaping the falloff curve.
#[derive(Debug, Copy, Clone)]
pub struct PointLight {
    pub color: Rgba,
    pub intensity: f32,
    pub position: Vec3,
    pub range: f32,
    pub decay: f32,
}

/// A perspective camera aimed at a target point.
#[derive(Debug, Copy, Clone)]
pub struct PerspectiveCamera {
    pub fov_y_deg: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub target: Vec3,
}

impl PerspectiveCamera {
    pub fn new(fov_y_deg: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            fov_y_deg,
            aspect,
            near,
            far,
            position: Vec3::Z,
            target: Vec3::ZERO,
        }
    }

    /// Set the viewport size in pixels to update the aspect ratio.
    #[inline]
    pub fn set_viewport_px(&mut self, width: u32, height: u32) {
        let w = width.max(1) as f32;
        let h = height.max(1) as f32;
        self.aspect = w / h;
    }

    /// Aim the camera at a world point.
    #[inline]
    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
    }

    #[inline]
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    #[inline]
    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y_deg.to_radians(), self.aspect, self.near, self.far)
    }
}

/// The complete backdrop scene.
///
/// Field names mirror the visual roles: `core` is the solid icosahedron,
/// `wire` its transparent wireframe overlay, `halo` the tilted ring.
#[derive(Debug, Clone)]
pub struct Scene {
    pub fog: Fog,
    pub camera: PerspectiveCamera,

    pub ambient: AmbientLight,
    pub key_light: PointLight,
    pub fill_light: PointLight,

    pub halo: MeshNode,
    pub core: MeshNode,
    pub wire: MeshNode,
    pub particles: ParticleField,
}

impl Scene {
    /// Build the scene from a theme, sampling the particle field from the
    /// thread RNG. Use `build_with_rng` for reproducible fields.
    pub fn build(theme: &ThemeConfig) -> Self {
        Self::build_with_rng(theme, &mut rand::thread_rng())
    }

    /// Build the scene from a theme with an explicit RNG for the particle
    /// field (positions and size factors are the only random inputs).
    pub fn build_with_rng<R: rand::Rng>(theme: &ThemeConfig, rng: &mut R) -> Self {
        let mut camera = PerspectiveCamera::new(42.0, 1.0, 0.1, 100.0);
        camera.position = Vec3::new(0.0, 0.4, 6.5);
        camera.look_at(Vec3::ZERO);

        let mut halo = MeshNode::new(
            geometry::ring(3.1, 3.6, 80),
            Material::unlit(theme.halo_color, theme.halo_opacity),
        );
        // Static tilt so the ring reads as a halo rather than a flat disc.
        halo.rotation.x = std::f32::consts::PI / 2.15;

        let core = MeshNode::new(
            geometry::icosahedron(1.6, 1),
            Material {
                color: theme.core_color,
                opacity: theme.core_opacity,
                emissive: theme.core_emissive,
                emissive_intensity: theme.core_emissive_intensity,
            },
        );

        let wire = MeshNode::new(
            geometry::icosahedron(1.8, 2),
            Material::unlit(theme.wire_color, theme.wire_opacity),
        );

        Self {
            fog: Fog {
                color: theme.fog_color,
                density: theme.fog_density,
            },
            camera,
            ambient: AmbientLight {
                color: Rgba::from_hex(0xf7f9fc),
                intensity: 0.9,
            },
            key_light: PointLight {
                color: Rgba::from_hex(0x0057d9),
                intensity: 2.8,
                position: Vec3::new(4.0, 5.0, 4.0),
                range: 40.0,
                decay: 1.6,
            },
            fill_light: PointLight {
                color: Rgba::from_hex(0xffd43b),
                intensity: 1.8,
                position: Vec3::new(-5.0, -3.0, -4.0),
                range: 40.0,
                decay: 2.4,
            },
            halo,
            core,
            wire,
            particles: ParticleField::sample(theme.particle_count, theme.particle_color, rng),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_hex_unpacks_channels() {
        let c = Rgba::from_hex(0x0057d9);
        assert!((c.r - 0.0).abs() < 1e-6);
        assert!((c.g - 87.0 / 255.0).abs() < 1e-6);
        assert!((c.b - 217.0 / 255.0).abs() < 1e-6);
        assert!((c.a - 1.0).abs() < 1e-6);
    }

    #[test]
    fn viewport_sets_exact_aspect() {
        let mut cam = PerspectiveCamera::new(42.0, 1.0, 0.1, 100.0);
        cam.set_viewport_px(1920, 1080);
        assert_eq!(cam.aspect, 1920.0 / 1080.0);

        cam.set_viewport_px(333, 777);
        assert_eq!(cam.aspect, 333.0 / 777.0);
    }

    #[test]
    fn viewport_tolerates_zero_dimensions() {
        let mut cam = PerspectiveCamera::new(42.0, 1.0, 0.1, 100.0);
        cam.set_viewport_px(0, 0);
        assert!(cam.aspect.is_finite());
        assert!(cam.projection().is_finite());
    }

    #[test]
    fn edge_lines_are_unique() {
        // A quad from two triangles shares one diagonal; 5 unique edges.
        let mesh = Mesh3D {
            positions: vec![[0.0; 3]; 4],
            normals: vec![[0.0, 0.0, 1.0]; 4],
            indices: vec![0, 1, 2, 0, 2, 3],
        };
        let lines = mesh.edge_lines();
        assert_eq!(lines.len(), 10);

        let mut pairs: Vec<(u16, u16)> = lines.chunks_exact(2).map(|p| (p[0], p[1])).collect();
        pairs.sort_unstable();
        pairs.dedup();
        assert_eq!(pairs.len(), 5);
    }

    #[test]
    fn scene_build_is_fixed_shape() {
        let theme = ThemeConfig::default();
        let scene = Scene::build(&theme);

        assert_eq!(scene.particles.len(), theme.particle_count);
        assert_eq!(scene.camera.fov_y_deg, 42.0);
        assert_eq!(scene.camera.near, 0.1);
        assert_eq!(scene.camera.far, 100.0);
        // Initial offset along +Z, slightly above the origin.
        assert!(scene.camera.position.z > 0.0);
        // Halo carries its static tilt; animated angles start at zero.
        assert!(scene.halo.rotation.x > 0.0);
        assert_eq!(scene.core.rotation, Vec3::ZERO);
        assert_eq!(scene.wire.rotation, Vec3::ZERO);
    }
}
