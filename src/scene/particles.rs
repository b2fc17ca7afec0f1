//! The particle field surrounding the core.
//!
//! A fixed-size cloud of point sprites sampled once from a flattened spherical
//! shell. After construction the field is immutable: the only thing that
//! animates it is the shared `time` uniform, which the particle shader uses to
//! pulse each point along its radial normal.

use rand::Rng;

use super::Rgba;

/// Radial band the particles are sampled from.
const RADIUS_RANGE: std::ops::Range<f32> = 2.3..6.0;
/// Per-point size factor range.
const SCALE_RANGE: std::ops::Range<f32> = 0.4..1.1;
/// Vertical squash applied to the shell so the cloud hugs the halo plane.
const Y_FLATTEN: f32 = 0.7;

/// An immutable cloud of point samples plus the one animated uniform.
#[derive(Debug, Clone)]
pub struct ParticleField {
    positions: Vec<[f32; 3]>,
    scales: Vec<f32>,
    pub color: Rgba,

    /// Shared time uniform consumed by the particle shader. Written once per
    /// tick by the animation loop; the samples themselves never change.
    pub time: f32,
}

impl ParticleField {
    /// Sample `count` points from the flattened spherical distribution.
    pub fn sample<R: Rng>(count: usize, color: Rgba, rng: &mut R) -> Self {
        let mut positions = Vec::with_capacity(count);
        let mut scales = Vec::with_capacity(count);

        for _ in 0..count {
            let radius = rng.gen_range(RADIUS_RANGE);
            let theta = rng.gen_range(0.0..std::f32::consts::TAU);
            let phi = rng.gen_range(0.0..std::f32::consts::PI);

            let x = radius * phi.sin() * theta.cos();
            let y = radius * phi.cos() * Y_FLATTEN;
            let z = radius * phi.sin() * theta.sin();

            positions.push([x, y, z]);
            scales.push(rng.gen_range(SCALE_RANGE));
        }

        Self {
            positions,
            scales,
            color,
            time: 0.0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    #[inline]
    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    #[inline]
    pub fn scales(&self) -> &[f32] {
        &self.scales
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn samples_stay_in_bands() {
        let mut rng = StdRng::seed_from_u64(7);
        let field = ParticleField::sample(880, Rgba::WHITE, &mut rng);

        assert_eq!(field.len(), 880);
        assert_eq!(field.scales().len(), 880);

        for (p, &s) in field.positions().iter().zip(field.scales()) {
            // Undo the vertical flatten to recover the sampled shell radius.
            let y = p[1] / Y_FLATTEN;
            let r = (p[0] * p[0] + y * y + p[2] * p[2]).sqrt();
            assert!(
                (RADIUS_RANGE.start - 1e-3..RADIUS_RANGE.end + 1e-3).contains(&r),
                "shell radius {r} out of band"
            );
            assert!(SCALE_RANGE.contains(&s), "scale {s} out of band");
        }
    }

    #[test]
    fn seeded_sampling_is_reproducible() {
        let a = ParticleField::sample(64, Rgba::WHITE, &mut StdRng::seed_from_u64(42));
        let b = ParticleField::sample(64, Rgba::WHITE, &mut StdRng::seed_from_u64(42));
        assert_eq!(a.positions(), b.positions());
        assert_eq!(a.scales(), b.scales());
    }

    #[test]
    fn field_starts_at_time_zero() {
        let field = ParticleField::sample(8, Rgba::WHITE, &mut StdRng::seed_from_u64(1));
        assert_eq!(field.time, 0.0);
    }
}
