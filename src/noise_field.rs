// Simplex noise layers that animate the lighting and the flame.
// Each layer is 3D simplex noise evaluated at (u·freq_x, v·freq_y − tick·speed, 1.0).
// Visual expectation: the tick scrolls every field upward through the image,
// so the flame tongues rise; the constant third axis keeps it a 2D slice.

use noise::{NoiseFn, Simplex};

use crate::types::Uv;

/// One noise evaluation recipe.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NoiseLayer {
    pub freq: (f64, f64),
    pub speed: f64,
    /// `true`: remap `[-1,1]` to `[0,1]` via `n/2 + 0.5`.
    pub remap: bool,
}

/// Slow, broad noise that drives the lighting flicker.
pub const LIGHTING_LAYER: NoiseLayer = NoiseLayer { freq: (4.0, 4.0), speed: 0.35, remap: true };
/// Second lighting layer. Evaluated but not blended; kept for tuning headroom.
pub const LIGHTING_DETAIL_LAYER: NoiseLayer = NoiseLayer { freq: (8.4, 8.4), speed: 0.56, remap: true };
/// Fast, fine noise for flame tongues.
pub const FLAME_LAYER_1: NoiseLayer = NoiseLayer { freq: (27.0, 27.0), speed: 6.54, remap: false };
pub const FLAME_LAYER_2: NoiseLayer = NoiseLayer { freq: (21.0, 21.0), speed: 4.1, remap: false };

/// Fold noise into ridges: `1 − |x|`. Maps [-1,1] onto [0,1], peaking at 0.
#[inline]
pub fn turbulence(x: f32) -> f32 {
    1.0 - x.abs()
}

/// The four per-pixel samples, with turbulence already applied to the flame pair.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NoiseSamples {
    pub n1: f32,
    pub n2: f32,
    pub n3: f32,
    pub n4: f32,
}

/// A seeded simplex field. Stateless after construction, so it can be
/// shared by reference across render workers.
#[derive(Clone, Debug)]
pub struct NoiseField {
    simplex: Simplex,
}

impl Default for NoiseField {
    fn default() -> Self {
        Self::new(Simplex::DEFAULT_SEED)
    }
}

impl NoiseField {
    pub fn new(seed: u32) -> Self {
        Self { simplex: Simplex::new(seed) }
    }

    /// Raw simplex value at a 3D point, clamped to [-1,1].
    #[inline]
    pub fn raw(&self, x: f64, y: f64, z: f64) -> f32 {
        self.simplex.get([x, y, z]).clamp(-1.0, 1.0) as f32
    }

    /// Evaluate one layer at `uv` for the given tick.
    #[inline]
    pub fn sample(&self, layer: NoiseLayer, uv: Uv, tick: f64) -> f32 {
        let x = uv.u as f64 * layer.freq.0;
        let y = uv.v as f64 * layer.freq.1 - tick * layer.speed;
        let n = self.raw(x, y, 1.0);
        if layer.remap { n / 2.0 + 0.5 } else { n }
    }

    /// All four layers for one pixel.
    pub fn sample_pixel(&self, uv: Uv, tick: f64) -> NoiseSamples {
        NoiseSamples {
            n1: self.sample(LIGHTING_LAYER, uv, tick),
            n2: self.sample(LIGHTING_DETAIL_LAYER, uv, tick),
            n3: turbulence(self.sample(FLAME_LAYER_1, uv, tick)),
            n4: turbulence(self.sample(FLAME_LAYER_2, uv, tick)),
        }
    }
}
