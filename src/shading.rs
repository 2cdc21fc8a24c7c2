// The fragment program: flame coloring, flicker lighting and the final
// composite. Every function is pure and operates on one pixel.
// Visual expectation: orange-to-yellow tongues screened over the photo,
// which itself brightens and dims under the lighting mask.

use glam::{Vec3, Vec4};

/// Warm highlight of the flame.
pub const FLAME_YELLOW: Vec3 = Vec3::new(237.0 / 255.0, 205.0 / 255.0, 137.0 / 255.0);
/// Deep body of the flame.
pub const FLAME_ORANGE: Vec3 = Vec3::new(209.0 / 255.0, 145.0 / 255.0, 64.0 / 255.0);

/// Linear interpolation, `a` at t=0 and `b` at t=1.
#[inline]
pub fn mix(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Screen blend: `1 − (1−a)(1−b)`. Only ever lightens.
#[inline]
pub fn screen(a: f32, b: f32) -> f32 {
    1.0 - (1.0 - a) * (1.0 - b)
}

#[inline]
pub fn screen3(a: Vec3, b: Vec3) -> Vec3 {
    Vec3::new(screen(a.x, b.x), screen(a.y, b.y), screen(a.z, b.z))
}

/// Two weighted noise layers multiplied together, scaled by the total weight.
/// With both weights at 0 the trailing sum kills the result; with both at 1 it
/// doubles it, which is what brightens the flame once two layers are on.
#[inline]
fn layered_noise(n1: f32, w1: f32, n2: f32, w2: f32) -> f32 {
    mix(1.0, n1, w1) * mix(1.0, n2, w2) * (w1 + w2)
}

/// Flame color and strength for one pixel.
///
/// `n3`/`n4` are the turbulated flame noises, `mask` the flame-mask sample.
/// The returned alpha equals the masked noise and is deliberately not clamped:
/// it can exceed 1 with both layers on and the mask off.
pub fn flame(n3: f32, flame_noise1: f32, n4: f32, flame_noise2: f32, mask: f32, mask_factor: f32) -> Vec4 {
    let noise = layered_noise(n3, flame_noise1, n4, flame_noise2);
    let masked = mix(noise, noise * mask, mask_factor);
    FLAME_ORANGE.lerp(FLAME_YELLOW, masked).extend(masked)
}

/// Flicker lighting: brighten `c` by itself, scaled by noise under the mask.
/// Bright areas flicker more than dark ones.
///
/// The lighting noise is the same `n1` sample taken twice at full weight.
pub fn lighting(c: Vec3, n1: f32, mask: f32) -> Vec3 {
    let noise = layered_noise(n1, 1.0, n1, 1.0);
    let masked = noise * mask;
    screen3(c, c * masked)
}

/// Global flicker strength, roughly within [0.4, 1.0].
/// Forced to 1 when the flame layer is shown on its own.
pub fn pulse(tick: f64, only_flame: f32) -> f32 {
    let p = 0.7 + 0.1 * tick.sin() + 0.1 * (tick * 7.0).sin() + 0.1 * (tick * 5.0).sin();
    mix(p as f32, 1.0, only_flame)
}

/// Final composite of base image `c`, flame `f` and lit image `l`.
pub fn compose(c: Vec3, f: Vec4, l: Vec3, only_flame: f32, pulse: f32) -> Vec3 {
    let lit = c.lerp(l, pulse) * (1.0 - only_flame);
    lit.lerp(screen3(lit, f.truncate()), pulse * f.w)
}
