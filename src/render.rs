// Runs the fragment program over every pixel of the surface.
// Visual expectation: one call = one finished frame of the candle effect,
// ready for `Drawer::present`.

use rayon::prelude::*;
use tracing::trace;

use crate::noise_field::NoiseField;
use crate::shading::{compose, flame, lighting, pulse};
use crate::stages::StagePreset;
use crate::texture::TextureSet;
use crate::types::{pack_rgb, FrameBuffer, Uv};
use glam::Vec3;

/// Width/height of the reference photo.
pub const DEFAULT_ASPECT: f64 = 480.0 / 382.0;

/// Output size in pixels. Only exists once a width is known.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Surface {
    pub width: usize,
    pub height: usize,
}

impl Surface {
    /// Derive the height from a measured width: `height = width / aspect`.
    /// `None` while the width is still 0 (or the aspect is unusable), which
    /// means "don't render this frame".
    pub fn from_width(width: usize, aspect: f64) -> Option<Self> {
        if width == 0 || !aspect.is_finite() || aspect <= 0.0 {
            return None;
        }
        let height = (width as f64 / aspect).round() as usize;
        if height == 0 {
            return None;
        }
        Some(Self { width, height })
    }
}

/// One fragment: the color of the pixel at `uv`.
pub fn shade_pixel(uv: Uv, tick: f64, preset: &StagePreset, textures: &TextureSet, noise: &NoiseField) -> Vec3 {
    let c = textures.image.sample(uv);
    let fm = textures.flame_mask.sample_r(uv);
    let m = textures.lighting_mask.sample_r(uv);

    let n = noise.sample_pixel(uv, tick);

    let f = flame(n.n3, preset.flame_noise1, n.n4, preset.flame_noise2, fm, preset.flame_mask_factor);
    let l = lighting(c, n.n1, m);
    let p = pulse(tick, preset.only_flame);

    compose(c, f, l, preset.only_flame, p)
}

/// Shade the whole surface into `out`, resizing it if needed.
/// Rows are independent, so they are spread over the rayon pool.
pub fn render_into(
    out: &mut FrameBuffer,
    tick: f64,
    preset: &StagePreset,
    surface: Surface,
    textures: &TextureSet,
    noise: &NoiseField,
) {
    out.resize(surface.width, surface.height);
    if out.is_empty() {
        return;
    }
    let (w, h) = (surface.width, surface.height);

    out.pixels.par_chunks_mut(w).enumerate().for_each(|(y, row)| {
        for (x, px) in row.iter_mut().enumerate() {
            let uv = Uv::pixel_center(x, y, w, h);
            *px = pack_rgb(shade_pixel(uv, tick, preset, textures, noise));
        }
    });
    trace!(width = w, height = h, tick, stage = preset.name, "frame rendered");
}

/// Allocating variant of `render_into`.
pub fn render(
    tick: f64,
    preset: &StagePreset,
    surface: Surface,
    textures: &TextureSet,
    noise: &NoiseField,
) -> FrameBuffer {
    let mut out = FrameBuffer::new(surface.width, surface.height);
    render_into(&mut out, tick, preset, surface, textures, noise);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::STAGES;
    use crate::texture::Texture;

    // A warm gradient photo with bright, patterned masks.
    fn scene() -> TextureSet {
        TextureSet {
            image: Texture::from_fn(16, 12, |x, y| Vec3::new(x as f32 / 15.0, y as f32 / 11.0, 0.4)),
            flame_mask: Texture::from_fn(16, 12, |x, _| Vec3::splat(if x > 7 { 1.0 } else { 0.2 })),
            lighting_mask: Texture::from_fn(16, 12, |_, y| Vec3::splat(y as f32 / 11.0)),
        }
    }

    #[test]
    fn surface_height_follows_aspect() {
        assert_eq!(Surface::from_width(480, DEFAULT_ASPECT), Some(Surface { width: 480, height: 382 }));
        assert_eq!(Surface::from_width(240, DEFAULT_ASPECT), Some(Surface { width: 240, height: 191 }));
    }

    #[test]
    fn zero_width_skips_rendering() {
        assert_eq!(Surface::from_width(0, DEFAULT_ASPECT), None);
        assert_eq!(Surface::from_width(100, 0.0), None);
        assert_eq!(Surface::from_width(100, f64::NAN), None);
    }

    #[test]
    fn renders_requested_size() {
        let surface = Surface::from_width(24, DEFAULT_ASPECT).unwrap();
        let fb = render(1.0, &STAGES[3], surface, &scene(), &NoiseField::default());
        assert_eq!((fb.width, fb.height), (24, 19));
        assert_eq!(fb.pixels.len(), 24 * 19);
    }

    #[test]
    fn first_stage_ignores_flame_mask_and_second_flame_layer() {
        let surface = Surface { width: 20, height: 16 };
        let noise = NoiseField::default();
        let mut a = scene();
        let mut b = scene();
        a.flame_mask = Texture::solid(Vec3::ZERO);
        b.flame_mask = Texture::from_fn(5, 5, |x, y| Vec3::splat(((x + y) % 2) as f32));

        for tick in [0.0, 0.7, 5.25, 1234.5] {
            let fa = render(tick, &STAGES[0], surface, &a, &noise);
            let fb = render(tick, &STAGES[0], surface, &b, &noise);
            assert_eq!(fa, fb, "tick {tick}");
        }
    }

    #[test]
    fn flame_only_stages_ignore_the_photo() {
        let surface = Surface { width: 12, height: 10 };
        let noise = NoiseField::default();
        let lit = scene();
        let mut dark = scene();
        dark.image = Texture::blank();
        dark.lighting_mask = Texture::blank();

        for preset in STAGES.iter().take(3) {
            let fa = render(2.0, preset, surface, &lit, &noise);
            let fb = render(2.0, preset, surface, &dark, &noise);
            assert_eq!(fa, fb, "{}", preset.name);
        }
    }

    #[test]
    fn masked_flame_is_dark_outside_the_mask() {
        let mut tex = scene();
        tex.flame_mask = Texture::blank();
        let fb = render(4.0, &STAGES[2], Surface { width: 8, height: 8 }, &tex, &NoiseField::default());
        assert!(fb.pixels.iter().all(|&p| p == 0));
    }

    #[test]
    fn full_effect_shows_the_photo_where_nothing_flickers() {
        // No masks: lighting adds nothing and the flame is masked out, so the
        // output is the photo itself.
        let tex = TextureSet {
            image: Texture::solid(Vec3::new(0.2, 0.4, 0.6)),
            flame_mask: Texture::blank(),
            lighting_mask: Texture::blank(),
        };
        let fb = render(9.0, &STAGES[3], Surface { width: 6, height: 4 }, &tex, &NoiseField::default());
        let expected = pack_rgb(Vec3::new(0.2, 0.4, 0.6));
        assert!(fb.pixels.iter().all(|&p| p == expected));
    }

    #[test]
    fn frame_matches_single_fragments_for_the_given_preset() {
        let tex = scene();
        let noise = NoiseField::default();
        let surface = Surface { width: 9, height: 7 };
        for preset in &STAGES {
            let fb = render(6.5, preset, surface, &tex, &noise);
            for (x, y) in [(0, 0), (4, 3), (8, 6)] {
                let uv = Uv::pixel_center(x, y, surface.width, surface.height);
                let expected = pack_rgb(shade_pixel(uv, 6.5, preset, &tex, &noise));
                assert_eq!(fb.pixels[y * surface.width + x], expected, "{} at ({x},{y})", preset.name);
            }
        }
    }

    #[test]
    fn render_into_reuses_and_resizes() {
        let tex = scene();
        let noise = NoiseField::default();
        let mut fb = FrameBuffer::new(0, 0);
        render_into(&mut fb, 1.0, &STAGES[3], Surface { width: 10, height: 8 }, &tex, &noise);
        assert_eq!(fb.pixels.len(), 80);
        render_into(&mut fb, 1.0, &STAGES[3], Surface { width: 4, height: 3 }, &tex, &noise);
        assert_eq!((fb.width, fb.height, fb.pixels.len()), (4, 3, 12));
    }
}
