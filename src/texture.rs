// Loads the photo and the two masks and samples them like a GPU would:
// normalized coordinates, bilinear filtering, clamp-to-edge.
// Visual expectation: the photo fills the surface at any output size,
// because nothing here depends on the texture's pixel size.

use std::path::Path;

use glam::Vec3;
use image::RgbImage;
use tracing::{info, warn};

use crate::error::Error;
use crate::types::Uv;

/// Stable asset names, resolved against the assets directory.
pub const IMAGE_FILE: &str = "candlelight.jpg";
pub const FLAME_MASK_FILE: &str = "candlelight-flame-mask.jpg";
pub const LIGHTING_MASK_FILE: &str = "candlelight-mask.jpg";

/// Immutable grid of RGB samples, each channel in [0,1].
#[derive(Clone, Debug, PartialEq)]
pub struct Texture {
    width: usize,
    height: usize,
    texels: Vec<Vec3>, // row-major, top row first
}

impl Texture {
    /// 1×1 black: a missing photo shows black, a missing mask masks everything out.
    pub fn blank() -> Self {
        Self { width: 1, height: 1, texels: vec![Vec3::ZERO] }
    }

    /// Build a texture by evaluating `f(x, y)` for every texel.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> Vec3) -> Self {
        if width == 0 || height == 0 {
            return Self::blank();
        }
        let mut texels = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                texels.push(f(x, y));
            }
        }
        Self { width, height, texels }
    }

    /// Uniform color (handy for solid masks in tests and previews).
    pub fn solid(color: Vec3) -> Self {
        Self { width: 1, height: 1, texels: vec![color] }
    }

    pub fn from_rgb_image(img: &RgbImage) -> Self {
        let (w, h) = img.dimensions();
        Self::from_fn(w as usize, h as usize, |x, y| {
            let p = img.get_pixel(x as u32, y as u32);
            Vec3::new(p[0] as f32, p[1] as f32, p[2] as f32) / 255.0
        })
    }

    /// Decode any RGB(A)/grey image the `image` crate understands; alpha is dropped.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let img = image::open(path).map_err(|source| Error::TextureDecode {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_rgb_image(&img.to_rgb8()))
    }

    /// Like `load`, but a failure becomes a blank layer so the rest still renders.
    pub fn load_or_blank(path: &Path) -> Self {
        match Self::load(path) {
            Ok(tex) => {
                info!(path = %path.display(), width = tex.width, height = tex.height, "texture loaded");
                tex
            }
            Err(e) => {
                warn!(error = %e, "texture unavailable, using blank layer");
                Self::blank()
            }
        }
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    #[inline]
    fn texel(&self, x: isize, y: isize) -> Vec3 {
        // Clamp-to-edge addressing.
        let x = x.clamp(0, self.width as isize - 1) as usize;
        let y = y.clamp(0, self.height as isize - 1) as usize;
        self.texels[y * self.width + x]
    }

    /// Bilinear sample at `uv` (v grows upward, row 0 is the top of the image).
    pub fn sample(&self, uv: Uv) -> Vec3 {
        let fx = uv.u * self.width as f32 - 0.5;
        let fy = (1.0 - uv.v) * self.height as f32 - 0.5;
        let x0 = fx.floor();
        let y0 = fy.floor();
        let tx = fx - x0;
        let ty = fy - y0;
        let (x0, y0) = (x0 as isize, y0 as isize);

        let top = self.texel(x0, y0).lerp(self.texel(x0 + 1, y0), tx);
        let bottom = self.texel(x0, y0 + 1).lerp(self.texel(x0 + 1, y0 + 1), tx);
        top.lerp(bottom, ty)
    }

    /// Single-channel read for masks (the red channel, like `texture2D(m, uv).r`).
    #[inline]
    pub fn sample_r(&self, uv: Uv) -> f32 {
        self.sample(uv).x
    }
}

/// The three read-only inputs of the effect.
#[derive(Clone, Debug)]
pub struct TextureSet {
    pub image: Texture,
    pub flame_mask: Texture,
    pub lighting_mask: Texture,
}

impl TextureSet {
    /// Resolve the stable asset names under `dir` and load each one.
    /// Never fails: missing files become blank layers (logged).
    pub fn load(dir: &Path) -> Self {
        Self {
            image: Texture::load_or_blank(&dir.join(IMAGE_FILE)),
            flame_mask: Texture::load_or_blank(&dir.join(FLAME_MASK_FILE)),
            lighting_mask: Texture::load_or_blank(&dir.join(LIGHTING_MASK_FILE)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).abs().max_element() < 1e-5
    }

    #[test]
    fn blank_samples_to_zero_everywhere() {
        let t = Texture::blank();
        for uv in [Uv::new(0.0, 0.0), Uv::new(0.5, 0.5), Uv::new(1.0, 1.0)] {
            assert_eq!(t.sample(uv), Vec3::ZERO);
        }
    }

    #[test]
    fn sample_hits_texel_centers_exactly() {
        // 2×1: left red, right blue.
        let t = Texture::from_fn(2, 1, |x, _| if x == 0 { Vec3::X } else { Vec3::Z });
        assert!(close(t.sample(Uv::new(0.25, 0.5)), Vec3::X));
        assert!(close(t.sample(Uv::new(0.75, 0.5)), Vec3::Z));
        assert!(close(t.sample(Uv::new(0.5, 0.5)), Vec3::new(0.5, 0.0, 0.5)));
    }

    #[test]
    fn top_row_is_high_v() {
        // Row 0 white, row 1 black.
        let t = Texture::from_fn(1, 2, |_, y| if y == 0 { Vec3::ONE } else { Vec3::ZERO });
        assert!(close(t.sample(Uv::new(0.5, 0.75)), Vec3::ONE));
        assert!(close(t.sample(Uv::new(0.5, 0.25)), Vec3::ZERO));
    }

    #[test]
    fn edges_clamp() {
        let t = Texture::from_fn(2, 1, |x, _| Vec3::splat(x as f32));
        assert!(close(t.sample(Uv::new(0.0, 0.5)), Vec3::ZERO));
        assert!(close(t.sample(Uv::new(1.0, 0.5)), Vec3::ONE));
    }

    #[test]
    fn loads_png_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mask.png");
        let img = RgbImage::from_pixel(3, 2, Rgb([255, 0, 51]));
        img.save(&path).unwrap();

        let t = Texture::load(&path).unwrap();
        assert_eq!(t.dimensions(), (3, 2));
        assert!(close(t.sample(Uv::new(0.5, 0.5)), Vec3::new(1.0, 0.0, 0.2)));
    }

    #[test]
    fn corrupt_image_falls_back_to_blank() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(FLAME_MASK_FILE);
        // JPEG start-of-image marker followed by garbage.
        std::fs::write(&path, [0xFF, 0xD8, 0xFF, 0x00, 0x13, 0x37, 0x42, 0x42]).unwrap();

        assert!(matches!(Texture::load(&path), Err(Error::TextureDecode { .. })));
        assert_eq!(Texture::load_or_blank(&path), Texture::blank());

        let set = TextureSet::load(dir.path());
        assert_eq!(set.flame_mask, Texture::blank());
    }

    #[test]
    fn missing_assets_fall_back_to_blank() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Texture::load(&dir.path().join("nope.jpg")).is_err());

        let set = TextureSet::load(dir.path());
        assert_eq!(set.image, Texture::blank());
        assert_eq!(set.flame_mask, Texture::blank());
        assert_eq!(set.lighting_mask, Texture::blank());
    }
}
