// Core buffer types shared by the renderer and the window.

use glam::Vec3;

/// What the window shows.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameBuffer {
    pub width: usize,      // how wide the frame is on screen (pixels)
    pub height: usize,     // how tall the frame is on screen (pixels)
    pub pixels: Vec<u32>,  // each entry is 0x00RRGGBB for minifb
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, pixels: vec![0u32; width * height] }
    }

    /// Resize in place, keeping the allocation when the size is unchanged.
    pub fn resize(&mut self, width: usize, height: usize) {
        if self.width == width && self.height == height {
            return;
        }
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.resize(width * height, 0);
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Clamp a shaded color into [0,1] and pack it as 0x00RRGGBB.
/// Over-bright flame values are only clipped here, never earlier.
#[inline]
pub fn pack_rgb(c: Vec3) -> u32 {
    let c = c.clamp(Vec3::ZERO, Vec3::ONE) * 255.0;
    let r = c.x.round() as u32;
    let g = c.y.round() as u32;
    let b = c.z.round() as u32;
    (r << 16) | (g << 8) | b
}

/// Where a surface pixel sits in normalized space.
/// `u` runs left→right, `v` runs bottom→top (so flames rise as v grows).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Uv {
    pub u: f32,
    pub v: f32,
}

impl Uv {
    pub fn new(u: f32, v: f32) -> Self {
        Self { u, v }
    }

    /// Center of pixel (x,y) on a `width × height` surface.
    pub fn pixel_center(x: usize, y: usize, width: usize, height: usize) -> Self {
        let u = (x as f32 + 0.5) / width as f32;
        let v = 1.0 - (y as f32 + 0.5) / height as f32;
        Self { u, v }
    }
}
