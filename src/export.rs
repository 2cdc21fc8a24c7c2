// Writes a rendered frame to disk so a single stage/tick can be inspected
// without opening a window.

use std::path::Path;

use image::{Rgb, RgbImage};
use tracing::info;

use crate::error::Error;
use crate::types::FrameBuffer;

/// Unpack 0x00RRGGBB pixels into an RGB image.
pub fn to_rgb_image(fb: &FrameBuffer) -> RgbImage {
    RgbImage::from_fn(fb.width as u32, fb.height as u32, |x, y| {
        let px = fb.pixels[y as usize * fb.width + x as usize];
        Rgb([(px >> 16) as u8, (px >> 8) as u8, px as u8])
    })
}

/// Save as PNG (format picked from the extension by `image`).
pub fn save_frame(fb: &FrameBuffer, path: &Path) -> Result<(), Error> {
    to_rgb_image(fb).save(path).map_err(|source| Error::Export {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), width = fb.width, height = fb.height, "snapshot written");
    Ok(())
}
