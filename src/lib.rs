// Candlelight: an animated flame and flicker-lighting effect composited
// over a still photograph, shaded per pixel on the CPU.
// The core is pure: `render::render` takes a tick, a stage preset, a surface
// and the textures, and returns a finished frame. Time and stage selection
// live in `animation::Animator`, which the host owns and advances once per
// display refresh.

pub mod animation;
pub mod config;
pub mod draw;
pub mod error;
pub mod export;
pub mod noise_field;
pub mod render;
pub mod shading;
pub mod stages;
pub mod texture;
pub mod types;
