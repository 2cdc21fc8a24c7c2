// One error type for the whole app.
// Every variant states *where* things went wrong.
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Creating the window failed.
    #[error("window init error: {0}")]
    WindowInit(String),

    /// Pushing a frame to the window failed.
    #[error("window update error: {0}")]
    WindowUpdate(String),

    /// An image or mask could not be opened/decoded.
    /// Callers usually log this and fall back to a blank texture.
    #[error("texture decode error for {path}: {source}")]
    TextureDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Writing a snapshot PNG failed.
    #[error("export error for {path}: {source}")]
    Export {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The stage preset table broke one of its invariants.
    #[error("invalid stage preset table: {0}")]
    PresetTable(String),

    /// Command-line values out of range.
    #[error("invalid configuration: {0}")]
    Config(String),
}
