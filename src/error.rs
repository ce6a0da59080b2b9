use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by brush configuration on the drawing surface
#[derive(Debug, Error, PartialEq)]
pub enum SurfaceError {
    #[error("Brush thickness must be a positive finite number, got {0}")]
    InvalidThickness(f32),
}

/// Errors that can occur while preparing a raster target
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Invalid render target dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Failed to allocate a {width}x{height} render target")]
    Allocation { width: u32, height: u32 },
}

/// Errors that end an export request
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to render the canvas: {0}")]
    Render(#[from] RenderError),

    #[error("Failed to encode PNG: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Failed to write export file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Export worker is no longer running")]
    WorkerGone,
}

/// Errors that can occur while loading a background image
#[derive(Debug, Error)]
pub enum BackgroundError {
    #[error("Failed to read background image {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode background image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Background image has no pixels")]
    Empty,

    #[error("Not a supported image file: {0}")]
    Unsupported(String),
}

/// Errors that can occur while loading or saving configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to access config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors raised when handing an exported file to another application
#[derive(Debug, Error)]
pub enum ShareError {
    #[error("Failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
