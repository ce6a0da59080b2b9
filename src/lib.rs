#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod background;
pub mod brush;
pub mod config;
pub mod document;
pub mod error;
pub mod export;
pub mod input;
pub mod notifications;
pub mod renderer;
pub mod share;
pub mod stroke;
pub mod surface;

mod geometry;
mod panels;

pub use app::SketchApp;
pub use brush::{BrushConfig, BrushSize, PaintColor};
pub use config::SketchConfig;
pub use document::Document;
pub use export::{ExportQueue, ExportSnapshot, ExportTicket};
pub use input::{InputEvent, InputHandler};
pub use renderer::{Background, RenderTarget};
pub use stroke::{MutableStroke, Stroke, StrokeRef};
pub use surface::DrawingSurface;
