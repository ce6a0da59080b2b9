use egui::Color32;
use serde::{Deserialize, Serialize};

/// The fixed set of paint colors offered by the palette
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PaintColor {
    Skin,
    #[default]
    Black,
    Red,
    Green,
    Blue,
    Yellow,
    Lollipop,
    White,
}

impl PaintColor {
    pub const ALL: [PaintColor; 8] = [
        PaintColor::Skin,
        PaintColor::Black,
        PaintColor::Red,
        PaintColor::Green,
        PaintColor::Blue,
        PaintColor::Yellow,
        PaintColor::Lollipop,
        PaintColor::White,
    ];

    pub fn color32(self) -> Color32 {
        match self {
            PaintColor::Skin => Color32::from_rgb(0xFA, 0x9A, 0x70),
            PaintColor::Black => Color32::from_rgb(0x00, 0x00, 0x00),
            PaintColor::Red => Color32::from_rgb(0xFF, 0x00, 0x00),
            PaintColor::Green => Color32::from_rgb(0x2E, 0x7D, 0x32),
            PaintColor::Blue => Color32::from_rgb(0x15, 0x65, 0xC0),
            PaintColor::Yellow => Color32::from_rgb(0xFF, 0xEB, 0x3B),
            PaintColor::Lollipop => Color32::from_rgb(0xFF, 0x40, 0x81),
            PaintColor::White => Color32::from_rgb(0xFF, 0xFF, 0xFF),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PaintColor::Skin => "Skin",
            PaintColor::Black => "Black",
            PaintColor::Red => "Red",
            PaintColor::Green => "Green",
            PaintColor::Blue => "Blue",
            PaintColor::Yellow => "Yellow",
            PaintColor::Lollipop => "Lollipop",
            PaintColor::White => "White",
        }
    }
}

impl From<PaintColor> for Color32 {
    fn from(color: PaintColor) -> Self {
        color.color32()
    }
}

/// Named brush sizes offered by the brush picker.
///
/// The surface accepts any positive thickness; these are only the values the
/// picker hands out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BrushSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl BrushSize {
    pub const ALL: [BrushSize; 3] = [BrushSize::Small, BrushSize::Medium, BrushSize::Large];

    /// Thickness in points
    pub fn thickness(self) -> f32 {
        match self {
            BrushSize::Small => 10.0,
            BrushSize::Medium => 20.0,
            BrushSize::Large => 30.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BrushSize::Small => "Small",
            BrushSize::Medium => "Medium",
            BrushSize::Large => "Large",
        }
    }
}

/// Color and thickness applied to the next stroke that begins
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrushConfig {
    pub color: Color32,
    pub thickness: f32,
}

impl Default for BrushConfig {
    fn default() -> Self {
        Self {
            color: PaintColor::default().color32(),
            thickness: BrushSize::default().thickness(),
        }
    }
}
