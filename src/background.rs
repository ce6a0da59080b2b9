use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::RgbaImage;

use crate::error::BackgroundError;
use crate::renderer::Background;

/// Extensions offered by the picker and accepted from drops
pub const IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "gif", "webp", "bmp"];

/// A decoded image used as the base layer beneath strokes
#[derive(Debug, Clone)]
pub struct BackgroundImage {
    image: Arc<RgbaImage>,
}

impl BackgroundImage {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, BackgroundError> {
        let decoded = image::load_from_memory(bytes)?;
        log::debug!("Decoded background image: {}x{}", decoded.width(), decoded.height());

        let rgba = decoded.to_rgba8();
        if rgba.width() == 0 || rgba.height() == 0 {
            return Err(BackgroundError::Empty);
        }
        Ok(Self {
            image: Arc::new(rgba),
        })
    }

    pub fn from_path(path: &Path) -> Result<Self, BackgroundError> {
        if !is_image_path(path) {
            return Err(BackgroundError::Unsupported(path.display().to_string()));
        }
        let bytes = std::fs::read(path).map_err(|source| BackgroundError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Loading background from {} ({} bytes)", path.display(), bytes.len());
        Self::from_bytes(&bytes)
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn to_background(&self) -> Background {
        Background::Image(self.image.clone())
    }
}

/// Check the extension against the image formats we decode
pub fn is_image_path(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

pub fn is_image_mime(mime: &str) -> bool {
    mime.starts_with("image/")
}

/// Asks the user for an image to put behind the strokes
pub trait ImagePicker {
    /// `None` when the user cancels
    fn pick_image(&self) -> Option<PathBuf>;
}

/// Native open dialog filtered to image files
#[derive(Debug, Default, Clone, Copy)]
pub struct FileDialogPicker;

impl ImagePicker for FileDialogPicker {
    fn pick_image(&self) -> Option<PathBuf> {
        // Blocks the UI thread until the dialog closes
        rfd::FileDialog::new()
            .set_title("Choose a background image")
            .add_filter("Images", &IMAGE_EXTENSIONS)
            .pick_file()
    }
}

/// Picks up image files dropped onto the window
#[derive(Debug, Default)]
pub struct FileHandler {
    dropped_files: Vec<egui::DroppedFile>,
}

impl FileHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect newly dropped files. Returns true if any arrived this frame.
    pub fn check_for_dropped_files(&mut self, ctx: &egui::Context) -> bool {
        let mut new_dropped_files = false;

        ctx.input(|i| {
            if !i.raw.dropped_files.is_empty() {
                self.dropped_files = i.raw.dropped_files.clone();
                new_dropped_files = true;
            }
        });

        new_dropped_files
    }

    pub fn queue_dropped_files(&mut self, files: Vec<egui::DroppedFile>) {
        self.dropped_files = files;
    }

    /// Decode the first dropped image. Dropped files are consumed either way.
    pub fn take_background(&mut self) -> Option<Result<BackgroundImage, BackgroundError>> {
        let files = std::mem::take(&mut self.dropped_files);
        let mut last_error = None;

        for file in &files {
            let file_name = if let Some(path) = &file.path {
                path.display().to_string()
            } else if !file.name.is_empty() {
                file.name.clone()
            } else {
                "unknown".to_owned()
            };

            if !Self::is_image_file(file) {
                log::warn!("Dropped file is not a supported type: {}", file_name);
                last_error = Some(BackgroundError::Unsupported(file_name));
                continue;
            }

            let result = if let Some(bytes) = &file.bytes {
                BackgroundImage::from_bytes(bytes)
            } else if let Some(path) = &file.path {
                BackgroundImage::from_path(path)
            } else {
                log::warn!("Dropped file has no accessible data: {}", file_name);
                continue;
            };

            match result {
                Ok(image) => return Some(Ok(image)),
                Err(err) => {
                    log::error!("Failed to load dropped background {}: {}", file_name, err);
                    last_error = Some(err);
                }
            }
        }

        last_error.map(Err)
    }

    fn is_image_file(file: &egui::DroppedFile) -> bool {
        if !file.mime.is_empty() {
            is_image_mime(&file.mime)
        } else if let Some(path) = &file.path {
            is_image_path(path)
        } else {
            is_image_path(Path::new(&file.name))
        }
    }

    /// Dim the window and list the files while they are dragged over it
    pub fn preview_files_being_dropped(&self, ctx: &egui::Context) {
        use egui::{Align2, Color32, FontId, Id, LayerId, Order};

        if ctx.input(|i| i.raw.hovered_files.is_empty()) {
            return;
        }

        let text = ctx.input(|i| {
            let mut text = "Drop an image to use as background:\n".to_owned();
            for file in &i.raw.hovered_files {
                if let Some(path) = &file.path {
                    text += &format!("\n{}", path.display());
                }
            }
            text
        });

        let painter = ctx.layer_painter(LayerId::new(Order::Foreground, Id::new("file_drop_target")));
        let screen_rect = ctx.screen_rect();
        painter.rect_filled(screen_rect, 0.0, Color32::from_black_alpha(192));
        painter.text(
            screen_rect.center(),
            Align2::CENTER_CENTER,
            text,
            FontId::proportional(20.0),
            Color32::WHITE,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba};
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = RgbaImage::from_pixel(width, height, Rgba([1, 2, 3, 255]));
        let mut bytes = Cursor::new(Vec::new());
        image.write_to(&mut bytes, ImageFormat::Png).unwrap();
        bytes.into_inner()
    }

    #[test]
    fn test_decode_png_background() {
        let background = BackgroundImage::from_bytes(&png_bytes(5, 3)).unwrap();
        assert_eq!((background.width(), background.height()), (5, 3));
        assert!(matches!(background.to_background(), Background::Image(_)));
    }

    #[test]
    fn test_garbage_bytes_fail_to_decode() {
        assert!(matches!(
            BackgroundImage::from_bytes(b"definitely not an image"),
            Err(BackgroundError::Decode(_))
        ));
    }

    #[test]
    fn test_image_path_filter() {
        assert!(is_image_path(Path::new("photo.JPG")));
        assert!(is_image_path(Path::new("/tmp/a/b.png")));
        assert!(!is_image_path(Path::new("notes.txt")));
        assert!(!is_image_path(Path::new("no_extension")));
    }

    #[test]
    fn test_non_image_path_is_unsupported() {
        assert!(matches!(
            BackgroundImage::from_path(Path::new("readme.md")),
            Err(BackgroundError::Unsupported(_))
        ));
    }

    #[test]
    fn test_dropped_bytes_become_background() {
        let mut handler = FileHandler::new();
        handler.queue_dropped_files(vec![
            egui::DroppedFile {
                name: "notes.txt".to_owned(),
                ..Default::default()
            },
            egui::DroppedFile {
                name: "sky.png".to_owned(),
                mime: "image/png".to_owned(),
                bytes: Some(png_bytes(2, 2).into()),
                ..Default::default()
            },
        ]);

        let background = handler.take_background().unwrap().unwrap();
        assert_eq!(background.width(), 2);
        assert!(handler.take_background().is_none());
    }

    #[test]
    fn test_only_unsupported_drops_report_error() {
        let mut handler = FileHandler::new();
        handler.queue_dropped_files(vec![egui::DroppedFile {
            name: "notes.txt".to_owned(),
            ..Default::default()
        }]);
        assert!(matches!(
            handler.take_background(),
            Some(Err(BackgroundError::Unsupported(_)))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.png");
        assert!(matches!(
            BackgroundImage::from_path(&path),
            Err(BackgroundError::Io { .. })
        ));
    }
}
