use std::path::{Path, PathBuf};
use std::time::Duration;

use egui::{Context, TextureHandle, TextureOptions};

use crate::background::{BackgroundImage, FileDialogPicker, FileHandler, ImagePicker};
use crate::brush::{BrushSize, PaintColor};
use crate::config::SketchConfig;
use crate::export::{ExportQueue, ExportResult, ExportSnapshot, ExportStatus, ExportTicket};
use crate::input::{InputEvent, InputHandler, route};
use crate::notifications::Notifications;
use crate::panels;
use crate::renderer::{Background, RenderTarget};
use crate::share::{Share, share_for};
use crate::surface::DrawingSurface;

/// Canvas size in pixels plus the scale it was measured at
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasSize {
    pub pixels: [u32; 2],
    pub pixels_per_point: f32,
}

/// Texture holding the last rendered canvas, re-rendered only when its inputs change.
/// The render target is kept between frames so a scaled background is reused.
#[derive(Default)]
pub(crate) struct CanvasTexture {
    texture: Option<TextureHandle>,
    target: Option<RenderTarget>,
    key: Option<(u64, CanvasSize, Background)>,
}

impl CanvasTexture {
    pub(crate) fn refresh(
        &mut self,
        ctx: &Context,
        surface: &DrawingSurface,
        background: &Background,
        size: CanvasSize,
    ) -> Option<&TextureHandle> {
        let [width, height] = size.pixels;
        if width == 0 || height == 0 {
            return None;
        }

        let key = (surface.revision(), size, background.clone());
        if self.texture.is_some() && self.key.as_ref() == Some(&key) {
            return self.texture.as_ref();
        }

        let Some(target) = self.target_for(size) else {
            self.texture = None;
            self.key = None;
            return None;
        };
        surface.render(target, background);
        let image = target.to_color_image();

        match &mut self.texture {
            Some(texture) => texture.set(image, TextureOptions::NEAREST),
            None => {
                self.texture = Some(ctx.load_texture("canvas", image, TextureOptions::NEAREST));
            }
        }
        self.key = Some(key);
        self.texture.as_ref()
    }

    /// The kept render target, reallocated only when the canvas size changes
    fn target_for(&mut self, size: CanvasSize) -> Option<&mut RenderTarget> {
        let [width, height] = size.pixels;
        let reusable = self.target.as_ref().is_some_and(|target| {
            target.width() == width
                && target.height() == height
                && target.pixels_per_point() == size.pixels_per_point
        });

        if !reusable {
            match RenderTarget::new(width, height) {
                Ok(target) => {
                    self.target = Some(target.with_pixels_per_point(size.pixels_per_point));
                }
                Err(err) => {
                    log::error!("Failed to render canvas: {}", err);
                    self.target = None;
                }
            }
        }
        self.target.as_mut()
    }
}

/// Owns all application state and routes input to the drawing surface
pub struct SketchApp {
    config: SketchConfig,
    surface: DrawingSurface,
    background_image: Option<BackgroundImage>,
    input: InputHandler,
    files: FileHandler,
    picker: Box<dyn ImagePicker>,
    exports: Option<ExportQueue>,
    tickets: Vec<ExportTicket>,
    share: Box<dyn Share>,
    notifications: Notifications,
    canvas: CanvasTexture,
    canvas_size: Option<CanvasSize>,
    pub(crate) show_brush_dialog: bool,
}

impl SketchApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let config = cc
            .storage
            .and_then(|storage| eframe::get_value::<SketchConfig>(storage, eframe::APP_KEY))
            .unwrap_or_else(SketchConfig::from_env)
            .with_env_overrides();
        Self::with_config(config)
    }

    /// Build the app without a window, e.g. for tests
    pub fn with_config(config: SketchConfig) -> Self {
        let exports = match ExportQueue::new(config.export_dir.clone()) {
            Ok(queue) => Some(queue),
            Err(err) => {
                log::error!("Export is unavailable: {}", err);
                None
            }
        };

        Self {
            surface: DrawingSurface::with_brush(config.brush()),
            share: share_for(config.share_after_export),
            config,
            background_image: None,
            input: InputHandler::new(egui::Rect::NOTHING),
            files: FileHandler::new(),
            picker: Box::new(FileDialogPicker),
            exports,
            tickets: Vec::new(),
            notifications: Notifications::default(),
            canvas: CanvasTexture::default(),
            canvas_size: None,
            show_brush_dialog: false,
        }
    }

    pub fn config(&self) -> &SketchConfig {
        &self.config
    }

    pub fn surface(&self) -> &DrawingSurface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut DrawingSurface {
        &mut self.surface
    }

    pub fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    pub(crate) fn input_mut(&mut self) -> &mut InputHandler {
        &mut self.input
    }

    pub fn handle_input_event(&mut self, event: InputEvent) {
        route(event, &mut self.surface);
    }

    pub fn select_color(&mut self, color: PaintColor) {
        log::info!("Color selected: {}", color.label());
        self.config.color = color;
        self.surface.set_color(color.color32());
    }

    pub fn select_brush_size(&mut self, size: BrushSize) {
        log::info!("Brush size selected: {}", size.label());
        self.config.brush_size = size;
        if let Err(err) = self.surface.set_thickness(size.thickness()) {
            log::error!("Rejected brush size {}: {}", size.label(), err);
        }
    }

    pub fn set_share_after_export(&mut self, enabled: bool) {
        self.config.share_after_export = enabled;
        self.share = share_for(enabled);
    }

    pub fn undo(&mut self) {
        self.surface.undo();
    }

    pub fn clear(&mut self) {
        self.surface.clear();
    }

    /// Image background if one is loaded, otherwise the configured solid color
    pub fn background(&self) -> Background {
        match &self.background_image {
            Some(image) => image.to_background(),
            None => Background::Solid(self.config.canvas_background.color32()),
        }
    }

    pub fn has_background_image(&self) -> bool {
        self.background_image.is_some()
    }

    pub fn set_background(&mut self, image: BackgroundImage) {
        log::info!("Background set: {}x{}", image.width(), image.height());
        self.background_image = Some(image);
    }

    pub fn clear_background(&mut self) {
        self.background_image = None;
    }

    /// Replace the dialog used by `pick_background`
    pub fn set_image_picker(&mut self, picker: Box<dyn ImagePicker>) {
        self.picker = picker;
    }

    /// Ask the user for an image and use it as the background.
    /// Cancelling leaves the current background in place.
    pub fn pick_background(&mut self) {
        match self.picker.pick_image() {
            Some(path) => self.load_background_from_path(&path),
            None => log::debug!("Background picker cancelled"),
        }
    }

    pub fn load_background_from_path(&mut self, path: &Path) {
        match BackgroundImage::from_path(path) {
            Ok(image) => self.set_background(image),
            Err(err) => {
                log::error!("{}", err);
                self.notifications.error(err.to_string());
            }
        }
    }

    pub(crate) fn handle_dropped_files(&mut self, ctx: &Context) {
        self.files.preview_files_being_dropped(ctx);
        if !self.files.check_for_dropped_files(ctx) {
            return;
        }
        match self.files.take_background() {
            Some(Ok(image)) => self.set_background(image),
            Some(Err(err)) => self.notifications.error(err.to_string()),
            None => {}
        }
    }

    pub fn canvas_size(&self) -> Option<CanvasSize> {
        self.canvas_size
    }

    pub fn set_canvas_size(&mut self, size: CanvasSize) {
        self.canvas_size = Some(size);
    }

    pub(crate) fn refresh_canvas(
        &mut self,
        ctx: &Context,
        background: &Background,
        size: CanvasSize,
    ) -> Option<egui::TextureId> {
        self.canvas
            .refresh(ctx, &self.surface, background, size)
            .map(TextureHandle::id)
    }

    pub fn export_status(&self) -> ExportStatus {
        self.exports.as_ref().map(ExportQueue::status).unwrap_or_default()
    }

    pub fn export_dir(&self) -> PathBuf {
        self.config.export_dir.clone()
    }

    /// Snapshot the canvas and queue it for export.
    /// Returns false, after telling the user why, if nothing was queued.
    pub fn request_export(&mut self) -> bool {
        let Some(queue) = &self.exports else {
            self.notifications.error("Export is unavailable");
            return false;
        };
        let Some(size) = self.canvas_size else {
            self.notifications.error("Canvas is not ready yet");
            return false;
        };

        let [width, height] = size.pixels;
        let snapshot = ExportSnapshot::capture(
            &self.surface,
            &self.background(),
            width,
            height,
            size.pixels_per_point,
        );
        self.tickets.push(queue.request(snapshot));
        true
    }

    pub fn pending_exports(&self) -> usize {
        self.tickets.len()
    }

    /// Collect finished exports; one notification per finished request
    pub fn poll_exports(&mut self) {
        let mut outcomes = Vec::new();
        self.tickets.retain_mut(|ticket| match ticket.try_outcome() {
            Some(outcome) => {
                outcomes.push(outcome);
                false
            }
            None => true,
        });

        for outcome in outcomes {
            self.report_export(outcome);
        }
    }

    fn report_export(&mut self, outcome: ExportResult) {
        match outcome {
            Ok(path) => {
                self.notifications.info(format!("File saved successfully: {}", path.display()));
                if let Err(err) = self.share.share(&path) {
                    log::warn!("{}", err);
                }
            }
            Err(err) => {
                self.notifications
                    .error(format!("Something went wrong while saving the file: {}", err));
            }
        }
    }
}

impl eframe::App for SketchApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, &self.config);
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        if ctx.input_mut(|i| i.consume_key(egui::Modifiers::COMMAND, egui::Key::Z)) {
            self.undo();
        }

        panels::toolbar(self, ctx);
        panels::brush_dialog(self, ctx);
        panels::central_panel(self, ctx);
        self.handle_dropped_files(ctx);

        self.poll_exports();
        if !self.tickets.is_empty() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
        self.notifications.show(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifications::NotificationKind;
    use egui::pos2;
    use image::{Rgba, RgbaImage};
    use tempfile::{TempDir, tempdir};

    struct FixedPicker(Option<PathBuf>);

    impl ImagePicker for FixedPicker {
        fn pick_image(&self) -> Option<PathBuf> {
            self.0.clone()
        }
    }

    fn test_app() -> (TempDir, SketchApp) {
        let dir = tempdir().unwrap();
        let app = SketchApp::with_config(SketchConfig {
            export_dir: dir.path().join("exports"),
            share_after_export: false,
            ..Default::default()
        });
        (dir, app)
    }

    fn wait_for_exports(app: &mut SketchApp) {
        for _ in 0..1000 {
            app.poll_exports();
            if app.pending_exports() == 0 {
                return;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        panic!("exports did not finish");
    }

    #[test]
    fn test_brush_selection_reaches_surface() {
        let (_dir, mut app) = test_app();
        app.select_color(PaintColor::Red);
        app.select_brush_size(BrushSize::Large);
        assert_eq!(app.surface().brush().color, PaintColor::Red.color32());
        assert_eq!(app.surface().brush().thickness, 30.0);
        assert_eq!(app.config().brush_size, BrushSize::Large);
    }

    #[test]
    fn test_input_events_build_strokes() {
        let (_dir, mut app) = test_app();
        app.handle_input_event(InputEvent::PointerDown(pos2(1.0, 1.0)));
        app.handle_input_event(InputEvent::PointerMove(pos2(5.0, 1.0)));
        app.handle_input_event(InputEvent::PointerUp(pos2(5.0, 1.0)));
        assert_eq!(app.surface().strokes().len(), 1);
        app.undo();
        assert!(app.surface().strokes().is_empty());
    }

    #[test]
    fn test_export_before_first_frame_is_reported() {
        let (_dir, mut app) = test_app();
        assert!(!app.request_export());
        assert_eq!(app.notifications().sent().len(), 1);
        assert_eq!(app.notifications().sent()[0].kind, NotificationKind::Error);
    }

    #[test]
    fn test_each_export_gets_exactly_one_notification() {
        let (_dir, mut app) = test_app();
        app.set_canvas_size(CanvasSize {
            pixels: [16, 8],
            pixels_per_point: 1.0,
        });

        assert!(app.request_export());
        assert!(app.request_export());
        wait_for_exports(&mut app);
        app.poll_exports();

        let sent = app.notifications().sent();
        assert_eq!(sent.len(), 2);
        assert!(sent.iter().all(|n| n.kind == NotificationKind::Info));
        assert_eq!(app.export_status().succeeded, 2);
    }

    #[test]
    fn test_background_falls_back_to_configured_color() {
        let (_dir, app) = test_app();
        assert_eq!(app.background(), Background::Solid(egui::Color32::WHITE));
        assert!(!app.has_background_image());
    }

    #[test]
    fn test_picked_image_becomes_background() {
        let (dir, mut app) = test_app();
        let path = dir.path().join("beach.png");
        RgbaImage::from_pixel(3, 2, Rgba([0, 90, 200, 255])).save(&path).unwrap();

        app.set_image_picker(Box::new(FixedPicker(Some(path))));
        app.pick_background();

        assert!(app.has_background_image());
        assert!(matches!(app.background(), Background::Image(ref image) if image.dimensions() == (3, 2)));
        assert!(app.notifications().sent().is_empty());
    }

    #[test]
    fn test_cancelled_pick_keeps_background() {
        let (_dir, mut app) = test_app();
        app.set_image_picker(Box::new(FixedPicker(None)));
        app.pick_background();
        assert!(!app.has_background_image());
        assert!(app.notifications().sent().is_empty());
    }

    #[test]
    fn test_unreadable_pick_is_reported() {
        let (dir, mut app) = test_app();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not a png").unwrap();

        app.set_image_picker(Box::new(FixedPicker(Some(path))));
        app.pick_background();

        assert!(!app.has_background_image());
        assert_eq!(app.notifications().sent()[0].kind, NotificationKind::Error);
    }
}
