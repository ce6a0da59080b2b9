use egui::{Color32, Rect, pos2};

use crate::SketchApp;
use crate::app::CanvasSize;

pub fn central_panel(app: &mut SketchApp, ctx: &egui::Context) {
    egui::CentralPanel::default()
        .frame(egui::Frame::none())
        .show(ctx, |ui| {
            let (response, painter) = ui.allocate_painter(ui.available_size(), egui::Sense::drag());
            let canvas_rect = response.rect;

            // Handle input
            let over_canvas = response.hovered() || response.is_pointer_button_down_on();
            app.input_mut().set_canvas_rect(canvas_rect);
            let events = app.input_mut().process_input(ctx, over_canvas);
            for event in events {
                app.handle_input_event(event);
            }

            let pixels_per_point = ctx.pixels_per_point();
            let size = CanvasSize {
                pixels: [
                    (canvas_rect.width() * pixels_per_point).round() as u32,
                    (canvas_rect.height() * pixels_per_point).round() as u32,
                ],
                pixels_per_point,
            };
            app.set_canvas_size(size);

            // Render the canvas
            let background = app.background();
            if let Some(texture) = app.refresh_canvas(ctx, &background, size) {
                painter.image(
                    texture,
                    canvas_rect,
                    Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0)),
                    Color32::WHITE,
                );
            }
        });
}
