use egui::{Color32, Stroke, vec2};

use crate::SketchApp;
use crate::brush::{BrushSize, PaintColor};

const SELECTED_OUTLINE: Color32 = Color32::from_rgb(33, 150, 243);

pub fn toolbar(app: &mut SketchApp, ctx: &egui::Context) {
    egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
        ui.horizontal_wrapped(|ui| {
            // Palette
            for color in PaintColor::ALL {
                let selected = app.config().color == color;
                let outline = if selected {
                    Stroke::new(3.0, SELECTED_OUTLINE)
                } else {
                    Stroke::new(1.0, Color32::GRAY)
                };
                let swatch = egui::Button::new("")
                    .fill(color.color32())
                    .stroke(outline)
                    .min_size(vec2(24.0, 24.0));
                if ui.add(swatch).on_hover_text(color.label()).clicked() && !selected {
                    app.select_color(color);
                }
            }

            ui.separator();

            if ui
                .button(format!("🖌 {}", app.config().brush_size.label()))
                .on_hover_text("Brush size")
                .clicked()
            {
                app.show_brush_dialog = true;
            }

            let can_undo = app.surface().can_undo();
            if ui.add_enabled(can_undo, egui::Button::new("⟲ Undo")).clicked() {
                app.undo();
            }
            if ui.add_enabled(can_undo, egui::Button::new("Clear")).clicked() {
                app.clear();
            }

            ui.separator();

            if ui
                .button("🖼 Open…")
                .on_hover_text("Choose a background image, or drop one onto the window")
                .clicked()
            {
                app.pick_background();
            }
            let has_background = app.has_background_image();
            if ui.add_enabled(has_background, egui::Button::new("Remove background")).clicked() {
                app.clear_background();
            }

            ui.separator();

            if ui.button("💾 Export").clicked() {
                app.request_export();
            }
            if app.export_status().is_busy() {
                ui.add(egui::Spinner::new());
            }

            let mut share = app.config().share_after_export;
            if ui.checkbox(&mut share, "Open after export").changed() {
                app.set_share_after_export(share);
            }
        });
    });
}

pub fn brush_dialog(app: &mut SketchApp, ctx: &egui::Context) {
    if !app.show_brush_dialog {
        return;
    }

    let mut open = true;
    let mut chosen = None;
    let current = app.config().brush_size;

    egui::Window::new("Brush size")
        .collapsible(false)
        .resizable(false)
        .open(&mut open)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                for size in BrushSize::ALL {
                    let label = format!("{} ({})", size.label(), size.thickness());
                    if ui.selectable_label(current == size, label).clicked() {
                        chosen = Some(size);
                    }
                }
            });
        });

    if let Some(size) = chosen {
        app.select_brush_size(size);
        open = false;
    }
    app.show_brush_dialog = open;
}
