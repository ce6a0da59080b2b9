use egui::{Context, Event, PointerButton, Pos2, Rect};

use crate::surface::DrawingSurface;

/// Gesture events in canvas-local points
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerDown(Pos2),
    PointerMove(Pos2),
    PointerUp(Pos2),
}

impl InputEvent {
    pub fn position(&self) -> Pos2 {
        match self {
            InputEvent::PointerDown(pos) | InputEvent::PointerMove(pos) | InputEvent::PointerUp(pos) => *pos,
        }
    }
}

/// Apply one gesture event to the surface using its current brush
pub fn route(event: InputEvent, surface: &mut DrawingSurface) {
    match event {
        InputEvent::PointerDown(pos) => surface.begin_stroke_with_brush(pos),
        InputEvent::PointerMove(pos) => surface.extend_stroke(pos),
        InputEvent::PointerUp(_) => {
            surface.finalize_stroke();
        }
    }
}

/// Primary-button pointer state for a single frame
#[derive(Debug, Clone, Default)]
pub struct PointerSample {
    /// Every position the pointer moved through this frame, in order
    pub path: Vec<Pos2>,
    /// Latest pointer position in screen points, `None` once it leaves the window
    pub position: Option<Pos2>,
    pub pressed: bool,
    pub released: bool,
    /// Whether the canvas is the topmost widget under the pointer
    pub over_canvas: bool,
}

/// Turns raw egui pointer input into a well-formed down, move*, up stream.
///
/// A gesture only starts on a press over the canvas, and an open gesture is
/// always closed, either by the release or by the pointer leaving the window.
#[derive(Debug)]
pub struct InputHandler {
    canvas_rect: Rect,
    gesture_active: bool,
    last_pointer_pos: Option<Pos2>,
}

impl InputHandler {
    pub fn new(canvas_rect: Rect) -> Self {
        Self {
            canvas_rect,
            gesture_active: false,
            last_pointer_pos: None,
        }
    }

    /// Update the canvas rectangle (e.g. if window is resized)
    pub fn set_canvas_rect(&mut self, rect: Rect) {
        self.canvas_rect = rect;
    }

    pub fn is_gesture_active(&self) -> bool {
        self.gesture_active
    }

    fn to_canvas(&self, pos: Pos2) -> Pos2 {
        (pos - self.canvas_rect.min).to_pos2()
    }

    /// Read this frame's pointer state from egui and translate it
    pub fn process_input(&mut self, ctx: &Context, over_canvas: bool) -> Vec<InputEvent> {
        let sample = ctx.input(|input| PointerSample {
            path: input
                .events
                .iter()
                .filter_map(|event| match event {
                    Event::PointerMoved(pos) => Some(*pos),
                    _ => None,
                })
                .collect(),
            position: input.pointer.latest_pos(),
            pressed: input.pointer.button_pressed(PointerButton::Primary),
            released: input.pointer.button_released(PointerButton::Primary),
            over_canvas,
        });
        self.process_sample(sample)
    }

    pub fn process_sample(&mut self, sample: PointerSample) -> Vec<InputEvent> {
        let mut events = Vec::new();
        let resumed = self.gesture_active;

        if !self.gesture_active && sample.pressed {
            if let Some(pos) = sample.position {
                if sample.over_canvas && self.canvas_rect.contains(pos) {
                    events.push(InputEvent::PointerDown(self.to_canvas(pos)));
                    self.gesture_active = true;
                    self.last_pointer_pos = Some(pos);
                }
            }
        }

        if !self.gesture_active {
            return events;
        }

        // Moves from the frame a gesture starts in may predate the press
        let path: &[Pos2] = if resumed { &sample.path } else { &[] };
        for &pos in path.iter().chain(sample.position.as_ref()) {
            if Some(pos) != self.last_pointer_pos {
                events.push(InputEvent::PointerMove(self.to_canvas(pos)));
                self.last_pointer_pos = Some(pos);
            }
        }

        if sample.released || sample.position.is_none() {
            let end = self.last_pointer_pos.unwrap_or(self.canvas_rect.min);
            events.push(InputEvent::PointerUp(self.to_canvas(end)));
            self.gesture_active = false;
            self.last_pointer_pos = None;
        }

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{pos2, vec2};

    fn handler() -> InputHandler {
        InputHandler::new(Rect::from_min_size(pos2(100.0, 50.0), vec2(200.0, 100.0)))
    }

    fn at(x: f32, y: f32) -> PointerSample {
        PointerSample {
            position: Some(pos2(x, y)),
            over_canvas: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_gesture_is_translated_to_canvas_space() {
        let mut h = handler();
        let down = h.process_sample(PointerSample { pressed: true, ..at(110.0, 60.0) });
        assert_eq!(down, vec![InputEvent::PointerDown(pos2(10.0, 10.0))]);

        let moved = h.process_sample(at(120.0, 60.0));
        assert_eq!(moved, vec![InputEvent::PointerMove(pos2(20.0, 10.0))]);

        let unchanged = h.process_sample(at(120.0, 60.0));
        assert!(unchanged.is_empty());

        let up = h.process_sample(PointerSample { released: true, ..at(120.0, 60.0) });
        assert_eq!(up, vec![InputEvent::PointerUp(pos2(20.0, 10.0))]);
        assert!(!h.is_gesture_active());
    }

    #[test]
    fn test_every_move_in_a_frame_becomes_a_point() {
        let mut h = handler();
        h.process_sample(PointerSample { pressed: true, ..at(110.0, 60.0) });

        let events = h.process_sample(PointerSample {
            path: vec![pos2(115.0, 60.0), pos2(120.0, 65.0), pos2(125.0, 70.0)],
            ..at(125.0, 70.0)
        });
        assert_eq!(
            events,
            vec![
                InputEvent::PointerMove(pos2(15.0, 10.0)),
                InputEvent::PointerMove(pos2(20.0, 15.0)),
                InputEvent::PointerMove(pos2(25.0, 20.0)),
            ]
        );
    }

    #[test]
    fn test_moves_before_the_press_are_not_replayed() {
        let mut h = handler();
        let events = h.process_sample(PointerSample {
            pressed: true,
            path: vec![pos2(105.0, 55.0), pos2(110.0, 60.0)],
            ..at(110.0, 60.0)
        });
        assert_eq!(events, vec![InputEvent::PointerDown(pos2(10.0, 10.0))]);
    }

    #[test]
    fn test_press_outside_canvas_is_ignored() {
        let mut h = handler();
        assert!(h.process_sample(PointerSample { pressed: true, ..at(10.0, 10.0) }).is_empty());
        assert!(h.process_sample(at(150.0, 60.0)).is_empty());
        assert!(!h.is_gesture_active());
    }

    #[test]
    fn test_press_under_another_widget_is_ignored() {
        let mut h = handler();
        let sample = PointerSample {
            pressed: true,
            over_canvas: false,
            ..at(150.0, 60.0)
        };
        assert!(h.process_sample(sample).is_empty());
    }

    #[test]
    fn test_pointer_leaving_window_closes_gesture() {
        let mut h = handler();
        h.process_sample(PointerSample { pressed: true, ..at(110.0, 60.0) });
        let events = h.process_sample(PointerSample::default());
        assert_eq!(events, vec![InputEvent::PointerUp(pos2(10.0, 10.0))]);
        assert!(!h.is_gesture_active());
    }

    #[test]
    fn test_tap_within_one_frame() {
        let mut h = handler();
        let events = h.process_sample(PointerSample {
            pressed: true,
            released: true,
            ..at(110.0, 60.0)
        });
        assert_eq!(
            events,
            vec![
                InputEvent::PointerDown(pos2(10.0, 10.0)),
                InputEvent::PointerUp(pos2(10.0, 10.0)),
            ]
        );
    }

    #[test]
    fn test_route_drives_surface() {
        let mut surface = DrawingSurface::new();
        for event in [
            InputEvent::PointerDown(pos2(0.0, 0.0)),
            InputEvent::PointerMove(pos2(4.0, 0.0)),
            InputEvent::PointerUp(pos2(9.0, 9.0)),
        ] {
            route(event, &mut surface);
        }
        assert_eq!(surface.strokes().len(), 1);
        assert_eq!(surface.strokes()[0].points(), &[pos2(0.0, 0.0), pos2(4.0, 0.0)]);
    }
}
