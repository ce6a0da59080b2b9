use egui::{Pos2, Rect};

/// Distance from `point` to the closest point on the segment `line_start..line_end`.
/// A zero-length segment is treated as a single point.
pub(crate) fn distance_to_line_segment(point: Pos2, line_start: Pos2, line_end: Pos2) -> f32 {
    let line_vec = line_end - line_start;
    let point_vec = point - line_start;

    let len_sq = line_vec.length_sq();
    if len_sq == 0.0 {
        return point_vec.length();
    }

    let t = ((point_vec.x * line_vec.x + point_vec.y * line_vec.y) / len_sq).clamp(0.0, 1.0);
    let projection = line_start + line_vec * t;
    (point - projection).length()
}

/// Bounding box of `points` grown by `padding` on every side
pub(crate) fn calculate_bounds(points: &[Pos2], padding: f32) -> Rect {
    if points.is_empty() {
        return Rect::NOTHING;
    }

    Rect::from_points(points).expand(padding)
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    #[test]
    fn test_distance_to_segment_interior_and_ends() {
        let a = pos2(0.0, 0.0);
        let b = pos2(10.0, 0.0);
        assert_eq!(distance_to_line_segment(pos2(5.0, 3.0), a, b), 3.0);
        assert_eq!(distance_to_line_segment(pos2(-4.0, 3.0), a, b), 5.0);
        assert_eq!(distance_to_line_segment(pos2(13.0, 4.0), a, b), 5.0);
    }

    #[test]
    fn test_distance_to_degenerate_segment() {
        let p = pos2(2.0, 2.0);
        assert_eq!(distance_to_line_segment(pos2(5.0, 6.0), p, p), 5.0);
    }

    #[test]
    fn test_bounds_padding() {
        let rect = calculate_bounds(&[pos2(1.0, 2.0), pos2(4.0, -1.0)], 1.0);
        assert_eq!(rect.min, pos2(0.0, -2.0));
        assert_eq!(rect.max, pos2(5.0, 3.0));
        assert_eq!(calculate_bounds(&[], 1.0), Rect::NOTHING);
    }
}
