//! Converts drawn outlines into TrueType contours.

use crate::data::{Outline, Point};
use ttf_parser::OutlineBuilder;

/// Collects the outline drawn by `ttf-parser` as quadratic contours.
///
/// Cubic segments, as found in CFF fonts, are approximated by two quadratic segments each.
#[derive(Debug, Default)]
pub(crate) struct QuadraticPen {
    contours: Vec<Vec<Point>>,
    current: Vec<Point>,
    last: (f32, f32),
}

impl QuadraticPen {
    pub(crate) fn new() -> Self {
        QuadraticPen::default()
    }

    pub(crate) fn finish(mut self) -> Outline {
        self.end_contour();
        Outline {
            contours: self.contours,
        }
    }

    fn end_contour(&mut self) {
        if self.current.len() > 1 {
            let first = self.current[0];
            if self.current.last() == Some(&first) {
                self.current.pop();
            }
        }
        if !self.current.is_empty() {
            self.contours.push(std::mem::take(&mut self.current));
        }
    }

    fn push(&mut self, x: f32, y: f32, on_curve: bool) {
        self.current.push(Point {
            x: to_font_unit(x),
            y: to_font_unit(y),
            on_curve,
        });
        if on_curve {
            self.last = (x, y);
        }
    }
}

fn to_font_unit(value: f32) -> i16 {
    value.round().clamp(i16::MIN as f32, i16::MAX as f32) as i16
}

impl OutlineBuilder for QuadraticPen {
    fn move_to(&mut self, x: f32, y: f32) {
        self.end_contour();
        self.push(x, y, true);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.push(x, y, true);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.push(x1, y1, false);
        self.push(x, y, true);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (x0, y0) = self.last;

        // split at t = 0.5 (de Casteljau)
        let (ax, ay) = ((x0 + x1) / 2.0, (y0 + y1) / 2.0);
        let (bx, by) = ((x1 + x2) / 2.0, (y1 + y2) / 2.0);
        let (cx, cy) = ((x2 + x) / 2.0, (y2 + y) / 2.0);
        let (dx, dy) = ((ax + bx) / 2.0, (ay + by) / 2.0);
        let (ex, ey) = ((bx + cx) / 2.0, (by + cy) / 2.0);
        let (mx, my) = ((dx + ex) / 2.0, (dy + ey) / 2.0);

        // each half as a single quadratic with control point (3 (c1 + c2) - (p0 + p3)) / 4
        let q1 = (
            (3.0 * (ax + dx) - (x0 + mx)) / 4.0,
            (3.0 * (ay + dy) - (y0 + my)) / 4.0,
        );
        let q2 = (
            (3.0 * (ex + cx) - (mx + x)) / 4.0,
            (3.0 * (ey + cy) - (my + y)) / 4.0,
        );

        self.quad_to(q1.0, q1.1, mx, my);
        self.quad_to(q2.0, q2.1, x, y);
    }

    fn close(&mut self) {
        self.end_contour();
    }
}
