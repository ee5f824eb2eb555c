//! Recording outlines and converting them to quadratic curves.

use kurbo::{BezPath, CubicBez, PathEl, Point};
use skrifa::outline::OutlinePen;

/// Maximum distance, in font units, between a cubic curve and its quadratic
/// approximation.
pub const CURVE_TOLERANCE: f64 = 1.0;

/// Pen that records drawing commands into a kurbo path.
///
/// The recorded path may contain cubic segments; see [`to_quadratic`].
#[derive(Clone, Debug, Default)]
pub struct PathPen {
    path: BezPath,
}

impl PathPen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_inner(self) -> BezPath {
        self.path
    }
}

impl OutlinePen for PathPen {
    fn move_to(&mut self, x: f32, y: f32) {
        self.path.move_to(point(x, y));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.path.line_to(point(x, y));
    }

    fn quad_to(&mut self, cx0: f32, cy0: f32, x: f32, y: f32) {
        self.path.quad_to(point(cx0, cy0), point(x, y));
    }

    fn curve_to(&mut self, cx0: f32, cy0: f32, cx1: f32, cy1: f32, x: f32, y: f32) {
        self.path
            .curve_to(point(cx0, cy0), point(cx1, cy1), point(x, y));
    }

    fn close(&mut self) {
        self.path.close_path();
    }
}

fn point(x: f32, y: f32) -> Point {
    Point::new(x as f64, y as f64)
}

/// Replace every cubic segment of `path` with quadratic segments that stay
/// within `accuracy` of the original curve.
///
/// Lines and quadratic segments are passed through unchanged, as is contour
/// direction.
pub fn to_quadratic(path: &BezPath, accuracy: f64) -> BezPath {
    let mut out = BezPath::new();
    let mut start = Point::ZERO;
    let mut current = Point::ZERO;
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => {
                out.move_to(p);
                start = p;
                current = p;
            }
            PathEl::LineTo(p) => {
                out.line_to(p);
                current = p;
            }
            PathEl::QuadTo(c, p) => {
                out.quad_to(c, p);
                current = p;
            }
            PathEl::CurveTo(c0, c1, p) => {
                push_cubic(&mut out, CubicBez::new(current, c0, c1, p), accuracy);
                current = p;
            }
            PathEl::ClosePath => {
                out.close_path();
                current = start;
            }
        }
    }
    out
}

fn push_cubic(out: &mut BezPath, cubic: CubicBez, accuracy: f64) {
    let Some(spline) = cubic.approx_spline(accuracy) else {
        // fitting a single spline failed, fall back to independent pieces
        for (_, _, quad) in cubic.to_quads(accuracy) {
            out.quad_to(quad.p1, quad.p2);
        }
        return;
    };
    // first and last points are on-curve, everything between is off-curve
    // with implied on-curve points at the midpoints.
    let points = spline.points();
    let n = points.len();
    if n < 3 {
        out.line_to(cubic.p3);
        return;
    }
    for i in 1..n - 1 {
        let ctrl = points[i];
        let end = if i + 2 == n {
            points[n - 1]
        } else {
            ctrl.midpoint(points[i + 1])
        };
        out.quad_to(ctrl, end);
    }
}
