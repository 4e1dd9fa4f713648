//! Closed paths for the ripple shape.
//!
//! Every shape is built once, centered at the origin and sized from
//! [`BASE_RADIUS`]. The surface places it each frame with a transform and
//! never rebuilds the path.

use kurbo::{BezPath, Circle, Shape};

/// Radius of the unscaled ripple shape, in device-independent units.
pub const BASE_RADIUS: f64 = 30.0;

/// Flattening tolerance used when converting the circle to a path.
const CIRCLE_TOLERANCE: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ShapeType {
    #[default]
    Circle,
    Heart,
    Triangle,
}

/// Build the path for `shape_type`.
pub fn produce_shape(shape_type: ShapeType) -> BezPath {
    match shape_type {
        ShapeType::Circle => circle_path(),
        ShapeType::Heart => heart_path(),
        ShapeType::Triangle => triangle_path(),
    }
}

fn circle_path() -> BezPath {
    Circle::new((0.0, 0.0), BASE_RADIUS).to_path(CIRCLE_TOLERANCE)
}

/// Two mirrored cubics between the top and bottom points.
fn heart_path() -> BezPath {
    let d = BASE_RADIUS * 2.0;
    let offset = -d / 2.0;

    let mut path = BezPath::new();
    path.move_to((0.0, offset));
    path.curve_to(
        (-d, offset - d / 2.0),
        (-d, offset + d / 2.0),
        (0.0, offset + d),
    );
    path.curve_to(
        (d, offset + d / 2.0),
        (d, offset - d / 2.0),
        (0.0, offset),
    );
    path.close_path();
    path
}

/// Equilateral triangle with its centroid at the origin.
fn triangle_path() -> BezPath {
    let d = BASE_RADIUS * 2.0;
    let top = -d * 2.0 / 3.0;
    let half_edge = d * 2.0 / 3f64.sqrt() / 2.0;

    let mut path = BezPath::new();
    path.move_to((0.0, top));
    path.line_to((-half_edge, -top / 2.0));
    path.line_to((half_edge, -top / 2.0));
    path.close_path();
    path
}
