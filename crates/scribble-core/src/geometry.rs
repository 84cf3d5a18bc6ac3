//! 2D point helpers shared by the stage and the stroke renderer.

pub use kurbo::Point;

/// Horizontal offset that turns a stationary click into a visible dot.
pub const DOT_OFFSET: f64 = 0.1;

/// Calculate the point halfway between two points.
pub fn calc_middle_point(point1: Point, point2: Point) -> Point {
    Point::new(
        point1.x + (point2.x - point1.x) / 2.0,
        point1.y + (point2.y - point1.y) / 2.0,
    )
}
