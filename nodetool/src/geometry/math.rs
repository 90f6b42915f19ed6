use crate::model::Point;

/// Squared distance from `p` to segment `a`-`b` and the clamped parameter of
/// the projection.
pub fn seg_distance_sq(p: Point, a: Point, b: Point) -> (f64, f64) {
    let vx = b.x - a.x; let vy = b.y - a.y;
    let wx = p.x - a.x; let wy = p.y - a.y;
    let vv = vx*vx + vy*vy;
    let mut t = if vv > 0.0 { (wx*vx + wy*vy) / vv } else { 0.0 };
    if t < 0.0 { t = 0.0; } else if t > 1.0 { t = 1.0; }
    let proj = Point::new(a.x + t * vx, a.y + t * vy);
    (p.distance_sq(&proj), t)
}

pub fn lerp(a: Point, b: Point, t: f64) -> Point {
    Point::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
}

pub fn midpoint(a: Point, b: Point) -> Point { lerp(a, b, 0.5) }
