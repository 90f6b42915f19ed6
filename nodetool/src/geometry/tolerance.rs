// Centralized tolerances for coordinate comparisons

// One policy for every boundary test: distance checks and rectangle
// containment both treat points within EPS_COORD (map or layer units) as touching.
pub const EPS_COORD: f64 = 1e-9;
pub const EPS_LEN: f64 = 1e-12; // zero-length direction vector threshold

#[inline]
pub fn within_tolerance(d: f64, tol: f64) -> bool { d <= tol.max(0.0) + EPS_COORD }

#[inline]
pub fn rect_contains(r: &crate::model::Rect, p: crate::model::Point) -> bool {
    p.x >= r.min.x - EPS_COORD && p.x <= r.max.x + EPS_COORD
        && p.y >= r.min.y - EPS_COORD && p.y <= r.max.y + EPS_COORD
}

#[inline]
pub fn norm2(x: f64, y: f64) -> Option<(f64, f64)> {
    let len = (x*x + y*y).sqrt();
    if len > EPS_LEN { Some((x/len, y/len)) } else { None }
}
