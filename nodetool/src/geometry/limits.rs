// Centralized ingestion limits to harden against untrusted scene documents

pub const MAX_LAYERS: usize = 256;
pub const MAX_FEATURES_PER_LAYER: usize = 200_000;
pub const MAX_VERTICES_PER_FEATURE: usize = 100_000;
pub const MAX_VERTICES_TOTAL: usize = 4_000_000;

// Numeric bounds
pub const COORD_MIN: f64 = -1.0e12;
pub const COORD_MAX: f64 = 1.0e12;

#[inline]
pub fn in_coord_bounds(x: f64) -> bool { x.is_finite() && x >= COORD_MIN && x <= COORD_MAX }

#[inline]
pub fn point_in_bounds(p: crate::model::Point) -> bool { in_coord_bounds(p.x) && in_coord_bounds(p.y) }
