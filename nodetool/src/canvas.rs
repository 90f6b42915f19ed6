use crate::model::{Crs, Point, Rect};
use serde::{Deserialize, Serialize};

/// Screen/map relationship of the canvas: `origin` is the map coordinate
/// under screen pixel (0, 0); screen y grows downwards, map y upwards.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapCanvas {
    pub origin: Point,
    pub map_units_per_pixel: f64,
    pub crs: Crs,
}

impl Default for MapCanvas {
    fn default() -> Self {
        MapCanvas { origin: Point::new(0.0, 0.0), map_units_per_pixel: 1.0, crs: Crs::map(0) }
    }
}

impl MapCanvas {
    pub fn new(origin: Point, map_units_per_pixel: f64, crs: Crs) -> Self {
        MapCanvas { origin, map_units_per_pixel, crs }
    }

    pub fn to_map(&self, screen: Point) -> Point {
        Point::new(
            self.origin.x + screen.x * self.map_units_per_pixel,
            self.origin.y - screen.y * self.map_units_per_pixel,
        )
    }

    pub fn to_screen(&self, map: Point) -> Point {
        let s = self.map_units_per_pixel;
        Point::new((map.x - self.origin.x) / s, (self.origin.y - map.y) / s)
    }

    pub fn rect_to_map(&self, a: Point, b: Point) -> Rect {
        Rect::from_corners(self.to_map(a), self.to_map(b))
    }

    /// Map-unit length of `px` screen pixels at the current scale.
    pub fn tolerance(&self, px: f64) -> f64 {
        px * self.map_units_per_pixel
    }
}
