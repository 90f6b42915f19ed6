use serde::{Deserialize, Serialize};

pub type LayerId = u32;
pub type FeatureId = u64;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }
    pub fn distance_sq(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
    pub fn distance(&self, other: &Point) -> f64 {
        self.distance_sq(other).sqrt()
    }
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<[f64; 2]> for Point {
    fn from(v: [f64; 2]) -> Self {
        Point { x: v[0], y: v[1] }
    }
}

impl From<Point> for [f64; 2] {
    fn from(p: Point) -> Self {
        [p.x, p.y]
    }
}

/// Axis-aligned rectangle; `min`/`max` are kept normalized.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Point,
    pub max: Point,
}

impl Rect {
    pub fn from_corners(a: Point, b: Point) -> Self {
        Rect {
            min: Point::new(a.x.min(b.x), a.y.min(b.y)),
            max: Point::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }
    pub fn corners(&self) -> [Point; 4] {
        [
            self.min,
            Point::new(self.max.x, self.min.y),
            self.max,
            Point::new(self.min.x, self.max.y),
        ]
    }
    pub fn intersects(&self, other: &Rect) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }
    pub fn expanded(&self, by: f64) -> Rect {
        Rect { min: Point::new(self.min.x - by, self.min.y - by), max: Point::new(self.max.x + by, self.max.y + by) }
    }
    pub fn union(a: Option<Rect>, b: Rect) -> Rect {
        match a {
            None => b,
            Some(a) => Rect {
                min: Point::new(a.min.x.min(b.min.x), a.min.y.min(b.min.y)),
                max: Point::new(a.max.x.max(b.max.x), a.max.y.max(b.max.y)),
            },
        }
    }
}

/// Vector geometry addressed by a global vertex index across all parts/rings.
///
/// Polygon rings are stored closed (first point repeated at the end), and the
/// closing point counts as a vertex index of its own.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    Point(Option<Point>),
    MultiPoint(Vec<Point>),
    LineString(Vec<Point>),
    MultiLineString(Vec<Vec<Point>>),
    Polygon(Vec<Vec<Point>>),
}

impl Geometry {
    /// Copy of the geometry with every coordinate passed through `f`.
    pub fn map_points(&self, f: impl Fn(Point) -> Point) -> Geometry {
        let part = |pts: &Vec<Point>| pts.iter().map(|p| f(*p)).collect::<Vec<_>>();
        match self {
            Geometry::Point(p) => Geometry::Point(p.map(&f)),
            Geometry::MultiPoint(pts) => Geometry::MultiPoint(part(pts)),
            Geometry::LineString(pts) => Geometry::LineString(part(pts)),
            Geometry::MultiLineString(parts) => {
                Geometry::MultiLineString(parts.iter().map(part).collect())
            }
            Geometry::Polygon(rings) => Geometry::Polygon(rings.iter().map(part).collect()),
        }
    }

    pub fn bbox(&self) -> Option<Rect> {
        let mut out: Option<Rect> = None;
        for p in self.vertices() {
            out = Some(Rect::union(out, Rect { min: p, max: p }));
        }
        out
    }
}

/// Coordinate reference system of a layer, expressed as an affine mapping
/// from layer coordinates into the canvas (map) coordinates.
///
/// Two systems are "the same" when their codes match; the transform of the
/// map CRS itself is the identity.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Crs {
    pub code: u32,
    #[serde(default = "unit_scale")]
    pub scale: f64,
    #[serde(default)]
    pub offset: Point,
}

fn unit_scale() -> f64 {
    1.0
}

impl Crs {
    pub const fn map(code: u32) -> Self {
        Crs { code, scale: 1.0, offset: Point::new(0.0, 0.0) }
    }
    pub fn same_as(&self, other: &Crs) -> bool {
        self.code == other.code
    }
    pub fn to_map(&self, p: Point) -> Point {
        Point::new(p.x * self.scale + self.offset.x, p.y * self.scale + self.offset.y)
    }
    pub fn to_layer(&self, p: Point) -> Point {
        let s = if self.scale.abs() > 0.0 { self.scale } else { 1.0 };
        Point::new((p.x - self.offset.x) / s, (p.y - self.offset.y) / s)
    }
    pub fn rect_to_layer(&self, r: &Rect) -> Rect {
        Rect::from_corners(self.to_layer(r.min), self.to_layer(r.max))
    }
}

impl PartialEq for Crs {
    fn eq(&self, other: &Self) -> bool {
        self.same_as(other)
    }
}
