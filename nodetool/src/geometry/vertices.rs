use crate::model::{Geometry, Point};
use serde::{Deserialize, Serialize};

/// Part-local address of a vertex slot. `vertex` may equal the part length
/// when used as an insertion position (append after the last vertex).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VertexPosition {
    pub part: usize,
    pub vertex: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteStatus {
    Success,
    EmptyGeometry,
    Failure,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PartKind {
    Point,
    Line,
    Ring,
}

// Smallest closed ring that still encloses an area: 3 distinct + closing point.
const MIN_RING_LEN: usize = 4;
const MIN_LINE_LEN: usize = 2;

impl Geometry {
    fn parts(&self) -> Vec<(PartKind, &[Point])> {
        match self {
            Geometry::Point(p) => p
                .iter()
                .map(|p| (PartKind::Point, std::slice::from_ref(p)))
                .collect(),
            Geometry::MultiPoint(pts) => pts
                .iter()
                .map(|p| (PartKind::Point, std::slice::from_ref(p)))
                .collect(),
            Geometry::LineString(pts) if pts.is_empty() => Vec::new(),
            Geometry::LineString(pts) => vec![(PartKind::Line, pts.as_slice())],
            Geometry::MultiLineString(parts) => {
                parts.iter().map(|p| (PartKind::Line, p.as_slice())).collect()
            }
            Geometry::Polygon(rings) => {
                rings.iter().map(|r| (PartKind::Ring, r.as_slice())).collect()
            }
        }
    }

    fn linear_part_mut(&mut self, part: usize) -> Option<(PartKind, &mut Vec<Point>)> {
        match self {
            Geometry::LineString(pts) if part == 0 => Some((PartKind::Line, pts)),
            Geometry::MultiLineString(parts) => parts.get_mut(part).map(|p| (PartKind::Line, p)),
            Geometry::Polygon(rings) => rings.get_mut(part).map(|r| (PartKind::Ring, r)),
            _ => None,
        }
    }

    /// Resolve a global vertex index to (part kind, part start offset, position).
    fn locate(&self, index: usize) -> Option<(PartKind, usize, usize, VertexPosition)> {
        let mut offset = 0usize;
        for (part, (kind, pts)) in self.parts().into_iter().enumerate() {
            if index < offset + pts.len() {
                let pos = VertexPosition { part, vertex: index - offset };
                return Some((kind, offset, pts.len(), pos));
            }
            offset += pts.len();
        }
        None
    }

    pub fn vertex_count(&self) -> usize {
        self.parts().iter().map(|(_, pts)| pts.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.vertex_count() == 0
    }

    /// All vertices in global index order (ring closing points included).
    pub fn vertices(&self) -> Vec<Point> {
        self.parts().into_iter().flat_map(|(_, pts)| pts.iter().copied()).collect()
    }

    /// Global indices that address distinct vertices: a ring's closing point
    /// is skipped because it duplicates the ring's first vertex.
    pub fn distinct_vertex_indices(&self) -> Vec<usize> {
        let mut out = Vec::new();
        let mut offset = 0usize;
        for (kind, pts) in self.parts() {
            let n = if kind == PartKind::Ring && pts.len() > 1 { pts.len() - 1 } else { pts.len() };
            out.extend(offset..offset + n);
            offset += pts.len();
        }
        out
    }

    /// Segments of line and ring parts as (global index of first vertex, a, b).
    pub fn edges(&self) -> Vec<(usize, Point, Point)> {
        let mut out = Vec::new();
        let mut offset = 0usize;
        for (kind, pts) in self.parts() {
            if kind != PartKind::Point {
                for (i, w) in pts.windows(2).enumerate() {
                    out.push((offset + i, w[0], w[1]));
                }
            }
            offset += pts.len();
        }
        out
    }

    /// Global index of the first vertex of `part`.
    pub fn part_offset(&self, part: usize) -> Option<usize> {
        let parts = self.parts();
        if part > parts.len() {
            return None;
        }
        Some(parts.iter().take(part).map(|(_, pts)| pts.len()).sum())
    }

    pub fn part_count(&self) -> usize {
        self.parts().len()
    }

    pub fn position_of(&self, index: usize) -> Option<VertexPosition> {
        self.locate(index).map(|(_, _, _, pos)| pos)
    }

    pub fn vertex_at(&self, index: usize) -> Option<Point> {
        let (_, _, _, pos) = self.locate(index)?;
        self.parts().get(pos.part).and_then(|(_, pts)| pts.get(pos.vertex)).copied()
    }

    /// Whether the vertex is the first or last vertex of a line part. Points
    /// and rings have no endpoints.
    pub fn is_endpoint(&self, index: usize) -> bool {
        match self.locate(index) {
            Some((PartKind::Line, _, len, pos)) => pos.vertex == 0 || pos.vertex + 1 == len,
            _ => false,
        }
    }

    /// Neighbouring vertex indices within the same part. Rings wrap around
    /// their closing point; lines stop at their endpoints.
    pub fn adjacent_vertices(&self, index: usize) -> (Option<usize>, Option<usize>) {
        let Some((kind, offset, len, pos)) = self.locate(index) else {
            return (None, None);
        };
        match kind {
            PartKind::Point => (None, None),
            PartKind::Line => {
                let prev = (pos.vertex > 0).then(|| index - 1);
                let next = (pos.vertex + 1 < len).then(|| index + 1);
                (prev, next)
            }
            PartKind::Ring => {
                if len < 3 {
                    return (None, None);
                }
                if pos.vertex == 0 || pos.vertex + 1 == len {
                    (Some(offset + len - 2), Some(offset + 1))
                } else {
                    (Some(index - 1), Some(index + 1))
                }
            }
        }
    }

    /// The vertex adjacent to a line endpoint, if `index` is one.
    pub fn adjacent_to_endpoint(&self, index: usize) -> Option<usize> {
        if !self.is_endpoint(index) {
            return None;
        }
        match self.adjacent_vertices(index) {
            (Some(prev), None) => Some(prev),
            (None, Some(next)) => Some(next),
            _ => None,
        }
    }

    pub fn move_vertex(&mut self, x: f64, y: f64, index: usize) -> bool {
        if !x.is_finite() || !y.is_finite() {
            return false;
        }
        let p = Point::new(x, y);
        let Some((kind, _, len, pos)) = self.locate(index) else {
            return false;
        };
        match self {
            Geometry::Point(slot) => {
                *slot = Some(p);
                return true;
            }
            Geometry::MultiPoint(pts) => {
                pts[pos.part] = p;
                return true;
            }
            _ => {}
        }
        let Some((_, pts)) = self.linear_part_mut(pos.part) else {
            return false;
        };
        if kind == PartKind::Ring && (pos.vertex == 0 || pos.vertex + 1 == len) {
            pts[0] = p;
            pts[len - 1] = p;
        } else {
            pts[pos.vertex] = p;
        }
        true
    }

    /// Insert a new vertex before the existing vertex at `index`.
    pub fn insert_vertex(&mut self, x: f64, y: f64, index: usize) -> bool {
        let Some(pos) = self.position_of(index) else {
            return false;
        };
        if let Geometry::MultiPoint(pts) = self {
            if !x.is_finite() || !y.is_finite() {
                return false;
            }
            pts.insert(pos.part, Point::new(x, y));
            return true;
        }
        self.insert_vertex_tagged(pos, Point::new(x, y))
    }

    /// Insert at a part-local slot; `vertex == part length` appends to a line.
    pub fn insert_vertex_tagged(&mut self, pos: VertexPosition, p: Point) -> bool {
        if !p.is_finite() {
            return false;
        }
        let Some((kind, pts)) = self.linear_part_mut(pos.part) else {
            return false;
        };
        match kind {
            PartKind::Line => {
                if pos.vertex > pts.len() {
                    return false;
                }
                pts.insert(pos.vertex, p);
                true
            }
            PartKind::Ring => {
                let len = pts.len();
                if len < 2 || pos.vertex >= len {
                    return false;
                }
                // Before the first vertex means on the closing edge.
                let at = if pos.vertex == 0 { len - 1 } else { pos.vertex };
                pts.insert(at, p);
                true
            }
            PartKind::Point => false,
        }
    }

    pub fn delete_vertex(&mut self, index: usize) -> DeleteStatus {
        let Some((kind, _, len, pos)) = self.locate(index) else {
            return DeleteStatus::Failure;
        };
        match self {
            Geometry::Point(slot) => {
                *slot = None;
                return DeleteStatus::EmptyGeometry;
            }
            Geometry::MultiPoint(pts) => {
                pts.remove(pos.part);
                return if pts.is_empty() { DeleteStatus::EmptyGeometry } else { DeleteStatus::Success };
            }
            _ => {}
        }
        let drop_part = {
            let Some((_, pts)) = self.linear_part_mut(pos.part) else {
                return DeleteStatus::Failure;
            };
            match kind {
                PartKind::Line => {
                    pts.remove(pos.vertex);
                    pts.len() < MIN_LINE_LEN
                }
                PartKind::Ring => {
                    if len <= MIN_RING_LEN {
                        true
                    } else if pos.vertex == 0 || pos.vertex + 1 == len {
                        pts.remove(len - 1);
                        pts.remove(0);
                        let first = pts[0];
                        pts.push(first);
                        false
                    } else {
                        pts.remove(pos.vertex);
                        false
                    }
                }
                PartKind::Point => return DeleteStatus::Failure,
            }
        };
        if drop_part {
            match self {
                Geometry::LineString(pts) => pts.clear(),
                Geometry::MultiLineString(parts) => {
                    parts.remove(pos.part);
                }
                Geometry::Polygon(rings) => {
                    // Losing the exterior ring empties the whole polygon.
                    if pos.part == 0 {
                        rings.clear();
                    } else {
                        rings.remove(pos.part);
                    }
                }
                _ => {}
            }
        }
        if self.is_empty() {
            DeleteStatus::EmptyGeometry
        } else {
            DeleteStatus::Success
        }
    }

    /// Delete several vertices, highest index first. Every index is resolved
    /// against the geometry as passed in; once a part collapses (a line below
    /// two points, a ring at its minimum) its remaining entries are skipped
    /// so they never land on a neighbouring part. `Err` carries the first
    /// index that could not be deleted.
    pub fn delete_vertices(&mut self, indices: &[usize]) -> Result<DeleteStatus, usize> {
        let mut targets: Vec<(VertexPosition, usize)> = Vec::new();
        for index in deletion_order(indices) {
            let (kind, _, len, mut pos) = self.locate(index).ok_or(index)?;
            // A ring's closing point is its first vertex.
            if kind == PartKind::Ring && len > 1 && pos.vertex + 1 == len {
                pos.vertex = 0;
            }
            if !targets.iter().any(|(p, _)| *p == pos) {
                targets.push((pos, index));
            }
        }
        targets.sort_by(|a, b| (b.0.part, b.0.vertex).cmp(&(a.0.part, a.0.vertex)));

        let mut collapsed = None;
        for (pos, index) in targets {
            if collapsed == Some(pos.part) {
                continue;
            }
            let parts_before = self.part_count();
            let global = self.part_offset(pos.part).ok_or(index)? + pos.vertex;
            match self.delete_vertex(global) {
                DeleteStatus::Success => {}
                DeleteStatus::EmptyGeometry => return Ok(DeleteStatus::EmptyGeometry),
                DeleteStatus::Failure => return Err(index),
            }
            if self.part_count() < parts_before {
                collapsed = Some(pos.part);
            }
        }
        Ok(DeleteStatus::Success)
    }
}

/// Distinct indices, highest first.
pub fn deletion_order(indices: &[usize]) -> Vec<usize> {
    let mut out = indices.to_vec();
    out.sort_unstable_by(|a, b| b.cmp(a));
    out.dedup();
    out
}
