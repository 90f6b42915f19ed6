use crate::geometry::math::{midpoint, seg_distance_sq};
use crate::geometry::tolerance::within_tolerance;
use crate::layers::Project;
use crate::model::{FeatureId, LayerId, Point};
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Target {
    Vertex { index: usize },
    /// Segment from vertex `from` to `from + 1`; `a`/`b` are its map coordinates.
    Edge { from: usize, a: Point, b: Point },
}

/// Result of a spatial lookup. `point` and `distance` are in map units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Match {
    pub layer: LayerId,
    pub fid: FeatureId,
    pub target: Target,
    pub point: Point,
    pub distance: f64,
}

impl Match {
    pub fn is_vertex(&self) -> bool {
        matches!(self.target, Target::Vertex { .. })
    }

    pub fn is_edge(&self) -> bool {
        matches!(self.target, Target::Edge { .. })
    }

    pub fn vertex_index(&self) -> Option<usize> {
        match self.target {
            Target::Vertex { index } => Some(index),
            Target::Edge { .. } => None,
        }
    }

    /// Endpoint indices of an edge match.
    pub fn edge_vertices(&self) -> Option<(usize, usize)> {
        match self.target {
            Target::Edge { from, .. } => Some((from, from + 1)),
            Target::Vertex { .. } => None,
        }
    }

    pub fn edge_midpoint(&self) -> Option<Point> {
        match self.target {
            Target::Edge { a, b, .. } => Some(midpoint(a, b)),
            Target::Vertex { .. } => None,
        }
    }

    pub fn same_feature(&self, other: &Match) -> bool {
        self.layer == other.layer && self.fid == other.fid
    }

    /// Vertices outrank edges; within a kind the closer match wins.
    pub fn is_better_than(&self, other: &Match) -> bool {
        match (self.is_vertex(), other.is_vertex()) {
            (true, false) => true,
            (false, true) => false,
            _ => self.distance < other.distance,
        }
    }
}

pub trait MatchFilter {
    fn accept_match(&mut self, m: &Match) -> bool;
}

impl<F: FnMut(&Match) -> bool> MatchFilter for F {
    fn accept_match(&mut self, m: &Match) -> bool {
        self(m)
    }
}

/// Spatial lookup service over the project's layers.
pub trait Locator {
    /// Nearest vertex within `tol`, or failing that the nearest edge, over
    /// `layers` only.
    fn nearest_vertex_or_edge(
        &self,
        project: &Project,
        pt: Point,
        tol: f64,
        layers: &[LayerId],
        filter: &mut dyn MatchFilter,
    ) -> Option<Match>;

    /// Every accepted vertex within `tol`, nearest first.
    fn nearest_vertex(
        &self,
        project: &Project,
        pt: Point,
        tol: f64,
        layers: &[LayerId],
        filter: &mut dyn MatchFilter,
    ) -> Vec<Match>;
}

/// Linear scan over the stores. Adequate for in-memory scenes; a host with an
/// index plugs in its own [`Locator`].
#[derive(Clone, Copy, Debug, Default)]
pub struct MemoryLocator;

impl MemoryLocator {
    fn vertex_candidates(
        project: &Project,
        pt: Point,
        tol: f64,
        layers: &[LayerId],
        filter: &mut dyn MatchFilter,
    ) -> Vec<Match> {
        let mut out = Vec::new();
        for &lid in layers {
            let Some(layer) = project.layer(lid) else { continue };
            let crs = layer.crs();
            for fid in layer.feature_ids() {
                let Some(geom) = layer.get_feature(fid) else { continue };
                for index in geom.distinct_vertex_indices() {
                    let Some(v) = geom.vertex_at(index) else { continue };
                    let p = crs.to_map(v);
                    let d = p.distance(&pt);
                    if !within_tolerance(d, tol) { continue; }
                    let m = Match { layer: lid, fid, target: Target::Vertex { index }, point: p, distance: d };
                    if filter.accept_match(&m) { out.push(m); }
                }
            }
        }
        out
    }
}

impl Locator for MemoryLocator {
    fn nearest_vertex_or_edge(
        &self,
        project: &Project,
        pt: Point,
        tol: f64,
        layers: &[LayerId],
        filter: &mut dyn MatchFilter,
    ) -> Option<Match> {
        // Vertices first
        let mut best: Option<Match> = None;
        for m in Self::vertex_candidates(project, pt, tol, layers, filter) {
            if best.map_or(true, |b| m.distance < b.distance) { best = Some(m); }
        }
        if best.is_some() { return best; }
        // Edges
        for &lid in layers {
            let Some(layer) = project.layer(lid) else { continue };
            let crs = layer.crs();
            for fid in layer.feature_ids() {
                let Some(geom) = layer.get_feature(fid) else { continue };
                for (from, a, b) in geom.edges() {
                    let (a, b) = (crs.to_map(a), crs.to_map(b));
                    let (d2, t) = seg_distance_sq(pt, a, b);
                    let d = d2.sqrt();
                    if !within_tolerance(d, tol) { continue; }
                    let proj = crate::geometry::math::lerp(a, b, t);
                    let m = Match { layer: lid, fid, target: Target::Edge { from, a, b }, point: proj, distance: d };
                    if best.map_or(true, |bm| d < bm.distance) && filter.accept_match(&m) { best = Some(m); }
                }
            }
        }
        best
    }

    fn nearest_vertex(
        &self,
        project: &Project,
        pt: Point,
        tol: f64,
        layers: &[LayerId],
        filter: &mut dyn MatchFilter,
    ) -> Vec<Match> {
        let mut out = Self::vertex_candidates(project, pt, tol, layers, filter);
        // Stable: equal distances keep layer/feature/index order.
        out.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        out
    }
}
