use crate::algorithms::locator::{Locator, Match};
use crate::geometry::tolerance::{norm2, within_tolerance};
use crate::layers::Project;
use crate::model::{FeatureId, Geometry, LayerId, Point};

/// Pointer matcher with hysteresis: the feature accepted last time is
/// re-tested first and kept unless the global nearest is strictly better.
/// Without it the hover target flips between features sharing a vertex.
#[derive(Clone, Debug, Default)]
pub struct Matcher {
    last: Option<(LayerId, FeatureId)>,
}

impl Matcher {
    pub fn new() -> Self {
        Matcher::default()
    }

    pub fn last_feature(&self) -> Option<(LayerId, FeatureId)> {
        self.last
    }

    pub fn reset(&mut self) {
        self.last = None;
    }

    pub fn match_near(
        &mut self,
        project: &Project,
        locator: &dyn Locator,
        pt: Point,
        tol: f64,
    ) -> Option<Match> {
        let layers = project.editable_layers();
        let global = locator.nearest_vertex_or_edge(project, pt, tol, &layers, &mut |_: &Match| true);
        let sticky = self
            .last
            .filter(|(layer, _)| layers.contains(layer))
            .and_then(|(layer, fid)| {
                locator.nearest_vertex_or_edge(project, pt, tol, &[layer], &mut |m: &Match| m.fid == fid)
            });
        let chosen = match (sticky, global) {
            (Some(s), Some(g)) if g.is_better_than(&s) => Some(g),
            (Some(s), _) => Some(s),
            (None, g) => g,
        };
        self.last = chosen.map(|m| (m.layer, m.fid));
        chosen
    }
}

/// Whether `pt` lies in the insert-activation zone around an edge's midpoint.
pub fn is_near_edge_center(m: &Match, pt: Point, radius: f64) -> bool {
    match m.edge_midpoint() {
        Some(c) => within_tolerance(c.distance(&pt), radius),
        None => false,
    }
}

/// Where the append indicator of a line endpoint sits: `offset` beyond the
/// endpoint, pointing away from its neighbour. `geom` is in map coordinates.
pub fn endpoint_marker_center(geom: &Geometry, endpoint: usize, offset: f64) -> Option<Point> {
    let neighbour = geom.adjacent_to_endpoint(endpoint)?;
    let p = geom.vertex_at(endpoint)?;
    let q = geom.vertex_at(neighbour)?;
    let (ux, uy) = norm2(p.x - q.x, p.y - q.y)?;
    Some(Point::new(p.x + ux * offset, p.y + uy * offset))
}
