use crate::cache::GeometryCache;
use crate::feedback::{Feedback, MarkerId};
use crate::layers::Project;
use crate::model::{FeatureId, LayerId, Point};
use crate::vertex_ref::VertexRef;
use std::collections::BTreeSet;

/// Selected existing vertices, each with its own highlight marker.
#[derive(Clone, Debug, Default)]
pub struct SelectionSet {
    entries: Vec<VertexRef>,
    markers: Vec<MarkerId>,
}

/// Map coordinate of a vertex as currently cached.
pub(crate) fn vertex_map_point(
    cache: &mut GeometryCache,
    project: &mut Project,
    layer: LayerId,
    fid: FeatureId,
    index: usize,
) -> Option<Point> {
    let crs = project.layer(layer)?.crs();
    cache.vertex(project, layer, fid, index).map(|p| crs.to_map(p))
}

impl SelectionSet {
    pub fn new() -> Self {
        SelectionSet::default()
    }

    pub fn entries(&self) -> &[VertexRef] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replace the selection. Duplicate (layer, feature, index) entries and
    /// vertices that no longer exist are dropped.
    pub fn set(
        &mut self,
        refs: Vec<VertexRef>,
        cache: &mut GeometryCache,
        project: &mut Project,
        feedback: &mut dyn Feedback,
    ) {
        self.clear(feedback);
        let mut seen = BTreeSet::new();
        for r in refs {
            if !seen.insert(r.key()) {
                continue;
            }
            let Some(at) = vertex_map_point(cache, project, r.layer, r.fid, r.index()) else {
                continue;
            };
            self.markers.push(feedback.add_vertex_marker(at));
            self.entries.push(VertexRef::moving(r.layer, r.fid, r.index()));
        }
    }

    pub fn clear(&mut self, feedback: &mut dyn Feedback) {
        for m in self.markers.drain(..) {
            feedback.remove_vertex_marker(m);
        }
        self.entries.clear();
    }

    /// Move a single selected vertex by `offset` indices within its feature.
    /// Returns false, leaving the selection alone, when there is not exactly
    /// one selected vertex or the target index does not exist.
    pub fn step_adjacent(
        &mut self,
        offset: isize,
        cache: &mut GeometryCache,
        project: &mut Project,
        feedback: &mut dyn Feedback,
    ) -> bool {
        let [current] = self.entries.as_slice() else {
            return false;
        };
        let current = *current;
        let Some(index) = current.index().checked_add_signed(offset) else {
            return false;
        };
        if cache.vertex(project, current.layer, current.fid, index).is_none() {
            return false;
        }
        self.set(vec![VertexRef::moving(current.layer, current.fid, index)], cache, project, feedback);
        true
    }
}
