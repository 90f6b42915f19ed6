use crate::algorithms::locator::{Locator, Match};
use crate::layers::Project;
use crate::vertex_ref::VertexRef;
use std::collections::BTreeSet;

/// Vertices of editable layers that coincide exactly with the primary vertex
/// match, excluding the primary itself. Edge matches have no companions:
/// only existing vertices propagate topologically.
pub fn find_companions(project: &Project, locator: &dyn Locator, primary: &Match) -> Vec<VertexRef> {
    let Some(primary_index) = primary.vertex_index() else {
        return Vec::new();
    };
    let mut seen = BTreeSet::new();
    seen.insert((primary.layer, primary.fid, primary_index));
    let mut out = Vec::new();
    for layer in project.editable_layers() {
        let mut collect_all = |_: &Match| true;
        for m in locator.nearest_vertex(project, primary.point, 0.0, &[layer], &mut collect_all) {
            let Some(index) = m.vertex_index() else { continue };
            if seen.insert((m.layer, m.fid, index)) {
                out.push(VertexRef::moving(m.layer, m.fid, index));
            }
        }
    }
    tracing::debug!(count = out.len(), "topological companions");
    out
}
