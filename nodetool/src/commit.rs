//! Edit batches and their per-layer transactional application.
use crate::cache::GeometryCache;
use crate::error::EditError;
use crate::geometry::vertices::DeleteStatus;
pub use crate::geometry::vertices::deletion_order;
use crate::layers::Project;
use crate::model::{FeatureId, Geometry, LayerId, Point};
use crate::vertex_ref::VertexRef;
use serde::Serialize;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

/// Replacement geometries of one layer. `failed` means some operation on
/// this layer could not be applied and the whole layer must be rolled back.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LayerEdits {
    pub geometries: BTreeMap<FeatureId, Geometry>,
    pub failed: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct EditBatch {
    pub label: String,
    pub layers: BTreeMap<LayerId, LayerEdits>,
}

impl EditBatch {
    pub fn new(label: impl Into<String>) -> Self {
        EditBatch { label: label.into(), layers: BTreeMap::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.layers.values().all(|l| l.geometries.is_empty() && !l.failed)
    }

    /// Number of (layer, feature) entries across all layers.
    pub fn feature_count(&self) -> usize {
        self.layers.values().map(|l| l.geometries.len()).sum()
    }

    pub fn geometry(&self, layer: LayerId, fid: FeatureId) -> Option<&Geometry> {
        self.layers.get(&layer).and_then(|l| l.geometries.get(&fid))
    }

    pub fn is_failed(&self, layer: LayerId) -> bool {
        self.layers.get(&layer).is_some_and(|l| l.failed)
    }
}

/// Accumulates edits into one working copy per feature, so several vertex
/// operations on the same feature end up in a single replacement geometry.
#[derive(Debug)]
pub struct BatchBuilder {
    batch: EditBatch,
}

impl BatchBuilder {
    pub fn new(label: impl Into<String>) -> Self {
        BatchBuilder { batch: EditBatch::new(label) }
    }

    fn working(
        &mut self,
        cache: &mut GeometryCache,
        project: &mut Project,
        layer: LayerId,
        fid: FeatureId,
    ) -> Result<&mut Geometry, EditError> {
        if project.layer(layer).is_none() {
            return Err(EditError::UnknownLayer(layer));
        }
        if !project.is_layer_editable(layer) {
            return Err(EditError::NotEditable(layer));
        }
        let edits = self.batch.layers.entry(layer).or_default();
        match edits.geometries.entry(fid) {
            Entry::Occupied(o) => Ok(o.into_mut()),
            Entry::Vacant(v) => {
                let g = cache.get(project, layer, fid).ok_or(EditError::UnknownFeature { layer, fid })?;
                Ok(v.insert(g))
            }
        }
    }

    fn mark_failed(&mut self, layer: LayerId) {
        self.batch.layers.entry(layer).or_default().failed = true;
    }

    fn record<T>(&mut self, layer: LayerId, fid: FeatureId, res: Result<T, EditError>) -> Result<T, EditError> {
        if let Err(e) = &res {
            tracing::warn!(layer, fid, error = %e, "vertex edit failed; layer will be rolled back");
            self.mark_failed(layer);
        }
        res
    }

    /// Apply one move/insert/append with the destination `p` in layer CRS.
    pub fn apply(
        &mut self,
        cache: &mut GeometryCache,
        project: &mut Project,
        vref: &VertexRef,
        p: Point,
    ) -> Result<(), EditError> {
        let res = self
            .working(cache, project, vref.layer, vref.fid)
            .and_then(|geom| vref.op.apply(vref.fid, geom, p));
        self.record(vref.layer, vref.fid, res)
    }

    /// Delete vertices of one feature, highest index first so every deletion
    /// addresses a still-valid index. Once the geometry empties, the
    /// remaining indices are skipped; see [`Geometry::delete_vertices`].
    pub fn delete(
        &mut self,
        cache: &mut GeometryCache,
        project: &mut Project,
        layer: LayerId,
        fid: FeatureId,
        indices: &[usize],
    ) -> Result<DeleteStatus, EditError> {
        let res = self.working(cache, project, layer, fid).and_then(|geom| {
            geom.delete_vertices(indices).map_err(|index| EditError::Rejected { op: "delete", fid, index })
        });
        self.record(layer, fid, res)
    }

    pub fn finish(self) -> EditBatch {
        self.batch
    }
}


#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CommitReport {
    pub committed: Vec<LayerId>,
    pub rolled_back: Vec<LayerId>,
    pub skipped: Vec<LayerId>,
}

impl CommitReport {
    pub fn is_clean(&self) -> bool {
        self.rolled_back.is_empty() && self.skipped.is_empty()
    }
}

/// Apply a batch as one edit command per layer. A layer marked failed, or
/// whose store rejects a replacement, is rolled back as a whole; other
/// layers are unaffected.
pub fn commit(project: &mut Project, batch: EditBatch) -> CommitReport {
    let mut report = CommitReport::default();
    let label = batch.label;
    for (lid, edits) in batch.layers {
        let Some(layer) = project.layer_mut(lid) else {
            tracing::warn!(layer = lid, "commit skipped: layer is gone");
            report.skipped.push(lid);
            continue;
        };
        if !(layer.is_vector() && layer.is_editable()) {
            tracing::warn!(layer = lid, "commit skipped: layer is not editable");
            report.skipped.push(lid);
            continue;
        }
        if edits.geometries.is_empty() && !edits.failed {
            continue;
        }
        layer.begin_edit_command(&label);
        if edits.failed {
            layer.destroy_edit_command();
            tracing::warn!(layer = lid, "{label}: rolled back after a failed vertex operation");
            report.rolled_back.push(lid);
            continue;
        }
        let mut accepted = true;
        for (fid, geom) in edits.geometries {
            if !layer.change_geometry(fid, geom) {
                tracing::warn!(layer = lid, fid, "{label}: store rejected geometry change");
                accepted = false;
                break;
            }
        }
        if accepted {
            layer.end_edit_command();
            layer.trigger_repaint();
            report.committed.push(lid);
        } else {
            layer.destroy_edit_command();
            report.rolled_back.push(lid);
        }
    }
    tracing::debug!(?report, "{label}: batch committed");
    report
}
