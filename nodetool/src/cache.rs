//! Per-feature geometry snapshots, kept fresh by layer change notifications.
use crate::layers::{FeatureStore, LayerEvent, Project};
use crate::model::{FeatureId, Geometry, LayerId, Point};
use std::collections::{BTreeMap, BTreeSet};

/// Snapshot cache keyed by (layer, feature). Entries are in layer CRS.
///
/// The first access to any feature of a layer subscribes the cache to that
/// layer's notifications. Every read drains pending notifications of the
/// layer first, so an entry is never older than the last committed edit.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GeometryCache {
    entries: BTreeMap<LayerId, BTreeMap<FeatureId, Geometry>>,
    subscriptions: BTreeSet<LayerId>,
}

impl GeometryCache {
    pub fn new() -> Self {
        GeometryCache::default()
    }

    /// Snapshot of the feature geometry, fetched from the store on first use.
    pub fn get(&mut self, project: &mut Project, layer: LayerId, fid: FeatureId) -> Option<Geometry> {
        let Some(store) = project.layer_mut(layer) else {
            self.drop_layer(layer);
            return None;
        };
        self.ensure_subscribed(store);
        let events = store.take_events();
        self.apply_events(layer, events);
        if let Some(g) = self.entries.get(&layer).and_then(|m| m.get(&fid)) {
            return Some(g.clone());
        }
        let g = store.get_feature(fid)?;
        self.entries.entry(layer).or_default().insert(fid, g.clone());
        Some(g)
    }

    /// Layer-CRS coordinate of one vertex.
    pub fn vertex(&mut self, project: &mut Project, layer: LayerId, fid: FeatureId, index: usize) -> Option<Point> {
        self.get(project, layer, fid)?.vertex_at(index)
    }

    fn ensure_subscribed(&mut self, store: &mut dyn FeatureStore) {
        if self.subscriptions.insert(store.id()) {
            store.subscribe();
            tracing::trace!(layer = store.id(), "geometry cache subscribed");
        }
    }

    /// Apply one notification. Only features already cached are touched;
    /// others are fetched lazily when first read.
    pub fn handle_event(&mut self, layer: LayerId, event: LayerEvent) {
        let Some(features) = self.entries.get_mut(&layer) else {
            return;
        };
        match event {
            LayerEvent::GeometryChanged(fid, geometry) => {
                if let Some(slot) = features.get_mut(&fid) {
                    *slot = geometry;
                }
            }
            LayerEvent::FeatureDeleted(fid) => {
                if features.remove(&fid).is_some() {
                    tracing::trace!(layer, fid, "geometry cache evicted deleted feature");
                }
            }
        }
    }

    fn apply_events(&mut self, layer: LayerId, events: Vec<LayerEvent>) {
        for ev in events {
            self.handle_event(layer, ev);
        }
    }

    /// Drain notifications of every subscribed layer; forget layers that
    /// left the project.
    pub fn sync(&mut self, project: &mut Project) {
        let subscribed: Vec<LayerId> = self.subscriptions.iter().copied().collect();
        for layer in subscribed {
            match project.layer_mut(layer) {
                Some(store) => {
                    let events = store.take_events();
                    self.apply_events(layer, events);
                }
                None => self.drop_layer(layer),
            }
        }
    }

    fn drop_layer(&mut self, layer: LayerId) {
        self.entries.remove(&layer);
        self.subscriptions.remove(&layer);
    }

    pub fn contains(&self, layer: LayerId, fid: FeatureId) -> bool {
        self.entries.get(&layer).is_some_and(|m| m.contains_key(&fid))
    }

    pub fn is_subscribed(&self, layer: LayerId) -> bool {
        self.subscriptions.contains(&layer)
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(|m| m.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cached entry without touching the store.
    pub fn peek(&self, layer: LayerId, fid: FeatureId) -> Option<&Geometry> {
        self.entries.get(&layer).and_then(|m| m.get(&fid))
    }
}
