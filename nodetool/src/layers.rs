use crate::model::{Crs, FeatureId, Geometry, LayerId};
use std::any::Any;
use std::collections::BTreeMap;

/// Change notification queued by a feature store for its subscribers.
#[derive(Clone, Debug, PartialEq)]
pub enum LayerEvent {
    GeometryChanged(FeatureId, Geometry),
    FeatureDeleted(FeatureId),
}

/// Host-side feature storage of one layer. Geometries are in layer CRS.
pub trait FeatureStore {
    fn id(&self) -> LayerId;
    fn name(&self) -> &str;
    fn is_vector(&self) -> bool {
        true
    }
    fn is_editable(&self) -> bool;
    fn crs(&self) -> Crs;
    fn feature_ids(&self) -> Vec<FeatureId>;
    fn get_feature(&self, fid: FeatureId) -> Option<Geometry>;

    fn begin_edit_command(&mut self, label: &str);
    fn end_edit_command(&mut self);
    /// Abandon the open command and revert everything changed since it began.
    fn destroy_edit_command(&mut self);
    fn change_geometry(&mut self, fid: FeatureId, geometry: Geometry) -> bool;
    fn trigger_repaint(&mut self);

    /// Start queuing change notifications; calling it again is a no-op.
    fn subscribe(&mut self);
    fn take_events(&mut self) -> Vec<LayerEvent>;

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

#[derive(Clone, Debug)]
struct EditCommand {
    label: String,
    // Geometry of each touched feature as it was when the command began.
    originals: BTreeMap<FeatureId, Geometry>,
}

/// In-memory feature store with real edit-command semantics.
#[derive(Clone, Debug)]
pub struct MemoryLayer {
    id: LayerId,
    name: String,
    editable: bool,
    crs: Crs,
    features: BTreeMap<FeatureId, Geometry>,
    subscribed: bool,
    events: Vec<LayerEvent>,
    command: Option<EditCommand>,
    history: Vec<String>,
    repaints: u32,
    geometry_writes: u64,
}

impl MemoryLayer {
    pub fn new(id: LayerId, name: impl Into<String>, crs: Crs) -> Self {
        MemoryLayer {
            id,
            name: name.into(),
            editable: true,
            crs,
            features: BTreeMap::new(),
            subscribed: false,
            events: Vec::new(),
            command: None,
            history: Vec::new(),
            repaints: 0,
            geometry_writes: 0,
        }
    }

    pub fn with_feature(mut self, fid: FeatureId, geometry: Geometry) -> Self {
        self.add_feature(fid, geometry);
        self
    }

    /// Returns false if the id is already taken.
    pub fn add_feature(&mut self, fid: FeatureId, geometry: Geometry) -> bool {
        if self.features.contains_key(&fid) {
            return false;
        }
        self.features.insert(fid, geometry.clone());
        self.notify(LayerEvent::GeometryChanged(fid, geometry));
        true
    }

    pub fn delete_feature(&mut self, fid: FeatureId) -> bool {
        if self.features.remove(&fid).is_none() {
            return false;
        }
        self.notify(LayerEvent::FeatureDeleted(fid));
        true
    }

    pub fn set_editable(&mut self, editable: bool) {
        self.editable = editable;
    }

    pub fn feature_count(&self) -> usize {
        self.features.len()
    }

    /// Labels of edit commands that were ended (not destroyed), oldest first.
    pub fn command_history(&self) -> &[String] {
        &self.history
    }

    pub fn repaint_count(&self) -> u32 {
        self.repaints
    }

    /// Number of accepted `change_geometry` calls, including rolled-back ones.
    pub fn geometry_writes(&self) -> u64 {
        self.geometry_writes
    }

    pub fn in_command(&self) -> bool {
        self.command.is_some()
    }

    fn notify(&mut self, ev: LayerEvent) {
        if self.subscribed {
            self.events.push(ev);
        }
    }
}

impl FeatureStore for MemoryLayer {
    fn id(&self) -> LayerId {
        self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn is_editable(&self) -> bool {
        self.editable
    }
    fn crs(&self) -> Crs {
        self.crs
    }
    fn feature_ids(&self) -> Vec<FeatureId> {
        self.features.keys().copied().collect()
    }
    fn get_feature(&self, fid: FeatureId) -> Option<Geometry> {
        self.features.get(&fid).cloned()
    }

    fn begin_edit_command(&mut self, label: &str) {
        if self.command.is_some() {
            tracing::warn!(layer = self.id, "edit command already open; nesting into it");
            return;
        }
        self.command = Some(EditCommand { label: label.to_string(), originals: BTreeMap::new() });
    }

    fn end_edit_command(&mut self) {
        if let Some(cmd) = self.command.take() {
            self.history.push(cmd.label);
        }
    }

    fn destroy_edit_command(&mut self) {
        let Some(cmd) = self.command.take() else {
            return;
        };
        for (fid, geom) in cmd.originals {
            self.features.insert(fid, geom.clone());
            self.notify(LayerEvent::GeometryChanged(fid, geom));
        }
    }

    fn change_geometry(&mut self, fid: FeatureId, geometry: Geometry) -> bool {
        if !self.editable {
            return false;
        }
        let Some(slot) = self.features.get_mut(&fid) else {
            return false;
        };
        let old = std::mem::replace(slot, geometry.clone());
        if let Some(cmd) = self.command.as_mut() {
            cmd.originals.entry(fid).or_insert(old);
        }
        self.geometry_writes += 1;
        self.notify(LayerEvent::GeometryChanged(fid, geometry));
        true
    }

    fn trigger_repaint(&mut self) {
        self.repaints += 1;
    }

    fn subscribe(&mut self) {
        self.subscribed = true;
    }

    fn take_events(&mut self) -> Vec<LayerEvent> {
        std::mem::take(&mut self.events)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Ordered set of layers known to the canvas plus the project-wide
/// topological-editing flag.
#[derive(Default)]
pub struct Project {
    layers: Vec<Box<dyn FeatureStore>>,
    topological_editing: bool,
}

impl Project {
    pub fn new() -> Self {
        Project::default()
    }

    /// Returns false if a layer with the same id already exists.
    pub fn add_layer(&mut self, layer: Box<dyn FeatureStore>) -> bool {
        if self.layer(layer.id()).is_some() {
            return false;
        }
        self.layers.push(layer);
        true
    }

    pub fn remove_layer(&mut self, id: LayerId) -> Option<Box<dyn FeatureStore>> {
        let idx = self.layers.iter().position(|l| l.id() == id)?;
        Some(self.layers.remove(idx))
    }

    pub fn layer(&self, id: LayerId) -> Option<&dyn FeatureStore> {
        self.layers.iter().find(|l| l.id() == id).map(|l| l.as_ref())
    }

    pub fn layer_mut(&mut self, id: LayerId) -> Option<&mut dyn FeatureStore> {
        for l in self.layers.iter_mut() {
            if l.id() == id {
                return Some(l.as_mut());
            }
        }
        None
    }

    pub fn layers(&self) -> impl Iterator<Item = &dyn FeatureStore> {
        self.layers.iter().map(|l| l.as_ref())
    }

    pub fn memory_layer(&self, id: LayerId) -> Option<&MemoryLayer> {
        self.layer(id).and_then(|l| l.as_any().downcast_ref::<MemoryLayer>())
    }

    pub fn memory_layer_mut(&mut self, id: LayerId) -> Option<&mut MemoryLayer> {
        self.layer_mut(id).and_then(|l| l.as_any_mut().downcast_mut::<MemoryLayer>())
    }

    /// Vector layers currently open for editing, in project order.
    pub fn editable_layers(&self) -> Vec<LayerId> {
        self.layers
            .iter()
            .filter(|l| l.is_vector() && l.is_editable())
            .map(|l| l.id())
            .collect()
    }

    pub fn is_layer_editable(&self, id: LayerId) -> bool {
        self.layer(id).is_some_and(|l| l.is_vector() && l.is_editable())
    }

    pub fn topological_editing(&self) -> bool {
        self.topological_editing
    }

    pub fn set_topological_editing(&mut self, on: bool) {
        self.topological_editing = on;
    }
}
