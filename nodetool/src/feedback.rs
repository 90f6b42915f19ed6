use crate::model::{Geometry, Point, Rect};
use serde::Serialize;
use std::collections::BTreeMap;

pub type BandId = u32;
pub type MarkerId = u32;

/// On-canvas feedback items the tool drives. All coordinates are map
/// coordinates; drawing them is the host's business.
pub trait Feedback {
    fn set_snap_indicator(&mut self, at: Option<Point>);
    fn set_edge_center_indicator(&mut self, at: Option<Point>);
    fn set_endpoint_indicator(&mut self, at: Option<Point>);
    fn set_feature_highlight(&mut self, outline: Option<&Geometry>);

    /// Rubber band from a fixed `anchor` to a `free` end that follows the pointer.
    fn add_band(&mut self, anchor: Point, free: Point) -> BandId;
    fn move_band(&mut self, band: BandId, free: Point);
    fn remove_band(&mut self, band: BandId);

    fn set_selection_rect(&mut self, rect: Option<Rect>);

    fn add_vertex_marker(&mut self, at: Point) -> MarkerId;
    fn remove_vertex_marker(&mut self, marker: MarkerId);
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Band {
    pub anchor: Point,
    pub free: Point,
}

/// Feedback sink that just remembers the current state; the bindings hand
/// it to JavaScript for drawing and tests inspect it.
#[derive(Clone, Debug, Default, Serialize)]
pub struct RecordingFeedback {
    pub snap: Option<Point>,
    pub edge_center: Option<Point>,
    pub endpoint: Option<Point>,
    pub highlight: Option<Geometry>,
    pub bands: BTreeMap<BandId, Band>,
    pub rect: Option<Rect>,
    pub markers: BTreeMap<MarkerId, Point>,
    #[serde(skip)]
    next_id: u32,
}

impl RecordingFeedback {
    pub fn new() -> Self {
        RecordingFeedback::default()
    }

    fn next_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    pub fn band_list(&self) -> Vec<Band> {
        self.bands.values().copied().collect()
    }

    pub fn marker_points(&self) -> Vec<Point> {
        self.markers.values().copied().collect()
    }

    /// True when nothing transient (bands, rectangle) is on screen.
    pub fn is_quiet(&self) -> bool {
        self.bands.is_empty() && self.rect.is_none()
    }
}

impl Feedback for RecordingFeedback {
    fn set_snap_indicator(&mut self, at: Option<Point>) {
        self.snap = at;
    }
    fn set_edge_center_indicator(&mut self, at: Option<Point>) {
        self.edge_center = at;
    }
    fn set_endpoint_indicator(&mut self, at: Option<Point>) {
        self.endpoint = at;
    }
    fn set_feature_highlight(&mut self, outline: Option<&Geometry>) {
        self.highlight = outline.cloned();
    }

    fn add_band(&mut self, anchor: Point, free: Point) -> BandId {
        let id = self.next_id();
        self.bands.insert(id, Band { anchor, free });
        id
    }
    fn move_band(&mut self, band: BandId, free: Point) {
        if let Some(b) = self.bands.get_mut(&band) {
            b.free = free;
        }
    }
    fn remove_band(&mut self, band: BandId) {
        self.bands.remove(&band);
    }

    fn set_selection_rect(&mut self, rect: Option<Rect>) {
        self.rect = rect;
    }

    fn add_vertex_marker(&mut self, at: Point) -> MarkerId {
        let id = self.next_id();
        self.markers.insert(id, at);
        id
    }
    fn remove_vertex_marker(&mut self, marker: MarkerId) {
        self.markers.remove(&marker);
    }
}
