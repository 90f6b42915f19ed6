//! Addressing of the vertex an interaction acts upon.
//!
//! A [`VertexRef`] names a layer, a feature and a [`VertexOp`] that says
//! whether the index is an existing vertex to move, a slot to insert into, or
//! a line endpoint to extend from. The compact [`RawIndex`] form mirrors the
//! host's signed/tagged integer encoding and is only used at interop
//! boundaries; [`decode_raw`] and [`decode_raw_on`] turn it back into the
//! sum type.
use crate::error::EditError;
use crate::geometry::vertices::VertexPosition;
use crate::model::{FeatureId, Geometry, LayerId, Point};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Before,
    After,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VertexOp {
    /// Existing vertex at this global index.
    Move(usize),
    /// New vertex inserted before the vertex at this index (edge `index-1 -> index`).
    InsertBeforeEdge(usize),
    /// New vertex placed before or after the line endpoint at this index.
    AppendAtEndpoint(usize, Side),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpKind {
    Move,
    Insert,
    Append,
}

/// Operation kind plus the index the geometry primitive receives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Decoded {
    pub kind: OpKind,
    pub index: usize,
    pub side: Side,
}

impl VertexOp {
    pub fn decode(&self) -> Decoded {
        match *self {
            VertexOp::Move(i) => Decoded { kind: OpKind::Move, index: i, side: Side::Before },
            VertexOp::InsertBeforeEdge(i) => Decoded { kind: OpKind::Insert, index: i, side: Side::Before },
            VertexOp::AppendAtEndpoint(i, Side::Before) => Decoded { kind: OpKind::Append, index: i, side: Side::Before },
            VertexOp::AppendAtEndpoint(i, Side::After) => Decoded { kind: OpKind::Append, index: i + 1, side: Side::After },
        }
    }

    pub fn kind(&self) -> OpKind {
        self.decode().kind
    }

    /// The vertex index carried by the operation, before decoding.
    pub fn index(&self) -> usize {
        match *self {
            VertexOp::Move(i) | VertexOp::InsertBeforeEdge(i) | VertexOp::AppendAtEndpoint(i, _) => i,
        }
    }

    /// Host encoding plus the endpoint flag. Appends lose their side; decode
    /// with [`decode_raw_on`] to get it back from the geometry.
    pub fn to_raw(&self) -> (RawIndex, bool) {
        match *self {
            VertexOp::Move(i) => (RawIndex::Plain(i as i64), false),
            VertexOp::InsertBeforeEdge(i) => (RawIndex::Tagged(i), false),
            VertexOp::AppendAtEndpoint(i, _) => (RawIndex::Plain(-(i as i64) - 1), true),
        }
    }

    /// Apply the operation to `geom`, placing the affected vertex at `p`.
    pub fn apply(&self, fid: FeatureId, geom: &mut Geometry, p: Point) -> Result<(), EditError> {
        if !p.is_finite() {
            return Err(EditError::NonFinite);
        }
        let index = self.index();
        if geom.vertex_at(index).is_none() {
            return Err(EditError::VertexOutOfRange { fid, index });
        }
        let ok = match *self {
            VertexOp::Move(i) => geom.move_vertex(p.x, p.y, i),
            VertexOp::InsertBeforeEdge(i) => geom.insert_vertex(p.x, p.y, i),
            VertexOp::AppendAtEndpoint(i, side) => match append_position(geom, i, side) {
                Some(pos) => geom.insert_vertex_tagged(pos, p),
                None => false,
            },
        };
        if ok {
            Ok(())
        } else {
            let op = match self.kind() {
                OpKind::Move => "move",
                OpKind::Insert => "insert",
                OpKind::Append => "append",
            };
            Err(EditError::Rejected { op, fid, index })
        }
    }
}

fn append_position(geom: &Geometry, endpoint: usize, side: Side) -> Option<VertexPosition> {
    if endpoint_side(geom, endpoint)? != side {
        return None;
    }
    let pos = geom.position_of(endpoint)?;
    Some(match side {
        Side::Before => pos,
        Side::After => VertexPosition { part: pos.part, vertex: pos.vertex + 1 },
    })
}

/// Side a line endpoint extends towards: before a part start, after a part end.
fn endpoint_side(geom: &Geometry, endpoint: usize) -> Option<Side> {
    if !geom.is_endpoint(endpoint) {
        return None;
    }
    match geom.adjacent_vertices(endpoint) {
        (None, Some(_)) => Some(Side::Before),
        (Some(_), None) => Some(Side::After),
        _ => None,
    }
}

/// Host-style index: a plain signed integer, or a one-element tagged group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RawIndex {
    Plain(i64),
    Tagged(usize),
}

/// Decode the host encoding. Negative plain values are only meaningful with
/// the endpoint flag: `-(i)-1` extends from endpoint `i`, before it when
/// `i == 0` and after it otherwise. The raw form does not carry the side, so
/// for the start of a later line part use [`decode_raw_on`].
pub fn decode_raw(raw: RawIndex, at_endpoint: bool) -> Option<VertexOp> {
    match raw {
        RawIndex::Tagged(i) if !at_endpoint => Some(VertexOp::InsertBeforeEdge(i)),
        RawIndex::Plain(i) if i >= 0 && !at_endpoint => Some(VertexOp::Move(i as usize)),
        RawIndex::Plain(r) if r < 0 && at_endpoint => {
            let endpoint = (-(r + 1)) as usize;
            let side = if endpoint == 0 { Side::Before } else { Side::After };
            Some(VertexOp::AppendAtEndpoint(endpoint, side))
        }
        _ => None,
    }
}

/// Decode against the geometry the index addresses: an append takes its side
/// from the endpoint's place in its part, and an endpoint that cannot be
/// extended decodes to `None`. Other encodings decode as [`decode_raw`].
pub fn decode_raw_on(raw: RawIndex, at_endpoint: bool, geom: &Geometry) -> Option<VertexOp> {
    match decode_raw(raw, at_endpoint)? {
        VertexOp::AppendAtEndpoint(i, _) => endpoint_side(geom, i).map(|side| VertexOp::AppendAtEndpoint(i, side)),
        op => Some(op),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VertexRef {
    pub layer: LayerId,
    pub fid: FeatureId,
    pub op: VertexOp,
}

impl VertexRef {
    pub fn moving(layer: LayerId, fid: FeatureId, index: usize) -> Self {
        VertexRef { layer, fid, op: VertexOp::Move(index) }
    }

    pub fn inserting(layer: LayerId, fid: FeatureId, before: usize) -> Self {
        VertexRef { layer, fid, op: VertexOp::InsertBeforeEdge(before) }
    }

    /// Extend a line from `endpoint`: prepend at a part start, append at a part end.
    pub fn appending(layer: LayerId, fid: FeatureId, geom: &Geometry, endpoint: usize) -> Option<Self> {
        let side = endpoint_side(geom, endpoint)?;
        Some(VertexRef { layer, fid, op: VertexOp::AppendAtEndpoint(endpoint, side) })
    }

    pub fn index(&self) -> usize {
        self.op.index()
    }

    /// (layer, feature, index) identity used for de-duplication.
    pub fn key(&self) -> (LayerId, FeatureId, usize) {
        (self.layer, self.fid, self.index())
    }

    pub fn is_move(&self) -> bool {
        matches!(self.op, VertexOp::Move(_))
    }
}
