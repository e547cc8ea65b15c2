//! Authoritative wall-piece state management utilities.

use std::collections::BTreeMap;

use glam::{Quat, Vec3};
use rampart_core::{PieceId, PieceKind, Pose, RunId, SegmentRecord};

use crate::connections::ConnectionState;

/// Opaque marker handed to the host's pathfinding so placed pieces block movement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NavObstacle {
    /// Piece the obstacle belongs to.
    pub piece: PieceId,
    /// Centre of the blocked span.
    pub center: Vec3,
    /// Orientation of the blocked span.
    pub rotation: Quat,
    /// Half of the blocked span's length.
    pub half_length: f32,
}

impl NavObstacle {
    pub(crate) fn for_record(piece: PieceId, record: &SegmentRecord) -> Self {
        Self {
            piece,
            center: record.center(),
            rotation: record.rotation(),
            half_length: record.length() * 0.5,
        }
    }
}

/// Snapshot of a piece stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct PieceState {
    pub(crate) id: PieceId,
    pub(crate) kind: PieceKind,
    pub(crate) run: RunId,
    pub(crate) pose: Pose,
    pub(crate) record: SegmentRecord,
    pub(crate) obstacle: NavObstacle,
    pub(crate) connections: ConnectionState,
}

impl PieceState {
    pub(crate) fn new(
        id: PieceId,
        kind: PieceKind,
        run: RunId,
        pose: Pose,
        record: SegmentRecord,
    ) -> Self {
        Self {
            id,
            kind,
            run,
            pose,
            record,
            obstacle: NavObstacle::for_record(id, &record),
            connections: ConnectionState::default(),
        }
    }

    /// Half of the span's length, used to widen spatial queries.
    pub(crate) fn extent(&self) -> f32 {
        self.record.length() * 0.5
    }
}

/// Registry that stores pieces and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct PieceRegistry {
    entries: BTreeMap<PieceId, PieceState>,
    next_piece_id: PieceId,
}

impl PieceRegistry {
    /// Creates an empty piece registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_piece_id: PieceId::new(0),
        }
    }

    pub(crate) fn allocate_id(&mut self) -> PieceId {
        let id = self.next_piece_id;
        self.next_piece_id = PieceId::new(id.get().saturating_add(1));
        id
    }

    pub(crate) fn insert(&mut self, state: PieceState) {
        let _ = self.entries.insert(state.id, state);
    }

    pub(crate) fn remove(&mut self, id: PieceId) -> Option<PieceState> {
        self.entries.remove(&id)
    }

    pub(crate) fn get(&self, id: PieceId) -> Option<&PieceState> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: PieceId) -> Option<&mut PieceState> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &PieceState> {
        self.entries.values()
    }

    pub(crate) fn ids(&self) -> Vec<PieceId> {
        self.entries.keys().copied().collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
