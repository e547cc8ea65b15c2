//! Non-wall structures occupying the scene.

use std::collections::BTreeMap;

use glam::{Vec2, Vec3};
use rampart_core::{Footprint, StructureId, StructureKind};

use crate::spatial::{flat, point_segment_distance, segment_segment_distance};

/// Snapshot of a structure stored inside the world.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Structure {
    /// Identifier allocated by the world.
    pub id: StructureId,
    /// Classification used by placement validation.
    pub kind: StructureKind,
    /// Horizontal footprint of the structure.
    pub footprint: Footprint,
}

impl Structure {
    /// Planar distance from the segment `start`..`end` to the footprint; zero when touching.
    pub(crate) fn distance_to_segment(&self, start: Vec3, end: Vec3) -> f32 {
        let (a, b) = (flat(start), flat(end));
        match self.footprint {
            Footprint::Circle { center, radius } => {
                (point_segment_distance(flat(center), a, b) - radius.abs()).max(0.0)
            }
            Footprint::Rect { min, max } => {
                let (low, high) = (flat(min).min(flat(max)), flat(min).max(flat(max)));
                rect_segment_distance(low, high, a, b)
            }
        }
    }
}

/// Registry that stores structures and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct StructureRegistry {
    entries: BTreeMap<StructureId, Structure>,
    next_id: StructureId,
}

impl StructureRegistry {
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_id: StructureId::new(0),
        }
    }

    pub(crate) fn insert(&mut self, kind: StructureKind, footprint: Footprint) -> StructureId {
        let id = self.next_id;
        self.next_id = StructureId::new(id.get().saturating_add(1));
        let _ = self.entries.insert(
            id,
            Structure {
                id,
                kind,
                footprint,
            },
        );
        id
    }

    pub(crate) fn remove(&mut self, id: StructureId) -> Option<Structure> {
        self.entries.remove(&id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Structure> {
        self.entries.values()
    }
}

fn rect_segment_distance(low: Vec2, high: Vec2, a: Vec2, b: Vec2) -> f32 {
    let inside = |p: Vec2| p.x >= low.x && p.x <= high.x && p.y >= low.y && p.y <= high.y;
    if inside(a) || inside(b) {
        return 0.0;
    }

    let corners = [
        low,
        Vec2::new(high.x, low.y),
        high,
        Vec2::new(low.x, high.y),
    ];
    let mut best = f32::MAX;
    for index in 0..corners.len() {
        let next = corners[(index + 1) % corners.len()];
        best = best.min(segment_segment_distance(a, b, corners[index], next));
    }
    best
}
