//! Uniform grid index over piece centres plus the planar distance helpers the
//! scene queries are built from.

use std::collections::HashMap;

use glam::{Vec2, Vec3};
use rampart_core::PieceId;

/// Sparse uniform grid bucketing pieces by the horizontal cell of their centre.
///
/// Every piece also records its half-extent so range queries can widen their
/// search window by the largest extent ever inserted; a piece whose centre lies
/// outside the window therefore still turns up when its span reaches inside.
#[derive(Clone, Debug)]
pub(crate) struct SpatialGrid {
    cell_size: f32,
    cells: HashMap<(i32, i32), Vec<PieceId>>,
    max_extent: f32,
}

impl SpatialGrid {
    /// Creates an empty grid with square cells of `cell_size` world units.
    pub(crate) fn new(cell_size: f32) -> Self {
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            1.0
        };
        Self {
            cell_size,
            cells: HashMap::new(),
            max_extent: 0.0,
        }
    }

    /// Registers `piece` at `position` with the given half-extent.
    pub(crate) fn insert(&mut self, piece: PieceId, position: Vec3, extent: f32) {
        let key = self.key(flat(position));
        self.cells.entry(key).or_default().push(piece);
        self.max_extent = self.max_extent.max(extent.abs());
    }

    /// Unregisters `piece`, which must have been inserted at `position`.
    pub(crate) fn remove(&mut self, piece: PieceId, position: Vec3) {
        let key = self.key(flat(position));
        if let Some(bucket) = self.cells.get_mut(&key) {
            bucket.retain(|candidate| *candidate != piece);
            if bucket.is_empty() {
                let _ = self.cells.remove(&key);
            }
        }
    }

    /// Collects every piece whose centre may lie within `radius` of `center`,
    /// sorted and deduplicated.
    pub(crate) fn near_point(&self, center: Vec3, radius: f32, out: &mut Vec<PieceId>) {
        let point = flat(center);
        let reach = Vec2::splat(radius.max(0.0));
        self.collect(point - reach, point + reach, out);
    }

    /// Collects every piece whose span may come within `radius` of the segment.
    pub(crate) fn near_segment(&self, start: Vec3, end: Vec3, radius: f32, out: &mut Vec<PieceId>) {
        let (a, b) = (flat(start), flat(end));
        let reach = Vec2::splat(radius.max(0.0) + self.max_extent);
        self.collect(a.min(b) - reach, a.max(b) + reach, out);
    }

    /// Widens a point query so spans, not just centres, are found.
    pub(crate) fn near_point_spans(&self, center: Vec3, radius: f32, out: &mut Vec<PieceId>) {
        self.near_point(center, radius.max(0.0) + self.max_extent, out);
    }

    fn collect(&self, min: Vec2, max: Vec2, out: &mut Vec<PieceId>) {
        out.clear();
        let (min_x, min_z) = self.key(min);
        let (max_x, max_z) = self.key(max);
        for x in min_x..=max_x {
            for z in min_z..=max_z {
                if let Some(bucket) = self.cells.get(&(x, z)) {
                    out.extend(bucket.iter().copied());
                }
            }
        }
        out.sort_unstable();
        out.dedup();
    }

    fn key(&self, point: Vec2) -> (i32, i32) {
        (
            (point.x / self.cell_size).floor() as i32,
            (point.y / self.cell_size).floor() as i32,
        )
    }
}

/// Projects a world position onto the horizontal plane.
pub(crate) fn flat(point: Vec3) -> Vec2 {
    Vec2::new(point.x, point.z)
}

/// Planar distance from `point` to the segment `a`..`b`.
pub(crate) fn point_segment_distance(point: Vec2, a: Vec2, b: Vec2) -> f32 {
    let span = b - a;
    let length_squared = span.length_squared();
    if length_squared <= f32::EPSILON {
        return point.distance(a);
    }
    let t = ((point - a).dot(span) / length_squared).clamp(0.0, 1.0);
    point.distance(a + span * t)
}

/// Planar distance between the segments `a1`..`a2` and `b1`..`b2`.
pub(crate) fn segment_segment_distance(a1: Vec2, a2: Vec2, b1: Vec2, b2: Vec2) -> f32 {
    if segments_cross(a1, a2, b1, b2) {
        return 0.0;
    }
    point_segment_distance(a1, b1, b2)
        .min(point_segment_distance(a2, b1, b2))
        .min(point_segment_distance(b1, a1, a2))
        .min(point_segment_distance(b2, a1, a2))
}

fn segments_cross(a1: Vec2, a2: Vec2, b1: Vec2, b2: Vec2) -> bool {
    let side = |p: Vec2, q: Vec2, r: Vec2| (q - p).perp_dot(r - p);
    let d1 = side(b1, b2, a1);
    let d2 = side(b1, b2, a2);
    let d3 = side(a1, a2, b1);
    let d4 = side(a1, a2, b2);
    ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
}
