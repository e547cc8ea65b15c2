#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure validation system that decides whether a prospective wall span collides
//! with existing walls or buildings.
//!
//! Wall-to-wall checks run on the horizontal plane against segment records.
//! Spans that end on an existing wall's endpoint or midpoint are treated as
//! intentional connections. Every other wall is rejected when the span
//! crosses it (including through a joint where two pieces meet) or runs along
//! it for more than a glancing distance. Building checks sweep a capsule
//! through the scene and ignore terrain, previews and wall pieces.

use glam::{Vec2, Vec3};
use rampart_core::{HitClass, PlacementConfig, SceneHit, SceneQuery, SegmentRecord};

/// Maximum sine of the angle between two spans still considered parallel.
const PARALLEL_TOLERANCE: f32 = 1e-3;
/// Relative tolerance applied to the orientation tests.
const ORIENTATION_EPSILON: f32 = 1e-5;
/// Distance from the span within which a wall endpoint counts as lying on it.
const ON_SPAN_TOLERANCE: f32 = 1e-3;

/// Overlap validator that reuses a scratch hit buffer across queries.
#[derive(Debug)]
pub struct OverlapValidator {
    connection_tolerance: f32,
    min_collinear_overlap: f32,
    hits: Vec<SceneHit>,
}

impl Default for OverlapValidator {
    fn default() -> Self {
        Self::new(&PlacementConfig::default())
    }
}

impl OverlapValidator {
    /// Creates a validator using the tolerances from `config`.
    #[must_use]
    pub fn new(config: &PlacementConfig) -> Self {
        Self {
            connection_tolerance: config.connection_tolerance.max(0.0),
            min_collinear_overlap: config.min_collinear_overlap.max(0.0),
            hits: Vec::new(),
        }
    }

    /// Reports whether the span from `start` to `end` overlaps any of `walls`.
    ///
    /// Ending on `loop_anchor` (the very first anchor of the placing session)
    /// closes a loop and is always allowed.
    pub fn would_overlap_wall<'a, I>(
        &self,
        start: Vec3,
        end: Vec3,
        walls: I,
        loop_anchor: Option<Vec3>,
    ) -> bool
    where
        I: IntoIterator<Item = &'a SegmentRecord>,
    {
        if let Some(anchor) = loop_anchor {
            if flat_distance(end, anchor) <= self.connection_tolerance {
                return false;
            }
        }

        walls
            .into_iter()
            .any(|record| self.conflicts_with(start, end, record))
    }

    /// Reports whether a capsule of `radius` swept from `start` to `end` hits a building.
    pub fn would_overlap_structure<S>(
        &mut self,
        start: Vec3,
        end: Vec3,
        radius: f32,
        scene: &S,
    ) -> bool
    where
        S: SceneQuery + ?Sized,
    {
        scene.overlap_capsule(start, end, radius, &mut self.hits);
        self.hits.iter().any(blocks_wall)
    }

    /// Collects the records of wall-family pieces lying along the span.
    ///
    /// The output buffer is cleared before populating it.
    pub fn gather_walls<S>(
        &mut self,
        start: Vec3,
        end: Vec3,
        scene: &S,
        out: &mut Vec<SegmentRecord>,
    )
    where
        S: SceneQuery + ?Sized,
    {
        out.clear();
        scene.overlap_capsule(start, end, self.connection_tolerance, &mut self.hits);
        out.extend(self.hits.iter().filter_map(|hit| match hit.class {
            HitClass::Wall { record, .. } => Some(record),
            _ => None,
        }));
    }

    fn conflicts_with(&self, start: Vec3, end: Vec3, record: &SegmentRecord) -> bool {
        let (wall_start, wall_end) = record.endpoints();
        let targets = [wall_start, wall_end, record.center()];

        let tolerance = self.connection_tolerance;
        let touches = |point: Vec3| {
            targets
                .iter()
                .any(|target| flat_distance(point, *target) <= tolerance)
        };
        if touches(start) || touches(end) {
            return false;
        }

        let (p1, p2) = (flat(start), flat(end));
        let (q1, q2) = (flat(wall_start), flat(wall_end));
        properly_intersect(p1, p2, q1, q2)
            || endpoint_on_interior(p1, p2, q1, q2)
            || collinear_overlap(p1, p2, q1, q2, tolerance) > self.min_collinear_overlap
    }
}

fn blocks_wall(hit: &SceneHit) -> bool {
    match hit.class {
        HitClass::Building => true,
        HitClass::Wall { .. } | HitClass::Terrain | HitClass::Preview | HitClass::Other => false,
    }
}

fn flat(point: Vec3) -> Vec2 {
    Vec2::new(point.x, point.z)
}

fn flat_distance(a: Vec3, b: Vec3) -> f32 {
    flat(a).distance(flat(b))
}

fn orientation(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    (b - a).perp_dot(c - a)
}

/// Strict crossing test: touching or collinear spans do not count.
fn properly_intersect(p1: Vec2, p2: Vec2, q1: Vec2, q2: Vec2) -> bool {
    let epsilon = ORIENTATION_EPSILON * (p2 - p1).length() * (q2 - q1).length();
    let straddles = |a: f32, b: f32| (a > epsilon && b < -epsilon) || (a < -epsilon && b > epsilon);

    straddles(orientation(q1, q2, p1), orientation(q1, q2, p2))
        && straddles(orientation(p1, p2, q1), orientation(p1, p2, q2))
}

/// Reports whether an end of the wall `q1..q2` lies strictly inside the span
/// `p1..p2`, as happens where a span crosses a run at a joint between pieces.
///
/// Parallel walls are left to [`collinear_overlap`].
fn endpoint_on_interior(p1: Vec2, p2: Vec2, q1: Vec2, q2: Vec2) -> bool {
    let span = p2 - p1;
    let length = span.length();
    let other = (q2 - q1).normalize_or_zero();
    if length <= f32::EPSILON || other == Vec2::ZERO {
        return false;
    }
    let unit = span / length;
    if unit.perp_dot(other).abs() <= PARALLEL_TOLERANCE {
        return false;
    }

    [q1, q2].into_iter().any(|end| {
        let offset = end - p1;
        let along = unit.dot(offset);
        unit.perp_dot(offset).abs() <= ON_SPAN_TOLERANCE && along > 0.0 && along < length
    })
}

/// Length shared by two collinear spans, zero when they are not collinear.
fn collinear_overlap(p1: Vec2, p2: Vec2, q1: Vec2, q2: Vec2, tolerance: f32) -> f32 {
    let span = p2 - p1;
    let length = span.length();
    if length <= f32::EPSILON {
        return 0.0;
    }
    let unit = span / length;

    let other = (q2 - q1).normalize_or_zero();
    if other == Vec2::ZERO || unit.perp_dot(other).abs() > PARALLEL_TOLERANCE {
        return 0.0;
    }
    if unit.perp_dot(q1 - p1).abs() > tolerance {
        return 0.0;
    }

    let along_first = unit.dot(q1 - p1);
    let along_second = unit.dot(q2 - p1);
    let low = along_first.min(along_second).max(0.0);
    let high = along_first.max(along_second).min(length);
    (high - low).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crossing_spans_intersect_properly() {
        assert!(properly_intersect(
            Vec2::new(0.0, -1.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(-1.0, 0.0),
            Vec2::new(1.0, 0.0),
        ));
    }

    #[test]
    fn touching_spans_do_not_intersect_properly() {
        assert!(!properly_intersect(
            Vec2::new(0.0, 0.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(-1.0, 0.0),
            Vec2::new(1.0, 0.0),
        ));
    }

    #[test]
    fn wall_ending_inside_the_span_is_detected() {
        let (p1, p2) = (Vec2::new(4.0, -3.0), Vec2::new(4.0, 5.0));
        assert!(endpoint_on_interior(p1, p2, Vec2::new(2.0, 0.0), Vec2::new(4.0, 0.0)));
        assert!(endpoint_on_interior(p1, p2, Vec2::new(4.0, 0.0), Vec2::new(6.0, 0.0)));
        assert!(!endpoint_on_interior(p1, p2, Vec2::new(4.0, 5.0), Vec2::new(6.0, 5.0)));
        assert!(!endpoint_on_interior(p1, p2, Vec2::new(4.0, 0.0), Vec2::new(4.0, 2.0)));
    }

    #[test]
    fn collinear_overlap_measures_shared_interval() {
        let overlap = collinear_overlap(
            Vec2::new(0.0, 0.0),
            Vec2::new(4.0, 0.0),
            Vec2::new(5.0, 0.0),
            Vec2::new(3.0, 0.0),
            0.01,
        );
        assert!((overlap - 1.0).abs() < 1e-5);
    }

    #[test]
    fn parallel_offset_spans_share_nothing() {
        let overlap = collinear_overlap(
            Vec2::new(0.0, 0.0),
            Vec2::new(4.0, 0.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(4.0, 1.0),
            0.01,
        );
        assert_eq!(overlap, 0.0);
    }
}
