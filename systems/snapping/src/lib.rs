#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure snapping system that pulls a cursor onto nearby wall connection points.

use glam::Vec3;
use rampart_core::{HitClass, PieceId, PieceKind, SceneHit, SceneQuery, SegmentRecord};

/// Kind of connection point a cursor snapped onto.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SnapKind {
    /// One of the two ends of a wall piece.
    Endpoint,
    /// Centre of a wall piece.
    Midpoint,
    /// Anchor position of a gate or tower.
    Anchor,
}

/// Where a snap target was found.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SnapSource {
    /// Segment record committed earlier in the current session.
    Session,
    /// Piece reported by the scene query.
    Scene(PieceId),
}

/// Connection point selected by the resolver.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SnapTarget {
    /// World-space position of the connection point.
    pub point: Vec3,
    /// Kind of connection point.
    pub kind: SnapKind,
    /// Source the point was collected from.
    pub source: SnapSource,
}

/// Outcome of a snap attempt.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Snap {
    /// Snapped position, or the candidate unchanged when nothing was in range.
    pub point: Vec3,
    /// Target that was snapped onto, if any.
    pub target: Option<SnapTarget>,
}

impl Snap {
    /// Reports whether the candidate was relocated onto a target.
    #[must_use]
    pub const fn is_snapped(&self) -> bool {
        self.target.is_some()
    }

    /// Reports whether the candidate snapped onto the end of a wall piece.
    #[must_use]
    pub fn is_wall_endpoint(&self) -> bool {
        matches!(
            self.target,
            Some(SnapTarget {
                kind: SnapKind::Endpoint,
                ..
            })
        )
    }
}

/// Snap resolver that reuses scratch buffers across queries.
#[derive(Debug, Default)]
pub struct SnapResolver {
    hits: Vec<SceneHit>,
    scene_walls: Vec<(PieceId, PieceKind, SegmentRecord)>,
}

impl SnapResolver {
    /// Creates a resolver with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Finds the closest connection point within `snap_radius` of `candidate`.
    ///
    /// Targets are visited in a fixed order: session-local records first, in
    /// record order, then scene pieces by ascending identifier. Within a record
    /// the first endpoint precedes the second, which precedes the midpoint.
    /// Equally distant targets resolve to the one visited first.
    pub fn try_snap<S>(
        &mut self,
        candidate: Vec3,
        snap_radius: f32,
        session_records: &[SegmentRecord],
        scene: &S,
    ) -> Snap
    where
        S: SceneQuery + ?Sized,
    {
        let mut best: Option<(f32, SnapTarget)> = None;
        let mut consider = |target: SnapTarget| {
            let distance = candidate.distance(target.point);
            if distance > snap_radius {
                return;
            }
            if best.map_or(true, |(closest, _)| distance < closest) {
                best = Some((distance, target));
            }
        };

        for record in session_records {
            for (point, kind) in wall_points(record) {
                consider(SnapTarget {
                    point,
                    kind,
                    source: SnapSource::Session,
                });
            }
        }

        scene.overlap_sphere(candidate, snap_radius, &mut self.hits);
        self.scene_walls.clear();
        self.scene_walls
            .extend(self.hits.iter().filter_map(|hit| match hit.class {
                HitClass::Wall {
                    piece,
                    kind,
                    record,
                } => Some((piece, kind, record)),
                _ => None,
            }));
        self.scene_walls.sort_by_key(|(piece, _, _)| *piece);

        for (piece, kind, record) in &self.scene_walls {
            let source = SnapSource::Scene(*piece);
            match kind {
                PieceKind::Wall => {
                    for (point, kind) in wall_points(record) {
                        consider(SnapTarget {
                            point,
                            kind,
                            source,
                        });
                    }
                }
                PieceKind::Gate | PieceKind::Tower => consider(SnapTarget {
                    point: record.center(),
                    kind: SnapKind::Anchor,
                    source,
                }),
            }
        }

        match best {
            Some((_, target)) => Snap {
                point: target.point,
                target: Some(target),
            },
            None => Snap {
                point: candidate,
                target: None,
            },
        }
    }
}

fn wall_points(record: &SegmentRecord) -> [(Vec3, SnapKind); 3] {
    let (first, second) = record.endpoints();
    [
        (first, SnapKind::Endpoint),
        (second, SnapKind::Endpoint),
        (record.center(), SnapKind::Midpoint),
    ]
}
