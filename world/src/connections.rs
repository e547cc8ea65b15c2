//! Per-piece connection tracking.
//!
//! Each registered piece keeps the sorted set of pieces whose centres lie
//! within the world's connection distance, along with the junction shape that
//! set implies. Sets are recomputed independently per piece; the relation is
//! symmetric because distance is, provided every piece within reach of a
//! change is recomputed. The world guarantees that by recomputing everything
//! within twice the connection distance of each change.

use std::f32::consts::FRAC_PI_4;

use glam::{Vec2, Vec3};
use rampart_core::{Event, JunctionKind, JunctionShape, PieceId};

use crate::{pieces::PieceRegistry, spatial::flat, spatial::SpatialGrid};

const STRAIGHT_TOLERANCE: f32 = 1e-3;

const MASK_NORTH: u8 = 1;
const MASK_EAST: u8 = 2;
const MASK_SOUTH: u8 = 4;
const MASK_WEST: u8 = 8;

/// Neighbour set and derived junction shape of a single piece.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConnectionState {
    neighbors: Vec<PieceId>,
    shape: JunctionShape,
}

impl ConnectionState {
    /// Sorted identifiers of the connected pieces.
    #[must_use]
    pub fn neighbors(&self) -> &[PieceId] {
        &self.neighbors
    }

    /// Junction shape derived from the neighbour positions.
    #[must_use]
    pub const fn shape(&self) -> JunctionShape {
        self.shape
    }
}

/// Recomputes the connections of `piece`, returning an event when they changed.
pub(crate) fn update_connections(
    pieces: &mut PieceRegistry,
    grid: &SpatialGrid,
    connection_distance: f32,
    piece: PieceId,
    scratch: &mut Vec<PieceId>,
) -> Option<Event> {
    let origin = pieces.get(piece)?.pose.position;
    grid.near_point(origin, connection_distance, scratch);

    let mut neighbors = Vec::new();
    let mut positions = Vec::new();
    for candidate in scratch.iter().copied() {
        if candidate == piece {
            continue;
        }
        let Some(other) = pieces.get(candidate) else {
            continue;
        };
        if other.pose.position.distance(origin) <= connection_distance {
            neighbors.push(candidate);
            positions.push(other.pose.position);
        }
    }

    let next = ConnectionState {
        shape: junction_shape(origin, &positions),
        neighbors,
    };
    let state = pieces.get_mut(piece)?;
    if state.connections == next {
        return None;
    }
    state.connections = next;

    Some(Event::ConnectionsChanged {
        piece,
        neighbors: state.connections.neighbors.clone(),
        shape: state.connections.shape,
    })
}

/// Moves the connections of a replaced piece onto its replacement.
///
/// Every neighbour that listed `from` lists `to` instead, and the returned state
/// is the one the replacement should adopt.
pub(crate) fn transfer_connections(
    pieces: &mut PieceRegistry,
    from: PieceId,
    to: PieceId,
    state: &ConnectionState,
) -> ConnectionState {
    for neighbor in &state.neighbors {
        if let Some(other) = pieces.get_mut(*neighbor) {
            for entry in &mut other.connections.neighbors {
                if *entry == from {
                    *entry = to;
                }
            }
            other.connections.neighbors.sort_unstable();
        }
    }
    state.clone()
}

/// Derives the visual junction from the neighbour positions around `origin`.
pub(crate) fn junction_shape(origin: Vec3, neighbors: &[Vec3]) -> JunctionShape {
    let directions: Vec<Vec2> = neighbors
        .iter()
        .map(|position| flat(*position) - flat(origin))
        .collect();
    let mask = directions
        .iter()
        .fold(0, |mask, direction| mask | quadrant_bit(*direction));

    let (kind, facing_yaw) = match directions.as_slice() {
        [] => (JunctionKind::Isolated, 0.0),
        [only] => (JunctionKind::End, yaw_of(*only)),
        [first, second] => {
            let average = first.normalize_or_zero() + second.normalize_or_zero();
            if average.length() < STRAIGHT_TOLERANCE {
                (JunctionKind::Straight, yaw_of(canonical_line(*second - *first)))
            } else {
                (JunctionKind::Corner, yaw_of(average))
            }
        }
        _ => (JunctionKind::Junction, 0.0),
    };

    JunctionShape {
        kind,
        facing_yaw,
        mask,
    }
}

/// A line has no direction; pick the half facing +X (or +Z when vertical).
fn canonical_line(direction: Vec2) -> Vec2 {
    if direction.x < 0.0 || (direction.x == 0.0 && direction.y < 0.0) {
        -direction
    } else {
        direction
    }
}

fn yaw_of(direction: Vec2) -> f32 {
    if direction.length_squared() <= f32::EPSILON {
        return 0.0;
    }
    direction.x.atan2(direction.y)
}

fn quadrant_bit(direction: Vec2) -> u8 {
    if direction.length_squared() <= f32::EPSILON {
        return 0;
    }
    let yaw = yaw_of(direction);
    if (-FRAC_PI_4..FRAC_PI_4).contains(&yaw) {
        MASK_NORTH
    } else if (FRAC_PI_4..3.0 * FRAC_PI_4).contains(&yaw) {
        MASK_EAST
    } else if (-3.0 * FRAC_PI_4..-FRAC_PI_4).contains(&yaw) {
        MASK_WEST
    } else {
        MASK_SOUTH
    }
}
