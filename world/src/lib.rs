#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for Rampart wall building.
//!
//! The world owns every placed piece, the spatial index over them, the
//! non-wall structures, the player's stockpile and the optional fog of war.
//! It is mutated exclusively through [`apply`] and inspected through the
//! [`query`] module or the collaborator traits from `rampart-core`.

mod connections;
mod deferred;
mod pieces;
mod spatial;
mod stockpile;
mod structures;
mod visibility;

use std::collections::BTreeSet;

use glam::Vec3;
use rampart_core::{
    Command, EntityRef, Event, HitClass, PieceError, PieceId, PieceKind, PlacedSegment,
    PlacementFailure, ResourceCost, ResourceKind, ResourceLedger, RunId, SceneHit, SceneQuery,
    StructureKind, MAX_SCENE_HITS,
};
use serde::Deserialize;
use tracing::{debug, info, warn};

pub use connections::ConnectionState;
pub use pieces::NavObstacle;
pub use stockpile::Stockpile;
pub use structures::Structure;
pub use visibility::FogOfWar;

use connections::{transfer_connections, update_connections};
use deferred::{DeferredQueue, DeferredTask};
use pieces::{PieceRegistry, PieceState};
use spatial::{flat, point_segment_distance, segment_segment_distance, SpatialGrid};
use structures::StructureRegistry;

/// Number of ticks between a piece replacement and the recompute of its surroundings.
pub const REPLACEMENT_RECOMPUTE_DELAY: u32 = 2;

const DEFAULT_CONNECTION_DISTANCE: f32 = 2.5;
const DEFAULT_GRID_CELL_SIZE: f32 = 4.0;

/// Tunables applied when the world is created.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct WorldSettings {
    /// Centre-to-centre distance under which two pieces count as connected.
    pub connection_distance: f32,
    /// Side length of a spatial index cell in world units.
    pub grid_cell_size: f32,
    /// Whether scene queries report a terrain hit.
    pub ground_enabled: bool,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            connection_distance: DEFAULT_CONNECTION_DISTANCE,
            grid_cell_size: DEFAULT_GRID_CELL_SIZE,
            ground_enabled: true,
        }
    }
}

/// Pending recompute request around a changed position.
#[derive(Clone, Copy, Debug)]
struct PieceChange {
    at: Vec3,
    radius: f32,
}

/// Represents the authoritative Rampart world state.
#[derive(Debug)]
pub struct World {
    connection_distance: f32,
    ground_enabled: bool,
    pieces: PieceRegistry,
    grid: SpatialGrid,
    structures: StructureRegistry,
    stockpile: Stockpile,
    fog: Option<FogOfWar>,
    deferred: DeferredQueue,
    changes: Vec<PieceChange>,
    scratch: Vec<PieceId>,
    due: Vec<DeferredTask>,
    tick_index: u64,
}

impl World {
    /// Creates an empty world with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::with_settings(WorldSettings::default())
    }

    /// Creates an empty world using the provided settings.
    #[must_use]
    pub fn with_settings(settings: WorldSettings) -> Self {
        Self {
            connection_distance: sanitize_distance(settings.connection_distance)
                .unwrap_or(DEFAULT_CONNECTION_DISTANCE),
            ground_enabled: settings.ground_enabled,
            pieces: PieceRegistry::new(),
            grid: SpatialGrid::new(settings.grid_cell_size),
            structures: StructureRegistry::new(),
            stockpile: Stockpile::default(),
            fog: None,
            deferred: DeferredQueue::default(),
            changes: Vec::new(),
            scratch: Vec::new(),
            due: Vec::new(),
            tick_index: 0,
        }
    }

    fn register_piece(&mut self, state: PieceState) {
        self.grid.insert(state.id, state.pose.position, state.extent());
        self.pieces.insert(state);
    }

    fn unregister_piece(&mut self, piece: PieceId) -> Option<PieceState> {
        let state = self.pieces.remove(piece)?;
        self.grid.remove(piece, state.pose.position);
        Some(state)
    }

    fn queue_change(&mut self, at: Vec3) {
        self.changes.push(PieceChange {
            at,
            radius: self.connection_distance * 2.0,
        });
    }

    /// Recomputes every piece near a queued change, in ascending identifier order.
    fn drain_changes(&mut self, out_events: &mut Vec<Event>) {
        if self.changes.is_empty() {
            return;
        }

        let mut affected = BTreeSet::new();
        for change in std::mem::take(&mut self.changes) {
            self.grid.near_point(change.at, change.radius, &mut self.scratch);
            affected.extend(self.scratch.iter().copied());
        }
        debug!(count = affected.len(), "recomputing connections");

        self.recompute(affected, out_events);
    }

    fn recompute(
        &mut self,
        affected: impl IntoIterator<Item = PieceId>,
        out_events: &mut Vec<Event>,
    ) {
        for piece in affected {
            if let Some(event) = update_connections(
                &mut self.pieces,
                &self.grid,
                self.connection_distance,
                piece,
                &mut self.scratch,
            ) {
                out_events.push(event);
            }
        }
    }

    fn place_run(
        &mut self,
        run: RunId,
        kind: PieceKind,
        segments: Vec<PlacedSegment>,
        cost: &ResourceCost,
        out_events: &mut Vec<Event>,
    ) {
        if segments.is_empty() {
            warn!(run = run.get(), "rejecting empty wall run");
            reject_run(run, PlacementFailure::EmptyRun, out_events);
            return;
        }

        if let Err(error) = self.stockpile.spend(cost) {
            warn!(run = run.get(), %error, "wall run could not be paid for");
            reject_run(run, PlacementFailure::SpendFailed, out_events);
            return;
        }
        if !cost.is_free() {
            out_events.push(Event::ResourcesSpent { cost: cost.clone() });
        }

        let mut pieces = Vec::with_capacity(segments.len());
        let mut records = Vec::with_capacity(segments.len());
        for segment in segments {
            let id = self.pieces.allocate_id();
            let record = segment.record();
            self.register_piece(PieceState::new(id, kind, run, segment.pose, record));
            self.queue_change(segment.pose.position);
            out_events.push(Event::WallPiecePlaced {
                piece: id,
                run,
                kind,
                record,
            });
            pieces.push(id);
            records.push(record);
        }

        info!(run = run.get(), pieces = pieces.len(), "wall run placed");
        out_events.push(Event::WallRunPlaced {
            run,
            pieces,
            records,
        });
        self.drain_changes(out_events);
    }

    fn demolish(&mut self, piece: PieceId, out_events: &mut Vec<Event>) {
        let Some(state) = self.unregister_piece(piece) else {
            debug!(piece = piece.get(), "demolition target missing");
            out_events.push(Event::PieceRequestRejected {
                piece,
                reason: PieceError::MissingPiece,
            });
            return;
        };

        info!(piece = piece.get(), "piece demolished");
        out_events.push(Event::PieceDemolished {
            piece,
            record: state.record,
        });
        self.queue_change(state.pose.position);
        self.drain_changes(out_events);
    }

    fn replace(&mut self, piece: PieceId, kind: PieceKind, out_events: &mut Vec<Event>) {
        let reason = match self.pieces.get(piece) {
            None => Some(PieceError::MissingPiece),
            Some(state) if state.kind == kind => Some(PieceError::SameKind),
            Some(_) => None,
        };
        if let Some(reason) = reason {
            debug!(piece = piece.get(), %reason, "replacement refused");
            out_events.push(Event::PieceRequestRejected { piece, reason });
            return;
        }
        let Some(previous) = self.unregister_piece(piece) else {
            return;
        };

        let replacement = self.pieces.allocate_id();
        let mut state = PieceState::new(
            replacement,
            kind,
            previous.run,
            previous.pose,
            previous.record,
        );
        state.connections =
            transfer_connections(&mut self.pieces, piece, replacement, &previous.connections);
        self.register_piece(state);

        info!(
            previous = piece.get(),
            replacement = replacement.get(),
            ?kind,
            "piece replaced"
        );
        out_events.push(Event::PieceReplaced {
            previous: piece,
            replacement,
            kind,
        });

        let mut announced: Vec<PieceId> = previous.connections.neighbors().to_vec();
        announced.push(replacement);
        announced.sort_unstable();
        for id in announced {
            if let Some(other) = self.pieces.get(id) {
                out_events.push(Event::ConnectionsChanged {
                    piece: id,
                    neighbors: other.connections.neighbors().to_vec(),
                    shape: other.connections.shape(),
                });
            }
        }

        self.deferred.schedule(
            REPLACEMENT_RECOMPUTE_DELAY,
            DeferredTask::RecomputeConnections(replacement),
        );
    }

    fn advance(&mut self, out_events: &mut Vec<Event>) {
        self.tick_index = self.tick_index.saturating_add(1);
        out_events.push(Event::TimeAdvanced {
            tick: self.tick_index,
        });

        let mut due = std::mem::take(&mut self.due);
        self.deferred.advance(&mut due);
        for task in &due {
            match *task {
                DeferredTask::RecomputeConnections(piece) => {
                    let position = self.pieces.get(piece).map(|state| state.pose.position);
                    if let Some(position) = position {
                        debug!(piece = piece.get(), "running deferred recompute");
                        self.queue_change(position);
                    }
                }
            }
        }
        self.due = due;
        self.drain_changes(out_events);
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneQuery for World {
    fn overlap_capsule(&self, start: Vec3, end: Vec3, radius: f32, out: &mut Vec<SceneHit>) {
        out.clear();
        let radius = radius.max(0.0);
        self.push_ground(out);

        for structure in self.structures.iter() {
            if structure.distance_to_segment(start, end) <= radius {
                out.push(structure_hit(structure));
            }
        }

        let (a, b) = (flat(start), flat(end));
        let mut candidates = Vec::new();
        self.grid.near_segment(start, end, radius, &mut candidates);
        for id in candidates {
            let Some(state) = self.pieces.get(id) else {
                continue;
            };
            let (first, second) = state.record.endpoints();
            if segment_segment_distance(a, b, flat(first), flat(second)) <= radius {
                out.push(piece_hit(state));
            }
        }

        cap_hits(out);
    }

    fn overlap_sphere(&self, center: Vec3, radius: f32, out: &mut Vec<SceneHit>) {
        out.clear();
        let radius = radius.max(0.0);
        self.push_ground(out);

        for structure in self.structures.iter() {
            if structure.distance_to_segment(center, center) <= radius {
                out.push(structure_hit(structure));
            }
        }

        let point = flat(center);
        let mut candidates = Vec::new();
        self.grid.near_point_spans(center, radius, &mut candidates);
        for id in candidates {
            let Some(state) = self.pieces.get(id) else {
                continue;
            };
            let (first, second) = state.record.endpoints();
            if point_segment_distance(point, flat(first), flat(second)) <= radius {
                out.push(piece_hit(state));
            }
        }

        cap_hits(out);
    }
}

impl World {
    fn push_ground(&self, out: &mut Vec<SceneHit>) {
        if self.ground_enabled {
            out.push(SceneHit {
                entity: EntityRef::Ground,
                class: HitClass::Terrain,
            });
        }
    }
}

impl ResourceLedger for World {
    fn can_afford(&self, cost: &ResourceCost) -> bool {
        self.stockpile.can_afford(cost)
    }

    fn resource(&self, kind: ResourceKind) -> u32 {
        self.stockpile.resource(kind)
    }
}

/// Keeps `out` within [`MAX_SCENE_HITS`], shedding decoration hits before
/// buildings and walls.
fn cap_hits(out: &mut Vec<SceneHit>) {
    let found = out.len();
    if found <= MAX_SCENE_HITS {
        return;
    }

    let mut excess = found - MAX_SCENE_HITS;
    out.retain(|hit| {
        if excess > 0 && matches!(hit.class, HitClass::Other) {
            excess -= 1;
            false
        } else {
            true
        }
    });
    out.truncate(MAX_SCENE_HITS);
    warn!(found, kept = out.len(), "scene query hit cap reached");
}

fn structure_hit(structure: &Structure) -> SceneHit {
    SceneHit {
        entity: EntityRef::Structure(structure.id),
        class: match structure.kind {
            StructureKind::Building => HitClass::Building,
            StructureKind::Other => HitClass::Other,
        },
    }
}

fn piece_hit(state: &PieceState) -> SceneHit {
    SceneHit {
        entity: EntityRef::Piece(state.id),
        class: HitClass::Wall {
            piece: state.id,
            kind: state.kind,
            record: state.record,
        },
    }
}

fn reject_run(run: RunId, reason: PlacementFailure, out_events: &mut Vec<Event>) {
    out_events.push(Event::WallRunRejected { run, reason });
    out_events.push(Event::PlacementFailed { reason });
}

fn sanitize_distance(distance: f32) -> Option<f32> {
    (distance.is_finite() && distance > 0.0).then_some(distance)
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureConnections {
            connection_distance,
        } => {
            let Some(distance) = sanitize_distance(connection_distance) else {
                warn!(connection_distance, "ignoring invalid connection distance");
                return;
            };
            world.connection_distance = distance;
            out_events.push(Event::ConnectionsConfigured {
                connection_distance: distance,
            });
            let every = world.pieces.ids();
            world.recompute(every, out_events);
        }
        Command::SetGround { enabled } => {
            world.ground_enabled = enabled;
        }
        Command::GrantResources { cost } => {
            world.stockpile.grant(&cost);
            out_events.push(Event::ResourcesGranted { cost });
        }
        Command::DebitResources { cost } => match world.stockpile.spend(&cost) {
            Ok(()) => out_events.push(Event::ResourcesSpent { cost }),
            Err(error) => warn!(%error, "debit refused"),
        },
        Command::AddStructure { kind, footprint } => {
            let structure = world.structures.insert(kind, footprint);
            debug!(structure = structure.get(), ?kind, "structure added");
            out_events.push(Event::StructureAdded { structure, kind });
        }
        Command::RemoveStructure { structure } => {
            if world.structures.remove(structure).is_some() {
                out_events.push(Event::StructureRemoved { structure });
            } else {
                debug!(structure = structure.get(), "structure already gone");
            }
        }
        Command::EnableFog => {
            if world.fog.is_none() {
                world.fog = Some(FogOfWar::default());
            }
        }
        Command::RevealArea { center, radius } => {
            if let Some(fog) = world.fog.as_mut() {
                fog.reveal(center, radius);
                out_events.push(Event::AreaRevealed { center, radius });
            }
        }
        Command::PlaceWallRun {
            run,
            kind,
            segments,
            cost,
        } => world.place_run(run, kind, segments, &cost, out_events),
        Command::DemolishPiece { piece } => world.demolish(piece, out_events),
        Command::ReplacePiece { piece, kind } => world.replace(piece, kind, out_events),
        Command::Tick => world.advance(out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use glam::Vec3;
    use rampart_core::{
        JunctionShape, PieceId, PieceKind, Pose, RunId, SegmentRecord, VisibilityView,
    };

    use super::{ConnectionState, NavObstacle, Stockpile, Structure, World};

    /// Read-only snapshot describing a placed piece.
    #[derive(Clone, Debug, PartialEq)]
    pub struct PieceSnapshot {
        /// Identifier of the piece.
        pub id: PieceId,
        /// Variant of the piece.
        pub kind: PieceKind,
        /// Run the piece was placed with.
        pub run: RunId,
        /// Pose the piece was spawned with.
        pub pose: Pose,
        /// Span the piece occupies.
        pub record: SegmentRecord,
        /// Sorted identifiers of connected pieces.
        pub neighbors: Vec<PieceId>,
        /// Junction shape derived from the neighbours.
        pub shape: JunctionShape,
    }

    /// Captures every placed piece in ascending identifier order.
    #[must_use]
    pub fn pieces(world: &World) -> Vec<PieceSnapshot> {
        world
            .pieces
            .iter()
            .map(|state| PieceSnapshot {
                id: state.id,
                kind: state.kind,
                run: state.run,
                pose: state.pose,
                record: state.record,
                neighbors: state.connections.neighbors().to_vec(),
                shape: state.connections.shape(),
            })
            .collect()
    }

    /// Number of placed pieces.
    #[must_use]
    pub fn piece_count(world: &World) -> usize {
        world.pieces.len()
    }

    /// Retrieves the connection state of a piece, if it exists.
    #[must_use]
    pub fn connections(world: &World, piece: PieceId) -> Option<&ConnectionState> {
        world.pieces.get(piece).map(|state| &state.connections)
    }

    /// Current centre-to-centre connection distance.
    #[must_use]
    pub fn connection_distance(world: &World) -> f32 {
        world.connection_distance
    }

    /// Navigation obstacles of every placed piece in ascending identifier order.
    #[must_use]
    pub fn nav_obstacles(world: &World) -> Vec<NavObstacle> {
        world.pieces.iter().map(|state| state.obstacle).collect()
    }

    /// Provides read-only access to the player's stockpile.
    #[must_use]
    pub fn stockpile(world: &World) -> &Stockpile {
        &world.stockpile
    }

    /// Fog of war, when enabled.
    #[must_use]
    pub fn visibility(world: &World) -> Option<&dyn VisibilityView> {
        world.fog.as_ref().map(|fog| fog as &dyn VisibilityView)
    }

    /// Reports whether `point` is visible; always true without fog of war.
    #[must_use]
    pub fn is_visible(world: &World, point: Vec3) -> bool {
        visibility(world).map_or(true, |fog| fog.is_position_visible(point))
    }

    /// Structures present in the scene, in ascending identifier order.
    pub fn structures(world: &World) -> impl Iterator<Item = &Structure> {
        world.structures.iter()
    }

    /// Number of ticks the world has advanced.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Number of deferred tasks still counting down.
    #[must_use]
    pub fn pending_deferred(world: &World) -> usize {
        world.deferred.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;
    use rampart_core::{Footprint, Pose, StructureId};

    fn segment(center: Vec3, length: f32) -> PlacedSegment {
        PlacedSegment {
            pose: Pose::new(center, Quat::from_rotation_y(std::f32::consts::FRAC_PI_2), Vec3::ONE),
            length,
        }
    }

    fn place(world: &mut World, run: u32, segments: Vec<PlacedSegment>) -> Vec<Event> {
        let mut events = Vec::new();
        apply(
            world,
            Command::PlaceWallRun {
                run: RunId::new(run),
                kind: PieceKind::Wall,
                segments,
                cost: ResourceCost::new(),
            },
            &mut events,
        );
        events
    }

    #[test]
    fn empty_runs_are_rejected() {
        let mut world = World::new();
        let events = place(&mut world, 0, Vec::new());
        assert_eq!(
            events,
            vec![
                Event::WallRunRejected {
                    run: RunId::new(0),
                    reason: PlacementFailure::EmptyRun,
                },
                Event::PlacementFailed {
                    reason: PlacementFailure::EmptyRun,
                },
            ]
        );
    }

    #[test]
    fn capsule_reports_ground_structures_then_pieces() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::AddStructure {
                kind: StructureKind::Building,
                footprint: Footprint::Circle {
                    center: Vec3::new(0.0, 0.0, 1.0),
                    radius: 0.5,
                },
            },
            &mut events,
        );
        let _ = place(&mut world, 0, vec![segment(Vec3::new(1.0, 0.0, 0.0), 2.0)]);

        let mut hits = Vec::new();
        world.overlap_capsule(
            Vec3::new(-1.0, 0.0, 0.6),
            Vec3::new(3.0, 0.0, 0.6),
            0.7,
            &mut hits,
        );
        let entities: Vec<EntityRef> = hits.iter().map(|hit| hit.entity).collect();
        assert_eq!(
            entities,
            vec![
                EntityRef::Ground,
                EntityRef::Structure(StructureId::new(0)),
                EntityRef::Piece(PieceId::new(0)),
            ]
        );
    }

    #[test]
    fn crowded_decorations_do_not_hide_walls() {
        let mut world = World::new();
        let mut events = Vec::new();
        for index in 0..MAX_SCENE_HITS + 6 {
            apply(
                &mut world,
                Command::AddStructure {
                    kind: StructureKind::Other,
                    footprint: Footprint::Circle {
                        center: Vec3::new(index as f32 * 0.01, 0.0, 0.5),
                        radius: 0.5,
                    },
                },
                &mut events,
            );
        }
        let _ = place(&mut world, 0, vec![segment(Vec3::new(1.0, 0.0, 0.0), 2.0)]);

        let mut hits = Vec::new();
        world.overlap_sphere(Vec3::new(0.5, 0.0, 0.0), 0.5, &mut hits);
        assert_eq!(hits.len(), MAX_SCENE_HITS);
        assert_eq!(hits[0].entity, EntityRef::Ground);
        assert_eq!(hits.last().map(|hit| hit.entity), Some(EntityRef::Piece(PieceId::new(0))));

        world.overlap_capsule(Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0), 0.1, &mut hits);
        assert_eq!(hits.len(), MAX_SCENE_HITS);
        assert!(hits
            .iter()
            .any(|hit| hit.entity == EntityRef::Piece(PieceId::new(0))));
    }

    #[test]
    fn disabling_ground_removes_terrain_hits() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(&mut world, Command::SetGround { enabled: false }, &mut events);

        let mut hits = vec![SceneHit {
            entity: EntityRef::Ground,
            class: HitClass::Terrain,
        }];
        world.overlap_sphere(Vec3::ZERO, 1.0, &mut hits);
        assert!(hits.is_empty());
    }

    #[test]
    fn invalid_connection_distance_is_ignored() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ConfigureConnections {
                connection_distance: -1.0,
            },
            &mut events,
        );
        assert!(events.is_empty());
        assert_eq!(query::connection_distance(&world), DEFAULT_CONNECTION_DISTANCE);
    }
}
