#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Rampart wall-building subsystem.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems to react to deterministically. Systems consult the world only
//! through the narrow collaborator traits declared here ([`SceneQuery`],
//! [`ResourceLedger`], [`VisibilityView`]) and respond with new commands.

use std::collections::BTreeMap;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound on the number of hits a single scene query reports.
pub const MAX_SCENE_HITS: usize = 64;

/// Unique identifier assigned to a placed wall-family piece.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PieceId(u32);

impl PieceId {
    /// Creates a new piece identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Identifier of a single committed wall run (one first-to-second anchor span).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RunId(u32);

impl RunId {
    /// Creates a new run identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a non-wall structure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StructureId(u32);

impl StructureId {
    /// Creates a new structure identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Local axis of a piece along which its length is measured.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    /// Local X axis.
    X,
    /// Local Y axis.
    Y,
    /// Local Z axis, the facing axis of every placed piece.
    #[default]
    Z,
}

impl Axis {
    /// Reads the component of `value` that lies along this axis.
    #[must_use]
    pub fn component(self, value: Vec3) -> f32 {
        match self {
            Self::X => value.x,
            Self::Y => value.y,
            Self::Z => value.z,
        }
    }

    /// Returns a copy of `value` with this axis' component replaced.
    #[must_use]
    pub fn with_component(self, value: Vec3, component: f32) -> Vec3 {
        match self {
            Self::X => Vec3::new(component, value.y, value.z),
            Self::Y => Vec3::new(value.x, component, value.z),
            Self::Z => Vec3::new(value.x, value.y, component),
        }
    }

    /// Horizontal axis perpendicular to this one, used to measure piece width.
    #[must_use]
    pub const fn across(self) -> Self {
        match self {
            Self::X => Self::Z,
            Self::Y | Self::Z => Self::X,
        }
    }
}

/// Position, rotation and non-uniform scale of a piece in world space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// World-space centre of the piece.
    pub position: Vec3,
    /// Orientation of the piece; local +Z faces along the run.
    pub rotation: Quat,
    /// Non-uniform scale applied to the piece template.
    pub scale: Vec3,
}

impl Pose {
    /// Creates a pose from its components.
    #[must_use]
    pub const fn new(position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }
}

/// One computed piece of a wall run: its pose and the span it covers.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlacedSegment {
    /// Pose the piece should be spawned with.
    pub pose: Pose,
    /// World-space length covered by the piece along the run.
    pub length: f32,
}

impl PlacedSegment {
    /// Derives the immutable segment record used by overlap and snap math.
    #[must_use]
    pub fn record(&self) -> SegmentRecord {
        SegmentRecord::new(self.pose.position, self.length, self.pose.rotation)
    }
}

/// Immutable centre/length/rotation triple describing a placed piece's span.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SegmentRecord {
    center: Vec3,
    length: f32,
    rotation: Quat,
}

impl SegmentRecord {
    /// Creates a new record from a piece's centre, covered length and rotation.
    #[must_use]
    pub const fn new(center: Vec3, length: f32, rotation: Quat) -> Self {
        Self {
            center,
            length,
            rotation,
        }
    }

    /// World-space centre of the span, which is also its midpoint.
    #[must_use]
    pub const fn center(&self) -> Vec3 {
        self.center
    }

    /// Length of the span.
    #[must_use]
    pub const fn length(&self) -> f32 {
        self.length
    }

    /// Orientation shared by the piece that owns the record.
    #[must_use]
    pub const fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Unit direction of the span (the rotated local +Z axis).
    #[must_use]
    pub fn direction(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    /// The two endpoints `center ± direction * length / 2`.
    #[must_use]
    pub fn endpoints(&self) -> (Vec3, Vec3) {
        let half = self.direction() * (self.length * 0.5);
        (self.center - half, self.center + half)
    }
}

/// Variants of the placeable wall-family structure.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PieceKind {
    /// Plain wall segment.
    #[default]
    Wall,
    /// Gate that replaced a wall segment.
    Gate,
    /// Tower that replaced a wall segment.
    Tower,
}

/// Kinds of resources a placement may consume.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Currency.
    Gold,
    /// Timber.
    Wood,
    /// Quarried stone.
    Stone,
}

/// Mapping from resource kind to a non-negative amount.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceCost {
    amounts: BTreeMap<ResourceKind, u32>,
}

impl ResourceCost {
    /// Creates an empty cost.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style helper adding `amount` of `kind` to the cost.
    #[must_use]
    pub fn with(mut self, kind: ResourceKind, amount: u32) -> Self {
        let entry = self.amounts.entry(kind).or_insert(0);
        *entry = entry.saturating_add(amount);
        self
    }

    /// Amount of `kind` required, zero when absent.
    #[must_use]
    pub fn amount(&self, kind: ResourceKind) -> u32 {
        self.amounts.get(&kind).copied().unwrap_or(0)
    }

    /// Scales every amount linearly by `count`, saturating instead of wrapping.
    #[must_use]
    pub fn scaled(&self, count: usize) -> Self {
        let factor = u32::try_from(count).unwrap_or(u32::MAX);
        Self {
            amounts: self
                .amounts
                .iter()
                .map(|(kind, amount)| (*kind, amount.saturating_mul(factor)))
                .collect(),
        }
    }

    /// Reports whether every amount is zero.
    #[must_use]
    pub fn is_free(&self) -> bool {
        self.amounts.values().all(|amount| *amount == 0)
    }

    /// Iterator over the non-zero entries in ascending kind order.
    pub fn iter(&self) -> impl Iterator<Item = (ResourceKind, u32)> + '_ {
        self.amounts
            .iter()
            .filter(|(_, amount)| **amount > 0)
            .map(|(kind, amount)| (*kind, *amount))
    }
}

/// Configured prefab describing the piece a session places.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PieceTemplate {
    /// Variant spawned by the session; normally [`PieceKind::Wall`].
    #[serde(default)]
    pub kind: PieceKind,
    /// Scale the template is spawned with before any tail rescaling.
    pub base_scale: Vec3,
    /// Local axis along which the piece's length is measured.
    ///
    /// Placed pieces always face local +Z along the run, so only
    /// [`Axis::Z`] lines the measured length up with the span.
    #[serde(default)]
    pub length_axis: Axis,
    /// Size of the rendered mesh bounds in local units, if known.
    #[serde(default)]
    pub mesh_bounds: Option<Vec3>,
    /// Size of the collision volume bounds in local units, if known.
    #[serde(default)]
    pub collider_bounds: Option<Vec3>,
    /// Resources consumed by each placed piece.
    #[serde(default)]
    pub cost: ResourceCost,
}

impl PieceTemplate {
    /// Creates a wall template with unit scale along every axis but the length axis.
    #[must_use]
    pub fn wall(length: f32, cost: ResourceCost) -> Self {
        Self {
            kind: PieceKind::Wall,
            base_scale: Axis::Z.with_component(Vec3::ONE, length),
            length_axis: Axis::Z,
            mesh_bounds: None,
            collider_bounds: None,
            cost,
        }
    }
}

/// Tuning knobs shared by the snapping, validation and session systems.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Smallest tail piece allowed, expressed as a fraction of the piece length.
    pub min_scale_factor: f32,
    /// Radius within which a cursor is pulled onto an existing connection point.
    pub snap_radius: f32,
    /// Distance under which two points count as the same connection point.
    pub connection_tolerance: f32,
    /// Collinear overlap length tolerated as a glancing touch.
    pub min_collinear_overlap: f32,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            min_scale_factor: 0.3,
            snap_radius: 1.0,
            connection_tolerance: 0.05,
            min_collinear_overlap: 0.1,
        }
    }
}

/// Reasons a wall placement was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum PlacementFailure {
    /// The span is too short for even a scaled tail piece.
    #[error("wall span is too short to place a piece")]
    TooShort,
    /// The span crosses or runs along an existing wall.
    #[error("wall would overlap an existing wall")]
    WallOverlap,
    /// The span passes through a building.
    #[error("wall would overlap a building")]
    StructureOverlap,
    /// The player cannot afford the run.
    #[error("not enough resources to build the wall")]
    InsufficientResources,
    /// The first anchor lies outside the visible area.
    #[error("anchor lies outside the visible area")]
    AnchorNotVisible,
    /// An endpoint of the span lies outside the visible area.
    #[error("wall endpoint lies outside the visible area")]
    NotVisible,
    /// Resource deduction was refused after the affordability pre-check passed.
    #[error("resource deduction failed")]
    SpendFailed,
    /// A placement command carried no segments.
    #[error("wall run contained no segments")]
    EmptyRun,
}

/// Failure of an all-or-nothing stockpile deduction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("insufficient {kind:?}: requested {requested}, available {available}")]
pub struct SpendError {
    /// First resource found lacking.
    pub kind: ResourceKind,
    /// Amount the deduction asked for.
    pub requested: u32,
    /// Amount the stockpile holds.
    pub available: u32,
}

/// Reasons a request targeting an existing piece was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum PieceError {
    /// No piece with the provided identifier exists.
    #[error("no such piece")]
    MissingPiece,
    /// The piece already is of the requested kind.
    #[error("piece already has the requested kind")]
    SameKind,
}

/// Classification of a non-wall structure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructureKind {
    /// Building that walls may not pass through.
    Building,
    /// Decoration or other collidable entity that does not block walls.
    Other,
}

/// Horizontal (XZ) footprint of a structure.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "shape")]
pub enum Footprint {
    /// Disc centred on `center` with the given `radius`.
    Circle {
        /// Centre of the disc.
        center: Vec3,
        /// Radius of the disc.
        radius: f32,
    },
    /// Axis-aligned rectangle spanning `min` to `max` on X and Z.
    Rect {
        /// Corner with the smallest X and Z.
        min: Vec3,
        /// Corner with the largest X and Z.
        max: Vec3,
    },
}

/// Coarse junction shape a piece presents to its neighbours.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JunctionKind {
    /// No neighbours.
    #[default]
    Isolated,
    /// Exactly one neighbour.
    End,
    /// Two neighbours lying on opposite sides.
    Straight,
    /// Two neighbours that bend the wall.
    Corner,
    /// Three or more neighbours.
    Junction,
}

/// Visual connection state derived from a piece's neighbour set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct JunctionShape {
    /// Coarse classification derived from the neighbour count.
    pub kind: JunctionKind,
    /// Yaw in radians the piece should face; zero is the default orientation.
    pub facing_yaw: f32,
    /// One bit per compass quadrant (N = 1, E = 2, S = 4, W = 8) holding a neighbour.
    pub mask: u8,
}

/// Entity owning a scene query hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityRef {
    /// Wall-family piece.
    Piece(PieceId),
    /// Non-wall structure.
    Structure(StructureId),
    /// Ground or terrain collider.
    Ground,
    /// Preview object owned by a placement session.
    Preview(u32),
}

/// Classification attached to a scene query hit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HitClass {
    /// Wall-family piece along with the record needed for overlap and snap math.
    Wall {
        /// Identifier of the piece.
        piece: PieceId,
        /// Variant of the piece.
        kind: PieceKind,
        /// Span occupied by the piece.
        record: SegmentRecord,
    },
    /// Building that blocks wall placement.
    Building,
    /// Ground or terrain.
    Terrain,
    /// Preview object owned by the placing session.
    Preview,
    /// Any other collidable entity.
    Other,
}

/// Single hit reported by a scene query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneHit {
    /// Entity that owns the collider that was hit.
    pub entity: EntityRef,
    /// Optional classification of the entity.
    pub class: HitClass,
}

/// Read-only spatial query provider over the current scene.
///
/// Implementations clear `out` and then append at most [`MAX_SCENE_HITS`]
/// hits in a deterministic order.
pub trait SceneQuery {
    /// Reports entities whose colliders come within `radius` of the segment
    /// from `start` to `end`, measured on the horizontal plane.
    fn overlap_capsule(&self, start: Vec3, end: Vec3, radius: f32, out: &mut Vec<SceneHit>);

    /// Reports entities whose colliders come within `radius` of `center`,
    /// measured on the horizontal plane.
    fn overlap_sphere(&self, center: Vec3, radius: f32, out: &mut Vec<SceneHit>);
}

/// Read-only view onto the player's resources.
pub trait ResourceLedger {
    /// Reports whether every amount of `cost` is available.
    fn can_afford(&self, cost: &ResourceCost) -> bool;

    /// Amount of `kind` currently held.
    fn resource(&self, kind: ResourceKind) -> u32;
}

/// Optional fog-of-war service.
pub trait VisibilityView {
    /// Reports whether `point` lies inside the currently visible area.
    fn is_position_visible(&self, point: Vec3) -> bool;
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Sets the radius within which pieces count as connected.
    ConfigureConnections {
        /// Centre-to-centre distance under which two pieces connect.
        connection_distance: f32,
    },
    /// Enables or disables the ground collider reported by scene queries.
    SetGround {
        /// Whether queries report a terrain hit.
        enabled: bool,
    },
    /// Adds resources to the stockpile.
    GrantResources {
        /// Amounts to add.
        cost: ResourceCost,
    },
    /// Removes resources from the stockpile on behalf of another system.
    DebitResources {
        /// Amounts to remove.
        cost: ResourceCost,
    },
    /// Adds a non-wall structure to the scene.
    AddStructure {
        /// Classification of the structure.
        kind: StructureKind,
        /// Horizontal footprint of the structure.
        footprint: Footprint,
    },
    /// Removes a non-wall structure from the scene.
    RemoveStructure {
        /// Identifier of the structure.
        structure: StructureId,
    },
    /// Turns on fog of war; nothing is visible until revealed.
    EnableFog,
    /// Reveals a disc of the map.
    RevealArea {
        /// Centre of the revealed disc.
        center: Vec3,
        /// Radius of the revealed disc.
        radius: f32,
    },
    /// Commits a wall run: deducts `cost` and spawns every segment.
    PlaceWallRun {
        /// Identifier chosen by the placing session.
        run: RunId,
        /// Variant spawned for every segment.
        kind: PieceKind,
        /// Poses of the pieces to spawn, in run order.
        segments: Vec<PlacedSegment>,
        /// Total resources the run consumes.
        cost: ResourceCost,
    },
    /// Destroys a placed piece.
    DemolishPiece {
        /// Identifier of the piece.
        piece: PieceId,
    },
    /// Replaces a placed piece with another variant at the same pose.
    ReplacePiece {
        /// Identifier of the piece being replaced.
        piece: PieceId,
        /// Variant of the replacement.
        kind: PieceKind,
    },
    /// Advances the world by one tick, running deferred tasks that came due.
    Tick,
}

/// Events broadcast after processing commands and session input.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the world advanced one tick.
    TimeAdvanced {
        /// Index of the tick that just completed.
        tick: u64,
    },
    /// Confirms the connection radius changed.
    ConnectionsConfigured {
        /// New centre-to-centre connection distance.
        connection_distance: f32,
    },
    /// Confirms resources were added to the stockpile.
    ResourcesGranted {
        /// Amounts added.
        cost: ResourceCost,
    },
    /// Confirms resources were removed from the stockpile.
    ResourcesSpent {
        /// Amounts removed.
        cost: ResourceCost,
    },
    /// Confirms a structure was added.
    StructureAdded {
        /// Identifier assigned by the world.
        structure: StructureId,
        /// Classification of the structure.
        kind: StructureKind,
    },
    /// Confirms a structure was removed.
    StructureRemoved {
        /// Identifier of the removed structure.
        structure: StructureId,
    },
    /// Confirms a region of the map became visible.
    AreaRevealed {
        /// Centre of the revealed disc.
        center: Vec3,
        /// Radius of the revealed disc.
        radius: f32,
    },
    /// Confirms a single piece was placed.
    WallPiecePlaced {
        /// Identifier assigned to the piece.
        piece: PieceId,
        /// Run the piece belongs to.
        run: RunId,
        /// Variant of the piece.
        kind: PieceKind,
        /// Span the piece occupies.
        record: SegmentRecord,
    },
    /// Confirms every piece of a run was placed.
    WallRunPlaced {
        /// Identifier of the run.
        run: RunId,
        /// Pieces spawned for the run, in run order.
        pieces: Vec<PieceId>,
        /// Records of the spawned pieces, in run order.
        records: Vec<SegmentRecord>,
    },
    /// Reports that the world refused a run; nothing was spawned or deducted.
    WallRunRejected {
        /// Identifier of the run.
        run: RunId,
        /// Specific reason the run failed.
        reason: PlacementFailure,
    },
    /// Player-facing notification that a placement attempt failed.
    PlacementFailed {
        /// Specific reason the attempt failed.
        reason: PlacementFailure,
    },
    /// Confirms a piece was destroyed.
    PieceDemolished {
        /// Identifier of the destroyed piece.
        piece: PieceId,
        /// Span the piece occupied.
        record: SegmentRecord,
    },
    /// Confirms a piece was replaced by another variant.
    PieceReplaced {
        /// Identifier of the removed piece.
        previous: PieceId,
        /// Identifier of the replacement.
        replacement: PieceId,
        /// Variant of the replacement.
        kind: PieceKind,
    },
    /// Reports that a demolition or replacement request was refused.
    PieceRequestRejected {
        /// Identifier named by the request.
        piece: PieceId,
        /// Specific reason the request failed.
        reason: PieceError,
    },
    /// Announces a piece's neighbour set or junction shape changed.
    ConnectionsChanged {
        /// Piece whose connections changed.
        piece: PieceId,
        /// Sorted neighbour identifiers.
        neighbors: Vec<PieceId>,
        /// Shape derived from the neighbours.
        shape: JunctionShape,
    },
}

#[cfg(test)]
mod tests {
    use super::{
        Axis, PieceId, PlacementFailure, Quat, ResourceCost, ResourceKind, SegmentRecord, Vec3,
    };
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn segment_record_endpoints_are_length_apart() {
        let record = SegmentRecord::new(
            Vec3::new(3.0, 0.0, 1.0),
            2.0,
            Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
        );
        let (a, b) = record.endpoints();
        assert!((a.distance(b) - 2.0).abs() < 1e-5);
        assert!(((a + b) * 0.5).distance(record.center()) < 1e-5);
        assert!((a.x - 2.0).abs() < 1e-5, "rotated +Z should point along +X");
    }

    #[test]
    fn cost_scaling_is_linear_and_saturating() {
        let cost = ResourceCost::new()
            .with(ResourceKind::Gold, 5)
            .with(ResourceKind::Stone, 2);
        let scaled = cost.scaled(4);
        assert_eq!(scaled.amount(ResourceKind::Gold), 20);
        assert_eq!(scaled.amount(ResourceKind::Stone), 8);
        assert_eq!(scaled.amount(ResourceKind::Wood), 0);

        let huge = ResourceCost::new().with(ResourceKind::Gold, u32::MAX / 2);
        assert_eq!(huge.scaled(3).amount(ResourceKind::Gold), u32::MAX);
        assert!(cost.scaled(0).is_free());
    }

    #[test]
    fn axis_component_helpers_agree() {
        let value = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(Axis::Y.component(value), 2.0);
        assert_eq!(Axis::X.with_component(value, 9.0), Vec3::new(9.0, 2.0, 3.0));
        assert_eq!(Axis::Z.across(), Axis::X);
        assert_eq!(Axis::X.across(), Axis::Z);
    }

    #[test]
    fn piece_id_round_trips_through_bincode() {
        assert_round_trip(&PieceId::new(42));
    }

    #[test]
    fn placement_failure_round_trips_through_bincode() {
        assert_round_trip(&PlacementFailure::SpendFailed);
    }

    #[test]
    fn resource_cost_round_trips_through_bincode() {
        let cost = ResourceCost::new().with(ResourceKind::Wood, 7);
        assert_round_trip(&cost);
    }
}
