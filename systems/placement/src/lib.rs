#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure placement-session system that turns cursor input into wall runs.
//!
//! A session walks through `Idle → AwaitingFirstAnchor → Previewing`. While
//! previewing, every cursor update snaps the cursor, lays out the run, and
//! validates it against walls, buildings, fog of war and the player's
//! stockpile. Confirming a valid preview emits [`Command::PlaceWallRun`] and
//! waits in `Committing` for the world's verdict, after which the session
//! either chains the next run from the end of the last one or finishes.

use glam::{Vec2, Vec3};
use rampart_core::{
    Command, Event, PieceTemplate, PlacedSegment, PlacementConfig, PlacementFailure,
    ResourceCost, ResourceLedger, RunId, SceneQuery, SegmentRecord, VisibilityView,
};
use rampart_system_geometry::{compute_segments, detect_piece_length, detect_piece_width};
use rampart_system_snapping::{Snap, SnapResolver};
use rampart_system_validation::OverlapValidator;
use tracing::{debug, info};

/// Lifecycle stage of a placement session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// No session is active.
    #[default]
    Idle,
    /// Waiting for the player to pick where the wall starts.
    AwaitingFirstAnchor,
    /// Following the cursor with a live preview of the next run.
    Previewing,
    /// A run was submitted and the world's verdict is pending.
    Committing,
}

/// Input snapshot distilled from adapter-provided frame input data.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SessionInput {
    /// Ground-plane position under the pointer, if the pointer hits the ground.
    pub cursor: Option<Vec3>,
    /// Indicates whether the player clicked to place an anchor this frame.
    pub confirm_action: bool,
    /// Indicates whether the player asked to abandon the session this frame.
    pub cancel_action: bool,
}

impl SessionInput {
    /// Input that only moves the cursor.
    #[must_use]
    pub const fn hover(cursor: Vec3) -> Self {
        Self {
            cursor: Some(cursor),
            confirm_action: false,
            cancel_action: false,
        }
    }

    /// Input that moves the cursor and confirms at the new position.
    #[must_use]
    pub const fn click(cursor: Vec3) -> Self {
        Self {
            cursor: Some(cursor),
            confirm_action: true,
            cancel_action: false,
        }
    }

    /// Input requesting cancellation.
    #[must_use]
    pub const fn cancel() -> Self {
        Self {
            cursor: None,
            confirm_action: false,
            cancel_action: true,
        }
    }
}

/// Read-only collaborators consulted while previewing.
#[derive(Clone, Copy)]
pub struct PlacementContext<'a> {
    /// Spatial queries over the current scene.
    pub scene: &'a dyn SceneQuery,
    /// The player's resources.
    pub ledger: &'a dyn ResourceLedger,
    /// Fog of war, when the host has one.
    pub visibility: Option<&'a dyn VisibilityView>,
}

impl<'a> PlacementContext<'a> {
    /// Bundles the collaborators.
    #[must_use]
    pub fn new(
        scene: &'a dyn SceneQuery,
        ledger: &'a dyn ResourceLedger,
        visibility: Option<&'a dyn VisibilityView>,
    ) -> Self {
        Self {
            scene,
            ledger,
            visibility,
        }
    }

    fn is_visible(&self, point: Vec3) -> bool {
        self.visibility
            .map_or(true, |view| view.is_position_visible(point))
    }
}

/// Commands for the world and notifications for other listeners.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionOutput {
    /// Commands the world should apply.
    pub commands: Vec<Command>,
    /// Player-facing notifications raised by the session itself.
    pub events: Vec<Event>,
}

impl SessionOutput {
    /// Empties both buffers.
    pub fn clear(&mut self) {
        self.commands.clear();
        self.events.clear();
    }
}

/// Live preview of the run between the current anchor and the cursor.
#[derive(Clone, Debug, PartialEq)]
pub struct Preview {
    /// Anchor the run starts from.
    pub start: Vec3,
    /// End of the run after snapping.
    pub end: Vec3,
    /// Outcome of snapping the cursor.
    pub snap: Snap,
    /// Pieces the run would spawn.
    pub segments: Vec<PlacedSegment>,
    /// Resources the run would consume.
    pub cost: ResourceCost,
    /// Reason the run may not be placed, if any.
    pub failure: Option<PlacementFailure>,
}

impl Preview {
    /// Reports whether the preview may be committed.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.failure.is_none()
    }
}

#[derive(Clone, Debug)]
struct ActiveTemplate {
    template: PieceTemplate,
    piece_length: f32,
    piece_width: f32,
}

#[derive(Clone, Copy, Debug)]
struct PendingRun {
    run: RunId,
    end: Vec3,
    closes_session: bool,
}

/// Placement-session system that translates cursor input into wall runs.
#[derive(Debug)]
pub struct PlacementSession {
    config: PlacementConfig,
    state: SessionState,
    active: Option<ActiveTemplate>,
    first_anchor: Option<Vec3>,
    origin: Option<Vec3>,
    preview: Option<Preview>,
    pending: Option<PendingRun>,
    records: Vec<SegmentRecord>,
    next_run: u32,
    snapper: SnapResolver,
    validator: OverlapValidator,
    walls: Vec<SegmentRecord>,
}

impl Default for PlacementSession {
    fn default() -> Self {
        Self::new(PlacementConfig::default())
    }
}

impl PlacementSession {
    /// Creates an idle session using the provided tuning.
    #[must_use]
    pub fn new(config: PlacementConfig) -> Self {
        Self {
            validator: OverlapValidator::new(&config),
            config,
            state: SessionState::Idle,
            active: None,
            first_anchor: None,
            origin: None,
            preview: None,
            pending: None,
            records: Vec::new(),
            next_run: 0,
            snapper: SnapResolver::new(),
            walls: Vec::new(),
        }
    }

    /// Starts placing pieces of `template`, abandoning any active session.
    pub fn start_session(&mut self, template: PieceTemplate) {
        if self.state != SessionState::Idle {
            self.cancel();
        }

        let piece_length = detect_piece_length(&template);
        let piece_width = detect_piece_width(&template);
        debug!(piece_length, piece_width, kind = ?template.kind, "placement session started");
        self.active = Some(ActiveTemplate {
            template,
            piece_length,
            piece_width,
        });
        self.state = SessionState::AwaitingFirstAnchor;
    }

    /// Discards the preview and session state; committed pieces are untouched.
    pub fn cancel(&mut self) {
        if self.state != SessionState::Idle {
            debug!(state = ?self.state, "placement session cancelled");
        }
        self.reset();
    }

    /// Current lifecycle stage.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Latest preview, while previewing.
    #[must_use]
    pub fn preview(&self) -> Option<&Preview> {
        self.preview.as_ref()
    }

    /// Anchor the next run starts from.
    #[must_use]
    pub const fn first_anchor(&self) -> Option<Vec3> {
        self.first_anchor
    }

    /// Records of every piece placed during this session.
    #[must_use]
    pub fn session_records(&self) -> &[SegmentRecord] {
        &self.records
    }

    /// Length of one piece of the active template.
    #[must_use]
    pub fn piece_length(&self) -> Option<f32> {
        self.active.as_ref().map(|active| active.piece_length)
    }

    /// Consumes world events and adapter input, emitting commands and notifications.
    pub fn handle(
        &mut self,
        events: &[Event],
        input: SessionInput,
        context: &PlacementContext<'_>,
        out: &mut SessionOutput,
    ) {
        for event in events {
            self.observe(event);
        }

        if input.cancel_action {
            self.cancel();
            return;
        }

        match self.state {
            SessionState::Idle | SessionState::Committing => {}
            SessionState::AwaitingFirstAnchor => {
                if let (true, Some(cursor)) = (input.confirm_action, input.cursor) {
                    self.place_first_anchor(cursor, context, out);
                }
            }
            SessionState::Previewing => {
                if let Some(cursor) = input.cursor {
                    self.refresh_preview(cursor, context);
                }
                if input.confirm_action {
                    self.commit(out);
                }
            }
        }
    }

    fn observe(&mut self, event: &Event) {
        let Some(pending) = self.pending else {
            return;
        };

        match event {
            Event::WallRunPlaced { run, records, .. } if *run == pending.run => {
                self.pending = None;
                self.records.extend(records.iter().copied());
                if pending.closes_session {
                    info!(run = run.get(), "wall loop closed, session finished");
                    self.reset();
                } else {
                    debug!(run = run.get(), "chaining from end of run");
                    self.first_anchor = Some(pending.end);
                    self.preview = None;
                    self.state = SessionState::Previewing;
                }
            }
            Event::WallRunRejected { run, reason } if *run == pending.run => {
                debug!(run = run.get(), %reason, "run rejected, keeping anchor");
                self.pending = None;
                self.state = SessionState::Previewing;
            }
            _ => {}
        }
    }

    fn place_first_anchor(
        &mut self,
        cursor: Vec3,
        context: &PlacementContext<'_>,
        out: &mut SessionOutput,
    ) {
        let snap = self
            .snapper
            .try_snap(cursor, self.config.snap_radius, &self.records, context.scene);
        if !context.is_visible(snap.point) {
            debug!(anchor = ?snap.point, "anchor hidden by fog");
            out.events.push(Event::PlacementFailed {
                reason: PlacementFailure::AnchorNotVisible,
            });
            return;
        }

        debug!(anchor = ?snap.point, snapped = snap.is_snapped(), "first anchor placed");
        self.first_anchor = Some(snap.point);
        if self.origin.is_none() {
            self.origin = Some(snap.point);
        }
        self.state = SessionState::Previewing;
    }

    fn refresh_preview(&mut self, cursor: Vec3, context: &PlacementContext<'_>) {
        let (Some(active), Some(start)) = (self.active.as_ref(), self.first_anchor) else {
            return;
        };

        let snap = self
            .snapper
            .try_snap(cursor, self.config.snap_radius, &self.records, context.scene);
        let end = snap.point;
        let segments = compute_segments(
            start,
            end,
            active.piece_length,
            active.template.base_scale,
            active.template.length_axis,
            self.config.min_scale_factor,
        );
        let cost = active.template.cost.scaled(segments.len());
        let radius = active.piece_width * 0.5;

        let failure = if segments.is_empty() {
            Some(PlacementFailure::TooShort)
        } else {
            self.validator
                .gather_walls(start, end, context.scene, &mut self.walls);
            if self.validator.would_overlap_wall(
                start,
                end,
                self.walls.iter().chain(self.records.iter()),
                self.origin,
            ) {
                Some(PlacementFailure::WallOverlap)
            } else if self
                .validator
                .would_overlap_structure(start, end, radius, context.scene)
            {
                Some(PlacementFailure::StructureOverlap)
            } else if !context.is_visible(start) || !context.is_visible(end) {
                Some(PlacementFailure::NotVisible)
            } else if !context.ledger.can_afford(&cost) {
                Some(PlacementFailure::InsufficientResources)
            } else {
                None
            }
        };

        self.preview = Some(Preview {
            start,
            end,
            snap,
            segments,
            cost,
            failure,
        });
    }

    fn commit(&mut self, out: &mut SessionOutput) {
        let (Some(active), Some(preview)) = (self.active.as_ref(), self.preview.as_ref()) else {
            return;
        };

        if let Some(reason) = preview.failure {
            debug!(%reason, "commit refused");
            out.events.push(Event::PlacementFailed { reason });
            return;
        }

        let run = RunId::new(self.next_run);
        self.next_run = self.next_run.wrapping_add(1);
        let closes_session = preview.snap.is_wall_endpoint()
            || self
                .origin
                .map_or(false, |origin| {
                    flat_distance(preview.end, origin) <= self.config.connection_tolerance
                });

        info!(
            run = run.get(),
            pieces = preview.segments.len(),
            closes_session,
            "submitting wall run"
        );
        out.commands.push(Command::PlaceWallRun {
            run,
            kind: active.template.kind,
            segments: preview.segments.clone(),
            cost: preview.cost.clone(),
        });
        self.pending = Some(PendingRun {
            run,
            end: preview.end,
            closes_session,
        });
        self.state = SessionState::Committing;
    }

    fn reset(&mut self) {
        self.state = SessionState::Idle;
        self.active = None;
        self.first_anchor = None;
        self.origin = None;
        self.preview = None;
        self.pending = None;
        self.records.clear();
        self.walls.clear();
    }
}

fn flat_distance(a: Vec3, b: Vec3) -> f32 {
    Vec2::new(a.x, a.z).distance(Vec2::new(b.x, b.z))
}
