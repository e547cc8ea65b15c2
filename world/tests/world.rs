use glam::Vec3;
use rampart_core::{
    Axis, Command, EntityRef, Event, Footprint, HitClass, JunctionKind, PieceError, PieceId,
    PieceKind, PlacedSegment, PlacementFailure, ResourceCost, ResourceKind, ResourceLedger,
    RunId, SceneQuery, StructureId, StructureKind,
};
use rampart_system_geometry::compute_segments;
use rampart_world::{apply, query, World, REPLACEMENT_RECOMPUTE_DELAY};

fn run_along_x(from: f32, to: f32) -> Vec<PlacedSegment> {
    compute_segments(
        Vec3::new(from, 0.0, 0.0),
        Vec3::new(to, 0.0, 0.0),
        2.0,
        Vec3::new(1.0, 1.0, 2.0),
        Axis::Z,
        0.3,
    )
}

fn place(
    world: &mut World,
    run: u32,
    segments: Vec<PlacedSegment>,
    cost: ResourceCost,
) -> Vec<Event> {
    let mut events = Vec::new();
    apply(
        world,
        Command::PlaceWallRun {
            run: RunId::new(run),
            kind: PieceKind::Wall,
            segments,
            cost,
        },
        &mut events,
    );
    events
}

fn neighbors(world: &World, piece: u32) -> Vec<u32> {
    query::connections(world, PieceId::new(piece))
        .expect("piece exists")
        .neighbors()
        .iter()
        .map(PieceId::get)
        .collect()
}

fn five_piece_wall() -> World {
    let mut world = World::new();
    let events = place(&mut world, 0, run_along_x(0.0, 10.0), ResourceCost::new());
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::WallRunPlaced { .. })));
    world
}

#[test]
fn placed_run_connects_consecutive_pieces() {
    let mut world = World::new();
    let events = place(&mut world, 3, run_along_x(0.0, 10.0), ResourceCost::new());

    let placed: Vec<PieceId> = events
        .iter()
        .filter_map(|event| match event {
            Event::WallPiecePlaced { piece, run, .. } => {
                assert_eq!(*run, RunId::new(3));
                Some(*piece)
            }
            _ => None,
        })
        .collect();
    assert_eq!(placed, (0..5).map(PieceId::new).collect::<Vec<_>>());

    let run_index = events
        .iter()
        .position(|event| matches!(event, Event::WallRunPlaced { .. }))
        .expect("run confirmation");
    let changed: Vec<PieceId> = events[run_index + 1..]
        .iter()
        .filter_map(|event| match event {
            Event::ConnectionsChanged { piece, .. } => Some(*piece),
            _ => None,
        })
        .collect();
    assert_eq!(changed, placed, "connection updates follow in ascending order");

    assert_eq!(neighbors(&world, 0), vec![1]);
    assert_eq!(neighbors(&world, 2), vec![1, 3]);
    assert_eq!(neighbors(&world, 4), vec![3]);

    let middle = query::connections(&world, PieceId::new(2)).expect("middle piece");
    assert_eq!(middle.shape().kind, JunctionKind::Straight);
    let end = query::connections(&world, PieceId::new(0)).expect("end piece");
    assert_eq!(end.shape().kind, JunctionKind::End);
}

#[test]
fn spend_failure_leaves_world_untouched() {
    let mut world = World::new();
    let mut events = Vec::new();
    apply(
        &mut world,
        Command::GrantResources {
            cost: ResourceCost::new().with(ResourceKind::Gold, 5),
        },
        &mut events,
    );

    let events = place(
        &mut world,
        0,
        run_along_x(0.0, 4.0),
        ResourceCost::new().with(ResourceKind::Gold, 10),
    );
    assert_eq!(
        events,
        vec![
            Event::WallRunRejected {
                run: RunId::new(0),
                reason: PlacementFailure::SpendFailed,
            },
            Event::PlacementFailed {
                reason: PlacementFailure::SpendFailed,
            },
        ]
    );
    assert_eq!(query::piece_count(&world), 0);
    assert_eq!(world.resource(ResourceKind::Gold), 5);
}

#[test]
fn successful_run_deducts_its_cost() {
    let mut world = World::new();
    let mut events = Vec::new();
    apply(
        &mut world,
        Command::GrantResources {
            cost: ResourceCost::new().with(ResourceKind::Stone, 12),
        },
        &mut events,
    );

    let cost = ResourceCost::new().with(ResourceKind::Stone, 8);
    let events = place(&mut world, 0, run_along_x(0.0, 8.0), cost.clone());
    assert_eq!(events.first(), Some(&Event::ResourcesSpent { cost }));
    assert_eq!(world.resource(ResourceKind::Stone), 4);
    assert_eq!(query::piece_count(&world), 4);
}

#[test]
fn demolition_disconnects_neighbours() {
    let mut world = five_piece_wall();
    let mut events = Vec::new();
    apply(
        &mut world,
        Command::DemolishPiece {
            piece: PieceId::new(2),
        },
        &mut events,
    );

    assert!(matches!(
        events.first(),
        Some(Event::PieceDemolished { piece, .. }) if *piece == PieceId::new(2)
    ));
    let changed: Vec<PieceId> = events
        .iter()
        .filter_map(|event| match event {
            Event::ConnectionsChanged { piece, .. } => Some(*piece),
            _ => None,
        })
        .collect();
    assert_eq!(changed, vec![PieceId::new(1), PieceId::new(3)]);
    assert_eq!(neighbors(&world, 1), vec![0]);
    assert_eq!(neighbors(&world, 3), vec![4]);
    assert!(query::connections(&world, PieceId::new(2)).is_none());

    events.clear();
    apply(
        &mut world,
        Command::DemolishPiece {
            piece: PieceId::new(2),
        },
        &mut events,
    );
    assert_eq!(
        events,
        vec![Event::PieceRequestRejected {
            piece: PieceId::new(2),
            reason: PieceError::MissingPiece,
        }]
    );
}

#[test]
fn replacement_transfers_connections_and_defers_recompute() {
    let mut world = five_piece_wall();
    let mut events = Vec::new();
    apply(
        &mut world,
        Command::ReplacePiece {
            piece: PieceId::new(2),
            kind: PieceKind::Gate,
        },
        &mut events,
    );

    assert_eq!(
        events.first(),
        Some(&Event::PieceReplaced {
            previous: PieceId::new(2),
            replacement: PieceId::new(5),
            kind: PieceKind::Gate,
        })
    );
    assert_eq!(neighbors(&world, 1), vec![0, 5]);
    assert_eq!(neighbors(&world, 3), vec![4, 5]);
    assert_eq!(neighbors(&world, 5), vec![1, 3]);
    assert_eq!(query::pending_deferred(&world), 1);

    for _ in 1..REPLACEMENT_RECOMPUTE_DELAY {
        apply(&mut world, Command::Tick, &mut events);
        assert_eq!(query::pending_deferred(&world), 1);
    }
    events.clear();
    apply(&mut world, Command::Tick, &mut events);
    assert_eq!(query::pending_deferred(&world), 0);
    assert_eq!(
        events,
        vec![Event::TimeAdvanced {
            tick: u64::from(REPLACEMENT_RECOMPUTE_DELAY),
        }],
        "transferred connections already match the recompute"
    );

    let gate = query::pieces(&world)
        .into_iter()
        .find(|piece| piece.id == PieceId::new(5))
        .expect("replacement present");
    assert_eq!(gate.kind, PieceKind::Gate);

    events.clear();
    apply(
        &mut world,
        Command::ReplacePiece {
            piece: PieceId::new(5),
            kind: PieceKind::Gate,
        },
        &mut events,
    );
    assert_eq!(
        events,
        vec![Event::PieceRequestRejected {
            piece: PieceId::new(5),
            reason: PieceError::SameKind,
        }]
    );
}

#[test]
fn widening_connection_distance_recomputes_everything() {
    let mut world = five_piece_wall();
    let mut events = Vec::new();
    apply(
        &mut world,
        Command::ConfigureConnections {
            connection_distance: 4.5,
        },
        &mut events,
    );

    assert_eq!(
        events.first(),
        Some(&Event::ConnectionsConfigured {
            connection_distance: 4.5,
        })
    );
    assert_eq!(neighbors(&world, 0), vec![1, 2]);
    assert_eq!(neighbors(&world, 2), vec![0, 1, 3, 4]);
    let hub = query::connections(&world, PieceId::new(2)).expect("hub");
    assert_eq!(hub.shape().kind, JunctionKind::Junction);
}

#[test]
fn structures_are_reported_until_removed() {
    let mut world = World::new();
    let mut events = Vec::new();
    apply(
        &mut world,
        Command::AddStructure {
            kind: StructureKind::Building,
            footprint: Footprint::Rect {
                min: Vec3::new(4.0, 0.0, -1.0),
                max: Vec3::new(6.0, 0.0, 1.0),
            },
        },
        &mut events,
    );
    assert_eq!(
        events,
        vec![Event::StructureAdded {
            structure: StructureId::new(0),
            kind: StructureKind::Building,
        }]
    );

    let mut hits = Vec::new();
    world.overlap_capsule(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), 0.5, &mut hits);
    assert!(hits.iter().any(|hit| hit.class == HitClass::Building
        && hit.entity == EntityRef::Structure(StructureId::new(0))));

    apply(
        &mut world,
        Command::RemoveStructure {
            structure: StructureId::new(0),
        },
        &mut events,
    );
    world.overlap_capsule(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), 0.5, &mut hits);
    assert!(hits.iter().all(|hit| hit.class != HitClass::Building));
    assert_eq!(query::structures(&world).count(), 0);
}

#[test]
fn sphere_queries_find_spans_not_just_centres() {
    let world = five_piece_wall();
    let mut hits = Vec::new();
    world.overlap_sphere(Vec3::new(4.0, 0.0, 0.3), 0.5, &mut hits);

    let pieces: Vec<PieceId> = hits
        .iter()
        .filter_map(|hit| match hit.class {
            HitClass::Wall { piece, .. } => Some(piece),
            _ => None,
        })
        .collect();
    assert_eq!(pieces, vec![PieceId::new(1), PieceId::new(2)]);
    assert_eq!(hits[0].class, HitClass::Terrain);
}

#[test]
fn fog_hides_everything_until_revealed() {
    let mut world = World::new();
    assert!(query::visibility(&world).is_none());
    assert!(query::is_visible(&world, Vec3::new(100.0, 0.0, 100.0)));

    let mut events = Vec::new();
    apply(&mut world, Command::EnableFog, &mut events);
    assert!(!query::is_visible(&world, Vec3::ZERO));

    apply(
        &mut world,
        Command::RevealArea {
            center: Vec3::ZERO,
            radius: 5.0,
        },
        &mut events,
    );
    assert!(query::is_visible(&world, Vec3::new(3.0, 0.0, 3.0)));
    assert!(!query::is_visible(&world, Vec3::new(6.0, 0.0, 0.0)));
}

#[test]
fn debits_are_atomic() {
    let mut world = World::new();
    let mut events = Vec::new();
    apply(
        &mut world,
        Command::GrantResources {
            cost: ResourceCost::new().with(ResourceKind::Wood, 3),
        },
        &mut events,
    );
    events.clear();

    apply(
        &mut world,
        Command::DebitResources {
            cost: ResourceCost::new()
                .with(ResourceKind::Wood, 2)
                .with(ResourceKind::Gold, 1),
        },
        &mut events,
    );
    assert!(events.is_empty());
    assert_eq!(world.resource(ResourceKind::Wood), 3);

    apply(
        &mut world,
        Command::DebitResources {
            cost: ResourceCost::new().with(ResourceKind::Wood, 2),
        },
        &mut events,
    );
    assert_eq!(query::stockpile(&world).resource(ResourceKind::Wood), 1);
}

#[test]
fn nav_obstacles_track_pieces() {
    let world = five_piece_wall();
    let obstacles = query::nav_obstacles(&world);
    assert_eq!(obstacles.len(), 5);
    assert!(obstacles
        .iter()
        .all(|obstacle| (obstacle.half_length - 1.0).abs() < 1e-4));
    assert!(obstacles[0].center.distance(Vec3::new(1.0, 0.0, 0.0)) < 1e-4);
}
