//! Drives a placement session and the world through a scenario's actions.

use rampart_core::{
    Command, Event, PieceId, PieceTemplate, ResourceKind, ResourceLedger,
};
use rampart_system_placement::{
    PlacementContext, PlacementSession, SessionInput, SessionOutput, SessionState,
};
use rampart_world::{self as world, query, query::PieceSnapshot, World};
use tracing::{debug, info};

use crate::scenario::{Action, Scenario, ScenarioError};

/// Outcome of replaying a scenario.
#[derive(Debug)]
pub(crate) struct Report {
    pub(crate) pieces: Vec<PieceSnapshot>,
    pub(crate) runs_placed: usize,
    pub(crate) failures: Vec<String>,
    pub(crate) session_state: SessionState,
    pub(crate) structures: usize,
    resources: Vec<(ResourceKind, u32)>,
}

impl Report {
    pub(crate) fn stockpile(&self, kind: ResourceKind) -> u32 {
        self.resources
            .iter()
            .find(|(candidate, _)| *candidate == kind)
            .map_or(0, |(_, amount)| *amount)
    }
}

struct Runner {
    world: World,
    session: PlacementSession,
    template: PieceTemplate,
    pending: Vec<Event>,
    log: Vec<Event>,
}

impl Runner {
    fn command(&mut self, command: Command) {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);
        self.log.extend(events.iter().cloned());
        self.pending.extend(events);
    }

    fn drive(&mut self, input: SessionInput) {
        let mut output = SessionOutput::default();
        {
            let context = PlacementContext::new(
                &self.world,
                &self.world,
                query::visibility(&self.world),
            );
            self.session
                .handle(&self.pending, input, &context, &mut output);
        }
        self.pending.clear();
        self.log.extend(output.events);
        for command in output.commands {
            self.command(command);
        }
    }

    fn perform(&mut self, action: Action) {
        debug!(?action, "performing scenario action");
        match action {
            Action::Hover { at } => self.drive(SessionInput::hover(at)),
            Action::Click { at } => self.drive(SessionInput::click(at)),
            Action::Confirm => self.drive(SessionInput {
                confirm_action: true,
                ..SessionInput::default()
            }),
            Action::Cancel => self.drive(SessionInput::cancel()),
            Action::Start => self.session.start_session(self.template.clone()),
            Action::Tick { count } => {
                for _ in 0..count {
                    self.command(Command::Tick);
                }
            }
            Action::Demolish { piece } => self.command(Command::DemolishPiece {
                piece: PieceId::new(piece),
            }),
            Action::Replace { piece, kind } => self.command(Command::ReplacePiece {
                piece: PieceId::new(piece),
                kind,
            }),
        }
    }
}

/// Replays `scenario` from an empty world.
pub(crate) fn run(scenario: Scenario) -> Result<Report, ScenarioError> {
    let template = scenario.template.to_template()?;
    let mut runner = Runner {
        world: World::with_settings(scenario.world),
        session: PlacementSession::new(scenario.placement),
        template: template.clone(),
        pending: Vec::new(),
        log: Vec::new(),
    };

    runner.command(Command::GrantResources {
        cost: scenario.stockpile.to_cost(),
    });
    if let Some(fog) = &scenario.fog {
        runner.command(Command::EnableFog);
        for reveal in &fog.reveal {
            runner.command(Command::RevealArea {
                center: reveal.center,
                radius: reveal.radius,
            });
        }
    }
    for structure in &scenario.structures {
        runner.command(Command::AddStructure {
            kind: structure.kind,
            footprint: structure.footprint,
        });
    }

    runner.session.start_session(template);
    for action in scenario.actions {
        runner.perform(action);
    }
    runner.drive(SessionInput::default());

    Ok(summarize(&runner))
}

fn summarize(runner: &Runner) -> Report {
    let mut runs_placed = 0;
    let mut failures = Vec::new();
    for event in &runner.log {
        match event {
            Event::WallRunPlaced { .. } => runs_placed += 1,
            Event::PlacementFailed { reason } => failures.push(reason.to_string()),
            Event::PieceRequestRejected { piece, reason } => {
                failures.push(format!("piece {}: {reason}", piece.get()));
            }
            _ => {}
        }
    }

    let structures = query::structures(&runner.world).count();
    info!(
        runs_placed,
        failures = failures.len(),
        structures,
        "scenario finished"
    );

    Report {
        pieces: query::pieces(&runner.world),
        runs_placed,
        failures,
        session_state: runner.session.state(),
        structures,
        resources: [ResourceKind::Gold, ResourceKind::Wood, ResourceKind::Stone]
            .into_iter()
            .map(|kind| (kind, runner.world.resource(kind)))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: &str = r#"
        [template]
        length = 2.0
        cost = { stone = 1 }

        [stockpile]
        stone = 20

        [[actions]]
        action = "click"
        at = [0.0, 0.0, 0.0]

        [[actions]]
        action = "click"
        at = [6.0, 0.0, 0.0]

        [[actions]]
        action = "click"
        at = [6.0, 0.0, 6.0]

        [[actions]]
        action = "click"
        at = [0.0, 0.0, 6.0]

        [[actions]]
        action = "click"
        at = [0.1, 0.0, 0.2]

        [[actions]]
        action = "replace"
        piece = 1
        kind = "gate"

        [[actions]]
        action = "tick"
        count = 3
    "#;

    #[test]
    fn square_scenario_closes_the_loop() {
        let scenario = Scenario::parse(SQUARE).expect("scenario parses");
        let report = run(scenario).expect("scenario runs");

        assert_eq!(report.runs_placed, 4);
        assert_eq!(report.pieces.len(), 12);
        assert!(report.failures.is_empty(), "{:?}", report.failures);
        assert_eq!(report.session_state, SessionState::Idle);
        assert_eq!(report.stockpile(ResourceKind::Stone), 8);
        assert!(report
            .pieces
            .iter()
            .any(|piece| piece.kind == rampart_core::PieceKind::Gate));
    }

    #[test]
    fn failures_are_reported() {
        let scenario = Scenario::parse(
            r#"
            [template]
            cost = { gold = 5 }

            [[actions]]
            action = "click"
            at = [0.0, 0.0, 0.0]

            [[actions]]
            action = "click"
            at = [4.0, 0.0, 0.0]

            [[actions]]
            action = "demolish"
            piece = 9
            "#,
        )
        .expect("scenario parses");
        let report = run(scenario).expect("scenario runs");

        assert!(report.pieces.is_empty());
        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.session_state, SessionState::Previewing);
        assert_eq!(report.structures, 0);
    }
}
