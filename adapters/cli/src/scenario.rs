//! TOML scenario description consumed by the runner.

use std::{fs, io, path::Path, path::PathBuf};

use glam::Vec3;
use rampart_core::{
    Axis, Footprint, PieceKind, PieceTemplate, PlacementConfig, ResourceCost, ResourceKind,
    StructureKind,
};
use rampart_world::WorldSettings;
use serde::Deserialize;
use thiserror::Error;

/// Errors raised while loading a scenario.
#[derive(Debug, Error)]
pub(crate) enum ScenarioError {
    /// The scenario file could not be read.
    #[error("could not read {path}")]
    Read {
        /// File that failed to load.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The scenario contents are not valid TOML for a scenario.
    #[error("could not parse scenario")]
    Parse(#[from] toml::de::Error),
    /// The piece template cannot produce pieces.
    #[error("piece length must be a positive number, got {0}")]
    InvalidPieceLength(f32),
    /// Pieces face local +Z along the run, so their length must lie on Z.
    #[error("pieces must be measured along the z axis, got {0:?}")]
    UnsupportedLengthAxis(Axis),
}

/// Scripted wall-building session plus the world it runs in.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Scenario {
    pub(crate) world: WorldSettings,
    pub(crate) placement: PlacementConfig,
    pub(crate) template: TemplateSpec,
    pub(crate) stockpile: CostSpec,
    pub(crate) fog: Option<FogSpec>,
    pub(crate) structures: Vec<StructureSpec>,
    pub(crate) actions: Vec<Action>,
}

impl Scenario {
    /// Reads and parses the scenario stored at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self, ScenarioError> {
        let contents = fs::read_to_string(path).map_err(|source| ScenarioError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents)
    }

    pub(crate) fn parse(contents: &str) -> Result<Self, ScenarioError> {
        Ok(toml::from_str(contents)?)
    }
}

/// Piece prefab description; `length` seeds the scale along the length axis
/// unless `base_scale` is given.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct TemplateSpec {
    kind: PieceKind,
    length: f32,
    base_scale: Option<Vec3>,
    length_axis: Axis,
    mesh_bounds: Option<Vec3>,
    collider_bounds: Option<Vec3>,
    cost: CostSpec,
}

impl Default for TemplateSpec {
    fn default() -> Self {
        Self {
            kind: PieceKind::Wall,
            length: 2.0,
            base_scale: None,
            length_axis: Axis::Z,
            mesh_bounds: None,
            collider_bounds: None,
            cost: CostSpec::default(),
        }
    }
}

impl TemplateSpec {
    pub(crate) fn to_template(&self) -> Result<PieceTemplate, ScenarioError> {
        if self.length_axis != Axis::Z {
            return Err(ScenarioError::UnsupportedLengthAxis(self.length_axis));
        }
        let base_scale = self
            .base_scale
            .unwrap_or_else(|| self.length_axis.with_component(Vec3::ONE, self.length));
        let along = self.length_axis.component(base_scale);
        if !along.is_finite() || along <= 0.0 {
            return Err(ScenarioError::InvalidPieceLength(along));
        }

        Ok(PieceTemplate {
            kind: self.kind,
            base_scale,
            length_axis: self.length_axis,
            mesh_bounds: self.mesh_bounds,
            collider_bounds: self.collider_bounds,
            cost: self.cost.to_cost(),
        })
    }
}

/// Resource amounts keyed by name.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct CostSpec {
    gold: u32,
    wood: u32,
    stone: u32,
}

impl CostSpec {
    pub(crate) fn to_cost(self) -> ResourceCost {
        ResourceCost::new()
            .with(ResourceKind::Gold, self.gold)
            .with(ResourceKind::Wood, self.wood)
            .with(ResourceKind::Stone, self.stone)
    }
}

/// Enables fog of war and reveals the listed discs.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct FogSpec {
    pub(crate) reveal: Vec<RevealSpec>,
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RevealSpec {
    pub(crate) center: Vec3,
    pub(crate) radius: f32,
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct StructureSpec {
    pub(crate) kind: StructureKind,
    pub(crate) footprint: Footprint,
}

/// One scripted step of the scenario.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case", deny_unknown_fields)]
pub(crate) enum Action {
    /// Moves the cursor.
    Hover { at: Vec3 },
    /// Moves the cursor and clicks.
    Click { at: Vec3 },
    /// Clicks without moving the cursor.
    Confirm,
    /// Abandons the session.
    Cancel,
    /// Starts a fresh session with the scenario's template.
    Start,
    /// Advances the world.
    Tick {
        #[serde(default = "one")]
        count: u32,
    },
    /// Destroys a placed piece.
    Demolish { piece: u32 },
    /// Upgrades a placed piece to another variant.
    Replace { piece: u32, kind: PieceKind },
}

const fn one() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_scenario_uses_defaults() {
        let scenario = Scenario::parse("").expect("empty scenario parses");
        assert_eq!(scenario.world, WorldSettings::default());
        assert_eq!(scenario.placement, PlacementConfig::default());
        assert!(scenario.actions.is_empty());

        let template = scenario.template.to_template().expect("default template");
        assert_eq!(template.base_scale, Vec3::new(1.0, 1.0, 2.0));
        assert!(template.cost.is_free());
    }

    #[test]
    fn full_scenario_parses() {
        let scenario = Scenario::parse(
            r#"
            [world]
            connection_distance = 3.0

            [placement]
            snap_radius = 0.5

            [template]
            length = 4.0
            cost = { stone = 2 }

            [stockpile]
            stone = 30

            [fog]
            reveal = [{ center = [0.0, 0.0, 0.0], radius = 20.0 }]

            [[structures]]
            kind = "building"
            footprint = { shape = "rect", min = [1.0, 0.0, 1.0], max = [2.0, 0.0, 2.0] }

            [[actions]]
            action = "click"
            at = [0.0, 0.0, 0.0]

            [[actions]]
            action = "tick"

            [[actions]]
            action = "replace"
            piece = 1
            kind = "tower"
            "#,
        )
        .expect("scenario parses");

        assert_eq!(scenario.world.connection_distance, 3.0);
        assert!(scenario.world.ground_enabled);
        assert_eq!(scenario.placement.snap_radius, 0.5);
        assert_eq!(scenario.stockpile.to_cost().amount(ResourceKind::Stone), 30);
        assert_eq!(scenario.fog.as_ref().map(|fog| fog.reveal.len()), Some(1));
        assert_eq!(scenario.structures[0].kind, StructureKind::Building);
        assert_eq!(
            scenario.actions,
            vec![
                Action::Click { at: Vec3::ZERO },
                Action::Tick { count: 1 },
                Action::Replace {
                    piece: 1,
                    kind: PieceKind::Tower,
                },
            ]
        );

        let template = scenario.template.to_template().expect("template");
        assert_eq!(template.cost.amount(ResourceKind::Stone), 2);
        assert_eq!(template.base_scale.z, 4.0);
    }

    #[test]
    fn unknown_actions_are_rejected() {
        let error = Scenario::parse(
            r#"
            [[actions]]
            action = "teleport"
            "#,
        )
        .expect_err("unknown action");
        assert!(matches!(error, ScenarioError::Parse(_)));
    }

    #[test]
    fn non_positive_lengths_are_rejected() {
        let scenario = Scenario::parse("[template]\nlength = 0.0\n").expect("parses");
        assert!(matches!(
            scenario.template.to_template(),
            Err(ScenarioError::InvalidPieceLength(_))
        ));
    }

    #[test]
    fn sideways_length_axes_are_rejected() {
        let scenario = Scenario::parse("[template]\nlength_axis = \"x\"\n").expect("parses");
        assert!(matches!(
            scenario.template.to_template(),
            Err(ScenarioError::UnsupportedLengthAxis(Axis::X))
        ));

        let scenario = Scenario::parse("[template]\nlength_axis = \"z\"\n").expect("parses");
        assert!(scenario.template.to_template().is_ok());
    }
}
