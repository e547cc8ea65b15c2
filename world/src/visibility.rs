//! Fog of war: the union of revealed discs.

use glam::Vec3;
use rampart_core::VisibilityView;

use crate::spatial::flat;

/// Areas of the map the player can currently see.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FogOfWar {
    revealed: Vec<(Vec3, f32)>,
}

impl FogOfWar {
    pub(crate) fn reveal(&mut self, center: Vec3, radius: f32) {
        self.revealed.push((center, radius.max(0.0)));
    }
}

impl VisibilityView for FogOfWar {
    fn is_position_visible(&self, point: Vec3) -> bool {
        self.revealed
            .iter()
            .any(|(center, radius)| flat(*center).distance(flat(point)) <= *radius)
    }
}
