#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure geometry system that lays discrete wall pieces along a span.
//!
//! Given two anchors and the reference length of a piece, the calculator
//! emits the poses of every piece needed to cover the span exactly. Whole
//! pieces are laid at full scale from the first anchor onwards and the final
//! piece is rescaled along the template's length axis instead of leaving a
//! gap or poking past the second anchor.

use glam::{Quat, Vec3};
use rampart_core::{Axis, PieceTemplate, PlacedSegment, Pose};

/// Remainders within this fraction of a piece length count as an exact multiple.
const EXACT_MULTIPLE_TOLERANCE: f32 = 1e-4;

/// Computes the poses of the pieces that span `start` to `end`.
///
/// Spans shorter than `piece_length * min_scale_factor` produce no pieces.
/// Otherwise `floor(distance / piece_length)` full pieces are laid from
/// `start`, followed by a tail piece scaled to the remaining distance when
/// that remainder exceeds the minimum scale. A remainder too small for its own
/// tail piece is absorbed by stretching the last full piece, so the returned
/// lengths always add up to the span. Every piece shares the rotation that
/// turns local +Z onto the horizontal projection of the span, so `length_axis`
/// is expected to be [`Axis::Z`].
#[must_use]
pub fn compute_segments(
    start: Vec3,
    end: Vec3,
    piece_length: f32,
    base_scale: Vec3,
    length_axis: Axis,
    min_scale_factor: f32,
) -> Vec<PlacedSegment> {
    if !piece_length.is_finite() || piece_length <= 0.0 {
        return Vec::new();
    }

    let offset = end - start;
    let total = offset.length();
    let floor = piece_length * min_scale_factor.max(0.0);
    if !total.is_finite() || total <= 0.0 || total < floor {
        return Vec::new();
    }

    let direction = offset / total;
    let rotation = facing_rotation(direction);
    let tolerance = piece_length * EXACT_MULTIPLE_TOLERANCE;

    let mut full = (total / piece_length).floor() as usize;
    let mut remaining = (total - full as f32 * piece_length).max(0.0);
    if piece_length - remaining <= tolerance {
        full += 1;
        remaining = 0.0;
    } else if remaining <= tolerance {
        remaining = 0.0;
    }

    let mut segments = Vec::with_capacity(full + 1);
    for index in 0..full {
        let center = start + direction * (index as f32 * piece_length + piece_length * 0.5);
        segments.push(PlacedSegment {
            pose: Pose::new(center, rotation, base_scale),
            length: piece_length,
        });
    }

    if remaining == 0.0 {
        return segments;
    }

    let covered = full as f32 * piece_length;
    if remaining > floor || full == 0 {
        let center = start + direction * (covered + remaining * 0.5);
        segments.push(PlacedSegment {
            pose: Pose::new(
                center,
                rotation,
                scale_along(base_scale, length_axis, remaining / piece_length),
            ),
            length: remaining,
        });
    } else if let Some(last) = segments.last_mut() {
        let stretched = piece_length + remaining;
        last.pose.position = start + direction * (covered - piece_length + stretched * 0.5);
        last.pose.scale = scale_along(base_scale, length_axis, stretched / piece_length);
        last.length = stretched;
    }

    segments
}

/// Rotation that turns local +Z towards `direction` with pitch and roll removed.
///
/// A direction without a horizontal component yields the identity rotation.
#[must_use]
pub fn facing_rotation(direction: Vec3) -> Quat {
    let flat = Vec3::new(direction.x, 0.0, direction.z);
    if flat.length_squared() <= f32::EPSILON {
        return Quat::IDENTITY;
    }
    Quat::from_rotation_y(flat.x.atan2(flat.z))
}

/// Detects the world-space length of one piece of `template`.
///
/// Prefers the rendered mesh bounds along the length axis, then the collision
/// bounds, and finally falls back to the raw scale value on that axis.
#[must_use]
pub fn detect_piece_length(template: &PieceTemplate) -> f32 {
    measure(template, template.length_axis)
}

/// Detects the world-space width of one piece, across its length axis.
#[must_use]
pub fn detect_piece_width(template: &PieceTemplate) -> f32 {
    measure(template, template.length_axis.across())
}

fn measure(template: &PieceTemplate, axis: Axis) -> f32 {
    let scale = axis.component(template.base_scale).abs();
    let from_bounds = |bounds: Option<Vec3>| {
        bounds
            .map(|size| axis.component(size).abs() * scale)
            .filter(|value| value.is_finite() && *value > 0.0)
    };

    from_bounds(template.mesh_bounds)
        .or_else(|| from_bounds(template.collider_bounds))
        .unwrap_or(scale)
}

fn scale_along(base_scale: Vec3, axis: Axis, ratio: f32) -> Vec3 {
    axis.with_component(base_scale, axis.component(base_scale) * ratio)
}
