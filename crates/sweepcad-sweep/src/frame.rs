//! Rotation-minimizing frame transport along the sweep line.

use sweepcad_math::{minimal_rotation, Point3, Quat, Transform, Vec3};

/// Accumulated orientation after some prefix of the sweep.
///
/// Each step rotates the previous orientation by the smallest rotation that
/// takes the previous direction onto the new one, so a straight run adds no
/// twist. Steps must be taken in increasing path order; feeding states out of
/// order silently produces wrong rotations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameState {
    /// Orientation mapping the profile's local `+Z` onto the current direction.
    pub rotation: Quat,
    /// Direction of the last committed step.
    pub last_direction: Vec3,
}

impl Default for FrameState {
    /// Identity orientation facing `+Z`.
    fn default() -> Self {
        Self {
            rotation: Quat::identity(),
            last_direction: Vec3::z(),
        }
    }
}

impl FrameState {
    /// Advance to a new sweep node.
    ///
    /// Returns the profile-to-world transform
    /// `Translate(position) · rotation · Scale(scale) · RotateZ(angle)` and the
    /// state to feed into the next step. To probe a position without
    /// committing, drop the returned state.
    ///
    /// Parallel, anti-parallel or zero-length directions leave the state
    /// unchanged. From the default state this means a path that starts out
    /// heading along `-Z` keeps the identity frame, so its profiles wind
    /// clockwise about the path.
    pub fn step(
        &self,
        position: &Point3,
        direction: &Vec3,
        angle: f64,
        scale: f64,
    ) -> (Transform, FrameState) {
        let next = match minimal_rotation(&self.last_direction, direction) {
            Some(q) => FrameState {
                rotation: q * self.rotation,
                last_direction: *direction,
            },
            None => {
                log::trace!("no unique rotation from {:?} to {direction:?}, keeping frame", self.last_direction);
                *self
            }
        };
        let transform = Transform::translation_to(position)
            .then(&Transform::rotation(&next.rotation))
            .then(&Transform::scale_uniform(scale))
            .then(&Transform::rotation_z(angle));
        (transform, next)
    }
}
