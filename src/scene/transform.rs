// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use glam::{EulerRot, Mat4, Quat, Vec3};

/// Position + orientation with a one-shot "changed" flag.
///
/// Every mutator raises the flag. It stays raised until the frame loop has
/// acted on it and calls [`Transform::clear_changed`]; reading it never
/// clears it.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    position: Vec3,
    rotation: Quat,
    changed: bool,
}

impl Default for Transform {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Quat::IDENTITY)
    }
}

impl Transform {
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            changed: false,
        }
    }

    /// Rotation from pitch (X) and yaw (Y) in degrees, applied yaw first.
    pub fn from_pitch_yaw(position: Vec3, pitch: f32, yaw: f32) -> Self {
        Self::new(position, pitch_yaw_rotation(pitch, yaw))
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    pub fn set_position(&mut self, position: Vec3) {
        if position != self.position {
            self.position = position;
            self.changed = true;
        }
    }

    pub fn set_rotation(&mut self, rotation: Quat) {
        if rotation != self.rotation {
            self.rotation = rotation;
            self.changed = true;
        }
    }

    pub fn set_pitch_yaw(&mut self, pitch: f32, yaw: f32) {
        self.set_rotation(pitch_yaw_rotation(pitch, yaw));
    }

    pub fn translate(&mut self, delta: Vec3) {
        self.set_position(self.position + delta);
    }

    /// Unit vector the transform looks along (local -Z).
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    pub fn local_to_world(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position)
    }

    pub fn has_changed(&self) -> bool {
        self.changed
    }

    pub fn clear_changed(&mut self) {
        self.changed = false;
    }
}

fn pitch_yaw_rotation(pitch: f32, yaw: f32) -> Quat {
    Quat::from_euler(EulerRot::YXZ, yaw.to_radians(), pitch.to_radians(), 0.0)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_mutators_raise_flag_until_cleared() {
        let mut t = Transform::default();
        assert!(!t.has_changed());

        t.translate(Vec3::X);
        assert!(t.has_changed());
        assert!(t.has_changed(), "reading must not clear the flag");

        t.clear_changed();
        assert!(!t.has_changed());

        t.set_pitch_yaw(10.0, 0.0);
        assert!(t.has_changed());
    }

    #[test]
    fn test_setting_same_value_is_not_a_change() {
        let mut t = Transform::new(Vec3::ONE, Quat::IDENTITY);
        t.set_position(Vec3::ONE);
        t.set_rotation(Quat::IDENTITY);
        assert!(!t.has_changed());
    }

    #[test]
    fn test_forward_follows_yaw() {
        let t = Transform::from_pitch_yaw(Vec3::ZERO, 0.0, 90.0);
        let fwd = t.forward();
        assert_relative_eq!(fwd.x, -1.0, epsilon = 1e-6);
        assert_relative_eq!(fwd.z, 0.0, epsilon = 1e-6);
    }
}
