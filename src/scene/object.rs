// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec3;

use super::material::Material;
use super::primitive::Primitive;
use super::transform::Transform;

/// Handle the composition root and the registry both hold on to.
pub type SharedObject = Rc<RefCell<SceneObject>>;

/// One authored sphere: editable parameters plus the primitive mirrored from them.
///
/// Edits only mark the object dirty; the mirrored [`Primitive`] is refreshed by an
/// explicit [`SceneObject::resync`], which the registry runs once per frame.
#[derive(Debug, Clone)]
pub struct SceneObject {
    name: Option<String>,
    transform: Transform,
    radius: f32,
    material: Material,
    primitive: Primitive,
    dirty: bool,
}

impl SceneObject {
    pub fn sphere(position: Vec3, radius: f32, material: Material) -> Self {
        let transform = Transform::new(position, glam::Quat::IDENTITY);
        let primitive = Primitive::sphere(position.into(), radius, &material);
        Self {
            name: None,
            transform,
            radius,
            material,
            primitive,
            dirty: false,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn into_shared(self) -> SharedObject {
        Rc::new(RefCell::new(self))
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Mutable transform access; any move is picked up by [`SceneObject::is_dirty`].
    pub fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    pub fn position(&self) -> Vec3 {
        self.transform.position()
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.transform.set_position(position);
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn set_radius(&mut self, radius: f32) {
        if radius != self.radius {
            self.radius = radius;
            self.dirty = true;
        }
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn set_material(&mut self, material: Material) {
        if material != self.material {
            self.material = material;
            self.dirty = true;
        }
    }

    /// Edit the material in place; always marks the object dirty.
    pub fn edit_material(&mut self, edit: impl FnOnce(&mut Material)) {
        edit(&mut self.material);
        self.dirty = true;
    }

    /// Force a resync on the next frame.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Pure query: true when the mirrored primitive may be stale.
    pub fn is_dirty(&self) -> bool {
        self.dirty || self.transform.has_changed()
    }

    /// Last mirrored primitive. May lag authored parameters while dirty.
    pub fn primitive(&self) -> &Primitive {
        &self.primitive
    }

    /// Recompute the primitive from authored parameters, then clear the dirty state.
    pub fn resync(&mut self) -> Primitive {
        self.primitive = Primitive::sphere(self.transform.position().into(), self.radius, &self.material);
        self.dirty = false;
        self.transform.clear_changed();
        self.primitive
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_object_is_clean_and_mirrored() {
        let obj = SceneObject::sphere(Vec3::new(1.0, 2.0, 3.0), 0.5, Material::default());
        assert!(!obj.is_dirty());
        assert_eq!(obj.primitive().position, [1.0, 2.0, 3.0]);
        assert_eq!(obj.primitive().radius, 0.5);
    }

    #[test]
    fn test_edit_marks_dirty_without_touching_primitive() {
        let mut obj = SceneObject::sphere(Vec3::ZERO, 1.0, Material::default());
        obj.set_radius(2.0);
        assert!(obj.is_dirty());
        assert_eq!(obj.primitive().radius, 1.0);
        assert!(obj.is_dirty(), "querying must not resync");

        let prim = obj.resync();
        assert_eq!(prim.radius, 2.0);
        assert!(!obj.is_dirty());
    }

    #[test]
    fn test_move_is_dirty_until_resync() {
        let mut obj = SceneObject::sphere(Vec3::ZERO, 1.0, Material::default());
        obj.transform_mut().translate(Vec3::Y);
        assert!(obj.is_dirty());

        obj.resync();
        assert!(!obj.is_dirty());
        assert!(!obj.transform().has_changed());
        assert_eq!(obj.primitive().position, [0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_unchanged_material_is_not_dirty() {
        let mut obj = SceneObject::sphere(Vec3::ZERO, 1.0, Material::default());
        obj.set_material(Material::default());
        obj.set_radius(1.0);
        assert!(!obj.is_dirty());

        obj.edit_material(|m| m.emission = [1.0, 1.0, 1.0]);
        assert!(obj.is_dirty());
        assert!(obj.resync().emission == [1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_mark_dirty_forces_resync() {
        let mut obj = SceneObject::sphere(Vec3::ZERO, 1.0, Material::default());
        obj.mark_dirty();
        assert!(obj.is_dirty());
        let before = *obj.primitive();
        assert_eq!(obj.resync(), before);
        assert!(!obj.is_dirty());
    }
}
