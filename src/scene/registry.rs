// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use std::rc::Rc;

use super::object::SharedObject;
use super::primitive::{Primitive, buffer_size};
use crate::error::{RenderError, SceneError};
use crate::gpu::backend::{ComputeBackend, GpuBuffer};

/// Live sphere objects mirrored into a dense primitive array and its GPU buffer.
///
/// Index `i` of the object list and of the primitive array always refer to the
/// same sphere. The GPU buffer holds exactly `len() * 56` bytes: it is
/// reallocated on every membership change, rewritten in place otherwise, and
/// released when the scene becomes empty.
///
/// Register and unregister only between frames, never while `sync_frame` runs.
pub struct SceneRegistry<B> {
    objects: Vec<SharedObject>,
    primitives: Vec<Primitive>,
    buffer: Option<B>,
    membership_changed: bool,
}

impl<B> Default for SceneRegistry<B> {
    fn default() -> Self {
        Self {
            objects: Vec::new(),
            primitives: Vec::new(),
            buffer: None,
            membership_changed: false,
        }
    }
}

impl<B: GpuBuffer> SceneRegistry<B> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn objects(&self) -> &[SharedObject] {
        &self.objects
    }

    pub fn buffer(&self) -> Option<&B> {
        self.buffer.as_ref()
    }

    /// Allocated GPU bytes; 0 when the buffer is released.
    pub fn buffer_size(&self) -> u64 {
        self.buffer.as_ref().map_or(0, GpuBuffer::size)
    }

    pub fn index_of(&self, object: &SharedObject) -> Option<usize> {
        self.objects.iter().position(|o| Rc::ptr_eq(o, object))
    }

    pub fn contains(&self, object: &SharedObject) -> bool {
        self.index_of(object).is_some()
    }

    /// Append `object` and upload a freshly sized buffer. Returns its index.
    ///
    /// Registering the same object twice is a lifecycle bug and is rejected.
    pub fn register<K>(&mut self, backend: &K, object: SharedObject) -> Result<usize, RenderError>
    where
        K: ComputeBackend<Buffer = B>,
    {
        if let Some(index) = self.index_of(&object) {
            log::error!("Sphere registered twice (index {index})");
            return Err(SceneError::AlreadyRegistered { index }.into());
        }

        let snapshot = {
            let mut obj = object.borrow_mut();
            if obj.is_dirty() {
                obj.resync()
            } else {
                *obj.primitive()
            }
        };

        let mut primitives = self.primitives.clone();
        primitives.push(snapshot);
        let buffer = backend.create_primitive_buffer(&primitives)?;

        self.primitives = primitives;
        self.objects.push(object);
        self.buffer = Some(buffer);
        self.membership_changed = true;

        let index = self.objects.len() - 1;
        log::debug!(
            "Registered sphere {index}; buffer reallocated to {} bytes",
            buffer_size(self.primitives.len())
        );
        Ok(index)
    }

    /// Remove `object`, repacking the array densely. Releases the buffer when empty.
    ///
    /// Unregistering an object that is not registered is a lifecycle bug and is rejected.
    pub fn unregister<K>(&mut self, backend: &K, object: &SharedObject) -> Result<(), RenderError>
    where
        K: ComputeBackend<Buffer = B>,
    {
        let Some(index) = self.index_of(object) else {
            log::error!("Tried to unregister a sphere that is not registered");
            return Err(SceneError::NotRegistered.into());
        };

        let mut primitives = self.primitives.clone();
        primitives.remove(index);
        let buffer = if primitives.is_empty() {
            None
        } else {
            Some(backend.create_primitive_buffer(&primitives)?)
        };

        self.primitives = primitives;
        self.objects.remove(index);
        self.buffer = buffer;
        self.membership_changed = true;

        log::debug!(
            "Unregistered sphere {index}; {} remaining, buffer {} bytes",
            self.objects.len(),
            self.buffer_size()
        );
        Ok(())
    }

    /// Resync every dirty object into its slot and push the array to the GPU buffer.
    ///
    /// Returns true when any object changed, including membership changes since
    /// the previous call.
    pub fn sync_frame<K>(&mut self, backend: &K) -> bool
    where
        K: ComputeBackend<Buffer = B>,
    {
        let mut any_dirty = false;
        for (slot, object) in self.primitives.iter_mut().zip(&self.objects) {
            let mut obj = object.borrow_mut();
            if obj.is_dirty() {
                *slot = obj.resync();
                any_dirty = true;
            }
        }

        if any_dirty {
            if let Some(buffer) = &self.buffer {
                backend.write_primitive_buffer(buffer, &self.primitives);
            }
        }

        let changed = any_dirty || self.membership_changed;
        self.membership_changed = false;
        changed
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::gpu::backend::testing::{FakeBuffer, RecordingBackend};
    use crate::scene::material::Material;
    use crate::scene::object::SceneObject;

    fn sphere(x: f32) -> SharedObject {
        SceneObject::sphere(Vec3::new(x, 0.0, 0.0), 1.0, Material::default()).into_shared()
    }

    fn assert_invariants(registry: &SceneRegistry<FakeBuffer>) {
        assert_eq!(registry.primitives().len(), registry.len());
        assert_eq!(registry.buffer_size(), registry.len() as u64 * 56);
        assert_eq!(registry.buffer().is_none(), registry.is_empty());
        if let Some(buffer) = registry.buffer() {
            assert_eq!(buffer.contents.borrow().as_slice(), registry.primitives());
        }
    }

    #[test]
    fn test_register_appends_and_reallocates() {
        let backend = RecordingBackend::default();
        let mut registry = SceneRegistry::new();

        for i in 0..4 {
            let index = registry.register(&backend, sphere(i as f32)).unwrap();
            assert_eq!(index, i);
            assert_invariants(&registry);
        }
        assert_eq!(backend.buffers_created.get(), 4);
        assert_eq!(registry.primitives()[2].position, [2.0, 0.0, 0.0]);
    }

    #[test]
    fn test_unregister_repacks_densely_in_order() {
        let backend = RecordingBackend::default();
        let mut registry = SceneRegistry::new();
        let objects: Vec<_> = (0..4).map(|i| sphere(i as f32)).collect();
        for obj in &objects {
            registry.register(&backend, obj.clone()).unwrap();
        }

        registry.unregister(&backend, &objects[1]).unwrap();
        assert_invariants(&registry);

        let xs: Vec<f32> = registry.primitives().iter().map(|p| p.position[0]).collect();
        assert_eq!(xs, vec![0.0, 2.0, 3.0]);
        assert_eq!(registry.index_of(&objects[3]), Some(2));
    }

    #[test]
    fn test_register_then_unregister_all_in_any_order_empties_registry() {
        let orders: [[usize; 3]; 3] = [[0, 1, 2], [2, 1, 0], [1, 2, 0]];
        for order in orders {
            let backend = RecordingBackend::default();
            let mut registry = SceneRegistry::new();
            let objects: Vec<_> = (0..3).map(|i| sphere(i as f32)).collect();
            for obj in &objects {
                registry.register(&backend, obj.clone()).unwrap();
            }
            for &i in &order {
                registry.unregister(&backend, &objects[i]).unwrap();
                assert_invariants(&registry);
            }

            assert!(registry.is_empty());
            assert!(registry.primitives().is_empty());
            assert!(registry.buffer().is_none());
            assert_eq!(registry.buffer_size(), 0);
        }
    }

    #[test]
    fn test_interleaved_membership_keeps_invariants() {
        let backend = RecordingBackend::default();
        let mut registry = SceneRegistry::new();
        let objects: Vec<_> = (0..4).map(|i| sphere(i as f32)).collect();

        // (object, register?) in an order that mixes both directions and re-adds removed spheres.
        let steps = [
            (0, true),
            (1, true),
            (0, false),
            (2, true),
            (0, true),
            (1, false),
            (3, true),
            (2, false),
            (1, true),
            (3, false),
            (0, false),
            (1, false),
            (2, true),
        ];
        for (i, add) in steps {
            if add {
                registry.register(&backend, objects[i].clone()).unwrap();
            } else {
                registry.unregister(&backend, &objects[i]).unwrap();
            }
            assert_invariants(&registry);
        }

        assert_eq!(registry.len(), 1);
        assert!(registry.contains(&objects[2]));
        assert_eq!(registry.primitives()[0].position, [2.0, 0.0, 0.0]);

        registry.unregister(&backend, &objects[2]).unwrap();
        assert_invariants(&registry);
        assert!(registry.buffer().is_none());
    }

    #[test]
    fn test_double_register_fails_loudly() {
        let backend = RecordingBackend::default();
        let mut registry = SceneRegistry::new();
        let obj = sphere(0.0);
        registry.register(&backend, obj.clone()).unwrap();

        let err = registry.register(&backend, obj).unwrap_err();
        assert!(matches!(
            err,
            RenderError::Scene(SceneError::AlreadyRegistered { index: 0 })
        ));
        assert_eq!(registry.len(), 1);
        assert_invariants(&registry);
    }

    #[test]
    fn test_unregister_unknown_fails_loudly() {
        let backend = RecordingBackend::default();
        let mut registry: SceneRegistry<FakeBuffer> = SceneRegistry::new();
        registry.register(&backend, sphere(0.0)).unwrap();

        let err = registry.unregister(&backend, &sphere(0.0)).unwrap_err();
        assert!(matches!(err, RenderError::Scene(SceneError::NotRegistered)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_allocation_failure_leaves_state_untouched() {
        let backend = RecordingBackend::default();
        let mut registry = SceneRegistry::new();
        let first = sphere(0.0);
        let second = sphere(1.0);
        registry.register(&backend, first.clone()).unwrap();
        registry.register(&backend, second.clone()).unwrap();

        backend.fail_allocations.set(true);
        assert!(matches!(
            registry.register(&backend, sphere(2.0)),
            Err(RenderError::Gpu(_))
        ));
        assert!(matches!(
            registry.unregister(&backend, &first),
            Err(RenderError::Gpu(_))
        ));
        assert_eq!(registry.len(), 2);
        assert_invariants(&registry);
    }

    #[test]
    fn test_sync_frame_writes_dirty_objects_in_place() {
        let backend = RecordingBackend::default();
        let mut registry = SceneRegistry::new();
        let a = sphere(0.0);
        let b = sphere(5.0);
        registry.register(&backend, a.clone()).unwrap();
        registry.register(&backend, b.clone()).unwrap();
        assert!(registry.sync_frame(&backend), "membership change counts");
        assert!(!registry.sync_frame(&backend));
        assert_eq!(backend.buffer_writes.get(), 0);

        b.borrow_mut().set_position(Vec3::new(5.0, 3.0, 0.0));
        a.borrow_mut().set_radius(0.25);
        assert!(registry.sync_frame(&backend));
        assert_eq!(backend.buffer_writes.get(), 1);
        assert_eq!(backend.buffers_created.get(), 2, "no reallocation on edits");
        assert_eq!(registry.primitives()[0].radius, 0.25);
        assert_eq!(registry.primitives()[1].position, [5.0, 3.0, 0.0]);
        assert!(!a.borrow().is_dirty());
        assert!(!b.borrow().is_dirty());
        assert_invariants(&registry);

        assert!(!registry.sync_frame(&backend));
    }

    #[test]
    fn test_register_snapshots_pending_edits() {
        let backend = RecordingBackend::default();
        let mut registry = SceneRegistry::new();
        let obj = sphere(0.0);
        obj.borrow_mut().set_radius(3.0);

        registry.register(&backend, obj.clone()).unwrap();
        assert_eq!(registry.primitives()[0].radius, 3.0);
        assert!(!obj.borrow().is_dirty());
    }
}
