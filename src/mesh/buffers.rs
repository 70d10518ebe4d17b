//! Shared vertex-channel buffers
//!
//! A `MeshBuffer` is a fixed-length run of `Vec3` slots allocated once at
//! startup and shared (via `Arc`) between the caller and the kernels a
//! dispatch fans out. Slot writes happen only inside this crate, under the
//! dispatch discipline: the executor's partition assigns every index to
//! exactly one batch, so no two threads ever write the same slot, and the
//! caller stays off the buffer between `dispatch` and `wait`.

use crate::error::{DeformError, DeformResult};
use glam::Vec3;
use std::cell::UnsafeCell;
use std::fmt;

#[repr(transparent)]
struct Slot(UnsafeCell<Vec3>);

// One writer per slot per dispatch; see the module docs.
unsafe impl Sync for Slot {}

/// Fixed-length buffer of 3-component vectors used for a mesh channel
/// (positions or normals).
pub struct MeshBuffer {
    slots: Box<[Slot]>,
}

impl MeshBuffer {
    /// Allocate a buffer holding a copy of `data`. This is the persistent,
    /// create-once allocation; per-tick work reuses it.
    pub fn from_slice(data: &[Vec3]) -> Self {
        Self {
            slots: data.iter().map(|v| Slot(UnsafeCell::new(*v))).collect(),
        }
    }

    /// Allocate a buffer of `len` slots all set to `value`.
    pub fn filled(value: Vec3, len: usize) -> Self {
        Self {
            slots: (0..len).map(|_| Slot(UnsafeCell::new(value))).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Read one slot. Outside a dispatch cycle this is always safe; during
    /// one, only the kernel invocation owning `index` may touch it.
    pub fn get(&self, index: usize) -> Vec3 {
        unsafe { *self.slots[index].0.get() }
    }

    /// Write one slot. Crate-internal: callers mutate only through a
    /// dispatched kernel or the bulk `copy_from` between cycles.
    pub(crate) fn set(&self, index: usize, value: Vec3) {
        unsafe { *self.slots[index].0.get() = value }
    }

    /// Copy the current contents out. Call only with no dispatch in flight
    /// over this buffer.
    pub fn snapshot(&self) -> Vec<Vec3> {
        (0..self.len()).map(|i| self.get(i)).collect()
    }

    /// Overwrite the whole buffer from `data`. Call only with no dispatch
    /// in flight over this buffer.
    pub fn copy_from(&self, data: &[Vec3]) -> DeformResult<()> {
        if data.len() != self.len() {
            return Err(DeformError::shape_mismatch(self.len(), data.len()));
        }
        for (index, value) in data.iter().enumerate() {
            self.set(index, *value);
        }
        Ok(())
    }

    /// Contents as raw bytes, ready for upload to a rendering target.
    pub fn byte_snapshot(&self) -> Vec<u8> {
        bytemuck::cast_slice(&self.snapshot()).to_vec()
    }
}

impl fmt::Debug for MeshBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MeshBuffer").field("len", &self.len()).finish()
    }
}
