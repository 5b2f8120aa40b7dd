/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */
//! Texture object registry.
//!
//! Texture objects live in an arena. A handle is the arena index plus one in
//! the low 16 bits and the slot's generation in the high 16 bits, so a handle
//! is never 0 and a stale handle stops resolving once its slot is reused.
//! A slot whose generation is used up is retired rather than reused, so a
//! stale handle can never come back to life.

use super::gl_raw as gl;
use super::gl_raw::types::{GLenum, GLuint};
use super::GLError;

/// Highest number of texture objects that can be alive at once.
pub const MAX_TEXTURES: usize = 0xFFFF;

/// One texture object. `T` is the native texture type.
#[derive(Debug)]
pub struct TextureObject<T> {
    /// Native storage. [None] until the first image upload.
    pub native: Option<T>,
    pub width: u16,
    pub height: u16,
    pub wrap_s: GLenum,
    pub wrap_t: GLenum,
    pub min_filter: GLenum,
    pub mag_filter: GLenum,
}

impl<T> TextureObject<T> {
    fn new() -> Self {
        TextureObject {
            native: None,
            width: 0,
            height: 0,
            wrap_s: gl::REPEAT,
            wrap_t: gl::REPEAT,
            min_filter: gl::NEAREST_MIPMAP_LINEAR,
            mag_filter: gl::LINEAR,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.native.is_some()
    }
}

struct Slot<T> {
    generation: u16,
    object: Option<TextureObject<T>>,
}

pub struct TextureRegistry<T> {
    slots: Vec<Slot<T>>,
    free: Vec<usize>,
    /// Slots that are never handed out again.
    retired: usize,
    bound: Option<GLuint>,
}

fn make_handle(index: usize, generation: u16) -> GLuint {
    (GLuint::from(generation) << 16) | (index as GLuint + 1)
}

impl<T> TextureRegistry<T> {
    pub fn new() -> Self {
        TextureRegistry {
            slots: Vec::new(),
            free: Vec::new(),
            retired: 0,
            bound: None,
        }
    }

    fn index(&self, handle: GLuint) -> Option<usize> {
        let index = (handle & 0xFFFF).checked_sub(1)? as usize;
        let generation = (handle >> 16) as u16;
        let slot = self.slots.get(index)?;
        (slot.generation == generation && slot.object.is_some()).then_some(index)
    }

    /// Create a texture object with default parameters and no storage.
    pub fn allocate(&mut self) -> Result<GLuint, GLError> {
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                if self.slots.len() >= MAX_TEXTURES {
                    return Err(GLError::TooManyTextures);
                }
                self.slots
                    .try_reserve(1)
                    .map_err(|_| GLError::OutOfMemory {
                        bytes: std::mem::size_of::<Slot<T>>(),
                    })?;
                // Deleting must never need to allocate.
                let needed = self.slots.len() + 1 - self.free.len();
                self.free
                    .try_reserve(needed)
                    .map_err(|_| GLError::OutOfMemory {
                        bytes: needed * std::mem::size_of::<usize>(),
                    })?;
                self.slots.push(Slot {
                    generation: 0,
                    object: None,
                });
                self.slots.len() - 1
            }
        };
        let slot = &mut self.slots[index];
        slot.object = Some(TextureObject::new());
        Ok(make_handle(index, slot.generation))
    }

    pub fn is_texture(&self, handle: GLuint) -> bool {
        self.index(handle).is_some()
    }

    pub fn get(&self, handle: GLuint) -> Option<&TextureObject<T>> {
        let index = self.index(handle)?;
        self.slots[index].object.as_ref()
    }

    pub fn get_mut(&mut self, handle: GLuint) -> Option<&mut TextureObject<T>> {
        let index = self.index(handle)?;
        self.slots[index].object.as_mut()
    }

    /// Bind a texture. Handle 0 clears the binding. A handle that doesn't name
    /// a live texture leaves the binding as it was.
    pub fn bind(&mut self, handle: GLuint) {
        if handle == 0 {
            self.bound = None;
        } else if self.is_texture(handle) {
            self.bound = Some(handle);
        } else {
            log_dbg!(
                "Ignoring bind of unknown texture {:#x}, {:?} stays bound",
                handle,
                self.bound
            );
        }
    }

    pub fn bound(&self) -> Option<GLuint> {
        self.bound
    }

    pub fn bound_object(&self) -> Option<&TextureObject<T>> {
        self.get(self.bound?)
    }

    pub fn bound_object_mut(&mut self) -> Option<&mut TextureObject<T>> {
        self.get_mut(self.bound?)
    }

    /// Remove a texture object and hand it back, so its native storage can be
    /// released. Unbinds it if it was bound. Returns [None] for unknown
    /// handles.
    pub fn delete(&mut self, handle: GLuint) -> Option<TextureObject<T>> {
        let index = self.index(handle)?;
        if self.bound == Some(handle) {
            self.bound = None;
        }
        let slot = &mut self.slots[index];
        let object = slot.object.take();
        match slot.generation.checked_add(1) {
            Some(generation) => {
                slot.generation = generation;
                self.free.push(index);
            }
            None => {
                log_dbg!("Retiring texture slot {} after its last generation", index);
                self.retired += 1;
            }
        }
        object
    }

    pub fn live_count(&self) -> usize {
        self.slots.len() - self.free.len() - self.retired
    }
}

impl<T> Default for TextureRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn handles_are_distinct_and_non_zero() {
        let mut registry = TextureRegistry::<()>::new();
        let handles: Vec<_> = (0..100).map(|_| registry.allocate().unwrap()).collect();
        assert!(handles.iter().all(|&handle| handle != 0));
        assert_eq!(handles.iter().collect::<HashSet<_>>().len(), 100);
        assert_eq!(registry.live_count(), 100);
    }

    #[test]
    fn reused_slot_gets_new_handle() {
        let mut registry = TextureRegistry::<()>::new();
        let a = registry.allocate().unwrap();
        let b = registry.allocate().unwrap();
        assert!(registry.delete(a).is_some());
        assert!(!registry.is_texture(a));
        let c = registry.allocate().unwrap();
        assert_ne!(c, a);
        assert_ne!(c, b);
        assert!(registry.is_texture(c));
        assert!(registry.delete(a).is_none());
        assert!(registry.is_texture(c));
    }

    #[test]
    fn exhausted_slot_is_retired() {
        let mut registry = TextureRegistry::<()>::new();
        let stale = registry.allocate().unwrap();
        registry.delete(stale);
        for _ in 0..u16::MAX {
            let handle = registry.allocate().unwrap();
            assert_eq!(handle & 0xFFFF, stale & 0xFFFF);
            registry.delete(handle);
        }
        let fresh = registry.allocate().unwrap();
        assert_ne!(fresh, stale);
        assert!(!registry.is_texture(stale));
        assert!(registry.is_texture(fresh));
        assert!(registry.delete(stale).is_none());
        assert_eq!(registry.live_count(), 1);
    }

    #[test]
    fn bind_zero_clears() {
        let mut registry = TextureRegistry::<()>::new();
        let a = registry.allocate().unwrap();
        registry.bind(a);
        assert_eq!(registry.bound(), Some(a));
        registry.bind(0);
        assert_eq!(registry.bound(), None);
    }

    #[test]
    fn bind_unknown_keeps_binding() {
        let mut registry = TextureRegistry::<()>::new();
        let a = registry.allocate().unwrap();
        registry.bind(a);
        registry.bind(0x1234_5678);
        assert_eq!(registry.bound(), Some(a));
    }

    #[test]
    fn delete_and_binding() {
        let mut registry = TextureRegistry::<()>::new();
        let a = registry.allocate().unwrap();
        let b = registry.allocate().unwrap();
        registry.bind(a);
        registry.delete(b);
        assert_eq!(registry.bound(), Some(a));
        registry.delete(a);
        assert_eq!(registry.bound(), None);
        assert!(registry.bound_object().is_none());
    }

    #[test]
    fn default_parameters() {
        let mut registry = TextureRegistry::<()>::new();
        let a = registry.allocate().unwrap();
        let object = registry.get(a).unwrap();
        assert!(!object.is_initialized());
        assert_eq!(object.wrap_s, gl::REPEAT);
        assert_eq!(object.mag_filter, gl::LINEAR);
    }
}
