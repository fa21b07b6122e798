// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Vertex attribute buffers
//!
//! Builders own their buffers and hand them to the renderer read-only
//! between mutations. Every write bumps a version counter so the renderer
//! can tell which buffers need re-uploading.

/// Attribute names bound by the ribbon and text shaders.
///
/// These are a wire contract with the renderer: the vertex shaders look the
/// buffers up by exactly these names.
pub mod names {
    /// Vertex position (3 floats for ribbons, 2 for text quads)
    pub const POSITION: &str = "position";
    /// Source point before this vertex's point (3 floats)
    pub const PREVIOUS: &str = "previous";
    /// Source point after this vertex's point (3 floats)
    pub const NEXT: &str = "next";
    /// Ribbon rail, `+1` or `-1`
    pub const SIDE: &str = "side";
    /// Per-vertex width multiplier
    pub const WIDTH: &str = "width";
    pub const UV: &str = "uv";
    /// Normalised arc position, drives dashes and progressive reveal
    pub const COUNTERS: &str = "counters";
    /// Atlas page a text quad samples from (multipage fonts only)
    pub const PAGE: &str = "page";
    pub const INDEX: &str = "index";
}

/// A named, versioned GPU-bound buffer
#[derive(Debug, Clone)]
pub struct BufferAttribute<T> {
    name: &'static str,
    item_size: usize,
    data: Vec<T>,
    version: u32,
    uploaded_version: u32,
}

/// Float vertex attribute
pub type Attribute = BufferAttribute<f32>;
/// Triangle index list
pub type IndexBuffer = BufferAttribute<u32>;

impl<T: Copy> BufferAttribute<T> {
    /// Create an empty attribute
    pub fn new(name: &'static str, item_size: usize) -> Self {
        Self::from_vec(name, item_size, Vec::new())
    }

    /// Create an attribute owning `data`
    pub fn from_vec(name: &'static str, item_size: usize, data: Vec<T>) -> Self {
        Self {
            name,
            item_size,
            data,
            version: 1,
            uploaded_version: 0,
        }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Components per vertex
    #[inline]
    pub fn item_size(&self) -> usize {
        self.item_size
    }

    /// Number of items (vertices for vertex attributes, indices for the
    /// index buffer)
    #[inline]
    pub fn count(&self) -> usize {
        self.data.len() / self.item_size
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Mutable access for in-place updates. Callers must follow up with
    /// [`mark_dirty`](Self::mark_dirty).
    #[inline]
    pub(crate) fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Write `values` into the buffer.
    ///
    /// The existing allocation is reused when the length is unchanged;
    /// otherwise the backing storage is replaced. Returns `true` when a new
    /// allocation was made. Either way the attribute is marked dirty.
    pub fn write(&mut self, values: &[T]) -> bool {
        if self.data.len() == values.len() {
            self.copy_in_place(values);
            false
        } else {
            self.replace(values);
            true
        }
    }

    /// Overwrite the current contents without touching the allocation.
    /// `values` must have the current length.
    pub fn copy_in_place(&mut self, values: &[T]) {
        debug_assert_eq!(self.data.len(), values.len(), "{} length changed", self.name);
        self.data.copy_from_slice(values);
        self.mark_dirty();
    }

    /// Swap in a freshly allocated copy of `values`
    pub fn replace(&mut self, values: &[T]) {
        self.data = values.to_vec();
        self.mark_dirty();
    }

    /// Drop all contents, keeping the allocation
    pub fn clear(&mut self) {
        if !self.data.is_empty() {
            self.data.clear();
            self.mark_dirty();
        }
    }

    /// Flag the contents as changed since the last upload
    #[inline]
    pub fn mark_dirty(&mut self) {
        self.version = self.version.wrapping_add(1);
    }

    /// Monotonic change counter
    #[inline]
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Whether the renderer still has to upload the latest contents
    #[inline]
    pub fn needs_update(&self) -> bool {
        self.version != self.uploaded_version
    }

    /// Called by the renderer after uploading
    #[inline]
    pub fn mark_uploaded(&mut self) {
        self.uploaded_version = self.version;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_reuses_allocation_when_size_matches() {
        let mut attr = Attribute::new(names::WIDTH, 1);
        assert!(attr.write(&[1.0, 2.0, 3.0]));
        let ptr = attr.as_slice().as_ptr();
        assert!(!attr.write(&[4.0, 5.0, 6.0]));
        assert_eq!(attr.as_slice().as_ptr(), ptr);
        assert_eq!(attr.as_slice(), &[4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_write_reallocates_on_resize() {
        let mut attr = Attribute::new(names::POSITION, 3);
        attr.write(&[0.0; 6]);
        assert!(attr.write(&[0.0; 9]));
        assert_eq!(attr.count(), 3);
    }

    #[test]
    fn test_dirty_tracking() {
        let mut index = IndexBuffer::new(names::INDEX, 1);
        assert!(index.needs_update());
        index.mark_uploaded();
        assert!(!index.needs_update());
        index.write(&[0, 1, 2]);
        assert!(index.needs_update());
        let v = index.version();
        index.mark_uploaded();
        index.mark_dirty();
        assert_eq!(index.version(), v + 1);
        assert!(index.needs_update());
    }
}
