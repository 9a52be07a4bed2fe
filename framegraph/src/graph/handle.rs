//! Handles to frame graph resources and passes.

use std::fmt;
use std::hash::{Hash, Hasher};

/// Versioned handle to a logical resource in the frame graph.
///
/// Two handles refer to the same logical resource iff their ids match. The
/// version grows by one on every declared write, so every version has at most
/// one producing pass.
///
/// Handles also carry the generation of the registry that issued them, so a
/// handle kept across [`FrameGraph::reset`](crate::FrameGraph::reset) is
/// rejected even when its id is reused by the new frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ResourceHandle {
    id: u32,
    version: u32,
    generation: u32,
}

impl ResourceHandle {
    pub(crate) fn new(id: u32, version: u32) -> Self {
        Self::with_generation(id, version, 0)
    }

    pub(crate) fn with_generation(id: u32, version: u32, generation: u32) -> Self {
        Self {
            id,
            version,
            generation,
        }
    }

    /// Id of the logical resource.
    pub fn id(self) -> u32 {
        self.id
    }

    /// Version of the resource this handle names.
    pub fn version(self) -> u32 {
        self.version
    }

    /// Generation of the registry that issued this handle.
    pub fn generation(self) -> u32 {
        self.generation
    }

    /// The handle the next write of this version will produce.
    ///
    /// Useful for reading a version that a later-declared pass produces.
    pub fn next_version(self) -> Self {
        Self::with_generation(self.id, self.version + 1, self.generation)
    }

    /// The handle of the version this one was written over, if any.
    pub fn previous_version(self) -> Option<Self> {
        self.version
            .checked_sub(1)
            .map(|version| Self::with_generation(self.id, version, self.generation))
    }

    pub(crate) fn index(self) -> usize {
        self.id as usize
    }
}

// The generation is left out so that identical declarations in consecutive
// frames hash alike; the compile cache fingerprints bindings through this.
impl Hash for ResourceHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.version.hash(state);
    }
}

impl fmt::Display for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.id, self.version)
    }
}

/// Handle to a pass in the frame graph.
///
/// `PassHandle` is `Copy` and cheap to pass around. It is only valid within
/// the frame it was declared in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PassHandle(u32);

impl PassHandle {
    pub(crate) fn new(index: u32) -> Self {
        Self(index)
    }

    /// Declaration index of the pass.
    pub fn id(self) -> u32 {
        self.0
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_versions() {
        let handle = ResourceHandle::new(3, 0);
        let next = handle.next_version();
        assert_eq!(next.id(), 3);
        assert_eq!(next.version(), 1);
        assert_eq!(next.previous_version(), Some(handle));
        assert_eq!(handle.previous_version(), None);
    }

    #[test]
    fn test_versions_keep_generation() {
        let handle = ResourceHandle::with_generation(2, 1, 5);
        assert_eq!(handle.next_version().generation(), 5);
        assert_eq!(handle.previous_version().map(|h| h.generation()), Some(5));
        assert_ne!(handle, ResourceHandle::new(2, 1));
    }

    #[test]
    fn test_handle_display() {
        assert_eq!(ResourceHandle::new(1, 4).to_string(), "#1v4");
    }
}
