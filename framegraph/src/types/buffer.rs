//! Buffer types and descriptors.

use bitflags::bitflags;

bitflags! {
    /// Usage flags for buffers.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BufferUsage: u32 {
        /// Buffer can be used as a vertex buffer.
        const VERTEX = 1 << 0;
        /// Buffer can be used as an index buffer.
        const INDEX = 1 << 1;
        /// Buffer can be used as a uniform buffer.
        const UNIFORM = 1 << 2;
        /// Buffer can be used as a storage buffer.
        const STORAGE = 1 << 3;
        /// Buffer can be used as an indirect buffer.
        const INDIRECT = 1 << 4;
        /// Buffer can be copied from.
        const COPY_SRC = 1 << 5;
        /// Buffer can be copied to.
        const COPY_DST = 1 << 6;
    }
}

impl Default for BufferUsage {
    fn default() -> Self {
        Self::empty()
    }
}

/// Descriptor for a frame graph buffer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct BufferDescriptor {
    /// Debug label for the buffer.
    pub label: Option<String>,
    /// Size in bytes.
    pub size: u64,
    /// Element stride in bytes for structured buffers, 0 for raw buffers.
    pub stride: u32,
    /// Whether the buffer may be bound for unordered (read/write) access.
    pub allow_unordered_access: bool,
    /// Usage flags.
    pub usage: BufferUsage,
}

impl BufferDescriptor {
    /// Create a new buffer descriptor.
    pub fn new(size: u64, usage: BufferUsage) -> Self {
        Self {
            label: None,
            size,
            stride: 0,
            allow_unordered_access: usage.contains(BufferUsage::STORAGE),
            usage,
        }
    }

    /// Create a structured buffer holding `count` elements of `stride` bytes.
    pub fn structured(count: u64, stride: u32, usage: BufferUsage) -> Self {
        Self {
            stride,
            ..Self::new(count * stride as u64, usage)
        }
    }

    /// Set the debug label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Allow or forbid unordered access.
    pub fn with_unordered_access(mut self, allow: bool) -> Self {
        self.allow_unordered_access = allow;
        self
    }

    /// Number of elements for structured buffers.
    pub fn element_count(&self) -> Option<u64> {
        (self.stride > 0).then(|| self.size / self.stride as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structured_buffer() {
        let desc = BufferDescriptor::structured(256, 16, BufferUsage::STORAGE);
        assert_eq!(desc.size, 4096);
        assert_eq!(desc.element_count(), Some(256));
        assert!(desc.allow_unordered_access);
    }

    #[test]
    fn test_raw_buffer_has_no_element_count() {
        let desc = BufferDescriptor::new(1024, BufferUsage::UNIFORM).with_label("constants");
        assert_eq!(desc.element_count(), None);
        assert!(!desc.allow_unordered_access);
        assert_eq!(desc.label.as_deref(), Some("constants"));
    }
}
