//! Binding access modes and resource states.

use super::{PassKind, ResourceHandle};

/// How a pass accesses a bound resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Access {
    /// Read-only access.
    Read,
    /// Write-only access. The previous contents are discarded.
    Write,
    /// Read and write access.
    ReadWrite,
}

impl Access {
    /// Check if this access includes reading.
    pub fn reads(self) -> bool {
        matches!(self, Self::Read | Self::ReadWrite)
    }

    /// Check if this access includes writing.
    pub fn writes(self) -> bool {
        matches!(self, Self::Write | Self::ReadWrite)
    }
}

/// State a resource must be in for a pass to use it.
///
/// The executor inserts a transition barrier whenever the tracked state of a
/// resource differs from the state its next binding requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ResourceState {
    /// Contents are undefined, the initial state of every transient resource.
    #[default]
    Undefined,
    /// Sampled or read in a shader.
    ShaderRead,
    /// Written as a color attachment.
    RenderTarget,
    /// Written as a depth/stencil attachment.
    DepthWrite,
    /// Read-only depth/stencil (depth test without writes, or sampling).
    DepthRead,
    /// Unordered (storage) read/write access.
    UnorderedAccess,
    /// Source of a copy operation.
    CopySource,
    /// Destination of a copy operation.
    CopyDest,
    /// Ready for presentation.
    Present,
}

impl ResourceState {
    /// Check if this state allows writes.
    pub fn is_write(self) -> bool {
        matches!(
            self,
            Self::RenderTarget | Self::DepthWrite | Self::UnorderedAccess | Self::CopyDest
        )
    }

    /// Default state for reading a resource in a pass of the given kind.
    pub fn default_read(kind: PassKind) -> Self {
        match kind {
            PassKind::Copy => Self::CopySource,
            PassKind::Present => Self::Present,
            PassKind::Graphics | PassKind::Compute => Self::ShaderRead,
        }
    }

    /// Default state for writing a resource in a pass of the given kind.
    pub fn default_write(kind: PassKind, is_texture: bool) -> Self {
        match kind {
            PassKind::Copy => Self::CopyDest,
            PassKind::Graphics | PassKind::Present if is_texture => Self::RenderTarget,
            _ => Self::UnorderedAccess,
        }
    }
}

/// A resource bound to a pass.
///
/// For writes `handle` is the newly produced version. For the read half of a
/// read/write binding it is the version being read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Binding {
    /// Bound resource version.
    pub handle: ResourceHandle,
    /// Access mode.
    pub access: Access,
    /// State the resource must be in while the pass runs.
    pub state: ResourceState,
    /// Caller-defined slot, typically a shader binding or attachment index.
    pub slot: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_modes() {
        assert!(Access::Read.reads());
        assert!(!Access::Read.writes());
        assert!(Access::Write.writes());
        assert!(!Access::Write.reads());
        assert!(Access::ReadWrite.reads() && Access::ReadWrite.writes());
    }

    #[test]
    fn test_default_states() {
        assert_eq!(
            ResourceState::default_read(PassKind::Graphics),
            ResourceState::ShaderRead
        );
        assert_eq!(
            ResourceState::default_read(PassKind::Copy),
            ResourceState::CopySource
        );
        assert_eq!(
            ResourceState::default_write(PassKind::Graphics, true),
            ResourceState::RenderTarget
        );
        assert_eq!(
            ResourceState::default_write(PassKind::Graphics, false),
            ResourceState::UnorderedAccess
        );
        assert_eq!(
            ResourceState::default_write(PassKind::Compute, true),
            ResourceState::UnorderedAccess
        );
        assert!(ResourceState::CopyDest.is_write());
        assert!(!ResourceState::Present.is_write());
    }
}
