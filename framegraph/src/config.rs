//! Frame graph configuration.

use crate::types::Extent3d;

/// What the executor does when a transient resource cannot be allocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AllocationFailurePolicy {
    /// Record no pass of the frame and return the allocation error.
    #[default]
    AbortFrame,
    /// Skip passes that bind a failed resource, and passes consuming their
    /// outputs. All other passes are recorded.
    SkipDependentPasses,
}

/// Configuration of a [`FrameGraph`](crate::FrameGraph).
///
/// # Example
///
/// ```ignore
/// let config = FrameGraphConfig::default()
///     .with_pool_gc_frames(8)
///     .with_screen_size(1920, 1080);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameGraphConfig {
    /// Pooled objects unused for more than this many frames are released.
    pub pool_gc_frames: u32,
    /// Behavior on transient allocation failure.
    pub allocation_failure_policy: AllocationFailurePolicy,
    /// Initial screen size used to resolve screen-relative textures.
    pub screen_size: Extent3d,
}

impl Default for FrameGraphConfig {
    fn default() -> Self {
        Self {
            pool_gc_frames: 3,
            allocation_failure_policy: AllocationFailurePolicy::AbortFrame,
            screen_size: Extent3d::new_2d(1280, 720),
        }
    }
}

impl FrameGraphConfig {
    /// Set the pool garbage collection threshold in frames.
    pub fn with_pool_gc_frames(mut self, frames: u32) -> Self {
        self.pool_gc_frames = frames;
        self
    }

    /// Set the allocation failure policy.
    pub fn with_allocation_failure_policy(mut self, policy: AllocationFailurePolicy) -> Self {
        self.allocation_failure_policy = policy;
        self
    }

    /// Set the initial screen size.
    pub fn with_screen_size(mut self, width: u32, height: u32) -> Self {
        self.screen_size = Extent3d::new_2d(width, height);
        self
    }
}

static_assertions::assert_impl_all!(FrameGraphConfig: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FrameGraphConfig::default();
        assert_eq!(config.pool_gc_frames, 3);
        assert_eq!(
            config.allocation_failure_policy,
            AllocationFailurePolicy::AbortFrame
        );
        assert_eq!(config.screen_size, Extent3d::new_2d(1280, 720));
    }

    #[test]
    fn test_builder_methods() {
        let config = FrameGraphConfig::default()
            .with_pool_gc_frames(0)
            .with_allocation_failure_policy(AllocationFailurePolicy::SkipDependentPasses)
            .with_screen_size(640, 480);
        assert_eq!(config.pool_gc_frames, 0);
        assert_eq!(
            config.allocation_failure_policy,
            AllocationFailurePolicy::SkipDependentPasses
        );
        assert_eq!(config.screen_size.width, 640);
    }
}
