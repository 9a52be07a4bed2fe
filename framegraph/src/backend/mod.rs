//! GPU binding layer boundary.
//!
//! The frame graph never talks to a GPU API directly. It creates and releases
//! transient objects through a [`GpuDevice`] and records work through a
//! [`CommandRecorder`]. Objects crossing this boundary are opaque
//! [`GpuObject`] ids owned by the device implementation.
//!
//! # Available Implementations
//!
//! - [`DummyDevice`]: no-op device with allocation counters and failure
//!   injection, for tests and headless runs
//! - [`RecordingCommandList`]: recorder that stores every command for inspection

mod dummy;
mod error;

use std::sync::Arc;

pub use dummy::{DummyDevice, RecordedCommand, RecordingCommandList};
pub use error::{BackendError, BackendResult};

use crate::graph::ResourceState;
use crate::types::{BufferDescriptor, ClearValue, ScissorRect, TextureDescriptor, Viewport};

/// Opaque handle to an object created by a [`GpuDevice`] or owned by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GpuObject(u64);

impl GpuObject {
    /// Wrap a backend-specific object id.
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the backend-specific object id.
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// A state transition of one object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Barrier {
    /// Object being transitioned.
    pub object: GpuObject,
    /// Tracked state before the transition.
    pub before: ResourceState,
    /// State required by the next pass.
    pub after: ResourceState,
}

/// Creates and releases GPU objects for transient resources.
///
/// Texture descriptors passed to the device always have an absolute size and
/// carry the logical resource name as label.
pub trait GpuDevice: Send + Sync {
    /// Get the device name.
    fn name(&self) -> &str;

    /// Create a texture.
    fn create_texture(&self, descriptor: &TextureDescriptor) -> BackendResult<GpuObject>;

    /// Create a buffer.
    fn create_buffer(&self, descriptor: &BufferDescriptor) -> BackendResult<GpuObject>;

    /// Release an object previously created by this device.
    fn release(&self, object: GpuObject);
}

/// Records GPU commands for the passes of a frame.
pub trait CommandRecorder {
    /// Open a named debug scope.
    fn begin_scope(&mut self, name: &str);

    /// Close the innermost debug scope.
    fn end_scope(&mut self);

    /// Transition a batch of objects.
    fn resource_barriers(&mut self, barriers: &[Barrier]);

    /// Clear a texture.
    fn clear_texture(&mut self, texture: GpuObject, value: ClearValue);

    /// Set the viewport.
    fn set_viewport(&mut self, viewport: Viewport);

    /// Set the scissor rectangle.
    fn set_scissor(&mut self, scissor: ScissorRect);

    /// Bind a pipeline by backend-specific id.
    fn bind_pipeline(&mut self, pipeline: u64);

    /// Draw non-indexed primitives.
    fn draw(&mut self, vertex_count: u32, instance_count: u32);

    /// Dispatch compute work groups.
    fn dispatch(&mut self, x: u32, y: u32, z: u32);

    /// Copy the whole contents of one object into another.
    fn copy(&mut self, src: GpuObject, dst: GpuObject);
}

/// Create the default device.
///
/// Only the dummy device ships with this crate; real GPU bindings implement
/// [`GpuDevice`] on top of their API.
pub fn create_default_device() -> Arc<dyn GpuDevice> {
    let device = DummyDevice::new();
    log::info!("Using {} device", device.name());
    Arc::new(device)
}
