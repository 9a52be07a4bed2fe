//! # RedLilium Frame Graph
//!
//! Declarative per-frame scheduling of GPU passes over versioned transient
//! resources.
//!
//! ## Overview
//!
//! This crate provides:
//! - [`FrameGraph`] - Declare passes, compile them into a plan and record frames
//! - [`PassBuilder`] - Per-pass declaration of resource reads and writes
//! - [`compiler`] - Dependency resolution, ordering, culling and lifetimes
//! - [`ResourcePool`] - Descriptor-keyed reuse of transient GPU objects
//! - [`GpuDevice`] / [`CommandRecorder`] - Boundary to the GPU binding layer,
//!   with [`DummyDevice`] and [`RecordingCommandList`] for testing
//!
//! ## Example
//!
//! ```ignore
//! use redlilium_framegraph::*;
//!
//! let mut graph = FrameGraph::new(create_default_device());
//! let gbuffer = graph.add_pass("gbuffer", PassKind::Graphics, |builder| {
//!     let albedo = builder.create_texture("albedo", albedo_desc)?;
//!     builder.write(albedo, 0)
//! }, |albedo, ctx| {
//!     // record draws
//! })?;
//! // ... lighting, tonemap ...
//! graph.mark_output(ldr)?;
//! graph.execute(&mut recorder)?;
//! graph.reset();
//! ```

pub mod backend;
pub mod compiler;
pub mod config;
pub mod error;
pub mod executor;
pub mod graph;
pub mod pool;
pub mod profiling;
pub mod types;

// Re-export main types for convenience
pub use backend::{
    BackendError, Barrier, CommandRecorder, DummyDevice, GpuDevice, GpuObject, RecordedCommand,
    RecordingCommandList, create_default_device,
};
pub use compiler::{CompiledPlan, Lifetime};
pub use config::{AllocationFailurePolicy, FrameGraphConfig};
pub use error::{CompileError, DeclarationError, FrameError};
pub use executor::{ExecutorState, FrameStats, PassContext};
pub use graph::{
    Access, Binding, FrameGraph, Pass, PassBuilder, PassHandle, PassKind, PassNode, Resource,
    ResourceDescriptor, ResourceHandle, ResourceKind, ResourceState,
};
pub use pool::{PoolKey, PoolStats, ResourcePool};
pub use types::{
    BufferDescriptor, BufferUsage, ClearValue, Extent3d, ScissorRect, TextureDescriptor,
    TextureFormat, TextureSize, TextureUsage, Viewport,
};

/// Frame graph library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the frame graph subsystem.
///
/// Only logs the library version; the frame graph has no global state.
pub fn init() {
    log::info!("RedLilium Frame Graph v{} initialized", VERSION);
}
