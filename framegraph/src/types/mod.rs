//! Descriptors for frame graph resources.
//!
//! Format enums, usage flags and descriptor structs used when declaring
//! transient resources, matching them against pooled objects and passing
//! them to the GPU binding layer.

mod buffer;
mod common;
mod texture;

pub use buffer::{BufferDescriptor, BufferUsage};
pub use common::{ClearValue, Extent3d, ScissorRect, Viewport};
pub use texture::{TextureDescriptor, TextureFormat, TextureSize, TextureUsage};
