//! Common utilities for frame graph integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use redlilium_framegraph::{
    DeclarationError, DummyDevice, FrameGraph, FrameGraphConfig, PassBuilder, PassKind,
    RecordingCommandList, ResourceHandle, TextureDescriptor, TextureFormat, TextureUsage,
    Viewport,
};

/// Initialize logging once per test binary.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// ============================================================================
// Test Context
// ============================================================================

/// A frame graph on a dummy device with a recording command list.
pub struct TestContext {
    pub device: Arc<DummyDevice>,
    pub graph: FrameGraph,
    pub commands: RecordingCommandList,
}

impl TestContext {
    /// Create a context with the default configuration.
    pub fn new() -> Self {
        Self::with_config(FrameGraphConfig::default())
    }

    /// Create a context with the given configuration.
    pub fn with_config(config: FrameGraphConfig) -> Self {
        init_logging();
        let device = Arc::new(DummyDevice::new());
        let graph = FrameGraph::with_config(device.clone(), config);
        Self {
            device,
            graph,
            commands: RecordingCommandList::new(),
        }
    }

    /// Reset declarations and recorded commands for the next frame.
    pub fn next_frame(&mut self) {
        self.graph.reset();
        self.commands.clear();
    }
}

// ============================================================================
// Descriptors
// ============================================================================

pub fn color_target(format: TextureFormat) -> TextureDescriptor {
    TextureDescriptor::screen_relative(
        1.0,
        format,
        TextureUsage::RENDER_ATTACHMENT | TextureUsage::TEXTURE_BINDING,
    )
}

pub fn depth_target() -> TextureDescriptor {
    TextureDescriptor::screen_relative(
        1.0,
        TextureFormat::Depth32Float,
        TextureUsage::RENDER_ATTACHMENT | TextureUsage::TEXTURE_BINDING,
    )
}

// ============================================================================
// Deferred pipeline
// ============================================================================

/// Handles produced by the geometry pass.
#[derive(Debug, Clone, Copy)]
pub struct GBuffer {
    pub albedo: ResourceHandle,
    pub normal: ResourceHandle,
    pub depth: ResourceHandle,
}

/// Handles of a declared deferred pipeline.
#[derive(Debug, Clone, Copy)]
pub struct Deferred {
    pub gbuffer: GBuffer,
    pub hdr: ResourceHandle,
    pub ldr: ResourceHandle,
}

fn write_new(
    builder: &mut PassBuilder<'_>,
    name: &str,
    descriptor: TextureDescriptor,
) -> Result<ResourceHandle, DeclarationError> {
    let handle = builder.create_texture(name, descriptor)?;
    builder.write(handle, 0)
}

/// Declare GBuffer -> Lighting -> Tonemap. Nothing is marked as output.
pub fn declare_deferred(graph: &mut FrameGraph) -> Deferred {
    let gbuffer = *graph
        .add_pass(
            "GBuffer",
            PassKind::Graphics,
            |builder| {
                let albedo = write_new(builder, "Albedo", color_target(TextureFormat::Rgba8Unorm))?;
                let normal =
                    write_new(builder, "Normal", color_target(TextureFormat::Rgba16Float))?;
                let depth = builder.create_texture("Depth", depth_target())?;
                let depth = builder.use_depth_stencil(depth, false)?;
                Ok(GBuffer {
                    albedo,
                    normal,
                    depth,
                })
            },
            |gbuffer, ctx| {
                if let Some(extent) = ctx.texture_extent(gbuffer.albedo) {
                    ctx.recorder().set_viewport(Viewport::from_extent(extent));
                }
                ctx.recorder().draw(36, 16);
            },
        )
        .unwrap();

    let hdr = *graph
        .add_pass(
            "Lighting",
            PassKind::Graphics,
            |builder| {
                builder.read(gbuffer.albedo, 0)?;
                builder.read(gbuffer.normal, 1)?;
                builder.read(gbuffer.depth, 2)?;
                write_new(builder, "HDR", color_target(TextureFormat::Rgba16Float))
            },
            |_, ctx| ctx.recorder().draw(3, 1),
        )
        .unwrap();

    let ldr = *graph
        .add_pass(
            "Tonemap",
            PassKind::Graphics,
            |builder| {
                builder.read(hdr, 0)?;
                write_new(builder, "LDR", color_target(TextureFormat::Rgba8UnormSrgb))
            },
            |_, ctx| ctx.recorder().draw(3, 1),
        )
        .unwrap();

    Deferred { gbuffer, hdr, ldr }
}

/// Declare a pass with a side effect and no bindings.
pub fn declare_side_effect(graph: &mut FrameGraph, name: &str) {
    graph
        .add_pass(
            name,
            PassKind::Graphics,
            |builder| {
                builder.set_side_effect(true);
                Ok(())
            },
            |_, _| {},
        )
        .unwrap();
}
