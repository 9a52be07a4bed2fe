//! Frame graph infrastructure.
//!
//! The frame graph is a declarative description of one frame of GPU work.
//! Passes declare what they read and write, and the graph derives the rest:
//!
//! - Pass ordering via topological sort of data dependencies
//! - Culling of passes that contribute to no output
//! - Transient resource lifetimes and pooled allocation
//! - State transition barriers before every pass
//!
//! # Lifecycle
//!
//! | Phase | Method | Effect |
//! |-------|--------|--------|
//! | Declare | [`FrameGraph::add_pass`], [`FrameGraph::import_texture`], [`FrameGraph::mark_output`] | records passes and resources |
//! | Compile | [`FrameGraph::compile`] | builds the plan, cached while declarations and screen size are unchanged |
//! | Execute | [`FrameGraph::execute`] | allocates transients and records every pass |
//! | Reset | [`FrameGraph::reset`] | drops declarations, keeps the pool and the last plan |
//!
//! # Example
//!
//! ```ignore
//! use redlilium_framegraph::*;
//!
//! let mut graph = FrameGraph::new(create_default_device());
//! let hdr = graph.add_pass("lighting", PassKind::Graphics, |builder| {
//!     let hdr = builder.create_texture("hdr", TextureDescriptor::screen_relative(
//!         1.0,
//!         TextureFormat::Rgba16Float,
//!         TextureUsage::RENDER_ATTACHMENT | TextureUsage::TEXTURE_BINDING,
//!     ))?;
//!     builder.write(hdr, 0)
//! }, |_hdr, ctx| {
//!     ctx.recorder().draw(3, 1);
//! })?;
//! graph.mark_output(*hdr)?;
//! graph.execute(&mut recorder)?;
//! graph.reset();
//! ```

mod builder;
mod handle;
mod pass;
mod resource;
mod state;

use std::sync::Arc;

pub use builder::PassBuilder;
pub use handle::{PassHandle, ResourceHandle};
pub use pass::{Pass, PassKind, PassNode};
pub(crate) use pass::{ClosurePass, ErasedPass};
pub use resource::{
    ImportedResource, Resource, ResourceDescriptor, ResourceKind, ResourceRegistry,
};
pub use state::{Access, Binding, ResourceState};

use crate::backend::{CommandRecorder, GpuDevice, GpuObject};
use crate::compiler::{self, CompiledPlan, Lifetime};
use crate::config::FrameGraphConfig;
use crate::error::{CompileError, DeclarationError, FrameError};
use crate::executor::{Executor, ExecutorState, FrameStats, PassContext};
use crate::pool::PoolStats;
use crate::profile_function;
use crate::types::{BufferDescriptor, Extent3d, TextureDescriptor};

/// Per-frame graph of passes and transient resources.
///
/// See the [module documentation](self) for the frame lifecycle.
pub struct FrameGraph {
    config: FrameGraphConfig,
    screen_size: Extent3d,
    registry: ResourceRegistry,
    passes: Vec<Pass>,
    nodes: Vec<Box<dyn ErasedPass>>,
    outputs: Vec<ResourceHandle>,
    /// Last successfully compiled plan, kept across failed compiles and resets.
    plan: Option<CompiledPlan>,
    compile_count: usize,
    executor: Executor,
}

impl FrameGraph {
    /// Create a frame graph with the default configuration.
    pub fn new(device: Arc<dyn GpuDevice>) -> Self {
        Self::with_config(device, FrameGraphConfig::default())
    }

    /// Create a frame graph with the given configuration.
    pub fn with_config(device: Arc<dyn GpuDevice>, config: FrameGraphConfig) -> Self {
        log::debug!(
            "Creating frame graph on {} device ({}x{})",
            device.name(),
            config.screen_size.width,
            config.screen_size.height
        );
        Self {
            screen_size: config.screen_size,
            executor: Executor::new(device, config.pool_gc_frames),
            config,
            registry: ResourceRegistry::new(),
            passes: Vec::new(),
            nodes: Vec::new(),
            outputs: Vec::new(),
            plan: None,
            compile_count: 0,
        }
    }

    // ========================================================================
    // Declaration
    // ========================================================================

    /// Declare a pass.
    ///
    /// `setup` runs immediately and records the pass bindings; the payload it
    /// returns is handed to `execute` every time the pass is recorded. If
    /// `setup` fails, every resource it created and every version it advanced
    /// are rolled back and the pass is not added.
    pub fn add_pass<D, S, E>(
        &mut self,
        name: impl Into<String>,
        kind: PassKind,
        setup: S,
        execute: E,
    ) -> Result<&D, DeclarationError>
    where
        D: 'static,
        S: FnOnce(&mut PassBuilder<'_>) -> Result<D, DeclarationError>,
        E: Fn(&D, &mut PassContext<'_>) + 'static,
    {
        let handle = PassHandle::new(self.passes.len() as u32);
        let checkpoint = self.registry.checkpoint();
        let mut builder =
            PassBuilder::new(&mut self.registry, Pass::new(handle, name.into(), kind));

        let data = match setup(&mut builder) {
            Ok(data) => data,
            Err(err) => {
                let name = builder.pass_name().to_string();
                drop(builder);
                self.registry.rollback(checkpoint);
                log::warn!("Pass '{}' was not added: {}", name, err);
                return Err(err);
            }
        };

        let pass = builder.finish();
        log::trace!(
            "Declared pass '{}' ({} inputs, {} outputs)",
            pass.name(),
            pass.inputs().len(),
            pass.outputs().len()
        );
        self.passes.push(pass);
        self.nodes.push(Box::new(ClosurePass::new(data, execute)));
        self.invalidate();

        match self.payload::<D>(handle) {
            Some(data) => Ok(data),
            None => Err(DeclarationError::setup(
                self.passes[handle.index()].name(),
                "payload type mismatch",
            )),
        }
    }

    /// Declare a pass implemented by a [`PassNode`].
    pub fn add_node<N: PassNode>(
        &mut self,
        name: impl Into<String>,
        kind: PassKind,
        mut node: N,
    ) -> Result<&N, DeclarationError> {
        self.add_pass(
            name,
            kind,
            move |builder| {
                node.setup(builder)?;
                Ok(node)
            },
            |node: &N, ctx| node.execute(ctx),
        )
    }

    /// Import a caller-owned texture in the `Undefined` state.
    pub fn import_texture(
        &mut self,
        name: impl Into<String>,
        object: GpuObject,
        descriptor: TextureDescriptor,
    ) -> Result<ResourceHandle, DeclarationError> {
        self.import_texture_in_state(name, object, descriptor, ResourceState::Undefined)
    }

    /// Import a caller-owned texture that is in `state` when the frame starts.
    pub fn import_texture_in_state(
        &mut self,
        name: impl Into<String>,
        object: GpuObject,
        descriptor: TextureDescriptor,
        state: ResourceState,
    ) -> Result<ResourceHandle, DeclarationError> {
        let handle = self.registry.import(
            name,
            ResourceDescriptor::Texture(descriptor),
            object,
            state,
        )?;
        self.invalidate();
        Ok(handle)
    }

    /// Import a caller-owned buffer in the `Undefined` state.
    pub fn import_buffer(
        &mut self,
        name: impl Into<String>,
        object: GpuObject,
        descriptor: BufferDescriptor,
    ) -> Result<ResourceHandle, DeclarationError> {
        self.import_buffer_in_state(name, object, descriptor, ResourceState::Undefined)
    }

    /// Import a caller-owned buffer that is in `state` when the frame starts.
    pub fn import_buffer_in_state(
        &mut self,
        name: impl Into<String>,
        object: GpuObject,
        descriptor: BufferDescriptor,
        state: ResourceState,
    ) -> Result<ResourceHandle, DeclarationError> {
        let handle = self.registry.import(
            name,
            ResourceDescriptor::Buffer(descriptor),
            object,
            state,
        )?;
        self.invalidate();
        Ok(handle)
    }

    /// Require the given resource version to be produced this frame.
    ///
    /// The producing pass and everything it depends on are kept by culling.
    pub fn mark_output(&mut self, handle: ResourceHandle) -> Result<(), DeclarationError> {
        self.registry.get(handle)?;
        self.outputs.push(handle);
        self.invalidate();
        Ok(())
    }

    /// Set the screen size screen-relative textures are resolved against.
    ///
    /// A different size invalidates the compiled plan.
    pub fn set_screen_size(&mut self, width: u32, height: u32) {
        let size = Extent3d::new_2d(width, height);
        if size != self.screen_size {
            log::debug!("Screen size changed to {}x{}", width, height);
            self.screen_size = size;
            self.invalidate();
        }
    }

    fn invalidate(&mut self) {
        self.executor.set_state(ExecutorState::NotCompiled);
    }

    // ========================================================================
    // Compile / Execute / Reset
    // ========================================================================

    /// Compile the current declarations.
    ///
    /// Returns the cached plan when it was compiled from identical
    /// declarations at the same screen size. On failure the previous plan is
    /// kept.
    pub fn compile(&mut self) -> Result<&CompiledPlan, CompileError> {
        profile_function!();
        let resources = self.registry.resources();
        let plan = match self.plan.take() {
            Some(plan)
                if plan.screen_size == self.screen_size
                    && plan.matches(&self.passes, resources, &self.outputs) =>
            {
                log::trace!("Reusing compiled plan");
                plan
            }
            previous => {
                match compiler::compile(&self.passes, resources, &self.outputs, self.screen_size)
                {
                    Ok(plan) => {
                        self.compile_count += 1;
                        log::debug!(
                            "Compiled frame graph: {} passes ordered, {} culled",
                            plan.pass_count(),
                            plan.culled_count()
                        );
                        plan
                    }
                    Err(err) => {
                        self.plan = previous;
                        self.executor.set_state(ExecutorState::NotCompiled);
                        log::warn!("Frame graph compilation failed: {}", err);
                        return Err(err);
                    }
                }
            }
        };
        if self.executor.state() == ExecutorState::NotCompiled {
            self.executor.set_state(ExecutorState::Compiled);
        }
        Ok(self.plan.insert(plan))
    }

    /// Record the frame.
    ///
    /// Compiles first if needed. When compilation fails, the previous plan is
    /// executed if the current declarations still start with the ones it was
    /// compiled from; otherwise nothing is recorded.
    pub fn execute(
        &mut self,
        recorder: &mut dyn CommandRecorder,
    ) -> Result<FrameStats, FrameError> {
        profile_function!();
        let mut compile_error = None;
        if self.executor.state() == ExecutorState::NotCompiled {
            if let Err(err) = self.compile() {
                compile_error = Some(err);
            }
        }

        let plan = match (&self.plan, compile_error.take()) {
            (Some(plan), None) => plan,
            (Some(plan), Some(err))
                if plan.screen_size == self.screen_size
                    && plan.matches_prefix(
                        &self.passes,
                        self.registry.resources(),
                        &self.outputs,
                    ) =>
            {
                log::warn!("Executing previously compiled plan: {}", err);
                compile_error = Some(err);
                plan
            }
            (_, Some(err)) => {
                log::warn!("Skipping frame: {}", err);
                return Err(FrameError::NotCompiled(err));
            }
            (None, None) => return Ok(FrameStats::default()),
        };

        let result = self.executor.execute(
            plan,
            &self.passes,
            self.registry.resources(),
            &self.nodes,
            recorder,
            self.config.allocation_failure_policy,
        );
        if compile_error.is_some() {
            self.executor.set_state(ExecutorState::NotCompiled);
        }
        result
    }

    /// Discard every declaration. The pool and the last plan are kept.
    ///
    /// Resource handles of the discarded frame become invalid.
    pub fn reset(&mut self) {
        self.registry.clear();
        self.passes.clear();
        self.nodes.clear();
        self.outputs.clear();
        self.invalidate();
    }

    /// Release every pooled object, for example before destroying the device.
    pub fn clear_pool(&mut self) {
        self.executor.pool_mut().clear();
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Get the configuration.
    pub fn config(&self) -> &FrameGraphConfig {
        &self.config
    }

    /// Get the current screen size.
    pub fn screen_size(&self) -> Extent3d {
        self.screen_size
    }

    /// Get the executor state.
    pub fn state(&self) -> ExecutorState {
        self.executor.state()
    }

    /// Get all declared passes.
    pub fn passes(&self) -> &[Pass] {
        &self.passes
    }

    /// Get a declared pass.
    pub fn pass(&self, handle: PassHandle) -> Option<&Pass> {
        self.passes.get(handle.index())
    }

    /// Get the number of declared passes.
    pub fn pass_count(&self) -> usize {
        self.passes.len()
    }

    /// Get all declared resources.
    pub fn resources(&self) -> &[Resource] {
        self.registry.resources()
    }

    /// Get the resource a handle refers to.
    pub fn resource(&self, handle: ResourceHandle) -> Option<&Resource> {
        self.registry.get(handle).ok()
    }

    /// Get the resource versions marked as outputs.
    pub fn outputs(&self) -> &[ResourceHandle] {
        &self.outputs
    }

    /// Get the payload a pass was declared with.
    pub fn payload<D: 'static>(&self, handle: PassHandle) -> Option<&D> {
        self.nodes
            .get(handle.index())
            .and_then(|node| node.payload().downcast_ref::<D>())
    }

    /// Get the plan compiled from the current declarations, if any.
    pub fn plan(&self) -> Option<&CompiledPlan> {
        match self.executor.state() {
            ExecutorState::NotCompiled => None,
            _ => self.plan.as_ref(),
        }
    }

    /// Get the last successfully compiled plan, even if the declarations
    /// changed since.
    pub fn last_compiled_plan(&self) -> Option<&CompiledPlan> {
        self.plan.as_ref()
    }

    /// Get the usage interval of a resource in the current plan.
    pub fn lifetime(&self, handle: ResourceHandle) -> Option<Lifetime> {
        self.plan().and_then(|plan| plan.lifetime(handle.id()))
    }

    /// Check if a pass was culled from the current plan.
    pub fn is_culled(&self, handle: PassHandle) -> bool {
        self.plan().is_some_and(|plan| plan.is_culled(handle))
    }

    /// Number of times the graph was actually compiled, cache hits excluded.
    pub fn compile_count(&self) -> usize {
        self.compile_count
    }

    /// Get the transient pool statistics.
    pub fn pool_stats(&self) -> PoolStats {
        self.executor.pool_stats()
    }
}

impl std::fmt::Debug for FrameGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameGraph")
            .field("state", &self.executor.state())
            .field("screen_size", &self.screen_size)
            .field("passes", &self.passes)
            .field("resources", &self.registry.len())
            .field("outputs", &self.outputs)
            .finish_non_exhaustive()
    }
}
