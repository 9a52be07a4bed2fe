//! Frame execution.
//!
//! The executor walks a [`CompiledPlan`] and records every pass:
//!
//! 1. Transient resources with a lifetime are bound to pooled objects.
//! 2. For each pass, in plan order, a named scope is opened, the state
//!    transitions its bindings need are flushed as one barrier batch, the pass
//!    callback records its commands, and the scope is closed.
//!
//! Resource states are tracked per frame. Transient resources start in
//! [`ResourceState::Undefined`], imported ones in their import state.

use crate::backend::{Barrier, CommandRecorder, GpuDevice, GpuObject};
use crate::compiler::CompiledPlan;
use crate::config::AllocationFailurePolicy;
use crate::error::FrameError;
use crate::graph::{
    ErasedPass, Pass, PassHandle, PassKind, Resource, ResourceDescriptor, ResourceHandle,
    ResourceState,
};
use crate::pool::{PoolStats, ResourcePool};
use crate::types::{ClearValue, Extent3d};
use crate::{profile_function, profile_pass, profile_scope};

use std::sync::Arc;

/// State of the frame graph executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ExecutorState {
    /// No valid plan for the current declarations.
    #[default]
    NotCompiled,
    /// A plan is ready and has not been executed yet.
    Compiled,
    /// A frame is being recorded.
    Executing,
    /// The plan has been executed at least once.
    Idle,
}

/// Statistics of one executed frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Passes whose callback was invoked.
    pub executed_passes: usize,
    /// Passes removed by culling.
    pub culled_passes: usize,
    /// Passes skipped because a resource they depend on failed to allocate.
    pub skipped_passes: usize,
    /// Barrier batches recorded.
    pub barrier_batches: usize,
    /// Individual state transitions recorded.
    pub barriers: usize,
    /// Names of resources that failed to allocate.
    pub failed_resources: Vec<String>,
}

/// Everything a pass callback can access while recording.
pub struct PassContext<'a> {
    recorder: &'a mut dyn CommandRecorder,
    pass: &'a Pass,
    resources: &'a [Resource],
    objects: &'a [Option<GpuObject>],
    screen_size: Extent3d,
}

impl<'a> PassContext<'a> {
    /// The command recorder, scoped to this pass.
    pub fn recorder(&mut self) -> &mut dyn CommandRecorder {
        &mut *self.recorder
    }

    /// Handle of the executing pass.
    pub fn pass_handle(&self) -> PassHandle {
        self.pass.handle()
    }

    /// Name of the executing pass.
    pub fn pass_name(&self) -> &str {
        self.pass.name()
    }

    /// Kind of the executing pass.
    pub fn pass_kind(&self) -> PassKind {
        self.pass.kind()
    }

    /// Object bound to a resource this pass declared, in any version.
    pub fn object(&self, handle: ResourceHandle) -> Option<GpuObject> {
        if !self.pass.binds(handle.id()) {
            return None;
        }
        self.objects.get(handle.index()).copied().flatten()
    }

    /// Resolved extent of a texture this pass declared.
    pub fn texture_extent(&self, handle: ResourceHandle) -> Option<Extent3d> {
        if !self.pass.binds(handle.id()) {
            return None;
        }
        self.resources
            .get(handle.index())
            .and_then(|resource| resource.descriptor().as_texture())
            .map(|desc| desc.extent(self.screen_size))
    }

    /// Current screen size.
    pub fn screen_size(&self) -> Extent3d {
        self.screen_size
    }
}

/// Records compiled plans and owns the transient pool.
pub(crate) struct Executor {
    pool: ResourcePool,
    state: ExecutorState,
}

impl Executor {
    pub(crate) fn new(device: Arc<dyn GpuDevice>, gc_frames: u32) -> Self {
        Self {
            pool: ResourcePool::new(device, gc_frames),
            state: ExecutorState::NotCompiled,
        }
    }

    pub(crate) fn state(&self) -> ExecutorState {
        self.state
    }

    pub(crate) fn set_state(&mut self, state: ExecutorState) {
        self.state = state;
    }

    pub(crate) fn pool_stats(&self) -> PoolStats {
        self.pool.stats()
    }

    pub(crate) fn pool_mut(&mut self) -> &mut ResourcePool {
        &mut self.pool
    }

    /// Record one frame of `plan`.
    ///
    /// `passes`, `resources` and `nodes` must start with the declarations the
    /// plan was compiled from.
    pub(crate) fn execute(
        &mut self,
        plan: &CompiledPlan,
        passes: &[Pass],
        resources: &[Resource],
        nodes: &[Box<dyn ErasedPass>],
        recorder: &mut dyn CommandRecorder,
        policy: AllocationFailurePolicy,
    ) -> Result<FrameStats, FrameError> {
        profile_function!();
        self.state = ExecutorState::Executing;
        let result = self.record(plan, passes, resources, nodes, recorder, policy);
        self.state = ExecutorState::Idle;
        result
    }

    fn record(
        &mut self,
        plan: &CompiledPlan,
        passes: &[Pass],
        resources: &[Resource],
        nodes: &[Box<dyn ErasedPass>],
        recorder: &mut dyn CommandRecorder,
        policy: AllocationFailurePolicy,
    ) -> Result<FrameStats, FrameError> {
        let resources = &resources[..plan.shape.resources.min(resources.len())];
        let screen_size = plan.screen_size();
        let mut stats = FrameStats {
            culled_passes: plan.culled_count(),
            ..FrameStats::default()
        };

        // Allocation
        let mut objects: Vec<Option<GpuObject>> = vec![None; resources.len()];
        let mut failed = vec![false; resources.len()];
        {
            profile_scope!("framegraph_allocate");
            self.pool.begin_frame();
            for (id, resource) in resources.iter().enumerate() {
                if let Some(import) = resource.import() {
                    objects[id] = Some(import.object);
                    continue;
                }
                if plan.lifetime(id as u32).is_none() {
                    continue;
                }
                let acquired = match resource.descriptor() {
                    ResourceDescriptor::Texture(desc) => self.pool.acquire_texture(
                        &desc.resolved(screen_size).with_label(resource.name()),
                    ),
                    ResourceDescriptor::Buffer(desc) => self
                        .pool
                        .acquire_buffer(&desc.clone().with_label(resource.name())),
                };
                match acquired {
                    Ok(object) => objects[id] = Some(object),
                    Err(source) => {
                        log::error!(
                            "Failed to allocate transient resource '{}': {}",
                            resource.name(),
                            source
                        );
                        if policy == AllocationFailurePolicy::AbortFrame {
                            return Err(FrameError::AllocationFailed {
                                resource: resource.name().to_string(),
                                source,
                            });
                        }
                        failed[id] = true;
                        stats.failed_resources.push(resource.name().to_string());
                    }
                }
            }
        }

        let mut states: Vec<ResourceState> = resources
            .iter()
            .map(|resource| {
                resource
                    .import()
                    .map_or(ResourceState::Undefined, |import| import.initial_state)
            })
            .collect();
        let mut skipped = vec![false; passes.len()];
        let mut cleared = vec![false; resources.len()];
        let mut barriers = Vec::new();

        for (position, &handle) in plan.execution_order().iter().enumerate() {
            let pass = &passes[handle.index()];
            let skip = pass
                .bindings()
                .any(|binding| failed.get(binding.handle.index()).copied().unwrap_or(false))
                || plan
                    .producers(handle)
                    .iter()
                    .any(|producer| skipped[producer.index()]);
            if skip {
                log::warn!("Skipping pass '{}': a dependency failed to allocate", pass.name());
                skipped[handle.index()] = true;
                stats.skipped_passes += 1;
                continue;
            }

            profile_pass!(pass.name());
            recorder.begin_scope(pass.name());

            barriers.clear();
            for binding in pass.bindings() {
                let id = binding.handle.index();
                let Some(object) = objects.get(id).copied().flatten() else {
                    continue;
                };
                if states[id] != binding.state {
                    barriers.push(Barrier {
                        object,
                        before: states[id],
                        after: binding.state,
                    });
                    states[id] = binding.state;
                }
            }
            if !barriers.is_empty() {
                log::trace!(
                    "Pass '{}': flushing {} barriers",
                    pass.name(),
                    barriers.len()
                );
                recorder.resource_barriers(&barriers);
                stats.barrier_batches += 1;
                stats.barriers += barriers.len();
            }

            for binding in pass.bindings() {
                let id = binding.handle.index();
                if cleared.get(id).copied().unwrap_or(true) {
                    continue;
                }
                if let Some((object, value)) =
                    first_use_clear(plan, resources, &objects, id, position)
                {
                    recorder.clear_texture(object, value);
                    cleared[id] = true;
                }
            }

            let mut ctx = PassContext {
                recorder: &mut *recorder,
                pass,
                resources,
                objects: &objects,
                screen_size,
            };
            if let Some(node) = nodes.get(handle.index()) {
                node.execute(&mut ctx);
            }
            recorder.end_scope();
            stats.executed_passes += 1;
        }

        log::trace!(
            "Frame recorded: {} executed, {} culled, {} skipped, {} barriers",
            stats.executed_passes,
            stats.culled_passes,
            stats.skipped_passes,
            stats.barriers
        );
        Ok(stats)
    }
}

/// Clear value of a transient texture whose first use is at `position`.
fn first_use_clear(
    plan: &CompiledPlan,
    resources: &[Resource],
    objects: &[Option<GpuObject>],
    id: usize,
    position: usize,
) -> Option<(GpuObject, ClearValue)> {
    let resource = resources.get(id)?;
    if resource.is_imported() || plan.lifetime(id as u32)?.first != position {
        return None;
    }
    let value = resource.descriptor().as_texture()?.clear_value;
    let object = objects.get(id).copied().flatten()?;
    value.is_some().then_some((object, value))
}
