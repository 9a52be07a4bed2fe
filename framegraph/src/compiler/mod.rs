//! Frame graph compilation.
//!
//! This module turns the passes declared for a frame into an execution plan
//! ([`CompiledPlan`]). Compilation runs four phases, in order:
//!
//! 1. **Dependency resolution** - every read finds the pass producing the exact
//!    resource version it names
//! 2. **Topological sort** - Kahn's algorithm over data and hazard edges, ties
//!    broken by declaration order, cycles reported by name
//! 3. **Culling** - passes that neither have side effects nor contribute to an
//!    output are removed, in one reverse-topological sweep
//! 4. **Lifetimes** - first and last use of every resource over the final order
//!
//! Compilation never modifies the declarations. The same declarations always
//! compile to the same plan.
//!
//! # Edges
//!
//! A read of version *n* depends on the producer of version *n* (a data edge).
//! Writes add ordering-only hazard edges so that versions sharing physical
//! storage stay correct:
//!
//! - every reader of version *n* runs before the writer of version *n + 1*
//! - the producer of version *n* runs before the writer of version *n + 1*
//!
//! Only data edges keep a producer alive during culling.
//! A cycle that exists only because of a hazard edge means a pass depends on
//! the pass overwriting a version it uses; it is reported as
//! [`CompileError::HazardConflict`] rather than as a cycle.

use std::cmp::Reverse;
use std::collections::hash_map::DefaultHasher;
use std::collections::{BinaryHeap, HashMap};
use std::hash::{Hash, Hasher};

use crate::error::CompileError;
use crate::graph::{Pass, PassHandle, Resource, ResourceHandle};
use crate::types::Extent3d;

/// Usage interval of a resource over the execution order.
///
/// Both ends are indices into [`CompiledPlan::execution_order`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Lifetime {
    /// Index of the first pass using the resource.
    pub first: usize,
    /// Index of the last pass using the resource.
    pub last: usize,
}

impl Lifetime {
    fn extend(lifetime: &mut Option<Lifetime>, index: usize) {
        match lifetime {
            Some(lifetime) => {
                lifetime.first = lifetime.first.min(index);
                lifetime.last = lifetime.last.max(index);
            }
            None => {
                *lifetime = Some(Lifetime {
                    first: index,
                    last: index,
                })
            }
        }
    }

    /// Check if two intervals share at least one pass.
    pub fn overlaps(&self, other: &Lifetime) -> bool {
        self.first <= other.last && other.first <= self.last
    }
}

/// A compiled frame graph ready for execution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledPlan {
    execution_order: Vec<PassHandle>,
    culled: Vec<bool>,
    lifetimes: Vec<Option<Lifetime>>,
    producers: Vec<Vec<PassHandle>>,
    pub(crate) shape: PlanShape,
    pub(crate) fingerprint: u64,
    pub(crate) screen_size: Extent3d,
}

/// Declaration counts a plan was compiled from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct PlanShape {
    pub(crate) passes: usize,
    pub(crate) resources: usize,
    pub(crate) outputs: usize,
}

impl CompiledPlan {
    /// Passes to execute, in order. Culled passes are absent.
    pub fn execution_order(&self) -> &[PassHandle] {
        &self.execution_order
    }

    /// Number of passes the plan executes.
    pub fn pass_count(&self) -> usize {
        self.execution_order.len()
    }

    /// Check if the plan executes no pass.
    pub fn is_empty(&self) -> bool {
        self.execution_order.is_empty()
    }

    /// Number of passes declared when the plan was compiled.
    pub fn declared_pass_count(&self) -> usize {
        self.shape.passes
    }

    /// Check if a pass was culled. Passes unknown to the plan count as culled.
    pub fn is_culled(&self, pass: PassHandle) -> bool {
        self.culled.get(pass.index()).copied().unwrap_or(true)
    }

    /// Number of culled passes.
    pub fn culled_count(&self) -> usize {
        self.culled.iter().filter(|&&culled| culled).count()
    }

    /// Usage interval of a resource, `None` if no executed pass uses it.
    ///
    /// Imported resources span the whole execution order.
    pub fn lifetime(&self, id: u32) -> Option<Lifetime> {
        self.lifetimes.get(id as usize).copied().flatten()
    }

    /// Usage intervals of all resources, indexed by resource id.
    pub fn lifetimes(&self) -> &[Option<Lifetime>] {
        &self.lifetimes
    }

    /// Passes producing the versions a pass reads.
    pub fn producers(&self, pass: PassHandle) -> &[PassHandle] {
        self.producers
            .get(pass.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Screen size the plan was compiled for.
    pub fn screen_size(&self) -> Extent3d {
        self.screen_size
    }
}

/// Compile declarations into an execution plan.
///
/// # Arguments
///
/// * `passes` - Declared passes, indexed by pass handle
/// * `resources` - Declared resources, indexed by resource id
/// * `outputs` - Resource versions the frame must produce
/// * `screen_size` - Screen size recorded in the plan
///
/// # Returns
///
/// * `Ok(CompiledPlan)` - Plan ready for execution
/// * `Err(CompileError)` - Unresolved read or output, a cyclic dependency, or
///   a pass that depends on a pass overwriting a version it uses
pub fn compile(
    passes: &[Pass],
    resources: &[Resource],
    outputs: &[ResourceHandle],
    screen_size: Extent3d,
) -> Result<CompiledPlan, CompileError> {
    let n = passes.len();

    // (id, version) -> producing pass
    let mut producer_of: HashMap<ResourceHandle, usize> = HashMap::new();
    for (index, pass) in passes.iter().enumerate() {
        for handle in pass.writes() {
            producer_of.insert(handle, index);
        }
    }

    let resource_name = |handle: ResourceHandle| {
        resources
            .get(handle.index())
            .map_or_else(|| handle.to_string(), |r| r.name().to_string())
    };
    let is_imported_v0 = |handle: ResourceHandle| {
        handle.version() == 0
            && resources
                .get(handle.index())
                .is_some_and(Resource::is_imported)
    };

    // Phase 1: dependency resolution
    let mut producers: Vec<Vec<PassHandle>> = vec![Vec::new(); n];
    let mut successors: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut consumers: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut hazards: Vec<Hazard> = Vec::new();
    for (index, pass) in passes.iter().enumerate() {
        for handle in pass.reads() {
            match producer_of.get(&handle) {
                Some(&producer) if producer != index => {
                    producers[index].push(PassHandle::new(producer as u32));
                    successors[producer].push(index);
                    consumers[producer].push(index);
                }
                Some(_) => {}
                None if is_imported_v0(handle) => {}
                None => {
                    return Err(CompileError::UnresolvedRead {
                        pass: pass.name().to_string(),
                        resource: resource_name(handle),
                        version: handle.version(),
                    });
                }
            }

            // Write-after-read: the next version is written after this read
            if let Some(&writer) = producer_of.get(&handle.next_version()) {
                if writer != index {
                    successors[index].push(writer);
                    hazards.push(Hazard {
                        user: index,
                        writer,
                        handle,
                    });
                }
            }
        }
        for handle in pass.writes() {
            // Write-after-write
            if let Some(previous) = handle.previous_version() {
                if let Some(&writer) = producer_of.get(&previous) {
                    if writer != index {
                        successors[writer].push(index);
                        hazards.push(Hazard {
                            user: writer,
                            writer: index,
                            handle: previous,
                        });
                    }
                }
            }
        }
    }

    let mut required_outputs = Vec::with_capacity(outputs.len());
    for &output in outputs {
        match producer_of.get(&output) {
            Some(&producer) => required_outputs.push(producer),
            None if is_imported_v0(output) => {}
            None => {
                return Err(CompileError::UnresolvedOutput {
                    resource: resource_name(output),
                    version: output.version(),
                });
            }
        }
    }

    for list in successors.iter_mut().chain(consumers.iter_mut()) {
        list.sort_unstable();
        list.dedup();
    }
    for list in producers.iter_mut() {
        list.sort_unstable();
        list.dedup();
    }

    // Phase 2: topological sort
    let sorted = match topological_sort(&successors) {
        Ok(sorted) => sorted,
        Err(blocked) => {
            // Without a data cycle, every cycle runs through a hazard edge
            if topological_sort(&consumers).is_ok() {
                if let Some(hazard) = hazards
                    .iter()
                    .find(|hazard| reaches(&successors, hazard.writer, hazard.user))
                {
                    return Err(CompileError::HazardConflict {
                        user: passes[hazard.user].name().to_string(),
                        writer: passes[hazard.writer].name().to_string(),
                        resource: resource_name(hazard.handle),
                        version: hazard.handle.version(),
                    });
                }
            }
            let passes = blocked
                .into_iter()
                .map(|index| passes[index].name().to_string())
                .collect();
            return Err(CompileError::CyclicDependency { passes });
        }
    };

    // Phase 3: culling in reverse topological order
    let mut required = vec![false; n];
    for &producer in &required_outputs {
        required[producer] = true;
    }
    for &index in sorted.iter().rev() {
        if passes[index].has_side_effect() || consumers[index].iter().any(|&c| required[c]) {
            required[index] = true;
        }
    }
    let execution_order: Vec<PassHandle> = sorted
        .iter()
        .filter(|&&index| required[index])
        .map(|&index| PassHandle::new(index as u32))
        .collect();

    // Phase 4: lifetimes
    let mut lifetimes: Vec<Option<Lifetime>> = vec![None; resources.len()];
    for (position, handle) in execution_order.iter().enumerate() {
        for binding in passes[handle.index()].bindings() {
            if let Some(lifetime) = lifetimes.get_mut(binding.handle.index()) {
                Lifetime::extend(lifetime, position);
            }
        }
    }
    if let Some(last) = execution_order.len().checked_sub(1) {
        for (lifetime, resource) in lifetimes.iter_mut().zip(resources) {
            if resource.is_imported() {
                *lifetime = Some(Lifetime { first: 0, last });
            }
        }
    }

    Ok(CompiledPlan {
        execution_order,
        culled: required.iter().map(|&required| !required).collect(),
        lifetimes,
        producers,
        shape: PlanShape {
            passes: n,
            resources: resources.len(),
            outputs: outputs.len(),
        },
        fingerprint: fingerprint(passes, resources, outputs),
        screen_size,
    })
}

/// Ordering-only edge: `user` must run before `writer` overwrites `handle`.
struct Hazard {
    user: usize,
    writer: usize,
    handle: ResourceHandle,
}

/// Kahn's algorithm, lowest index first among ready nodes.
///
/// On a cycle, returns the nodes that could not be ordered.
fn topological_sort(successors: &[Vec<usize>]) -> Result<Vec<usize>, Vec<usize>> {
    let n = successors.len();
    let mut in_degree = vec![0u32; n];
    for list in successors {
        for &successor in list {
            in_degree[successor] += 1;
        }
    }
    let mut ready: BinaryHeap<Reverse<usize>> = (0..n)
        .filter(|&index| in_degree[index] == 0)
        .map(Reverse)
        .collect();
    let mut sorted = Vec::with_capacity(n);
    while let Some(Reverse(index)) = ready.pop() {
        sorted.push(index);
        for &successor in &successors[index] {
            in_degree[successor] -= 1;
            if in_degree[successor] == 0 {
                ready.push(Reverse(successor));
            }
        }
    }
    if sorted.len() == n {
        Ok(sorted)
    } else {
        Err((0..n).filter(|&index| in_degree[index] > 0).collect())
    }
}

fn reaches(successors: &[Vec<usize>], from: usize, to: usize) -> bool {
    let mut visited = vec![false; successors.len()];
    let mut stack = vec![from];
    while let Some(index) = stack.pop() {
        if index == to {
            return true;
        }
        if !std::mem::replace(&mut visited[index], true) {
            stack.extend(&successors[index]);
        }
    }
    false
}

/// Hash of everything a plan depends on.
///
/// Resource descriptors and imported objects are not part of the hash: the
/// plan only depends on the graph topology.
pub(crate) fn fingerprint(
    passes: &[Pass],
    resources: &[Resource],
    outputs: &[ResourceHandle],
) -> u64 {
    let mut hasher = DefaultHasher::new();
    resources.len().hash(&mut hasher);
    for resource in resources {
        resource.kind().hash(&mut hasher);
        resource.is_imported().hash(&mut hasher);
    }
    passes.len().hash(&mut hasher);
    for pass in passes {
        pass.name().hash(&mut hasher);
        pass.kind().hash(&mut hasher);
        pass.has_side_effect().hash(&mut hasher);
        pass.inputs().hash(&mut hasher);
        pass.outputs().hash(&mut hasher);
        pass.depth_stencil().hash(&mut hasher);
    }
    outputs.hash(&mut hasher);
    hasher.finish()
}

impl CompiledPlan {
    /// Check if this plan was compiled from exactly the given declarations.
    pub(crate) fn matches(
        &self,
        passes: &[Pass],
        resources: &[Resource],
        outputs: &[ResourceHandle],
    ) -> bool {
        self.shape.passes == passes.len()
            && self.shape.resources == resources.len()
            && self.shape.outputs == outputs.len()
            && self.fingerprint == fingerprint(passes, resources, outputs)
    }

    /// Check if the given declarations start with the ones this plan was
    /// compiled from.
    pub(crate) fn matches_prefix(
        &self,
        passes: &[Pass],
        resources: &[Resource],
        outputs: &[ResourceHandle],
    ) -> bool {
        match (
            passes.get(..self.shape.passes),
            resources.get(..self.shape.resources),
            outputs.get(..self.shape.outputs),
        ) {
            (Some(passes), Some(resources), Some(outputs)) => {
                self.fingerprint == fingerprint(passes, resources, outputs)
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::GpuObject;
    use crate::graph::{PassBuilder, PassKind, ResourceDescriptor, ResourceRegistry, ResourceState};
    use crate::types::{TextureDescriptor, TextureFormat, TextureUsage};

    /// Minimal declaration harness without payloads or a device.
    #[derive(Default)]
    struct Decl {
        registry: ResourceRegistry,
        passes: Vec<Pass>,
        outputs: Vec<ResourceHandle>,
    }

    impl Decl {
        fn texture(&mut self, name: &str) -> ResourceHandle {
            self.registry
                .create(
                    name,
                    ResourceDescriptor::Texture(TextureDescriptor::new_2d(
                        64,
                        64,
                        TextureFormat::Rgba8Unorm,
                        TextureUsage::RENDER_ATTACHMENT,
                    )),
                )
                .unwrap()
        }

        fn import(&mut self, name: &str) -> ResourceHandle {
            self.registry
                .import(
                    name,
                    ResourceDescriptor::Texture(TextureDescriptor::new_2d(
                        64,
                        64,
                        TextureFormat::Bgra8UnormSrgb,
                        TextureUsage::RENDER_ATTACHMENT,
                    )),
                    GpuObject::from_raw(1),
                    ResourceState::Present,
                )
                .unwrap()
        }

        fn pass<R>(&mut self, name: &str, setup: impl FnOnce(&mut PassBuilder) -> R) -> R {
            let handle = PassHandle::new(self.passes.len() as u32);
            let mut builder = PassBuilder::new(
                &mut self.registry,
                Pass::new(handle, name.into(), PassKind::Graphics),
            );
            let result = setup(&mut builder);
            self.passes.push(builder.finish());
            result
        }

        fn compile(&self) -> Result<CompiledPlan, CompileError> {
            compile(
                &self.passes,
                self.registry.resources(),
                &self.outputs,
                Extent3d::new_2d(64, 64),
            )
        }
    }

    fn order(plan: &CompiledPlan) -> Vec<u32> {
        plan.execution_order().iter().map(|h| h.id()).collect()
    }

    #[test]
    fn test_compile_empty_graph() {
        let decl = Decl::default();
        let plan = decl.compile().unwrap();
        assert!(plan.is_empty());
        assert_eq!(plan.pass_count(), 0);
    }

    #[test]
    fn test_compile_linear_chain() {
        let mut decl = Decl::default();
        let a = decl.texture("a");
        let b = decl.texture("b");
        let a1 = decl.pass("A", |p| p.write(a, 0).unwrap());
        let b1 = decl.pass("B", |p| {
            p.read(a1, 0).unwrap();
            p.write(b, 0).unwrap()
        });
        decl.pass("C", |p| {
            p.read(b1, 0).unwrap();
            p.set_side_effect(true);
        });

        let plan = decl.compile().unwrap();
        assert_eq!(order(&plan), vec![0, 1, 2]);
        assert_eq!(plan.producers(PassHandle::new(2)), &[PassHandle::new(1)]);
    }

    #[test]
    fn test_compile_forward_reference() {
        // C reads what B (declared later) produces.
        let mut decl = Decl::default();
        let t = decl.texture("t");
        decl.pass("C", |p| {
            p.read(t.next_version(), 0).unwrap();
            p.set_side_effect(true);
        });
        decl.pass("B", |p| p.write(t, 0).unwrap());

        let plan = decl.compile().unwrap();
        assert_eq!(order(&plan), vec![1, 0]);
    }

    #[test]
    fn test_tie_break_is_declaration_order() {
        let mut decl = Decl::default();
        for name in ["A", "B", "C", "D"] {
            decl.pass(name, |p| p.set_side_effect(true));
        }
        let plan = decl.compile().unwrap();
        assert_eq!(order(&plan), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_compile_diamond_dependency() {
        let mut decl = Decl::default();
        let a = decl.texture("a");
        let b = decl.texture("b");
        let c = decl.texture("c");
        let a1 = decl.pass("A", |p| p.write(a, 0).unwrap());
        let b1 = decl.pass("B", |p| {
            p.read(a1, 0).unwrap();
            p.write(b, 0).unwrap()
        });
        let c1 = decl.pass("C", |p| {
            p.read(a1, 0).unwrap();
            p.write(c, 0).unwrap()
        });
        decl.pass("D", |p| {
            p.read(b1, 0).unwrap();
            p.read(c1, 1).unwrap();
            p.set_side_effect(true);
        });

        let plan = decl.compile().unwrap();
        assert_eq!(order(&plan), vec![0, 1, 2, 3]);
        assert_eq!(plan.lifetime(a.id()), Some(Lifetime { first: 0, last: 2 }));
        assert_eq!(plan.lifetime(b.id()), Some(Lifetime { first: 1, last: 3 }));
    }

    #[test]
    fn test_unresolved_read() {
        let mut decl = Decl::default();
        let t = decl.texture("t");
        decl.pass("reader", |p| {
            p.read(t, 0).unwrap();
            p.set_side_effect(true);
        });

        assert_eq!(
            decl.compile(),
            Err(CompileError::UnresolvedRead {
                pass: "reader".into(),
                resource: "t".into(),
                version: 0,
            })
        );
    }

    #[test]
    fn test_unresolved_output() {
        let mut decl = Decl::default();
        let t = decl.texture("t");
        decl.outputs.push(t.next_version());
        assert!(matches!(
            decl.compile(),
            Err(CompileError::UnresolvedOutput { version: 1, .. })
        ));
    }

    #[test]
    fn test_cycle_names_passes() {
        // A reads B's output, B reads A's output.
        let mut decl = Decl::default();
        let a = decl.texture("a");
        let b = decl.texture("b");
        decl.pass("A", |p| {
            p.read(b.next_version(), 0).unwrap();
            p.write(a, 0).unwrap();
        });
        decl.pass("B", |p| {
            p.read(a.next_version(), 0).unwrap();
            p.write(b, 0).unwrap();
        });
        decl.pass("Independent", |p| p.set_side_effect(true));

        assert_eq!(
            decl.compile(),
            Err(CompileError::CyclicDependency {
                passes: vec!["A".into(), "B".into()]
            })
        );
    }

    #[test]
    fn test_read_of_overwritten_version_is_hazard_conflict() {
        // A overwrites the backbuffer and produces X; B needs X and the
        // backbuffer contents from before A.
        let mut decl = Decl::default();
        let backbuffer = decl.import("backbuffer");
        let x = decl.texture("x");
        let x1 = decl.pass("A", |p| {
            p.write(backbuffer, 0).unwrap();
            p.write(x, 1).unwrap()
        });
        decl.pass("B", |p| {
            p.read(x1, 0).unwrap();
            p.read(backbuffer, 1).unwrap();
            p.set_side_effect(true);
        });

        assert_eq!(
            decl.compile(),
            Err(CompileError::HazardConflict {
                user: "B".into(),
                writer: "A".into(),
                resource: "backbuffer".into(),
                version: 0,
            })
        );
    }

    #[test]
    fn test_data_cycle_with_hazards_is_cyclic() {
        let mut decl = Decl::default();
        let a = decl.texture("a");
        let b = decl.texture("b");
        decl.pass("A", |p| {
            p.read(b.next_version(), 0).unwrap();
            p.write(a, 0).unwrap();
        });
        decl.pass("B", |p| {
            p.read(a.next_version(), 0).unwrap();
            p.write(b, 0).unwrap();
        });
        // Ordered after A by a write-after-write hazard
        decl.pass("C", |p| {
            p.write(a.next_version(), 0).unwrap();
            p.set_side_effect(true);
        });

        assert_eq!(
            decl.compile(),
            Err(CompileError::CyclicDependency {
                passes: vec!["A".into(), "B".into(), "C".into()]
            })
        );
    }

    #[test]
    fn test_culling_without_outputs() {
        let mut decl = Decl::default();
        let a = decl.texture("a");
        let a1 = decl.pass("A", |p| p.write(a, 0).unwrap());
        decl.pass("B", |p| {
            p.read(a1, 0).unwrap();
        });

        let plan = decl.compile().unwrap();
        assert!(plan.is_empty());
        assert_eq!(plan.culled_count(), 2);
        assert_eq!(plan.lifetime(a.id()), None);
    }

    #[test]
    fn test_culling_keeps_output_producers_only() {
        let mut decl = Decl::default();
        let a = decl.texture("a");
        let unused = decl.texture("unused");
        let a1 = decl.pass("A", |p| p.write(a, 0).unwrap());
        decl.pass("Dead", |p| {
            p.read(a1, 0).unwrap();
            p.write(unused, 0).unwrap();
        });
        decl.outputs.push(a1);

        let plan = decl.compile().unwrap();
        assert_eq!(order(&plan), vec![0]);
        assert!(plan.is_culled(PassHandle::new(1)));
        assert!(!plan.is_culled(PassHandle::new(0)));
    }

    #[test]
    fn test_write_after_read_ordering() {
        // Reader of v1 must run before the writer of v2, even though the
        // writer is declared first among the ready passes.
        let mut decl = Decl::default();
        let t = decl.texture("t");
        let sink = decl.texture("sink");
        let t1 = decl.pass("Produce", |p| p.write(t, 0).unwrap());
        let t2 = decl.pass("Overwrite", |p| p.write(t1, 0).unwrap());
        let sink1 = decl.pass("Read", |p| {
            p.read(t1, 0).unwrap();
            p.write(sink, 0).unwrap()
        });
        decl.outputs.extend([t2, sink1]);

        let plan = decl.compile().unwrap();
        assert_eq!(order(&plan), vec![0, 2, 1]);
    }

    #[test]
    fn test_hazard_edges_do_not_keep_passes_alive() {
        let mut decl = Decl::default();
        let t = decl.texture("t");
        let t1 = decl.pass("Produce", |p| p.write(t, 0).unwrap());
        decl.pass("Overwrite", |p| {
            p.write(t1, 0).unwrap();
            p.set_side_effect(true);
        });

        let plan = decl.compile().unwrap();
        assert_eq!(order(&plan), vec![1]);
    }

    #[test]
    fn test_deterministic() {
        let build = || {
            let mut decl = Decl::default();
            let a = decl.texture("a");
            let b = decl.texture("b");
            let a1 = decl.pass("A", |p| p.write(a, 0).unwrap());
            let b1 = decl.pass("B", |p| p.write(b, 0).unwrap());
            decl.pass("C", |p| {
                p.read(b1, 0).unwrap();
                p.read(a1, 1).unwrap();
                p.set_side_effect(true);
            });
            decl
        };
        let first = build().compile().unwrap();
        let second = build().compile().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_prefix_matching() {
        let mut decl = Decl::default();
        let a = decl.texture("a");
        decl.pass("A", |p| {
            p.write(a, 0).unwrap();
            p.set_side_effect(true);
        });
        let plan = decl.compile().unwrap();
        assert!(plan.matches(&decl.passes, decl.registry.resources(), &decl.outputs));

        decl.pass("B", |p| p.set_side_effect(true));
        assert!(!plan.matches(&decl.passes, decl.registry.resources(), &decl.outputs));
        assert!(plan.matches_prefix(&decl.passes, decl.registry.resources(), &decl.outputs));
    }
}
