//! Pass declarations.

use std::any::Any;

use crate::error::DeclarationError;
use crate::executor::PassContext;

use super::{Access, Binding, PassBuilder, PassHandle, ResourceHandle};

/// Kind of GPU work a pass performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PassKind {
    /// Graphics pass (vertex/fragment shaders, rasterization).
    Graphics,
    /// Compute pass (compute shaders).
    Compute,
    /// Copy pass (transfer operations).
    Copy,
    /// Presentation of a texture to a surface.
    Present,
}

/// A pass declared in the frame graph.
///
/// Holds everything the compiler needs: the bindings recorded by the
/// [`PassBuilder`] and whether the pass must run regardless of its outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pass {
    handle: PassHandle,
    name: String,
    kind: PassKind,
    pub(super) inputs: Vec<Binding>,
    pub(super) outputs: Vec<Binding>,
    pub(super) depth_stencil: Option<Binding>,
    pub(super) side_effect: bool,
}

impl Pass {
    pub(crate) fn new(handle: PassHandle, name: String, kind: PassKind) -> Self {
        Self {
            handle,
            name,
            kind,
            inputs: Vec::new(),
            outputs: Vec::new(),
            depth_stencil: None,
            side_effect: false,
        }
    }

    /// Get the pass handle.
    pub fn handle(&self) -> PassHandle {
        self.handle
    }

    /// Get the pass name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the pass kind.
    pub fn kind(&self) -> PassKind {
        self.kind
    }

    /// Input bindings in declaration order.
    ///
    /// Includes the read half of read/write bindings.
    pub fn inputs(&self) -> &[Binding] {
        &self.inputs
    }

    /// Output bindings in declaration order.
    pub fn outputs(&self) -> &[Binding] {
        &self.outputs
    }

    /// The depth-stencil binding, if any.
    pub fn depth_stencil(&self) -> Option<&Binding> {
        self.depth_stencil.as_ref()
    }

    /// Check if the pass must run even when nothing consumes its outputs.
    pub fn has_side_effect(&self) -> bool {
        self.side_effect
    }

    /// Resource versions this pass needs a producer for.
    pub fn reads(&self) -> impl Iterator<Item = ResourceHandle> + '_ {
        self.inputs
            .iter()
            .chain(self.depth_stencil.iter().filter(|b| b.access == Access::Read))
            .map(|b| b.handle)
    }

    /// Resource versions this pass produces.
    pub fn writes(&self) -> impl Iterator<Item = ResourceHandle> + '_ {
        self.outputs
            .iter()
            .chain(self.depth_stencil.iter().filter(|b| b.access.writes()))
            .map(|b| b.handle)
    }

    /// All bindings in the order the executor transitions them.
    pub fn bindings(&self) -> impl Iterator<Item = &Binding> + '_ {
        self.inputs
            .iter()
            .chain(self.outputs.iter())
            .chain(self.depth_stencil.iter())
    }

    /// Check if this pass binds the given logical resource in any version.
    pub fn binds(&self, id: u32) -> bool {
        self.bindings().any(|b| b.handle.id() == id)
    }
}

/// Alternative to closures for declaring a pass.
///
/// The node itself is the pass payload: `setup` records bindings and stores
/// the handles it needs, `execute` records commands.
///
/// # Example
///
/// ```ignore
/// struct Blit {
///     src: ResourceHandle,
///     dst: Option<ResourceHandle>,
/// }
///
/// impl PassNode for Blit {
///     fn setup(&mut self, builder: &mut PassBuilder) -> Result<(), DeclarationError> {
///         builder.read(self.src, 0)?;
///         let dst = builder.create_texture("blit", desc)?;
///         self.dst = Some(builder.write(dst, 0)?);
///         Ok(())
///     }
///
///     fn execute(&self, ctx: &mut PassContext) {
///         // ...
///     }
/// }
/// ```
pub trait PassNode: 'static {
    /// Declare the pass bindings.
    fn setup(&mut self, builder: &mut PassBuilder<'_>) -> Result<(), DeclarationError>;

    /// Record the pass commands.
    fn execute(&self, ctx: &mut PassContext<'_>);
}

/// Type-erased pass payload with its execute callback.
pub(crate) trait ErasedPass {
    fn execute(&self, ctx: &mut PassContext<'_>);
    fn payload(&self) -> &dyn Any;
}

pub(crate) struct ClosurePass<D, F> {
    data: D,
    execute: F,
}

impl<D, F> ClosurePass<D, F>
where
    D: 'static,
    F: Fn(&D, &mut PassContext<'_>) + 'static,
{
    pub(crate) fn new(data: D, execute: F) -> Self {
        Self { data, execute }
    }
}

impl<D, F> ErasedPass for ClosurePass<D, F>
where
    D: 'static,
    F: Fn(&D, &mut PassContext<'_>) + 'static,
{
    fn execute(&self, ctx: &mut PassContext<'_>) {
        (self.execute)(&self.data, ctx);
    }

    fn payload(&self) -> &dyn Any {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::ResourceState;

    fn binding(id: u32, version: u32, access: Access) -> Binding {
        Binding {
            handle: ResourceHandle::new(id, version),
            access,
            state: ResourceState::ShaderRead,
            slot: 0,
        }
    }

    #[test]
    fn test_pass_reads_and_writes() {
        let mut pass = Pass::new(PassHandle::new(0), "lighting".into(), PassKind::Graphics);
        pass.inputs.push(binding(0, 1, Access::Read));
        pass.outputs.push(binding(1, 1, Access::Write));
        pass.depth_stencil = Some(binding(2, 1, Access::Read));

        let reads: Vec<_> = pass.reads().collect();
        let writes: Vec<_> = pass.writes().collect();
        assert_eq!(
            reads,
            vec![ResourceHandle::new(0, 1), ResourceHandle::new(2, 1)]
        );
        assert_eq!(writes, vec![ResourceHandle::new(1, 1)]);
        assert_eq!(pass.bindings().count(), 3);
        assert!(pass.binds(2));
        assert!(!pass.binds(3));
    }

    #[test]
    fn test_depth_write_is_output() {
        let mut pass = Pass::new(PassHandle::new(0), "gbuffer".into(), PassKind::Graphics);
        pass.depth_stencil = Some(binding(0, 1, Access::Write));
        assert_eq!(pass.reads().count(), 0);
        assert_eq!(pass.writes().next(), Some(ResourceHandle::new(0, 1)));
    }
}
