//! Pass builder.

use crate::error::DeclarationError;
use crate::types::{BufferDescriptor, TextureDescriptor};

use super::{
    Access, Binding, Pass, PassHandle, PassKind, ResourceDescriptor, ResourceHandle,
    ResourceKind, ResourceRegistry, ResourceState,
};

/// Records the bindings of a single pass during its setup.
///
/// Every write returns a new handle version; later passes must use that
/// handle to depend on the data this pass produces.
pub struct PassBuilder<'g> {
    registry: &'g mut ResourceRegistry,
    pass: Pass,
}

impl<'g> PassBuilder<'g> {
    pub(crate) fn new(registry: &'g mut ResourceRegistry, pass: Pass) -> Self {
        Self { registry, pass }
    }

    pub(crate) fn finish(self) -> Pass {
        self.pass
    }

    /// Handle of the pass being declared.
    pub fn pass_handle(&self) -> PassHandle {
        self.pass.handle()
    }

    /// Name of the pass being declared.
    pub fn pass_name(&self) -> &str {
        self.pass.name()
    }

    /// Kind of the pass being declared.
    pub fn pass_kind(&self) -> PassKind {
        self.pass.kind()
    }

    /// Declare a transient texture. The returned handle is version 0.
    pub fn create_texture(
        &mut self,
        name: impl Into<String>,
        descriptor: TextureDescriptor,
    ) -> Result<ResourceHandle, DeclarationError> {
        self.registry
            .create(name, ResourceDescriptor::Texture(descriptor))
    }

    /// Declare a transient buffer. The returned handle is version 0.
    pub fn create_buffer(
        &mut self,
        name: impl Into<String>,
        descriptor: BufferDescriptor,
    ) -> Result<ResourceHandle, DeclarationError> {
        self.registry
            .create(name, ResourceDescriptor::Buffer(descriptor))
    }

    /// Read a resource in the default read state for this pass kind.
    ///
    /// Returns the same handle.
    pub fn read(
        &mut self,
        handle: ResourceHandle,
        slot: u32,
    ) -> Result<ResourceHandle, DeclarationError> {
        let state = ResourceState::default_read(self.pass.kind());
        self.read_as(handle, slot, state)
    }

    /// Read a resource in an explicit state.
    pub fn read_as(
        &mut self,
        handle: ResourceHandle,
        slot: u32,
        state: ResourceState,
    ) -> Result<ResourceHandle, DeclarationError> {
        self.check_state(handle, state)?;
        self.pass.inputs.push(Binding {
            handle,
            access: Access::Read,
            state,
            slot,
        });
        Ok(handle)
    }

    /// Write a resource in the default write state for this pass kind.
    ///
    /// Returns the new version produced by this pass.
    pub fn write(
        &mut self,
        handle: ResourceHandle,
        slot: u32,
    ) -> Result<ResourceHandle, DeclarationError> {
        let is_texture = self.registry.get(handle)?.kind() == ResourceKind::Texture;
        let state = ResourceState::default_write(self.pass.kind(), is_texture);
        self.write_as(handle, slot, state)
    }

    /// Write a resource in an explicit state.
    pub fn write_as(
        &mut self,
        handle: ResourceHandle,
        slot: u32,
        state: ResourceState,
    ) -> Result<ResourceHandle, DeclarationError> {
        self.check_state(handle, state)?;
        let output = self.registry.advance(handle)?;
        self.pass.outputs.push(Binding {
            handle: output,
            access: Access::Write,
            state,
            slot,
        });
        Ok(output)
    }

    /// Read and write a resource with unordered access.
    ///
    /// The pass reads `handle` and produces the next version, which is returned.
    pub fn read_write(
        &mut self,
        handle: ResourceHandle,
        slot: u32,
    ) -> Result<ResourceHandle, DeclarationError> {
        let state = ResourceState::UnorderedAccess;
        self.check_state(handle, state)?;
        let output = self.registry.advance(handle)?;
        self.pass.inputs.push(Binding {
            handle,
            access: Access::ReadWrite,
            state,
            slot,
        });
        self.pass.outputs.push(Binding {
            handle: output,
            access: Access::ReadWrite,
            state,
            slot,
        });
        Ok(output)
    }

    /// Bind a depth-stencil texture.
    ///
    /// Read-only bindings return `handle`. Writable bindings return the next
    /// version; when the bound version already has contents (an imported
    /// resource or a version produced by another pass) those contents are read
    /// as well, so depth testing against a prepass keeps its producer alive.
    pub fn use_depth_stencil(
        &mut self,
        handle: ResourceHandle,
        read_only: bool,
    ) -> Result<ResourceHandle, DeclarationError> {
        let resource = self.registry.get(handle)?;
        let is_depth = resource
            .descriptor()
            .as_texture()
            .is_some_and(|desc| desc.format.is_depth_stencil());
        if !is_depth {
            return Err(DeclarationError::InvalidBinding {
                resource: resource.name().to_string(),
                reason: "depth-stencil binding requires a depth texture",
            });
        }
        if self.pass.depth_stencil.is_some() {
            return Err(DeclarationError::InvalidBinding {
                resource: resource.name().to_string(),
                reason: "pass already has a depth-stencil binding",
            });
        }
        let loads_contents = handle.version() > 0 || resource.is_imported();
        let state = if read_only {
            ResourceState::DepthRead
        } else {
            ResourceState::DepthWrite
        };
        self.check_state(handle, state)?;

        if read_only {
            self.pass.depth_stencil = Some(Binding {
                handle,
                access: Access::Read,
                state: ResourceState::DepthRead,
                slot: 0,
            });
            return Ok(handle);
        }

        let output = self.registry.advance(handle)?;
        let access = if loads_contents {
            self.pass.inputs.push(Binding {
                handle,
                access: Access::ReadWrite,
                state: ResourceState::DepthWrite,
                slot: 0,
            });
            Access::ReadWrite
        } else {
            Access::Write
        };
        self.pass.depth_stencil = Some(Binding {
            handle: output,
            access,
            state: ResourceState::DepthWrite,
            slot: 0,
        });
        Ok(output)
    }

    /// Keep this pass alive even if nothing consumes its outputs.
    pub fn set_side_effect(&mut self, side_effect: bool) {
        self.pass.side_effect = side_effect;
    }

    // A pass sees each resource in a single state for its whole duration, so
    // every binding of one id must agree. Reading a version and writing the
    // next one in place goes through `read_write`.
    fn check_state(
        &self,
        handle: ResourceHandle,
        state: ResourceState,
    ) -> Result<(), DeclarationError> {
        let resource = self.registry.get(handle)?;
        let conflict = self
            .pass
            .bindings()
            .any(|b| b.handle.id() == handle.id() && b.state != state);
        if conflict {
            return Err(DeclarationError::InvalidBinding {
                resource: resource.name().to_string(),
                reason: "resource is already bound in another state by this pass",
            });
        }
        Ok(())
    }
}
