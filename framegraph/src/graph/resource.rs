//! Resource registry.
//!
//! Owns every logical resource declared for the current frame, transient or
//! imported, and the latest version of each. Versions only move forward while
//! passes are declared, except when a failed pass setup is rolled back.

use crate::backend::GpuObject;
use crate::error::DeclarationError;
use crate::types::{BufferDescriptor, TextureDescriptor};

use super::{ResourceHandle, ResourceState};

/// Kind of a logical resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// A texture.
    Texture,
    /// A buffer.
    Buffer,
}

/// Descriptor of a logical resource.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceDescriptor {
    /// Texture descriptor.
    Texture(TextureDescriptor),
    /// Buffer descriptor.
    Buffer(BufferDescriptor),
}

impl ResourceDescriptor {
    /// Get the resource kind.
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Texture(_) => ResourceKind::Texture,
            Self::Buffer(_) => ResourceKind::Buffer,
        }
    }

    /// Get the texture descriptor, if this is a texture.
    pub fn as_texture(&self) -> Option<&TextureDescriptor> {
        if let Self::Texture(desc) = self {
            Some(desc)
        } else {
            None
        }
    }

    /// Get the buffer descriptor, if this is a buffer.
    pub fn as_buffer(&self) -> Option<&BufferDescriptor> {
        if let Self::Buffer(desc) = self {
            Some(desc)
        } else {
            None
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            Self::Texture(desc) => !desc.size.is_valid(),
            Self::Buffer(desc) => desc.size == 0,
        }
    }
}

/// A resource owned outside the frame graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportedResource {
    /// The caller's object.
    pub object: GpuObject,
    /// State the object is in when the frame starts.
    pub initial_state: ResourceState,
}

/// A logical resource declared for the current frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    name: String,
    descriptor: ResourceDescriptor,
    import: Option<ImportedResource>,
    latest_version: u32,
}

impl Resource {
    /// Get the resource name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the resource descriptor.
    pub fn descriptor(&self) -> &ResourceDescriptor {
        &self.descriptor
    }

    /// Get the resource kind.
    pub fn kind(&self) -> ResourceKind {
        self.descriptor.kind()
    }

    /// Check if this resource is owned by the caller.
    pub fn is_imported(&self) -> bool {
        self.import.is_some()
    }

    /// Get the import information for imported resources.
    pub fn import(&self) -> Option<&ImportedResource> {
        self.import.as_ref()
    }

    /// Latest declared version.
    pub fn latest_version(&self) -> u32 {
        self.latest_version
    }
}

/// Registry state to roll back to when a pass setup fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RegistryCheckpoint {
    resource_count: usize,
    journal_len: usize,
}

/// Logical resources of the current frame.
#[derive(Debug, Default)]
pub struct ResourceRegistry {
    resources: Vec<Resource>,
    // (id, version before the write)
    journal: Vec<(u32, u32)>,
    // Bumped by `clear`; handles of an older generation are invalid.
    generation: u32,
}

impl ResourceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of declared resources.
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Check if no resources are declared.
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// All declared resources, indexed by id.
    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    /// Declare a transient resource at version 0.
    pub fn create(
        &mut self,
        name: impl Into<String>,
        descriptor: ResourceDescriptor,
    ) -> Result<ResourceHandle, DeclarationError> {
        self.insert(name.into(), descriptor, None)
    }

    /// Declare a caller-owned resource at version 0.
    pub fn import(
        &mut self,
        name: impl Into<String>,
        descriptor: ResourceDescriptor,
        object: GpuObject,
        initial_state: ResourceState,
    ) -> Result<ResourceHandle, DeclarationError> {
        self.insert(
            name.into(),
            descriptor,
            Some(ImportedResource {
                object,
                initial_state,
            }),
        )
    }

    fn insert(
        &mut self,
        name: String,
        descriptor: ResourceDescriptor,
        import: Option<ImportedResource>,
    ) -> Result<ResourceHandle, DeclarationError> {
        if descriptor.is_empty() {
            return Err(DeclarationError::ZeroSize(name));
        }
        let id = self.resources.len() as u32;
        log::trace!("Declared resource '{}' as #{}", name, id);
        self.resources.push(Resource {
            name,
            descriptor,
            import,
            latest_version: 0,
        });
        Ok(ResourceHandle::with_generation(id, 0, self.generation))
    }

    /// Generation stamped into handles issued by this registry.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Look up the resource a handle refers to.
    ///
    /// Any version is accepted, including versions not declared yet.
    pub fn get(&self, handle: ResourceHandle) -> Result<&Resource, DeclarationError> {
        if handle.generation() != self.generation {
            return Err(DeclarationError::InvalidHandle(handle));
        }
        self.resources
            .get(handle.index())
            .ok_or(DeclarationError::InvalidHandle(handle))
    }

    /// Advance the version of a resource for a write through `handle`.
    ///
    /// Only the latest version may be written; writing an older one would fork
    /// the resource history.
    pub(crate) fn advance(
        &mut self,
        handle: ResourceHandle,
    ) -> Result<ResourceHandle, DeclarationError> {
        if handle.generation() != self.generation {
            return Err(DeclarationError::InvalidHandle(handle));
        }
        let resource = self
            .resources
            .get_mut(handle.index())
            .ok_or(DeclarationError::InvalidHandle(handle))?;
        if handle.version() != resource.latest_version {
            return Err(DeclarationError::StaleHandle {
                handle,
                resource: resource.name.clone(),
                latest: resource.latest_version,
            });
        }
        self.journal.push((handle.id(), resource.latest_version));
        resource.latest_version += 1;
        Ok(handle.next_version())
    }

    pub(crate) fn checkpoint(&self) -> RegistryCheckpoint {
        RegistryCheckpoint {
            resource_count: self.resources.len(),
            journal_len: self.journal.len(),
        }
    }

    /// Undo every declaration made since `checkpoint`.
    pub(crate) fn rollback(&mut self, checkpoint: RegistryCheckpoint) {
        while self.journal.len() > checkpoint.journal_len {
            if let Some((id, version)) = self.journal.pop() {
                if let Some(resource) = self.resources.get_mut(id as usize) {
                    resource.latest_version = version;
                }
            }
        }
        self.resources.truncate(checkpoint.resource_count);
    }

    /// Remove every resource and expire all handles issued so far.
    pub fn clear(&mut self) {
        self.resources.clear();
        self.journal.clear();
        self.generation = self.generation.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BufferUsage, TextureFormat, TextureUsage};

    fn texture(width: u32, height: u32) -> ResourceDescriptor {
        ResourceDescriptor::Texture(TextureDescriptor::new_2d(
            width,
            height,
            TextureFormat::Rgba8Unorm,
            TextureUsage::RENDER_ATTACHMENT,
        ))
    }

    #[test]
    fn test_create_and_get() {
        let mut registry = ResourceRegistry::new();
        let handle = registry.create("albedo", texture(64, 64)).unwrap();
        assert_eq!(handle, ResourceHandle::new(0, 0));

        let resource = registry.get(handle).unwrap();
        assert_eq!(resource.name(), "albedo");
        assert_eq!(resource.kind(), ResourceKind::Texture);
        assert!(!resource.is_imported());
    }

    #[test]
    fn test_zero_size_rejected() {
        let mut registry = ResourceRegistry::new();
        assert_eq!(
            registry.create("empty", texture(0, 64)),
            Err(DeclarationError::ZeroSize("empty".into()))
        );
        let buffer = ResourceDescriptor::Buffer(BufferDescriptor::new(0, BufferUsage::STORAGE));
        assert!(registry.create("empty_buffer", buffer).is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_advance_requires_latest() {
        let mut registry = ResourceRegistry::new();
        let v0 = registry.create("hdr", texture(16, 16)).unwrap();
        let v1 = registry.advance(v0).unwrap();
        assert_eq!(v1.version(), 1);

        let err = registry.advance(v0).unwrap_err();
        assert!(matches!(err, DeclarationError::StaleHandle { latest: 1, .. }));
    }

    #[test]
    fn test_invalid_handle() {
        let mut registry = ResourceRegistry::new();
        let ghost = ResourceHandle::new(5, 0);
        assert_eq!(
            registry.get(ghost).unwrap_err(),
            DeclarationError::InvalidHandle(ghost)
        );
        assert!(registry.advance(ghost).is_err());
    }

    #[test]
    fn test_clear_expires_handles() {
        let mut registry = ResourceRegistry::new();
        let old = registry.create("old", texture(16, 16)).unwrap();
        registry.clear();

        let new = registry.create("new", texture(16, 16)).unwrap();
        assert_eq!(new.id(), old.id());
        assert_eq!(new.generation(), old.generation() + 1);
        assert_eq!(
            registry.get(old).unwrap_err(),
            DeclarationError::InvalidHandle(old)
        );
        assert_eq!(
            registry.advance(old).unwrap_err(),
            DeclarationError::InvalidHandle(old)
        );
        assert_eq!(registry.get(new).unwrap().name(), "new");
    }

    #[test]
    fn test_rollback() {
        let mut registry = ResourceRegistry::new();
        let a = registry.create("a", texture(16, 16)).unwrap();
        let checkpoint = registry.checkpoint();

        registry.advance(a).unwrap();
        let b = registry.create("b", texture(16, 16)).unwrap();
        registry.advance(b).unwrap();

        registry.rollback(checkpoint);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(a).unwrap().latest_version(), 0);
        assert!(registry.get(b).is_err());
    }
}
