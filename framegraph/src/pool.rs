//! Transient resource pool.
//!
//! This module provides [`ResourcePool`], which keeps GPU objects of transient
//! resources alive across frames. Objects are matched by descriptor: a request
//! reuses the first pooled object with an identical [`PoolKey`] that is not
//! live in the current frame, and creates a new object otherwise.
//!
//! # Frame Lifecycle
//!
//! ```ignore
//! pool.begin_frame();              // every entry becomes available, stale ones are evicted
//! let a = pool.acquire_texture(&desc)?;
//! let b = pool.acquire_texture(&desc)?; // distinct object, `a` is live
//! ```
//!
//! An object is handed out at most once per frame, so two resources of the
//! same frame never share an object.

use std::collections::HashMap;
use std::sync::Arc;

use crate::backend::{BackendError, BackendResult, GpuDevice, GpuObject};
use crate::types::{
    BufferDescriptor, BufferUsage, Extent3d, TextureDescriptor, TextureFormat, TextureUsage,
};

/// Structural descriptor key. Labels and clear values never take part in matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoolKey {
    /// Texture with a resolved extent.
    Texture {
        extent: Extent3d,
        format: TextureFormat,
        mip_level_count: u32,
        sample_count: u32,
        usage: TextureUsage,
    },
    /// Buffer.
    Buffer {
        size: u64,
        stride: u32,
        allow_unordered_access: bool,
        usage: BufferUsage,
    },
}

impl PoolKey {
    /// Key of a texture descriptor resolved against `screen`.
    pub fn texture(descriptor: &TextureDescriptor, screen: Extent3d) -> Self {
        Self::Texture {
            extent: descriptor.extent(screen),
            format: descriptor.format,
            mip_level_count: descriptor.mip_level_count,
            sample_count: descriptor.sample_count,
            usage: descriptor.usage,
        }
    }

    /// Key of a buffer descriptor.
    pub fn buffer(descriptor: &BufferDescriptor) -> Self {
        Self::Buffer {
            size: descriptor.size,
            stride: descriptor.stride,
            allow_unordered_access: descriptor.allow_unordered_access,
            usage: descriptor.usage,
        }
    }
}

/// Pool statistics.
///
/// `created`, `reused` and `evicted` are totals over the pool lifetime,
/// `entries` and `live` describe the current frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Objects created through the device.
    pub created: usize,
    /// Requests served by an existing object.
    pub reused: usize,
    /// Objects released by garbage collection.
    pub evicted: usize,
    /// Objects currently pooled.
    pub entries: usize,
    /// Objects handed out in the current frame.
    pub live: usize,
}

#[derive(Debug)]
struct PoolEntry {
    object: GpuObject,
    live: bool,
    last_used_frame: u64,
}

/// Descriptor-keyed pool of transient GPU objects.
pub struct ResourcePool {
    device: Arc<dyn GpuDevice>,
    buckets: HashMap<PoolKey, Vec<PoolEntry>>,
    frame: u64,
    gc_frames: u32,
    created: usize,
    reused: usize,
    evicted: usize,
}

impl ResourcePool {
    /// Create an empty pool.
    ///
    /// Objects unused for more than `gc_frames` frames are released.
    pub fn new(device: Arc<dyn GpuDevice>, gc_frames: u32) -> Self {
        Self {
            device,
            buckets: HashMap::new(),
            frame: 0,
            gc_frames,
            created: 0,
            reused: 0,
            evicted: 0,
        }
    }

    /// The device objects are created with.
    pub fn device(&self) -> &Arc<dyn GpuDevice> {
        &self.device
    }

    /// Current frame number, starting at 1 after the first `begin_frame`.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Set the garbage collection threshold in frames.
    pub fn set_gc_frames(&mut self, frames: u32) {
        self.gc_frames = frames;
    }

    /// Start a new frame: every entry becomes available, then entries unused
    /// for more than the threshold are released.
    pub fn begin_frame(&mut self) {
        self.frame += 1;
        for entry in self.buckets.values_mut().flatten() {
            entry.live = false;
        }
        self.collect_garbage();
    }

    fn collect_garbage(&mut self) {
        let frame = self.frame;
        let threshold = self.gc_frames as u64;
        let device = &self.device;
        let mut evicted = 0;
        self.buckets.retain(|key, entries| {
            entries.retain(|entry| {
                let stale = frame - entry.last_used_frame > threshold;
                if stale {
                    log::trace!("Pool: evicting {:?} ({:?})", entry.object, key);
                    device.release(entry.object);
                    evicted += 1;
                }
                !stale
            });
            !entries.is_empty()
        });
        if evicted > 0 {
            log::debug!("Pool: evicted {} unused objects", evicted);
        }
        self.evicted += evicted;
    }

    /// Acquire an object for a texture.
    ///
    /// Screen-relative descriptors are rejected with
    /// [`BackendError::InvalidParameter`]; resolve them against the screen size
    /// first.
    pub fn acquire_texture(&mut self, descriptor: &TextureDescriptor) -> BackendResult<GpuObject> {
        if descriptor.size.is_screen_relative() {
            return Err(BackendError::InvalidParameter(format!(
                "texture {:?} has a screen-relative size",
                descriptor.label
            )));
        }
        let key = PoolKey::texture(descriptor, Extent3d::default());
        self.acquire(key, |device| device.create_texture(descriptor))
    }

    /// Acquire an object for a buffer.
    pub fn acquire_buffer(&mut self, descriptor: &BufferDescriptor) -> BackendResult<GpuObject> {
        let key = PoolKey::buffer(descriptor);
        self.acquire(key, |device| device.create_buffer(descriptor))
    }

    fn acquire(
        &mut self,
        key: PoolKey,
        create: impl FnOnce(&dyn GpuDevice) -> BackendResult<GpuObject>,
    ) -> BackendResult<GpuObject> {
        let frame = self.frame;
        let entries = self.buckets.entry(key).or_default();
        if let Some(entry) = entries.iter_mut().find(|entry| !entry.live) {
            entry.live = true;
            entry.last_used_frame = frame;
            self.reused += 1;
            log::trace!("Pool: reusing {:?}", entry.object);
            return Ok(entry.object);
        }

        let object = create(self.device.as_ref())?;
        entries.push(PoolEntry {
            object,
            live: true,
            last_used_frame: frame,
        });
        self.created += 1;
        log::trace!("Pool: created {:?} for {:?}", object, key);
        Ok(object)
    }

    /// Get the pool statistics.
    pub fn stats(&self) -> PoolStats {
        let entries = self.buckets.values().flatten();
        PoolStats {
            created: self.created,
            reused: self.reused,
            evicted: self.evicted,
            entries: entries.clone().count(),
            live: entries.filter(|entry| entry.live).count(),
        }
    }

    /// Release every pooled object.
    pub fn clear(&mut self) {
        for entry in self.buckets.drain().flat_map(|(_, entries)| entries) {
            self.device.release(entry.object);
        }
    }
}

impl Drop for ResourcePool {
    fn drop(&mut self) {
        self.clear();
    }
}

impl std::fmt::Debug for ResourcePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourcePool")
            .field("device", &self.device.name())
            .field("frame", &self.frame)
            .field("stats", &self.stats())
            .finish()
    }
}
