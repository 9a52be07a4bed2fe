//! Dummy GPU device and recording command list.
//!
//! These don't perform GPU operations but provide valid implementations of
//! the binding layer for testing the frame graph without GPU hardware.

use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use crate::types::{BufferDescriptor, ClearValue, ScissorRect, TextureDescriptor, Viewport};

use super::{Barrier, BackendError, BackendResult, CommandRecorder, GpuDevice, GpuObject};

/// Dummy GPU device.
///
/// Hands out increasing object ids and counts creations and releases.
/// Failures can be injected per label or for every request.
#[derive(Debug, Default)]
pub struct DummyDevice {
    next_object: AtomicU64,
    textures_created: AtomicUsize,
    buffers_created: AtomicUsize,
    released: AtomicUsize,
    fail_all: AtomicBool,
    failing_labels: Mutex<HashSet<String>>,
}

impl DummyDevice {
    /// Create a new dummy device.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of textures created so far.
    pub fn textures_created(&self) -> usize {
        self.textures_created.load(Ordering::Relaxed)
    }

    /// Number of buffers created so far.
    pub fn buffers_created(&self) -> usize {
        self.buffers_created.load(Ordering::Relaxed)
    }

    /// Number of objects created so far.
    pub fn objects_created(&self) -> usize {
        self.textures_created() + self.buffers_created()
    }

    /// Number of objects released so far.
    pub fn objects_released(&self) -> usize {
        self.released.load(Ordering::Relaxed)
    }

    /// Number of created objects not yet released.
    pub fn live_objects(&self) -> usize {
        self.objects_created() - self.objects_released()
    }

    /// Make every creation fail with [`BackendError::OutOfMemory`].
    pub fn set_fail_all(&self, fail: bool) {
        self.fail_all.store(fail, Ordering::Relaxed);
    }

    /// Make creation of objects with the given label fail.
    pub fn fail_label(&self, label: impl Into<String>) {
        self.failing_labels
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(label.into());
    }

    /// Stop injecting failures.
    pub fn clear_failures(&self) {
        self.set_fail_all(false);
        self.failing_labels
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }

    fn should_fail(&self, label: Option<&str>) -> bool {
        if self.fail_all.load(Ordering::Relaxed) {
            return true;
        }
        label.is_some_and(|label| {
            self.failing_labels
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .contains(label)
        })
    }

    fn next_object(&self) -> GpuObject {
        GpuObject::from_raw(self.next_object.fetch_add(1, Ordering::Relaxed) + 1)
    }
}

impl GpuDevice for DummyDevice {
    fn name(&self) -> &str {
        "Dummy"
    }

    fn create_texture(&self, descriptor: &TextureDescriptor) -> BackendResult<GpuObject> {
        if self.should_fail(descriptor.label.as_deref()) {
            return Err(BackendError::OutOfMemory);
        }
        let object = self.next_object();
        self.textures_created.fetch_add(1, Ordering::Relaxed);
        log::trace!(
            "DummyDevice: created texture {:?} as {:?} ({:?})",
            descriptor.label,
            object,
            descriptor.size
        );
        Ok(object)
    }

    fn create_buffer(&self, descriptor: &BufferDescriptor) -> BackendResult<GpuObject> {
        if self.should_fail(descriptor.label.as_deref()) {
            return Err(BackendError::OutOfMemory);
        }
        let object = self.next_object();
        self.buffers_created.fetch_add(1, Ordering::Relaxed);
        log::trace!(
            "DummyDevice: created buffer {:?} as {:?} (size: {})",
            descriptor.label,
            object,
            descriptor.size
        );
        Ok(object)
    }

    fn release(&self, object: GpuObject) {
        log::trace!("DummyDevice: released {:?}", object);
        self.released.fetch_add(1, Ordering::Relaxed);
    }
}

/// A command recorded by [`RecordingCommandList`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCommand {
    BeginScope(String),
    EndScope,
    Barriers(Vec<Barrier>),
    ClearTexture(GpuObject, ClearValue),
    SetViewport(Viewport),
    SetScissor(ScissorRect),
    BindPipeline(u64),
    Draw {
        vertex_count: u32,
        instance_count: u32,
    },
    Dispatch(u32, u32, u32),
    Copy {
        src: GpuObject,
        dst: GpuObject,
    },
}

/// Command recorder that stores every command in order.
#[derive(Debug, Default)]
pub struct RecordingCommandList {
    commands: Vec<RecordedCommand>,
}

impl RecordingCommandList {
    /// Create an empty command list.
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded commands.
    pub fn commands(&self) -> &[RecordedCommand] {
        &self.commands
    }

    /// Names of the opened scopes, in recording order.
    pub fn scopes(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                RecordedCommand::BeginScope(name) => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Barrier batches, in recording order.
    pub fn barrier_batches(&self) -> Vec<&[Barrier]> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                RecordedCommand::Barriers(batch) => Some(batch.as_slice()),
                _ => None,
            })
            .collect()
    }

    /// Commands recorded inside the first scope with the given name.
    pub fn scope_commands(&self, name: &str) -> &[RecordedCommand] {
        let start = self
            .commands
            .iter()
            .position(|command| matches!(command, RecordedCommand::BeginScope(n) if n == name));
        let Some(start) = start else {
            return &[];
        };
        let len = self.commands[start + 1..]
            .iter()
            .position(|command| matches!(command, RecordedCommand::EndScope))
            .unwrap_or(self.commands.len() - start - 1);
        &self.commands[start + 1..start + 1 + len]
    }

    /// Check if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Remove every recorded command.
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    fn push(&mut self, command: RecordedCommand) {
        log::trace!("RecordingCommandList: {:?}", command);
        self.commands.push(command);
    }
}

impl CommandRecorder for RecordingCommandList {
    fn begin_scope(&mut self, name: &str) {
        self.push(RecordedCommand::BeginScope(name.to_string()));
    }

    fn end_scope(&mut self) {
        self.push(RecordedCommand::EndScope);
    }

    fn resource_barriers(&mut self, barriers: &[Barrier]) {
        self.push(RecordedCommand::Barriers(barriers.to_vec()));
    }

    fn clear_texture(&mut self, texture: GpuObject, value: ClearValue) {
        self.push(RecordedCommand::ClearTexture(texture, value));
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.push(RecordedCommand::SetViewport(viewport));
    }

    fn set_scissor(&mut self, scissor: ScissorRect) {
        self.push(RecordedCommand::SetScissor(scissor));
    }

    fn bind_pipeline(&mut self, pipeline: u64) {
        self.push(RecordedCommand::BindPipeline(pipeline));
    }

    fn draw(&mut self, vertex_count: u32, instance_count: u32) {
        self.push(RecordedCommand::Draw {
            vertex_count,
            instance_count,
        });
    }

    fn dispatch(&mut self, x: u32, y: u32, z: u32) {
        self.push(RecordedCommand::Dispatch(x, y, z));
    }

    fn copy(&mut self, src: GpuObject, dst: GpuObject) {
        self.push(RecordedCommand::Copy { src, dst });
    }
}

static_assertions::assert_impl_all!(DummyDevice: Send, Sync);
static_assertions::assert_impl_all!(RecordingCommandList: Send, Sync);
