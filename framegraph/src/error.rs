//! Frame graph error types.
//!
//! Errors are grouped by the phase that reports them:
//!
//! - [`DeclarationError`] - returned by pass setup and resource import, the pass is not added
//! - [`CompileError`] - returned by [`FrameGraph::compile`](crate::FrameGraph::compile),
//!   the previously compiled plan stays active
//! - [`BackendError`](crate::BackendError) - returned by the GPU binding layer
//! - [`FrameError`] - returned by [`FrameGraph::execute`](crate::FrameGraph::execute)
//!   when a frame could not be recorded

use thiserror::Error;

use crate::backend::BackendError;
use crate::graph::ResourceHandle;

/// Errors detected while declaring passes and resources.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeclarationError {
    #[error("Invalid resource handle {0}")]
    InvalidHandle(ResourceHandle),
    #[error("Stale handle {handle} for resource '{resource}': latest version is {latest}")]
    StaleHandle {
        handle: ResourceHandle,
        resource: String,
        latest: u32,
    },
    #[error("Resource '{0}' has zero size")]
    ZeroSize(String),
    #[error("Invalid binding of resource '{resource}': {reason}")]
    InvalidBinding {
        resource: String,
        reason: &'static str,
    },
    #[error("Pass '{pass}' setup failed: {message}")]
    Setup { pass: String, message: String },
}

impl DeclarationError {
    /// Create a setup error for failures detected by user pass code.
    pub fn setup(pass: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Setup {
            pass: pass.into(),
            message: message.into(),
        }
    }
}

/// Errors detected while compiling the declared graph.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("Pass '{pass}' reads '{resource}' version {version}, which no pass produces")]
    UnresolvedRead {
        pass: String,
        resource: String,
        version: u32,
    },
    #[error("Output '{resource}' version {version} is not produced by any pass")]
    UnresolvedOutput { resource: String, version: u32 },
    #[error("Cyclic dependency between passes: {}", .passes.join(", "))]
    CyclicDependency { passes: Vec<String> },
    #[error(
        "Pass '{writer}' overwrites '{resource}' version {version} used by pass '{user}', \
         which depends on '{writer}'"
    )]
    HazardConflict {
        user: String,
        writer: String,
        resource: String,
        version: u32,
    },
}

/// Errors that prevent a frame from being recorded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("Frame skipped, graph is not compiled: {0}")]
    NotCompiled(#[source] CompileError),
    #[error("Failed to allocate resource '{resource}': {source}")]
    AllocationFailed {
        resource: String,
        #[source]
        source: BackendError,
    },
}
