//! Profiling support via Tracy.
//!
//! Profiling is enabled with the `profiling` Cargo feature:
//!
//! ```toml
//! [dependencies]
//! redlilium-framegraph = { version = "0.1", features = ["profiling"] }
//! ```
//!
//! The frame graph instruments compilation, allocation and every executed pass.
//! Callers can use the same macros for their own pass callbacks:
//!
//! ```ignore
//! use redlilium_framegraph::{profile_function, profile_scope};
//!
//! fn record_shadows() {
//!     profile_function!();
//!
//!     {
//!         profile_scope!("cascade_0");
//!         // ...
//!     }
//! }
//! ```
//!
//! When profiling is disabled (the default), all macros compile to no-ops.

#[cfg(feature = "profiling")]
pub use tracy_client::{self, Client, Span, frame_mark as tracy_frame_mark, span};

/// Mark the end of a frame for Tracy's frame analysis.
#[macro_export]
#[cfg(feature = "profiling")]
macro_rules! frame_mark {
    () => {
        $crate::profiling::tracy_frame_mark()
    };
}

/// Mark the end of a frame (no-op when profiling disabled).
#[macro_export]
#[cfg(not(feature = "profiling"))]
macro_rules! frame_mark {
    () => {};
}

/// Create a profiling span for the current scope.
///
/// `$name` must be a string literal. Use [`profile_pass!`] for names only
/// known at runtime.
#[macro_export]
#[cfg(feature = "profiling")]
macro_rules! profile_scope {
    ($name:expr) => {
        let _profile_span = $crate::profiling::span!($name);
    };
}

/// Create a profiling span (no-op when profiling disabled).
#[macro_export]
#[cfg(not(feature = "profiling"))]
macro_rules! profile_scope {
    ($name:expr) => {};
}

/// Create a profiling span for the entire function.
#[macro_export]
#[cfg(feature = "profiling")]
macro_rules! profile_function {
    () => {
        let _profile_span = $crate::profiling::span!();
    };
}

/// Create a profiling span for function (no-op when profiling disabled).
#[macro_export]
#[cfg(not(feature = "profiling"))]
macro_rules! profile_function {
    () => {};
}

/// Create a profiling span with a runtime name, such as a pass name.
#[macro_export]
#[cfg(feature = "profiling")]
macro_rules! profile_pass {
    ($name:expr) => {
        let _profile_span = $crate::profiling::Client::running()
            .map(|client| client.span_alloc(Some($name), "", file!(), line!(), 0));
    };
}

/// Create a runtime-named span (no-op when profiling disabled).
#[macro_export]
#[cfg(not(feature = "profiling"))]
macro_rules! profile_pass {
    ($name:expr) => {
        let _ = &$name;
    };
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_macros_compile() {
        let name = String::from("dynamic_pass");
        frame_mark!();
        profile_scope!("test_scope");
        profile_function!();
        profile_pass!(name.as_str());
    }
}
