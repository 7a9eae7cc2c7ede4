//! Logging and tracing facilities for Horizon Toolstrip.
//!
//! Horizon Toolstrip uses the `tracing` crate for instrumentation. Nothing is
//! printed unless the application installs a subscriber:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt()
//!         .with_max_level(tracing::Level::DEBUG)
//!         .init();
//!
//!     // Your application code...
//! }
//! ```
//!
//! Menu-mode transitions log at `debug`, per-message routing decisions at
//! `trace`. Filter on the constants in [`targets`] to isolate one subsystem,
//! e.g. `RUST_LOG=horizon_toolstrip::menu_mode=trace`.

/// Operation names recorded by [`PerfSpan`].
pub mod span_names {
    /// Message dispatch through the thread loop.
    pub const DISPATCH: &str = "horizon_toolstrip::dispatch";
    /// Toolstrip merge.
    pub const MERGE: &str = "horizon_toolstrip::merge";
    /// Toolstrip merge revert.
    pub const REVERT_MERGE: &str = "horizon_toolstrip::revert_merge";
    /// Shortcut routing.
    pub const SHORTCUT: &str = "horizon_toolstrip::shortcut";
}

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core framework target.
    pub const CORE: &str = "horizon_toolstrip_core";
    /// Thread message loop target.
    pub const MESSAGE_LOOP: &str = "horizon_toolstrip_core::message_loop";
    /// Timer system target.
    pub const TIMER: &str = "horizon_toolstrip_core::timer";
    /// Signal system target.
    pub const SIGNAL: &str = "horizon_toolstrip_core::signal";
    /// Menu-mode router target.
    pub const MENU_MODE: &str = "horizon_toolstrip::menu_mode";
    /// Merge engine target.
    pub const MERGE: &str = "horizon_toolstrip::merge";
    /// Shortcut routing target.
    pub const SHORTCUT: &str = "horizon_toolstrip::shortcut";
    /// Renderer selection target.
    pub const RENDERER: &str = "horizon_toolstrip::renderer";
    /// [`PerfSpan`](super::PerfSpan) target.
    pub const PERF: &str = "horizon_toolstrip::perf";
}

/// A guard that keeps a tracing span entered until dropped.
///
/// This is useful for tracking the duration of operations.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    ///
    /// The span will be active until the guard is dropped.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: targets::PERF, "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perf_span() {
        // Just ensure it compiles and doesn't panic
        let _span = PerfSpan::new(span_names::MERGE);
    }

    #[test]
    fn test_targets_share_crate_prefix() {
        assert!(targets::MESSAGE_LOOP.starts_with(targets::CORE));
        assert!(targets::TIMER.starts_with(targets::CORE));
        assert!(targets::MENU_MODE.starts_with("horizon_toolstrip::"));
    }
}
