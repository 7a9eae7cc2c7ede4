//! Error types for Horizon Toolstrip core.

use std::fmt;

use crate::host::InterceptBackend;
use crate::window::WindowHandle;

/// The main error type for host and message-loop operations.
#[derive(Debug)]
pub enum HostError {
    /// The requested interception backend cannot be installed on this thread.
    BackendUnavailable(InterceptBackend),
    /// The subscription ID is invalid or has already been removed.
    InvalidSubscription,
    /// Timer-related error.
    Timer(TimerError),
    /// Window-related error.
    Window(WindowError),
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BackendUnavailable(backend) => {
                write!(f, "Message interception backend unavailable: {backend:?}")
            }
            Self::InvalidSubscription => write!(f, "Invalid or removed subscription ID"),
            Self::Timer(err) => write!(f, "Timer error: {err}"),
            Self::Window(err) => write!(f, "Window error: {err}"),
        }
    }
}

impl std::error::Error for HostError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Timer(err) => Some(err),
            Self::Window(err) => Some(err),
            _ => None,
        }
    }
}

/// Timer-specific errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerError {
    /// The timer ID is invalid or has already been removed.
    InvalidTimerId,
}

impl fmt::Display for TimerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTimerId => write!(f, "Invalid or expired timer ID"),
        }
    }
}

impl std::error::Error for TimerError {}

/// Window-tree errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowError {
    /// The window handle does not refer to a live window.
    InvalidWindow(WindowHandle),
    /// Re-parenting would make a window its own ancestor.
    ParentCycle(WindowHandle),
}

impl fmt::Display for WindowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidWindow(handle) => write!(f, "Invalid window handle {handle:?}"),
            Self::ParentCycle(handle) => {
                write!(f, "Window {handle:?} cannot be parented beneath itself")
            }
        }
    }
}

impl std::error::Error for WindowError {}

impl From<TimerError> for HostError {
    fn from(err: TimerError) -> Self {
        Self::Timer(err)
    }
}

impl From<WindowError> for HostError {
    fn from(err: WindowError) -> Self {
        Self::Window(err)
    }
}

/// A specialized Result type for Horizon Toolstrip core operations.
pub type Result<T> = std::result::Result<T, HostError>;
