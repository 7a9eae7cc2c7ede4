//! Error types for the toolstrip manager.

use horizon_toolstrip_core::HostError;

use crate::item::ItemId;
use crate::strip::StripId;

/// Result type alias for toolstrip operations.
pub type Result<T> = std::result::Result<T, ToolStripError>;

/// Errors raised by toolstrip operations.
///
/// Handle errors are checked before anything is mutated, so a failed call
/// leaves the registry untouched.
#[derive(Debug, thiserror::Error)]
pub enum ToolStripError {
    /// The strip handle is stale or was never registered.
    #[error("invalid toolstrip handle {0:?}")]
    InvalidStrip(StripId),

    /// The item handle is stale or was never registered.
    #[error("invalid toolstrip item handle {0:?}")]
    InvalidItem(ItemId),

    /// Linking `item` to `drop_down` would make a submenu open one of its
    /// own ancestors.
    #[error("drop-down {drop_down:?} is already an ancestor of item {item:?}")]
    DropDownCycle { item: ItemId, drop_down: StripId },

    /// Merge or revert was asked to splice a strip into itself.
    #[error("merge target identical to source")]
    MergeTargetIdenticalToSource,

    /// An integer that names no render mode.
    #[error("invalid render mode value {0}")]
    InvalidRenderMode(i32),

    /// `Custom` cannot be selected directly; set a renderer instead.
    #[error("render mode Custom cannot be set directly, assign a renderer instead")]
    CustomRenderModeNotSupported,

    /// A closing callback failed with a fatal error.
    #[error("closing callback failed: {0}")]
    Callback(#[source] CallbackError),

    /// Host event-loop failure.
    #[error(transparent)]
    Host(#[from] HostError),
}

/// Error returned by a dropdown's closing callback.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CallbackError {
    /// Logged and swallowed; the dropdown still closes.
    #[error("recoverable callback failure: {0}")]
    Recoverable(String),
    /// Propagated to the caller of the closing operation.
    #[error("fatal callback failure: {0}")]
    Fatal(String),
}

impl CallbackError {
    /// Create a recoverable error.
    pub fn recoverable(message: impl Into<String>) -> Self {
        Self::Recoverable(message.into())
    }

    /// Create a fatal error.
    pub fn fatal(message: impl Into<String>) -> Self {
        Self::Fatal(message.into())
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal(_))
    }
}
