//! Toolstrips: menu bars, toolbars, status bars and popup menus.

use std::fmt;

use horizon_toolstrip_core::WindowHandle;
use slotmap::new_key_type;

use crate::error::CallbackError;
use crate::item::ItemId;
use crate::merge::MergeHistoryRecord;
use crate::shortcut::ShortcutIndex;

new_key_type! {
    /// Handle to a strip in a [`ToolStripRegistry`](crate::registry::ToolStripRegistry).
    pub struct StripId;
}

/// The concrete kind of a strip.
///
/// Kinds form a single-inheritance hierarchy rooted at [`StripKind::ToolStrip`]:
///
/// ```text
/// ToolStrip
/// ├── MenuStrip
/// ├── StatusStrip
/// └── DropDown
///     └── DropDownMenu
///         └── ContextMenu
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StripKind {
    ToolStrip,
    MenuStrip,
    StatusStrip,
    DropDown,
    DropDownMenu,
    ContextMenu,
}

impl StripKind {
    /// The kind this one derives from, `None` for the root.
    pub fn base(self) -> Option<StripKind> {
        match self {
            Self::ToolStrip => None,
            Self::MenuStrip | Self::StatusStrip | Self::DropDown => Some(Self::ToolStrip),
            Self::DropDownMenu => Some(Self::DropDown),
            Self::ContextMenu => Some(Self::DropDownMenu),
        }
    }

    /// Whether a strip of kind `other` can stand in for one of this kind,
    /// i.e. `other` is this kind or derives from it.
    pub fn is_assignable_from(self, other: StripKind) -> bool {
        let mut current = Some(other);
        while let Some(kind) = current {
            if kind == self {
                return true;
            }
            current = kind.base();
        }
        false
    }

    /// Distance from the root of the hierarchy.
    pub fn depth(self) -> usize {
        let mut depth = 0;
        let mut current = self.base();
        while let Some(kind) = current {
            depth += 1;
            current = kind.base();
        }
        depth
    }

    /// Whether strips of this kind are transient popups.
    pub fn is_drop_down(self) -> bool {
        Self::DropDown.is_assignable_from(self)
    }
}

/// Why a drop-down was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CloseReason {
    /// Another application window became active.
    #[default]
    AppFocusChange,
    /// A click landed outside the drop-down.
    AppClicked,
    /// An item was clicked.
    ItemClicked,
    /// Keyboard dismissal.
    Keyboard,
    /// Closed programmatically.
    CloseCalled,
}

/// Callback run before a drop-down hides.
pub type ClosingCallback = Box<dyn FnMut(CloseReason) -> Result<(), CallbackError> + Send>;

/// A menu, toolbar or popup.
pub struct ToolStrip {
    name: String,
    kind: StripKind,
    window: WindowHandle,
    auto_close: bool,
    tab_stop: bool,
    tab_index: i32,
    enabled: bool,
    allow_merge: bool,
    pinned_during_bulk_revert: bool,
    assigned_to_drop_down_item: bool,
    pub(crate) visible: bool,
    pub(crate) items: Vec<ItemId>,
    pub(crate) owner_item: Option<ItemId>,
    pub(crate) keyboard_active: bool,
    pub(crate) text_invalidations: u64,
    pub(crate) close_reason: Option<CloseReason>,
    pub(crate) closing: Vec<ClosingCallback>,
    pub(crate) shortcuts: ShortcutIndex,
    pub(crate) merge_history: Vec<MergeHistoryRecord>,
    pub(crate) disposed: bool,
}

impl ToolStrip {
    /// Create a strip of `kind` backed by `window`.
    ///
    /// Drop-downs start hidden; every other kind starts visible.
    pub fn new(kind: StripKind, window: WindowHandle) -> Self {
        Self {
            name: String::new(),
            kind,
            window,
            auto_close: true,
            tab_stop: false,
            tab_index: 0,
            enabled: true,
            allow_merge: true,
            pinned_during_bulk_revert: false,
            assigned_to_drop_down_item: false,
            visible: !kind.is_drop_down(),
            items: Vec::new(),
            owner_item: None,
            keyboard_active: false,
            text_invalidations: 0,
            close_reason: None,
            closing: Vec::new(),
            shortcuts: ShortcutIndex::new(),
            merge_history: Vec::new(),
            disposed: false,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Whether the drop-down closes itself on outside clicks and focus loss.
    pub fn with_auto_close(mut self, auto_close: bool) -> Self {
        self.auto_close = auto_close;
        self
    }

    pub fn with_tab_stop(mut self, tab_stop: bool) -> Self {
        self.tab_stop = tab_stop;
        self
    }

    pub fn with_tab_index(mut self, tab_index: i32) -> Self {
        self.tab_index = tab_index;
        self
    }

    pub fn with_allow_merge(mut self, allow_merge: bool) -> Self {
        self.allow_merge = allow_merge;
        self
    }

    /// Keep this strip's merges mounted across a plain `revert_merge`.
    pub fn with_pinned_during_bulk_revert(mut self, pinned: bool) -> Self {
        self.pinned_during_bulk_revert = pinned;
        self
    }

    /// Mark a context menu that also serves as an item's drop-down.
    pub fn with_assigned_to_drop_down_item(mut self, assigned: bool) -> Self {
        self.assigned_to_drop_down_item = assigned;
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn kind(&self) -> StripKind {
        self.kind
    }

    pub fn window(&self) -> WindowHandle {
        self.window
    }

    pub fn is_drop_down(&self) -> bool {
        self.kind.is_drop_down()
    }

    pub fn auto_close(&self) -> bool {
        self.auto_close
    }

    pub fn set_auto_close(&mut self, auto_close: bool) {
        self.auto_close = auto_close;
    }

    pub fn tab_stop(&self) -> bool {
        self.tab_stop
    }

    pub fn tab_index(&self) -> i32 {
        self.tab_index
    }

    pub fn set_tab_index(&mut self, tab_index: i32) {
        self.tab_index = tab_index;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn allow_merge(&self) -> bool {
        self.allow_merge
    }

    pub fn set_allow_merge(&mut self, allow_merge: bool) {
        self.allow_merge = allow_merge;
    }

    pub fn pinned_during_bulk_revert(&self) -> bool {
        self.pinned_during_bulk_revert
    }

    pub fn assigned_to_drop_down_item(&self) -> bool {
        self.assigned_to_drop_down_item
    }

    /// Items in display order.
    pub fn items(&self) -> &[ItemId] {
        &self.items
    }

    /// The item whose drop-down this strip is.
    pub fn owner_item(&self) -> Option<ItemId> {
        self.owner_item
    }

    /// Whether the strip currently takes keyboard input in menu mode.
    pub fn is_keyboard_active(&self) -> bool {
        self.keyboard_active
    }

    /// How many times the strip was asked to repaint its item text.
    pub fn text_invalidations(&self) -> u64 {
        self.text_invalidations
    }

    /// The reason recorded by the last close.
    pub fn close_reason(&self) -> Option<CloseReason> {
        self.close_reason
    }

    pub fn shortcuts(&self) -> &ShortcutIndex {
        &self.shortcuts
    }

    /// Merge records, oldest first.
    pub fn merge_history(&self) -> &[MergeHistoryRecord] {
        &self.merge_history
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Register a callback run each time the drop-down is about to hide.
    ///
    /// A [`CallbackError::Fatal`] aborts the close and is returned to the
    /// caller; recoverable errors are logged.
    pub fn on_closing<F>(&mut self, callback: F)
    where
        F: FnMut(CloseReason) -> Result<(), CallbackError> + Send + 'static,
    {
        self.closing.push(Box::new(callback));
    }
}

impl fmt::Debug for ToolStrip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolStrip")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("window", &self.window)
            .field("visible", &self.visible)
            .field("items", &self.items.len())
            .field("owner_item", &self.owner_item)
            .field("closing_callbacks", &self.closing.len())
            .field("merge_history", &self.merge_history.len())
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_hierarchy() {
        assert!(StripKind::ToolStrip.is_assignable_from(StripKind::MenuStrip));
        assert!(StripKind::DropDown.is_assignable_from(StripKind::ContextMenu));
        assert!(!StripKind::MenuStrip.is_assignable_from(StripKind::ToolStrip));
        assert!(!StripKind::MenuStrip.is_assignable_from(StripKind::StatusStrip));
        assert_eq!(StripKind::ContextMenu.depth(), 3);
        assert_eq!(StripKind::ToolStrip.depth(), 0);
    }

    #[test]
    fn test_drop_down_kinds() {
        assert!(StripKind::DropDownMenu.is_drop_down());
        assert!(StripKind::ContextMenu.is_drop_down());
        assert!(!StripKind::MenuStrip.is_drop_down());
    }
}
