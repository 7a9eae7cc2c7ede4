//! Toolstrip items.
//!
//! An item lives in at most one strip's item collection at a time; moving it
//! into another collection detaches it from the first. Items that open a
//! submenu carry the [`StripId`] of their drop-down strip.

use horizon_toolstrip_core::{Rect, Signal};
use slotmap::new_key_type;

use crate::keys::Keys;
use crate::strip::StripId;

new_key_type! {
    /// Handle to an item in a [`ToolStripRegistry`](crate::registry::ToolStripRegistry).
    pub struct ItemId;
}

/// How an item is spliced into a target collection during a merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MergeAction {
    /// Add the item to the end of the target collection.
    #[default]
    Append,
    /// Insert the item at its merge index.
    Insert,
    /// Replace the matching target item with this one.
    Replace,
    /// Remove the matching target item.
    Remove,
    /// Use the matching target item as a container and merge children into it.
    MatchOnly,
}

/// A menu or toolbar item.
#[derive(Debug)]
pub struct ToolStripItem {
    text: String,
    name: String,
    merge_action: MergeAction,
    merge_index: Option<usize>,
    shortcut: Option<Keys>,
    enabled: bool,
    visible: bool,
    can_select: bool,
    drop_down_button_area: Rect,
    pub(crate) selected: bool,
    pub(crate) owner: Option<StripId>,
    pub(crate) drop_down: Option<StripId>,
    /// Emitted when the item is invoked through its shortcut.
    pub triggered: Signal<ItemId>,
}

impl ToolStripItem {
    /// Create an enabled, visible, selectable item with the given text.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            name: String::new(),
            merge_action: MergeAction::default(),
            merge_index: None,
            shortcut: None,
            enabled: true,
            visible: true,
            can_select: true,
            drop_down_button_area: Rect::ZERO,
            selected: false,
            owner: None,
            drop_down: None,
            triggered: Signal::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_merge_action(mut self, action: MergeAction) -> Self {
        self.merge_action = action;
        self
    }

    pub fn with_merge_index(mut self, index: usize) -> Self {
        self.merge_index = Some(index);
        self
    }

    /// Set the shortcut. Only effective once the item is registered; the
    /// registry indexes it when the item joins a collection.
    pub fn with_shortcut(mut self, shortcut: Keys) -> Self {
        self.shortcut = Some(shortcut);
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_can_select(mut self, can_select: bool) -> Self {
        self.can_select = can_select;
        self
    }

    /// Region of the owning strip (in its client coordinates) that toggles
    /// this item's drop-down.
    pub fn with_drop_down_button_area(mut self, area: Rect) -> Self {
        self.drop_down_button_area = area;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn merge_action(&self) -> MergeAction {
        self.merge_action
    }

    pub fn set_merge_action(&mut self, action: MergeAction) {
        self.merge_action = action;
    }

    /// Declared merge position, `None` when undeclared.
    pub fn merge_index(&self) -> Option<usize> {
        self.merge_index
    }

    pub fn set_merge_index(&mut self, index: Option<usize>) {
        self.merge_index = index;
    }

    pub fn shortcut(&self) -> Option<Keys> {
        self.shortcut
    }

    pub(crate) fn replace_shortcut(&mut self, shortcut: Option<Keys>) -> Option<Keys> {
        std::mem::replace(&mut self.shortcut, shortcut)
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

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Whether keyboard navigation may land on this item.
    pub fn can_select(&self) -> bool {
        self.can_select && self.enabled && self.visible
    }

    pub fn set_can_select(&mut self, can_select: bool) {
        self.can_select = can_select;
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn drop_down_button_area(&self) -> Rect {
        self.drop_down_button_area
    }

    pub fn set_drop_down_button_area(&mut self, area: Rect) {
        self.drop_down_button_area = area;
    }

    /// The strip whose collection currently holds this item.
    pub fn owner(&self) -> Option<StripId> {
        self.owner
    }

    /// The submenu opened by this item, if it is a container.
    pub fn drop_down(&self) -> Option<StripId> {
        self.drop_down
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::Key;

    #[test]
    fn test_item_defaults() {
        let item = ToolStripItem::new("&File");
        assert_eq!(item.text(), "&File");
        assert_eq!(item.merge_action(), MergeAction::Append);
        assert_eq!(item.merge_index(), None);
        assert!(item.can_select());
        assert!(item.owner().is_none());
        assert!(item.drop_down().is_none());
    }

    #[test]
    fn test_can_select_requires_enabled() {
        let item = ToolStripItem::new("Save")
            .with_shortcut(Keys::ctrl(Key::S))
            .with_enabled(false);
        assert!(!item.can_select());
        assert_eq!(item.shortcut(), Some(Keys::ctrl(Key::S)));
    }
}
