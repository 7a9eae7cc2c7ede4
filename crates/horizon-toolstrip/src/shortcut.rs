//! Shortcut lookup and routing.
//!
//! Every strip keeps a [`ShortcutIndex`] of the items in its own collection.
//! [`ToolStripRegistry::process_shortcut`] walks the focused window's context
//! menus first, then every registered strip, invoking at most one item.

use std::collections::HashMap;

use horizon_toolstrip_core::logging::{span_names, targets};
use horizon_toolstrip_core::{PerfSpan, WindowHandle, WindowTree};

use crate::item::ItemId;
use crate::keys::{Keys, is_valid_shortcut};
use crate::registry::ToolStripRegistry;

/// Key combination to item map for one strip.
#[derive(Debug, Clone, Default)]
pub struct ShortcutIndex {
    map: HashMap<Keys, ItemId>,
}

impl ShortcutIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `keys` to `item`. A later binding of the same keys wins.
    pub fn insert(&mut self, keys: Keys, item: ItemId) {
        self.map.insert(keys, item);
    }

    /// Unbind `keys` if it still points at `item`.
    pub fn remove(&mut self, keys: Keys, item: ItemId) -> bool {
        if self.map.get(&keys) == Some(&item) {
            self.map.remove(&keys);
            true
        } else {
            false
        }
    }

    pub fn get(&self, keys: Keys) -> Option<ItemId> {
        self.map.get(&keys).copied()
    }

    pub fn contains(&self, keys: Keys) -> bool {
        self.map.contains_key(&keys)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl ToolStripRegistry {
    /// Whether any live strip binds `keys`.
    pub fn is_shortcut_defined(&self, keys: Keys) -> bool {
        self.live_strips()
            .any(|id| self.strip(id).is_some_and(|s| s.shortcuts.contains(keys)))
    }

    /// Run the item bound to `keys` in strip `strip`, if any.
    fn invoke_bound(&mut self, strip: crate::strip::StripId, keys: Keys) -> bool {
        let Some(item) = self.strip(strip).and_then(|s| s.shortcuts.get(keys)) else {
            return false;
        };
        self.invoke_shortcut(item, keys)
    }

    /// Route `keys` to the item that should handle it.
    ///
    /// `active_control` is the window with input focus. Context menus
    /// assigned to it and its ancestors are tried first. Then every
    /// registered strip is scanned in registration order; a strip only
    /// qualifies when it shares the focused window's root window (for MDI
    /// containers, when it lives on the main form or the active child), or
    /// when it is the focused window's own context menu, or a context menu
    /// that doubles as an item drop-down. The first successful invocation
    /// stops the scan.
    #[tracing::instrument(skip(self, windows), target = "horizon_toolstrip::shortcut", level = "trace")]
    pub fn process_shortcut(
        &mut self,
        windows: &WindowTree,
        active_control: Option<WindowHandle>,
        keys: Keys,
    ) -> bool {
        if !is_valid_shortcut(keys) {
            return false;
        }
        let Some(active_control) = active_control else {
            return false;
        };
        let _perf = PerfSpan::new(span_names::SHORTCUT);

        let mut current = Some(active_control);
        while let Some(window) = current {
            if let Some(menu) = self.context_menu_of(window)
                && !self.is_disposed(menu)
                && self.invoke_bound(menu, keys)
            {
                tracing::debug!(target: targets::SHORTCUT, %keys, "handled by context menu");
                return true;
            }
            current = windows.parent(window);
        }

        let own_context_menu = self.context_menu_of(active_control);
        let mut needs_prune = false;
        let mut handled = false;

        // Snapshot; invoked slots may register strips.
        let order: Vec<_> = self.order().to_vec();
        for id in order {
            let Some(strip) = self.strip(id) else {
                needs_prune = true;
                continue;
            };
            if strip.is_disposed() {
                needs_prune = true;
                continue;
            }
            if Some(id) == own_context_menu || !strip.shortcuts.contains(keys) {
                continue;
            }

            let mut associated = false;
            let mut doubly_assigned = false;
            if strip.is_drop_down()
                && let Some(first) = self.first_drop_down(id)
                && let Some(first_strip) = self.strip(first)
                && first_strip.kind() == crate::strip::StripKind::ContextMenu
            {
                doubly_assigned = first_strip.assigned_to_drop_down_item();
                if !doubly_assigned {
                    if Some(first) != own_context_menu {
                        continue;
                    }
                    associated = true;
                }
            }

            let mut roots_match = false;
            if !associated
                && let Some(toplevel) = self.toplevel_owner(id)
                && let Some(toplevel_strip) = self.strip(toplevel)
            {
                let strip_root = windows.root(toplevel_strip.window());
                let control_root = windows.root(active_control);
                roots_match = strip_root.is_some() && strip_root == control_root;
                if roots_match
                    && let Some(main_form) = control_root
                    && windows.is_mdi_container(main_form)
                    && let Some(strip_form) = windows.find_form(toplevel_strip.window())
                    && strip_form != main_form
                {
                    roots_match = windows.active_mdi_child(main_form) == Some(strip_form);
                }
            }

            if (associated || roots_match || doubly_assigned) && self.invoke_bound(id, keys) {
                tracing::debug!(target: targets::SHORTCUT, %keys, strip = ?id, "shortcut handled");
                handled = true;
                break;
            }
        }

        if needs_prune {
            self.prune();
        }
        handled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::Key;
    use slotmap::SlotMap;

    #[test]
    fn test_index_last_writer_wins() {
        let mut items: SlotMap<ItemId, ()> = SlotMap::with_key();
        let first = items.insert(());
        let second = items.insert(());
        let mut index = ShortcutIndex::new();
        index.insert(Keys::ctrl(Key::S), first);
        index.insert(Keys::ctrl(Key::S), second);
        assert_eq!(index.get(Keys::ctrl(Key::S)), Some(second));

        // Removing a stale binding leaves the current one alone.
        assert!(!index.remove(Keys::ctrl(Key::S), first));
        assert!(index.remove(Keys::ctrl(Key::S), second));
        assert!(index.is_empty());
    }
}
