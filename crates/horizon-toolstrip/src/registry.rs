//! The live-strip registry.
//!
//! Strips and items live in slotmap arenas owned by [`ToolStripRegistry`].
//! The registry remembers registration order (the enumeration order for
//! shortcut routing and Ctrl+Tab navigation), indexes strips by window, and
//! keeps every strip's shortcut index in step with its item collection.
//!
//! Disposal is two-phase: [`dispose`](ToolStripRegistry::dispose) marks a
//! strip dead and [`prune`](ToolStripRegistry::prune) drops it together with
//! the items it holds. Enumerations skip disposed strips and prune on the
//! way out.

use std::collections::HashMap;

use horizon_toolstrip_core::logging::targets;
use horizon_toolstrip_core::{WindowHandle, WindowTree};
use slotmap::SlotMap;

use crate::error::{CallbackError, Result, ToolStripError};
use crate::item::{ItemId, ToolStripItem};
use crate::keys::Keys;
use crate::strip::{CloseReason, StripId, StripKind, ToolStrip};

/// Arena of strips and items.
#[derive(Debug, Default)]
pub struct ToolStripRegistry {
    strips: SlotMap<StripId, ToolStrip>,
    items: SlotMap<ItemId, ToolStripItem>,
    order: Vec<StripId>,
    by_window: HashMap<WindowHandle, StripId>,
    context_menus: HashMap<WindowHandle, StripId>,
    main_menus: HashMap<WindowHandle, StripId>,
}

impl ToolStripRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Register a strip. Its items are added afterwards with
    /// [`add_item`](Self::add_item).
    pub fn register(&mut self, strip: ToolStrip) -> StripId {
        let window = strip.window();
        let id = self.strips.insert(strip);
        self.order.push(id);
        self.by_window.insert(window, id);
        tracing::debug!(target: targets::CORE, strip = ?id, ?window, "registered strip");
        id
    }

    /// Create an item that belongs to no collection yet.
    pub fn create_item(&mut self, item: ToolStripItem) -> ItemId {
        self.items.insert(item)
    }

    /// Mark a strip disposed. It stays addressable until the next prune.
    pub fn dispose(&mut self, id: StripId) -> Result<()> {
        let strip = self.try_strip_mut(id)?;
        strip.disposed = true;
        strip.visible = false;
        tracing::debug!(target: targets::CORE, strip = ?id, "disposed strip");
        Ok(())
    }

    /// Drop disposed strips, the items they hold, and every link to them.
    pub fn prune(&mut self) {
        let dead: Vec<StripId> = self
            .strips
            .iter()
            .filter(|(_, s)| s.disposed)
            .map(|(id, _)| id)
            .collect();
        if dead.is_empty() {
            return;
        }

        for id in &dead {
            if let Some(strip) = self.strips.remove(*id) {
                for item in &strip.items {
                    self.items.remove(*item);
                }
                if self.by_window.get(&strip.window()) == Some(id) {
                    self.by_window.remove(&strip.window());
                }
            }
        }
        self.order.retain(|id| !dead.contains(id));
        self.context_menus.retain(|_, menu| !dead.contains(menu));
        self.main_menus.retain(|_, menu| !dead.contains(menu));

        for item in self.items.values_mut() {
            if item.drop_down.is_some_and(|d| dead.contains(&d)) {
                item.drop_down = None;
            }
            if item.owner.is_some_and(|o| dead.contains(&o)) {
                item.owner = None;
            }
        }
        let items = &self.items;
        for strip in self.strips.values_mut() {
            if strip.owner_item.is_some_and(|i| !items.contains_key(i)) {
                strip.owner_item = None;
            }
        }
        tracing::debug!(target: targets::CORE, pruned = dead.len(), "pruned disposed strips");
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    pub fn strip(&self, id: StripId) -> Option<&ToolStrip> {
        self.strips.get(id)
    }

    pub fn strip_mut(&mut self, id: StripId) -> Option<&mut ToolStrip> {
        self.strips.get_mut(id)
    }

    pub fn item(&self, id: ItemId) -> Option<&ToolStripItem> {
        self.items.get(id)
    }

    pub fn item_mut(&mut self, id: ItemId) -> Option<&mut ToolStripItem> {
        self.items.get_mut(id)
    }

    pub fn try_strip(&self, id: StripId) -> Result<&ToolStrip> {
        self.strips.get(id).ok_or(ToolStripError::InvalidStrip(id))
    }

    pub fn try_strip_mut(&mut self, id: StripId) -> Result<&mut ToolStrip> {
        self.strips.get_mut(id).ok_or(ToolStripError::InvalidStrip(id))
    }

    pub fn try_item(&self, id: ItemId) -> Result<&ToolStripItem> {
        self.items.get(id).ok_or(ToolStripError::InvalidItem(id))
    }

    pub fn try_item_mut(&mut self, id: ItemId) -> Result<&mut ToolStripItem> {
        self.items.get_mut(id).ok_or(ToolStripError::InvalidItem(id))
    }

    /// Whether the strip is disposed or gone.
    pub fn is_disposed(&self, id: StripId) -> bool {
        self.strips.get(id).is_none_or(|s| s.disposed)
    }

    pub fn is_drop_down(&self, id: StripId) -> bool {
        self.strips.get(id).is_some_and(|s| s.is_drop_down())
    }

    /// Registration order, disposed strips included until pruned.
    pub fn order(&self) -> &[StripId] {
        &self.order
    }

    /// Strips that are not disposed, in registration order.
    pub fn live_strips(&self) -> impl Iterator<Item = StripId> + '_ {
        self.order.iter().copied().filter(|id| !self.is_disposed(*id))
    }

    pub fn strip_count(&self) -> usize {
        self.strips.len()
    }

    /// The strip backed exactly by `window`.
    pub fn strip_by_window(&self, window: WindowHandle) -> Option<StripId> {
        self.by_window.get(&window).copied()
    }

    /// The strip backed by `window` or by its nearest ancestor that backs one.
    pub fn strip_for_window(&self, windows: &WindowTree, window: WindowHandle) -> Option<StripId> {
        let mut current = Some(window);
        while let Some(w) = current {
            if let Some(id) = self.strip_by_window(w) {
                return Some(id);
            }
            current = windows.parent(w);
        }
        None
    }

    /// First live strip with exactly this name.
    pub fn find_by_name(&self, name: &str) -> Option<StripId> {
        self.live_strips()
            .find(|id| self.strip(*id).is_some_and(|s| s.name() == name))
    }

    // =========================================================================
    // Item collections
    // =========================================================================

    /// Items of a strip in display order; empty for unknown strips.
    pub fn items(&self, strip: StripId) -> &[ItemId] {
        self.strips.get(strip).map(|s| s.items.as_slice()).unwrap_or_default()
    }

    pub fn item_count(&self, strip: StripId) -> usize {
        self.items(strip).len()
    }

    pub fn index_of(&self, strip: StripId, item: ItemId) -> Option<usize> {
        self.items(strip).iter().position(|i| *i == item)
    }

    /// Insert `item` into `strip` at `index`, clamped to the collection size.
    ///
    /// The item leaves its previous collection first. Returns the index it
    /// landed at. Fails without moving anything if `item` opens `strip` or
    /// one of its ancestors.
    pub fn insert_item(&mut self, strip: StripId, index: usize, item: ItemId) -> Result<usize> {
        self.try_strip(strip)?;
        if let Some(drop_down) = self.try_item(item)?.drop_down
            && self.lineage_contains(strip, drop_down)
        {
            return Err(ToolStripError::DropDownCycle { item, drop_down });
        }
        self.detach(item);

        let shortcut = self.items.get(item).and_then(|i| i.shortcut());
        let Some(target) = self.strips.get_mut(strip) else {
            return Err(ToolStripError::InvalidStrip(strip));
        };
        let index = index.min(target.items.len());
        target.items.insert(index, item);
        if let Some(keys) = shortcut {
            target.shortcuts.insert(keys, item);
        }
        if let Some(it) = self.items.get_mut(item) {
            it.owner = Some(strip);
        }
        Ok(index)
    }

    /// Append `item` to `strip`.
    pub fn add_item(&mut self, strip: StripId, item: ItemId) -> Result<usize> {
        self.insert_item(strip, usize::MAX, item)
    }

    /// Take `item` out of its collection. Returns where it was.
    pub fn remove_item(&mut self, item: ItemId) -> Result<Option<(StripId, usize)>> {
        self.try_item(item)?;
        Ok(self.detach(item))
    }

    fn detach(&mut self, item: ItemId) -> Option<(StripId, usize)> {
        let it = self.items.get_mut(item)?;
        let owner = it.owner.take()?;
        let shortcut = it.shortcut();
        let strip = self.strips.get_mut(owner)?;
        let index = strip.items.iter().position(|i| *i == item)?;
        strip.items.remove(index);
        if let Some(keys) = shortcut {
            strip.shortcuts.remove(keys, item);
        }
        Some((owner, index))
    }

    /// Change an item's shortcut, keeping its owner's index current.
    pub fn set_item_shortcut(&mut self, item: ItemId, shortcut: Option<Keys>) -> Result<()> {
        let it = self.try_item_mut(item)?;
        let previous = it.replace_shortcut(shortcut);
        if let Some(owner) = it.owner
            && let Some(strip) = self.strips.get_mut(owner)
        {
            if let Some(keys) = previous {
                strip.shortcuts.remove(keys, item);
            }
            if let Some(keys) = shortcut {
                strip.shortcuts.insert(keys, item);
            }
        }
        Ok(())
    }

    // =========================================================================
    // Drop-down lineage
    // =========================================================================

    /// Make `drop_down` the submenu of `item`.
    ///
    /// Rejects a drop-down that already holds `item`, directly or through
    /// its own submenus.
    pub fn attach_drop_down(&mut self, item: ItemId, drop_down: StripId) -> Result<()> {
        let owner = self.try_item(item)?.owner;
        self.try_strip(drop_down)?;
        if owner.is_some_and(|o| self.lineage_contains(o, drop_down)) {
            return Err(ToolStripError::DropDownCycle { item, drop_down });
        }

        if let Some(previous) = self.items.get(item).and_then(|i| i.drop_down)
            && let Some(prev) = self.strips.get_mut(previous)
        {
            prev.owner_item = None;
        }
        if let Some(previous_owner) = self.strips.get(drop_down).and_then(|s| s.owner_item)
            && let Some(prev) = self.items.get_mut(previous_owner)
        {
            prev.drop_down = None;
        }
        if let Some(it) = self.items.get_mut(item) {
            it.drop_down = Some(drop_down);
        }
        if let Some(strip) = self.strips.get_mut(drop_down) {
            strip.owner_item = Some(item);
        }
        Ok(())
    }

    pub fn drop_down_of(&self, item: ItemId) -> Option<StripId> {
        self.items.get(item).and_then(|i| i.drop_down)
    }

    /// Whether `item` opens a non-empty submenu.
    pub fn has_drop_down_items(&self, item: ItemId) -> bool {
        self.drop_down_of(item)
            .is_some_and(|d| !self.items(d).is_empty())
    }

    /// The strip holding the item whose drop-down `strip` is.
    pub fn owner_tool_strip(&self, strip: StripId) -> Option<StripId> {
        let owner_item = self.strips.get(strip)?.owner_item?;
        self.items.get(owner_item)?.owner
    }

    /// Whether `ancestor` is `strip` or one of the strips above it.
    fn lineage_contains(&self, strip: StripId, ancestor: StripId) -> bool {
        let mut current = strip;
        for _ in 0..=self.strips.len() {
            if current == ancestor {
                return true;
            }
            match self.owner_tool_strip(current) {
                Some(owner) => current = owner,
                None => return false,
            }
        }
        false
    }

    /// The outermost drop-down of a drop-down's lineage.
    ///
    /// Walks up through owner strips while they are drop-downs. `None` if
    /// `strip` is not a drop-down.
    pub fn first_drop_down(&self, strip: StripId) -> Option<StripId> {
        if !self.is_drop_down(strip) {
            return None;
        }
        let mut current = strip;
        // Bounded so a malformed lineage cannot loop.
        for _ in 0..self.strips.len() {
            match self.owner_tool_strip(current) {
                Some(owner) if self.is_drop_down(owner) => current = owner,
                _ => break,
            }
        }
        Some(current)
    }

    /// The non-drop-down strip a lineage hangs from.
    ///
    /// A non-drop-down strip is its own top-level owner. A drop-down with no
    /// owning item (a context menu) has none.
    pub fn toplevel_owner(&self, strip: StripId) -> Option<StripId> {
        if !self.strips.contains_key(strip) {
            return None;
        }
        if !self.is_drop_down(strip) {
            return Some(strip);
        }
        let first = self.first_drop_down(strip)?;
        self.owner_tool_strip(first)
    }

    // =========================================================================
    // Context menus
    // =========================================================================

    /// Attach a context menu to a window, or clear it with `None`.
    pub fn assign_context_menu(&mut self, window: WindowHandle, menu: Option<StripId>) -> Result<()> {
        match menu {
            Some(id) => {
                self.try_strip(id)?;
                self.context_menus.insert(window, id);
            }
            None => {
                self.context_menus.remove(&window);
            }
        }
        Ok(())
    }

    pub fn context_menu_of(&self, window: WindowHandle) -> Option<StripId> {
        self.context_menus.get(&window).copied()
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Select `item`, unselecting its siblings.
    pub fn select_item(&mut self, item: ItemId) -> Result<()> {
        let owner = self.try_item(item)?.owner;
        if let Some(owner) = owner {
            self.clear_selection(owner);
        }
        if let Some(it) = self.items.get_mut(item) {
            it.selected = true;
        }
        Ok(())
    }

    pub fn unselect_item(&mut self, item: ItemId) {
        if let Some(it) = self.items.get_mut(item) {
            it.selected = false;
        }
    }

    pub fn selected_item(&self, strip: StripId) -> Option<ItemId> {
        self.items(strip)
            .iter()
            .copied()
            .find(|i| self.items.get(*i).is_some_and(|it| it.selected))
    }

    /// Unselect every item of a strip.
    pub fn clear_selection(&mut self, strip: StripId) {
        let Some(s) = self.strips.get(strip) else {
            return;
        };
        for item in &s.items {
            if let Some(it) = self.items.get_mut(*item) {
                it.selected = false;
            }
        }
    }

    /// First item of a strip keyboard navigation may land on.
    pub fn first_selectable_item(&self, strip: StripId) -> Option<ItemId> {
        self.items(strip)
            .iter()
            .copied()
            .find(|i| self.items.get(*i).is_some_and(|it| it.can_select()))
    }

    // =========================================================================
    // Invocation and notification
    // =========================================================================

    /// Fire `item` for `keys`.
    ///
    /// Succeeds only when the item is enabled, bound to exactly `keys`, and
    /// does not open a non-empty submenu.
    pub fn invoke_shortcut(&self, item: ItemId, keys: Keys) -> bool {
        let Some(it) = self.items.get(item) else {
            return false;
        };
        if !it.is_enabled() || it.shortcut() != Some(keys) || self.has_drop_down_items(item) {
            return false;
        }
        tracing::trace!(target: targets::SHORTCUT, item = ?item, text = it.text(), "item triggered");
        it.triggered.emit(item);
        true
    }

    /// Run a strip's closing callbacks in registration order.
    ///
    /// Recoverable errors are logged and skipped; the first fatal error stops
    /// the run and is returned.
    pub(crate) fn run_closing(
        &mut self,
        strip: StripId,
        reason: CloseReason,
    ) -> std::result::Result<(), CallbackError> {
        let Some(s) = self.strips.get_mut(strip) else {
            return Ok(());
        };
        let mut callbacks = std::mem::take(&mut s.closing);
        let mut outcome = Ok(());
        for callback in callbacks.iter_mut() {
            match callback(reason) {
                Ok(()) => {}
                Err(CallbackError::Recoverable(message)) => {
                    tracing::warn!(
                        target: targets::MENU_MODE,
                        strip = ?strip,
                        %message,
                        "closing callback failed, continuing"
                    );
                }
                Err(fatal) => {
                    outcome = Err(fatal);
                    break;
                }
            }
        }
        if let Some(s) = self.strips.get_mut(strip) {
            callbacks.append(&mut s.closing);
            s.closing = callbacks;
        }
        outcome
    }

    /// Tell every live strip that menu mode changed.
    ///
    /// `invalidate_text` repaints item text (mnemonic underlines);
    /// `activation_changed` drops keyboard activation.
    pub fn notify_menu_mode_change(&mut self, invalidate_text: bool, activation_changed: bool) {
        let mut needs_prune = false;
        for strip in self.strips.values_mut() {
            if strip.disposed {
                needs_prune = true;
                continue;
            }
            if invalidate_text {
                strip.text_invalidations += 1;
            }
            if activation_changed {
                strip.keyboard_active = false;
            }
        }
        if needs_prune {
            self.prune();
        }
    }

    // =========================================================================
    // Queries over forms
    // =========================================================================

    /// Name lookup that prefers strips living in `form`.
    ///
    /// Returns the first match inside `form`, otherwise the last match
    /// anywhere.
    pub fn find_in_form(&self, windows: &WindowTree, form: WindowHandle, name: &str) -> Option<StripId> {
        let mut found = None;
        for id in self.live_strips() {
            let Some(strip) = self.strip(id) else {
                continue;
            };
            if strip.name() != name {
                continue;
            }
            found = Some(id);
            if windows.find_form(strip.window()) == Some(form) {
                break;
            }
        }
        found
    }

    /// Designate the menu bar the menu key activates on `form`, or clear the
    /// designation with `None`.
    pub fn set_main_menu_strip(&mut self, form: WindowHandle, menu: Option<StripId>) -> Result<()> {
        match menu {
            Some(id) => {
                self.try_strip(id)?;
                self.main_menus.insert(form, id);
            }
            None => {
                self.main_menus.remove(&form);
            }
        }
        Ok(())
    }

    /// The menu bar the menu key activates on `form`.
    ///
    /// The designated strip if it is still live, otherwise the live menu
    /// strip closest to the form in the window tree. Equal depths keep
    /// registration order.
    pub fn main_menu_strip(&self, windows: &WindowTree, form: WindowHandle) -> Option<StripId> {
        if let Some(id) = self.main_menus.get(&form).copied()
            && !self.is_disposed(id)
        {
            return Some(id);
        }
        let depth_below = |window: WindowHandle| {
            let mut depth = 0usize;
            let mut current = Some(window);
            while let Some(w) = current {
                if w == form {
                    return Some(depth);
                }
                depth += 1;
                current = windows.parent(w);
            }
            None
        };
        self.live_strips()
            .filter_map(|id| {
                let strip = self.strip(id)?;
                if strip.kind() != StripKind::MenuStrip {
                    return None;
                }
                depth_below(strip.window()).map(|depth| (depth, id))
            })
            .min_by_key(|(depth, _)| *depth)
            .map(|(_, id)| id)
    }

    /// Strips in `form` that accept merges, most-derived kind first.
    pub fn find_mergeable(&self, windows: &WindowTree, form: WindowHandle) -> Vec<StripId> {
        let mut found: Vec<StripId> = self
            .live_strips()
            .filter(|id| {
                self.strip(*id).is_some_and(|s| {
                    s.allow_merge() && windows.find_form(s.window()) == Some(form)
                })
            })
            .collect();
        // Stable, so equal kinds keep registration order.
        found.sort_by_key(|id| {
            std::cmp::Reverse(self.strip(*id).map_or(0, |s| s.kind().depth()))
        });
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::Key;
    use horizon_toolstrip_core::Rect;

    fn setup() -> (WindowTree, ToolStripRegistry, StripId, StripId) {
        let mut windows = WindowTree::new();
        let form = windows.create_form(None, "form", Rect::new(0, 0, 400, 300), false);
        let bar = windows.create_child(form, "menu", Rect::new(0, 0, 400, 24)).unwrap();
        let popup = windows.create_popup("file", Rect::new(0, 24, 120, 80));
        let mut reg = ToolStripRegistry::new();
        let menu = reg.register(ToolStrip::new(StripKind::MenuStrip, bar).with_name("menu"));
        let file = reg.register(ToolStrip::new(StripKind::DropDownMenu, popup));
        (windows, reg, menu, file)
    }

    #[test]
    fn test_insert_clamps_and_moves() {
        let (_, mut reg, menu, file) = setup();
        let a = reg.create_item(ToolStripItem::new("a"));
        let b = reg.create_item(ToolStripItem::new("b"));
        assert_eq!(reg.add_item(menu, a).unwrap(), 0);
        assert_eq!(reg.insert_item(menu, 10, b).unwrap(), 1);

        // Moving into another collection detaches first.
        reg.add_item(file, a).unwrap();
        assert_eq!(reg.items(menu), &[b]);
        assert_eq!(reg.items(file), &[a]);
        assert_eq!(reg.item(a).unwrap().owner(), Some(file));
    }

    #[test]
    fn test_shortcut_index_follows_owner() {
        let (_, mut reg, menu, file) = setup();
        let save = reg.create_item(ToolStripItem::new("Save").with_shortcut(Keys::ctrl(Key::S)));
        reg.add_item(file, save).unwrap();
        assert!(reg.strip(file).unwrap().shortcuts().contains(Keys::ctrl(Key::S)));

        reg.add_item(menu, save).unwrap();
        assert!(!reg.strip(file).unwrap().shortcuts().contains(Keys::ctrl(Key::S)));
        assert!(reg.is_shortcut_defined(Keys::ctrl(Key::S)));

        reg.set_item_shortcut(save, Some(Keys::ctrl(Key::O))).unwrap();
        assert!(!reg.is_shortcut_defined(Keys::ctrl(Key::S)));
        assert!(reg.is_shortcut_defined(Keys::ctrl(Key::O)));
    }

    #[test]
    fn test_lineage() {
        let (_, mut reg, menu, file) = setup();
        let file_item = reg.create_item(ToolStripItem::new("&File"));
        reg.add_item(menu, file_item).unwrap();
        reg.attach_drop_down(file_item, file).unwrap();

        assert_eq!(reg.owner_tool_strip(file), Some(menu));
        assert_eq!(reg.first_drop_down(file), Some(file));
        assert_eq!(reg.first_drop_down(menu), None);
        assert_eq!(reg.toplevel_owner(file), Some(menu));
        assert_eq!(reg.toplevel_owner(menu), Some(menu));
    }

    #[test]
    fn test_drop_down_cycles_are_rejected() {
        let (mut windows, mut reg, menu, file) = setup();
        let recent_popup = windows.create_popup("recent", Rect::new(120, 24, 120, 60));
        let recent = reg.register(ToolStrip::new(StripKind::DropDownMenu, recent_popup));
        let file_item = reg.create_item(ToolStripItem::new("&File"));
        let recent_item = reg.create_item(ToolStripItem::new("Recent"));
        let back = reg.create_item(ToolStripItem::new("Back"));
        reg.add_item(menu, file_item).unwrap();
        reg.add_item(file, recent_item).unwrap();
        reg.add_item(recent, back).unwrap();
        reg.attach_drop_down(file_item, file).unwrap();
        reg.attach_drop_down(recent_item, recent).unwrap();

        // Recent > Back opening File would loop File > Recent > File.
        assert!(matches!(
            reg.attach_drop_down(back, file),
            Err(ToolStripError::DropDownCycle { item, drop_down }) if item == back && drop_down == file
        ));
        assert!(matches!(
            reg.attach_drop_down(back, recent),
            Err(ToolStripError::DropDownCycle { .. })
        ));
        assert_eq!(reg.drop_down_of(back), None);
        assert_eq!(reg.owner_tool_strip(file), Some(menu));

        // Same loop built the other way round: link first, then move in.
        let loose = reg.create_item(ToolStripItem::new("Loose"));
        reg.attach_drop_down(loose, file).unwrap();
        assert_eq!(reg.owner_tool_strip(file), None);
        assert!(matches!(
            reg.add_item(recent, loose),
            Err(ToolStripError::DropDownCycle { .. })
        ));
        assert_eq!(reg.item(loose).unwrap().owner(), None);
    }

    #[test]
    fn test_prune_drops_items_and_links() {
        let (_, mut reg, menu, file) = setup();
        let file_item = reg.create_item(ToolStripItem::new("&File"));
        let open = reg.create_item(ToolStripItem::new("Open"));
        reg.add_item(menu, file_item).unwrap();
        reg.add_item(file, open).unwrap();
        reg.attach_drop_down(file_item, file).unwrap();

        reg.dispose(file).unwrap();
        assert!(reg.is_disposed(file));
        assert_eq!(reg.live_strips().collect::<Vec<_>>(), vec![menu]);

        reg.prune();
        assert!(reg.strip(file).is_none());
        assert!(reg.item(open).is_none());
        assert_eq!(reg.drop_down_of(file_item), None);
        assert_eq!(reg.order(), &[menu]);
    }

    #[test]
    fn test_main_menu_prefers_designation_then_shallowest() {
        let (mut windows, mut reg, menu, _) = setup();
        let form = windows.find_form(reg.strip(menu).unwrap().window()).unwrap();
        let panel = windows.create_child(form, "panel", Rect::new(0, 30, 400, 200)).unwrap();
        let nested = windows.create_child(panel, "nested", Rect::new(0, 0, 400, 24)).unwrap();
        let deep = reg.register(ToolStrip::new(StripKind::MenuStrip, nested));
        assert_eq!(reg.main_menu_strip(&windows, form), Some(menu));

        reg.set_main_menu_strip(form, Some(deep)).unwrap();
        assert_eq!(reg.main_menu_strip(&windows, form), Some(deep));

        reg.dispose(deep).unwrap();
        assert_eq!(reg.main_menu_strip(&windows, form), Some(menu));
        reg.prune();
        assert_eq!(reg.main_menu_strip(&windows, panel), None);
    }

    #[test]
    fn test_closing_callbacks_survive_run() {
        let (_, mut reg, _, file) = setup();
        reg.strip_mut(file)
            .unwrap()
            .on_closing(|_| Err(CallbackError::recoverable("clipboard busy")));
        assert!(reg.run_closing(file, CloseReason::AppClicked).is_ok());

        reg.strip_mut(file)
            .unwrap()
            .on_closing(|_| Err(CallbackError::fatal("denied")));
        assert_eq!(
            reg.run_closing(file, CloseReason::AppClicked),
            Err(CallbackError::fatal("denied"))
        );
        assert_eq!(reg.strip(file).unwrap().closing.len(), 2);
    }

    #[test]
    fn test_invalid_handles() {
        let (_, mut reg, menu, _) = setup();
        reg.dispose(menu).unwrap();
        reg.prune();
        let item = reg.create_item(ToolStripItem::new("x"));
        assert!(matches!(
            reg.add_item(menu, item),
            Err(ToolStripError::InvalidStrip(id)) if id == menu
        ));
    }
}
