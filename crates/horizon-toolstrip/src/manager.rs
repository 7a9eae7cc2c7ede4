//! The toolstrip manager facade.
//!
//! [`ToolStripManager`] owns the strip registry, the menu-mode router and
//! the renderer settings for one UI thread. Install it as the thread loop's
//! [`MessageFilter`] and route key presses through
//! [`process_cmd_key`](ToolStripManager::process_cmd_key).

use std::sync::Arc;
use std::time::Duration;

use horizon_toolstrip_core::logging::targets;
use horizon_toolstrip_core::{Message, MessageFilter, MessageHost, MessageKind, Signal, WindowHandle, WindowTree};

use crate::error::{Result, ToolStripError};
use crate::keys::{Keys, is_menu_key, is_valid_shortcut};
use crate::modal_filter::{DEFAULT_KEEP_ALIVE_INTERVAL, MenuModeChanged, ModalMenuFilter};
use crate::registry::ToolStripRegistry;
use crate::renderer::{RenderMode, RendererSettings, ToolStripRenderer};
use crate::strip::{CloseReason, StripId};

/// Manager configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolStripManagerConfig {
    /// Keep-alive timer interval while in menu mode.
    pub keep_alive_interval: Duration,
    /// Built-in renderer used until one is assigned. Must not be `Custom`.
    pub initial_render_mode: RenderMode,
    /// Whether strips should use visual styles when the application allows.
    pub visual_styles_enabled: bool,
    /// Whether the application renders with visual styles at all.
    pub application_visual_styles: bool,
}

impl Default for ToolStripManagerConfig {
    fn default() -> Self {
        Self {
            keep_alive_interval: DEFAULT_KEEP_ALIVE_INTERVAL,
            initial_render_mode: RenderMode::Professional,
            visual_styles_enabled: true,
            application_visual_styles: true,
        }
    }
}

impl ToolStripManagerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_keep_alive_interval(mut self, interval: Duration) -> Self {
        self.keep_alive_interval = interval;
        self
    }

    pub fn with_initial_render_mode(mut self, mode: RenderMode) -> Self {
        self.initial_render_mode = mode;
        self
    }

    pub fn with_visual_styles_enabled(mut self, enabled: bool) -> Self {
        self.visual_styles_enabled = enabled;
        self
    }

    pub fn with_application_visual_styles(mut self, enabled: bool) -> Self {
        self.application_visual_styles = enabled;
        self
    }
}

/// Registry, menu-mode router and renderer for one UI thread.
#[derive(Debug, Default)]
pub struct ToolStripManager {
    registry: ToolStripRegistry,
    filter: ModalMenuFilter,
    renderer: RendererSettings,
}

impl ToolStripManager {
    /// A manager with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails with [`ToolStripError::CustomRenderModeNotSupported`] when the
    /// initial render mode is `Custom`.
    pub fn with_config(config: ToolStripManagerConfig) -> Result<Self> {
        Ok(Self {
            registry: ToolStripRegistry::new(),
            filter: ModalMenuFilter::new(config.keep_alive_interval),
            renderer: RendererSettings::new(
                config.initial_render_mode,
                config.visual_styles_enabled,
                config.application_visual_styles,
            )?,
        })
    }

    pub fn registry(&self) -> &ToolStripRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ToolStripRegistry {
        &mut self.registry
    }

    pub fn filter(&self) -> &ModalMenuFilter {
        &self.filter
    }

    pub fn in_menu_mode(&self) -> bool {
        self.filter.in_menu_mode()
    }

    pub fn menu_mode_changed(&self) -> &Signal<MenuModeChanged> {
        &self.filter.menu_mode_changed
    }

    // =========================================================================
    // Merging
    // =========================================================================

    /// Merge `source` into `target`.
    pub fn merge(&mut self, source: StripId, target: StripId) -> Result<bool> {
        self.registry.merge(source, target)
    }

    /// Merge `source` into the first strip named `target_name`.
    ///
    /// `Ok(false)` when no strip has that name.
    pub fn merge_by_name(&mut self, source: StripId, target_name: &str) -> Result<bool> {
        self.registry.try_strip(source)?;
        match self.registry.find_by_name(target_name) {
            Some(target) => self.registry.merge(source, target),
            None => Ok(false),
        }
    }

    /// Undo every merge into `target`, keeping pinned strips merged.
    pub fn revert_merge(&mut self, target: StripId) -> Result<bool> {
        self.registry.revert_merge_internal(target, None, true)
    }

    /// Undo the merge of `source` into `target`, keeping later merges.
    pub fn revert_merge_from(&mut self, target: StripId, source: StripId) -> Result<bool> {
        self.registry.try_strip(source)?;
        self.registry.revert_merge_internal(target, Some(source), false)
    }

    /// [`revert_merge`](Self::revert_merge) on the first strip named
    /// `target_name`; `Ok(false)` when there is none.
    pub fn revert_merge_by_name(&mut self, target_name: &str) -> Result<bool> {
        match self.registry.find_by_name(target_name) {
            Some(target) => self.revert_merge(target),
            None => Ok(false),
        }
    }

    /// Undo every merge into `target`, pinned strips included.
    pub fn revert_all_merges(&mut self, target: StripId) -> Result<bool> {
        self.registry.revert_merge_internal(target, None, false)
    }

    // =========================================================================
    // Shortcuts and keys
    // =========================================================================

    pub fn is_valid_shortcut(keys: Keys) -> bool {
        is_valid_shortcut(keys)
    }

    pub fn is_shortcut_defined(&self, keys: Keys) -> bool {
        self.registry.is_shortcut_defined(keys)
    }

    /// Route a shortcut from the focused window, or from the message's
    /// window when nothing has focus.
    pub fn process_shortcut(&mut self, host: &dyn MessageHost, msg: &Message, keys: Keys) -> bool {
        let active_control = host.focused_window().or(msg.window);
        self.registry.process_shortcut(host.windows(), active_control, keys)
    }

    /// Entry point for command keys.
    ///
    /// Valid shortcuts are routed to items. A system key-down that is not a
    /// shortcut goes to menu-key handling.
    pub fn process_cmd_key(&mut self, host: &dyn MessageHost, msg: &Message, keys: Keys) -> bool {
        if is_valid_shortcut(keys) {
            return self.process_shortcut(host, msg, keys);
        }
        if msg.kind == MessageKind::SysKeyDown {
            return self.filter.process_menu_key_down(&mut self.registry, msg, keys);
        }
        false
    }

    /// Handle a system-menu keystroke aimed at `msg.window`.
    ///
    /// `menu_char` is the character typed with Alt, or `None` for the menu
    /// key on its own. Space opens the window menu and `-` the menu of a
    /// maximized MDI child, so both only clear the menu-key toggle.
    /// Shift+F10 is consumed while menu mode is active.
    ///
    /// Anything else activates the main menu strip of the window's root, as
    /// long as that root is the active window and no menu is already
    /// focused. If the toggle says the previous press just left menu mode,
    /// the toggle is cleared and the keystroke swallowed instead.
    pub fn process_menu_key(
        &mut self,
        host: &mut dyn MessageHost,
        msg: &Message,
        menu_char: Option<char>,
        shift_held: bool,
    ) -> Result<bool> {
        let windows = host.windows();
        let menu = msg
            .window
            .and_then(|w| windows.root(w))
            .and_then(|root| self.registry.main_menu_strip(windows, root));

        match menu_char {
            Some(' ') => self.filter.set_menu_key_toggle(false),
            Some('-') => {
                if let Some(form) = msg.window.and_then(|w| windows.find_form(w))
                    && windows.is_mdi_child(form)
                    && windows.is_maximized(form)
                {
                    self.filter.set_menu_key_toggle(false);
                }
            }
            None if shift_held => return Ok(self.filter.in_menu_mode()),
            _ => {
                let Some(menu) = menu else {
                    return Ok(false);
                };
                if self.filter.menu_key_toggle() {
                    tracing::debug!(target: targets::MENU_MODE, ?menu, "menu key toggle reset");
                    self.filter.set_menu_key_toggle(false);
                    return Ok(true);
                }
                let menu_root = self.registry.try_strip(menu)?.window();
                if windows.root(menu_root).is_some_and(|r| Some(r) == host.active_window()) {
                    return self.activate_from_menu_key(host, menu);
                }
            }
        }
        Ok(false)
    }

    fn activate_from_menu_key(&mut self, host: &mut dyn MessageHost, menu: StripId) -> Result<bool> {
        let window = self.registry.try_strip(menu)?.window();
        if host
            .focused_window()
            .is_some_and(|focus| host.windows().is_child_or_same(window, focus))
        {
            return Ok(false);
        }
        self.filter
            .set_active_tool_strip_with_menu_key(&mut self.registry, host, menu, true)?;
        if let Some(item) = self.registry.first_selectable_item(menu) {
            self.registry.select_item(item)?;
        }
        tracing::debug!(target: targets::MENU_MODE, ?menu, "menu strip activated by the menu key");
        Ok(true)
    }

    /// The menu key pressed while `strip` holds the keyboard.
    ///
    /// On a strip that is not a drop-down, a press during menu mode clears
    /// the strip's selection, leaves menu mode and sets the menu-key toggle
    /// so [`process_menu_key`](Self::process_menu_key) swallows the system
    /// keystroke that follows. Returns whether menu mode was left.
    pub fn process_strip_menu_key(&mut self, host: &mut dyn MessageHost, strip: StripId, keys: Keys) -> Result<bool> {
        if !is_menu_key(keys) || self.registry.try_strip(strip)?.is_drop_down() || !self.filter.in_menu_mode() {
            return Ok(false);
        }
        self.registry.clear_selection(strip);
        self.filter.set_menu_key_toggle(true);
        self.filter.exit_menu_mode(&mut self.registry, host);
        tracing::debug!(target: targets::MENU_MODE, ?strip, "second menu key press left menu mode");
        Ok(true)
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// First live strip with exactly this name.
    pub fn find_tool_strip(&self, name: &str) -> Option<StripId> {
        self.registry.find_by_name(name)
    }

    /// Name lookup preferring strips on `form`.
    pub fn find_tool_strip_in_form(&self, windows: &WindowTree, form: WindowHandle, name: &str) -> Option<StripId> {
        self.registry.find_in_form(windows, form, name)
    }

    /// Strips on `form` that accept merges, most-derived kind first.
    pub fn find_mergeable_tool_strips(&self, windows: &WindowTree, form: WindowHandle) -> Vec<StripId> {
        self.registry.find_mergeable(windows, form)
    }

    // =========================================================================
    // Menu mode
    // =========================================================================

    pub fn set_active_tool_strip(&mut self, host: &mut dyn MessageHost, strip: StripId) -> Result<()> {
        self.filter.set_active_tool_strip(&mut self.registry, host, strip)
    }

    pub fn set_active_tool_strip_with_menu_key(
        &mut self,
        host: &mut dyn MessageHost,
        strip: StripId,
        menu_key_pressed: bool,
    ) -> Result<()> {
        self.filter
            .set_active_tool_strip_with_menu_key(&mut self.registry, host, strip, menu_key_pressed)
    }

    pub fn remove_active_tool_strip(&mut self, host: &mut dyn MessageHost, strip: StripId) {
        self.filter.remove_active_tool_strip(&mut self.registry, host, strip);
    }

    pub fn exit_menu_mode(&mut self, host: &mut dyn MessageHost) {
        self.filter.exit_menu_mode(&mut self.registry, host);
    }

    pub fn show_drop_down(&mut self, host: &mut dyn MessageHost, drop_down: StripId) -> Result<()> {
        self.filter.show_drop_down(&mut self.registry, host, drop_down)
    }

    pub fn hide_drop_down(&mut self, host: &mut dyn MessageHost, drop_down: StripId, reason: CloseReason) -> Result<()> {
        self.filter.hide_drop_down(&mut self.registry, host, drop_down, reason)
    }

    pub fn close_active_drop_down(
        &mut self,
        host: &mut dyn MessageHost,
        drop_down: StripId,
        reason: CloseReason,
    ) -> Result<()> {
        self.filter
            .close_active_drop_down(&mut self.registry, host, drop_down, reason)
    }

    pub fn dismiss_all(&mut self, host: &mut dyn MessageHost, strip: StripId, reason: CloseReason) -> Result<()> {
        self.filter.dismiss_all(&mut self.registry, host, strip, reason)
    }

    pub fn suspend_menu_mode(&mut self) {
        self.filter.suspend_menu_mode();
    }

    pub fn resume_menu_mode(&mut self) {
        self.filter.resume_menu_mode();
    }

    pub fn set_menu_key_toggle(&mut self, toggle: bool) {
        self.filter.set_menu_key_toggle(toggle);
    }

    // =========================================================================
    // Ctrl+Tab navigation
    // =========================================================================

    /// Whether Ctrl+Tab may move from `start` to `candidate`.
    fn can_change_selection(&self, windows: &WindowTree, start: StripId, candidate: StripId) -> bool {
        let (Some(s), Some(c)) = (self.registry.strip(start), self.registry.strip(candidate)) else {
            return false;
        };
        !c.tab_stop()
            && c.is_enabled()
            && c.is_visible()
            && !c.is_disposed()
            && !c.is_drop_down()
            && windows.root(c.window()) == windows.root(s.window())
            && self.registry.first_selectable_item(candidate).is_some()
    }

    /// Move keyboard selection to the next (or previous) strip on the same
    /// root window, by tab index with wrap-around.
    ///
    /// Only strips that are not tab stops take part. Returns whether the
    /// selection moved.
    pub fn select_next_tool_strip(
        &mut self,
        host: &mut dyn MessageHost,
        start: StripId,
        forward: bool,
    ) -> Result<bool> {
        let (start_window, start_tab) = {
            let s = self.registry.try_strip(start)?;
            (s.window(), s.tab_index())
        };
        if host.windows().parent(start_window).is_none() {
            return Ok(false);
        }

        let order: Vec<StripId> = self.registry.order().to_vec();
        let Some(mut index) = order.iter().position(|s| *s == start) else {
            return Ok(false);
        };
        let total = order.len();
        let tab_of = |reg: &ToolStripRegistry, id: StripId| reg.strip(id).map_or(0, |s| s.tab_index());

        let mut next: Option<StripId> = None;
        let mut wrapped: Option<StripId> = None;
        for _ in 0..total {
            index = if forward {
                (index + 1) % total
            } else {
                (index + total - 1) % total
            };
            let candidate = order[index];
            if candidate == start {
                continue;
            }
            let tab = tab_of(&self.registry, candidate);
            let eligible = self.can_change_selection(host.windows(), start, candidate);
            let ahead = if forward { tab >= start_tab } else { tab <= start_tab };
            let closer = |current: Option<StripId>| {
                current.is_none_or(|c| {
                    let current_tab = tab_of(&self.registry, c);
                    if forward { tab < current_tab } else { tab > current_tab }
                })
            };
            if ahead && eligible {
                if closer(next) {
                    next = Some(candidate);
                }
            } else if eligible && closer(wrapped) {
                wrapped = Some(candidate);
            }

            if let Some(n) = next
                && (tab_of(&self.registry, n) - start_tab).abs() <= 1
            {
                break;
            }
        }

        match next.or(wrapped) {
            Some(target) => self.change_selection(host, start, target),
            None => Ok(false),
        }
    }

    fn change_selection(&mut self, host: &mut dyn MessageHost, start: StripId, target: StripId) -> Result<bool> {
        if start == target {
            return Ok(false);
        }
        if self.filter.in_menu_mode() {
            if self.filter.active_tool_strip() == Some(start) {
                self.filter.remove_from_chain(start);
                self.registry.clear_selection(start);
            }
            self.filter
                .set_active_tool_strip(&mut self.registry, host, target)?;
        }
        if let Some(item) = self.registry.first_selectable_item(target) {
            self.registry.select_item(item)?;
        }
        tracing::debug!(target: targets::MENU_MODE, from = ?start, to = ?target, "selection moved between strips");
        Ok(true)
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    pub fn renderer(&self) -> Arc<dyn ToolStripRenderer> {
        self.renderer.renderer()
    }

    pub fn set_renderer(&self, renderer: Option<Arc<dyn ToolStripRenderer>>) {
        self.renderer.set_renderer(renderer);
    }

    pub fn render_mode(&self) -> RenderMode {
        self.renderer.render_mode()
    }

    pub fn set_render_mode(&self, mode: RenderMode) -> Result<()> {
        self.renderer.set_render_mode(mode)
    }

    pub fn set_render_mode_value(&self, value: i32) -> Result<()> {
        self.renderer.set_render_mode_value(value)
    }

    pub fn visual_styles_enabled(&self) -> bool {
        self.renderer.visual_styles_enabled()
    }

    pub fn set_visual_styles_enabled(&self, enabled: bool) {
        self.renderer.set_visual_styles_enabled(enabled);
    }

    pub fn renderer_changed(&self) -> &Signal<()> {
        &self.renderer.renderer_changed
    }
}

impl MessageFilter for ToolStripManager {
    type Error = ToolStripError;

    fn pre_filter_message(&mut self, host: &mut dyn MessageHost, msg: &mut Message) -> Result<bool> {
        self.filter.pre_filter_message(&mut self.registry, host, msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ToolStripItem;
    use crate::strip::{StripKind, ToolStrip};
    use horizon_toolstrip_core::{Rect, ThreadMessageLoop};

    fn setup() -> (ThreadMessageLoop, ToolStripManager, Vec<StripId>) {
        let mut host = ThreadMessageLoop::new();
        let form = host
            .windows_mut()
            .create_form(None, "form", Rect::new(0, 0, 400, 300), false);
        let mut manager = ToolStripManager::new();
        let mut strips = Vec::new();
        for (i, tab) in [0, 2, 1].into_iter().enumerate() {
            let window = host
                .windows_mut()
                .create_child(form, "bar", Rect::new(0, i as i32 * 24, 400, 24))
                .unwrap();
            let reg = manager.registry_mut();
            let strip = reg.register(ToolStrip::new(StripKind::ToolStrip, window).with_tab_index(tab));
            let item = reg.create_item(ToolStripItem::new("button"));
            reg.add_item(strip, item).unwrap();
            strips.push(strip);
        }
        (host, manager, strips)
    }

    #[test]
    fn test_ctrl_tab_follows_tab_index() {
        let (mut host, mut manager, strips) = setup();
        // Tab indices 0, 2, 1: forward from 0 lands on 1.
        assert!(manager.select_next_tool_strip(&mut host, strips[0], true).unwrap());
        let first = manager.registry().items(strips[2])[0];
        assert!(manager.registry().item(first).unwrap().is_selected());

        // Wraps from the highest index back to the lowest.
        assert!(manager.select_next_tool_strip(&mut host, strips[1], true).unwrap());
        let first = manager.registry().items(strips[0])[0];
        assert!(manager.registry().item(first).unwrap().is_selected());
    }

    #[test]
    fn test_ctrl_tab_skips_tab_stops() {
        let (mut host, mut manager, strips) = setup();
        let window = manager.registry().strip(strips[2]).unwrap().window();
        manager.registry_mut().dispose(strips[2]).unwrap();
        manager.registry_mut().prune();
        let replacement = manager
            .registry_mut()
            .register(ToolStrip::new(StripKind::ToolStrip, window).with_tab_index(1).with_tab_stop(true));
        assert!(manager.select_next_tool_strip(&mut host, strips[0], true).unwrap());
        let selected = manager.registry().items(strips[1])[0];
        assert!(manager.registry().item(selected).unwrap().is_selected());
        assert!(manager.registry().selected_item(replacement).is_none());
    }

    #[test]
    fn test_ctrl_tab_swaps_active_strip_in_menu_mode() {
        let (mut host, mut manager, strips) = setup();
        manager.set_active_tool_strip(&mut host, strips[0]).unwrap();
        assert!(manager.select_next_tool_strip(&mut host, strips[0], true).unwrap());
        assert_eq!(manager.filter().chain(), &[strips[2]]);
        assert!(manager.in_menu_mode());
    }

    #[test]
    fn test_config_rejects_custom_mode() {
        let config = ToolStripManagerConfig::new().with_initial_render_mode(RenderMode::Custom);
        assert!(matches!(
            ToolStripManager::with_config(config),
            Err(ToolStripError::CustomRenderModeNotSupported)
        ));
    }
}
