//! The menu-mode router.
//!
//! While a menu is open the application is in *menu mode*: keyboard input
//! goes to the innermost open popup regardless of native focus, clicks
//! outside the open popups dismiss them, and losing activation to an
//! unrelated window closes everything.
//!
//! [`ModalMenuFilter`] keeps the chain of open strips (top-level owner
//! first, innermost popup last) and inspects every message through a
//! host interception subscription installed on entry and removed on exit.
//!
//! # States
//!
//! ```text
//!            set_active_tool_strip
//!   Idle ────────────────────────────► InMenuMode
//!    ▲                                     │
//!    └─────────────────────────────────────┘
//!      chain empties, activation lost, click outside
//! ```

use std::time::Duration;

use horizon_toolstrip_core::logging::targets;
use horizon_toolstrip_core::{
    InterceptBackend, Message, MessageHost, Point, Signal, SubscriptionId, ThreadAffinity, TimerId,
    WindowHandle,
};

use crate::error::{Result, ToolStripError};
use crate::keys::{Keys, is_menu_key};
use crate::registry::ToolStripRegistry;
use crate::strip::{CloseReason, StripId};

/// Interval of the keep-alive timer that keeps the queue moving while a
/// menu is open.
pub const DEFAULT_KEEP_ALIVE_INTERVAL: Duration = Duration::from_millis(500);

/// Payload of [`ModalMenuFilter::menu_mode_changed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuModeChanged {
    /// Item text must be repainted (mnemonic underlines toggled).
    pub invalidate_text: bool,
    /// Menu mode was entered or left.
    pub activation_changed: bool,
}

/// Per-thread menu-mode state machine.
///
/// Every method must be called from the thread that created the filter.
#[derive(Debug)]
pub struct ModalMenuFilter {
    chain: Vec<StripId>,
    in_menu_mode: bool,
    suspended: bool,
    active_hwnd: Option<WindowHandle>,
    last_active_window: Option<WindowHandle>,
    toplevel_cache: Option<StripId>,
    caret_hidden: bool,
    show_underlines: bool,
    menu_key_toggle: bool,
    subscriptions: Vec<SubscriptionId>,
    keep_alive: Option<TimerId>,
    keep_alive_interval: Duration,
    tooltip_target: Option<WindowHandle>,
    affinity: ThreadAffinity,
    /// Emitted after every menu-mode broadcast.
    pub menu_mode_changed: Signal<MenuModeChanged>,
}

impl Default for ModalMenuFilter {
    fn default() -> Self {
        Self::new(DEFAULT_KEEP_ALIVE_INTERVAL)
    }
}

impl ModalMenuFilter {
    pub fn new(keep_alive_interval: Duration) -> Self {
        Self {
            chain: Vec::new(),
            in_menu_mode: false,
            suspended: false,
            active_hwnd: None,
            last_active_window: None,
            toplevel_cache: None,
            caret_hidden: false,
            show_underlines: false,
            menu_key_toggle: false,
            subscriptions: Vec::new(),
            keep_alive: None,
            keep_alive_interval,
            tooltip_target: None,
            affinity: ThreadAffinity::current(),
            menu_mode_changed: Signal::new(),
        }
    }

    // =========================================================================
    // State queries
    // =========================================================================

    pub fn in_menu_mode(&self) -> bool {
        self.in_menu_mode
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    /// The innermost open strip; the one keyboard input is routed to.
    pub fn active_tool_strip(&self) -> Option<StripId> {
        self.chain.last().copied()
    }

    /// Open strips, outermost first.
    pub fn chain(&self) -> &[StripId] {
        &self.chain
    }

    /// The window that was active when menu mode was entered.
    pub fn active_hwnd(&self) -> Option<WindowHandle> {
        self.active_hwnd
    }

    pub fn is_caret_hidden(&self) -> bool {
        self.caret_hidden
    }

    pub fn is_keep_alive_running(&self) -> bool {
        self.keep_alive.is_some()
    }

    pub fn show_underlines(&self) -> bool {
        self.show_underlines
    }

    pub fn menu_key_toggle(&self) -> bool {
        self.menu_key_toggle
    }

    pub fn set_menu_key_toggle(&mut self, toggle: bool) {
        self.menu_key_toggle = toggle;
    }

    /// Top-level owner of the active strip, cached until the chain changes.
    fn current_toplevel_tool_strip(&mut self, reg: &ToolStripRegistry) -> Option<StripId> {
        if self.toplevel_cache.is_none()
            && let Some(active) = self.active_tool_strip()
        {
            self.toplevel_cache = reg.toplevel_owner(active);
        }
        self.toplevel_cache
    }

    /// Drop `strip` from the chain without leaving menu mode.
    pub(crate) fn remove_from_chain(&mut self, strip: StripId) {
        self.toplevel_cache = None;
        self.chain.retain(|s| *s != strip);
    }

    // =========================================================================
    // Activation
    // =========================================================================

    /// Route keyboard input to `strip`, entering menu mode if needed.
    ///
    /// A drop-down that does not auto-close only records the active window.
    /// Opening a popup from a different lineage than the current one
    /// dismisses that lineage first.
    pub fn set_active_tool_strip(
        &mut self,
        reg: &mut ToolStripRegistry,
        host: &mut dyn MessageHost,
        strip: StripId,
    ) -> Result<()> {
        self.affinity.debug_check("set_active_tool_strip");
        let (is_drop_down, auto_close) = {
            let s = reg.try_strip(strip)?;
            (s.is_drop_down(), s.auto_close())
        };
        if is_drop_down && !auto_close {
            if let Some(window) = host.active_window() {
                self.active_hwnd = Some(window);
            }
            return Ok(());
        }

        reg.try_strip_mut(strip)?.keyboard_active = true;

        if let Some(current) = self.active_tool_strip()
            && current != strip
        {
            let owner = reg.toplevel_owner(strip);
            if !reg.is_drop_down(current) {
                if owner != Some(current) {
                    self.remove_from_chain(current);
                }
            } else if is_drop_down && reg.first_drop_down(strip) != reg.first_drop_down(current) {
                tracing::debug!(target: targets::MENU_MODE, dismissed = ?current, "dismissing other lineage");
                self.remove_from_chain(current);
                self.dismiss_lineage(reg, current, CloseReason::AppFocusChange)?;
                self.chain
                    .retain(|s| reg.is_drop_down(*s) || Some(*s) == owner);
            }
        }

        self.toplevel_cache = None;
        if !self.chain.contains(&strip) {
            self.chain.push(strip);
            tracing::debug!(target: targets::MENU_MODE, ?strip, depth = self.chain.len(), "strip activated");
        }
        if !self.in_menu_mode {
            self.enter_menu_mode(host);
        }
        if !self.caret_hidden && is_drop_down && self.in_menu_mode {
            self.caret_hidden = true;
            host.hide_caret();
        }
        Ok(())
    }

    /// [`set_active_tool_strip`](Self::set_active_tool_strip), showing
    /// mnemonic underlines when entry came from the menu key.
    pub fn set_active_tool_strip_with_menu_key(
        &mut self,
        reg: &mut ToolStripRegistry,
        host: &mut dyn MessageHost,
        strip: StripId,
        menu_key_pressed: bool,
    ) -> Result<()> {
        if !self.in_menu_mode && menu_key_pressed {
            self.set_show_underlines(reg, true);
        }
        self.set_active_tool_strip(reg, host, strip)
    }

    /// Enter menu mode.
    ///
    /// Installs the message filter (and a hook when the thread does not own
    /// its loop), starts the keep-alive timer and takes keyboard tooltips out
    /// of focus. Calling it while already in menu mode is a bug; debug
    /// builds panic, release builds ignore it.
    pub fn enter_menu_mode(&mut self, host: &mut dyn MessageHost) {
        self.affinity.debug_check("enter_menu_mode");
        debug_assert!(!self.in_menu_mode, "enter_menu_mode called while already in menu mode");
        if self.in_menu_mode {
            return;
        }

        if let Some(window) = host.active_window() {
            self.active_hwnd = Some(window);
        }
        self.install(host, InterceptBackend::Filter);
        if !host.owns_message_loop() {
            self.install(host, InterceptBackend::Hook);
        }
        host.track_input(true);
        self.in_menu_mode = true;

        if let Some(target) = host.keyboard_tooltip_target() {
            host.notify_tooltip_focus(target, false);
            self.tooltip_target = Some(target);
        }
        self.keep_alive = Some(host.start_timer(self.keep_alive_interval));
        tracing::debug!(target: targets::MENU_MODE, active_hwnd = ?self.active_hwnd, "entered menu mode");
    }

    fn install(&mut self, host: &mut dyn MessageHost, backend: InterceptBackend) {
        match host.subscribe(backend) {
            Ok(id) => self.subscriptions.push(id),
            Err(err) => {
                tracing::warn!(target: targets::MENU_MODE, %err, ?backend, "message interception unavailable");
                debug_assert!(false, "failed to install {backend:?}: {err}");
            }
        }
    }

    /// Leave menu mode: stop the timer, remove interception, clear the
    /// chain, restore caret and tooltips, and broadcast the change.
    ///
    /// A no-op while idle.
    pub fn exit_menu_mode(&mut self, reg: &mut ToolStripRegistry, host: &mut dyn MessageHost) {
        self.affinity.debug_check("exit_menu_mode");
        if !self.in_menu_mode && !self.show_underlines && self.keep_alive.is_none() {
            return;
        }

        if let Some(timer) = self.keep_alive.take()
            && let Err(err) = host.stop_timer(timer)
        {
            tracing::warn!(target: targets::MENU_MODE, %err, "failed to stop keep-alive timer");
        }

        if self.in_menu_mode {
            for id in self.subscriptions.drain(..) {
                if let Err(err) = host.unsubscribe(id) {
                    tracing::warn!(target: targets::MENU_MODE, %err, "failed to remove message interception");
                }
            }
            host.track_input(false);
            self.active_hwnd = None;
            self.chain.clear();
            self.toplevel_cache = None;
            if self.caret_hidden {
                self.caret_hidden = false;
                host.show_caret();
            }
            if let Some(target) = self.tooltip_target.take() {
                host.notify_tooltip_focus(target, true);
            }
            tracing::debug!(target: targets::MENU_MODE, "exited menu mode");
        }

        self.in_menu_mode = false;
        let text_changed = self.show_underlines;
        self.show_underlines = false;
        self.notify_menu_mode_change(reg, text_changed, true);
    }

    /// Drop `strip` from the chain, leaving menu mode once nothing is open.
    pub fn remove_active_tool_strip(
        &mut self,
        reg: &mut ToolStripRegistry,
        host: &mut dyn MessageHost,
        strip: StripId,
    ) {
        self.affinity.debug_check("remove_active_tool_strip");
        self.remove_from_chain(strip);
        tracing::debug!(target: targets::MENU_MODE, ?strip, depth = self.chain.len(), "strip deactivated");
        if self.chain.is_empty() && self.in_menu_mode {
            self.exit_menu_mode(reg, host);
        }
    }

    pub fn suspend_menu_mode(&mut self) {
        self.affinity.debug_check("suspend_menu_mode");
        self.suspended = true;
    }

    pub fn resume_menu_mode(&mut self) {
        self.affinity.debug_check("resume_menu_mode");
        self.suspended = false;
    }

    // =========================================================================
    // Drop-downs
    // =========================================================================

    /// Show a drop-down and make it the active strip.
    ///
    /// Sibling drop-downs open from the same owner strip close first, and
    /// the owner item becomes selected.
    pub fn show_drop_down(
        &mut self,
        reg: &mut ToolStripRegistry,
        host: &mut dyn MessageHost,
        drop_down: StripId,
    ) -> Result<()> {
        let owner_item = reg.try_strip(drop_down)?.owner_item();
        if let Some(owner_strip) = reg.owner_tool_strip(drop_down) {
            let siblings: Vec<StripId> = reg
                .items(owner_strip)
                .iter()
                .filter_map(|i| reg.drop_down_of(*i))
                .filter(|d| *d != drop_down && reg.strip(*d).is_some_and(|s| s.is_visible()))
                .collect();
            for sibling in siblings {
                self.hide_drop_down_core(reg, sibling, CloseReason::CloseCalled)?;
            }
        }
        if let Some(item) = owner_item {
            reg.select_item(item)?;
        }
        reg.try_strip_mut(drop_down)?.visible = true;
        self.set_active_tool_strip(reg, host, drop_down)
    }

    /// Hide a drop-down and its open children, leaving menu mode once
    /// nothing is open.
    pub fn hide_drop_down(
        &mut self,
        reg: &mut ToolStripRegistry,
        host: &mut dyn MessageHost,
        drop_down: StripId,
        reason: CloseReason,
    ) -> Result<()> {
        self.hide_drop_down_core(reg, drop_down, reason)?;
        if self.chain.is_empty() && self.in_menu_mode {
            self.exit_menu_mode(reg, host);
        }
        Ok(())
    }

    /// Close the active drop-down. When it was the last open strip, leave
    /// menu mode and unselect the item it dropped from.
    pub fn close_active_drop_down(
        &mut self,
        reg: &mut ToolStripRegistry,
        host: &mut dyn MessageHost,
        drop_down: StripId,
        reason: CloseReason,
    ) -> Result<()> {
        self.hide_drop_down_core(reg, drop_down, reason)?;
        if self.active_tool_strip().is_none() {
            self.exit_menu_mode(reg, host);
            if let Some(item) = reg.strip(drop_down).and_then(|s| s.owner_item()) {
                reg.unselect_item(item);
            }
        }
        Ok(())
    }

    /// Hide the outermost drop-down of `strip`'s lineage and unselect the
    /// item it dropped from, leaving menu mode once nothing is open.
    pub fn dismiss_all(
        &mut self,
        reg: &mut ToolStripRegistry,
        host: &mut dyn MessageHost,
        strip: StripId,
        reason: CloseReason,
    ) -> Result<()> {
        self.dismiss_lineage(reg, strip, reason)?;
        if self.chain.is_empty() && self.in_menu_mode {
            self.exit_menu_mode(reg, host);
        }
        Ok(())
    }

    fn dismiss_lineage(&mut self, reg: &mut ToolStripRegistry, strip: StripId, reason: CloseReason) -> Result<()> {
        let first = reg.first_drop_down(strip).unwrap_or(strip);
        self.hide_drop_down_core(reg, first, reason)?;
        if let Some(item) = reg.strip(first).and_then(|s| s.owner_item()) {
            reg.unselect_item(item);
        }
        Ok(())
    }

    /// Hide without touching menu mode. Children go first; a fatal closing
    /// callback aborts the hide.
    fn hide_drop_down_core(
        &mut self,
        reg: &mut ToolStripRegistry,
        drop_down: StripId,
        reason: CloseReason,
    ) -> Result<()> {
        reg.try_strip(drop_down)?;
        let children: Vec<StripId> = reg
            .items(drop_down)
            .iter()
            .filter_map(|i| reg.drop_down_of(*i))
            .filter(|d| *d != drop_down && reg.strip(*d).is_some_and(|s| s.is_visible()))
            .collect();
        for child in children {
            self.hide_drop_down_core(reg, child, reason)?;
        }

        if reg.strip(drop_down).is_some_and(|s| s.is_visible()) {
            reg.try_strip_mut(drop_down)?.close_reason = Some(reason);
            reg.run_closing(drop_down, reason)
                .map_err(ToolStripError::Callback)?;
            let strip = reg.try_strip_mut(drop_down)?;
            strip.visible = false;
            strip.keyboard_active = false;
            tracing::debug!(target: targets::MENU_MODE, ?drop_down, ?reason, "drop-down hidden");
        }
        self.remove_from_chain(drop_down);
        Ok(())
    }

    // =========================================================================
    // Message processing
    // =========================================================================

    /// Close every auto-closing popup and leave menu mode.
    pub fn process_activation_change(
        &mut self,
        reg: &mut ToolStripRegistry,
        host: &mut dyn MessageHost,
    ) -> Result<()> {
        tracing::debug!(target: targets::MENU_MODE, "activation lost");
        let count = self.chain.len();
        for _ in 0..count {
            let Some(active) = self.active_tool_strip() else {
                break;
            };
            let auto_closing = reg
                .strip(active)
                .is_some_and(|s| s.is_drop_down() && s.auto_close());
            if !auto_closing {
                break;
            }
            self.hide_drop_down_core(reg, active, CloseReason::AppFocusChange)?;
        }
        self.exit_menu_mode(reg, host);
        Ok(())
    }

    /// Dismiss open strips that a button press at `point` missed.
    ///
    /// `from` is the window whose client coordinates `point` is in, `None`
    /// for screen coordinates. Walks from the innermost strip outwards and
    /// stops at the first one containing the point. A press on the owning
    /// item's drop-down button is left to that item.
    pub fn process_mouse_button_pressed(
        &mut self,
        reg: &mut ToolStripRegistry,
        host: &mut dyn MessageHost,
        from: Option<WindowHandle>,
        point: Point,
    ) -> Result<()> {
        let count = self.chain.len();
        for _ in 0..count {
            let Some(active) = self.active_tool_strip() else {
                break;
            };
            let Some((window, is_drop_down, owner_item)) = reg
                .strip(active)
                .map(|s| (s.window(), s.is_drop_down(), s.owner_item()))
            else {
                self.remove_from_chain(active);
                continue;
            };
            let windows = host.windows();
            let inside = windows
                .map_point(from, window, point)
                .ok()
                .zip(windows.client_rect(window))
                .is_some_and(|(local, client)| client.contains(local));
            if inside {
                break;
            }

            if !is_drop_down {
                tracing::trace!(target: targets::MENU_MODE, ?active, "click outside top-level strip");
                reg.clear_selection(active);
                self.exit_menu_mode(reg, host);
                break;
            }

            let on_owner_button = owner_item
                .and_then(|item| reg.item(item).map(|it| (it.owner(), it.drop_down_button_area())))
                .is_some_and(|(owner, area)| {
                    owner.and_then(|o| reg.strip(o)).map(|o| o.window()) == from
                        && from.is_some()
                        && area.contains(point)
                });
            if on_owner_button {
                break;
            }
            tracing::trace!(target: targets::MENU_MODE, ?active, "click outside drop-down");
            self.close_active_drop_down(reg, host, active, CloseReason::AppClicked)?;
        }
        Ok(())
    }

    /// Handle the menu key (Alt or F10) pressed outside a menu.
    ///
    /// Shows mnemonic underlines unless the toggle says the previous press
    /// already consumed them. Never consumes the message.
    pub fn process_menu_key_down(&mut self, reg: &mut ToolStripRegistry, msg: &Message, keys: Keys) -> bool {
        if let Some(window) = msg.window
            && let Some(strip) = reg.strip_by_window(window)
            && !reg.is_drop_down(strip)
        {
            return false;
        }
        if is_menu_key(keys) {
            if !self.in_menu_mode && self.menu_key_toggle {
                self.menu_key_toggle = false;
            } else if !self.menu_key_toggle {
                self.set_show_underlines(reg, true);
            }
        }
        false
    }

    pub fn set_show_underlines(&mut self, reg: &mut ToolStripRegistry, show: bool) {
        if self.show_underlines != show {
            self.show_underlines = show;
            self.notify_menu_mode_change(reg, true, false);
        }
    }

    fn notify_menu_mode_change(&mut self, reg: &mut ToolStripRegistry, invalidate_text: bool, activation_changed: bool) {
        reg.notify_menu_mode_change(invalidate_text, activation_changed);
        self.menu_mode_changed.emit(MenuModeChanged {
            invalidate_text,
            activation_changed,
        });
    }

    /// Inspect a message before normal dispatch. Returns `true` to consume it.
    ///
    /// Keyboard messages are retargeted to the active strip's window unless
    /// that strip already contains focus. Button presses dismiss popups they
    /// miss. Mouse moves over windows unrelated to the open menus are
    /// consumed. Activation moving to an unrelated window closes everything.
    #[tracing::instrument(skip_all, target = "horizon_toolstrip::menu_mode", level = "trace")]
    pub fn pre_filter_message(
        &mut self,
        reg: &mut ToolStripRegistry,
        host: &mut dyn MessageHost,
        msg: &mut Message,
    ) -> Result<bool> {
        self.affinity.debug_check("pre_filter_message");
        if self.suspended {
            return Ok(false);
        }
        let Some(active) = self.active_tool_strip() else {
            return Ok(false);
        };
        if reg.is_disposed(active) {
            self.remove_active_tool_strip(reg, host, active);
            return Ok(false);
        }

        let current = host.active_window();
        if current != self.last_active_window {
            let unrelated = match current {
                None => true,
                Some(window) => {
                    let windows = host.windows();
                    let popup = reg
                        .strip_for_window(windows, window)
                        .is_some_and(|s| reg.is_drop_down(s));
                    let strip_window = reg.strip(active).map(|s| s.window());
                    !popup
                        && !strip_window.is_some_and(|w| windows.is_child_or_same(window, w))
                        && !self
                            .active_hwnd
                            .is_some_and(|w| windows.is_child_or_same(window, w))
                }
            };
            self.last_active_window = current;
            if unrelated {
                self.process_activation_change(reg, host)?;
            }
        }
        self.last_active_window = current;

        let Some(active) = self.active_tool_strip() else {
            return Ok(false);
        };
        if !msg.is_key_or_mouse() {
            return Ok(false);
        }

        if msg.kind.is_mouse_move() {
            return Ok(self.should_swallow_mouse_move(reg, host, active, msg.window));
        }

        if msg.kind.is_button_down() {
            let from = if msg.kind.is_non_client() { None } else { msg.window };
            self.process_mouse_button_pressed(reg, host, from, msg.point)?;
            return Ok(false);
        }

        if msg.kind.is_key()
            && let Some(strip_window) = reg.strip(active).map(|s| s.window())
        {
            let windows = host.windows();
            let contains_focus = host
                .focused_window()
                .is_some_and(|f| windows.is_child_or_same(strip_window, f));
            if !contains_focus && msg.window != Some(strip_window) {
                tracing::trace!(target: targets::MENU_MODE, from = ?msg.window, to = ?strip_window, "retargeting key message");
                msg.window = Some(strip_window);
            }
        }
        Ok(false)
    }

    /// A move is consumed when it lands outside the active strip, outside
    /// the top-level strip and outside the window menu mode was entered
    /// from. Moves over popup strips always pass.
    fn should_swallow_mouse_move(
        &mut self,
        reg: &ToolStripRegistry,
        host: &dyn MessageHost,
        active: StripId,
        window: Option<WindowHandle>,
    ) -> bool {
        let Some(window) = window else {
            return false;
        };
        let toplevel = self.current_toplevel_tool_strip(reg);
        let windows = host.windows();
        let over_popup = windows
            .root(window)
            .and_then(|root| reg.strip_by_window(root))
            .is_some_and(|s| reg.is_drop_down(s));
        if over_popup {
            return false;
        }
        let within = |strip: Option<StripId>| {
            strip
                .and_then(|s| reg.strip(s))
                .is_some_and(|s| windows.is_child_or_same(s.window(), window))
        };
        if within(Some(active)) || within(toplevel) {
            return false;
        }
        if self
            .active_hwnd
            .is_some_and(|entry| windows.is_child_or_same(entry, window))
        {
            return false;
        }
        tracing::trace!(target: targets::MENU_MODE, ?window, "swallowing stray mouse move");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ToolStripItem;
    use crate::strip::{StripKind, ToolStrip};
    use horizon_toolstrip_core::{Rect, ThreadMessageLoop};

    struct Fixture {
        host: ThreadMessageLoop,
        reg: ToolStripRegistry,
        filter: ModalMenuFilter,
        menu: StripId,
        file: StripId,
    }

    fn setup() -> Fixture {
        let mut host = ThreadMessageLoop::new();
        let form = host
            .windows_mut()
            .create_form(None, "form", Rect::new(0, 0, 400, 300), false);
        let bar = host
            .windows_mut()
            .create_child(form, "menu", Rect::new(0, 0, 400, 24))
            .unwrap();
        let popup = host
            .windows_mut()
            .create_popup("file", Rect::new(0, 24, 120, 100));
        host.set_active_window(Some(form));

        let mut reg = ToolStripRegistry::new();
        let menu = reg.register(ToolStrip::new(StripKind::MenuStrip, bar));
        let file = reg.register(ToolStrip::new(StripKind::DropDownMenu, popup));
        let file_item = reg.create_item(ToolStripItem::new("&File"));
        reg.add_item(menu, file_item).unwrap();
        reg.attach_drop_down(file_item, file).unwrap();

        Fixture {
            host,
            reg,
            filter: ModalMenuFilter::default(),
            menu,
            file,
        }
    }

    #[test]
    fn test_activation_enters_menu_mode() {
        let mut f = setup();
        f.filter.set_active_tool_strip(&mut f.reg, &mut f.host, f.menu).unwrap();
        assert!(f.filter.in_menu_mode());
        assert!(f.host.is_intercepting());
        assert!(f.filter.is_keep_alive_running());
        assert!(f.reg.strip(f.menu).unwrap().is_keyboard_active());

        f.filter.show_drop_down(&mut f.reg, &mut f.host, f.file).unwrap();
        assert_eq!(f.filter.chain(), &[f.menu, f.file]);
        assert!(f.filter.is_caret_hidden());
        assert!(!f.host.is_caret_visible());
    }

    #[test]
    fn test_exit_restores_host_state() {
        let mut f = setup();
        f.filter.show_drop_down(&mut f.reg, &mut f.host, f.file).unwrap();
        f.filter.exit_menu_mode(&mut f.reg, &mut f.host);

        assert!(!f.filter.in_menu_mode());
        assert!(f.filter.chain().is_empty());
        assert!(!f.host.is_intercepting());
        assert!(f.host.is_caret_visible());
        assert_eq!(f.host.active_timer_count(), 0);
        assert!(!f.reg.strip(f.file).unwrap().is_keyboard_active());
    }

    #[test]
    fn test_non_closing_drop_down_stays_out_of_menu_mode() {
        let mut f = setup();
        f.reg.strip_mut(f.file).unwrap().set_auto_close(false);
        f.filter.set_active_tool_strip(&mut f.reg, &mut f.host, f.file).unwrap();
        assert!(!f.filter.in_menu_mode());
        assert!(f.filter.chain().is_empty());
        assert!(f.filter.active_hwnd().is_some());
    }

    #[test]
    fn test_remove_last_strip_exits() {
        let mut f = setup();
        f.filter.set_active_tool_strip(&mut f.reg, &mut f.host, f.menu).unwrap();
        f.filter.remove_active_tool_strip(&mut f.reg, &mut f.host, f.menu);
        assert!(!f.filter.in_menu_mode());
    }

    #[test]
    fn test_menu_key_shows_underlines() {
        let mut f = setup();
        let window = f.reg.strip(f.file).unwrap().window();
        let msg = Message::sys_key_down(window);
        assert!(!f.filter.process_menu_key_down(&mut f.reg, &msg, Keys::key_only(crate::keys::Key::Menu)));
        assert!(f.filter.show_underlines());
        assert_eq!(f.reg.strip(f.menu).unwrap().text_invalidations(), 1);

        // The toggle swallows one press.
        f.filter.set_show_underlines(&mut f.reg, false);
        f.filter.set_menu_key_toggle(true);
        f.filter.process_menu_key_down(&mut f.reg, &msg, Keys::key_only(crate::keys::Key::F10));
        assert!(!f.filter.show_underlines());
        assert!(!f.filter.menu_key_toggle());
    }

    #[test]
    fn test_menu_key_ignored_on_top_level_strip() {
        let mut f = setup();
        let window = f.reg.strip(f.menu).unwrap().window();
        let msg = Message::sys_key_down(window);
        f.filter.process_menu_key_down(&mut f.reg, &msg, Keys::key_only(crate::keys::Key::Menu));
        assert!(!f.filter.show_underlines());
    }
}
