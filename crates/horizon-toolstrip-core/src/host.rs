//! The seam between menu logic and the platform event loop.
//!
//! [`MessageHost`] is everything the menu-mode router needs from the UI
//! thread: a way to intercept messages before dispatch, the active and
//! focused windows, timers, caret and tooltip control. [`MessageFilter`] is
//! the other side of the seam, the interceptor the host consults before it
//! delivers a message.
//!
//! [`ThreadMessageLoop`](crate::message_loop::ThreadMessageLoop) is the
//! in-process implementation used by applications and tests alike.

use std::time::Duration;

use slotmap::new_key_type;

use crate::error::Result;
use crate::message::Message;
use crate::timer::TimerId;
use crate::window::{WindowHandle, WindowTree};

new_key_type! {
    /// Identifies an installed message interceptor.
    pub struct SubscriptionId;
}

/// How a filter is attached to the thread's messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InterceptBackend {
    /// A filter consulted by the thread's own message pump. Only sees
    /// messages when the application owns the loop.
    Filter,
    /// A thread-level hook. Sees messages pumped by foreign loops too.
    Hook,
}

/// Host services used by the menu-mode router.
///
/// All methods are called from the UI thread.
pub trait MessageHost {
    /// Attach an interceptor.
    ///
    /// Fails with [`HostError::BackendUnavailable`](crate::HostError::BackendUnavailable)
    /// when the backend cannot be installed on this thread.
    fn subscribe(&mut self, backend: InterceptBackend) -> Result<SubscriptionId>;

    /// Detach a previously installed interceptor.
    fn unsubscribe(&mut self, id: SubscriptionId) -> Result<()>;

    /// Whether the application owns the thread's message loop. When it does
    /// not (a modal dialog is pumping), only a [`InterceptBackend::Hook`]
    /// sees messages.
    fn owns_message_loop(&self) -> bool;

    /// The currently active top-level window.
    fn active_window(&self) -> Option<WindowHandle>;

    /// The window holding keyboard focus.
    fn focused_window(&self) -> Option<WindowHandle>;

    /// The window hierarchy.
    fn windows(&self) -> &WindowTree;

    /// Start a repeating timer.
    fn start_timer(&mut self, interval: Duration) -> TimerId;

    fn stop_timer(&mut self, id: TimerId) -> Result<()>;

    /// Enable or disable mouse-leave tracking for the menu session.
    fn track_input(&mut self, enabled: bool);

    fn hide_caret(&mut self);

    fn show_caret(&mut self);

    /// The control currently showing a keyboard tooltip, if any.
    fn keyboard_tooltip_target(&self) -> Option<WindowHandle>;

    /// Tell the tooltip owner that `target` gained or lost focus.
    fn notify_tooltip_focus(&mut self, target: WindowHandle, focused: bool);
}

/// A message interceptor consulted before normal dispatch.
pub trait MessageFilter {
    /// Error surfaced from the filter back to the loop's caller.
    type Error;

    /// Inspect, rewrite or consume a message.
    ///
    /// Returns `Ok(true)` when the message is consumed and must not be
    /// dispatched. The filter may retarget the message by changing
    /// [`Message::window`].
    fn pre_filter_message(
        &mut self,
        host: &mut dyn MessageHost,
        msg: &mut Message,
    ) -> std::result::Result<bool, Self::Error>;
}
