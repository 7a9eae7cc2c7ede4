//! The UI thread's message loop.
//!
//! [`ThreadMessageLoop`] owns the window tree, the thread's timers and a
//! FIFO message queue. Every message passes through the installed
//! [`MessageFilter`] (when a live subscription can see it) before it is
//! delivered to its target window.
//!
//! # Example
//!
//! ```
//! use horizon_toolstrip_core::{
//!     Message, MessageFilter, MessageHost, MessageLoopBuilder, Rect,
//! };
//!
//! struct SwallowAll;
//!
//! impl MessageFilter for SwallowAll {
//!     type Error = std::convert::Infallible;
//!
//!     fn pre_filter_message(
//!         &mut self,
//!         _host: &mut dyn MessageHost,
//!         _msg: &mut Message,
//!     ) -> Result<bool, Self::Error> {
//!         Ok(true)
//!     }
//! }
//!
//! let mut event_loop = MessageLoopBuilder::new().build();
//! let form = event_loop.windows_mut().create_top_level("main", Rect::new(0, 0, 640, 480));
//!
//! let outcome = event_loop.dispatch(&mut SwallowAll, Message::paint(form)).unwrap();
//! // Nobody subscribed, so the filter never saw the message.
//! assert!(!outcome.handled);
//! assert_eq!(outcome.delivered_to, Some(form));
//! ```

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use slotmap::SlotMap;

use crate::error::{HostError, Result};
use crate::host::{InterceptBackend, MessageFilter, MessageHost, SubscriptionId};
use crate::logging::{PerfSpan, span_names, targets};
use crate::message::Message;
use crate::timer::{TimerId, TimerManager};
use crate::window::{WindowHandle, WindowTree};

/// Capabilities of the thread loop.
#[derive(Debug, Clone)]
pub struct MessageLoopConfig {
    /// Whether the application pumps this thread's messages itself.
    pub owns_message_loop: bool,
    /// Whether [`InterceptBackend::Filter`] can be installed.
    pub filters_supported: bool,
    /// Whether [`InterceptBackend::Hook`] can be installed.
    pub hooks_supported: bool,
    /// Most recent delivered messages kept for inspection. `0` turns the
    /// log off.
    pub delivery_log_capacity: usize,
}

/// Default [`MessageLoopConfig::delivery_log_capacity`].
pub const DEFAULT_DELIVERY_LOG_CAPACITY: usize = 1024;

impl Default for MessageLoopConfig {
    fn default() -> Self {
        Self {
            owns_message_loop: true,
            filters_supported: true,
            hooks_supported: true,
            delivery_log_capacity: DEFAULT_DELIVERY_LOG_CAPACITY,
        }
    }
}

/// Builder for [`ThreadMessageLoop`].
#[derive(Debug, Default)]
pub struct MessageLoopBuilder {
    config: MessageLoopConfig,
}

impl MessageLoopBuilder {
    /// Create a builder with every backend available and an owned loop.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether the application owns the loop.
    pub fn owns_message_loop(mut self, owns: bool) -> Self {
        self.config.owns_message_loop = owns;
        self
    }

    /// Set whether message filters can be installed.
    pub fn filters_supported(mut self, supported: bool) -> Self {
        self.config.filters_supported = supported;
        self
    }

    /// Set whether thread hooks can be installed.
    pub fn hooks_supported(mut self, supported: bool) -> Self {
        self.config.hooks_supported = supported;
        self
    }

    /// Cap the delivery log; `0` disables it.
    pub fn delivery_log_capacity(mut self, capacity: usize) -> Self {
        self.config.delivery_log_capacity = capacity;
        self
    }

    /// Build the loop.
    pub fn build(self) -> ThreadMessageLoop {
        ThreadMessageLoop::with_config(self.config)
    }
}

/// What happened to a dispatched message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// The filter consumed the message.
    pub handled: bool,
    /// The window the message was finally delivered to, after any
    /// retargeting. `None` when consumed or untargeted.
    pub delivered_to: Option<WindowHandle>,
}

/// A single UI thread's message loop and host services.
#[derive(Debug)]
pub struct ThreadMessageLoop {
    config: MessageLoopConfig,
    windows: WindowTree,
    timers: TimerManager,
    subscriptions: SlotMap<SubscriptionId, InterceptBackend>,
    queue: VecDeque<Message>,
    active_window: Option<WindowHandle>,
    focused_window: Option<WindowHandle>,
    tracking_input: bool,
    caret_hidden: bool,
    tooltip_target: Option<WindowHandle>,
    tooltip_notifications: Vec<(WindowHandle, bool)>,
    delivered: Vec<Message>,
}

impl Default for ThreadMessageLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl ThreadMessageLoop {
    /// Create a loop with the default configuration.
    pub fn new() -> Self {
        Self::with_config(MessageLoopConfig::default())
    }

    /// Create a loop with an explicit configuration.
    pub fn with_config(config: MessageLoopConfig) -> Self {
        Self {
            config,
            windows: WindowTree::new(),
            timers: TimerManager::new(),
            subscriptions: SlotMap::with_key(),
            queue: VecDeque::new(),
            active_window: None,
            focused_window: None,
            tracking_input: false,
            caret_hidden: false,
            tooltip_target: None,
            tooltip_notifications: Vec::new(),
            delivered: Vec::new(),
        }
    }

    pub fn config(&self) -> &MessageLoopConfig {
        &self.config
    }

    /// Mutable access to the window hierarchy.
    pub fn windows_mut(&mut self) -> &mut WindowTree {
        &mut self.windows
    }

    pub fn set_active_window(&mut self, window: Option<WindowHandle>) {
        tracing::trace!(target: targets::MESSAGE_LOOP, ?window, "active window changed");
        self.active_window = window;
    }

    pub fn set_focused_window(&mut self, window: Option<WindowHandle>) {
        self.focused_window = window;
    }

    /// Simulate a foreign loop (e.g. a modal dialog) taking over the pump.
    pub fn set_owns_message_loop(&mut self, owns: bool) {
        self.config.owns_message_loop = owns;
    }

    pub fn set_keyboard_tooltip_target(&mut self, target: Option<WindowHandle>) {
        self.tooltip_target = target;
    }

    /// Queue a message for the next [`pump`](Self::pump).
    pub fn post(&mut self, msg: Message) {
        self.queue.push_back(msg);
    }

    /// Number of queued messages.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Whether any live subscription would observe the next message.
    pub fn is_intercepting(&self) -> bool {
        self.subscriptions.values().any(|backend| match backend {
            InterceptBackend::Filter => self.config.owns_message_loop,
            InterceptBackend::Hook => true,
        })
    }

    /// Number of installed subscriptions, of any backend.
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Whether a subscription of the given backend is installed.
    pub fn has_subscription(&self, backend: InterceptBackend) -> bool {
        self.subscriptions.values().any(|b| *b == backend)
    }

    pub fn is_tracking_input(&self) -> bool {
        self.tracking_input
    }

    pub fn is_caret_visible(&self) -> bool {
        !self.caret_hidden
    }

    /// Tooltip focus notifications in the order they were sent.
    pub fn tooltip_notifications(&self) -> &[(WindowHandle, bool)] {
        &self.tooltip_notifications
    }

    /// The most recent messages delivered to windows, oldest first.
    pub fn delivered(&self) -> &[Message] {
        &self.delivered
    }

    /// Drain the delivery log.
    pub fn take_delivered(&mut self) -> Vec<Message> {
        std::mem::take(&mut self.delivered)
    }

    /// Number of running timers.
    pub fn active_timer_count(&self) -> usize {
        self.timers.active_count()
    }

    pub fn is_timer_active(&self, id: TimerId) -> bool {
        self.timers.is_active(id)
    }

    /// Run one message through the filter and deliver it unless consumed.
    pub fn dispatch<F: MessageFilter>(
        &mut self,
        filter: &mut F,
        mut msg: Message,
    ) -> std::result::Result<DispatchOutcome, F::Error> {
        let _span = PerfSpan::new(span_names::DISPATCH);

        if self.is_intercepting() && filter.pre_filter_message(self, &mut msg)? {
            tracing::trace!(target: targets::MESSAGE_LOOP, kind = ?msg.kind, "message consumed by filter");
            return Ok(DispatchOutcome {
                handled: true,
                delivered_to: None,
            });
        }

        tracing::trace!(
            target: targets::MESSAGE_LOOP,
            kind = ?msg.kind,
            window = ?msg.window,
            "message delivered"
        );
        self.record_delivery(msg);
        Ok(DispatchOutcome {
            handled: false,
            delivered_to: msg.window,
        })
    }

    fn record_delivery(&mut self, msg: Message) {
        let capacity = self.config.delivery_log_capacity;
        if capacity == 0 {
            return;
        }
        if self.delivered.len() >= capacity {
            let excess = self.delivered.len() + 1 - capacity;
            self.delivered.drain(..excess);
        }
        self.delivered.push(msg);
    }

    /// Queue messages for every timer expired by `now`.
    pub fn fire_timers_at(&mut self, now: Instant) -> usize {
        let fired = self.timers.process_expired_at(now);
        let count = fired.len();
        self.queue.extend(fired.into_iter().map(Message::timer));
        count
    }

    /// Fire expired timers, then drain the queue in FIFO order.
    ///
    /// Returns the number of messages processed.
    pub fn pump<F: MessageFilter>(&mut self, filter: &mut F) -> std::result::Result<usize, F::Error> {
        self.pump_at(filter, Instant::now())
    }

    /// [`pump`](Self::pump) with an explicit clock reading.
    pub fn pump_at<F: MessageFilter>(
        &mut self,
        filter: &mut F,
        now: Instant,
    ) -> std::result::Result<usize, F::Error> {
        self.fire_timers_at(now);
        let mut processed = 0;
        while let Some(msg) = self.queue.pop_front() {
            self.dispatch(filter, msg)?;
            processed += 1;
        }
        Ok(processed)
    }
}

impl MessageHost for ThreadMessageLoop {
    fn subscribe(&mut self, backend: InterceptBackend) -> Result<SubscriptionId> {
        let supported = match backend {
            InterceptBackend::Filter => self.config.filters_supported,
            InterceptBackend::Hook => self.config.hooks_supported,
        };
        if !supported {
            return Err(HostError::BackendUnavailable(backend));
        }
        let id = self.subscriptions.insert(backend);
        tracing::debug!(target: targets::MESSAGE_LOOP, ?backend, ?id, "interceptor installed");
        Ok(id)
    }

    fn unsubscribe(&mut self, id: SubscriptionId) -> Result<()> {
        match self.subscriptions.remove(id) {
            Some(backend) => {
                tracing::debug!(target: targets::MESSAGE_LOOP, ?backend, ?id, "interceptor removed");
                Ok(())
            }
            None => Err(HostError::InvalidSubscription),
        }
    }

    fn owns_message_loop(&self) -> bool {
        self.config.owns_message_loop
    }

    fn active_window(&self) -> Option<WindowHandle> {
        self.active_window
    }

    fn focused_window(&self) -> Option<WindowHandle> {
        self.focused_window
    }

    fn windows(&self) -> &WindowTree {
        &self.windows
    }

    fn start_timer(&mut self, interval: Duration) -> TimerId {
        self.timers.start_repeating(interval)
    }

    fn stop_timer(&mut self, id: TimerId) -> Result<()> {
        Ok(self.timers.stop(id)?)
    }

    fn track_input(&mut self, enabled: bool) {
        self.tracking_input = enabled;
    }

    fn hide_caret(&mut self) {
        self.caret_hidden = true;
    }

    fn show_caret(&mut self) {
        self.caret_hidden = false;
    }

    fn keyboard_tooltip_target(&self) -> Option<WindowHandle> {
        self.tooltip_target
    }

    fn notify_tooltip_focus(&mut self, target: WindowHandle, focused: bool) {
        self.tooltip_notifications.push((target, focused));
    }
}

static_assertions::assert_impl_all!(ThreadMessageLoop: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::message::MessageKind;

    /// Consumes mouse moves and retargets key messages to a fixed window.
    struct TestFilter {
        retarget: Option<WindowHandle>,
        seen: usize,
    }

    impl MessageFilter for TestFilter {
        type Error = HostError;

        fn pre_filter_message(
            &mut self,
            _host: &mut dyn MessageHost,
            msg: &mut Message,
        ) -> std::result::Result<bool, HostError> {
            self.seen += 1;
            if msg.kind.is_key()
                && let Some(target) = self.retarget
            {
                msg.window = Some(target);
            }
            Ok(msg.kind.is_mouse_move())
        }
    }

    fn setup() -> (ThreadMessageLoop, WindowHandle, WindowHandle) {
        let mut event_loop = ThreadMessageLoop::new();
        let form = event_loop
            .windows_mut()
            .create_top_level("form", Rect::new(0, 0, 200, 200));
        let menu = event_loop
            .windows_mut()
            .create_child(form, "menu", Rect::new(0, 0, 200, 20))
            .unwrap();
        (event_loop, form, menu)
    }

    #[test]
    fn test_filter_skipped_without_subscription() {
        let (mut event_loop, form, _) = setup();
        let mut filter = TestFilter {
            retarget: None,
            seen: 0,
        };
        let outcome = event_loop
            .dispatch(&mut filter, Message::mouse_move(form, Default::default()))
            .unwrap();
        assert!(!outcome.handled);
        assert_eq!(filter.seen, 0);
        assert_eq!(event_loop.delivered().len(), 1);
    }

    #[test]
    fn test_filter_consumes_and_retargets() {
        let (mut event_loop, form, menu) = setup();
        event_loop.subscribe(InterceptBackend::Filter).unwrap();
        let mut filter = TestFilter {
            retarget: Some(menu),
            seen: 0,
        };

        let moved = event_loop
            .dispatch(&mut filter, Message::mouse_move(form, Default::default()))
            .unwrap();
        assert!(moved.handled);
        assert_eq!(moved.delivered_to, None);

        let key = event_loop.dispatch(&mut filter, Message::key_down(form)).unwrap();
        assert!(!key.handled);
        assert_eq!(key.delivered_to, Some(menu));
        assert_eq!(filter.seen, 2);
    }

    #[test]
    fn test_filter_blind_under_foreign_loop() {
        let (mut event_loop, form, _) = setup();
        let filter_id = event_loop.subscribe(InterceptBackend::Filter).unwrap();
        event_loop.set_owns_message_loop(false);
        assert!(!event_loop.is_intercepting());

        let hook_id = event_loop.subscribe(InterceptBackend::Hook).unwrap();
        assert!(event_loop.is_intercepting());

        let mut filter = TestFilter {
            retarget: None,
            seen: 0,
        };
        event_loop.dispatch(&mut filter, Message::key_down(form)).unwrap();
        assert_eq!(filter.seen, 1);

        event_loop.unsubscribe(hook_id).unwrap();
        event_loop.unsubscribe(filter_id).unwrap();
        assert!(matches!(
            event_loop.unsubscribe(filter_id),
            Err(HostError::InvalidSubscription)
        ));
    }

    #[test]
    fn test_unsupported_backend() {
        let mut event_loop = MessageLoopBuilder::new().hooks_supported(false).build();
        let result = event_loop.subscribe(InterceptBackend::Hook);
        assert!(matches!(
            result,
            Err(HostError::BackendUnavailable(InterceptBackend::Hook))
        ));
        assert_eq!(event_loop.subscription_count(), 0);
    }

    #[test]
    fn test_pump_turns_timers_into_messages() {
        let (mut event_loop, _, _) = setup();
        let id = event_loop.start_timer(Duration::from_millis(500));
        let mut filter = TestFilter {
            retarget: None,
            seen: 0,
        };

        let processed = event_loop
            .pump_at(&mut filter, Instant::now() + Duration::from_millis(600))
            .unwrap();
        assert_eq!(processed, 1);
        assert_eq!(event_loop.delivered()[0].kind, MessageKind::Timer(id));

        event_loop.stop_timer(id).unwrap();
        assert!(!event_loop.is_timer_active(id));
    }

    #[test]
    fn test_pump_is_fifo() {
        let (mut event_loop, form, menu) = setup();
        event_loop.post(Message::paint(menu));
        event_loop.post(Message::paint(form));
        let mut filter = TestFilter {
            retarget: None,
            seen: 0,
        };
        event_loop.pump(&mut filter).unwrap();
        let order: Vec<_> = event_loop.take_delivered().iter().map(|m| m.window).collect();
        assert_eq!(order, vec![Some(menu), Some(form)]);
        assert_eq!(event_loop.pending(), 0);
    }

    #[test]
    fn test_delivery_log_keeps_most_recent() {
        let mut event_loop = MessageLoopBuilder::new().delivery_log_capacity(2).build();
        let form = event_loop
            .windows_mut()
            .create_top_level("form", Rect::new(0, 0, 200, 200));
        let menu = event_loop
            .windows_mut()
            .create_child(form, "menu", Rect::new(0, 0, 200, 20))
            .unwrap();
        let mut filter = TestFilter {
            retarget: None,
            seen: 0,
        };
        for window in [form, menu, form] {
            event_loop.dispatch(&mut filter, Message::paint(window)).unwrap();
        }
        let kept: Vec<_> = event_loop.delivered().iter().map(|m| m.window).collect();
        assert_eq!(kept, vec![Some(menu), Some(form)]);

        let mut quiet = MessageLoopBuilder::new().delivery_log_capacity(0).build();
        let outcome = quiet.dispatch(&mut filter, Message::paint(form)).unwrap();
        assert_eq!(outcome.delivered_to, Some(form));
        assert!(quiet.delivered().is_empty());
    }
}
