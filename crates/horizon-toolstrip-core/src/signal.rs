//! Change notification for menu state.
//!
//! A [`Signal`] fans one event out to any number of slots. Everything here
//! runs on the UI thread, so slots are invoked synchronously from
//! [`Signal::emit`].
//!
//! Emission iterates a snapshot of the slot list. A slot may therefore
//! connect or disconnect slots (itself included) while it runs; the change
//! takes effect from the next emission.
//!
//! # Example
//!
//! ```
//! use horizon_toolstrip_core::Signal;
//!
//! let renderer_changed = Signal::<()>::new();
//! let id = renderer_changed.connect(|_| println!("repaint strips"));
//! assert_eq!(renderer_changed.emit(()), 1);
//!
//! renderer_changed.disconnect(id);
//! assert_eq!(renderer_changed.emit(()), 0);
//! ```

use std::sync::Arc;

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

use crate::logging::targets;

new_key_type! {
    /// Identifies one slot connected to a [`Signal`].
    pub struct ConnectionId;
}

type Slot<Args> = Arc<dyn Fn(&Args) + Send + Sync>;

/// Notifies connected slots with a payload of type `Args`.
pub struct Signal<Args> {
    slots: Mutex<SlotMap<ConnectionId, Slot<Args>>>,
}

impl<Args: 'static> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args> std::fmt::Debug for Signal<Args> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("slots", &self.slots.lock().len())
            .finish()
    }
}

impl<Args: 'static> Signal<Args> {
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(SlotMap::with_key()),
        }
    }

    /// Connect `slot`; it runs on every later emission until disconnected.
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        self.slots.lock().insert(Arc::new(slot))
    }

    /// Returns `false` if `id` was not connected.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.slots.lock().remove(id).is_some()
    }

    pub fn disconnect_all(&self) {
        self.slots.lock().clear();
    }

    pub fn slot_count(&self) -> usize {
        self.slots.lock().len()
    }

    /// Run every connected slot with `args`. Returns how many ran.
    pub fn emit(&self, args: Args) -> usize {
        let snapshot: Vec<Slot<Args>> = self.slots.lock().values().cloned().collect();
        for slot in &snapshot {
            slot(&args);
        }
        tracing::trace!(target: targets::SIGNAL, slots = snapshot.len(), "signal emitted");
        snapshot.len()
    }
}

static_assertions::assert_impl_all!(Signal<()>: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn setup() -> (Signal<bool>, Arc<Mutex<Vec<bool>>>) {
        let signal = Signal::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        signal.connect(move |shown: &bool| sink.lock().push(*shown));
        (signal, seen)
    }

    #[test]
    fn test_slots_run_in_connection_order() {
        let signal = Signal::<&'static str>::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        for tag in ["menu", "file", "recent"] {
            let order = order.clone();
            signal.connect(move |stage| order.lock().push(format!("{tag}:{stage}")));
        }
        assert_eq!(signal.emit("exit"), 3);
        assert_eq!(*order.lock(), ["menu:exit", "file:exit", "recent:exit"]);
    }

    #[test]
    fn test_disconnect_stops_delivery() {
        let (signal, seen) = setup();
        let extra = signal.connect(|_| {});
        signal.emit(true);
        assert!(signal.disconnect(extra));
        assert!(!signal.disconnect(extra));
        assert_eq!(signal.slot_count(), 1);
        signal.emit(false);
        assert_eq!(*seen.lock(), [true, false]);
    }

    #[test]
    fn test_slot_may_disconnect_during_emit() {
        let signal = Arc::new(Signal::<()>::new());
        let runs = Arc::new(AtomicUsize::new(0));
        let weak = Arc::downgrade(&signal);
        let counter = runs.clone();
        signal.connect(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            if let Some(signal) = weak.upgrade() {
                signal.disconnect_all();
            }
        });

        signal.emit(());
        signal.emit(());
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(signal.slot_count(), 0);
    }
}
