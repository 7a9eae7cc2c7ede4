//! Core systems for Horizon Toolstrip.
//!
//! This crate provides the host-side plumbing the toolstrip manager runs on:
//!
//! - **Windows**: Handles, parent/child hierarchy, coordinate mapping
//! - **Messages**: Key, mouse, timer and activation messages
//! - **Message Loop**: A single-thread loop with pre-dispatch filtering
//! - **Host Seam**: The [`MessageHost`] and [`MessageFilter`] traits
//! - **Timers**: One-shot and repeating timers
//! - **Signal/Slot System**: Synchronous change notification
//!
//! # Filtering Example
//!
//! ```
//! use horizon_toolstrip_core::{
//!     InterceptBackend, Message, MessageFilter, MessageHost, Point, Rect, ThreadMessageLoop,
//! };
//!
//! /// Swallows every mouse move.
//! struct NoMoves;
//!
//! impl MessageFilter for NoMoves {
//!     type Error = horizon_toolstrip_core::HostError;
//!
//!     fn pre_filter_message(
//!         &mut self,
//!         _host: &mut dyn MessageHost,
//!         msg: &mut Message,
//!     ) -> Result<bool, Self::Error> {
//!         Ok(msg.kind.is_mouse_move())
//!     }
//! }
//!
//! let mut event_loop = ThreadMessageLoop::new();
//! let form = event_loop.windows_mut().create_top_level("form", Rect::new(0, 0, 320, 240));
//! event_loop.subscribe(InterceptBackend::Filter)?;
//!
//! let outcome = event_loop.dispatch(&mut NoMoves, Message::mouse_move(form, Point::new(4, 4)))?;
//! assert!(outcome.handled);
//! # Ok::<(), horizon_toolstrip_core::HostError>(())
//! ```

mod error;
mod geometry;
pub mod host;
pub mod logging;
mod message;
pub mod message_loop;
pub mod signal;
pub mod thread_check;
mod timer;
pub mod window;

pub use error::{HostError, Result, TimerError, WindowError};
pub use geometry::{Point, Rect, Size};
pub use host::{InterceptBackend, MessageFilter, MessageHost, SubscriptionId};
pub use logging::PerfSpan;
pub use message::{Message, MessageKind};
pub use message_loop::{
    DEFAULT_DELIVERY_LOG_CAPACITY, DispatchOutcome, MessageLoopBuilder, MessageLoopConfig, ThreadMessageLoop,
};
pub use signal::{ConnectionId, Signal};
pub use thread_check::ThreadAffinity;
pub use timer::{TimerId, TimerKind, TimerManager};
pub use window::{WindowHandle, WindowKind, WindowTree};
