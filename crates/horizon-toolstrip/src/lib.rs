//! Horizon Toolstrip - menu mode, shortcut routing and menu merging.
//!
//! This crate manages the toolstrips of one UI thread:
//!
//! - **Registry**: Strips and items in slotmap arenas, drop-down lineage,
//!   context-menu assignment, per-strip shortcut indexes
//! - **Menu Mode**: [`ModalMenuFilter`] routes keyboard input to the open
//!   popup, dismisses popups on outside clicks and activation loss
//! - **Shortcuts**: Validity rules and root-window-aware dispatch
//! - **Merging**: MDI-style menu merge with an undo history and revert
//! - **Rendering**: Process-wide renderer selection with change signals
//!
//! The host side (windows, messages, the thread loop) lives in
//! [`horizon_toolstrip_core`].
//!
//! # Example
//!
//! ```
//! use horizon_toolstrip::{Key, Keys, StripKind, ToolStrip, ToolStripItem, ToolStripManager};
//! use horizon_toolstrip_core::{Message, Rect, ThreadMessageLoop};
//!
//! let mut host = ThreadMessageLoop::new();
//! let form = host.windows_mut().create_form(None, "main", Rect::new(0, 0, 640, 480), false);
//! let bar = host.windows_mut().create_child(form, "menu", Rect::new(0, 0, 640, 24))?;
//!
//! let mut manager = ToolStripManager::new();
//! let reg = manager.registry_mut();
//! let menu = reg.register(ToolStrip::new(StripKind::MenuStrip, bar).with_name("menu"));
//! let save = reg.create_item(ToolStripItem::new("&Save").with_shortcut(Keys::ctrl(Key::S)));
//! reg.add_item(menu, save)?;
//!
//! host.set_focused_window(Some(bar));
//! let msg = Message::key_down(bar);
//! assert!(manager.process_cmd_key(&host, &msg, Keys::ctrl(Key::S)));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod debug;
mod error;
pub mod item;
pub mod keys;
mod manager;
pub mod merge;
pub mod modal_filter;
pub mod registry;
pub mod renderer;
mod shortcut;
pub mod strip;

pub use error::{CallbackError, Result, ToolStripError};
pub use item::{ItemId, MergeAction, ToolStripItem};
pub use keys::{Key, Keys, KeysParseError, Modifiers, is_menu_key, is_valid_shortcut};
pub use manager::{ToolStripManager, ToolStripManagerConfig};
pub use merge::{MergeHistoryItem, MergeHistoryRecord, UndoAction};
pub use modal_filter::{DEFAULT_KEEP_ALIVE_INTERVAL, MenuModeChanged, ModalMenuFilter};
pub use registry::ToolStripRegistry;
pub use renderer::{
    ProfessionalRenderer, RenderMode, RendererSettings, SystemRenderer, ToolStripRenderer,
};
pub use shortcut::ShortcutIndex;
pub use strip::{CloseReason, ClosingCallback, StripId, StripKind, ToolStrip};

static_assertions::assert_impl_all!(StripId: Copy, Send, Sync);
static_assertions::assert_impl_all!(ItemId: Copy, Send, Sync);
static_assertions::assert_impl_all!(ToolStripRegistry: Send);
static_assertions::assert_impl_all!(ToolStripError: Send, Sync);
