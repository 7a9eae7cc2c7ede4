//! UI-thread ownership checks.
//!
//! Menu state, strip registries and the thread message loop belong to the
//! UI thread that created them. [`ThreadAffinity`] remembers that thread;
//! operations that mutate menu state check it on entry and name themselves
//! so a violation says which call crossed threads.
//!
//! ```
//! use horizon_toolstrip_core::ThreadAffinity;
//!
//! let owner = ThreadAffinity::current();
//! owner.debug_check("set_active_tool_strip");
//! assert!(owner.is_owner_thread());
//! ```

use std::thread::{self, ThreadId};

/// The UI thread a piece of menu state is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadAffinity {
    owner: ThreadId,
}

impl Default for ThreadAffinity {
    fn default() -> Self {
        Self::current()
    }
}

impl ThreadAffinity {
    /// Bind to the calling thread.
    pub fn current() -> Self {
        Self {
            owner: thread::current().id(),
        }
    }

    pub fn owner(&self) -> ThreadId {
        self.owner
    }

    #[inline]
    pub fn is_owner_thread(&self) -> bool {
        thread::current().id() == self.owner
    }

    /// Panic unless called from the owning thread. Checked in every build.
    ///
    /// `operation` names the call in the panic message.
    #[inline]
    pub fn check(&self, operation: &'static str) {
        if !self.is_owner_thread() {
            self.cross_thread(operation);
        }
    }

    /// [`check`](Self::check) in debug builds; nothing in release builds.
    #[inline]
    pub fn debug_check(&self, operation: &'static str) {
        #[cfg(debug_assertions)]
        self.check(operation);
        #[cfg(not(debug_assertions))]
        let _ = operation;
    }

    #[cold]
    #[inline(never)]
    fn cross_thread(&self, operation: &'static str) -> ! {
        let caller = thread::current();
        panic!(
            "{operation} called from UI-foreign thread \"{}\" ({:?}); menu state is owned by {:?}",
            caller.name().unwrap_or("<unnamed>"),
            caller.id(),
            self.owner
        )
    }
}
