//! Window identity and the per-thread window tree.
//!
//! A [`WindowHandle`] is an opaque, value-comparable identity for a native
//! window. The [`WindowTree`] records the parent-child relationships and
//! placement of those windows so that the menu-mode router can answer
//! questions such as "is this window inside that strip?" or "which form owns
//! this toolbar?" without touching a platform API.
//!
//! Bounds of a top-level window (including popups) are in screen coordinates;
//! bounds of a child window are relative to its parent's client origin.
//!
//! # Example
//!
//! ```
//! use horizon_toolstrip_core::{Point, Rect, WindowTree};
//!
//! let mut tree = WindowTree::new();
//! let form = tree.create_form(None, "main", Rect::new(100, 100, 800, 600), false);
//! let menu = tree.create_child(form, "menu", Rect::new(0, 0, 800, 24)).unwrap();
//!
//! assert!(tree.is_child_or_same(form, menu));
//! assert_eq!(tree.root(menu), Some(form));
//! let local = tree.map_point(None, menu, Point::new(110, 105)).unwrap();
//! assert_eq!(local, Point::new(10, 5));
//! ```

use slotmap::{new_key_type, SlotMap};

use crate::error::WindowError;
use crate::geometry::{Point, Rect};
use crate::logging::targets;

new_key_type! {
    /// Opaque identity of a window.
    ///
    /// Handles are stable for the lifetime of the window and become invalid
    /// once it is destroyed.
    pub struct WindowHandle;
}

/// What role a window plays in its tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowKind {
    /// A plain top-level window.
    TopLevel,
    /// A child window hosted inside another window.
    Child,
    /// A transient top-level window such as a drop-down menu.
    Popup,
    /// A form; may host MDI child forms when `mdi_container` is set.
    Form {
        /// Whether the form is a multiple-document-interface container.
        mdi_container: bool,
    },
}

#[derive(Debug)]
struct WindowData {
    name: String,
    kind: WindowKind,
    parent: Option<WindowHandle>,
    children: Vec<WindowHandle>,
    bounds: Rect,
    active_mdi_child: Option<WindowHandle>,
    maximized: bool,
}

/// Arena of windows with parent links and placement.
#[derive(Debug, Default)]
pub struct WindowTree {
    windows: SlotMap<WindowHandle, WindowData>,
}

impl WindowTree {
    /// Create an empty window tree.
    pub fn new() -> Self {
        Self {
            windows: SlotMap::with_key(),
        }
    }

    fn insert(
        &mut self,
        name: &str,
        kind: WindowKind,
        parent: Option<WindowHandle>,
        bounds: Rect,
    ) -> WindowHandle {
        let handle = self.windows.insert(WindowData {
            name: name.to_string(),
            kind,
            parent,
            children: Vec::new(),
            bounds,
            active_mdi_child: None,
            maximized: false,
        });
        if let Some(parent_data) = parent.and_then(|p| self.windows.get_mut(p)) {
            parent_data.children.push(handle);
        }
        tracing::trace!(target: targets::CORE, ?handle, name, ?kind, "created window");
        handle
    }

    /// Create a top-level window with screen bounds.
    pub fn create_top_level(&mut self, name: &str, bounds: Rect) -> WindowHandle {
        self.insert(name, WindowKind::TopLevel, None, bounds)
    }

    /// Create a popup window with screen bounds.
    pub fn create_popup(&mut self, name: &str, bounds: Rect) -> WindowHandle {
        self.insert(name, WindowKind::Popup, None, bounds)
    }

    /// Create a child window with bounds relative to `parent`.
    pub fn create_child(
        &mut self,
        parent: WindowHandle,
        name: &str,
        bounds: Rect,
    ) -> Result<WindowHandle, WindowError> {
        if !self.windows.contains_key(parent) {
            return Err(WindowError::InvalidWindow(parent));
        }
        Ok(self.insert(name, WindowKind::Child, Some(parent), bounds))
    }

    /// Create a form. A form with a parent is an MDI child of that parent.
    ///
    /// An invalid parent yields a top-level form.
    pub fn create_form(
        &mut self,
        parent: Option<WindowHandle>,
        name: &str,
        bounds: Rect,
        mdi_container: bool,
    ) -> WindowHandle {
        let parent = parent.filter(|p| self.windows.contains_key(*p));
        self.insert(name, WindowKind::Form { mdi_container }, parent, bounds)
    }

    /// Destroy a window and all of its descendants.
    pub fn destroy(&mut self, handle: WindowHandle) -> Result<(), WindowError> {
        let data = self
            .windows
            .get(handle)
            .ok_or(WindowError::InvalidWindow(handle))?;
        if let Some(parent) = data.parent
            && let Some(parent_data) = self.windows.get_mut(parent)
        {
            parent_data.children.retain(|&c| c != handle);
            if parent_data.active_mdi_child == Some(handle) {
                parent_data.active_mdi_child = None;
            }
        }

        let mut pending = vec![handle];
        while let Some(next) = pending.pop() {
            if let Some(removed) = self.windows.remove(next) {
                pending.extend(removed.children);
            }
        }
        Ok(())
    }

    /// Check if a window exists.
    pub fn contains(&self, handle: WindowHandle) -> bool {
        self.windows.contains_key(handle)
    }

    /// Number of live windows.
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    /// Whether the tree holds no windows.
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn name(&self, handle: WindowHandle) -> Option<&str> {
        self.windows.get(handle).map(|d| d.name.as_str())
    }

    pub fn kind(&self, handle: WindowHandle) -> Option<WindowKind> {
        self.windows.get(handle).map(|d| d.kind)
    }

    pub fn parent(&self, handle: WindowHandle) -> Option<WindowHandle> {
        self.windows.get(handle).and_then(|d| d.parent)
    }

    pub fn children(&self, handle: WindowHandle) -> &[WindowHandle] {
        self.windows
            .get(handle)
            .map(|d| d.children.as_slice())
            .unwrap_or(&[])
    }

    /// Bounds relative to the parent (screen bounds for top-level windows).
    pub fn bounds(&self, handle: WindowHandle) -> Option<Rect> {
        self.windows.get(handle).map(|d| d.bounds)
    }

    /// Move or resize a window.
    pub fn set_bounds(&mut self, handle: WindowHandle, bounds: Rect) -> Result<(), WindowError> {
        let data = self
            .windows
            .get_mut(handle)
            .ok_or(WindowError::InvalidWindow(handle))?;
        data.bounds = bounds;
        Ok(())
    }

    /// Re-parent a window; `None` makes it top-level.
    pub fn set_parent(
        &mut self,
        handle: WindowHandle,
        new_parent: Option<WindowHandle>,
    ) -> Result<(), WindowError> {
        if !self.windows.contains_key(handle) {
            return Err(WindowError::InvalidWindow(handle));
        }
        if let Some(parent) = new_parent {
            if !self.windows.contains_key(parent) {
                return Err(WindowError::InvalidWindow(parent));
            }
            if self.is_child_or_same(handle, parent) {
                return Err(WindowError::ParentCycle(handle));
            }
        }

        let old_parent = self.windows.get(handle).and_then(|d| d.parent);
        if let Some(old) = old_parent
            && let Some(old_data) = self.windows.get_mut(old)
        {
            old_data.children.retain(|&c| c != handle);
        }
        if let Some(data) = self.windows.get_mut(handle) {
            data.parent = new_parent;
        }
        if let Some(parent_data) = new_parent.and_then(|p| self.windows.get_mut(p)) {
            parent_data.children.push(handle);
        }
        Ok(())
    }

    /// Whether `child` is `parent` itself or one of its descendants.
    ///
    /// Unknown handles are never related.
    pub fn is_child_or_same(&self, parent: WindowHandle, child: WindowHandle) -> bool {
        if !self.windows.contains_key(parent) {
            return false;
        }
        let mut current = Some(child);
        while let Some(handle) = current {
            if handle == parent {
                return true;
            }
            current = self.windows.get(handle).and_then(|d| d.parent);
        }
        false
    }

    /// The outermost ancestor of a window (the window itself if top-level).
    pub fn root(&self, handle: WindowHandle) -> Option<WindowHandle> {
        let mut current = self.windows.get(handle).map(|_| handle)?;
        while let Some(parent) = self.windows.get(current).and_then(|d| d.parent) {
            current = parent;
        }
        Some(current)
    }

    /// The nearest form containing a window, including the window itself.
    pub fn find_form(&self, handle: WindowHandle) -> Option<WindowHandle> {
        let mut current = Some(handle);
        while let Some(h) = current {
            let data = self.windows.get(h)?;
            if matches!(data.kind, WindowKind::Form { .. }) {
                return Some(h);
            }
            current = data.parent;
        }
        None
    }

    pub fn is_popup(&self, handle: WindowHandle) -> bool {
        matches!(self.kind(handle), Some(WindowKind::Popup))
    }

    pub fn is_mdi_container(&self, handle: WindowHandle) -> bool {
        matches!(
            self.kind(handle),
            Some(WindowKind::Form {
                mdi_container: true
            })
        )
    }

    /// A form hosted inside an MDI container.
    pub fn is_mdi_child(&self, handle: WindowHandle) -> bool {
        matches!(self.kind(handle), Some(WindowKind::Form { .. }))
            && self.parent(handle).is_some_and(|p| self.is_mdi_container(p))
    }

    pub fn is_maximized(&self, handle: WindowHandle) -> bool {
        self.windows.get(handle).is_some_and(|d| d.maximized)
    }

    pub fn set_maximized(&mut self, handle: WindowHandle, maximized: bool) -> Result<(), WindowError> {
        let data = self
            .windows
            .get_mut(handle)
            .ok_or(WindowError::InvalidWindow(handle))?;
        data.maximized = maximized;
        Ok(())
    }

    /// The active MDI child of an MDI container form.
    pub fn active_mdi_child(&self, form: WindowHandle) -> Option<WindowHandle> {
        self.windows.get(form).and_then(|d| d.active_mdi_child)
    }

    /// Mark `child` as the active MDI child of `form`.
    pub fn set_active_mdi_child(
        &mut self,
        form: WindowHandle,
        child: Option<WindowHandle>,
    ) -> Result<(), WindowError> {
        if let Some(c) = child
            && self.parent(c) != Some(form)
        {
            return Err(WindowError::InvalidWindow(c));
        }
        let data = self
            .windows
            .get_mut(form)
            .ok_or(WindowError::InvalidWindow(form))?;
        data.active_mdi_child = child;
        Ok(())
    }

    /// Origin of a window's client area in screen coordinates.
    pub fn screen_origin(&self, handle: WindowHandle) -> Option<Point> {
        let mut origin = Point::ZERO;
        let mut current = Some(handle);
        while let Some(h) = current {
            let data = self.windows.get(h)?;
            origin = origin + data.bounds.origin;
            current = data.parent;
        }
        Some(origin)
    }

    /// Screen-space bounds of a window.
    pub fn screen_bounds(&self, handle: WindowHandle) -> Option<Rect> {
        let origin = self.screen_origin(handle)?;
        let size = self.windows.get(handle)?.bounds.size;
        Some(Rect { origin, size })
    }

    /// The window's own client rectangle, anchored at (0, 0).
    pub fn client_rect(&self, handle: WindowHandle) -> Option<Rect> {
        self.windows.get(handle).map(|d| Rect::from_size(d.bounds.size))
    }

    /// Convert a point from one window's coordinates to another's.
    ///
    /// `from == None` means the point is already in screen coordinates.
    pub fn map_point(
        &self,
        from: Option<WindowHandle>,
        to: WindowHandle,
        point: Point,
    ) -> Result<Point, WindowError> {
        let screen = match from {
            Some(source) => {
                let origin = self
                    .screen_origin(source)
                    .ok_or(WindowError::InvalidWindow(source))?;
                point + origin
            }
            None => point,
        };
        let target = self.screen_origin(to).ok_or(WindowError::InvalidWindow(to))?;
        Ok(screen - target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (WindowTree, WindowHandle, WindowHandle, WindowHandle) {
        let mut tree = WindowTree::new();
        let form = tree.create_form(None, "form", Rect::new(100, 50, 640, 480), false);
        let panel = tree.create_child(form, "panel", Rect::new(10, 30, 300, 200)).unwrap();
        let button = tree.create_child(panel, "button", Rect::new(5, 5, 80, 20)).unwrap();
        (tree, form, panel, button)
    }

    #[test]
    fn test_is_child_or_same() {
        let (tree, form, panel, button) = setup();
        assert!(tree.is_child_or_same(form, form));
        assert!(tree.is_child_or_same(form, button));
        assert!(tree.is_child_or_same(panel, button));
        assert!(!tree.is_child_or_same(button, panel));
    }

    #[test]
    fn test_root_and_form() {
        let (mut tree, form, _panel, button) = setup();
        assert_eq!(tree.root(button), Some(form));
        assert_eq!(tree.find_form(button), Some(form));

        let popup = tree.create_popup("popup", Rect::new(0, 0, 10, 10));
        assert_eq!(tree.root(popup), Some(popup));
        assert_eq!(tree.find_form(popup), None);
        assert!(tree.is_popup(popup));
    }

    #[test]
    fn test_map_point_between_windows() {
        let (tree, form, _panel, button) = setup();
        // button origin on screen = 100+10+5, 50+30+5
        assert_eq!(tree.screen_origin(button), Some(Point::new(115, 85)));
        assert_eq!(
            tree.map_point(None, button, Point::new(120, 90)).unwrap(),
            Point::new(5, 5)
        );
        assert_eq!(
            tree.map_point(Some(button), form, Point::new(0, 0)).unwrap(),
            Point::new(15, 35)
        );
    }

    #[test]
    fn test_destroy_cascades() {
        let (mut tree, form, panel, button) = setup();
        tree.destroy(panel).unwrap();
        assert!(!tree.contains(panel));
        assert!(!tree.contains(button));
        assert!(tree.children(form).is_empty());
        assert_eq!(tree.destroy(panel), Err(WindowError::InvalidWindow(panel)));
    }

    #[test]
    fn test_set_parent_rejects_cycle() {
        let (mut tree, form, panel, button) = setup();
        assert_eq!(
            tree.set_parent(panel, Some(button)),
            Err(WindowError::ParentCycle(panel))
        );
        tree.set_parent(button, Some(form)).unwrap();
        assert_eq!(tree.parent(button), Some(form));
        assert!(!tree.children(panel).contains(&button));
    }

    #[test]
    fn test_mdi_children() {
        let mut tree = WindowTree::new();
        let main = tree.create_form(None, "main", Rect::new(0, 0, 800, 600), true);
        let doc1 = tree.create_form(Some(main), "doc1", Rect::new(0, 0, 200, 200), false);
        let doc2 = tree.create_form(Some(main), "doc2", Rect::new(0, 0, 200, 200), false);
        assert!(tree.is_mdi_container(main));
        assert_eq!(tree.root(doc1), Some(main));

        tree.set_active_mdi_child(main, Some(doc2)).unwrap();
        assert_eq!(tree.active_mdi_child(main), Some(doc2));

        tree.destroy(doc2).unwrap();
        assert_eq!(tree.active_mdi_child(main), None);
        assert!(tree.set_active_mdi_child(doc1, Some(main)).is_err());
    }
}
