//! Messages delivered by the host event loop.
//!
//! A [`Message`] is the unit the thread loop hands to an installed filter
//! before normal dispatch. Filters may rewrite [`Message::window`] to retarget
//! keyboard input, or consume the message outright.

use crate::geometry::Point;
use crate::timer::TimerId;
use crate::window::WindowHandle;

/// The kind of a host message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// Pointer moved over a client area.
    MouseMove,
    /// Pointer moved over a non-client area (point in screen coordinates).
    NcMouseMove,
    LeftButtonDown,
    RightButtonDown,
    MiddleButtonDown,
    /// Button pressed over a non-client area (point in screen coordinates).
    NcLeftButtonDown,
    NcRightButtonDown,
    NcMiddleButtonDown,
    LeftButtonUp,
    KeyDown,
    KeyUp,
    Char,
    DeadChar,
    /// Key pressed with Alt held, or F10.
    SysKeyDown,
    SysKeyUp,
    SysChar,
    SysDeadChar,
    Paint,
    /// A timer fired.
    Timer(TimerId),
    /// Window activation changed.
    Activate,
}

impl MessageKind {
    /// Mouse messages, client and non-client.
    pub fn is_mouse(self) -> bool {
        matches!(
            self,
            Self::MouseMove
                | Self::NcMouseMove
                | Self::LeftButtonDown
                | Self::RightButtonDown
                | Self::MiddleButtonDown
                | Self::NcLeftButtonDown
                | Self::NcRightButtonDown
                | Self::NcMiddleButtonDown
                | Self::LeftButtonUp
        )
    }

    /// Keyboard messages including the system variants.
    pub fn is_key(self) -> bool {
        matches!(
            self,
            Self::KeyDown
                | Self::KeyUp
                | Self::Char
                | Self::DeadChar
                | Self::SysKeyDown
                | Self::SysKeyUp
                | Self::SysChar
                | Self::SysDeadChar
        )
    }

    pub fn is_mouse_move(self) -> bool {
        matches!(self, Self::MouseMove | Self::NcMouseMove)
    }

    /// Any button-down, client or non-client.
    pub fn is_button_down(self) -> bool {
        matches!(
            self,
            Self::LeftButtonDown
                | Self::RightButtonDown
                | Self::MiddleButtonDown
                | Self::NcLeftButtonDown
                | Self::NcRightButtonDown
                | Self::NcMiddleButtonDown
        )
    }

    /// Non-client messages carry screen coordinates.
    pub fn is_non_client(self) -> bool {
        matches!(
            self,
            Self::NcMouseMove
                | Self::NcLeftButtonDown
                | Self::NcRightButtonDown
                | Self::NcMiddleButtonDown
        )
    }
}

/// A message travelling through the thread's event loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Message {
    /// What happened.
    pub kind: MessageKind,
    /// The window the message is addressed to.
    pub window: Option<WindowHandle>,
    /// Pointer position: client coordinates of `window`, or screen
    /// coordinates for non-client messages.
    pub point: Point,
}

impl Message {
    /// Create a message with no position.
    pub fn new(kind: MessageKind, window: Option<WindowHandle>) -> Self {
        Self {
            kind,
            window,
            point: Point::ZERO,
        }
    }

    /// Create a message at a position.
    pub fn at(kind: MessageKind, window: WindowHandle, point: Point) -> Self {
        Self {
            kind,
            window: Some(window),
            point,
        }
    }

    pub fn mouse_move(window: WindowHandle, point: Point) -> Self {
        Self::at(MessageKind::MouseMove, window, point)
    }

    /// Left button press in client coordinates of `window`.
    pub fn button_down(window: WindowHandle, point: Point) -> Self {
        Self::at(MessageKind::LeftButtonDown, window, point)
    }

    /// Left button press on a non-client area, `screen` in screen coordinates.
    pub fn nc_button_down(window: WindowHandle, screen: Point) -> Self {
        Self::at(MessageKind::NcLeftButtonDown, window, screen)
    }

    pub fn key_down(window: WindowHandle) -> Self {
        Self::new(MessageKind::KeyDown, Some(window))
    }

    pub fn sys_key_down(window: WindowHandle) -> Self {
        Self::new(MessageKind::SysKeyDown, Some(window))
    }

    pub fn paint(window: WindowHandle) -> Self {
        Self::new(MessageKind::Paint, Some(window))
    }

    pub fn timer(id: TimerId) -> Self {
        Self::new(MessageKind::Timer(id), None)
    }

    /// Whether a menu filter should look at this message at all.
    #[inline]
    pub fn is_key_or_mouse(&self) -> bool {
        self.kind.is_mouse() || self.kind.is_key()
    }
}
