//! Events.

use crate::rect::{Offset, Point, Size};
use cgmath::EuclideanSpace;
use std::path::PathBuf;

/// Mouse buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other(u16),
}

/// A mouse event.
///
/// Positions are in the coordinate system of whoever is looking at the event: window
/// coordinates when coming from the input backend, local coordinates when delivered to a widget.
#[derive(Debug, Clone, PartialEq)]
pub enum MouseEvent {
    /// A button was pressed.
    Down { position: Point, button: MouseButton },

    /// A button was released.
    Up { position: Point, button: MouseButton },

    /// The pointer moved with no buttons held.
    Move { position: Point },

    /// The pointer moved while a button was held.
    ///
    /// Drags never change mouse focus: they keep going to the widget the drag started on.
    Drag { position: Point, button: MouseButton },

    /// Scroll wheel or trackpad scrolling, in points.
    Scroll { position: Point, delta: Offset },

    /// The pointer entered the widget. Synthesized by the dispatcher.
    Enter { position: Point },

    /// The pointer left the widget. Synthesized by the dispatcher.
    Exit { position: Point },

    /// A file was dropped onto the window.
    FileDrop { position: Point, path: PathBuf },
}

impl MouseEvent {
    /// The pointer location.
    pub fn position(&self) -> Point {
        match self {
            MouseEvent::Down { position, .. }
            | MouseEvent::Up { position, .. }
            | MouseEvent::Move { position }
            | MouseEvent::Drag { position, .. }
            | MouseEvent::Scroll { position, .. }
            | MouseEvent::Enter { position }
            | MouseEvent::Exit { position }
            | MouseEvent::FileDrop { position, .. } => *position,
        }
    }

    /// Returns the same event with a different location.
    pub fn with_position(&self, new_position: Point) -> MouseEvent {
        let mut event = self.clone();
        match &mut event {
            MouseEvent::Down { position, .. }
            | MouseEvent::Up { position, .. }
            | MouseEvent::Move { position }
            | MouseEvent::Drag { position, .. }
            | MouseEvent::Scroll { position, .. }
            | MouseEvent::Enter { position }
            | MouseEvent::Exit { position }
            | MouseEvent::FileDrop { position, .. } => *position = new_position,
        }
        event
    }

    /// Translates the event into a coordinate system whose origin is at `origin`.
    pub fn to_local(&self, origin: Point) -> MouseEvent {
        self.with_position(Point::from_vec(self.position() - origin))
    }

    /// Inverse of [`MouseEvent::to_local`].
    pub fn to_parent(&self, origin: Point) -> MouseEvent {
        self.with_position(origin + self.position().to_vec())
    }
}

/// Modifier key state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct KeyModifiers {
    /// Whether any shift key is pressed.
    pub shift: bool,

    /// Whether any control key is pressed.
    pub control: bool,

    /// Whether any option key or alt key is pressed.
    pub option: bool,

    /// Whether any command key or meta key is pressed.
    pub command: bool,
}

/// Keyboard layout-independent identifiers for keyboard keys.
///
/// Letters and digits are not listed; they arrive as [`KeyCode::Character`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Character(char),
    Return,
    Tab,
    Space,
    Delete,
    ForwardDelete,
    Escape,
    LeftArrow,
    DownArrow,
    UpArrow,
    RightArrow,
    Home,
    End,
    PageUp,
    PageDown,
    Function(u8),
}

/// A keyboard event.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyboardEvent {
    KeyDown {
        code: KeyCode,
        modifiers: KeyModifiers,
    },
    KeyUp {
        code: KeyCode,
        modifiers: KeyModifiers,
    },
    /// Committed text input (after IME composition and layout mapping).
    Text(String),
}

/// An event as delivered to a widget.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Mouse(MouseEvent),
    Keyboard(KeyboardEvent),
}

impl Event {
    /// Returns the mouse event, if this is one.
    pub fn as_mouse(&self) -> Option<&MouseEvent> {
        match self {
            Event::Mouse(event) => Some(event),
            Event::Keyboard(_) => None,
        }
    }
}

/// An event as produced by the input backend.
#[derive(Debug, Clone, PartialEq)]
pub enum RawEvent {
    Mouse(MouseEvent),
    Keyboard(KeyboardEvent),
    /// The window content area changed size.
    Resize(Size),
    /// The window wants to close.
    Quit,
}

#[test]
fn test_local_translation_round_trips() {
    let origin = Point::new(40., 12.5);
    let event = MouseEvent::Scroll {
        position: Point::new(100.25, 30.),
        delta: Offset::new(0., -3.),
    };
    let local = event.to_local(origin);
    assert_eq!(local.position(), Point::new(60.25, 17.5));
    assert_eq!(local.to_parent(origin), event, "to_parent undoes to_local");
    if let MouseEvent::Scroll { delta, .. } = local {
        assert_eq!(delta, Offset::new(0., -3.), "only the position is translated");
    } else {
        panic!("translation changed the event kind");
    }
}
