//! Traits for backends.
//!
//! Backends are the platform side of things: they produce raw input events and put pixels on the
//! screen. The core never sees a platform event or a GPU handle.

use crate::events::RawEvent;
use crate::rect::{Offset, Point, Size};
use cgmath::EuclideanSpace;
use core::any::Any;
use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;
use thiserror::Error;

/// Something a widget can ask the surface to draw.
///
/// These describe intent rather than pixels; the backend decides what they look like.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Primitive<'a> {
    /// A plain filled box.
    Panel { size: Size },
    /// A single line of text.
    Text { text: &'a str, size: Size },
    /// A two-state control.
    Check {
        size: Size,
        checked: bool,
        highlighted: bool,
    },
}

/// A drawing surface with a transform and clip stack.
pub trait Surface {
    /// Pushes the current transform and clip.
    fn save(&mut self);

    /// Pops the transform and clip pushed by the matching `save`.
    fn restore(&mut self);

    /// Moves the origin.
    fn translate(&mut self, offset: Offset);

    /// Intersects the clip with the rectangle from the origin to `size`.
    fn clip(&mut self, size: Size);

    /// Draws a primitive at the origin.
    fn draw(&mut self, primitive: Primitive<'_>);

    /// For downcasting to backend-specific surfaces.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// A translated and clipped region of a surface.
///
/// Restores the surface when dropped.
pub struct Scope<'a> {
    surface: &'a mut dyn Surface,
}

impl<'a> Scope<'a> {
    /// Saves the surface state, then translates to `origin` and clips to `size`.
    pub fn enter(surface: &'a mut dyn Surface, origin: Point, size: Size) -> Scope<'a> {
        surface.save();
        surface.translate(origin.to_vec());
        surface.clip(size);
        Scope { surface }
    }

    /// The scoped surface.
    pub fn surface(&mut self) -> &mut dyn Surface {
        &mut *self.surface
    }
}

impl<'a> Drop for Scope<'a> {
    fn drop(&mut self) {
        self.surface.restore();
    }
}

/// A render backend.
pub trait RenderBackend {
    /// Error type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Starts a frame for a window of the given size.
    fn begin_frame(&mut self, size: Size) -> Result<(), Self::Error>;

    /// The surface for the current frame.
    fn surface(&mut self) -> &mut dyn Surface;

    /// Presents the frame.
    fn end_frame(&mut self) -> Result<(), Self::Error>;
}

/// An input backend.
pub trait InputBackend {
    /// Error type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns the next event, waiting at most `timeout` for one to arrive.
    ///
    /// `Ok(None)` means the wait timed out.
    fn next_event(&mut self, timeout: Duration) -> Result<Option<RawEvent>, Self::Error>;

    /// How many events are already queued and can be returned without waiting.
    ///
    /// The host handles at most this many more events after the first one in each loop
    /// iteration. Backends that can't tell hand out one event per iteration.
    fn pending(&self) -> usize {
        0
    }
}

/// Returned when every [`EventSender`] has been dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("all input event senders have been dropped")]
pub struct InputClosed;

/// Sends raw events to a [`ChannelInput`]; usually owned by the platform event thread.
#[derive(Debug, Clone)]
pub struct EventSender(Sender<RawEvent>);

impl EventSender {
    /// Enqueues an event.
    pub fn send(&self, event: RawEvent) -> Result<(), InputClosed> {
        self.0.send(event).map_err(|_| InputClosed)
    }
}

/// An input backend fed through a channel.
#[derive(Debug)]
pub struct ChannelInput {
    recv: Receiver<RawEvent>,
}

/// Creates a connected sender/input pair.
pub fn input_channel() -> (EventSender, ChannelInput) {
    let (sender, recv) = channel::unbounded();
    (EventSender(sender), ChannelInput { recv })
}

impl InputBackend for ChannelInput {
    type Error = InputClosed;

    fn next_event(&mut self, timeout: Duration) -> Result<Option<RawEvent>, InputClosed> {
        match self.recv.recv_timeout(timeout) {
            Ok(event) => Ok(Some(event)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(InputClosed),
        }
    }

    fn pending(&self) -> usize {
        self.recv.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Log(Vec<String>);

    impl Surface for Log {
        fn save(&mut self) {
            self.0.push("save".into());
        }
        fn restore(&mut self) {
            self.0.push("restore".into());
        }
        fn translate(&mut self, offset: Offset) {
            self.0.push(format!("translate {} {}", offset.x, offset.y));
        }
        fn clip(&mut self, size: Size) {
            self.0.push(format!("clip {} {}", size.x, size.y));
        }
        fn draw(&mut self, _: Primitive<'_>) {
            self.0.push("draw".into());
        }
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[test]
    fn scope_restores_on_drop() {
        let mut log = Log::default();
        {
            let mut scope = Scope::enter(&mut log, Point::new(3., 4.), Size::new(10., 20.));
            scope.surface().draw(Primitive::Panel {
                size: Size::new(10., 20.),
            });
        }
        assert_eq!(
            log.0,
            vec!["save", "translate 3 4", "clip 10 20", "draw", "restore"]
        );
    }

    #[test]
    fn channel_input_times_out_then_closes() {
        let (sender, mut input) = input_channel();
        sender.send(RawEvent::Quit).unwrap();
        assert_eq!(input.pending(), 1);
        assert_eq!(
            input.next_event(Duration::from_millis(1)),
            Ok(Some(RawEvent::Quit))
        );
        assert_eq!(input.pending(), 0);
        assert_eq!(input.next_event(Duration::from_millis(1)), Ok(None));
        drop(sender);
        assert_eq!(input.next_event(Duration::from_millis(1)), Err(InputClosed));
    }
}
