//! The context handed to event handlers.

use crate::animation::{AnimationCallback, AnimationControl};
use crate::overlay::{OverlayRequest, Placement};
use crate::rect::Size;
use crate::view::View;
use crate::widget::{Widget, WidgetId};
use core::any::Any;
use core::ops::BitOrAssign;
use std::time::Duration;

/// What the handlers of one dispatch asked the host to do next.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameResult {
    /// The view tree should be rebuilt from the state.
    pub rebuild_requested: bool,
    /// The window should be repainted.
    pub repaint_requested: bool,
}

impl BitOrAssign for FrameResult {
    fn bitor_assign(&mut self, rhs: FrameResult) {
        self.rebuild_requested |= rhs.rebuild_requested;
        self.repaint_requested |= rhs.repaint_requested;
    }
}

/// A request that touches shared structures; applied once the dispatch has finished.
pub(crate) enum Command {
    GrabKeyboardFocus {
        target: WidgetId,
        parents: Vec<WidgetId>,
    },
    ReleaseKeyboardFocus(WidgetId),
    PushOverlay(Box<dyn Any>),
    /// Closes the overlay whose root is this widget.
    CloseLayer(WidgetId),
    Animate {
        widget: WidgetId,
        period: Duration,
        callback: AnimationCallback,
    },
    StopAnimation(WidgetId),
}

/// Context for one event dispatch.
///
/// A fresh context is created for every raw event. Between deliveries the dispatcher points it at
/// the widget currently handling the event, along with that widget’s ancestors.
pub struct EventContext<'a> {
    state: &'a mut dyn Any,
    window_size: Size,
    target: Option<WidgetId>,
    parents: Vec<WidgetId>,
    result: FrameResult,
    commands: Vec<Command>,
}

impl<'a> EventContext<'a> {
    pub(crate) fn new(state: &'a mut dyn Any, window_size: Size) -> EventContext<'a> {
        EventContext {
            state,
            window_size,
            target: None,
            parents: Vec::new(),
            result: FrameResult::default(),
            commands: Vec::new(),
        }
    }

    pub(crate) fn retarget(&mut self, target: WidgetId, parents: &[WidgetId]) {
        self.target = Some(target);
        self.parents.clear();
        self.parents.extend_from_slice(parents);
    }

    pub(crate) fn finish(self) -> (FrameResult, Vec<Command>) {
        (self.result, self.commands)
    }

    /// The widget handling the event.
    ///
    /// # Panics
    /// If called outside of a handler.
    pub fn id(&self) -> WidgetId {
        self.target
            .expect("EventContext::id called outside of an event handler")
    }

    /// Ancestors of the handling widget, from its layer root down to its parent.
    pub fn parents(&self) -> &[WidgetId] {
        &self.parents
    }

    /// The window size.
    pub fn window_size(&self) -> Size {
        self.window_size
    }

    /// The application state.
    ///
    /// # Panics
    /// If the state is not an `S`.
    pub fn state<S: 'static>(&mut self) -> &mut S {
        self.state.downcast_mut::<S>().unwrap_or_else(|| {
            panic!(
                "EventContext::state: application state is not a {}",
                core::any::type_name::<S>()
            )
        })
    }

    /// The application state, type-erased. This is what lens writers take.
    pub fn state_any(&mut self) -> &mut dyn Any {
        &mut *self.state
    }

    /// Asks for the view tree to be rebuilt after this dispatch. Implies a repaint.
    pub fn request_rebuild(&mut self) {
        self.result.rebuild_requested = true;
        self.result.repaint_requested = true;
    }

    /// Asks for a repaint after this dispatch.
    pub fn request_repaint(&mut self) {
        self.result.repaint_requested = true;
    }

    /// The requests made so far.
    pub fn frame_result(&self) -> FrameResult {
        self.result
    }

    /// Routes keyboard events to the handling widget from now on.
    pub fn grab_keyboard_focus(&mut self) {
        let target = self.id();
        self.commands.push(Command::GrabKeyboardFocus {
            target,
            parents: self.parents.clone(),
        });
    }

    /// Gives up keyboard focus if the handling widget has it.
    ///
    /// Widgets holding keyboard focus should call this before they go away.
    pub fn release_keyboard_focus(&mut self) {
        let target = self.id();
        self.commands.push(Command::ReleaseKeyboardFocus(target));
    }

    /// Opens an overlay whose content is rebuilt from `logic` along with the main tree.
    ///
    /// The overlay grabs mouse focus as soon as it is shown.
    pub fn push_overlay<S, V, F>(&mut self, placement: Placement, logic: F)
    where
        S: 'static,
        V: View<S>,
        F: Fn(&S) -> V + 'static,
    {
        self.commands
            .push(Command::PushOverlay(Box::new(OverlayRequest::new(
                placement, logic,
            ))));
    }

    /// Closes the overlay the handling widget lives in. Does nothing in the main tree.
    pub fn close_overlay(&mut self) {
        let layer = self.parents.first().copied().unwrap_or_else(|| self.id());
        self.commands.push(Command::CloseLayer(layer));
    }

    /// Calls `callback` on the handling widget every `period` until it returns
    /// [`AnimationControl::Stop`] or the widget is destroyed.
    pub fn animate<W, F>(&mut self, period: Duration, mut callback: F)
    where
        W: Widget,
        F: FnMut(&mut W, &mut dyn Any) -> AnimationControl + 'static,
    {
        let widget = self.id();
        let callback: AnimationCallback =
            Box::new(move |widget: &mut dyn Widget, state: &mut dyn Any| {
                let widget = widget
                    .downcast_mut::<W>()
                    .expect("animated widget changed type");
                callback(widget, state)
            });
        self.commands.push(Command::Animate {
            widget,
            period,
            callback,
        });
    }

    /// Stops animating the handling widget.
    pub fn stop_animation(&mut self) {
        let widget = self.id();
        self.commands.push(Command::StopAnimation(widget));
    }
}
