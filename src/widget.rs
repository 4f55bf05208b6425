//! The widget capability surface.

use crate::backend::Surface;
use crate::context::EventContext;
use crate::events::Event;
use crate::rect::{Point, Rect, Size};
use core::any::Any;
use core::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_WIDGET_ID: AtomicU64 = AtomicU64::new(1);

/// A unique identifier for a widget.
///
/// Ids are issued in increasing order and never reused.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WidgetId(u64);

impl WidgetId {
    pub(crate) fn next() -> WidgetId {
        WidgetId(NEXT_WIDGET_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw id value.
    pub fn to_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// For downcasting.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Geometry of one child, handed to [`Widget::layout`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChildLayout {
    pub id: WidgetId,
    /// The child’s size; already laid out.
    pub size: Size,
    /// The child’s position in the parent. Written by the parent’s layout.
    pub position: Point,
}

/// A retained, mutable visual element.
///
/// The widget tree only ever talks to widgets through this trait, so a concrete widget type
/// implements just the capabilities it needs and inherits the defaults for the rest:
///
/// - no `layout`: the widget keeps its previous size and leaves children where they are
/// - no `on_event`: events are ignored
/// - no `handles_child_events`: the widget doesn’t take part in bubbling, even if it implements
///   `on_child_event`
/// - no `hit_test`: the widget is hit anywhere inside its bounds
///
/// Children are owned by the tree, not the widget. A widget learns about them in `layout` and
/// `on_child_event`.
pub trait Widget: AsAny + 'static {
    /// Paints the widget at the origin of the surface.
    ///
    /// Children are painted afterwards by the tree, each translated and clipped to its bounds.
    fn paint(&self, surface: &mut dyn Surface, size: Size);

    /// Positions the children and returns the widget’s new size.
    ///
    /// Children have already been laid out when this is called. Returning `None` keeps the
    /// current size.
    fn layout(&mut self, children: &mut [ChildLayout]) -> Option<Size> {
        let _ = children;
        None
    }

    /// Handles an event that targets this widget. Mouse positions are in local coordinates.
    fn on_event(&mut self, event: &Event, context: &mut EventContext) {
        let _ = (event, context);
    }

    /// Handles an event that targeted a descendant.
    ///
    /// Only called if [`Widget::handles_child_events`] also returns true, so a widget that
    /// implements this must override both. Events go to the nearest such ancestor of the mouse
    /// focus only. `child` is the direct child the event came through; mouse positions are in this
    /// widget’s local coordinates.
    fn on_child_event(&mut self, event: &Event, context: &mut EventContext, child: WidgetId) {
        let _ = (event, context, child);
    }

    /// Whether this widget wants [`Widget::on_child_event`] calls. Defaults to false.
    ///
    /// The dispatcher caches the answer whenever mouse focus changes or the tree is rebuilt, so it
    /// shouldn’t change in between.
    fn handles_child_events(&self) -> bool {
        false
    }

    /// Returns true if the local point hits this widget.
    fn hit_test(&self, point: Point, size: Size) -> bool {
        Rect::from_size(size).contains(point)
    }

    /// Called right before the widget is dropped by the tree.
    fn on_destroy(&mut self) {}

    /// A name for debug output.
    fn debug_name(&self) -> &'static str {
        let name = core::any::type_name::<Self>();
        name.rsplit("::").next().unwrap_or(name)
    }
}

impl dyn Widget {
    /// Downcasts to a concrete widget type.
    pub fn downcast_ref<W: Widget>(&self) -> Option<&W> {
        self.as_any().downcast_ref::<W>()
    }

    /// Downcasts to a concrete widget type.
    pub fn downcast_mut<W: Widget>(&mut self) -> Option<&mut W> {
        self.as_any_mut().downcast_mut::<W>()
    }
}
