//! Periodic widget callbacks.

use crate::tree::WidgetTree;
use crate::widget::{Widget, WidgetId};
use core::any::Any;
use core::fmt;
use std::time::{Duration, Instant};

/// Returned by an animation callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationControl {
    /// Keep calling.
    Continue,
    /// Remove the animation.
    Stop,
}

/// An animation callback. Receives the animated widget and the application state.
pub type AnimationCallback = Box<dyn FnMut(&mut dyn Widget, &mut dyn Any) -> AnimationControl>;

struct Animation {
    widget: WidgetId,
    period: Duration,
    last_fired: Instant,
    callback: AnimationCallback,
}

/// Registry of running animations, polled once per loop iteration.
#[derive(Default)]
pub struct Animations {
    entries: Vec<Animation>,
}

impl fmt::Debug for Animations {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|entry| (entry.widget, entry.period)))
            .finish()
    }
}

impl Animations {
    pub fn new() -> Animations {
        Animations::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Animates a widget, replacing any animation it already has. The first call happens one
    /// `period` after `now`.
    pub fn register(
        &mut self,
        widget: WidgetId,
        period: Duration,
        now: Instant,
        callback: AnimationCallback,
    ) {
        self.remove(widget);
        self.entries.push(Animation {
            widget,
            period,
            last_fired: now,
            callback,
        });
    }

    /// Stops animating a widget. Returns true if it was animated.
    pub fn remove(&mut self, widget: WidgetId) -> bool {
        let len = self.entries.len();
        self.entries.retain(|entry| entry.widget != widget);
        self.entries.len() != len
    }

    /// Drops the animations of destroyed widgets.
    pub fn forget(&mut self, destroyed: &[WidgetId]) {
        self.entries.retain(|entry| !destroyed.contains(&entry.widget));
    }

    /// Fires every animation whose period has elapsed. Returns true if anything fired, in which
    /// case the window needs to be repainted.
    pub fn tick(&mut self, now: Instant, tree: &mut WidgetTree, state: &mut dyn Any) -> bool {
        let mut fired = false;
        self.entries.retain_mut(|entry| {
            let node = match tree.find_mut(entry.widget) {
                Some(node) => node,
                None => return false,
            };
            if now.saturating_duration_since(entry.last_fired) < entry.period {
                return true;
            }
            entry.last_fired = now;
            fired = true;
            tracing::trace!(widget = ?entry.widget, "animation fired");
            (entry.callback)(node.widget_mut(), &mut *state) == AnimationControl::Continue
        });
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Surface;
    use crate::rect::Size;

    struct Blinker {
        frames: u32,
    }

    impl Widget for Blinker {
        fn paint(&self, _: &mut dyn Surface, _: Size) {}
    }

    fn blink(stop_after: u32) -> AnimationCallback {
        Box::new(move |widget: &mut dyn Widget, _: &mut dyn Any| {
            let blinker = widget.downcast_mut::<Blinker>().unwrap();
            blinker.frames += 1;
            if blinker.frames >= stop_after {
                AnimationControl::Stop
            } else {
                AnimationControl::Continue
            }
        })
    }

    #[test]
    fn fires_once_the_period_has_elapsed() {
        let mut tree = WidgetTree::new();
        let id = tree.create(None, Blinker { frames: 0 });
        let mut animations = Animations::new();
        let start = Instant::now();
        animations.register(id, Duration::from_millis(100), start, blink(10));

        assert!(!animations.tick(start + Duration::from_millis(50), &mut tree, &mut ()));
        assert_eq!(tree.get_mut(id).downcast_mut::<Blinker>().frames, 0);

        assert!(animations.tick(start + Duration::from_millis(110), &mut tree, &mut ()));
        assert_eq!(tree.get_mut(id).downcast_mut::<Blinker>().frames, 1);

        assert!(
            !animations.tick(start + Duration::from_millis(150), &mut tree, &mut ()),
            "the period restarts at the last firing"
        );
    }

    #[test]
    fn stop_removes_the_entry() {
        let mut tree = WidgetTree::new();
        let id = tree.create(None, Blinker { frames: 0 });
        let mut animations = Animations::new();
        let start = Instant::now();
        animations.register(id, Duration::from_millis(10), start, blink(1));
        assert!(animations.tick(start + Duration::from_millis(10), &mut tree, &mut ()));
        assert!(animations.is_empty());
    }

    #[test]
    fn destroyed_widgets_are_dropped() {
        let mut tree = WidgetTree::new();
        let a = tree.create(None, Blinker { frames: 0 });
        let b = tree.create(None, Blinker { frames: 0 });
        let mut animations = Animations::new();
        let start = Instant::now();
        animations.register(a, Duration::from_millis(10), start, blink(10));
        animations.register(b, Duration::from_millis(10), start, blink(10));
        animations.register(b, Duration::from_millis(20), start, blink(10));
        assert_eq!(animations.len(), 2, "registering again replaces");

        tree.destroy(a);
        assert!(animations.tick(start + Duration::from_millis(20), &mut tree, &mut ()));
        assert_eq!(animations.len(), 1);

        animations.forget(&tree.take_destroyed());
        animations.forget(&[b]);
        assert!(animations.is_empty());
        assert!(!animations.remove(b));
    }
}
