//! Event dispatch.
//!
//! Mouse events go to the widget under the pointer, which is tracked incrementally: on every move
//! the dispatcher starts from the widget that had focus before, descends into children under the
//! pointer and ascends through ancestors that no longer contain it. Keyboard events go to whichever
//! widget grabbed keyboard focus.
//!
//! Mouse focus never leaves its *layer*, which is either the main root or the root of an overlay.
//! While an overlay is open the main tree can't receive mouse events.

use crate::context::EventContext;
use crate::events::{Event, MouseEvent};
use crate::rect::Point;
use crate::tree::WidgetTree;
use crate::widget::WidgetId;
use cgmath::EuclideanSpace;

/// The widget under the pointer.
#[derive(Debug, Clone, PartialEq)]
pub struct MouseFocus {
    target: WidgetId,
    /// Absolute position of the target.
    origin: Point,
    /// From the layer root down to the parent of the target.
    parents: Vec<WidgetId>,
    /// Index in `parents` of the nearest ancestor that handles child events.
    listener: Option<usize>,
    layer: WidgetId,
}

impl MouseFocus {
    fn on_layer(tree: &WidgetTree, layer: WidgetId) -> MouseFocus {
        MouseFocus {
            target: layer,
            origin: tree.get(layer).position(),
            parents: Vec::new(),
            listener: None,
            layer,
        }
    }

    pub fn target(&self) -> WidgetId {
        self.target
    }

    /// Absolute position of the target, i.e. the sum of its own and all ancestor positions.
    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn parents(&self) -> &[WidgetId] {
        &self.parents
    }

    /// The root of the layer the focus is in.
    pub fn layer(&self) -> WidgetId {
        self.layer
    }
}

/// The widget receiving keyboard events.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyboardFocus {
    target: Option<WidgetId>,
    parents: Vec<WidgetId>,
}

impl KeyboardFocus {
    pub fn target(&self) -> Option<WidgetId> {
        self.target
    }

    pub fn parents(&self) -> &[WidgetId] {
        &self.parents
    }
}

/// Routes events to widgets and tracks focus.
#[derive(Debug)]
pub struct Dispatcher {
    root: WidgetId,
    mouse: MouseFocus,
    keyboard: KeyboardFocus,
}

impl Dispatcher {
    /// Creates a dispatcher with mouse focus on the main root.
    pub fn new(tree: &WidgetTree, root: WidgetId) -> Dispatcher {
        Dispatcher {
            root,
            mouse: MouseFocus::on_layer(tree, root),
            keyboard: KeyboardFocus::default(),
        }
    }

    pub fn root(&self) -> WidgetId {
        self.root
    }

    pub fn mouse_focus(&self) -> &MouseFocus {
        &self.mouse
    }

    pub fn keyboard_focus(&self) -> &KeyboardFocus {
        &self.keyboard
    }

    /// Delivers an event. Mouse positions must be in window coordinates.
    pub fn dispatch(&mut self, tree: &mut WidgetTree, event: &Event, context: &mut EventContext) {
        match event {
            Event::Keyboard(_) => self.dispatch_keyboard(tree, event, context),
            Event::Mouse(event) => self.dispatch_mouse(tree, event, context),
        }
    }

    fn dispatch_keyboard(&self, tree: &mut WidgetTree, event: &Event, context: &mut EventContext) {
        let target = match self.keyboard.target {
            Some(target) => target,
            None => return,
        };
        if let Some(node) = tree.find_mut(target) {
            context.retarget(target, &self.keyboard.parents);
            node.widget_mut().on_event(event, context);
        }
    }

    fn dispatch_mouse(
        &mut self,
        tree: &mut WidgetTree,
        event: &MouseEvent,
        context: &mut EventContext,
    ) {
        if let MouseEvent::Move { position } = event {
            let previous = self.mouse.clone();
            if self.update_mouse_focus(tree, *position) {
                tracing::trace!(
                    from = ?previous.target,
                    to = ?self.mouse.target,
                    "mouse focus changed"
                );
                if let Some(node) = tree.find_mut(previous.target) {
                    let exit = MouseEvent::Exit {
                        position: *position,
                    };
                    context.retarget(previous.target, &previous.parents);
                    node.widget_mut()
                        .on_event(&Event::Mouse(exit.to_local(previous.origin)), context);
                }
                let enter = MouseEvent::Enter {
                    position: *position,
                };
                deliver(tree, &self.mouse, &enter, context);
            }
        }

        deliver(tree, &self.mouse, event, context);
        self.bubble(tree, event, context);
    }

    /// Re-delivers an event outward from the focus, stopping at the nearest ancestor that handles
    /// child events.
    fn bubble(&self, tree: &mut WidgetTree, event: &MouseEvent, context: &mut EventContext) {
        let listener = match self.mouse.listener {
            Some(listener) => listener,
            None => return,
        };
        let parents = &self.mouse.parents;
        let mut child = self.mouse.target;
        let mut origin = self.mouse.origin - tree.get(child).position().to_vec();
        for &ancestor in parents[listener + 1..].iter().rev() {
            origin -= tree.get(ancestor).position().to_vec();
            child = ancestor;
        }

        let ancestor = parents[listener];
        let node = tree.get_mut(ancestor);
        if node.widget().handles_child_events() {
            context.retarget(ancestor, &parents[..listener]);
            node.widget_mut().on_child_event(
                &Event::Mouse(event.to_local(origin)),
                context,
                child,
            );
        }
    }

    /// Re-hit-tests from the current focus. Returns true if the focus changed.
    fn update_mouse_focus(&mut self, tree: &WidgetTree, position: Point) -> bool {
        let previous = self.mouse.target;
        let focus = &mut self.mouse;

        let local = Point::from_vec(position - focus.origin);
        if !tree.hit_test(focus.target, local) {
            // ends on the layer root if nothing contains the point
            while let Some(parent) = focus.parents.pop() {
                focus.origin -= tree.get(focus.target).position().to_vec();
                focus.target = parent;
                if tree.hit_test(parent, Point::from_vec(position - focus.origin)) {
                    break;
                }
            }
            debug_assert!(!focus.parents.is_empty() || focus.target == focus.layer);
        }

        loop {
            let local = Point::from_vec(position - focus.origin);
            match tree.child_at(focus.target, local) {
                Some(child) => {
                    focus.parents.push(focus.target);
                    focus.origin += tree.get(child).position().to_vec();
                    focus.target = child;
                }
                None => break,
            }
        }

        if focus.target == previous {
            return false;
        }
        focus.listener = nearest_listener(tree, &focus.parents);
        true
    }

    /// Moves mouse focus onto the root of a layer, with an empty ancestor stack.
    pub fn focus_layer(&mut self, tree: &WidgetTree, layer: WidgetId) {
        tracing::debug!(?layer, "mouse focus moved to layer");
        self.mouse = MouseFocus::on_layer(tree, layer);
    }

    /// Called when a layer goes away. Resets any focus that was inside it.
    pub fn release_layer(&mut self, tree: &WidgetTree, layer: WidgetId) {
        if self.mouse.layer == layer {
            tracing::debug!(?layer, "layer with mouse focus closed; focusing root");
            self.mouse = MouseFocus::on_layer(tree, self.root);
        }
        let keyboard_inside = self.keyboard.target == Some(layer)
            || self.keyboard.parents.first() == Some(&layer);
        if keyboard_inside {
            tracing::debug!(?layer, "layer with keyboard focus closed");
            self.keyboard = KeyboardFocus::default();
        }
    }

    pub fn grab_keyboard(&mut self, target: WidgetId, parents: Vec<WidgetId>) {
        tracing::debug!(?target, "keyboard focus grabbed");
        self.keyboard = KeyboardFocus {
            target: Some(target),
            parents,
        };
    }

    /// Releases keyboard focus if `target` has it.
    pub fn release_keyboard(&mut self, target: WidgetId) {
        if self.keyboard.target == Some(target) {
            tracing::debug!(?target, "keyboard focus released");
            self.keyboard = KeyboardFocus::default();
        }
    }

    /// Brings focus records up to date after the tree changed structurally.
    ///
    /// Focus on a destroyed widget falls back to its layer root (or the main root if the layer is
    /// gone too); keyboard focus on a destroyed widget is released. Ancestor stacks and the mouse
    /// focus origin are recomputed from the tree.
    pub fn refresh(&mut self, tree: &WidgetTree) {
        if !tree.contains(self.mouse.layer) {
            tracing::debug!(layer = ?self.mouse.layer, "mouse focus layer destroyed; focusing root");
            self.mouse = MouseFocus::on_layer(tree, self.root);
        } else if !tree.contains(self.mouse.target) {
            tracing::debug!(target = ?self.mouse.target, "mouse focus destroyed; focusing layer");
            self.mouse = MouseFocus::on_layer(tree, self.mouse.layer);
        } else {
            self.mouse.parents = tree.ancestors(self.mouse.target);
            self.mouse.origin = tree.absolute_position(self.mouse.target);
            self.mouse.listener = nearest_listener(tree, &self.mouse.parents);
        }

        if let Some(target) = self.keyboard.target {
            if tree.contains(target) {
                self.keyboard.parents = tree.ancestors(target);
            } else {
                tracing::debug!(?target, "keyboard focus destroyed; releasing");
                self.keyboard = KeyboardFocus::default();
            }
        }
    }
}

fn deliver(
    tree: &mut WidgetTree,
    focus: &MouseFocus,
    event: &MouseEvent,
    context: &mut EventContext,
) {
    context.retarget(focus.target, &focus.parents);
    tree.get_mut(focus.target)
        .widget_mut()
        .on_event(&Event::Mouse(event.to_local(focus.origin)), context);
}

fn nearest_listener(tree: &WidgetTree, parents: &[WidgetId]) -> Option<usize> {
    parents
        .iter()
        .rposition(|id| tree.get(*id).widget().handles_child_events())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Surface;
    use crate::events::MouseButton;
    use crate::rect::Size;
    use crate::widget::Widget;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    struct Probe {
        name: &'static str,
        size: Size,
        listens: bool,
        log: Log,
    }

    impl Widget for Probe {
        fn paint(&self, _: &mut dyn Surface, _: Size) {}

        fn on_event(&mut self, event: &Event, _: &mut EventContext) {
            let entry = match event {
                Event::Mouse(MouseEvent::Enter { position }) => {
                    format!("{} enter {} {}", self.name, position.x, position.y)
                }
                Event::Mouse(MouseEvent::Exit { position }) => {
                    format!("{} exit {} {}", self.name, position.x, position.y)
                }
                Event::Mouse(MouseEvent::Move { position }) => {
                    format!("{} move {} {}", self.name, position.x, position.y)
                }
                Event::Mouse(event) => format!("{} other {}", self.name, event.position().x),
                Event::Keyboard(_) => format!("{} key", self.name),
            };
            self.log.borrow_mut().push(entry);
        }

        fn on_child_event(&mut self, event: &Event, _: &mut EventContext, child: WidgetId) {
            let position = event.as_mouse().map(|e| e.position()).unwrap_or(Point::origin());
            self.log.borrow_mut().push(format!(
                "{} child {:?} at {} {}",
                self.name, child, position.x, position.y
            ));
        }

        fn handles_child_events(&self) -> bool {
            self.listens
        }
    }

    struct Fixture {
        tree: WidgetTree,
        dispatcher: Dispatcher,
        log: Log,
        root: WidgetId,
        panel: WidgetId,
        button: WidgetId,
        other: WidgetId,
    }

    /// root (100×100)
    /// ├── panel at (10, 10), 50×50, listens to child events
    /// │   └── button at (5, 5), 10×10
    /// └── other at (70, 0), 20×20
    fn fixture() -> Fixture {
        let log = Log::default();
        let probe = |name, size, listens| Probe {
            name,
            size,
            listens,
            log: Rc::clone(&log),
        };
        let mut tree = WidgetTree::new();
        let root = tree.create(None, probe("root", Size::new(100., 100.), true));
        let panel = tree.create(Some(root), probe("panel", Size::new(50., 50.), true));
        let button = tree.create(Some(panel), probe("button", Size::new(10., 10.), false));
        let other = tree.create(Some(root), probe("other", Size::new(20., 20.), false));
        tree.set_children(root, vec![panel, other]);
        tree.set_children(panel, vec![button]);
        for (id, position) in [
            (root, Point::new(0., 0.)),
            (panel, Point::new(10., 10.)),
            (button, Point::new(5., 5.)),
            (other, Point::new(70., 0.)),
        ] {
            let node = tree.get_mut(id);
            let size = node.widget().downcast_ref::<Probe>().unwrap().size;
            node.set_size(size);
            node.set_position(position);
        }
        let dispatcher = Dispatcher::new(&tree, root);
        Fixture {
            tree,
            dispatcher,
            log,
            root,
            panel,
            button,
            other,
        }
    }

    impl Fixture {
        fn send(&mut self, event: MouseEvent) {
            let mut state = ();
            let mut context = EventContext::new(&mut state, Size::new(100., 100.));
            self.dispatcher
                .dispatch(&mut self.tree, &Event::Mouse(event), &mut context);
        }

        fn move_to(&mut self, x: f64, y: f64) {
            self.send(MouseEvent::Move {
                position: Point::new(x, y),
            });
        }

        fn take_log(&self) -> Vec<String> {
            std::mem::take(&mut *self.log.borrow_mut())
        }
    }

    #[test]
    fn move_descends_and_synthesizes_enter_exit() {
        let mut f = fixture();
        f.move_to(17., 18.);
        assert_eq!(f.dispatcher.mouse_focus().target(), f.button);
        assert_eq!(f.dispatcher.mouse_focus().parents(), &[f.root, f.panel]);
        assert_eq!(f.dispatcher.mouse_focus().origin(), Point::new(15., 15.));
        assert_eq!(
            f.take_log()[..3],
            [
                "root exit 17 18".to_string(),
                "button enter 2 3".to_string(),
                "button move 2 3".to_string(),
            ]
        );

        f.move_to(75., 5.);
        assert_eq!(f.dispatcher.mouse_focus().target(), f.other);
        assert_eq!(
            f.take_log()[..3],
            [
                "button exit 60 -10".to_string(),
                "other enter 5 5".to_string(),
                "other move 5 5".to_string(),
            ],
            "exit comes before enter"
        );
    }

    #[test]
    fn no_enter_when_focus_is_unchanged() {
        let mut f = fixture();
        f.move_to(75., 5.);
        f.take_log();
        f.move_to(76., 6.);
        assert_eq!(
            f.take_log(),
            vec![
                "other move 6 6".to_string(),
                format!("root child {:?} at 76 6", f.other),
            ]
        );
    }

    #[test]
    fn ascends_to_the_containing_ancestor() {
        let mut f = fixture();
        f.move_to(17., 18.);
        f.move_to(40., 40.);
        assert_eq!(f.dispatcher.mouse_focus().target(), f.panel);
        assert_eq!(f.dispatcher.mouse_focus().parents(), &[f.root]);
        f.move_to(200., 200.);
        assert_eq!(
            f.dispatcher.mouse_focus().target(),
            f.root,
            "root is the fallback"
        );
    }

    #[test]
    fn events_bubble_to_the_nearest_listener_in_local_coordinates() {
        let mut f = fixture();
        f.move_to(17., 18.);
        f.take_log();
        f.send(MouseEvent::Down {
            position: Point::new(17., 18.),
            button: MouseButton::Left,
        });
        assert_eq!(
            f.take_log(),
            vec![
                "button other 2".to_string(),
                format!("panel child {:?} at 7 8", f.button),
            ],
            "root listens too but panel is nearer"
        );
    }

    #[test]
    fn bubbling_skips_ancestors_that_dont_listen() {
        let mut f = fixture();
        f.tree.get_mut(f.panel).downcast_mut::<Probe>().listens = false;
        f.dispatcher.refresh(&f.tree);
        f.move_to(17., 18.);
        f.take_log();
        f.send(MouseEvent::Down {
            position: Point::new(17., 18.),
            button: MouseButton::Left,
        });
        assert_eq!(
            f.take_log(),
            vec![
                "button other 2".to_string(),
                format!("root child {:?} at 17 18", f.panel),
            ]
        );
    }

    #[test]
    fn focus_layer_and_release() {
        let mut f = fixture();
        f.move_to(17., 18.);
        f.dispatcher.focus_layer(&f.tree, f.other);
        assert_eq!(f.dispatcher.mouse_focus().target(), f.other);
        assert!(f.dispatcher.mouse_focus().parents().is_empty());

        f.move_to(5., 5.);
        assert_eq!(
            f.dispatcher.mouse_focus().target(),
            f.other,
            "focus doesn't leave the layer"
        );

        f.dispatcher.release_layer(&f.tree, f.other);
        assert_eq!(f.dispatcher.mouse_focus().target(), f.root);
    }

    #[test]
    fn refresh_drops_dead_focus() {
        let mut f = fixture();
        f.move_to(17., 18.);
        f.dispatcher.grab_keyboard(f.button, vec![f.root, f.panel]);
        let children = f.tree.take_children(f.panel);
        for child in children {
            f.tree.destroy(child);
        }
        f.dispatcher.refresh(&f.tree);
        assert_eq!(f.dispatcher.mouse_focus().target(), f.root);
        assert_eq!(f.dispatcher.keyboard_focus().target(), None);
    }

    #[test]
    fn keyboard_events_go_to_the_grabbing_widget() {
        let mut f = fixture();
        let mut state = ();
        let key = Event::Keyboard(crate::events::KeyboardEvent::Text("a".into()));

        let mut context = EventContext::new(&mut state, Size::new(100., 100.));
        f.dispatcher.dispatch(&mut f.tree, &key, &mut context);
        assert!(f.take_log().is_empty(), "nobody has keyboard focus");

        f.dispatcher.grab_keyboard(f.other, vec![f.root]);
        let mut context = EventContext::new(&mut state, Size::new(100., 100.));
        f.dispatcher.dispatch(&mut f.tree, &key, &mut context);
        assert_eq!(f.take_log(), vec!["other key".to_string()]);

        f.dispatcher.release_keyboard(f.button);
        assert_eq!(f.dispatcher.keyboard_focus().target(), Some(f.other));
        f.dispatcher.release_keyboard(f.other);
        assert_eq!(f.dispatcher.keyboard_focus().target(), None);
    }
}
