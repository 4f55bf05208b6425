use crate::backend::{Scope, Surface};
use crate::rect::{assert_point, assert_size, Point, Size};
use crate::widget::{ChildLayout, Widget, WidgetId};
use cgmath::{EuclideanSpace, Zero};
use std::collections::HashMap;
use std::fmt::Write;

/// A node in the widget tree.
pub struct WidgetNode {
    widget: Box<dyn Widget>,
    /// Position in the parent’s coordinate system.
    position: Point,
    size: Size,
    parent: Option<WidgetId>,
    /// An ordered list of all children; also the paint order.
    children: Vec<WidgetId>,
}

impl WidgetNode {
    pub fn widget(&self) -> &dyn Widget {
        &*self.widget
    }

    pub fn widget_mut(&mut self) -> &mut dyn Widget {
        &mut *self.widget
    }

    /// Downcasts the widget.
    ///
    /// # Panics
    /// If the widget is not a `W`.
    pub fn downcast_mut<W: Widget>(&mut self) -> &mut W {
        let name = self.widget.debug_name();
        match self.widget.downcast_mut::<W>() {
            Some(widget) => widget,
            None => panic!(
                "widget is a {}, not a {}",
                name,
                core::any::type_name::<W>()
            ),
        }
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn set_position(&mut self, position: Point) {
        assert_point(position, "widget position");
        self.position = position;
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn set_size(&mut self, size: Size) {
        assert_size(size, "widget size");
        self.size = size;
    }

    pub fn parent(&self) -> Option<WidgetId> {
        self.parent
    }

    pub fn children(&self) -> &[WidgetId] {
        &self.children
    }
}

/// Owns every widget and gives it a stable identity.
///
/// Nodes refer to each other only by [`WidgetId`]. Looking up an id that has been destroyed is a
/// bug wherever the structure guarantees the node exists (`get`), and a normal outcome otherwise
/// (`find`).
#[derive(Default)]
pub struct WidgetTree {
    nodes: HashMap<WidgetId, WidgetNode>,
    /// Ids destroyed since the last `take_destroyed`.
    destroyed: Vec<WidgetId>,
}

impl WidgetTree {
    pub fn new() -> WidgetTree {
        WidgetTree::default()
    }

    /// Number of live widgets.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Adds a widget.
    ///
    /// The widget is *not* added to the parent’s children; the caller decides where it goes.
    pub fn create<W: Widget>(&mut self, parent: Option<WidgetId>, widget: W) -> WidgetId {
        self.create_boxed(parent, Box::new(widget))
    }

    /// Adds a boxed widget. See [`WidgetTree::create`].
    pub fn create_boxed(&mut self, parent: Option<WidgetId>, widget: Box<dyn Widget>) -> WidgetId {
        let id = WidgetId::next();
        tracing::trace!(?id, ?parent, widget = widget.debug_name(), "create widget");
        self.nodes.insert(
            id,
            WidgetNode {
                widget,
                position: Point::origin(),
                size: Size::zero(),
                parent,
                children: Vec::new(),
            },
        );
        id
    }

    /// # Panics
    /// If the widget does not exist.
    #[track_caller]
    pub fn get(&self, id: WidgetId) -> &WidgetNode {
        match self.nodes.get(&id) {
            Some(node) => node,
            None => panic!("widget {:?} does not exist", id),
        }
    }

    /// # Panics
    /// If the widget does not exist.
    #[track_caller]
    pub fn get_mut(&mut self, id: WidgetId) -> &mut WidgetNode {
        match self.nodes.get_mut(&id) {
            Some(node) => node,
            None => panic!("widget {:?} does not exist", id),
        }
    }

    pub fn find(&self, id: WidgetId) -> Option<&WidgetNode> {
        self.nodes.get(&id)
    }

    pub fn find_mut(&mut self, id: WidgetId) -> Option<&mut WidgetNode> {
        self.nodes.get_mut(&id)
    }

    pub fn contains(&self, id: WidgetId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Removes a widget and all of its descendants.
    ///
    /// Does *not* remove the widget from the parent’s children. The widget must exist.
    pub fn destroy(&mut self, id: WidgetId) {
        let mut node = self.nodes.remove(&id).expect("destroying nonexistent widget");
        tracing::trace!(?id, widget = node.widget.debug_name(), "destroy widget");
        node.widget.on_destroy();
        self.destroyed.push(id);
        for child in node.children {
            self.destroy(child);
        }
    }

    /// Returns and clears the ids destroyed since the last call.
    pub fn take_destroyed(&mut self) -> Vec<WidgetId> {
        std::mem::take(&mut self.destroyed)
    }

    pub fn children(&self, id: WidgetId) -> &[WidgetId] {
        &self.get(id).children
    }

    /// Replaces the children of a widget and adopts them.
    ///
    /// Children that are no longer listed are left alone; they should have been destroyed.
    pub fn set_children(&mut self, id: WidgetId, children: Vec<WidgetId>) {
        for child in &children {
            self.get_mut(*child).parent = Some(id);
        }
        self.get_mut(id).children = children;
    }

    /// Takes the children out of a widget, leaving it childless until `set_children`.
    pub fn take_children(&mut self, id: WidgetId) -> Vec<WidgetId> {
        std::mem::take(&mut self.get_mut(id).children)
    }

    /// Visits the subtree in paint order until `visit` returns false.
    ///
    /// Returns false if the traversal was stopped.
    pub fn traverse<F>(&self, id: WidgetId, visit: &mut F) -> bool
    where
        F: FnMut(WidgetId, &WidgetNode) -> bool,
    {
        let node = self.get(id);
        if !visit(id, node) {
            return false;
        }
        node.children.iter().all(|child| self.traverse(*child, visit))
    }

    /// Lays out a subtree, bottom-up, and returns the size of its root.
    pub fn layout(&mut self, id: WidgetId) -> Size {
        let children = self.get(id).children.clone();
        let mut layouts = Vec::with_capacity(children.len());
        for child in children {
            let size = self.layout(child);
            layouts.push(ChildLayout {
                id: child,
                size,
                position: self.get(child).position,
            });
        }

        let node = self.get_mut(id);
        if let Some(size) = node.widget.layout(&mut layouts) {
            node.set_size(size);
        }
        let size = node.size;

        for layout in layouts {
            self.get_mut(layout.id).set_position(layout.position);
        }
        size
    }

    /// Paints a subtree. The root is translated to its own position.
    pub fn paint(&self, id: WidgetId, surface: &mut dyn Surface) {
        let node = self.get(id);
        let mut scope = Scope::enter(surface, node.position, node.size);
        node.widget.paint(scope.surface(), node.size);
        for child in &node.children {
            self.paint(*child, scope.surface());
        }
    }

    /// Returns true if a point in the widget’s local coordinates hits it.
    pub fn hit_test(&self, id: WidgetId, point: Point) -> bool {
        let node = self.get(id);
        point.x >= 0.
            && point.y >= 0.
            && point.x < node.size.x
            && point.y < node.size.y
            && node.widget.hit_test(point, node.size)
    }

    /// Finds the topmost direct child under a point in the parent’s local coordinates.
    pub fn child_at(&self, id: WidgetId, point: Point) -> Option<WidgetId> {
        self.get(id).children.iter().rev().copied().find(|child| {
            let origin = self.get(*child).position;
            self.hit_test(*child, Point::from_vec(point - origin))
        })
    }

    /// Ancestors of a widget, from its root down to its parent.
    pub fn ancestors(&self, id: WidgetId) -> Vec<WidgetId> {
        let mut ancestors = Vec::new();
        let mut current = self.get(id).parent;
        while let Some(parent) = current {
            ancestors.push(parent);
            current = self.get(parent).parent;
        }
        ancestors.reverse();
        ancestors
    }

    /// Position of a widget relative to its root’s parent (i.e. the window).
    pub fn absolute_position(&self, id: WidgetId) -> Point {
        let mut position = self.get(id).position;
        let mut current = self.get(id).parent;
        while let Some(parent) = current {
            let node = self.get(parent);
            position += node.position.to_vec();
            current = node.parent;
        }
        position
    }

    /// An indented outline of a subtree, for debugging.
    pub fn dump(&self, id: WidgetId) -> String {
        let mut out = String::new();
        self.dump_into(id, 0, &mut out);
        out
    }

    fn dump_into(&self, id: WidgetId, depth: usize, out: &mut String) {
        let node = self.get(id);
        let _ = writeln!(
            out,
            "{:indent$}{} {:?} at ({}, {}) size ({}, {})",
            "",
            node.widget.debug_name(),
            id,
            node.position.x,
            node.position.y,
            node.size.x,
            node.size.y,
            indent = depth * 2
        );
        for child in &node.children {
            self.dump_into(*child, depth + 1, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Primitive;
    use core::any::Any;

    /// A fixed-size box that arranges its children in a row.
    struct Row(Size);

    impl Widget for Row {
        fn paint(&self, surface: &mut dyn Surface, size: Size) {
            surface.draw(Primitive::Panel { size });
        }

        fn layout(&mut self, children: &mut [ChildLayout]) -> Option<Size> {
            let mut x = 0.;
            for child in children {
                child.position = Point::new(x, 0.);
                x += child.size.x;
            }
            Some(self.0)
        }
    }

    /// A widget without a layout.
    struct Blob;

    impl Widget for Blob {
        fn paint(&self, _: &mut dyn Surface, _: Size) {}

        fn hit_test(&self, point: Point, _: Size) -> bool {
            point.x < 5.
        }
    }

    struct Recorder(Vec<String>);

    impl Surface for Recorder {
        fn save(&mut self) {}
        fn restore(&mut self) {
            self.0.push("restore".into());
        }
        fn translate(&mut self, offset: crate::rect::Offset) {
            self.0.push(format!("translate {} {}", offset.x, offset.y));
        }
        fn clip(&mut self, _: Size) {}
        fn draw(&mut self, _: Primitive<'_>) {
            self.0.push("draw".into());
        }
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    fn row_with_blobs(tree: &mut WidgetTree) -> (WidgetId, WidgetId, WidgetId) {
        let row = tree.create(None, Row(Size::new(100., 20.)));
        let a = tree.create(Some(row), Row(Size::new(10., 10.)));
        let b = tree.create(Some(row), Blob);
        tree.get_mut(b).set_size(Size::new(10., 10.));
        tree.set_children(row, vec![a, b]);
        (row, a, b)
    }

    #[test]
    fn layout_positions_children_and_keeps_size_without_layout() {
        let mut tree = WidgetTree::new();
        let (row, a, b) = row_with_blobs(&mut tree);
        assert_eq!(tree.layout(row), Size::new(100., 20.));
        assert_eq!(tree.get(a).position(), Point::new(0., 0.));
        assert_eq!(tree.get(b).position(), Point::new(10., 0.));
        assert_eq!(
            tree.get(b).size(),
            Size::new(10., 10.),
            "a widget without layout keeps its size"
        );
    }

    #[test]
    fn destroy_removes_descendants_but_not_the_parent_link() {
        let mut tree = WidgetTree::new();
        let (row, a, b) = row_with_blobs(&mut tree);
        let grandchild = tree.create(Some(a), Blob);
        tree.set_children(a, vec![grandchild]);

        tree.destroy(a);
        assert!(!tree.contains(a));
        assert!(!tree.contains(grandchild));
        assert!(tree.contains(b));
        assert_eq!(tree.children(row), &[a, b], "parent children are untouched");
        assert_eq!(tree.take_destroyed(), vec![a, grandchild]);
        assert!(tree.take_destroyed().is_empty());
    }

    #[test]
    #[should_panic(expected = "does not exist")]
    fn get_of_missing_widget_is_fatal() {
        let mut tree = WidgetTree::new();
        let id = tree.create(None, Blob);
        tree.destroy(id);
        tree.get(id);
    }

    #[test]
    fn hit_testing_respects_widget_override() {
        let mut tree = WidgetTree::new();
        let (row, a, b) = row_with_blobs(&mut tree);
        tree.layout(row);
        assert_eq!(tree.child_at(row, Point::new(3., 3.)), Some(a));
        assert_eq!(tree.child_at(row, Point::new(12., 3.)), Some(b));
        assert_eq!(
            tree.child_at(row, Point::new(17., 3.)),
            None,
            "Blob only accepts hits in its left half"
        );
        assert_eq!(tree.child_at(row, Point::new(50., 3.)), None);
    }

    #[test]
    fn ancestors_and_absolute_position() {
        let mut tree = WidgetTree::new();
        let (row, _, b) = row_with_blobs(&mut tree);
        tree.get_mut(row).set_position(Point::new(5., 7.));
        tree.layout(row);
        assert_eq!(tree.ancestors(b), vec![row]);
        assert_eq!(tree.absolute_position(b), Point::new(15., 7.));
    }

    #[test]
    fn traverse_stops_early() {
        let mut tree = WidgetTree::new();
        let (row, a, _) = row_with_blobs(&mut tree);
        let mut seen = Vec::new();
        let finished = tree.traverse(row, &mut |id, _| {
            seen.push(id);
            id != a
        });
        assert!(!finished);
        assert_eq!(seen, vec![row, a]);
    }

    #[test]
    fn paint_translates_each_child() {
        let mut tree = WidgetTree::new();
        let (row, _, _) = row_with_blobs(&mut tree);
        tree.layout(row);
        let mut recorder = Recorder(Vec::new());
        tree.paint(row, &mut recorder);
        assert_eq!(
            recorder.0,
            vec![
                "translate 0 0",
                "draw",
                "translate 0 0",
                "draw",
                "restore",
                "translate 10 0",
                "restore",
                "restore",
            ]
        );
    }

    #[test]
    fn dump_lists_the_subtree() {
        let mut tree = WidgetTree::new();
        let (row, _, _) = row_with_blobs(&mut tree);
        tree.layout(row);
        let dump = tree.dump(row);
        let lines: Vec<_> = dump.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Row "));
        assert!(lines[2].starts_with("  Blob "));
        assert!(lines[2].ends_with("at (10, 0) size (10, 10)"));
    }

    #[test]
    #[should_panic(expected = "must not be NaN")]
    fn nan_position_is_fatal() {
        let mut tree = WidgetTree::new();
        let id = tree.create(None, Blob);
        tree.get_mut(id).set_position(Point::new(0., std::f64::NAN));
    }
}
