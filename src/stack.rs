//! Stacks.

use crate::backend::Surface;
use crate::rect::{Point, Size};
use crate::sequence::{Seq, Splice};
use crate::view::{BuildCx, RebuildResult, View};
use crate::widget::{ChildLayout, Widget, WidgetId};

/// Stacking direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Top to bottom.
    Vertical,
    /// Left to right.
    Horizontal,
}

/// Lays its children out in a row or column.
#[derive(Debug, Clone, PartialEq)]
pub struct Stack {
    pub axis: Axis,
    /// Space between two adjacent children.
    pub spacing: f64,
    /// Space around all children.
    pub margin: f64,
}

impl Widget for Stack {
    fn paint(&self, _: &mut dyn Surface, _: Size) {}

    fn layout(&mut self, children: &mut [ChildLayout]) -> Option<Size> {
        let mut main = self.margin;
        let mut cross: f64 = 0.;
        for (i, child) in children.iter_mut().enumerate() {
            if i > 0 {
                main += self.spacing;
            }
            let (child_main, child_cross) = match self.axis {
                Axis::Vertical => (child.size.y, child.size.x),
                Axis::Horizontal => (child.size.x, child.size.y),
            };
            child.position = match self.axis {
                Axis::Vertical => Point::new(self.margin, main),
                Axis::Horizontal => Point::new(main, self.margin),
            };
            main += child_main;
            cross = cross.max(child_cross);
        }
        main += self.margin;
        cross += 2. * self.margin;

        Some(match self.axis {
            Axis::Vertical => Size::new(cross, main),
            Axis::Horizontal => Size::new(main, cross),
        })
    }
}

/// A view for a [`Stack`].
pub struct StackView<S: 'static> {
    pub axis: Axis,
    pub spacing: f64,
    pub margin: f64,
    pub children: Seq<S>,
}

/// A vertical stack.
pub fn vstack<S: 'static>(spacing: f64, children: Seq<S>) -> StackView<S> {
    StackView {
        axis: Axis::Vertical,
        spacing,
        margin: 0.,
        children,
    }
}

/// A horizontal stack.
pub fn hstack<S: 'static>(spacing: f64, children: Seq<S>) -> StackView<S> {
    StackView {
        axis: Axis::Horizontal,
        spacing,
        margin: 0.,
        children,
    }
}

impl<S: 'static> StackView<S> {
    pub fn margin(mut self, margin: f64) -> Self {
        self.margin = margin;
        self
    }

    fn widget(&self) -> Stack {
        Stack {
            axis: self.axis,
            spacing: self.spacing,
            margin: self.margin,
        }
    }
}

impl<S: 'static> View<S> for StackView<S> {
    fn build(&self, cx: &mut BuildCx, state: &S) -> WidgetId {
        let id = cx.create(self.widget());
        let mut children = Vec::with_capacity(self.children.len());
        self.children.build(&mut cx.child(id), state, &mut children);
        cx.tree_mut().set_children(id, children);
        id
    }

    fn rebuild(&self, old: &Self, id: WidgetId, cx: &mut BuildCx, state: &S) -> RebuildResult {
        let mut children = cx.tree_mut().take_children(id);
        let mut splice = Splice::new(&mut children);
        let mut result = self
            .children
            .rebuild(&old.children, &mut cx.child(id), state, &mut splice);
        if splice.finish() {
            result.size_changed = true;
        }
        cx.tree_mut().set_children(id, children);

        let stack = cx.widget_mut::<Stack>(id);
        let widget = self.widget();
        if *stack != widget {
            *stack = widget;
            result.size_changed = true;
        }
        result
    }
}

#[test]
fn test_vertical_stack_layout() {
    let mut stack = Stack {
        axis: Axis::Vertical,
        spacing: 10.,
        margin: 0.,
    };
    let a = WidgetId::next();
    let b = WidgetId::next();
    let mut children = [
        ChildLayout {
            id: a,
            size: Size::new(40., 20.),
            position: Point::new(0., 0.),
        },
        ChildLayout {
            id: b,
            size: Size::new(60., 30.),
            position: Point::new(0., 0.),
        },
    ];
    let size = stack.layout(&mut children);
    assert_eq!(children[0].position, Point::new(0., 0.));
    assert_eq!(children[1].position, Point::new(0., 30.));
    assert_eq!(size, Some(Size::new(60., 60.)));
}

#[test]
fn test_horizontal_stack_with_margin() {
    let mut stack = Stack {
        axis: Axis::Horizontal,
        spacing: 5.,
        margin: 2.,
    };
    let mut children = [
        ChildLayout {
            id: WidgetId::next(),
            size: Size::new(10., 10.),
            position: Point::new(0., 0.),
        },
        ChildLayout {
            id: WidgetId::next(),
            size: Size::new(10., 4.),
            position: Point::new(0., 0.),
        },
    ];
    let size = stack.layout(&mut children);
    assert_eq!(children[0].position, Point::new(2., 2.));
    assert_eq!(children[1].position, Point::new(17., 2.));
    assert_eq!(size, Some(Size::new(29., 14.)));
}

#[test]
fn test_empty_stack_is_just_the_margin() {
    let mut stack = Stack {
        axis: Axis::Vertical,
        spacing: 10.,
        margin: 3.,
    };
    assert_eq!(stack.layout(&mut []), Some(Size::new(6., 6.)));
}
