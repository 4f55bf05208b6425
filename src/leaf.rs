//! Leaf widgets.
//!
//! These are deliberately plain: they only describe themselves in terms of [`Primitive`]s and
//! leave the look to the render backend.

use crate::backend::{Primitive, Surface};
use crate::context::EventContext;
use crate::events::{Event, KeyCode, KeyboardEvent, MouseButton, MouseEvent};
use crate::lens::{Lens, Writer};
use crate::rect::{assert_size, Size};
use crate::view::{BuildCx, RebuildResult, View};
use crate::widget::{ChildLayout, Widget, WidgetId};

/// Empty space of a fixed size.
#[derive(Debug, Clone, PartialEq)]
pub struct Spacer {
    pub size: Size,
}

impl Widget for Spacer {
    fn paint(&self, _: &mut dyn Surface, _: Size) {}

    fn layout(&mut self, _: &mut [ChildLayout]) -> Option<Size> {
        Some(self.size)
    }

    fn hit_test(&self, _: crate::rect::Point, _: Size) -> bool {
        false
    }
}

/// A view for a [`Spacer`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpacerView {
    size: Size,
}

pub fn spacer(size: Size) -> SpacerView {
    assert_size(size, "spacer size");
    SpacerView { size }
}

impl<S: 'static> View<S> for SpacerView {
    fn build(&self, cx: &mut BuildCx, _: &S) -> WidgetId {
        cx.create(Spacer { size: self.size })
    }

    fn rebuild(&self, _: &Self, id: WidgetId, cx: &mut BuildCx, _: &S) -> RebuildResult {
        let spacer = cx.widget_mut::<Spacer>(id);
        if spacer.size == self.size {
            return RebuildResult::unchanged();
        }
        spacer.size = self.size;
        RebuildResult::size_changed()
    }
}

/// A line of text.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub text: String,
    pub size: Size,
}

impl Widget for Label {
    fn paint(&self, surface: &mut dyn Surface, size: Size) {
        surface.draw(Primitive::Text {
            text: &self.text,
            size,
        });
    }

    fn layout(&mut self, _: &mut [ChildLayout]) -> Option<Size> {
        Some(self.size)
    }
}

/// A view for a [`Label`] that shows a string from the state.
pub struct LabelView<S> {
    text: Lens<S, String>,
    size: Size,
}

pub fn label<S: 'static>(text: Lens<S, String>, size: Size) -> LabelView<S> {
    assert_size(size, "label size");
    LabelView { text, size }
}

impl<S: 'static> View<S> for LabelView<S> {
    fn build(&self, cx: &mut BuildCx, state: &S) -> WidgetId {
        cx.create(Label {
            text: self.text.get(state).clone(),
            size: self.size,
        })
    }

    fn rebuild(&self, _: &Self, id: WidgetId, cx: &mut BuildCx, state: &S) -> RebuildResult {
        let label = cx.widget_mut::<Label>(id);
        let text = self.text.get(state);
        if label.text != *text {
            label.text.clone_from(text);
        }
        if label.size == self.size {
            return RebuildResult::unchanged();
        }
        label.size = self.size;
        RebuildResult::size_changed()
    }
}

/// A two-state switch.
///
/// Clicking it (or pressing space while it has keyboard focus) writes the inverted value back
/// through its lens and requests a rebuild; the new value arrives with the rebuild.
pub struct Toggle {
    pub value: bool,
    /// Whether the pointer is over the toggle. Not part of the state; survives rebuilds.
    pub hovered: bool,
    pub size: Size,
    writer: Writer<bool>,
}

impl Toggle {
    fn flip(&self, context: &mut EventContext) {
        (self.writer)(context.state_any(), !self.value);
        context.request_rebuild();
    }
}

impl Widget for Toggle {
    fn paint(&self, surface: &mut dyn Surface, size: Size) {
        surface.draw(Primitive::Check {
            size,
            checked: self.value,
            highlighted: self.hovered,
        });
    }

    fn layout(&mut self, _: &mut [ChildLayout]) -> Option<Size> {
        Some(self.size)
    }

    fn on_event(&mut self, event: &Event, context: &mut EventContext) {
        match event {
            Event::Mouse(MouseEvent::Enter { .. }) => {
                self.hovered = true;
                context.request_repaint();
            }
            Event::Mouse(MouseEvent::Exit { .. }) => {
                self.hovered = false;
                context.request_repaint();
            }
            Event::Mouse(MouseEvent::Down {
                button: MouseButton::Left,
                ..
            }) => context.grab_keyboard_focus(),
            Event::Mouse(MouseEvent::Up {
                button: MouseButton::Left,
                ..
            }) => self.flip(context),
            Event::Keyboard(KeyboardEvent::KeyDown {
                code: KeyCode::Space,
                ..
            }) => self.flip(context),
            Event::Keyboard(KeyboardEvent::KeyDown {
                code: KeyCode::Escape,
                ..
            }) => context.release_keyboard_focus(),
            _ => (),
        }
    }
}

/// A view for a [`Toggle`] bound to a boolean in the state.
pub struct ToggleView<S> {
    value: Lens<S, bool>,
    size: Size,
}

pub fn toggle<S: 'static>(value: Lens<S, bool>, size: Size) -> ToggleView<S> {
    assert_size(size, "toggle size");
    ToggleView { value, size }
}

impl<S: 'static> View<S> for ToggleView<S> {
    fn build(&self, cx: &mut BuildCx, state: &S) -> WidgetId {
        cx.create(Toggle {
            value: *self.value.get(state),
            hovered: false,
            size: self.size,
            writer: self.value.writer(),
        })
    }

    fn rebuild(&self, _: &Self, id: WidgetId, cx: &mut BuildCx, state: &S) -> RebuildResult {
        let toggle = cx.widget_mut::<Toggle>(id);
        toggle.value = *self.value.get(state);
        toggle.writer = self.value.writer();
        if toggle.size == self.size {
            return RebuildResult::unchanged();
        }
        toggle.size = self.size;
        RebuildResult::size_changed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lens;
    use crate::rect::Point;
    use crate::tree::WidgetTree;

    struct Settings {
        muted: bool,
        title: String,
    }

    #[test]
    fn toggle_writes_back_and_keeps_hover() {
        let mut tree = WidgetTree::new();
        let mut settings = Settings {
            muted: false,
            title: String::new(),
        };
        let view = toggle(lens!(Settings, muted), Size::new(20., 20.));
        let id = view.build(&mut BuildCx::new(&mut tree, None), &settings);

        let position = Point::new(1., 1.);
        let mut context = EventContext::new(&mut settings, Size::new(100., 100.));
        context.retarget(id, &[]);
        let widget = tree.get_mut(id).downcast_mut::<Toggle>();
        widget.on_event(&Event::Mouse(MouseEvent::Enter { position }), &mut context);
        widget.on_event(
            &Event::Mouse(MouseEvent::Up {
                position,
                button: MouseButton::Left,
            }),
            &mut context,
        );
        let (result, _) = context.finish();
        assert!(result.rebuild_requested);
        assert!(settings.muted, "the writer flipped the state");
        assert!(!tree.get_mut(id).downcast_mut::<Toggle>().value);

        let again = toggle(lens!(Settings, muted), Size::new(20., 20.));
        let result = again.rebuild(&view, id, &mut BuildCx::new(&mut tree, None), &settings);
        assert!(!result.size_changed);
        let widget = tree.get_mut(id).downcast_mut::<Toggle>();
        assert!(widget.value);
        assert!(widget.hovered, "hover survives the rebuild");
    }

    #[test]
    fn label_reports_size_changes() {
        let mut tree = WidgetTree::new();
        let mut settings = Settings {
            muted: false,
            title: "a".into(),
        };
        let view = label(lens!(Settings, title), Size::new(50., 10.));
        let id = view.build(&mut BuildCx::new(&mut tree, None), &settings);

        settings.title = "b".into();
        let same_size = label(lens!(Settings, title), Size::new(50., 10.));
        let result = same_size.rebuild(&view, id, &mut BuildCx::new(&mut tree, None), &settings);
        assert!(!result.size_changed);
        assert_eq!(tree.get_mut(id).downcast_mut::<Label>().text, "b");

        let wider = label(lens!(Settings, title), Size::new(80., 10.));
        let result = wider.rebuild(&same_size, id, &mut BuildCx::new(&mut tree, None), &settings);
        assert!(result.size_changed);
    }
}
