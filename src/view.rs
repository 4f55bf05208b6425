use crate::tree::WidgetTree;
use crate::widget::{Widget, WidgetId};
use core::any::Any;
use core::ops::{BitOr, BitOrAssign};

/// Where new widgets go while a view is being built or rebuilt.
///
/// Holds the tree and the widget that new widgets will be parented to.
pub struct BuildCx<'a> {
    tree: &'a mut WidgetTree,
    parent: Option<WidgetId>,
}

impl<'a> BuildCx<'a> {
    /// Creates a build context; widgets created through it get `parent` as their parent.
    pub fn new(tree: &'a mut WidgetTree, parent: Option<WidgetId>) -> BuildCx<'a> {
        BuildCx { tree, parent }
    }

    pub fn tree(&self) -> &WidgetTree {
        self.tree
    }

    pub fn tree_mut(&mut self) -> &mut WidgetTree {
        self.tree
    }

    /// The widget new widgets are parented to.
    pub fn parent(&self) -> Option<WidgetId> {
        self.parent
    }

    /// Creates a widget under the current parent.
    ///
    /// The widget still has to be put into the parent’s children, which is up to the parent’s
    /// view.
    pub fn create<W: Widget>(&mut self, widget: W) -> WidgetId {
        self.tree.create(self.parent, widget)
    }

    /// A context for building the children of `parent`.
    pub fn child(&mut self, parent: WidgetId) -> BuildCx<'_> {
        BuildCx {
            tree: &mut *self.tree,
            parent: Some(parent),
        }
    }

    /// Returns a widget that the calling view built earlier.
    ///
    /// # Panics
    /// If the widget does not exist or is not a `W`.
    pub fn widget_mut<W: Widget>(&mut self, id: WidgetId) -> &mut W {
        self.tree.get_mut(id).downcast_mut::<W>()
    }
}

/// Outcome of a rebuild.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RebuildResult {
    /// The widget’s geometry may have changed and the layout must be run again.
    pub size_changed: bool,
}

impl RebuildResult {
    pub fn unchanged() -> RebuildResult {
        RebuildResult::default()
    }

    pub fn size_changed() -> RebuildResult {
        RebuildResult { size_changed: true }
    }
}

impl BitOr for RebuildResult {
    type Output = RebuildResult;
    fn bitor(self, rhs: RebuildResult) -> RebuildResult {
        RebuildResult {
            size_changed: self.size_changed || rhs.size_changed,
        }
    }
}

impl BitOrAssign for RebuildResult {
    fn bitor_assign(&mut self, rhs: RebuildResult) {
        *self = *self | rhs;
    }
}

/// A declarative description of a widget (and its subtree), derived from the application state.
///
/// Views are cheap values that get thrown away after every rebuild. They usually hold
/// [lenses](crate::Lens) instead of values so they don’t need to copy anything out of the state.
///
/// Two views at the same place in the view tree are structurally equal if they have the same
/// type; this is checked by the type system (or by [`AnyView`] for type-erased views) and never at
/// runtime through `PartialEq`.
pub trait View<S: 'static>: 'static {
    /// Creates the widget for this view (and all of its children) and returns its id.
    fn build(&self, cx: &mut BuildCx, state: &S) -> WidgetId;

    /// Updates the widget previously built from `old` to match this view.
    ///
    /// Must not replace the widget itself: `id` stays valid. Children may be replaced.
    fn rebuild(&self, old: &Self, id: WidgetId, cx: &mut BuildCx, state: &S) -> RebuildResult;
}

/// A type-erased [`View`].
pub trait AnyView<S: 'static>: 'static {
    fn as_any(&self) -> &dyn Any;

    fn dyn_build(&self, cx: &mut BuildCx, state: &S) -> WidgetId;

    /// Rebuilds if `old` has the same type as this view.
    ///
    /// Returns `None` if the types differ; the caller must then destroy the old widget and build a
    /// new one.
    fn dyn_rebuild(
        &self,
        old: &dyn AnyView<S>,
        id: WidgetId,
        cx: &mut BuildCx,
        state: &S,
    ) -> Option<RebuildResult>;

    fn view_name(&self) -> &'static str;
}

impl<S: 'static, V: View<S>> AnyView<S> for V {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn dyn_build(&self, cx: &mut BuildCx, state: &S) -> WidgetId {
        self.build(cx, state)
    }

    fn dyn_rebuild(
        &self,
        old: &dyn AnyView<S>,
        id: WidgetId,
        cx: &mut BuildCx,
        state: &S,
    ) -> Option<RebuildResult> {
        let old = old.as_any().downcast_ref::<V>()?;
        Some(self.rebuild(old, id, cx, state))
    }

    fn view_name(&self) -> &'static str {
        core::any::type_name::<V>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Surface;
    use crate::rect::Size;

    struct Counter(u32);

    impl Widget for Counter {
        fn paint(&self, _: &mut dyn Surface, _: Size) {}
    }

    struct CounterView;

    impl View<u32> for CounterView {
        fn build(&self, cx: &mut BuildCx, state: &u32) -> WidgetId {
            cx.create(Counter(*state))
        }

        fn rebuild(&self, _: &Self, id: WidgetId, cx: &mut BuildCx, state: &u32) -> RebuildResult {
            cx.widget_mut::<Counter>(id).0 = *state;
            RebuildResult::unchanged()
        }
    }

    struct OtherView;

    impl View<u32> for OtherView {
        fn build(&self, cx: &mut BuildCx, _: &u32) -> WidgetId {
            cx.create(Counter(0))
        }

        fn rebuild(&self, _: &Self, _: WidgetId, _: &mut BuildCx, _: &u32) -> RebuildResult {
            RebuildResult::unchanged()
        }
    }

    #[test]
    fn dyn_rebuild_only_matches_the_same_type() {
        let mut tree = WidgetTree::new();
        let mut cx = BuildCx::new(&mut tree, None);
        let old: Box<dyn AnyView<u32>> = Box::new(CounterView);
        let id = old.dyn_build(&mut cx, &1);

        let same: Box<dyn AnyView<u32>> = Box::new(CounterView);
        assert_eq!(
            same.dyn_rebuild(&*old, id, &mut cx, &2),
            Some(RebuildResult::unchanged())
        );
        assert_eq!(cx.widget_mut::<Counter>(id).0, 2, "widget updated in place");

        let other: Box<dyn AnyView<u32>> = Box::new(OtherView);
        assert_eq!(other.dyn_rebuild(&*old, id, &mut cx, &3), None);
        assert_eq!(cx.widget_mut::<Counter>(id).0, 2);
    }

    #[test]
    fn child_context_parents_new_widgets() {
        let mut tree = WidgetTree::new();
        let mut cx = BuildCx::new(&mut tree, None);
        let parent = cx.create(Counter(0));
        let child = cx.child(parent).create(Counter(1));
        assert_eq!(tree.get(child).parent(), Some(parent));
        assert_eq!(tree.get(parent).parent(), None);
    }

    #[test]
    fn results_combine() {
        let mut result = RebuildResult::unchanged();
        result |= RebuildResult::unchanged();
        assert!(!result.size_changed);
        result |= RebuildResult::size_changed();
        assert!(result.size_changed);
    }
}
