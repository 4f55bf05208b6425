//! Sequences of child views.
//!
//! A container view describes its children as a [`Seq`]: a tree of plain views, groups,
//! conditionals, tagged unions and iterated ranges. Each node knows how many widgets it stands for,
//! so two sequences can be walked side by side against the flat child list of the container.

use crate::lens::Lens;
use crate::tree::WidgetTree;
use crate::view::{AnyView, BuildCx, RebuildResult, View};
use crate::widget::WidgetId;
use core::fmt;

/// A sequence of child views.
pub enum Seq<S: 'static> {
    /// Exactly one view.
    One(Box<dyn AnyView<S>>),
    /// A fixed run of sequences.
    Group(Vec<Seq<S>>),
    /// A sequence that may be absent.
    Maybe(Option<Box<Seq<S>>>),
    /// One of several variants. Sequences with different tags are never diffed against each other.
    Either { tag: usize, branch: Box<Seq<S>> },
    /// One sequence per element of a range.
    ForEach(Vec<Seq<S>>),
}

/// A sequence containing a single view.
pub fn one<S: 'static, V: View<S>>(view: V) -> Seq<S> {
    Seq::One(Box::new(view))
}

/// A fixed run of sequences. See also [`seq!`](crate::seq).
pub fn group<S: 'static>(items: Vec<Seq<S>>) -> Seq<S> {
    Seq::Group(items)
}

/// A sequence that is present only if `flag` is set.
pub fn maybe<S: 'static, F: FnOnce() -> Seq<S>>(flag: bool, content: F) -> Seq<S> {
    Seq::Maybe(if flag {
        Some(Box::new(content()))
    } else {
        None
    })
}

/// A variant of a tagged union; `tag` identifies the variant.
pub fn either<S: 'static>(tag: usize, branch: Seq<S>) -> Seq<S> {
    Seq::Either {
        tag,
        branch: Box::new(branch),
    }
}

/// One sequence per element of `range`, each built from a lens to that element.
pub fn for_each<S, T, F>(state: &S, range: &Lens<S, Vec<T>>, mut item: F) -> Seq<S>
where
    S: 'static,
    T: 'static,
    F: FnMut(Lens<S, T>) -> Seq<S>,
{
    let len = range.get(state).len();
    Seq::ForEach((0..len).map(|index| item(range.index(index))).collect())
}

/// Creates a [`Seq::Group`] from a list of sequences.
///
/// ```ignore
/// vstack(10., seq![one(label(title, size)), maybe(show, || one(spacer(size)))])
/// ```
#[macro_export]
macro_rules! seq {
    ($($item:expr),* $(,)?) => {
        $crate::sequence::group(vec![$($item),*])
    };
}

impl<S: 'static> Seq<S> {
    /// The number of widgets this sequence stands for.
    pub fn len(&self) -> usize {
        match self {
            Seq::One(_) => 1,
            Seq::Group(items) | Seq::ForEach(items) => items.iter().map(Seq::len).sum(),
            Seq::Maybe(item) => item.as_ref().map_or(0, |item| item.len()),
            Seq::Either { branch, .. } => branch.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Builds every widget in the sequence, appending their ids to `out`.
    pub fn build(&self, cx: &mut BuildCx, state: &S, out: &mut Vec<WidgetId>) {
        match self {
            Seq::One(view) => out.push(view.dyn_build(cx, state)),
            Seq::Group(items) | Seq::ForEach(items) => {
                for item in items {
                    item.build(cx, state, out);
                }
            }
            Seq::Maybe(item) => {
                if let Some(item) = item {
                    item.build(cx, state, out);
                }
            }
            Seq::Either { branch, .. } => branch.build(cx, state, out),
        }
    }

    /// Updates the widgets built from `old` to match this sequence.
    ///
    /// `splice` must be positioned at the first widget of `old`; it ends up right after the last
    /// widget of this sequence.
    pub fn rebuild(
        &self,
        old: &Seq<S>,
        cx: &mut BuildCx,
        state: &S,
        splice: &mut Splice,
    ) -> RebuildResult {
        match (self, old) {
            (Seq::One(view), Seq::One(old_view)) => {
                let id = splice.current();
                match view.dyn_rebuild(&**old_view, id, cx, state) {
                    Some(result) => {
                        splice.advance();
                        result
                    }
                    None => {
                        tracing::trace!(
                            old = old_view.view_name(),
                            new = view.view_name(),
                            "view type changed; replacing widget"
                        );
                        let new_id = view.dyn_build(cx, state);
                        splice.replace(cx.tree_mut(), new_id);
                        RebuildResult::size_changed()
                    }
                }
            }
            (Seq::Group(items), Seq::Group(old_items))
            | (Seq::ForEach(items), Seq::ForEach(old_items)) => {
                rebuild_run(items, old_items, cx, state, splice)
            }
            (Seq::Maybe(item), Seq::Maybe(old_item)) => match (item, old_item) {
                (Some(item), Some(old_item)) => item.rebuild(old_item, cx, state, splice),
                (Some(item), None) => item.insert(cx, state, splice),
                (None, Some(old_item)) => old_item.remove(cx.tree_mut(), splice),
                (None, None) => RebuildResult::unchanged(),
            },
            (
                Seq::Either { tag, branch },
                Seq::Either {
                    tag: old_tag,
                    branch: old_branch,
                },
            ) => {
                if tag == old_tag {
                    branch.rebuild(old_branch, cx, state, splice)
                } else {
                    old_branch.remove(cx.tree_mut(), splice);
                    branch.insert(cx, state, splice)
                }
            }
            (new, old) => {
                old.remove(cx.tree_mut(), splice);
                new.insert(cx, state, splice)
            }
        }
    }

    /// Builds the whole sequence and inserts it at the cursor.
    fn insert(&self, cx: &mut BuildCx, state: &S, splice: &mut Splice) -> RebuildResult {
        let mut ids = Vec::with_capacity(self.len());
        self.build(cx, state, &mut ids);
        for id in ids {
            splice.insert(id);
        }
        RebuildResult::size_changed()
    }

    /// Destroys every widget built from this sequence.
    fn remove(&self, tree: &mut WidgetTree, splice: &mut Splice) -> RebuildResult {
        let len = self.len();
        splice.remove(tree, len);
        RebuildResult { size_changed: len > 0 }
    }
}

/// Rebuilds the common prefix in place, then builds new trailing items or destroys old ones.
fn rebuild_run<S: 'static>(
    items: &[Seq<S>],
    old_items: &[Seq<S>],
    cx: &mut BuildCx,
    state: &S,
    splice: &mut Splice,
) -> RebuildResult {
    let mut result = RebuildResult::unchanged();
    for (item, old_item) in items.iter().zip(old_items) {
        result |= item.rebuild(old_item, cx, state, splice);
    }
    let common = items.len().min(old_items.len());
    for item in &items[common..] {
        result |= item.insert(cx, state, splice);
    }
    for old_item in &old_items[common..] {
        result |= old_item.remove(cx.tree_mut(), splice);
    }
    result
}

impl<S: 'static> fmt::Debug for Seq<S> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Seq::One(view) => write!(f, "One({})", view.view_name()),
            Seq::Group(items) => f.debug_tuple("Group").field(items).finish(),
            Seq::Maybe(item) => f.debug_tuple("Maybe").field(item).finish(),
            Seq::Either { tag, branch } => f
                .debug_struct("Either")
                .field("tag", tag)
                .field("branch", branch)
                .finish(),
            Seq::ForEach(items) => f.debug_tuple("ForEach").field(items).finish(),
        }
    }
}

/// A cursor over a container’s child list during a rebuild.
///
/// Removed children are destroyed right away but only marked in the list; `finish` erases them
/// afterwards, last index first, so the cursor stays valid while the sequence is walked.
pub struct Splice<'a> {
    children: &'a mut Vec<WidgetId>,
    cursor: usize,
    removed: Vec<usize>,
    structural: bool,
}

impl<'a> Splice<'a> {
    pub fn new(children: &'a mut Vec<WidgetId>) -> Splice<'a> {
        Splice {
            children,
            cursor: 0,
            removed: Vec::new(),
            structural: false,
        }
    }

    /// The child under the cursor.
    ///
    /// # Panics
    /// If the cursor is past the end.
    pub fn current(&self) -> WidgetId {
        match self.children.get(self.cursor) {
            Some(id) => *id,
            None => panic!(
                "sequence is longer than the child list ({} children)",
                self.children.len()
            ),
        }
    }

    /// Keeps the child under the cursor.
    pub fn advance(&mut self) {
        self.cursor += 1;
    }

    /// Inserts a child before the cursor.
    pub fn insert(&mut self, id: WidgetId) {
        self.children.insert(self.cursor, id);
        self.cursor += 1;
        self.structural = true;
    }

    /// Destroys the next `count` children.
    pub fn remove(&mut self, tree: &mut WidgetTree, count: usize) {
        for _ in 0..count {
            tree.destroy(self.current());
            self.removed.push(self.cursor);
            self.cursor += 1;
            self.structural = true;
        }
    }

    /// Destroys the child under the cursor and puts `id` in its place.
    pub fn replace(&mut self, tree: &mut WidgetTree, id: WidgetId) {
        tree.destroy(self.current());
        self.children[self.cursor] = id;
        self.cursor += 1;
        self.structural = true;
    }

    /// Erases removed children. Returns true if the child list was changed structurally.
    ///
    /// # Panics
    /// If the sequence stopped short of the end of the child list.
    pub fn finish(self) -> bool {
        assert_eq!(
            self.cursor,
            self.children.len(),
            "sequence did not cover every child"
        );
        for index in self.removed.into_iter().rev() {
            self.children.remove(index);
        }
        self.structural
    }
}
