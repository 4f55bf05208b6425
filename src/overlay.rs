//! Overlays: popups and modals drawn above the main tree.
//!
//! Each overlay is its own widget tree root. It is never a descendant of the main root, so it is
//! laid out and hit-tested on its own and painted after the main tree.

use crate::rect::{Point, Size};
use crate::tree::WidgetTree;
use crate::view::{AnyView, BuildCx, View};
use crate::widget::WidgetId;
use core::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_OVERLAY_ID: AtomicU64 = AtomicU64::new(1);

/// Identifies an open overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OverlayId(u64);

impl OverlayId {
    fn next() -> OverlayId {
        OverlayId(NEXT_OVERLAY_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Where an overlay goes, in window coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placement {
    /// Exactly at this point.
    Absolute(Point),
    /// At this point, moved up and left as needed to stay inside the window.
    Relative(Point),
}

impl Placement {
    /// Returns the position of an overlay of the given size.
    pub fn resolve(&self, size: Size, window: Size) -> Point {
        match *self {
            Placement::Absolute(point) => point,
            Placement::Relative(point) => Point::new(
                point.x.min(window.x - size.x).max(0.),
                point.y.min(window.y - size.y).max(0.),
            ),
        }
    }
}

/// A request to open an overlay.
pub struct OverlayRequest<S: 'static> {
    placement: Placement,
    logic: Box<dyn Fn(&S) -> Box<dyn AnyView<S>>>,
}

impl<S: 'static> OverlayRequest<S> {
    pub fn new<V, F>(placement: Placement, logic: F) -> OverlayRequest<S>
    where
        V: View<S>,
        F: Fn(&S) -> V + 'static,
    {
        OverlayRequest {
            placement,
            logic: Box::new(move |state: &S| -> Box<dyn AnyView<S>> { Box::new(logic(state)) }),
        }
    }
}

impl<S: 'static> fmt::Debug for OverlayRequest<S> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("OverlayRequest")
            .field("placement", &self.placement)
            .finish()
    }
}

struct Overlay<S: 'static> {
    id: OverlayId,
    placement: Placement,
    logic: Box<dyn Fn(&S) -> Box<dyn AnyView<S>>>,
    view: Box<dyn AnyView<S>>,
    root: WidgetId,
}

impl<S: 'static> Overlay<S> {
    fn place(&self, tree: &mut WidgetTree, window: Size) {
        let node = tree.get_mut(self.root);
        let position = self.placement.resolve(node.size(), window);
        node.set_position(position);
    }
}

/// The overlay stack, bottom first.
pub struct Overlays<S: 'static> {
    entries: Vec<Overlay<S>>,
}

impl<S: 'static> Default for Overlays<S> {
    fn default() -> Self {
        Overlays {
            entries: Vec::new(),
        }
    }
}

impl<S: 'static> Overlays<S> {
    pub fn new() -> Self {
        Overlays::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Builds and places an overlay on top of the stack. Returns its id and root widget.
    pub fn push(
        &mut self,
        request: OverlayRequest<S>,
        tree: &mut WidgetTree,
        state: &S,
        window: Size,
    ) -> (OverlayId, WidgetId) {
        let view = (request.logic)(state);
        let root = view.dyn_build(&mut BuildCx::new(tree, None), state);
        tree.layout(root);
        let overlay = Overlay {
            id: OverlayId::next(),
            placement: request.placement,
            logic: request.logic,
            view,
            root,
        };
        overlay.place(tree, window);
        let id = overlay.id;
        self.entries.push(overlay);
        (id, root)
    }

    /// Destroys an overlay. Returns its root if it existed.
    pub fn remove(&mut self, id: OverlayId, tree: &mut WidgetTree) -> Option<WidgetId> {
        let index = self.entries.iter().position(|overlay| overlay.id == id)?;
        let overlay = self.entries.remove(index);
        tree.destroy(overlay.root);
        Some(overlay.root)
    }

    /// Rebuilds every overlay from the state.
    ///
    /// Returns `(old root, new root)` for every overlay whose root had to be replaced.
    pub fn rebuild(
        &mut self,
        tree: &mut WidgetTree,
        state: &S,
        window: Size,
    ) -> Vec<(WidgetId, WidgetId)> {
        let mut replaced = Vec::new();
        for overlay in &mut self.entries {
            let view = (overlay.logic)(state);
            let mut cx = BuildCx::new(tree, None);
            match view.dyn_rebuild(&*overlay.view, overlay.root, &mut cx, state) {
                Some(result) => {
                    if result.size_changed {
                        tree.layout(overlay.root);
                    }
                }
                None => {
                    let root = view.dyn_build(&mut cx, state);
                    tree.destroy(overlay.root);
                    tree.layout(root);
                    replaced.push((overlay.root, root));
                    overlay.root = root;
                }
            }
            overlay.view = view;
            overlay.place(tree, window);
        }
        replaced
    }

    /// Re-places every overlay, e.g. after the window was resized.
    pub fn place(&self, tree: &mut WidgetTree, window: Size) {
        for overlay in &self.entries {
            overlay.place(tree, window);
        }
    }

    /// Overlay roots, bottom first.
    pub fn roots(&self) -> impl Iterator<Item = WidgetId> + '_ {
        self.entries.iter().map(|overlay| overlay.root)
    }

    /// The topmost overlay.
    pub fn last(&self) -> Option<OverlayId> {
        self.entries.last().map(|overlay| overlay.id)
    }

    pub fn find_by_root(&self, root: WidgetId) -> Option<OverlayId> {
        self.entries
            .iter()
            .find(|overlay| overlay.root == root)
            .map(|overlay| overlay.id)
    }
}
