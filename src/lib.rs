//! Reactive UI core.
//!
//! # Conceptual overview
//! Trellis keeps a tree of mutable widgets in sync with a declarative view description that is
//! derived from the application state, and routes input through that tree.
//!
//! ## Widgets
//! Widgets are the retained part of the UI: they have a position and a size, paint themselves,
//! lay out their children and handle events. They can hold transient state of their own (e.g.
//! whether the pointer is hovering over them) that isn’t part of the application state.
//!
//! All widgets live in a [`WidgetTree`], which owns them and refers to them by [`WidgetId`]. The
//! tree only talks to widgets through the [`Widget`] trait, so it can hold any mix of concrete
//! widget types; a widget type only implements the capabilities it actually uses.
//!
//! ## Views
//! A [`View`] is a cheap description of what a widget should look like, produced by a view
//! function from the current state. Views usually hold [`Lens`]es into the state instead of
//! copies of values. When the state changes, a new view tree is produced and *rebuilt* against the
//! previous one: widgets at the same place with the same view type are updated in place and keep
//! their identity, and only the parts that actually changed shape are destroyed or created.
//!
//! Containers describe their children as a [`Seq`], which may contain conditional parts
//! ([`maybe`]), tagged unions ([`either`]) and iterated ranges ([`for_each`]).
//!
//! ## Events
//! Mouse events go to the widget under the pointer. The dispatcher tracks it incrementally as the
//! pointer moves and synthesizes enter and exit events when it changes. After the target has
//! handled an event, the nearest ancestor that handles child events gets to see it too (bubbling).
//! Keyboard events go to the widget that grabbed keyboard focus.
//!
//! Event handlers get an [`EventContext`], through which they can write to the state, request a
//! rebuild or repaint, grab keyboard focus, open overlays and start animations. Anything that
//! touches the tree structure is applied after the handler has returned.
//!
//! ## Overlays
//! Popups and modals are overlays: independently rooted trees painted above the main tree. An
//! open overlay holds mouse focus until it is closed.
//!
//! ## Coordinate System
//! The origin of the top-level coordinate system is at the top left corner of the window’s
//! content area, and positive y points down. Widget positions are relative to their parent, and
//! events are delivered in the receiving widget’s local coordinates.
//!
//! ## Backends
//! The [`Host`] ties everything together. It pulls raw events from an [`InputBackend`] and paints
//! through a [`RenderBackend`]; both are implemented outside of this crate.

pub mod animation;
pub mod backend;
pub mod config;
mod context;
pub mod dispatch;
pub mod error;
pub mod events;
mod host;
pub mod leaf;
pub mod lens;
pub mod overlay;
mod rect;
#[macro_use]
pub mod sequence;
pub mod stack;
mod store;
mod tree;
mod view;
mod widget;

pub use animation::{AnimationControl, Animations};
pub use backend::{InputBackend, RenderBackend, Surface};
pub use config::HostConfig;
pub use context::{EventContext, FrameResult};
pub use dispatch::Dispatcher;
pub use error::{Error, Result};
pub use host::{Control, Host};
pub use lens::{identity, Lens, Writer};
pub use overlay::{OverlayId, Placement};
pub use rect::{Offset, Point, Rect, Size};
pub use sequence::{either, for_each, group, maybe, one, Seq};
pub use stack::{hstack, vstack};
pub use store::Store;
pub use tree::{WidgetNode, WidgetTree};
pub use view::{AnyView, BuildCx, RebuildResult, View};
pub use widget::{ChildLayout, Widget, WidgetId};
