use crate::animation::Animations;
use crate::backend::{InputBackend, RenderBackend};
use crate::config::HostConfig;
use crate::context::{Command, EventContext, FrameResult};
use crate::dispatch::Dispatcher;
use crate::error::{Error, Result};
use crate::events::{Event, RawEvent};
use crate::overlay::{OverlayId, OverlayRequest, Overlays, Placement};
use crate::rect::{assert_size, Size};
use crate::store::Store;
use crate::tree::WidgetTree;
use crate::view::{BuildCx, View};
use crate::widget::WidgetId;
use std::time::{Duration, Instant};

/// Whether the main loop should keep going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Exit,
}

/// Connects a view function to a widget tree, backends and the application state.
///
/// `logic` is called with the current state whenever a rebuild is needed and returns the view for
/// the main tree.
pub struct Host<S: 'static, V: View<S>, F: Fn(&S) -> V> {
    config: HostConfig,
    store: Store<S>,
    logic: F,
    view: V,
    tree: WidgetTree,
    root: WidgetId,
    dispatcher: Dispatcher,
    overlays: Overlays<S>,
    animations: Animations,
    window_size: Size,
    needs_repaint: bool,
}

impl<S: 'static, V: View<S>, F: Fn(&S) -> V> Host<S, V, F> {
    /// Creates a new host and builds the main tree.
    ///
    /// Nothing is painted until [`Host::paint`] or [`Host::run`] is called.
    pub fn new(store: Store<S>, logic: F, config: HostConfig) -> Self {
        assert_size(config.window_size, "window size");
        let mut tree = WidgetTree::new();
        let (view, root) = store.read(|state| {
            let view = logic(state);
            let root = view.build(&mut BuildCx::new(&mut tree, None), state);
            (view, root)
        });
        tree.layout(root);
        tree.take_destroyed();
        let dispatcher = Dispatcher::new(&tree, root);

        Host {
            window_size: config.window_size,
            config,
            store,
            logic,
            view,
            tree,
            root,
            dispatcher,
            overlays: Overlays::new(),
            animations: Animations::new(),
            needs_repaint: true,
        }
    }

    pub fn store(&self) -> &Store<S> {
        &self.store
    }

    pub fn tree(&self) -> &WidgetTree {
        &self.tree
    }

    /// The root of the main tree.
    pub fn root(&self) -> WidgetId {
        self.root
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn animations(&self) -> &Animations {
        &self.animations
    }

    pub fn window_size(&self) -> Size {
        self.window_size
    }

    /// Roots of the open overlays, bottom first.
    pub fn overlay_roots(&self) -> Vec<WidgetId> {
        self.overlays.roots().collect()
    }

    /// Whether something changed since the last paint.
    pub fn needs_repaint(&self) -> bool {
        self.needs_repaint
    }

    /// Handles one raw event, including any rebuild it causes.
    pub fn handle_event(&mut self, event: RawEvent) -> Control {
        match event {
            RawEvent::Quit => {
                tracing::debug!("quit requested");
                return Control::Exit;
            }
            RawEvent::Resize(size) => {
                assert_size(size, "window size");
                self.window_size = size;
                self.overlays.place(&mut self.tree, size);
                self.dispatcher.refresh(&self.tree);
                self.needs_repaint = true;
            }
            RawEvent::Mouse(event) => self.dispatch(Event::Mouse(event)),
            RawEvent::Keyboard(event) => self.dispatch(Event::Keyboard(event)),
        }
        Control::Continue
    }

    fn dispatch(&mut self, event: Event) {
        let Host {
            store,
            tree,
            dispatcher,
            window_size,
            ..
        } = self;
        let (result, commands) = store.write(|state| {
            let mut context = EventContext::new(state, *window_size);
            dispatcher.dispatch(tree, &event, &mut context);
            context.finish()
        });

        for command in commands {
            self.apply(command);
        }
        self.finish_frame(result);
    }

    fn finish_frame(&mut self, result: FrameResult) {
        if result.rebuild_requested {
            self.rebuild();
        }
        if result.repaint_requested {
            self.needs_repaint = true;
        }
    }

    fn apply(&mut self, command: Command) {
        match command {
            Command::GrabKeyboardFocus { target, parents } => {
                self.dispatcher.grab_keyboard(target, parents)
            }
            Command::ReleaseKeyboardFocus(target) => self.dispatcher.release_keyboard(target),
            Command::PushOverlay(request) => match request.downcast::<OverlayRequest<S>>() {
                Ok(request) => {
                    self.open_overlay(*request);
                }
                Err(_) => tracing::warn!(
                    state = core::any::type_name::<S>(),
                    "ignoring overlay request for a different state type"
                ),
            },
            Command::CloseLayer(root) => match self.overlays.find_by_root(root) {
                Some(id) => {
                    self.close_overlay(id);
                }
                None => tracing::warn!(?root, "close request from outside of an overlay"),
            },
            Command::Animate {
                widget,
                period,
                callback,
            } => self
                .animations
                .register(widget, period, Instant::now(), callback),
            Command::StopAnimation(widget) => {
                self.animations.remove(widget);
            }
        }
    }

    /// Rebuilds the main tree and all overlays from the current state.
    pub fn rebuild(&mut self) {
        let Host {
            store,
            logic,
            view,
            tree,
            root,
            dispatcher,
            overlays,
            window_size,
            ..
        } = self;
        let replaced = store.read(|state| {
            let new_view = logic(state);
            let result = new_view.rebuild(view, *root, &mut BuildCx::new(tree, None), state);
            *view = new_view;
            if result.size_changed {
                tree.layout(*root);
            }
            overlays.rebuild(tree, state, *window_size)
        });

        for (old, new) in replaced {
            if dispatcher.mouse_focus().layer() == old {
                dispatcher.focus_layer(tree, new);
            }
        }
        self.sweep();
        self.needs_repaint = true;

        if tracing::enabled!(tracing::Level::TRACE) {
            tracing::trace!(tree = %self.tree.dump(self.root), "rebuilt");
        }
    }

    /// Forgets destroyed widgets everywhere they might still be referenced.
    fn sweep(&mut self) {
        let destroyed = self.tree.take_destroyed();
        if !destroyed.is_empty() {
            self.animations.forget(&destroyed);
        }
        self.dispatcher.refresh(&self.tree);
    }

    /// Opens an overlay that grabs mouse focus until it is closed.
    pub fn push_overlay<W, G>(&mut self, placement: Placement, logic: G) -> OverlayId
    where
        W: View<S>,
        G: Fn(&S) -> W + 'static,
    {
        self.open_overlay(OverlayRequest::new(placement, logic))
    }

    fn open_overlay(&mut self, request: OverlayRequest<S>) -> OverlayId {
        let Host {
            store,
            tree,
            overlays,
            window_size,
            ..
        } = self;
        let (id, root) = store.read(|state| overlays.push(request, tree, state, *window_size));
        tracing::debug!(?id, ?root, "overlay opened");
        self.dispatcher.focus_layer(&self.tree, root);
        self.needs_repaint = true;
        id
    }

    /// Closes the topmost overlay.
    pub fn pop_overlay(&mut self) -> Option<OverlayId> {
        let id = self.overlays.last()?;
        self.close_overlay(id);
        Some(id)
    }

    /// Closes an overlay. Returns false if it wasn't open.
    ///
    /// If the overlay held focus, focus goes back to the main root, even when other overlays are
    /// still open.
    pub fn close_overlay(&mut self, id: OverlayId) -> bool {
        let root = match self.overlays.remove(id, &mut self.tree) {
            Some(root) => root,
            None => return false,
        };
        tracing::debug!(?id, ?root, "overlay closed");
        self.dispatcher.release_layer(&self.tree, root);
        self.sweep();
        self.needs_repaint = true;
        true
    }

    /// Fires due animations. Returns true if any fired.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Host {
            store,
            tree,
            animations,
            ..
        } = self;
        let fired = store.write(|state| animations.tick(now, tree, state));
        if fired {
            self.needs_repaint = true;
        }
        fired
    }

    /// Paints the main tree, then the overlays.
    pub fn paint<R: RenderBackend>(&mut self, render: &mut R) -> Result<()> {
        render
            .begin_frame(self.window_size)
            .map_err(Error::render)?;
        let surface = render.surface();
        self.tree.paint(self.root, surface);
        for root in self.overlays.roots() {
            self.tree.paint(root, surface);
        }
        render.end_frame().map_err(Error::render)?;
        self.needs_repaint = false;
        Ok(())
    }

    /// Runs one loop iteration: waits for input, handles the events that were queued by then,
    /// fires animations and repaints if needed.
    pub fn step<I, R>(&mut self, input: &mut I, render: &mut R) -> Result<Control>
    where
        I: InputBackend,
        R: RenderBackend,
    {
        if let Some(event) = input
            .next_event(self.config.poll_interval)
            .map_err(Error::input)?
        {
            // events arriving while these are handled wait for the next iteration
            let queued = input.pending();
            if self.handle_event(event) == Control::Exit {
                return Ok(Control::Exit);
            }
            for _ in 0..queued {
                let event = match input.next_event(Duration::ZERO).map_err(Error::input)? {
                    Some(event) => event,
                    None => break,
                };
                if self.handle_event(event) == Control::Exit {
                    return Ok(Control::Exit);
                }
            }
        }

        self.tick(Instant::now());
        if self.needs_repaint {
            self.paint(render)?;
        }
        Ok(Control::Continue)
    }

    /// Runs until a quit event arrives or a backend fails.
    pub fn run<I, R>(&mut self, input: &mut I, render: &mut R) -> Result<()>
    where
        I: InputBackend,
        R: RenderBackend,
    {
        tracing::debug!("host started");
        while self.step(input, render)? == Control::Continue {}
        tracing::debug!("host stopped");
        Ok(())
    }
}
