//! Lenses.
//!
//! A lens maps a slice of the application state to the value a widget cares about. Views hold
//! lenses instead of values, so the same view description can be read again after the state has
//! changed, and widgets can write back without knowing the shape of the whole state.

use core::any::Any;
use core::fmt;
use std::rc::Rc;

/// A type-erased write-back handle created from a lens.
///
/// Widgets store these because they don’t know the concrete state type; the state is handed to
/// them as `&mut dyn Any` by the event context.
pub type Writer<T> = Rc<dyn Fn(&mut dyn Any, T)>;

/// A composable read/write accessor from `S` to `T`.
pub struct Lens<S, T> {
    read: Rc<dyn Fn(&S) -> &T>,
    write: Rc<dyn Fn(&mut S) -> &mut T>,
}

impl<S, T> Clone for Lens<S, T> {
    fn clone(&self) -> Self {
        Lens {
            read: Rc::clone(&self.read),
            write: Rc::clone(&self.write),
        }
    }
}

impl<S, T> fmt::Debug for Lens<S, T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Lens<{}, {}>",
            core::any::type_name::<S>(),
            core::any::type_name::<T>()
        )
    }
}

impl<S: 'static, T: 'static> Lens<S, T> {
    /// Creates a lens from a pair of projections.
    ///
    /// Both projections must point at the same place.
    pub fn new<R, W>(read: R, write: W) -> Self
    where
        R: Fn(&S) -> &T + 'static,
        W: Fn(&mut S) -> &mut T + 'static,
    {
        Lens {
            read: Rc::new(read),
            write: Rc::new(write),
        }
    }

    /// Reads the value.
    pub fn get<'s>(&self, state: &'s S) -> &'s T {
        (self.read)(state)
    }

    /// Returns a mutable reference to the value.
    pub fn get_mut<'s>(&self, state: &'s mut S) -> &'s mut T {
        (self.write)(state)
    }

    /// Replaces the value.
    pub fn put(&self, state: &mut S, value: T) {
        *self.get_mut(state) = value;
    }

    /// Composes this lens with a lens into `T`.
    pub fn then<U: 'static>(&self, inner: Lens<T, U>) -> Lens<S, U> {
        let outer_read = Rc::clone(&self.read);
        let outer_write = Rc::clone(&self.write);
        let inner_read = inner.read;
        let inner_write = inner.write;
        Lens::new(
            move |state| inner_read(outer_read(state)),
            move |state| inner_write(outer_write(state)),
        )
    }

    /// Returns a write-back handle that accepts the state as `dyn Any`.
    ///
    /// # Panics
    /// The returned writer panics if it is called with a state of a type other than `S`.
    pub fn writer(&self) -> Writer<T> {
        let lens = self.clone();
        Rc::new(move |state: &mut dyn Any, value: T| {
            let state = state.downcast_mut::<S>().unwrap_or_else(|| {
                panic!(
                    "lens writer: state is not a {}",
                    core::any::type_name::<S>()
                )
            });
            lens.put(state, value);
        })
    }
}

impl<S: 'static, T: 'static> Lens<S, Vec<T>> {
    /// Projects the element at `index`.
    ///
    /// # Panics
    /// The returned lens panics when used on a state where the range is shorter than `index + 1`.
    pub fn index(&self, index: usize) -> Lens<S, T> {
        let read = Rc::clone(&self.read);
        let write = Rc::clone(&self.write);
        Lens::new(
            move |state| &read(state)[index],
            move |state| &mut write(state)[index],
        )
    }
}

/// The lens that maps a state to itself.
pub fn identity<S: 'static>() -> Lens<S, S> {
    Lens::new(|state| state, |state| state)
}

/// Creates a field lens.
///
/// ```
/// # use trellis::lens;
/// struct Settings { volume: f32 }
/// struct App { settings: Settings }
///
/// let volume = lens!(App, settings.volume);
/// let app = App { settings: Settings { volume: 0.5 } };
/// assert_eq!(*volume.get(&app), 0.5);
/// ```
#[macro_export]
macro_rules! lens {
    ($state:ty, $($field:tt).+) => {
        $crate::Lens::new(
            |state: &$state| &state.$($field).+,
            |state: &mut $state| &mut state.$($field).+,
        )
    };
}
