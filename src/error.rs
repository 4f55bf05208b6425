//! Host errors.
//!
//! Only backend failures end up here. Broken tree or dispatch invariants panic instead.

use thiserror::Error;

type Source = Box<dyn std::error::Error + Send + Sync>;

/// A backend failure.
#[derive(Error, Debug)]
pub enum Error {
    /// The input backend failed
    #[error("input backend failed: {0}")]
    Input(#[source] Source),

    /// The render backend failed
    #[error("render backend failed: {0}")]
    Render(#[source] Source),
}

impl Error {
    pub(crate) fn input<E: std::error::Error + Send + Sync + 'static>(error: E) -> Error {
        Error::Input(Box::new(error))
    }

    pub(crate) fn render<E: std::error::Error + Send + Sync + 'static>(error: E) -> Error {
        Error::Render(Box::new(error))
    }
}

/// Result type for host operations
pub type Result<T> = std::result::Result<T, Error>;
