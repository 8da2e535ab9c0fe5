//! Error types

mod config;
mod fetch;

pub use config::*;
pub use fetch::*;

/// Top-level error for operations that can fail outside of field validation.
///
/// Validation failures are never represented here; they are reported as
/// [`FieldError`](crate::validation::FieldError) values on the form.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The field configuration was rejected at construction time.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Remote option data could not be fetched.
    #[error(transparent)]
    Fetch(#[from] FetchError),
}
