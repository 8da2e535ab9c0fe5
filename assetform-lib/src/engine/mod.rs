//! The form engine.
//!
//! A [`Form`] owns the state of one form instance and applies the dependency
//! rules on every change. A [`Stepper`] splits a form into gated steps.
//! Rendering is headless: [`Form::views`] dispatches each visible field to
//! the [`FieldRenderer`] registered for its kind.

mod form;
mod render;
mod state;
mod stepper;

pub use form::*;
pub use render::*;
pub use state::*;
pub use stepper::*;
