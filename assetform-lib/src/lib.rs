//! Dynamic form and field-dependency engine
//!
//! Declarative field definitions drive conditional visibility, cascading
//! remote-backed autocomplete fields, per-field and cross-field validation,
//! and single-page or multi-step submission.

pub mod cache;
pub mod dependency;
pub mod engine;
pub mod error;
pub mod model;
pub mod remote;
pub mod response;
pub mod validation;

pub use engine::Form;
pub use engine::Stepper;
pub use error::Error;
pub use model::FieldSet;
pub use model::FieldSpec;
pub use remote::OptionProvider;
pub use response::CacheStatus;
pub use response::Response;
