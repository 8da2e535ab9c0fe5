//! Data model: values, entities and declarative field configuration.

mod entity;
mod field;
mod field_set;
mod value;

pub use entity::*;
pub use field::*;
pub use field_set::*;
pub use value::*;
