//! Field validation.
//!
//! Validation rules are declared on each [`FieldSpec`](crate::model::FieldSpec)
//! as serializable [`Rule`] references. At form construction they are compiled
//! into a [`RuleSet`], which is then evaluated on blur, on step transitions and
//! on submit.
//!
//! Evaluation order per field:
//!
//! 1. Hidden fields (failing `showIf`) are skipped entirely.
//! 2. `required` fields with a blank value fail with a required error.
//! 3. Each rule runs in declaration order; the first failure wins.
//!
//! Rules are pure functions of `(value, all values, clock)`. The clock is
//! injected so date rules are deterministic under test.
//!
//! # Example
//!
//! ```
//! use assetform_lib::model::{FieldKind, FieldSet, FieldSpec, ValueMap};
//! use assetform_lib::validation::{FixedClock, Rule, RuleSet, ValidatorRegistry};
//!
//! let fields = FieldSet::new(vec![
//!     FieldSpec::new("validFrom", FieldKind::Date).required(),
//!     FieldSpec::new("validUntil", FieldKind::Date).rule(Rule::not_before_field("validFrom")),
//! ])
//! .unwrap();
//! let rules = RuleSet::compile(&fields, &ValidatorRegistry::new()).unwrap();
//!
//! let mut values = ValueMap::new();
//! values.insert("validFrom".into(), "2024-03-01".into());
//! values.insert("validUntil".into(), "2024-02-01".into());
//!
//! let result = rules.validate(&fields, &values, &FixedClock::on(2024, 3, 15));
//! assert!(result.is_invalid());
//! assert_eq!(result.first_error().unwrap().field_name, "validUntil");
//! ```

mod clock;
mod registry;
mod result;
mod rule;
mod validator;

pub use clock::{Clock, FixedClock, SystemClock};
pub use registry::{CustomValidator, ValidatorRegistry};
pub use result::{ErrorKind, FieldError, ValidationResult};
pub use rule::Rule;
pub use validator::RuleSet;
