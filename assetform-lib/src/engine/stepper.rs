//! Multi-step forms.

use std::collections::BTreeSet;
use std::collections::HashSet;

use crate::error::ConfigError;
use crate::model::StepSpec;
use crate::model::ValueMap;
use crate::validation::ValidationResult;

use super::Form;
use super::Submission;

/// Why a step transition did not happen.
#[derive(Debug, Clone, PartialEq)]
pub enum StepBlocked {
    /// Fields of the current step failed validation.
    Invalid(ValidationResult),
    /// The target step has not been reached yet.
    NotReachable { target: usize },
    /// Already on the last step.
    AtEnd,
}

/// A [`Form`] split into ordered steps.
///
/// Moving forward validates only the current step's fields. Moving back is
/// always allowed. Jumping is allowed to completed steps and to the step
/// right after the current one. Submission validates every field again,
/// since later edits may have invalidated earlier steps.
#[derive(Debug)]
pub struct Stepper {
    form: Form,
    steps: Vec<StepSpec>,
    current: usize,
    completed: BTreeSet<usize>,
}

impl Stepper {
    /// Wraps a form in steps.
    ///
    /// Every step field must exist in the form and belong to a single step.
    /// Form fields not listed by any step are validated only on submit.
    pub fn new(form: Form, steps: Vec<StepSpec>) -> Result<Self, ConfigError> {
        if steps.is_empty() {
            return Err(ConfigError::EmptySteps);
        }

        let mut seen = HashSet::new();
        for step in &steps {
            for field in &step.fields {
                if !form.fields().contains(field) {
                    return Err(ConfigError::UnknownStepField {
                        step: step.title.clone(),
                        field: field.clone(),
                    });
                }
                if !seen.insert(field.as_str()) {
                    return Err(ConfigError::FieldInMultipleSteps {
                        field: field.clone(),
                    });
                }
            }
        }

        Ok(Self {
            form,
            steps,
            current: 0,
            completed: BTreeSet::new(),
        })
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut Form {
        &mut self.form
    }

    pub fn steps(&self) -> &[StepSpec] {
        &self.steps
    }

    /// Index of the current step.
    pub fn current(&self) -> usize {
        self.current
    }

    pub fn current_step(&self) -> &StepSpec {
        &self.steps[self.current]
    }

    /// Returns `true` on the last, submit-eligible step.
    pub fn is_last(&self) -> bool {
        self.current + 1 == self.steps.len()
    }

    pub fn is_completed(&self, index: usize) -> bool {
        self.completed.contains(&index)
    }

    /// Validates the current step and advances.
    ///
    /// On failure the step index is unchanged and the failing fields are
    /// marked touched.
    pub fn next(&mut self) -> Result<usize, StepBlocked> {
        if self.is_last() {
            return Err(StepBlocked::AtEnd);
        }
        self.complete_current()?;
        self.current += 1;
        log::debug!("Form {}: advanced to step {}", self.form.id(), self.current);
        Ok(self.current)
    }

    /// Steps back. Saturates at the first step.
    pub fn previous(&mut self) -> usize {
        self.current = self.current.saturating_sub(1);
        self.current
    }

    /// Jumps to a step.
    ///
    /// Completed steps are always reachable. The step right after the current
    /// one is reachable once the current step validates.
    pub fn go_to(&mut self, target: usize) -> Result<usize, StepBlocked> {
        if target >= self.steps.len() {
            return Err(StepBlocked::NotReachable { target });
        }
        if target == self.current + 1 {
            return self.next();
        }
        if target <= self.current || self.completed.contains(&target) {
            self.current = target;
            return Ok(target);
        }
        Err(StepBlocked::NotReachable { target })
    }

    /// Validates every field of every step and submits.
    pub fn submit<R>(&mut self, handler: impl FnOnce(ValueMap) -> R) -> Submission<R> {
        let outcome = self.form.submit(handler);
        if outcome.is_submitted() {
            self.completed.extend(0..self.steps.len());
        }
        outcome
    }

    fn complete_current(&mut self) -> Result<(), StepBlocked> {
        let names = self.steps[self.current].fields.clone();
        match self.form.validate_fields(&names) {
            ValidationResult::Valid => {
                self.completed.insert(self.current);
                Ok(())
            }
            invalid => {
                self.completed.remove(&self.current);
                log::debug!(
                    "Form {}: step {} blocked by {} fields",
                    self.form.id(),
                    self.current,
                    invalid.errors().len()
                );
                Err(StepBlocked::Invalid(invalid))
            }
        }
    }
}
