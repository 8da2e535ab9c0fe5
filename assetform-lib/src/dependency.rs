//! Dependency resolution between fields.
//!
//! Two relations connect fields:
//!
//! - `showIf` decides whether a field is visible, based on another field's value.
//! - `dependsOn` gates a field's remote data on another field's value. When the
//!   upstream value changes, the dependent's options are stale and its stored
//!   value must be cleared.
//!
//! Everything here is a pure function of the field list and the current values.

use std::collections::BTreeSet;
use std::collections::HashMap;
use std::collections::HashSet;
use std::collections::VecDeque;

use crate::error::ConfigError;
use crate::model::FieldSpec;
use crate::model::Value;
use crate::model::ValueMap;

/// Returns `true` if the field's `showIf` predicate holds (or it has none).
pub fn is_visible(spec: &FieldSpec, values: &ValueMap) -> bool {
    match &spec.show_if {
        None => true,
        Some(show_if) => {
            let current = values.get(&show_if.field).unwrap_or(&Value::Null);
            show_if.matches(current)
        }
    }
}

/// Computes the names of every visible field.
///
/// A field without `showIf` is always visible. The function never mutates its
/// inputs and returns the same set for the same inputs.
pub fn resolve_visible(fields: &[FieldSpec], values: &ValueMap) -> BTreeSet<String> {
    fields
        .iter()
        .filter(|spec| is_visible(spec, values))
        .map(|spec| spec.name.clone())
        .collect()
}

/// Returns every field whose `dependsOn.field` is `changed`.
pub fn resolve_staleness(fields: &[FieldSpec], changed: &str) -> BTreeSet<String> {
    fields
        .iter()
        .filter(|spec| {
            spec.depends_on
                .as_ref()
                .is_some_and(|dep| dep.field == changed)
        })
        .map(|spec| spec.name.clone())
        .collect()
}

/// Returns the transitive dependents of `changed`, nearest first.
///
/// Clearing a dependent is itself a change, so its own dependents go stale too.
/// The graph is acyclic for any accepted field set, so this always terminates;
/// a visited set guards against unchecked input anyway.
pub fn dependents_closure(fields: &[FieldSpec], changed: &str) -> Vec<String> {
    let mut order = Vec::new();
    let mut seen: HashSet<String> = HashSet::from([changed.to_string()]);
    let mut queue = VecDeque::from([changed.to_string()]);

    while let Some(current) = queue.pop_front() {
        for dependent in resolve_staleness(fields, &current) {
            if seen.insert(dependent.clone()) {
                order.push(dependent.clone());
                queue.push_back(dependent);
            }
        }
    }

    order
}

/// Whether a field may fetch its options and accept input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldGate {
    /// No dependency, or the upstream value is filled in.
    Ready,
    /// The upstream field is empty: the field is disabled and must not fetch.
    Blocked {
        /// The upstream field that must be filled first.
        upstream: String,
        /// Placeholder telling the user what to fill first.
        placeholder: String,
    },
}

impl FieldGate {
    /// Returns `true` if the field is ready.
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    /// Returns `true` if input is disabled.
    pub fn is_disabled(&self) -> bool {
        !self.is_ready()
    }
}

/// Returns `true` if `field` holds a value dependents can be scoped by.
///
/// The value must be truthy and not blank: an emptied multi-select (`[]`) or a
/// whitespace-only string leaves its dependents gated.
pub fn is_upstream_filled(values: &ValueMap, field: &str) -> bool {
    values
        .get(field)
        .is_some_and(|v| v.is_truthy() && !v.is_blank())
}

/// Computes the dependency gate for one field.
pub fn dependency_gate(spec: &FieldSpec, fields: &[FieldSpec], values: &ValueMap) -> FieldGate {
    let Some(dep) = &spec.depends_on else {
        return FieldGate::Ready;
    };

    if is_upstream_filled(values, &dep.field) {
        return FieldGate::Ready;
    }

    let upstream_label = fields
        .iter()
        .find(|f| f.name == dep.field)
        .map(|f| f.display_name().to_string())
        .unwrap_or_else(|| dep.field.clone());

    FieldGate::Blocked {
        upstream: dep.field.clone(),
        placeholder: format!("Select {} first", upstream_label),
    }
}

// =============================================================================
// Construction-time checks
// =============================================================================

/// Returns the fields a field points at through `dependsOn` and `showIf`.
fn graph_edges(spec: &FieldSpec) -> impl Iterator<Item = (&str, &'static str)> {
    let depends = spec.depends_on.as_ref().map(|d| (d.field.as_str(), "dependsOn"));
    let show = spec.show_if.as_ref().map(|s| (s.field.as_str(), "showIf"));
    depends.into_iter().chain(show)
}

/// Validates names, references and acyclicity of a field list.
pub(crate) fn check_graph(fields: &[FieldSpec]) -> Result<(), ConfigError> {
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(fields.len());
    for (i, spec) in fields.iter().enumerate() {
        if spec.name.trim().is_empty() {
            return Err(ConfigError::EmptyName { index: i });
        }
        if index.insert(spec.name.as_str(), i).is_some() {
            return Err(ConfigError::DuplicateName {
                name: spec.name.clone(),
            });
        }
    }

    for spec in fields {
        let rule_refs = spec
            .validation
            .iter()
            .filter_map(|rule| rule.field_reference().map(|f| (f, "validation")));

        for (reference, via) in graph_edges(spec).chain(rule_refs) {
            if reference == spec.name {
                if via == "validation" {
                    continue;
                }
                return Err(ConfigError::SelfReference {
                    field: spec.name.clone(),
                    via,
                });
            }
            if !index.contains_key(reference) {
                return Err(ConfigError::UnknownReference {
                    field: spec.name.clone(),
                    reference: reference.to_string(),
                    via,
                });
            }
        }
    }

    find_cycle(fields, &index).map_or(Ok(()), |path| Err(ConfigError::Cycle { path }))
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

/// Depth-first search over `dependsOn` / `showIf` edges.
///
/// Returns the cycle as a path of names that starts and ends with the same field.
fn find_cycle(fields: &[FieldSpec], index: &HashMap<&str, usize>) -> Option<Vec<String>> {
    let mut marks = vec![Mark::Unvisited; fields.len()];
    let mut stack: Vec<usize> = Vec::new();

    fn visit(
        node: usize,
        fields: &[FieldSpec],
        index: &HashMap<&str, usize>,
        marks: &mut [Mark],
        stack: &mut Vec<usize>,
    ) -> Option<Vec<String>> {
        marks[node] = Mark::InProgress;
        stack.push(node);

        for (reference, _) in graph_edges(&fields[node]) {
            let Some(&next) = index.get(reference) else {
                continue;
            };
            match marks[next] {
                Mark::InProgress => {
                    let start = stack.iter().position(|&n| n == next).unwrap_or(0);
                    let mut path: Vec<String> = stack[start..]
                        .iter()
                        .map(|&n| fields[n].name.clone())
                        .collect();
                    path.push(fields[next].name.clone());
                    return Some(path);
                }
                Mark::Unvisited => {
                    if let Some(path) = visit(next, fields, index, marks, stack) {
                        return Some(path);
                    }
                }
                Mark::Done => {}
            }
        }

        stack.pop();
        marks[node] = Mark::Done;
        None
    }

    for node in 0..fields.len() {
        if marks[node] == Mark::Unvisited
            && let Some(path) = visit(node, fields, index, &mut marks, &mut stack)
        {
            return Some(path);
        }
    }
    None
}
