//! Compiled rule sets.

use std::collections::HashMap;

use chrono::DateTime;
use chrono::NaiveDate;

use crate::dependency::is_visible;
use crate::error::ConfigError;
use crate::model::FieldSet;
use crate::model::FieldSpec;
use crate::model::ShowIf;
use crate::model::Value;
use crate::model::ValueMap;

use super::Clock;
use super::ErrorKind;
use super::FieldError;
use super::Rule;
use super::ValidationResult;
use super::ValidatorRegistry;

/// Type alias for compiled rule closures.
type SyncRule = Box<dyn Fn(&Value, &ValueMap, &dyn Clock) -> Result<(), String> + Send + Sync>;

/// A compiled rule and the error kind it reports.
struct CompiledRule {
    kind: ErrorKind,
    check: SyncRule,
}

/// Compiled validation rules for every field of a [`FieldSet`].
///
/// Compilation resolves `custom` references against the registry and compiles
/// regular expressions, so configuration defects fail here instead of at the
/// first keystroke.
pub struct RuleSet {
    rules: HashMap<String, Vec<CompiledRule>>,
}

impl RuleSet {
    /// Compiles the rules of every field.
    pub fn compile(fields: &FieldSet, registry: &ValidatorRegistry) -> Result<Self, ConfigError> {
        let mut rules = HashMap::with_capacity(fields.len());
        for spec in fields.iter() {
            let compiled = spec
                .validation
                .iter()
                .map(|rule| compile_rule(spec, rule, fields, registry))
                .collect::<Result<Vec<_>, _>>()?;
            rules.insert(spec.name.clone(), compiled);
        }
        Ok(Self { rules })
    }

    /// Validates one field against the current values.
    ///
    /// Hidden fields always pass. Otherwise the required check runs first,
    /// then each rule in order; the first failure is returned.
    pub fn validate_field(
        &self,
        spec: &FieldSpec,
        values: &ValueMap,
        clock: &dyn Clock,
    ) -> Option<FieldError> {
        if !is_visible(spec, values) {
            return None;
        }

        let value = values.get(&spec.name).unwrap_or(&Value::Null);

        if spec.required && value.is_blank() {
            return Some(FieldError::required(
                &spec.name,
                format!("{} is required", spec.display_name()),
            ));
        }

        let rules = self.rules.get(&spec.name)?;
        rules.iter().find_map(|rule| {
            (rule.check)(value, values, clock)
                .err()
                .map(|msg| FieldError::new(&spec.name, msg, rule.kind))
        })
    }

    /// Validates every field in order.
    pub fn validate(&self, fields: &FieldSet, values: &ValueMap, clock: &dyn Clock) -> ValidationResult {
        self.validate_subset(fields.iter(), values, clock)
    }

    /// Validates a subset of fields, e.g. one stepper step.
    pub fn validate_subset<'a>(
        &self,
        fields: impl IntoIterator<Item = &'a FieldSpec>,
        values: &ValueMap,
        clock: &dyn Clock,
    ) -> ValidationResult {
        let errors = fields
            .into_iter()
            .filter_map(|spec| self.validate_field(spec, values, clock))
            .collect();
        ValidationResult::from_errors(errors)
    }
}

impl std::fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: HashMap<&str, usize> = self
            .rules
            .iter()
            .map(|(name, rules)| (name.as_str(), rules.len()))
            .collect();
        f.debug_struct("RuleSet").field("rules", &counts).finish()
    }
}

// =============================================================================
// Rule compilation
// =============================================================================

fn message_or(message: &Option<String>, default: impl FnOnce() -> String) -> String {
    message.clone().unwrap_or_else(default)
}

fn single(check: SyncRule) -> CompiledRule {
    CompiledRule {
        kind: ErrorKind::Rule,
        check,
    }
}

fn cross(check: SyncRule) -> CompiledRule {
    CompiledRule {
        kind: ErrorKind::CrossField,
        check,
    }
}

/// Length of a string in characters, or of an array in items.
fn value_len(value: &Value) -> Option<usize> {
    match value {
        Value::String(s) => Some(s.chars().count()),
        Value::Array(items) => Some(items.len()),
        _ => None,
    }
}

/// Parses an ISO date (`YYYY-MM-DD`) or RFC 3339 timestamp.
pub(crate) fn parse_date(value: &Value) -> Option<NaiveDate> {
    let s = value.as_str()?.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
}

fn compile_rule(
    spec: &FieldSpec,
    rule: &Rule,
    fields: &FieldSet,
    registry: &ValidatorRegistry,
) -> Result<CompiledRule, ConfigError> {
    rule.check_config(&spec.name)?;

    let other_label = |field: &str| {
        fields
            .get(field)
            .map(|f| f.display_name().to_string())
            .unwrap_or_else(|| field.to_string())
    };

    let compiled = match rule {
        Rule::MinLength { min, message } => {
            let min = *min;
            let msg = message_or(message, || format!("Must be at least {} characters", min));
            single(Box::new(move |v, _, _| match value_len(v) {
                Some(len) if !v.is_blank() && len < min => Err(msg.clone()),
                _ => Ok(()),
            }))
        }
        Rule::MaxLength { max, message } => {
            let max = *max;
            let msg = message_or(message, || format!("Must be at most {} characters", max));
            single(Box::new(move |v, _, _| match value_len(v) {
                Some(len) if len > max => Err(msg.clone()),
                _ => Ok(()),
            }))
        }
        Rule::Pattern { pattern, message } => {
            let re = regex::Regex::new(pattern).map_err(|e| ConfigError::InvalidPattern {
                field: spec.name.clone(),
                pattern: pattern.clone(),
                message: e.to_string(),
            })?;
            let msg = message_or(message, || "Invalid format".to_string());
            single(Box::new(move |v, _, _| match v.as_str() {
                Some(s) if !v.is_blank() && !re.is_match(s) => Err(msg.clone()),
                _ => Ok(()),
            }))
        }
        Rule::Email { message } => {
            let msg = message_or(message, || "Please enter a valid email".to_string());
            single(Box::new(move |v, _, _| match v.as_str() {
                Some(s) if !v.is_blank() && !email_address::EmailAddress::is_valid(s.trim()) => {
                    Err(msg.clone())
                }
                _ => Ok(()),
            }))
        }
        Rule::Range { min, max, message } => {
            let (min, max) = (*min, *max);
            let msg = message_or(message, || match (min, max) {
                (Some(lo), Some(hi)) => format!("Must be between {} and {}", lo, hi),
                (Some(lo), None) => format!("Must be at least {}", lo),
                (None, Some(hi)) => format!("Must be at most {}", hi),
                (None, None) => "Must be a number".to_string(),
            });
            single(Box::new(move |v, _, _| {
                if v.is_blank() {
                    return Ok(());
                }
                match v.as_f64() {
                    Some(n) if min.is_none_or(|lo| n >= lo) && max.is_none_or(|hi| n <= hi) => {
                        Ok(())
                    }
                    _ => Err(msg.clone()),
                }
            }))
        }
        Rule::NotInFuture { message } => {
            let msg = message_or(message, || "Date cannot be in the future".to_string());
            single(Box::new(move |v, _, clock| match parse_date(v) {
                Some(date) if date > clock.today() => Err(msg.clone()),
                _ => Ok(()),
            }))
        }
        Rule::NotInPast { message } => {
            let msg = message_or(message, || "Date cannot be in the past".to_string());
            single(Box::new(move |v, _, clock| match parse_date(v) {
                Some(date) if date < clock.today() => Err(msg.clone()),
                _ => Ok(()),
            }))
        }
        Rule::NotBeforeField { field, message } => {
            let other = field.clone();
            let msg = message_or(message, || {
                format!("Must not be before {}", other_label(field))
            });
            cross(Box::new(move |v, values, _| {
                let mine = parse_date(v);
                let theirs = values.get(&other).and_then(parse_date);
                match (mine, theirs) {
                    (Some(mine), Some(theirs)) if mine < theirs => Err(msg.clone()),
                    _ => Ok(()),
                }
            }))
        }
        Rule::NotAfterField { field, message } => {
            let other = field.clone();
            let msg = message_or(message, || {
                format!("Must not be after {}", other_label(field))
            });
            cross(Box::new(move |v, values, _| {
                let mine = parse_date(v);
                let theirs = values.get(&other).and_then(parse_date);
                match (mine, theirs) {
                    (Some(mine), Some(theirs)) if mine > theirs => Err(msg.clone()),
                    _ => Ok(()),
                }
            }))
        }
        Rule::MatchesField { field, message } => {
            let other = field.clone();
            let msg = message_or(message, || format!("Must match {}", other_label(field)));
            cross(Box::new(move |v, values, _| {
                if v.is_blank() {
                    return Ok(());
                }
                let theirs = values.get(&other).unwrap_or(&Value::Null);
                if v.strict_eq(theirs) {
                    Ok(())
                } else {
                    Err(msg.clone())
                }
            }))
        }
        Rule::RequiredIf {
            field,
            value,
            message,
        } => {
            let condition = ShowIf {
                field: field.clone(),
                value: value.clone(),
            };
            let msg = message_or(message, || format!("{} is required", spec.display_name()));
            cross(Box::new(move |v, values, _| {
                let current = values.get(&condition.field).unwrap_or(&Value::Null);
                if condition.matches(current) && v.is_blank() {
                    Err(msg.clone())
                } else {
                    Ok(())
                }
            }))
        }
        Rule::Custom { name } => {
            let validator = registry
                .get(name)
                .ok_or_else(|| ConfigError::UnknownValidator {
                    field: spec.name.clone(),
                    name: name.clone(),
                })?;
            single(Box::new(move |v, values, clock| {
                if v.is_blank() {
                    return Ok(());
                }
                match validator(v, values, clock) {
                    Some(msg) => Err(msg),
                    None => Ok(()),
                }
            }))
        }
    };

    Ok(compiled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldKind;
    use crate::validation::FixedClock;

    fn values(pairs: &[(&str, Value)]) -> ValueMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn compile(fields: Vec<FieldSpec>) -> (FieldSet, RuleSet) {
        let set = FieldSet::new(fields).unwrap();
        let rules = RuleSet::compile(&set, &ValidatorRegistry::new()).unwrap();
        (set, rules)
    }

    #[test]
    fn test_required_whitespace_fails() {
        let (set, rules) = compile(vec![FieldSpec::new("name", FieldKind::Text).label("Name").required()]);
        let spec = set.get("name").unwrap();
        let clock = FixedClock::on(2024, 1, 1);

        let err = rules
            .validate_field(spec, &values(&[("name", Value::from("   "))]), &clock)
            .unwrap();
        assert_eq!(err.kind, ErrorKind::Required);
        assert_eq!(err.message, "Name is required");

        assert!(rules
            .validate_field(spec, &values(&[("name", Value::from("Dell"))]), &clock)
            .is_none());
    }

    #[test]
    fn test_required_empty_array_fails() {
        let (set, rules) = compile(vec![FieldSpec::new("tags", FieldKind::MultiSelect).required()]);
        let spec = set.get("tags").unwrap();
        let clock = FixedClock::on(2024, 1, 1);
        let empty = values(&[("tags", Value::Array(vec![]))]);
        assert!(rules.validate_field(spec, &empty, &clock).is_some());
    }

    #[test]
    fn test_hidden_required_passes() {
        let (set, rules) = compile(vec![
            FieldSpec::new("type", FieldKind::Select),
            FieldSpec::new("serial", FieldKind::Text)
                .required()
                .show_if("type", "laptop"),
        ]);
        let clock = FixedClock::on(2024, 1, 1);
        let vals = values(&[("type", Value::from("printer"))]);
        assert!(rules.validate(&set, &vals, &clock).is_valid());

        let vals = values(&[("type", Value::from("laptop"))]);
        assert!(rules.validate(&set, &vals, &clock).is_invalid());
    }

    #[test]
    fn test_rules_skip_blank_values() {
        let (set, rules) = compile(vec![FieldSpec::new("email", FieldKind::Text)
            .rule(Rule::email())
            .rule(Rule::min_length(5))]);
        let clock = FixedClock::on(2024, 1, 1);
        assert!(rules.validate(&set, &ValueMap::new(), &clock).is_valid());

        let vals = values(&[("email", Value::from("nope"))]);
        let result = rules.validate(&set, &vals, &clock);
        assert_eq!(result.first_error().unwrap().message, "Please enter a valid email");
    }

    #[test]
    fn test_range_accepts_numeric_strings() {
        let (set, rules) = compile(vec![
            FieldSpec::new("qty", FieldKind::Number).rule(Rule::range(Some(1.0), Some(10.0))),
        ]);
        let clock = FixedClock::on(2024, 1, 1);
        assert!(rules.validate(&set, &values(&[("qty", Value::from("4"))]), &clock).is_valid());
        assert!(rules.validate(&set, &values(&[("qty", Value::from(11i64))]), &clock).is_invalid());
        assert!(rules.validate(&set, &values(&[("qty", Value::from("many"))]), &clock).is_invalid());
    }

    #[test]
    fn test_date_rules_use_injected_clock() {
        let (set, rules) = compile(vec![
            FieldSpec::new("purchased", FieldKind::Date).rule(Rule::not_in_future()),
        ]);
        let vals = values(&[("purchased", Value::from("2024-06-01"))]);
        assert!(rules.validate(&set, &vals, &FixedClock::on(2024, 5, 31)).is_invalid());
        assert!(rules.validate(&set, &vals, &FixedClock::on(2024, 6, 1)).is_valid());
    }

    #[test]
    fn test_not_before_field_reads_sibling() {
        let (set, rules) = compile(vec![
            FieldSpec::new("validFrom", FieldKind::Date).label("Valid from"),
            FieldSpec::new("validUntil", FieldKind::Date).rule(Rule::not_before_field("validFrom")),
        ]);
        let clock = FixedClock::on(2024, 1, 1);

        let vals = values(&[
            ("validFrom", Value::from("2024-03-10")),
            ("validUntil", Value::from("2024-03-09T12:00:00Z")),
        ]);
        let result = rules.validate(&set, &vals, &clock);
        let err = result.error_for("validUntil").unwrap();
        assert_eq!(err.kind, ErrorKind::CrossField);
        assert_eq!(err.message, "Must not be before Valid from");

        let vals = values(&[
            ("validFrom", Value::from("2024-03-10")),
            ("validUntil", Value::from("2024-03-10")),
        ]);
        assert!(rules.validate(&set, &vals, &clock).is_valid());
    }

    #[test]
    fn test_required_if() {
        let (set, rules) = compile(vec![
            FieldSpec::new("status", FieldKind::Select),
            FieldSpec::new("reason", FieldKind::Textarea)
                .rule(Rule::required_if("status", vec!["retired", "lost"])),
        ]);
        let clock = FixedClock::on(2024, 1, 1);
        assert!(rules
            .validate(&set, &values(&[("status", Value::from("lost"))]), &clock)
            .is_invalid());
        assert!(rules
            .validate(&set, &values(&[("status", Value::from("active"))]), &clock)
            .is_valid());
    }

    #[test]
    fn test_custom_validator_and_unknown_name() {
        let set = FieldSet::new(vec![
            FieldSpec::new("tag", FieldKind::Text).rule(Rule::custom("assetTag")),
        ])
        .unwrap();

        assert_eq!(
            RuleSet::compile(&set, &ValidatorRegistry::new()).unwrap_err(),
            ConfigError::UnknownValidator {
                field: "tag".into(),
                name: "assetTag".into(),
            }
        );

        let registry = ValidatorRegistry::new().with("assetTag", |v, _, _| match v.as_str() {
            Some(s) if !s.starts_with("AT-") => Some("Asset tags start with AT-".to_string()),
            _ => None,
        });
        let rules = RuleSet::compile(&set, &registry).unwrap();
        let clock = FixedClock::on(2024, 1, 1);
        assert!(rules.validate(&set, &values(&[("tag", Value::from("X1"))]), &clock).is_invalid());
        assert!(rules.validate(&set, &values(&[("tag", Value::from("AT-1"))]), &clock).is_valid());
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(
            parse_date(&Value::from("2024-02-29")),
            NaiveDate::from_ymd_opt(2024, 2, 29)
        );
        assert!(parse_date(&Value::from("2024-02-30")).is_none());
        assert!(parse_date(&Value::from(20240101i64)).is_none());
    }
}
