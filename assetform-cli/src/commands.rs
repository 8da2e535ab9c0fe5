//! Command implementations.

use std::fs;
use std::path::Path;

use assetform_lib::dependency::FieldGate;
use assetform_lib::engine::Form;
use assetform_lib::engine::Stepper;
use assetform_lib::engine::Submission;
use assetform_lib::model::FormDefinition;
use assetform_lib::model::ValueMap;
use assetform_lib::remote::FetchStatus;
use assetform_lib::remote::OptionProvider;
use assetform_lib::validation::ValidationResult;

use crate::config::Settings;
use crate::error::CliError;

fn read(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn load_definition(path: &Path) -> Result<FormDefinition, CliError> {
    let definition = FormDefinition::from_json(&read(path)?)?;
    log::info!(
        "Loaded {} ({} fields, {} steps)",
        path.display(),
        definition.fields.len(),
        definition.steps.len()
    );
    Ok(definition)
}

fn load_values(path: Option<&Path>) -> Result<ValueMap, CliError> {
    match path {
        Some(path) => serde_json::from_str(&read(path)?).map_err(CliError::Values),
        None => Ok(ValueMap::new()),
    }
}

fn build_form(definition: &FormDefinition, values: ValueMap) -> Result<Form, CliError> {
    Ok(Form::builder(definition.fields.clone())
        .initial_values(values)
        .build()?)
}

/// `assetform check`
pub fn check(form: &Path) -> Result<(), CliError> {
    let definition = load_definition(form)?;
    build_form(&definition, ValueMap::new())?;

    println!("ok: {} fields", definition.fields.len());
    for (dependent, upstream) in definition.fields.dependency_edges() {
        println!("  {} <- {}", dependent, upstream);
    }
    for (i, step) in definition.steps.iter().enumerate() {
        println!("  step {}: {} [{}]", i + 1, step.title, step.fields.join(", "));
    }
    Ok(())
}

/// `assetform inspect`
pub fn inspect(form: &Path, values: Option<&Path>) -> Result<(), CliError> {
    let definition = load_definition(form)?;
    let form = build_form(&definition, load_values(values)?)?;
    let visible = form.visible();

    for spec in form.fields() {
        let marker = if visible.contains(&spec.name) { "+" } else { "-" };
        println!("{} {} ({:?})", marker, spec.name, spec.kind);

        if let Some(FieldGate::Blocked { placeholder, .. }) = form.gate(&spec.name) {
            println!("    blocked: {}", placeholder);
        }
        if let Some(request) = form.option_request(&spec.name) {
            println!(
                "    request: {} key={} fetch={}",
                request.url.as_deref().unwrap_or("-"),
                request.cache_key,
                request.fetch_enabled
            );
        }
    }
    Ok(())
}

fn print_errors(result: &ValidationResult) {
    for error in result.errors() {
        eprintln!("  {}", error);
    }
}

/// `assetform submit`
pub fn submit(form: &Path, values: &Path) -> Result<(), CliError> {
    let definition = load_definition(form)?;
    let form = build_form(&definition, load_values(Some(values))?)?;

    let outcome = if definition.is_multi_step() {
        Stepper::new(form, definition.steps.clone())?.submit(|values| values)
    } else {
        let mut form = form;
        form.submit(|values| values)
    };

    match outcome {
        Submission::Submitted(snapshot) => {
            let json = serde_json::to_string_pretty(&snapshot).map_err(CliError::Snapshot)?;
            println!("{}", json);
            Ok(())
        }
        Submission::Rejected(result) => {
            print_errors(&result);
            Err(CliError::Rejected(result.errors().len()))
        }
    }
}

/// `assetform options`
pub async fn options(
    settings: &Settings,
    form: &Path,
    field: &str,
    values: Option<&Path>,
) -> Result<(), CliError> {
    let definition = load_definition(form)?;
    let mut form = build_form(&definition, load_values(values)?)?;

    let spec = form
        .fields()
        .get(field)
        .cloned()
        .ok_or_else(|| CliError::UnknownField(field.to_string()))?;
    if !spec.is_remote() {
        return Err(CliError::NotRemote(field.to_string()));
    }
    if let Some(FieldGate::Blocked { placeholder, .. }) = form.gate(field) {
        println!("{}", placeholder);
        return Ok(());
    }

    let provider = OptionProvider::new(settings.fetcher()?)
        .cache_config(settings.cache_config())
        .fetch_timeout(settings.fetch_timeout());

    let Some(set) = form.load_options(field, &provider).await else {
        return Err(CliError::NotRemote(field.to_string()));
    };
    if let FetchStatus::Failed(error) = &set.status {
        return Err(error.clone().into());
    }

    for choice in set.choices(&spec.remote.label_key, &spec.remote.value_key) {
        println!("{}\t{}", choice.value, choice.label);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_values_file_reports_values_error() {
        let path = std::env::temp_dir().join(format!("assetform-values-{}.json", std::process::id()));
        fs::write(&path, "{not json").unwrap();

        let err = load_values(Some(&path)).unwrap_err();
        assert!(matches!(err, CliError::Values(_)));
        assert!(err.to_string().starts_with("invalid values file"));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_snapshot_error_is_not_a_values_error() {
        let source = serde_json::from_str::<ValueMap>("[").unwrap_err();
        let err = CliError::Snapshot(source);
        assert!(err.to_string().starts_with("cannot write submission snapshot"));
    }
}
