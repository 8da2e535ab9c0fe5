//! Request URL construction.

use std::collections::BTreeMap;

use crate::model::FieldSpec;
use crate::model::Value;
use crate::model::ValueMap;

use super::key::is_present_param;

/// Appends a query parameter, choosing `?` or `&` from the URL's current shape.
pub fn append_query(url: &mut String, key: &str, value: &str) {
    if !(url.ends_with('?') || url.ends_with('&')) {
        url.push(if url.contains('?') { '&' } else { '?' });
    }
    url.push_str(&urlencoding::encode(key));
    url.push('=');
    url.push_str(&urlencoding::encode(value));
}

/// Builds a request URL.
///
/// When `dependency` is given and the base URL ends with `/`, the upstream
/// value becomes a path segment; otherwise it is a query parameter named by
/// the `paramKey`. Additional parameters with a null or empty value are
/// skipped.
///
/// # Example
///
/// ```
/// use std::collections::BTreeMap;
/// use assetform_lib::model::Value;
/// use assetform_lib::remote::build_url;
///
/// let campus = Value::from("42");
/// let none = BTreeMap::new();
/// assert_eq!(build_url("/locations/campus/", Some(("campusId", &campus)), &none), "/locations/campus/42");
/// assert_eq!(build_url("/assets", Some(("campusId", &campus)), &none), "/assets?campusId=42");
/// ```
pub fn build_url(
    api_url: &str,
    dependency: Option<(&str, &Value)>,
    params: &BTreeMap<String, Value>,
) -> String {
    let mut url = api_url.to_string();

    if let Some((param_key, value)) = dependency
        && !value.is_blank()
    {
        let param = value.to_param();
        if url.ends_with('/') {
            url.push_str(&urlencoding::encode(&param));
        } else {
            append_query(&mut url, param_key, &param);
        }
    }

    for (key, value) in params.iter().filter(|(_, v)| is_present_param(v)) {
        append_query(&mut url, key, &value.to_param());
    }

    url
}

/// Builds the request URL for a remote field, or `None` if it has no endpoint.
pub fn build_field_url(spec: &FieldSpec, values: &ValueMap) -> Option<String> {
    let api_url = spec.remote.api_url.as_deref()?;
    let dependency = spec.depends_on.as_ref().map(|dep| {
        (
            dep.param_key.as_str(),
            values.get(&dep.field).unwrap_or(&Value::Null),
        )
    });
    Some(build_url(api_url, dependency, &spec.remote.additional_params))
}
