//! `${VAR}` and `${VAR:-default}` expansion for configuration strings.
//!
//! Values without `${` are returned untouched. Once a value contains it,
//! bare `$VAR` references in that value are expanded as well.

use std::borrow::Cow;

use crate::ConfigError;

/// Expand variables in `value` from the process environment.
///
/// `field` names the config key in error messages.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    expand_with(value, field, |var| std::env::var(var).ok())
}

/// Expand variables in `value`, resolving names through `lookup`.
fn expand_with(
    value: &str,
    field: &str,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |var| lookup(var).map(Some).ok_or(Unset))
        .map(Cow::into_owned)
        .map_err(|e| ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{}}} not set", e.var_name),
        })
}

/// Lookup failure; the variable name travels in `shellexpand::LookupError`.
struct Unset;
