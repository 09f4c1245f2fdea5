//! Bound parameters
//!
//! The set of parameters a caller explicitly supplied, and the mapping of
//! those parameters onto a request for a given operation.

use super::builder::{Request, RequestBuilder};
use super::coerce::{coerce_str, coerce_value};
use crate::error::{Error, Result};
use crate::loader::OperationDefinition;
use crate::types::JsonValue;
use std::collections::BTreeMap;

/// Parameters explicitly supplied by the caller
///
/// Presence in this map is what "bound" means: a parameter that is absent
/// here is never sent, however its type would default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundParameters {
    values: BTreeMap<String, JsonValue>,
}

impl BoundParameters {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a parameter, replacing a previous binding with the same name in any case
    pub fn bind(&mut self, name: impl Into<String>, value: impl Into<JsonValue>) {
        let name = name.into();
        self.values.retain(|k, _| !k.eq_ignore_ascii_case(&name));
        self.values.insert(name, value.into());
    }

    /// Builder-style bind
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.bind(name, value);
        self
    }

    /// Look up a bound value (case-insensitive)
    pub fn get(&self, name: &str) -> Option<&JsonValue> {
        self.values
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }

    /// Whether a parameter was explicitly bound
    pub fn is_bound(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterate bindings in name order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &JsonValue)> {
        self.values.iter()
    }

    /// Number of bound parameters
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when nothing was bound
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Bind from `Name=Value` text, coercing against the operation's declared type
    pub fn bind_text(&mut self, op: &OperationDefinition, assignment: &str) -> Result<()> {
        let (name, raw) = assignment.split_once('=').ok_or_else(|| {
            Error::config(format!(
                "Parameter assignment '{assignment}' must have the form Name=Value"
            ))
        })?;
        let param = op.parameter(name.trim()).ok_or_else(|| Error::UnknownParameter {
            command: op.command.clone(),
            parameter: name.trim().to_string(),
        })?;
        let value = coerce_str(param, raw)?;
        self.bind(param.name.clone(), value);
        Ok(())
    }

    /// Validate bindings against an operation and return them keyed by declared name
    ///
    /// Rejects unknown names and missing required parameters, and coerces each
    /// value to its declared type.
    pub fn resolve(&self, op: &OperationDefinition) -> Result<BoundParameters> {
        let mut resolved = BoundParameters::new();

        for (name, value) in &self.values {
            let param = op.parameter(name).ok_or_else(|| Error::UnknownParameter {
                command: op.command.clone(),
                parameter: name.clone(),
            })?;
            resolved.bind(param.name.clone(), coerce_value(param, value.clone())?);
        }

        for param in op.required_parameters() {
            if !resolved.is_bound(&param.name) {
                return Err(Error::missing_parameter(&op.command, &param.name));
            }
        }

        Ok(resolved)
    }
}

impl<K: Into<String>, V: Into<JsonValue>> FromIterator<(K, V)> for BoundParameters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (k, v) in iter {
            params.bind(k, v);
        }
        params
    }
}

/// Build the request for an operation from resolved parameters
///
/// Parameters named in `exclude` are left out even when bound; the
/// pagination loop uses this to own the continuation token member.
pub fn build_request(
    op: &OperationDefinition,
    params: &BoundParameters,
    exclude: &[&str],
) -> Request {
    let mut builder = RequestBuilder::new();
    for param in &op.parameters {
        if exclude.iter().any(|e| e.eq_ignore_ascii_case(&param.name)) {
            continue;
        }
        builder = builder.set_opt(param.member(), params.get(&param.name).cloned());
    }
    builder.build()
}
