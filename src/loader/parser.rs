//! YAML parser for service definitions
//!
//! Parses and validates service model files.
//! Supports both built-in services (by name) and custom YAML files (by path).

use crate::error::{Error, Result};
use crate::loader::types::{OperationDefinition, ServiceDefinition};
use crate::services;
use crate::template;
use crate::types::{Location, Protocol};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Load a service definition from a name or file path
///
/// Built-in service names (e.g. `events`) are checked first, then the input
/// is treated as a path.
pub fn load_service(path: impl AsRef<Path>) -> Result<ServiceDefinition> {
    let path = path.as_ref();
    let path_str = path.to_string_lossy();

    if !path_str.contains('/')
        && !path_str.contains('\\')
        && !path_str.ends_with(".yaml")
        && !path_str.ends_with(".yml")
    {
        if let Some(yaml) = services::get_builtin(&path_str) {
            return load_service_from_str(yaml);
        }
    }

    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            let builtin_list = services::list_builtin().join(", ");
            Error::config(format!(
                "Service '{}' not found. Built-in services: {}. Or provide a path to a YAML file.",
                path.display(),
                builtin_list
            ))
        } else {
            Error::config(format!(
                "Failed to read service file '{}': {}",
                path.display(),
                e
            ))
        }
    })?;
    load_service_from_str(&content)
}

/// Load a service definition from a YAML string
pub fn load_service_from_str(yaml: &str) -> Result<ServiceDefinition> {
    let def: ServiceDefinition = serde_yaml::from_str(yaml)
        .map_err(|e| Error::config(format!("Failed to parse service YAML: {e}")))?;

    validate_service(&def)?;
    Ok(def)
}

/// Validate a service definition
pub fn validate_service(def: &ServiceDefinition) -> Result<()> {
    if def.name.is_empty() {
        return Err(Error::invalid_model("<unnamed>", "service name cannot be empty"));
    }

    if def.endpoint_prefix.is_empty() {
        return Err(Error::invalid_model(&def.name, "endpoint_prefix cannot be empty"));
    }

    if def.operations.is_empty() {
        return Err(Error::invalid_model(
            &def.name,
            "service must have at least one operation",
        ));
    }

    if def.protocol == Protocol::Json && def.target_prefix.as_deref().unwrap_or("").is_empty() {
        return Err(Error::invalid_model(
            &def.name,
            "json protocol requires a target_prefix",
        ));
    }

    let mut commands = HashSet::new();
    for op in &def.operations {
        if !commands.insert(op.command.to_ascii_lowercase()) {
            return Err(Error::invalid_model(
                &def.name,
                format!("duplicate command '{}'", op.command),
            ));
        }
        validate_operation(def, op)?;
    }

    Ok(())
}

/// Validate a single operation against its service
fn validate_operation(def: &ServiceDefinition, op: &OperationDefinition) -> Result<()> {
    let fail = |message: String| Error::invalid_model(&def.name, message);

    if op.command.is_empty() || op.operation.is_empty() {
        return Err(fail("command and operation names cannot be empty".to_string()));
    }

    let mut names = HashSet::new();
    for param in &op.parameters {
        if param.name.is_empty() {
            return Err(fail(format!("{}: parameter name cannot be empty", op.command)));
        }
        if !names.insert(param.name.to_ascii_lowercase()) {
            return Err(fail(format!(
                "{}: duplicate parameter '{}'",
                op.command, param.name
            )));
        }
        if def.protocol == Protocol::Json && param.location != Location::Body {
            return Err(fail(format!(
                "{}: parameter '{}' has location {:?}, json protocol only supports body",
                op.command, param.name, param.location
            )));
        }
    }

    if let Some(pagination) = &op.pagination {
        if op.parameter(&pagination.input_token).is_none() {
            return Err(fail(format!(
                "{}: pagination input_token '{}' is not a declared parameter",
                op.command, pagination.input_token
            )));
        }
        for field in [&pagination.output_token, &pagination.items] {
            if op.response_field(field).is_none() {
                return Err(fail(format!(
                    "{}: pagination field '{field}' is not a declared response field",
                    op.command
                )));
            }
        }
    }

    if let Some(select) = &op.default_select {
        if select != "*" && op.response_field(select).is_none() {
            return Err(fail(format!(
                "{}: default_select '{select}' is not a declared response field",
                op.command
            )));
        }
    }

    for (what, param) in [
        ("pass_thru", &op.pass_thru),
        ("resource_identifier", &op.resource_identifier),
    ] {
        if let Some(name) = param {
            if op.parameter(name).is_none() {
                return Err(fail(format!(
                    "{}: {what} '{name}' is not a declared parameter",
                    op.command
                )));
            }
        }
    }

    if def.protocol == Protocol::RestJson {
        validate_http_binding(def, op)?;
    }

    Ok(())
}

/// Check that every URI label maps to a label parameter and vice versa
fn validate_http_binding(def: &ServiceDefinition, op: &OperationDefinition) -> Result<()> {
    let fail = |message: String| Error::invalid_model(&def.name, message);

    let http = op
        .http
        .as_ref()
        .ok_or_else(|| fail(format!("{}: rest_json operations need an http binding", op.command)))?;

    if !http.uri.starts_with('/') {
        return Err(fail(format!(
            "{}: uri '{}' must start with '/'",
            op.command, http.uri
        )));
    }

    let labels: HashSet<String> = template::labels(&http.uri)
        .into_iter()
        .map(|l| l.name)
        .collect();

    for param in op.parameters.iter().filter(|p| p.location == Location::Label) {
        if !labels.contains(param.member()) {
            return Err(fail(format!(
                "{}: label parameter '{}' has no {{{}}} in uri '{}'",
                op.command,
                param.name,
                param.member(),
                http.uri
            )));
        }
        if !param.required {
            return Err(fail(format!(
                "{}: label parameter '{}' must be required",
                op.command, param.name
            )));
        }
    }

    for label in &labels {
        let bound = op
            .parameters
            .iter()
            .any(|p| p.location == Location::Label && p.member() == label);
        if !bound {
            return Err(fail(format!(
                "{}: uri label '{{{label}}}' has no label parameter",
                op.command
            )));
        }
    }

    Ok(())
}
