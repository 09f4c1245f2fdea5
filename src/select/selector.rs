//! Selector parsing, resolution and projection

use crate::error::{Error, Result};
use crate::loader::OperationDefinition;
use crate::request::BoundParameters;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// What the caller asked to get back, as written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// `*`
    WholeResponse,
    /// `FieldName`
    NamedField(String),
    /// `^ParameterName`
    EchoParameter(String),
}

impl Selector {
    /// Parse selector syntax: `*`, `^Parameter` or `Field`
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed == "*" {
            return Ok(Self::WholeResponse);
        }
        if let Some(param) = trimmed.strip_prefix('^') {
            let param = param.trim();
            if param.is_empty() {
                return Err(Error::invalid_selector(raw, "'^' must be followed by a parameter name"));
            }
            return Ok(Self::EchoParameter(param.to_string()));
        }
        if trimmed.is_empty() {
            return Err(Error::invalid_selector(raw, "selector cannot be empty"));
        }
        if trimmed.contains(char::is_whitespace) {
            return Err(Error::invalid_selector(raw, "field names cannot contain whitespace"));
        }
        Ok(Self::NamedField(trimmed.to_string()))
    }
}

impl FromStr for Selector {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::WholeResponse => write!(f, "*"),
            Selector::NamedField(name) => write!(f, "{name}"),
            Selector::EchoParameter(name) => write!(f, "^{name}"),
        }
    }
}

/// A selector checked against an operation, ready to project responses
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedSelector {
    /// Return the response unchanged
    WholeResponse,
    /// Return one response field, by its declared spelling
    Field(String),
    /// Return a bound parameter value, by its declared name
    Echo(String),
}

impl ResolvedSelector {
    /// Resolve the caller's selection for an operation
    ///
    /// `pass_thru` is the legacy switch that echoes the operation's
    /// pass-through parameter; it cannot be combined with an explicit
    /// `select`. Unknown fields and parameters are rejected here, before
    /// any call is made.
    pub fn resolve(op: &OperationDefinition, select: Option<&str>, pass_thru: bool) -> Result<Self> {
        if pass_thru {
            if let Some(select) = select {
                return Err(Error::invalid_selector(
                    select,
                    "an explicit select cannot be combined with pass-thru",
                ));
            }
            let param = op.pass_thru.as_deref().ok_or_else(|| {
                Error::invalid_selector(
                    "pass-thru",
                    format!("{} has no pass-through parameter", op.command),
                )
            })?;
            return Self::resolve_parsed(op, Selector::EchoParameter(param.to_string()), "pass-thru");
        }

        match select {
            Some(raw) => Self::resolve_parsed(op, Selector::parse(raw)?, raw),
            None => match op.default_select.as_deref() {
                None | Some("*") => Ok(Self::WholeResponse),
                Some(field) => Self::resolve_parsed(op, Selector::NamedField(field.to_string()), field),
            },
        }
    }

    fn resolve_parsed(op: &OperationDefinition, selector: Selector, raw: &str) -> Result<Self> {
        match selector {
            Selector::WholeResponse => Ok(Self::WholeResponse),
            Selector::NamedField(name) => op
                .response_field(&name)
                .map(|field| Self::Field(field.to_string()))
                .ok_or_else(|| {
                    let available = if op.response_fields.is_empty() {
                        "none".to_string()
                    } else {
                        op.response_fields.join(", ")
                    };
                    Error::invalid_selector(
                        raw,
                        format!(
                            "{} has no response field '{name}' (available: {available})",
                            op.command
                        ),
                    )
                }),
            Selector::EchoParameter(name) => op
                .parameter(&name)
                .map(|param| Self::Echo(param.name.clone()))
                .ok_or_else(|| {
                    Error::invalid_selector(
                        raw,
                        format!("{} has no parameter '{name}'", op.command),
                    )
                }),
        }
    }

    /// Project a response into the invocation's output value
    pub fn project(&self, response: &Value, params: &BoundParameters) -> Value {
        match self {
            Self::WholeResponse => response.clone(),
            Self::Field(field) => response.get(field).cloned().unwrap_or(Value::Null),
            Self::Echo(param) => params.get(param).cloned().unwrap_or(Value::Null),
        }
    }

    /// Whether projection reads the response at all
    pub fn reads_response(&self) -> bool {
        !matches!(self, Self::Echo(_))
    }
}

impl fmt::Display for ResolvedSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WholeResponse => write!(f, "*"),
            Self::Field(name) => write!(f, "{name}"),
            Self::Echo(name) => write!(f, "^{name}"),
        }
    }
}

/// Split a projected value into output objects
///
/// Lists are emitted element by element; `null` and empty objects emit nothing.
pub fn enumerate(value: Value) -> Vec<Value> {
    match value {
        Value::Null => Vec::new(),
        Value::Object(map) if map.is_empty() => Vec::new(),
        Value::Array(items) => items,
        other => vec![other],
    }
}
