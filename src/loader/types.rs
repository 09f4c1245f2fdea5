//! Loader types
//!
//! Declarative service model types for YAML parsing.

use crate::types::{ConfirmImpact, Location, Method, ParamType, Protocol};
use serde::{Deserialize, Serialize};

// ============================================================================
// Service Definition
// ============================================================================

/// Top-level service definition
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ServiceDefinition {
    /// Service name (e.g., "events")
    pub name: String,
    /// Human-readable title
    #[serde(default)]
    pub title: Option<String>,
    /// Wire dialect
    pub protocol: Protocol,
    /// Hostname prefix used to derive the regional endpoint
    pub endpoint_prefix: String,
    /// `X-Amz-Target` prefix (JSON protocol only)
    #[serde(default)]
    pub target_prefix: Option<String>,
    /// JSON protocol version for the content type
    #[serde(default = "default_json_version")]
    pub json_version: String,
    /// Operations exposed as commands
    pub operations: Vec<OperationDefinition>,
}

fn default_json_version() -> String {
    "1.1".to_string()
}

impl ServiceDefinition {
    /// Find an operation by command name (case-insensitive)
    pub fn command(&self, command: &str) -> Option<&OperationDefinition> {
        self.operations
            .iter()
            .find(|op| op.command.eq_ignore_ascii_case(command))
    }

    /// Display title, falling back to the name
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }
}

// ============================================================================
// Operation Definition
// ============================================================================

/// A single service operation exposed as a command
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct OperationDefinition {
    /// Command name (e.g., "Get-EVBRuleList")
    pub command: String,
    /// Wire operation name (e.g., "ListRules")
    pub operation: String,
    /// Short description
    #[serde(default)]
    pub description: Option<String>,
    /// HTTP binding (REST-JSON only)
    #[serde(default)]
    pub http: Option<HttpBinding>,
    /// Declared parameters
    #[serde(default)]
    pub parameters: Vec<ParameterDefinition>,
    /// Top-level fields of the response shape
    #[serde(default)]
    pub response_fields: Vec<String>,
    /// Selector used when the caller gives none
    #[serde(default)]
    pub default_select: Option<String>,
    /// Parameter echoed by the legacy pass-through switch
    #[serde(default)]
    pub pass_thru: Option<String>,
    /// Token pagination, for list operations
    #[serde(default)]
    pub pagination: Option<PaginationDefinition>,
    /// Impact used to decide whether to prompt for confirmation
    #[serde(default)]
    pub confirm_impact: ConfirmImpact,
    /// Parameter whose value names the target in confirmation prompts
    #[serde(default)]
    pub resource_identifier: Option<String>,
}

impl OperationDefinition {
    /// Find a parameter by name (case-insensitive)
    pub fn parameter(&self, name: &str) -> Option<&ParameterDefinition> {
        self.parameters
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Find a response field by name (case-insensitive), returning the declared spelling
    pub fn response_field(&self, name: &str) -> Option<&str> {
        self.response_fields
            .iter()
            .find(|f| f.eq_ignore_ascii_case(name))
            .map(String::as_str)
    }

    /// Whether this is a token-paginated list operation
    pub fn is_paginated(&self) -> bool {
        self.pagination.is_some()
    }

    /// Parameters marked as required
    pub fn required_parameters(&self) -> impl Iterator<Item = &ParameterDefinition> {
        self.parameters.iter().filter(|p| p.required)
    }

    /// Label used in logs and prompts, e.g. `Get-EVBRuleList (ListRules)`
    pub fn label(&self) -> String {
        format!("{} ({})", self.command, self.operation)
    }
}

/// HTTP method and URI template of a REST-JSON operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpBinding {
    pub method: Method,
    pub uri: String,
}

// ============================================================================
// Parameter Definition
// ============================================================================

/// A command parameter mapped onto a request member
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ParameterDefinition {
    /// User-facing name
    pub name: String,
    /// Dotted wire path; defaults to the name
    #[serde(default)]
    pub member: Option<String>,
    /// Value type
    #[serde(default, rename = "type")]
    pub param_type: ParamType,
    /// Must be supplied by the caller
    #[serde(default)]
    pub required: bool,
    /// Serialization location (REST-JSON only)
    #[serde(default)]
    pub location: Location,
    /// Short description
    #[serde(default)]
    pub description: Option<String>,
}

impl ParameterDefinition {
    /// Create a string body parameter
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            member: None,
            param_type: ParamType::String,
            required: false,
            location: Location::Body,
            description: None,
        }
    }

    /// Wire path of the member this parameter populates
    pub fn member(&self) -> &str {
        self.member.as_deref().unwrap_or(&self.name)
    }
}

// ============================================================================
// Pagination Definition
// ============================================================================

/// Token pagination fields of a list operation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PaginationDefinition {
    /// Parameter carrying the continuation token into the request
    pub input_token: String,
    /// Response field carrying the next continuation token
    pub output_token: String,
    /// Response field holding the page items
    pub items: String,
}
