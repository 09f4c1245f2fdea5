//! Command catalog
//!
//! Holds every loaded service and resolves command names to operations.

use crate::error::{Error, Result};
use crate::loader::parser::{load_service, load_service_from_str};
use crate::loader::types::{OperationDefinition, ServiceDefinition};
use crate::services;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// A resolved command: the operation plus the service that owns it
#[derive(Debug, Clone, Copy)]
pub struct CommandRef<'a> {
    pub service: &'a ServiceDefinition,
    pub operation: &'a OperationDefinition,
}

/// Set of services with a case-insensitive command index
#[derive(Debug, Default)]
pub struct Catalog {
    services: Vec<ServiceDefinition>,
    /// lowercased command -> (service index, operation index)
    index: HashMap<String, (usize, usize)>,
}

impl Catalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog holding every built-in service
    pub fn builtin() -> Result<Self> {
        let mut catalog = Self::new();
        for name in services::list_builtin() {
            let yaml = services::get_builtin(name)
                .ok_or_else(|| Error::config(format!("Missing built-in service '{name}'")))?;
            catalog.add(load_service_from_str(yaml)?)?;
        }
        Ok(catalog)
    }

    /// Load a service by built-in name or file path and add it
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let service = load_service(path)?;
        self.add(service)
    }

    /// Add a validated service; command names must stay unique across services
    pub fn add(&mut self, service: ServiceDefinition) -> Result<()> {
        if self.services.iter().any(|s| s.name == service.name) {
            return Err(Error::config(format!(
                "Service '{}' is already loaded",
                service.name
            )));
        }

        let service_idx = self.services.len();
        let mut entries = Vec::with_capacity(service.operations.len());
        for (op_idx, op) in service.operations.iter().enumerate() {
            let key = op.command.to_ascii_lowercase();
            if let Some((other, _)) = self.index.get(&key) {
                return Err(Error::config(format!(
                    "Command '{}' of service '{}' is already defined by service '{}'",
                    op.command, service.name, self.services[*other].name
                )));
            }
            entries.push((key, (service_idx, op_idx)));
        }

        debug!(
            service = %service.name,
            commands = entries.len(),
            "Registered service"
        );
        self.index.extend(entries);
        self.services.push(service);
        Ok(())
    }

    /// Resolve a command name (case-insensitive)
    pub fn resolve(&self, command: &str) -> Option<CommandRef<'_>> {
        let (service_idx, op_idx) = self.index.get(&command.to_ascii_lowercase())?;
        let service = &self.services[*service_idx];
        Some(CommandRef {
            service,
            operation: &service.operations[*op_idx],
        })
    }

    /// All loaded services
    pub fn services(&self) -> &[ServiceDefinition] {
        &self.services
    }

    /// Find a loaded service by name
    pub fn service(&self, name: &str) -> Option<&ServiceDefinition> {
        self.services.iter().find(|s| s.name.eq_ignore_ascii_case(name))
    }

    /// Every command, optionally restricted to one service, sorted by name
    pub fn commands(&self, service: Option<&str>) -> Vec<CommandRef<'_>> {
        let mut commands: Vec<_> = self
            .services
            .iter()
            .filter(|s| service.map_or(true, |name| s.name.eq_ignore_ascii_case(name)))
            .flat_map(|s| {
                s.operations.iter().map(move |operation| CommandRef {
                    service: s,
                    operation,
                })
            })
            .collect();
        commands.sort_by(|a, b| a.operation.command.cmp(&b.operation.command));
        commands
    }
}
