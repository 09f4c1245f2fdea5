//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::{ClientContext, ContextOverrides};
use crate::engine::{Engine, Invocation};
use crate::error::{Error, Result};
use crate::loader::{load_service, Catalog, CommandRef};
use crate::request::BoundParameters;
use crate::transport::HttpTransport;
use serde_json::{json, Value};
use std::io::Write;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Invoke {
                command,
                params,
                params_json,
                select,
                pass_thru,
                force,
                what_if,
                no_auto_iteration,
                starting_token,
            } => {
                let catalog = self.load_catalog()?;
                let mut invocation = Invocation::new(command.clone());
                invocation.parameters =
                    parse_parameters(&catalog, command, params, params_json.as_deref())?;
                invocation.select.clone_from(select);
                invocation.pass_thru = *pass_thru;
                invocation.force = *force;
                invocation.what_if = *what_if;
                invocation.no_auto_iteration = *no_auto_iteration;
                invocation.starting_token.clone_from(starting_token);
                self.invoke(catalog, &invocation).await
            }
            Commands::Commands { service } => self.list_commands(service.as_deref()),
            Commands::Describe { command } => self.describe(command),
            Commands::Services => self.list_services(),
            Commands::Validate { file } => self.validate(file),
        }
    }

    /// Built-in services plus every `--service-file`
    fn load_catalog(&self) -> Result<Catalog> {
        let mut catalog = Catalog::builtin()?;
        for path in &self.cli.service_files {
            debug!("Loading service file {}", path.display());
            catalog.load(path)?;
        }
        Ok(catalog)
    }

    /// Build the client context from every configuration layer
    fn load_context(&self) -> Result<ClientContext> {
        let overrides = ContextOverrides {
            region: self.cli.region.clone(),
            endpoint_url: self.cli.endpoint_url.clone(),
            profile: self.cli.profile.clone(),
        };
        ClientContext::load(self.cli.config_file.as_deref(), &overrides)
    }

    /// Invoke a command, writing outputs as they arrive
    async fn invoke(&self, catalog: Catalog, invocation: &Invocation) -> Result<()> {
        let ctx = self.load_context()?;
        let transport = Arc::new(HttpTransport::new(&ctx)?);
        let engine = Engine::new(catalog, transport, ctx);

        let cancel = CancellationToken::new();
        let on_interrupt = cancel.clone();
        let watcher = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, cancelling");
                on_interrupt.cancel();
            }
        });

        let format = self.cli.format;
        let result = engine
            .invoke_streaming(invocation, &cancel, |value| {
                write_value(&mut std::io::stdout(), format, &value)
            })
            .await;
        watcher.abort();

        let stats = result?;
        if stats.skipped {
            info!("{} was not invoked", invocation.command);
        }
        if let Some(token) = &stats.next_token {
            eprintln!("NextToken: {token}");
        }
        Ok(())
    }

    /// List available commands
    fn list_commands(&self, service: Option<&str>) -> Result<()> {
        let catalog = self.load_catalog()?;
        if let Some(name) = service {
            if catalog.service(name).is_none() {
                return Err(Error::config(format!("Unknown service: {name}")));
            }
        }

        let commands: Vec<Value> = catalog
            .commands(service)
            .into_iter()
            .map(|c| {
                json!({
                    "command": c.operation.command,
                    "service": c.service.name,
                    "operation": c.operation.operation,
                    "description": c.operation.description,
                })
            })
            .collect();

        self.output_message(&json!({ "commands": commands }))
    }

    /// Describe one command
    fn describe(&self, command: &str) -> Result<()> {
        let catalog = self.load_catalog()?;
        let CommandRef { service, operation } = catalog
            .resolve(command)
            .ok_or_else(|| Error::unknown_command(command))?;

        let parameters: Vec<Value> = operation
            .parameters
            .iter()
            .map(|p| {
                json!({
                    "name": p.name,
                    "member": p.member(),
                    "type": p.param_type.to_string(),
                    "required": p.required,
                    "location": p.location,
                    "description": p.description,
                })
            })
            .collect();

        self.output_message(&json!({
            "command": operation.command,
            "service": service.name,
            "protocol": service.protocol.to_string(),
            "operation": operation.operation,
            "description": operation.description,
            "parameters": parameters,
            "response_fields": operation.response_fields,
            "default_select": operation.default_select.as_deref().unwrap_or("*"),
            "pass_thru": operation.pass_thru,
            "pagination": operation.pagination,
            "confirm_impact": operation.confirm_impact.to_string(),
        }))
    }

    /// List loaded services
    fn list_services(&self) -> Result<()> {
        let catalog = self.load_catalog()?;
        let services: Vec<Value> = catalog
            .services()
            .iter()
            .map(|s| {
                json!({
                    "name": s.name,
                    "title": s.display_title(),
                    "protocol": s.protocol.to_string(),
                    "endpoint_prefix": s.endpoint_prefix,
                    "commands": s.operations.len(),
                })
            })
            .collect();

        self.output_message(&json!({ "services": services }))
    }

    /// Validate a service definition file
    fn validate(&self, file: &std::path::Path) -> Result<()> {
        let service = load_service(file)?;
        self.output_message(&json!({
            "valid": true,
            "service": service.name,
            "commands": service.operations.len(),
        }))
    }

    fn output_message(&self, msg: &Value) -> Result<()> {
        write_value(&mut std::io::stdout().lock(), self.cli.format, msg)
    }
}

/// Collect `-p Name=Value` and `--params-json` bindings for a command
///
/// Unknown commands are reported here so text values can be coerced against
/// the declared parameter types.
fn parse_parameters(
    catalog: &Catalog,
    command: &str,
    assignments: &[String],
    params_json: Option<&str>,
) -> Result<BoundParameters> {
    let op = catalog
        .resolve(command)
        .ok_or_else(|| Error::unknown_command(command))?
        .operation;

    let mut params = BoundParameters::new();
    if let Some(raw) = params_json {
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| Error::config(format!("Invalid --params-json: {e}")))?;
        let Value::Object(map) = value else {
            return Err(Error::config("--params-json must be a JSON object"));
        };
        for (name, value) in map {
            params.bind(name, value);
        }
    }
    for assignment in assignments {
        params.bind_text(op, assignment)?;
    }
    Ok(params)
}

fn write_value(out: &mut impl Write, format: OutputFormat, value: &Value) -> Result<()> {
    match format {
        OutputFormat::Json => serde_json::to_writer(&mut *out, value)?,
        OutputFormat::Pretty => serde_json::to_writer_pretty(&mut *out, value)?,
    }
    writeln!(out)?;
    out.flush()?;
    Ok(())
}
