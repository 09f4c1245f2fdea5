//! Invocation engine module
//!
//! Turns a command invocation into service calls and output objects.
//!
//! # Overview
//!
//! For each invocation the engine:
//! 1. resolves the command and validates the bound parameters
//! 2. resolves the selector against the operation
//! 3. runs the confirmation step
//! 4. builds the request, leaving unset members out
//! 5. calls the transport once, or drives the pagination loop
//! 6. projects each response and emits the outputs as they arrive
//!
//! Every check in steps 1-3 happens before any call is made.

mod types;

pub use types::{Invocation, InvocationStats};

use crate::config::ClientContext;
use crate::confirm::{decide, ConfirmationPrompt, Confirmer, Decision, StdinConfirmer};
use crate::error::{Error, Result};
use crate::loader::{Catalog, OperationDefinition, ServiceDefinition};
use crate::pagination::{paginate, Page, PageSource, PaginationMode, TokenPagination};
use crate::request::{build_request, BoundParameters, Request};
use crate::select::{enumerate, ResolvedSelector};
use crate::template::value_to_string;
use crate::transport::Transport;
use async_trait::async_trait;
use futures::StreamExt;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Executes command invocations against a catalog of services
pub struct Engine {
    catalog: Catalog,
    transport: Arc<dyn Transport>,
    confirmer: Arc<dyn Confirmer>,
    ctx: ClientContext,
}

impl Engine {
    /// Create an engine that prompts on the terminal
    pub fn new(catalog: Catalog, transport: Arc<dyn Transport>, ctx: ClientContext) -> Self {
        Self {
            catalog,
            transport,
            confirmer: Arc::new(StdinConfirmer),
            ctx,
        }
    }

    /// Replace the confirmer
    #[must_use]
    pub fn with_confirmer(mut self, confirmer: Arc<dyn Confirmer>) -> Self {
        self.confirmer = confirmer;
        self
    }

    /// Get the catalog
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Get the client context
    pub fn context(&self) -> &ClientContext {
        &self.ctx
    }

    /// Run an invocation, handing each output object to `sink` as it arrives
    ///
    /// Outputs already handed over stay delivered when a later page fails;
    /// the failure is returned as [`Error::PageFailed`] with its page number.
    pub async fn invoke_streaming<F>(
        &self,
        invocation: &Invocation,
        cancel: &CancellationToken,
        mut sink: F,
    ) -> Result<InvocationStats>
    where
        F: FnMut(Value) -> Result<()> + Send,
    {
        let start = Instant::now();
        let mut stats = InvocationStats::new();

        let command = self
            .catalog
            .resolve(&invocation.command)
            .ok_or_else(|| Error::unknown_command(&invocation.command))?;
        let service = command.service;
        let op = command.operation;

        let params = invocation.parameters.resolve(op)?;
        let selector =
            ResolvedSelector::resolve(op, invocation.select.as_deref(), invocation.pass_thru)?;
        let pagination = TokenPagination::from_operation(op);

        if invocation.starting_token.is_some() {
            match &pagination {
                None => {
                    return Err(Error::config(format!(
                        "{} does not paginate; a starting token cannot be used",
                        op.command
                    )));
                }
                Some(pagination) if params.is_bound(&pagination.input_parameter) => {
                    return Err(Error::config(format!(
                        "{} was given both {} and a starting token",
                        op.command, pagination.input_parameter
                    )));
                }
                Some(_) => {}
            }
        }

        let prompt = ConfirmationPrompt {
            command: op.command.clone(),
            operation: op.operation.clone(),
            target: op
                .resource_identifier
                .as_deref()
                .and_then(|name| params.get(name))
                .map(value_to_string),
            impact: op.confirm_impact,
        };
        let decision = decide(
            self.confirmer.as_ref(),
            &prompt,
            self.ctx.confirm_preference,
            invocation.force,
            invocation.what_if,
        )
        .await?;
        if decision != Decision::Proceed {
            stats.skipped = true;
            stats.set_duration(elapsed_ms(start));
            return Ok(stats);
        }

        info!(command = %op.label(), selector = %selector, "Invoking");

        match pagination {
            Some(pagination) => {
                self.run_paginated(
                    service,
                    op,
                    &params,
                    &pagination,
                    &selector,
                    invocation,
                    cancel,
                    &mut stats,
                    &mut sink,
                )
                .await?;
            }
            None => {
                if cancel.is_cancelled() {
                    return Err(Error::Cancelled);
                }
                let request = build_request(op, &params, &[]);
                stats.add_call();
                let response = self
                    .transport
                    .invoke(&self.ctx, service, op, &request, cancel)
                    .await?;
                stats.add_page();
                emit(selector.project(&response, &params), &mut stats, &mut sink)?;
            }
        }

        stats.set_duration(elapsed_ms(start));
        debug!(
            calls = stats.calls,
            pages = stats.pages,
            outputs = stats.outputs,
            duration_ms = stats.duration_ms,
            "Invocation complete"
        );
        Ok(stats)
    }

    /// Run an invocation and collect every output object
    pub async fn invoke(
        &self,
        invocation: &Invocation,
        cancel: &CancellationToken,
    ) -> Result<Vec<Value>> {
        let mut outputs = Vec::new();
        self.invoke_streaming(invocation, cancel, |value| {
            outputs.push(value);
            Ok(())
        })
        .await?;
        Ok(outputs)
    }

    #[allow(clippy::too_many_arguments)]
    async fn run_paginated<F>(
        &self,
        service: &ServiceDefinition,
        op: &OperationDefinition,
        params: &BoundParameters,
        pagination: &TokenPagination,
        selector: &ResolvedSelector,
        invocation: &Invocation,
        cancel: &CancellationToken,
        stats: &mut InvocationStats,
        sink: &mut F,
    ) -> Result<()>
    where
        F: FnMut(Value) -> Result<()> + Send,
    {
        let bound_token = params.get(&pagination.input_parameter).map(value_to_string);
        let mode = PaginationMode::resolve(invocation.no_auto_iteration, bound_token.is_some());
        let start_token = bound_token
            .or_else(|| invocation.starting_token.clone())
            .filter(|t| !t.is_empty());

        let request = build_request(op, params, &[pagination.input_parameter.as_str()]);
        let source = OperationPages {
            transport: self.transport.as_ref(),
            ctx: &self.ctx,
            service,
            op,
            request: &request,
            member: &pagination.input_member,
            cancel,
        };

        debug!(?mode, start_token = ?start_token, "Starting pagination");

        let mut pages = paginate(&source, pagination, start_token, mode, cancel);
        while let Some(page) = pages.next().await {
            if made_call(&page) {
                stats.add_call();
            }
            let page = page?;
            stats.add_page();
            if selector.reads_response() {
                emit(selector.project(&page.response, params), stats, sink)?;
            }
            if mode == PaginationMode::Manual {
                stats.next_token.clone_from(&page.next_token);
            }
        }

        // Echoed parameters are the same for every page
        if !selector.reads_response() {
            emit(selector.project(&Value::Null, params), stats, sink)?;
        }

        if let Some(token) = &stats.next_token {
            info!("More results are available; resume with starting token {token}");
        }
        Ok(())
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("services", &self.catalog.services().len())
            .field("ctx", &self.ctx)
            .finish_non_exhaustive()
    }
}

/// One operation as a page source: the base request plus the token member
struct OperationPages<'a> {
    transport: &'a dyn Transport,
    ctx: &'a ClientContext,
    service: &'a ServiceDefinition,
    op: &'a OperationDefinition,
    request: &'a Request,
    member: &'a str,
    cancel: &'a CancellationToken,
}

#[async_trait]
impl PageSource for OperationPages<'_> {
    async fn fetch_page(&self, token: Option<&str>) -> Result<Value> {
        let request = match token {
            Some(token) => self.request.with(self.member, token),
            None => self.request.clone(),
        };
        self.transport
            .invoke(self.ctx, self.service, self.op, &request, self.cancel)
            .await
    }
}

/// A cancellation yielded by the pager means no page was requested
fn made_call(page: &Result<Page>) -> bool {
    !matches!(page, Err(e) if e.is_cancelled())
}

fn emit<F>(projected: Value, stats: &mut InvocationStats, sink: &mut F) -> Result<()>
where
    F: FnMut(Value) -> Result<()>,
{
    for output in enumerate(projected) {
        sink(output)?;
        stats.add_outputs(1);
    }
    Ok(())
}

#[allow(clippy::cast_possible_truncation)]
fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

#[cfg(test)]
mod tests;
