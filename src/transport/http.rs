//! HTTP transport for AWS service calls

use super::protocol::render;
use super::Transport;
use crate::config::ClientContext;
use crate::error::{Error, Result};
use crate::http::{is_name_resolution, HttpClient, RequestConfig};
use crate::loader::{OperationDefinition, ServiceDefinition};
use crate::request::Request;
use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

/// Sends rendered requests through the retrying HTTP client
///
/// Requests are sent unsigned; point `endpoint_url` at a local emulator or a
/// signing proxy.
#[derive(Debug)]
pub struct HttpTransport {
    client: HttpClient,
}

impl HttpTransport {
    /// Create a transport with HTTP settings taken from the context
    pub fn new(ctx: &ClientContext) -> Result<Self> {
        Ok(Self {
            client: HttpClient::with_config(ctx.http_client_config())?,
        })
    }

    /// Create a transport around an existing client
    pub fn with_client(client: HttpClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip_all, fields(service = %service.name, operation = %op.operation))]
    async fn invoke(
        &self,
        ctx: &ClientContext,
        service: &ServiceDefinition,
        op: &OperationDefinition,
        request: &Request,
        cancel: &CancellationToken,
    ) -> Result<Value> {
        let endpoint = ctx.endpoint_for(service)?;
        let wire = render(service, op, request, &endpoint)?;

        let mut config = RequestConfig::new();
        for (key, value) in wire.headers {
            config = config.header(key, value);
        }
        for (key, value) in wire.query {
            config = config.query(key, value);
        }
        if let Some(body) = wire.body {
            config = config.json(body);
        }
        if let Some(content_type) = wire.content_type {
            config = config.content_type(content_type);
        }

        debug!(profile = ?ctx.profile, "{:?} {}", wire.method, wire.url);

        let call = self
            .client
            .request_json(wire.method.into(), wire.url.as_str(), config);

        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(Error::Cancelled),
            result = call => result,
        };

        result.map_err(|err| match err {
            Error::Http(e) if is_name_resolution(&e) => Error::NameResolution {
                host: wire.url.host_str().unwrap_or_default().to_string(),
                region: ctx.region_name().to_string(),
            },
            other => other,
        })
    }
}
