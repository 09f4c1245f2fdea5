//! Transport module
//!
//! The seam between the invocation engine and the network. The engine hands
//! over a built request; the transport renders it for the service's wire
//! protocol, sends it, and returns the decoded response or a fault.

mod http;
mod protocol;

pub use http::HttpTransport;
pub use protocol::{render, WireRequest};

use crate::config::ClientContext;
use crate::error::Result;
use crate::loader::{OperationDefinition, ServiceDefinition};
use crate::request::Request;
use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

/// Performs one service call
#[async_trait]
pub trait Transport: Send + Sync {
    /// Invoke an operation and return its decoded response
    ///
    /// Cancelling `cancel` aborts the call with [`crate::Error::Cancelled`].
    async fn invoke(
        &self,
        ctx: &ClientContext,
        service: &ServiceDefinition,
        op: &OperationDefinition,
        request: &Request,
        cancel: &CancellationToken,
    ) -> Result<Value>;
}
