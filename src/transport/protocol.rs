//! Wire rendering for the AWS JSON and REST-JSON protocols
//!
//! - JSON 1.x: `POST /` with an `X-Amz-Target` header, the request as body
//! - REST-JSON: method and URI per operation; label members fill the path,
//!   query members become query parameters, the rest form the body

use crate::error::{Error, Result};
use crate::loader::{OperationDefinition, ServiceDefinition};
use crate::request::Request;
use crate::template::{render_uri, value_to_string};
use crate::types::{JsonObject, Location, Method, Protocol};
use serde_json::Value;
use url::Url;

/// A request rendered for the wire
#[derive(Debug, Clone, PartialEq)]
pub struct WireRequest {
    pub method: Method,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub content_type: Option<String>,
}

/// Render a request for the service's protocol against a base endpoint
pub fn render(
    service: &ServiceDefinition,
    op: &OperationDefinition,
    request: &Request,
    endpoint: &Url,
) -> Result<WireRequest> {
    match service.protocol {
        Protocol::Json => render_json(service, op, request, endpoint),
        Protocol::RestJson => render_rest_json(service, op, request, endpoint),
    }
}

fn render_json(
    service: &ServiceDefinition,
    op: &OperationDefinition,
    request: &Request,
    endpoint: &Url,
) -> Result<WireRequest> {
    let prefix = service.target_prefix.as_deref().ok_or_else(|| {
        Error::invalid_model(&service.name, "json protocol requires target_prefix")
    })?;

    Ok(WireRequest {
        method: Method::POST,
        url: join(endpoint, "/")?,
        headers: vec![(
            "X-Amz-Target".to_string(),
            format!("{prefix}.{}", op.operation),
        )],
        query: Vec::new(),
        body: Some(Value::Object(request.fields().clone())),
        content_type: Some(format!("application/x-amz-json-{}", service.json_version)),
    })
}

fn render_rest_json(
    service: &ServiceDefinition,
    op: &OperationDefinition,
    request: &Request,
    endpoint: &Url,
) -> Result<WireRequest> {
    let binding = op.http.as_ref().ok_or_else(|| {
        Error::invalid_model(
            &service.name,
            format!("{} has no http binding", op.label()),
        )
    })?;

    let mut body = request.clone();
    let mut labels = JsonObject::new();
    let mut query = Vec::new();

    for param in &op.parameters {
        let member = param.member();
        match param.location {
            Location::Body => {}
            Location::Label => {
                if let Some(value) = body.remove(member) {
                    labels.insert(member.to_string(), value);
                }
            }
            Location::Query => {
                if let Some(value) = body.remove(member) {
                    push_query(&mut query, member, &value);
                }
            }
        }
    }

    let path = render_uri(&binding.uri, &labels)?;

    let (body, content_type) = if body.is_empty() {
        (None, None)
    } else {
        (
            Some(Value::Object(body.into_fields())),
            Some("application/json".to_string()),
        )
    };

    Ok(WireRequest {
        method: binding.method,
        url: join(endpoint, &path)?,
        headers: Vec::new(),
        query,
        body,
        content_type,
    })
}

/// Lists repeat the key; maps contribute one pair per entry
fn push_query(query: &mut Vec<(String, String)>, key: &str, value: &Value) {
    match value {
        Value::Null => {}
        Value::Array(items) => {
            for item in items {
                query.push((key.to_string(), value_to_string(item)));
            }
        }
        Value::Object(entries) => {
            for (k, v) in entries {
                query.push((k.clone(), value_to_string(v)));
            }
        }
        other => query.push((key.to_string(), value_to_string(other))),
    }
}

/// Append a rendered path to the endpoint, keeping any endpoint base path
fn join(endpoint: &Url, path: &str) -> Result<Url> {
    let base = endpoint.as_str().trim_end_matches('/');
    let path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    };
    Ok(Url::parse(&format!("{base}{path}"))?)
}
