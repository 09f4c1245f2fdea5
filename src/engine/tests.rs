//! Tests for engine module

use super::*;
use crate::confirm::AutoConfirm;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Transport that replays scripted responses and records every request
#[derive(Default)]
struct FakeTransport {
    responses: Mutex<VecDeque<Result<Value>>>,
    calls: Mutex<Vec<(String, Value)>>,
}

impl FakeTransport {
    fn with(responses: Vec<Result<Value>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }

    fn requests(&self) -> Vec<Value> {
        self.calls().into_iter().map(|(_, request)| request).collect()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn invoke(
        &self,
        _ctx: &ClientContext,
        _service: &ServiceDefinition,
        op: &OperationDefinition,
        request: &Request,
        _cancel: &CancellationToken,
    ) -> Result<Value> {
        self.calls.lock().unwrap().push((
            op.operation.clone(),
            Value::Object(request.fields().clone()),
        ));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(json!({})))
    }
}

fn engine(transport: Arc<FakeTransport>, answer: bool) -> Engine {
    Engine::new(
        Catalog::builtin().unwrap(),
        transport,
        ClientContext::new("us-east-1"),
    )
    .with_confirmer(Arc::new(AutoConfirm(answer)))
}

fn rules(names: &[&str], token: Option<&str>) -> Result<Value> {
    let rules: Vec<Value> = names.iter().map(|n| json!({"Name": n})).collect();
    let mut body = json!({ "Rules": rules });
    if let Some(token) = token {
        body["NextToken"] = json!(token);
    }
    Ok(body)
}

// ============================================================================
// Pagination
// ============================================================================

#[tokio::test]
async fn test_auto_pagination_collects_every_page() {
    let transport = FakeTransport::with(vec![
        rules(&["a", "b", "c"], Some("abc")),
        rules(&["d", "e"], None),
    ]);
    let engine = engine(transport.clone(), true);

    let mut outputs = Vec::new();
    let stats = engine
        .invoke_streaming(
            &Invocation::new("Get-EVBRuleList"),
            &CancellationToken::new(),
            |value| {
                outputs.push(value);
                Ok(())
            },
        )
        .await
        .unwrap();

    let names: Vec<&str> = outputs.iter().filter_map(|o| o["Name"].as_str()).collect();
    assert_eq!(names, vec!["a", "b", "c", "d", "e"]);
    assert_eq!(stats.calls, 2);
    assert_eq!(stats.pages, 2);
    assert_eq!(stats.outputs, 5);
    assert!(stats.next_token.is_none());
    assert_eq!(transport.requests(), vec![json!({}), json!({"NextToken": "abc"})]);
}

#[tokio::test]
async fn test_request_omits_unset_members() {
    let transport = FakeTransport::with(vec![rules(&[], None)]);
    let engine = engine(transport.clone(), true);

    engine
        .invoke(
            &Invocation::new("get-evbrulelist").param("nameprefix", "orders-"),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(
        transport.calls(),
        vec![("ListRules".to_string(), json!({"NamePrefix": "orders-"}))]
    );
}

#[tokio::test]
async fn test_no_auto_iteration_fetches_one_page() {
    let transport = FakeTransport::with(vec![rules(&["a"], Some("T1")), rules(&["b"], None)]);
    let engine = engine(transport.clone(), true);

    let mut outputs = Vec::new();
    let stats = engine
        .invoke_streaming(
            &Invocation::new("Get-EVBRuleList").no_auto_iteration(),
            &CancellationToken::new(),
            |value| {
                outputs.push(value);
                Ok(())
            },
        )
        .await
        .unwrap();

    assert_eq!(outputs, vec![json!({"Name": "a"})]);
    assert_eq!(stats.calls, 1);
    assert_eq!(stats.next_token.as_deref(), Some("T1"));
}

#[tokio::test]
async fn test_bound_token_parameter_means_manual_mode() {
    let transport = FakeTransport::with(vec![rules(&["x"], Some("T2")), rules(&["y"], None)]);
    let engine = engine(transport.clone(), true);

    let outputs = engine
        .invoke(
            &Invocation::new("Get-EVBRuleList").param("NextToken", "T1"),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(outputs, vec![json!({"Name": "x"})]);
    assert_eq!(transport.requests(), vec![json!({"NextToken": "T1"})]);
}

#[tokio::test]
async fn test_starting_token_resumes_in_auto_mode() {
    let transport = FakeTransport::with(vec![rules(&["x"], Some("T2")), rules(&["y"], None)]);
    let engine = engine(transport.clone(), true);

    let outputs = engine
        .invoke(
            &Invocation::new("Get-EVBRuleList").starting_token("T1"),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(outputs.len(), 2);
    assert_eq!(
        transport.requests(),
        vec![json!({"NextToken": "T1"}), json!({"NextToken": "T2"})]
    );
}

#[tokio::test]
async fn test_starting_token_conflicts_with_bound_token() {
    let transport = FakeTransport::with(vec![]);
    let engine = engine(transport.clone(), true);

    let err = engine
        .invoke(
            &Invocation::new("Get-EVBRuleList")
                .param("NextToken", "T1")
                .starting_token("T9"),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

    assert!(err.is_configuration());
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn test_starting_token_conflict_is_reported_before_confirmation() {
    let transport = FakeTransport::with(vec![]);
    let engine = engine(transport.clone(), false);

    let err = engine
        .invoke_streaming(
            &Invocation::new("Get-EVBRuleList")
                .param("NextToken", "T1")
                .starting_token("T9")
                .what_if(),
            &CancellationToken::new(),
            |_| Ok(()),
        )
        .await
        .unwrap_err();

    assert!(err.is_configuration());
    assert!(err.to_string().contains("both NextToken and a starting token"));
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn test_starting_token_on_unpaginated_command() {
    let transport = FakeTransport::with(vec![]);
    let engine = engine(transport.clone(), true);

    let err = engine
        .invoke(
            &Invocation::new("Get-EVBRule")
                .param("Name", "r")
                .starting_token("T1"),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

    assert!(err.to_string().contains("does not paginate"));
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn test_later_page_failure_keeps_delivered_outputs() {
    let transport = FakeTransport::with(vec![
        rules(&["a", "b"], Some("T1")),
        Err(Error::service(500, "InternalException", "boom")),
        rules(&["never"], None),
    ]);
    let engine = engine(transport.clone(), true);

    let mut outputs = Vec::new();
    let err = engine
        .invoke_streaming(
            &Invocation::new("Get-EVBRuleList"),
            &CancellationToken::new(),
            |value| {
                outputs.push(value);
                Ok(())
            },
        )
        .await
        .unwrap_err();

    assert_eq!(outputs.len(), 2);
    assert!(matches!(err, Error::PageFailed { page: 2, .. }));
    assert!(err.to_string().contains("InternalException"));
    assert_eq!(transport.calls().len(), 2);
}

#[tokio::test]
async fn test_echo_selector_emits_once_for_paginated_command() {
    let transport = FakeTransport::with(vec![rules(&["a"], Some("T1")), rules(&["b"], None)]);
    let engine = engine(transport.clone(), true);

    let outputs = engine
        .invoke(
            &Invocation::new("Get-EVBRuleList")
                .param("NamePrefix", "ord")
                .select("^NamePrefix"),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(outputs, vec![json!("ord")]);
    assert_eq!(transport.calls().len(), 2);
}

// ============================================================================
// Configuration errors happen before any call
// ============================================================================

#[tokio::test]
async fn test_unknown_command() {
    let transport = FakeTransport::with(vec![]);
    let engine = engine(transport.clone(), true);

    let err = engine
        .invoke(&Invocation::new("Get-Nothing"), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::UnknownCommand { .. }));
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn test_missing_required_parameter() {
    let transport = FakeTransport::with(vec![]);
    let engine = engine(transport.clone(), true);

    let err = engine
        .invoke(&Invocation::new("Get-EVBRule"), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::MissingParameter { ref parameter, .. } if parameter == "Name"));
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn test_pass_thru_with_select_is_rejected() {
    let transport = FakeTransport::with(vec![]);
    let engine = engine(transport.clone(), true);

    let err = engine
        .invoke(
            &Invocation::new("Remove-EVBRule")
                .param("Name", "nightly")
                .select("^Name")
                .pass_thru()
                .force(),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InvalidSelector { .. }));
    assert!(transport.calls().is_empty());
}

// ============================================================================
// Projection and confirmation
// ============================================================================

#[tokio::test]
async fn test_whole_response_by_default() {
    let transport = FakeTransport::with(vec![Ok(json!({"Name": "r", "State": "ENABLED"}))]);
    let engine = engine(transport.clone(), true);

    let outputs = engine
        .invoke(
            &Invocation::new("Get-EVBRule").param("Name", "r"),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(outputs, vec![json!({"Name": "r", "State": "ENABLED"})]);
}

#[tokio::test]
async fn test_named_field_selector() {
    let transport = FakeTransport::with(vec![Ok(json!({"Name": "r", "State": "ENABLED"}))]);
    let engine = engine(transport.clone(), true);

    let outputs = engine
        .invoke(
            &Invocation::new("Get-EVBRule").param("Name", "r").select("state"),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(outputs, vec![json!("ENABLED")]);
}

#[tokio::test]
async fn test_pass_thru_echoes_parameter() {
    let transport = FakeTransport::with(vec![Ok(json!({}))]);
    let engine = engine(transport.clone(), false);

    let outputs = engine
        .invoke(
            &Invocation::new("Remove-EVBRule")
                .param("Name", "nightly")
                .pass_thru()
                .force(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(outputs, vec![json!("nightly")]);
    assert_eq!(
        transport.calls(),
        vec![("DeleteRule".to_string(), json!({"Name": "nightly"}))]
    );
}

#[tokio::test]
async fn test_declined_confirmation_makes_no_call() {
    let transport = FakeTransport::with(vec![]);
    let engine = engine(transport.clone(), false);

    let mut outputs = Vec::new();
    let stats = engine
        .invoke_streaming(
            &Invocation::new("Remove-EVBRule").param("Name", "nightly"),
            &CancellationToken::new(),
            |value| {
                outputs.push(value);
                Ok(())
            },
        )
        .await
        .unwrap();

    assert!(stats.skipped);
    assert_eq!(stats.calls, 0);
    assert!(outputs.is_empty());
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn test_what_if_makes_no_call() {
    let transport = FakeTransport::with(vec![]);
    let engine = engine(transport.clone(), true);

    let stats = engine
        .invoke_streaming(
            &Invocation::new("Remove-EVBRule")
                .param("Name", "nightly")
                .force()
                .what_if(),
            &CancellationToken::new(),
            |_| Ok(()),
        )
        .await
        .unwrap();

    assert!(stats.skipped);
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn test_void_response_emits_nothing() {
    let transport = FakeTransport::with(vec![Ok(json!({}))]);
    let engine = engine(transport.clone(), true);

    let outputs = engine
        .invoke(
            &Invocation::new("Enable-EVBRule").param("Name", "nightly").force(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert!(outputs.is_empty());
    assert_eq!(transport.calls().len(), 1);
}

// ============================================================================
// Cancellation and sink failures
// ============================================================================

#[tokio::test]
async fn test_cancelled_before_start() {
    let transport = FakeTransport::with(vec![rules(&["a"], None)]);
    let engine = engine(transport.clone(), true);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = engine
        .invoke(&Invocation::new("Get-EVBRuleList"), &cancel)
        .await
        .unwrap_err();
    assert!(err.is_cancelled());

    let err = engine
        .invoke(&Invocation::new("Get-EVBRule").param("Name", "r"), &cancel)
        .await
        .unwrap_err();
    assert!(err.is_cancelled());
    assert!(transport.calls().is_empty());
}

#[test]
fn test_cancelled_page_is_not_counted_as_call() {
    assert!(!made_call(&Err(Error::Cancelled)));
    assert!(!made_call(&Err(Error::page_failed(2, Error::Cancelled))));
    assert!(made_call(&Err(Error::http_status(500, ""))));
    assert!(made_call(&Ok(Page {
        number: 1,
        items: vec![],
        next_token: None,
        response: json!({}),
    })));
}

#[tokio::test]
async fn test_sink_error_stops_iteration() {
    let transport = FakeTransport::with(vec![
        rules(&["a", "b"], Some("T1")),
        rules(&["c"], None),
    ]);
    let engine = engine(transport.clone(), true);

    let mut seen = 0;
    let err = engine
        .invoke_streaming(
            &Invocation::new("Get-EVBRuleList"),
            &CancellationToken::new(),
            |_| {
                seen += 1;
                Err(Error::Other("output closed".to_string()))
            },
        )
        .await
        .unwrap_err();

    assert_eq!(seen, 1);
    assert!(err.to_string().contains("output closed"));
    assert_eq!(transport.calls().len(), 1);
}

#[test]
fn test_invocation_builder() {
    let inv = Invocation::new("Get-EVBRuleList")
        .param("Limit", 10)
        .select("*")
        .no_auto_iteration()
        .starting_token("T");

    assert_eq!(inv.command, "Get-EVBRuleList");
    assert_eq!(inv.parameters.get("limit"), Some(&json!(10)));
    assert_eq!(inv.select.as_deref(), Some("*"));
    assert!(inv.no_auto_iteration);
    assert_eq!(inv.starting_token.as_deref(), Some("T"));
    assert!(!inv.force && !inv.what_if && !inv.pass_thru);
}

#[test]
fn test_stats_counters() {
    let mut stats = InvocationStats::new();
    stats.add_call();
    stats.add_page();
    stats.add_outputs(3);
    stats.set_duration(12);
    assert_eq!(
        stats,
        InvocationStats {
            calls: 1,
            pages: 1,
            outputs: 3,
            skipped: false,
            next_token: None,
            duration_ms: 12,
        }
    );
}
