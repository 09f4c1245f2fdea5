//! Integration tests using mock HTTP server
//!
//! Tests the full end-to-end flow: service model → engine → wire request →
//! mock service → projected outputs

use awscmd::confirm::AutoConfirm;
use awscmd::engine::{Engine, Invocation};
use awscmd::loader::{load_service_from_str, Catalog};
use awscmd::{ClientContext, Error, HttpTransport};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio_test::{assert_err, assert_ok};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{
    body_json, header, method, path, query_param, query_param_is_missing,
};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn context(server: &MockServer) -> ClientContext {
    let mut ctx = ClientContext::new("us-east-1").with_endpoint_url(server.uri());
    ctx.http.max_retries = 0;
    ctx.http.rate_limit.requests_per_second = 0;
    ctx
}

fn engine_with(catalog: Catalog, ctx: ClientContext, answer: bool) -> Engine {
    let transport = Arc::new(HttpTransport::new(&ctx).unwrap());
    Engine::new(catalog, transport, ctx).with_confirmer(Arc::new(AutoConfirm(answer)))
}

fn engine(server: &MockServer) -> Engine {
    engine_with(Catalog::builtin().unwrap(), context(server), true)
}

fn rule_names(outputs: &[Value]) -> Vec<&str> {
    outputs.iter().filter_map(|o| o["Name"].as_str()).collect()
}

// ============================================================================
// AWS JSON 1.1 (EventBridge)
// ============================================================================

#[tokio::test]
async fn test_eventbridge_list_rules_follows_tokens() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .and(header("x-amz-target", "AWSEvents.ListRules"))
        .and(header("content-type", "application/x-amz-json-1.1"))
        .and(body_json(json!({"NamePrefix": "ord"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Rules": [{"Name": "ord-a"}, {"Name": "ord-b"}, {"Name": "ord-c"}],
            "NextToken": "abc"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_json(json!({"NamePrefix": "ord", "NextToken": "abc"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Rules": [{"Name": "ord-d"}, {"Name": "ord-e"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let outputs = engine(&server)
        .invoke(
            &Invocation::new("Get-EVBRuleList").param("NamePrefix", "ord"),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(
        rule_names(&outputs),
        vec!["ord-a", "ord-b", "ord-c", "ord-d", "ord-e"]
    );
}

#[tokio::test]
async fn test_eventbridge_manual_page_reports_next_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_json(json!({"Limit": 1})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Rules": [{"Name": "first"}],
            "NextToken": "more"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut outputs = Vec::new();
    let stats = engine(&server)
        .invoke_streaming(
            &Invocation::new("Get-EVBRuleList")
                .param("Limit", "1")
                .no_auto_iteration(),
            &CancellationToken::new(),
            |value| {
                outputs.push(value);
                Ok(())
            },
        )
        .await
        .unwrap();

    assert_eq!(rule_names(&outputs), vec!["first"]);
    assert_eq!(stats.calls, 1);
    assert_eq!(stats.next_token.as_deref(), Some("more"));
}

#[tokio::test]
async fn test_eventbridge_second_page_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_json(json!({})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Rules": [{"Name": "kept"}],
            "NextToken": "t2"
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(body_json(json!({"NextToken": "t2"})))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "__type": "ValidationException",
            "message": "Invalid NextToken"
        })))
        .mount(&server)
        .await;

    let mut outputs = Vec::new();
    let err = engine(&server)
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

    assert_eq!(rule_names(&outputs), vec!["kept"]);
    match err {
        Error::PageFailed { page, source } => {
            assert_eq!(page, 2);
            assert!(matches!(*source, Error::Service { ref code, .. } if code == "ValidationException"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_eventbridge_service_error_is_typed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(header("x-amz-target", "AWSEvents.DeleteRule"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "__type": "ResourceNotFoundException",
            "message": "Rule nightly does not exist."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = engine(&server)
        .invoke(
            &Invocation::new("Remove-EVBRule")
                .param("Name", "nightly")
                .force(),
            &CancellationToken::new(),
        )
        .await;

    let err = assert_err!(result);
    assert_eq!(
        err.to_string(),
        "ResourceNotFoundException (HTTP 400): Rule nightly does not exist."
    );
}

#[tokio::test]
async fn test_eventbridge_pass_thru_after_forced_delete() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(header("x-amz-target", "AWSEvents.DeleteRule"))
        .and(body_json(json!({"Name": "nightly"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let outputs = assert_ok!(
        engine(&server)
            .invoke(
                &Invocation::new("Remove-EVBRule")
                    .param("Name", "nightly")
                    .pass_thru()
                    .force(),
                &CancellationToken::new(),
            )
            .await
    );

    assert_eq!(outputs, vec![json!("nightly")]);
}

#[tokio::test]
async fn test_declined_and_what_if_send_nothing() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let declining = engine_with(Catalog::builtin().unwrap(), context(&server), false);
    let stats = declining
        .invoke_streaming(
            &Invocation::new("Remove-EVBRule").param("Name", "nightly"),
            &CancellationToken::new(),
            |_| Ok(()),
        )
        .await
        .unwrap();
    assert!(stats.skipped);

    let stats = engine(&server)
        .invoke_streaming(
            &Invocation::new("Remove-EVBRule")
                .param("Name", "nightly")
                .what_if(),
            &CancellationToken::new(),
            |_| Ok(()),
        )
        .await
        .unwrap();
    assert!(stats.skipped);
}

// ============================================================================
// REST-JSON (DocumentDB Elastic)
// ============================================================================

#[tokio::test]
async fn test_docdb_list_clusters_paginates_through_query() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/clusters"))
        .and(query_param("maxResults", "2"))
        .and(query_param("nextToken", "p2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "clusters": [{"clusterName": "c3"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/clusters"))
        .and(query_param("maxResults", "2"))
        .and(query_param_is_missing("nextToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "clusters": [{"clusterName": "c1"}, {"clusterName": "c2"}],
            "nextToken": "p2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let outputs = engine(&server)
        .invoke(
            &Invocation::new("Get-DOCEClusterList").param("MaxResult", 2),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    let names: Vec<&str> = outputs
        .iter()
        .filter_map(|o| o["clusterName"].as_str())
        .collect();
    assert_eq!(names, vec!["c1", "c2", "c3"]);
}

#[tokio::test]
async fn test_docdb_get_cluster_renders_label() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cluster/cluster-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "cluster": {"clusterName": "one", "status": "ACTIVE"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let outputs = engine(&server)
        .invoke(
            &Invocation::new("Get-DOCECluster").param("ClusterArn", "cluster-1"),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(outputs, vec![json!({"clusterName": "one", "status": "ACTIVE"})]);
}

#[tokio::test]
async fn test_docdb_tag_resource_body_and_pass_thru() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/tags/cluster-1"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"tags": {"env": "prod"}})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let outputs = engine(&server)
        .invoke(
            &Invocation::new("Add-DOCEResourceTag")
                .param("ResourceArn", "cluster-1")
                .param("Tag", "env=prod")
                .pass_thru(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(outputs, vec![json!("cluster-1")]);
}

#[tokio::test]
async fn test_docdb_not_found_header_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cluster/missing"))
        .respond_with(
            ResponseTemplate::new(404)
                .insert_header("x-amzn-ErrorType", "ResourceNotFoundException")
                .set_body_json(json!({"message": "Cluster missing not found"})),
        )
        .mount(&server)
        .await;

    let err = engine(&server)
        .invoke(
            &Invocation::new("Get-DOCECluster").param("ClusterArn", "missing"),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Service { status: 404, .. }));
    assert!(!err.is_configuration());
}

// ============================================================================
// Custom models and transport behavior
// ============================================================================

#[tokio::test]
async fn test_custom_service_model() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(header("x-amz-target", "Widgets_20240101.ListWidgets"))
        .and(header("content-type", "application/x-amz-json-1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "widgets": ["w1", "w2"]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let service = load_service_from_str(
        r"
name: widgets
protocol: json
endpoint_prefix: widgets
target_prefix: Widgets_20240101
json_version: '1.0'
operations:
  - command: Get-WidgetList
    operation: ListWidgets
    parameters:
      - { name: Token, member: nextToken }
    response_fields: [widgets, nextToken]
    default_select: widgets
    pagination: { input_token: Token, output_token: nextToken, items: widgets }
",
    )
    .unwrap();

    let mut catalog = Catalog::builtin().unwrap();
    catalog.add(service).unwrap();

    let outputs = engine_with(catalog, context(&server), true)
        .invoke(&Invocation::new("get-widgetlist"), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outputs, vec![json!("w1"), json!("w2")]);
}

#[tokio::test]
async fn test_transport_retries_server_errors() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Name": "r1",
            "State": "DISABLED"
        })))
        .mount(&server)
        .await;

    let mut ctx = context(&server);
    ctx.http.max_retries = 2;
    ctx.http.retry_backoff.initial_ms = 5;

    let outputs = engine_with(Catalog::builtin().unwrap(), ctx, true)
        .invoke(
            &Invocation::new("Get-EVBRule")
                .param("Name", "r1")
                .select("State"),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(outputs, vec![json!("DISABLED")]);
}

#[tokio::test]
async fn test_configuration_errors_make_no_calls() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let engine = engine(&server);
    let cancel = CancellationToken::new();

    for invocation in [
        Invocation::new("Get-EVBRule"),
        Invocation::new("Get-EVBRule").param("Name", "r").param("Bogus", 1),
        Invocation::new("Get-EVBRule").param("Name", "r").select("Nope"),
        Invocation::new("Get-EVBRuleList").param("Limit", "many"),
        Invocation::new("Disable-EVBRule")
            .param("Name", "r")
            .select("*")
            .pass_thru(),
    ] {
        let err = engine.invoke(&invocation, &cancel).await.unwrap_err();
        assert!(err.is_configuration(), "{err}");
    }
}
