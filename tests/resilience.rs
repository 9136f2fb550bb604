mod common;

use common::*;
use salesforce_tables::error::ConnectorError;
use salesforce_tables::session::{SessionManager, SessionStore};
use salesforce_tables::{ConnectionConfig, Executor};
use serde_json::json;
use std::ops::ControlFlow;
use std::sync::Arc;

fn executor(config: ConnectionConfig, transport: Arc<FakeTransport>, auth: Arc<FakeAuth>) -> Executor {
    let sessions = Arc::new(SessionManager::new(
        "test",
        Arc::new(config),
        auth,
        Arc::new(SessionStore::new()),
    ));
    Executor::new(sessions, transport)
}

async fn collect_ids(exec: &Executor, soql: &str) -> (Vec<String>, Result<(), ConnectorError>) {
    let mut ids = Vec::new();
    let result = exec
        .query_all(soql, |r| {
            ids.push(r["Id"].as_str().unwrap_or_default().to_string());
            ControlFlow::Continue(())
        })
        .await;
    (ids, result)
}

#[tokio::test]
async fn test_pagination_reconnects_once_without_duplicates() {
    let transport = Arc::new(FakeTransport::default());
    transport.script_query(Ok(page(&["a", "b"], Some("/next-1"))));
    transport.script_more(Err(expired()));
    transport.script_more(Ok(page(&["c"], None)));
    let auth = Arc::new(FakeAuth::default());
    let exec = executor(refresh_config(), transport.clone(), auth.clone());

    let (ids, result) = collect_ids(&exec, "SELECT Id FROM Account").await;
    result.unwrap();
    assert_eq!(ids, ["a", "b", "c"]);
    assert_eq!(auth.logins(), 2);
    assert_eq!(
        transport.calls_of("query_more"),
        [
            ("token-1".to_string(), "/next-1".to_string()),
            ("token-2".to_string(), "/next-1".to_string())
        ]
    );
}

#[tokio::test]
async fn test_pages_after_reconnect_use_new_session() {
    let transport = Arc::new(FakeTransport::default());
    transport.script_query(Err(expired()));
    transport.script_query(Ok(page(&["a"], Some("/next-1"))));
    transport.script_more(Ok(page(&["b"], Some("/next-2"))));
    transport.script_more(Ok(page(&["c"], None)));
    let auth = Arc::new(FakeAuth::default());
    let exec = executor(refresh_config(), transport.clone(), auth.clone());

    let (ids, result) = collect_ids(&exec, "SELECT Id FROM Account").await;
    result.unwrap();
    assert_eq!(ids, ["a", "b", "c"]);
    let tokens: Vec<String> = transport.calls_of("query_more").into_iter().map(|(t, _)| t).collect();
    assert_eq!(tokens, ["token-2", "token-2"]);
}

#[tokio::test]
async fn test_second_expiry_is_not_retried() {
    let transport = Arc::new(FakeTransport::default());
    transport.script_query(Ok(page(&["a"], Some("/next-1"))));
    transport.script_more(Err(expired()));
    transport.script_more(Err(expired()));
    transport.script_more(Ok(page(&["never"], None)));
    let auth = Arc::new(FakeAuth::default());
    let exec = executor(refresh_config(), transport.clone(), auth.clone());

    let (ids, result) = collect_ids(&exec, "SELECT Id FROM Account").await;
    assert!(matches!(result, Err(ConnectorError::SessionExpired(_))));
    assert_eq!(ids, ["a"]);
    assert_eq!(auth.logins(), 2);
    assert_eq!(transport.calls_of("query_more").len(), 2);
}

#[tokio::test]
async fn test_non_expiry_error_is_not_retried() {
    let transport = Arc::new(FakeTransport::default());
    transport.script_query(Err(salesforce_tables::RemoteError::new(
        Some(400),
        "MALFORMED_QUERY: unexpected token",
    )));
    let auth = Arc::new(FakeAuth::default());
    let exec = executor(refresh_config(), transport.clone(), auth.clone());

    let (_, result) = collect_ids(&exec, "SELECT Id FROM").await;
    match result {
        Err(ConnectorError::Remote(e)) => assert_eq!(e.status, Some(400)),
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(auth.logins(), 1);
    assert_eq!(transport.calls_of("query").len(), 1);
}

#[tokio::test]
async fn test_failed_reconnect_aborts_listing() {
    let transport = Arc::new(FakeTransport::default());
    transport.script_query(Ok(page(&["a", "b"], Some("/next-1"))));
    transport.script_more(Err(expired()));
    transport.script_more(Ok(page(&["never"], None)));
    let auth = Arc::new(FakeAuth::succeeding(1));
    let exec = executor(refresh_config(), transport.clone(), auth.clone());

    let (ids, result) = collect_ids(&exec, "SELECT Id FROM Account").await;
    match result {
        Err(ConnectorError::Auth(msg)) => assert!(msg.contains("invalid_grant"), "{}", msg),
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(ids, ["a", "b"]);
    assert_eq!(auth.logins(), 2);
    assert_eq!(transport.calls_of("query_more").len(), 1);
}

#[tokio::test]
async fn test_failed_reconnect_aborts_get() {
    let transport = Arc::new(FakeTransport::default());
    transport.script_get(None);
    transport.script_query(Err(expired()));
    transport.script_get(Some(record(json!({"Id": "001A"}))));
    let auth = Arc::new(FakeAuth::succeeding(1));
    let exec = executor(refresh_config(), transport.clone(), auth.clone());

    let err = exec.get("Account", "001A").await.unwrap_err();
    assert!(matches!(err, ConnectorError::Auth(_)));
    assert_eq!(auth.logins(), 2);
    assert_eq!(transport.calls_of("get").len(), 1);
    assert_eq!(transport.calls_of("query").len(), 1);
}

#[tokio::test]
async fn test_access_token_expiry_cannot_refresh() {
    let transport = Arc::new(FakeTransport::default());
    transport.script_query(Err(expired()));
    let auth = Arc::new(FakeAuth::default());
    let exec = executor(access_token_config(), transport.clone(), auth.clone());

    let (_, result) = collect_ids(&exec, "SELECT Id FROM Account").await;
    assert!(matches!(result, Err(ConnectorError::CannotRefresh)));
    assert_eq!(auth.logins(), 0);
    assert_eq!(transport.calls_of("query").len(), 1);
}

#[tokio::test]
async fn test_caller_can_stop_between_pages() {
    let transport = Arc::new(FakeTransport::default());
    transport.script_query(Ok(page(&["a", "b"], Some("/next-1"))));
    let exec = executor(refresh_config(), transport.clone(), Arc::new(FakeAuth::default()));

    let mut seen = 0;
    exec.query_all("SELECT Id FROM Account", |_| {
        seen += 1;
        ControlFlow::Break(())
    })
    .await
    .unwrap();
    assert_eq!(seen, 1);
    assert!(transport.calls_of("query_more").is_empty());
}

#[tokio::test]
async fn test_get_found_directly() {
    let transport = Arc::new(FakeTransport::default());
    transport.script_get(Some(record(json!({"Id": "001A"}))));
    let exec = executor(refresh_config(), transport.clone(), Arc::new(FakeAuth::default()));

    let found = exec.get("Account", "001A").await.unwrap();
    assert_eq!(found.unwrap()["Id"], "001A");
    assert!(transport.calls_of("query").is_empty());
}

#[tokio::test]
async fn test_get_probe_expiry_reconnects_and_retries_once() {
    let transport = Arc::new(FakeTransport::default());
    transport.script_get(None);
    transport.script_query(Err(expired()));
    transport.script_get(Some(record(json!({"Id": "001A"}))));
    let auth = Arc::new(FakeAuth::default());
    let exec = executor(refresh_config(), transport.clone(), auth.clone());

    let found = exec.get("Account", "001A").await.unwrap();
    assert!(found.is_some());
    assert_eq!(auth.logins(), 2);
    assert_eq!(
        transport.calls_of("query"),
        [(
            "token-1".to_string(),
            "SELECT Id FROM Account WHERE Id = '001A' LIMIT 1".to_string()
        )]
    );
    let get_tokens: Vec<String> = transport.calls_of("get").into_iter().map(|(t, _)| t).collect();
    assert_eq!(get_tokens, ["token-1", "token-2"]);
}

#[tokio::test]
async fn test_get_retry_absence_is_final() {
    let transport = Arc::new(FakeTransport::default());
    transport.script_get(None);
    transport.script_query(Err(expired()));
    transport.script_get(None);
    transport.script_query(Err(expired()));
    let auth = Arc::new(FakeAuth::default());
    let exec = executor(refresh_config(), transport.clone(), auth.clone());

    assert!(exec.get("Account", "001A").await.unwrap().is_none());
    assert_eq!(auth.logins(), 2);
    assert_eq!(transport.calls_of("get").len(), 2);
    assert_eq!(transport.calls_of("query").len(), 1);
}

#[tokio::test]
async fn test_get_probe_success_means_not_found() {
    let transport = Arc::new(FakeTransport::default());
    transport.script_get(None);
    transport.script_query(Ok(page(&[], None)));
    let auth = Arc::new(FakeAuth::default());
    let exec = executor(refresh_config(), transport.clone(), auth.clone());

    assert!(exec.get("Account", "001MISSING").await.unwrap().is_none());
    assert_eq!(auth.logins(), 1);
    assert_eq!(transport.calls_of("get").len(), 1);
}

#[tokio::test]
async fn test_get_probe_other_failure_means_not_found() {
    let transport = Arc::new(FakeTransport::default());
    transport.script_get(None);
    transport.script_query(Err(salesforce_tables::RemoteError::new(
        Some(400),
        "INVALID_TYPE: sObject type 'Acount' is not supported",
    )));
    let auth = Arc::new(FakeAuth::default());
    let exec = executor(refresh_config(), transport.clone(), auth.clone());

    assert!(exec.get("Acount", "001A").await.unwrap().is_none());
    assert_eq!(auth.logins(), 1);
}

#[tokio::test]
async fn test_custom_expiry_predicate() {
    let transport = Arc::new(FakeTransport::default());
    transport.script_query(Err(salesforce_tables::RemoteError::new(Some(403), "TOKEN_GONE")));
    transport.script_query(Ok(page(&["a"], None)));
    let auth = Arc::new(FakeAuth::default());
    let exec = executor(refresh_config(), transport.clone(), auth.clone())
        .with_expiry_predicate(Arc::new(|msg: &str| msg.contains("TOKEN_GONE")));

    let (ids, result) = collect_ids(&exec, "SELECT Id FROM Account").await;
    result.unwrap();
    assert_eq!(ids, ["a"]);
    assert_eq!(auth.logins(), 2);
}
