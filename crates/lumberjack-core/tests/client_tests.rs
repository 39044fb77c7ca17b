//! HTTP-level tests of the Treeherder client against a mock server.

use lumberjack_core::api::client::{ClientConfig, TreeherderClient};
use lumberjack_core::api::endpoints::{JobFilter, PushFilter};
use lumberjack_core::core::log_search::SearchOptions;
use lumberjack_core::error::{ApiError, AppError, ErrorKind};
use reqwest::Method;
use serde_json::{Value, json};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn job_json(id: u64, guid: &str) -> Value {
    json!({
        "id": id,
        "job_guid": guid,
        "push_id": 100,
        "job_type_name": "test-linux1804-64/opt-mochitest-browser-chrome-1",
        "job_type_symbol": "bc1",
        "job_group_symbol": "M",
        "platform": "linux1804-64",
        "state": "completed",
        "result": "testfailed",
        "tier": 1,
        "start_timestamp": 1700000000,
        "end_timestamp": 1700000600,
        "task_id": "Xy7abc"
    })
}

fn push_json(id: u64) -> Value {
    json!({
        "id": id,
        "revision": format!("{:040x}", id),
        "author": "dev@mozilla.com",
        "revisions": [],
        "revision_count": 1,
        "push_timestamp": 1700000000,
        "repository_id": 77
    })
}

fn client_for(server: &MockServer) -> TreeherderClient {
    TreeherderClient::new(server.uri()).unwrap()
}

#[tokio::test]
async fn test_repositories_from_bare_array() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/repository/"))
        .and(header("Accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": 1,
                "repository_group": {"name": "development", "description": ""},
                "name": "mozilla-central",
                "dvcs_type": "hg",
                "url": "https://hg.mozilla.org/mozilla-central",
                "codebase": "gecko",
                "active_status": "active"
            },
            {
                "id": 77,
                "repository_group": {"name": "integration", "description": ""},
                "name": "autoland",
                "dvcs_type": "hg",
                "url": "https://hg.mozilla.org/integration/autoland",
                "codebase": "gecko",
                "active_status": "onhold"
            }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert!(!client.has_async_connection());

    let repos = client.get_repositories().await.unwrap();
    assert_eq!(repos.len(), 2);
    assert_eq!(repos[0].name, "mozilla-central");
    assert!(repos[0].is_active());
    assert!(!repos[1].is_active());
    assert!(client.has_async_connection());
    assert!(!client.has_blocking_connection());
}

#[tokio::test]
async fn test_pushes_are_paged_with_count_and_offset() {
    let server = MockServer::start().await;
    let pages = [(0, 2, vec![1, 2]), (2, 2, vec![3, 4]), (4, 1, vec![5])];
    for (offset, count, ids) in pages {
        let results: Vec<Value> = ids.into_iter().map(push_json).collect();
        Mock::given(method("GET"))
            .and(path("/api/project/autoland/push/"))
            .and(query_param("offset", offset.to_string()))
            .and(query_param("count", count.to_string()))
            .and(query_param("author", "dev@mozilla.com"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"meta": {}, "results": results})),
            )
            .expect(1)
            .mount(&server)
            .await;
    }

    let client = TreeherderClient::with_config(ClientConfig::new(server.uri()).with_page_size(2)).unwrap();
    let filter = PushFilter {
        count: 5,
        author: Some("dev@mozilla.com".to_string()),
        ..PushFilter::default()
    };
    let pushes = client.get_pushes("autoland", &filter).await.unwrap();

    let ids: Vec<u64> = pushes.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn test_short_page_ends_pagination() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/project/try/jobs/"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [job_json(1, "g1"), job_json(2, "g2")],
            "count": 2,
            "next": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = TreeherderClient::with_config(ClientConfig::new(server.uri()).with_page_size(10)).unwrap();
    let jobs = client
        .get_jobs("try", &JobFilter { count: 50, ..JobFilter::default() })
        .await
        .unwrap();
    assert_eq!(jobs.len(), 2);
    assert_eq!(jobs[1].symbol(), "M(bc1)");
}

#[tokio::test]
async fn test_zero_count_makes_one_unbounded_call() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/project/try/push/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [push_json(1), push_json(2), push_json(3)]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let filter = PushFilter {
        count: 0,
        ..PushFilter::default()
    };
    let pushes = client.get_pushes("try", &filter).await.unwrap();
    assert_eq!(pushes.len(), 3);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(
        !requests[0]
            .url
            .query_pairs()
            .any(|(key, _)| key == "count" || key == "offset")
    );
}

#[tokio::test]
async fn test_not_found_keeps_status_and_detail() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/project/autoland/jobs/999/"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Not found."})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.get_job("autoland", 999).await.unwrap_err();

    assert!(err.is_not_found());
    match err {
        AppError::Api(ApiError::NotFound {
            status, message, ..
        }) => {
            assert_eq!(status, Some(404));
            assert_eq!(message, "Not found.");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_server_error_maps_to_api_error_with_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/performance/framework/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.get_performance_frameworks().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Api);
    match err {
        AppError::Api(api_error) => assert_eq!(api_error.status(), Some(500)),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_invalid_json_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/failureclassification/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .get_failure_classifications()
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Api(ApiError::Decode { .. })));
}

#[tokio::test]
async fn test_api_key_is_sent_as_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/performance/framework/"))
        .and(header("Authorization", "Bearer secret-key"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"id": 1, "name": "talos"}])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = TreeherderClient::with_config(
        ClientConfig::new(server.uri()).with_api_key("secret-key"),
    )
    .unwrap();
    assert!(client.is_authenticated());
    let frameworks = client.get_performance_frameworks().await.unwrap();
    assert_eq!(frameworks[0].name, "talos");
}

/// Job 42's log list on `api` points at a log stored on `log_host`.
async fn mount_external_log(api: &MockServer, log_host: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/project/autoland/job-log-url/"))
        .and(query_param("job_id", "42"))
        .and(header("Authorization", "Bearer secret-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 2,
            "job_id": 42,
            "name": "live_backing_log",
            "url": format!("{}/public/logs/live_backing.log", log_host.uri()),
            "parse_status": "parsed"
        }])))
        .mount(api)
        .await;
    Mock::given(method("GET"))
        .and(path("/public/logs/live_backing.log"))
        .respond_with(ResponseTemplate::new(200).set_body_string("line one\nline two\n"))
        .mount(log_host)
        .await;
}

async fn authorization_headers(server: &MockServer) -> Vec<Option<String>> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|req| {
            req.headers
                .get("authorization")
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
        })
        .collect()
}

#[tokio::test]
async fn test_api_key_not_sent_to_log_host() {
    let api = MockServer::start().await;
    let log_host = MockServer::start().await;
    mount_external_log(&api, &log_host).await;

    let client =
        TreeherderClient::with_config(ClientConfig::new(api.uri()).with_api_key("secret-key"))
            .unwrap();
    let log = client
        .get_job_log("autoland", 42, Some("live_backing_log"))
        .await
        .unwrap();
    assert_eq!(log.text, "line one\nline two\n");

    assert_eq!(
        authorization_headers(&api).await,
        vec![Some("Bearer secret-key".to_string())]
    );
    assert_eq!(authorization_headers(&log_host).await, vec![None]);
}

#[test]
fn test_blocking_api_key_not_sent_to_log_host() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let (api, log_host) = rt.block_on(async {
        let api = MockServer::start().await;
        let log_host = MockServer::start().await;
        mount_external_log(&api, &log_host).await;
        (api, log_host)
    });

    let client =
        TreeherderClient::with_config(ClientConfig::new(api.uri()).with_api_key("secret-key"))
            .unwrap();
    let log = client
        .blocking()
        .get_job_log("autoland", 42, None)
        .unwrap();
    assert!(log.text.starts_with("line one"));

    let log_headers = rt.block_on(authorization_headers(&log_host));
    assert_eq!(log_headers, vec![None]);

    drop(client);
    drop(api);
    drop(log_host);
}

#[test]
fn test_non_http_server_is_a_usage_error() {
    let err = TreeherderClient::new("treeherder.mozilla.org").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Client);
    assert!(matches!(err, AppError::Cli(_)));

    let err = TreeherderClient::with_config(ClientConfig::new("").with_api_key("secret-key"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Client);
}

#[tokio::test]
async fn test_job_by_guid_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/project/autoland/jobs/"))
        .and(query_param("job_guid", "missing-guid"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"results": [], "count": 0})),
        )
        .mount(&server)
        .await;

    let err = client_for(&server)
        .get_job_by_guid("autoland", "missing-guid")
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert!(err.to_string().contains("missing-guid"));
}

#[tokio::test]
async fn test_concurrent_calls_share_one_client() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/project/autoland/jobs/1/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(job_json(1, "g1")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/project/autoland/push/100/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(push_json(100)))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let (job, push) = futures::future::join(
        client.get_job("autoland", 1),
        client.get_push("autoland", 100),
    )
    .await;

    let job = job.unwrap();
    assert_eq!(job.push_id, push.unwrap().id);
    assert_eq!(job.duration_seconds(), 600);
}

async fn mount_log(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path("/api/project/autoland/job-log-url/"))
        .and(query_param("job_id", "42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": 1,
                "job_id": 42,
                "name": "builds-4h",
                "url": format!("{}/logs/builds-4h.log", server.uri()),
                "parse_status": "skipped-size"
            },
            {
                "id": 2,
                "job_id": 42,
                "name": "live_backing_log",
                "url": format!("{}/logs/live_backing.log", server.uri()),
                "parse_status": "parsed"
            }
        ])))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/logs/live_backing.log"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_search_job_log_with_context() {
    let server = MockServer::start().await;
    mount_log(&server, "a\nERROR b\nc\n").await;

    let client = client_for(&server);
    let matches = client
        .search_job_log(
            "autoland",
            42,
            "ERROR",
            Some("live_backing_log"),
            SearchOptions::with_context(1),
        )
        .await
        .unwrap();

    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].line_number, 2);
    assert_eq!(matches[0].line, "ERROR b");
    assert_eq!(
        matches[0].context,
        Some(vec!["a".to_string(), "ERROR b".to_string(), "c".to_string()])
    );
}

#[tokio::test]
async fn test_get_job_log_resolves_named_artifact() {
    let server = MockServer::start().await;
    mount_log(&server, "line one\nline two\n").await;

    let log = client_for(&server)
        .get_job_log("autoland", 42, Some("live_backing_log"))
        .await
        .unwrap();
    assert_eq!(log.reference.artifact_name, "live_backing_log");
    assert!(log.reference.resolved_url.ends_with("/logs/live_backing.log"));
    assert_eq!(log.line_count(), 2);
}

#[tokio::test]
async fn test_missing_artifact_names_available_logs() {
    let server = MockServer::start().await;
    mount_log(&server, "").await;

    let err = client_for(&server)
        .get_job_log("autoland", 42, Some("errorsummary_json"))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    let message = err.to_string();
    assert!(message.contains("errorsummary_json"));
    assert!(message.contains("builds-4h, live_backing_log"));
}

#[tokio::test]
async fn test_missing_log_body_is_an_api_error() {
    let server = MockServer::start().await;
    mount_log(&server, "").await;

    // builds-4h has no body mounted, so the artifact download returns 404
    let err = client_for(&server)
        .get_job_log("autoland", 42, None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Api);
    match err {
        AppError::Api(api_error) => assert_eq!(api_error.status(), Some(404)),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_raw_request_passes_params() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/project/autoland/jobs/"))
        .and(query_param("result", "busted"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let url = format!("{}/api/project/autoland/jobs/", server.uri());
    let body = client
        .request(
            Method::GET,
            &url,
            &[("result".to_string(), "busted".to_string())],
        )
        .await
        .unwrap();
    assert_eq!(body, json!({"results": []}));
}

// The blocking transport must live outside any async runtime, so these tests
// only use a runtime to start and configure the mock server.
#[test]
fn test_blocking_matches_async() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let server = rt.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/project/autoland/push/"))
            .and(query_param("count", "3"))
            .and(query_param("offset", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [push_json(10), push_json(11), push_json(12)],
                "count": 3,
                "next": null
            })))
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/project/autoland/jobs/7/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(job_json(7, "guid-7")))
            .expect(2)
            .mount(&server)
            .await;
        server
    });

    let client = client_for(&server);
    let job_async = rt.block_on(client.get_job("autoland", 7)).unwrap();
    let job_blocking = client.blocking().get_job("autoland", 7).unwrap();
    assert_eq!(job_async, job_blocking);
    assert_eq!(job_blocking.job_guid, "guid-7");

    let filter = PushFilter {
        count: 3,
        ..PushFilter::default()
    };

    let from_async = rt
        .block_on(client.get_pushes("autoland", &filter))
        .unwrap();
    let from_blocking = client.blocking().get_pushes("autoland", &filter).unwrap();

    assert_eq!(from_async, from_blocking);
    assert!(client.has_async_connection());
    assert!(client.has_blocking_connection());

    drop(client);
    drop(server);
}

#[test]
fn test_blocking_log_search_and_close() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let server = rt.block_on(async {
        let server = MockServer::start().await;
        mount_log(&server, "start\nTEST-UNEXPECTED-FAIL | a\nok\nTEST-UNEXPECTED-FAIL | b\n").await;
        server
    });

    let mut client = client_for(&server);
    let matches = client
        .blocking()
        .search_job_log(
            "autoland",
            42,
            "TEST-UNEXPECTED-FAIL",
            Some("live_backing_log"),
            SearchOptions::default(),
        )
        .unwrap();
    let lines: Vec<usize> = matches.iter().map(|m| m.line_number).collect();
    assert_eq!(lines, vec![2, 4]);
    assert!(client.has_blocking_connection());
    assert!(!client.has_async_connection());

    client.close();
    assert!(!client.has_blocking_connection());

    // A closed client reconnects on demand
    let log = client
        .blocking()
        .get_job_log("autoland", 42, Some("live_backing_log"))
        .unwrap();
    assert_eq!(log.line_count(), 4);

    drop(client);
    drop(server);
}

#[test]
fn test_raw_blocking_request_maps_errors_like_async() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let server = rt.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/optioncollectionhash/"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;
        server
    });

    let client = client_for(&server);
    let url = format!("{}/api/optioncollectionhash/", server.uri());

    let blocking_err = client
        .request_blocking(Method::GET, &url, &[])
        .unwrap_err();
    let async_err = rt
        .block_on(client.request(Method::GET, &url, &[]))
        .unwrap_err();

    assert_eq!(blocking_err.status(), Some(503));
    assert_eq!(async_err.status(), Some(503));
    assert_eq!(blocking_err.to_string(), async_err.to_string());

    drop(client);
    drop(server);
}
