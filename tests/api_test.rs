//! End-to-end API behavior against a mocked XML-RPC zone.

mod common;

use std::sync::Arc;

use reqwest::{header::AUTHORIZATION, StatusCode};
use serde_json::{json, Value};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{bearer, params_fragment, spawn_http, spawn_with, xmlrpc_fail, xmlrpc_ok, zone, EchoBackend};

async fn zone_server() -> MockServer {
    MockServer::start().await
}

fn rpc_url(server: &MockServer) -> String {
    format!("{}/RPC2", server.uri())
}

#[tokio::test]
async fn test_put_host_status_end_to_end() {
    let backend = zone_server().await;
    let expected = params_fragment(&[
        "<string>oneadmin:backend-token</string>",
        "<i4>5</i4>",
        "<i4>1</i4>",
    ]);
    Mock::given(method("POST"))
        .and(path("/RPC2"))
        .and(body_string_contains("<methodName>one.host.status</methodName>"))
        .and(body_string_contains(expected.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_string(xmlrpc_ok("<i4>5</i4>")))
        .expect(1)
        .mount(&backend)
        .await;

    let gateway = spawn_http(vec![zone(0, rpc_url(&backend))]).await;
    let response = reqwest::Client::new()
        .put(gateway.url("/api/host/5/status"))
        .header(AUTHORIZATION, bearer("oneadmin", "backend-token"))
        .json(&json!({"status": 1}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"id": 200, "message": "", "data": 5}));
}

#[tokio::test]
async fn test_vmpool_query_defaults_and_xml_data() {
    let backend = zone_server().await;
    let expected = params_fragment(&[
        "<string>oneadmin:backend-token</string>",
        "<i4>-2</i4>",
        "<i4>-1</i4>",
        "<i4>-1</i4>",
        "<i4>-2</i4>",
        "<string></string>",
    ]);
    let pool = "<string>&lt;VM_POOL&gt;&lt;VM&gt;&lt;ID&gt;1&lt;/ID&gt;&lt;/VM&gt;&lt;VM&gt;&lt;ID&gt;2&lt;/ID&gt;&lt;/VM&gt;&lt;/VM_POOL&gt;</string>";
    Mock::given(method("POST"))
        .and(body_string_contains("<methodName>one.vmpool.info</methodName>"))
        .and(body_string_contains(expected.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_string(xmlrpc_ok(pool)))
        .expect(1)
        .mount(&backend)
        .await;

    let gateway = spawn_http(vec![zone(0, rpc_url(&backend))]).await;
    let body: Value = reqwest::Client::new()
        .get(gateway.url("/api/vmpool/info?filter=-2&start=-1&bogus=1"))
        .header(AUTHORIZATION, bearer("oneadmin", "backend-token"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["id"], 200);
    assert_eq!(body["data"], json!({"VM_POOL": {"VM": [{"ID": "1"}, {"ID": "2"}]}}));
}

#[tokio::test]
async fn test_backend_failure_is_verbatim_500() {
    let backend = zone_server().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(xmlrpc_fail("[one.vm.info] Error getting virtual machine [42].", 1024)),
        )
        .mount(&backend)
        .await;

    let gateway = spawn_http(vec![zone(0, rpc_url(&backend))]).await;
    let response = reqwest::Client::new()
        .get(gateway.url("/api/vm/42/info"))
        .header(AUTHORIZATION, bearer("oneadmin", "t"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "[one.vm.info] Error getting virtual machine [42].");
    assert!(body.get("data").is_none());
}

#[tokio::test]
async fn test_unreachable_zone_is_503() {
    let gateway = spawn_http(vec![zone(0, "http://127.0.0.1:1/RPC2")]).await;
    let response = reqwest::Client::new()
        .get(gateway.url("/api/hostpool/info"))
        .header(AUTHORIZATION, bearer("oneadmin", "t"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_method_mismatch_never_reaches_backend() {
    let backend = zone_server().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string(xmlrpc_ok("<i4>0</i4>")))
        .expect(0)
        .mount(&backend)
        .await;

    let gateway = spawn_http(vec![zone(0, rpc_url(&backend))]).await;
    let response = reqwest::Client::new()
        .delete(gateway.url("/api/vmpool/info"))
        .header(AUTHORIZATION, bearer("oneadmin", "t"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["id"], 405);
}

#[tokio::test]
async fn test_routing_errors() {
    let backend = Arc::new(EchoBackend::new());
    let gateway = spawn_with(vec![zone(0, "http://zone0/RPC2")], backend.clone()).await;
    let client = reqwest::Client::new();
    let auth = bearer("oneadmin", "t");

    let cases = [
        ("/api/spaceship/info", StatusCode::SERVICE_UNAVAILABLE),
        ("/api/host/5", StatusCode::BAD_REQUEST),
        ("/api/host/5/info/6", StatusCode::BAD_REQUEST),
        ("/api/host/abc/info", StatusCode::BAD_REQUEST),
        ("/api/host/5/info?zone=9", StatusCode::BAD_REQUEST),
    ];
    for (route, status) in cases {
        let response = client
            .get(gateway.url(route))
            .header(AUTHORIZATION, &auth)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), status, "{route}");
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["id"], status.as_u16(), "{route}");
    }

    let body: Value = client
        .get(gateway.url("/api/host/5/info?zone=9"))
        .header(AUTHORIZATION, &auth)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["message"], "Invalid zone: '9'");
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_malformed_body_is_400() {
    let backend = Arc::new(EchoBackend::new());
    let gateway = spawn_with(vec![zone(0, "http://zone0/RPC2")], backend.clone()).await;

    let response = reqwest::Client::new()
        .put(gateway.url("/api/host/5/status"))
        .header(AUTHORIZATION, bearer("oneadmin", "t"))
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_undeclared_query_keys_never_forwarded() {
    let backend = Arc::new(EchoBackend::new());
    let gateway = spawn_with(vec![zone(0, "http://zone0/RPC2")], backend.clone()).await;

    let body: Value = reqwest::Client::new()
        .get(gateway.url("/api/host/3/info?decrypt=true&injected=payload"))
        .header(AUTHORIZATION, bearer("oneadmin", "t"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["data"]["args"], json!([3, true]));
    let calls = backend.calls();
    assert_eq!(calls.len(), 1);
    assert!(!calls[0].params.contains(&json!("payload")));
}

#[tokio::test]
async fn test_public_routes() {
    let backend = Arc::new(EchoBackend::new());
    let mut second = zone(5, "http://zone5/RPC2");
    second.console_url = Some("https://console.zone5".into());
    let gateway = spawn_with(vec![zone(0, "http://zone0/RPC2"), second], backend).await;
    let client = reqwest::Client::new();

    let health: Value = client.get(gateway.url("/api/health")).send().await.unwrap().json().await.unwrap();
    assert_eq!(health["id"], 200);
    assert_eq!(health["data"]["status"], "ok");
    assert_eq!(health["data"]["zones"], json!([{"id": 0, "name": "zone-0"}, {"id": 5, "name": "zone-5"}]));

    let zones: Value = client.get(gateway.url("/api/zones")).send().await.unwrap().json().await.unwrap();
    assert_eq!(
        zones["data"],
        json!([
            {"id": 0, "name": "zone-0"},
            {"id": 5, "name": "zone-5", "console_url": "https://console.zone5"}
        ])
    );

    let missing = client.get(gateway.url("/nowhere")).send().await.unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_framework_rejections_use_envelope() {
    let backend = Arc::new(EchoBackend::new());
    let gateway = spawn_with(vec![zone(0, "http://zone0/RPC2")], backend.clone()).await;
    let client = reqwest::Client::new();

    for request in [client.get(gateway.url("/api/auth")), client.delete(gateway.url("/api/health"))] {
        let response = request.send().await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body, json!({"id": 405, "message": "Method not allowed"}));
    }

    let response = client
        .post(gateway.url("/api/auth?zone=9&federation=0&zone"))
        .json(&json!({"user": "oneadmin", "pass": "opennebula"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Invalid zone: '9'");
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_path_segments_decoded_after_split() {
    let backend = Arc::new(EchoBackend::new());
    let gateway = spawn_with(vec![zone(0, "http://zone0/RPC2")], backend.clone()).await;
    let client = reqwest::Client::new();
    let auth = bearer("oneadmin", "t");

    let response = client
        .get(gateway.url("/api/vm/7/info/zone=a%2Fb"))
        .header(AUTHORIZATION, &auth)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Invalid zone: 'a/b'");
    assert!(backend.calls().is_empty());

    let body: Value = client
        .get(gateway.url("/api/vm/%37/info/zone=%30"))
        .header(AUTHORIZATION, &auth)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(
        body["data"],
        json!({"endpoint": "http://zone0/RPC2", "method": "one.vm.info", "args": [7, false]})
    );
}
