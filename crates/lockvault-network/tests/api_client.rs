//! Integration tests for ApiClient
//!
//! These tests run the client against a wiremock server and verify the
//! transport rules (status handling, JSON decoding) and the request shape
//! of every endpoint the client implements.

use chrono::NaiveDate;
use lockvault_core::AccessTime;
use lockvault_network::{AccountService, ApiClient, ApiClientConfig, ApiError, HttpMethod};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn client_for(server: &MockServer) -> ApiClient {
    let config = ApiClientConfig::default()
        .base_url(server.uri())
        .timeout(Duration::from_millis(1000));
    ApiClient::new(config).unwrap()
}

fn access_time(day: u32, hour: u32) -> AccessTime {
    AccessTime::new(
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap(),
    )
}

/// 404 carries the status and the body text verbatim
#[tokio::test]
async fn test_non_200_status_preserves_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v4/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string(r#"{"Message":"not found"}"#))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client
        .call(HttpMethod::Get, "v4/missing", &[], None::<&()>)
        .await;

    match result {
        Err(ApiError::Status { status, body, .. }) => {
            assert_eq!(status, 404);
            assert_eq!(body, r#"{"Message":"not found"}"#);
        }
        other => panic!("expected Status error, got {other:?}"),
    }
}

/// Only 200 counts as success, not any 2xx
#[tokio::test]
async fn test_201_is_not_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"ok": true})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client
        .call(HttpMethod::Post, "v4/anything", &[], Some(&json!({})))
        .await;

    assert_eq!(result.unwrap_err().status(), Some(201));
}

#[tokio::test]
async fn test_200_returns_parsed_json() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/v4/thing"))
        .and(query_param("a", "1"))
        .and(body_json(json!({"x": 2})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"y": [1, 2, 3]})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let value = client
        .call(HttpMethod::Put, "v4/thing", &[("a", "1")], Some(&json!({"x": 2})))
        .await
        .unwrap();

    assert_eq!(value, json!({"y": [1, 2, 3]}));
}

#[tokio::test]
async fn test_200_with_invalid_json_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client
        .call(HttpMethod::Get, "v4/anything", &[], None::<&()>)
        .await;

    assert!(matches!(result, Err(ApiError::Decode(_))));
}

#[tokio::test]
async fn test_request_timeout_is_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let config = ApiClientConfig::default()
        .base_url(server.uri())
        .timeout(Duration::from_millis(50));
    let client = ApiClient::new(config).unwrap();

    let result = client
        .call(HttpMethod::Get, "v4/slow", &[], None::<&()>)
        .await;

    match result {
        Err(ApiError::Http(e)) => assert!(e.is_timeout()),
        other => panic!("expected Http timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn test_authenticate_sends_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v4/account/authenticate/"))
        .and(query_param("apikey", "androidble"))
        .and(body_json(json!({"username": "alice", "password": "hunter2"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Token": "tok-123"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let token = client.authenticate("alice", "hunter2").await.unwrap();
    assert_eq!(token, "tok-123");
}

#[tokio::test]
async fn test_authenticate_missing_token_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v4/account/authenticate/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Other": 1})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client.authenticate("alice", "hunter2").await;
    assert!(matches!(result, Err(ApiError::MalformedResponse { .. })));
}

#[tokio::test]
async fn test_authenticate_rejection_propagates_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad credentials"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client.authenticate("alice", "wrong").await;
    assert_eq!(result.unwrap_err().status(), Some(401));
}

/// Discovery keeps the server's order
#[tokio::test]
async fn test_list_locks_preserves_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v4/kmsdevicekey/"))
        .and(query_param("username", "alice"))
        .and(query_param("apikey", "tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"DeviceId": "ZED", "KMSDeviceId": "kms-3"},
            {"DeviceId": "ALPHA", "KMSDeviceId": "kms-1"},
            {"DeviceId": "MID", "KMSDeviceId": "kms-2"}
        ])))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let locks = client.list_locks("alice", "tok").await.unwrap();

    let ids: Vec<&str> = locks.iter().map(|l| l.kms_id.as_str()).collect();
    assert_eq!(ids, vec!["kms-3", "kms-1", "kms-2"]);
    assert_eq!(locks[0].device_id, "ZED");
}

#[tokio::test]
async fn test_list_locks_empty_is_ok() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v4/kmsdevicekey/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let locks = client.list_locks("alice", "tok").await.unwrap();
    assert!(locks.is_empty());
}

#[tokio::test]
async fn test_list_locks_missing_field_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v4/kmsdevicekey/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"DeviceId": "X"}])))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client.list_locks("alice", "tok").await;
    assert!(matches!(result, Err(ApiError::MalformedResponse { .. })));
}

#[tokio::test]
async fn test_list_products_via_trait() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v4/product"))
        .and(query_param("complex", "true"))
        .and(query_param("username", "alice"))
        .and(query_param("apikey", "tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "Name": "Front gate",
            "Id": "p-9",
            "KMSDevice": {
                "DeviceId": "GATE",
                "Id": "kms-9",
                "PrimaryCode": "UUDD",
                "Location": {"Latitude": 1.5, "Longitude": 2.5}
            },
            "Model": {"Id": 1, "Name": "Bluetooth Padlock", "ModelNumber": "4400", "SKU": "4400D"}
        }])))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let locks = AccountService::list_products(&client, "alice", "tok")
        .await
        .unwrap();

    assert_eq!(locks.len(), 1);
    assert_eq!(locks[0].kms_id, "kms-9");
    assert_eq!(locks[0].name.as_deref(), Some("Front gate"));
    assert_eq!(locks[0].model_sku.as_deref(), Some("4400D"));
}

#[tokio::test]
async fn test_get_product() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v4/product/p-9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Name": "Front gate",
            "Id": "p-9",
            "KMSDevice": {"DeviceId": "GATE", "Id": "kms-9"}
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let product = client.get_product("alice", "tok", "p-9").await.unwrap();
    assert_eq!(product.id, "p-9");
    assert_eq!(product.kms_device.id, "kms-9");
}

#[tokio::test]
async fn test_generate_temporary_code_with_access_time() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v4/kmsdevice/kms-1/servicecode/"))
        .and(query_param("username", "alice"))
        .and(query_param("apikey", "tok"))
        .and(query_param("accessTime", "2024-01-02 04:00:00"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ServiceCode": "AAA111"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let code = client
        .generate_temporary_code("alice", "tok", "kms-1", Some(access_time(2, 4)))
        .await
        .unwrap();
    assert_eq!(code, "AAA111");
}

/// Without an access time the request carries no accessTime parameter
#[tokio::test]
async fn test_generate_temporary_code_current() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v4/kmsdevice/kms-1/servicecode/"))
        .and(|req: &Request| !req.url.query_pairs().any(|(k, _)| k == "accessTime"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ServiceCode": "NOW999"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let code = client
        .generate_temporary_code("alice", "tok", "kms-1", None)
        .await
        .unwrap();
    assert_eq!(code, "NOW999");
}

#[tokio::test]
async fn test_generate_temporary_code_missing_field() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Code": "X"})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client
        .generate_temporary_code("alice", "tok", "kms-1", None)
        .await;
    assert!(matches!(result, Err(ApiError::MalformedResponse { .. })));
}

#[tokio::test]
async fn test_master_backup_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v4/kmsdevice/kms-1/mastercode"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"MasterCode": "ULURDLRUDLR"})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let code = client.master_backup_code("alice", "tok", "kms-1").await.unwrap();
    assert_eq!(code, "ULURDLRUDLR");
}

#[tokio::test]
async fn test_forgot_password_accepted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v4/account/resetpassword"))
        .and(query_param("apikey", "androidble"))
        .and(body_json(json!({"email": "alice@example.com"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ServiceResult": 1})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert!(client.forgot_password("alice@example.com").await.unwrap());
}

#[tokio::test]
async fn test_forgot_username_unexpected_result() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v4/account/retrieveusername"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ServiceResult": 0})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert!(!client.forgot_username("alice@example.com").await.unwrap());
}

/// A rejected notification collapses to false instead of an error
#[tokio::test]
async fn test_forgot_password_rejected_is_false() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(404).set_body_string(r#"{"Message":"unknown"}"#))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert!(!client.forgot_password("nobody@example.com").await.unwrap());
}

/// Only a non-200 answer collapses; an unparseable 200 is still an error
#[tokio::test]
async fn test_forgot_username_invalid_json_propagates() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client.forgot_username("alice@example.com").await;
    assert!(matches!(result, Err(ApiError::Decode(_))));
}

/// Unverified endpoints never reach the network
#[tokio::test]
async fn test_unimplemented_endpoints_make_no_requests() {
    let server = MockServer::start().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server);

    let results = vec![
        client.email_verification_details("id-1").await,
        client.available_firmware_versions("alice", "tok", "kms-1").await,
        client.firmware_update("alice", "tok", "kms-1").await,
        client
            .specified_firmware_upgrade("alice", "tok", "kms-1", 1445277336, 1445277337)
            .await,
        client.update_traits("alice", "tok", "kms-1").await,
    ];

    for result in results {
        assert!(matches!(result, Err(ApiError::Unimplemented { .. })));
    }
}

#[tokio::test]
async fn test_connection_refused_is_http_error() {
    // Bind then drop a listener so the port is known to be closed
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = ApiClientConfig::default().base_url(format!("http://{addr}"));
    let client = ApiClient::new(config).unwrap();

    let result = client
        .call(HttpMethod::Get, "v4/anything", &[], None::<&()>)
        .await;
    assert!(matches!(result, Err(ApiError::Http(_))));
}
