use formcall_api_client::ApiClient;
use formcall_api_client::CallOptions;
use formcall_api_client::ClientConfig;
use formcall_api_client::ClientError;
use formcall_api_client::ResponseResult;
use formcall_api_client::RouteStyle;
use formcall_api_client::SessionState;
use pretty_assertions::assert_eq;
use serde_json::Value;
use serde_json::json;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;
use wiremock::matchers::body_json;
use wiremock::matchers::header;
use wiremock::matchers::method;
use wiremock::matchers::path;

use super::client_for;
use super::client_with;
use super::params;

#[tokio::test]
async fn list_items_resolves_with_data_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"filter": "active"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"rc": 0, "data": [1, 2, 3]})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let handle = client
        .send("listItems", params(json!({"filter": "active"})), None)
        .unwrap();

    assert_eq!(handle.await, ResponseResult::Success(json!([1, 2, 3])));
}

#[tokio::test]
async fn list_items_with_bad_filter_resolves_application_failure() {
    let server = MockServer::start().await;
    let body = json!({"rc": 2, "message": "bad filter"});
    Mock::given(method("POST"))
        .and(path("/api"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .send("listItems", params(json!({"filter": "bogus"})), None)
        .unwrap()
        .outcome()
        .await
        .into_result()
        .unwrap_err();

    assert!(err.is_application());
    assert!(err.message().contains("bad filter"), "{}", err.message());
    assert_eq!(err.data(), Some(&body));
}

#[tokio::test]
async fn missing_params_send_an_empty_object() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_json(json!({})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"rc": 0, "data": "pong"})))
        .expect(1)
        .mount(&server)
        .await;

    let result = client_for(&server).send("ping", None, None).unwrap().await;
    assert_eq!(result, ResponseResult::Success(json!("pong")));
}

#[tokio::test]
async fn json_body_matches_parameters_exactly() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"rc": 0})))
        .mount(&server)
        .await;

    let original = json!({
        "name": "résumé",
        "tags": ["a", "b"],
        "nested": {"depth": 2, "empty": {}, "none": null},
        "ratio": 0.25
    });
    client_for(&server)
        .send("save", params(original.clone()), None)
        .unwrap()
        .await;

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let decoded: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(decoded, original);
}

#[tokio::test]
async fn session_header_always_sent_and_fake_header_only_in_fake_mode() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"rc": 0})))
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.send("first", None, None).unwrap().await;
    client
        .send("second", None, Some(CallOptions::new().with_fake(true)))
        .unwrap()
        .await;

    let session_id = client.session().get().unwrap().to_string();
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    for request in &requests {
        assert_eq!(
            request.headers.get("x-sid").unwrap().to_str().unwrap(),
            session_id
        );
    }
    assert!(requests[0].headers.get("x-fake").is_none());
    assert_eq!(
        requests[1].headers.get("x-fake").unwrap().to_str().unwrap(),
        "1"
    );
}

#[tokio::test]
async fn established_session_is_sent_as_header_and_cookie() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("x-session", "abc"))
        .and(header("cookie", "session=abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"rc": 0, "data": true})))
        .expect(1)
        .mount(&server)
        .await;

    let config = ClientConfig {
        sess_header: "X-Session".to_string(),
        sess_id_cookie: "session".to_string(),
        sess_id_cookie_exp_days: 30,
        ..ClientConfig::default()
    };
    let client = client_with(&server, config).with_session(SessionState::with_id("abc"));

    let result = client.send("whoami", None, None).unwrap().await;
    assert_eq!(result, ResponseResult::Success(json!(true)));
}

#[tokio::test]
async fn operation_suffix_routing_appends_operation_name() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/listItems"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"rc": 0, "data": []})))
        .expect(1)
        .mount(&server)
        .await;

    let options = CallOptions::new().with_route_style(RouteStyle::OperationSuffix);
    let result = client_for(&server)
        .send("listItems", None, Some(options))
        .unwrap()
        .await;
    assert_eq!(result, ResponseResult::Success(json!([])));
}

#[tokio::test]
async fn empty_operation_name_is_rejected_before_any_request() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    let err = client.send("", None, None).unwrap_err();

    assert!(matches!(err, ClientError::EmptyOperationName));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[test]
fn send_outside_a_runtime_is_an_error() {
    let client = ApiClient::new(ClientConfig::default()).unwrap();

    let err = client.send("listItems", None, None).unwrap_err();

    assert!(matches!(err, ClientError::NoRuntime));
    assert_eq!(client.session().get(), None);
}

#[tokio::test]
async fn call_options_do_not_touch_client_defaults() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"rc": 0})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let before = client.config().clone();
    let options = CallOptions {
        sess_header: Some("X-Other".to_string()),
        log_failure: Some(false),
        log_prefix: Some("custom: ".to_string()),
        ..CallOptions::default()
    };
    client.send("tweak", None, Some(options)).unwrap().await;

    assert_eq!(client.config(), &before);
    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("x-other").is_some());
    assert!(requests[0].headers.get("x-sid").is_none());
}
