use formcall_api_client::Attachment;
use formcall_api_client::AttachmentGroup;
use formcall_api_client::CallOptions;
use formcall_api_client::RESERVED_JSON_FIELD;
use formcall_api_client::ResponseResult;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;
use wiremock::matchers::method;
use wiremock::matchers::path;

use super::client_for;
use super::params;

fn position(haystack: &str, needle: &str) -> usize {
    haystack
        .find(needle)
        .unwrap_or_else(|| panic!("missing {needle:?} in multipart body:\n{haystack}"))
}

#[tokio::test]
async fn attachments_switch_to_multipart_with_numbered_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"rc": 0, "data": "stored"})))
        .expect(1)
        .mount(&server)
        .await;

    let docs = AttachmentGroup::new(
        "docs",
        vec![
            Attachment::new("one.txt", "text/plain", b"first file".to_vec()),
            Attachment::new("two.txt", "text/plain", b"second file".to_vec()),
            Attachment::new("three.txt", "text/plain", b"third file".to_vec()),
        ],
    );
    let options = CallOptions::new().with_attachments(docs);

    let result = client_for(&server)
        .send("upload", params(json!({"label": "batch"})), Some(options))
        .unwrap()
        .await;
    assert_eq!(result, ResponseResult::Success(json!("stored")));

    let requests = server.received_requests().await.unwrap();
    let request = &requests[0];
    let content_type = request
        .headers
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(
        content_type.starts_with("multipart/form-data"),
        "unexpected content type {content_type}"
    );

    let body = String::from_utf8_lossy(&request.body).into_owned();
    let first = position(&body, r#"name="docs"; filename="one.txt""#);
    let second = position(&body, r#"name="docs-1"; filename="two.txt""#);
    let third = position(&body, r#"name="docs-2"; filename="three.txt""#);
    let json_field = position(&body, &format!(r#"name="{RESERVED_JSON_FIELD}""#));
    assert!(first < second && second < third && third < json_field);
    assert!(body.contains("second file"));
    assert!(body.contains(r#"{"label":"batch"}"#));
}

#[tokio::test]
async fn files_from_disk_are_sent_under_their_group_name() {
    let dir = tempfile::tempdir().unwrap();
    let scan = dir.path().join("scan.png");
    std::fs::write(&scan, b"\x89PNG fake").unwrap();

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"rc": 0})))
        .expect(1)
        .mount(&server)
        .await;

    let group = AttachmentGroup::from_paths("cover", &[scan]).await.unwrap();
    let options = CallOptions::new().with_attachments(group);
    client_for(&server)
        .send("upload", None, Some(options))
        .unwrap()
        .await;

    let requests = server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&requests[0].body).into_owned();
    assert!(body.contains(r#"name="cover"; filename="scan.png""#));
    assert!(body.contains("image/png"));
    assert!(!body.contains(r#"name="cover-1""#));
    assert!(body.contains("{}"));
}

#[tokio::test]
async fn attachments_do_not_leak_into_later_calls() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"rc": 0})))
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let options = CallOptions::new().with_attachments(AttachmentGroup::new(
        "docs",
        vec![Attachment::new("a.txt", "text/plain", b"a".to_vec())],
    ));
    client.send("upload", None, Some(options)).unwrap().await;
    client.send("list", None, None).unwrap().await;

    let requests = server.received_requests().await.unwrap();
    let second_type = requests[1]
        .headers
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap();
    assert_eq!(second_type, "application/json");
}
