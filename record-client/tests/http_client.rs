#![allow(clippy::unwrap_used, clippy::expect_used)]
//! HTTP transport against a wiremock record store.

use crm_record_client::{
    ClientError, DeleteParams, FetchParams, FieldSpec, GetParams, HttpClientConfig,
    HttpRecordClient, MutateParams, OrderBy, PagingInfo, RecordClient, WhereClause,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> HttpRecordClient {
    HttpRecordClient::new(
        HttpClientConfig::new(server.uri())
            .with_project_id("proj-1")
            .with_public_key("secret"),
    )
    .expect("client")
}

#[tokio::test]
async fn fetch_posts_projection_and_decodes_records() {
    let server = MockServer::start().await;
    let params = FetchParams {
        fields: vec![FieldSpec::new("title_c"), FieldSpec::new("value_c")],
        where_clauses: vec![WhereClause::eq("stage_c", "lead")],
        order_by: vec![OrderBy::desc("CreatedOn")],
        paging_info: PagingInfo::default(),
    };

    Mock::given(method("POST"))
        .and(path("/tables/deal_c/records/query"))
        .and(header("authorization", "Bearer secret"))
        .and(header("x-project-id", "proj-1"))
        .and(body_json(serde_json::to_value(&params).unwrap()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [
                {"Id": 1, "title_c": "Renewal", "value_c": 500},
                {"Id": 2, "title_c": "Upsell", "value_c": 1200}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resp = client_for(&server)
        .fetch_records("deal_c", &params)
        .await
        .expect("fetch");

    assert!(resp.success);
    let data = resp.data.unwrap();
    assert_eq!(data.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2]);
    assert_eq!(data[1].get_f64("value_c"), Some(1200.0));
}

#[tokio::test]
async fn get_by_id_uses_id_segment() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tables/company_c/records/42/query"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true, "data": {"Id": 42, "name_c": "Acme"}})),
        )
        .mount(&server)
        .await;

    let resp = client_for(&server)
        .get_record_by_id("company_c", 42, &GetParams { fields: vec![] })
        .await
        .expect("get");
    assert_eq!(resp.data.map(|r| r.id), Some(42));
}

#[tokio::test]
async fn create_update_delete_use_distinct_methods() {
    let server = MockServer::start().await;
    let mutate_ok = json!({"success": true, "results": [{"success": true, "data": {"Id": 9}}]});

    Mock::given(method("POST"))
        .and(path("/tables/task_c/records"))
        .and(body_json(json!({"records": [{"title_c": "Call back"}]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(mutate_ok.clone()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/tables/task_c/records"))
        .and(body_json(json!({"records": [{"Id": 9, "status_c": "done"}]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(mutate_ok))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/tables/task_c/records"))
        .and(body_json(json!({"RecordIds": [9]})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true, "results": [{"success": true}]})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut create = serde_json::Map::new();
    create.insert("title_c".to_string(), json!("Call back"));
    let created = client
        .create_record("task_c", &MutateParams::single(create))
        .await
        .expect("create");
    assert!(created.success);

    let mut update = serde_json::Map::new();
    update.insert("Id".to_string(), json!(9));
    update.insert("status_c".to_string(), json!("done"));
    let updated = client
        .update_record("task_c", &MutateParams::single(update))
        .await
        .expect("update");
    assert!(updated.success);

    let deleted = client
        .delete_record("task_c", &DeleteParams { record_ids: vec![9] })
        .await
        .expect("delete");
    assert_eq!(deleted.results.as_ref().map(Vec::len), Some(1));
}

#[tokio::test]
async fn success_false_body_is_returned_not_raised() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": false, "message": "Table not found"})),
        )
        .mount(&server)
        .await;

    let resp = client_for(&server)
        .fetch_records("nope_c", &FetchParams {
            fields: vec![],
            where_clauses: vec![],
            order_by: vec![],
            paging_info: PagingInfo::default(),
        })
        .await
        .expect("fetch");
    assert!(!resp.success);
    assert_eq!(resp.message.as_deref(), Some("Table not found"));
}

#[tokio::test]
async fn http_error_status_carries_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"message": "Invalid public key"})),
        )
        .mount(&server)
        .await;

    let err = client_for(&server)
        .get_record_by_id("deal_c", 1, &GetParams { fields: vec![] })
        .await
        .expect_err("401");
    match &err {
        ClientError::Status { status, message, .. } => {
            assert_eq!(*status, 401);
            assert_eq!(message, "Invalid public key");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.server_message(), "Invalid public key");
}

#[tokio::test]
async fn malformed_body_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .get_record_by_id("deal_c", 1, &GetParams { fields: vec![] })
        .await
        .expect_err("bad body");
    assert_eq!(err.as_str(), "INVALID_RESPONSE");
}

#[tokio::test]
async fn missing_public_key_never_hits_the_network() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = HttpRecordClient::new(HttpClientConfig::new(server.uri())).expect("client");
    assert!(!client.is_ready());
    let err = client
        .get_record_by_id("deal_c", 1, &GetParams { fields: vec![] })
        .await
        .expect_err("not initialized");
    assert!(matches!(err, ClientError::NotInitialized));
}
