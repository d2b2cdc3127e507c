#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Repository behaviour against the in-memory record client.

use std::sync::Arc;

use crm_record_client::mock::{MockOp, MockRecordClient};
use crm_record_client::{OrderBy, RecordClient};
use crm_repository::{ErrorKind, ListOptions, Repository, RepositoryError};
use crm_schema::{EntitySchema, FieldDescriptor, FieldKind, SchemaRegistry};
use pretty_assertions::assert_eq;
use serde_json::{Map, Value, json};

fn fields(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

fn repo_with(client: &Arc<MockRecordClient>) -> Repository {
    Repository::crm(Arc::clone(client) as Arc<dyn RecordClient>)
}

fn last_body(client: &MockRecordClient) -> Value {
    client.calls().last().expect("a call").body.clone()
}

#[tokio::test]
async fn create_drops_empty_values_and_returns_backend_id() {
    let client = Arc::new(MockRecordClient::new());
    let repo = repo_with(&client);

    let record = repo
        .create("company", &fields(json!({"name_c": "", "email_c": "a@b.com"})))
        .await
        .expect("created");

    assert_eq!(record.id, 1);
    assert_eq!(
        last_body(&client),
        json!({"records": [{"email_c": "a@b.com"}]})
    );
}

#[tokio::test]
async fn create_ignores_unknown_and_read_only_fields() {
    let client = Arc::new(MockRecordClient::new());
    let repo = repo_with(&client);

    repo.create(
        "deal",
        &fields(json!({
            "title_c": "Renewal",
            "value_c": "1200.50",
            "contactId_c": {"Id": 7, "Name": "Ada"},
            "Id": 99,
            "Name": "server owned",
            "dealTitle": "ui-local name"
        })),
    )
    .await
    .expect("created");

    assert_eq!(
        last_body(&client),
        json!({"records": [{"title_c": "Renewal", "value_c": 1200.5, "contactId_c": 7}]})
    );
}

#[tokio::test]
async fn create_with_nothing_writable_never_calls_backend() {
    let client = Arc::new(MockRecordClient::new());
    let repo = repo_with(&client);

    for kind in repo.registry().kinds().map(str::to_string).collect::<Vec<_>>() {
        let schema = repo.registry().get_schema(&kind).expect("schema");
        let blanks: Map<String, Value> = schema
            .writable_fields()
            .map(|f| (f.name.clone(), json!("  ")))
            .collect();
        let err = repo.create(&kind, &blanks).await.expect_err("empty payload");
        assert_eq!(err.kind(), ErrorKind::Validation, "kind {kind}");
    }
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn create_field_errors_surface_as_validation() {
    let client = Arc::new(MockRecordClient::new());
    client.script(
        MockOp::Create,
        json!({
            "success": true,
            "results": [{
                "success": false,
                "errors": [{"fieldLabel": "Name", "message": "required"}]
            }]
        }),
    );
    let repo = repo_with(&client);

    let err = repo
        .create("contact", &fields(json!({"email_c": "ada@example.com"})))
        .await
        .expect_err("rejected");

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(err.to_string().contains("Name: required"));
}

#[tokio::test]
async fn transport_failure_message_is_verbatim() {
    let client = Arc::new(MockRecordClient::new());
    client.script(
        MockOp::Fetch,
        json!({"success": false, "message": "Table deal_c is locked"}),
    );
    let repo = repo_with(&client);

    let err = repo.list("deal", &ListOptions::new()).await.expect_err("failed");
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert_eq!(err.to_string(), "Table deal_c is locked");
}

#[tokio::test]
async fn unready_client_is_client_unavailable() {
    let client = Arc::new(MockRecordClient::unready());
    let repo = repo_with(&client);

    let err = repo.list("deal", &ListOptions::new()).await.expect_err("unavailable");
    assert!(matches!(err, RepositoryError::ClientUnavailable));
    let err = repo.delete("deal", 1).await.expect_err("unavailable");
    assert_eq!(err.kind(), ErrorKind::ClientUnavailable);
}

#[tokio::test]
async fn unknown_kind_is_schema_error() {
    let client = Arc::new(MockRecordClient::new());
    let repo = repo_with(&client);

    let err = repo.get_by_id("invoice", 1).await.expect_err("unknown");
    assert_eq!(err.kind(), ErrorKind::UnknownEntity);
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn get_by_id_missing_record_is_not_found() {
    let client = Arc::new(MockRecordClient::new());
    client.seed("deal_c", vec![json!({"Id": 1, "title_c": "Renewal"})]);
    let repo = repo_with(&client);

    let found = repo.get_by_id("deal", 1).await.expect("found");
    assert_eq!(found.get_str("title_c"), Some("Renewal"));

    match repo.get_by_id("deal", 2).await {
        Err(RepositoryError::NotFound { kind, id }) => {
            assert_eq!((kind.as_str(), id), ("deal", 2));
        }
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn list_applies_schema_defaults() {
    let client = Arc::new(MockRecordClient::new());
    client.seed(
        "stage_c",
        vec![
            json!({"Id": 1, "name_c": "Won", "order_c": 3, "is_active_c": true}),
            json!({"Id": 2, "name_c": "Lead", "order_c": 1, "is_active_c": true}),
            json!({"Id": 3, "name_c": "Archived", "order_c": 2, "is_active_c": false}),
        ],
    );
    let repo = repo_with(&client);

    let stages = repo.list("stage", &ListOptions::new()).await.expect("stages");
    let names: Vec<_> = stages.iter().filter_map(|r| r.get_str("name_c")).collect();
    assert_eq!(names, vec!["Lead", "Won"]);

    let body = last_body(&client);
    assert_eq!(body["orderBy"], json!([{"fieldName": "order_c", "sorttype": "ASC"}]));
    assert_eq!(body["pagingInfo"], json!({"limit": 100, "offset": 0}));

    let all = repo
        .list("stage", &ListOptions::new().unfiltered())
        .await
        .expect("all stages");
    assert_eq!(all.len(), 3);
}

#[tokio::test]
async fn list_defaults_to_newest_first_and_caller_order_wins() {
    let client = Arc::new(MockRecordClient::new());
    client.seed(
        "deal_c",
        vec![
            json!({"Id": 1, "title_c": "b", "CreatedOn": "2024-01-01T00:00:00Z"}),
            json!({"Id": 2, "title_c": "a", "CreatedOn": "2024-03-01T00:00:00Z"}),
        ],
    );
    let repo = repo_with(&client).with_page_limit(25);

    let newest = repo.list("deal", &ListOptions::new()).await.expect("deals");
    assert_eq!(newest.iter().map(|r| r.id).collect::<Vec<_>>(), vec![2, 1]);
    let body = last_body(&client);
    assert_eq!(body["orderBy"], json!([{"fieldName": "CreatedOn", "sorttype": "DESC"}]));
    assert_eq!(body["pagingInfo"]["limit"], json!(25));
    assert!(body["fields"].as_array().expect("fields").iter().any(|f| {
        f == &json!({
            "field": {"Name": "contactId_c"},
            "referenceField": {"field": {"Name": "Name"}}
        })
    }));

    let by_id = repo
        .list("deal", &ListOptions::new().order(OrderBy::asc("Id")))
        .await
        .expect("deals");
    assert_eq!(by_id.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2]);
}

#[tokio::test]
async fn list_without_any_default_sends_no_order() {
    let client = Arc::new(MockRecordClient::new());
    let mut registry = SchemaRegistry::new();
    registry.register(
        EntitySchema::new("widget", "widget_c")
            .field(FieldDescriptor::writable("name_c", FieldKind::String)),
    );
    let repo = Repository::new(
        Arc::clone(&client) as Arc<dyn RecordClient>,
        Arc::new(registry),
    );

    repo.list("widget", &ListOptions::new().where_eq("name_c", "x").limit(5).offset(10))
        .await
        .expect("list");
    let body = last_body(&client);
    assert!(body.get("orderBy").is_none());
    assert_eq!(body["where"][0]["FieldName"], json!("name_c"));
    assert_eq!(body["pagingInfo"], json!({"limit": 5, "offset": 10}));
}

#[tokio::test]
async fn list_all_walks_pages_until_short() {
    let client = Arc::new(MockRecordClient::new());
    client.seed(
        "task_c",
        (1..=5).map(|id| json!({"Id": id, "title_c": format!("t{id}")})).collect(),
    );
    let repo = repo_with(&client);

    let all = repo
        .list_all("task", &ListOptions::new().order(OrderBy::asc("Id")).limit(2))
        .await
        .expect("tasks");
    assert_eq!(all.len(), 5);
    assert_eq!(client.call_count(MockOp::Fetch), 3);
}

#[tokio::test]
async fn list_all_stops_when_backend_ignores_offset() {
    let client = Arc::new(MockRecordClient::new());
    let page = json!({"success": true, "data": [{"Id": 1}, {"Id": 2}]});
    client.script(MockOp::Fetch, page.clone());
    client.script(MockOp::Fetch, page);
    let repo = repo_with(&client);

    let all = repo
        .list_all("task", &ListOptions::new().limit(2))
        .await
        .expect("tasks");
    assert_eq!(all.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2]);
    assert_eq!(client.call_count(MockOp::Fetch), 2);
}

#[tokio::test]
async fn update_is_partial_and_idempotent_without_changes() {
    let client = Arc::new(MockRecordClient::new());
    client.seed(
        "deal_c",
        vec![json!({"Id": 4, "title_c": "Renewal", "stage_c": "lead", "value_c": 500})],
    );
    let repo = repo_with(&client);

    let updated = repo
        .update("deal", 4, &fields(json!({"stage_c": "won", "title_c": ""})))
        .await
        .expect("updated");
    assert_eq!(updated.get_str("stage_c"), Some("won"));
    assert_eq!(updated.get_str("title_c"), Some("Renewal"));
    assert_eq!(last_body(&client), json!({"records": [{"Id": 4, "stage_c": "won"}]}));

    let before = client.records("deal_c");
    repo.update("deal", 4, &Map::new()).await.expect("no-op");
    repo.update("deal", 4, &Map::new()).await.expect("no-op");
    assert_eq!(client.records("deal_c"), before);
    assert_eq!(last_body(&client), json!({"records": [{"Id": 4}]}));
}

#[tokio::test]
async fn update_of_missing_record_is_validation() {
    let client = Arc::new(MockRecordClient::new());
    let repo = repo_with(&client);

    let err = repo
        .update("deal", 404, &fields(json!({"stage_c": "won"})))
        .await
        .expect_err("missing");
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.to_string(), "Record does not exist");
}

#[tokio::test]
async fn delete_reports_per_record_failure() {
    let client = Arc::new(MockRecordClient::new());
    client.seed("note_c", vec![json!({"Id": 1, "content_c": "hello"})]);
    let repo = repo_with(&client);

    repo.delete("note", 1).await.expect("deleted");
    assert!(client.records("note_c").is_empty());
    assert_eq!(last_body(&client), json!({"RecordIds": [1]}));

    match repo.delete("note", 1).await {
        Err(RepositoryError::DeleteFailed { reason }) => {
            assert_eq!(reason, "Record does not exist")
        }
        other => panic!("expected DeleteFailed, got {other:?}"),
    }
}
