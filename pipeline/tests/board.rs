#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Board loading and deal moves against the in-memory record client.

use std::sync::Arc;

use crm_pipeline::{Pipeline, PipelineBoard};
use crm_record_client::RecordClient;
use crm_record_client::mock::{MockOp, MockRecordClient};
use crm_repository::{ErrorKind, Repository};
use pretty_assertions::assert_eq;
use serde_json::json;

fn seeded() -> Arc<MockRecordClient> {
    let client = Arc::new(MockRecordClient::new());
    client.seed(
        "stage_c",
        vec![
            json!({"Id": 1, "name_c": "lead", "order_c": 1, "is_active_c": true}),
            json!({"Id": 2, "name_c": "qualified", "order_c": 2, "is_active_c": true}),
            json!({"Id": 3, "name_c": "won", "order_c": 3, "is_active_c": true}),
            json!({"Id": 4, "name_c": "dormant", "order_c": 4, "is_active_c": false}),
        ],
    );
    client.seed(
        "deal_c",
        vec![
            json!({"Id": 10, "title_c": "Renewal", "stage_c": "qualified", "value_c": 500,
                   "contactId_c": {"Id": 100, "Name": "Ada Lovelace"},
                   "CreatedOn": "2024-02-01T00:00:00Z"}),
            json!({"Id": 11, "title_c": "Upsell", "stage_c": "1", "value_c": 1200,
                   "CreatedOn": "2024-03-01T00:00:00Z"}),
        ],
    );
    client.seed(
        "contact_c",
        vec![json!({"Id": 100, "first_name_c": "Ada", "last_name_c": "Lovelace"})],
    );
    client
}

fn pipeline(client: &Arc<MockRecordClient>) -> Pipeline {
    Pipeline::new(Repository::crm(Arc::clone(client) as Arc<dyn RecordClient>))
}

fn bucket_ids(board: &PipelineBoard, stage_id: &str) -> Vec<i64> {
    board
        .snapshot
        .bucket(stage_id)
        .expect("bucket")
        .deals
        .iter()
        .map(|d| d.id)
        .collect()
}

#[tokio::test]
async fn load_board_groups_active_stages() {
    let client = seeded();
    let board = pipeline(&client).load_board().await.expect("board");

    let stage_ids: Vec<_> = board
        .snapshot
        .buckets
        .iter()
        .map(|b| b.stage.id.as_str())
        .collect();
    assert_eq!(stage_ids, vec!["1", "2", "3"]);
    assert_eq!(bucket_ids(&board, "1"), vec![11]);
    assert_eq!(bucket_ids(&board, "2"), vec![10]);
    assert!(bucket_ids(&board, "3").is_empty());
    assert_eq!(board.total(), 1700.0);

    let deal = &board.snapshot.bucket("2").expect("bucket").deals[0];
    assert_eq!(
        board.contact_for(deal).map(|c| c.name.as_str()),
        Some("Ada Lovelace")
    );
}

#[tokio::test]
async fn load_board_is_all_or_nothing() {
    let client = seeded();
    client.script(MockOp::Fetch, json!({"success": false, "message": "record store offline"}));
    client.script(MockOp::Fetch, json!({"success": true, "data": []}));
    client.script(MockOp::Fetch, json!({"success": true, "data": []}));

    let err = pipeline(&client).load_board().await.expect_err("failed load");
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert_eq!(err.to_string(), "record store offline");
}

#[tokio::test]
async fn move_and_reload_replaces_board() {
    let client = seeded();
    let pipeline = pipeline(&client);
    let mut board = pipeline.load_board().await.expect("board");

    pipeline
        .move_and_reload(&mut board, 11, "3")
        .await
        .expect("moved");

    assert_eq!(
        client.calls().iter().rev().find(|c| c.op == MockOp::Update).map(|c| c.body.clone()),
        Some(json!({"records": [{"Id": 11, "stage_c": "3"}]}))
    );
    assert!(bucket_ids(&board, "1").is_empty());
    assert_eq!(bucket_ids(&board, "3"), vec![11]);
    assert_eq!(board.snapshot.bucket("3").expect("won").total, 1200.0);
}

#[tokio::test]
async fn failed_move_leaves_board_untouched() {
    let client = seeded();
    let pipeline = pipeline(&client);
    let mut board = pipeline.load_board().await.expect("board");
    let before = board.clone();
    let fetches = client.call_count(MockOp::Fetch);

    client.script(MockOp::Update, json!({"success": false, "message": "Invalid stage 99"}));
    let err = pipeline
        .move_and_reload(&mut board, 11, "99")
        .await
        .expect_err("rejected");

    assert_eq!(err.kind(), ErrorKind::Transport);
    assert_eq!(err.to_string(), "Invalid stage 99");
    assert_eq!(board, before);
    assert_eq!(client.call_count(MockOp::Fetch), fetches);
}

#[tokio::test]
async fn move_to_blank_stage_is_rejected_without_update() {
    let client = seeded();
    let pipeline = pipeline(&client);

    for target in ["", "   "] {
        let err = pipeline.move_deal(10, target).await.expect_err("blank stage");
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    assert_eq!(client.call_count(MockOp::Update), 0);
    let deal = client
        .records("deal_c")
        .into_iter()
        .find(|d| d.id == 10)
        .expect("deal");
    assert_eq!(deal.get_str("stage_c"), Some("qualified"));
}
