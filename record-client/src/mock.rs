//! In-memory `RecordClient` for tests.
//!
//! Tables hold plain JSON records keyed by `Id`. Fetch honours where-clauses,
//! the first order-by entry and paging. Any operation can be scripted with a
//! canned JSON response, which is consumed before the in-memory behaviour.

// Panics on a poisoned lock or bad seed data only.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};

use crate::client::RecordClient;
use crate::errors::{ClientError, Result};
use crate::models::{
    DeleteParams, DeleteResponse, DeleteResult, FetchParams, FetchResponse, GetParams,
    GetResponse, MutateParams, MutateResponse, Operator, Record, RecordResult, SortType,
    WhereClause,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOp {
    Fetch,
    Get,
    Create,
    Update,
    Delete,
}

/// A request observed by the mock.
#[derive(Debug, Clone, PartialEq)]
pub struct MockCall {
    pub op: MockOp,
    pub table: String,
    pub body: Value,
}

#[derive(Debug, Default)]
struct MockState {
    tables: HashMap<String, BTreeMap<i64, Map<String, Value>>>,
    next_id: i64,
    unready: bool,
    calls: Vec<MockCall>,
    scripted: HashMap<MockOp, VecDeque<Value>>,
}

#[derive(Debug, Default)]
pub struct MockRecordClient {
    state: Mutex<MockState>,
}

impl MockRecordClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// A client that reports itself not ready, like one before sign-in.
    pub fn unready() -> Self {
        let client = Self::default();
        client.state.lock().unwrap().unready = true;
        client
    }

    /// Insert records (each must carry an integer `Id`).
    pub fn seed(&self, table: &str, records: Vec<Value>) {
        let mut state = self.state.lock().unwrap();
        for record in records {
            let Value::Object(mut fields) = record else {
                panic!("seed record must be an object");
            };
            let id = fields
                .remove("Id")
                .and_then(|v| v.as_i64())
                .expect("seed record needs an integer Id");
            state.next_id = state.next_id.max(id);
            state
                .tables
                .entry(table.to_string())
                .or_default()
                .insert(id, fields);
        }
    }

    /// Queue a canned JSON response for the next call of `op`.
    pub fn script(&self, op: MockOp, response: Value) {
        self.state
            .lock()
            .unwrap()
            .scripted
            .entry(op)
            .or_default()
            .push_back(response);
    }

    pub fn records(&self, table: &str) -> Vec<Record> {
        let state = self.state.lock().unwrap();
        state
            .tables
            .get(table)
            .map(|rows| {
                rows.iter()
                    .map(|(id, fields)| Record::new(*id, fields.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn call_count(&self, op: MockOp) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| c.op == op)
            .count()
    }

    /// Record the call and pop a scripted response for it, if any.
    fn begin<T, B>(&self, op: MockOp, table: &str, body: &B) -> Result<Option<T>>
    where
        T: DeserializeOwned,
        B: serde::Serialize,
    {
        let mut state = self.state.lock().unwrap();
        if state.unready {
            return Err(ClientError::NotInitialized);
        }
        state.calls.push(MockCall {
            op,
            table: table.to_string(),
            body: serde_json::to_value(body).unwrap(),
        });
        let Some(canned) = state.scripted.get_mut(&op).and_then(VecDeque::pop_front) else {
            return Ok(None);
        };
        serde_json::from_value(canned)
            .map(Some)
            .map_err(|e| ClientError::InvalidResponse {
                url: format!("mock://{table}"),
                message: e.to_string(),
            })
    }
}

#[async_trait]
impl RecordClient for MockRecordClient {
    fn is_ready(&self) -> bool {
        !self.state.lock().unwrap().unready
    }

    async fn fetch_records(&self, table: &str, params: &FetchParams) -> Result<FetchResponse> {
        if let Some(canned) = self.begin(MockOp::Fetch, table, params)? {
            return Ok(canned);
        }
        let state = self.state.lock().unwrap();
        let mut rows: Vec<Record> = state
            .tables
            .get(table)
            .into_iter()
            .flatten()
            .map(|(id, fields)| Record::new(*id, fields.clone()))
            .filter(|record| params.where_clauses.iter().all(|c| matches_clause(record, c)))
            .collect();

        if let Some(order) = params.order_by.first() {
            rows.sort_by(|a, b| {
                let ord = compare(
                    &field_value(a, &order.field_name),
                    &field_value(b, &order.field_name),
                );
                match order.sort_type {
                    SortType::Asc => ord,
                    SortType::Desc => ord.reverse(),
                }
            });
        }

        let data = rows
            .into_iter()
            .skip(params.paging_info.offset as usize)
            .take(params.paging_info.limit as usize)
            .collect();
        Ok(FetchResponse {
            success: true,
            data: Some(data),
            message: None,
        })
    }

    async fn get_record_by_id(
        &self,
        table: &str,
        id: i64,
        params: &GetParams,
    ) -> Result<GetResponse> {
        let body = json!({"id": id, "params": params});
        if let Some(canned) = self.begin(MockOp::Get, table, &body)? {
            return Ok(canned);
        }
        let state = self.state.lock().unwrap();
        let data = state
            .tables
            .get(table)
            .and_then(|rows| rows.get(&id))
            .map(|fields| Record::new(id, fields.clone()));
        Ok(GetResponse {
            success: true,
            data,
            message: None,
        })
    }

    async fn create_record(&self, table: &str, params: &MutateParams) -> Result<MutateResponse> {
        if let Some(canned) = self.begin(MockOp::Create, table, params)? {
            return Ok(canned);
        }
        let mut state = self.state.lock().unwrap();
        let mut results = Vec::with_capacity(params.records.len());
        for fields in &params.records {
            state.next_id += 1;
            let id = state.next_id;
            state
                .tables
                .entry(table.to_string())
                .or_default()
                .insert(id, fields.clone());
            results.push(RecordResult {
                success: true,
                data: Some(Record::new(id, fields.clone())),
                message: None,
                errors: Vec::new(),
            });
        }
        Ok(MutateResponse {
            success: true,
            results: Some(results),
            data: None,
            message: None,
        })
    }

    async fn update_record(&self, table: &str, params: &MutateParams) -> Result<MutateResponse> {
        if let Some(canned) = self.begin(MockOp::Update, table, params)? {
            return Ok(canned);
        }
        let mut state = self.state.lock().unwrap();
        let rows = state.tables.entry(table.to_string()).or_default();
        let mut results = Vec::with_capacity(params.records.len());
        for record in &params.records {
            let existing = record
                .get("Id")
                .and_then(Value::as_i64)
                .and_then(|id| rows.get_mut(&id).map(|fields| (id, fields)));
            let Some((id, fields)) = existing else {
                results.push(RecordResult {
                    success: false,
                    data: None,
                    message: Some("Record does not exist".to_string()),
                    errors: Vec::new(),
                });
                continue;
            };
            for (name, value) in record.iter().filter(|(name, _)| name.as_str() != "Id") {
                fields.insert(name.clone(), value.clone());
            }
            results.push(RecordResult {
                success: true,
                data: Some(Record::new(id, fields.clone())),
                message: None,
                errors: Vec::new(),
            });
        }
        Ok(MutateResponse {
            success: true,
            results: Some(results),
            data: None,
            message: None,
        })
    }

    async fn delete_record(&self, table: &str, params: &DeleteParams) -> Result<DeleteResponse> {
        if let Some(canned) = self.begin(MockOp::Delete, table, params)? {
            return Ok(canned);
        }
        let mut state = self.state.lock().unwrap();
        let rows = state.tables.entry(table.to_string()).or_default();
        let results = params
            .record_ids
            .iter()
            .map(|id| match rows.remove(id) {
                Some(_) => DeleteResult {
                    success: true,
                    message: None,
                },
                None => DeleteResult {
                    success: false,
                    message: Some("Record does not exist".to_string()),
                },
            })
            .collect();
        Ok(DeleteResponse {
            success: true,
            results: Some(results),
            message: None,
        })
    }
}

fn field_value(record: &Record, field: &str) -> Value {
    if field == "Id" {
        return Value::from(record.id);
    }
    match record.fields.get(field) {
        // Lookups compare by their Id.
        Some(Value::Object(obj)) => obj.get("Id").cloned().unwrap_or(Value::Null),
        Some(value) => value.clone(),
        None => Value::Null,
    }
}

fn matches_clause(record: &Record, clause: &WhereClause) -> bool {
    let actual = field_value(record, &clause.field_name);
    let hit = clause.values.iter().any(|expected| match clause.operator {
        Operator::EqualTo => loose_eq(&actual, expected),
        Operator::NotEqualTo => !loose_eq(&actual, expected),
        Operator::Contains => as_text(&actual)
            .to_lowercase()
            .contains(&as_text(expected).to_lowercase()),
        Operator::GreaterThan => compare(&actual, expected) == Ordering::Greater,
        Operator::LessThan => compare(&actual, expected) == Ordering::Less,
    });
    hit == clause.include
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => as_text(a) == as_text(b),
    }
}

fn compare(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        _ => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => as_text(a).cmp(&as_text(b)),
        },
    }
}
