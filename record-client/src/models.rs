//! Wire models for the record store API.
//!
//! Field names follow the store's JSON conventions (`Id`, `FieldName`,
//! `pagingInfo`, `RecordIds`, ...), hence the explicit renames.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ─────────────────────────────────────────────────────────────────────────────
// Records
// ─────────────────────────────────────────────────────────────────────────────

/// A stored record: backend-assigned `Id` plus named fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "Id")]
    pub id: i64,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Record {
    pub fn new(id: i64, fields: Map<String, Value>) -> Self {
        Self { id, fields }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field).filter(|v| !v.is_null())
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    /// Numeric value, accepting numbers and numeric strings. Non-finite
    /// values (`"NaN"`, `"inf"`) count as absent.
    pub fn get_f64(&self, field: &str) -> Option<f64> {
        let value = match self.get(field)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        };
        value.filter(|f| f.is_finite())
    }

    pub fn get_bool(&self, field: &str) -> Option<bool> {
        self.get(field).and_then(Value::as_bool)
    }

    /// Id of a lookup field, which arrives either as a bare id or as an
    /// `{Id, Name}` object.
    pub fn reference_id(&self, field: &str) -> Option<i64> {
        match self.get(field)? {
            Value::Object(obj) => obj.get("Id").and_then(value_as_i64),
            other => value_as_i64(other),
        }
    }

    /// Display value of an expanded lookup field.
    pub fn reference_name(&self, field: &str) -> Option<&str> {
        self.get(field)?
            .as_object()?
            .get("Name")
            .and_then(Value::as_str)
    }
}

fn value_as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Request parameters
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldName {
    #[serde(rename = "Name")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceField {
    pub field: FieldName,
}

/// One entry of a fetch projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub field: FieldName,
    #[serde(
        rename = "referenceField",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub reference_field: Option<ReferenceField>,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            field: FieldName { name: name.into() },
            reference_field: None,
        }
    }

    /// Lookup field whose referenced record's `display` field is expanded.
    pub fn with_reference(name: impl Into<String>, display: impl Into<String>) -> Self {
        Self {
            field: FieldName { name: name.into() },
            reference_field: Some(ReferenceField {
                field: FieldName {
                    name: display.into(),
                },
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.field.name
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    EqualTo,
    NotEqualTo,
    Contains,
    GreaterThan,
    LessThan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhereClause {
    #[serde(rename = "FieldName")]
    pub field_name: String,
    #[serde(rename = "Operator")]
    pub operator: Operator,
    #[serde(rename = "Values")]
    pub values: Vec<Value>,
    /// `false` negates the clause
    #[serde(rename = "Include", default = "default_include")]
    pub include: bool,
}

fn default_include() -> bool {
    true
}

impl WhereClause {
    pub fn new(field: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Self {
            field_name: field.into(),
            operator,
            values: vec![value.into()],
            include: true,
        }
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Operator::EqualTo, value)
    }

    pub fn excluded(mut self) -> Self {
        self.include = false;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortType {
    #[serde(rename = "ASC")]
    Asc,
    #[serde(rename = "DESC")]
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    #[serde(rename = "fieldName")]
    pub field_name: String,
    #[serde(rename = "sorttype")]
    pub sort_type: SortType,
}

impl OrderBy {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field_name: field.into(),
            sort_type: SortType::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field_name: field.into(),
            sort_type: SortType::Desc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagingInfo {
    pub limit: u32,
    pub offset: u32,
}

impl Default for PagingInfo {
    fn default() -> Self {
        Self {
            limit: 100,
            offset: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchParams {
    pub fields: Vec<FieldSpec>,
    #[serde(rename = "where", default, skip_serializing_if = "Vec::is_empty")]
    pub where_clauses: Vec<WhereClause>,
    #[serde(rename = "orderBy", default, skip_serializing_if = "Vec::is_empty")]
    pub order_by: Vec<OrderBy>,
    #[serde(rename = "pagingInfo", default)]
    pub paging_info: PagingInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetParams {
    pub fields: Vec<FieldSpec>,
}

/// Body of create and update calls. Updates carry `Id` in each record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutateParams {
    pub records: Vec<Map<String, Value>>,
}

impl MutateParams {
    pub fn single(record: Map<String, Value>) -> Self {
        Self {
            records: vec![record],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteParams {
    #[serde(rename = "RecordIds")]
    pub record_ids: Vec<i64>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Responses
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Option<Vec<Record>>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Option<Record>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Per-field rejection reported by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    #[serde(rename = "fieldLabel")]
    pub field_label: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordResult {
    pub success: bool,
    #[serde(default)]
    pub data: Option<Record>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub errors: Vec<FieldError>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutateResponse {
    pub success: bool,
    #[serde(default)]
    pub results: Option<Vec<RecordResult>>,
    /// Some deployments answer single-record writes without `results`.
    #[serde(default)]
    pub data: Option<Record>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResult {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
    #[serde(default)]
    pub results: Option<Vec<DeleteResult>>,
    #[serde(default)]
    pub message: Option<String>,
}
