//! Entity schemas and the registry that maps entity kinds to them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ID_FIELD;
use crate::errors::{Result, SchemaError};
use crate::field::{FieldAccess, FieldDescriptor};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    #[serde(rename = "ASC")]
    Asc,
    #[serde(rename = "DESC")]
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Equality filter applied to `list` when the caller supplies none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultFilter {
    pub field: String,
    pub value: Value,
}

/// Declarative description of one entity kind.
///
/// Field names are unique and `Id` is never writable; both hold by
/// construction through [`EntitySchema::field`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntitySchema {
    kind: String,
    table: String,
    fields: Vec<FieldDescriptor>,
    created_field: Option<String>,
    default_order: Option<(String, SortDirection)>,
    default_filter: Vec<DefaultFilter>,
}

impl EntitySchema {
    pub fn new(kind: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            table: table.into(),
            fields: Vec::new(),
            created_field: None,
            default_order: None,
            default_filter: Vec::new(),
        }
    }

    /// Append a field descriptor.
    ///
    /// A descriptor whose name is already present replaces the earlier one
    /// in place. `Id` is always stored read-only.
    pub fn field(mut self, mut descriptor: FieldDescriptor) -> Self {
        if descriptor.name == ID_FIELD {
            descriptor.access = FieldAccess::ReadOnly;
        }
        match self.fields.iter_mut().find(|f| f.name == descriptor.name) {
            Some(existing) => *existing = descriptor,
            None => self.fields.push(descriptor),
        }
        self
    }

    /// Declare the creation-timestamp field (newest-first default order).
    pub fn created_at(mut self, field: impl Into<String>) -> Self {
        self.created_field = Some(field.into());
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.default_order = Some((field.into(), direction));
        self
    }

    pub fn filter_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.default_filter.push(DefaultFilter {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Backend resource table name
    pub fn table(&self) -> &str {
        &self.table
    }

    /// All declared fields in declaration order (the fetch projection).
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn writable_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| f.is_writable())
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.writable_fields().filter(|f| f.required)
    }

    pub fn get_field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn created_field(&self) -> Option<&str> {
        self.created_field.as_deref()
    }

    /// Ordering used when the caller does not specify one.
    ///
    /// An explicitly declared order wins over the creation timestamp.
    pub fn default_order(&self) -> Option<(&str, SortDirection)> {
        if let Some((field, direction)) = &self.default_order {
            return Some((field.as_str(), *direction));
        }
        self.created_field
            .as_deref()
            .map(|field| (field, SortDirection::Desc))
    }

    pub fn default_filter(&self) -> &[DefaultFilter] {
        &self.default_filter
    }
}

/// Maps entity kinds to their schemas.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: BTreeMap<String, EntitySchema>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in CRM entity.
    pub fn crm() -> Self {
        let mut registry = Self::new();
        for schema in crate::crm::schemas() {
            registry.register(schema);
        }
        registry
    }

    /// Register a schema, returning the one it replaced (if any).
    pub fn register(&mut self, schema: EntitySchema) -> Option<EntitySchema> {
        self.schemas.insert(schema.kind.clone(), schema)
    }

    pub fn get_schema(&self, kind: &str) -> Result<&EntitySchema> {
        self.schemas
            .get(kind)
            .ok_or_else(|| SchemaError::unknown_kind(kind))
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}
