//! Options for `Repository::list`.

use crm_record_client::{Operator, OrderBy, WhereClause};
use serde_json::Value;

/// Ordering, filtering and paging for one `list` call.
///
/// `filter: None` means "use the schema's default filter"; an explicit empty
/// filter (see [`ListOptions::unfiltered`]) lists everything. `limit: None`
/// falls back to the repository's page limit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListOptions {
    pub order_by: Vec<OrderBy>,
    pub filter: Option<Vec<WhereClause>>,
    pub limit: Option<u32>,
    pub offset: u32,
}

impl ListOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn order(mut self, order: OrderBy) -> Self {
        self.order_by.push(order);
        self
    }

    pub fn where_clause(mut self, clause: WhereClause) -> Self {
        self.filter.get_or_insert_with(Vec::new).push(clause);
        self
    }

    pub fn where_eq(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.where_clause(WhereClause::eq(field, value))
    }

    pub fn where_not(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.where_clause(WhereClause::new(field, Operator::NotEqualTo, value))
    }

    pub fn where_contains(self, field: impl Into<String>, text: impl Into<String>) -> Self {
        self.where_clause(WhereClause::new(field, Operator::Contains, text.into()))
    }

    /// Skip the schema's default filter.
    pub fn unfiltered(mut self) -> Self {
        self.filter.get_or_insert_with(Vec::new);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }
}
