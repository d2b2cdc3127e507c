//! Generic CRUD over any registered entity kind.
//!
//! A single `list`, `get_by_id`, `create`, `update` or `delete` makes at most
//! one record-client call. Failures are logged once here, with entity, id
//! and operation, and then returned. Nothing is retried.

use std::sync::Arc;

use crm_record_client::{
    DeleteParams, FetchParams, FieldSpec, GetParams, MutateParams, MutateResponse, OrderBy,
    PagingInfo, Record, RecordClient, RecordResult, WhereClause,
};
use crm_schema::{EntitySchema, ID_FIELD, SchemaRegistry, SortDirection, build_payload};
use serde_json::{Map, Value};

use crate::errors::{RepositoryError, Result};
use crate::options::ListOptions;

/// Default page size for `list` when the caller sets no limit.
pub const DEFAULT_PAGE_LIMIT: u32 = 100;

#[derive(Clone)]
pub struct Repository {
    client: Arc<dyn RecordClient>,
    registry: Arc<SchemaRegistry>,
    page_limit: u32,
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("kinds", &self.registry.kinds().collect::<Vec<_>>())
            .field("page_limit", &self.page_limit)
            .field("client_ready", &self.client.is_ready())
            .finish()
    }
}

impl Repository {
    pub fn new(client: Arc<dyn RecordClient>, registry: Arc<SchemaRegistry>) -> Self {
        Self {
            client,
            registry,
            page_limit: DEFAULT_PAGE_LIMIT,
        }
    }

    /// Repository over the built-in CRM schemas.
    pub fn crm(client: Arc<dyn RecordClient>) -> Self {
        Self::new(client, Arc::new(SchemaRegistry::crm()))
    }

    pub fn with_page_limit(mut self, page_limit: u32) -> Self {
        self.page_limit = page_limit.max(1);
        self
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn page_limit(&self) -> u32 {
        self.page_limit
    }

    /// Fetch one page of records of `kind`.
    ///
    /// Ordering: the caller's `order_by`, else the schema's default order.
    /// Filtering: the caller's filter, else the schema's default filter.
    pub async fn list(&self, kind: &str, options: &ListOptions) -> Result<Vec<Record>> {
        self.list_inner(kind, options)
            .await
            .inspect(|records| {
                tracing::debug!(
                    entity = kind,
                    operation = "list",
                    count = records.len(),
                    "listed records"
                );
            })
            .inspect_err(|e| log_failure(kind, None, "list", e))
    }

    async fn list_inner(&self, kind: &str, options: &ListOptions) -> Result<Vec<Record>> {
        let schema = self.registry.get_schema(kind)?;
        self.ensure_ready()?;

        let params = FetchParams {
            fields: projection(schema),
            where_clauses: options
                .filter
                .clone()
                .unwrap_or_else(|| default_filter(schema)),
            order_by: if options.order_by.is_empty() {
                default_order(schema)
            } else {
                options.order_by.clone()
            },
            paging_info: PagingInfo {
                limit: options.limit.unwrap_or(self.page_limit),
                offset: options.offset,
            },
        };

        let resp = self.client.fetch_records(schema.table(), &params).await?;
        if !resp.success {
            return Err(RepositoryError::transport(
                resp.message
                    .unwrap_or_else(|| format!("failed to fetch {kind} records")),
            ));
        }
        Ok(resp.data.unwrap_or_default())
    }

    /// Fetch every record of `kind` matching `options`, page by page.
    ///
    /// Stops at the first short page, or when a page starts with the same
    /// record as the one before it (a backend ignoring `offset`). Each page
    /// is a separate `list` call.
    pub async fn list_all(&self, kind: &str, options: &ListOptions) -> Result<Vec<Record>> {
        let page = options.limit.unwrap_or(self.page_limit).max(1);
        let mut options = options.clone().limit(page);
        let mut all = Vec::new();
        let mut previous_first: Option<i64> = None;
        loop {
            let batch = self.list(kind, &options).await?;
            let first = batch.first().map(|r| r.id);
            if first.is_some() && first == previous_first {
                tracing::warn!(
                    entity = kind,
                    offset = options.offset,
                    "page repeated the previous one; stopping"
                );
                return Ok(all);
            }
            let short = batch.len() < page as usize;
            all.extend(batch);
            if short {
                return Ok(all);
            }
            previous_first = first;
            options.offset = options.offset.saturating_add(page);
        }
    }

    pub async fn get_by_id(&self, kind: &str, id: i64) -> Result<Record> {
        self.get_inner(kind, id)
            .await
            .inspect(|_| tracing::debug!(entity = kind, id, operation = "get", "fetched record"))
            .inspect_err(|e| log_failure(kind, Some(id), "get", e))
    }

    async fn get_inner(&self, kind: &str, id: i64) -> Result<Record> {
        let schema = self.registry.get_schema(kind)?;
        self.ensure_ready()?;

        let params = GetParams {
            fields: projection(schema),
        };
        let resp = self
            .client
            .get_record_by_id(schema.table(), id, &params)
            .await?;
        if !resp.success {
            return Err(RepositoryError::transport(
                resp.message
                    .unwrap_or_else(|| format!("failed to fetch {kind} {id}")),
            ));
        }
        resp.data.ok_or_else(|| RepositoryError::NotFound {
            kind: kind.to_string(),
            id,
        })
    }

    /// Create one record from caller-supplied fields.
    ///
    /// Unknown field names are ignored. If nothing survives coercion the
    /// call fails with `Validation` before reaching the backend.
    pub async fn create(&self, kind: &str, fields: &Map<String, Value>) -> Result<Record> {
        self.create_inner(kind, fields)
            .await
            .inspect(|record| {
                tracing::debug!(
                    entity = kind,
                    id = record.id,
                    operation = "create",
                    "created record"
                );
            })
            .inspect_err(|e| log_failure(kind, None, "create", e))
    }

    async fn create_inner(&self, kind: &str, fields: &Map<String, Value>) -> Result<Record> {
        let schema = self.registry.get_schema(kind)?;
        let payload = build_payload(schema, fields);
        if payload.is_empty() {
            return Err(RepositoryError::validation(format!(
                "no writable {kind} fields to create"
            )));
        }
        self.ensure_ready()?;

        let resp = self
            .client
            .create_record(schema.table(), &MutateParams::single(payload))
            .await?;
        mutation_record(resp, "create", kind)?.ok_or_else(|| {
            RepositoryError::transport(format!("create {kind} returned no record"))
        })
    }

    /// Partially update record `id`.
    ///
    /// The payload always carries `Id`; an update with no other surviving
    /// field is sent as-is and leaves the record unchanged.
    pub async fn update(&self, kind: &str, id: i64, fields: &Map<String, Value>) -> Result<Record> {
        self.update_inner(kind, id, fields)
            .await
            .inspect(|_| tracing::debug!(entity = kind, id, operation = "update", "updated record"))
            .inspect_err(|e| log_failure(kind, Some(id), "update", e))
    }

    async fn update_inner(
        &self,
        kind: &str,
        id: i64,
        fields: &Map<String, Value>,
    ) -> Result<Record> {
        let schema = self.registry.get_schema(kind)?;
        self.ensure_ready()?;

        let changes = build_payload(schema, fields);
        let mut payload = changes.clone();
        payload.insert(ID_FIELD.to_string(), Value::from(id));

        let resp = self
            .client
            .update_record(schema.table(), &MutateParams::single(payload))
            .await?;
        Ok(mutation_record(resp, "update", kind)?.unwrap_or_else(|| Record::new(id, changes)))
    }

    pub async fn delete(&self, kind: &str, id: i64) -> Result<()> {
        self.delete_inner(kind, id)
            .await
            .inspect(|_| tracing::debug!(entity = kind, id, operation = "delete", "deleted record"))
            .inspect_err(|e| log_failure(kind, Some(id), "delete", e))
    }

    async fn delete_inner(&self, kind: &str, id: i64) -> Result<()> {
        let schema = self.registry.get_schema(kind)?;
        self.ensure_ready()?;

        let resp = self
            .client
            .delete_record(schema.table(), &DeleteParams { record_ids: vec![id] })
            .await?;
        if !resp.success {
            return Err(RepositoryError::transport(
                resp.message
                    .unwrap_or_else(|| format!("failed to delete {kind} {id}")),
            ));
        }
        match resp.results.unwrap_or_default().into_iter().find(|r| !r.success) {
            Some(failed) => Err(RepositoryError::DeleteFailed {
                reason: failed
                    .message
                    .unwrap_or_else(|| format!("{kind} {id} was not deleted")),
            }),
            None => Ok(()),
        }
    }

    fn ensure_ready(&self) -> Result<()> {
        if self.client.is_ready() {
            Ok(())
        } else {
            Err(RepositoryError::ClientUnavailable)
        }
    }
}

fn log_failure(kind: &str, id: Option<i64>, operation: &'static str, err: &RepositoryError) {
    tracing::error!(
        entity = kind,
        id = ?id,
        operation,
        error_kind = err.kind().as_str(),
        error = %err,
        "repository operation failed"
    );
}

/// Every declared field; lookups also request their display field.
fn projection(schema: &EntitySchema) -> Vec<FieldSpec> {
    schema
        .fields()
        .iter()
        .map(|f| match &f.reference_display {
            Some(display) => FieldSpec::with_reference(&f.name, display),
            None => FieldSpec::new(&f.name),
        })
        .collect()
}

fn default_order(schema: &EntitySchema) -> Vec<OrderBy> {
    schema
        .default_order()
        .map(|(field, direction)| match direction {
            SortDirection::Asc => OrderBy::asc(field),
            SortDirection::Desc => OrderBy::desc(field),
        })
        .into_iter()
        .collect()
}

fn default_filter(schema: &EntitySchema) -> Vec<WhereClause> {
    schema
        .default_filter()
        .iter()
        .map(|f| WhereClause::eq(&f.field, f.value.clone()))
        .collect()
}

/// Interpret a create/update response for a batch of one.
///
/// `Ok(None)` means the backend accepted the write without echoing a record.
fn mutation_record(resp: MutateResponse, operation: &str, kind: &str) -> Result<Option<Record>> {
    if !resp.success {
        return Err(RepositoryError::transport(
            resp.message
                .unwrap_or_else(|| format!("failed to {operation} {kind}")),
        ));
    }
    match resp.results.and_then(|results| results.into_iter().next()) {
        Some(result) if !result.success => Err(RepositoryError::validation(rejection_message(
            result, operation, kind,
        ))),
        Some(result) => Ok(result.data.or(resp.data)),
        None => Ok(resp.data),
    }
}

/// `fieldLabel: message` pairs, else the record-level message.
fn rejection_message(result: RecordResult, operation: &str, kind: &str) -> String {
    if !result.errors.is_empty() {
        return result
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.field_label, e.message))
            .collect::<Vec<_>>()
            .join("; ");
    }
    result
        .message
        .unwrap_or_else(|| format!("{kind} {operation} was rejected"))
}
