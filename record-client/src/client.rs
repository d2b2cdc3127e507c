//! `RecordClient` trait
//!
//! Implementations:
//! - `HttpRecordClient` - reqwest transport against the hosted store
//! - `MockRecordClient` (feature `test-utils`) - in-memory tables for tests
//!
//! The repository receives an `Arc<dyn RecordClient>` at construction, so
//! there is no process-wide client handle.

use async_trait::async_trait;

use crate::errors::Result;
use crate::models::{
    DeleteParams, DeleteResponse, FetchParams, FetchResponse, GetParams, GetResponse,
    MutateParams, MutateResponse,
};

#[async_trait]
pub trait RecordClient: Send + Sync {
    /// Whether the client can issue requests (credentials present).
    fn is_ready(&self) -> bool {
        true
    }

    async fn fetch_records(&self, table: &str, params: &FetchParams) -> Result<FetchResponse>;

    async fn get_record_by_id(
        &self,
        table: &str,
        id: i64,
        params: &GetParams,
    ) -> Result<GetResponse>;

    async fn create_record(&self, table: &str, params: &MutateParams) -> Result<MutateResponse>;

    /// Mirrors `create_record`; every record carries its `Id`.
    async fn update_record(&self, table: &str, params: &MutateParams) -> Result<MutateResponse>;

    async fn delete_record(&self, table: &str, params: &DeleteParams) -> Result<DeleteResponse>;
}
