//! Client contract for the hosted record store.
//!
//! The store exposes five record operations per table (fetch, get by id,
//! create, update, delete), each answering with a `success` flag plus data
//! or a message. This crate owns:
//! - the wire models ([`models`])
//! - the [`RecordClient`] trait the repository is written against
//! - [`HttpRecordClient`], the reqwest transport
//! - `MockRecordClient` behind the `test-utils` feature

#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod client;
pub mod errors;
pub mod http;
pub mod models;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use client::RecordClient;
pub use errors::{ClientError, Result};
pub use http::{HttpClientConfig, HttpRecordClient};
pub use models::{
    DeleteParams, DeleteResponse, DeleteResult, FetchParams, FetchResponse, FieldError,
    FieldSpec, GetParams, GetResponse, MutateParams, MutateResponse, Operator, OrderBy,
    PagingInfo, Record, RecordResult, SortType, WhereClause,
};
