//! Generic resource repository for CRM records.
//!
//! One [`Repository`] serves every entity kind in its schema registry:
//! `list`, `get_by_id`, `create`, `update` and `delete` shape payloads from
//! the schema and normalize backend answers into [`RepositoryError`].
//! The record client is injected at construction.

#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod errors;
pub mod options;
pub mod repository;
pub mod search;

pub use errors::{ErrorKind, RepositoryError, Result};
pub use options::ListOptions;
pub use repository::{DEFAULT_PAGE_LIMIT, Repository};
