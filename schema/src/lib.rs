//! Entity schema registry for CRM records.
//!
//! A single data-driven table maps each entity kind (`deal`, `company`, ...)
//! to its backend table and its field list. Payload shaping for create and
//! update goes through [`coerce`] so every entity follows the same rules:
//! empty values are dropped, numbers and references are parsed, and fields
//! the schema does not declare never reach the backend.

#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod coerce;
pub mod crm;
pub mod errors;
pub mod field;
pub mod registry;

pub use coerce::{build_payload, coerce, coerce_value};
pub use errors::{Result, SchemaError};
pub use field::{FieldAccess, FieldDescriptor, FieldKind};
pub use registry::{DefaultFilter, EntitySchema, SchemaRegistry, SortDirection};

/// Name of the backend-assigned identifier present on every record.
pub const ID_FIELD: &str = "Id";
