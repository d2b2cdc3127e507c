//! Field descriptors

use serde::{Deserialize, Serialize};

/// How a field's raw value is coerced before it is sent to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Free text, picklist values, tags
    String,
    /// Integer; parsed from strings, NaN drops the field
    Number,
    /// Floating point; parsed from strings, NaN drops the field
    Decimal,
    /// ISO-8601 date or timestamp, passed through unchanged
    Date,
    /// Passed through as given
    Boolean,
    /// Lookup to another record; the integer `Id` is sent
    Reference,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Decimal => "decimal",
            Self::Date => "date",
            Self::Boolean => "boolean",
            Self::Reference => "reference",
        }
    }
}

/// Whether the client may send a field on create/update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldAccess {
    Writable,
    /// Fetched for display, owned by the backend (timestamps, audit users)
    ReadOnly,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub kind: FieldKind,
    pub required: bool,
    pub access: FieldAccess,
    /// Field of the referenced record requested alongside a lookup
    /// (e.g. `Name`), so the backend returns `{Id, Name}` objects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_display: Option<String>,
}

impl FieldDescriptor {
    /// A writable, optional field.
    pub fn writable(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            access: FieldAccess::Writable,
            reference_display: None,
        }
    }

    /// A backend-owned field that is fetched but never written.
    pub fn read_only(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            access: FieldAccess::ReadOnly,
            ..Self::writable(name, kind)
        }
    }

    /// A writable lookup field whose display column is fetched with it.
    pub fn reference(name: impl Into<String>, display: impl Into<String>) -> Self {
        Self {
            reference_display: Some(display.into()),
            ..Self::writable(name, FieldKind::Reference)
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_access(mut self, access: FieldAccess) -> Self {
        self.access = access;
        self
    }

    pub fn is_writable(&self) -> bool {
        self.access == FieldAccess::Writable
    }
}
