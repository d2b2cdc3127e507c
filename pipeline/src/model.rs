//! Typed views of the pipeline records.

use crm_record_client::Record;
use serde::Serialize;
use serde_json::Value;

/// How a deal points at its stage.
///
/// The backend stores this as a stage id, a stage name, or a lookup object
/// `{Id, Name}`. Matching tries `key` against stage ids first and only then
/// falls back to names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageRef {
    pub key: String,
    pub name: Option<String>,
}

impl StageRef {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: None,
        }
    }

    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) if !s.trim().is_empty() => Some(Self::new(s.trim())),
            Value::Number(n) => Some(Self::new(n.to_string())),
            Value::Object(obj) => {
                let name = obj
                    .get("Name")
                    .and_then(Value::as_str)
                    .map(str::to_string);
                let key = match obj.get("Id") {
                    Some(Value::Number(n)) => Some(n.to_string()),
                    Some(Value::String(s)) => Some(s.clone()),
                    _ => name.clone(),
                }?;
                Some(Self { key, name })
            }
            _ => None,
        }
    }

    pub fn matches_id(&self, stage: &Stage) -> bool {
        self.key == stage.id
    }

    pub fn matches_name(&self, stage: &Stage) -> bool {
        let same = |s: &str| s.eq_ignore_ascii_case(&stage.name);
        same(&self.key) || self.name.as_deref().is_some_and(same)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stage {
    pub id: String,
    pub name: String,
    pub order: i64,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probability: Option<f64>,
    pub is_won: bool,
    pub is_lost: bool,
}

impl Stage {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            order: 0,
            is_active: true,
            color: None,
            probability: None,
            is_won: false,
            is_lost: false,
        }
    }

    pub fn with_order(mut self, order: i64) -> Self {
        self.order = order;
        self
    }

    pub fn from_record(record: &Record) -> Self {
        let name = record
            .get_str("name_c")
            .or_else(|| record.get_str("Name"))
            .unwrap_or_default();
        Self {
            order: record.get_f64("order_c").map_or(0, |o| o as i64),
            is_active: record.get_bool("is_active_c").unwrap_or(true),
            color: record.get_str("color_c").map(str::to_string),
            probability: record.get_f64("probability_c"),
            is_won: record.get_bool("is_won_c").unwrap_or(false),
            is_lost: record.get_bool("is_lost_c").unwrap_or(false),
            ..Self::new(record.id.to_string(), name)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Deal {
    pub id: i64,
    pub title: String,
    pub value: Option<f64>,
    pub stage: Option<StageRef>,
    pub contact_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Deal {
    pub fn new(id: i64, stage: Option<StageRef>, value: Option<f64>) -> Self {
        Self {
            id,
            title: String::new(),
            value,
            stage,
            contact_id: None,
            contact_name: None,
            notes: None,
        }
    }

    pub fn from_record(record: &Record) -> Self {
        Self {
            title: record
                .get_str("title_c")
                .or_else(|| record.get_str("Name"))
                .unwrap_or_default()
                .to_string(),
            contact_id: record.reference_id("contactId_c"),
            contact_name: record.reference_name("contactId_c").map(str::to_string),
            notes: record.get_str("notes_c").map(str::to_string),
            ..Self::new(
                record.id,
                record.get("stage_c").and_then(StageRef::from_value),
                record.get_f64("value_c"),
            )
        }
    }
}

/// Just enough of a contact to label a deal card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactSummary {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl ContactSummary {
    pub fn from_record(record: &Record) -> Self {
        let full = [record.get_str("first_name_c"), record.get_str("last_name_c")]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        let name = if full.is_empty() {
            record.get_str("Name").unwrap_or_default().to_string()
        } else {
            full
        };
        Self {
            id: record.id,
            name,
            email: record.get_str("email_c").map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn record(value: Value) -> Record {
        serde_json::from_value(value).expect("record")
    }

    #[test]
    fn test_stage_ref_shapes() {
        assert_eq!(StageRef::from_value(&json!("lead")), Some(StageRef::new("lead")));
        assert_eq!(StageRef::from_value(&json!(3)), Some(StageRef::new("3")));
        assert_eq!(
            StageRef::from_value(&json!({"Id": 3, "Name": "Qualified"})),
            Some(StageRef {
                key: "3".to_string(),
                name: Some("Qualified".to_string())
            })
        );
        assert_eq!(StageRef::from_value(&json!(" ")), None);
        assert_eq!(StageRef::from_value(&json!({})), None);
    }

    #[test]
    fn test_name_match_ignores_case() {
        let stage = Stage::new("2", "Lead");
        assert!(StageRef::new("lead").matches_name(&stage));
        assert!(!StageRef::new("lead").matches_id(&stage));
        assert!(StageRef::new("2").matches_id(&stage));
    }

    #[test]
    fn test_stage_from_record_defaults() {
        let stage = Stage::from_record(&record(json!({
            "Id": 5, "name_c": "Won", "order_c": 4, "is_won_c": true
        })));
        assert_eq!(stage.id, "5");
        assert_eq!(stage.order, 4);
        assert!(stage.is_active);
        assert!(stage.is_won);
    }

    #[test]
    fn test_deal_from_record() {
        let deal = Deal::from_record(&record(json!({
            "Id": 1,
            "title_c": "Renewal",
            "value_c": "500",
            "stage_c": "qualified",
            "contactId_c": {"Id": 7, "Name": "Ada Lovelace"}
        })));
        assert_eq!(deal.value, Some(500.0));
        assert_eq!(deal.stage, Some(StageRef::new("qualified")));
        assert_eq!(deal.contact_id, Some(7));
        assert_eq!(deal.contact_name.as_deref(), Some("Ada Lovelace"));
    }

    #[test]
    fn test_contact_summary_name() {
        let contact = ContactSummary::from_record(&record(json!({
            "Id": 7, "first_name_c": "Ada", "last_name_c": "Lovelace"
        })));
        assert_eq!(contact.name, "Ada Lovelace");
        let contact = ContactSummary::from_record(&record(json!({"Id": 8, "Name": "Grace"})));
        assert_eq!(contact.name, "Grace");
    }
}
