//! Plain-text and JSON rendering.

use std::io::Write;

use crm_pipeline::PipelineBoard;
use crm_record_client::Record;
use crm_schema::{EntitySchema, FieldAccess, SchemaRegistry};
use serde::Serialize;
use serde_json::Value;

use crate::errors::Result;

pub fn write_json<T: Serialize + ?Sized>(out: &mut dyn Write, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

pub fn write_kinds(out: &mut dyn Write, registry: &SchemaRegistry) -> Result<()> {
    for kind in registry.kinds() {
        let schema = registry.get_schema(kind)?;
        writeln!(
            out,
            "{kind:<12} {:<16} {} fields",
            schema.table(),
            schema.fields().len()
        )?;
    }
    Ok(())
}

pub fn write_schema(out: &mut dyn Write, schema: &EntitySchema) -> Result<()> {
    writeln!(out, "{} ({})", schema.kind(), schema.table())?;
    for field in schema.fields() {
        let mut flags = Vec::new();
        if field.required {
            flags.push("required".to_string());
        }
        if field.access == FieldAccess::ReadOnly {
            flags.push("read-only".to_string());
        }
        if let Some(display) = &field.reference_display {
            flags.push(format!("shows {display}"));
        }
        writeln!(
            out,
            "  {:<24} {:<10} {}",
            field.name,
            field.kind.as_str(),
            flags.join(", ")
        )?;
    }
    if let Some((field, direction)) = schema.default_order() {
        writeln!(out, "  order: {field} {}", direction.as_str())?;
    }
    for filter in schema.default_filter() {
        writeln!(out, "  filter: {} = {}", filter.field, filter.value)?;
    }
    Ok(())
}

pub fn write_records<'a>(
    out: &mut dyn Write,
    schema: &EntitySchema,
    records: impl IntoIterator<Item = &'a Record>,
) -> Result<()> {
    let mut count = 0usize;
    for record in records {
        write_record(out, schema, record)?;
        count += 1;
    }
    writeln!(out, "{count} {}", if count == 1 { "record" } else { "records" })?;
    Ok(())
}

pub fn write_record(out: &mut dyn Write, schema: &EntitySchema, record: &Record) -> Result<()> {
    writeln!(out, "#{}", record.id)?;
    for field in schema.fields() {
        if let Some(value) = record.get(&field.name) {
            writeln!(out, "  {:<24} {}", field.name, display_value(value))?;
        }
    }
    Ok(())
}

pub fn write_board(out: &mut dyn Write, board: &PipelineBoard) -> Result<()> {
    for bucket in &board.snapshot.buckets {
        writeln!(
            out,
            "{} [{}] {} deals, total {:.2}",
            bucket.stage.name,
            bucket.stage.id,
            bucket.deals.len(),
            bucket.total
        )?;
        for deal in &bucket.deals {
            let contact = board
                .contact_for(deal)
                .map(|c| c.name.as_str())
                .or(deal.contact_name.as_deref())
                .unwrap_or("-");
            writeln!(
                out,
                "  #{:<6} {:<32} {:>12.2}  {contact}",
                deal.id,
                deal.title,
                deal.value.unwrap_or_default()
            )?;
        }
    }
    if !board.snapshot.unassigned.is_empty() {
        writeln!(
            out,
            "(no stage) {} deals",
            board.snapshot.unassigned.len()
        )?;
    }
    writeln!(out, "total {:.2}", board.total())?;
    Ok(())
}

/// Lookups render as `Name (#Id)`, strings without quotes.
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Object(obj) => match (obj.get("Name").and_then(Value::as_str), obj.get("Id")) {
            (Some(name), Some(id)) => format!("{name} (#{id})"),
            (Some(name), None) => name.to_string(),
            _ => value.to_string(),
        },
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crm_pipeline::{ContactSummary, Deal, Stage, StageRef};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn render(f: impl FnOnce(&mut dyn Write) -> Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).expect("render");
        String::from_utf8(buf).expect("utf8")
    }

    #[test]
    fn test_display_value() {
        assert_eq!(display_value(&json!("Acme")), "Acme");
        assert_eq!(display_value(&json!({"Id": 7, "Name": "Ada"})), "Ada (#7)");
        assert_eq!(display_value(&json!(12.5)), "12.5");
    }

    #[test]
    fn test_write_records_in_schema_order() {
        let registry = SchemaRegistry::crm();
        let schema = registry.get_schema("company").expect("company");
        let record: Record = serde_json::from_value(json!({
            "Id": 3, "email_c": "a@b.com", "name_c": "Acme", "employees_c": null
        }))
        .expect("record");

        let text = render(|out| write_records(out, schema, [&record]));
        assert_eq!(
            text,
            format!("#3\n  {:<24} Acme\n  {:<24} a@b.com\n1 record\n", "name_c", "email_c")
        );
    }

    #[test]
    fn test_write_board() {
        let stages = vec![Stage::new("lead", "Lead"), Stage::new("won", "Won")];
        let mut deal = Deal::new(1, Some(StageRef::new("lead")), Some(1200.0));
        deal.title = "Upsell".to_string();
        deal.contact_id = Some(7);
        let board = PipelineBoard::new(
            &stages,
            &[deal],
            vec![ContactSummary {
                id: 7,
                name: "Ada Lovelace".to_string(),
                email: None,
            }],
        );

        let text = render(|out| write_board(out, &board));
        assert!(text.starts_with("Lead [lead] 1 deals, total 1200.00\n"));
        assert!(text.contains("Ada Lovelace"));
        assert!(text.contains("Won [won] 0 deals, total 0.00\n"));
        assert!(text.ends_with("total 1200.00\n"));
    }
}
