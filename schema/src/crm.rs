//! Built-in CRM entity table.
//!
//! One entry per backend table. Audit columns (`CreatedOn`, `ModifiedBy`,
//! `created_date_c`, ...) are fetched for display and never written.

use crate::field::FieldDescriptor as F;
use crate::field::FieldKind::{Boolean, Date, Decimal, Number, Reference, String as Text};
use crate::registry::{EntitySchema, SortDirection};

pub const CONTACT: &str = "contact";
pub const COMPANY: &str = "company";
pub const DEAL: &str = "deal";
pub const STAGE: &str = "stage";
pub const QUOTE: &str = "quote";
pub const QUOTE_ITEM: &str = "quote_item";
pub const SALES_ORDER: &str = "sales_order";
pub const TASK: &str = "task";
pub const ACTIVITY: &str = "activity";
pub const NOTE: &str = "note";

/// Every built-in schema.
pub fn schemas() -> Vec<EntitySchema> {
    vec![
        contact(),
        company(),
        deal(),
        stage(),
        quote(),
        quote_item(),
        sales_order(),
        task(),
        activity(),
        note(),
    ]
}

fn with_audit_dates(schema: EntitySchema) -> EntitySchema {
    schema
        .field(F::read_only("created_date_c", Date))
        .field(F::read_only("modified_date_c", Date))
        .created_at("created_date_c")
}

fn with_system_audit(schema: EntitySchema) -> EntitySchema {
    schema
        .field(F::read_only("CreatedOn", Date))
        .field(F::read_only("CreatedBy", Reference))
        .field(F::read_only("ModifiedOn", Date))
        .field(F::read_only("ModifiedBy", Reference))
        .created_at("CreatedOn")
}

pub fn contact() -> EntitySchema {
    with_audit_dates(
        EntitySchema::new(CONTACT, "contact_c")
            .field(F::writable("first_name_c", Text).required())
            .field(F::writable("last_name_c", Text))
            .field(F::writable("email_c", Text))
            .field(F::writable("phone_c", Text))
            .field(F::writable("title_c", Text))
            .field(F::writable("department_c", Text))
            .field(F::reference("company_c", "name_c"))
            .field(F::writable("address_c", Text))
            .field(F::writable("city_c", Text))
            .field(F::writable("state_c", Text))
            .field(F::writable("postal_code_c", Text))
            .field(F::writable("country_c", Text))
            .field(F::writable("date_of_birth_c", Date))
            .field(F::writable("linkedin_profile_c", Text))
            .field(F::writable("twitter_handle_c", Text))
            .field(F::writable("status_c", Text))
            .field(F::writable("source_c", Text))
            .field(F::writable("tags_c", Text))
            .field(F::writable("notes_c", Text)),
    )
}

pub fn company() -> EntitySchema {
    with_system_audit(
        EntitySchema::new(COMPANY, "company_c")
            .field(F::writable("name_c", Text).required())
            .field(F::writable("Tags", Text))
            .field(F::writable("industry_c", Text))
            .field(F::writable("website_c", Text))
            .field(F::writable("phone_c", Text))
            .field(F::writable("email_c", Text))
            .field(F::writable("address_c", Text))
            .field(F::writable("employees_c", Number))
            .field(F::writable("revenue_c", Decimal))
            .field(F::writable("notes_c", Text))
            .field(F::read_only("Owner", Reference)),
    )
}

pub fn deal() -> EntitySchema {
    with_system_audit(
        EntitySchema::new(DEAL, "deal_c")
            .field(F::read_only("Name", Text))
            .field(F::writable("Tags", Text))
            .field(F::writable("title_c", Text).required())
            .field(F::writable("value_c", Decimal))
            .field(F::writable("stage_c", Text))
            .field(F::writable("notes_c", Text))
            .field(F::reference("contactId_c", "Name")),
    )
}

pub fn stage() -> EntitySchema {
    with_audit_dates(
        EntitySchema::new(STAGE, "stage_c")
            .field(F::writable("name_c", Text).required())
            .field(F::writable("description_c", Text))
            .field(F::writable("order_c", Number))
            .field(F::writable("color_c", Text))
            .field(F::writable("probability_c", Decimal))
            .field(F::writable("is_active_c", Boolean))
            .field(F::writable("is_won_c", Boolean))
            .field(F::writable("is_lost_c", Boolean)),
    )
    .order_by("order_c", SortDirection::Asc)
    .filter_eq("is_active_c", true)
}

pub fn quote() -> EntitySchema {
    EntitySchema::new(QUOTE, "quote_c")
        .field(F::read_only("Name", Text))
        .field(F::writable("quoteNumber_c", Text).required())
        .field(F::writable("status_c", Text))
        .field(F::writable("subtotal_c", Decimal))
        .field(F::writable("taxRate_c", Decimal))
        .field(F::writable("taxAmount_c", Decimal))
        .field(F::writable("total_c", Decimal))
        .field(F::writable("validUntil_c", Date))
        .field(F::writable("notes_c", Text))
        .field(F::reference("customerId_c", "Name"))
        .field(F::read_only("CreatedOn", Date))
        .field(F::read_only("ModifiedOn", Date))
        .created_at("CreatedOn")
}

pub fn quote_item() -> EntitySchema {
    EntitySchema::new(QUOTE_ITEM, "quote_item_c")
        .field(F::reference("quote_c", "Name").required())
        .field(F::writable("product_name_c", Text))
        .field(F::writable("description_c", Text))
        .field(F::writable("quantity_c", Number))
        .field(F::writable("unit_price_c", Decimal))
        .field(F::writable("discount_c", Decimal))
        .field(F::writable("line_total_c", Decimal))
        .field(F::writable("notes_c", Text))
        .order_by("Id", SortDirection::Asc)
}

pub fn sales_order() -> EntitySchema {
    EntitySchema::new(SALES_ORDER, "sales_order_c")
        .field(F::writable("Name", Text))
        .field(F::writable("order_date_c", Date))
        .field(F::writable("total_amount_c", Decimal))
        .field(F::writable("status_c", Text))
        .field(F::reference("company_id_c", "Name"))
        .field(F::reference("contact_id_c", "Name"))
        .field(F::reference("quote_id_c", "Name"))
        .order_by("Id", SortDirection::Desc)
}

pub fn task() -> EntitySchema {
    with_audit_dates(
        EntitySchema::new(TASK, "task_c")
            .field(F::writable("title_c", Text).required())
            .field(F::writable("description_c", Text))
            .field(F::writable("status_c", Text))
            .field(F::writable("priority_c", Text))
            .field(F::writable("due_date_c", Date))
            .field(F::writable("assigned_to_c", Text))
            .field(F::reference("company_c", "name_c"))
            .field(F::reference("contact_c", "first_name_c"))
            .field(F::reference("deal_c", "name_c"))
            .field(F::writable("category_c", Text))
            .field(F::writable("estimated_hours_c", Decimal))
            .field(F::writable("actual_hours_c", Decimal))
            .field(F::writable("tags_c", Text))
            .field(F::writable("notes_c", Text)),
    )
}

pub fn activity() -> EntitySchema {
    with_audit_dates(
        EntitySchema::new(ACTIVITY, "activity_c")
            .field(F::writable("title_c", Text).required())
            .field(F::writable("type_c", Text))
            .field(F::writable("description_c", Text))
            .field(F::writable("status_c", Text))
            .field(F::writable("priority_c", Text))
            .field(F::writable("scheduled_date_c", Date))
            .field(F::writable("duration_minutes_c", Number))
            .field(F::writable("location_c", Text))
            .field(F::reference("company_c", "name_c"))
            .field(F::reference("contact_c", "first_name_c"))
            .field(F::reference("deal_c", "name_c"))
            .field(F::writable("assigned_to_c", Text))
            .field(F::writable("outcome_c", Text))
            .field(F::writable("notes_c", Text))
            .field(F::writable("tags_c", Text)),
    )
    .order_by("scheduled_date_c", SortDirection::Desc)
}

pub fn note() -> EntitySchema {
    with_audit_dates(
        EntitySchema::new(NOTE, "note_c")
            .field(F::writable("title_c", Text))
            .field(F::writable("content_c", Text).required())
            .field(F::writable("category_c", Text))
            .field(F::writable("priority_c", Text))
            .field(F::writable("is_private_c", Boolean))
            .field(F::reference("company_c", "name_c"))
            .field(F::reference("contact_c", "first_name_c"))
            .field(F::reference("deal_c", "name_c"))
            .field(F::reference("task_c", "title_c"))
            .field(F::reference("activity_c", "title_c"))
            .field(F::writable("author_c", Text))
            .field(F::writable("tags_c", Text))
            .field(F::writable("attachments_c", Text)),
    )
}
