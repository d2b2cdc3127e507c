//! Command-line definitions for `crm`.
//!
//! ## Commands
//!
//! - `crm schema [KIND]`
//! - `crm list KIND [--limit N] [--offset N] [--order FIELD[:asc|desc]] [--where FIELD=VALUE]... [--search TEXT] [--json]`
//! - `crm get KIND ID [--json]`
//! - `crm create KIND FIELD=VALUE...`
//! - `crm update KIND ID FIELD=VALUE...`
//! - `crm delete KIND ID`
//! - `crm pipeline board [--json]`
//! - `crm pipeline move DEAL_ID STAGE_ID`

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "crm", version, about = "Work with CRM records from the command line")]
pub struct Cli {
    /// Config file (defaults to $CRM_CONFIG, then ~/.config/crm/crm.toml).
    #[arg(long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List entity kinds, or show the fields of one kind.
    Schema(SchemaArgs),
    /// List records of a kind.
    List(ListArgs),
    /// Show one record.
    Get(GetArgs),
    /// Create a record.
    Create(CreateArgs),
    /// Update fields of a record.
    Update(UpdateArgs),
    /// Delete a record.
    Delete(DeleteArgs),
    /// Pipeline board and stage moves.
    Pipeline(PipelineCli),
}

#[derive(Debug, Args)]
pub struct SchemaArgs {
    /// Entity kind (e.g. deal, company).
    pub kind: Option<String>,

    /// Output as JSON.
    #[arg(long = "json", short = 'j')]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    pub kind: String,

    /// Max records.
    #[arg(long = "limit")]
    pub limit: Option<u32>,

    #[arg(long = "offset", default_value_t = 0)]
    pub offset: u32,

    /// Sort field, optionally suffixed with :asc or :desc.
    #[arg(long = "order", value_name = "FIELD[:asc|desc]")]
    pub order: Vec<String>,

    /// Equality filter; repeatable.
    #[arg(long = "where", value_name = "FIELD=VALUE")]
    pub filters: Vec<String>,

    /// Case-insensitive text match over the kind's text fields.
    #[arg(long = "search")]
    pub search: Option<String>,

    /// Output as JSON.
    #[arg(long = "json", short = 'j')]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct GetArgs {
    pub kind: String,
    pub id: i64,

    /// Output as JSON.
    #[arg(long = "json", short = 'j')]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct CreateArgs {
    pub kind: String,

    /// Field assignments; values are parsed as JSON when possible.
    #[arg(value_name = "FIELD=VALUE", required = true)]
    pub fields: Vec<String>,
}

#[derive(Debug, Args)]
pub struct UpdateArgs {
    pub kind: String,
    pub id: i64,

    /// Field assignments; values are parsed as JSON when possible.
    #[arg(value_name = "FIELD=VALUE")]
    pub fields: Vec<String>,
}

#[derive(Debug, Args)]
pub struct DeleteArgs {
    pub kind: String,
    pub id: i64,
}

#[derive(Debug, Args)]
pub struct PipelineCli {
    #[command(subcommand)]
    pub command: PipelineCommand,
}

#[derive(Debug, Subcommand)]
pub enum PipelineCommand {
    /// Show deals grouped by stage with totals.
    Board(BoardArgs),
    /// Move a deal to another stage.
    Move(MoveArgs),
}

#[derive(Debug, Args)]
pub struct BoardArgs {
    /// Output as JSON.
    #[arg(long = "json", short = 'j')]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct MoveArgs {
    pub deal_id: i64,
    pub stage_id: String,
}
