//! Command dispatch.

use std::io::Write;
use std::sync::Arc;

use crm_pipeline::Pipeline;
use crm_record_client::{HttpRecordClient, OrderBy, RecordClient};
use crm_repository::{ListOptions, Repository, search};
use crm_schema::{FieldKind, SchemaRegistry};
use serde_json::{Map, Value};

use crate::cli::{
    BoardArgs, Cli, Command, CreateArgs, DeleteArgs, GetArgs, ListArgs, MoveArgs, PipelineCommand,
    SchemaArgs, UpdateArgs,
};
use crate::config::CrmConfig;
use crate::errors::{CliError, Result};
use crate::output;

/// Load config and run `cli.command`, writing results to `out`.
pub async fn run(cli: Cli, out: &mut dyn Write) -> Result<()> {
    let config = CrmConfig::load(cli.config.as_deref())?;
    let registry = Arc::new(SchemaRegistry::crm());

    if let Command::Schema(args) = &cli.command {
        return schema(&registry, args, out);
    }

    let client: Arc<dyn RecordClient> = Arc::new(HttpRecordClient::new(config.http_config())?);
    let repo = Repository::new(client, registry).with_page_limit(config.repository.page_limit);
    execute(&repo, cli.command, out).await
}

/// Run a record or pipeline command against `repo`.
pub async fn execute(repo: &Repository, command: Command, out: &mut dyn Write) -> Result<()> {
    match command {
        Command::Schema(args) => schema(repo.registry(), &args, out),
        Command::List(args) => list(repo, args, out).await,
        Command::Get(args) => get(repo, args, out).await,
        Command::Create(args) => create(repo, args, out).await,
        Command::Update(args) => update(repo, args, out).await,
        Command::Delete(args) => delete(repo, args, out).await,
        Command::Pipeline(p) => {
            let pipeline = Pipeline::new(repo.clone());
            match p.command {
                PipelineCommand::Board(args) => board(&pipeline, args, out).await,
                PipelineCommand::Move(args) => move_deal(&pipeline, args, out).await,
            }
        }
    }
}

fn schema(registry: &SchemaRegistry, args: &SchemaArgs, out: &mut dyn Write) -> Result<()> {
    match &args.kind {
        Some(kind) => {
            let schema = registry.get_schema(kind)?;
            if args.json {
                output::write_json(out, schema)
            } else {
                output::write_schema(out, schema)
            }
        }
        None if args.json => output::write_json(out, &registry.kinds().collect::<Vec<_>>()),
        None => output::write_kinds(out, registry),
    }
}

async fn list(repo: &Repository, args: ListArgs, out: &mut dyn Write) -> Result<()> {
    let mut options = ListOptions::new().offset(args.offset);
    if let Some(limit) = args.limit {
        options = options.limit(limit);
    }
    for order in &args.order {
        options = options.order(parse_order(order)?);
    }
    for filter in &args.filters {
        let (field, value) = parse_assignment(filter)?;
        options = options.where_eq(field, value);
    }

    let records = repo.list(&args.kind, &options).await?;
    let schema = repo.registry().get_schema(&args.kind)?;

    let shown = match args.search.as_deref() {
        Some(text) => {
            let text_fields: Vec<&str> = schema
                .fields()
                .iter()
                .filter(|f| matches!(f.kind, FieldKind::String | FieldKind::Reference))
                .map(|f| f.name.as_str())
                .collect();
            search::search(&records, &text_fields, text)
        }
        None => records.iter().collect(),
    };

    if args.json {
        output::write_json(out, &shown)
    } else {
        output::write_records(out, schema, shown)
    }
}

async fn get(repo: &Repository, args: GetArgs, out: &mut dyn Write) -> Result<()> {
    let record = repo.get_by_id(&args.kind, args.id).await?;
    if args.json {
        output::write_json(out, &record)
    } else {
        output::write_record(out, repo.registry().get_schema(&args.kind)?, &record)
    }
}

async fn create(repo: &Repository, args: CreateArgs, out: &mut dyn Write) -> Result<()> {
    let fields = parse_fields(&args.fields)?;
    let record = repo.create(&args.kind, &fields).await?;
    writeln!(out, "created {} #{}", args.kind, record.id)?;
    Ok(())
}

async fn update(repo: &Repository, args: UpdateArgs, out: &mut dyn Write) -> Result<()> {
    let fields = parse_fields(&args.fields)?;
    let record = repo.update(&args.kind, args.id, &fields).await?;
    writeln!(out, "updated {} #{}", args.kind, record.id)?;
    Ok(())
}

async fn delete(repo: &Repository, args: DeleteArgs, out: &mut dyn Write) -> Result<()> {
    repo.delete(&args.kind, args.id).await?;
    writeln!(out, "deleted {} #{}", args.kind, args.id)?;
    Ok(())
}

async fn board(pipeline: &Pipeline, args: BoardArgs, out: &mut dyn Write) -> Result<()> {
    let board = pipeline.load_board().await?;
    if args.json {
        output::write_json(out, &board)
    } else {
        output::write_board(out, &board)
    }
}

async fn move_deal(pipeline: &Pipeline, args: MoveArgs, out: &mut dyn Write) -> Result<()> {
    pipeline.move_deal(args.deal_id, &args.stage_id).await?;
    writeln!(out, "moved deal #{} to stage {}", args.deal_id, args.stage_id)?;
    Ok(())
}

/// `FIELD=VALUE`; the value is JSON when it parses as JSON, else a string.
pub fn parse_assignment(arg: &str) -> Result<(String, Value)> {
    let Some((field, raw)) = arg.split_once('=') else {
        return Err(CliError::usage(format!("expected FIELD=VALUE, got `{arg}`")));
    };
    let field = field.trim();
    if field.is_empty() {
        return Err(CliError::usage(format!("missing field name in `{arg}`")));
    }
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((field.to_string(), value))
}

fn parse_fields(args: &[String]) -> Result<Map<String, Value>> {
    args.iter().map(|arg| parse_assignment(arg)).collect()
}

/// `FIELD`, `FIELD:asc` or `FIELD:desc`.
pub fn parse_order(arg: &str) -> Result<OrderBy> {
    let (field, direction) = arg.split_once(':').unwrap_or((arg, "asc"));
    if field.trim().is_empty() {
        return Err(CliError::usage(format!("missing field name in `--order {arg}`")));
    }
    match direction.to_ascii_lowercase().as_str() {
        "asc" => Ok(OrderBy::asc(field.trim())),
        "desc" => Ok(OrderBy::desc(field.trim())),
        other => Err(CliError::usage(format!(
            "unknown sort direction `{other}` (expected asc or desc)"
        ))),
    }
}
