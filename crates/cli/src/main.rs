use crate::error::CliError;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use clap::Parser;
use commands::Commands;
use engine_config::{EngineSettings, EnvVars};
use expression_engine::{FieldLookupCache, FormulaTyper};
use model::{
    core::timezone::parse_timezone,
    field::{FieldKind, formula::FormulaType},
    schema::Schema,
};
use planner::FilterType;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use view_filters::{FilterContext, ViewFilter, ViewFilterRegistry};

mod commands;
mod error;
mod output;

#[derive(Parser)]
#[command(
    name = "formulary",
    version = "0.1.0",
    about = "View filter compiler and formula typer"
)]
struct Cli {
    #[arg(long, global = true, help = "Settings JSON file path")]
    settings: Option<PathBuf>,

    #[arg(long, global = true, help = "Env file with FORMULARY_* overrides")]
    env_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    let mut env = EnvVars::from_system();
    if let Some(path) = &cli.env_file {
        env.load_from_file(path)?;
    }
    let settings = EngineSettings::load(cli.settings.as_deref(), &env)?;

    // Initialize logger; RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Filter {
            schema,
            table,
            field,
            filter_type,
            value,
            timezone_now,
        } => {
            info!(%table, %field, %filter_type, "Compiling view filter");

            let schema = load_schema(&schema, &settings).await?;
            let target = schema.find_field(&table, &field)?;
            let table = schema.table(target.table_id)?;

            let context = match timezone_now {
                Some(raw) => FilterContext::fixed(parse_now(&raw, &settings.default_timezone)?),
                None => FilterContext::default(),
            };
            let registry = ViewFilterRegistry::with_builtin_types();
            let filters = [ViewFilter::new(target.id, filter_type.as_str(), value.as_str())];
            let plan = registry.plan(&schema, FilterType::And, &filters, &context)?;

            output::print_filter(
                &format!("database_table_{}", table.id),
                &field,
                &filter_type,
                &value,
                &plan,
            )?;
        }
        Commands::TypeFormula {
            schema,
            table,
            field,
        } => {
            info!(%table, %field, "Typing formula field");

            let schema = read_schema(&schema).await?;
            let target = schema.find_field(&table, &field)?;
            let typer = FormulaTyper::new(settings.formula_max_depth);
            let mut cache = FieldLookupCache::new(&schema);
            let expression = typer.typed_expression(target, &mut cache)?;
            output::print_formula(&field, &expression)?;
        }
        Commands::FilterTypes {
            schema,
            table,
            field,
        } => {
            let registry = ViewFilterRegistry::with_builtin_types();
            match (schema, table, field) {
                (None, _, _) => output::print_filter_types(registry.types()),
                (Some(schema), Some(table), Some(field)) => {
                    let schema = load_schema(&schema, &settings).await?;
                    let target = schema.find_field(&table, &field)?;
                    let compatible = registry.compatible_types_for(target);
                    output::print_filter_types(
                        registry
                            .types()
                            .filter(|t| compatible.contains(&t.type_name())),
                    );
                }
                _ => return Err(CliError::MissingFieldSelector),
            }
        }
    }

    Ok(())
}

async fn read_schema(path: &Path) -> Result<Schema, CliError> {
    let source = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&source)?)
}

/// Reads the schema and stores the resolved type on every formula field, so
/// filters see formulas as the field types they evaluate to.
async fn load_schema(path: &Path, settings: &EngineSettings) -> Result<Schema, CliError> {
    let mut schema = read_schema(path).await?;
    let typer = FormulaTyper::new(settings.formula_max_depth);

    let mut typed = Vec::new();
    {
        let mut cache = FieldLookupCache::new(&schema);
        for field in schema.fields().filter(|f| f.is_formula()) {
            let formula_type = match typer.typed_expression(field, &mut cache) {
                Ok(expression) => expression.expression_type,
                Err(err) => {
                    warn!(field = %field.name, "Formula field cannot be typed: {err}");
                    FormulaType::invalid(err.to_string())
                }
            };

            let mut field = field.clone();
            if let FieldKind::Formula(options) = &mut field.kind {
                options.formula_type = Some(formula_type);
            }
            typed.push(field);
        }
    }

    for field in typed {
        schema.replace_field(field)?;
    }
    Ok(schema)
}

/// RFC 3339, or a naive `YYYY-MM-DDTHH:MM:SS` read in `default_timezone`.
fn parse_now(raw: &str, default_timezone: &str) -> Result<DateTime<Utc>, CliError> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Ok(instant.with_timezone(&Utc));
    }

    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .map_err(|_| CliError::InvalidNow(raw.to_string()))?;
    let timezone = parse_timezone(default_timezone)?;
    timezone
        .from_local_datetime(&naive)
        .single()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| CliError::InvalidNow(raw.to_string()))
}
