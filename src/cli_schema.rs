use anyhow::Result;
use clap::{Parser, Subcommand};
use sparkify_etl::config::parse_path;
use sparkify_etl::{CliConfig, EtlConfig, FileConfig, SchemaProvisioner, SqliteWarehouse};
use std::path::PathBuf;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Creates or drops the Sparkify warehouse tables.
#[derive(Parser, Debug)]
struct CliArgs {
    /// Optional TOML config file, only `database` is read from it.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Path to the SQLite warehouse database.
    #[clap(long, value_parser = parse_path)]
    pub database: Option<PathBuf>,

    #[command(subcommand)]
    command: SchemaCommand,
}

#[derive(Subcommand, Debug)]
enum SchemaCommand {
    /// Creates any missing table and validates the existing ones.
    Apply,

    /// Drops every warehouse table.
    Reset,

    /// Drops every warehouse table, then creates them again empty.
    Recreate,
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()?;

    let file_config = cli_args.config.as_deref().map(FileConfig::load).transpose()?;
    let cli_config = CliConfig {
        database: cli_args.database.clone(),
        ..Default::default()
    };
    let config = EtlConfig::resolve(&cli_config, file_config)?;

    info!("Opening warehouse database at {:?}...", config.database);
    let mut warehouse = SqliteWarehouse::open(&config.database)?;

    match cli_args.command {
        SchemaCommand::Apply => warehouse.apply_schema()?,
        SchemaCommand::Reset => warehouse.reset_schema()?,
        SchemaCommand::Recreate => {
            warehouse.reset_schema()?;
            warehouse.apply_schema()?;
        }
    }
    info!("Done.");

    Ok(())
}
