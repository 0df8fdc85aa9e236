use anyhow::{Context, Result};
use clap::Parser;
use sparkify_etl::config::parse_path;
use sparkify_etl::schema::{TABLE_ARTISTS, TABLE_SONGPLAYS, TABLE_SONGS, TABLE_TIME, TABLE_USERS};
use sparkify_etl::{BatchDriver, CliConfig, EtlConfig, FileConfig, MalformedFilePolicy, SqliteWarehouse};
use std::path::PathBuf;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Loads song catalog and activity log files into the Sparkify warehouse.
#[derive(Parser, Debug)]
struct CliArgs {
    /// Optional TOML config file. Its values override the flags below.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Path to the SQLite warehouse database.
    #[clap(long, value_parser = parse_path)]
    pub database: Option<PathBuf>,

    /// Root directory of the song catalog files.
    #[clap(long, value_parser = parse_path)]
    pub song_data: Option<PathBuf>,

    /// Root directory of the activity log files.
    #[clap(long, value_parser = parse_path)]
    pub log_data: Option<PathBuf>,

    /// Page value that marks a song play event.
    #[clap(long)]
    pub song_play_page: Option<String>,

    /// Extension of the data files to load.
    #[clap(long)]
    pub file_extension: Option<String>,

    /// What to do with files that cannot be parsed.
    #[clap(long, value_enum)]
    pub on_malformed: Option<MalformedFilePolicy>,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            database: self.database.clone(),
            song_data: self.song_data.clone(),
            log_data: self.log_data.clone(),
            song_play_page: self.song_play_page.clone(),
            file_extension: self.file_extension.clone(),
            on_malformed: self.on_malformed,
        }
    }
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
        .try_init()
        .context("Failed to install the log subscriber")?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config from {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let config = EtlConfig::resolve(&cli_args.to_cli_config(), file_config)?;
    config.validate_roots()?;

    info!("Opening warehouse database at {:?}...", config.database);
    let warehouse = SqliteWarehouse::open_for_load(&config.database)?;

    let mut driver = BatchDriver::from_config(warehouse, &config);
    driver.load_all(&config)?;

    let warehouse = driver.into_warehouse();
    info!("Database contains:");
    for table in [TABLE_SONGS, TABLE_ARTISTS, TABLE_USERS, TABLE_TIME, TABLE_SONGPLAYS] {
        info!("  {}: {} rows", table, warehouse.table_count(table)?);
    }

    Ok(())
}
