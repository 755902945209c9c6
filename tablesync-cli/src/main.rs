use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use clap::ValueEnum;
use log::LevelFilter;
use log::info;
use simplelog::Config;
use simplelog::SimpleLogger;
use simplelog::WriteLogger;
use tablesync_lib::location::HistoryParamStore;
use tablesync_lib::location::ParamStore;
use tablesync_lib::table::DataTable;
use tablesync_lib::table::EmptyState;
use tablesync_lib::table::TableConfig;

#[derive(Parser)]
#[command(name = "tablesync")]
#[command(about = "Query a JSON collection the way a synced data table would")]
#[command(version)]
struct Cli {
    /// JSON file holding an array of records
    data: PathBuf,

    /// Address-bar query string to hydrate from, e.g. "page=2&sort=price|desc"
    #[arg(short, long, default_value = "")]
    url: String,

    /// Items per page
    #[arg(short, long, default_value_t = 20)]
    limit: usize,

    /// Field matched by the free-text `query` parameter
    #[arg(short, long)]
    query_field: Option<String>,

    /// Field holding the record id
    #[arg(long, default_value = "id")]
    id_field: String,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log verbosity
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    log_level: LogLevel,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to initialize logger: {0}")]
    Logger(#[from] log::SetLoggerError),
}

fn init_logging(cli: &Cli) -> Result<(), CliError> {
    let level = LevelFilter::from(cli.log_level);
    match &cli.log_file {
        Some(path) => {
            let file = File::create(path).map_err(|source| CliError::Io {
                path: path.clone(),
                source,
            })?;
            WriteLogger::init(level, Config::default(), file)?;
        }
        None => SimpleLogger::init(level, Config::default())?,
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let file = File::open(&cli.data).map_err(|source| CliError::Io {
        path: cli.data.clone(),
        source,
    })?;
    let rows: Vec<serde_json::Value> = serde_json::from_reader(BufReader::new(file))?;
    info!("Loaded {} records from {}", rows.len(), cli.data.display());

    let mut config = TableConfig::immediate()
        .with_limit(cli.limit)
        .with_id_field(cli.id_field);
    if let Some(field) = cli.query_field {
        config = config.with_query_field(field);
    }

    let store = Arc::new(HistoryParamStore::parse(&cli.url));
    let table = DataTable::builder()
        .config(config)
        .local(rows)
        .param_store(store.clone())
        .build();
    table.mount().await;

    let snapshot = table.snapshot();
    for item in &snapshot.items {
        println!("{}", serde_json::to_string(item)?);
    }
    match snapshot.empty_state {
        EmptyState::None => println!("{}", snapshot.pagination.label),
        EmptyState::NoRecords => println!("No records"),
        EmptyState::NoMatches => println!("No records match the current query"),
    }

    println!("?{}", store.params());
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = init_logging(&cli) {
        eprintln!("Error: {}", e);
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
