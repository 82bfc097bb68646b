use clap::Parser;
use fern::{
    colors::{Color, ColoredLevelConfig},
    Dispatch,
};
use log::LevelFilter;
use std::env;
use surfsup_core::{
    find_config_file, get_xdg_data_dir, load_config, path_exists, ConfigSource,
    DEFAULT_API_PORT, DEFAULT_DATASET_FILE, DEFAULT_MAX_CONNECTIONS,
};
use time::{format_description::well_known::Iso8601, OffsetDateTime};

use crate::MOST_ACTIVE_STATION;

#[derive(Parser, Clone, Debug, serde::Deserialize, Default)]
#[command(
    author,
    version,
    about = "SurfsUp - read-only Hawaii climate observations API"
)]
pub struct Cli {
    /// Path to config file (TOML format)
    /// Searched in order: this flag, $SURFSUP_CONFIG, ./surfsup.toml,
    /// $XDG_CONFIG_HOME/surfsup/surfsup.toml, /etc/surfsup/surfsup.toml
    #[arg(short, long)]
    #[serde(skip)]
    pub config: Option<String>,

    /// Log level: trace, debug, info, warn, error
    #[arg(short, long, env = "SURFSUP_LEVEL")]
    pub level: Option<String>,

    /// Host to listen on (use 0.0.0.0 for all interfaces)
    #[arg(short, long, env = "SURFSUP_HOST")]
    #[serde(alias = "host")]
    pub domain: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "SURFSUP_PORT")]
    pub port: Option<String>,

    /// Path to the SQLite climate dataset (stations and measurements)
    #[arg(long, env = "SURFSUP_DATASET")]
    pub dataset: Option<String>,

    /// Station served by /api/v1.0/tobs
    #[arg(long, env = "SURFSUP_ACTIVE_STATION")]
    pub active_station: Option<String>,

    /// Maximum pooled read-only connections to the dataset
    #[arg(long, env = "SURFSUP_MAX_CONNECTIONS")]
    pub max_connections: Option<u32>,
}

impl Cli {
    pub fn host(&self) -> String {
        self.domain
            .clone()
            .unwrap_or_else(|| "127.0.0.1".to_string())
    }

    pub fn port(&self) -> String {
        self.port
            .clone()
            .unwrap_or_else(|| DEFAULT_API_PORT.to_string())
    }

    pub fn dataset(&self) -> String {
        self.dataset.clone().unwrap_or_else(default_dataset_path)
    }

    pub fn active_station(&self) -> String {
        self.active_station
            .clone()
            .unwrap_or_else(|| MOST_ACTIVE_STATION.to_string())
    }

    pub fn max_connections(&self) -> u32 {
        self.max_connections.unwrap_or(DEFAULT_MAX_CONNECTIONS)
    }

    /// Fill every unset field from `other`
    pub fn with_fallback(self, other: Cli) -> Cli {
        Cli {
            config: self.config.or(other.config),
            level: self.level.or(other.level),
            domain: self.domain.or(other.domain),
            port: self.port.or(other.port),
            dataset: self.dataset.or(other.dataset),
            active_station: self.active_station.or(other.active_station),
            max_connections: self.max_connections.or(other.max_connections),
        }
    }
}

/// `./Resources/hawaii.sqlite` when present, otherwise the XDG data dir copy
fn default_dataset_path() -> String {
    let local = format!("./Resources/{}", DEFAULT_DATASET_FILE);
    if path_exists(&local) {
        return local;
    }
    get_xdg_data_dir()
        .join(DEFAULT_DATASET_FILE)
        .display()
        .to_string()
}

/// Load configuration from CLI args, config file, and environment
pub fn get_config_info() -> Cli {
    let cli_args = Cli::parse();

    let source = if let Some(ref path) = cli_args.config {
        ConfigSource::Explicit(path.into())
    } else {
        find_config_file("SURFSUP_CONFIG", "surfsup.toml")
    };

    if let Some(path) = source.path() {
        log::info!("Loading config from: {}", path.display());
    }

    let file_config: Cli = load_config(&source).unwrap_or_else(|e| {
        eprintln!("ignoring config file {}: {:#}", source, e);
        Cli::default()
    });

    // CLI args override file config (env vars are handled by clap)
    cli_args.with_fallback(file_config)
}

pub fn get_log_level(cli: &Cli) -> LevelFilter {
    let level_str = cli
        .level
        .clone()
        .or_else(|| env::var("RUST_LOG").ok())
        .unwrap_or_else(|| "info".to_string());

    parse_level(&level_str)
}

fn parse_level(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => LevelFilter::Info,
    }
}

pub fn setup_logger() -> Dispatch {
    let colors = ColoredLevelConfig::new()
        .trace(Color::White)
        .debug(Color::Cyan)
        .info(Color::Blue)
        .warn(Color::Yellow)
        .error(Color::Magenta);

    fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{} {}] {}: {}",
                OffsetDateTime::now_utc()
                    .format(&Iso8601::DEFAULT)
                    .unwrap_or_default(),
                colors.color(record.level()),
                record.target(),
                message
            ));
        })
        .chain(std::io::stdout())
}
