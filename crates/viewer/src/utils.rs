use clap::Parser;
use damage_map_core::{
    find_config_file, load_config, ConfigSource, DEFAULT_BOUNDARIES_SOURCE,
    DEFAULT_DAMAGE_POINTS_SOURCE, DEFAULT_TILE_ATTRIBUTION, DEFAULT_TILE_URL,
};
use slog::{o, Drain, Level, Logger};
use std::env;

use crate::{DataSources, SessionConfig, SupersedePolicy, TileLayer};

#[derive(Parser, Clone, Debug, serde::Deserialize, Default)]
#[command(
    author,
    version,
    about = "Damage Map Viewer - governorate view controller driven from the terminal"
)]
pub struct Cli {
    /// Path to config file (TOML format)
    /// Searched in order: this flag, $DAMAGE_MAP_CONFIG, ./viewer.toml,
    /// $XDG_CONFIG_HOME/damage-map/viewer.toml, /etc/damage-map/viewer.toml
    #[arg(short, long)]
    #[serde(skip)]
    pub config: Option<String>,

    /// Log level: trace, debug, info, warn, error
    #[arg(short, long, env = "DAMAGE_MAP_LEVEL")]
    pub level: Option<String>,

    /// Governorate boundary GeoJSON (URL or local path)
    #[arg(short, long, env = "DAMAGE_MAP_BOUNDARIES")]
    pub boundaries: Option<String>,

    /// Damage point GeoJSON (URL or local path)
    #[arg(short, long, env = "DAMAGE_MAP_DAMAGE_POINTS")]
    pub damage_points: Option<String>,

    /// Basemap tile URL template
    #[arg(short, long, env = "DAMAGE_MAP_TILE_URL")]
    pub tile_url: Option<String>,

    /// Basemap attribution text
    #[arg(long, env = "DAMAGE_MAP_TILE_ATTRIBUTION")]
    pub tile_attribution: Option<String>,

    /// What a newer region focus does to an annotation still waiting to open
    #[arg(short, long, value_enum, env = "DAMAGE_MAP_SUPERSEDE")]
    pub supersede: Option<SupersedePolicy>,

    /// Write the static page shell to this path before starting. Only the markup
    /// is written; static/map.js and static/styles.css are deployed alongside it
    /// separately
    #[arg(short, long, env = "DAMAGE_MAP_PAGE_OUT")]
    pub page_out: Option<String>,

    /// HTTP User-Agent header for dataset requests
    #[arg(short, long, env = "DAMAGE_MAP_USER_AGENT")]
    pub user_agent: Option<String>,
}

impl Cli {
    pub fn data_sources(&self) -> DataSources {
        DataSources {
            boundaries: self
                .boundaries
                .clone()
                .unwrap_or_else(|| DEFAULT_BOUNDARIES_SOURCE.to_string()),
            damage_points: self
                .damage_points
                .clone()
                .unwrap_or_else(|| DEFAULT_DAMAGE_POINTS_SOURCE.to_string()),
        }
    }

    pub fn tile_layer(&self) -> TileLayer {
        TileLayer {
            url_template: self
                .tile_url
                .clone()
                .unwrap_or_else(|| DEFAULT_TILE_URL.to_string()),
            attribution: self
                .tile_attribution
                .clone()
                .unwrap_or_else(|| DEFAULT_TILE_ATTRIBUTION.to_string()),
        }
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            policy: self.supersede.unwrap_or_default(),
            ..SessionConfig::default()
        }
    }

    pub fn user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(|| format!("damage-map-viewer/{}", env!("CARGO_PKG_VERSION")))
    }
}

/// Load configuration from CLI args, config file, and environment
pub fn get_config_info() -> (Cli, ConfigSource) {
    let cli_args = Cli::parse();

    let source = if let Some(ref path) = cli_args.config {
        ConfigSource::Explicit(path.into())
    } else {
        find_config_file("DAMAGE_MAP_CONFIG", "viewer.toml")
    };

    // A broken config file should not stop the viewer; fall back to defaults.
    let file_config: Cli = load_config(&source).unwrap_or_default();
    (merge_config(cli_args, file_config), source)
}

/// CLI args (and env vars, which clap folds in) win over the config file.
pub fn merge_config(cli_args: Cli, file_config: Cli) -> Cli {
    Cli {
        config: cli_args.config,
        level: cli_args.level.or(file_config.level),
        boundaries: cli_args.boundaries.or(file_config.boundaries),
        damage_points: cli_args.damage_points.or(file_config.damage_points),
        tile_url: cli_args.tile_url.or(file_config.tile_url),
        tile_attribution: cli_args.tile_attribution.or(file_config.tile_attribution),
        supersede: cli_args.supersede.or(file_config.supersede),
        page_out: cli_args.page_out.or(file_config.page_out),
        user_agent: cli_args.user_agent.or(file_config.user_agent),
    }
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::Trace,
        "debug" => Level::Debug,
        "warn" => Level::Warning,
        "error" => Level::Error,
        _ => Level::Info,
    }
}

pub fn setup_logger(cli: &Cli) -> Logger {
    let log_level = match cli.level.as_ref() {
        Some(level) => parse_level(level),
        None => parse_level(&env::var("RUST_LOG").unwrap_or_default()),
    };

    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::CompactFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();
    let drain = drain.filter_level(log_level).fuse();
    slog::Logger::root(drain, o!("version" => env!("CARGO_PKG_VERSION")))
}
