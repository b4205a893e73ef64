pub mod chat;
pub mod players;
pub mod schema;
pub mod sql;
pub mod status;

use anyhow::{anyhow, Result};
use ignbot::database::{ensure_data_dir, ConnectParams, DbResponse, DATABASE_URL_ENV};
use ignbot::{BotConfig, PlayerDatabase};
use tracing::info;

/// Where the CLI should connect, in priority order
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DatabaseTarget {
    /// `--database <path>`
    Explicit(String),
    /// `DATABASE_URL` from the environment (or `.env`)
    Environment,
    /// The data directory from the configuration
    Configured(String),
}

pub(crate) fn database_target(config: &BotConfig, explicit: Option<&str>) -> DatabaseTarget {
    if let Some(path) = explicit {
        return DatabaseTarget::Explicit(path.to_string());
    }
    if std::env::var(DATABASE_URL_ENV).is_ok() {
        return DatabaseTarget::Environment;
    }
    DatabaseTarget::Configured(config.sqlite_path())
}

/// Open the player database for a CLI command
pub(crate) fn open_database(config: &BotConfig, explicit: Option<&str>) -> Result<PlayerDatabase> {
    let db = match database_target(config, explicit) {
        DatabaseTarget::Explicit(path) => {
            info!("using database {}", path);
            PlayerDatabase::connect(Some(&ConnectParams::new(path)))
        }
        DatabaseTarget::Environment => {
            info!("using database from {}", DATABASE_URL_ENV);
            PlayerDatabase::from_env()
        }
        DatabaseTarget::Configured(path) => {
            ensure_data_dir(&config.data_dir)?;
            info!("using database {}", path);
            PlayerDatabase::connect(Some(&config.connect_params()))
        }
    };
    db.map_err(|e| anyhow!("Failed to open database: {}", e))
}

/// Print the envelope message; failures go to stderr
pub(crate) fn report<T>(response: &DbResponse<T>) -> bool {
    if response.is_ok() {
        println!("{}", response.message);
        true
    } else {
        eprintln!("{}", response.message);
        false
    }
}
