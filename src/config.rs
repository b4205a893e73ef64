use anyhow::{anyhow, Result};
use config::Config;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

use crate::database::{ConnectParams, PlayerDatabase};

/// Default command prefix, e.g. `,ping`
pub const DEFAULT_PREFIX: &str = ",";

#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Path to the directory to hold the bot's data
    pub data_dir: String,

    /// Prefix that marks a chat message as a command
    pub prefix: String,

    /// Chat user id allowed to run owner-only commands
    pub owner_id: Option<String>,
}

const EMPTY_CONFIG: &str = r#"### ignbot configuration file

### directory for the player database
# data_dir = "~/.ignbot"

### command prefix
# prefix = ","

### chat user id allowed to run table and raw SQL commands
# owner_id = "123456789012345678"
"#;

impl Default for BotConfig {
    fn default() -> Self {
        let home_dir = dirs::home_dir()
            .map(|h| h.to_string_lossy().to_string())
            .unwrap_or_else(|| ".".to_string());

        Self {
            data_dir: format!("{}/.ignbot", home_dir),
            prefix: DEFAULT_PREFIX.to_string(),
            owner_id: None,
        }
    }
}

impl BotConfig {
    /// Function to create and initialize a new configuration
    pub fn new(path: &Option<String>) -> Result<BotConfig> {
        let mut builder = Config::builder();

        // By default use $HOME/.ignbot/ignbot.toml as the configuration file path
        let home_dir = dirs::home_dir()
            .ok_or_else(|| anyhow!("Could not find home directory"))?
            .to_str()
            .ok_or_else(|| anyhow!("Could not convert home directory path to string"))?
            .to_owned();

        // Config dir
        let bot_dir = format!("{}/.ignbot", home_dir.as_str());

        // Add in toml configuration file
        match path {
            Some(p) => {
                let path = Path::new(p.as_str());
                if path.exists() {
                    let path_str = path
                        .to_str()
                        .ok_or_else(|| anyhow!("Could not convert path to string"))?;
                    builder = builder.add_source(config::File::with_name(path_str));
                } else {
                    std::fs::write(p.as_str(), EMPTY_CONFIG)
                        .map_err(|e| anyhow!("Unable to create config file: {}", e))?;
                }
            }
            None => {
                std::fs::create_dir_all(bot_dir.as_str())
                    .map_err(|e| anyhow!("Unable to create ignbot directory: {}", e))?;
                let p = format!("{}/ignbot.toml", bot_dir.as_str());
                if Path::new(p.as_str()).exists() {
                    builder = builder.add_source(config::File::with_name(p.as_str()));
                } else {
                    std::fs::write(p.as_str(), EMPTY_CONFIG).map_err(|e| {
                        anyhow!("Unable to create config file {}: {}", p.as_str(), e)
                    })?;
                }
            }
        }

        // Add in settings from the environment (with a prefix of BOT)
        // E.g., `BOT_PREFIX=! ./ignbot chat` would change the command prefix
        builder = builder.add_source(config::Environment::with_prefix("BOT"));

        let settings = builder
            .build()
            .map_err(|e| anyhow!("Failed to build configuration: {}", e))?;

        let config = settings
            .try_deserialize::<HashMap<String, String>>()
            .map_err(|e| anyhow!("Failed to deserialize configuration: {}", e))?;

        // Parse data directory
        let data_dir = match config.get("data_dir") {
            Some(p) => expand_home(p, &home_dir),
            None => {
                std::fs::create_dir_all(bot_dir.as_str())
                    .map_err(|e| anyhow!("Unable to create data directory: {}", e))?;
                bot_dir
            }
        };

        let prefix = config
            .get("prefix")
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| DEFAULT_PREFIX.to_string());

        let owner_id = config
            .get("owner_id")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Ok(BotConfig {
            data_dir,
            prefix,
            owner_id,
        })
    }

    /// Get the path to the SQLite database file
    pub fn sqlite_path(&self) -> String {
        let data_dir = self.data_dir.trim_end_matches('/');
        format!("{}/ignbot-players.sqlite3", data_dir)
    }

    /// Connection parameters for the configured database file
    pub fn connect_params(&self) -> ConnectParams {
        ConnectParams::new(self.sqlite_path())
    }

    /// Display configuration summary
    pub fn summary(&self) -> String {
        [
            format!("Data Directory:     {}", self.data_dir),
            format!("SQLite Path:        {}", self.sqlite_path()),
            format!("Command Prefix:     {}", self.prefix),
            format!(
                "Owner ID:           {}",
                self.owner_id.as_deref().unwrap_or("(not set)")
            ),
        ]
        .join("\n")
    }

    /// Get the config file path
    pub fn config_file_path() -> String {
        let home_dir = dirs::home_dir()
            .map(|h| h.to_string_lossy().to_string())
            .unwrap_or_else(|| "~".to_string());
        format!("{}/.ignbot/ignbot.toml", home_dir)
    }
}

fn expand_home(path: &str, home_dir: &str) -> String {
    match path.strip_prefix("~") {
        Some(rest) => format!("{}{}", home_dir, rest),
        None => path.to_string(),
    }
}

// =============================================================================
// Database Info (used by the status command)
// =============================================================================

/// Information about the SQLite database file
#[derive(Debug, Serialize, Clone)]
pub struct DatabaseInfo {
    pub path: String,
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    pub table_initialized: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_count: Option<u64>,
}

/// Get SQLite database information without creating the file
pub fn get_database_info(sqlite_path: &str) -> DatabaseInfo {
    let exists = Path::new(&sqlite_path).exists();
    let size_bytes = if exists {
        std::fs::metadata(&sqlite_path).ok().map(|m| m.len())
    } else {
        None
    };

    let (table_initialized, columns, player_count) = if exists {
        let params = ConnectParams::new(sqlite_path);
        match PlayerDatabase::connect(Some(&params)) {
            Ok(db) => {
                let initialized = db.table_exists().unwrap_or(false);
                if initialized {
                    let columns = db.columns().ok();
                    let count = db.read_all().data.map(|rows| rows.len() as u64);
                    (true, columns, count)
                } else {
                    (false, None, None)
                }
            }
            Err(_) => (false, None, None),
        }
    } else {
        (false, None, None)
    };

    DatabaseInfo {
        path: sqlite_path.to_string(),
        exists,
        size_bytes,
        table_initialized,
        columns,
        player_count,
    }
}

/// Format a byte count for humans
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BotConfig::default();
        assert!(config.data_dir.ends_with(".ignbot"));
        assert_eq!(config.prefix, ",");
        assert_eq!(config.owner_id, None);
    }

    #[test]
    fn test_paths() {
        let config = BotConfig {
            data_dir: "/tmp/ignbot/".to_string(),
            ..Default::default()
        };
        assert_eq!(config.sqlite_path(), "/tmp/ignbot/ignbot-players.sqlite3");
        assert_eq!(
            config.connect_params().database,
            "/tmp/ignbot/ignbot-players.sqlite3"
        );
        assert!(config.summary().contains("(not set)"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("ignbot.toml");
        let data_dir = dir.path().join("data");
        std::fs::write(
            &file,
            format!(
                "data_dir = \"{}\"\nprefix = \"!\"\nowner_id = \"42\"\n",
                data_dir.display()
            ),
        )
        .unwrap();

        let config = BotConfig::new(&Some(file.to_string_lossy().to_string())).unwrap();
        assert_eq!(config.prefix, "!");
        assert_eq!(config.owner_id.as_deref(), Some("42"));
        assert_eq!(config.data_dir, data_dir.to_string_lossy());
    }

    #[test]
    fn test_missing_file_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("fresh.toml");
        let path = Some(file.to_string_lossy().to_string());

        BotConfig::new(&path).unwrap();
        let written = std::fs::read_to_string(&file).unwrap();
        assert!(written.starts_with("### ignbot configuration file"));
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home("~/.ignbot", "/home/a"), "/home/a/.ignbot");
        assert_eq!(expand_home("/srv/bot", "/home/a"), "/srv/bot");
    }

    #[test]
    fn test_database_info_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = BotConfig {
            data_dir: dir.path().to_string_lossy().to_string(),
            ..Default::default()
        };
        let info = get_database_info(&config.sqlite_path());
        assert!(!info.exists);
        assert!(!info.table_initialized);
        assert_eq!(info.player_count, None);
    }

    #[test]
    fn test_database_info_with_players() {
        let dir = tempfile::tempdir().unwrap();
        let config = BotConfig {
            data_dir: dir.path().to_string_lossy().to_string(),
            ..Default::default()
        };
        {
            let db = PlayerDatabase::open_path(&config.sqlite_path()).unwrap();
            assert!(db.set_ign("1", "S1", "Alice", "ally").is_ok());
        }

        let info = get_database_info(&config.sqlite_path());
        assert!(info.exists);
        assert!(info.table_initialized);
        assert_eq!(info.player_count, Some(1));
        assert_eq!(info.columns.unwrap().len(), 6);
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 bytes");
        assert_eq!(format_size(2048), "2.00 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.00 MB");
    }
}
