use ignbot::database::DATABASE_URL_ENV;
use ignbot::output::{render_json, OutputFormat};
use ignbot::{format_size, get_database_info, BotConfig, DatabaseInfo};
use serde::Serialize;

use super::{database_target, DatabaseTarget};

#[derive(Debug, Serialize)]
struct StatusInfo {
    config_file: String,
    data_dir: String,
    prefix: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    owner_id: Option<String>,
    source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    database: Option<DatabaseInfo>,
}

pub fn run(config: &BotConfig, explicit: Option<&str>, output_format: OutputFormat) {
    let (source, database) = match database_target(config, explicit) {
        DatabaseTarget::Explicit(path) => ("--database".to_string(), Some(get_database_info(&path))),
        DatabaseTarget::Configured(path) => ("config".to_string(), Some(get_database_info(&path))),
        // the URL may point anywhere; only report where it came from
        DatabaseTarget::Environment => (DATABASE_URL_ENV.to_string(), None),
    };

    let status = StatusInfo {
        config_file: BotConfig::config_file_path(),
        data_dir: config.data_dir.clone(),
        prefix: config.prefix.clone(),
        owner_id: config.owner_id.clone(),
        source,
        database,
    };

    match render_json(&status, output_format) {
        Some(Ok(json)) => println!("{}", json),
        Some(Err(e)) => eprintln!("Error serializing status: {}", e),
        None => print_status(config, &status),
    }
}

fn print_status(config: &BotConfig, status: &StatusInfo) {
    println!("Configuration:");
    println!("  Config file:    {}", status.config_file);
    for line in config.summary().lines() {
        println!("  {}", line);
    }
    println!();

    println!("Database:");
    println!("  Source:         {}", status.source);
    let info = match &status.database {
        Some(info) => info,
        None => {
            println!("  Location:       taken from {}", DATABASE_URL_ENV);
            return;
        }
    };

    println!("  Path:           {}", info.path);
    if !info.exists {
        println!("  Status:         not created (run `ignbot init`)");
        return;
    }
    if let Some(size) = info.size_bytes {
        println!("  Size:           {}", format_size(size));
    }
    if !info.table_initialized {
        println!("  Status:         players table missing (run `ignbot init`)");
        return;
    }
    println!("  Status:         ready");
    if let Some(columns) = &info.columns {
        println!("  Columns:        {}", columns.join(", "));
    }
    if let Some(count) = info.player_count {
        println!("  Players:        {}", count);
    }
}
