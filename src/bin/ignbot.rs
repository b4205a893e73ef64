use clap::{Parser, Subcommand};
use ignbot::output::OutputFormat;
use ignbot::BotConfig;
use tracing::Level;

mod commands;

use commands::chat::ChatArgs;
use commands::players::{GetArgs, SetGlobalArgs, SetHomeArgs, SetIgnArgs, SetLocalArgs};
use commands::schema::{AddColumnArgs, DropColumnArgs};
use commands::sql::SqlArgs;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
struct Cli {
    /// configuration file path, by default $HOME/.ignbot/ignbot.toml is used
    #[clap(short, long)]
    config: Option<String>,

    /// Print debug information
    #[clap(long)]
    debug: bool,

    /// SQLite database file to use instead of DATABASE_URL or the configured data directory
    #[clap(long, global = true)]
    database: Option<String>,

    /// Output format: table, markdown, json, json-pretty, json-line, psv
    #[clap(long, global = true, default_value = "table")]
    format: OutputFormat,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the players table
    Init,

    /// Drop the players table
    Drop,

    /// Add a column to the players table
    AddColumn(AddColumnArgs),

    /// Drop a column from the players table
    DropColumn(DropColumnArgs),

    /// List every player record
    Read,

    /// Show the record stored for one user id
    Get(GetArgs),

    /// Set a player's home server
    SetHome(SetHomeArgs),

    /// Set a player's in-game name
    SetIgn(SetIgnArgs),

    /// Save a player's server-scoped note
    SetLocal(SetLocalArgs),

    /// Save a player's shared note
    SetGlobal(SetGlobalArgs),

    /// Execute raw SQL against the database
    Sql(SqlArgs),

    /// Show configuration and database status
    Status,

    /// Type chat messages and see the bot's replies
    Chat(ChatArgs),
}

fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if cli.debug {
        tracing_subscriber::fmt()
            // filter spans/events with level TRACE or higher.
            .with_max_level(Level::INFO)
            .init();
    }

    let config = match BotConfig::new(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    };

    let format = cli.format;

    // status inspects the file without requiring a working connection
    if let Commands::Status = cli.command {
        commands::status::run(&config, cli.database.as_deref(), format);
        return;
    }

    let db = match commands::open_database(&config, cli.database.as_deref()) {
        Ok(db) => db,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    };

    let ok = match cli.command {
        Commands::Init => commands::schema::run_init(&db),
        Commands::Drop => commands::schema::run_drop(&db),
        Commands::AddColumn(args) => commands::schema::run_add_column(&db, args),
        Commands::DropColumn(args) => commands::schema::run_drop_column(&db, args),
        Commands::Read => commands::players::run_read(&db, format),
        Commands::Get(args) => commands::players::run_get(&db, args, format),
        Commands::SetHome(args) => commands::players::run_set_home(&db, args),
        Commands::SetIgn(args) => commands::players::run_set_ign(&db, args),
        Commands::SetLocal(args) => commands::players::run_set_local(&db, args),
        Commands::SetGlobal(args) => commands::players::run_set_global(&db, args),
        Commands::Sql(args) => commands::sql::run(&db, args, format),
        Commands::Chat(args) => commands::chat::run(db, config, args),
        Commands::Status => true,
    };

    if !ok {
        std::process::exit(1);
    }
}
