use clap::Args;
use ignbot::database::Row;
use ignbot::output::{render_rows, OutputFormat};
use ignbot::{DbResponse, PlayerDatabase};

use super::report;

/// Arguments for the Get command
#[derive(Args)]
pub struct GetArgs {
    /// Chat user id
    pub discord_id: String,
}

/// Arguments for the SetHome command
#[derive(Args)]
pub struct SetHomeArgs {
    /// Chat user id
    pub discord_id: String,

    /// Server id to record as home
    pub server_id: String,

    /// Display name, used only when the record is created
    pub discord_name: String,
}

/// Arguments for the SetIgn command
#[derive(Args)]
pub struct SetIgnArgs {
    /// Chat user id
    pub discord_id: String,

    /// Server id, used only when the record is created
    pub server_id: String,

    /// Display name, used only when the record is created
    pub discord_name: String,

    /// In-game name
    pub ign: String,
}

/// Arguments for the SetLocal command
#[derive(Args)]
pub struct SetLocalArgs {
    /// Chat user id
    pub discord_id: String,

    /// Display name, used only when the record is created
    pub discord_name: String,

    /// Note text
    pub text: String,
}

/// Arguments for the SetGlobal command
#[derive(Args)]
pub struct SetGlobalArgs {
    /// Chat user id
    pub discord_id: String,

    /// Display name, used only when the record is created
    pub discord_name: String,

    /// Note text
    pub text: String,
}

pub fn run_read(db: &PlayerDatabase, format: OutputFormat) -> bool {
    print_rows(db, db.read_all(), format)
}

pub fn run_get(db: &PlayerDatabase, args: GetArgs, format: OutputFormat) -> bool {
    print_rows(db, db.read_by_key(&args.discord_id), format)
}

pub fn run_set_home(db: &PlayerDatabase, args: SetHomeArgs) -> bool {
    report(&db.set_home_server(&args.discord_id, &args.server_id, &args.discord_name))
}

pub fn run_set_ign(db: &PlayerDatabase, args: SetIgnArgs) -> bool {
    let SetIgnArgs {
        discord_id,
        server_id,
        discord_name,
        ign,
    } = args;
    report(&db.set_ign(&discord_id, &server_id, &discord_name, &ign))
}

pub fn run_set_local(db: &PlayerDatabase, args: SetLocalArgs) -> bool {
    report(&db.set_local_data(&args.discord_id, &args.discord_name, &args.text))
}

pub fn run_set_global(db: &PlayerDatabase, args: SetGlobalArgs) -> bool {
    report(&db.set_global_data(&args.discord_id, &args.discord_name, &args.text))
}

/// Render a listing with the table's current column names
fn print_rows(db: &PlayerDatabase, response: DbResponse<Vec<Row>>, format: OutputFormat) -> bool {
    let rows = match (&response.data, response.is_ok()) {
        (Some(rows), true) => rows,
        _ => return report(&response),
    };

    let columns = match db.columns() {
        Ok(columns) => columns,
        Err(e) => {
            eprintln!("ERROR: Failed to read column names: {}", e);
            return false;
        }
    };

    match render_rows(&columns, rows, format) {
        Ok(out) => {
            println!("{}", out);
            true
        }
        Err(e) => {
            eprintln!("ERROR: Failed to serialize to JSON: {}", e);
            false
        }
    }
}
