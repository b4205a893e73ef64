use clap::Args;
use ignbot::output::{render_rows, OutputFormat};
use ignbot::PlayerDatabase;

use super::report;

/// Arguments for the Sql command
#[derive(Args)]
pub struct SqlArgs {
    /// SQL statement, executed as given
    pub statement: String,

    /// Run as a query and print the returned rows
    #[clap(long)]
    pub fetch: bool,
}

pub fn run(db: &PlayerDatabase, args: SqlArgs, format: OutputFormat) -> bool {
    let SqlArgs { statement, fetch } = args;

    if !fetch {
        return report(&db.raw_commit(&statement));
    }

    let response = db.raw_fetch(&statement);
    if format == OutputFormat::Table || response.is_err() {
        // the numbered listing is the default query output
        return report(&response);
    }

    // arbitrary queries have no known column names
    let rows = response.data.unwrap_or_default();
    let width = rows.first().map(|r| r.len()).unwrap_or(0);
    let columns: Vec<String> = (0..width).map(|i| format!("col{}", i)).collect();
    match render_rows(&columns, &rows, format) {
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
