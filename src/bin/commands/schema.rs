use clap::Args;
use ignbot::PlayerDatabase;

use super::report;

/// Arguments for the AddColumn command
#[derive(Args)]
pub struct AddColumnArgs {
    /// Column name
    pub name: String,

    /// Column type (only TEXT is supported)
    #[clap(long, default_value = "TEXT")]
    pub kind: String,
}

/// Arguments for the DropColumn command
#[derive(Args)]
pub struct DropColumnArgs {
    /// Column name
    pub name: String,
}

pub fn run_init(db: &PlayerDatabase) -> bool {
    report(&db.create_table())
}

pub fn run_drop(db: &PlayerDatabase) -> bool {
    report(&db.drop_table())
}

pub fn run_add_column(db: &PlayerDatabase, args: AddColumnArgs) -> bool {
    let AddColumnArgs { name, kind } = args;
    report(&db.add_column(&name, &kind))
}

pub fn run_drop_column(db: &PlayerDatabase, args: DropColumnArgs) -> bool {
    report(&db.drop_column(&args.name))
}
