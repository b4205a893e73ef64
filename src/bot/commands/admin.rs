//! Owner-only commands: table management and raw SQL
//!
//! Each handler relays the message of the repository's result envelope as is,
//! success or failure.

use crate::bot::handler::{
    usage_line, BotContext, BotError, BotResult, ChatCommand, ChatMessage,
};
use async_trait::async_trait;
use std::sync::Arc;

fn non_empty(args: &str) -> BotResult<()> {
    if args.trim().is_empty() {
        return Err(BotError::Usage(String::new()));
    }
    Ok(())
}

fn word_count(args: &str, expected: usize) -> BotResult<()> {
    if args.split_whitespace().count() != expected {
        return Err(BotError::Usage(String::new()));
    }
    Ok(())
}

// =============================================================================
// db_create / db_drop
// =============================================================================

/// Handler for `db_create`
pub struct DbCreateCommand;

#[async_trait]
impl ChatCommand for DbCreateCommand {
    const NAME: &'static str = "db_create";
    const BRIEF: &'static str = "Create the players table";
    const OWNER_ONLY: bool = true;

    async fn handle(ctx: Arc<BotContext>, _msg: ChatMessage, _args: String) -> BotResult<String> {
        ctx.with_db(|db| db.create_table().message).await
    }
}

/// Handler for `db_drop`
pub struct DbDropCommand;

#[async_trait]
impl ChatCommand for DbDropCommand {
    const NAME: &'static str = "db_drop";
    const BRIEF: &'static str = "Drop the players table";
    const OWNER_ONLY: bool = true;

    async fn handle(ctx: Arc<BotContext>, _msg: ChatMessage, _args: String) -> BotResult<String> {
        ctx.with_db(|db| db.drop_table().message).await
    }
}

// =============================================================================
// db_addcol / db_dropcol
// =============================================================================

/// Handler for `db_addcol`
pub struct DbAddColumnCommand;

#[async_trait]
impl ChatCommand for DbAddColumnCommand {
    const NAME: &'static str = "db_addcol";
    const BRIEF: &'static str = "Add a column to the players table";
    const USAGE: &'static str = "<name> <type>";
    const OWNER_ONLY: bool = true;

    fn validate(args: &str) -> BotResult<()> {
        word_count(args, 2)
    }

    async fn handle(ctx: Arc<BotContext>, _msg: ChatMessage, args: String) -> BotResult<String> {
        let mut words = args.split_whitespace().map(String::from);
        let (name, kind) = match (words.next(), words.next()) {
            (Some(name), Some(kind)) => (name, kind),
            _ => return Err(BotError::Usage(usage_line::<Self>(&ctx.config.prefix))),
        };
        ctx.with_db(move |db| db.add_column(&name, &kind).message)
            .await
    }
}

/// Handler for `db_dropcol`
pub struct DbDropColumnCommand;

#[async_trait]
impl ChatCommand for DbDropColumnCommand {
    const NAME: &'static str = "db_dropcol";
    const BRIEF: &'static str = "Drop a column from the players table";
    const USAGE: &'static str = "<name>";
    const OWNER_ONLY: bool = true;

    fn validate(args: &str) -> BotResult<()> {
        word_count(args, 1)
    }

    async fn handle(ctx: Arc<BotContext>, _msg: ChatMessage, args: String) -> BotResult<String> {
        ctx.with_db(move |db| db.drop_column(args.trim()).message)
            .await
    }
}

// =============================================================================
// db_read
// =============================================================================

/// Handler for `db_read`
pub struct DbReadCommand;

#[async_trait]
impl ChatCommand for DbReadCommand {
    const NAME: &'static str = "db_read";
    const BRIEF: &'static str = "List every player record";
    const OWNER_ONLY: bool = true;

    async fn handle(ctx: Arc<BotContext>, _msg: ChatMessage, _args: String) -> BotResult<String> {
        ctx.with_db(|db| db.read_all().message).await
    }
}

// =============================================================================
// sql / sql_fetch
// =============================================================================

/// Handler for `sql`
pub struct SqlCommand;

#[async_trait]
impl ChatCommand for SqlCommand {
    const NAME: &'static str = "sql";
    const BRIEF: &'static str = "Execute and commit a SQL statement";
    const USAGE: &'static str = "<statement>";
    const OWNER_ONLY: bool = true;

    fn validate(args: &str) -> BotResult<()> {
        non_empty(args)
    }

    async fn handle(ctx: Arc<BotContext>, _msg: ChatMessage, args: String) -> BotResult<String> {
        ctx.with_db(move |db| db.raw_commit(&args).message).await
    }
}

/// Handler for `sql_fetch`
pub struct SqlFetchCommand;

#[async_trait]
impl ChatCommand for SqlFetchCommand {
    const NAME: &'static str = "sql_fetch";
    const BRIEF: &'static str = "Run a SQL query and list the rows";
    const USAGE: &'static str = "<statement>";
    const OWNER_ONLY: bool = true;

    fn validate(args: &str) -> BotResult<()> {
        non_empty(args)
    }

    async fn handle(ctx: Arc<BotContext>, _msg: ChatMessage, args: String) -> BotResult<String> {
        ctx.with_db(move |db| db.raw_fetch(&args).message).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_addcol() {
        assert!(DbAddColumnCommand::validate("nickname TEXT").is_ok());
        assert!(DbAddColumnCommand::validate("nickname").is_err());
        assert!(DbAddColumnCommand::validate("a b c").is_err());
    }

    #[test]
    fn test_validate_sql() {
        assert!(SqlCommand::validate("SELECT 1").is_ok());
        assert!(SqlCommand::validate("   ").is_err());
        assert!(DbDropColumnCommand::validate("").is_err());
    }
}
