//! Player commands
//!
//! These act on the author's own record, keyed by their platform user id.

use crate::bot::handler::{BotContext, BotError, BotResult, ChatCommand, ChatMessage};
use async_trait::async_trait;
use std::sync::Arc;

fn required_text(args: &str) -> BotResult<()> {
    if args.trim().is_empty() {
        return Err(BotError::Usage(String::new()));
    }
    Ok(())
}

fn server_of<M: ChatCommand>(msg: &ChatMessage) -> BotResult<String> {
    msg.server_id
        .clone()
        .ok_or_else(|| BotError::ServerOnly(M::NAME.to_string()))
}

// =============================================================================
// db_getrow
// =============================================================================

/// Handler for `db_getrow`
pub struct DbGetRowCommand;

#[async_trait]
impl ChatCommand for DbGetRowCommand {
    const NAME: &'static str = "db_getrow";
    const BRIEF: &'static str = "Show your stored record";

    async fn handle(ctx: Arc<BotContext>, msg: ChatMessage, _args: String) -> BotResult<String> {
        ctx.with_db(move |db| db.read_by_key(&msg.author_id).message)
            .await
    }
}

// =============================================================================
// home
// =============================================================================

/// Handler for `home`
pub struct HomeCommand;

#[async_trait]
impl ChatCommand for HomeCommand {
    const NAME: &'static str = "home";
    const BRIEF: &'static str = "Make this server your home server";

    async fn handle(ctx: Arc<BotContext>, msg: ChatMessage, _args: String) -> BotResult<String> {
        let server_id = server_of::<Self>(&msg)?;
        ctx.with_db(move |db| {
            db.set_home_server(&msg.author_id, &server_id, &msg.author_name)
                .message
        })
        .await
    }
}

// =============================================================================
// ign
// =============================================================================

/// Handler for `ign`
///
/// Without an argument it shows the stored name; with one it sets it.
pub struct IgnCommand;

#[async_trait]
impl ChatCommand for IgnCommand {
    const NAME: &'static str = "ign";
    const BRIEF: &'static str = "Show or set your in-game name";
    const USAGE: &'static str = "[name]";

    async fn handle(ctx: Arc<BotContext>, msg: ChatMessage, args: String) -> BotResult<String> {
        let ign = args.trim().to_string();
        if ign.is_empty() {
            return ctx
                .with_db(move |db| db.find_player(&msg.author_id).message)
                .await;
        }

        let server_id = server_of::<Self>(&msg)?;
        ctx.with_db(move |db| {
            db.set_ign(&msg.author_id, &server_id, &msg.author_name, &ign)
                .message
        })
        .await
    }
}

// =============================================================================
// local / global
// =============================================================================

/// Handler for `local`
pub struct LocalCommand;

#[async_trait]
impl ChatCommand for LocalCommand {
    const NAME: &'static str = "local";
    const BRIEF: &'static str = "Save a note for this server";
    const USAGE: &'static str = "<text>";

    fn validate(args: &str) -> BotResult<()> {
        required_text(args)
    }

    async fn handle(ctx: Arc<BotContext>, msg: ChatMessage, args: String) -> BotResult<String> {
        ctx.with_db(move |db| {
            db.set_local_data(&msg.author_id, &msg.author_name, args.trim())
                .message
        })
        .await
    }
}

/// Handler for `global`
pub struct GlobalCommand;

#[async_trait]
impl ChatCommand for GlobalCommand {
    const NAME: &'static str = "global";
    const BRIEF: &'static str = "Save a note shared across servers";
    const USAGE: &'static str = "<text>";

    fn validate(args: &str) -> BotResult<()> {
        required_text(args)
    }

    async fn handle(ctx: Arc<BotContext>, msg: ChatMessage, args: String) -> BotResult<String> {
        ctx.with_db(move |db| {
            db.set_global_data(&msg.author_id, &msg.author_name, args.trim())
                .message
        })
        .await
    }
}
