//! General commands that do not touch the database

use crate::bot::handler::{BotContext, BotResult, ChatCommand, ChatMessage};
use async_trait::async_trait;
use std::sync::Arc;

/// Text returned by `about`
pub const ABOUT_TEXT: &str = "ignbot keeps track of players' in-game names, home servers \
and notes. Use the help command to see what it can do.";

// =============================================================================
// ping
// =============================================================================

/// Handler for `ping`
pub struct PingCommand;

#[async_trait]
impl ChatCommand for PingCommand {
    const NAME: &'static str = "ping";
    const BRIEF: &'static str = "Check that the bot is alive";

    async fn handle(_ctx: Arc<BotContext>, _msg: ChatMessage, _args: String) -> BotResult<String> {
        Ok("Pong!".to_string())
    }
}

// =============================================================================
// about
// =============================================================================

/// Handler for `about`
pub struct AboutCommand;

#[async_trait]
impl ChatCommand for AboutCommand {
    const NAME: &'static str = "about";
    const BRIEF: &'static str = "Describe the bot";

    async fn handle(_ctx: Arc<BotContext>, _msg: ChatMessage, _args: String) -> BotResult<String> {
        Ok(ABOUT_TEXT.to_string())
    }
}
