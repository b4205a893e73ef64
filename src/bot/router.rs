//! Router module for prefix command dispatch
//!
//! This module provides the `CommandRouter` which maintains a registry of
//! command handlers, and the `Dispatcher` which turns a chat message into a
//! reply.
//!
//! Dispatch rules:
//! - Messages that do not start with the prefix produce no reply.
//! - Owner-only commands are refused before the handler runs.
//! - Every handler failure becomes an `Error: ...` reply.

use crate::bot::handler::{make_handler, BotContext, BotError, ChatCommand, ChatMessage, DynHandler};
use std::collections::BTreeMap;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Name of the built-in command listing
pub const HELP_COMMAND: &str = "help";

// =============================================================================
// Router
// =============================================================================

/// Help metadata recorded at registration
#[derive(Debug, Clone, Copy)]
struct CommandInfo {
    brief: &'static str,
    usage: &'static str,
    owner_only: bool,
}

/// Router for dispatching chat commands to handlers
pub struct CommandRouter {
    /// Map from command name to handler
    handlers: HashMap<&'static str, DynHandler>,

    /// Help metadata, ordered by name
    info: BTreeMap<&'static str, CommandInfo>,
}

impl CommandRouter {
    /// Create a new empty router
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            info: BTreeMap::new(),
        }
    }

    /// Register a command handler
    pub fn register<M: ChatCommand>(&mut self) -> &mut Self {
        self.handlers.insert(M::NAME, make_handler::<M>());
        self.info.insert(
            M::NAME,
            CommandInfo {
                brief: M::BRIEF,
                usage: M::USAGE,
                owner_only: M::OWNER_ONLY,
            },
        );
        self
    }

    /// Check if a command is registered
    pub fn has_command(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Check if a command is restricted to the owner
    pub fn is_owner_only(&self, name: &str) -> bool {
        self.info.get(name).map(|i| i.owner_only).unwrap_or(false)
    }

    /// Registered command names, sorted
    pub fn command_names(&self) -> Vec<&'static str> {
        self.info.keys().copied().collect()
    }

    /// Get the handler for a command
    pub fn get_handler(&self, name: &str) -> Option<&DynHandler> {
        self.handlers.get(name)
    }

    /// Command listing shown by `help`
    pub fn help_text(&self, prefix: &str) -> String {
        let mut lines = vec!["Commands:".to_string()];
        lines.push(format!("  {}{} - List available commands", prefix, HELP_COMMAND));
        for (name, info) in &self.info {
            let synopsis = if info.usage.is_empty() {
                format!("{}{}", prefix, name)
            } else {
                format!("{}{} {}", prefix, name, info.usage)
            };
            let owner = if info.owner_only { " (owner)" } else { "" };
            lines.push(format!("  {} - {}{}", synopsis, info.brief, owner));
        }
        lines.join("\n")
    }
}

impl Default for CommandRouter {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Parsing
// =============================================================================

/// Split a prefixed message into command name and argument text
///
/// Returns `None` when the message is not addressed to the bot.
pub fn parse_command<'a>(prefix: &str, content: &'a str) -> Option<(&'a str, &'a str)> {
    let body = content.trim_start().strip_prefix(prefix)?;
    if body.is_empty() || body.starts_with(char::is_whitespace) {
        return None;
    }
    match body.split_once(char::is_whitespace) {
        Some((name, args)) => Some((name, args.trim())),
        None => Some((body.trim_end(), "")),
    }
}

// =============================================================================
// Message Dispatcher
// =============================================================================

/// Dispatcher for routing chat messages and producing replies
pub struct Dispatcher {
    /// The router with registered handlers
    router: Arc<CommandRouter>,

    /// Shared context for all handlers
    context: Arc<BotContext>,
}

impl Dispatcher {
    /// Create a new dispatcher
    pub fn new(router: CommandRouter, context: BotContext) -> Self {
        Self {
            router: Arc::new(router),
            context: Arc::new(context),
        }
    }

    /// Get a reference to the context
    pub fn context(&self) -> &Arc<BotContext> {
        &self.context
    }

    /// Get a reference to the router
    pub fn router(&self) -> &Arc<CommandRouter> {
        &self.router
    }

    /// Handle one chat message
    ///
    /// Returns the reply to post, or `None` when the message is not a command.
    pub async fn dispatch(&self, msg: ChatMessage) -> Option<String> {
        let (name, args) = parse_command(&self.context.config.prefix, &msg.content)?;
        let (name, args) = (name.to_string(), args.to_string());

        info!(
            command = name.as_str(),
            author = msg.author_id.as_str(),
            "dispatching command"
        );

        let result = self.run(&name, msg, args).await;
        Some(match result {
            Ok(reply) => reply,
            Err(e) => {
                warn!(command = name.as_str(), "command failed: {}", e);
                format!("Error: {}", e)
            }
        })
    }

    async fn run(&self, name: &str, msg: ChatMessage, args: String) -> Result<String, BotError> {
        if name == HELP_COMMAND {
            return Ok(self.router.help_text(&self.context.config.prefix));
        }

        let handler = self
            .router
            .get_handler(name)
            .ok_or_else(|| BotError::UnknownCommand(name.to_string()))?;

        if self.router.is_owner_only(name) && !self.context.is_owner(&msg.author_id) {
            return Err(BotError::NotOwner(name.to_string()));
        }

        let ctx = Arc::clone(&self.context);
        handler(ctx, msg, args).await
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_router_new() {
        let router = CommandRouter::new();
        assert!(router.command_names().is_empty());
        assert!(!router.has_command("ping"));
        assert!(!router.is_owner_only("ping"));
    }

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command(",", ",ping"), Some(("ping", "")));
        assert_eq!(
            parse_command(",", ",ign  Some Name "),
            Some(("ign", "Some Name"))
        );
        assert_eq!(
            parse_command(",", ",sql\nSELECT 1"),
            Some(("sql", "SELECT 1"))
        );
        assert_eq!(parse_command("!", "!help"), Some(("help", "")));
    }

    #[test]
    fn test_parse_command_ignored() {
        assert_eq!(parse_command(",", "hello there"), None);
        assert_eq!(parse_command(",", ","), None);
        assert_eq!(parse_command(",", ", ping"), None);
        assert_eq!(parse_command("!", ",ping"), None);
    }
}
