//! Handler trait and context for chat commands
//!
//! This module defines the `ChatCommand` trait which every command implements,
//! along with the `BotContext` which gives handlers access to the player
//! database and configuration.

use crate::config::BotConfig;
use crate::database::PlayerDatabase;
use async_trait::async_trait;
use std::sync::Arc;

// =============================================================================
// Context
// =============================================================================

/// Shared resources passed to every handler
pub struct BotContext {
    /// Player database, shared by all handlers
    pub db: Arc<PlayerDatabase>,

    /// Bot configuration (prefix, owner)
    pub config: BotConfig,
}

impl BotContext {
    pub fn new(db: Arc<PlayerDatabase>, config: BotConfig) -> Self {
        Self { db, config }
    }

    /// Whether `user_id` may run owner-only commands
    pub fn is_owner(&self, user_id: &str) -> bool {
        self.config.owner_id.as_deref() == Some(user_id)
    }

    /// Run a database call on the blocking thread pool
    ///
    /// Statements block until SQLite returns, so they never run on the async
    /// executor directly.
    pub async fn with_db<T, F>(&self, f: F) -> BotResult<T>
    where
        F: FnOnce(&PlayerDatabase) -> T + Send + 'static,
        T: Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || f(&db))
            .await
            .map_err(|e| BotError::Internal(format!("database task failed: {}", e)))
    }
}

// =============================================================================
// Message
// =============================================================================

/// A chat message as delivered by the host platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// Platform user id of the author
    pub author_id: String,

    /// Display name of the author
    pub author_name: String,

    /// Server (guild) the message was sent in, `None` for direct messages
    pub server_id: Option<String>,

    /// Raw message text
    pub content: String,
}

impl ChatMessage {
    pub fn new(
        author_id: impl Into<String>,
        author_name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            author_id: author_id.into(),
            author_name: author_name.into(),
            server_id: None,
            content: content.into(),
        }
    }

    /// Set the server the message was sent in
    pub fn in_server(mut self, server_id: impl Into<String>) -> Self {
        self.server_id = Some(server_id.into());
        self
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Result type for command handlers
pub type BotResult<T> = Result<T, BotError>;

/// Failures that stop a command before it produces a reply of its own
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotError {
    /// Arguments missing or malformed; carries the usage line
    Usage(String),
    /// Command used outside a server
    ServerOnly(String),
    /// Caller is not the bot owner
    NotOwner(String),
    /// No command under that name
    UnknownCommand(String),
    /// Handler infrastructure failed
    Internal(String),
}

impl std::fmt::Display for BotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BotError::Usage(usage) => write!(f, "usage: {}", usage),
            BotError::ServerOnly(name) => {
                write!(f, "command {} can only be used inside a server", name)
            }
            BotError::NotOwner(name) => {
                write!(f, "command {} is restricted to the bot owner", name)
            }
            BotError::UnknownCommand(name) => write!(f, "unknown command \"{}\"", name),
            BotError::Internal(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for BotError {}

// =============================================================================
// Handler Trait
// =============================================================================

/// Trait for chat command handlers
///
/// Each command implements this trait to define:
/// - The command name (e.g., "db_read")
/// - A one-line description for `help`
/// - Whether only the bot owner may run it
/// - How to validate its argument text
/// - How to execute it and what to reply
#[async_trait]
pub trait ChatCommand: Send + Sync + 'static {
    /// Command name as typed after the prefix
    const NAME: &'static str;

    /// One-line description shown by `help`
    const BRIEF: &'static str;

    /// Argument synopsis, empty for commands without arguments
    const USAGE: &'static str = "";

    /// Restrict the command to the configured owner
    const OWNER_ONLY: bool = false;

    /// Validate the argument text before running
    fn validate(_args: &str) -> BotResult<()> {
        Ok(())
    }

    /// Execute the command and return the reply text
    async fn handle(ctx: Arc<BotContext>, msg: ChatMessage, args: String) -> BotResult<String>;
}

/// Usage line for a command: `<prefix><name> <usage>`
pub fn usage_line<M: ChatCommand>(prefix: &str) -> String {
    if M::USAGE.is_empty() {
        format!("{}{}", prefix, M::NAME)
    } else {
        format!("{}{} {}", prefix, M::NAME, M::USAGE)
    }
}

// =============================================================================
// Handler Registration
// =============================================================================

/// Type-erased handler function
pub type DynHandler = Box<
    dyn Fn(Arc<BotContext>, ChatMessage, String) -> futures::future::BoxFuture<'static, BotResult<String>>
        + Send
        + Sync,
>;

/// Create a type-erased handler from a ChatCommand implementation
pub fn make_handler<M: ChatCommand>() -> DynHandler {
    Box::new(move |ctx, msg, args| {
        Box::pin(async move {
            if M::validate(&args).is_err() {
                return Err(BotError::Usage(usage_line::<M>(&ctx.config.prefix)));
            }
            M::handle(ctx, msg, args).await
        })
    })
}

// =============================================================================
// Tests
// =============================================================================
