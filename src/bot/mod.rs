//! Chat command surface for ignbot
//!
//! The host chat platform hands every incoming message to a [`Dispatcher`];
//! the dispatcher decides whether it is a command, checks owner restrictions,
//! runs the handler and returns the reply text.
//!
//! - `handler` - `ChatCommand` trait, `BotContext` and `ChatMessage`
//! - `router` - command registry, prefix parsing and dispatch
//! - `commands` - individual command implementations
//!
//! # Usage
//!
//! ```rust,ignore
//! use ignbot::bot::{create_dispatcher, ChatMessage};
//!
//! let dispatcher = create_dispatcher(db, config);
//! let msg = ChatMessage::new("1234", "Alice", ",ign alice_in_game").in_server("5678");
//! if let Some(reply) = dispatcher.dispatch(msg).await {
//!     channel.send(reply).await?;
//! }
//! ```

pub mod commands;
pub mod handler;
pub mod router;

pub use handler::{BotContext, BotError, BotResult, ChatCommand, ChatMessage};
pub use router::{parse_command, CommandRouter, Dispatcher, HELP_COMMAND};

use crate::config::BotConfig;
use crate::database::PlayerDatabase;
use commands::*;
use std::sync::Arc;

/// Create a router with every command registered
pub fn create_router() -> CommandRouter {
    let mut router = CommandRouter::new();

    // General
    router.register::<PingCommand>();
    router.register::<AboutCommand>();

    // Player
    router.register::<DbGetRowCommand>();
    router.register::<HomeCommand>();
    router.register::<IgnCommand>();
    router.register::<LocalCommand>();
    router.register::<GlobalCommand>();

    // Admin
    router.register::<DbCreateCommand>();
    router.register::<DbDropCommand>();
    router.register::<DbAddColumnCommand>();
    router.register::<DbDropColumnCommand>();
    router.register::<DbReadCommand>();
    router.register::<SqlCommand>();
    router.register::<SqlFetchCommand>();

    router
}

/// Create a dispatcher over the full command set
pub fn create_dispatcher(db: Arc<PlayerDatabase>, config: BotConfig) -> Dispatcher {
    Dispatcher::new(create_router(), BotContext::new(db, config))
}

// =============================================================================
// Tests
// =============================================================================
