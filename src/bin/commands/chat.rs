use clap::Args;
use ignbot::bot::{create_dispatcher, ChatMessage};
use ignbot::{BotConfig, PlayerDatabase};
use std::io::{BufRead, Write};
use std::sync::Arc;

/// Arguments for the Chat command
#[derive(Args)]
pub struct ChatArgs {
    /// User id the typed messages are sent as
    #[clap(long, default_value = "0")]
    pub author_id: String,

    /// Display name the typed messages are sent as
    #[clap(long, default_value = "console")]
    pub author_name: String,

    /// Server the messages are sent in; omit to act as a direct message
    #[clap(long)]
    pub server_id: Option<String>,
}

/// Read messages from stdin, one per line, and print the bot's replies
pub fn run(db: PlayerDatabase, config: BotConfig, args: ChatArgs) -> bool {
    let ChatArgs {
        author_id,
        author_name,
        server_id,
    } = args;

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("ERROR: Failed to start runtime: {}", e);
            return false;
        }
    };

    let prefix = config.prefix.clone();
    let dispatcher = create_dispatcher(Arc::new(db), config);

    eprintln!(
        "Chatting as {} ({}). Commands start with '{}'; try {}help. Ctrl-D to quit.",
        author_name, author_id, prefix, prefix
    );

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                eprintln!("ERROR: {}", e);
                return false;
            }
        };

        let mut msg = ChatMessage::new(author_id.as_str(), author_name.as_str(), line);
        if let Some(server) = &server_id {
            msg = msg.in_server(server.as_str());
        }

        if let Some(reply) = runtime.block_on(dispatcher.dispatch(msg)) {
            if let Err(e) = writeln!(stdout, "{}", reply) {
                if e.kind() != std::io::ErrorKind::BrokenPipe {
                    eprintln!("{e}");
                }
                return false;
            }
        }
    }

    true
}
