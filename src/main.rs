//! CLI for topicwire
//!
//! Subcommands:
//! - `chat`: publish messages into a room and print what a member of the room receives
//! - `counter`: drive the shared counter and print the `even` notifications

use clap::Parser;
use futures::FutureExt;
use futures_util::StreamExt;
use serde_json::json;
use topicwire::PubSub;
use topicwire::config::{Settings, load_config};
use topicwire::resolvers::{ChatMessage, ChatRoom, Counter, CounterCommand, MessageType};
use topicwire::utils::logging;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "topicwire")]
enum Command {
    /// Publish messages into a chat room and print what a room member receives
    Chat {
        /// Room number the messages are sent to
        #[arg(long, default_value_t = 1)]
        room: u32,
        /// Message kind: `chat` or `notice`
        #[arg(long, default_value = "chat")]
        kind: MessageType,
        #[arg(required = true)]
        messages: Vec<String>,
    },
    /// Apply counter commands (`up` / `down`) and print `even` notifications
    Counter {
        #[arg(required = true)]
        commands: Vec<CounterCommand>,
    },
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cmd = Command::parse();

    let settings = match load_config() {
        Ok(settings) => settings,
        Err(e) => {
            logging::init("info");
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    logging::init(&settings.logging.level);

    let result = match cmd {
        Command::Chat {
            room,
            kind,
            messages,
        } => run_chat(&settings, room, kind, messages).await,
        Command::Counter { commands } => run_counter(&settings, commands).await,
    };

    if let Err(e) = result {
        error!("Command failed: {}", e);
        std::process::exit(1);
    }
}

async fn run_chat(
    settings: &Settings,
    room: u32,
    kind: MessageType,
    messages: Vec<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let chat = ChatRoom::new(PubSub::from_settings(settings)?);
    let mut member = chat.enter_chat_room(room)?;
    info!("Entered chat room {}", room);

    for contents in messages {
        let sent = chat.new_message(ChatMessage {
            chat_room_number: room,
            contents,
            message_type: kind,
        })?;

        // publishing enqueues synchronously, so anything delivered is already buffered
        match member.next().now_or_never() {
            Some(Some(received)) => println!("{}", serde_json::to_string(&received)?),
            _ => info!("Not delivered (odd length): '{}'", sent.contents),
        }
    }

    Ok(())
}

async fn run_counter(
    settings: &Settings,
    commands: Vec<CounterCommand>,
) -> Result<(), Box<dyn std::error::Error>> {
    let counter = Counter::new(PubSub::from_settings(settings)?)?;
    let mut evens = counter.subscribe_even()?;

    for command in commands {
        let value = counter.count(command);
        println!("{}", json!({ "command": command, "value": value }));

        while let Some(Some(notified)) = evens.next().now_or_never() {
            println!("{}", json!({ "even": notified }));
        }
    }

    info!("Final counter value: {}", counter.value());
    Ok(())
}
