//! assistant-bridge CLI binary entry point.

use std::sync::Arc;
use std::time::Duration;

use assistant_bridge::agent::AssistantSession;
use assistant_bridge::chat::{ConsoleChat, IncomingMessage, StopGenerating};
use assistant_bridge::cli::{ChatArgs, Cli, Commands};
use assistant_bridge::config::BridgeConfig;
use assistant_bridge::provider::OpenAiAssistants;
use assistant_bridge::tools::{ToolInvoker, WebSearchTool};
use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = assistant_bridge::logging::init(&cli.log_level) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    let result = match cli.command {
        Commands::Chat(chat_args) => handle_chat(chat_args).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn handle_chat(args: ChatArgs) -> Result<(), Box<dyn std::error::Error>> {
    let prompt = match args.prompt {
        Some(p) => p,
        None => {
            eprintln!("Usage: assistant-bridge chat \"your message here\"");
            std::process::exit(1);
        }
    };

    let mut config = BridgeConfig::from_env();
    if let Some(model) = args.model {
        config = config.with_assistant_model(model);
    }
    if let Some(instructions) = args.instructions {
        config = config.with_instructions(instructions);
    }
    if let Some(ms) = args.throttle_ms {
        config = config.with_throttle(Duration::from_millis(ms));
    }

    let client = Arc::new(OpenAiAssistants::from_config(&config)?);
    let chat = Arc::new(ConsoleChat::new());
    let tools = ToolInvoker::new().with_tool(Arc::new(WebSearchTool::new(config.clone())));

    let session =
        AssistantSession::start(client, chat, tools, config, args.channel.clone()).await?;

    let message = IncomingMessage {
        id: uuid::Uuid::new_v4().to_string(),
        channel_id: args.channel,
        text: prompt,
        ai_generated: false,
    };
    let Some(handle) = session.handle_message(&message).await? else {
        return Ok(());
    };

    // Ctrl-C stops generation instead of killing the process mid-update.
    let reply_id = handle.reply.id.clone();
    let stop_signals = session.stop_signals().clone();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            stop_signals.dispatch(StopGenerating::new(reply_id));
        }
    });

    handle.finished().await;
    interrupt.abort();
    println!(); // newline after streaming

    Ok(())
}
