//! CLI entry point for assistant-bridge.

use clap::{Parser, Subcommand};

/// assistant-bridge CLI
#[derive(Parser, Debug)]
#[command(name = "assistant-bridge", version, about = "Chat ⇄ assistant-run bridge")]
pub struct Cli {
    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send one message and stream the assistant's reply to the terminal
    Chat(ChatArgs),
}

/// Arguments for the `chat` subcommand.
#[derive(Parser, Debug)]
pub struct ChatArgs {
    /// Assistant model (overrides OPENAI_ASSISTANT_MODEL)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Assistant instructions (overrides BRIDGE_ASSISTANT_INSTRUCTIONS)
    #[arg(short, long)]
    pub instructions: Option<String>,

    /// Minimum milliseconds between partial updates
    #[arg(long)]
    pub throttle_ms: Option<u64>,

    /// Channel id used for the console session
    #[arg(long, default_value = "cli:local")]
    pub channel: String,

    /// User message (positional)
    pub prompt: Option<String>,
}
