use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "neuralcord", version, about = "Conversation gate for a chat character")]
pub struct Cli {
    /// Config file. Falls back to NEURALCORD_CONFIG, then ~/.neuralcord/neuralcord.toml.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Decide once for a JSON array of messages and print the decision.
    Evaluate(EvaluateArgs),
    /// List models installed on the completion service.
    Models,
    /// Probe a model and report whether the gate would switch to it.
    SetModel(SetModelArgs),
    /// Read `Author: text` lines from stdin and print what the character is handed.
    Chat(ChatArgs),
}

#[derive(Debug, Args)]
pub struct EvaluateArgs {
    /// Character name. Defaults to bot.agent_name.
    #[arg(long)]
    pub agent: Option<String>,
    /// JSON file holding the window; stdin when omitted.
    #[arg(long)]
    pub window: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct SetModelArgs {
    pub model: String,
}

#[derive(Debug, Args)]
pub struct ChatArgs {
    #[arg(long)]
    pub agent: Option<String>,
    /// Channel ID checked against bot.allowed_channels.
    #[arg(long, default_value = "local")]
    pub channel: String,
}
