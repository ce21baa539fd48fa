use std::io::Read;

use anyhow::{bail, Context};
use chrono::Utc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use neuralcord_core::{ContextWindow, Decision, NeuralcordConfig};
use neuralcord_filter::{ClassifierClient, FilterGate, OllamaClassifier};
use neuralcord_sessions::{is_channel_allowed, ChannelKey, ChannelSessions};

use crate::cli::{ChatArgs, EvaluateArgs, SetModelArgs};
use crate::input::parse_line;

fn build_gate(config: &NeuralcordConfig) -> FilterGate {
    FilterGate::with_ollama(config.filter.clone())
}

fn agent_name(config: &NeuralcordConfig, flag: Option<String>) -> String {
    flag.unwrap_or_else(|| config.bot.agent_name.clone())
}

pub async fn evaluate(config: &NeuralcordConfig, args: EvaluateArgs) -> anyhow::Result<()> {
    let window = match &args.window {
        Some(path) => ContextWindow::read_json_file(path)
            .with_context(|| format!("reading window from {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            ContextWindow::from_json(&buf).context("window must be a JSON array of messages")?
        }
    };
    let window = ContextWindow::bounded(window.into_messages(), config.filter.max_context_messages);

    let gate = build_gate(config);
    let agent = agent_name(config, args.agent);
    let decision = gate.evaluate(&window, &agent).await;
    println!("{}", serde_json::to_string_pretty(&decision)?);
    Ok(())
}

pub async fn models(config: &NeuralcordConfig) -> anyhow::Result<()> {
    let client = OllamaClassifier::new(Some(config.filter.endpoint.clone()));
    let models = client.list_models().await?;
    for name in models {
        let marker = if name == config.filter.model
            || name.strip_suffix(":latest") == Some(config.filter.model.as_str())
        {
            "*"
        } else {
            " "
        };
        println!("{marker} {name}");
    }
    Ok(())
}

pub async fn set_model(config: &NeuralcordConfig, args: SetModelArgs) -> anyhow::Result<()> {
    let gate = build_gate(config);
    if !gate.set_model(&args.model).await {
        bail!("model '{}' is not available at {}", args.model, config.filter.endpoint);
    }
    println!("classifier model: {}", gate.model().await);
    Ok(())
}

/// Line-driven stand-in for a chat adapter: records each message, asks the
/// gate, and prints the payload when the character would speak.
pub async fn chat(config: &NeuralcordConfig, args: ChatArgs) -> anyhow::Result<()> {
    if !is_channel_allowed(&config.bot.allowed_channels, &args.channel) {
        bail!("channel '{}' is not in bot.allowed_channels", args.channel);
    }

    let gate = build_gate(config);
    let sessions = ChannelSessions::from_config(&config.filter, &config.bot);
    let key = ChannelKey::new("stdin", args.channel);
    let agent = agent_name(config, args.agent);
    info!(agent = %agent, channel = %key, "chat session started");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let Some(msg) = parse_line(&line, Utc::now()) else {
            debug!(line = %line, "skipping line without author");
            continue;
        };
        // the character's own lines go into the window but never trigger a reply
        let own = msg.author.eq_ignore_ascii_case(&agent);
        sessions.record(&key, msg);
        if own {
            continue;
        }

        let window = sessions.window(&key);
        match gate.evaluate(&window, &agent).await {
            Decision::Respond(payload) => {
                let now = Utc::now();
                if let Some(left) = sessions.cooldown_remaining(&key, now) {
                    info!(remaining_ms = left.num_milliseconds(), "cooling down, reply skipped");
                    continue;
                }
                sessions.mark_replied(&key, now);
                println!("{payload}\n");
            }
            Decision::Inappropriate(reason) => {
                info!(reason = reason.as_deref().unwrap_or(""), "conversation flagged");
            }
            Decision::Ignore(reason) => {
                debug!(reason = reason.as_deref().unwrap_or(""), "staying quiet");
            }
        }
    }
    Ok(())
}
