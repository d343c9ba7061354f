use anyhow::{anyhow, Context, Result};
use bat::PrettyPrinter;
use clap::Parser;
use cliclack::{input, spinner};
use console::style;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use helpdesk::agent::SupportAgent;
use helpdesk::configuration::Settings;
use helpdesk::providers::chat_model::ChatModel;
use helpdesk::providers::pollinations::PollinationsClient;
use helpdesk::providers::types::message::{Message, Role};
use helpdesk::providers::types::objectid::create_object_id;
use helpdesk::tools::{lookup_policy, Toolbox};

#[derive(Parser)]
#[command(author, version, about = "Retail customer support assistant", long_about = None)]
struct Cli {
    /// Ask a question without the interactive prompt (repeatable)
    #[arg(short, long)]
    question: Vec<String>,

    /// Chat completions host (can also be set via HELPDESK_PROVIDER__HOST)
    #[arg(long)]
    host: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut settings = Settings::new().context("Failed to load configuration")?;
    if let Some(host) = cli.host {
        settings.provider.host = host;
    }

    let transport = PollinationsClient::new(settings.provider)?;
    let model = ChatModel::new(Arc::new(transport), settings.model);
    let agent = SupportAgent::new(&model, Toolbox::new(vec![lookup_policy()]), settings.agent)?;

    let session_id = create_object_id("session");
    let _session = tracing::info_span!("session", id = %session_id).entered();
    let mut history = Vec::new();

    if !cli.question.is_empty() {
        for question in &cli.question {
            ask(&agent, &mut history, question)?;
        }
        return Ok(());
    }

    println!(
        "Customer support assistant {}",
        style("- type \"exit\" to end the session").dim()
    );
    println!("\n");

    loop {
        let message_text: String = input("Message:").placeholder("").multiline().interact()?;

        if message_text.trim().eq_ignore_ascii_case("exit") {
            break;
        }

        ask(&agent, &mut history, &message_text)?;
        println!("\n");
    }
    Ok(())
}

fn ask(agent: &SupportAgent, history: &mut Vec<Message>, question: &str) -> Result<()> {
    let user_message = Message::user(question);
    println!("{}", user_message.summary());
    history.push(user_message);

    let spin = spinner();
    spin.start("awaiting reply");
    let result = agent.reply(history);
    spin.stop("");

    for message in result? {
        display(&message)?;
    }
    Ok(())
}

fn display(message: &Message) -> Result<()> {
    if message.role == Role::Assistant && !message.has_tool_calls() {
        println!("{}", style(" Ai Message ").bold());
        render(&message.content)
    } else {
        println!("{}", message.summary());
        Ok(())
    }
}

fn render(content: &str) -> Result<()> {
    PrettyPrinter::new()
        .input_from_bytes(content.as_bytes())
        .language("markdown")
        .print()
        .map_err(|e| anyhow!("Failed to render reply: {}", e))?;
    Ok(())
}
