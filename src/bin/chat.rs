//! Terminal client for a running EduMind gateway
//!
//! Reads lines from stdin and prints the assistant's replies. `/reset`
//! starts over, `/quit` exits.

use clap::Parser;
use edumind_gateway::conversation::{ConvContext, Message, Role, TransitionError};
use edumind_gateway::i18n::{Catalog, Language, MissingKeyPolicy};
use edumind_gateway::proxy::{Routes, UpstreamClient};
use edumind_gateway::runtime::{ConversationController, ProxyBackend};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

#[derive(Debug, Parser)]
#[command(name = "edumind-chat", version, about = "Chat with an EduMind gateway")]
struct Args {
    /// Gateway base URL
    #[arg(long, default_value = "http://localhost:3000")]
    gateway: String,

    /// Interface language (en or ar)
    #[arg(long, default_value_t = Language::En)]
    language: Language,

    /// Per-request timeout in seconds; 0 waits indefinitely
    #[arg(long, default_value_t = 120)]
    timeout: u64,
}

/// What a line of input asks for
#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Quit,
    Reset,
    Submit(&'a str),
}

impl<'a> Command<'a> {
    fn parse(line: &'a str) -> Self {
        match line.trim() {
            "/quit" => Command::Quit,
            "/reset" => Command::Reset,
            _ => Command::Submit(line),
        }
    }
}

/// Assistant messages appended after the first `shown` messages
fn new_replies(messages: &[Message], shown: usize) -> impl Iterator<Item = &str> {
    messages
        .iter()
        .skip(shown)
        .filter(|m| m.role == Role::Assistant)
        .map(|m| m.content.as_str())
}

/// Drive one conversation from `input` until it ends or `/quit`
async fn run<B, R, W>(
    controller: &Arc<ConversationController<B>>,
    catalog: &Catalog,
    input: R,
    out: &mut W,
) -> std::io::Result<()>
where
    B: ProxyBackend + 'static,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let language = controller.language();
    let mut lines = input.lines();
    let mut shown = 0;

    while let Some(line) = lines.next_line().await? {
        match Command::parse(&line) {
            Command::Quit => break,
            Command::Reset => {
                controller.reset().await;
                shown = 0;
                writeln!(out, "{}", catalog.text(language, "resetChat"))?;
            }
            Command::Submit(text) => match controller.submit(text).await {
                Ok(view) => {
                    for reply in new_replies(&view.messages, shown) {
                        writeln!(out, "{reply}")?;
                    }
                    shown = view.messages.len();
                }
                Err(TransitionError::EmptyMessage) => {}
                Err(e) => eprintln!("{e}"),
            },
        }
        out.flush()?;
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "edumind_gateway=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let timeout = (args.timeout > 0).then(|| Duration::from_secs(args.timeout));

    let catalog = Catalog::load(MissingKeyPolicy::Fallback)?;
    let backend = UpstreamClient::new(&args.gateway, timeout, Routes::GATEWAY)?;
    let context = ConvContext::new(uuid::Uuid::new_v4().to_string(), args.language, &catalog);
    let controller = Arc::new(ConversationController::new(context, Arc::new(backend), timeout));

    let status_key = if controller.check_connection().await {
        "connected"
    } else {
        "notConnected"
    };
    println!("{}", catalog.text(args.language, status_key));
    println!("{}", catalog.text(args.language, "smartExamCreation"));

    let stdin = BufReader::new(tokio::io::stdin());
    run(&controller, &catalog, stdin, &mut std::io::stdout()).await?;

    Ok(())
}
