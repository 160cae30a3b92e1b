//! textbook-chat - chat client and same-origin gateway for the textbook site
//!
//! Usage:
//!   textbook-chat serve                      Serve the site and proxy /api
//!   textbook-chat chat                       Interactive chat in the terminal
//!   textbook-chat ask --text "..." "why?"    Ask about a passage
//!   textbook-chat health                     Probe the backend

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use textbook_chat::config::Settings;
use textbook_chat::routes;
use textbook_chat::services::ask_panel::AskPanel;
use textbook_chat::services::client::ChatClient;
use textbook_chat::services::conversation::ChatSession;
use textbook_chat::state::AppState;

#[derive(Parser)]
#[command(name = "textbook-chat", version, about, long_about = None)]
struct Cli {
    /// Backend base URL, overrides the hostname heuristic
    #[arg(long, env = "TEXTBOOK_API_URL", global = true)]
    api_url: Option<String>,

    /// Hostname the client pretends to be served from
    #[arg(long, env = "TEXTBOOK_HOSTNAME", global = true)]
    hostname: Option<String>,

    /// Passages retrieved per chat question (TEXTBOOK_TOP_K is read by settings)
    #[arg(long, global = true, value_parser = clap::value_parser!(u32).range(1..))]
    top_k: Option<u32>,

    /// Restrict questions to one chapter
    #[arg(long, global = true)]
    chapter: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve static assets and forward /api/* to the retrieval service
    Serve {
        #[arg(long, env = "TEXTBOOK_BIND_ADDR")]
        bind: Option<String>,
        #[arg(long, env = "TEXTBOOK_UPSTREAM_URL")]
        upstream: Option<String>,
        #[arg(long, env = "TEXTBOOK_STATIC_DIR")]
        static_dir: Option<PathBuf>,
    },

    /// Chat with the textbook assistant
    Chat,

    /// Ask a question about a selected passage
    Ask {
        /// The selected passage
        #[arg(long)]
        text: String,
        question: String,
    },

    /// Check whether the backend is reachable
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("textbook_chat=info".parse()?),
        )
        .init();

    // Loads .env, so it must run before clap reads env fallbacks.
    let mut settings = Settings::from_env();
    let cli = Cli::parse();

    apply_overrides(&mut settings, &cli);

    match cli.command {
        Commands::Serve {
            bind,
            upstream,
            static_dir,
        } => {
            if let Some(bind) = bind {
                settings.bind_addr = bind;
            }
            if let Some(upstream) = upstream {
                settings.upstream_url = upstream;
            }
            if let Some(dir) = static_dir {
                settings.static_dir = dir;
            }
            serve(&settings).await
        }
        Commands::Chat => chat(&settings, cli.chapter).await,
        Commands::Ask { text, question } => ask(&settings, cli.chapter, &text, &question).await,
        Commands::Health => {
            let client = client_for(&settings);
            if client.check_health().await {
                println!("backend is up at {}", client.base_url());
                Ok(())
            } else {
                bail!("backend unreachable at {}", client.base_url())
            }
        }
    }
}

/// Flags given on the command line win over the environment.
fn apply_overrides(settings: &mut Settings, cli: &Cli) {
    if cli.api_url.is_some() {
        settings.api_url = cli.api_url.clone();
    }
    if cli.hostname.is_some() {
        settings.hostname = cli.hostname.clone();
    }
    if let Some(top_k) = cli.top_k {
        settings.top_k = top_k;
    }
}

fn client_for(settings: &Settings) -> ChatClient {
    let base = settings.base_url();
    info!(%base, "resolved backend base URL");
    ChatClient::new(base).with_default_top_k(settings.top_k)
}

async fn serve(settings: &Settings) -> Result<()> {
    let state = Arc::new(AppState::new(settings.upstream_url.clone()));
    let app = routes::create_router(&settings.static_dir).with_state(state);

    let listener = tokio::net::TcpListener::bind(&settings.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", settings.bind_addr))?;

    info!(
        addr = %settings.bind_addr,
        upstream = %settings.upstream_url,
        "textbook gateway listening"
    );
    axum::serve(listener, app).await?;
    Ok(())
}

async fn chat(settings: &Settings, chapter: Option<String>) -> Result<()> {
    let mut session = ChatSession::new(client_for(settings));
    if let Some(chapter) = chapter {
        session = session.with_chapter(chapter);
    }

    println!("{}\n", session.conversation().messages()[0].content);
    for (i, question) in session.conversation().suggestions().iter().enumerate() {
        println!("  [{}] {}", i + 1, question);
    }
    println!("\nType a question, a number to pick a suggestion, or /quit.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line == "/quit" {
            break;
        }

        let suggestion = line
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .filter(|i| *i < session.conversation().suggestions().len());

        let reply = match suggestion {
            Some(index) => session.submit_suggestion(index).await,
            None => session.submit(line).await,
        };
        if let Some(reply) = reply {
            println!("\n{}\n", reply.content);
        }
    }
    Ok(())
}

async fn ask(settings: &Settings, chapter: Option<String>, text: &str, question: &str) -> Result<()> {
    let client = client_for(settings);
    let mut panel = AskPanel::open(text);
    if let Some(chapter) = chapter {
        panel = panel.with_chapter(chapter);
    }
    panel.set_question(question);
    panel.submit(&client).await;

    if let Some(error) = panel.error() {
        bail!("{error}");
    }
    if let Some(answer) = panel.answer() {
        println!("{answer}");
    }
    for ctx in panel.contexts() {
        println!("  - {} / {} ({:.2})", ctx.title, ctx.heading, ctx.score);
    }
    Ok(())
}
