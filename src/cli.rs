//! Gated Chat - Terminal Client
//!
//! Signs in through the auth proxy, asks it for the chat gate signal and
//! talks to the answering service from the terminal.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gated_chat::chat::widget::{
    CLOSE_LABEL, HEADER_SUBTITLE, HEADER_TITLE, INPUT_PLACEHOLDER, LAUNCHER_LABEL,
};
use gated_chat::chat::{ChatConfig, ChatSession, Role, TurnDispatcher};
use gated_chat::gate;
use reqwest::Client;
use serde_json::{json, Value};
use std::io::Write;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser)]
#[command(name = "chat")]
#[command(about = "Terminal client for the gated chat")]
struct Cli {
    /// Auth proxy URL
    #[arg(long, env = "CHAT_PROXY_URL", default_value = "http://localhost:3000")]
    proxy: String,

    /// Answering service base URL
    #[arg(long, env = "CHAT_ENDPOINT_URL", default_value = "http://localhost:8080")]
    endpoint: String,

    /// Chat request timeout in seconds (default: wait indefinitely)
    #[arg(long, env = "CHAT_REQUEST_TIMEOUT_SECS")]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check credentials against the auth proxy
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,
    },

    /// Clear the session cookie
    Logout,

    /// Start a conversation (signs in first when credentials are given)
    Talk {
        #[arg(short, long)]
        email: Option<String>,

        #[arg(short, long)]
        password: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let proxy = cli.proxy.trim_end_matches('/').to_string();
    let client = proxy_client()?;

    match cli.command {
        Commands::Login { email, password } => {
            sign_in(&client, &proxy, &email, &password).await;
            Ok(())
        }
        Commands::Logout => {
            sign_out(&client, &proxy).await;
            Ok(())
        }
        Commands::Talk { email, password } => {
            let mut chat_config = ChatConfig::new(cli.endpoint);
            if let Some(secs) = cli.timeout {
                chat_config = chat_config.with_timeout(Duration::from_secs(secs));
            }
            talk(&client, &proxy, chat_config, email, password).await
        }
    }
}

/// HTTP client for the proxy. Keeps cookies for the lifetime of the process.
fn proxy_client() -> Result<Client> {
    Client::builder()
        .cookie_store(true)
        .build()
        .context("Failed to create HTTP client")
}

async fn sign_in(client: &Client, proxy: &str, email: &str, password: &str) -> bool {
    let resp = match client
        .post(format!("{}/api/authenticate", proxy))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
    {
        Ok(resp) => resp,
        Err(e) => {
            tracing::debug!("Login request failed: {}", e);
            println!("Network error");
            return false;
        }
    };

    if resp.status().is_success() {
        println!("Signed in as {}", email);
        return true;
    }

    let message = resp
        .json::<Value>()
        .await
        .ok()
        .and_then(|body| body.get("message").and_then(Value::as_str).map(str::to_string))
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| "Authentication failed".to_string());
    println!("{}", message);
    false
}

async fn sign_out(client: &Client, proxy: &str) {
    match client.post(format!("{}/api/logout", proxy)).send().await {
        Ok(resp) if resp.status().is_success() => println!("Signed out"),
        Ok(_) => println!("Logout failed"),
        Err(e) => {
            tracing::debug!("Logout request failed: {}", e);
            println!("Network error");
        }
    }
}

/// Ask the proxy whether this client holds the session cookie.
async fn auth_signal(client: &Client, proxy: &str) -> bool {
    let resp = client.get(format!("{}/api/session", proxy)).send().await;
    match resp {
        Ok(resp) => resp
            .json::<Value>()
            .await
            .ok()
            .and_then(|body| body["authenticated"].as_bool())
            .unwrap_or(false),
        Err(e) => {
            tracing::warn!("Could not reach auth proxy: {}", e);
            false
        }
    }
}

async fn talk(
    client: &Client,
    proxy: &str,
    chat_config: ChatConfig,
    email: Option<String>,
    password: Option<String>,
) -> Result<()> {
    let signed_in = match (email, password) {
        (Some(email), Some(password)) => sign_in(client, proxy, &email, &password).await,
        _ => false,
    };

    let dispatcher = TurnDispatcher::from_config(&chat_config)?;
    let Some(session) = gate::mount(auth_signal(client, proxy).await, dispatcher) else {
        println!("Sign in to chat: chat talk --email <EMAIL> --password <PASSWORD>");
        return Ok(());
    };

    session.open().await;
    run_repl(&session).await?;

    if signed_in {
        sign_out(client, proxy).await;
    }
    Ok(())
}

async fn run_repl(session: &ChatSession) -> Result<()> {
    print_header();
    let mut rendered = render_new_turns(session, 0).await;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print_prompt(session).await?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        match line.trim() {
            "/quit" | "/exit" => break,
            "/open" => {
                session.open().await;
                print_header();
                continue;
            }
            "/close" => {
                session.close().await;
                continue;
            }
            _ => {}
        }

        if !session.view().await.open {
            println!("Type /open to chat.");
            continue;
        }

        session.set_input(line).await;
        print!("  ...");
        std::io::stdout().flush()?;
        session.submit().await;
        print!("\r     \r");

        rendered = render_new_turns(session, rendered).await;
    }

    Ok(())
}

fn print_header() {
    println!("{} ({} with /close)", HEADER_TITLE, CLOSE_LABEL);
    println!("{}", HEADER_SUBTITLE);
    println!();
}

async fn print_prompt(session: &ChatSession) -> Result<()> {
    if session.view().await.open {
        print!("{}> ", INPUT_PLACEHOLDER);
    } else {
        print!("[{}] ", LAUNCHER_LABEL);
    }
    std::io::stdout().flush()?;
    Ok(())
}

/// Print assistant turns after `from`; user turns were typed by the user.
async fn render_new_turns(session: &ChatSession, from: usize) -> usize {
    let turns = session.turns().await;
    for turn in turns.iter().skip(from) {
        if turn.role == Role::Assistant {
            println!("{}", turn.text);
        }
    }
    turns.len()
}
