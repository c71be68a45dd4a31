mod observer;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use yellowbeam::client::{
    CallState, ClientConfig, ClientHandle, RegistrationState, SignalingClient, StreamingState,
    WebRtcConnector,
};
use yellowbeam::model::IceServerConfig;

use crate::observer::{AnswerPolicy, TerminalObserver};

#[derive(Parser)]
#[command(name = "yellowbeam", version)]
#[command(about = "One-to-one calls and stream viewing over a Kurento-style signaling server")]
struct Cli {
    /// Signaling endpoint; a URL without a path gets `/call`.
    #[arg(long, env = "YELLOWBEAM_URL", default_value = "wss://localhost:8443/call")]
    url: String,

    #[arg(long, env = "TURN_URL")]
    turn_url: Option<String>,

    #[arg(long, env = "TURN_USERNAME")]
    turn_username: Option<String>,

    #[arg(long, env = "TURN_CREDENTIAL", hide_env_values = true)]
    turn_credential: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register and call another user.
    Call {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        peer: String,

        /// Publish the established call under this stream name.
        #[arg(long)]
        stream: Option<String>,
    },

    /// Register and wait for incoming calls.
    Listen {
        #[arg(short, long)]
        name: String,

        #[arg(long, conflicts_with = "auto_reject")]
        auto_accept: bool,

        #[arg(long)]
        auto_reject: bool,
    },

    /// Discover a published stream and view all of its videos.
    Watch {
        #[arg(short, long)]
        stream: String,
    },

    /// Enter a stream directly with a single offer.
    Enter {
        #[arg(short, long)]
        stream: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = build_config(&cli)?;

    let policy = match &cli.command {
        Commands::Listen {
            auto_accept: true, ..
        } => AnswerPolicy::Accept,
        Commands::Listen {
            auto_reject: true, ..
        } => AnswerPolicy::Reject,
        _ => AnswerPolicy::Ask,
    };

    println!(
        "{}",
        format!("🚀 Connecting to {}...", config.server_url).green().bold()
    );
    let connector = Arc::new(WebRtcConnector::new(config.ice_servers.clone()));
    let observer = Arc::new(TerminalObserver::new(policy));
    let (client, handle) = SignalingClient::connect(config, connector, observer)
        .await
        .context("Failed to reach the signaling server")?;
    let client_task = tokio::spawn(client.run());

    let outcome = match cli.command {
        Commands::Call { name, peer, stream } => {
            run_call(&handle, &name, &peer, stream.as_deref()).await
        }
        Commands::Listen { name, .. } => run_listen(&handle, &name).await,
        Commands::Watch { stream } => {
            handle.discover_streams(stream.as_str()).await?;
            println!("{}", format!("🔎 Looking for stream {stream}...").cyan());
            hold_until_interrupted(&handle).await
        }
        Commands::Enter { stream } => {
            handle.enter_stream(stream.as_str()).await?;
            println!("{}", format!("📺 Entering stream {stream}...").cyan());
            hold_until_interrupted(&handle).await
        }
    };

    handle.shutdown().await;
    let _ = client_task.await;
    outcome
}

fn build_config(cli: &Cli) -> Result<ClientConfig> {
    let mut config = ClientConfig::new(&cli.url).context("Invalid signaling URL")?;

    if let Some(turn_url) = &cli.turn_url {
        let mut ice_servers = config.ice_servers.clone();
        ice_servers.push(IceServerConfig {
            urls: vec![turn_url.clone()],
            username: cli.turn_username.clone(),
            credential: cli.turn_credential.clone(),
        });
        config = config.with_ice_servers(ice_servers);
    }

    Ok(config)
}

async fn register(handle: &ClientHandle, name: &str) -> Result<()> {
    handle.register(name).await?;
    let snapshot = handle
        .wait_for(|s| s.registration != RegistrationState::Registering)
        .await?;

    if snapshot.registration != RegistrationState::Registered {
        anyhow::bail!("Registration as {name} was rejected");
    }
    println!("{}", format!("✅ Registered as {name}").green());
    Ok(())
}

async fn run_call(
    handle: &ClientHandle,
    name: &str,
    peer: &str,
    stream: Option<&str>,
) -> Result<()> {
    register(handle, name).await?;

    handle.call(peer).await?;
    println!("{}", format!("📞 Calling {peer}...").cyan());
    let snapshot = handle
        .wait_for(|s| s.call != CallState::ProcessingCall)
        .await?;
    if snapshot.call != CallState::InCall {
        anyhow::bail!("Call to {peer} was not established");
    }
    println!("{}", format!("✨ In call with {peer}").green().bold());

    if let Some(stream) = stream {
        handle.start_streaming(stream).await?;
        let snapshot = handle
            .wait_for(|s| s.streaming != StreamingState::ProcessingStreaming)
            .await?;
        if snapshot.streaming == StreamingState::InStreaming {
            println!("{}", format!("📡 Publishing as {stream}").green());
        }
    }

    hold_call(handle).await
}

async fn run_listen(handle: &ClientHandle, name: &str) -> Result<()> {
    register(handle, name).await?;
    println!("{}", "👂 Waiting for calls, Ctrl-C to quit".cyan());
    hold_until_interrupted(handle).await
}

/// Keeps the call up until Ctrl-C or until the other side hangs up.
async fn hold_call(handle: &ClientHandle) -> Result<()> {
    tokio::select! {
        res = tokio::signal::ctrl_c() => {
            res?;
            hang_up(handle).await?;
        }
        res = handle.wait_for(|s| s.call == CallState::NoCall) => {
            res?;
            println!("{}", "👋 Call ended".yellow());
        }
    }
    Ok(())
}

async fn hold_until_interrupted(handle: &ClientHandle) -> Result<()> {
    tokio::signal::ctrl_c().await?;
    hang_up(handle).await
}

async fn hang_up(handle: &ClientHandle) -> Result<()> {
    println!("{}", "🛑 Hanging up".yellow());
    if handle.snapshot().streaming == StreamingState::InStreaming {
        handle.stop_streaming().await?;
    }
    handle.stop().await?;
    Ok(())
}
