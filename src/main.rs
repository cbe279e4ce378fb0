//! Aegis - Autonomous Payment-Incident Resolution Agent
//!
//! Main entry point: resolves a single incident delivered on the command
//! line (or stdin) and prints the outcome.

use std::io::Read;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use aegis::agent::Resolver;
use aegis::core::{Config, Incident, OutcomeStatus};
use aegis::llm::{ModelProvider, OllamaModel};
use aegis::tools::{EscalationDesk, PaymentClient, SearchClient, ToolRegistry};

/// Aegis - Autonomous Payment-Incident Resolution Agent
#[derive(Parser, Debug)]
#[command(name = "aegis")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Event type of the incident
    #[arg(long, short = 't', default_value = "payment_failed")]
    event_type: String,

    /// Incident payload as inline JSON
    #[arg(long, short = 'p')]
    payload: Option<String>,

    /// Read the incident payload from a file
    #[arg(long)]
    payload_file: Option<std::path::PathBuf>,

    /// Only produce an investigation plan, skipping the tool loop
    #[arg(long)]
    plan_only: bool,

    /// Chat model override
    #[arg(long, short = 'm')]
    model: Option<String>,

    /// Maximum resolution turns override
    #[arg(long)]
    max_turns: Option<usize>,

    /// Enable debug output
    #[arg(long, short = 'd')]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Build configuration with CLI overrides
    let mut config = Config::load();

    if let Some(ref model) = args.model {
        config.ollama.model = model.clone();
    }

    if let Some(max_turns) = args.max_turns {
        config.agent.max_turns = max_turns;
    }

    if args.debug {
        config.agent.debug = true;
    }

    let default_filter = if config.agent.debug { "aegis=debug" } else { "aegis=info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .init();

    config.validate()?;

    let raw_payload = read_payload(&args)?;
    let incident = Incident::new(&args.event_type, raw_payload);

    // Probe the model backend once; an unreachable backend degrades to an
    // uninitialized client and the incident fails with an ERROR outcome.
    let ollama = OllamaModel::from_config(&config);
    let model: Option<Arc<dyn ModelProvider>> = match ollama.check_ready().await {
        Ok(()) => Some(Arc::new(ollama)),
        Err(e) => {
            tracing::error!(error = %e, "model backend unavailable");
            None
        }
    };

    // Same one-shot probe for the policy index.
    let search_client = SearchClient::from_config(&config);
    let search = match search_client.ping().await {
        Ok(()) => Some(Arc::new(search_client) as Arc<dyn aegis::tools::PolicySearch>),
        Err(e) => {
            tracing::warn!(error = %e, "policy knowledge base unavailable");
            None
        }
    };

    let tools = ToolRegistry::new(
        Arc::new(PaymentClient::from_config(&config)),
        search,
        Arc::new(EscalationDesk::new()),
    );

    let resolver = Resolver::new(model, tools, &config.agent);

    let resolution = if args.plan_only {
        resolver.acknowledge(&incident).await
    } else {
        resolver.resolve(&incident).await
    };

    println!("{}: {}", resolution.outcome.status, resolution.outcome.summary);

    if resolution.outcome.status == OutcomeStatus::Error {
        std::process::exit(1);
    }

    Ok(())
}

/// Resolve the incident payload from flags or stdin
fn read_payload(args: &Args) -> anyhow::Result<String> {
    if let Some(ref payload) = args.payload {
        return Ok(payload.clone());
    }

    if let Some(ref path) = args.payload_file {
        return Ok(std::fs::read_to_string(path)?);
    }

    let mut buffer = String::new();
    std::io::stdin().read_to_string(&mut buffer)?;
    Ok(buffer)
}
