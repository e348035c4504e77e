use anyhow::Result;
use clap::Parser;
use std::sync::Arc;

use cooccur::cli::{Cli, Commands};
use cooccur::config::{Config, ConfigService};
use cooccur::error::classify;
use cooccur::models::request::RulesRequest;
use cooccur::service::{AppService, resolve_dataset_path};

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        let (code, message) = classify(&e);
        let error = serde_json::json!({
            "error": { "code": code.to_string(), "message": message }
        });
        println!("{error}");
        std::process::exit(1);
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn serialize_output(value: &impl serde::Serialize, pretty: bool) -> Result<String> {
    if pretty {
        Ok(serde_json::to_string_pretty(value)?)
    } else {
        Ok(serde_json::to_string(value)?)
    }
}

fn print_json(value: &impl serde::Serialize, pretty: bool) -> Result<()> {
    println!("{}", serialize_output(value, pretty)?);
    Ok(())
}

fn open_service(cli_dataset: Option<&std::path::Path>, config: &Config) -> AppService {
    let path = resolve_dataset_path(cli_dataset, &config.dataset_path);
    AppService::with_defaults(path, config.mining_defaults())
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

fn run(cli: Cli) -> Result<()> {
    let pretty = cli.pretty;

    // Load configuration
    let config = ConfigService::load(cli.config.as_deref())?;

    // Initialize logging if debug mode (CLI flag or config)
    let _log_guard = if cli.debug || config.debug {
        Some(cooccur::logger::init(&config)?)
    } else {
        None
    };

    // Handle early-exit commands before opening the dataset
    if let Commands::Init { path } = &cli.command {
        let config_path = if let Some(p) = path {
            ConfigService::generate_at(p)?;
            p.clone()
        } else {
            ConfigService::generate_default()?;
            ConfigService::default_path()
        };
        eprintln!("Configuration file created at: {}", config_path.display());
        return Ok(());
    }

    let service = open_service(cli.dataset.as_deref(), &config);

    match cli.command {
        Commands::Serve { listen } => {
            let listen = listen.unwrap_or_else(|| config.listen.clone());
            cmd_serve(service, &listen)
        }
        Commands::Mcp => cmd_mcp(service),
        Commands::List => print_json(&service.list(), pretty),
        Commands::Add { items } => {
            let stored = service.add(&items)?;
            print_json(&stored, pretty)
        }
        Commands::Update { index, items } => {
            let stored = service.update(index, &items)?;
            print_json(&stored, pretty)
        }
        Commands::Delete { index } => {
            let removed = service.delete(index)?;
            print_json(&removed, pretty)
        }
        Commands::Clear => {
            service.clear()?;
            print_json(&service.list(), pretty)
        }
        Commands::Rules {
            min_support,
            min_confidence,
        } => {
            let request = RulesRequest {
                min_support,
                min_confidence,
            };
            let rules = service.generate_rules(&request.resolve(service.defaults()))?;
            print_json(&rules, pretty)
        }
        Commands::Init { .. } => unreachable!("handled above"),
    }
}

fn cmd_serve(service: AppService, listen: &str) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(cooccur::http::serve(Arc::new(service), listen))
}

fn cmd_mcp(service: AppService) -> Result<()> {
    use rmcp::ServiceExt;
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let server = cooccur::mcp::CooccurServer::new(Arc::new(service));
        let transport = rmcp::transport::io::stdio();
        let running = server
            .serve(transport)
            .await
            .map_err(|e| anyhow::anyhow!("MCP server initialization failed: {e}"))?;
        running
            .waiting()
            .await
            .map_err(|e| anyhow::anyhow!("MCP server error: {e}"))?;
        Ok(())
    })
}
