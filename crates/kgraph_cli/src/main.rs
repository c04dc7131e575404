//! `kgraph` command-line host for the knowledge-graph tools.
//!
//! # Responsibility
//! - Load settings, initialize logging and open the configured store.
//! - Expose the tool façade as one-shot calls or a JSON-lines loop on stdin.
//!
//! # Invariants
//! - Stdout carries only JSON results; diagnostics go to the log sink.

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use kgraph_core::config::DynStore;
use kgraph_core::{init_logging, migrate, Backend, KnowledgeGraphTools, Settings, ToolError};
use log::{error, info};
use serde_json::{json, Value};
use std::io::{BufRead, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "kgraph")]
#[command(about = "Personal knowledge graph of tasks, notes, people and projects")]
#[command(version)]
struct Cli {
    /// Settings file (JSON). Missing file means defaults.
    #[arg(long, global = true, default_value = kgraph_core::config::DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every tool with its arguments
    Tools,

    /// Invoke one tool and print its JSON result
    Call {
        /// Tool name, e.g. create_task
        tool: String,

        /// JSON argument object
        #[arg(default_value = "{}")]
        args: String,
    },

    /// Read one JSON request per stdin line, answer one JSON line each
    Serve,

    /// Copy both collections from the configured backend into another one
    Migrate {
        /// Destination backend: json or sqlite
        #[arg(long)]
        to: String,
    },

    /// Rebuild the similarity index from every stored node
    Reindex,

    /// Check core linkage
    Ping,
}

fn main() {
    if let Err(err) = run() {
        error!("event=cli_exit module=cli status=error error={err:#}");
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(&cli.config)
        .with_context(|| format!("loading settings from `{}`", cli.config.display()))?;
    init_logging(&settings.log_level, settings.log_dir.as_deref()).map_err(|err| anyhow!(err))?;
    info!(
        "event=cli_start module=cli status=ok backend={} config={}",
        settings.backend,
        cli.config.display()
    );

    match cli.command {
        Commands::Tools => cmd_tools(&settings),
        Commands::Call { tool, args } => cmd_call(&settings, &tool, &args),
        Commands::Serve => cmd_serve(&settings),
        Commands::Migrate { to } => cmd_migrate(&settings, &to),
        Commands::Reindex => cmd_reindex(&settings),
        Commands::Ping => cmd_ping(),
    }
}

fn cmd_tools(settings: &Settings) -> Result<()> {
    let tools = settings.build_tools()?;
    print_json(&serde_json::to_value(tools.catalog())?)
}

fn cmd_call(settings: &Settings, tool: &str, args: &str) -> Result<()> {
    let args: Value =
        serde_json::from_str(args).with_context(|| format!("arguments for `{tool}` are not JSON"))?;
    let tools = settings.build_tools()?;
    let result = tools.call(tool, args)?;
    print_json(&result)
}

fn cmd_serve(settings: &Settings) -> Result<()> {
    let tools = settings.build_tools()?;
    info!("event=serve_start module=cli status=ok tools={}", tools.catalog().len());

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout().lock();
    let mut handled = 0usize;
    for line in stdin.lock().lines() {
        let line = line.context("reading request from stdin")?;
        if line.trim().is_empty() {
            continue;
        }
        let response = handle_request(&tools, &line);
        serde_json::to_writer(&mut stdout, &response)?;
        stdout.write_all(b"\n")?;
        stdout.flush()?;
        handled += 1;
    }

    info!("event=serve_stop module=cli status=ok requests={handled}");
    Ok(())
}

/// Answers one `{"id"?, "tool", "args"?}` request line.
fn handle_request(tools: &KnowledgeGraphTools<DynStore>, line: &str) -> Value {
    let request: Value = match serde_json::from_str(line) {
        Ok(request) => request,
        Err(err) => return error_response(Value::Null, "invalid_request", &err.to_string()),
    };
    let id = request.get("id").cloned().unwrap_or(Value::Null);
    let Some(tool) = request.get("tool").and_then(Value::as_str) else {
        return error_response(id, "invalid_request", "missing string field `tool`");
    };
    let args = request.get("args").cloned().unwrap_or(Value::Null);

    match tools.call(tool, args) {
        Ok(result) => json!({ "id": id, "ok": true, "result": result }),
        Err(err) => tool_error_response(id, &err),
    }
}

fn tool_error_response(id: Value, err: &ToolError) -> Value {
    error_response(id, err.code(), &err.to_string())
}

fn error_response(id: Value, code: &str, message: &str) -> Value {
    json!({
        "id": id,
        "ok": false,
        "error": { "code": code, "message": message },
    })
}

fn cmd_migrate(settings: &Settings, to: &str) -> Result<()> {
    let Some(target) = Backend::parse(to) else {
        bail!("unknown backend `{to}`; expected json|sqlite");
    };
    if target == settings.backend {
        bail!("source and destination backend are both `{target}`");
    }

    let from = settings.open_store()?;
    let dest = settings.open_backend(target)?;
    let report = migrate(&*from, &*dest)?;
    print_json(&json!({
        "from": from.describe(),
        "to": dest.describe(),
        "nodes": report.nodes,
        "edges": report.edges,
    }))
}

fn cmd_reindex(settings: &Settings) -> Result<()> {
    let settings = Settings {
        semantic_search: true,
        ..settings.clone()
    };
    let engine = settings.build_engine()?;
    let indexed = engine.reindex()?;
    print_json(&json!({ "indexed": indexed }))
}

fn cmd_ping() -> Result<()> {
    print_json(&json!({
        "ping": kgraph_core::ping(),
        "version": kgraph_core::core_version(),
    }))
}

fn print_json(value: &Value) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    stdout.write_all(b"\n")?;
    Ok(())
}
