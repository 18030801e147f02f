//! xai-mcp-server: MCP server for X (Twitter) search through xAI's Grok
//!
//! Serves the `x_search` tool over stdio or HTTP, or runs a single search
//! from the command line.

use std::io;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use thiserror::Error;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

use xai_mcp_server::config::{self, Config};
use xai_mcp_server::error::XaiError;
use xai_mcp_server::mcp::{HttpTransport, StdioTransport, Transport};
use xai_mcp_server::tools::format_citations;
use xai_mcp_server::xai::XaiClient;

/// MCP server for X (Twitter) search through xAI's Grok.
///
/// Requires `XAI_API_KEY` in the environment. `XAI_MODEL`, `XAI_BASE_URL`,
/// `PORT` and `LOG_LEVEL` are optional.
#[derive(Parser, Debug)]
#[command(name = "xai-mcp-server")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Transport to serve MCP on
    #[arg(long, value_enum, default_value_t = TransportKind::Http)]
    transport: TransportKind,

    /// Port for the HTTP transport (overrides PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Increase logging verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Decrease logging verbosity (only show errors)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one X search and print the answer
    Search {
        /// The search query
        query: String,

        /// Print the answer as it streams in
        #[arg(long)]
        stream: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum TransportKind {
    /// Newline-delimited JSON-RPC on stdin/stdout
    Stdio,
    /// JSON-RPC over HTTP POST /mcp
    Http,
}

/// Determines the log level from CLI arguments.
#[allow(clippy::match_same_arms)] // Explicit "warn" arm for clarity
fn get_log_level(verbose: u8, quiet: bool, config_level: &str) -> Level {
    if quiet {
        return Level::ERROR;
    }

    match verbose {
        0 => match config_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::WARN,
        },
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Initialises the tracing subscriber for logging.
///
/// Always writes to stderr: stdout carries protocol frames in stdio mode.
fn init_tracing(level: Level) {
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Serves MCP on the chosen transport until shutdown.
fn run_server(cfg: &Config, kind: TransportKind, port: u16) -> ExitCode {
    let dispatcher = Arc::new(xai_mcp_server::build_dispatcher(&cfg.xai));

    let transport: Box<dyn Transport> = match kind {
        TransportKind::Stdio => Box::new(StdioTransport::new()),
        TransportKind::Http => Box::new(HttpTransport::new(port)),
    };

    info!(
        version = env!("CARGO_PKG_VERSION"),
        transport = transport.name(),
        model = %cfg.xai.model,
        "Starting xai-mcp-server"
    );

    // stdio is a single sequential session; HTTP serves requests concurrently.
    let runtime = match kind {
        TransportKind::Stdio => tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build(),
        TransportKind::Http => tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build(),
    };
    let runtime = match runtime {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "Failed to create Tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(transport.serve(dispatcher)) {
        Ok(()) => {
            info!("Server shut down gracefully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Server error");
            ExitCode::FAILURE
        }
    }
}

/// Failure of the `search` subcommand.
#[derive(Error, Debug)]
enum SearchCommandError {
    /// The search itself failed.
    #[error(transparent)]
    Search(#[from] XaiError),

    /// The answer could not be written, e.g. stdout was closed.
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

/// Runs one search and writes the answer to `out`.
///
/// Stops at the first write error, dropping the upstream stream.
async fn search_once<W>(
    client: &XaiClient,
    query: &str,
    stream: bool,
    out: &mut W,
) -> Result<(), SearchCommandError>
where
    W: AsyncWrite + Unpin,
{
    if stream {
        let mut fragments = client.search_stream(query).await?;
        while let Some(fragment) = fragments.next().await? {
            out.write_all(fragment.as_bytes()).await?;
            out.flush().await?;
        }
        out.write_all(b"\n").await?;
    } else {
        let result = client.search(query).await?;
        let mut text = result.text;
        if let Some(sources) = format_citations(&result.citations) {
            text.push_str("\n\n");
            text.push_str(&sources);
        }
        text.push('\n');
        out.write_all(text.as_bytes()).await?;
    }

    out.flush().await?;
    Ok(())
}

fn run_search(cfg: &Config, query: &str, stream: bool) -> ExitCode {
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "Failed to create Tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    let client = XaiClient::new(&cfg.xai);
    let result = runtime.block_on(async {
        let mut stdout = tokio::io::stdout();
        search_once(&client, query, stream, &mut stdout).await
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Search failed: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Entry point for the xai-mcp-server binary.
fn main() -> ExitCode {
    let args = Args::parse();

    let cfg = match config::load_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let log_level = get_log_level(args.verbose, args.quiet, &cfg.logging.level);
    init_tracing(log_level);

    match args.command {
        Some(Command::Search { query, stream }) => run_search(&cfg, &query, stream),
        None => run_server(&cfg, args.transport, args.port.unwrap_or(cfg.port)),
    }
}
