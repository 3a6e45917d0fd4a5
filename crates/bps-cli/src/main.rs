/// BPS command-line tool: run the sensor sender or query it.
///
/// # Command overview
///
/// ```text
/// bps <COMMAND> [OPTIONS]
///
/// Commands:
///   serve    Sample simulated sensors and answer range queries over TCP
///   fetch    Query a running sender and print compression statistics
///   help     Print help information
///
/// Global options:
///   -v, --verbose    Log at debug level (RUST_LOG overrides)
///   -h, --help       Print help
///   -V, --version    Print version
/// ```
///
/// # Exit codes
///
/// | Code | Meaning                                       |
/// |------|-----------------------------------------------|
/// | 0    | Success (including "no data in range")        |
/// | 1    | Error (bind failure, bad response, etc.)      |
///
/// Errors go to stderr, logs go to stderr, reports go to stdout.
use std::process;

use bps_server::config::{
    DEFAULT_BATCH_SAMPLES, DEFAULT_CACHE_BATCHES, DEFAULT_LISTEN_ADDR, DEFAULT_SAMPLE_HZ,
};
use bps_wire::CodecKind;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cmd_fetch;
mod cmd_serve;
mod source;

// ── CLI root ──────────────────────────────────────────────────────────────────

/// Bit-plane streaming of FP16 sensor history.
#[derive(Parser)]
#[command(name = "bps", version, about = "Bit-plane sensor streaming CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log at debug level unless RUST_LOG is set.
    #[arg(short, long, global = true)]
    verbose: bool,
}

// ── Sub-commands ──────────────────────────────────────────────────────────────

#[derive(Subcommand)]
enum Commands {
    /// Sample simulated sensors, cache compressed batches, serve queries.
    Serve(ServeArgs),
    /// Fetch the recent window from a sender and print statistics.
    Fetch(FetchArgs),
}

// ── Argument structs ──────────────────────────────────────────────────────────

/// Arguments for `bps serve`.
///
/// ```text
/// ┌─────────────────┬──────────────────────────────────────────────┐
/// │ Flag            │ Default                                      │
/// ├─────────────────┼──────────────────────────────────────────────┤
/// │ --listen        │ 0.0.0.0:50007                                │
/// │ --codec         │ lz4 (or zstd)                                │
/// │ --sample-hz     │ 10                                           │
/// │ --batch-samples │ 256 rows per batch                           │
/// │ --cache-batches │ 120 batches kept                             │
/// │ --sensors       │ temperature,humidity                         │
/// └─────────────────┴──────────────────────────────────────────────┘
/// ```
#[derive(clap::Args)]
pub struct ServeArgs {
    /// Address to accept queries on.
    #[arg(long, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen: String,

    /// Block codec: `lz4` or `zstd`.
    #[arg(long, default_value_t = CodecKind::Lz4)]
    pub codec: CodecKind,

    /// Samples per second.
    #[arg(long, default_value_t = DEFAULT_SAMPLE_HZ)]
    pub sample_hz: f64,

    /// Rows per compressed batch.
    #[arg(long, default_value_t = DEFAULT_BATCH_SAMPLES)]
    pub batch_samples: usize,

    /// Batches kept in memory before the oldest is evicted.
    #[arg(long, default_value_t = DEFAULT_CACHE_BATCHES)]
    pub cache_batches: usize,

    /// Comma-separated sensor names, in row order.
    #[arg(long, value_delimiter = ',', default_value = "temperature,humidity")]
    pub sensors: Vec<String>,
}

/// Arguments for `bps fetch`.
///
/// Requests `[now - seconds, now]` at the given precision. `--planes`
/// below 6 still yields the 6 sign/exponent planes; above 16 yields all.
#[derive(clap::Args)]
pub struct FetchArgs {
    /// Sender address.
    #[arg(long, default_value = "127.0.0.1:50007")]
    pub addr: String,

    /// History window in seconds.
    #[arg(long, default_value_t = 60.0)]
    pub seconds: f64,

    /// Bit-planes to request.
    #[arg(long, default_value_t = 12)]
    pub planes: u32,

    /// Also print the first N decoded rows.
    #[arg(long)]
    pub show_values: Option<usize>,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Serve(args) => cmd_serve::run(&args).await,
        Commands::Fetch(args) => cmd_fetch::run(&args).await,
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}
