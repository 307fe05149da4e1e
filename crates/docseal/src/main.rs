//! docseal - stamp verifiable attestations onto PDF documents.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use docseal::{
    identify_reader, persist_atomically, signer_from_arg, Placement, Signer, StampConfig,
    StampError, StampRequest, StampSummary, Stamper,
};

/// docseal - verifiable document stamps
#[derive(Parser, Debug)]
#[command(name = "docseal")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sign a document and stamp the signature onto one page
    Stamp(StampArgs),

    /// Print the content identifier of a file
    Identify {
        /// File to identify
        path: PathBuf,
    },

    /// Print the signer address of a key
    Address {
        /// Secret key as hex, or @path to a file holding it
        #[arg(long)]
        key: String,
    },

    /// Show the version
    Version,
}

#[derive(Args, Debug)]
struct StampArgs {
    /// Document to stamp
    #[arg(short, long)]
    input: PathBuf,

    /// Where to write the stamped document
    #[arg(short, long)]
    output: PathBuf,

    /// Signature graphic (PNG or JPEG)
    #[arg(short, long)]
    signature: PathBuf,

    /// Secret key as hex, or @path to a file holding it
    #[arg(long)]
    key: String,

    /// Target page, 1-based (clamps to the last page)
    #[arg(long)]
    page: Option<u32>,

    /// Signature x position in points
    #[arg(long, default_value = "50", allow_hyphen_values = true)]
    x: f64,

    /// Signature y position in points
    #[arg(long, default_value = "50", allow_hyphen_values = true)]
    y: f64,

    /// Points per signature pixel
    #[arg(long)]
    scale: Option<f64>,

    /// Organization recorded in the attestation
    #[arg(long)]
    org: Option<String>,

    /// Attestation time in Unix milliseconds (default: now)
    #[arg(long)]
    timestamp: Option<u64>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match cli.command {
        Commands::Stamp(args) => stamp(args),
        Commands::Identify { path } => identify(&path),
        Commands::Address { key } => address(&key),
        Commands::Version => {
            println!("docseal version {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn stamp(args: StampArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => StampConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => StampConfig::default(),
    };

    let document = std::fs::read(&args.input)
        .map_err(StampError::Hashing)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let graphic = std::fs::read(&args.signature)
        .with_context(|| format!("failed to read {}", args.signature.display()))?;
    let signer = signer_from_arg(&args.key).context("failed to load signer key")?;

    let scale = args.scale.unwrap_or(config.scale);
    let request = StampRequest {
        document: &document,
        signature_graphic: &graphic,
        page: args.page.unwrap_or(config.page),
        placement: Placement::new(args.x, args.y, scale),
        timestamp_millis: args.timestamp.unwrap_or_else(now_millis),
        organization: args.org.or(config.organization),
    };

    let stamper = Stamper::new(signer, config.overlay)?;
    let sealed = stamper.stamp(&request)?;
    persist_atomically(&args.output, &sealed.bytes)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    info!(output = %args.output.display(), "stamped document written");

    let summary = sealed.summary();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }
    Ok(())
}

fn print_summary(summary: &StampSummary) {
    println!("signer:        {}", summary.signer);
    println!("original cid:  {}", summary.original_cid);
    println!("sealed cid:    {}", summary.sealed_cid);
    println!("signature:     {}", summary.signature);
    println!("message (b64): {}", summary.message_base64);
    println!("page:          {}", summary.page);
}

fn identify(path: &Path) -> Result<()> {
    let file = File::open(path)
        .map_err(StampError::Hashing)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let cid = identify_reader(BufReader::new(file))?;
    println!("{cid}");
    Ok(())
}

fn address(key: &str) -> Result<()> {
    let signer = signer_from_arg(key).context("failed to load signer key")?;
    println!("{}", signer.address());
    Ok(())
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
