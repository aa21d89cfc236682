//! Fairdraw command line
//!
//! Runs and checks draws from hashes given inline or in JSON files.
//! JSON goes to stdout, logs to stderr.

use clap::{Args, Parser, Subcommand};
use fairdraw::{
    audit_with, conduct_draw, derive_seed, score_ticket, verify_with, DrawConfig, DrawRequest,
    DrawResult, FixedHashSource, LotteryError, TicketId, Verdict, WinnerSelector,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};

/// Fairdraw version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "fairdraw", version, about = "Fairdraw: verifiable block-hash lottery")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Derive the seed from block hashes
    Seed {
        /// Block hashes in draw order (comma-separated)
        #[arg(long, value_delimiter = ',', required = true)]
        hashes: Vec<String>,
    },

    /// Score a single ticket against a seed
    Score {
        /// Seed hex, used verbatim
        #[arg(long)]
        seed: String,

        /// Ticket number
        #[arg(long)]
        ticket: TicketId,
    },

    /// Run a draw and print the result record
    Draw(DrawArgs),

    /// Check a claimed winner against a seed and ticket list
    Verify {
        /// Seed hex, used verbatim
        #[arg(long)]
        seed: String,

        /// Tickets (comma-separated)
        #[arg(long, value_delimiter = ',', required = true)]
        tickets: Vec<TicketId>,

        /// Claimed winning ticket
        #[arg(long)]
        winner: TicketId,

        /// Tie-break rounds before fallback
        #[arg(long, default_value_t = fairdraw::DEFAULT_TIE_BREAKER_ROUNDS)]
        rounds: u32,
    },

    /// Recheck a published draw record
    Audit {
        /// Draw result JSON file
        #[arg(short, long)]
        result: PathBuf,

        /// Tie-break rounds the draw was run with
        #[arg(long, default_value_t = fairdraw::DEFAULT_TIE_BREAKER_ROUNDS)]
        rounds: u32,
    },
}

#[derive(Args)]
struct DrawArgs {
    /// Draw request JSON file: {"blockHashes": [...], "blockHeights": [...], "tickets": [...]}
    #[arg(short, long, conflicts_with_all = ["hashes", "tickets"])]
    input: Option<PathBuf>,

    /// Block hashes in draw order (comma-separated)
    #[arg(long, value_delimiter = ',')]
    hashes: Vec<String>,

    /// Tickets (comma-separated)
    #[arg(long, value_delimiter = ',')]
    tickets: Vec<TicketId>,

    /// Tie-break rounds before fallback
    #[arg(long, default_value_t = fairdraw::DEFAULT_TIE_BREAKER_ROUNDS)]
    rounds: u32,

    /// Pretty-print the result
    #[arg(long)]
    pretty: bool,
}

impl DrawArgs {
    fn request(&self) -> Result<DrawRequest, LotteryError> {
        match &self.input {
            Some(path) => {
                let data = std::fs::read_to_string(path)
                    .map_err(|e| LotteryError::InvalidInput(format!("{}: {}", path.display(), e)))?;
                serde_json::from_str(&data).map_err(|e| LotteryError::Serialization(e.to_string()))
            }
            None => Ok(DrawRequest {
                block_hashes: self.hashes.clone(),
                block_heights: Vec::new(),
                tickets: self.tickets.clone(),
            }),
        }
    }
}

fn run_draw(args: &DrawArgs) -> Result<String, LotteryError> {
    let request = args.request()?;
    let material = request.hash_material();
    let source = FixedHashSource::new(material);

    let result = conduct_draw(
        &source,
        source.len(),
        &request.tickets,
        DrawConfig::with_rounds(args.rounds),
    )?;

    if args.pretty {
        result.to_json_pretty()
    } else {
        result.to_json()
    }
}

fn run_verify(seed: &str, tickets: &[TicketId], winner: TicketId, rounds: u32) -> Verdict {
    match WinnerSelector::new(DrawConfig::with_rounds(rounds)) {
        Ok(selector) => verify_with(&selector, seed, tickets, winner),
        Err(e) => Verdict::from_error(&e),
    }
}

fn run_audit(path: &Path, rounds: u32) -> Verdict {
    let checked = WinnerSelector::new(DrawConfig::with_rounds(rounds)).and_then(|selector| {
        let data = std::fs::read_to_string(path)
            .map_err(|e| LotteryError::InvalidInput(format!("{}: {}", path.display(), e)))?;
        let result = DrawResult::from_json(&data)?;
        Ok(audit_with(&selector, &result))
    });

    match checked {
        Ok(verdict) => verdict,
        Err(e) => Verdict::from_error(&e),
    }
}

fn print_verdict(verdict: &Verdict) -> ExitCode {
    match serde_json::to_string(verdict) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            error!("Failed to encode verdict: {}", e);
            return ExitCode::FAILURE;
        }
    }
    if verdict.valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn main() -> ExitCode {
    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("fairdraw=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    info!("Fairdraw v{}", VERSION);

    match cli.command {
        Command::Seed { hashes } => match derive_seed(&hashes) {
            Ok(seed) => {
                println!("{}", seed);
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!("{}", e);
                ExitCode::FAILURE
            }
        },

        Command::Score { seed, ticket } => {
            println!("{}", score_ticket(&seed, ticket));
            ExitCode::SUCCESS
        }

        Command::Draw(args) => match run_draw(&args) {
            Ok(json) => {
                println!("{}", json);
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!("Draw aborted: {}", e);
                ExitCode::FAILURE
            }
        },

        Command::Verify {
            seed,
            tickets,
            winner,
            rounds,
        } => print_verdict(&run_verify(&seed, &tickets, winner, rounds)),

        Command::Audit { result, rounds } => print_verdict(&run_audit(&result, rounds)),
    }
}
