use alloy::network::Ethereum;
use alloy::providers::DynProvider;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use block_finder::config::{setup_provider, FinderConfig};
use block_finder::error::FinderError;
use block_finder::explorer::ExplorerClient;
use block_finder::input::{format_instant, parse_instant, parse_timezone};
use block_finder::resolver::{resolve_timestamp, BlockResolver, Resolution};
use block_finder::session::{apply, SessionEvent, SessionState};
use block_finder::startup::check_endpoints;

#[derive(Parser)]
#[command(
    name = "block-finder",
    about = "Find the Ethereum block number for a date, or the date for a block number"
)]
struct Cli {
    /// IANA timezone used to interpret and render date/times
    #[arg(long, global = true)]
    timezone: Option<String>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve a date/time to a block number
    Block {
        #[arg(required = true, num_args = 1..)]
        datetime: Vec<String>,
    },
    /// Resolve a block number to its recorded timestamp
    Timestamp { block: u64 },
}

enum Completion {
    Block {
        seq: u64,
        result: Result<Resolution, FinderError>,
    },
    Instant {
        seq: u64,
        block: u64,
        result: Result<DateTime<Utc>, FinderError>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = FinderConfig::from_env()?;
    let timezone = match &cli.timezone {
        Some(name) => parse_timezone(name)?,
        None => config.timezone,
    };

    let explorer = ExplorerClient::new(&config.explorer_url, &config.explorer_api_key);
    let provider = setup_provider(&config.ethereum_rpc)?;
    let resolver = BlockResolver::new(explorer.clone(), config.block_time_secs);

    match cli.command {
        Some(Command::Block { datetime }) => {
            let target = parse_instant(&datetime.join(" "), timezone)?;
            let resolution = resolver.resolve(target).await?;
            render_resolution(&resolution);
        }
        Some(Command::Timestamp { block }) => {
            let instant = resolve_timestamp(&provider, block).await?;
            println!(
                "Block {} timestamp: {}",
                block,
                format_instant(instant, timezone)
            );
        }
        None => run_interactive(resolver, explorer, provider, timezone).await?,
    }

    Ok(())
}

async fn run_interactive(
    resolver: BlockResolver,
    explorer: ExplorerClient,
    provider: DynProvider<Ethereum>,
    timezone: Tz,
) -> Result<(), FinderError> {
    check_endpoints(&explorer, &provider).await?;

    let resolver = Arc::new(resolver);
    let mut state = SessionState::new(timezone);
    let (tx, mut rx) = mpsc::unbounded_channel();

    println!("Commands: date <datetime>, tz <zone>, block, at <number>, quit");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.map_err(|e| FinderError::Input(e.to_string()))? else {
                    break;
                };
                if !handle_command(line.trim(), &mut state, &resolver, &provider, &tx) {
                    break;
                }
            }
            Some(completion) = rx.recv() => {
                state = handle_completion(&state, completion);
            }
        }
    }

    Ok(())
}

fn handle_command(
    line: &str,
    state: &mut SessionState,
    resolver: &Arc<BlockResolver>,
    provider: &DynProvider<Ethereum>,
    tx: &mpsc::UnboundedSender<Completion>,
) -> bool {
    let (command, rest) = match line.split_once(' ') {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };
    match command {
        "" => {}
        "date" => match parse_instant(rest, state.timezone) {
            Ok(instant) => {
                *state = apply(state, SessionEvent::DateChosen(instant));
                println!("Target set to {}", format_instant(instant, state.timezone));
            }
            Err(e) => println!("{}", e),
        },
        "tz" => match parse_timezone(rest) {
            Ok(tz) => {
                *state = apply(state, SessionEvent::TimezoneChosen(tz));
                println!("Timezone set to {}", tz);
            }
            Err(e) => println!("{}", e),
        },
        "block" => {
            let Some(target) = state.target else {
                println!("choose a date first: date <datetime>");
                return true;
            };
            *state = apply(state, SessionEvent::RequestIssued);
            let seq = state.last_issued;
            let resolver = resolver.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                let result = resolver.resolve(target).await;
                let _ = tx.send(Completion::Block { seq, result });
            });
        }
        "at" => match rest.parse::<u64>() {
            Ok(block) => {
                *state = apply(state, SessionEvent::RequestIssued);
                let seq = state.last_issued;
                let provider = provider.clone();
                let tx = tx.clone();
                tokio::spawn(async move {
                    let result = resolve_timestamp(&provider, block).await;
                    let _ = tx.send(Completion::Instant { seq, block, result });
                });
            }
            Err(_) => println!("not a block number: {}", rest),
        },
        "quit" | "exit" => return false,
        _ => println!("Commands: date <datetime>, tz <zone>, block, at <number>, quit"),
    }
    true
}

fn handle_completion(state: &SessionState, completion: Completion) -> SessionState {
    match completion {
        Completion::Block { seq, result } => {
            if !state.is_current(seq) {
                debug!(seq, "discarding stale block completion");
                return state.clone();
            }
            match result {
                Ok(resolution) => {
                    let next = apply(state, SessionEvent::BlockResolved { seq, resolution });
                    render_resolution(&resolution);
                    next
                }
                Err(e) => {
                    error!("block lookup failed: {}", e);
                    apply(state, SessionEvent::RequestFailed { seq })
                }
            }
        }
        Completion::Instant { seq, block, result } => {
            if !state.is_current(seq) {
                debug!(seq, "discarding stale timestamp completion");
                return state.clone();
            }
            match result {
                Ok(instant) => {
                    let next = apply(state, SessionEvent::TimestampResolved { seq, instant });
                    println!(
                        "Block {} timestamp: {}",
                        block,
                        format_instant(instant, next.timezone)
                    );
                    next
                }
                Err(e) => {
                    error!("timestamp lookup failed: {}", e);
                    apply(state, SessionEvent::RequestFailed { seq })
                }
            }
        }
    }
}

fn render_resolution(resolution: &Resolution) {
    println!("Block number: {}", resolution.block_number);
    if resolution.is_estimate {
        println!("This is an estimated block number for a future timestamp.");
    }
}
