use std::sync::Arc;
use std::time::Duration;

use clap::Subcommand;
use flocus_core::driver::{self, DriverHandle};
use flocus_core::timer::format_clock;
use flocus_core::{Config, Event, Phase, Quote, QuoteClient};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinSet;
use tracing::warn;

use super::{load_controller, print_json};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Print current timer state as JSON
    Status {
        /// One human-readable line instead of JSON
        #[arg(long)]
        short: bool,
    },
    /// Start the current phase and run it in the foreground
    Start {
        /// Stop after this many phases complete
        #[arg(long, default_value = "1")]
        phases: u32,
        /// Do not fetch a quote when a focus phase ends
        #[arg(long)]
        no_quote: bool,
    },
    /// Skip to the next phase
    Skip,
    /// Restart the current phase from its full length
    Reset,
    /// Run the timer interactively, reading commands from stdin
    ///
    /// Commands: `t` (or empty line) toggles start/pause, `s` skips,
    /// `r` resets, `status` prints a snapshot, `q` quits.
    Run {
        /// Stop after this many phases complete
        #[arg(long)]
        phases: Option<u32>,
        /// Do not fetch a quote when a focus phase ends
        #[arg(long)]
        no_quote: bool,
    },
}

struct LiveOptions {
    autostart: bool,
    phases: Option<u32>,
    quote: bool,
}

enum Key {
    Toggle,
    Skip,
    Reset,
    Status,
    Quit,
}

fn parse_key(line: &str) -> Option<Key> {
    match line.trim() {
        "" | "t" | "toggle" => Some(Key::Toggle),
        "s" | "skip" => Some(Key::Skip),
        "r" | "reset" => Some(Key::Reset),
        "status" => Some(Key::Status),
        "q" | "quit" => Some(Key::Quit),
        _ => None,
    }
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        TimerAction::Status { short } => {
            let controller = load_controller()?;
            if short {
                let s = controller.state();
                println!(
                    "{} {} (session {}/4, streak {})",
                    s.phase().label(),
                    format_clock(s.remaining_secs()),
                    s.current_session(),
                    s.streak()
                );
            } else {
                print_json(&controller.snapshot())?;
            }
        }
        TimerAction::Skip => {
            let mut controller = load_controller()?;
            print_json(&controller.skip())?;
        }
        TimerAction::Reset => {
            let mut controller = load_controller()?;
            print_json(&controller.reset())?;
        }
        TimerAction::Start { phases, no_quote } => live(LiveOptions {
            autostart: true,
            phases: Some(phases.max(1)),
            quote: !no_quote,
        })?,
        TimerAction::Run { phases, no_quote } => live(LiveOptions {
            autostart: false,
            phases,
            quote: !no_quote,
        })?,
    }
    Ok(())
}

fn live(opts: LiveOptions) -> Result<(), Box<dyn std::error::Error>> {
    let controller = load_controller()?;
    let config = Config::load_or_default();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(async move {
        let tick = Duration::from_millis(config.timer.tick_interval_ms.max(1));
        let (handle, task) = driver::spawn(controller, tick);
        let quotes = Arc::new(QuoteClient::new(&config.quote));
        let result = drive(&handle, quotes, &opts).await;
        handle.shutdown().await?;
        task.await?;
        result
    });
    // A pending stdin read would otherwise block shutdown.
    runtime.shutdown_background();
    result
}

/// Print every driver event as one JSON line until the phase limit, `q`,
/// or end of input while the timer is stopped.
///
/// Quotes are fetched in the background and printed when they arrive;
/// a normal finish waits for them, `q` drops them.
async fn drive(
    handle: &DriverHandle,
    quotes: Arc<QuoteClient>,
    opts: &LiveOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut events = handle.subscribe();
    if opts.autostart {
        handle.start().await?;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut finished = false;
    let mut completed = 0u32;
    let mut pending_quotes: JoinSet<Quote> = JoinSet::new();

    loop {
        if finished && pending_quotes.is_empty() {
            break;
        }
        tokio::select! {
            line = lines.next_line(), if stdin_open && !finished => {
                let Some(line) = line? else {
                    stdin_open = false;
                    if !handle.watch_state().borrow().is_running() {
                        finished = true;
                    }
                    continue;
                };
                match parse_key(&line) {
                    Some(Key::Toggle) => { handle.toggle().await?; }
                    Some(Key::Skip) => { handle.skip().await?; }
                    Some(Key::Reset) => { handle.reset().await?; }
                    Some(Key::Status) => print_line(&handle.snapshot().await?)?,
                    Some(Key::Quit) => break,
                    None => eprintln!("unknown command: {}", line.trim()),
                }
            }
            Some(joined) = pending_quotes.join_next(), if !pending_quotes.is_empty() => {
                match joined {
                    Ok(quote) => print_line(&quote)?,
                    Err(e) => warn!(error = %e, "quote task failed"),
                }
            }
            event = events.recv(), if !finished => {
                let event = match event {
                    Ok(event) => event,
                    Err(RecvError::Lagged(missed)) => {
                        warn!(missed, "event output fell behind");
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                };
                print_line(&event)?;

                if let Event::PhaseCompleted { from, .. } = event {
                    completed += 1;
                    if from == Phase::Focus && opts.quote {
                        let quotes = Arc::clone(&quotes);
                        pending_quotes.spawn(async move { quotes.fetch_or_fallback().await });
                    }
                    if opts.phases.is_some_and(|limit| completed >= limit) || !stdin_open {
                        finished = true;
                    }
                }
            }
        }
    }
    Ok(())
}

fn print_line<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}
