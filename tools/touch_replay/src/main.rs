use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use env_logger::Builder as LogBuilder;
use log::LevelFilter;
use touch_gestures::GestureConfig;

use touch_replay::{
    check_expected, default_gestures, load_expected, load_trace, parse_gesture, replay, CSV_HEADER,
};

#[derive(Debug, Parser)]
#[command(name = "touch_replay")]
#[command(about = "Replay a JSON-lines contact trace through the gesture detectors")]
struct Cli {
    /// Trace file, one contact batch per line.
    trace: PathBuf,
    /// Gesture tuning; built-in defaults when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Subscription such as `tap:1`, `swipe:2` or `pinch`. Repeatable.
    #[arg(long = "gesture")]
    gestures: Vec<String>,
    /// Expected kind labels, one per line.
    #[arg(long)]
    expect: Option<PathBuf>,
    /// How far past the last batch to advance the clock.
    #[arg(long = "tail-ms", default_value_t = 1_000)]
    tail_ms: u64,
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    LogBuilder::new()
        .filter_level(if cli.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Warn
        })
        .parse_default_env()
        .init();

    let config = match &cli.config {
        Some(path) => GestureConfig::load(path)?,
        None => GestureConfig::default(),
    };
    let gestures = if cli.gestures.is_empty() {
        default_gestures()
    } else {
        cli.gestures
            .iter()
            .map(String::as_str)
            .map(parse_gesture)
            .collect::<Result<Vec<_>>>()?
    };

    let batches = load_trace(&cli.trace)?;
    let outcome = replay(config, &gestures, &batches, cli.tail_ms)?;

    println!("{CSV_HEADER}");
    for event in &outcome.events {
        println!("{}", event.csv_row());
    }
    if outcome.rejected > 0 {
        log::warn!("replay: {} batches rejected", outcome.rejected);
    }

    if let Some(path) = &cli.expect {
        let expected = load_expected(path)?;
        check_expected(&outcome, &expected)?;
    }
    Ok(())
}
