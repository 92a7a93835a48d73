//! chatsync replay
//!
//! Feeds a recorded event log through a fresh store and prints the resulting
//! snapshot as JSON. The log holds one JSON-encoded `SyncEvent` per line;
//! blank lines and lines starting with `#` are skipped.
//!
//! Usage: `chatsync-replay <events.jsonl> [settings.json]`

use anyhow::{Context, bail};
use chatsync::{ChatStore, SyncEvent, store::Settings};
use std::io::{BufRead, BufReader};

fn main() -> anyhow::Result<()> {
    chatsync::init();

    let mut args = std::env::args().skip(1);
    let Some(events_path) = args.next() else {
        bail!("usage: chatsync-replay <events.jsonl> [settings.json]");
    };

    let settings = match args.next() {
        Some(path) => Settings::load(&path).with_context(|| format!("loading {}", path))?,
        None => Settings::default(),
    };
    let mut store = ChatStore::with_settings(settings);

    let file = std::fs::File::open(&events_path)
        .with_context(|| format!("opening {}", events_path))?;

    let mut applied = 0usize;
    let mut ignored = 0usize;
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| format!("reading {}", events_path))?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let event: SyncEvent = serde_json::from_str(line)
            .with_context(|| format!("{}:{}: invalid event", events_path, index + 1))?;
        if store.apply(event).is_applied() {
            applied += 1;
        } else {
            ignored += 1;
        }
    }

    tracing::info!(applied, ignored, "Replay finished");
    println!("{}", serde_json::to_string_pretty(&store.snapshot())?);
    Ok(())
}
