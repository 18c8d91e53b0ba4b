use std::{fs::File, io::BufReader};

use anyhow::{Context, Result};
use even_ledger::{DuplicatePolicy, SharedLedger, bin_utils::Service};
use tracing_subscriber::EnvFilter;

const DUPLICATE_IDS_VAR: &str = "LEDGER_DUPLICATE_IDS";

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let filename = std::env::args()
        .nth(1)
        .context("Expected a request file name as the first argument")?;
    let policy = match std::env::var(DUPLICATE_IDS_VAR) {
        Ok(value) => value
            .parse::<DuplicatePolicy>()
            .with_context(|| format!("Invalid {DUPLICATE_IDS_VAR}"))?,
        Err(_) => DuplicatePolicy::default(),
    };
    let file = File::open(&filename).with_context(|| format!("Failed to open `{filename}`"))?;

    tracing::info!(file = %filename, ?policy, "Processing ledger requests");
    let service = Service {
        input: BufReader::new(file),
        output: &mut std::io::stdout(),
        ledger: SharedLedger::in_memory(policy),
        // stdout carries the balance sheet, responses go to stderr
        response_printer: Box::new(|line, response| {
            eprintln!("{}", response.to_json_line(line));
        }),
    };
    service.run()
}
