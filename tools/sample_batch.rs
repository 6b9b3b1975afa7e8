//! Sample Batch Generator
//!
//! Writes a random CSV batch in the gateway's 30-column schema for demos and
//! manual testing of the upload path.

use clap::Parser;
use fraud_detection_gateway::{batch, TransactionRecord};
use fraud_detection_gateway::types::FEATURE_COUNT;
use rand::Rng;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "sample-batch", about = "Generate a random transaction batch CSV")]
struct Args {
    /// Number of rows
    #[arg(long, default_value_t = 100)]
    rows: usize,

    /// Share of rows shaped like fraudulent transactions
    #[arg(long, default_value_t = 0.1)]
    fraud_rate: f64,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

/// Transaction generator for testing
struct TransactionGenerator {
    rng: rand::rngs::ThreadRng,
    /// Seconds since the first generated transaction
    clock: f64,
}

impl TransactionGenerator {
    fn new() -> Self {
        Self {
            rng: rand::thread_rng(),
            clock: 0.0,
        }
    }

    fn tick(&mut self) -> f64 {
        self.clock += self.rng.gen_range(0.0..30.0_f64).floor();
        self.clock
    }

    /// Generate a random genuine-looking transaction
    fn generate_genuine(&mut self) -> TransactionRecord {
        let mut values = [0.0; FEATURE_COUNT];
        values[0] = self.tick();
        for v in values.iter_mut().take(FEATURE_COUNT - 1).skip(1) {
            *v = self.rng.gen_range(-2.0..2.0);
        }
        values[FEATURE_COUNT - 1] = round_cents(self.rng.gen_range(1.0..250.0));
        TransactionRecord::new(values)
    }

    /// Generate a suspicious transaction
    fn generate_suspicious(&mut self) -> TransactionRecord {
        let mut values = [0.0; FEATURE_COUNT];
        values[0] = self.tick();
        for v in values.iter_mut().take(FEATURE_COUNT - 1).skip(1) {
            *v = self.rng.gen_range(-3.0..3.0);
        }
        // Components that separate fraud most strongly in the public dataset
        values[4] = self.rng.gen_range(3.0..8.0); // V4
        values[10] = self.rng.gen_range(3.0..7.0); // V11
        values[12] = self.rng.gen_range(-10.0..-4.0); // V12
        values[14] = self.rng.gen_range(-12.0..-5.0); // V14
        values[17] = self.rng.gen_range(-10.0..-3.0); // V17
        values[FEATURE_COUNT - 1] = round_cents(self.rng.gen_range(0.0..2000.0));
        TransactionRecord::new(values)
    }
}

fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sample_batch=info".parse()?),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    anyhow::ensure!(
        (0.0..=1.0).contains(&args.fraud_rate),
        "fraud rate must be within [0, 1]"
    );

    let mut generator = TransactionGenerator::new();
    let mut rng = rand::thread_rng();

    let mut suspicious_count = 0;
    let records: Vec<TransactionRecord> = (0..args.rows)
        .map(|_| {
            if rng.gen_bool(args.fraud_rate) {
                suspicious_count += 1;
                generator.generate_suspicious()
            } else {
                generator.generate_genuine()
            }
        })
        .collect();

    match &args.output {
        Some(path) => batch::write_records(File::create(path)?, &records)?,
        None => batch::write_records(io::stdout().lock(), &records)?,
    }

    info!(
        rows = records.len(),
        suspicious = suspicious_count,
        output = ?args.output,
        "Sample batch written"
    );

    Ok(())
}
