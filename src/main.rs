use clap::Parser;
use eyre::Result;
use syncmem_tb::{AddrConstraint, HarnessConfig, Orchestrator, SchedulingMode, DEFAULT_CYCLES};

/// Constrained-random testbench for a 128x8 synchronous memory.
#[derive(Parser, Debug)]
#[command(name = "syncmem-tb", version, about)]
struct Cli {
    /// Number of clock cycles to run.
    #[arg(short, long, default_value_t = DEFAULT_CYCLES)]
    cycles: u64,

    /// Seed for the vector generator. Random (and logged) when omitted.
    #[arg(short, long)]
    seed: Option<u64>,

    /// Address constraint: a single address, `LO..=HI`, or `any`.
    #[arg(short, long, default_value_t = AddrConstraint::default())]
    addr: AddrConstraint,

    /// Bound the handoff channel to this many vectors.
    #[arg(long)]
    capacity: Option<usize>,

    /// Run the generator as its own task.
    #[arg(long)]
    concurrent: bool,

    /// Skip the scoreboard comparison.
    #[arg(long)]
    no_check: bool,

    /// Print every cycle.
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn config(&self) -> HarnessConfig {
        let mut config = HarnessConfig::new()
            .cycles(self.cycles)
            .addr(self.addr)
            .check(!self.no_check)
            .record_trace(self.verbose)
            .mode(if self.concurrent {
                SchedulingMode::Concurrent
            } else {
                SchedulingMode::Sequential
            });
        if let Some(seed) = self.seed {
            config = config.seed(seed);
        }
        if let Some(capacity) = self.capacity {
            config = config.channel_capacity(capacity);
        }
        config
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    println!("🚀 syncmem testbench starting...");

    let mut harness = Orchestrator::new(cli.config());
    let report = harness.run().await?;

    if let Some(seed) = report.seed {
        println!("🎲 seed {seed}");
    }
    if cli.verbose {
        for record in &report.trace {
            println!(
                "  [{:>4}] {} -> rd_data={:#04x}",
                record.cycle, record.vector, record.rd_data
            );
        }
    }
    println!("📊 {}", report.coverage);

    if !report.passed() {
        for mismatch in &report.mismatches {
            println!("❌ {mismatch}");
        }
        return Err(eyre::eyre!(
            "run failed: {} mismatches, {} generated, {} applied over {} cycles",
            report.mismatches.len(),
            report.generated,
            report.applied,
            report.cycles
        ));
    }

    println!("🎉 All {} cycles passed!", report.cycles);
    Ok(())
}
