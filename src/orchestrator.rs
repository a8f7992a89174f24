//! Clock and run sequencing.
//!
//! Every cycle is generate, hand off, drive, rising edge, observe. A run
//! lasts exactly the configured number of cycles.

use log::{debug, info};

use crate::channel::{handoff_channel, HandoffTx};
use crate::config::{HarnessConfig, SchedulingMode};
use crate::driver::Driver;
use crate::errors::{HarnessError, HarnessResult};
use crate::generator::VectorGenerator;
use crate::interface::{shared_interface, SharedInterface};
use crate::memory::{MemoryModel, MEM_DEPTH};
use crate::scoreboard::{Coverage, Scoreboard};
use crate::stimulus::StimulusVector;

/// Logical clock. Counts rising edges.
#[derive(Debug, Default, Clone, Copy)]
pub struct Clock {
    cycle: u64,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of edges so far.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Advance one edge and return its index, starting at 0.
    pub fn posedge(&mut self) -> u64 {
        let edge = self.cycle;
        self.cycle += 1;
        edge
    }
}

/// What happened on one edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleRecord {
    pub cycle: u64,
    pub vector: StimulusVector,
    pub rd_data: u8,
}

/// Most records a run reserves room for up front; longer runs grow the
/// buffer as they go.
const TRACE_PREALLOC: usize = 4096;

/// Per-run cycle log. Always counts cycles; keeps the records themselves
/// only when asked to.
#[derive(Debug)]
struct Trace {
    records: Vec<CycleRecord>,
    cycles: u64,
    keep: bool,
}

impl Trace {
    fn new(expected_cycles: u64, keep: bool) -> Self {
        let capacity = if keep {
            usize::try_from(expected_cycles)
                .unwrap_or(usize::MAX)
                .min(TRACE_PREALLOC)
        } else {
            0
        };
        Self {
            records: Vec::with_capacity(capacity),
            cycles: 0,
            keep,
        }
    }

    fn push(&mut self, record: CycleRecord) {
        self.cycles += 1;
        if self.keep {
            self.records.push(record);
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunReport {
    /// `None` for directed runs.
    pub seed: Option<u64>,
    pub cycles: u64,
    pub generated: u64,
    pub applied: u64,
    /// Empty unless the config records the trace.
    pub trace: Vec<CycleRecord>,
    pub coverage: Coverage,
    pub mismatches: Vec<HarnessError>,
    pub final_rd_data: u8,
    pub final_storage: [u8; MEM_DEPTH],
}

impl RunReport {
    /// Vectors in the order the driver applied them, when the trace was
    /// recorded.
    pub fn applied_vectors(&self) -> impl Iterator<Item = StimulusVector> + '_ {
        self.trace.iter().map(|r| r.vector)
    }

    pub fn passed(&self) -> bool {
        self.mismatches.is_empty()
            && self.generated == self.applied
            && self.applied == self.cycles
    }
}

pub struct Orchestrator {
    config: HarnessConfig,
    dut: MemoryModel,
    bus: SharedInterface,
    clock: Clock,
    scoreboard: Scoreboard,
}

impl Orchestrator {
    pub fn new(config: HarnessConfig) -> Self {
        Self {
            config,
            dut: MemoryModel::new(),
            bus: shared_interface(),
            clock: Clock::new(),
            scoreboard: Scoreboard::new(),
        }
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn dut(&self) -> &MemoryModel {
        &self.dut
    }

    pub fn bus(&self) -> SharedInterface {
        self.bus.clone()
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// One constrained-random run of `config.cycles` cycles.
    pub async fn run(&mut self) -> HarnessResult<RunReport> {
        let seed = self.config.resolve_seed();
        let cycles = self.config.cycles;
        info!(
            "run: {} cycles, seed {}, addr {}, {:?}",
            cycles, seed, self.config.addr, self.config.mode
        );

        let generator = VectorGenerator::seeded(seed, self.config.addr, cycles);
        let (tx, rx) = handoff_channel(self.config.channel_capacity);
        let mut driver = Driver::new(rx, self.bus.clone());
        self.scoreboard.begin_run();

        let (generated, trace) = match self.config.mode {
            SchedulingMode::Sequential => self.run_sequential(generator, tx, &mut driver).await?,
            SchedulingMode::Concurrent => self.run_concurrent(generator, tx, &mut driver).await?,
        };

        let report = self.report(Some(seed), generated, &driver, trace);
        info!("done: {}", report.coverage);
        Ok(report)
    }

    /// Push a fixed sequence through the same channel, driver and clock, one
    /// vector per cycle. The vectors are not constraint-checked.
    pub async fn run_directed<I>(&mut self, vectors: I) -> HarnessResult<RunReport>
    where
        I: IntoIterator<Item = StimulusVector>,
    {
        let (mut tx, rx) = handoff_channel(self.config.channel_capacity);
        let mut driver = Driver::new(rx, self.bus.clone());
        self.scoreboard.begin_run();

        let mut trace = Trace::new(0, self.config.record_trace);
        for vector in vectors {
            tx.send(vector).await?;
            trace.push(self.step(&mut driver).await?);
        }
        Ok(self.report(None, tx.sent(), &driver, trace))
    }

    async fn run_sequential(
        &mut self,
        mut generator: VectorGenerator,
        mut tx: HandoffTx,
        driver: &mut Driver,
    ) -> HarnessResult<(u64, Trace)> {
        let mut trace = Trace::new(self.config.cycles, self.config.record_trace);
        for _ in 0..self.config.cycles {
            if generator.publish(&mut tx).await?.is_none() {
                break;
            }
            trace.push(self.step(driver).await?);
        }
        Ok((generator.emitted(), trace))
    }

    async fn run_concurrent(
        &mut self,
        generator: VectorGenerator,
        tx: HandoffTx,
        driver: &mut Driver,
    ) -> HarnessResult<(u64, Trace)> {
        let producer = tokio::spawn(generator.run(tx));
        let mut trace = Trace::new(self.config.cycles, self.config.record_trace);
        for _ in 0..self.config.cycles {
            trace.push(self.step(driver).await?);
        }
        let generated = producer
            .await
            .map_err(|e| HarnessError::GeneratorTask(e.to_string()))??;
        Ok((generated, trace))
    }

    /// Drive one vector, clock the device, observe.
    async fn step(&mut self, driver: &mut Driver) -> HarnessResult<CycleRecord> {
        let vector = driver.apply().await?;
        let cycle = self.clock.posedge();
        let rd_data = self.bus.borrow_mut().posedge(&mut self.dut);
        debug!("cycle {cycle}: {vector} -> rd_data={rd_data:#04x}");
        self.scoreboard.sample(&vector);
        if self.config.check && !self.scoreboard.check(cycle, &vector, &self.dut) {
            debug!("cycle {cycle}: scoreboard mismatch");
        }
        Ok(CycleRecord {
            cycle,
            vector,
            rd_data,
        })
    }

    fn report(
        &self,
        seed: Option<u64>,
        generated: u64,
        driver: &Driver,
        trace: Trace,
    ) -> RunReport {
        RunReport {
            seed,
            cycles: trace.cycles,
            generated,
            applied: driver.applied(),
            trace: trace.records,
            coverage: self.scoreboard.coverage().clone(),
            mismatches: self.scoreboard.mismatches().to_vec(),
            final_rd_data: self.dut.rd_data(),
            final_storage: self.dut.snapshot(),
        }
    }
}
