use log::info;

use crate::stimulus::AddrConstraint;

/// Number of cycles a run lasts unless told otherwise.
pub const DEFAULT_CYCLES: u64 = 10;

/// How generation and driving share a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchedulingMode {
    /// Generate, then drive, then clock, one cycle at a time.
    #[default]
    Sequential,
    /// The generator runs as its own task and stays ahead of the driver as
    /// far as the channel allows.
    Concurrent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    pub cycles: u64,
    pub seed: Option<u64>,
    pub addr: AddrConstraint,
    pub channel_capacity: Option<usize>,
    pub mode: SchedulingMode,
    pub check: bool,
    /// Keep a [CycleRecord](crate::orchestrator::CycleRecord) per cycle in
    /// the report. Cycles are counted either way.
    pub record_trace: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            cycles: DEFAULT_CYCLES,
            seed: None,
            addr: AddrConstraint::default(),
            channel_capacity: None,
            mode: SchedulingMode::default(),
            check: true,
            record_trace: true,
        }
    }
}

impl HarnessConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cycles(mut self, cycles: u64) -> Self {
        self.cycles = cycles;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn addr(mut self, addr: AddrConstraint) -> Self {
        self.addr = addr;
        self
    }

    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = Some(capacity);
        self
    }

    pub fn mode(mut self, mode: SchedulingMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn check(mut self, check: bool) -> Self {
        self.check = check;
        self
    }

    pub fn record_trace(mut self, record: bool) -> Self {
        self.record_trace = record;
        self
    }

    /// The seed to use for this run. Without a configured seed one is drawn
    /// from the OS and logged, so any run can be replayed.
    pub fn resolve_seed(&self) -> u64 {
        match self.seed {
            Some(seed) => seed,
            None => {
                let seed: u64 = rand::random();
                info!("no seed given, using {seed}");
                seed
            }
        }
    }
}
