//! Self-checking side of the harness.
//!
//! The scoreboard keeps its own sparse copy of the memory, predicts what
//! each edge should produce and compares that with what the device did.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use log::warn;

use crate::errors::HarnessError;
use crate::memory::{Addr, MemoryModel};
use crate::stimulus::StimulusVector;

/// What kinds of cycles a run has exercised.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Coverage {
    pub cycles: u64,
    pub resets: u64,
    pub writes: u64,
    pub reads: u64,
    /// Write and read on the same edge.
    pub collisions: u64,
    pub idle: u64,
    pub addrs: BTreeSet<Addr>,
}

impl Coverage {
    pub fn sample(&mut self, vector: &StimulusVector) {
        self.cycles += 1;
        self.addrs.insert(vector.addr());
        if vector.is_reset() {
            self.resets += 1;
            return;
        }
        match (vector.wr_en(), vector.rd_en()) {
            (true, true) => {
                self.writes += 1;
                self.reads += 1;
                self.collisions += 1;
            }
            (true, false) => self.writes += 1,
            (false, true) => self.reads += 1,
            (false, false) => self.idle += 1,
        }
    }
}

impl fmt::Display for Coverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} cycles: {} reset, {} write, {} read, {} write+read, {} idle, {} distinct addr",
            self.cycles,
            self.resets,
            self.writes,
            self.reads,
            self.collisions,
            self.idle,
            self.addrs.len()
        )
    }
}

#[derive(Debug, Default)]
pub struct Scoreboard {
    memory: HashMap<Addr, u8>,
    rd_data: u8,
    coverage: Coverage,
    mismatches: Vec<HarnessError>,
}

impl Scoreboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new run: coverage and mismatches are cleared, the reference
    /// memory carries over just as the device's storage does.
    pub fn begin_run(&mut self) {
        self.coverage = Coverage::default();
        self.mismatches.clear();
    }

    /// Advance the reference by one edge and return the expected `rd_data`.
    pub fn predict(&mut self, vector: &StimulusVector) -> u8 {
        if vector.is_reset() {
            self.memory.clear();
            self.rd_data = 0;
            return self.rd_data;
        }
        let before = self.expected_at(vector.addr());
        if vector.wr_en() {
            self.memory.insert(vector.addr(), vector.wr_data());
        }
        if vector.rd_en() {
            self.rd_data = before;
        }
        self.rd_data
    }

    /// Count a cycle toward coverage. Independent of checking.
    pub fn sample(&mut self, vector: &StimulusVector) {
        self.coverage.sample(vector);
    }

    pub fn expected_at(&self, addr: Addr) -> u8 {
        self.memory.get(&addr).copied().unwrap_or(0)
    }

    /// Compare the device against the reference after the edge that applied
    /// `vector`. Returns false and records the mismatch on any difference.
    pub fn check(&mut self, cycle: u64, vector: &StimulusVector, dut: &MemoryModel) -> bool {
        let expected = self.predict(vector);
        let mut ok = true;

        let actual = dut.rd_data();
        if actual != expected {
            self.record(cycle, "rd_data", expected, actual);
            ok = false;
        }

        if vector.is_reset() {
            // Reset must clear every entry, not just the addressed one.
            if let Some(stale) = Addr::all().find(|&a| dut.peek(a) != 0) {
                self.record(cycle, "storage", 0, dut.peek(stale));
                ok = false;
            }
            return ok;
        }

        let addr = vector.addr();
        let (expected, actual) = (self.expected_at(addr), dut.peek(addr));
        if actual != expected {
            self.record(cycle, "storage", expected, actual);
            ok = false;
        }
        ok
    }

    fn record(&mut self, cycle: u64, signal: &'static str, expected: u8, actual: u8) {
        let err = HarnessError::Mismatch {
            cycle,
            signal,
            expected,
            actual,
        };
        warn!("{err}");
        self.mismatches.push(err);
    }

    pub fn coverage(&self) -> &Coverage {
        &self.coverage
    }

    pub fn mismatches(&self) -> &[HarnessError] {
        &self.mismatches
    }

    pub fn passed(&self) -> bool {
        self.mismatches.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::PortInputs;

    #[test]
    fn tracks_a_correct_device() {
        let addr = Addr::from_low_bits(111);
        let mut dut = MemoryModel::new();
        let mut sb = Scoreboard::new();
        let seq = [
            StimulusVector::reset(addr),
            StimulusVector::write(addr, 0x5a),
            StimulusVector::write_read(addr, 0x11),
            StimulusVector::read(addr),
            StimulusVector::idle(addr),
        ];
        for (cycle, v) in seq.iter().enumerate() {
            dut.tick(&PortInputs::from(*v));
            sb.sample(v);
            assert!(sb.check(cycle as u64, v, &dut));
        }
        assert!(sb.passed());
        let cov = sb.coverage();
        assert_eq!((cov.resets, cov.writes, cov.reads, cov.collisions, cov.idle), (1, 2, 2, 1, 1));
        assert_eq!(cov.addrs.len(), 1);
    }

    #[test]
    fn reset_checks_every_entry() {
        let focus = Addr::from_low_bits(111);
        let mut dut = MemoryModel::new();
        let mut sb = Scoreboard::new();

        let v = StimulusVector::reset(focus);
        dut.tick(&PortInputs::from(v));
        assert!(sb.check(0, &v, &dut));

        // An entry the reset missed, away from the addressed one
        dut.tick(&PortInputs::from(v));
        dut.load(Addr::from_low_bits(5), 0x42);
        assert!(!sb.check(1, &v, &dut));
        assert_eq!(
            sb.mismatches(),
            &[HarnessError::Mismatch {
                cycle: 1,
                signal: "storage",
                expected: 0,
                actual: 0x42,
            }]
        );
    }

    #[test]
    fn reports_a_corrupted_device() {
        let addr = Addr::from_low_bits(9);
        let mut dut = MemoryModel::new();
        let mut sb = Scoreboard::new();

        let v = StimulusVector::write(addr, 0x42);
        dut.tick(&PortInputs::from(v));
        assert!(sb.check(0, &v, &dut));

        dut.load(addr, 0x43);
        let v = StimulusVector::read(addr);
        dut.tick(&PortInputs::from(v));
        assert!(!sb.check(1, &v, &dut));

        assert_eq!(
            sb.mismatches()[0],
            HarnessError::Mismatch {
                cycle: 1,
                signal: "rd_data",
                expected: 0x42,
                actual: 0x43,
            }
        );
        assert_eq!(sb.mismatches().len(), 2);
    }
}
