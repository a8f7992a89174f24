//! 128 x 8-bit synchronous memory with a registered read port.
//!
//! All state changes happen in [MemoryModel::tick], which stands for one
//! rising clock edge. Reset is sampled on that edge like any other input.

use std::fmt;

use crate::errors::{HarnessError, HarnessResult};

/// Number of storage entries.
pub const MEM_DEPTH: usize = 128;

/// Largest legal address.
pub const ADDR_MAX: u8 = (MEM_DEPTH - 1) as u8;

/// A 7-bit storage address.
///
/// Raw bytes go through [Addr::new], which reports an out-of-range value
/// instead of letting it reach the model, or [Addr::from_low_bits], which
/// truncates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Addr(u8);

impl Addr {
    pub fn new(raw: u8) -> HarnessResult<Self> {
        if raw > ADDR_MAX {
            Err(HarnessError::OutOfRangeAddress(raw))
        } else {
            Ok(Self(raw))
        }
    }

    /// Keep the low 7 bits of `raw`, the way a 7-bit bus truncates.
    pub const fn from_low_bits(raw: u8) -> Self {
        Self(raw & ADDR_MAX)
    }

    pub const fn get(self) -> u8 {
        self.0
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Every legal address, lowest first.
    pub fn all() -> impl Iterator<Item = Addr> {
        (0..=ADDR_MAX).map(Addr)
    }
}

impl TryFrom<u8> for Addr {
    type Error = HarnessError;

    fn try_from(raw: u8) -> HarnessResult<Self> {
        Addr::new(raw)
    }
}

impl From<Addr> for u8 {
    fn from(addr: Addr) -> u8 {
        addr.0
    }
}

impl fmt::Display for Addr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Values on the input ports, as sampled at a clock edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PortInputs {
    pub reset: bool,
    pub wr_en: bool,
    pub rd_en: bool,
    pub wr_data: u8,
    pub addr: Addr,
}

/// Which update rule applies on a given edge. Chosen fresh from `reset`
/// every tick; nothing about it is remembered between ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemState {
    Normal,
    Reset,
}

impl MemState {
    pub fn sample(reset: bool) -> Self {
        if reset {
            MemState::Reset
        } else {
            MemState::Normal
        }
    }
}

/// The memory device.
#[derive(Clone, PartialEq, Eq)]
pub struct MemoryModel {
    storage: [u8; MEM_DEPTH],
    rd_data: u8,
}

impl Default for MemoryModel {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MemoryModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nonzero = self.storage.iter().filter(|&&b| b != 0).count();
        f.debug_struct("MemoryModel")
            .field("rd_data", &self.rd_data)
            .field("nonzero_entries", &nonzero)
            .finish()
    }
}

impl MemoryModel {
    pub fn new() -> Self {
        Self {
            storage: [0; MEM_DEPTH],
            rd_data: 0,
        }
    }

    /// Apply one rising edge and return the new `rd_data`.
    ///
    /// On reset every entry and the output register are cleared and the
    /// other inputs are ignored. Otherwise the write (if enabled) lands in
    /// storage and the read (if enabled) captures the value that was stored
    /// *before* this edge's write. With `rd_en` low the output register
    /// holds its previous value.
    pub fn tick(&mut self, inputs: &PortInputs) -> u8 {
        match MemState::sample(inputs.reset) {
            MemState::Reset => {
                self.storage = [0; MEM_DEPTH];
                self.rd_data = 0;
            }
            MemState::Normal => {
                let idx = inputs.addr.index();
                let old = self.storage[idx];
                if inputs.wr_en {
                    self.storage[idx] = inputs.wr_data;
                }
                if inputs.rd_en {
                    self.rd_data = old;
                }
            }
        }
        self.rd_data
    }

    /// Current value of the output register.
    pub fn rd_data(&self) -> u8 {
        self.rd_data
    }

    /// Read a storage entry without clocking the model.
    pub fn peek(&self, addr: Addr) -> u8 {
        self.storage[addr.index()]
    }

    /// Backdoor write, bypassing the ports. Test setup only.
    pub fn load(&mut self, addr: Addr, value: u8) {
        self.storage[addr.index()] = value;
    }

    pub fn snapshot(&self) -> [u8; MEM_DEPTH] {
        self.storage
    }

    /// True when storage and the output register are all zero.
    pub fn is_cleared(&self) -> bool {
        self.rd_data == 0 && self.storage.iter().all(|&b| b == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(raw: u8) -> Addr {
        Addr::new(raw).unwrap()
    }

    #[test]
    fn addr_rejects_eight_bit_values() {
        assert_eq!(Addr::new(127).map(Addr::get), Ok(127));
        assert_eq!(Addr::new(128), Err(HarnessError::OutOfRangeAddress(128)));
        assert_eq!(Addr::try_from(255u8), Err(HarnessError::OutOfRangeAddress(255)));
        assert_eq!(Addr::from_low_bits(0xef).get(), 111);
        assert_eq!(Addr::all().count(), MEM_DEPTH);
    }

    #[test]
    fn fresh_model_is_cleared() {
        assert!(MemoryModel::new().is_cleared());
    }

    #[test]
    fn reset_ignores_write_and_read() {
        let mut mem = MemoryModel::new();
        mem.load(addr(3), 0x11);
        mem.load(addr(111), 0x22);

        let out = mem.tick(&PortInputs {
            reset: true,
            wr_en: true,
            rd_en: true,
            wr_data: 0xff,
            addr: addr(111),
        });

        assert_eq!(out, 0);
        assert!(mem.is_cleared());
    }

    #[test]
    fn read_during_write_returns_old_value() {
        let mut mem = MemoryModel::new();
        mem.load(addr(111), 0x33);

        let out = mem.tick(&PortInputs {
            wr_en: true,
            rd_en: true,
            wr_data: 0x44,
            addr: addr(111),
            ..Default::default()
        });

        assert_eq!(out, 0x33);
        assert_eq!(mem.peek(addr(111)), 0x44);
    }

    #[test]
    fn output_holds_without_rd_en() {
        let mut mem = MemoryModel::new();
        mem.load(addr(5), 0x7e);
        mem.tick(&PortInputs {
            rd_en: true,
            addr: addr(5),
            ..Default::default()
        });
        assert_eq!(mem.rd_data(), 0x7e);

        mem.tick(&PortInputs {
            wr_en: true,
            wr_data: 0x01,
            addr: addr(5),
            ..Default::default()
        });
        assert_eq!(mem.rd_data(), 0x7e);
        assert_eq!(mem.peek(addr(5)), 0x01);
    }
}
