//! Constrained-random input vectors.

use std::fmt;
use std::str::FromStr;

use rand::Rng;

use crate::errors::{HarnessError, HarnessResult};
use crate::memory::{Addr, PortInputs, ADDR_MAX};

/// The address every vector targets under the default constraint.
pub const FOCUS_ADDR: Addr = Addr::from_low_bits(111);

/// Which addresses a generated vector may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddrConstraint {
    /// Every vector hits the same location.
    Fixed(Addr),
    /// Inclusive on both ends.
    Range { lo: Addr, hi: Addr },
    Any,
}

impl Default for AddrConstraint {
    fn default() -> Self {
        AddrConstraint::Fixed(FOCUS_ADDR)
    }
}

impl AddrConstraint {
    /// Build a range constraint; the bounds may be given in either order.
    pub fn range(a: Addr, b: Addr) -> Self {
        AddrConstraint::Range {
            lo: a.min(b),
            hi: a.max(b),
        }
    }

    pub fn admits(&self, addr: Addr) -> bool {
        match *self {
            AddrConstraint::Fixed(fixed) => addr == fixed,
            AddrConstraint::Range { lo, hi } => lo <= addr && addr <= hi,
            AddrConstraint::Any => true,
        }
    }

    /// Draw an address that satisfies this constraint.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Addr {
        match *self {
            AddrConstraint::Fixed(fixed) => fixed,
            AddrConstraint::Range { lo, hi } => {
                Addr::from_low_bits(rng.gen_range(lo.get()..=hi.get()))
            }
            AddrConstraint::Any => Addr::from_low_bits(rng.gen_range(0..=ADDR_MAX)),
        }
    }
}

impl fmt::Display for AddrConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddrConstraint::Fixed(addr) => write!(f, "{addr}"),
            AddrConstraint::Range { lo, hi } => write!(f, "{lo}..={hi}"),
            AddrConstraint::Any => f.write_str("any"),
        }
    }
}

/// Parses `any`, a single address such as `111`, or an inclusive range
/// such as `0..=15`.
impl FromStr for AddrConstraint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("any") {
            return Ok(AddrConstraint::Any);
        }
        let parse = |part: &str| -> Result<Addr, String> {
            let raw: u8 = part
                .trim()
                .parse()
                .map_err(|e| format!("bad address '{part}': {e}"))?;
            Addr::new(raw).map_err(|e| e.to_string())
        };
        match s.split_once("..=") {
            Some((lo, hi)) => Ok(AddrConstraint::range(parse(lo)?, parse(hi)?)),
            None => Ok(AddrConstraint::Fixed(parse(s)?)),
        }
    }
}

/// One cycle's worth of inputs. Fields are fixed once built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StimulusVector {
    reset: bool,
    wr_en: bool,
    rd_en: bool,
    wr_data: u8,
    addr: Addr,
}

impl StimulusVector {
    /// Build a vector from explicit field values. Nothing is checked here;
    /// see [StimulusVector::check].
    pub fn new(reset: bool, wr_en: bool, rd_en: bool, wr_data: u8, addr: Addr) -> Self {
        Self {
            reset,
            wr_en,
            rd_en,
            wr_data,
            addr,
        }
    }

    pub fn reset(addr: Addr) -> Self {
        Self::new(true, false, false, 0, addr)
    }

    pub fn write(addr: Addr, data: u8) -> Self {
        Self::new(false, true, false, data, addr)
    }

    pub fn read(addr: Addr) -> Self {
        Self::new(false, false, true, 0, addr)
    }

    pub fn write_read(addr: Addr, data: u8) -> Self {
        Self::new(false, true, true, data, addr)
    }

    pub fn idle(addr: Addr) -> Self {
        Self::new(false, false, false, 0, addr)
    }

    /// Draw a vector that satisfies `constraint` by construction.
    ///
    /// `wr_data` is drawn even on reset cycles; the model ignores it.
    pub fn randomize<R: Rng + ?Sized>(rng: &mut R, constraint: &AddrConstraint) -> Self {
        let reset = rng.gen::<bool>();
        let (wr_en, rd_en) = if reset {
            (false, false)
        } else {
            (rng.gen(), rng.gen())
        };
        let wr_data = rng.gen();
        let addr = constraint.pick(rng);
        Self::new(reset, wr_en, rd_en, wr_data, addr)
    }

    pub fn check(&self, constraint: &AddrConstraint) -> HarnessResult<()> {
        if !constraint.admits(self.addr) {
            return Err(HarnessError::ConstraintViolation {
                vector: *self,
                reason: "address outside constraint",
            });
        }
        if self.reset && (self.wr_en || self.rd_en) {
            return Err(HarnessError::ConstraintViolation {
                vector: *self,
                reason: "reset asserted together with wr_en or rd_en",
            });
        }
        Ok(())
    }

    pub fn is_reset(&self) -> bool {
        self.reset
    }

    pub fn wr_en(&self) -> bool {
        self.wr_en
    }

    pub fn rd_en(&self) -> bool {
        self.rd_en
    }

    pub fn wr_data(&self) -> u8 {
        self.wr_data
    }

    pub fn addr(&self) -> Addr {
        self.addr
    }
}

impl From<StimulusVector> for PortInputs {
    fn from(v: StimulusVector) -> Self {
        PortInputs {
            reset: v.reset,
            wr_en: v.wr_en,
            rd_en: v.rd_en,
            wr_data: v.wr_data,
            addr: v.addr,
        }
    }
}

impl fmt::Display for StimulusVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "reset={} wr_en={} rd_en={} wr_data={:#04x} addr={}",
            self.reset as u8, self.wr_en as u8, self.rd_en as u8, self.wr_data, self.addr
        )
    }
}
