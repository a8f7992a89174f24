//! The signal bundle between the testbench and the memory.
//!
//! The driver is the only writer of the input signals. The memory samples
//! them on the rising edge and drives `rd_data` back.

use std::cell::RefCell;
use std::rc::Rc;

use crate::memory::{Addr, MemoryModel, PortInputs};
use crate::stimulus::StimulusVector;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemInterface {
    pub reset: bool,
    pub wr_en: bool,
    pub rd_en: bool,
    pub wr_data: u8,
    pub addr: Addr,
    pub rd_data: u8,
}

/// Handle to the one signal bundle of a run, created at startup and handed
/// to whoever needs it.
pub type SharedInterface = Rc<RefCell<MemInterface>>;

pub fn shared_interface() -> SharedInterface {
    Rc::new(RefCell::new(MemInterface::default()))
}

impl MemInterface {
    /// Put a vector's fields on the input signals.
    pub fn drive(&mut self, vector: &StimulusVector) {
        self.reset = vector.is_reset();
        self.wr_en = vector.wr_en();
        self.rd_en = vector.rd_en();
        self.wr_data = vector.wr_data();
        self.addr = vector.addr();
    }

    pub fn inputs(&self) -> PortInputs {
        PortInputs {
            reset: self.reset,
            wr_en: self.wr_en,
            rd_en: self.rd_en,
            wr_data: self.wr_data,
            addr: self.addr,
        }
    }

    /// Rising edge: the memory samples the inputs and the registered output
    /// appears on `rd_data`.
    pub fn posedge(&mut self, dut: &mut MemoryModel) -> u8 {
        self.rd_data = dut.tick(&self.inputs());
        self.rd_data
    }
}
