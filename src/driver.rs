//! Bus functional model: one vector off the queue, onto the signals.

use log::trace;

use crate::channel::HandoffRx;
use crate::errors::{HarnessError, HarnessResult};
use crate::interface::SharedInterface;
use crate::stimulus::StimulusVector;

pub struct Driver {
    rx: HandoffRx,
    bus: SharedInterface,
    applied: u64,
}

impl Driver {
    pub fn new(rx: HandoffRx, bus: SharedInterface) -> Self {
        Self { rx, bus, applied: 0 }
    }

    /// Wait for the next vector and drive it onto the interface for the
    /// coming edge. The vector is applied as-is; legality is the
    /// generator's job.
    pub async fn apply(&mut self) -> HarnessResult<StimulusVector> {
        let vector = self
            .rx
            .recv()
            .await
            .ok_or(HarnessError::ChannelClosed {
                cycle: self.applied,
            })?;
        self.bus.borrow_mut().drive(&vector);
        self.applied += 1;
        trace!("drv #{}: {}", self.applied, vector);
        Ok(vector)
    }

    pub fn applied(&self) -> u64 {
        self.applied
    }

    pub fn received(&self) -> u64 {
        self.rx.received()
    }
}
