//! Generator-to-driver handoff queue.
//!
//! A thin wrapper over `tokio::sync::mpsc` so the rest of the harness does
//! not care whether the queue is bounded. Both halves count the vectors that
//! pass through them so a run can prove nothing was dropped or duplicated.

use tokio::sync::mpsc;

use crate::errors::{HarnessError, HarnessResult};
use crate::stimulus::StimulusVector;

enum TxInner {
    Bounded(mpsc::Sender<StimulusVector>),
    Unbounded(mpsc::UnboundedSender<StimulusVector>),
}

enum RxInner {
    Bounded(mpsc::Receiver<StimulusVector>),
    Unbounded(mpsc::UnboundedReceiver<StimulusVector>),
}

/// Producer half. Owned by the generator.
pub struct HandoffTx {
    inner: TxInner,
    sent: u64,
}

/// Consumer half. Owned by the driver.
pub struct HandoffRx {
    inner: RxInner,
    received: u64,
}

/// Create a FIFO handoff channel. `None` means unbounded; a bounded
/// channel holds at least one vector.
pub fn handoff_channel(capacity: Option<usize>) -> (HandoffTx, HandoffRx) {
    let (tx, rx) = match capacity {
        Some(cap) => {
            let (tx, rx) = mpsc::channel(cap.max(1));
            (TxInner::Bounded(tx), RxInner::Bounded(rx))
        }
        None => {
            let (tx, rx) = mpsc::unbounded_channel();
            (TxInner::Unbounded(tx), RxInner::Unbounded(rx))
        }
    };
    (
        HandoffTx { inner: tx, sent: 0 },
        HandoffRx {
            inner: rx,
            received: 0,
        },
    )
}

impl HandoffTx {
    /// Enqueue a vector, waiting for room if the channel is bounded.
    pub async fn send(&mut self, vector: StimulusVector) -> HarnessResult<()> {
        let closed = HarnessError::ChannelClosed { cycle: self.sent };
        match &self.inner {
            TxInner::Bounded(tx) => tx.send(vector).await.map_err(|_| closed)?,
            TxInner::Unbounded(tx) => tx.send(vector).map_err(|_| closed)?,
        }
        self.sent += 1;
        Ok(())
    }

    pub fn sent(&self) -> u64 {
        self.sent
    }
}

impl HandoffRx {
    /// Wait for the next vector. `None` once the sender is gone and the
    /// queue is drained.
    pub async fn recv(&mut self) -> Option<StimulusVector> {
        let vector = match &mut self.inner {
            RxInner::Bounded(rx) => rx.recv().await,
            RxInner::Unbounded(rx) => rx.recv().await,
        };
        if vector.is_some() {
            self.received += 1;
        }
        vector
    }

    /// Take a vector only if one is already queued.
    pub fn try_recv(&mut self) -> Option<StimulusVector> {
        let vector = match &mut self.inner {
            RxInner::Bounded(rx) => rx.try_recv().ok(),
            RxInner::Unbounded(rx) => rx.try_recv().ok(),
        };
        if vector.is_some() {
            self.received += 1;
        }
        vector
    }

    pub fn received(&self) -> u64 {
        self.received
    }
}
