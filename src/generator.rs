//! Seeded constrained-random vector source.

use log::trace;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::channel::HandoffTx;
use crate::errors::HarnessResult;
use crate::stimulus::{AddrConstraint, StimulusVector};

/// Produces exactly `count` legal vectors, then stops. A new run needs a new
/// generator.
pub struct VectorGenerator<R = StdRng> {
    rng: R,
    constraint: AddrConstraint,
    remaining: u64,
    emitted: u64,
}

impl VectorGenerator<StdRng> {
    /// Same seed, same constraint, same count: same sequence.
    pub fn seeded(seed: u64, constraint: AddrConstraint, count: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed), constraint, count)
    }
}

impl<R: Rng> VectorGenerator<R> {
    pub fn with_rng(rng: R, constraint: AddrConstraint, count: u64) -> Self {
        Self {
            rng,
            constraint,
            remaining: count,
            emitted: 0,
        }
    }

    pub fn constraint(&self) -> &AddrConstraint {
        &self.constraint
    }

    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    /// Generate the next vector and enqueue it. `Ok(None)` once the run's
    /// vectors are used up.
    pub async fn publish(&mut self, tx: &mut HandoffTx) -> HarnessResult<Option<StimulusVector>> {
        let Some(vector) = self.next() else {
            return Ok(None);
        };
        vector.check(&self.constraint)?;
        tx.send(vector).await?;
        Ok(Some(vector))
    }

    /// Publish everything that is left, then drop the sender so the driver
    /// sees the end of the stream.
    pub async fn run(mut self, mut tx: HandoffTx) -> HarnessResult<u64> {
        while self.publish(&mut tx).await?.is_some() {}
        Ok(self.emitted)
    }
}

impl<R: Rng> Iterator for VectorGenerator<R> {
    type Item = StimulusVector;

    fn next(&mut self) -> Option<StimulusVector> {
        if self.remaining == 0 {
            return None;
        }
        let vector = StimulusVector::randomize(&mut self.rng, &self.constraint);
        debug_assert!(vector.check(&self.constraint).is_ok());
        self.remaining -= 1;
        self.emitted += 1;
        trace!("gen #{}: {}", self.emitted, vector);
        Some(vector)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = usize::try_from(self.remaining).unwrap_or(usize::MAX);
        (n, Some(n))
    }
}
