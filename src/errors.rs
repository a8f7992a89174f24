use thiserror::Error;

use crate::stimulus::StimulusVector;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum HarnessError {
    /// A generated vector broke one of the stimulus constraints. Always a
    /// generator defect.
    #[error("constraint violation in {vector}: {reason}")]
    ConstraintViolation {
        vector: StimulusVector,
        reason: &'static str,
    },

    #[error("address {0} is outside the 7-bit range 0..=127")]
    OutOfRangeAddress(u8),

    #[error("handoff channel closed before cycle {cycle}")]
    ChannelClosed { cycle: u64 },

    #[error("cycle {cycle}: {signal} mismatch, expected {expected:#04x}, got {actual:#04x}")]
    Mismatch {
        cycle: u64,
        signal: &'static str,
        expected: u8,
        actual: u8,
    },

    #[error("generator task failed: {0}")]
    GeneratorTask(String),
}

pub type HarnessResult<T> = Result<T, HarnessError>;
