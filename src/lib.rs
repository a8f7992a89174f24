pub mod channel;
pub mod config;
pub mod driver;
pub mod errors;
pub mod generator;
pub mod interface;
pub mod memory;
pub mod orchestrator;
pub mod scoreboard;
pub mod stimulus;

pub use channel::{handoff_channel, HandoffRx, HandoffTx};
pub use config::{HarnessConfig, SchedulingMode, DEFAULT_CYCLES};
pub use driver::Driver;
pub use errors::{HarnessError, HarnessResult};
pub use generator::VectorGenerator;
pub use interface::{shared_interface, MemInterface, SharedInterface};
pub use memory::{Addr, MemState, MemoryModel, PortInputs, ADDR_MAX, MEM_DEPTH};
pub use orchestrator::{Clock, CycleRecord, Orchestrator, RunReport};
pub use scoreboard::{Coverage, Scoreboard};
pub use stimulus::{AddrConstraint, StimulusVector, FOCUS_ADDR};
