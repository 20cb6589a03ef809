//! Harvest runtime: deadline, politeness pacing, shared context and the
//! fan-out orchestrator

mod context;
mod deadline;
mod orchestrator;
mod pacer;

pub(crate) use context::decode_json;
pub use context::{AdapterSettings, HarvestContext};
pub use deadline::{Deadline, DeadlineTimer};
pub use orchestrator::Harvester;
pub use pacer::{HostPacer, HostState};
