pub mod control;
pub use control::{Action, Command, JobState, JobStatus, Session};

pub mod event;
pub use event::{EventKind, EventSource, JobEvent, SimulatedEvents};

pub mod job;
pub use job::{JobId, JobSpec};

pub mod metrics;
pub use metrics::{Aggregate, MetricsSummary};
