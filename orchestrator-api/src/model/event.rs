//! Job lifecycle events.
//!
//! Events are produced by an `EventSource`. The default `SimulatedEvents`
//! source replays a fixed lifecycle for every job; a source backed by a real
//! scheduler must keep the same contract: timestamps never decrease for a job,
//! the first event is `Started`, and the stream ends once the job reaches a
//! terminal state.

use std::time::Duration;

use futures::stream::{self, BoxStream, StreamExt};

use crate::grpc::api;
use crate::util::SecondsUtc;

use super::JobId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventKind {
    Started,
    NodeAllocated,
}

impl From<EventKind> for api::JobEventType {
    fn from(kind: EventKind) -> Self {
        match kind {
            EventKind::Started => Self::Started,
            EventKind::NodeAllocated => Self::NodeAllocated,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JobEvent {
    pub job_id: JobId,
    pub kind: EventKind,
    pub detail: String,
    pub timestamp: SecondsUtc,
}

impl From<JobEvent> for api::JobEvent {
    fn from(event: JobEvent) -> Self {
        api::JobEvent {
            id: event.job_id.into(),
            r#type: api::JobEventType::from(event.kind) as i32,
            detail: event.detail,
            timestamp_unix: event.timestamp.unix(),
        }
    }
}

pub trait EventSource {
    /// The lifecycle events of `job_id`, oldest first.
    ///
    /// Each call starts a fresh sequence from the beginning.
    fn stream(&self, job_id: JobId) -> BoxStream<'static, JobEvent>;
}

static LIFECYCLE: [(EventKind, &str); 5] = [
    (EventKind::Started, "Job submitted"),
    (EventKind::Started, "Waiting in queue"),
    (EventKind::NodeAllocated, "Resources allocated"),
    (EventKind::Started, "Job started"),
    (EventKind::Started, "Finished successfully"),
];

/// Replays a fixed lifecycle, waiting `delay` before each event.
#[derive(Clone, Copy, Debug)]
pub struct SimulatedEvents {
    delay: Duration,
}

impl SimulatedEvents {
    pub const fn new(delay: Duration) -> Self {
        SimulatedEvents { delay }
    }
}

impl EventSource for SimulatedEvents {
    fn stream(&self, job_id: JobId) -> BoxStream<'static, JobEvent> {
        let delay = self.delay;
        let start = SecondsUtc::now();

        stream::iter(LIFECYCLE.iter().zip(0_i64..))
            .then(move |(&(kind, detail), offset)| {
                let job_id = job_id.clone();
                async move {
                    tokio::time::sleep(delay).await;
                    JobEvent {
                        job_id,
                        kind,
                        detail: detail.into(),
                        timestamp: start + chrono::Duration::seconds(offset),
                    }
                }
            })
            .boxed()
    }
}
