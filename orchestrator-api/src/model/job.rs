use std::num::NonZeroU32;
use std::str::FromStr;

use derive_more::{Deref, Display, From, Into};
use displaydoc::Display as DisplayDoc;
use thiserror::Error;
use tonic::Status;
use tracing::warn;
use uuid::Uuid;

use crate::grpc::api;

const JOB_ID_PREFIX: &str = "job-";

#[derive(Debug, DisplayDoc, Error)]
pub enum Error {
    /// Failed to submit job with `{0}` cpus per node.
    CpusPerNode(i32),
    /// Failed to submit job without an executable.
    EmptyExecutable,
    /// Failed to parse an empty job id.
    EmptyJobId,
    /// Failed to submit job without a name.
    EmptyName,
    /// Failed to submit job on `{0}` nodes.
    Nodes(i32),
}

impl From<Error> for Status {
    fn from(err: Error) -> Self {
        use Error::*;
        warn!("{err}");
        match err {
            CpusPerNode(_) => Status::invalid_argument("cpus_per_node"),
            EmptyExecutable => Status::invalid_argument("executable"),
            EmptyJobId => Status::invalid_argument("id"),
            EmptyName => Status::invalid_argument("name"),
            Nodes(_) => Status::invalid_argument("nodes"),
        }
    }
}

/// An opaque job identifier minted once per submission.
///
/// Ids read back off the wire are taken verbatim; only `FromStr` rejects an
/// empty id.
#[derive(Clone, Debug, Display, PartialEq, Eq, Hash, Deref, From, Into)]
pub struct JobId(String);

impl JobId {
    pub fn new() -> Self {
        JobId(format!("{JOB_ID_PREFIX}{}", Uuid::new_v4()))
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for JobId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            Err(Error::EmptyJobId)
        } else {
            Ok(JobId(s.to_string()))
        }
    }
}

impl From<JobId> for api::JobId {
    fn from(id: JobId) -> Self {
        api::JobId { id: id.0 }
    }
}

/// A validated job submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JobSpec {
    pub name: String,
    pub queue: String,
    pub nodes: NonZeroU32,
    pub cpus_per_node: NonZeroU32,
    pub executable: String,
    pub args: Vec<String>,
}

impl JobSpec {
    /// Validate a submitted spec, placing it on `default_queue` when it names
    /// no queue.
    pub fn from_request(req: api::JobSpec, default_queue: &str) -> Result<Self, Error> {
        if req.name.trim().is_empty() {
            return Err(Error::EmptyName);
        }
        if req.executable.trim().is_empty() {
            return Err(Error::EmptyExecutable);
        }
        let nodes = positive(req.nodes).ok_or(Error::Nodes(req.nodes))?;
        let cpus_per_node =
            positive(req.cpus_per_node).ok_or(Error::CpusPerNode(req.cpus_per_node))?;
        let queue = if req.queue.trim().is_empty() {
            default_queue.to_string()
        } else {
            req.queue
        };

        Ok(JobSpec {
            name: req.name,
            queue,
            nodes,
            cpus_per_node,
            executable: req.executable,
            args: req.args,
        })
    }

    /// Total cpus requested across all nodes.
    pub fn total_cpus(&self) -> u64 {
        u64::from(self.nodes.get()) * u64::from(self.cpus_per_node.get())
    }
}

fn positive(value: i32) -> Option<NonZeroU32> {
    u32::try_from(value).ok().and_then(NonZeroU32::new)
}
