//! The job control state machine.
//!
//! The target state of a job is derived from the action of each command alone,
//! independent of the state the job was in before. Every command produces
//! exactly one status, in the order the commands arrived.

use std::borrow::Cow;

use tracing::{debug, warn};

use crate::grpc::api;
use crate::util::SecondsUtc;

use super::JobId;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum JobState {
    #[default]
    Unspecified,
    Pending,
    Running,
}

impl From<JobState> for api::JobState {
    fn from(state: JobState) -> Self {
        match state {
            JobState::Unspecified => Self::Unspecified,
            JobState::Pending => Self::Pending,
            JobState::Running => Self::Running,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Unspecified,
    Pause,
    Resume,
    Scale { cpus: Option<u32> },
    /// An action tag this service does not know about.
    Unknown(i32),
}

impl Action {
    pub const fn target(self) -> JobState {
        match self {
            Action::Pause => JobState::Pending,
            Action::Resume | Action::Scale { .. } => JobState::Running,
            Action::Unspecified | Action::Unknown(_) => JobState::Unspecified,
        }
    }

    pub fn name(self) -> Cow<'static, str> {
        match self {
            Action::Unspecified => "UNSPECIFIED".into(),
            Action::Pause => "PAUSE".into(),
            Action::Resume => "RESUME".into(),
            Action::Scale { .. } => "SCALE".into(),
            Action::Unknown(tag) => format!("UNKNOWN({tag})").into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Command {
    pub job_id: JobId,
    pub action: Action,
}

impl From<api::Command> for Command {
    fn from(command: api::Command) -> Self {
        let action = match api::CommandAction::try_from(command.action) {
            Ok(api::CommandAction::Unspecified) => Action::Unspecified,
            Ok(api::CommandAction::Pause) => Action::Pause,
            Ok(api::CommandAction::Resume) => Action::Resume,
            Ok(api::CommandAction::Scale) => Action::Scale {
                cpus: command.scale_cpus.and_then(|cpus| {
                    u32::try_from(cpus)
                        .map_err(|_| warn!("Ignoring negative scale target: {cpus}"))
                        .ok()
                }),
            },
            Err(_) => Action::Unknown(command.action),
        };

        Command {
            job_id: command.id.into(),
            action,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JobStatus {
    pub job_id: JobId,
    pub state: JobState,
    pub message: String,
    pub timestamp: SecondsUtc,
}

impl From<JobStatus> for api::JobStatus {
    fn from(status: JobStatus) -> Self {
        api::JobStatus {
            id: status.job_id.into(),
            state: api::JobState::from(status.state) as i32,
            message: status.message,
            timestamp_unix: status.timestamp.unix(),
        }
    }
}

/// State of one control stream. Nothing outlives the stream.
#[derive(Debug, Default)]
pub struct Session {
    state: JobState,
    scale_cpus: Option<u32>,
    applied: u64,
}

impl Session {
    pub fn apply(&mut self, command: Command) -> JobStatus {
        let target = command.action.target();
        if let Action::Scale { cpus: Some(cpus) } = command.action {
            self.scale_cpus = Some(cpus);
        }

        debug!(
            job_id = %command.job_id,
            from = ?self.state,
            to = ?target,
            scale_cpus = ?self.scale_cpus,
            "Applied {}",
            command.action.name(),
        );
        self.state = target;
        self.applied += 1;

        JobStatus {
            job_id: command.job_id,
            state: target,
            message: format!("Applied {}", command.action.name()),
            timestamp: SecondsUtc::now(),
        }
    }

    pub const fn state(&self) -> JobState {
        self.state
    }

    /// The most recent scale target seen in this session.
    pub const fn scale_cpus(&self) -> Option<u32> {
        self.scale_cpus
    }

    pub const fn applied(&self) -> u64 {
        self.applied
    }
}
