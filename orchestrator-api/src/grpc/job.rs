//! The job orchestration service.
//!
//! Submission is a plain request/response. Event streaming and job control
//! spawn a task per call that feeds a bounded channel, so a client hanging up
//! is noticed at the task's next suspension point and the task ends. Metrics
//! uploads are drained in the request future itself and only summarized once
//! the client half-closes.

use std::pin::Pin;

use displaydoc::Display;
use futures::stream::BoxStream;
use futures::{Stream, StreamExt};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tonic::{Request, Response, Status, Streaming};
use tracing::{debug, info, warn};

use crate::model::{Aggregate, Command, JobEvent, JobId, JobSpec, Session};

use super::api::job_orchestration_service_server::JobOrchestrationService;
use super::{api, Grpc};

type ResponseStream<T> = Pin<Box<dyn Stream<Item = Result<T, Status>> + Send + 'static>>;
type Sender<T> = mpsc::Sender<Result<T, Status>>;

#[derive(Debug, Display, Error)]
pub enum Error {
    /// Job error: {0}
    Job(#[from] crate::model::job::Error),
    /// Metrics upload interrupted: {0}
    Upload(Status),
}

impl From<Error> for Status {
    fn from(err: Error) -> Self {
        use Error::*;
        match err {
            Job(err) => err.into(),
            Upload(status) => {
                warn!("Metrics upload interrupted, discarding aggregate: {status}");
                status
            }
        }
    }
}

#[tonic::async_trait]
impl JobOrchestrationService for Grpc {
    type StreamJobEventsStream = ResponseStream<api::JobEvent>;
    type JobControlStream = ResponseStream<api::JobStatus>;

    async fn submit_job(
        &self,
        req: Request<api::JobSpec>,
    ) -> Result<Response<api::JobId>, Status> {
        let job_id = submit_job(req.into_inner(), &self.config.job.default_queue)?;
        Ok(Response::new(job_id))
    }

    async fn stream_job_events(
        &self,
        req: Request<api::JobId>,
    ) -> Result<Response<Self::StreamJobEventsStream>, Status> {
        let job_id: JobId = req.into_inner().id.parse().map_err(Error::Job)?;
        info!(%job_id, "Streaming job events");

        let events = self.events.stream(job_id.clone());
        let (tx, rx) = mpsc::channel(self.config.grpc.stream_buffer);
        tokio::spawn(forward_events(job_id, events, tx));

        Ok(Response::new(Box::pin(ReceiverStream::new(rx))))
    }

    async fn upload_job_metrics(
        &self,
        req: Request<Streaming<api::JobMetrics>>,
    ) -> Result<Response<api::MetricsSummary>, Status> {
        let summary = upload_job_metrics(req.into_inner()).await?;
        Ok(Response::new(summary))
    }

    async fn job_control(
        &self,
        req: Request<Streaming<api::Command>>,
    ) -> Result<Response<Self::JobControlStream>, Status> {
        let (tx, rx) = mpsc::channel(self.config.grpc.stream_buffer);
        tokio::spawn(control_session(req.into_inner(), tx));

        Ok(Response::new(Box::pin(ReceiverStream::new(rx))))
    }
}

fn submit_job(req: api::JobSpec, default_queue: &str) -> Result<api::JobId, Error> {
    let spec = JobSpec::from_request(req, default_queue)?;
    let job_id = JobId::new();

    info!(
        %job_id,
        name = %spec.name,
        queue = %spec.queue,
        nodes = spec.nodes.get(),
        cpus_per_node = spec.cpus_per_node.get(),
        total_cpus = spec.total_cpus(),
        executable = %spec.executable,
        "Submitted job",
    );

    Ok(job_id.into())
}

async fn forward_events(
    job_id: JobId,
    mut events: BoxStream<'static, JobEvent>,
    tx: Sender<api::JobEvent>,
) {
    let mut sent = 0_usize;

    loop {
        let next = tokio::select! {
            biased;
            () = tx.closed() => break,
            next = events.next() => next,
        };

        let Some(event) = next else {
            info!(%job_id, sent, "Job event stream complete");
            return;
        };
        if tx.send(Ok(event.into())).await.is_err() {
            break;
        }
        sent += 1;
    }

    info!(%job_id, sent, "Job event stream cancelled by client");
}

async fn upload_job_metrics<S>(mut samples: S) -> Result<api::MetricsSummary, Error>
where
    S: Stream<Item = Result<api::JobMetrics, Status>> + Unpin,
{
    let mut aggregate = Aggregate::default();

    while let Some(sample) = samples.next().await.transpose().map_err(Error::Upload)? {
        debug!(
            job_id = %sample.id,
            cpu = sample.cpu_usage_percent,
            memory = sample.memory_usage_mb,
            "Received metrics sample",
        );
        aggregate.record(sample);
    }

    info!(count = aggregate.count(), "Metrics upload complete");
    Ok(aggregate.summarize().into())
}

async fn control_session<S>(mut commands: S, tx: Sender<api::JobStatus>)
where
    S: Stream<Item = Result<api::Command, Status>> + Send + Unpin + 'static,
{
    let mut session = Session::default();

    loop {
        let next = tokio::select! {
            biased;
            () = tx.closed() => break,
            next = commands.next() => next,
        };

        let status = match next {
            Some(Ok(command)) => session.apply(Command::from(command)).into(),
            Some(Err(status)) => {
                warn!("Job control stream failed: {status}");
                // the client may already be gone
                tx.send(Err(status)).await.ok();
                break;
            }
            None => break,
        };
        if tx.send(Ok(status)).await.is_err() {
            break;
        }
    }

    info!(
        applied = session.applied(),
        state = ?session.state(),
        scale_cpus = ?session.scale_cpus(),
        "Job control session ended",
    );
}
