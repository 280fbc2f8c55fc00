//! Walk a running orchestrator through one job: submit it, watch its events,
//! upload metrics and steer it with control commands.

use std::time::Duration;

use anyhow::{Context, Result};
use argh::FromArgs;
use futures::{stream, StreamExt};
use tonic::transport::Channel;

use orchestrator_api::config::Config;
use orchestrator_api::grpc::api;
use orchestrator_api::grpc::api::job_orchestration_service_client::JobOrchestrationServiceClient;
use orchestrator_api::util::SecondsUtc;

type Client = JobOrchestrationServiceClient<Channel>;

/// Exercise every job orchestration call against a running server.
#[derive(FromArgs)]
struct Args {
    /// server endpoint, defaults to the configured gRPC address
    #[argh(option)]
    endpoint: Option<String>,

    /// number of metric samples to upload
    #[argh(option, default = "5")]
    samples: u32,

    /// pause between uploaded samples and commands, in milliseconds
    #[argh(option, default = "200")]
    interval_ms: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Args = argh::from_env();
    let interval = Duration::from_millis(args.interval_ms);

    let endpoint = match args.endpoint {
        Some(endpoint) => endpoint,
        None => Config::new()?.grpc.endpoint(),
    };

    let mut client = Client::connect(endpoint.clone())
        .await
        .with_context(|| format!("failed to connect to {endpoint}"))?;

    let job_id = submit(&mut client).await?;
    stream_events(&mut client, &job_id).await?;
    upload_metrics(&mut client, &job_id, args.samples, interval).await?;
    control(&mut client, &job_id, interval).await?;

    Ok(())
}

async fn submit(client: &mut Client) -> Result<String> {
    let spec = api::JobSpec {
        name: "demo".into(),
        queue: "default".into(),
        nodes: 1,
        cpus_per_node: 2,
        executable: "/bin/echo".into(),
        args: vec!["hello".into()],
    };

    let job_id = client.submit_job(spec).await?.into_inner().id;
    println!("SubmitJob -> {job_id}");
    Ok(job_id)
}

async fn stream_events(client: &mut Client, job_id: &str) -> Result<()> {
    let req = api::JobId { id: job_id.into() };
    let mut events = client.stream_job_events(req).await?.into_inner();

    println!("StreamJobEvents:");
    while let Some(event) = events.message().await? {
        let at = SecondsUtc::new(event.timestamp_unix)?;
        println!("  [{}] {} {}", *at, event.r#type().as_str_name(), event.detail);
    }
    Ok(())
}

async fn upload_metrics(
    client: &mut Client,
    job_id: &str,
    samples: u32,
    interval: Duration,
) -> Result<()> {
    let start = SecondsUtc::now().unix();
    let job_id = job_id.to_string();
    let metrics = stream::iter(0..samples).then(move |i| {
        let id = job_id.clone();
        async move {
            tokio::time::sleep(interval).await;
            api::JobMetrics {
                id,
                cpu_usage_percent: 30.0 + f64::from(i) * 5.0,
                memory_usage_mb: 512.0 + f64::from(i) * 16.0,
                timestamp_unix: start + i64::from(i),
            }
        }
    });

    let summary = client.upload_job_metrics(metrics).await?.into_inner();
    println!(
        "UploadJobMetrics -> avg_cpu={:.1} avg_mem={:.1}",
        summary.avg_cpu_usage_percent, summary.avg_memory_usage_mb
    );
    Ok(())
}

async fn control(client: &mut Client, job_id: &str, interval: Duration) -> Result<()> {
    let command = |action: api::CommandAction, scale_cpus| api::Command {
        id: job_id.into(),
        action: action as i32,
        scale_cpus,
    };
    let commands = [
        command(api::CommandAction::Pause, None),
        command(api::CommandAction::Resume, None),
        command(api::CommandAction::Scale, Some(8)),
    ];
    let commands = stream::iter(commands).then(move |cmd| async move {
        tokio::time::sleep(interval).await;
        cmd
    });

    let mut statuses = client.job_control(commands).await?.into_inner();

    println!("JobControl:");
    while let Some(status) = statuses.message().await? {
        println!("  status: {} {}", status.state().as_str_name(), status.message);
    }
    Ok(())
}
