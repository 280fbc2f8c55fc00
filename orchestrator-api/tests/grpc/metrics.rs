use std::time::Duration;

use futures::{stream, StreamExt};

use orchestrator_api::grpc::api;

use crate::setup::helper::rpc;
use crate::setup::{Client, TestServer};

async fn upload(mut client: Client, samples: Vec<api::JobMetrics>) -> api::MetricsSummary {
    let samples = stream::iter(samples).then(|sample| async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        sample
    });
    client.upload_job_metrics(samples).await.unwrap().into_inner()
}

#[tokio::test]
async fn responds_ok_with_averages() {
    let test = TestServer::new().await;
    let mut client = test.client().await;

    let samples = vec![
        rpc::metrics("job-X", 30.0, 512.0),
        rpc::metrics("job-X", 35.0, 528.0),
    ];
    let summary = client
        .upload_job_metrics(stream::iter(samples))
        .await
        .unwrap()
        .into_inner();

    assert_eq!(summary.id, "job-X");
    assert_eq!(summary.avg_cpu_usage_percent, 32.5);
    assert_eq!(summary.avg_memory_usage_mb, 520.0);
}

#[tokio::test]
async fn responds_ok_for_the_demo_samples() {
    let test = TestServer::new().await;
    let mut client = test.client().await;
    let job_id = test.submit_demo().await;

    let samples: Vec<_> = (0..5)
        .map(|i| rpc::metrics(&job_id, 30.0 + 5.0 * f64::from(i), 512.0 + 16.0 * f64::from(i)))
        .collect();
    let summary = client
        .upload_job_metrics(stream::iter(samples))
        .await
        .unwrap()
        .into_inner();

    assert_eq!(summary.id, job_id);
    assert_eq!(summary.avg_cpu_usage_percent, 40.0);
    assert_eq!(summary.avg_memory_usage_mb, 544.0);
}

#[tokio::test]
async fn responds_ok_with_zeros_for_no_samples() {
    let test = TestServer::new().await;
    let mut client = test.client().await;

    let summary = client
        .upload_job_metrics(stream::iter(Vec::<api::JobMetrics>::new()))
        .await
        .unwrap()
        .into_inner();

    assert_eq!(summary.id, "");
    assert_eq!(summary.avg_cpu_usage_percent, 0.0);
    assert_eq!(summary.avg_memory_usage_mb, 0.0);
}

#[tokio::test]
async fn mixed_job_ids_are_averaged_together() {
    let test = TestServer::new().await;
    let mut client = test.client().await;

    let samples = vec![
        rpc::metrics("job-A", 10.0, 100.0),
        rpc::metrics("job-B", 20.0, 300.0),
    ];
    let summary = client
        .upload_job_metrics(stream::iter(samples))
        .await
        .unwrap()
        .into_inner();

    assert_eq!(summary.id, "job-B");
    assert_eq!(summary.avg_cpu_usage_percent, 15.0);
    assert_eq!(summary.avg_memory_usage_mb, 200.0);
}

#[tokio::test]
async fn concurrent_uploads_on_one_job_stay_independent() {
    let test = TestServer::new().await;
    let client = test.client().await;
    let job_id = test.submit_demo().await;

    let low = vec![
        rpc::metrics(&job_id, 10.0, 100.0),
        rpc::metrics(&job_id, 20.0, 200.0),
    ];
    let high = vec![
        rpc::metrics(&job_id, 80.0, 900.0),
        rpc::metrics(&job_id, 90.0, 1000.0),
        rpc::metrics(&job_id, 100.0, 1100.0),
    ];

    let (low, high) = tokio::join!(upload(client.clone(), low), upload(client, high));

    assert_eq!(low.avg_cpu_usage_percent, 15.0);
    assert_eq!(low.avg_memory_usage_mb, 150.0);
    assert_eq!(high.avg_cpu_usage_percent, 90.0);
    assert_eq!(high.avg_memory_usage_mb, 1000.0);
}
