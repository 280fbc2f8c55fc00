use std::time::Duration;

use tonic::Code;

use orchestrator_api::grpc::api;

use crate::setup::helper::events::EndlessEvents;
use crate::setup::TestServer;

async fn collect_events(test: &TestServer, job_id: &str) -> Vec<api::JobEvent> {
    let mut client = test.client().await;
    let request = api::JobId {
        id: job_id.to_string(),
    };
    let mut stream = client.stream_job_events(request).await.unwrap().into_inner();

    let mut events = vec![];
    while let Some(event) = stream.message().await.unwrap() {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn streams_the_full_lifecycle() {
    let test = TestServer::new().await;
    let job_id = test.submit_demo().await;

    let events = collect_events(&test, &job_id).await;

    assert_eq!(events.len(), 5);
    assert_eq!(events[0].r#type(), api::JobEventType::Started);
    assert!(events
        .iter()
        .any(|event| event.r#type() == api::JobEventType::NodeAllocated));
    assert!(events.iter().all(|event| event.id == job_id));
    assert!(events
        .windows(2)
        .all(|pair| pair[0].timestamp_unix <= pair[1].timestamp_unix));
}

#[tokio::test]
async fn every_call_restarts_the_lifecycle() {
    let test = TestServer::new().await;
    let job_id = test.submit_demo().await;

    let (first, second) = tokio::join!(
        collect_events(&test, &job_id),
        collect_events(&test, &job_id)
    );

    assert_eq!(first.len(), 5);
    assert_eq!(second.len(), 5);
    assert_eq!(first[0].detail, second[0].detail);
}

#[tokio::test]
async fn unknown_job_ids_are_accepted() {
    let test = TestServer::new().await;
    let events = collect_events(&test, "job-unknown").await;

    assert_eq!(events.len(), 5);
    assert!(events.iter().all(|event| event.id == "job-unknown"));
}

#[tokio::test]
async fn responds_invalid_argument_for_empty_job_id() {
    let test = TestServer::new().await;
    let mut client = test.client().await;

    let request = api::JobId { id: String::new() };
    let status = client.stream_job_events(request).await.unwrap_err();
    assert_eq!(status.code(), Code::InvalidArgument);
}

#[tokio::test]
async fn cancelling_the_stream_stops_event_production() {
    let events = EndlessEvents::new(Duration::from_millis(5));
    let test = TestServer::with_events(events.clone()).await;
    let mut client = test.client().await;

    let request = api::JobId {
        id: "job-endless".to_string(),
    };
    let mut stream = client.stream_job_events(request).await.unwrap().into_inner();
    for _ in 0..3 {
        let event = stream.message().await.unwrap().unwrap();
        assert_eq!(event.id, "job-endless");
    }
    drop(stream);
    drop(client);

    tokio::time::sleep(Duration::from_millis(200)).await;
    let produced = events.produced();
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(events.produced(), produced);
}

#[tokio::test]
async fn cancelling_before_the_first_event_stops_event_production() {
    let events = EndlessEvents::new(Duration::from_millis(5));
    let test = TestServer::with_events(events.clone()).await;
    let mut client = test.client().await;

    let request = api::JobId {
        id: "job-endless".to_string(),
    };
    let stream = client.stream_job_events(request).await.unwrap().into_inner();
    drop(stream);
    drop(client);

    tokio::time::sleep(Duration::from_millis(200)).await;
    let produced = events.produced();
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(events.produced(), produced);
}
