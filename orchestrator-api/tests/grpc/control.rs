use std::time::Duration;

use futures::{stream, StreamExt};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use orchestrator_api::grpc::api;

use crate::setup::helper::rpc;
use crate::setup::{Client, TestServer};

async fn run_session(mut client: Client, commands: Vec<api::Command>) -> Vec<api::JobState> {
    let commands = stream::iter(commands).then(|command| async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        command
    });
    let mut statuses = client.job_control(commands).await.unwrap().into_inner();

    let mut states = vec![];
    while let Some(status) = statuses.message().await.unwrap() {
        states.push(status.state());
    }
    states
}

#[tokio::test]
async fn responds_with_one_status_per_command() {
    let test = TestServer::new().await;
    let mut client = test.client().await;
    let job_id = test.submit_demo().await;

    let commands = vec![
        rpc::command(&job_id, api::CommandAction::Pause),
        rpc::command(&job_id, api::CommandAction::Resume),
        rpc::scale(&job_id, 8),
    ];
    let mut statuses = client
        .job_control(stream::iter(commands))
        .await
        .unwrap()
        .into_inner();

    let mut received = vec![];
    while let Some(status) = statuses.message().await.unwrap() {
        received.push(status);
    }

    let states: Vec<_> = received.iter().map(api::JobStatus::state).collect();
    assert_eq!(
        states,
        [
            api::JobState::Pending,
            api::JobState::Running,
            api::JobState::Running
        ]
    );
    let messages: Vec<_> = received.iter().map(|status| status.message.as_str()).collect();
    assert_eq!(messages, ["Applied PAUSE", "Applied RESUME", "Applied SCALE"]);
    assert!(received.iter().all(|status| status.id == job_id));
}

#[tokio::test]
async fn unknown_actions_are_reported() {
    let test = TestServer::new().await;
    let mut client = test.client().await;

    let command = api::Command {
        id: "job-X".to_string(),
        action: 42,
        scale_cpus: None,
    };
    let mut statuses = client
        .job_control(stream::iter(vec![command]))
        .await
        .unwrap()
        .into_inner();

    let status = statuses.message().await.unwrap().unwrap();
    assert_eq!(status.state(), api::JobState::Unspecified);
    assert_eq!(status.message, "Applied UNKNOWN(42)");
    assert!(statuses.message().await.unwrap().is_none());
}

#[tokio::test]
async fn statuses_arrive_before_the_client_finishes() {
    let test = TestServer::new().await;
    let mut client = test.client().await;

    let (tx, rx) = mpsc::channel(4);
    let mut statuses = client
        .job_control(ReceiverStream::new(rx))
        .await
        .unwrap()
        .into_inner();

    tx.send(rpc::command("job-X", api::CommandAction::Pause))
        .await
        .unwrap();
    let status = statuses.message().await.unwrap().unwrap();
    assert_eq!(status.message, "Applied PAUSE");

    tx.send(rpc::command("job-X", api::CommandAction::Resume))
        .await
        .unwrap();
    let status = statuses.message().await.unwrap().unwrap();
    assert_eq!(status.state(), api::JobState::Running);

    drop(tx);
    assert!(statuses.message().await.unwrap().is_none());
}

#[tokio::test]
async fn responds_with_no_statuses_for_no_commands() {
    let test = TestServer::new().await;
    let mut client = test.client().await;

    let mut statuses = client
        .job_control(stream::iter(Vec::<api::Command>::new()))
        .await
        .unwrap()
        .into_inner();

    assert!(statuses.message().await.unwrap().is_none());
}

#[tokio::test]
async fn concurrent_sessions_on_one_job_stay_independent() {
    let test = TestServer::new().await;
    let client = test.client().await;
    let job_id = test.submit_demo().await;

    let pausing = vec![
        rpc::command(&job_id, api::CommandAction::Pause),
        rpc::command(&job_id, api::CommandAction::Pause),
    ];
    let resuming = vec![
        rpc::command(&job_id, api::CommandAction::Resume),
        rpc::scale(&job_id, 4),
    ];

    let (first, second) = tokio::join!(
        run_session(client.clone(), pausing),
        run_session(client, resuming)
    );

    assert_eq!(first, [api::JobState::Pending, api::JobState::Pending]);
    assert_eq!(second, [api::JobState::Running, api::JobState::Running]);
}
