use orchestrator_api::grpc::api;

pub fn demo_spec() -> api::JobSpec {
    api::JobSpec {
        name: "demo".to_string(),
        queue: String::new(),
        nodes: 1,
        cpus_per_node: 2,
        executable: "/bin/echo".to_string(),
        args: vec!["hello".to_string()],
    }
}

pub fn metrics(job_id: &str, cpu: f64, memory: f64) -> api::JobMetrics {
    api::JobMetrics {
        id: job_id.to_string(),
        cpu_usage_percent: cpu,
        memory_usage_mb: memory,
        timestamp_unix: 0,
    }
}

pub fn command(job_id: &str, action: api::CommandAction) -> api::Command {
    api::Command {
        id: job_id.to_string(),
        action: action as i32,
        scale_cpus: None,
    }
}

pub fn scale(job_id: &str, cpus: i32) -> api::Command {
    api::Command {
        scale_cpus: Some(cpus),
        ..command(job_id, api::CommandAction::Scale)
    }
}
