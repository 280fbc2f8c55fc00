pub mod job;

use std::sync::Arc;

use axum::routing::Router;
use derive_more::Deref;
use tonic::codec::CompressionEncoding;
use tonic::service::Routes;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::config::Context;

use self::api::job_orchestration_service_server::JobOrchestrationServiceServer;

#[allow(clippy::nursery, clippy::pedantic)]
pub mod api {
    tonic::include_proto!("orchestrator.v1");
}

#[derive(Clone, Deref)]
struct Grpc {
    pub context: Arc<Context>,
}

impl Grpc {
    const fn new(context: Arc<Context>) -> Self {
        Grpc { context }
    }
}

macro_rules! gzip_service {
    ($service:ident, $grpc:expr) => {
        $service::new($grpc)
            .accept_compressed(CompressionEncoding::Gzip)
            .send_compressed(CompressionEncoding::Gzip)
    };
}

pub fn router(context: &Arc<Context>) -> Router {
    let grpc = Grpc::new(context.clone());

    let routes = Routes::new(gzip_service!(JobOrchestrationServiceServer, grpc));

    routes
        .into_axum_router()
        .layer(TraceLayer::new_for_grpc())
        .layer(ConcurrencyLimitLayer::new(
            context.config.grpc.request_concurrency_limit,
        ))
}
