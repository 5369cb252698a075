pub mod api;
pub mod assembler;
pub mod config;
pub mod content;
pub mod errors;
pub mod metrics_defs;
pub mod mix;
pub mod orchestrator;
pub mod provider;

#[cfg(test)]
mod testutils;

use api::content::ContentHandler;
use api::utils::HandlerBody;
use errors::ContentRouterError;
use hyper::service::Service;
use hyper::{Request, Response, StatusCode};
use orchestrator::FetchOrchestrator;
use provider::ProviderRegistry;
use shared::admin_service::AdminService;
use shared::http::run_http_service;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

pub use content::{ContentItem, Provider};
pub use orchestrator::Parameters;

pub async fn run(config: config::Config) -> Result<(), ContentRouterError> {
    shared::metrics_defs::describe_all(metrics_defs::ALL_METRICS);

    let router_service = ContentRouterService::from_config(&config)?;
    let router_task = run_http_service(&config.listener.host, config.listener.port, router_service);

    let admin_service = AdminService::<_, ContentRouterError>::new(|| true);
    let admin_task = run_http_service(
        &config.admin_listener.host,
        config.admin_listener.port,
        admin_service,
    );

    tokio::try_join!(router_task, admin_task)?;
    Ok(())
}

/// Hyper service answering content requests on the main listener.
#[derive(Clone)]
pub struct ContentRouterService {
    handler: Arc<ContentHandler>,
}

impl ContentRouterService {
    pub fn new(handler: ContentHandler) -> Self {
        Self {
            handler: Arc::new(handler),
        }
    }

    pub fn from_config(config: &config::Config) -> Result<Self, ContentRouterError> {
        let registry = ProviderRegistry::from_config(&config.providers)?;
        tracing::info!(
            providers = ?registry,
            slots = config.content_mix.len(),
            "content router configured"
        );

        let orchestrator = FetchOrchestrator::new(registry, config.content_mix())
            .with_cancel_superseded(config.cancel_superseded_fetches);
        Ok(Self::new(ContentHandler::new(orchestrator, config.max_count)))
    }
}

impl<B> Service<Request<B>> for ContentRouterService
where
    B: Send + 'static,
{
    type Response = Response<HandlerBody>;
    type Error = ContentRouterError;
    type Future =
        Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn call(&self, req: Request<B>) -> Self::Future {
        let handler = self.handler.clone();

        Box::pin(async move {
            let inflight = InflightRequest::start();
            let response = handler.handle(req).await;
            inflight.finish(response.status());
            Ok(response)
        })
    }
}

/// Counts a request as in flight until dropped, including when the
/// connection goes away before a response is produced.
struct InflightRequest {
    started: Instant,
}

impl InflightRequest {
    fn start() -> Self {
        shared::gauge!(metrics_defs::REQUESTS_INFLIGHT).increment(1.0);
        Self {
            started: Instant::now(),
        }
    }

    fn finish(self, status: StatusCode) {
        shared::histogram!(
            metrics_defs::REQUEST_DURATION,
            "status" => status.as_str().to_owned()
        )
        .record(self.started.elapsed().as_secs_f64());
    }
}

impl Drop for InflightRequest {
    fn drop(&mut self) {
        shared::gauge!(metrics_defs::REQUESTS_INFLIGHT).decrement(1.0);
    }
}
