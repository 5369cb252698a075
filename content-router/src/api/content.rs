use crate::api::identity::resolve_identity;
use crate::api::params::parse_window;
use crate::api::utils::{HandlerBody, serialize_to_body};
use crate::content::ContentItem;
use crate::errors::{ContentRouterError, RequestError};
use crate::orchestrator::{FetchOrchestrator, Parameters};
use hyper::header::{CONTENT_TYPE, HeaderValue};
use hyper::{Method, Request, Response, StatusCode};
use shared::http::{RemoteAddr, make_error_response};
use tokio::task::JoinHandle;

/// Serves `GET /?offset=<n>&count=<n>` with an ordered JSON array of content items.
///
/// Every path on the listener is answered the same way.
pub struct ContentHandler {
    orchestrator: FetchOrchestrator,
    max_count: u64,
}

impl ContentHandler {
    pub fn new(orchestrator: FetchOrchestrator, max_count: u64) -> Self {
        Self {
            orchestrator,
            max_count,
        }
    }

    pub async fn handle<B>(&self, request: Request<B>) -> Response<HandlerBody> {
        let params = match self.parameters(&request) {
            Ok(params) => params,
            Err(e) => {
                tracing::debug!(
                    method = %request.method(),
                    uri = %request.uri(),
                    error = %e,
                    "rejected content request"
                );
                return make_error_response(e.status());
            }
        };

        match self.fetch(params).await.and_then(|items| json_response(&items)) {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, "failed to assemble content");
                make_error_response(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }

    /// Validates the transport-level input and builds the fetch window.
    fn parameters<B>(&self, request: &Request<B>) -> Result<Parameters, RequestError> {
        if request.method() != Method::GET {
            return Err(RequestError::MethodNotAllowed);
        }

        let window = parse_window(request.uri().query(), self.max_count)?;

        let remote_addr = request.extensions().get::<RemoteAddr>().map(|addr| addr.0);
        let identity = resolve_identity(request.headers(), remote_addr)?;

        Ok(Parameters {
            identity,
            offset: window.offset,
            count: window.count,
        })
    }

    /// Runs the fetch in its own task so a panic surfaces as an error instead
    /// of tearing down the connection. The task is aborted if the request is
    /// dropped before it finishes.
    async fn fetch(&self, params: Parameters) -> Result<Vec<ContentItem>, ContentRouterError> {
        let orchestrator = self.orchestrator.clone();
        let mut task = AbortOnDrop(tokio::spawn(async move {
            orchestrator.get_content_items(&params).await
        }));
        (&mut task.0)
            .await
            .map_err(|e| ContentRouterError::InternalError(format!("content task failed: {e}")))?
    }
}

/// Owns a spawned task and aborts it when dropped.
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

fn json_response(items: &[ContentItem]) -> Result<Response<HandlerBody>, ContentRouterError> {
    let mut response = Response::new(serialize_to_body(&items)?);
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Ok(response)
}
