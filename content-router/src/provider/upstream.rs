use super::ContentProvider;
use crate::content::{ContentItem, Provider};
use crate::errors::ProviderError;
use async_trait::async_trait;
use std::time::Duration;
use url::Url;

/// Fetches items from an upstream content API over HTTP.
///
/// Issues `GET <url>?ip=<identity>&count=<n>` and expects a JSON array of
/// content items. The timeout covers the whole exchange, body included.
#[derive(Clone, Debug)]
pub struct HttpProvider {
    source: Provider,
    url: Url,
    client: reqwest::Client,
}

impl HttpProvider {
    pub fn new(source: Provider, url: Url, timeout_secs: u64) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ProviderError::Fetch {
                provider: source.clone(),
                reason: format!("failed to build client: {e}"),
            })?;

        Ok(Self {
            source,
            url,
            client,
        })
    }

    fn classify(&self, error: reqwest::Error) -> ProviderError {
        if error.is_timeout() {
            ProviderError::Timeout(self.source.clone())
        } else if error.is_decode() {
            ProviderError::Decode {
                provider: self.source.clone(),
                reason: error.to_string(),
            }
        } else {
            ProviderError::Fetch {
                provider: self.source.clone(),
                reason: error.to_string(),
            }
        }
    }
}

#[async_trait]
impl ContentProvider for HttpProvider {
    async fn fetch(&self, identity: &str, count: usize) -> Result<Vec<ContentItem>, ProviderError> {
        let count_param = count.to_string();
        let response = self
            .client
            .get(self.url.clone())
            .query(&[("ip", identity), ("count", count_param.as_str())])
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Upstream {
                provider: self.source.clone(),
                status,
            });
        }

        let mut items: Vec<ContentItem> = response.json().await.map_err(|e| self.classify(e))?;
        items.truncate(count);
        // Attribution follows the capability that served the item, not the upstream's claim
        for item in &mut items {
            item.source = self.source.to_string();
        }
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::Full;
    use hyper::body::{Bytes, Incoming};
    use hyper::service::service_fn;
    use hyper::{Request, Response, StatusCode};
    use hyper_util::rt::{TokioExecutor, TokioIo};
    use std::convert::Infallible;
    use tokio::net::TcpListener;

    async fn content_handler(
        req: Request<Incoming>,
    ) -> Result<Response<Full<Bytes>>, Infallible> {
        let query = req.uri().query().unwrap_or_default().to_string();
        let response = match req.uri().path() {
            "/items" => {
                assert!(query.contains("ip=10.0.0.1"), "query was {query}");
                assert!(query.contains("count=1"), "query was {query}");
                let body = serde_json::json!([{
                    "id": "abc",
                    "title": "upstream title",
                    "source": "somebody-else",
                    "summary": "",
                    "link": "https://upstream.example/abc",
                    "expiry": "2030-01-01T00:00:00Z",
                }, {
                    "id": "extra",
                    "title": "not requested",
                    "source": "somebody-else",
                    "summary": "",
                    "link": "",
                    "expiry": "2030-01-01T00:00:00Z",
                }]);
                Response::new(Full::new(Bytes::from(body.to_string())))
            }
            "/broken" => {
                let mut response = Response::new(Full::new(Bytes::from_static(b"oops")));
                *response.status_mut() = StatusCode::BAD_GATEWAY;
                response
            }
            "/garbage" => Response::new(Full::new(Bytes::from_static(b"not json"))),
            "/slow" => {
                tokio::time::sleep(std::time::Duration::from_secs(3)).await;
                Response::new(Full::new(Bytes::from_static(b"[]")))
            }
            _ => unreachable!(),
        };
        Ok(response)
    }

    async fn start_test_server() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to address");

        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            loop {
                let (stream, _) = listener.accept().await.unwrap();
                let io = TokioIo::new(stream);

                tokio::spawn(async move {
                    let _ = hyper_util::server::conn::auto::Builder::new(TokioExecutor::new())
                        .serve_connection(io, service_fn(content_handler))
                        .await;
                });
            }
        });

        port
    }

    fn provider_for(port: u16, path: &str, timeout_secs: u64) -> HttpProvider {
        let url = Url::parse(&format!("http://127.0.0.1:{port}{path}")).unwrap();
        HttpProvider::new(Provider::from("3"), url, timeout_secs).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_overrides_source_and_truncates() {
        let port = start_test_server().await;
        let provider = provider_for(port, "/items", 5);

        let items = provider.fetch("10.0.0.1", 1).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "abc");
        assert_eq!(items[0].source, "3");
    }

    #[tokio::test]
    async fn test_fetch_non_success_status() {
        let port = start_test_server().await;
        let provider = provider_for(port, "/broken", 5);

        let err = provider.fetch("10.0.0.1", 1).await.unwrap_err();
        assert!(matches!(
            err,
            ProviderError::Upstream { status, .. } if status == StatusCode::BAD_GATEWAY
        ));
    }

    #[tokio::test]
    async fn test_fetch_undecodable_body() {
        let port = start_test_server().await;
        let provider = provider_for(port, "/garbage", 5);

        let err = provider.fetch("10.0.0.1", 1).await.unwrap_err();
        assert!(matches!(err, ProviderError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_fetch_timeout() {
        let port = start_test_server().await;
        let provider = provider_for(port, "/slow", 1);

        let err = provider.fetch("10.0.0.1", 1).await.unwrap_err();
        assert!(matches!(err, ProviderError::Timeout(_)));
    }
}
