//! Cancellable remote fetches keyed by endpoint.

use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use dashmap::DashMap;
use log::debug;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use crate::error::ApiError;
use crate::error::Error;
use crate::query::Page;
use crate::query::QueryState;

use super::RemoteSource;
use super::Transport;
use super::TransportRequest;

struct InFlight {
    id: u64,
    token: CancellationToken,
}

/// Executes table queries against remote endpoints.
///
/// At most one request per endpoint is in flight: starting a fetch cancels
/// the previous one for the same endpoint, so a slow stale response can never
/// overwrite a newer one. The in-flight map belongs to this executor, so two
/// tables with separate executors never cancel each other.
///
/// # Example
///
/// ```ignore
/// let executor = RemoteExecutor::new(Arc::new(ReqwestTransport::new()));
/// let source = RemoteSource::new("https://api.test/orders");
///
/// match executor.fetch::<Order>(&source, &state, Some("name")).await? {
///     Some(page) => println!("{} of {}", page.len(), page.total()),
///     None => println!("superseded by a newer request"),
/// }
/// ```
pub struct RemoteExecutor {
    transport: Arc<dyn Transport>,
    in_flight: DashMap<String, InFlight>,
    next_id: AtomicU64,
}

impl RemoteExecutor {
    /// Creates an executor that sends requests through the given transport.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            in_flight: DashMap::new(),
            next_id: AtomicU64::new(0),
        }
    }

    /// Fetches one page for the given state.
    ///
    /// Returns `Ok(None)` if the request was superseded or cancelled before it
    /// completed. Non-2xx statuses, transport failures and malformed bodies
    /// are errors.
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        source: &RemoteSource,
        state: &QueryState,
        query_field: Option<&str>,
    ) -> Result<Option<Page<T>>, Error> {
        let (query, url) = source.request_for(state, query_field)?;
        let endpoint = source.endpoint();

        let mut request = TransportRequest::get(&url);
        for (name, value) in source.headers() {
            request = request.with_header(name.as_str(), value.as_str());
        }

        let (id, token) = self.begin(endpoint);
        debug!("Fetching {} (request {})", url, id);

        let result = tokio::select! {
            biased;
            _ = token.cancelled() => None,
            response = self.transport.send(request) => Some(response),
        };
        self.finish(endpoint, id);

        let response = match result {
            Some(response) if !token.is_cancelled() => response?,
            _ => {
                debug!("Request {} to {} was superseded", id, endpoint);
                return Ok(None);
            }
        };

        let response = response.error_for_status()?;
        let body: serde_json::Value = response.json()?;
        let raw = source.parse_page(body, &query)?;

        let items = raw
            .items
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<T>, _>>()
            .map_err(|e| ApiError::parse(format!("invalid item: {}", e)))?;

        Ok(Some(Page::new(items, raw.total)))
    }

    /// Cancels the in-flight request for an endpoint, if any.
    pub fn cancel(&self, endpoint: &str) {
        if let Some((_, in_flight)) = self.in_flight.remove(endpoint) {
            debug!("Cancelling request {} to {}", in_flight.id, endpoint);
            in_flight.token.cancel();
        }
    }

    /// Cancels every in-flight request.
    pub fn cancel_all(&self) {
        for entry in self.in_flight.iter() {
            entry.value().token.cancel();
        }
        self.in_flight.clear();
    }

    /// Returns `true` if a request to the endpoint is in flight.
    pub fn is_in_flight(&self, endpoint: &str) -> bool {
        self.in_flight.contains_key(endpoint)
    }

    fn begin(&self, endpoint: &str) -> (u64, CancellationToken) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();
        let previous = self.in_flight.insert(
            endpoint.to_string(),
            InFlight {
                id,
                token: token.clone(),
            },
        );
        if let Some(previous) = previous {
            debug!("Request {} supersedes request {}", id, previous.id);
            previous.token.cancel();
        }
        (id, token)
    }

    fn finish(&self, endpoint: &str, id: u64) {
        self.in_flight.remove_if(endpoint, |_, in_flight| in_flight.id == id);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use parking_lot::Mutex;

    use super::*;
    use crate::remote::TransportResponse;

    /// Responds after a delay chosen from the URL.
    struct SlowFirstTransport {
        sent: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Transport for SlowFirstTransport {
        async fn send(&self, request: TransportRequest) -> Result<TransportResponse, ApiError> {
            self.sent.lock().push(request.url.clone());
            if request.url.contains("slow") {
                tokio::time::sleep(Duration::from_millis(200)).await;
                Ok(TransportResponse::ok(r#"{"items": [{"name": "stale"}], "total": 1}"#))
            } else if request.url.contains("broken") {
                Ok(TransportResponse::new(500, "boom"))
            } else if request.url.contains("offline") {
                Err(ApiError::transport("connection reset"))
            } else if request.url.contains("garbage") {
                Ok(TransportResponse::ok("<html>"))
            } else {
                tokio::time::sleep(Duration::from_millis(10)).await;
                Ok(TransportResponse::ok(r#"{"items": [{"name": "fresh"}], "total": 1}"#))
            }
        }
    }

    fn executor() -> RemoteExecutor {
        RemoteExecutor::new(Arc::new(SlowFirstTransport {
            sent: Mutex::new(Vec::new()),
        }))
    }

    fn state(query: &str) -> QueryState {
        QueryState {
            query_value: query.to_string(),
            ..QueryState::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_newer_request_cancels_older() {
        let executor = executor();
        let source = RemoteSource::new("https://api.test/items");

        let slow = state("slow");
        let (first, second) = tokio::join!(
            executor.fetch::<serde_json::Value>(&source, &slow, Some("name")),
            async {
                tokio::time::sleep(Duration::from_millis(1)).await;
                executor
                    .fetch::<serde_json::Value>(&source, &state("quick"), Some("name"))
                    .await
            }
        );

        assert!(first.unwrap().is_none());
        let page = second.unwrap().unwrap();
        assert_eq!(page.items()[0]["name"], "fresh");
        assert!(!executor.is_in_flight("https://api.test/items"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_different_endpoints_do_not_cancel() {
        let executor = executor();
        let orders = RemoteSource::new("https://api.test/orders");
        let users = RemoteSource::new("https://api.test/users");

        let slow = state("slow");
        let quick = state("quick");
        let (first, second) = tokio::join!(
            executor.fetch::<serde_json::Value>(&orders, &slow, Some("name")),
            executor.fetch::<serde_json::Value>(&users, &quick, Some("name")),
        );

        assert!(first.unwrap().is_some());
        assert!(second.unwrap().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_explicit_cancel() {
        let executor = executor();
        let source = RemoteSource::new("https://api.test/items");

        let slow = state("slow");
        let (result, _) = tokio::join!(
            executor.fetch::<serde_json::Value>(&source, &slow, Some("name")),
            async {
                tokio::time::sleep(Duration::from_millis(5)).await;
                executor.cancel("https://api.test/items");
            }
        );

        assert!(result.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_http_error() {
        let executor = executor();
        let source = RemoteSource::new("https://api.test/items");
        let err = executor
            .fetch::<serde_json::Value>(&source, &state("broken"), Some("name"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Api(ApiError::Http { status: 500, .. })));
    }

    #[tokio::test]
    async fn test_transport_failure_is_an_error() {
        let executor = executor();
        let source = RemoteSource::new("https://api.test/items");
        let err = executor
            .fetch::<serde_json::Value>(&source, &state("offline"), Some("name"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Api(ApiError::Transport(_))));
        assert!(!executor.is_in_flight("https://api.test/items"));
    }

    #[tokio::test]
    async fn test_relative_endpoint_is_rejected() {
        let transport = Arc::new(SlowFirstTransport {
            sent: Mutex::new(Vec::new()),
        });
        let executor = RemoteExecutor::new(transport.clone());
        let source = RemoteSource::new("orders");
        let err = executor
            .fetch::<serde_json::Value>(&source, &state("quick"), Some("name"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Api(ApiError::InvalidUrl(_))));
        assert!(transport.sent.lock().is_empty());
        assert!(!executor.is_in_flight("orders"));
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let executor = executor();
        let source = RemoteSource::new("https://api.test/items");
        let err = executor
            .fetch::<serde_json::Value>(&source, &state("garbage"), Some("name"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Api(ApiError::Parse { .. })));
    }

    #[tokio::test]
    async fn test_transform_overrides_protocol() {
        let executor = executor();
        let source = RemoteSource::new("https://api.test/items").transform(|body| {
            Ok(crate::remote::RawPage {
                items: body["items"].as_array().cloned().unwrap_or_default(),
                total: 99,
            })
        });
        let page = executor
            .fetch::<serde_json::Value>(&source, &state("quick"), Some("name"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(page.total(), 99);
    }
}
