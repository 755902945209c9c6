//! Remote data source configuration.

use std::fmt;
use std::sync::Arc;

use url::Url;

use crate::error::ApiError;
use crate::query::QueryState;

use super::QueryProtocol;
use super::RawPage;
use super::RemoteQuery;
use super::protocol::CrudProtocol;
use super::protocol::build_url;

/// Caller-supplied conversion from a response body to a [`RawPage`].
///
/// Overrides the protocol's response parsing when set.
pub type ResponseTransform =
    Arc<dyn Fn(serde_json::Value) -> Result<RawPage, ApiError> + Send + Sync>;

/// Where and how a remote table fetches its rows.
///
/// # Example
///
/// ```
/// use tablesync_lib::remote::ODataProtocol;
/// use tablesync_lib::remote::RemoteSource;
///
/// let source = RemoteSource::new("https://api.test/orders")
///     .protocol(ODataProtocol)
///     .header("Authorization", "Bearer token");
/// assert_eq!(source.endpoint(), "https://api.test/orders");
/// ```
#[derive(Clone)]
pub struct RemoteSource {
    endpoint: String,
    protocol: Arc<dyn QueryProtocol>,
    transform: Option<ResponseTransform>,
    headers: Vec<(String, String)>,
}

impl RemoteSource {
    /// Creates a source for an endpoint using [`CrudProtocol`].
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            protocol: Arc::new(CrudProtocol),
            transform: None,
            headers: Vec::new(),
        }
    }

    /// Sets the query-string convention.
    pub fn protocol(mut self, protocol: impl QueryProtocol + 'static) -> Self {
        self.protocol = Arc::new(protocol);
        self
    }

    /// Sets a custom response transform.
    pub fn transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(serde_json::Value) -> Result<RawPage, ApiError> + Send + Sync + 'static,
    {
        self.transform = Some(Arc::new(transform));
        self
    }

    /// Adds a header sent with every data request.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Returns the endpoint URL; also the key for request cancellation.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Returns the extra request headers.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Builds the outbound URL for a query.
    pub fn url_for(&self, query: &RemoteQuery) -> String {
        build_url(&self.endpoint, &self.protocol.query_pairs(query))
    }

    /// Builds the remote query and URL for a table state.
    ///
    /// Fails with [`ApiError::InvalidUrl`] if the endpoint is not an absolute
    /// URL.
    pub fn request_for(
        &self,
        state: &QueryState,
        query_field: Option<&str>,
    ) -> Result<(RemoteQuery, String), ApiError> {
        let query = RemoteQuery::from_state(state, query_field);
        let url = self.url_for(&query);
        Url::parse(&url).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", self.endpoint, e)))?;
        Ok((query, url))
    }

    /// Reads a page out of a response body.
    pub fn parse_page(&self, body: serde_json::Value, query: &RemoteQuery) -> Result<RawPage, ApiError> {
        match &self.transform {
            Some(transform) => transform(body),
            None => self.protocol.parse_page(body, query),
        }
    }
}

impl fmt::Debug for RemoteSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteSource")
            .field("endpoint", &self.endpoint)
            .field("transform", &self.transform.is_some())
            .field("headers", &self.headers.len())
            .finish()
    }
}
