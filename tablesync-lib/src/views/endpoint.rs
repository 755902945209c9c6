//! Remote persistence of views.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;

use crate::error::ApiError;
use crate::error::Error;
use crate::remote::Transport;
use crate::remote::TransportRequest;
use crate::remote::protocol::build_url;

use super::View;

/// Persists views on behalf of the table.
///
/// Every call is best effort from the table's point of view: failures are
/// logged and the local view list is kept as it is.
#[async_trait]
pub trait ViewsEndpoint: Send + Sync {
    /// Loads the saved views.
    async fn list(&self) -> Result<Vec<View>, Error>;

    /// Saves a new view, returning the identifier assigned to it, if any.
    async fn create(&self, view: &View) -> Result<Option<String>, Error>;

    /// Renames a saved view.
    async fn rename(&self, view: &View, name: &str) -> Result<(), Error>;

    /// Replaces the filter snapshot of a saved view.
    async fn update(&self, view: &View) -> Result<(), Error>;

    /// Deletes a saved view.
    async fn delete(&self, view: &View) -> Result<(), Error>;
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ViewList {
    Bare(Vec<View>),
    Wrapped { items: Vec<View> },
}

#[derive(Deserialize)]
struct Created {
    #[serde(default)]
    id: Option<serde_json::Value>,
}

/// [`ViewsEndpoint`] over a REST resource.
///
/// | Operation | Request |
/// |---|---|
/// | list | `GET {url}` → `[View]` or `{items: [View]}` |
/// | create | `POST {url}` with `{name, filters}` → `{id}` |
/// | rename | `PATCH {url}?id=<id>&name=<name>` |
/// | update | `PUT {url}?id=<id>` with `{name, filters}` |
/// | delete | `DELETE {url}?id=<id>` |
///
/// Views without an id are matched by name in rename/update/delete.
pub struct HttpViewsEndpoint {
    url: String,
    transport: Arc<dyn Transport>,
}

impl HttpViewsEndpoint {
    /// Creates an endpoint for the given resource URL.
    pub fn new(url: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            url: url.into(),
            transport,
        }
    }

    /// Returns the resource URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    fn key_pairs(view: &View) -> Vec<(String, String)> {
        match &view.id {
            Some(id) => vec![("id".to_string(), id.clone())],
            None => vec![("name".to_string(), view.name.clone())],
        }
    }

    fn body(view: &View) -> serde_json::Value {
        serde_json::json!({
            "name": view.name,
            "filters": view.filters,
        })
    }

    async fn send(&self, request: TransportRequest) -> Result<String, Error> {
        let response = self.transport.send(request).await?.error_for_status()?;
        Ok(response.body)
    }
}

#[async_trait]
impl ViewsEndpoint for HttpViewsEndpoint {
    async fn list(&self) -> Result<Vec<View>, Error> {
        let body = self.send(TransportRequest::get(&self.url)).await?;
        let list: ViewList = serde_json::from_str(&body)
            .map_err(|e| ApiError::parse_with_body(e.to_string(), body.clone()))?;
        Ok(match list {
            ViewList::Bare(views) | ViewList::Wrapped { items: views } => views,
        })
    }

    async fn create(&self, view: &View) -> Result<Option<String>, Error> {
        let request = TransportRequest::new(Method::POST, &self.url).with_body(Self::body(view));
        let body = self.send(request).await?;
        let created: Created = match serde_json::from_str(&body) {
            Ok(created) => created,
            Err(_) => return Ok(None),
        };
        Ok(created.id.and_then(|id| match id {
            serde_json::Value::String(s) => Some(s),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        }))
    }

    async fn rename(&self, view: &View, name: &str) -> Result<(), Error> {
        let mut pairs = Self::key_pairs(view);
        pairs.push(("name".to_string(), name.to_string()));
        if view.id.is_none() {
            // Keyed by the old name; the new one goes in `newName`.
            pairs[1].0 = "newName".to_string();
        }
        let request = TransportRequest::new(Method::PATCH, build_url(&self.url, &pairs));
        self.send(request).await?;
        Ok(())
    }

    async fn update(&self, view: &View) -> Result<(), Error> {
        let request = TransportRequest::new(Method::PUT, build_url(&self.url, &Self::key_pairs(view)))
            .with_body(Self::body(view));
        self.send(request).await?;
        Ok(())
    }

    async fn delete(&self, view: &View) -> Result<(), Error> {
        let request = TransportRequest::new(Method::DELETE, build_url(&self.url, &Self::key_pairs(view)));
        self.send(request).await?;
        Ok(())
    }
}
