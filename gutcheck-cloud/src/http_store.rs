//! HTTP client for the document store API.
//!
//! One collection per entity type:
//!
//! | operation  | request                                              |
//! |------------|------------------------------------------------------|
//! | set_merge  | `PATCH  {base}/v1/collections/{c}/documents/{id}`    |
//! | get        | `GET    {base}/v1/collections/{c}/documents/{id}`    |
//! | delete     | `DELETE {base}/v1/collections/{c}/documents/{id}`    |
//! | query      | `POST   {base}/v1/collections/{c}:query`             |
//!
//! Every request carries the session's bearer token.

use crate::config::CloudConfig;
use crate::document_store::DocumentStore;
use crate::error::{CloudError, CloudResult};
use crate::session::Session;
use crate::types::{ErrorBody, QueryResponse, RemoteQuery, RemoteRecord};
use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode, Url};
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::debug;

pub struct HttpDocumentStore {
    client: Client,
    base_url: Url,
    session: Session,
}

impl HttpDocumentStore {
    pub fn new(config: &CloudConfig, session: Session) -> CloudResult<Self> {
        let base_url = Url::parse(&config.api_base_url)
            .map_err(|e| CloudError::Config(format!("invalid api_base_url {:?}: {e}", config.api_base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(CloudError::Config(format!(
                "api_base_url {:?} cannot be a base URL",
                config.api_base_url
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs.max(1)))
            .build()?;

        Ok(Self {
            client,
            base_url,
            session,
        })
    }

    fn document_url(&self, collection: &str, id: &str) -> CloudResult<Url> {
        self.url(&[collection, "documents", id])
    }

    fn url(&self, segments: &[&str]) -> CloudResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| CloudError::Config("api_base_url cannot be a base URL".to_string()))?
            .pop_if_empty()
            .extend(["v1", "collections"])
            .extend(segments);
        Ok(url)
    }

    /// Sends an authenticated request and returns the response if its status
    /// is a success or one of `tolerated`.
    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<&impl serde::Serialize>,
        tolerated: &[StatusCode],
    ) -> CloudResult<reqwest::Response> {
        let token = self.session.access_token().ok_or(CloudError::NotAuthenticated)?;

        debug!("{method} {}", url.path());
        let mut request = self.client.request(method.clone(), url.clone()).bearer_auth(&token);
        if let Some(body) = body {
            request = request.json(body);
        }
        let resp = request.send().await.map_err(CloudError::from_transport)?;

        let status = resp.status();
        if status.is_success() || tolerated.contains(&status) {
            return Ok(resp);
        }

        let detail = resp
            .json::<ErrorBody>()
            .await
            .map(|body| body.error)
            .unwrap_or_default();
        debug!("{method} {} -> {status}", url.path());
        Err(CloudError::from_status(status, detail).unwrap_or(CloudError::InvalidRequest(status.to_string())))
    }
}

#[async_trait]
impl DocumentStore for HttpDocumentStore {
    async fn set_merge(&self, collection: &str, id: &str, fields: Map<String, Value>) -> CloudResult<()> {
        let url = self.document_url(collection, id)?;
        self.send(Method::PATCH, url, Some(&fields), &[]).await?;
        Ok(())
    }

    async fn get(&self, collection: &str, id: &str) -> CloudResult<Option<RemoteRecord>> {
        let url = self.document_url(collection, id)?;
        let resp = self
            .send(Method::GET, url, None::<&()>, &[StatusCode::NOT_FOUND])
            .await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let fields: Map<String, Value> = resp.json().await.map_err(CloudError::from_transport)?;
        Ok(Some(RemoteRecord::new(id, fields)))
    }

    async fn query(&self, collection: &str, query: &RemoteQuery) -> CloudResult<Vec<RemoteRecord>> {
        let url = self.url(&[&format!("{collection}:query")])?;
        let resp = self.send(Method::POST, url, Some(query), &[]).await?;
        let data: QueryResponse = resp.json().await.map_err(CloudError::from_transport)?;
        Ok(data.documents)
    }

    async fn delete(&self, collection: &str, id: &str) -> CloudResult<()> {
        let url = self.document_url(collection, id)?;
        self.send(Method::DELETE, url, None::<&()>, &[StatusCode::NOT_FOUND])
            .await?;
        Ok(())
    }
}
