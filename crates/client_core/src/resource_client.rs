use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use shared::protocol::{ResourceList, ResourceRef};
use tracing::debug;
use url::Url;

use crate::error::CatalogError;

/// Stateless access to a list-of-references catalog API.
#[async_trait]
pub trait ResourceClient<T: Send + 'static>: Send + Sync {
    async fn list_references(
        &self,
        offset: u32,
        limit: u32,
    ) -> Result<Vec<ResourceRef>, CatalogError>;

    async fn fetch_item(&self, reference: &ResourceRef) -> Result<T, CatalogError>;
}

#[async_trait]
impl<T, R> ResourceClient<T> for Arc<R>
where
    T: Send + 'static,
    R: ResourceClient<T> + ?Sized,
{
    async fn list_references(
        &self,
        offset: u32,
        limit: u32,
    ) -> Result<Vec<ResourceRef>, CatalogError> {
        ResourceClient::<T>::list_references(&**self, offset, limit).await
    }

    async fn fetch_item(&self, reference: &ResourceRef) -> Result<T, CatalogError> {
        ResourceClient::<T>::fetch_item(&**self, reference).await
    }
}

#[derive(Debug, Clone)]
pub struct HttpResourceClient {
    http: Client,
    collection_url: Url,
}

impl HttpResourceClient {
    pub fn new(base_url: &str, collection: &str) -> Result<Self, CatalogError> {
        Self::with_http(Client::new(), base_url, collection)
    }

    pub fn with_http(http: Client, base_url: &str, collection: &str) -> Result<Self, CatalogError> {
        let raw = format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            collection.trim_matches('/')
        );
        let collection_url = Url::parse(&raw).map_err(|source| CatalogError::InvalidBaseUrl {
            url: base_url.to_string(),
            source,
        })?;
        Ok(Self {
            http,
            collection_url,
        })
    }

    pub fn collection_url(&self) -> &Url {
        &self.collection_url
    }

    /// Resolves a reference against the collection URL; absolute references
    /// pass through unchanged.
    fn resolve(&self, reference: &ResourceRef) -> Result<Url, CatalogError> {
        self.collection_url
            .join(&reference.url)
            .map_err(|source| CatalogError::InvalidReference {
                url: reference.url.clone(),
                source,
            })
    }

    async fn get_json<D: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        url: &Url,
    ) -> Result<D, CatalogError> {
        let response = request
            .send()
            .await?
            .error_for_status()
            .map_err(|err| CatalogError::from_http(err, url))?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl<T> ResourceClient<T> for HttpResourceClient
where
    T: DeserializeOwned + Send + 'static,
{
    async fn list_references(
        &self,
        offset: u32,
        limit: u32,
    ) -> Result<Vec<ResourceRef>, CatalogError> {
        let request = self
            .http
            .get(self.collection_url.clone())
            .query(&[("limit", limit), ("offset", offset)]);
        let list: ResourceList = self.get_json(request, &self.collection_url).await?;
        debug!(
            offset,
            limit,
            count = list.results.len(),
            total = list.count,
            "catalog: listed references"
        );
        Ok(list.results)
    }

    async fn fetch_item(&self, reference: &ResourceRef) -> Result<T, CatalogError> {
        let url = self.resolve(reference)?;
        let request = self.http.get(url.clone());
        self.get_json(request, &url).await
    }
}

#[cfg(test)]
#[path = "tests/resource_client_tests.rs"]
mod tests;
