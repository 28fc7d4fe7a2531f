//! Client for the Catalog/Order Service.

use std::future::Future;

use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;
use uuid::Uuid;

use crate::{
    dto::{
        auth::SigninRequest,
        orders::{OrderCreated, OrderSubmission},
        products::{ReviewCreated, ReviewRequest},
    },
    error::ErrorData,
    models::{Order, Product, UserInfo},
    query::{FilterState, SearchPage},
    response::ApiResponse,
};

use super::{
    config::ClientConfig,
    error::{ClientError, ClientResult},
};

/// Operations the storefront needs from the catalog service.
pub trait CatalogService {
    fn search(
        &self,
        filter: &FilterState,
    ) -> impl Future<Output = ClientResult<SearchPage<Product>>> + Send;

    /// Current product record, including `countInStock`.
    fn product(&self, id: Uuid) -> impl Future<Output = ClientResult<Product>> + Send;

    fn product_by_slug(&self, slug: &str) -> impl Future<Output = ClientResult<Product>> + Send;

    fn categories(&self) -> impl Future<Output = ClientResult<Vec<String>>> + Send;

    fn brands(&self) -> impl Future<Output = ClientResult<Vec<String>>> + Send;

    fn create_review(
        &self,
        token: &str,
        product_id: Uuid,
        review: &ReviewRequest,
    ) -> impl Future<Output = ClientResult<ReviewCreated>> + Send;

    fn create_order(
        &self,
        token: &str,
        order: &OrderSubmission,
    ) -> impl Future<Output = ClientResult<OrderCreated>> + Send;

    fn my_orders(&self, token: &str) -> impl Future<Output = ClientResult<Vec<Order>>> + Send;

    fn signin(&self, credentials: &SigninRequest)
    -> impl Future<Output = ClientResult<UserInfo>> + Send;

    /// Most recently added products, newest first.
    fn new_products(&self) -> impl Future<Output = ClientResult<Vec<Product>>> + Send;

    /// Products ranked by units ordered.
    fn best_sellers(&self) -> impl Future<Output = ClientResult<Vec<Product>>> + Send;

    fn products_in_category(
        &self,
        category: &str,
    ) -> impl Future<Output = ClientResult<Vec<Product>>> + Send;
}

#[derive(Debug, Clone)]
pub struct HttpCatalog {
    http: reqwest::Client,
    base_url: String,
}

impl HttpCatalog {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.catalog_url.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }

    /// Base URL extended with `segments`, each percent-encoded as one path
    /// segment.
    fn segment_url(&self, segments: &[&str]) -> ClientResult<Url> {
        let invalid = |reason: String| {
            ClientError::service(None, format!("invalid catalog url {}: {reason}", self.base_url))
        };
        let mut url = Url::parse(&self.base_url).map_err(|err| invalid(err.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| invalid("cannot be a base".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ClientResult<T> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let message = match response.json::<ApiResponse<ErrorData>>().await {
            Ok(body) => body.message,
            Err(_) => status.to_string(),
        };
        tracing::debug!(status = %status, message = %message, "catalog request failed");
        if status == StatusCode::UNAUTHORIZED {
            return Err(ClientError::AuthRequired);
        }
        Err(ClientError::service(Some(status.as_u16()), message))
    }
}

impl CatalogService for HttpCatalog {
    async fn search(&self, filter: &FilterState) -> ClientResult<SearchPage<Product>> {
        self.send(self.http.get(self.url(&filter.search_path())))
            .await
    }

    async fn product(&self, id: Uuid) -> ClientResult<Product> {
        let id = id.to_string();
        let url = self.segment_url(&["api", "products", &id])?;
        self.send(self.http.get(url)).await
    }

    async fn product_by_slug(&self, slug: &str) -> ClientResult<Product> {
        let url = self.segment_url(&["api", "products", "slug", slug])?;
        self.send(self.http.get(url)).await
    }

    async fn categories(&self) -> ClientResult<Vec<String>> {
        self.send(self.http.get(self.url("/api/products/categories")))
            .await
    }

    async fn brands(&self) -> ClientResult<Vec<String>> {
        self.send(self.http.get(self.url("/api/products/brands")))
            .await
    }

    async fn create_review(
        &self,
        token: &str,
        product_id: Uuid,
        review: &ReviewRequest,
    ) -> ClientResult<ReviewCreated> {
        let product_id = product_id.to_string();
        let url = self.segment_url(&["api", "products", &product_id, "reviews"])?;
        let request = self
            .http
            .post(url)
            .bearer_auth(token)
            .json(review);
        self.send(request).await
    }

    async fn create_order(&self, token: &str, order: &OrderSubmission) -> ClientResult<OrderCreated> {
        let request = self
            .http
            .post(self.url("/api/orders"))
            .bearer_auth(token)
            .json(order);
        self.send(request).await
    }

    async fn my_orders(&self, token: &str) -> ClientResult<Vec<Order>> {
        let request = self.http.get(self.url("/api/orders/mine")).bearer_auth(token);
        let body: ApiResponse<Vec<Order>> = self.send(request).await?;
        Ok(body.into_data().unwrap_or_default())
    }

    async fn signin(&self, credentials: &SigninRequest) -> ClientResult<UserInfo> {
        self.send(self.http.post(self.url("/api/users/signin")).json(credentials))
            .await
    }

    async fn new_products(&self) -> ClientResult<Vec<Product>> {
        self.send(self.http.get(self.url("/api/products/new-products")))
            .await
    }

    async fn best_sellers(&self) -> ClientResult<Vec<Product>> {
        self.send(self.http.get(self.url("/api/products/best-sellers")))
            .await
    }

    async fn products_in_category(&self, category: &str) -> ClientResult<Vec<Product>> {
        let url = self.segment_url(&["api", "products", "category", category])?;
        self.send(self.http.get(url)).await
    }
}
