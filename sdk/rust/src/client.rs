use reqwest::{header, Client, Method, RequestBuilder};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::error::ClientError;
use crate::lookup::{FetchOptions, LookupResource};
use crate::response::{unwrap_item, unwrap_list, ListResponse};

/// Client for the marketplace backend (directly or via the gateway).
#[derive(Debug, Clone)]
pub struct MarketplaceClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl MarketplaceClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Attach an access token sent as `Authorization: Bearer`.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Reuse an existing reqwest client (connection pool, timeouts).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Fetch a lookup table. `options.authenticated` picks the endpoint and
    /// whether the token is sent; asking for it without a token fails
    /// before any request is made.
    pub async fn fetch_lookup<T: DeserializeOwned>(
        &self,
        resource: LookupResource,
        options: FetchOptions,
    ) -> Result<Vec<T>, ClientError> {
        if options.authenticated && self.token.is_none() {
            return Err(ClientError::MissingToken);
        }
        let value = self
            .send(self.request(Method::GET, &resource.path(options)), options.authenticated)
            .await?;
        Ok(unwrap_list(value)?.into_items())
    }

    /// GET a collection.
    pub async fn list<T: DeserializeOwned>(&self, path: &str) -> Result<ListResponse<T>, ClientError> {
        let value = self.send(self.request(Method::GET, path), true).await?;
        Ok(unwrap_list(value)?)
    }

    /// GET a single resource.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let value = self.send(self.request(Method::GET, path), true).await?;
        Ok(unwrap_item(value)?)
    }

    /// POST a new resource.
    pub async fn create<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ClientError> {
        let value = self.send(self.request(Method::POST, path).json(body), true).await?;
        Ok(unwrap_item(value)?)
    }

    /// PUT an existing resource.
    pub async fn update<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ClientError> {
        let value = self.send(self.request(Method::PUT, path).json(body), true).await?;
        Ok(unwrap_item(value)?)
    }

    /// DELETE a resource. The response body, if any, is ignored.
    pub async fn delete(&self, path: &str) -> Result<(), ClientError> {
        self.send(self.request(Method::DELETE, path), true).await?;
        Ok(())
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        self.client
            .request(method, url)
            .header(header::ACCEPT, "application/json")
    }

    async fn send(&self, builder: RequestBuilder, authenticated: bool) -> Result<Value, ClientError> {
        let builder = match (&self.token, authenticated) {
            (Some(token), true) => builder.bearer_auth(token),
            _ => builder,
        };

        let res = builder.send().await?;
        let status = res.status();
        let text = res.text().await?;

        if !status.is_success() {
            tracing::debug!(status = %status, body = %text, "Backend returned error status");
            return Err(ClientError::Status { status, body: text });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }
}
