// Shared backend client
// One configured reqwest client wrapped with the session middleware stack

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::multipart::Form;
use reqwest::{Method, RequestBuilder, Response};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use crate::auth::middleware::{BearerAuth, UnauthorizedGuard};
use crate::auth::session::Session;
use crate::error::ApiError;
use crate::http::logging::RequestLogger;

/// Header that skips the ngrok interstitial page in tunnelled deployments
const NGROK_SKIP_HEADER: &str = "ngrok-skip-browser-warning";

/// Headers sent with every request unless the request sets its own
pub fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(
        HeaderName::from_static(NGROK_SKIP_HEADER),
        HeaderValue::from_static("true"),
    );
    headers
}

/// Typed access to the backend REST API
///
/// Cheap to clone; all clones share the connection pool and the session the
/// middleware reads from. Paths are joined onto the base URL, which always
/// ends in `/`.
#[derive(Clone)]
pub struct ApiClient {
    base: Url,
    http: reqwest::Client,
    client: ClientWithMiddleware,
}

impl ApiClient {
    /// Build the client and install the middleware in dispatch order:
    /// request logging, bearer injection, 401 guard
    pub fn new(base: Url, timeout: Option<Duration>, session: &Session) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder().default_headers(default_headers());
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|err| ApiError::InvalidRequest(format!("Failed to build HTTP client: {}", err)))?;

        let client = ClientBuilder::new(http.clone())
            .with(RequestLogger)
            .with(BearerAuth::new(session.clone()))
            .with(UnauthorizedGuard::new(session.clone()))
            .build();

        Ok(Self { base, http, client })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Absolute URL for an endpoint path like `rbac/roles/`
    pub fn url(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base.join(path.trim_start_matches('/'))?)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let request = self.request(Method::GET, path)?;
        self.send_json(request).await
    }

    pub async fn get_with_query<T, Q>(&self, path: &str, query: &Q) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let request = self.request(Method::GET, path)?.query(query);
        self.send_json(request).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(Method::POST, path)?.json(body);
        self.send_json(request).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(Method::PUT, path)?.json(body);
        self.send_json(request).await
    }

    pub async fn patch<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(Method::PATCH, path)?.json(body);
        self.send_json(request).await
    }

    /// DELETE; any 2xx counts as success and the body is ignored
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let request = self.request(Method::DELETE, path)?;
        self.dispatch(request).await.map(|_| ())
    }

    pub async fn post_multipart<T: DeserializeOwned>(&self, path: &str, form: Form) -> Result<T, ApiError> {
        let request = self.request(Method::POST, path)?.multipart(form);
        self.send_json(request).await
    }

    pub async fn put_multipart<T: DeserializeOwned>(&self, path: &str, form: Form) -> Result<T, ApiError> {
        let request = self.request(Method::PUT, path)?.multipart(form);
        self.send_json(request).await
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        Ok(self.http.request(method, self.url(path)?))
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = self.dispatch(request).await?;
        let url = response.url().clone();
        let bytes = response
            .bytes()
            .await
            .map_err(|err| ApiError::Network(err.into()))?;

        // 204 and other empty bodies decode as JSON null
        let body: &[u8] = if bytes.is_empty() { b"null" } else { &bytes };
        serde_json::from_slice(body).map_err(|err| {
            warn!("Unexpected response body from {}: {}", url, err);
            ApiError::Parse(err.to_string())
        })
    }

    /// Run a request through the middleware stack and map the outcome
    async fn dispatch(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let request = request
            .build()
            .map_err(|err| ApiError::InvalidRequest(err.to_string()))?;
        let method = request.method().clone();
        let url = request.url().clone();

        let response = self.client.execute(request).await.map_err(|err| {
            warn!("{} {} got no response: {}", method, url, err);
            ApiError::Network(err)
        })?;

        let status = response.status();
        if status.is_success() {
            debug!("{} {} succeeded with {}", method, url, status);
            return Ok(response);
        }

        let body = match response.text().await {
            Ok(body) => {
                warn!("{} {} failed with {}: {}", method, url, status, body);
                body
            }
            Err(err) => {
                warn!(
                    "{} {} failed with {} and its body could not be read: {}",
                    method, url, status, err
                );
                String::new()
            }
        };
        Err(ApiError::Http { status, body })
    }
}
