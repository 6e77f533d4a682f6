// Request logging middleware
// Tags each outgoing request with an id and logs its outcome

use std::time::Instant;

use ::http::Extensions;
use reqwest::header::{HeaderName, HeaderValue};
use reqwest::{Request, Response};
use reqwest_middleware::{Middleware, Next, Result};
use tracing::{debug, warn};
use uuid::Uuid;

/// Header carrying the per-request correlation id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Fresh correlation id in the `req_<hex>` form
pub fn new_request_id() -> String {
    format!("req_{}", Uuid::new_v4().simple())
}

/// Outermost middleware of the shared client
#[derive(Debug, Default, Clone, Copy)]
pub struct RequestLogger;

#[async_trait::async_trait]
impl Middleware for RequestLogger {
    async fn handle(
        &self,
        mut req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> Result<Response> {
        let request_id = new_request_id();
        if let Ok(value) = HeaderValue::from_str(&request_id) {
            req.headers_mut()
                .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
        }

        let method = req.method().clone();
        let url = req.url().clone();
        let started = Instant::now();
        debug!("[{}] {} {}", request_id, method, url);

        let result = next.run(req, extensions).await;
        let elapsed = started.elapsed();

        match &result {
            Ok(response) => debug!(
                "[{}] {} {} -> {} in {:?}",
                request_id,
                method,
                url,
                response.status(),
                elapsed
            ),
            Err(err) => warn!(
                "[{}] {} {} failed after {:?}: {}",
                request_id, method, url, elapsed, err
            ),
        }
        result
    }
}
