// Authentication middleware for the shared HTTP client
// Bearer token injection on the way out, 401 handling on the way back

use ::http::Extensions;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Request, Response, StatusCode};
use reqwest_middleware::{Middleware, Next, Result};
use tracing::{debug, warn};

use crate::auth::session::Session;
use crate::auth::token::bearer_header;

/// Attaches `Authorization: Bearer <token>` when a session token exists
#[derive(Clone)]
pub struct BearerAuth {
    session: Session,
}

impl BearerAuth {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    /// Header value for the token stored right now, if any
    ///
    /// Tokens that cannot form a header value are skipped and logged; the
    /// request then goes out unauthenticated.
    pub fn authorization_value(&self) -> Option<HeaderValue> {
        let token = self.session.access_token()?;
        match HeaderValue::from_str(&bearer_header(&token)) {
            Ok(mut value) => {
                value.set_sensitive(true);
                Some(value)
            }
            Err(err) => {
                warn!("Stored access token is not a valid header value: {}", err);
                None
            }
        }
    }
}

#[async_trait::async_trait]
impl Middleware for BearerAuth {
    async fn handle(
        &self,
        mut req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> Result<Response> {
        match self.authorization_value() {
            Some(value) => {
                req.headers_mut().insert(AUTHORIZATION, value);
            }
            None => debug!("No access token for {} {}", req.method(), req.url()),
        }
        next.run(req, extensions).await
    }
}

/// Clears the session and notifies subscribers when the backend answers 401
#[derive(Clone)]
pub struct UnauthorizedGuard {
    session: Session,
}

impl UnauthorizedGuard {
    pub fn new(session: Session) -> Self {
        Self { session }
    }
}

#[async_trait::async_trait]
impl Middleware for UnauthorizedGuard {
    async fn handle(
        &self,
        req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> Result<Response> {
        let url = req.url().clone();
        let result = next.run(req, extensions).await;

        if let Ok(response) = &result {
            if response.status() == StatusCode::UNAUTHORIZED {
                warn!("Backend answered 401 for {}; clearing stored credentials", url);
                self.session.mark_unauthorized();
            }
        }
        result
    }
}
