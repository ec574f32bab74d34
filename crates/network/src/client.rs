// crates/network/src/client.rs
//! HTTP client for the Museu Literário backend

use crate::error::{NetworkError, NetworkResult};
use crate::session::{Session, SessionListener, SessionStore};
use crate::wire;
use museu_resilience::{retry_async, RetryPolicy};
use reqwest::{Client as ReqwestClient, Method, StatusCode, Url};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend root, e.g. `http://localhost:8080`
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// User agent string
    pub user_agent: String,
    /// Retry policy for idempotent reads; mutations are sent once
    pub read_retry: RetryPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout: Duration::from_secs(15),
            user_agent: format!("museu-client/{}", env!("CARGO_PKG_VERSION")),
            read_retry: RetryPolicy::new(3).with_initial_delay(Duration::from_millis(200)),
        }
    }
}

impl ClientConfig {
    /// Longest a read can take, counting every retry and its backoff
    pub fn read_budget(&self) -> Duration {
        self.read_retry.worst_case(self.timeout)
    }
}

/// Whether a request carries the bearer token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Auth {
    /// Never sent (login, register)
    Anonymous,
    /// Sent when a session exists (catalog reads)
    Optional,
    /// Required; fails with `NotAuthenticated` when signed out
    Required,
}

/// Typed client for the backend REST API
///
/// Cheap to clone; clones share the HTTP connection pool, the session store
/// and the teardown listener.
#[derive(Clone)]
pub struct ApiClient {
    inner: ReqwestClient,
    base_url: Url,
    config: ClientConfig,
    session: Arc<dyn SessionStore>,
    listener: Option<SessionListener>,
}

impl ApiClient {
    /// Creates a new client backed by `session`
    pub fn new(config: ClientConfig, session: Arc<dyn SessionStore>) -> NetworkResult<Self> {
        let base_url = Url::parse(config.base_url.trim())
            .map_err(|e| NetworkError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;

        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            return Err(NetworkError::InvalidUrl(config.base_url.clone()));
        }

        let inner = ReqwestClient::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(NetworkError::Http)?;

        Ok(Self {
            inner,
            base_url,
            config,
            session,
            listener: None,
        })
    }

    /// Registers the callback run when the backend rejects the stored token
    pub fn on_session_ended(mut self, listener: SessionListener) -> Self {
        self.listener = Some(listener);
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session_store(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    /// Currently stored session
    pub fn current_session(&self) -> NetworkResult<Option<Session>> {
        self.session.load()
    }

    /// Builds `{base}/{segments...}`, percent-encoding each segment
    pub(crate) fn endpoint(&self, segments: &[&str]) -> NetworkResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| NetworkError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// GET with retries for transient failures
    pub(crate) async fn get(&self, url: Url, auth: Auth) -> NetworkResult<Value> {
        retry_async(&self.config.read_retry, NetworkError::is_retryable, || {
            self.execute(Method::GET, url.clone(), None, auth)
        })
        .await
    }

    /// Any non-GET request; sent exactly once
    pub(crate) async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<Value>,
        auth: Auth,
    ) -> NetworkResult<Value> {
        self.execute(method, url, body.as_ref(), auth).await
    }

    async fn execute(
        &self,
        method: Method,
        url: Url,
        body: Option<&Value>,
        auth: Auth,
    ) -> NetworkResult<Value> {
        let token = match auth {
            Auth::Anonymous => None,
            Auth::Optional => self.session.load()?.map(|s| s.token),
            Auth::Required => Some(
                self.session
                    .load()?
                    .map(|s| s.token)
                    .ok_or(NetworkError::NotAuthenticated)?,
            ),
        };

        log::debug!("{} {}", method, url);

        let mut request = self.inner.request(method.clone(), url.clone());
        if let Some(token) = &token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status();
        let text = response.text().await.map_err(|e| self.transport_error(e))?;

        if status.is_success() {
            if text.trim().is_empty() {
                return Ok(Value::Null);
            }
            // Some mutations answer with a plain-text confirmation
            return Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)));
        }

        log::debug!("{} {} -> {}", method, url, status);
        Err(self.status_error(status, &text, &url, token.is_some()))
    }

    fn transport_error(&self, e: reqwest::Error) -> NetworkError {
        if e.is_timeout() {
            NetworkError::Timeout(self.config.timeout)
        } else {
            NetworkError::Http(e)
        }
    }

    fn status_error(
        &self,
        status: StatusCode,
        body: &str,
        url: &Url,
        authenticated: bool,
    ) -> NetworkError {
        let message = wire::error_message(body).unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string()
        });

        match status {
            StatusCode::UNAUTHORIZED => {
                let token_invalid = authenticated && wire::names_invalid_token(body);
                if token_invalid {
                    self.teardown();
                }
                NetworkError::Unauthorized {
                    message,
                    token_invalid,
                }
            }
            StatusCode::NOT_FOUND => NetworkError::NotFound {
                resource: url.path().to_string(),
            },
            s if s.is_client_error() => NetworkError::Validation {
                status: s.as_u16(),
                message,
            },
            s => NetworkError::Server {
                status: s.as_u16(),
                message,
            },
        }
    }

    /// Clears the stored session and notifies the listener, once per session
    fn teardown(&self) {
        match self.session.clear() {
            Ok(Some(session)) => {
                log::error!(
                    "Session for {} was rejected by the server; signed out",
                    session.display_name()
                );
                if let Some(listener) = &self.listener {
                    listener(&session);
                }
            }
            Ok(None) => log::debug!("Session already cleared"),
            Err(e) => log::error!("Failed to clear rejected session: {}", e),
        }
    }
}
