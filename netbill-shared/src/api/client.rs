use std::{fmt, rc::Rc};

use reqwest::{Client, RequestBuilder, Response, header::AUTHORIZATION};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use super::endpoints::{self, Resource};
use super::error::{ApiError, ApiResult};
use super::interceptor::{Interception, bearer_value, default_headers, intercept_status};
use super::navigation::Navigator;
use crate::config::ClientConfig;
use crate::models::{AuthResponse, ErrorResponse, LoginRequest, RegisterRequest, SessionUser};
use crate::session::{Session, SessionStore};

/// Client for the NetBill billing API.
///
/// Holds the [`SessionStore`] it decorates requests from and the
/// [`Navigator`] it redirects through when the server ends the session.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    client: Client,
    store: SessionStore,
    navigator: Rc<dyn Navigator>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client rooted at `base_url` (for example `/api` or
    /// `https://billing.example/api`).
    pub fn new(base_url: &str, store: SessionStore, navigator: Rc<dyn Navigator>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
            store,
            navigator,
        }
    }

    /// Create a client from the API section of `config`.
    pub fn from_config(
        config: &ClientConfig,
        store: SessionStore,
        navigator: Rc<dyn Navigator>,
    ) -> Self {
        Self::new(&config.api.base_url(), store, navigator)
    }

    /// The session store this client reads and clears.
    #[must_use]
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Absolute or origin-relative URL for `path`.
    #[must_use]
    pub fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn decorate(&self, request: RequestBuilder) -> ApiResult<RequestBuilder> {
        let token = self.store.token()?;
        let request = request.headers(default_headers());
        Ok(match bearer_value(token.as_deref()) {
            Some(value) => request.header(AUTHORIZATION, value),
            None => request,
        })
    }

    async fn intercept(&self, response: Response) -> ApiResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        match intercept_status(status) {
            Interception::SessionInvalidated { redirect } => {
                warn!(%status, url = %response.url(), "server rejected session; signing out");
                self.store.logout();
                self.navigator.navigate(&redirect);
                let body = error_body(response).await;
                Err(ApiError::Unauthorized { status, body })
            }
            Interception::PassThrough => {
                debug!(%status, url = %response.url(), "request failed");
                let body = error_body(response).await;
                Err(ApiError::Status { status, body })
            }
        }
    }

    /// Send `request` through both interception steps.
    ///
    /// # Errors
    /// [`ApiError::SessionUnavailable`] when the token cannot be read (nothing
    /// is sent), [`ApiError::Transport`] when no response arrives, and
    /// [`ApiError::Unauthorized`]/[`ApiError::Status`] for failure statuses.
    pub async fn send(&self, request: RequestBuilder) -> ApiResult<Response> {
        let request = self.decorate(request)?;
        let response = request.send().await?;
        self.intercept(response).await
    }

    /// `GET path`, decoding a JSON body.
    ///
    /// # Errors
    /// See [`ApiClient::send`]; [`ApiError::Decode`] for unexpected bodies.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let response = self.send(self.client.get(self.api_url(path))).await?;
        decode(response).await
    }

    /// `POST path` with a JSON body, decoding a JSON reply.
    ///
    /// # Errors
    /// See [`ApiClient::get`].
    pub async fn post<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .send(self.client.post(self.api_url(path)).json(body))
            .await?;
        decode(response).await
    }

    /// `PUT path` with a JSON body, decoding a JSON reply.
    ///
    /// # Errors
    /// See [`ApiClient::get`].
    pub async fn put<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .send(self.client.put(self.api_url(path)).json(body))
            .await?;
        decode(response).await
    }

    /// `DELETE path`, ignoring any reply body.
    ///
    /// # Errors
    /// See [`ApiClient::send`].
    pub async fn delete(&self, path: &str) -> ApiResult<()> {
        self.send(self.client.delete(self.api_url(path))).await?;
        Ok(())
    }

    /// Sign in and record the returned user and token.
    ///
    /// # Errors
    /// See [`ApiClient::post`].
    pub async fn login(&self, credentials: &LoginRequest) -> ApiResult<Session> {
        let response: AuthResponse = self.post(endpoints::LOGIN, credentials).await?;
        Ok(self.accept_auth(response))
    }

    /// Create an account and record the returned user and token.
    ///
    /// # Errors
    /// See [`ApiClient::post`].
    pub async fn register(&self, details: &RegisterRequest) -> ApiResult<Session> {
        let response: AuthResponse = self.post(endpoints::REGISTER, details).await?;
        Ok(self.accept_auth(response))
    }

    fn accept_auth(&self, response: AuthResponse) -> Session {
        let user = SessionUser::from_value(response.user);
        info!(has_user = user.is_some(), "signed in");
        self.store.set_auth(user, response.token);
        self.store.snapshot()
    }

    /// Fetch the signed-in user and merge it into the session.
    ///
    /// Accepts either the bare user object or `{ "user": {...} }`. A `user`
    /// key holding anything but an object is a decode error and leaves the
    /// session untouched.
    ///
    /// # Errors
    /// See [`ApiClient::get`].
    pub async fn refresh_user(&self) -> ApiResult<Option<SessionUser>> {
        let payload: Value = self.get(endpoints::CURRENT_USER).await?;
        let fields = match payload {
            Value::Object(mut map) => match map.remove("user") {
                Some(Value::Object(user)) => user,
                Some(other) => {
                    return Err(ApiError::Decode(format!(
                        "expected `user` to be an object, got {other}"
                    )));
                }
                None => map,
            },
            _ => return Err(ApiError::Decode("expected a user object".to_string())),
        };
        self.store.update_user(fields);
        Ok(self.store.snapshot().user)
    }

    /// Revoke the token on the server when possible, then clear the session.
    ///
    /// Server failures are logged and never prevent the local sign-out.
    pub async fn sign_out(&self) {
        let has_token = matches!(self.store.token(), Ok(Some(_)));
        if has_token {
            if let Err(err) = self
                .send(self.client.post(self.api_url(endpoints::LOGOUT)))
                .await
            {
                warn!(error = %err, "server logout failed");
            }
        }
        self.store.logout();
    }

    /// List a resource collection. Accepts a bare array or `{ "data": [...] }`.
    ///
    /// # Errors
    /// See [`ApiClient::get`].
    pub async fn list(&self, resource: Resource) -> ApiResult<Vec<Value>> {
        let payload: Value = self.get(resource.path()).await?;
        match payload {
            Value::Array(rows) => Ok(rows),
            Value::Object(mut map) => match map.remove("data") {
                Some(Value::Array(rows)) => Ok(rows),
                _ => Err(ApiError::Decode(format!("expected a list of {resource}"))),
            },
            _ => Err(ApiError::Decode(format!("expected a list of {resource}"))),
        }
    }

    /// Fetch one record.
    ///
    /// # Errors
    /// See [`ApiClient::get`].
    pub async fn fetch(&self, resource: Resource, id: &str) -> ApiResult<Value> {
        self.get(&resource.item_path(id)).await
    }

    /// Create a record.
    ///
    /// # Errors
    /// See [`ApiClient::post`].
    pub async fn create(&self, resource: Resource, record: &Map<String, Value>) -> ApiResult<Value> {
        self.post(resource.path(), record).await
    }

    /// Replace fields of a record.
    ///
    /// # Errors
    /// See [`ApiClient::put`].
    pub async fn update(
        &self,
        resource: Resource,
        id: &str,
        record: &Map<String, Value>,
    ) -> ApiResult<Value> {
        self.put(&resource.item_path(id), record).await
    }

    /// Delete a record.
    ///
    /// # Errors
    /// See [`ApiClient::delete`].
    pub async fn remove(&self, resource: Resource, id: &str) -> ApiResult<()> {
        self.delete(&resource.item_path(id)).await
    }

    /// Mark a payment as verified.
    ///
    /// # Errors
    /// See [`ApiClient::post`].
    pub async fn verify_payment(&self, payment_id: &str) -> ApiResult<Value> {
        self.post(&endpoints::verify_payment(payment_id), &Map::new())
            .await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
    response
        .json::<T>()
        .await
        .map_err(|err| ApiError::Decode(err.to_string()))
}

async fn error_body(response: Response) -> Option<ErrorResponse> {
    let text = response.text().await.ok()?;
    ErrorResponse::parse(&text)
}
