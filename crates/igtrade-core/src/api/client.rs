//! Thin client for the dealing endpoints.
//!
//! Every call carries the API key, both session tokens and an endpoint
//! version. Request bodies are validated first; a request that breaks a rule
//! fails with `Error::Validation` and never reaches the transport.

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::auth::{AuthenticationService, Credentials};
use crate::error::Result;
use crate::models::{
    ClosePosition, CreatePosition, CreateWorkingOrder, DealConfirmation, DealReference,
    OpenPosition, OpenPositions, UpdatePosition, UpdateWorkingOrder, WorkingOrders,
};
use crate::validation::Validate;

use super::transport::gateway_headers;
use super::{HttpRequest, HttpResponse, RequestError, Transport, TransportError};

/// Header the gateway reads to tunnel a DELETE with a body through POST
const METHOD_OVERRIDE_HEADER: &str = "_method";

/// Dealing calls against one session.
///
/// The client holds a snapshot of the credentials it was built with. When
/// they expire, authenticate again and swap them in with
/// [`TradingClient::with_credentials`].
pub struct TradingClient {
    transport: Arc<dyn Transport>,
    base_url: String,
    api_key: String,
    credentials: Credentials,
}

impl TradingClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        credentials: Credentials,
    ) -> Self {
        Self {
            transport,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            credentials,
        }
    }

    /// Authenticate through `auth` (reusing a cached session when there is
    /// one) and share its transport and endpoint.
    pub async fn connect(auth: &AuthenticationService) -> Result<Self> {
        let credentials = auth.authenticate().await?;
        let config = auth.config();
        Ok(Self::new(
            auth.transport(),
            config.base_url.clone(),
            config.api_key.clone(),
            credentials,
        ))
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    // ===== Positions =====

    pub async fn open_positions(&self) -> Result<OpenPositions, RequestError> {
        self.fetch("/gateway/deal/positions", 2).await
    }

    pub async fn open_position(&self, deal_id: &str) -> Result<OpenPosition, RequestError> {
        self.fetch(&format!("/gateway/deal/positions/{}", deal_id), 2)
            .await
    }

    pub async fn create_position(&self, position: &CreatePosition) -> Result<DealReference> {
        self.submit(Method::POST, "/gateway/deal/positions/otc", 2, position, None)
            .await
    }

    /// Close (part of) a position. The gateway only accepts this body on a
    /// POST carrying a DELETE override.
    pub async fn close_position(&self, close: &ClosePosition) -> Result<DealReference> {
        self.submit(
            Method::POST,
            "/gateway/deal/positions/otc",
            1,
            close,
            Some("DELETE"),
        )
        .await
    }

    pub async fn update_position(
        &self,
        deal_id: &str,
        update: &UpdatePosition,
    ) -> Result<DealReference> {
        let path = format!("/gateway/deal/positions/otc/{}", deal_id);
        self.submit(Method::PUT, &path, 2, update, None).await
    }

    // ===== Working orders =====

    pub async fn working_orders(&self) -> Result<WorkingOrders, RequestError> {
        self.fetch("/gateway/deal/workingorders", 2).await
    }

    pub async fn create_working_order(&self, order: &CreateWorkingOrder) -> Result<DealReference> {
        self.submit(Method::POST, "/gateway/deal/workingorders/otc", 2, order, None)
            .await
    }

    pub async fn update_working_order(
        &self,
        deal_id: &str,
        update: &UpdateWorkingOrder,
    ) -> Result<DealReference> {
        let path = format!("/gateway/deal/workingorders/otc/{}", deal_id);
        self.submit(Method::PUT, &path, 2, update, None).await
    }

    pub async fn delete_working_order(&self, deal_id: &str) -> Result<DealReference, RequestError> {
        let path = format!("/gateway/deal/workingorders/otc/{}", deal_id);
        let request = HttpRequest::new(Method::DELETE, self.url(&path), self.headers(2)?);
        let reference: DealReference = Self::decode(self.send(request).await?)?;
        info!(deal_id, deal_reference = %reference.deal_reference, "Working order deleted");
        Ok(reference)
    }

    // ===== Confirms =====

    /// Outcome of a deal, looked up by the reference a dealing call returned
    pub async fn deal_confirmation(
        &self,
        deal_reference: &str,
    ) -> Result<DealConfirmation, RequestError> {
        self.fetch(&format!("/gateway/deal/confirms/{}", deal_reference), 1)
            .await
    }

    // ===== Plumbing =====

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn headers(&self, version: u16) -> Result<HeaderMap, RequestError> {
        let mut headers = gateway_headers(&self.api_key, version)?;
        self.credentials.apply(&mut headers)?;
        Ok(headers)
    }

    async fn fetch<T: DeserializeOwned>(&self, path: &str, version: u16) -> Result<T, RequestError> {
        let request = HttpRequest::new(Method::GET, self.url(path), self.headers(version)?);
        Self::decode(self.send(request).await?)
    }

    /// Validate `body`, then send it. Validation failures never reach the transport.
    async fn submit<B>(
        &self,
        method: Method,
        path: &str,
        version: u16,
        body: &B,
        method_override: Option<&'static str>,
    ) -> Result<DealReference>
    where
        B: Validate + Serialize + Sync,
    {
        if let Err(e) = body.validate() {
            warn!(rule_set = %e.rule_set, violations = e.violations.len(), "Request failed validation");
            return Err(e.into());
        }

        let mut headers = self.headers(version)?;
        if let Some(method_override) = method_override {
            headers.insert(
                METHOD_OVERRIDE_HEADER,
                HeaderValue::from_static(method_override),
            );
        }
        let body = serde_json::to_value(body).map_err(|e| {
            RequestError::from(TransportError::Other(format!("Failed to encode request body: {}", e)))
        })?;

        let request = HttpRequest::new(method, self.url(path), headers).json(body);
        let reference: DealReference = Self::decode(self.send(request).await?)?;
        info!(rule_set = %B::RULE_SET, deal_reference = %reference.deal_reference, "Deal submitted");
        Ok(reference)
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, RequestError> {
        debug!(method = %request.method, url = %request.url, "Calling gateway");
        let response = self.transport.send(request).await?;
        if response.is_success() {
            Ok(response)
        } else {
            let status = response.status.as_u16();
            warn!(status, "Gateway call failed");
            Err(RequestError::from_status(status, &response.body))
        }
    }

    fn decode<T: DeserializeOwned>(response: HttpResponse) -> Result<T, RequestError> {
        response
            .json()
            .map_err(|e| RequestError::InvalidResponse(e.to_string()))
    }
}

impl std::fmt::Debug for TradingClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TradingClient")
            .field("base_url", &self.base_url)
            .field("session_expiry", &self.credentials.expiry())
            .finish_non_exhaustive()
    }
}
