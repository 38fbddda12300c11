//! HTTP client for the Jaeger query service.

use super::types::QueryResponse;
use crate::parser::schema::Trace;
use crate::parser::{parse_services_response, parse_traces_response};
use crate::utils::config::DEFAULT_HTTP_TIMEOUT;
use crate::utils::error::ApiError;
use log::{debug, info};
use reqwest::blocking::Client;
use std::time::Duration;

/// Read-only source of services and traces
///
/// `Sync` because the loader queries services from several threads at once.
pub trait TraceSource: Sync {
    /// Names of every service known to the backend
    fn services(&self) -> Result<Vec<String>, ApiError>;

    /// Most recent traces of `service`, at most `limit`
    fn traces(&self, service: &str, limit: usize) -> Result<Vec<Trace>, ApiError>;
}

/// Client for the Jaeger query API
pub struct JaegerClient {
    client: Client,
    base_url: String,
}

impl JaegerClient {
    /// Create a new client with the default timeout
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        Self::with_timeout(base_url, DEFAULT_HTTP_TIMEOUT)
    }

    /// Create a client with custom timeout
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::RequestFailed)?;

        Ok(Self {
            client,
            base_url: normalize_base_url(&base_url.into()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get(&self, path: &str, query: &[(&str, String)]) -> Result<QueryResponse, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {} {:?}", url, query);

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .map_err(ApiError::RequestFailed)?;

        // Check HTTP status
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::HttpStatus {
                status: status.as_u16(),
                body: response.text().unwrap_or_default(),
            });
        }

        let body: QueryResponse = response.json().map_err(ApiError::RequestFailed)?;

        if let Some(message) = body.error_message() {
            return Err(ApiError::InvalidResponse(message));
        }

        Ok(body)
    }
}

impl TraceSource for JaegerClient {
    fn services(&self) -> Result<Vec<String>, ApiError> {
        info!("Fetching service list from {}", self.base_url);
        let body = self.get("/api/services", &[])?;
        let services = parse_services_response(&serde_json::json!({ "data": body.data }))?;
        debug!("Backend reports {} services", services.len());
        Ok(services)
    }

    fn traces(&self, service: &str, limit: usize) -> Result<Vec<Trace>, ApiError> {
        info!("Fetching up to {} traces for service: {}", limit, service);
        let query = [("service", service.to_string()), ("limit", limit.to_string())];
        let body = self.get("/api/traces", &query)?;
        let traces = parse_traces_response(&serde_json::json!({ "data": body.data }))?;
        debug!("Service {} returned {} traces", service, traces.len());
        Ok(traces)
    }
}

/// Strip trailing slashes so paths can be appended directly
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim().trim_end_matches('/').to_string()
}
