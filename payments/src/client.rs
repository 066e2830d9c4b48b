use std::{collections::HashMap, time::Duration};

use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Method, StatusCode,
};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::{
    errors::{ApiError, Error, Result},
    models::{CreateLinkRequest, CreateLinkResponse, PaymentStatusResponse},
    validation::{validate_create_link, validate_reference, ValidationError},
};

pub const DEFAULT_BASE_URL: &str = "https://api.paylink.dev/v1";
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

const PAYMENT_LINKS_PATH: &str = "payment-links";
const STATUS_PATH: &str = "status";

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub access_token: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Sent with every request, on top of the auth and content-type headers.
    #[serde(default)]
    pub headers: HashMap<String, String>,
}
impl ClientConfig {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            base_url: DEFAULT_BASE_URL.to_string(),
            headers: HashMap::new(),
        }
    }
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

/// Client for the payment link API.
///
/// Cloning is cheap and clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct PaylinkClient {
    http: reqwest::Client,
    base_url: Url,
}
impl PaylinkClient {
    pub fn new(access_token: impl Into<String>) -> Result<Self> {
        Self::with_config(ClientConfig::new(access_token))
    }

    pub fn with_config(config: ClientConfig) -> Result<Self> {
        if config.access_token.trim().is_empty() {
            return Err(Error::Config("access token is required".into()));
        }
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| Error::Config(format!("invalid base url {}: {e}", config.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Config(format!(
                "base url {} cannot carry a path",
                config.base_url
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .default_headers(Self::default_headers(&config)?)
            .build()
            .map_err(|e| Error::Config(format!("cannot build http client: {e}")))?;

        Ok(Self { http, base_url })
    }

    fn default_headers(config: &ClientConfig) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.access_token))
            .map_err(|_| Error::Config("access token is not a valid header value".into()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        for (name, value) in &config.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| Error::Config(format!("invalid header name {name}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|_| Error::Config(format!("invalid value for header {name}")))?;
            headers.insert(name, value);
        }
        Ok(headers)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // checked in with_config
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Validates `request` and creates a payment link for it.
    ///
    /// Nothing is sent when validation fails.
    pub async fn create_payment_link(&self, request: &CreateLinkRequest) -> Result<CreateLinkResponse> {
        validate_create_link(request)?;
        let payload = request.resolve().ok_or(ValidationError::MissingProductInfo)?;

        let url = self.endpoint(&[PAYMENT_LINKS_PATH]);
        debug!(%url, fee_mode = %payload.fee_mode, "creating payment link");
        let builder = self.http.post(url).json(&payload);
        let response: CreateLinkResponse = self.send(Method::POST, builder).await?;
        debug!(reference = response.reference(), sandbox = response.data.sandbox, "payment link created");
        Ok(response)
    }

    /// Fetches the current status of the payment behind `reference`.
    pub async fn check_payment(&self, reference: &str) -> Result<PaymentStatusResponse> {
        validate_reference(reference)?;

        let url = self.endpoint(&[PAYMENT_LINKS_PATH, reference, STATUS_PATH]);
        debug!(%url, reference, "checking payment status");
        let builder = self.http.get(url);
        let response: PaymentStatusResponse = self.send(Method::GET, builder).await?;
        debug!(reference, status = %response.status(), "payment status received");
        Ok(response)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        builder: reqwest::RequestBuilder,
    ) -> Result<T> {
        let response = match builder.send().await {
            Ok(response) => response,
            Err(err) => return Err(Self::failed(&method, ApiError::transport(&err))),
        };
        let status = response.status();
        let text = match response.text().await {
            Ok(text) => text,
            Err(err) => {
                return Err(Self::failed(
                    &method,
                    ApiError::unreadable_body(status.as_u16(), &err),
                ))
            }
        };
        let body: Option<Value> = serde_json::from_str(&text).ok();

        if !status.is_success() {
            let fallback = format!("Request failed with status code {}", status.as_u16());
            return Err(Self::failed(
                &method,
                ApiError::classify(status.as_u16(), body.as_ref(), &fallback),
            ));
        }

        let Some(body) = body else {
            let err = ApiError::classify(status.as_u16(), None, "Response body is not valid JSON");
            return Err(Self::failed(&method, err));
        };
        if body.get("success").and_then(Value::as_bool) == Some(false) {
            return Err(Self::failed(&method, Self::logical_failure(status, &body)));
        }

        serde_json::from_value(body.clone())
            .map_err(|e| Self::failed(&method, ApiError::invalid_body(status.as_u16(), Some(body), &e)))
    }

    fn logical_failure(status: StatusCode, body: &Value) -> ApiError {
        ApiError::classify(status.as_u16(), Some(body), "Request was not successful")
    }

    fn failed(method: &Method, err: ApiError) -> Error {
        warn!(
            %method,
            kind = ?err.kind,
            status_code = err.status_code,
            request_id = err.request_id.as_deref(),
            "payment gateway call failed: {}",
            err.message
        );
        Error::Api(err)
    }
}
