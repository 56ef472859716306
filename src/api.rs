// API client module: a small blocking HTTP client that talks to the
// Pocket v3 API. Every call is a JSON POST carrying the consumer key and,
// once authorized, the access token. Callers that run inside the async
// session hand these calls to `worker::offload` so the loop stays live.

use crate::auth::Credential;
use crate::error::PocketError;
use reqwest::blocking::Client;
use reqwest::header::{HeaderValue, ACCEPT};
use reqwest::StatusCode;
use serde_json::{Map, Value};

pub const BASE_URL: &str = "https://getpocket.com/v3";

pub const REQUEST_TOKEN_PATH: &str = "/oauth/request";
pub const ACCESS_TOKEN_PATH: &str = "/oauth/authorize";
pub const GET_PATH: &str = "/get";
pub const ADD_PATH: &str = "/add";
pub const SEND_PATH: &str = "/send";

/// Body fields injected from the credential. Callers cannot override them.
const RESERVED_FIELDS: [&str; 2] = ["consumer_key", "access_token"];

/// Call-specific JSON body fields.
pub type Params = Map<String, Value>;

/// Turn a `json!({..})` literal into call parameters. Non-objects yield
/// an empty body.
pub fn to_params(value: Value) -> Params {
    match value {
        Value::Object(map) => map,
        _ => Params::new(),
    }
}

/// Executes one authenticated call and returns the parsed JSON body.
///
/// `endpoint` is either a path relative to the service base (starting
/// with `/`) or a fully-qualified URL.
pub trait Transport: Send + Sync {
    fn call(&self, credential: &Credential, endpoint: &str, params: Params) -> Result<Value, PocketError>;
}

/// Blocking reqwest client bound to a service base URL.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Build a client against `base_url`.
    ///
    /// Must be called outside of an async context: the blocking client
    /// owns its own internal runtime.
    pub fn new(base_url: impl Into<String>) -> Result<Self, PocketError> {
        let client = Client::builder().build()?;
        Ok(ApiClient {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Create an ApiClient configured from the environment variable
    /// `POCKET_API_URL` or fallback to the public Pocket endpoint.
    pub fn from_env() -> Result<Self, PocketError> {
        let base_url = std::env::var("POCKET_API_URL").unwrap_or_else(|_| BASE_URL.into());
        Self::new(base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Relative endpoints are appended to the base, absolute ones pass through.
    fn resolve_url(&self, endpoint: &str) -> String {
        if endpoint.starts_with('/') {
            format!("{}{}", self.base_url, endpoint)
        } else {
            endpoint.to_string()
        }
    }
}

impl Transport for ApiClient {
    fn call(&self, credential: &Credential, endpoint: &str, params: Params) -> Result<Value, PocketError> {
        let url = self.resolve_url(endpoint);
        let body = request_body(credential, params);
        log::debug!("POST {url}");

        let json = HeaderValue::from_static("application/json");
        let res = self
            .client
            .post(&url)
            .header(ACCEPT, json.clone())
            .header("X-Accept", json)
            .json(&body)
            .send()?;

        let status = res.status();
        log::debug!("{url} -> {status}");
        if !status.is_success() {
            let reason = res
                .headers()
                .get("X-Error")
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned)
                .or_else(|| status.canonical_reason().map(str::to_owned))
                .unwrap_or_default();
            return Err(classify_status(status, credential, reason));
        }

        res.json::<Value>()
            .map_err(|e| PocketError::unexpected(format!("{url} returned a non-JSON body: {e}")))
    }
}

/// Layer the credential fields over the call-specific parameters.
///
/// A caller-supplied `consumer_key` or `access_token` is discarded: letting
/// request parameters shadow the injected credential would let one call
/// impersonate a different application or user.
pub fn request_body(credential: &Credential, mut params: Params) -> Params {
    for key in RESERVED_FIELDS {
        if params.remove(key).is_some() {
            log::warn!("ignoring caller-supplied `{key}` request field");
        }
    }
    params.insert("consumer_key".into(), Value::String(credential.consumer_key.clone()));
    if let Some(token) = &credential.access_token {
        params.insert("access_token".into(), Value::String(token.clone()));
    }
    params
}

/// Map a non-2xx status to the error taxonomy.
///
/// A 401 only means "bad token" when a token was actually sent; a 403 is
/// left generic here because only the token-request step knows it means
/// "bad consumer key".
pub fn classify_status(status: StatusCode, credential: &Credential, reason: String) -> PocketError {
    match (status, &credential.access_token) {
        (StatusCode::UNAUTHORIZED, Some(token)) => PocketError::InvalidAccessToken {
            access_token: token.clone(),
        },
        _ => PocketError::Http {
            status: status.as_u16(),
            reason,
        },
    }
}
