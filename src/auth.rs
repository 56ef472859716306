// Authorization: checks a stored access token and, when it is missing or
// rejected, runs Pocket's three-step handshake (temporary code, human
// approval in a browser, exchange for a durable token).

use crate::api::{to_params, Transport, ACCESS_TOKEN_PATH, GET_PATH, REQUEST_TOKEN_PATH};
use crate::console::Console;
use crate::error::PocketError;
use reqwest::Url;
use serde_json::{json, Value};
use std::io;

pub const AUTHORIZE_URL: &str = "https://getpocket.com/auth/authorize";
pub const REDIRECT_URI: &str = "https://github.com/hutattedonmyarm/pocket-rename";

/// The session credential. Owned by the entry point and handed around by
/// reference; only the handshake produces a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub consumer_key: String,
    pub access_token: Option<String>,
    pub username: Option<String>,
}

impl Credential {
    pub fn new(consumer_key: impl Into<String>, access_token: Option<String>) -> Self {
        Credential {
            consumer_key: consumer_key.into(),
            access_token,
            username: None,
        }
    }
}

/// The human half of the handshake.
pub trait Approval {
    /// Let the user approve access at `authorization_url` and return once
    /// they say they are done.
    fn approve(&mut self, authorization_url: &str) -> io::Result<()>;
}

/// Opens the authorization URL in the default browser, prints it as well,
/// and waits for the user to hit enter.
pub struct BrowserApproval<'a, C: Console> {
    console: &'a mut C,
    open: fn(&str) -> io::Result<()>,
}

impl<'a, C: Console> BrowserApproval<'a, C> {
    pub fn new(console: &'a mut C) -> Self {
        BrowserApproval {
            console,
            open: webbrowser::open,
        }
    }

    /// Replace the browser launcher.
    pub fn with_opener(mut self, open: fn(&str) -> io::Result<()>) -> Self {
        self.open = open;
        self
    }
}

impl<C: Console> Approval for BrowserApproval<'_, C> {
    fn approve(&mut self, authorization_url: &str) -> io::Result<()> {
        if let Err(e) = (self.open)(authorization_url) {
            log::warn!("could not open a browser: {e}");
        }
        self.console
            .write_line(&format!("Authorize this app in your browser: {authorization_url}"))?;
        match self.console.read_line("Please authorize me and hit enter")? {
            Some(_) => Ok(()),
            None => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed before authorization was confirmed",
            )),
        }
    }
}

pub struct Authorizer<'a, T: Transport> {
    transport: &'a T,
    redirect_uri: String,
}

impl<'a, T: Transport> Authorizer<'a, T> {
    pub fn new(transport: &'a T) -> Self {
        Authorizer {
            transport,
            redirect_uri: REDIRECT_URI.to_string(),
        }
    }

    pub fn with_redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.redirect_uri = redirect_uri.into();
        self
    }

    /// Return a credential holding a usable access token.
    ///
    /// A held token is probed first and returned unchanged if it works.
    /// Otherwise the full handshake runs and a fresh credential comes back.
    pub fn authorize<A: Approval>(&self, credential: Credential, approval: &mut A) -> Result<Credential, PocketError> {
        if credential.access_token.is_some() {
            if self.probe(&credential)? {
                log::info!("stored access token is valid");
                return Ok(credential);
            }
            log::info!("stored access token was rejected, starting handshake");
        }
        self.handshake(credential, approval)
    }

    /// `Ok(false)` when the token is rejected; other failures propagate.
    fn probe(&self, credential: &Credential) -> Result<bool, PocketError> {
        let params = to_params(json!({"count": 1, "detailType": "simple"}));
        match self.transport.call(credential, GET_PATH, params) {
            Ok(_) => Ok(true),
            Err(PocketError::InvalidAccessToken { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn handshake<A: Approval>(&self, credential: Credential, approval: &mut A) -> Result<Credential, PocketError> {
        // The stale token must not ride along with the handshake calls.
        let bare = Credential {
            access_token: None,
            username: None,
            ..credential
        };

        let code = self.request_code(&bare)?;
        approval.approve(&authorization_url(&code, &self.redirect_uri))?;

        let body = self
            .transport
            .call(&bare, ACCESS_TOKEN_PATH, to_params(json!({"code": code})))?;
        let access_token = body
            .get("access_token")
            .and_then(Value::as_str)
            .ok_or_else(|| PocketError::unexpected("token exchange returned no access_token"))?;
        let username = body.get("username").and_then(Value::as_str).map(str::to_owned);
        log::info!("authorized as {}", username.as_deref().unwrap_or("<unknown>"));

        Ok(Credential {
            access_token: Some(access_token.to_string()),
            username,
            ..bare
        })
    }

    fn request_code(&self, credential: &Credential) -> Result<String, PocketError> {
        let params = to_params(json!({"redirect_uri": self.redirect_uri}));
        let body = match self.transport.call(credential, REQUEST_TOKEN_PATH, params) {
            Ok(body) => body,
            Err(PocketError::Http { status: 403, .. }) => {
                return Err(PocketError::InvalidConsumerKey {
                    consumer_key: credential.consumer_key.clone(),
                })
            }
            Err(e) => return Err(e),
        };
        body.get("code")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| PocketError::unexpected("token request returned no code"))
    }
}

/// The page where the user approves a temporary code.
pub fn authorization_url(code: &str, redirect_uri: &str) -> String {
    match Url::parse_with_params(AUTHORIZE_URL, &[("request_token", code), ("redirect_uri", redirect_uri)]) {
        Ok(url) => url.to_string(),
        Err(_) => format!("{AUTHORIZE_URL}?request_token={code}&redirect_uri={redirect_uri}"),
    }
}
