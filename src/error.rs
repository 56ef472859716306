// Error taxonomy shared by the transport, the authorizer and the store.
// Nothing in the library swallows these; the binary is the only place
// that turns them into a message and an exit code.

use thiserror::Error;

/// Everything that can go wrong while talking to Pocket.
#[derive(Debug, Error)]
pub enum PocketError {
    /// The service refused the consumer key while requesting a temporary
    /// code. The credential cannot heal itself, so this is fatal.
    #[error("Invalid consumer key: \"{}\"", mask(consumer_key))]
    InvalidConsumerKey { consumer_key: String },

    /// A stored access token was rejected (HTTP 401). Recoverable by
    /// running the handshake again.
    #[error("Invalid access token: \"{}\"", mask(access_token))]
    InvalidAccessToken { access_token: String },

    /// Any other non-2xx answer.
    #[error("{status} - {reason}")]
    Http { status: u16, reason: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// A batched action came back as `false`.
    #[error("the service rejected the `{action}` action")]
    ActionRejected { action: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("worker task failed: {0}")]
    Worker(String),
}

impl PocketError {
    pub(crate) fn unexpected(what: impl Into<String>) -> Self {
        PocketError::UnexpectedResponse(what.into())
    }
}

/// Keeps the first four characters of a secret and hides the rest.
fn mask(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    if secret.chars().count() <= 4 {
        "*".repeat(visible.chars().count())
    } else {
        format!("{visible}…")
    }
}
