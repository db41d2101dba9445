use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("no API key configured")]
    MissingCredential,

    #[error("invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),

    /// The HTTP client could not be constructed. Distinct from [`Upstream`]:
    /// no network contact was attempted.
    ///
    /// [`Upstream`]: Error::Upstream
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// The credential endpoint failed: transport error, non-2xx status, or a
    /// 2xx response missing the token field. `status` is `None` when the
    /// request never produced an HTTP response.
    #[error("credential endpoint error: {detail}")]
    Upstream {
        status: Option<u16>,
        detail: String,
    },

    #[error("malformed inbound event: {0}")]
    MalformedEvent(String),

    #[error("malformed tool arguments: {0}")]
    MalformedArguments(String),

    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("tool execution failed: {0}")]
    ToolExecution(String),

    #[error("client delivery failed: {0}")]
    Delivery(String),

    #[error("failed to serialize event: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
