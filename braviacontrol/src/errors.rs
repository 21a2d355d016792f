use thiserror::Error;

#[derive(Error, Debug)]
pub enum BraviaError {
    #[error("HTTP request to {0} failed: {1}")]
    Transport(String, String),
    #[error("{0} failed with HTTP status {1} and body: {2}")]
    HttpStatus(String, u16, String),
    #[error("Invalid JSON from {0}: {1}")]
    Json(String, String),
    #[error("{method} returned JSON-RPC error {code}: {message}")]
    Rpc {
        method: String,
        code: i64,
        message: String,
    },
    #[error("Unexpected {0} response: {1}")]
    UnexpectedResponse(String, String),
    #[error("Xml Error: {0}")]
    Xml(String),
}

impl BraviaError {
    pub fn transport(url: &str, reason: impl ToString) -> Self {
        BraviaError::Transport(url.to_string(), reason.to_string())
    }

    pub fn unexpected_response(method: &str, detail: impl ToString) -> Self {
        BraviaError::UnexpectedResponse(method.to_string(), detail.to_string())
    }

    /// True for failures where the device never answered.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, BraviaError::Transport(..))
    }
}
