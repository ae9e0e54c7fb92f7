use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Engine error: {0}")]
    Engine(String),

    #[error("invalid base64 body: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("body is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("{0}")]
    Payload(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Address parse error: {0}")]
    AddrParse(#[from] std::net::AddrParseError),
}

impl Error {
    pub fn engine(msg: impl Into<String>) -> Self {
        Self::Engine(msg.into())
    }

    pub fn payload(msg: impl Into<String>) -> Self {
        Self::Payload(msg.into())
    }

    /// True when the caller sent an invalid request: malformed transport
    /// encoding, malformed JSON, or a missing required field.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Base64(_) | Self::Utf8(_) | Self::Payload(_))
    }
}
