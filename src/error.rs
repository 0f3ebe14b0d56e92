use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("missing field `{0}` in event payload")]
    MissingField(&'static str),
    #[error("unknown category `{0}`")]
    UnknownCategory(String),
    #[error("unknown city `{0}`")]
    UnknownCity(String),
    #[error("failed to fetch {url}: HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("cannot derive an event id from url `{0}`")]
    InvalidEventUrl(String),
    #[error("malformed timestamp `{value}`")]
    Timestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    #[error("malformed payload: {0}")]
    Payload(#[from] serde_json::Error),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}
