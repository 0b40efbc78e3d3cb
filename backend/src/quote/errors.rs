use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    /// Transport failure, timeout or non-success HTTP status.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("malformed response from quote api: {0}")]
    MalformedResponse(String),

    #[error("invalid {pair} price: {raw:?}")]
    InvalidValue { pair: &'static str, raw: String },
}
