pub mod client;
pub mod errors;
pub mod types;

pub use client::{AwesomeApiClient, QuoteSource};
pub use errors::FetchError;
pub use types::*;
