// Error taxonomy for geoprobe
// Every variant is local to a single request, fetch, or injection candidate;
// callers recover by moving to the next unit of work.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProbeError {
    /// The capabilities (or exception) body is not well-formed XML in the
    /// expected schema.
    #[error("failed to decode capabilities document: {0}")]
    Decode(#[from] quick_xml::DeError),

    /// A feature-collection line is not a valid JSON object. Fatal to that
    /// fetch; partial results are discarded.
    #[error("malformed feature record: {0}")]
    MalformedRecord(String),

    /// The server answered with a non-2xx status.
    #[error("unexpected status code: {0}")]
    UnexpectedStatus(u16),

    /// Connection, DNS, or TLS failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Writing a normalized collection to disk failed.
    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// Serializing the normalized collection failed.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A caller-supplied argument failed validation.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}
