use thiserror::Error;

/// Errors surfaced by the document store adapter.
///
/// These are caught at the fetch/mutation boundary, logged, and never allowed
/// to take down the render path; the last known good state keeps rendering.
#[derive(Debug, Error)]
pub enum StoreError {
  /// Network failure or a rejected read query.
  #[error("document store unavailable: {0}")]
  Unavailable(String),

  /// The store refused a create, update, or delete.
  #[error("write rejected by document store: {0}")]
  WriteRejected(String),

  /// A response body or document failed to decode.
  #[error("malformed document in '{collection}': {reason}")]
  Malformed { collection: String, reason: String },
}

impl From<reqwest::Error> for StoreError {
  fn from(err: reqwest::Error) -> Self {
    StoreError::Unavailable(err.to_string())
  }
}
