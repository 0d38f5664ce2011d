use thiserror::Error;

use crate::model::VideoId;

/// A search attempt that produced no usable results.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
  /// Transport failure, non-2xx status or malformed body. The reason is
  /// already human-readable.
  #[error("{0}")]
  Failed(String),
}

/// The playback surface could not play the selected video, e.g. embedding
/// is restricted or the stream could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{id} can't be played here: {reason}")]
pub struct PlaybackUnavailable {
  pub id: VideoId,
  pub reason: String,
}
