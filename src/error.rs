/// Per-cycle failure taxonomy
///
/// Every variant is absorbed at the feed boundary and reported as
/// `UpdateStatus::Error`; none of them escape `update()` or `tick()`.

use crate::decoder::DecodeError;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("unexpected HTTP status {0}")]
    HttpStatus(u16),

    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
}

pub type FeedResult<T> = Result<T, FeedError>;
