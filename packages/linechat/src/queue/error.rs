// queue error types.

use thiserror::Error;


/// Error for waiting on a queue after the session has been asked to shut down
#[derive(Error, Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[error("session shutdown requested")]
pub struct CancelledError;
