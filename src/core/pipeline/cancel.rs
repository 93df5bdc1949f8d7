//! Coarse-grained cancellation.
//!
//! The pipeline checks the token (and its deadline, if any) between
//! chunks; a capability call already in flight is never interrupted.

use std::time::Instant;

pub use tokio_util::sync::CancellationToken;

/// Stop condition for one run: the token plus an optional deadline
#[derive(Debug, Clone)]
pub(crate) struct StopCondition {
    pub token: CancellationToken,
    pub deadline: Option<Instant>,
}

impl StopCondition {
    pub fn should_stop(&self) -> bool {
        if self.token.is_cancelled() {
            return true;
        }
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}
