use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use dailytrivia::round::{PlayerRound, RoundSubmitter, SubmitError};

// ============================================================================
// Mock Infrastructure
// ============================================================================

/// Wraps a real submitter behind a connectivity switch.
pub struct SwitchableSubmitter {
    inner: Arc<dyn RoundSubmitter>,
    online: AtomicBool,
    attempts: AtomicU32,
}

impl SwitchableSubmitter {
    pub fn offline(inner: Arc<dyn RoundSubmitter>) -> Self {
        Self {
            inner,
            online: AtomicBool::new(false),
            attempts: AtomicU32::new(0),
        }
    }

    pub fn go_online(&self) {
        self.online.store(true, Ordering::SeqCst);
    }

    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RoundSubmitter for SwitchableSubmitter {
    async fn submit(&self, round: &PlayerRound) -> Result<u32, SubmitError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if !self.online.load(Ordering::SeqCst) {
            return Err(SubmitError::Unavailable("network unreachable".into()));
        }
        self.inner.submit(round).await
    }
}
