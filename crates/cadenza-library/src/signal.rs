//! Readiness signals for load and rebuild cycles.
//!
//! Every load or rebuild replaces the service's current signal with a fresh
//! one. Holders of an older signal only ever observe the outcome of the
//! cycle that created it.

use std::fmt;
use tokio::sync::watch;

/// Outcome of a load or rebuild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    Ready,
    Rejected(String),
}

impl fmt::Display for Readiness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready => f.write_str("ready"),
            Self::Rejected(reason) => write!(f, "rejected: {reason}"),
        }
    }
}

/// Awaitable view of one cycle's outcome. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ReadinessSignal {
    rx: watch::Receiver<Option<Readiness>>,
}

/// Settles the paired [`ReadinessSignal`]. Dropping it unsettled rejects
/// waiters.
#[derive(Debug)]
pub struct ReadinessResolver {
    tx: watch::Sender<Option<Readiness>>,
}

/// A pending signal and its resolver.
pub fn channel() -> (ReadinessResolver, ReadinessSignal) {
    let (tx, rx) = watch::channel(None);
    (ReadinessResolver { tx }, ReadinessSignal { rx })
}

impl ReadinessSignal {
    /// A signal that is already rejected.
    pub fn rejected(reason: impl Into<String>) -> Self {
        let (resolver, signal) = channel();
        resolver.settle(Readiness::Rejected(reason.into()));
        signal
    }

    /// The outcome, if already settled.
    pub fn peek(&self) -> Option<Readiness> {
        self.rx.borrow().clone()
    }

    /// Wait for the outcome.
    pub async fn wait(&self) -> Readiness {
        let mut rx = self.rx.clone();
        let outcome = match rx.wait_for(Option::is_some).await {
            Ok(settled) => (*settled).clone(),
            Err(_) => None,
        };
        outcome.unwrap_or_else(|| Readiness::Rejected(abandoned()))
    }
}

impl ReadinessResolver {
    pub fn settle(self, outcome: Readiness) {
        self.tx.send_replace(Some(outcome));
    }

    pub fn resolve(self) {
        self.settle(Readiness::Ready);
    }

    pub fn reject(self, reason: impl Into<String>) {
        self.settle(Readiness::Rejected(reason.into()));
    }
}

fn abandoned() -> String {
    "library load was abandoned".to_string()
}
