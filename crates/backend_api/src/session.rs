use std::sync::atomic::{AtomicU64, Ordering};

use models::ExpenseAnalysis;
use tokio::sync::RwLock;

/// Orders competing fetch-and-aggregate rounds for one user.
///
/// Every round takes a ticket before it starts fetching. Installing a result
/// is a no-op when a round with a newer ticket has already installed one, so
/// a slow response that was superseded while in flight cannot replace fresher
/// data.
pub struct AnalysisSession {
    next_generation: AtomicU64,
    latest: RwLock<Option<(u64, ExpenseAnalysis)>>,
}

/// Proof that a fetch round was registered; consumed on install.
#[derive(Debug)]
pub struct FetchTicket {
    generation: u64,
}

impl AnalysisSession {
    pub fn new() -> Self {
        Self {
            next_generation: AtomicU64::new(1),
            latest: RwLock::new(None),
        }
    }

    /// Registers a new fetch round. Tickets are strictly increasing.
    pub fn begin(&self) -> FetchTicket {
        FetchTicket {
            generation: self.next_generation.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Installs `analysis` unless a newer round already completed.
    /// Returns whether the result was accepted.
    pub async fn install(&self, ticket: FetchTicket, analysis: ExpenseAnalysis) -> bool {
        let mut latest = self.latest.write().await;
        match latest.as_ref() {
            Some((generation, _)) if *generation > ticket.generation => false,
            _ => {
                *latest = Some((ticket.generation, analysis));
                true
            }
        }
    }

    /// The most recently installed analysis, if any round has completed.
    pub async fn latest(&self) -> Option<ExpenseAnalysis> {
        self.latest.read().await.as_ref().map(|(_, a)| a.clone())
    }
}

impl Default for AnalysisSession {
    fn default() -> Self {
        Self::new()
    }
}
