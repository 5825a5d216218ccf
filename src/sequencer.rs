use crate::route_table::{RouteTable, SequenceResult};
use crate::verification::{VerificationOutcome, VerificationReport};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// The single point through which every request reads and advances the route cursors.
///
/// All routes share one lock. The critical section is a map lookup, a bounds check and an `Arc`
/// clone: nothing in it touches the network.
pub(crate) struct ResponseSequencer {
    route_table: Mutex<RouteTable>,
}

impl ResponseSequencer {
    pub(crate) fn new(route_table: RouteTable) -> Self {
        Self {
            route_table: Mutex::new(route_table),
        }
    }

    /// Pick the response for the next request hitting `route_key` and move the route cursor
    /// forward, as one indivisible step.
    pub(crate) fn next(&self, route_key: &str) -> SequenceResult {
        self.lock().next(route_key)
    }

    pub(crate) fn calls(&self, route_key: &str) -> Option<usize> {
        self.lock().calls(route_key)
    }

    pub(crate) fn verify(&self) -> VerificationOutcome {
        let failed_verifications: Vec<VerificationReport> = self
            .lock()
            .verify()
            .into_iter()
            .filter(|report| !report.is_satisfied())
            .collect();
        if failed_verifications.is_empty() {
            VerificationOutcome::Success
        } else {
            VerificationOutcome::Failure(failed_verifications)
        }
    }

    // Bumping the cursor is the last step under the lock, a poisoned table is still consistent.
    fn lock(&self) -> MutexGuard<'_, RouteTable> {
        self.route_table
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
