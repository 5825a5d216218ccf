use crate::verification::VerificationReport;
use crate::{Response, RouteKey};
use log::debug;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// The configured responses of a single route, together with the number of requests
/// it has already served.
pub(crate) struct RouteState {
    responses: Vec<Arc<Response>>,
    /// How many requests have been served so far.
    /// It is also the position of the next response to hand out: it never goes past
    /// `responses.len()`.
    cursor: usize,
}

impl RouteState {
    pub(crate) fn new(responses: Vec<Response>) -> Self {
        Self {
            responses: responses.into_iter().map(Arc::new).collect(),
            cursor: 0,
        }
    }

    /// Hand out the next response, if any is left, moving the cursor past it.
    fn advance(&mut self) -> Option<Arc<Response>> {
        let response = self.responses.get(self.cursor)?.clone();
        self.cursor += 1;
        Some(response)
    }

    fn verify(&self, route_key: &RouteKey) -> VerificationReport {
        VerificationReport {
            route_key: route_key.clone(),
            n_configured_responses: self.responses.len(),
            n_served_responses: self.cursor,
        }
    }
}

/// Why no response could be handed out for a request.
///
/// Both reasons look the same on the wire; the distinction only shows up in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Unmatched {
    RouteNotFound,
    SequenceExhausted,
}

impl fmt::Display for Unmatched {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unmatched::RouteNotFound => f.write_str("no route configured for this key"),
            Unmatched::SequenceExhausted => f.write_str("all configured responses were served"),
        }
    }
}

pub(crate) enum SequenceResult {
    Matched(Arc<Response>),
    Unmatched(Unmatched),
}

/// Every route known to a server, fixed at construction time.
/// Only the cursors move afterwards.
pub(crate) struct RouteTable {
    routes: HashMap<RouteKey, RouteState>,
}

impl RouteTable {
    pub(crate) fn new<I>(routes: I) -> Self
    where
        I: IntoIterator<Item = (RouteKey, Vec<Response>)>,
    {
        let mut table = HashMap::new();
        for (route_key, responses) in routes {
            if table
                .insert(route_key.clone(), RouteState::new(responses))
                .is_some()
            {
                debug!(
                    "Route {} was configured more than once, keeping the last configuration.",
                    route_key
                );
            }
        }
        Self { routes: table }
    }

    pub(crate) fn next(&mut self, route_key: &str) -> SequenceResult {
        match self.routes.get_mut(route_key) {
            None => SequenceResult::Unmatched(Unmatched::RouteNotFound),
            Some(state) => match state.advance() {
                Some(response) => SequenceResult::Matched(response),
                None => SequenceResult::Unmatched(Unmatched::SequenceExhausted),
            },
        }
    }

    pub(crate) fn calls(&self, route_key: &str) -> Option<usize> {
        self.routes.get(route_key).map(|state| state.cursor)
    }

    /// One report per route, sorted by route key.
    pub(crate) fn verify(&self) -> Vec<VerificationReport> {
        let mut reports: Vec<_> = self
            .routes
            .iter()
            .map(|(route_key, state)| state.verify(route_key))
            .collect();
        reports.sort_by(|a, b| a.route_key.cmp(&b.route_key));
        reports
    }
}
