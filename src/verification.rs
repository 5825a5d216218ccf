use crate::RouteKey;

/// A report detailing, for a single route, how many responses were configured and
/// how many of them were actually served.
#[derive(Clone, Debug)]
pub(crate) struct VerificationReport {
    pub(crate) route_key: RouteKey,
    /// What users specified
    pub(crate) n_configured_responses: usize,
    /// Number of requests that received one of the configured responses
    pub(crate) n_served_responses: usize,
}

impl VerificationReport {
    pub(crate) fn error_message(&self) -> String {
        format!(
            "{}. Configured responses: {}, served: {}",
            self.route_key, self.n_configured_responses, self.n_served_responses
        )
    }

    pub(crate) fn is_satisfied(&self) -> bool {
        self.n_served_responses >= self.n_configured_responses
    }
}

pub(crate) enum VerificationOutcome {
    /// Every configured response was served.
    Success,
    /// One or more routes still have responses left.
    /// All failed verifications are returned.
    Failure(Vec<VerificationReport>),
}
