//! Alert aggregation -- fetch, de-duplicate, bucket by severity.
//!
//! The daemon reports every raised alert instance; the gate only counts
//! *distinct* identities. The rule is first-occurrence-wins: iterating in
//! daemon order, an identity's first record determines the severity it is
//! counted under, and every later record with that identity is ignored
//! entirely -- even when its severity differs. A re-raise at a higher
//! severity does not move the count.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::info;

use scangate_core::metrics as m;
use scangate_core::types::{Alert, AlertSummary, Severity};

use crate::api::ManagementApi;
use crate::error::ApiError;

/// Computes the distinct-identity summary for an alert list.
///
/// Pure function over the list in its given order; see the module docs
/// for the de-duplication rule.
pub fn summarize(alerts: &[Alert]) -> AlertSummary {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut summary = AlertSummary::default();
    for alert in alerts {
        if seen.insert(alert.name.as_str()) {
            summary.record(alert.severity);
        }
    }
    summary
}

/// Fetches the full alert inventory and summarizes it.
pub struct AlertAggregator<A: ManagementApi> {
    api: Arc<A>,
}

impl<A: ManagementApi> AlertAggregator<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self { api }
    }

    /// Retrieves all current alerts (no filter) and computes the summary.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the remote call fails or returns
    /// malformed data.
    pub async fn collect(&self) -> Result<AlertSummary, ApiError> {
        let alerts = self.api.alerts("", "", "").await?;
        metrics::counter!(m::ALERTS_FETCHED_TOTAL).increment(alerts.len() as u64);

        let summary = summarize(&alerts);
        for severity in Severity::ALL {
            let distinct = summary.count(severity);
            metrics::counter!(m::ALERTS_DISTINCT_TOTAL, m::LABEL_SEVERITY => severity.to_string())
                .increment(distinct);
            info!(severity = %severity, distinct, "alert count");
        }
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockManagementApi;

    #[test]
    fn first_occurrence_wins_across_severities() {
        // The second "A" is ignored entirely; it does not even count
        // towards Medium.
        let alerts = vec![
            Alert::new("A", Severity::High),
            Alert::new("B", Severity::Low),
            Alert::new("A", Severity::Medium),
        ];
        let summary = summarize(&alerts);
        assert_eq!(summary.high, 1);
        assert_eq!(summary.low, 1);
        assert_eq!(summary.medium, 0);
        assert_eq!(summary.informational, 0);
    }

    #[test]
    fn duplicates_within_one_severity_count_once() {
        let alerts = vec![
            Alert::new("Missing CSP Header", Severity::Medium),
            Alert::new("Missing CSP Header", Severity::Medium),
            Alert::new("Missing CSP Header", Severity::Medium),
        ];
        let summary = summarize(&alerts);
        assert_eq!(summary.medium, 1);
        assert_eq!(summary.total(), 1);
    }

    #[test]
    fn empty_inventory_is_empty_summary() {
        assert!(summarize(&[]).is_empty());
    }

    #[test]
    fn distinct_identities_all_count() {
        let alerts = vec![
            Alert::new("A", Severity::High),
            Alert::new("B", Severity::High),
            Alert::new("C", Severity::Informational),
        ];
        let summary = summarize(&alerts);
        assert_eq!(summary.high, 2);
        assert_eq!(summary.informational, 1);
        assert_eq!(summary.total(), 3);
    }

    #[test]
    fn order_decides_the_counted_severity() {
        let forward = summarize(&[
            Alert::new("A", Severity::Low),
            Alert::new("A", Severity::High),
        ]);
        assert_eq!((forward.low, forward.high), (1, 0));

        let reverse = summarize(&[
            Alert::new("A", Severity::High),
            Alert::new("A", Severity::Low),
        ]);
        assert_eq!((reverse.low, reverse.high), (0, 1));
    }

    #[tokio::test]
    async fn collect_fetches_and_summarizes() {
        let api = Arc::new(MockManagementApi::new().with_alerts(vec![
            Alert::new("A", Severity::High),
            Alert::new("A", Severity::High),
            Alert::new("B", Severity::Low),
        ]));
        let aggregator = AlertAggregator::new(api);
        let summary = aggregator.collect().await.unwrap();
        assert_eq!(summary.high, 1);
        assert_eq!(summary.low, 1);
    }

    #[tokio::test]
    async fn collect_propagates_api_error() {
        let api = Arc::new(MockManagementApi::new().with_failing_alerts());
        let aggregator = AlertAggregator::new(api);
        let err = aggregator.collect().await.unwrap_err();
        assert!(matches!(err, ApiError::Request { .. }));
    }
}
