//! Analytics aggregation over the negotiation event log
//!
//! The aggregator appends events to the append-only store and serves rolling
//! per-company metrics from a TTL cache. Every aggregate is an idempotent
//! read-side computation over the log - safe to recompute from scratch at
//! any time. Tracking an event invalidates exactly that company's cache key.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, Utc};
use negotiation_agent_core::{AnalyticsEvent, NegotiationOutcome, TtlCache};
use negotiation_agent_persistence::AnalyticsEventStore;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Event type names emitted by the orchestrator
pub mod event_types {
    pub const NEGOTIATION_STARTED: &str = "negotiation_started";
    pub const NEGOTIATION_COMPLETED: &str = "negotiation_completed";
    pub const NEGOTIATION_REJECTED: &str = "negotiation_rejected";
    pub const NEGOTIATION_ABANDONED: &str = "negotiation_abandoned";
    pub const NEGOTIATION_ESCALATED: &str = "negotiation_escalated";
}

/// Errors from analytics tracking and aggregation
#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("persistence error: {0}")]
    Persistence(#[from] negotiation_agent_persistence::PersistenceError),
}

/// Direction of the success-rate trend over the rolling window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricsTrend {
    Improving,
    Declining,
    Stable,
}

/// Rolling per-company metrics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeneralMetrics {
    /// Started negotiations without a terminal event yet
    pub active_negotiations: u32,
    /// Negotiations started, all time
    pub total_negotiations: u32,
    /// Rounded integer percent of resolved negotiations ending in agreement
    pub ai_success_rate: u32,
    pub escalations: u32,
    /// Mean conversation duration of resolved negotiations, in minutes
    pub avg_resolution_minutes: i64,
    /// Last 7 days compared with the previous 7, at a ±5 point threshold
    pub trend: MetricsTrend,
}

/// The analytics aggregator
pub struct AnalyticsAggregator {
    store: Arc<dyn AnalyticsEventStore>,
    metrics_cache: TtlCache<Uuid, GeneralMetrics>,
}

impl AnalyticsAggregator {
    pub fn new(store: Arc<dyn AnalyticsEventStore>, cache_ttl: Duration) -> Self {
        Self {
            store,
            metrics_cache: TtlCache::new(cache_ttl),
        }
    }

    /// Append one event and invalidate that company's metrics cache key
    pub async fn track(&self, event: AnalyticsEvent) -> Result<(), AnalyticsError> {
        self.store.append(&event).await?;
        self.metrics_cache.invalidate(&event.company_id);

        metrics::counter!(
            "analytics_events_total",
            "event_type" => event.event_type.clone()
        )
        .increment(1);

        tracing::debug!(
            company_id = %event.company_id,
            event_type = %event.event_type,
            outcome = ?event.outcome,
            "Analytics event tracked"
        );

        Ok(())
    }

    /// Rolling metrics for one company, cached for the configured TTL
    pub async fn general_metrics(&self, company_id: Uuid) -> Result<GeneralMetrics, AnalyticsError> {
        if let Some(cached) = self.metrics_cache.get(&company_id) {
            return Ok(cached);
        }

        let events = self.store.list_for_company(company_id).await?;
        let metrics = compute_metrics(&events);
        self.metrics_cache.insert(company_id, metrics);
        Ok(metrics)
    }
}

/// Resolved = any event other than a start marker
fn is_resolution(event: &AnalyticsEvent) -> bool {
    event.event_type != event_types::NEGOTIATION_STARTED
}

fn success_rate(resolutions: &[&AnalyticsEvent]) -> u32 {
    if resolutions.is_empty() {
        return 0;
    }
    let successful = resolutions
        .iter()
        .filter(|e| e.outcome == Some(NegotiationOutcome::Agreement))
        .count() as f64;
    (successful / resolutions.len() as f64 * 100.0).round() as u32
}

fn compute_metrics(events: &[AnalyticsEvent]) -> GeneralMetrics {
    let started = events
        .iter()
        .filter(|e| e.event_type == event_types::NEGOTIATION_STARTED)
        .count() as u32;
    let resolutions: Vec<&AnalyticsEvent> = events.iter().filter(|e| is_resolution(e)).collect();

    let escalations = resolutions
        .iter()
        .filter(|e| e.outcome == Some(NegotiationOutcome::Escalated))
        .count() as u32;

    let avg_resolution_minutes = if resolutions.is_empty() {
        0
    } else {
        let total: i64 = resolutions
            .iter()
            .map(|e| e.conversation_duration_minutes)
            .sum();
        total / resolutions.len() as i64
    };

    GeneralMetrics {
        active_negotiations: started.saturating_sub(resolutions.len() as u32),
        total_negotiations: started,
        ai_success_rate: success_rate(&resolutions),
        escalations,
        avg_resolution_minutes,
        trend: compute_trend(&resolutions),
    }
}

/// Compare the success rate of the last 7 days against the previous 7.
/// A change of more than 5 points in either direction breaks "stable".
fn compute_trend(resolutions: &[&AnalyticsEvent]) -> MetricsTrend {
    let now = Utc::now();
    let week_ago = now - ChronoDuration::days(7);
    let two_weeks_ago = now - ChronoDuration::days(14);

    let current: Vec<&AnalyticsEvent> = resolutions
        .iter()
        .filter(|e| e.created_at >= week_ago)
        .copied()
        .collect();
    let previous: Vec<&AnalyticsEvent> = resolutions
        .iter()
        .filter(|e| e.created_at >= two_weeks_ago && e.created_at < week_ago)
        .copied()
        .collect();

    if current.is_empty() || previous.is_empty() {
        return MetricsTrend::Stable;
    }

    let delta = success_rate(&current) as i64 - success_rate(&previous) as i64;
    if delta > 5 {
        MetricsTrend::Improving
    } else if delta < -5 {
        MetricsTrend::Declining
    } else {
        MetricsTrend::Stable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use negotiation_agent_persistence::InMemoryAnalyticsEventStore;

    fn resolution(company_id: Uuid, outcome: Option<NegotiationOutcome>) -> AnalyticsEvent {
        let event_type = match outcome {
            Some(NegotiationOutcome::Agreement) => event_types::NEGOTIATION_COMPLETED,
            Some(NegotiationOutcome::Escalated) => event_types::NEGOTIATION_ESCALATED,
            Some(NegotiationOutcome::Abandoned) => event_types::NEGOTIATION_ABANDONED,
            None => event_types::NEGOTIATION_REJECTED,
        };
        let mut event = AnalyticsEvent::new(company_id, event_type).with_duration_minutes(10);
        event.outcome = outcome;
        event
    }

    #[tokio::test]
    async fn success_rate_is_rounded_percent() {
        let store = Arc::new(InMemoryAnalyticsEventStore::new());
        let aggregator = AnalyticsAggregator::new(store, Duration::from_secs(300));
        let company_id = Uuid::new_v4();

        for i in 0..10 {
            let outcome = if i < 6 {
                Some(NegotiationOutcome::Agreement)
            } else {
                Some(NegotiationOutcome::Escalated)
            };
            aggregator
                .track(resolution(company_id, outcome))
                .await
                .unwrap();
        }

        let metrics = aggregator.general_metrics(company_id).await.unwrap();
        assert_eq!(metrics.ai_success_rate, 60);
        assert_eq!(metrics.escalations, 4);
        assert_eq!(metrics.avg_resolution_minutes, 10);
    }

    #[tokio::test]
    async fn active_counts_unresolved_starts() {
        let store = Arc::new(InMemoryAnalyticsEventStore::new());
        let aggregator = AnalyticsAggregator::new(store, Duration::from_secs(300));
        let company_id = Uuid::new_v4();

        for _ in 0..3 {
            aggregator
                .track(AnalyticsEvent::new(
                    company_id,
                    event_types::NEGOTIATION_STARTED,
                ))
                .await
                .unwrap();
        }
        aggregator
            .track(resolution(company_id, Some(NegotiationOutcome::Agreement)))
            .await
            .unwrap();

        let metrics = aggregator.general_metrics(company_id).await.unwrap();
        assert_eq!(metrics.total_negotiations, 3);
        assert_eq!(metrics.active_negotiations, 2);
    }

    #[tokio::test]
    async fn tracking_invalidates_cached_metrics() {
        let store = Arc::new(InMemoryAnalyticsEventStore::new());
        let aggregator = AnalyticsAggregator::new(store, Duration::from_secs(300));
        let company_id = Uuid::new_v4();

        aggregator
            .track(resolution(company_id, Some(NegotiationOutcome::Agreement)))
            .await
            .unwrap();
        assert_eq!(
            aggregator
                .general_metrics(company_id)
                .await
                .unwrap()
                .ai_success_rate,
            100
        );

        aggregator
            .track(resolution(company_id, Some(NegotiationOutcome::Escalated)))
            .await
            .unwrap();
        // The fresh event is visible immediately because its key was dropped
        assert_eq!(
            aggregator
                .general_metrics(company_id)
                .await
                .unwrap()
                .ai_success_rate,
            50
        );
    }

    #[tokio::test]
    async fn trend_compares_rolling_windows() {
        let store = Arc::new(InMemoryAnalyticsEventStore::new());
        let aggregator = AnalyticsAggregator::new(store, Duration::from_secs(300));
        let company_id = Uuid::new_v4();

        // Previous window: two failures
        for _ in 0..2 {
            let mut event = resolution(company_id, Some(NegotiationOutcome::Escalated));
            event.created_at = Utc::now() - ChronoDuration::days(10);
            aggregator.track(event).await.unwrap();
        }
        // Current window: two agreements
        for _ in 0..2 {
            aggregator
                .track(resolution(company_id, Some(NegotiationOutcome::Agreement)))
                .await
                .unwrap();
        }

        let metrics = aggregator.general_metrics(company_id).await.unwrap();
        assert_eq!(metrics.trend, MetricsTrend::Improving);
    }

    #[tokio::test]
    async fn small_rate_change_is_stable() {
        let store = Arc::new(InMemoryAnalyticsEventStore::new());
        let aggregator = AnalyticsAggregator::new(store, Duration::from_secs(300));
        let company_id = Uuid::new_v4();

        // Both windows at 50 percent: delta 0, within the ±5 band
        for days_ago in [10, 0] {
            for outcome in [
                Some(NegotiationOutcome::Agreement),
                Some(NegotiationOutcome::Escalated),
            ] {
                let mut event = resolution(company_id, outcome);
                event.created_at = Utc::now() - ChronoDuration::days(days_ago);
                aggregator.track(event).await.unwrap();
            }
        }

        let metrics = aggregator.general_metrics(company_id).await.unwrap();
        assert_eq!(metrics.trend, MetricsTrend::Stable);
    }

    #[tokio::test]
    async fn recent_events_trend_stable_without_baseline() {
        let store = Arc::new(InMemoryAnalyticsEventStore::new());
        let aggregator = AnalyticsAggregator::new(store, Duration::from_secs(300));
        let company_id = Uuid::new_v4();

        aggregator
            .track(resolution(company_id, Some(NegotiationOutcome::Agreement)))
            .await
            .unwrap();

        let metrics = aggregator.general_metrics(company_id).await.unwrap();
        assert_eq!(metrics.trend, MetricsTrend::Stable);
    }
}
