//! Counters for the vote and cancel endpoints.

use prometheus::{IntCounter, IntCounterVec, Opts, Registry};

/// Request-level counters, registered into the node's registry.
pub struct RpcMetrics {
    /// Votes accepted and stored.
    pub votes_cast: IntCounter,
    /// Vote requests refused, labelled by error kind.
    pub votes_rejected: IntCounterVec,
    /// Votes that pushed a proposal over the broadcast threshold.
    pub broadcasts: IntCounter,
    pub proposals_cancelled: IntCounter,
}

impl RpcMetrics {
    pub fn register(registry: &Registry) -> Result<Self, prometheus::Error> {
        let votes_cast = IntCounter::with_opts(Opts::new(
            "squad_votes_cast_total",
            "Votes accepted and stored",
        ))?;
        let votes_rejected = IntCounterVec::new(
            Opts::new("squad_votes_rejected_total", "Vote requests refused"),
            &["kind"],
        )?;
        let broadcasts = IntCounter::with_opts(Opts::new(
            "squad_broadcasts_total",
            "Proposals that crossed the broadcast threshold",
        ))?;
        let proposals_cancelled = IntCounter::with_opts(Opts::new(
            "squad_proposals_cancelled_total",
            "Proposals cancelled by their squad leader",
        ))?;

        registry.register(Box::new(votes_cast.clone()))?;
        registry.register(Box::new(votes_rejected.clone()))?;
        registry.register(Box::new(broadcasts.clone()))?;
        registry.register(Box::new(proposals_cancelled.clone()))?;

        Ok(Self {
            votes_cast,
            votes_rejected,
            broadcasts,
            proposals_cancelled,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_twice_on_same_registry_fails() {
        let registry = Registry::new();
        assert!(RpcMetrics::register(&registry).is_ok());
        assert!(RpcMetrics::register(&registry).is_err());
    }

    #[test]
    fn test_counters_show_up_in_gather() {
        let registry = Registry::new();
        let metrics = RpcMetrics::register(&registry).unwrap();
        metrics.votes_cast.inc();
        metrics.votes_rejected.with_label_values(&["conflict"]).inc();
        let names: Vec<String> = registry
            .gather()
            .iter()
            .map(|f| f.get_name().to_string())
            .collect();
        assert!(names.contains(&"squad_votes_cast_total".to_string()));
        assert!(names.contains(&"squad_votes_rejected_total".to_string()));
    }
}
