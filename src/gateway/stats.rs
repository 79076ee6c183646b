// Per-worker usage counters
// The command set is fixed at construction, so counters need no lock

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct Stats {
    requests: AtomicU64,
    cmds: BTreeMap<String, AtomicU64>,
}

/// Point-in-time copy of the counters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub requests: u64,
    /// Ranked by descending hits, then by name
    pub cmds: Vec<(String, u64)>,
}

impl Stats {
    pub fn new<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            requests: AtomicU64::new(0),
            cmds: names
                .into_iter()
                .map(|name| (name.to_string(), AtomicU64::new(0)))
                .collect(),
        }
    }

    pub fn record_request(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Unregistered commands are ignored
    pub fn record_hit(&self, command: &str) {
        if let Some(counter) = self.cmds.get(command) {
            counter.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let mut cmds: Vec<(String, u64)> = self
            .cmds
            .iter()
            .map(|(name, hits)| (name.clone(), hits.load(Ordering::Relaxed)))
            .collect();
        // BTreeMap order is by name; a stable sort keeps it for ties
        cmds.sort_by(|a, b| b.1.cmp(&a.1));

        StatsSnapshot {
            requests: self.requests.load(Ordering::Relaxed),
            cmds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_zero() {
        let stats = Stats::new(["b", "a"]);
        let snap = stats.snapshot();
        assert_eq!(snap.requests, 0);
        assert_eq!(snap.cmds, vec![("a".to_string(), 0), ("b".to_string(), 0)]);
    }

    #[test]
    fn test_ranking_descending() {
        let stats = Stats::new(["echo", "upper", "reverse"]);
        for _ in 0..3 {
            stats.record_hit("upper");
        }
        stats.record_hit("reverse");
        stats.record_request();
        stats.record_request();

        let snap = stats.snapshot();
        assert_eq!(snap.requests, 2);
        assert_eq!(
            snap.cmds,
            vec![
                ("upper".to_string(), 3),
                ("reverse".to_string(), 1),
                ("echo".to_string(), 0),
            ]
        );
    }

    #[test]
    fn test_unknown_hit_ignored() {
        let stats = Stats::new(["echo"]);
        stats.record_hit("missing");
        assert_eq!(stats.snapshot().cmds, vec![("echo".to_string(), 0)]);
    }
}
