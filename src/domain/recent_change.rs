// Recent change resolver - most recent debounced outage or restoration
use super::sample::{PowerState, Sample};
use super::switch_index::SwitchIndex;
use serde::{Deserialize, Serialize};

/// Reference debounce: anything shorter than 15 minutes is a flicker.
pub const DEFAULT_DEBOUNCE_MS: i64 = 15 * 60 * 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Power went off
    Outage,
    /// Power came back on
    Restoration,
}

impl Direction {
    pub fn target(self) -> PowerState {
        match self {
            Direction::Outage => PowerState::Off,
            Direction::Restoration => PowerState::On,
        }
    }

    /// The direction whose most recent occurrence explains the current state.
    pub fn explaining(state: PowerState) -> Self {
        match state {
            PowerState::On => Direction::Restoration,
            PowerState::Off => Direction::Outage,
        }
    }
}

/// `change` is `None` when no significant transition is known; that means
/// "no history", not zero interruptions from a known baseline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RecentChange {
    pub change: Option<Sample>,
    pub interruptions: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct RecentChangeResolver {
    threshold_ms: i64,
}

impl Default for RecentChangeResolver {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_MS)
    }
}

impl RecentChangeResolver {
    pub fn new(threshold_ms: i64) -> Self {
        Self { threshold_ms }
    }

    /// Walk back from the last switch at or before `now_ms` to the newest switch
    /// into `direction` that lasted at least the threshold since the switch
    /// before it. Matching switches that fail the test are counted as interruptions.
    pub fn resolve(&self, switches: &SwitchIndex, direction: Direction, now_ms: i64) -> RecentChange {
        let mut interruptions = 0;
        let end = switches.count_until(now_ms);
        if end < 2 {
            return RecentChange {
                change: None,
                interruptions,
            };
        }

        let events = switches.events();
        let target = direction.target();
        for i in (0..end).rev() {
            let event = events[i];
            if event.state() != target {
                continue;
            }
            // The first switch on record has nothing to flicker against.
            let significant = switches
                .gap_before(i)
                .is_none_or(|gap| gap >= self.threshold_ms);
            if significant {
                return RecentChange {
                    change: Some(event),
                    interruptions,
                };
            }
            interruptions += 1;
        }

        RecentChange {
            change: None,
            interruptions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: i64 = 900_000;

    fn index(points: &[(i64, f64)]) -> SwitchIndex {
        let samples: Vec<Sample> = points.iter().map(|(t, v)| Sample::reading(*t, *v)).collect();
        SwitchIndex::build(&samples)
    }

    #[test]
    fn test_significant_outage_resets_interruptions() {
        let switches = index(&[(0, 230.0), (100, 0.0), (110, 230.0), (1_000_000, 0.0)]);
        let resolver = RecentChangeResolver::new(T);

        let result = resolver.resolve(&switches, Direction::Outage, i64::MAX);
        assert_eq!(result.change, Some(Sample::reading(1_000_000, 0.0)));
        assert_eq!(result.interruptions, 0);
    }

    #[test]
    fn test_blips_are_counted_and_skipped() {
        let switches = index(&[
            (0, 230.0),
            (1_000_000, 0.0),
            (2_000_000, 230.0),
            (2_000_100, 0.0),
            (2_000_200, 230.0),
            (2_000_300, 0.0),
        ]);
        let resolver = RecentChangeResolver::new(T);

        let outage = resolver.resolve(&switches, Direction::Outage, 2_000_300);
        assert_eq!(outage.change, Some(Sample::reading(1_000_000, 0.0)));
        assert_eq!(outage.interruptions, 2);

        let restoration = resolver.resolve(&switches, Direction::Restoration, 2_000_300);
        assert_eq!(restoration.change, Some(Sample::reading(2_000_000, 230.0)));
        assert_eq!(restoration.interruptions, 1);
    }

    #[test]
    fn test_no_significant_change_keeps_count() {
        let switches = index(&[(0, 230.0), (100, 0.0), (110, 230.0), (1_000_000, 0.0)]);
        let resolver = RecentChangeResolver::new(T);

        let result = resolver.resolve(&switches, Direction::Restoration, i64::MAX);
        assert_eq!(result.change, None);
        assert_eq!(result.interruptions, 1);
    }

    #[test]
    fn test_cursor_limits_search() {
        let switches = index(&[(0, 230.0), (100, 0.0), (110, 230.0), (1_000_000, 0.0)]);
        let resolver = RecentChangeResolver::new(T);

        let result = resolver.resolve(&switches, Direction::Outage, 500);
        assert_eq!(result.change, Some(Sample::reading(100, 0.0)));
        assert_eq!(result.interruptions, 0);
    }

    #[test]
    fn test_fewer_than_two_switches_is_unknown() {
        let resolver = RecentChangeResolver::default();

        let none = index(&[(0, 230.0)]);
        assert_eq!(resolver.resolve(&none, Direction::Outage, i64::MAX).change, None);

        let single = index(&[(0, 230.0), (60_000, 0.0)]);
        let result = resolver.resolve(&single, Direction::Outage, i64::MAX);
        assert_eq!(result.change, None);
        assert_eq!(result.interruptions, 0);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let switches = index(&[(0, 230.0), (1_000, 0.0), (1_000 + T, 230.0)]);
        let resolver = RecentChangeResolver::new(T);

        let result = resolver.resolve(&switches, Direction::Restoration, i64::MAX);
        assert_eq!(result.change, Some(Sample::reading(1_000 + T, 230.0)));
    }

    #[test]
    fn test_direction_explaining_state() {
        assert_eq!(Direction::explaining(PowerState::On), Direction::Restoration);
        assert_eq!(Direction::explaining(PowerState::Off), Direction::Outage);
    }
}
