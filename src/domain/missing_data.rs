// Missing telemetry tracker - runs of absent voltage at the window tail
use super::sample::Sample;
use serde::Serialize;

/// Gaps shorter than this are not worth flagging to a display.
pub const DEFAULT_MIN_DISPLAY_MS: i64 = 60_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TelemetryState {
    Present,
    Missing { start_ms: i64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    WentMissing { start_ms: i64 },
    Restored { start_ms: i64, end_ms: i64 },
}

/// `start_ms` is set while telemetry is missing; `active` only once the gap
/// has outgrown the minimum display duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MissingDataGap {
    pub missing: bool,
    pub start_ms: Option<i64>,
    pub end_ms: Option<i64>,
    pub active: bool,
}

impl MissingDataGap {
    pub fn present() -> Self {
        Self {
            missing: false,
            start_ms: None,
            end_ms: None,
            active: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DataMissingTracker {
    min_display_ms: i64,
    state: TelemetryState,
    latest_ms: Option<i64>,
}

impl Default for DataMissingTracker {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_DISPLAY_MS)
    }
}

impl DataMissingTracker {
    pub fn new(min_display_ms: i64) -> Self {
        Self {
            min_display_ms,
            state: TelemetryState::Present,
            latest_ms: None,
        }
    }

    /// Replay a window so the tracker reflects its tail.
    pub fn from_window(min_display_ms: i64, window: &[Sample]) -> Self {
        let mut tracker = Self::new(min_display_ms);
        for sample in window {
            tracker.observe(sample);
        }
        tracker
    }

    pub fn state(&self) -> TelemetryState {
        self.state
    }

    /// Advance with the newest sample, reporting a state change if one happened.
    pub fn observe(&mut self, sample: &Sample) -> Option<Transition> {
        self.latest_ms = Some(sample.time_ms);
        match (self.state, sample.is_missing()) {
            (TelemetryState::Present, true) => {
                self.state = TelemetryState::Missing {
                    start_ms: sample.time_ms,
                };
                Some(Transition::WentMissing {
                    start_ms: sample.time_ms,
                })
            }
            (TelemetryState::Missing { start_ms }, false) => {
                self.state = TelemetryState::Present;
                Some(Transition::Restored {
                    start_ms,
                    end_ms: sample.time_ms,
                })
            }
            _ => None,
        }
    }

    pub fn gap(&self) -> MissingDataGap {
        match (self.state, self.latest_ms) {
            (TelemetryState::Missing { start_ms }, Some(latest_ms)) => MissingDataGap {
                missing: true,
                start_ms: Some(start_ms),
                end_ms: Some(latest_ms),
                active: latest_ms - start_ms > self.min_display_ms,
            },
            _ => MissingDataGap::present(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minute(i: i64) -> i64 {
        i * 60_000
    }

    #[test]
    fn test_trailing_run_reports_first_absent_sample() {
        let window = vec![
            Sample::reading(minute(0), 230.0),
            Sample::absent(minute(1)),
            Sample::reading(minute(2), 231.0),
            Sample::absent(minute(3)),
            Sample::absent(minute(4)),
            Sample::absent(minute(5)),
        ];
        let tracker = DataMissingTracker::from_window(60_000, &window);
        assert_eq!(
            tracker.state(),
            TelemetryState::Missing {
                start_ms: minute(3)
            }
        );

        let gap = tracker.gap();
        assert!(gap.missing);
        assert_eq!(gap.start_ms, Some(minute(3)));
        assert_eq!(gap.end_ms, Some(minute(5)));
        assert!(gap.active);
    }

    #[test]
    fn test_short_gap_is_not_active() {
        let mut tracker = DataMissingTracker::new(60_000);
        tracker.observe(&Sample::reading(0, 230.0));
        tracker.observe(&Sample::absent(30_000));
        tracker.observe(&Sample::absent(60_000));
        tracker.observe(&Sample::absent(90_000));

        // 60s since the run started; must strictly exceed the minimum
        assert_eq!(tracker.gap().start_ms, Some(30_000));
        assert!(tracker.gap().missing);
        assert!(!tracker.gap().active);

        tracker.observe(&Sample::absent(90_001));
        assert!(tracker.gap().active);
    }

    #[test]
    fn test_transitions_are_reported_once() {
        let mut tracker = DataMissingTracker::default();
        assert_eq!(tracker.observe(&Sample::reading(0, 0.0)), None);
        assert_eq!(
            tracker.observe(&Sample::absent(10)),
            Some(Transition::WentMissing { start_ms: 10 })
        );
        assert_eq!(tracker.observe(&Sample::absent(20)), None);
        assert_eq!(
            tracker.observe(&Sample::reading(30, 0.0)),
            Some(Transition::Restored {
                start_ms: 10,
                end_ms: 30
            })
        );
        assert_eq!(tracker.gap(), MissingDataGap::present());
    }

    #[test]
    fn test_empty_window_is_present() {
        let tracker = DataMissingTracker::from_window(60_000, &[]);
        assert_eq!(tracker.state(), TelemetryState::Present);
        assert_eq!(tracker.gap(), MissingDataGap::present());
    }
}
