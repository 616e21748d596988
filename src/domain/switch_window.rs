// Windowed switch queries for chart annotations and tooltips
use super::sample::{PowerState, Sample};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "switches", rename_all = "snake_case")]
pub enum SwitchWindow {
    NoData,
    Switches(Vec<Sample>),
}

/// Switches visible within `[start_ms, end_ms]`, led by the last switch at or
/// before `start_ms` so the caller knows the state the window opens in.
pub fn in_range(switches: &[Sample], start_ms: i64, end_ms: i64) -> SwitchWindow {
    if switches.is_empty() {
        return SwitchWindow::NoData;
    }
    if end_ms < start_ms {
        return SwitchWindow::Switches(Vec::new());
    }

    let first = switches
        .partition_point(|s| s.time_ms <= start_ms)
        .saturating_sub(1);
    let last = switches.partition_point(|s| s.time_ms <= end_ms);
    SwitchWindow::Switches(switches[first..last].to_vec())
}

/// The on/off run that contains a point in time. `until_ms` of `None` means
/// the run is still going; `from_ms` of `None` means it started before the
/// first recorded switch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SwitchSpan {
    pub state: PowerState,
    pub from_ms: Option<i64>,
    pub until_ms: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "span", rename_all = "snake_case")]
pub enum SpanLookup {
    NoData,
    Span(SwitchSpan),
}

pub fn span_at(switches: &[Sample], time_ms: i64) -> SpanLookup {
    if switches.is_empty() {
        return SpanLookup::NoData;
    }

    let next = switches.partition_point(|s| s.time_ms <= time_ms);
    let span = match next {
        0 => {
            let upcoming = switches[0];
            SwitchSpan {
                state: opposite(upcoming.state()),
                from_ms: None,
                until_ms: Some(upcoming.time_ms),
            }
        }
        n => {
            let started = switches[n - 1];
            SwitchSpan {
                state: started.state(),
                from_ms: Some(started.time_ms),
                until_ms: switches.get(n).map(|s| s.time_ms),
            }
        }
    };
    SpanLookup::Span(span)
}

fn opposite(state: PowerState) -> PowerState {
    match state {
        PowerState::On => PowerState::Off,
        PowerState::Off => PowerState::On,
    }
}
