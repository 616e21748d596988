// Switch index - samples at which the on/off state changes
use super::sample::{PowerState, Sample};

/// Append-only list of switch events. The first sample only seeds the running
/// state; it is never a switch itself.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SwitchIndex {
    events: Vec<Sample>,
    state: Option<PowerState>,
}

impl SwitchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(samples: &[Sample]) -> Self {
        let mut index = Self::new();
        for sample in samples {
            index.push(*sample);
        }
        index
    }

    /// Feed the next sample. Returns the new switch event, if the sample made one.
    pub fn push(&mut self, sample: Sample) -> Option<Sample> {
        let state = sample.state();
        match self.state {
            Some(current) if current == state => None,
            Some(_) => {
                self.state = Some(state);
                self.events.push(sample);
                Some(sample)
            }
            None => {
                self.state = Some(state);
                None
            }
        }
    }

    pub fn events(&self) -> &[Sample] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Milliseconds between event `i` and the switch before it, `None` for the first event.
    pub fn gap_before(&self, i: usize) -> Option<i64> {
        if i == 0 || i >= self.events.len() {
            return None;
        }
        Some(self.events[i].time_ms - self.events[i - 1].time_ms)
    }

    /// Number of events at or before `time_ms`.
    pub fn count_until(&self, time_ms: i64) -> usize {
        self.events.partition_point(|e| e.time_ms <= time_ms)
    }
}
