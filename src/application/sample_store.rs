// Sample store - revealed history plus the recording still to be played back
use crate::domain::error::PowerError;
use crate::domain::sample::Sample;
use std::collections::VecDeque;

/// Revealed samples are append-only and strictly ordered by time. The store
/// always holds at least one revealed sample.
#[derive(Debug, Clone)]
pub struct SampleStore {
    revealed: Vec<Sample>,
    pending: VecDeque<Sample>,
}

impl SampleStore {
    /// Split a recording at `cursor`: samples before it are revealed, the rest
    /// wait for `advance_and_reveal`.
    pub fn seeded(recording: Vec<Sample>, cursor: usize) -> Result<Self, PowerError> {
        if recording.is_empty() {
            return Err(PowerError::EmptyDataset);
        }
        if let Some(index) = recording
            .windows(2)
            .position(|pair| pair[1].time_ms <= pair[0].time_ms)
        {
            return Err(PowerError::UnorderedSeed { index: index + 1 });
        }

        let cursor = cursor.clamp(1, recording.len());
        let mut revealed = recording;
        let pending: VecDeque<Sample> = revealed.split_off(cursor).into();
        Ok(Self { revealed, pending })
    }

    /// Turn a per-minute voltage recording into timestamped samples.
    ///
    /// The recording is rotated to start at `(len / 2 + rotation_offset) % len`,
    /// its middle sample lands on `now_ms` and everything up to and including it
    /// is revealed.
    pub fn from_recording(
        voltages: Vec<Option<f64>>,
        now_ms: i64,
        rotation_offset: usize,
        sample_interval_ms: i64,
    ) -> Result<Self, PowerError> {
        if voltages.is_empty() {
            return Err(PowerError::EmptyDataset);
        }

        let len = voltages.len();
        let mut voltages = voltages;
        voltages.rotate_left((len / 2 + rotation_offset) % len);

        let now_index = (len / 2) as i64;
        let recording = voltages
            .into_iter()
            .enumerate()
            .map(|(i, voltage)| {
                Sample::new(now_ms - (now_index - i as i64) * sample_interval_ms, voltage)
            })
            .collect();
        Self::seeded(recording, len / 2 + 1)
    }

    pub fn len(&self) -> usize {
        self.revealed.len()
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.revealed
    }

    pub fn latest(&self) -> &Sample {
        &self.revealed[self.revealed.len() - 1]
    }

    /// The last `count_back` revealed samples, or `InsufficientData` when the
    /// store is shorter than that.
    pub fn windowed_read(&self, count_back: usize) -> Result<&[Sample], PowerError> {
        let available = self.revealed.len();
        if count_back > available {
            return Err(PowerError::InsufficientData {
                requested: count_back,
                available,
            });
        }
        Ok(&self.revealed[available - count_back..])
    }

    /// Like `windowed_read`, but settles for whatever is available.
    pub fn window(&self, count_back: usize) -> &[Sample] {
        match self.windowed_read(count_back) {
            Ok(window) => window,
            Err(_) => &self.revealed,
        }
    }

    pub fn append(&mut self, sample: Sample) -> Result<(), PowerError> {
        let last_ms = self.latest().time_ms;
        if sample.time_ms <= last_ms {
            return Err(PowerError::OutOfOrderSample {
                time_ms: sample.time_ms,
                last_ms,
            });
        }
        self.revealed.push(sample);
        Ok(())
    }

    /// Reveal the next recorded sample. The sample stays queued if it can no
    /// longer be appended in order.
    pub fn advance_and_reveal(&mut self) -> Result<Sample, PowerError> {
        let next = *self.pending.front().ok_or(PowerError::PlaybackExhausted)?;
        self.append(next)?;
        self.pending.pop_front();
        Ok(next)
    }
}
