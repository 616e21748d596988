// Power service - session owner for the sample store and its derived views
use crate::application::sample_store::SampleStore;
use crate::domain::duration::format_duration;
use crate::domain::error::PowerError;
use crate::domain::missing_data::{DataMissingTracker, MissingDataGap, Transition};
use crate::domain::recent_change::{Direction, RecentChange, RecentChangeResolver};
use crate::domain::sample::{PowerState, Sample};
use crate::domain::switch_index::SwitchIndex;
use crate::domain::switch_window::{self, SpanLookup, SwitchWindow};
use crate::infrastructure::config::MonitorSettings;
use serde::Serialize;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::watch;

pub type WindowUpdate = Arc<Vec<Sample>>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PowerSummary {
    pub state: PowerState,
    pub latest_ms: i64,
    pub change: RecentChange,
    pub since_text: Option<String>,
    pub interruptions_text: String,
    pub missing: MissingDataGap,
}

/// Everything an append touches, kept together so readers never see a store
/// that is ahead of its switch index. `missing_log` only feeds transition
/// logging; gap queries are answered from the current window.
struct MonitorState {
    store: SampleStore,
    switches: SwitchIndex,
    missing_log: DataMissingTracker,
}

struct Inner {
    state: RwLock<MonitorState>,
    resolver: RecentChangeResolver,
    window_samples: usize,
    missing_band_min_ms: i64,
    updates: watch::Sender<WindowUpdate>,
}

#[derive(Clone)]
pub struct PowerService {
    inner: Arc<Inner>,
}

impl PowerService {
    pub fn new(store: SampleStore, settings: &MonitorSettings) -> Self {
        let window_samples = settings.window_samples.max(1);
        let switches = SwitchIndex::build(store.samples());
        let missing_log = DataMissingTracker::from_window(settings.missing_band_min_ms, store.samples());
        let window = Arc::new(store.window(window_samples).to_vec());
        let (updates, _) = watch::channel(window);

        tracing::info!(
            "Power monitor seeded with {} samples ({} pending), {} switches",
            store.len(),
            store.pending(),
            switches.len()
        );

        Self {
            inner: Arc::new(Inner {
                state: RwLock::new(MonitorState {
                    store,
                    switches,
                    missing_log,
                }),
                resolver: RecentChangeResolver::new(settings.debounce_ms()),
                window_samples,
                missing_band_min_ms: settings.missing_band_min_ms,
                updates,
            }),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, MonitorState> {
        self.inner.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, MonitorState> {
        self.inner.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn window(&self) -> Vec<Sample> {
        self.read().store.window(self.inner.window_samples).to_vec()
    }

    pub fn state(&self) -> PowerState {
        self.read().store.latest().state()
    }

    pub fn most_recent_change(&self, direction: Direction) -> RecentChange {
        let state = self.read();
        let now_ms = state.store.latest().time_ms;
        self.inner.resolver.resolve(&state.switches, direction, now_ms)
    }

    /// The most recent change that explains the current state.
    fn current_change_in(&self, state: &MonitorState) -> RecentChange {
        let latest = state.store.latest();
        let direction = Direction::explaining(latest.state());
        self.inner
            .resolver
            .resolve(&state.switches, direction, latest.time_ms)
    }

    pub fn missing_data_status(&self) -> MissingDataGap {
        self.missing_data_in(&self.read())
    }

    fn missing_data_in(&self, state: &MonitorState) -> MissingDataGap {
        let window = state.store.window(self.inner.window_samples);
        DataMissingTracker::from_window(self.inner.missing_band_min_ms, window).gap()
    }

    pub fn switches_in_range(&self, start_ms: i64, end_ms: i64) -> SwitchWindow {
        switch_window::in_range(self.read().switches.events(), start_ms, end_ms)
    }

    /// Switches to annotate the current window with.
    pub fn display_switches(&self) -> SwitchWindow {
        let state = self.read();
        let window = state.store.window(self.inner.window_samples);
        let start_ms = window[0].time_ms;
        let end_ms = window[window.len() - 1].time_ms;
        switch_window::in_range(state.switches.events(), start_ms, end_ms)
    }

    pub fn span_at(&self, time_ms: i64) -> SpanLookup {
        switch_window::span_at(self.read().switches.events(), time_ms)
    }

    pub fn format_duration(&self, start_ms: i64, end_ms: i64) -> String {
        format_duration(start_ms, end_ms)
    }

    pub fn summary(&self) -> PowerSummary {
        let state = self.read();
        let latest = *state.store.latest();
        let change = self.current_change_in(&state);
        let missing = self.missing_data_in(&state);

        let since_ms = if missing.missing {
            missing.start_ms
        } else {
            change.change.map(|c| c.time_ms)
        };

        PowerSummary {
            state: latest.state(),
            latest_ms: latest.time_ms,
            change,
            since_text: since_ms.map(|start| format_duration(start, latest.time_ms)),
            interruptions_text: interruptions_text(change.interruptions),
            missing,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<WindowUpdate> {
        self.inner.updates.subscribe()
    }

    /// Append a sample from an external source.
    pub fn append(&self, sample: Sample) -> Result<(), PowerError> {
        let mut state = self.write();
        if let Err(e) = state.store.append(sample) {
            tracing::warn!("Rejected sample: {}", e);
            return Err(e);
        }
        self.apply(&mut state, sample);
        Ok(())
    }

    /// Reveal the next recorded sample.
    pub fn advance_and_reveal(&self) -> Result<Sample, PowerError> {
        let mut state = self.write();
        let sample = state.store.advance_and_reveal()?;
        self.apply(&mut state, sample);
        Ok(sample)
    }

    pub fn pending(&self) -> usize {
        self.read().store.pending()
    }

    fn apply(&self, state: &mut MonitorState, sample: Sample) {
        if let Some(switch) = state.switches.push(sample) {
            tracing::info!("Power switched {:?} at {}", switch.state(), switch.time_ms);
        }

        match state.missing_log.observe(&sample) {
            Some(Transition::WentMissing { start_ms }) => {
                tracing::info!("Telemetry missing since {}", start_ms);
            }
            Some(Transition::Restored { start_ms, end_ms }) => {
                tracing::info!(
                    "Telemetry restored after {}",
                    format_duration(start_ms, end_ms)
                );
            }
            None => {}
        }

        tracing::debug!("Appended sample at {} ({:?})", sample.time_ms, sample.voltage);

        let window = state.store.window(self.inner.window_samples).to_vec();
        self.inner.updates.send_replace(Arc::new(window));
    }
}

fn interruptions_text(count: u32) -> String {
    match count {
        0 => "with no interruptions".to_string(),
        1 => "with 1 interruption".to_string(),
        n => format!("with {} interruptions", n),
    }
}
