// Voltage sample domain model
use serde::{Deserialize, Serialize};

/// One timestamped voltage reading. `voltage` is `None` when telemetry was not
/// collected for the slot, which is different from a zero reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub time_ms: i64,
    pub voltage: Option<f64>,
}

impl Sample {
    pub fn new(time_ms: i64, voltage: Option<f64>) -> Self {
        Self { time_ms, voltage }
    }

    pub fn reading(time_ms: i64, voltage: f64) -> Self {
        Self::new(time_ms, Some(voltage))
    }

    pub fn absent(time_ms: i64) -> Self {
        Self::new(time_ms, None)
    }

    pub fn state(&self) -> PowerState {
        PowerState::from_voltage(self.voltage)
    }

    pub fn is_missing(&self) -> bool {
        self.voltage.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerState {
    On,
    Off,
}

impl PowerState {
    /// Absent readings count as off for switch detection.
    pub fn from_voltage(voltage: Option<f64>) -> Self {
        match voltage {
            Some(v) if v > 0.0 => PowerState::On,
            _ => PowerState::Off,
        }
    }
}
