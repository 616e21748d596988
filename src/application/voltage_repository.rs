// Repository trait for the voltage recording that seeds a session
use async_trait::async_trait;

#[async_trait]
pub trait VoltageRepository: Send + Sync {
    /// Load the per-minute voltage recording, oldest first. `None` marks a
    /// minute with no telemetry.
    async fn load_voltages(&self) -> anyhow::Result<Vec<Option<f64>>>;
}
