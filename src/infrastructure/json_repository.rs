// JSON file repository for recorded voltages
use crate::application::voltage_repository::VoltageRepository;
use anyhow::{Context, Result};
use async_trait::async_trait;

/// Reads a JSON array of voltages, one per minute, with `null` for minutes
/// where no telemetry was collected.
#[derive(Debug, Clone)]
pub struct JsonVoltageRepository {
    path: String,
}

impl JsonVoltageRepository {
    pub fn new(path: String) -> Self {
        Self { path }
    }
}

fn parse_voltages(raw: &str) -> Result<Vec<Option<f64>>> {
    let voltages: Vec<Option<f64>> =
        serde_json::from_str(raw).context("Voltage recording must be an array of numbers or nulls")?;
    if voltages.is_empty() {
        anyhow::bail!("Voltage recording is empty");
    }
    Ok(voltages)
}

#[async_trait]
impl VoltageRepository for JsonVoltageRepository {
    async fn load_voltages(&self) -> Result<Vec<Option<f64>>> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read voltage recording {}", self.path))?;
        let voltages = parse_voltages(&raw)?;
        tracing::debug!("Loaded {} recorded voltages from {}", voltages.len(), self.path);
        Ok(voltages)
    }
}
