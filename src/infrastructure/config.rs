use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub monitor: MonitorSettings,
    pub seed: SeedSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind_addr: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MonitorSettings {
    pub debounce_minutes: i64,
    pub poll_interval_ms: u64,
    pub window_samples: usize,
    pub missing_band_min_ms: i64,
}

impl MonitorSettings {
    pub fn debounce_ms(&self) -> i64 {
        self.debounce_minutes * 60 * 1000
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SeedSettings {
    pub path: String,
    pub rotation_offset: usize,
    pub sample_interval_ms: i64,
}

fn defaults() -> anyhow::Result<config::ConfigBuilder<config::builder::DefaultState>> {
    Ok(config::Config::builder()
        .set_default("server.bind_addr", "0.0.0.0:8080")?
        .set_default("monitor.debounce_minutes", 15)?
        .set_default("monitor.poll_interval_ms", 1000)?
        .set_default("monitor.window_samples", 4 * 60)?
        .set_default("monitor.missing_band_min_ms", 60_000)?
        .set_default("seed.path", "config/voltage-data.json")?
        .set_default("seed.rotation_offset", 3658)?
        .set_default("seed.sample_interval_ms", 60_000)?)
}

/// Defaults, then `config/power.*` if present, then `POWER__SECTION__KEY`
/// environment variables.
pub fn load_config() -> anyhow::Result<AppConfig> {
    let settings = defaults()?
        .add_source(config::File::with_name("config/power").required(false))
        .add_source(config::Environment::with_prefix("POWER").separator("__"))
        .build()?;

    let config: AppConfig = settings.try_deserialize()?;
    config.validate()?;
    Ok(config)
}

impl AppConfig {
    /// Reject values the monitor cannot run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.monitor.poll_interval_ms == 0 {
            anyhow::bail!("monitor.poll_interval_ms must be greater than zero");
        }
        if self.monitor.debounce_minutes < 0 {
            anyhow::bail!("monitor.debounce_minutes must not be negative");
        }
        if self.seed.sample_interval_ms <= 0 {
            anyhow::bail!("seed.sample_interval_ms must be greater than zero");
        }
        Ok(())
    }
}
