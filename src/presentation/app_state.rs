// Application state for HTTP handlers
use crate::application::live_poller::LivePoller;
use crate::application::power_service::PowerService;
use std::time::Duration;

pub struct AppState {
    pub power_service: PowerService,
    pub poller: LivePoller,
    pub poll_interval: Duration,
}
