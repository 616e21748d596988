// Application layer - Session state, playback and polling use cases
pub mod live_poller;
pub mod power_service;
pub mod sample_store;
pub mod voltage_repository;
