// Domain layer - Samples, switch detection and display formatting
pub mod duration;
pub mod error;
pub mod missing_data;
pub mod recent_change;
pub mod sample;
pub mod switch_index;
pub mod switch_window;
